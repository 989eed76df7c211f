use tabled::{
    Table,
    builder::Builder,
    settings::{Panel, Style, object::Rows, style::LineText},
};

use super::TabStyle;

/// Apply the border style, put `title` into the top border and render.
pub(crate) fn finish(mut table: Table, style: TabStyle, title: &str) -> String {
    apply_style(&mut table, style);
    table.with(LineText::new(format!(" {title} "), Rows::first()).offset(1));
    table.to_string()
}

/// A one-cell "(none)" table. Borderless styles have no top line to carry
/// the title, so it goes into a header row instead.
pub(crate) fn placeholder(style: TabStyle, title: &str, footer: Option<String>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["(none)"]);
    let mut table = builder.build();
    apply_style(&mut table, style);
    table.with(Panel::header(format!(" {title} ")));
    if let Some(footer) = footer {
        table.with(Panel::footer(footer));
    }
    table.to_string()
}

fn apply_style(table: &mut Table, style: TabStyle) {
    match style {
        TabStyle::Rounded => table.with(Style::rounded()),
        TabStyle::Modern => table.with(Style::modern()),
        TabStyle::ModernRounded => table.with(Style::modern_rounded()),
        TabStyle::Ascii => table.with(Style::ascii()),
        TabStyle::Psql => table.with(Style::psql()),
        TabStyle::Markdown => table.with(Style::markdown()),
        TabStyle::Sharp => table.with(Style::sharp()),
        TabStyle::Blank => table.with(Style::blank()),
        TabStyle::Empty => table.with(Style::empty()),
    };
}
