use std::borrow::Cow;

use clap::ValueEnum;

use crate::types::{MutationOp, MutationResult, Snapshot};

mod mutation;
mod status;
mod frame;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum TabStyle {
    #[default]
    Rounded,
    Modern,
    ModernRounded,
    Ascii,
    Psql,
    Markdown,
    Sharp,
    Blank,
    Empty,
}

/// Render a snapshot as one table, one row per repository.
///
/// With `hide_clean`, repositories that are clean, in sync and error-free
/// are left out.
#[must_use]
pub fn format_status(snapshot: &Snapshot, style: TabStyle, hide_clean: bool) -> String {
    let render_data = if hide_clean {
        Cow::Owned(without_clean(snapshot))
    } else {
        Cow::Borrowed(snapshot)
    };
    status::render(render_data.as_ref(), style)
}

#[must_use]
pub fn format_mutation(op: MutationOp, repo: &str, result: &MutationResult, style: TabStyle) -> String {
    mutation::render(op, repo, result, style)
}

fn without_clean(snapshot: &Snapshot) -> Snapshot {
    let mut filtered = snapshot.clone();
    filtered
        .repos
        .retain(|repo| repo.error.is_some() || !repo.is_clean());
    filtered
}
