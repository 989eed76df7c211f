use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Panel, object::Columns},
};

use crate::types::{RepoStatus, Snapshot};

use super::{TabStyle, frame};

const TITLE: &str = "Repositories";
const MESSAGE_WIDTH: usize = 48;

pub(crate) fn render(snapshot: &Snapshot, style: TabStyle) -> String {
    if snapshot.repos.is_empty() {
        return frame::placeholder(style, TITLE, Some(footer(snapshot)));
    }

    let mut builder = Builder::default();
    builder.push_record([
        "Repo",
        "Branch",
        "Changes",
        "Sync",
        "Issues",
        "Last commit",
        "Message",
        "Notes",
    ]);
    for repo in &snapshot.repos {
        builder.push_record(row_values(repo));
    }

    let mut table = builder.build();
    // Columns: 0 Repo, 1 Branch, 2 Changes, 3 Sync, 4 Issues, 5 Last commit, 6 Message, 7 Notes
    table.with(Modify::new(Columns::new(2..3)).with(Alignment::right()));
    table.with(Modify::new(Columns::new(4..5)).with(Alignment::right()));
    table.with(Panel::footer(footer(snapshot)));
    frame::finish(table, style, TITLE)
}

fn footer(snapshot: &Snapshot) -> String {
    match snapshot.taken_at {
        Some(at) => format!("scanned {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => "not scanned yet".to_string(),
    }
}

fn row_values(repo: &RepoStatus) -> Vec<String> {
    let (age, message) = repo.last_commit.as_ref().map_or_else(
        || ("-".to_string(), String::new()),
        |c| (c.relative.clone(), truncate(&c.message, MESSAGE_WIDTH)),
    );
    vec![
        repo.name.clone(),
        repo.branch.clone(),
        repo.uncommitted.to_string(),
        sync_label(repo),
        repo.open_issues.map_or_else(|| "-".to_string(), |n| n.to_string()),
        age,
        message,
        repo.error.clone().unwrap_or_default(),
    ]
}

fn sync_label(repo: &RepoStatus) -> String {
    if !repo.has_upstream() {
        return "no upstream".to_string();
    }
    match (repo.ahead, repo.behind) {
        (0, 0) => "up to date".to_string(),
        (ahead, 0) => format!("↑{ahead}"),
        (0, behind) => format!("↓{behind}"),
        (ahead, behind) => format!("↑{ahead} ↓{behind}"),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
