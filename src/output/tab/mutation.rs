use tabled::builder::Builder;

use crate::types::{MutationOp, MutationResult};

use super::{TabStyle, frame};

pub(crate) fn render(op: MutationOp, repo: &str, result: &MutationResult, style: TabStyle) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in rows(result) {
        builder.push_record([field.to_string(), value]);
    }
    frame::finish(builder.build(), style, &format!("{op} {repo}"))
}

fn rows(result: &MutationResult) -> Vec<(&'static str, String)> {
    match result {
        MutationResult::Succeeded { status, message } => {
            let mut rows = vec![("Outcome", "succeeded".to_string())];
            if let Some(message) = message {
                rows.push(("Result", message.clone()));
            }
            rows.push(("Branch", status.branch.clone()));
            rows.push(("Changes", status.uncommitted.to_string()));
            rows.push(("Ahead", status.ahead.to_string()));
            rows.push(("Behind", status.behind.to_string()));
            rows
        }
        MutationResult::Failed { diagnostic } => vec![
            ("Outcome", "failed".to_string()),
            ("Error", diagnostic.clone()),
        ],
        MutationResult::NeedsConfirmation(details) => vec![
            ("Outcome", "needs confirmation".to_string()),
            ("Branch", details.branch.clone()),
            ("Changes", details.uncommitted.to_string()),
            ("Ahead", details.ahead.to_string()),
            ("Behind", details.behind.to_string()),
        ],
    }
}
