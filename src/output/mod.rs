pub mod json;
pub mod tab;

pub use json::{mutation_to_json, snapshot_to_json};
pub use tab::{TabStyle, format_mutation, format_status};
