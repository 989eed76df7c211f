const SEC_PER_MIN: i64 = 60;
const SEC_PER_HOUR: i64 = 60 * 60;
const SEC_PER_DAY: i64 = 60 * 60 * 24;
const SEC_PER_WEEK: i64 = SEC_PER_DAY * 7;
const SEC_PER_MONTH: i64 = SEC_PER_DAY * 30;

/// Human label for an age in seconds. Each bucket includes its lower bound
/// and excludes its upper one, so exactly 60s is `1m ago`.
#[must_use]
pub fn relative_time(age_secs: i64) -> String {
    if age_secs < SEC_PER_MIN {
        "just now".to_string()
    } else if age_secs < SEC_PER_HOUR {
        format!("{}m ago", age_secs / SEC_PER_MIN)
    } else if age_secs < SEC_PER_DAY {
        format!("{}h ago", age_secs / SEC_PER_HOUR)
    } else if age_secs < SEC_PER_WEEK {
        format!("{}d ago", age_secs / SEC_PER_DAY)
    } else if age_secs < SEC_PER_MONTH {
        format!("{}w ago", age_secs / SEC_PER_WEEK)
    } else {
        format!("{}mo ago", age_secs / SEC_PER_MONTH)
    }
}
