use flexi_logger::{DeferredNow, FlexiLoggerError, Logger, LoggerHandle};
use log::Record;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Start logging to stderr. `spec` is a `log` level or a flexi_logger spec
/// such as `info, repodash::gateway=debug`.
///
/// The returned handle must be kept alive for as long as logging is wanted.
///
/// # Errors
/// Returns an error when `spec` cannot be parsed or the logger cannot start.
pub fn init_logging(spec: Option<&str>) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_str(spec.unwrap_or(DEFAULT_LOG_LEVEL))?
        .format(line_format)
        .log_to_stderr()
        .start()
}

// "2024-01-02 08:00:00.123 WRN message (repodash::scan)"
fn line_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        record.target()
    )
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}
