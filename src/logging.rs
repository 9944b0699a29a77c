use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV_VAR: &str = "FLASHDRILL_LOG";

/// Keeps the background log writer alive; logs are flushed on drop
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Level from the command line, falling back to `FLASHDRILL_LOG`
pub fn requested_level(cli_level: Option<&str>) -> Option<String> {
    cli_level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV_VAR).ok())
        .filter(|level| !level.trim().is_empty())
}

/// Route `tracing` output to a daily rolling file in `log_dir`.
///
/// The terminal belongs to the drill screen, so there is no stdout layer.
pub fn init_tracing(log_level: &str, log_dir: &Path) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "flashdrill.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    Some(FileLogGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins() {
        assert_eq!(requested_level(Some("debug")).as_deref(), Some("debug"));
    }

    #[test]
    fn blank_level_is_ignored() {
        assert_eq!(requested_level(Some("  ")), None);
    }
}
