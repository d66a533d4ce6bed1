//! Tracing setup for the binary
//!
//! Logs go to a file in the SDK home so stdout stays reserved for command output.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::LOG_FILTER_ENV;

const DEFAULT_FILTER: &str = "info";

/// Filter from `$CUBA_SDK_LOG`, falling back to `info` when unset or invalid
pub fn env_filter() -> EnvFilter {
    filter_from(std::env::var(LOG_FILTER_ENV).ok().as_deref())
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber writing to `log_file`.
///
/// The returned guard flushes buffered records on drop and must be held until exit.
pub fn init(log_file: &Path, json: bool) -> std::io::Result<WorkerGuard> {
    let directory = log_file.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;
    let file_name = log_file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "cuba-sdk.log".to_string());

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let registry = tracing_subscriber::registry().with(env_filter());
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
            .init();
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directives_fall_back_to_info() {
        assert_eq!(filter_from(Some("cuba_sdk=loud")).to_string(), DEFAULT_FILTER);
        assert_eq!(filter_from(None).to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn valid_directives_are_kept() {
        assert_eq!(filter_from(Some("cuba_sdk=debug")).to_string(), "cuba_sdk=debug");
    }
}
