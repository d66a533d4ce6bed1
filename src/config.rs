use std::path::PathBuf;

// =============================================================================
// Time-related constants
// =============================================================================

/// Lifetime of a cached version lookup in milliseconds (10 minutes)
pub const VERSION_CACHE_TTL_MS: i64 = 10 * 60 * 1000;

/// Timeout for remote fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// How long the CLI waits for provider metadata before continuing with offline data
pub const LOAD_WAIT_MS: u64 = 15_000;

/// Environment variable overriding the SDK home directory
pub const SDK_HOME_ENV: &str = "CUBA_SDK_HOME";

/// Environment variable holding the tracing filter directive
pub const LOG_FILTER_ENV: &str = "CUBA_SDK_LOG";

/// Returns the SDK data directory.
/// Uses $CUBA_SDK_HOME if set, otherwise falls back to ~/.haulmont/cli/sdk,
/// or ./cuba-sdk if no home directory is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var(SDK_HOME_ENV).ok(), dirs::home_dir())
}

/// Returns the path to the user settings file.
pub fn settings_path() -> PathBuf {
    data_dir().join("sdk.json")
}

/// Returns the path to the repository database.
pub fn repository_db_path() -> PathBuf {
    data_dir().join("repositories.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("cuba-sdk.log")
}

/// Returns the default local Maven repository (~/.m2/repository).
pub fn maven_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}

fn data_dir_with_env(sdk_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    sdk_home
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".haulmont").join("cli").join("sdk")))
        .unwrap_or_else(|| PathBuf::from("./cuba-sdk"))
}
