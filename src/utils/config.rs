use std::path::PathBuf;

const ENV_DB_PATH: &str = "CARTWISE_DB";
const DEFAULT_DB_FILE: &str = "cartwise.db";

pub fn db_path_from_env() -> Option<PathBuf> {
    std::env::var(ENV_DB_PATH)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Explicit flag wins, then the environment, then the default file in the
/// working directory.
pub fn resolve_db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(db_path_from_env)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}
