use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "DermAssist";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of retained analysis records. Saving past the cap
/// evicts the oldest record.
pub const HISTORY_CAP: usize = 50;

/// Window within which a save with identical disease, confidence and
/// symptoms collapses into the existing record (guards against
/// double-invocation by the results view).
pub const DEDUP_WINDOW_SECS: i64 = 5;

/// Version written into the persisted envelope. Unversioned legacy
/// arrays are still accepted on read.
pub const SCHEMA_VERSION: u32 = 1;

/// Get the application data directory
/// ~/DermAssist/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Get the durable history file path
pub fn history_file() -> PathBuf {
    app_data_dir().join("analysis-history.json")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "dermassist_history=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("DermAssist"));
    }

    #[test]
    fn history_file_under_app_data() {
        let file = history_file();
        assert!(file.starts_with(app_data_dir()));
        assert!(file.ends_with("analysis-history.json"));
    }

    #[test]
    fn app_name_is_dermassist() {
        assert_eq!(APP_NAME, "DermAssist");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
