//! Local analysis-history store for the DermAssist skin triage client.
//!
//! The client captures an image plus a symptom questionnaire, sends
//! them to a remote prediction service and shows the diagnosis; this
//! crate owns everything that survives the session — the saved
//! analyses. It normalizes loosely-shaped prediction payloads into one
//! canonical schema, persists them behind a pluggable storage backend
//! (capped, deduplicated, newest first), and serves the history view's
//! queries: list, search, stats, export, unique diseases, date ranges.

pub mod config;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod store;

pub use models::{AnalysisRecord, HistoryStats, Prediction};
pub use normalize::normalize;
pub use storage::{FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use store::HistoryStore;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the store. Honors
/// `RUST_LOG`, falling back to the crate's default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} history store v{}", config::APP_NAME, config::APP_VERSION);
}
