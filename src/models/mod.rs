pub mod record;
pub mod stats;

pub use record::{AnalysisRecord, Prediction};
pub use stats::HistoryStats;
