use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregate view over the stored history, for the history screen's
/// header cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of stored records.
    pub total: usize,
    /// Disease name → occurrence count.
    pub diseases: BTreeMap<String, usize>,
    /// Mean confidence across all records, rounded to one decimal.
    /// 0 when the store is empty.
    pub avg_confidence: f64,
}
