use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One saved triage analysis: primary key, creation time, and the
/// normalized prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// `<unix-millis>-<7 base-36 chars>`. Unique within one client's
    /// store; doubles as a coarse creation-time source.
    pub id: String,
    /// Creation time, immutable once set. ISO-8601 on the wire.
    pub timestamp: DateTime<Utc>,
    pub result: Prediction,
}

/// Canonical in-store prediction schema. Every record handed to a
/// caller is in this shape regardless of the schema it was saved under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Non-empty; "Unknown" when the upstream payload carried no name.
    pub disease: String,
    /// Finite, in [0, 100], whole-number valued after normalization.
    pub confidence: f64,
    /// Questionnaire fields from the client form (symptoms, duration,
    /// severity, spreading, sensations, ...). No required keys.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Alternative disease labels with their scores.
    #[serde(default)]
    pub all_predictions: BTreeMap<String, f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub model_details: Map<String, Value>,
}

impl Prediction {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Free-text symptom description from the questionnaire.
    pub fn symptoms(&self) -> Option<&str> {
        self.metadata_str("symptoms")
    }

    /// How long the condition has been present.
    pub fn duration(&self) -> Option<&str> {
        self.metadata_str("duration")
    }

    /// Reported severity (mild / moderate / severe).
    pub fn severity(&self) -> Option<&str> {
        self.metadata_str("severity")
    }
}
