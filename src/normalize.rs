//! Normalization of loose prediction payloads.
//!
//! The prediction service and the historical store schemas disagree on
//! shape: the disease name has appeared as `disease`, as `prediction`,
//! and nested under a `prediction` object; confidence has appeared both
//! as a 0–1 fraction and on the 0–100 scale. `normalize` absorbs all of
//! them into the canonical [`Prediction`] shape. It is pure and total:
//! it never fails and never returns a partial shape.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::models::Prediction;

/// Normalize an arbitrary upstream or legacy payload into the canonical
/// prediction schema. Malformed input is never an error — every field
/// falls back to its documented default.
pub fn normalize(raw: &Value) -> Prediction {
    Prediction {
        disease: extract_disease(raw),
        confidence: normalize_confidence(raw.get("confidence")),
        metadata: extract_object(raw.get("metadata")),
        all_predictions: extract_scores(raw.get("all_predictions")),
        recommendations: extract_strings(raw.get("recommendations")),
        model_details: extract_object(raw.get("model_details")),
    }
}

/// Resolve the disease name. Priority order, first non-empty wins:
/// `disease`, a string-valued `prediction`, `prediction.disease`.
fn extract_disease(raw: &Value) -> String {
    let candidates = [
        raw.get("disease").and_then(Value::as_str),
        raw.get("prediction").and_then(Value::as_str),
        raw.get("prediction")
            .and_then(|p| p.get("disease"))
            .and_then(Value::as_str),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Coerce a confidence value onto the 0–100 scale.
///
/// Accepts a JSON number or a numeric string; anything else reads as 0.
/// Values in (0, 1] are taken as the fractional convention and scaled
/// by 100; values above 1 are taken as already-percent. Both are
/// rounded to the nearest integer and clamped to [0, 100].
///
/// Known limitation: a genuine 1% score expressed as `1` on the percent
/// scale is indistinguishable from a 100% score expressed as `1.0` on
/// the fractional scale, and the fractional reading wins. The upstream
/// service would need to carry an explicit scale field to resolve this.
pub fn normalize_confidence(value: Option<&Value>) -> f64 {
    let Some(v) = value.and_then(coerce_number) else {
        return 0.0;
    };

    let percent = if v <= 1.0 { v * 100.0 } else { v };
    percent.round().clamp(0.0, 100.0)
}

/// Finite number from a JSON number or a numeric string.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Free-form object field; anything that is not an object reads empty.
fn extract_object(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Label → score map. Scores take the same coercion as confidence
/// (number or numeric string); entries that coerce to nothing are
/// skipped.
fn extract_scores(value: Option<&Value>) -> BTreeMap<String, f64> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(label, score)| Some((label.clone(), coerce_number(score)?)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Ordered string list; non-string items are skipped.
fn extract_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disease_from_explicit_field() {
        let p = normalize(&json!({"disease": "Eczema", "confidence": 82}));
        assert_eq!(p.disease, "Eczema");
    }

    #[test]
    fn disease_falls_back_to_prediction_string() {
        let p = normalize(&json!({"prediction": "Psoriasis"}));
        assert_eq!(p.disease, "Psoriasis");
    }

    #[test]
    fn disease_falls_back_to_nested_prediction_object() {
        let p = normalize(&json!({"prediction": {"disease": "Rosacea"}}));
        assert_eq!(p.disease, "Rosacea");
    }

    #[test]
    fn explicit_disease_wins_over_prediction() {
        let p = normalize(&json!({
            "disease": "Eczema",
            "prediction": "Psoriasis"
        }));
        assert_eq!(p.disease, "Eczema");
    }

    #[test]
    fn empty_disease_falls_through_priority_list() {
        let p = normalize(&json!({
            "disease": "  ",
            "prediction": "Acne"
        }));
        assert_eq!(p.disease, "Acne");
    }

    #[test]
    fn missing_disease_is_unknown() {
        assert_eq!(normalize(&json!({})).disease, "Unknown");
        assert_eq!(normalize(&json!({"confidence": 50})).disease, "Unknown");
        assert_eq!(normalize(&json!(null)).disease, "Unknown");
    }

    #[test]
    fn fractional_confidence_scales_to_percent() {
        let p = normalize(&json!({"disease": "Eczema", "confidence": 0.82}));
        assert_eq!(p.confidence, 82.0);
    }

    #[test]
    fn percent_confidence_unchanged() {
        let p = normalize(&json!({"disease": "Acne", "confidence": 91}));
        assert_eq!(p.confidence, 91.0);
    }

    #[test]
    fn confidence_rounds_to_nearest_integer() {
        assert_eq!(normalize_confidence(Some(&json!(0.8251))), 83.0);
        assert_eq!(normalize_confidence(Some(&json!(91.4))), 91.0);
    }

    #[test]
    fn numeric_string_confidence_is_coerced() {
        assert_eq!(normalize_confidence(Some(&json!("0.75"))), 75.0);
        assert_eq!(normalize_confidence(Some(&json!(" 88 "))), 88.0);
    }

    #[test]
    fn invalid_confidence_reads_zero() {
        assert_eq!(normalize_confidence(None), 0.0);
        assert_eq!(normalize_confidence(Some(&json!(null))), 0.0);
        assert_eq!(normalize_confidence(Some(&json!("high"))), 0.0);
        assert_eq!(normalize_confidence(Some(&json!({"v": 1}))), 0.0);
        assert_eq!(normalize_confidence(Some(&json!(f64::NAN))), 0.0);
    }

    #[test]
    fn confidence_clamped_to_valid_range() {
        assert_eq!(normalize_confidence(Some(&json!(250))), 100.0);
        assert_eq!(normalize_confidence(Some(&json!(-0.4))), 0.0);
        assert_eq!(normalize_confidence(Some(&json!(-12))), 0.0);
    }

    #[test]
    fn boundary_one_reads_as_fractional() {
        // Documented limitation: a literal 1 is read as 100%, not 1%.
        assert_eq!(normalize_confidence(Some(&json!(1))), 100.0);
        assert_eq!(normalize_confidence(Some(&json!(1.0))), 100.0);
    }

    #[test]
    fn confidence_always_finite_in_range() {
        for v in [
            json!(0),
            json!(0.004),
            json!(0.5),
            json!(1),
            json!(1.01),
            json!(50),
            json!(100),
            json!(1e9),
            json!(-1e9),
            json!("0.33"),
            json!("nan"),
        ] {
            let c = normalize_confidence(Some(&v));
            assert!(c.is_finite(), "not finite for {v}");
            assert!((0.0..=100.0).contains(&c), "out of range for {v}: {c}");
        }
    }

    #[test]
    fn containers_default_to_empty() {
        let p = normalize(&json!({"disease": "Acne"}));
        assert!(p.metadata.is_empty());
        assert!(p.all_predictions.is_empty());
        assert!(p.recommendations.is_empty());
        assert!(p.model_details.is_empty());
    }

    #[test]
    fn wrong_kind_containers_read_empty() {
        let p = normalize(&json!({
            "disease": "Acne",
            "metadata": "not an object",
            "all_predictions": [1, 2],
            "recommendations": {"a": 1},
            "model_details": 42
        }));
        assert!(p.metadata.is_empty());
        assert!(p.all_predictions.is_empty());
        assert!(p.recommendations.is_empty());
        assert!(p.model_details.is_empty());
    }

    #[test]
    fn numeric_string_scores_are_coerced() {
        let scores = extract_scores(Some(&json!({
            "Eczema": 82.0,
            "Psoriasis": "11",
            "Rosacea": 4.5
        })));
        assert_eq!(scores.len(), 3);
        assert_eq!(scores["Eczema"], 82.0);
        assert_eq!(scores["Psoriasis"], 11.0);
        assert_eq!(scores["Rosacea"], 4.5);
    }

    #[test]
    fn lenient_scores_skip_non_numeric_entries() {
        let scores = extract_scores(Some(&json!({
            "Eczema": 82.0,
            "Psoriasis": "high",
            "Rosacea": null,
            "Dermatitis": [4.5]
        })));
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["Eczema"], 82.0);
    }

    #[test]
    fn lenient_recommendations_skip_non_strings() {
        let recs = extract_strings(Some(&json!([
            "Keep the area moisturised",
            42,
            "See a dermatologist if it spreads"
        ])));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0], "Keep the area moisturised");
    }

    #[test]
    fn metadata_passes_through_questionnaire_fields() {
        let p = normalize(&json!({
            "disease": "Eczema",
            "confidence": 0.82,
            "metadata": {
                "symptoms": "itching",
                "duration": "2 weeks",
                "severity": "moderate",
                "spreading": "yes",
                "familyHistory": "no"
            }
        }));
        assert_eq!(p.symptoms(), Some("itching"));
        assert_eq!(p.duration(), Some("2 weeks"));
        assert_eq!(p.severity(), Some("moderate"));
        assert_eq!(p.metadata["spreading"], json!("yes"));
    }
}
