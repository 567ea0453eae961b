//! Classifier payloads.
//!
//! The classifier's JSON contract changed between releases, so nothing here
//! is deserialized through a fixed schema. Each field is read on its own
//! and a missing or mistyped field simply reads as absent.

use serde_json::Value;

/// Reference to a BMI category as the classifier reported it
#[derive(Debug, Clone, PartialEq)]
pub enum ClassRef {
    Index(i64),
    Name(String),
}

/// What the classifier claims to have found
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionKind {
    /// Regression output: an estimated BMI value
    Score { bmi: f64 },
    /// Classification output
    Class(ClassRef),
    /// Free-form message produced by the classifier itself
    Message { text: String },
    Unrecognized,
}

/// Decoded `/predict` response
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub confidence: Option<f64>,
    pub has_face: Option<bool>,
    pub face_count: Option<u64>,
    pub low_confidence: bool,
    pub kind: PredictionKind,
}

impl Prediction {
    /// Decode a response body. Never fails; unknown shapes become
    /// [`PredictionKind::Unrecognized`].
    pub fn from_value(value: &Value) -> Self {
        let kind = if let Some(bmi) = number(value.get("bmi")) {
            PredictionKind::Score { bmi }
        } else if let Some(class) = class_ref(value) {
            PredictionKind::Class(class)
        } else if let Some(text) = non_empty_str(value.get("message")) {
            PredictionKind::Message { text: text.to_string() }
        } else {
            PredictionKind::Unrecognized
        };

        Self {
            confidence: number(value.get("confidence")),
            has_face: value.get("has_face").and_then(Value::as_bool),
            face_count: count(value.get("face_count")),
            low_confidence: value
                .get("low_confidence")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            kind,
        }
    }
}

/// One row of the classifier's `/history` listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryEntry {
    pub class: Option<ClassRef>,
    pub confidence: Option<f64>,
    pub has_face: Option<bool>,
    pub face_count: Option<u64>,
    pub created_at: Option<String>,
}

impl HistoryEntry {
    pub fn from_value(value: &Value) -> Self {
        let class = integer(value.get("class_id"))
            .map(ClassRef::Index)
            .or_else(|| class_field(value.get("bmi_class")))
            .or_else(|| class_ref(value));

        Self {
            class,
            confidence: number(value.get("confidence")),
            has_face: value.get("has_face").and_then(Value::as_bool),
            face_count: count(value.get("face_count")),
            created_at: non_empty_str(value.get("created_at")).map(str::to_string),
        }
    }
}

/// Decode a `/history` body: `{"history": [...]}` or a bare array.
/// Returns `None` when neither shape is present.
pub fn decode_history(value: &Value) -> Option<Vec<HistoryEntry>> {
    let rows = value
        .get("history")
        .and_then(Value::as_array)
        .or_else(|| value.as_array())?;

    Some(rows.iter().map(HistoryEntry::from_value).collect())
}

fn class_ref(value: &Value) -> Option<ClassRef> {
    if let Some(index) = integer(value.get("class_id")) {
        return Some(ClassRef::Index(index));
    }

    if let Some(class) = class_field(value.get("predicted_class")) {
        return Some(class);
    }

    non_empty_str(value.get("class_name")).map(|name| ClassRef::Name(name.to_string()))
}

/// A class given either as an index (number or numeric string) or as a name
fn class_field(value: Option<&Value>) -> Option<ClassRef> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(index) = s.parse::<i64>() {
                Some(ClassRef::Index(index))
            } else if !s.is_empty() {
                Some(ClassRef::Name(s.to_string()))
            } else {
                None
            }
        }
        other => integer(Some(other)).map(ClassRef::Index),
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn count(value: Option<&Value>) -> Option<u64> {
    integer(value).and_then(|n| u64::try_from(n).ok())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
