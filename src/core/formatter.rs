//! Turns classifier output into reply blocks.
//!
//! Everything here is pure: no I/O, no logging, and every input, including
//! an upstream failure, maps to a reply.

use crate::config::Settings;
use crate::core::bmi::{BmiCategory, UNKNOWN_LABEL};
use crate::models::{ClassRef, HistoryEntry, MessageBlock, Prediction, PredictionKind};
use chrono::{DateTime, NaiveDateTime};

pub const APOLOGY_TEXT: &str = "ขออภัย ระบบมีปัญหาชั่วคราว 😢\nกรุณาลองใหม่อีกครั้งภายหลังนะงับ";
pub const USAGE_TEXT: &str = "กรุณาส่งรูปใบหน้ามาเพื่อวิเคราะห์ BMI นะงับ 😊\nพิมพ์ \"ประวัติ\" เพื่อดูผลการวิเคราะห์ล่าสุด";
pub const NO_FACE_TEXT: &str = "ไม่พบใบหน้าในรูปภาพ 😢\nกรุณาส่งรูปที่เห็นใบหน้าชัดเจน หันหน้าตรง และมีแสงสว่างเพียงพอนะงับ";
pub const LOW_CONFIDENCE_TEXT: &str = "ระบบยังไม่มั่นใจในผลการวิเคราะห์ 🤔\nกรุณาส่งรูปใบหน้าที่ชัดกว่านี้อีกครั้งนะงับ";
pub const UNRECOGNIZED_TEXT: &str = "ไม่สามารถวิเคราะห์รูปนี้ได้ 😥\nกรุณาส่งรูปใบหน้าใหม่อีกครั้งนะงับ";
pub const EMPTY_HISTORY_TEXT: &str = "ยังไม่มีประวัติการวิเคราะห์ 📭\nลองส่งรูปใบหน้ามาวิเคราะห์ก่อนนะงับ";

/// Why a prediction is not shown to the user as a result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NoFace,
    MultipleFaces(u64),
    LowConfidence(Option<f64>),
    Unrecognized,
}

/// Interpretation of a prediction, before rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<'a> {
    Category {
        category: BmiCategory,
        bmi: Option<f64>,
        confidence: Option<f64>,
    },
    /// Class reported, but not one of the five known categories
    UnknownClass { confidence: Option<f64> },
    /// Classifier sent its own text
    Relay {
        text: &'a str,
        confidence: Option<f64>,
    },
    Rejected(Rejection),
}

/// Formats replies from classifier results
#[derive(Debug, Clone)]
pub struct ReplyFormatter {
    min_confidence: f64,
    image_base_url: String,
}

impl ReplyFormatter {
    pub fn new(min_confidence: f64, image_base_url: impl Into<String>) -> Self {
        Self {
            min_confidence,
            image_base_url: image_base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.classifier.min_confidence,
            settings.reply.image_base_url.clone(),
        )
    }

    pub fn image_url(&self, category: BmiCategory) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            category.image_file()
        )
    }

    /// Decide what a prediction means.
    ///
    /// Face signals win over everything else, then confidence, then the
    /// numeric score, then the class index.
    pub fn assess<'a>(&self, prediction: &'a Prediction) -> Verdict<'a> {
        let confidence = prediction.confidence;

        if prediction.has_face == Some(false) || prediction.face_count == Some(0) {
            return Verdict::Rejected(Rejection::NoFace);
        }
        if let Some(count) = prediction.face_count.filter(|count| *count > 1) {
            return Verdict::Rejected(Rejection::MultipleFaces(count));
        }
        let below_minimum = confidence.is_some_and(|c| c < self.min_confidence);
        if prediction.low_confidence || below_minimum {
            return Verdict::Rejected(Rejection::LowConfidence(confidence));
        }

        match &prediction.kind {
            PredictionKind::Score { bmi } => Verdict::Category {
                category: BmiCategory::from_bmi(*bmi),
                bmi: Some(*bmi),
                confidence,
            },
            PredictionKind::Class(class) => match resolve_class(class) {
                Some(category) => Verdict::Category {
                    category,
                    bmi: None,
                    confidence,
                },
                None => Verdict::UnknownClass { confidence },
            },
            PredictionKind::Message { text } => Verdict::Relay {
                text: text.as_str(),
                confidence,
            },
            PredictionKind::Unrecognized => Verdict::Rejected(Rejection::Unrecognized),
        }
    }

    /// Reply for the outcome of a `/predict` call
    pub fn prediction_reply<E>(&self, outcome: &Result<Prediction, E>) -> Vec<MessageBlock> {
        match outcome {
            Ok(prediction) => self.format_prediction(prediction),
            Err(_) => vec![MessageBlock::text(APOLOGY_TEXT)],
        }
    }

    pub fn format_prediction(&self, prediction: &Prediction) -> Vec<MessageBlock> {
        match self.assess(prediction) {
            Verdict::Category {
                category,
                bmi,
                confidence,
            } => {
                let mut lines = vec![
                    "ผลการวิเคราะห์ BMI จากใบหน้า".to_string(),
                    format!("หมวดหมู่: {}", category.label()),
                ];
                if let Some(bmi) = bmi {
                    lines.push(format!("ค่า BMI โดยประมาณ: {:.1}", bmi));
                }
                if let Some(confidence) = confidence {
                    lines.push(format!("ความมั่นใจ: {}", format_percent(confidence)));
                }
                lines.push(category.advice().to_string());

                vec![
                    MessageBlock::text(lines.join("\n")),
                    MessageBlock::image(self.image_url(category)),
                ]
            }
            Verdict::UnknownClass { confidence } => {
                let mut text = format!("ผลการวิเคราะห์: {}", UNKNOWN_LABEL);
                if let Some(confidence) = confidence {
                    text.push_str(&format!("\nความมั่นใจ: {}", format_percent(confidence)));
                }
                vec![MessageBlock::text(text)]
            }
            Verdict::Relay { text, confidence } => {
                let text = match confidence {
                    Some(c) => format!("{}\nความมั่นใจ: {}", text, format_percent(c)),
                    None => text.to_string(),
                };
                vec![MessageBlock::text(text)]
            }
            Verdict::Rejected(rejection) => vec![MessageBlock::text(rejection_text(rejection))],
        }
    }

    /// Reply for the outcome of a `/history` call
    pub fn history_reply<E>(&self, outcome: &Result<Vec<HistoryEntry>, E>) -> Vec<MessageBlock> {
        match outcome {
            Ok(entries) => vec![MessageBlock::text(format_history(entries))],
            Err(_) => vec![MessageBlock::text(APOLOGY_TEXT)],
        }
    }

    pub fn usage_prompt(&self) -> Vec<MessageBlock> {
        vec![MessageBlock::text(USAGE_TEXT)]
    }
}

fn resolve_class(class: &ClassRef) -> Option<BmiCategory> {
    match class {
        ClassRef::Index(index) => BmiCategory::from_index(*index),
        ClassRef::Name(name) => BmiCategory::from_name(name),
    }
}

fn rejection_text(rejection: Rejection) -> String {
    match rejection {
        Rejection::NoFace => NO_FACE_TEXT.to_string(),
        Rejection::MultipleFaces(count) => format!(
            "พบใบหน้าในรูปมากกว่า 1 คน ({} ใบหน้า) 👥\nกรุณาส่งรูปที่มีใบหน้าเพียงคนเดียวนะงับ",
            count
        ),
        Rejection::LowConfidence(Some(confidence)) => format!(
            "{}\n(ความมั่นใจ: {})",
            LOW_CONFIDENCE_TEXT,
            format_percent(confidence)
        ),
        Rejection::LowConfidence(None) => LOW_CONFIDENCE_TEXT.to_string(),
        Rejection::Unrecognized => UNRECOGNIZED_TEXT.to_string(),
    }
}

/// `0.9` -> `90.00%`
pub fn format_percent(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Render the history listing, one numbered line per entry in input order
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_HISTORY_TEXT.to_string();
    }

    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(format!("📋 ประวัติการวิเคราะห์ล่าสุด {} รายการ", entries.len()));

    for (i, entry) in entries.iter().enumerate() {
        let label = match (&entry.class, entry.has_face) {
            (Some(class), _) => resolve_class(class)
                .map(BmiCategory::label)
                .unwrap_or(UNKNOWN_LABEL),
            (None, Some(false)) => "ไม่พบใบหน้า",
            (None, _) => "-",
        };
        let confidence = entry
            .confidence
            .map(format_percent)
            .unwrap_or_else(|| "-".to_string());
        let faces = entry
            .face_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let when = entry
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());

        lines.push(format!(
            "{}. {} | ความมั่นใจ {} | ใบหน้า {} | {}",
            i + 1,
            label,
            confidence,
            faces,
            when
        ));
    }

    lines.join("\n")
}

/// RFC 3339 and naive ISO timestamps become `YYYY-MM-DD HH:MM`; anything
/// else is shown as sent.
fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(DISPLAY).to_string();
        }
    }
    raw.to_string()
}
