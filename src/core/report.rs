use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::StrengthLabel;

/// A report field that arrives either as free text or as an ordered list
/// of strings. Both shapes are passed through untransformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextBlock {
    Text(String),
    List(Vec<String>),
}

impl TextBlock {
    /// Flattens to individual display lines.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            TextBlock::Text(text) => vec![text.as_str()],
            TextBlock::List(items) => items.iter().map(|s| s.as_str()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TextBlock::Text(text) => text.is_empty(),
            TextBlock::List(items) => items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    pub score: u8,
    pub label: String,
}

/// The five scored dimensions. A dimension the service did not provide
/// stays `None` here; rendering defaults it to 0, not this model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniqueness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<u8>,
}

/// Normalized analysis result. Never null: when nothing structured is
/// recoverable the whole report is produced by the heuristic scorer, so
/// rendering never special-cases "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<Strength>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crack_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<StrengthMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<TextBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<TextBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<TextBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<TextBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<TextBlock>,
}

impl AnalysisReport {
    /// Extracts a report from a decoded payload with lenient coercions:
    /// scores may arrive as numbers or numeric strings, list fields as a
    /// single string, labels may be missing entirely. Unrecognized fields
    /// are ignored.
    pub fn from_value(value: &Value) -> Self {
        let strength = field(value, &["strength"]).and_then(extract_strength);
        let crack_time = field(value, &["crackTime", "crack_time"]).and_then(as_text);
        let metrics = field(value, &["metrics"]).and_then(extract_metrics);

        Self {
            strength,
            crack_time,
            metrics,
            composition: field(value, &["composition"]).and_then(as_block),
            assessment: field(value, &["assessment"]).and_then(as_block),
            vulnerabilities: field(value, &["vulnerabilities"]).and_then(as_block),
            weaknesses: field(value, &["weaknesses"]).and_then(as_block),
            recommendations: field(value, &["recommendations"]).and_then(as_block),
        }
    }

    /// True when the payload carried enough structure to stand on its own.
    /// Anything less sends the caller to the fallback scorer.
    pub fn has_structured_result(&self) -> bool {
        self.strength.is_some() || self.recommendations.is_some()
    }
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| value.get(name))
}

fn extract_strength(value: &Value) -> Option<Strength> {
    // Tolerate a bare number where an object was expected
    if let Some(score) = as_score(value) {
        return Some(Strength {
            score,
            label: StrengthLabel::from_score(score).to_string(),
        });
    }

    let score = field(value, &["score"]).and_then(as_score)?;
    let label = field(value, &["label"])
        .and_then(as_text)
        .unwrap_or_else(|| StrengthLabel::from_score(score).to_string());
    Some(Strength { score, label })
}

fn extract_metrics(value: &Value) -> Option<StrengthMetrics> {
    if !value.is_object() {
        return None;
    }
    Some(StrengthMetrics {
        length: field(value, &["length"]).and_then(as_score),
        complexity: field(value, &["complexity"]).and_then(as_score),
        uniqueness: field(value, &["uniqueness"]).and_then(as_score),
        pattern: field(value, &["pattern"]).and_then(as_score),
        entropy: field(value, &["entropy"]).and_then(as_score),
    })
}

/// Coerces a value to a 0-100 score: numbers are rounded and clamped,
/// numeric strings are parsed first.
fn as_score(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(number.round().clamp(0.0, 100.0) as u8)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_block(value: &Value) -> Option<TextBlock> {
    match value {
        Value::String(s) => Some(TextBlock::Text(s.clone())),
        Value::Array(items) => Some(TextBlock::List(
            items.iter().filter_map(as_text).collect(),
        )),
        _ => None,
    }
}
