pub mod decoder;
pub mod engine;
pub mod fallback;
pub mod recovery;
pub mod repairer;
pub mod report;
pub mod result_aggregator;
pub mod sanitizer;

use serde::Serialize;

/// Strength classification band for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StrengthLabel {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    /// Fixed thresholds: >=80 Very Strong, >=60 Strong, >=40 Medium,
    /// >=20 Weak, else Very Weak.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => StrengthLabel::VeryStrong,
            60..=79 => StrengthLabel::Strong,
            40..=59 => StrengthLabel::Medium,
            20..=39 => StrengthLabel::Weak,
            _ => StrengthLabel::VeryWeak,
        }
    }
}

impl std::fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrengthLabel::VeryWeak => write!(f, "Very Weak"),
            StrengthLabel::Weak => write!(f, "Weak"),
            StrengthLabel::Medium => write!(f, "Medium"),
            StrengthLabel::Strong => write!(f, "Strong"),
            StrengthLabel::VeryStrong => write!(f, "Very Strong"),
        }
    }
}
