use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::core::decoder::TolerantDecoder;
use crate::core::fallback::HeuristicScorer;
use crate::core::report::AnalysisReport;

/// Where a report's values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Remote,
    Heuristic,
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSource::Remote => write!(f, "remote analysis"),
            ReportSource::Heuristic => write!(f, "local heuristics"),
        }
    }
}

/// Full recovery pipeline: tolerant decode of the service payload, then
/// local heuristic scoring of the subject when nothing structured
/// survived. Always yields a usable report, so rendering never has to
/// special-case missing data.
pub struct RecoveryPipeline {
    decoder: TolerantDecoder,
    scorer: HeuristicScorer,
}

impl RecoveryPipeline {
    pub fn new() -> Self {
        Self {
            decoder: TolerantDecoder::new(),
            scorer: HeuristicScorer::new(),
        }
    }

    /// `subject` is the password under test; the fallback scores it
    /// directly, never the malformed response text.
    pub fn recover(&self, payload: Value, subject: &str) -> (AnalysisReport, ReportSource) {
        let decoded = self.decoder.decode(payload);
        let report = AnalysisReport::from_value(&decoded);
        if report.has_structured_result() {
            return (report, ReportSource::Remote);
        }
        debug!("no structured result recoverable, scoring locally");
        (self.scorer.analyze(subject), ReportSource::Heuristic)
    }
}

impl Default for RecoveryPipeline {
    fn default() -> Self {
        Self::new()
    }
}
