pub mod core;
pub mod http;
pub mod utils;

pub use crate::core::decoder::TolerantDecoder;
pub use crate::core::engine::AuditEngine;
pub use crate::core::fallback::HeuristicScorer;
pub use crate::core::recovery::{RecoveryPipeline, ReportSource};
pub use crate::core::repairer::SyntaxRepairer;
pub use crate::core::report::AnalysisReport;
pub use crate::core::result_aggregator::{AuditOutcome, ResultAggregator};
pub use crate::core::sanitizer::TextSanitizer;
pub use crate::core::StrengthLabel;
pub use crate::http::{AnalysisBackend, AnalysisClient, RemoteBackend};
pub use crate::utils::{mask_secret, parse_custom_headers, read_lines};
