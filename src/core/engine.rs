use std::sync::Arc;
use std::time::Instant;

use futures::{stream, StreamExt};
use log::warn;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::core::recovery::RecoveryPipeline;
use crate::core::result_aggregator::AuditOutcome;
use crate::http::AnalysisBackend;
use crate::utils::mask_secret;

/// Drives the audit for a batch of subjects.
///
/// Each subject is submitted to the remote backend (when one is
/// configured), its payload is run through the recovery pipeline, and the
/// outcome is sent to the aggregator over the channel. Remote failures
/// degrade to local heuristics, so a subject never produces no result.
pub struct AuditEngine {
    backend: Option<Arc<dyn AnalysisBackend>>,
    concurrency_limit: usize,
}

impl AuditEngine {
    pub fn new(backend: Option<Arc<dyn AnalysisBackend>>, concurrency_limit: usize) -> Self {
        Self {
            backend,
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// Audits all subjects with bounded concurrency. Dropping the sender
    /// when done lets the aggregator finish.
    pub async fn run(self, subjects: Vec<String>, result_tx: mpsc::Sender<AuditOutcome>) {
        let pipeline = Arc::new(RecoveryPipeline::new());

        stream::iter(subjects)
            .map(|subject| {
                let backend = self.backend.clone();
                let pipeline = Arc::clone(&pipeline);
                let tx = result_tx.clone();

                async move {
                    let start = Instant::now();

                    let payload = match backend {
                        Some(backend) => match backend.analyze(&subject).await {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!(
                                    "remote analysis failed for {}: {}",
                                    mask_secret(&subject),
                                    e
                                );
                                Value::Null
                            }
                        },
                        None => Value::Null,
                    };

                    let (report, source) = pipeline.recover(payload, &subject);
                    let outcome = AuditOutcome {
                        subject: mask_secret(&subject),
                        source,
                        timing_ms: start.elapsed().as_millis(),
                        report,
                    };

                    let _ = tx.send(outcome).await;
                }
            })
            .buffer_unordered(self.concurrency_limit)
            .collect::<Vec<()>>()
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recovery::ReportSource;
    use anyhow::bail;
    use serde_json::json;

    struct CannedBackend {
        payload: Value,
    }

    #[async_trait::async_trait]
    impl AnalysisBackend for CannedBackend {
        async fn analyze(&self, _subject: &str) -> anyhow::Result<Value> {
            Ok(self.payload.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct FailingBackend;

    #[async_trait::async_trait]
    impl AnalysisBackend for FailingBackend {
        async fn analyze(&self, _subject: &str) -> anyhow::Result<Value> {
            bail!("connection refused")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    async fn run_engine(
        backend: Option<Arc<dyn AnalysisBackend>>,
        subjects: Vec<String>,
    ) -> Vec<AuditOutcome> {
        let engine = AuditEngine::new(backend, 4);
        let (tx, mut rx) = mpsc::channel(16);

        let collect = async {
            let mut outcomes = Vec::new();
            while let Some(outcome) = rx.recv().await {
                outcomes.push(outcome);
            }
            outcomes
        };

        let (_, outcomes) = tokio::join!(engine.run(subjects, tx), collect);
        outcomes
    }

    #[tokio::test]
    async fn test_offline_engine_uses_heuristics() {
        let outcomes = run_engine(None, vec!["Tr0ub4dor&3".to_string()]).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].source, ReportSource::Heuristic);
        assert_eq!(outcomes[0].report.strength.as_ref().unwrap().score, 73);
    }

    #[tokio::test]
    async fn test_remote_payload_recovered() {
        let backend = Arc::new(CannedBackend {
            payload: json!({
                "strength": {"score": 42, "label": "Medium"},
                "recommendations": ["x"]
            }),
        });
        let outcomes = run_engine(Some(backend), vec!["secret".to_string()]).await;
        assert_eq!(outcomes[0].source, ReportSource::Remote);
        assert_eq!(outcomes[0].report.strength.as_ref().unwrap().score, 42);
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_heuristics() {
        let outcomes = run_engine(Some(Arc::new(FailingBackend)), vec!["abc".to_string()]).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].source, ReportSource::Heuristic);
    }

    #[tokio::test]
    async fn test_every_subject_produces_an_outcome() {
        let subjects: Vec<String> = (0..20).map(|i| format!("pw-{}", i)).collect();
        let outcomes = run_engine(None, subjects).await;
        assert_eq!(outcomes.len(), 20);
    }

    #[tokio::test]
    async fn test_subject_is_masked_in_outcome() {
        let outcomes = run_engine(None, vec!["Tr0ub4dor&3".to_string()]).await;
        assert!(!outcomes[0].subject.contains("Tr0ub4dor&3"));
        assert!(outcomes[0].subject.starts_with('T'));
    }
}
