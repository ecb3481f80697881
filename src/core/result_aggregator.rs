use std::io::Write;

use colored::*;
use indicatif::ProgressBar;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::recovery::ReportSource;
use crate::core::report::{AnalysisReport, TextBlock};
use crate::core::StrengthLabel;

/// One finished audit, ready for display and the output file. The subject
/// is stored masked; raw passwords never reach the terminal or disk.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutcome {
    pub subject: String,
    pub source: ReportSource,
    pub timing_ms: u128,
    pub report: AnalysisReport,
}

/// Collects audit outcomes, renders them, and appends them as JSON lines
/// to the output file.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Receives outcomes from the channel until the engine drops its
    /// senders. Batch runs get a progress bar; each outcome is printed and
    /// persisted as it arrives.
    pub async fn run(
        mut receiver: mpsc::Receiver<AuditOutcome>,
        output_path: &str,
        expected: usize,
    ) -> Vec<AuditOutcome> {
        let mut file = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_path)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("[!] Failed to open output file '{}': {}", output_path, e).red()
                );
                std::process::exit(1);
            }
        };

        let bar = if expected > 1 {
            Some(ProgressBar::new(expected as u64))
        } else {
            None
        };

        let mut results = Vec::new();

        while let Some(outcome) = receiver.recv().await {
            // Reports go to stdout; the bar draws on stderr and only
            // tracks progress.
            for line in render_outcome(&outcome) {
                println!("{}", line);
            }
            if let Some(bar) = &bar {
                bar.inc(1);
            }

            if let Ok(line) = serde_json::to_string(&outcome) {
                let _ = writeln!(file, "{}", line);
            }

            results.push(outcome);
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        results
    }

    /// Prints the end-of-run summary grouped by strength band.
    pub fn print_summary_report(results: &[AuditOutcome]) {
        println!("\n{}", "AUDIT SUMMARY :".yellow().bold());

        if results.is_empty() {
            println!("{}", "  No subjects audited.".dimmed());
            return;
        }

        let mut counts: Vec<(StrengthLabel, usize)> = Vec::new();
        for outcome in results {
            let label = outcome_label(outcome);
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }

        println!(
            "  {} subject(s) audited:\n",
            results.len().to_string().white().bold()
        );
        for (label, count) in &counts {
            println!("  {:>4}  {}", count.to_string().white().bold(), paint_label(*label));
        }

        let heuristic = results
            .iter()
            .filter(|o| o.source == ReportSource::Heuristic)
            .count();
        if heuristic > 0 {
            println!(
                "\n  {} scored with local heuristics (no structured remote result)",
                heuristic.to_string().cyan()
            );
        }

        let weak: Vec<&AuditOutcome> = results
            .iter()
            .filter(|o| matches!(outcome_label(o), StrengthLabel::VeryWeak | StrengthLabel::Weak))
            .collect();
        if !weak.is_empty() {
            println!("\n  {}", "Rotate these first:".red().bold());
            for outcome in weak {
                println!(
                    "    {} — {}",
                    outcome.subject.white(),
                    paint_label(outcome_label(outcome))
                );
            }
        }
    }
}

fn outcome_label(outcome: &AuditOutcome) -> StrengthLabel {
    let score = outcome
        .report
        .strength
        .as_ref()
        .map(|s| s.score)
        .unwrap_or(0);
    StrengthLabel::from_score(score)
}

fn paint_label(label: StrengthLabel) -> ColoredString {
    let text = label.to_string();
    match label {
        StrengthLabel::VeryStrong => text.green().bold(),
        StrengthLabel::Strong => text.green(),
        StrengthLabel::Medium => text.yellow(),
        StrengthLabel::Weak => text.red(),
        StrengthLabel::VeryWeak => text.red().bold(),
    }
}

/// Trims service debris from the crack-time text at display time: the
/// leading "It would take"/"approximately" phrasing and the literal
/// trailing set `"',}`.
pub fn clean_crack_time(raw: &str) -> String {
    let mut text = raw.trim();
    for prefix in ["It would take ", "it would take ", "Approximately ", "approximately "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
        }
    }
    text.trim_end_matches(['"', '\'', ',', '}']).trim().to_string()
}

fn render_outcome(outcome: &AuditOutcome) -> Vec<String> {
    let report = &outcome.report;
    let mut lines = Vec::new();

    let (score, label) = match &report.strength {
        Some(strength) => (strength.score, StrengthLabel::from_score(strength.score)),
        None => (0, StrengthLabel::VeryWeak),
    };

    lines.push(format!(
        "\n{} {} — {} ({}/100)",
        "[+]".green().bold(),
        outcome.subject.white().bold(),
        paint_label(label),
        score.to_string().cyan()
    ));
    lines.push(format!("    Source:      {}", outcome.source.to_string().blue()));

    if let Some(crack_time) = &report.crack_time {
        lines.push(format!(
            "    Crack time:  {}",
            clean_crack_time(crack_time).bright_yellow()
        ));
    }

    if let Some(metrics) = &report.metrics {
        // Missing dimensions render as 0 by contract
        lines.push(format!(
            "    Metrics:     length {} | complexity {} | uniqueness {} | pattern {} | entropy {}",
            metrics.length.unwrap_or(0),
            metrics.complexity.unwrap_or(0),
            metrics.uniqueness.unwrap_or(0),
            metrics.pattern.unwrap_or(0),
            metrics.entropy.unwrap_or(0),
        ));
    }

    if let Some(composition) = &report.composition {
        push_block(&mut lines, "Composition", composition);
    }
    if let Some(assessment) = &report.assessment {
        push_block(&mut lines, "Assessment", assessment);
    }
    if let Some(vulnerabilities) = &report.vulnerabilities {
        push_block(&mut lines, "Vulnerabilities", vulnerabilities);
    }
    if let Some(weaknesses) = &report.weaknesses {
        push_block(&mut lines, "Weaknesses", weaknesses);
    }
    if let Some(recommendations) = &report.recommendations {
        push_block(&mut lines, "Recommendations", recommendations);
    }

    lines.push(format!(
        "    Info:        Time [{}ms]",
        outcome.timing_ms.to_string().dimmed()
    ));
    lines.push("──────────────────────────────────────────".dimmed().to_string());
    lines
}

fn push_block(lines: &mut Vec<String>, title: &str, block: &TextBlock) {
    if block.is_empty() {
        return;
    }
    match block {
        TextBlock::Text(text) => {
            lines.push(format!("    {:<12} {}", format!("{}:", title), text));
        }
        TextBlock::List(items) => {
            lines.push(format!("    {}:", title));
            for item in items {
                lines.push(format!("      - {}", item));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::Strength;

    fn outcome_with_crack_time(crack_time: &str) -> AuditOutcome {
        AuditOutcome {
            subject: "a***z".to_string(),
            source: ReportSource::Remote,
            timing_ms: 3,
            report: AnalysisReport {
                strength: Some(Strength {
                    score: 50,
                    label: "Medium".to_string(),
                }),
                crack_time: Some(crack_time.to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_clean_crack_time_strips_prefix_phrase() {
        assert_eq!(clean_crack_time("It would take 3 days"), "3 days");
        assert_eq!(clean_crack_time("approximately 2 hours"), "2 hours");
    }

    #[test]
    fn test_clean_crack_time_strips_trailing_debris() {
        assert_eq!(clean_crack_time("3 days\","), "3 days");
        assert_eq!(clean_crack_time("3 days'}"), "3 days");
        assert_eq!(clean_crack_time("centuries"), "centuries");
    }

    #[test]
    fn test_clean_crack_time_keeps_inner_punctuation() {
        assert_eq!(clean_crack_time("3 days, give or take"), "3 days, give or take");
    }

    #[test]
    fn test_render_includes_cleaned_crack_time() {
        let outcome = outcome_with_crack_time("It would take 3 days\",");
        let rendered = render_outcome(&outcome).join("\n");
        assert!(rendered.contains("3 days"));
        assert!(!rendered.contains("It would take"));
    }

    #[test]
    fn test_render_defaults_missing_metric_dimensions_to_zero() {
        let mut outcome = outcome_with_crack_time("x");
        outcome.report.metrics = Some(crate::core::report::StrengthMetrics {
            length: Some(80),
            ..Default::default()
        });
        let rendered = render_outcome(&outcome).join("\n");
        assert!(rendered.contains("length 80"));
        assert!(rendered.contains("entropy 0"));
    }

    #[test]
    fn test_render_never_prints_raw_subject() {
        let outcome = outcome_with_crack_time("x");
        let rendered = render_outcome(&outcome).join("\n");
        assert!(rendered.contains("a***z"));
    }
}
