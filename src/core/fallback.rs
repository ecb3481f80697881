use crate::core::report::{AnalysisReport, Strength, StrengthMetrics, TextBlock};
use crate::core::StrengthLabel;

/// Trivial passwords flagged as extremely common regardless of score.
pub const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "123456",
    "123456789",
    "12345678",
    "qwerty",
    "abc123",
    "111111",
    "letmein",
    "admin",
    "welcome",
    "iloveyou",
    "monkey",
];

/// Assumed offline guessing rate for the crack-time estimate.
const GUESSES_PER_SECOND: f64 = 1.0e10;

/// Character-class presence for a subject string.
struct ClassProfile {
    lower: bool,
    upper: bool,
    digit: bool,
    symbol: bool,
}

impl ClassProfile {
    fn of(subject: &str) -> Self {
        Self {
            lower: subject.chars().any(|c| c.is_ascii_lowercase()),
            upper: subject.chars().any(|c| c.is_ascii_uppercase()),
            digit: subject.chars().any(|c| c.is_ascii_digit()),
            symbol: subject.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    fn count(&self) -> u32 {
        [self.lower, self.upper, self.digit, self.symbol]
            .iter()
            .filter(|present| **present)
            .count() as u32
    }

    /// Size of the search alphabet an attacker must cover.
    fn charset_size(&self) -> f64 {
        let mut size = 0.0;
        if self.lower {
            size += 26.0;
        }
        if self.upper {
            size += 26.0;
        }
        if self.digit {
            size += 10.0;
        }
        if self.symbol {
            size += 33.0;
        }
        size
    }
}

/// Deterministic local scorer used when no structured result is
/// recoverable from the analysis service.
///
/// Pure and total: the same subject always yields the same report, with
/// no randomness and no I/O, so it is safe to call from any number of
/// concurrent requests.
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Builds a complete report from the subject password alone.
    pub fn analyze(&self, subject: &str) -> AnalysisReport {
        let score = self.score(subject);
        let label = StrengthLabel::from_score(score).to_string();
        let deficiencies = self.deficiencies(subject);

        AnalysisReport {
            strength: Some(Strength { score, label }),
            crack_time: Some(self.estimate_crack_time(subject)),
            metrics: Some(self.metrics(subject)),
            composition: Some(TextBlock::Text(self.composition(subject))),
            assessment: Some(TextBlock::List(self.assessment(&deficiencies))),
            vulnerabilities: Some(TextBlock::List(self.vulnerabilities(subject))),
            weaknesses: None,
            recommendations: Some(TextBlock::List(self.recommendations(&deficiencies))),
        }
    }

    /// 0-100 score: min(length * 3, 40) for length, 10 per present
    /// character class, 20 bonus at length >= 12, capped at 100.
    pub fn score(&self, subject: &str) -> u8 {
        let length = subject.chars().count();
        let mut score = (length * 3).min(40) as u32;
        score += 10 * ClassProfile::of(subject).count();
        if length >= 12 {
            score += 20;
        }
        score.min(100) as u8
    }

    fn composition(&self, subject: &str) -> String {
        let length = subject.chars().count();
        let category = if length < 8 {
            "too short"
        } else if length < 12 {
            "adequate"
        } else {
            "good"
        };
        let classes = ClassProfile::of(subject);
        let presence = |present: bool| if present { "present" } else { "missing" };

        format!(
            "Length {} ({}); lowercase {}, uppercase {}, digits {}, symbols {}",
            length,
            category,
            presence(classes.lower),
            presence(classes.upper),
            presence(classes.digit),
            presence(classes.symbol),
        )
    }

    fn deficiencies(&self, subject: &str) -> Vec<Deficiency> {
        let length = subject.chars().count();
        let classes = ClassProfile::of(subject);
        let mut found = Vec::new();

        if length < 8 {
            found.push(Deficiency::TooShort);
        }
        if !classes.upper {
            found.push(Deficiency::NoUppercase);
        }
        if !classes.digit {
            found.push(Deficiency::NoDigits);
        }
        if !classes.symbol {
            found.push(Deficiency::NoSymbols);
        }
        if has_repeated_run(subject, 3) {
            found.push(Deficiency::RepeatedRun);
        }
        found
    }

    fn assessment(&self, deficiencies: &[Deficiency]) -> Vec<String> {
        if deficiencies.is_empty() {
            return vec!["No structural weaknesses detected".to_string()];
        }
        deficiencies.iter().map(|d| d.finding().to_string()).collect()
    }

    fn vulnerabilities(&self, subject: &str) -> Vec<String> {
        let length = subject.chars().count();
        let mut flags = Vec::new();

        if length <= 6 {
            flags.push("Short enough to brute-force in bulk".to_string());
        }
        if !subject.is_empty() && subject.chars().all(|c| c.is_ascii_lowercase()) {
            flags.push("All-lowercase passwords are exposed to dictionary attacks".to_string());
        }
        if !subject.is_empty() && subject.chars().all(|c| c.is_ascii_digit()) {
            flags.push("All-numeric passwords are trivially guessable".to_string());
        }
        if COMMON_PASSWORDS.contains(&subject) {
            flags.push("This password is extremely common".to_string());
        }
        flags
    }

    fn recommendations(&self, deficiencies: &[Deficiency]) -> Vec<String> {
        if deficiencies.is_empty() {
            return vec![
                "Prefer a longer passphrase of unrelated words".to_string(),
                "Enable a second factor wherever this password is used".to_string(),
                "Use a unique password for every account".to_string(),
            ];
        }
        deficiencies.iter().map(|d| d.advice().to_string()).collect()
    }

    /// Human-readable brute-force duration from charset^length at a fixed
    /// offline guessing rate.
    fn estimate_crack_time(&self, subject: &str) -> String {
        let length = subject.chars().count();
        if length == 0 {
            return "instantly".to_string();
        }
        let combinations = ClassProfile::of(subject)
            .charset_size()
            .max(1.0)
            .powi(length as i32);
        let seconds = combinations / GUESSES_PER_SECOND;

        const MINUTE: f64 = 60.0;
        const HOUR: f64 = 3600.0;
        const DAY: f64 = 86_400.0;
        const YEAR: f64 = 31_557_600.0;

        if seconds < 1.0 {
            "less than a second".to_string()
        } else if seconds < MINUTE {
            format!("about {} seconds", seconds.round() as u64)
        } else if seconds < HOUR {
            format!("about {} minutes", (seconds / MINUTE).round() as u64)
        } else if seconds < DAY {
            format!("about {} hours", (seconds / HOUR).round() as u64)
        } else if seconds < YEAR {
            format!("about {} days", (seconds / DAY).round() as u64)
        } else if seconds < 100.0 * YEAR {
            format!("about {} years", (seconds / YEAR).round() as u64)
        } else {
            "centuries".to_string()
        }
    }

    fn metrics(&self, subject: &str) -> StrengthMetrics {
        let length = subject.chars().count();
        let classes = ClassProfile::of(subject);

        let length_score = ((length * 100) / 16).min(100) as u8;
        let complexity = (classes.count() * 25) as u8;
        let uniqueness = if length == 0 {
            0
        } else {
            let distinct: std::collections::HashSet<char> = subject.chars().collect();
            ((distinct.len() * 100) / length).min(100) as u8
        };

        let mut pattern: i32 = 100;
        if has_repeated_run(subject, 3) {
            pattern -= 40;
        }
        if has_sequential_run(subject, 3) {
            pattern -= 30;
        }
        if COMMON_PASSWORDS.contains(&subject) {
            pattern -= 30;
        }

        StrengthMetrics {
            length: Some(length_score),
            complexity: Some(complexity),
            uniqueness: Some(uniqueness),
            pattern: Some(pattern.max(0) as u8),
            entropy: Some(entropy_score(subject)),
        }
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// A specific shortcoming, phrased once as a finding and once as advice.
enum Deficiency {
    TooShort,
    NoUppercase,
    NoDigits,
    NoSymbols,
    RepeatedRun,
}

impl Deficiency {
    fn finding(&self) -> &'static str {
        match self {
            Deficiency::TooShort => "Too short: fewer than 8 characters",
            Deficiency::NoUppercase => "No uppercase letters",
            Deficiency::NoDigits => "No digits",
            Deficiency::NoSymbols => "No symbols",
            Deficiency::RepeatedRun => "Repeats the same character 3 or more times in a row",
        }
    }

    fn advice(&self) -> &'static str {
        match self {
            Deficiency::TooShort => "Use at least 8 characters, ideally 12 or more",
            Deficiency::NoUppercase => "Add uppercase letters",
            Deficiency::NoDigits => "Add digits",
            Deficiency::NoSymbols => "Add symbols such as ! % or #",
            Deficiency::RepeatedRun => "Avoid repeating the same character several times in a row",
        }
    }
}

fn has_repeated_run(subject: &str, run: usize) -> bool {
    let mut count = 0;
    let mut previous = None;
    for c in subject.chars() {
        if Some(c) == previous {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            previous = Some(c);
            count = 1;
        }
    }
    false
}

fn has_sequential_run(subject: &str, run: usize) -> bool {
    let chars: Vec<char> = subject.chars().collect();
    if chars.len() < run {
        return false;
    }
    for window in chars.windows(run) {
        let ascending = window
            .windows(2)
            .all(|pair| pair[1] as i64 - pair[0] as i64 == 1);
        let descending = window
            .windows(2)
            .all(|pair| pair[0] as i64 - pair[1] as i64 == 1);
        if ascending || descending {
            return true;
        }
    }
    false
}

/// Shannon entropy of the subject scaled to 0-100, full marks at 72 bits.
fn entropy_score(subject: &str) -> u8 {
    let bytes = subject.as_bytes();
    if bytes.is_empty() {
        return 0;
    }

    let mut frequencies = [0u32; 256];
    for &b in bytes {
        frequencies[b as usize] += 1;
    }

    let len = bytes.len() as f64;
    let per_char: f64 = frequencies
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / len;
            -p * p.log2()
        })
        .sum();

    let total_bits = per_char * len;
    ((total_bits * 100.0 / 72.0).min(100.0)) as u8
}
