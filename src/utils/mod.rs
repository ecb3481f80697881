use std::fs::File;
use std::io;
use std::io::BufRead;
use std::path::Path;

/// Reads a password list file, returning all non-empty lines. Lines are
/// NOT trimmed beyond the newline: leading and trailing spaces can be
/// part of a password.
pub fn read_lines(path: &str) -> io::Result<Vec<String>> {
    let file = File::open(Path::new(path))?;
    let reader = io::BufReader::new(file);
    let lines = reader
        .lines()
        .filter_map(|line| {
            let line = line.ok()?;
            if line.is_empty() {
                None
            } else {
                Some(line)
            }
        })
        .collect();
    Ok(lines)
}

/// Parses "Name: value" header arguments, skipping malformed entries.
pub fn parse_custom_headers(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|h| {
            let mut parts = h.splitn(2, ':');
            let key = parts.next()?.trim().to_string();
            let val = parts.next().unwrap_or("").trim().to_string();
            if key.is_empty() {
                return None;
            }
            Some((key, val))
        })
        .collect()
}

/// Masks a secret for display and persistence: first and last character
/// kept, everything between replaced. Never returns the raw secret.
pub fn mask_secret(subject: &str) -> String {
    let chars: Vec<char> = subject.chars().collect();
    match chars.len() {
        0 => "(empty)".to_string(),
        1 | 2 => "*".repeat(chars.len()),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_headers() {
        let raw = vec![
            "Authorization: Bearer token".to_string(),
            "X-Empty:".to_string(),
            ": broken".to_string(),
        ];
        let parsed = parse_custom_headers(&raw);
        assert_eq!(
            parsed,
            vec![
                ("Authorization".to_string(), "Bearer token".to_string()),
                ("X-Empty".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(empty)");
        assert_eq!(mask_secret("a"), "*");
        assert_eq!(mask_secret("ab"), "**");
        assert_eq!(mask_secret("abc"), "a*c");
        assert_eq!(mask_secret("Tr0ub4dor&3"), "T*********3");
    }

    #[test]
    fn test_mask_secret_never_leaks() {
        for subject in ["hunter2", "correct horse", "pw"] {
            assert!(!mask_secret(subject).contains(subject));
        }
    }
}
