use regex::Regex;

/// Normalizes raw analysis-service text before any decode attempt.
///
/// The remote service wraps its output in markdown fences, mixes quote
/// styles, and occasionally emits control bytes. This stage is total:
/// every input string maps to an output string, no errors.
pub struct TextSanitizer {
    json_fence: Regex,
    any_fence: Regex,
}

impl TextSanitizer {
    pub fn new() -> Self {
        Self {
            json_fence: Regex::new(r"(?s)```json[ \t]*\r?\n?(.*?)```")
                .expect("failed to build json fence pattern"),
            any_fence: Regex::new(r"(?s)```[a-zA-Z0-9]*[ \t]*\r?\n?(.*?)```")
                .expect("failed to build fence pattern"),
        }
    }

    /// Applies, in order:
    /// 1. Fence unwrapping: a ```json fence is preferred over an untagged
    ///    one; the first matching fence wins and surrounding prose is
    ///    dropped. Without a fence the whole string survives.
    /// 2. Single quotes rewritten to double quotes.
    /// 3. Bytes outside printable ASCII stripped, keeping newline and
    ///    carriage return.
    pub fn sanitize(&self, input: &str) -> String {
        let unfenced = self.extract_fenced(input);
        let normalized = unfenced.replace('\'', "\"");
        normalized
            .chars()
            .filter(|c| matches!(c, ' '..='~' | '\n' | '\r'))
            .collect()
    }

    fn extract_fenced<'a>(&self, input: &'a str) -> &'a str {
        if let Some(caps) = self.json_fence.captures(input) {
            return caps.get(1).map_or(input, |m| m.as_str());
        }
        if let Some(caps) = self.any_fence.captures(input) {
            return caps.get(1).map_or(input, |m| m.as_str());
        }
        input
    }
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_json_fence_interior() {
        let sanitizer = TextSanitizer::new();
        let input = "Here is the result:\n```json\n{\"score\": 42}\n```\nHope it helps!";
        assert_eq!(sanitizer.sanitize(input).trim(), "{\"score\": 42}");
    }

    #[test]
    fn test_prefers_json_fence_over_untagged() {
        let sanitizer = TextSanitizer::new();
        let input = "```\nnot this\n```\n```json\n{\"a\": 1}\n```";
        assert_eq!(sanitizer.sanitize(input).trim(), "{\"a\": 1}");
    }

    #[test]
    fn test_first_untagged_fence_wins() {
        let sanitizer = TextSanitizer::new();
        let input = "```\n{\"first\": true}\n```\n```\n{\"second\": true}\n```";
        assert_eq!(sanitizer.sanitize(input).trim(), "{\"first\": true}");
    }

    #[test]
    fn test_no_fence_keeps_whole_string() {
        let sanitizer = TextSanitizer::new();
        assert_eq!(sanitizer.sanitize("{\"score\": 7}"), "{\"score\": 7}");
    }

    #[test]
    fn test_rewrites_single_quotes() {
        let sanitizer = TextSanitizer::new();
        assert_eq!(sanitizer.sanitize("{'score': 7}"), "{\"score\": 7}");
    }

    #[test]
    fn test_strips_non_printable_bytes() {
        let sanitizer = TextSanitizer::new();
        let input = "{\"a\":\u{0} 1,\u{7f} \"b\": 2}\n";
        assert_eq!(sanitizer.sanitize(input), "{\"a\": 1, \"b\": 2}\n");
    }

    #[test]
    fn test_keeps_newlines_and_carriage_returns() {
        let sanitizer = TextSanitizer::new();
        assert_eq!(sanitizer.sanitize("a\r\nb"), "a\r\nb");
    }

    #[test]
    fn test_strips_non_ascii() {
        let sanitizer = TextSanitizer::new();
        assert_eq!(sanitizer.sanitize("{\"label\": \"fort\u{e9}\"}"), "{\"label\": \"fort\"}");
    }
}
