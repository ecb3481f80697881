use regex::Regex;

/// Pattern-level repair of near-JSON text.
///
/// Applies a fixed sequence of targeted substitutions that convert the
/// malformed idioms the analysis service actually produces into parseable
/// JSON. Not a grammar-aware repair: each rule is a textual rewrite,
/// later rules assume earlier rules already ran, and the output is not
/// guaranteed to parse; the decoder decides that.
pub struct SyntaxRepairer {
    range_value: Regex,
    trailing_comma: Regex,
    bare_key: Regex,
    crack_time_runon: Regex,
}

impl SyntaxRepairer {
    pub fn new() -> Self {
        Self {
            // "score": 0-100 / "score": "0-100": a range is not a number
            range_value: Regex::new(r#"(:\s*)"?\d+\s*-\s*\d+"?(\s*[,}\]])"#)
                .expect("failed to build range pattern"),
            trailing_comma: Regex::new(r",(\s*[}\]])")
                .expect("failed to build trailing comma pattern"),
            bare_key: Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:")
                .expect("failed to build bare key pattern"),
            // "crackTime": "3 days"strength": the comma and the next
            // key's opening quote were lost
            crack_time_runon: Regex::new(r#"("crack_?[tT]ime"\s*:\s*"[^"]*")\s*([A-Za-z_][A-Za-z0-9_]*)"\s*:"#)
                .expect("failed to build crack time pattern"),
        }
    }

    /// Runs the five repair rules in order:
    /// 1. numeric range values become the midpoint 50
    /// 2. trailing commas before `}` / `]` are dropped
    /// 3. bare object keys get quoted
    /// 4. the crack-time run-on is split into two fields
    /// 5. double quotes embedded in string values are re-escaped
    ///
    /// Rule 5 runs across the whole payload and can clip a valid value
    /// whose text legitimately contains `", `. Kept as-is: changing
    /// it changes which payloads repair versus fall back.
    pub fn repair(&self, input: &str) -> String {
        let pass = self.range_value.replace_all(input, "${1}50${2}");
        let pass = self.trailing_comma.replace_all(&pass, "${1}");
        let pass = self.bare_key.replace_all(&pass, "${1}\"${2}\":");
        let pass = self.crack_time_runon.replace_all(&pass, "${1}, \"${2}\":");
        escape_embedded_quotes(&pass)
    }
}

impl Default for SyntaxRepairer {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-escapes unescaped double quotes inside double-quoted string values.
///
/// A value starts at the first `"` after a colon and ends at the first
/// unescaped `"` whose next non-whitespace character is `,`, `}`, `]`, or
/// end of input. Quotes between those two points become `\"`. Keys are
/// never touched and non-string values are skipped entirely.
fn escape_embedded_quotes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        out.push(chars[i]);
        if chars[i] == ':' {
            // Copy whitespace between the colon and the value
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                out.push(chars[j]);
                j += 1;
            }
            if j < chars.len() && chars[j] == '"' {
                out.push('"');
                let end = find_value_end(&chars, j);
                for k in j + 1..end {
                    if chars[k] == '"' && chars[k - 1] != '\\' {
                        out.push('\\');
                    }
                    out.push(chars[k]);
                }
                if end < chars.len() {
                    out.push('"');
                    i = end + 1;
                    continue;
                }
                i = chars.len();
                continue;
            }
            i = j;
            continue;
        }
        i += 1;
    }
    out
}

/// Index of the closing quote of a string value opening at `start`, or
/// `chars.len()` when the value is unterminated.
fn find_value_end(chars: &[char], start: usize) -> usize {
    let mut k = start + 1;
    while k < chars.len() {
        if chars[k] == '"' && chars[k - 1] != '\\' {
            let mut next = k + 1;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            if next >= chars.len() || matches!(chars[next], ',' | '}' | ']') {
                return k;
            }
        }
        k += 1;
    }
    chars.len()
}
