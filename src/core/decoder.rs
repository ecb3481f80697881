use log::debug;
use serde_json::Value;

use crate::core::repairer::SyntaxRepairer;
use crate::core::sanitizer::TextSanitizer;

/// Candidate payload fields probed for embedded structured text, in
/// priority order. The first one that decodes wins.
pub const CANDIDATE_FIELDS: [&str; 4] = ["raw_response", "analysis", "response", "data"];

/// Best-effort structured decode of an untrusted analysis payload.
///
/// Decode failures never propagate: a field that cannot be repaired into
/// valid JSON is simply skipped, and a payload with nothing recoverable is
/// returned unchanged so the caller can fall back to local heuristics.
pub struct TolerantDecoder {
    sanitizer: TextSanitizer,
    repairer: SyntaxRepairer,
}

impl TolerantDecoder {
    pub fn new() -> Self {
        Self {
            sanitizer: TextSanitizer::new(),
            repairer: SyntaxRepairer::new(),
        }
    }

    /// Resolves a raw payload to its most structured form.
    ///
    /// 1. An object already carrying `strength` and `recommendations` is
    ///    returned unchanged.
    /// 2. A bare string is sanitized, repaired, and decoded; on failure the
    ///    original string is returned as the base.
    /// 3. Otherwise each candidate field holding a string is tried in
    ///    order; the first that decodes to an object is merged onto the
    ///    base, decoded fields winning on collision.
    /// 4. With no decodable candidate the base comes back unmodified,
    ///    which signals the caller to use the fallback scorer.
    pub fn decode(&self, payload: Value) -> Value {
        match payload {
            Value::Object(map) => {
                if map.contains_key("strength") && map.contains_key("recommendations") {
                    return Value::Object(map);
                }

                let mut base = map;
                for field in CANDIDATE_FIELDS {
                    let text = match base.get(field) {
                        Some(Value::String(s)) => s.clone(),
                        _ => continue,
                    };
                    match self.decode_text(&text) {
                        Some(Value::Object(decoded)) => {
                            for (key, value) in decoded {
                                base.insert(key, value);
                            }
                            return Value::Object(base);
                        }
                        Some(other) => {
                            debug!(
                                "candidate field '{}' decoded to non-object ({}), skipping",
                                field,
                                value_kind(&other)
                            );
                        }
                        None => {
                            debug!("candidate field '{}' did not decode, skipping", field);
                        }
                    }
                }
                Value::Object(base)
            }
            Value::String(text) => match self.decode_text(&text) {
                Some(decoded) => decoded,
                None => Value::String(text),
            },
            other => other,
        }
    }

    fn decode_text(&self, text: &str) -> Option<Value> {
        let cleaned = self.sanitizer.sanitize(text);
        let repaired = self.repairer.repair(&cleaned);
        match serde_json::from_str(&repaired) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("tolerant decode failed: {}", e);
                None
            }
        }
    }
}

impl Default for TolerantDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
