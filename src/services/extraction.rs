use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, AppResult};

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";
const LOG_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Object,
    Array,
}

impl ShapeKind {
    fn delimiters(self) -> (char, char) {
        match self {
            ShapeKind::Object => ('{', '}'),
            ShapeKind::Array => ('[', ']'),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ShapeKind::Object => value.is_object(),
            ShapeKind::Array => value.is_array(),
        }
    }
}

/// Expected structure of a generated payload
///
/// For an array shape, required keys and list lengths apply to every element.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    required_keys: Vec<&'static str>,
    list_lengths: Vec<(&'static str, usize)>,
    min_entries: usize,
}

impl Shape {
    pub fn object() -> Self {
        Self::new(ShapeKind::Object)
    }

    pub fn array() -> Self {
        Self::new(ShapeKind::Array)
    }

    fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            required_keys: Vec::new(),
            list_lengths: Vec::new(),
            min_entries: 0,
        }
    }

    pub fn require(mut self, key: &'static str) -> Self {
        self.required_keys.push(key);
        self
    }

    /// Requires `key` to hold a list of exactly `len` elements
    pub fn with_list_len(mut self, key: &'static str, len: usize) -> Self {
        self.list_lengths.push((key, len));
        self
    }

    /// Minimum number of keys (object) or elements (array)
    pub fn min_entries(mut self, min: usize) -> Self {
        self.min_entries = min;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::Object(map) => {
                if map.len() < self.min_entries {
                    return Err(format!(
                        "expected at least {} keys, found {}",
                        self.min_entries,
                        map.len()
                    ));
                }
                self.validate_fields(value)
            }
            Value::Array(items) => {
                if items.len() < self.min_entries {
                    return Err(format!(
                        "expected at least {} elements, found {}",
                        self.min_entries,
                        items.len()
                    ));
                }
                items
                    .iter()
                    .enumerate()
                    .try_for_each(|(index, item)| {
                        self.validate_fields(item)
                            .map_err(|e| format!("element {}: {}", index, e))
                    })
            }
            _ => Err("payload is neither an object nor an array".to_string()),
        }
    }

    fn validate_fields(&self, value: &Value) -> Result<(), String> {
        if self.required_keys.is_empty() && self.list_lengths.is_empty() {
            return Ok(());
        }
        let map = value
            .as_object()
            .ok_or_else(|| "expected an object".to_string())?;

        if let Some(missing) = self.required_keys.iter().find(|key| !map.contains_key(**key)) {
            return Err(format!("missing required key '{}'", missing));
        }

        for (key, expected) in &self.list_lengths {
            match map.get(*key).and_then(Value::as_array) {
                Some(list) if list.len() == *expected => {}
                Some(list) => {
                    return Err(format!(
                        "'{}' has {} elements, expected {}",
                        key,
                        list.len(),
                        expected
                    ))
                }
                None => return Err(format!("'{}' is not a list", key)),
            }
        }

        Ok(())
    }
}

/// Extracts a structured payload of `shape` out of raw generated text
///
/// Tries, in order: the content of the first fenced block (a `json`-tagged fence
/// wins over an untagged one), then the whole text. Each candidate is parsed as-is
/// and, failing that, by its first balanced `{...}` / `[...]` span. The first
/// candidate that parses into the expected kind is validated against `shape`.
pub fn extract(raw: &str, shape: &Shape) -> AppResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::MalformedGeneratedPayload(
            "empty generated text".to_string(),
        ));
    }

    let candidates = fenced_block(trimmed).into_iter().chain(Some(trimmed));

    for candidate in candidates {
        if let Some(value) = parse_candidate(candidate, shape.kind) {
            return shape
                .validate(&value)
                .map(|_| value)
                .map_err(AppError::MalformedGeneratedPayload);
        }
    }

    Err(AppError::MalformedGeneratedPayload(format!(
        "no parseable {:?} found in generated text",
        shape.kind
    )))
}

/// Like [`extract`], then deserializes the payload into `T`
pub fn extract_as<T: DeserializeOwned>(raw: &str, shape: &Shape) -> AppResult<T> {
    let value = extract(raw, shape)?;
    serde_json::from_value(value)
        .map_err(|e| AppError::MalformedGeneratedPayload(format!("unexpected payload: {}", e)))
}

/// Like [`extract_as`], falling back to `default` on any failure
///
/// Failures are logged and never propagated, so one bad generation cannot fail
/// the request that asked for it.
pub fn extract_or<T: DeserializeOwned>(raw: &str, shape: &Shape, default: T) -> T {
    match extract_as(raw, shape) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                error = %e,
                raw = %preview(raw),
                "Falling back to default for generated payload"
            );
            default
        }
    }
}

/// Extracts a single plain-text name from generated text
///
/// Takes the first non-empty line outside of fences and strips surrounding
/// quotes, brackets and list markers.
pub fn extract_plain_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let body = fenced_block(trimmed).unwrap_or(trimmed);

    body.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*'])
                .trim_matches(|c: char| {
                    c.is_whitespace() || matches!(c, '"' | '\'' | '[' | ']' | '`')
                })
        })
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn parse_candidate(candidate: &str, kind: ShapeKind) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        if kind.matches(&value) {
            return Some(value);
        }
    }

    let (open, close) = kind.delimiters();
    balanced_spans(candidate, open, close)
        .filter_map(|span| serde_json::from_str::<Value>(span).ok())
        .find(|value| kind.matches(value))
}

/// Content of the first fenced block, preferring a `json`-tagged fence
fn fenced_block(text: &str) -> Option<&str> {
    let content_start = match text.to_ascii_lowercase().find(JSON_FENCE) {
        Some(position) => position + JSON_FENCE.len(),
        None => {
            let after = text.find(FENCE)? + FENCE.len();
            // Skip a language tag on the fence line
            match text[after..].find('\n') {
                Some(newline)
                    if text[after..after + newline]
                        .trim()
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric()) =>
                {
                    after + newline + 1
                }
                _ => after,
            }
        }
    };

    let body = &text[content_start..];
    let end = body.find(FENCE).unwrap_or(body.len());
    Some(body[..end].trim())
}

/// Top-level balanced spans delimited by `open`/`close`, in order of appearance
///
/// Delimiters inside JSON string literals are ignored.
fn balanced_spans(text: &str, open: char, close: char) -> impl Iterator<Item = &str> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while cursor < text.len() {
            let start = cursor + text[cursor..].find(open)?;
            match balanced_end(&text[start..], open, close) {
                Some(len) => {
                    cursor = start + len;
                    return Some(&text[start..start + len]);
                }
                None => cursor = start + open.len_utf8(),
            }
        }
        None
    })
}

fn balanced_end(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(offset + ch.len_utf8());
            }
        }
    }

    None
}

fn preview(raw: &str) -> String {
    raw.chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_fenced_json() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_untagged_fence() {
        let raw = "Here you go:\n```\n{\"a\": 2}\n```\nEnjoy!";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"a": 2}));
    }

    #[test]
    fn test_extract_prefers_json_tagged_fence() {
        let raw = "```text\nnot it\n```\n```json\n{\"a\": 3}\n```";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"a": 3}));
    }

    #[test]
    fn test_extract_unfenced_noisy_text() {
        let raw = "Sure! {\"a\":1} enjoy";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_first_balanced_span_wins() {
        let raw = "first {\"a\": 1} then {\"b\": 2}";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let raw = "note: {\"title\": \"Braces } inside {\", \"n\": 1} trailing }";
        assert_eq!(
            extract(raw, &Shape::object()).unwrap(),
            json!({"title": "Braces } inside {", "n": 1})
        );
    }

    #[test]
    fn test_extract_skips_unparseable_span() {
        let raw = "{placeholder} then {\"a\": 1}";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_malformed_fence_falls_back_to_text() {
        let raw = "```json\n{\"a\": \n```\n{\"b\": 1}";
        assert_eq!(extract(raw, &Shape::object()).unwrap(), json!({"b": 1}));
    }

    #[test]
    fn test_extract_array_shape() {
        let raw = "Result: [{\"title\": \"Heat\"}, {\"title\": \"Alien\"}] done";
        let shape = Shape::array().require("title");
        assert_eq!(
            extract(raw, &shape).unwrap(),
            json!([{"title": "Heat"}, {"title": "Alien"}])
        );
    }

    #[test]
    fn test_extract_non_json_text_fails() {
        let result = extract("I cannot help with that.", &Shape::object());
        assert!(matches!(
            result,
            Err(AppError::MalformedGeneratedPayload(_))
        ));
    }

    #[test]
    fn test_extract_or_returns_default_for_non_json() {
        let value: Value = extract_or("no json here", &Shape::object(), json!({"default": true}));
        assert_eq!(value, json!({"default": true}));
    }

    #[test]
    fn test_missing_required_key_fails() {
        let shape = Shape::object().require("recommendations");
        assert!(extract("{\"other\": []}", &shape).is_err());
    }

    #[test]
    fn test_list_arity_enforced() {
        let shape = Shape::object()
            .require("recommendations")
            .with_list_len("recommendations", 2);

        assert!(extract("{\"recommendations\": [\"a\", \"b\"]}", &shape).is_ok());
        assert!(extract("{\"recommendations\": [\"a\"]}", &shape).is_err());
        assert!(extract("{\"recommendations\": \"a\"}", &shape).is_err());
    }

    #[test]
    fn test_min_entries_enforced() {
        let shape = Shape::object().min_entries(2);
        assert!(extract("{\"movies\": \"Heat\"}", &shape).is_err());
        assert!(extract("{\"movies\": \"Heat\", \"books\": \"Dune\"}", &shape).is_ok());
    }

    #[test]
    fn test_array_elements_validated() {
        let shape = Shape::array().require("title");
        assert!(extract("[{\"title\": \"a\"}, {\"name\": \"b\"}]", &shape).is_err());
    }

    #[test]
    fn test_extract_as_type_mismatch_fails() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Pair {
            recommendations: Vec<String>,
        }

        let result: AppResult<Pair> = extract_as("{\"recommendations\": 5}", &Shape::object());
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_plain_name() {
        assert_eq!(
            extract_plain_name("  \"The Grand Budapest Hotel\"\n").as_deref(),
            Some("The Grand Budapest Hotel")
        );
        assert_eq!(
            extract_plain_name("```\n[Dune]\n```").as_deref(),
            Some("Dune")
        );
        assert_eq!(extract_plain_name("\n - Heat\nextra").as_deref(), Some("Heat"));
        assert_eq!(extract_plain_name("   "), None);
    }

    #[test]
    fn test_extract_plain_name_keeps_trailing_period() {
        assert_eq!(
            extract_plain_name("\"Harry Potter and the Goblet of Fire\"\n").as_deref(),
            Some("Harry Potter and the Goblet of Fire")
        );
        assert_eq!(
            extract_plain_name("Sammy Davis Jr.").as_deref(),
            Some("Sammy Davis Jr.")
        );
    }

    #[test]
    fn test_balanced_spans_unterminated() {
        let spans: Vec<&str> = balanced_spans("{ \"a\": 1", '{', '}').collect();
        assert!(spans.is_empty());
    }
}
