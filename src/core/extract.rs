// ReconLog - core/extract.rs
//
// Numeric field extraction from semi-structured text lines.

use regex::Regex;

/// How a field's keyword is recognised inside a line.
#[derive(Debug, Clone)]
pub enum KeywordMatch {
    /// Plain substring test. `WM` also matches inside `cWMx`.
    Substring(String),
    /// Keyword delimited by word boundaries.
    Word(Regex),
}

impl KeywordMatch {
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Substring(keyword) => line.contains(keyword.as_str()),
            Self::Word(re) => re.is_match(line),
        }
    }
}

/// A named numeric field: the label it is stored under, the name used in
/// fixed-row tables, how to spot it, and a pattern whose first capture group
/// is the value.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub label: String,
    pub display: String,
    pub keyword: KeywordMatch,
    pub pattern: Regex,
}

impl FieldPattern {
    /// Whether `line` mentions this field's keyword at all.
    pub fn mentions(&self, line: &str) -> bool {
        self.keyword.is_match(line)
    }

    /// First value for this field in `line`, if any.
    pub fn extract(&self, line: &str) -> Option<f64> {
        extract(line, &self.pattern)
    }
}

/// Apply `pattern` to `line` and parse its first capture group as a float.
///
/// Absence of a match, or a capture that does not parse, yields `None`.
pub fn extract(line: &str, pattern: &Regex) -> Option<f64> {
    let caps = pattern.captures(line)?;
    let raw = caps.get(1)?.as_str();
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::debug!(raw, pattern = pattern.as_str(), "Captured text is not a number");
            None
        }
    }
}

/// Extract every field in `fields` from one line independently. Fields that
/// do not match map to `None`; a miss never blocks the others.
pub fn extract_all<'a>(
    line: &str,
    fields: &'a [FieldPattern],
) -> Vec<(&'a FieldPattern, Option<f64>)> {
    fields.iter().map(|f| (f, f.extract(line))).collect()
}
