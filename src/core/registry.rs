// ReconLog - core/registry.rs
//
// Declarative field registries: loading, validation, and compilation.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::registry_mgr which feeds content here.

use crate::core::extract::{FieldPattern, KeywordMatch};
use crate::util::constants;
use crate::util::error::RegistryError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML registry definition as deserialized from a .toml file.
/// This is validated and compiled into a `FieldRegistry` for runtime use.
#[derive(Debug, Deserialize)]
pub struct RegistryDefinition {
    pub registry: RegistryMeta,
    #[serde(default)]
    pub scan: ScanDef,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ScanDef {
    /// Only lines matching this regex are considered, when set.
    #[serde(default)]
    pub line_marker: Option<String>,
    #[serde(default)]
    pub attribution: Attribution,
    /// Value regex with one capture group, shared by all fields.
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldDef {
    pub label: String,
    #[serde(default)]
    pub display: Option<String>,
    /// Token that introduces the value. Defaults to the label.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub separator: Option<String>,
    /// Full value regex; replaces keyword + separator + number when set.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// How lines are attributed to fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attribution {
    /// Every field is sought independently on every considered line.
    #[default]
    AllFields,
    /// A line belongs to the first field (in declaration order) whose
    /// keyword it mentions, and to no other.
    FirstKeyword,
}

/// Options applied while compiling registries.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Anchor keywords with `\b` so a label cannot match inside a longer word.
    /// A number may still follow the keyword directly (`cGM12.3`).
    pub word_boundary: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            word_boundary: constants::DEFAULT_WORD_BOUNDARY,
        }
    }
}

// =============================================================================
// Compiled registry
// =============================================================================

/// A validated, compiled set of field patterns for one extraction task.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub line_marker: Option<Regex>,
    pub attribution: Attribution,
    pub fields: Vec<FieldPattern>,
    pub is_builtin: bool,
}

impl FieldRegistry {
    /// Whether `line` is one this registry reads fields from.
    pub fn considers(&self, line: &str) -> bool {
        self.line_marker
            .as_ref()
            .map_or(true, |marker| marker.is_match(line))
    }

    pub fn field(&self, label: &str) -> Option<&FieldPattern> {
        self.fields.iter().find(|f| f.label == label)
    }
}

/// Parse a TOML string into a `RegistryDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_registry_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<RegistryDefinition, RegistryError> {
    toml::from_str(toml_content).map_err(|e| RegistryError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `RegistryDefinition` and compile it into a `FieldRegistry`.
///
/// Validates:
/// - id, name, and at least one field are present
/// - labels are unique and non-empty
/// - every regex compiles, is within the length limit, and every value
///   pattern has a capture group
pub fn validate_and_compile(
    def: RegistryDefinition,
    options: CompileOptions,
    is_builtin: bool,
) -> Result<FieldRegistry, RegistryError> {
    let id = def.registry.id.clone();

    if id.is_empty() {
        return Err(RegistryError::MissingField {
            registry_id: "(empty)".to_string(),
            field: "registry.id",
        });
    }
    if def.registry.name.is_empty() {
        return Err(RegistryError::MissingField {
            registry_id: id,
            field: "registry.name",
        });
    }
    if def.fields.is_empty() {
        return Err(RegistryError::MissingField {
            registry_id: id,
            field: "field",
        });
    }
    if def.fields.len() > constants::MAX_REGISTRY_FIELDS {
        return Err(RegistryError::TooManyFields {
            registry_id: id,
            count: def.fields.len(),
            max: constants::MAX_REGISTRY_FIELDS,
        });
    }

    let line_marker = match def.scan.line_marker.as_deref() {
        Some(marker) if !marker.is_empty() => {
            Some(compile_regex(&id, "scan.line_marker", marker)?)
        }
        _ => None,
    };

    let number = def
        .scan
        .number
        .as_deref()
        .unwrap_or(constants::DEFAULT_NUMBER_PATTERN);

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(def.fields.len());
    for field in def.fields {
        if field.label.is_empty() {
            return Err(RegistryError::MissingField {
                registry_id: id,
                field: "field.label",
            });
        }
        if !seen.insert(field.label.clone()) {
            return Err(RegistryError::DuplicateLabel {
                registry_id: id,
                label: field.label,
            });
        }
        fields.push(compile_field(&id, field, number, options)?);
    }

    tracing::debug!(
        registry_id = %id,
        fields = fields.len(),
        word_boundary = options.word_boundary,
        "Registry compiled"
    );

    Ok(FieldRegistry {
        id,
        name: def.registry.name,
        description: def.registry.description,
        line_marker,
        attribution: def.scan.attribution,
        fields,
        is_builtin,
    })
}

fn compile_field(
    registry_id: &str,
    def: FieldDef,
    number: &str,
    options: CompileOptions,
) -> Result<FieldPattern, RegistryError> {
    let keyword_text = def.keyword.unwrap_or_else(|| def.label.clone());
    if keyword_text.is_empty() {
        return Err(RegistryError::MissingField {
            registry_id: registry_id.to_string(),
            field: "field.keyword",
        });
    }
    let escaped = regex::escape(&keyword_text);
    let boundary = if options.word_boundary { r"\b" } else { "" };

    let pattern_text = match def.pattern {
        Some(p) => p,
        None => {
            let separator = def
                .separator
                .as_deref()
                .unwrap_or(constants::DEFAULT_FIELD_SEPARATOR);
            format!("{boundary}{escaped}{separator}{number}")
        }
    };
    let pattern = compile_regex(
        registry_id,
        &format!("field '{}' pattern", def.label),
        &pattern_text,
    )?;
    if pattern.captures_len() < 2 {
        return Err(RegistryError::NoCaptureGroup {
            registry_id: registry_id.to_string(),
            label: def.label,
            pattern: pattern_text,
        });
    }

    let keyword = if options.word_boundary {
        KeywordMatch::Word(compile_regex(
            registry_id,
            &format!("field '{}' keyword", def.label),
            &format!(r"\b{escaped}(?:\b|[0-9])"),
        )?)
    } else {
        KeywordMatch::Substring(keyword_text)
    };

    Ok(FieldPattern {
        display: def.display.unwrap_or_else(|| def.label.clone()),
        label: def.label,
        keyword,
        pattern,
    })
}

/// Compile a regex pattern with length validation to prevent ReDoS.
fn compile_regex(registry_id: &str, field: &str, pattern: &str) -> Result<Regex, RegistryError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(RegistryError::RegexTooLong {
            registry_id: registry_id.to_string(),
            field: field.to_string(),
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    Regex::new(pattern).map_err(|e| RegistryError::InvalidRegex {
        registry_id: registry_id.to_string(),
        field: field.to_string(),
        pattern: pattern.to_string(),
        source: e,
    })
}

// =============================================================================
// Built-in registries (embedded at compile time)
// =============================================================================

/// Embedded TOML content for built-in registries.
/// Each tuple is (filename, TOML content).
pub fn builtin_registry_sources() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "svr_metrics.toml",
            include_str!("../../registries/svr_metrics.toml"),
        ),
        ("volumes.toml", include_str!("../../registries/volumes.toml")),
    ]
}

/// Load and validate all built-in registries.
///
/// A built-in that fails validation is logged and skipped; the unit tests
/// below keep that from happening in a release.
pub fn load_builtin_registries(options: CompileOptions) -> Vec<FieldRegistry> {
    let mut registries = Vec::new();

    for (filename, content) in builtin_registry_sources() {
        let path = Path::new("builtin").join(filename);
        let compiled = parse_registry_toml(content, &path)
            .and_then(|def| validate_and_compile(def, options, true));
        match compiled {
            Ok(registry) => registries.push(registry),
            Err(e) => {
                tracing::error!(file = filename, error = %e, "Built-in registry failed to load");
            }
        }
    }

    registries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(toml: &str, word_boundary: bool) -> Result<FieldRegistry, RegistryError> {
        let def = parse_registry_toml(toml, Path::new("test.toml"))?;
        validate_and_compile(def, CompileOptions { word_boundary }, false)
    }

    #[test]
    fn test_builtins_compile() {
        let registries = load_builtin_registries(CompileOptions::default());
        let ids: Vec<_> = registries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                constants::SVR_METRICS_REGISTRY_ID,
                constants::VOLUMES_REGISTRY_ID
            ]
        );

        let volumes = &registries[1];
        let labels: Vec<_> = volumes.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["cGM", "WM", "dGM", "CER", "CSF", "TBV"]);
        assert_eq!(volumes.attribution, Attribution::FirstKeyword);
        assert_eq!(volumes.field("WM").unwrap().display, "White Matter");
    }

    #[test]
    fn test_builtins_compile_in_substring_mode() {
        let registries = load_builtin_registries(CompileOptions {
            word_boundary: false,
        });
        assert_eq!(registries.len(), 2);
    }

    #[test]
    fn test_svr_marker() {
        let registries = load_builtin_registries(CompileOptions::default());
        let svr = &registries[0];
        assert!(svr.considers("  - global metrics: ncc=0.9"));
        assert!(svr.considers("global metrics: ncc=0.9"));
        assert!(!svr.considers("iteration 2 global metrics: ncc=0.9"));
    }

    #[test]
    fn test_generated_pattern_respects_word_boundary() {
        let toml = r#"
[registry]
id = "t"
name = "T"

[[field]]
label = "WM"
"#;
        let strict = compile(toml, true).unwrap();
        let wm = strict.field("WM").unwrap();
        assert_eq!(wm.extract("WM 12.5"), Some(12.5));
        assert_eq!(wm.extract("TotalWM 99"), None);
        assert!(wm.mentions("WM12.5"));
        assert_eq!(wm.extract("WM12.5"), Some(12.5));
        assert!(!wm.mentions("WMx 4"));

        let loose = compile(toml, false).unwrap();
        assert_eq!(loose.field("WM").unwrap().extract("TotalWM 99"), Some(99.0));
    }

    #[test]
    fn test_pattern_without_capture_group_rejected() {
        let toml = r#"
[registry]
id = "t"
name = "T"

[[field]]
label = "x"
pattern = 'x\s*[0-9]+'
"#;
        assert!(matches!(
            compile(toml, true),
            Err(RegistryError::NoCaptureGroup { .. })
        ));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let toml = r#"
[registry]
id = "t"
name = "T"

[[field]]
label = "x"

[[field]]
label = "x"
"#;
        assert!(matches!(
            compile(toml, true),
            Err(RegistryError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let toml = r#"
[registry]
id = "t"
name = "T"
"#;
        assert!(matches!(
            compile(toml, true),
            Err(RegistryError::MissingField { field: "field", .. })
        ));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let toml = r#"
[registry]
id = "t"
name = "T"

[scan]
line_marker = '(unclosed'

[[field]]
label = "x"
"#;
        assert!(matches!(
            compile(toml, true),
            Err(RegistryError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(matches!(
            compile("not = [valid", true),
            Err(RegistryError::TomlParse { .. })
        ));
    }
}
