// ReconLog - core/record.rs
//
// Builds one flat Record per input source.
// Core layer: accepts content as a string, never touches the filesystem.

use crate::core::extract::extract_all;
use crate::core::model::Record;
use crate::core::registry::{Attribution, FieldRegistry};
use std::path::Path;

/// Build a record from `content` using `registry`.
///
/// Every registry label is present in the result; labels that no line
/// supplied stay `None`. Later lines overwrite earlier ones for the fields
/// they are attributed to:
///
/// - `AllFields`: each considered line sets every field, matched or not, so
///   the last marker line alone decides the record.
/// - `FirstKeyword`: each line is attributed to at most one field, the first
///   whose keyword it mentions, and sets only that field.
pub fn build_record(content: &str, source: &Path, registry: &FieldRegistry) -> Record {
    let mut record = Record::new(source);
    for field in &registry.fields {
        record.set(&field.label, None);
    }

    let mut attributed = 0usize;
    for line in content.lines() {
        if !registry.considers(line) {
            continue;
        }

        match registry.attribution {
            Attribution::AllFields => {
                for (field, value) in extract_all(line, &registry.fields) {
                    record.set(&field.label, value);
                }
                attributed += 1;
            }
            Attribution::FirstKeyword => {
                if let Some(field) = registry.fields.iter().find(|f| f.mentions(line)) {
                    record.set(&field.label, field.extract(line));
                    attributed += 1;
                }
            }
        }
    }

    let missing: Vec<&str> = record
        .measures()
        .iter()
        .filter(|m| m.value.is_none())
        .map(|m| m.label.as_str())
        .collect();
    if !missing.is_empty() {
        tracing::debug!(
            source = %source.display(),
            registry_id = %registry.id,
            ?missing,
            "No value found for some fields"
        );
    }

    tracing::debug!(
        source = %source.display(),
        registry_id = %registry.id,
        lines = attributed,
        "Record built"
    );

    record
}

/// Parse a simple "measure value" file.
///
/// Lines with exactly two whitespace-separated tokens whose second token is a
/// number contribute one measure; every other line is ignored. A measure that
/// appears twice keeps its first position and its last value.
pub fn parse_measure_file(content: &str, source: &Path) -> Record {
    let mut record = Record::new(source);

    for (idx, line) in content.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let (Some(measure), Some(value), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };
        match value.parse::<f64>() {
            Ok(v) => record.set(measure, Some(v)),
            Err(_) => {
                tracing::debug!(
                    source = %source.display(),
                    line = idx + 1,
                    measure,
                    value,
                    "Skipping non-numeric measure value"
                );
            }
        }
    }

    record
}
