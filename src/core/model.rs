// ReconLog - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

// =============================================================================
// Record (one source's flat measure set)
// =============================================================================

/// One named scalar in a record. `value` is `None` when the registry knows
/// the label but no line in the source carried a number for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub label: String,
    pub value: Option<f64>,
}

/// Flat mapping of measure label to optional value, built from one source.
///
/// Labels are unique and compared exactly (no case folding). Insertion order
/// is preserved; it drives row order in the fixed tables and column order in
/// the combined-records table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    source: PathBuf,
    measures: Vec<Measure>,
}

impl Record {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            measures: Vec::new(),
        }
    }

    /// Path the record was built from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Set `label` to `value`, keeping the label's original position if it
    /// was already present.
    pub fn set(&mut self, label: &str, value: Option<f64>) {
        match self.measures.iter_mut().find(|m| m.label == label) {
            Some(existing) => existing.value = value,
            None => self.measures.push(Measure {
                label: label.to_string(),
                value,
            }),
        }
    }

    /// Value for `label`. Outer `None`: label absent. Inner `None`: null.
    pub fn get(&self, label: &str) -> Option<Option<f64>> {
        self.measures
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.value)
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.measures.iter().map(|m| m.label.as_str())
    }

    /// Labels that carry a value.
    pub fn present(&self) -> impl Iterator<Item = (&str, f64)> {
        self.measures
            .iter()
            .filter_map(|m| m.value.map(|v| (m.label.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}

// =============================================================================
// AggregatedTable (wide multi-source comparison)
// =============================================================================

/// One row of the wide table: a measure and the values contributed to it,
/// in source arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRow {
    pub measure: String,
    pub values: Vec<Option<f64>>,
}

/// Measure-keyed wide table built by folding records in arrival order.
///
/// A measure missing from a source gets no entry for that source, so a row
/// can be shorter than `source_count()` and its later values shift left
/// relative to the `File_i` headers. That misalignment is kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    sources: Vec<PathBuf>,
    rows: Vec<MeasureRow>,
    index: HashMap<String, usize>,
}

impl AggregatedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contributing source. Called once per folded record.
    pub(crate) fn push_source(&mut self, source: &Path) {
        self.sources.push(source.to_path_buf());
    }

    /// Append `value` to the row for `measure`, creating it on first sight.
    pub(crate) fn append(&mut self, measure: &str, value: Option<f64>) {
        match self.index.get(measure) {
            Some(&i) => self.rows[i].values.push(value),
            None => {
                self.index.insert(measure.to_string(), self.rows.len());
                self.rows.push(MeasureRow {
                    measure: measure.to_string(),
                    values: vec![value],
                });
            }
        }
    }

    /// Rows in first-seen measure order.
    pub fn rows(&self) -> &[MeasureRow] {
        &self.rows
    }

    pub fn row(&self, measure: &str) -> Option<&MeasureRow> {
        self.index.get(measure).map(|&i| &self.rows[i])
    }

    /// Paths of the sources that contributed, in arrival order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_set_keeps_position() {
        let mut record = Record::new("a.txt");
        record.set("X", Some(1.0));
        record.set("Y", None);
        record.set("X", Some(5.0));

        let labels: Vec<_> = record.labels().collect();
        assert_eq!(labels, vec!["X", "Y"]);
        assert_eq!(record.get("X"), Some(Some(5.0)));
        assert_eq!(record.get("Y"), Some(None));
        assert_eq!(record.get("Z"), None);
    }

    #[test]
    fn test_record_labels_are_case_sensitive() {
        let mut record = Record::new("a.txt");
        record.set("wm", Some(1.0));
        record.set("WM", Some(2.0));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_table_append_creates_rows_in_first_seen_order() {
        let mut table = AggregatedTable::new();
        table.append("B", Some(1.0));
        table.append("A", Some(2.0));
        table.append("B", Some(3.0));

        let names: Vec<_> = table.rows().iter().map(|r| r.measure.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(table.row("B").unwrap().values, vec![Some(1.0), Some(3.0)]);
    }
}
