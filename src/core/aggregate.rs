// ReconLog - core/aggregate.rs
//
// Folds per-source records into a measure-keyed wide table.

use crate::core::model::{AggregatedTable, Record};

/// Incrementally builds an `AggregatedTable`, one record at a time, in
/// source arrival order.
#[derive(Debug, Default)]
pub struct Aggregator {
    table: AggregatedTable,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record in. Each of its measures appends to the row of the
    /// same label (exact match), creating the row on first sight. Measures
    /// the record lacks get nothing for this source.
    pub fn fold(&mut self, record: &Record) {
        self.table.push_source(record.source());
        for measure in record.measures() {
            self.table.append(&measure.label, measure.value);
        }
        tracing::debug!(
            source = %record.source().display(),
            measures = record.len(),
            sources = self.table.source_count(),
            "Record folded"
        );
    }

    pub fn finish(self) -> AggregatedTable {
        self.table
    }
}

/// Merge an ordered sequence of records into one table.
pub fn merge<'a>(records: impl IntoIterator<Item = &'a Record>) -> AggregatedTable {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.fold(record);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, pairs: &[(&str, f64)]) -> Record {
        let mut r = Record::new(source);
        for (label, value) in pairs {
            r.set(label, Some(*value));
        }
        r
    }

    #[test]
    fn test_missing_measure_leaves_shorter_row() {
        let a = record("a.txt", &[("X", 1.0), ("Y", 2.0)]);
        let b = record("b.txt", &[("X", 3.0)]);
        let table = merge([&a, &b]);

        assert_eq!(table.source_count(), 2);
        assert_eq!(table.row("X").unwrap().values, vec![Some(1.0), Some(3.0)]);
        // Y has one fewer entry than there are sources; not padded.
        assert_eq!(table.row("Y").unwrap().values, vec![Some(2.0)]);
    }

    #[test]
    fn test_labels_are_not_normalised() {
        let a = record("a.txt", &[("WM", 1.0)]);
        let b = record("b.txt", &[("wm", 2.0)]);
        let table = merge([&a, &b]);
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn test_first_seen_order_across_sources() {
        let a = record("a.txt", &[("B", 1.0)]);
        let b = record("b.txt", &[("C", 2.0), ("B", 3.0), ("A", 4.0)]);
        let table = merge([&a, &b]);
        let names: Vec<_> = table.rows().iter().map(|r| r.measure.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_merge_nothing() {
        let table = merge(std::iter::empty());
        assert!(table.is_empty());
        assert_eq!(table.source_count(), 0);
    }
}
