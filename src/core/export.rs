// ReconLog - core/export.rs
//
// CSV writers for fixed-row summaries, the wide comparison table, and the
// combined-records table.
// Core layer: writes to any Write trait object. Rows are never reordered.

use crate::core::model::{AggregatedTable, Record};
use crate::core::registry::FieldRegistry;
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Column selection for the combined-records table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnMode {
    /// Columns are the first record's labels; labels only later records carry
    /// are dropped.
    #[default]
    FirstSource,
    /// Columns are the union of all records' labels in first-seen order.
    Union,
}

/// Text for one cell. Null is empty; numbers use the shortest round-trip
/// form and always carry a fractional part (`3.0`, not `3`).
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> ExportError + '_ {
    move |e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    }
}

fn flush<W: Write>(mut writer: csv::Writer<W>, path: &Path) -> Result<(), ExportError> {
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a headerless two-column table, one row per registry field in
/// registry order: display name, value.
pub fn write_fixed_table<W: Write>(
    record: &Record,
    registry: &FieldRegistry,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut count = 0;
    for field in &registry.fields {
        let value = format_value(record.get(&field.label).flatten());
        csv_writer
            .write_record([field.display.as_str(), value.as_str()])
            .map_err(csv_err(export_path))?;
        count += 1;
    }

    flush(csv_writer, export_path)?;
    Ok(count)
}

/// Write the wide table: `Measure, File_1 .. File_N` then one row per
/// measure. Rows may be shorter than the header.
pub fn write_wide_table<W: Write>(
    table: &AggregatedTable,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    let mut header = vec![constants::WIDE_TABLE_MEASURE_HEADER.to_string()];
    header.extend(
        (1..=table.source_count()).map(|i| format!("{}{i}", constants::WIDE_TABLE_SOURCE_PREFIX)),
    );
    csv_writer
        .write_record(&header)
        .map_err(csv_err(export_path))?;

    for row in table.rows() {
        let mut cells = Vec::with_capacity(row.values.len() + 1);
        cells.push(row.measure.clone());
        cells.extend(row.values.iter().map(|v| format_value(*v)));
        csv_writer
            .write_record(&cells)
            .map_err(csv_err(export_path))?;
    }

    flush(csv_writer, export_path)?;
    Ok(table.rows().len())
}

/// Labels that become columns of the combined-records table.
pub fn combined_columns(records: &[Record], mode: ColumnMode) -> Vec<String> {
    match mode {
        ColumnMode::FirstSource => records
            .first()
            .map(|r| r.labels().map(str::to_string).collect())
            .unwrap_or_default(),
        ColumnMode::Union => {
            let mut columns: Vec<String> = Vec::new();
            for label in records.iter().flat_map(Record::labels) {
                if !columns.iter().any(|c| c == label) {
                    columns.push(label.to_string());
                }
            }
            columns
        }
    }
}

/// Write one row per record: `filepath` then one cell per column label.
/// Missing labels are empty cells.
pub fn write_combined_records<W: Write>(
    records: &[Record],
    mode: ColumnMode,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let columns = combined_columns(records, mode);
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![constants::COMBINED_FILEPATH_HEADER.to_string()];
    header.extend(columns.iter().cloned());
    csv_writer
        .write_record(&header)
        .map_err(csv_err(export_path))?;

    for record in records {
        let dropped: Vec<&str> = record
            .labels()
            .filter(|l| !columns.iter().any(|c| c == l))
            .collect();
        if !dropped.is_empty() {
            tracing::warn!(
                source = %record.source().display(),
                ?dropped,
                "Measures not in the first source's columns were dropped"
            );
        }

        let mut cells = Vec::with_capacity(columns.len() + 1);
        cells.push(record.source().display().to_string());
        cells.extend(
            columns
                .iter()
                .map(|c| format_value(record.get(c).flatten())),
        );
        csv_writer
            .write_record(&cells)
            .map_err(csv_err(export_path))?;
    }

    flush(csv_writer, export_path)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::merge;
    use crate::core::registry::{load_builtin_registries, CompileOptions};
    use std::path::PathBuf;

    fn record(source: &str, pairs: &[(&str, f64)]) -> Record {
        let mut r = Record::new(source);
        for (label, value) in pairs {
            r.set(label, Some(*value));
        }
        r
    }

    fn out() -> PathBuf {
        PathBuf::from("out.csv")
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(3.0)), "3.0");
        assert_eq!(format_value(Some(0.85)), "0.85");
        assert_eq!(format_value(Some(12.34)), "12.34");
        assert_eq!(format_value(None), "");
    }

    #[test]
    fn test_fixed_table_rows() {
        let registries = load_builtin_registries(CompileOptions::default());
        let svr = &registries[0];
        let mut rec = Record::new("summary.txt");
        rec.set("ncc", Some(0.85));
        rec.set("nrmse", Some(0.12));
        rec.set("average weight", None);
        rec.set("excluded slices", Some(3.0));

        let mut buf = Vec::new();
        let count = write_fixed_table(&rec, svr, &mut buf, &out()).unwrap();
        assert_eq!(count, 4);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "NCC,0.85\nNRMSE,0.12\nAverage Weight,\nExcluded Slices,3.0\n"
        );
    }

    #[test]
    fn test_wide_table_is_ragged() {
        let a = record("a.txt", &[("X", 1.0), ("Y", 2.0)]);
        let b = record("b.txt", &[("X", 3.0)]);
        let table = merge([&a, &b]);

        let mut buf = Vec::new();
        let rows = write_wide_table(&table, &mut buf, &out()).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Measure,File_1,File_2\nX,1.0,3.0\nY,2.0\n"
        );
    }

    #[test]
    fn test_combined_first_source_columns_drop_extras() {
        let records = vec![
            record("a.txt", &[("ncc", 0.9)]),
            record("b.txt", &[("ncc", 0.8), ("nrmse", 0.1)]),
        ];
        let mut buf = Vec::new();
        write_combined_records(&records, ColumnMode::FirstSource, &mut buf, &out()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "filepath,ncc\na.txt,0.9\nb.txt,0.8\n"
        );
    }

    #[test]
    fn test_combined_union_columns() {
        let records = vec![
            record("a.txt", &[("ncc", 0.9)]),
            record("b.txt", &[("nrmse", 0.1), ("ncc", 0.8)]),
        ];
        let mut buf = Vec::new();
        write_combined_records(&records, ColumnMode::Union, &mut buf, &out()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "filepath,ncc,nrmse\na.txt,0.9,\nb.txt,0.8,0.1\n"
        );
    }

    #[test]
    fn test_combined_no_records_writes_header_only() {
        let mut buf = Vec::new();
        let rows = write_combined_records(&[], ColumnMode::FirstSource, &mut buf, &out()).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(buf).unwrap(), "filepath\n");
    }
}
