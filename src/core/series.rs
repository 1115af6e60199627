// ReconLog - core/series.rs
//
// Hand-off to the external charting step. The wide comparison table is read
// back into one series per measure and passed to a `SeriesSink`; the
// plotter consumes whatever the sink produces.
// Core layer: reads/writes trait objects, never touches the filesystem.

use crate::util::constants;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

/// One plotted point: the source column and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub column: String,
    pub value: f64,
}

/// All values of one measure across the compared runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub measure: String,
    pub points: Vec<SeriesPoint>,
}

/// Receives one series per measure, in table row order.
pub trait SeriesSink {
    fn accept(&mut self, series: &ComparisonSeries) -> Result<(), ExportError>;
}

/// Read a wide table (`Measure, File_1, ...`) into series.
///
/// Ragged rows are accepted. Empty or non-numeric cells are left out of the
/// series; a row whose cells run past the header gets positional names.
pub fn read_wide_table<R: Read>(
    reader: R,
    source_path: &Path,
) -> Result<Vec<ComparisonSeries>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ExportError::Csv {
            path: source_path.to_path_buf(),
            source: e,
        })?
        .clone();

    let mut out = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| ExportError::Csv {
            path: source_path.to_path_buf(),
            source: e,
        })?;
        let Some(measure) = row.get(0) else {
            continue;
        };

        let mut points = Vec::new();
        for (i, cell) in row.iter().enumerate().skip(1) {
            if cell.is_empty() {
                continue;
            }
            let column = headers
                .get(i)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}{i}", constants::WIDE_TABLE_SOURCE_PREFIX));
            match cell.parse::<f64>() {
                Ok(value) => points.push(SeriesPoint { column, value }),
                Err(_) => {
                    tracing::debug!(measure, column = %column, cell, "Skipping non-numeric cell");
                }
            }
        }

        out.push(ComparisonSeries {
            measure: measure.to_string(),
            points,
        });
    }

    tracing::debug!(
        source = %source_path.display(),
        series = out.len(),
        "Wide table read"
    );

    Ok(out)
}

/// Feed every series to `sink`, stopping at the first failure.
pub fn publish(series: &[ComparisonSeries], sink: &mut dyn SeriesSink) -> Result<usize, ExportError> {
    for s in series {
        sink.accept(s)?;
    }
    Ok(series.len())
}

/// Serialise one series as pretty JSON.
pub fn write_series_json<W: Write>(
    series: &ComparisonSeries,
    writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, series).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })
}

/// File name for a measure's series document. Path separators in the
/// measure name are replaced so the file stays inside the output directory.
pub fn series_file_name(measure: &str) -> String {
    let safe: String = measure
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{safe}{}", constants::SERIES_FILE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Collect(Vec<String>);

    impl SeriesSink for Collect {
        fn accept(&mut self, series: &ComparisonSeries) -> Result<(), ExportError> {
            self.0.push(series.measure.clone());
            Ok(())
        }
    }

    #[test]
    fn test_read_ragged_table() {
        let csv = "Measure,File_1,File_2\nX,1.0,3.0\nY,2.0\nZ,,4.5\n";
        let series = read_wide_table(csv.as_bytes(), &PathBuf::from("t.csv")).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series[0].points,
            vec![
                SeriesPoint {
                    column: "File_1".into(),
                    value: 1.0
                },
                SeriesPoint {
                    column: "File_2".into(),
                    value: 3.0
                },
            ]
        );
        assert_eq!(series[1].points.len(), 1);
        assert_eq!(series[2].points[0].column, "File_2");
    }

    #[test]
    fn test_publish_in_row_order() {
        let csv = "Measure,File_1\nB,1\nA,2\n";
        let series = read_wide_table(csv.as_bytes(), &PathBuf::from("t.csv")).unwrap();
        let mut sink = Collect(Vec::new());
        assert_eq!(publish(&series, &mut sink).unwrap(), 2);
        assert_eq!(sink.0, vec!["B", "A"]);
    }

    #[test]
    fn test_series_json() {
        let series = ComparisonSeries {
            measure: "WM".into(),
            points: vec![SeriesPoint {
                column: "File_1".into(),
                value: 180.5,
            }],
        };
        let mut buf = Vec::new();
        write_series_json(&series, &mut buf, &PathBuf::from("WM.json")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"measure\": \"WM\""));
        assert!(text.contains("180.5"));
    }

    #[test]
    fn test_series_file_name() {
        assert_eq!(series_file_name("WM"), "WM_volume_comparison.json");
        assert_eq!(series_file_name("a/b"), "a_b_volume_comparison.json");
    }
}
