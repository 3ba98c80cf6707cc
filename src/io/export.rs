//! Export aggregate tables and the correlation matrix to CSV or JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts: one header row (CSV) or one object per row (JSON), with the key
//! columns first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use serde_json::{Map, Value, json};

use crate::aggregate::LabeledTable;
use crate::error::ExportError;
use crate::stats::CorrelationMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Write `table` to a new file at `path`.
pub fn write_table(path: &Path, table: &LabeledTable, format: ExportFormat) -> Result<(), ExportError> {
    let mut out = create(path)?;
    write_table_to(&mut out, table, format)?;
    out.flush().map_err(|e| create_error(path, e))
}

pub fn write_table_to<W: Write>(out: W, table: &LabeledTable, format: ExportFormat) -> Result<(), ExportError> {
    let header = table_header(table);
    match format {
        ExportFormat::Csv => {
            let mut w = csv::Writer::from_writer(out);
            w.write_record(&header)?;
            for row in &table.rows {
                let mut fields = row.keys.clone();
                fields.push(row.records.to_string());
                fields.extend(row.values.iter().map(|v| v.to_string()));
                w.write_record(&fields)?;
            }
            w.flush().map_err(csv::Error::from)?;
        }
        ExportFormat::Json => {
            let rows: Vec<Value> = table
                .rows
                .iter()
                .map(|row| {
                    let mut obj = Map::new();
                    for (name, key) in header.iter().zip(&row.keys) {
                        obj.insert(name.clone(), Value::from(key.as_str()));
                    }
                    obj.insert("records".to_string(), json!(row.records));
                    for (m, v) in table.measures.iter().zip(&row.values) {
                        obj.insert(m.name().to_string(), json!(v));
                    }
                    Value::Object(obj)
                })
                .collect();
            let doc = json!({ "reducer": table.reducer, "rows": rows });
            serde_json::to_writer_pretty(out, &doc)?;
        }
    }
    Ok(())
}

/// Write `matrix` to a new file at `path`. Undefined coefficients are `NaN`
/// in CSV and `null` in JSON.
pub fn write_correlation(path: &Path, matrix: &CorrelationMatrix, format: ExportFormat) -> Result<(), ExportError> {
    let mut out = create(path)?;
    write_correlation_to(&mut out, matrix, format)?;
    out.flush().map_err(|e| create_error(path, e))
}

pub fn write_correlation_to<W: Write>(
    out: W,
    matrix: &CorrelationMatrix,
    format: ExportFormat,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut w = csv::Writer::from_writer(out);
            let mut header = vec!["column".to_string()];
            header.extend(matrix.columns().iter().cloned());
            w.write_record(&header)?;
            for (name, row) in matrix.columns().iter().zip(matrix.values()) {
                let mut fields = vec![name.clone()];
                fields.extend(row.iter().map(|v| v.to_string()));
                w.write_record(&fields)?;
            }
            w.flush().map_err(csv::Error::from)?;
        }
        ExportFormat::Json => serde_json::to_writer_pretty(out, matrix)?,
    }
    Ok(())
}

fn table_header(table: &LabeledTable) -> Vec<String> {
    let mut header = table.key_columns.clone();
    header.push("records".to_string());
    header.extend(table.measures.iter().map(|m| m.name().to_string()));
    header
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path).map(BufWriter::new).map_err(|e| create_error(path, e))
}

fn create_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Create {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::season_means;
    use crate::filter::FilteredView;
    use crate::stats::correlation_matrix;
    use crate::testing::{dataset, record, summer_dataset};

    fn season_table() -> LabeledTable {
        let ds = summer_dataset();
        season_means(&FilteredView::all(&ds)).labeled(&["season"], |k| vec![k.clone()])
    }

    #[test]
    fn table_csv_has_header_and_one_line_per_group() {
        let mut buf = Vec::new();
        write_table_to(&mut buf, &season_table(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["season,records,casual,registered,cnt", "Summer,3,4,16,20"]);
    }

    #[test]
    fn table_json_uses_column_names() {
        let mut buf = Vec::new();
        write_table_to(&mut buf, &season_table(), ExportFormat::Json).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["reducer"], "mean");
        assert_eq!(doc["rows"][0]["season"], "Summer");
        assert_eq!(doc["rows"][0]["records"], 3);
        assert_eq!(doc["rows"][0]["cnt"], 20.0);
    }

    #[test]
    fn correlation_json_writes_nan_as_null() {
        let mut rows = vec![
            record("2011-01-03 08:00:00", "Winter", 1, 2),
            record("2011-01-03 09:00:00", "Winter", 2, 5),
        ];
        rows[1].temp_actual = 20.0;
        let ds = dataset(rows);
        let m = correlation_matrix(&FilteredView::all(&ds), &["temp_actual", "cnt", "is_weekend"]).unwrap();

        let mut buf = Vec::new();
        write_correlation_to(&mut buf, &m, ExportFormat::Json).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["columns"][2], "is_weekend");
        assert!(doc["values"][0][2].is_null());
        assert_eq!(doc["values"][0][0], 1.0);

        let mut buf = Vec::new();
        write_correlation_to(&mut buf, &m, ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("column,temp_actual,cnt,is_weekend\n"));
        assert!(text.contains("NaN"));
    }

    #[test]
    fn unwritable_path_is_create_error() {
        let err = write_table(Path::new("/nonexistent-dir/x.csv"), &season_table(), ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, ExportError::Create { .. }));
    }
}
