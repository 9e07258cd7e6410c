use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt8Type,
};
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, Row, Table};
use crate::error::Error;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a price table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row, cell types inferred from the text
/// * `.parquet` – scalar columns (strings, numbers, booleans, dates, timestamps)
///
/// Any failure, including an unknown extension, is reported as
/// [`Error::DataFormat`].
pub fn load_file(path: &Path) -> std::result::Result<Table, Error> {
    // Last dot of the name, so `.xlsx` alone is a workbook like the catalog says.
    let ext = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    let loaded = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    };

    match loaded {
        Ok(table) => {
            log::debug!(
                "loaded {}: {} rows, columns {:?}",
                path.display(),
                table.len(),
                table.columns
            );
            Ok(table)
        }
        Err(e) => Err(Error::data_format(path, &e)),
    }
}

/// Give blank or duplicate header cells a usable, unique name.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for (i, h) in raw.into_iter().enumerate() {
        let h = h.trim();
        let mut name = if h.is_empty() {
            format!("column_{}", i + 1)
        } else {
            h.to_string()
        };
        if headers.contains(&name) {
            name = format!("{name}_{}", i + 1);
        }
        headers.push(name);
    }
    headers
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// First worksheet of an Excel / OpenDocument workbook.
/// Row 0 is the header; an empty sheet yields an empty table.
fn load_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheet")?
        .context("reading first worksheet")?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Table::new(Vec::new(), Vec::new()));
    };
    let headers = normalize_headers(
        header_row
            .iter()
            .map(|c| c.as_string().unwrap_or_else(|| c.to_string()))
            .collect(),
    );

    let mut rows = Vec::new();
    for cells in rows_iter {
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let value = cells.get(i).map(workbook_cell).unwrap_or(CellValue::Null);
                (col.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        // Text stays text: "0500" must not turn into 500.
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Short records are padded with nulls.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers = normalize_headers(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect(),
    );

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but only {} columns",
                record.len(),
                headers.len()
            );
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let value = record.get(i).map(CellValue::infer).unwrap_or(CellValue::Null);
                (col.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
/// Every column becomes a table column; nested types are rendered as text.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let values: Row = headers
                .iter()
                .enumerate()
                .map(|(i, col)| (col.clone(), extract_cell(batch.column(i), row)))
                .collect();
            rows.push(values);
        }
    }

    Ok(Table::new(headers, rows))
}

// -- Parquet / Arrow helpers --

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => {
            CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64)
        }
        DataType::UInt32 => {
            CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::from_date)
            .unwrap_or(CellValue::Null),
        DataType::Timestamp(unit, _) => {
            let dt = match unit {
                TimeUnit::Second => col
                    .as_primitive::<TimestampSecondType>()
                    .value_as_datetime(row),
                TimeUnit::Millisecond => col
                    .as_primitive::<TimestampMillisecondType>()
                    .value_as_datetime(row),
                TimeUnit::Microsecond => col
                    .as_primitive::<TimestampMicrosecondType>()
                    .value_as_datetime(row),
                TimeUnit::Nanosecond => col
                    .as_primitive::<TimestampNanosecondType>()
                    .value_as_datetime(row),
            };
            dt.map(CellValue::Date).unwrap_or(CellValue::Null)
        }
        _ => arrow::util::display::array_value_to_string(col, row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv_types_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lait.csv");
        std::fs::write(
            &path,
            "date,marque,prix,gramage\n2023-01-01,Lactel,1.20,1L\n2023-01-02,Candia,,\n",
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["date", "marque", "prix", "gramage"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "prix"), &CellValue::Float(1.2));
        assert_eq!(
            table.value(0, "date"),
            &CellValue::from_date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
        assert_eq!(table.value(1, "prix"), &CellValue::Null);
        assert_eq!(table.value(1, "gramage"), &CellValue::Null);
    }

    #[test]
    fn test_header_only_csv_is_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "marque,prix\n").unwrap();

        let table = load_file(&path).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["marque", "prix"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, Error::DataFormat { .. }));
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_bare_extension_name_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".csv");
        std::fs::write(&path, "marque,prix\nA,1.5\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "prix"), &CellValue::Float(1.5));
    }

    #[test]
    fn test_corrupt_workbook_is_data_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, Error::DataFormat { .. }));
    }

    /// Two data rows separated by a blank row; column C has no header.
    fn write_milk_workbook(path: &Path) {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "date").unwrap();
        sheet.write_string(0, 1, "marque").unwrap();
        sheet.write_string(0, 3, "gramage").unwrap();
        sheet.write_string(0, 4, "prix").unwrap();

        let jan2 = ExcelDateTime::from_ymd(2023, 1, 2).unwrap();
        sheet.write_datetime_with_format(1, 0, &jan2, &date_format).unwrap();
        sheet.write_string(1, 1, "Lactel").unwrap();
        sheet.write_string(1, 2, "promo").unwrap();
        sheet.write_string(1, 3, "0500").unwrap();
        sheet.write_number(1, 4, 1.2).unwrap();

        let jan9 = ExcelDateTime::from_ymd(2023, 1, 9).unwrap();
        sheet.write_datetime_with_format(3, 0, &jan9, &date_format).unwrap();
        sheet.write_string(3, 1, "Candia").unwrap();
        sheet.write_string(3, 3, "1L").unwrap();
        sheet.write_number(3, 4, 1.35).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_load_workbook_typed_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lait.xlsx");
        write_milk_workbook(&path);

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.columns,
            vec!["date", "marque", "column_3", "gramage", "prix"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.value(0, "date"),
            &CellValue::from_date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
        );
        assert_eq!(table.value(0, "marque"), &CellValue::String("Lactel".into()));
        assert_eq!(table.value(0, "column_3"), &CellValue::String("promo".into()));
        assert_eq!(table.value(1, "column_3"), &CellValue::Null);
        assert_eq!(table.value(1, "prix"), &CellValue::Float(1.35));
    }

    #[test]
    fn test_workbook_text_cells_stay_text() {
        use crate::data::filter::{filter, FilterSpec};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lait.xlsx");
        write_milk_workbook(&path);

        let table = load_file(&path).unwrap();
        assert_eq!(table.value(0, "gramage"), &CellValue::String("0500".into()));

        let out = filter(&table, &FilterSpec::new().with_column("gramage", "0500"));
        assert_eq!(out.len(), 1);
        assert_eq!(out.value(0, "marque"), &CellValue::String("Lactel".into()));
    }

    #[test]
    fn test_missing_file_is_data_format_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(err, Error::DataFormat { .. }));
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        assert_eq!(
            normalize_headers(vec!["prix".into(), " ".into(), "prix".into()]),
            vec!["prix", "column_2", "prix_3"]
        );
    }

    #[test]
    fn test_load_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prix.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("marque", DataType::Utf8, true),
            Field::new("prix", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![19358, 19359])),
                Arc::new(StringArray::from(vec![Some("Lactel"), None])),
                Arc::new(Float64Array::from(vec![1.2, 1.35])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["date", "marque", "prix"]);
        assert_eq!(table.value(0, "marque"), &CellValue::String("Lactel".into()));
        assert_eq!(table.value(1, "marque"), &CellValue::Null);
        assert_eq!(table.value(1, "prix"), &CellValue::Float(1.35));
        // 19358 days after the epoch
        assert_eq!(
            table.value(0, "date"),
            &CellValue::from_date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
    }
}
