use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Data grid (text)
// ---------------------------------------------------------------------------

/// Render at most `max_rows` rows of `table` as a boxed text grid.
pub fn data_grid(table: &Table, max_rows: usize) -> Result<String> {
    let shown = table.len().min(max_rows);

    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|c| Field::new(c, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = table
        .columns
        .iter()
        .map(|c| {
            let values: StringArray = (0..shown)
                .map(|i| {
                    let v = table.value(i, c);
                    (!v.is_null()).then(|| v.to_string())
                })
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    if arrays.is_empty() {
        return Ok(String::new());
    }
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building grid batch")?;
    let mut out = pretty_format_batches(&[batch])
        .context("formatting grid")?
        .to_string();
    if shown < table.len() {
        out.push_str(&format!("\n… {} more rows", table.len() - shown));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Row};

    #[test]
    fn test_grid_truncates() {
        let rows = (0..5)
            .map(|i| Row::from([("prix".to_string(), CellValue::Integer(i))]))
            .collect();
        let table = Table::new(vec!["prix".into()], rows);

        let grid = data_grid(&table, 2).unwrap();
        assert!(grid.contains("| prix |"));
        assert!(grid.contains("| 1    |"));
        assert!(!grid.contains("| 2    |"));
        assert!(grid.ends_with("… 3 more rows"));
    }
}
