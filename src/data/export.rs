use std::io::Write;
use std::path::Path;

use super::model::Table;
use crate::error::Result;

/// Write `table` as CSV: a header row with the column names, then one record
/// per row. Nulls become empty fields.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns)?;
    for i in 0..table.len() {
        out.write_record(table.columns.iter().map(|c| table.value(i, c).to_string()))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Download name for the filtered subset of `source`: `filtered_<stem>.csv`.
pub fn export_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    format!("filtered_{stem}.csv")
}
