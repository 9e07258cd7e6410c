use std::collections::BTreeMap;

use super::model::{CellValue, Row, Table};
use crate::config::ColumnRoles;

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Inclusive numeric range on one designated column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: &CellValue) -> bool {
        value
            .as_f64()
            .is_some_and(|v| v >= self.min && v <= self.max)
    }
}

/// The combined predicates applied to a table. All of them must hold.
///
/// * `columns`: column name → text that must occur in the cell, compared
///   case-insensitively as a substring (`"5"` matches `"15"`).
/// * `range`: optional inclusive numeric range.
///
/// A predicate naming a column the table does not have is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub columns: BTreeMap<String, String>,
    pub range: Option<NumericRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default spec for a freshly loaded table: no column predicates and,
    /// when the price column holds numbers, a range spanning all of them.
    pub fn for_table(table: &Table, roles: &ColumnRoles) -> Self {
        let range = table
            .numeric_bounds(&roles.price)
            .map(|(min, max)| NumericRange::new(&roles.price, min, max));
        Self {
            columns: BTreeMap::new(),
            range,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn with_range(mut self, column: impl Into<String>, min: f64, max: f64) -> Self {
        self.range = Some(NumericRange::new(column, min, max));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.range.is_none()
    }

    /// Whether a single row passes every predicate that applies to `table`.
    fn matches(&self, table: &Table, row: &Row) -> bool {
        const NULL: &CellValue = &CellValue::Null;

        for (col, needle) in &self.columns {
            if !table.has_column(col) {
                continue;
            }
            let value = row.get(col).unwrap_or(NULL);
            if !contains_ignore_case(value, needle) {
                return false;
            }
        }

        if let Some(range) = &self.range {
            if table.has_column(&range.column)
                && !range.contains(row.get(&range.column).unwrap_or(NULL))
            {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring test on the value's text form. Null never
/// matches.
fn contains_ignore_case(value: &CellValue, needle: &str) -> bool {
    if value.is_null() {
        return false;
    }
    value
        .to_string()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

/// Return indices of rows that pass all predicates.
pub fn filtered_indices(table: &Table, spec: &FilterSpec) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| spec.matches(table, row))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `spec` and return the matching rows as a new table.
/// The input table is left untouched.
pub fn filter(table: &Table, spec: &FilterSpec) -> Table {
    if spec.is_empty() {
        return table.clone();
    }
    let rows = table
        .rows
        .iter()
        .filter(|row| spec.matches(table, row))
        .cloned()
        .collect();
    Table::new(table.columns.clone(), rows)
}

/// Sorted distinct non-null values of a column, for a categorical selector.
/// Empty when the column is absent.
pub fn choices(table: &Table, column: &str) -> Vec<CellValue> {
    table
        .unique_values
        .get(column)
        .map(|vals| vals.iter().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(marque: &str, prix: CellValue) -> Row {
        Row::from([
            ("marque".to_string(), CellValue::String(marque.to_string())),
            ("prix".to_string(), prix),
        ])
    }

    fn milk() -> Table {
        Table::new(
            vec!["marque".into(), "prix".into()],
            vec![
                row("Lactel", CellValue::Float(1.20)),
                row("Candia", CellValue::Float(1.35)),
            ],
        )
    }

    fn brands(table: &Table) -> Vec<String> {
        (0..table.len())
            .map(|i| table.value(i, "marque").to_string())
            .collect()
    }

    #[test]
    fn test_substring_filter() {
        let out = filter(&milk(), &FilterSpec::new().with_column("marque", "act"));
        assert_eq!(brands(&out), vec!["Lactel"]);
    }

    #[test]
    fn test_substring_filter_ignores_case() {
        let out = filter(&milk(), &FilterSpec::new().with_column("marque", "CANDIA"));
        assert_eq!(brands(&out), vec!["Candia"]);
    }

    #[test]
    fn test_range_filter() {
        let out = filter(&milk(), &FilterSpec::new().with_range("prix", 1.30, 1.40));
        assert_eq!(brands(&out), vec!["Candia"]);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let out = filter(&milk(), &FilterSpec::new().with_range("prix", 1.20, 1.35));
        assert_eq!(brands(&out), vec!["Lactel", "Candia"]);
    }

    #[test]
    fn test_range_excludes_non_numeric_and_missing() {
        let mut table = milk();
        table.rows.push(row("Bridel", CellValue::String("n/a".into())));
        table.rows.push(Row::from([(
            "marque".to_string(),
            CellValue::String("Elle & Vire".into()),
        )]));
        let table = Table::new(table.columns, table.rows);

        let out = filter(&table, &FilterSpec::new().with_range("prix", 0.0, 100.0));
        assert_eq!(brands(&out), vec!["Lactel", "Candia"]);
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let table = milk();
        assert_eq!(filter(&table, &FilterSpec::new()), table);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let spec = FilterSpec::new()
            .with_column("marque", "a")
            .with_range("prix", 1.0, 1.3);
        let once = filter(&milk(), &spec);
        let twice = filter(&once, &spec);
        assert_eq!(once, twice);
        assert_eq!(brands(&once), vec!["Lactel"]);
    }

    #[test]
    fn test_source_table_not_mutated() {
        let table = milk();
        let _ = filter(&table, &FilterSpec::new().with_column("marque", "zzz"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_numeric_substring_matches_other_numbers() {
        // "5" occurs in "15" and "25": categorical filters are substring
        // matches, not equality.
        let table = Table::new(
            vec!["gramage".into()],
            ["5", "15", "25", "30"]
                .iter()
                .map(|g| Row::from([("gramage".to_string(), CellValue::infer(g))]))
                .collect(),
        );
        let out = filter(&table, &FilterSpec::new().with_column("gramage", "5"));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_null_never_matches() {
        let table = Table::new(
            vec!["origine".into()],
            vec![
                Row::from([("origine".to_string(), CellValue::Null)]),
                Row::from([("origine".to_string(), CellValue::String("France".into()))]),
            ],
        );
        let out = filter(&table, &FilterSpec::new().with_column("origine", ""));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_absent_column_predicates_are_ignored() {
        let spec = FilterSpec::new()
            .with_column("origine", "France")
            .with_range("poids", 0.0, 1.0);
        assert_eq!(filter(&milk(), &spec).len(), 2);
    }

    #[test]
    fn test_predicate_order_does_not_matter() {
        let table = milk();
        let both = FilterSpec::new()
            .with_column("marque", "a")
            .with_range("prix", 1.3, 1.4);
        let first = filter(&table, &FilterSpec::new().with_column("marque", "a"));
        let then = filter(&first, &FilterSpec::new().with_range("prix", 1.3, 1.4));
        let other = filter(
            &filter(&table, &FilterSpec::new().with_range("prix", 1.3, 1.4)),
            &FilterSpec::new().with_column("marque", "a"),
        );
        assert_eq!(filter(&table, &both), then);
        assert_eq!(then, other);
    }

    #[test]
    fn test_filtered_indices() {
        let idx = filtered_indices(&milk(), &FilterSpec::new().with_column("marque", "di"));
        assert_eq!(idx, vec![1]);
    }

    #[test]
    fn test_default_spec_spans_prices() {
        let spec = FilterSpec::for_table(&milk(), &ColumnRoles::default());
        assert_eq!(spec.range, Some(NumericRange::new("prix", 1.20, 1.35)));
        assert_eq!(filter(&milk(), &spec), milk());
    }

    #[test]
    fn test_choices() {
        let vals: Vec<String> = choices(&milk(), "marque")
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(vals, vec!["Candia", "Lactel"]);
        assert!(choices(&milk(), "origine").is_empty());
    }
}
