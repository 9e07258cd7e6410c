use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a price table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what spreadsheets hold.
/// Kept in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Calendar date; the time part is midnight for plain dates.
    Date(NaiveDateTime),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Text form used for substring matching, the data grid and CSV export.
///
/// Floats always keep a fractional part (`100.0`) so exported files parse
/// back to the same type. Null renders as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) if d.time() == NaiveTime::MIN => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for numeric filters and statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Interpret the value as a point in time; ISO strings are accepted too.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        CellValue::Date(date.and_time(NaiveTime::MIN))
    }

    /// Infer a typed value from raw text (CSV cells, string spreadsheet cells).
    pub fn infer(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        if let Some(d) = parse_datetime(s) {
            return CellValue::Date(d);
        }
        CellValue::String(s.to_string())
    }
}

/// Parse an ISO-style date or datetime.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

// ---------------------------------------------------------------------------
// Table – the complete loaded price table
// ---------------------------------------------------------------------------

/// One row: column name → value. Columns missing from a row read as null.
pub type Row = BTreeMap<String, CellValue>;

/// An in-memory table with a fixed, ordered set of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names in source header order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// For each column the sorted set of distinct non-null values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Table {
    /// Build a table and its column indices.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = columns
            .iter()
            .map(|c| (c.clone(), BTreeSet::new()))
            .collect();

        for row in &rows {
            for (col, val) in row {
                if val.is_null() {
                    continue;
                }
                if let Some(set) = unique_values.get_mut(col) {
                    set.insert(val.clone());
                }
            }
        }
        Table {
            columns,
            rows,
            unique_values,
        }
    }

    /// An empty table with the same columns.
    pub fn empty_like(&self) -> Self {
        Table::new(self.columns.clone(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Value of `column` in row `row`; null when the row lacks it.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        const NULL: &CellValue = &CellValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(NULL)
    }

    /// Smallest and largest numeric value of a column.
    pub fn numeric_bounds(&self, column: &str) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.get(column).and_then(CellValue::as_f64))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("42"), CellValue::Integer(42));
        assert_eq!(CellValue::infer("1.25"), CellValue::Float(1.25));
        assert_eq!(CellValue::infer("true"), CellValue::Bool(true));
        assert_eq!(
            CellValue::infer("2023-01-02"),
            CellValue::from_date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
        );
        assert_eq!(
            CellValue::infer("Lactel"),
            CellValue::String("Lactel".into())
        );
    }

    #[test]
    fn test_display_reparses_to_same_value() {
        for v in [
            CellValue::Float(100.0),
            CellValue::Float(1.35),
            CellValue::Integer(7),
            CellValue::infer("2023-05-01 10:30:00"),
            CellValue::infer("2023-05-01"),
        ] {
            assert_eq!(CellValue::infer(&v.to_string()), v);
        }
        assert_eq!(CellValue::Float(100.0).to_string(), "100.0");
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn test_unique_values_skip_nulls() {
        let rows = vec![
            Row::from([("marque".to_string(), CellValue::String("B".into()))]),
            Row::from([("marque".to_string(), CellValue::Null)]),
            Row::from([("marque".to_string(), CellValue::String("A".into()))]),
            Row::from([("marque".to_string(), CellValue::String("B".into()))]),
        ];
        let table = Table::new(vec!["marque".into()], rows);
        let vals: Vec<String> = table.unique_values["marque"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(vals, vec!["A", "B"]);
    }

    #[test]
    fn test_numeric_bounds() {
        let rows = vec![
            Row::from([("prix".to_string(), CellValue::Float(1.5))]),
            Row::from([("prix".to_string(), CellValue::String("n/a".into()))]),
            Row::from([("prix".to_string(), CellValue::Integer(3))]),
        ];
        let table = Table::new(vec!["prix".into()], rows);
        assert_eq!(table.numeric_bounds("prix"), Some((1.5, 3.0)));
        assert_eq!(table.numeric_bounds("missing"), None);
        assert_eq!(table.value(1, "missing"), &CellValue::Null);
    }
}
