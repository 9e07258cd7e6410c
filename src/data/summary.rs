use chrono::NaiveDateTime;
use serde::Serialize;

use super::model::Table;

// ---------------------------------------------------------------------------
// Price statistics
// ---------------------------------------------------------------------------

/// Count, mean, min and max of a price column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    /// Rows in the table, including those without a usable price.
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceSummary {
    /// `None` when the table is empty, lacks the column, or holds no numeric
    /// prices.
    pub fn compute(table: &Table, price_column: &str) -> Option<Self> {
        if table.is_empty() || !table.has_column(price_column) {
            return None;
        }
        let prices: Vec<f64> = table
            .rows
            .iter()
            .filter_map(|r| r.get(price_column).and_then(|v| v.as_f64()))
            .collect();
        if prices.is_empty() {
            return None;
        }

        let sum: f64 = prices.iter().sum();
        let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(PriceSummary {
            count: table.len(),
            mean: sum / prices.len() as f64,
            min,
            max,
        })
    }
}

// ---------------------------------------------------------------------------
// Price series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDateTime,
    pub price: f64,
}

/// Date-ordered `(date, price)` points for the evolution chart.
///
/// Rows without a usable date or price are skipped; rows sharing a date keep
/// their table order. `None` when either column is absent.
pub fn price_series(table: &Table, date_column: &str, price_column: &str) -> Option<Vec<PricePoint>> {
    if !table.has_column(date_column) || !table.has_column(price_column) {
        return None;
    }
    let mut points: Vec<PricePoint> = table
        .rows
        .iter()
        .filter_map(|r| {
            let date = r.get(date_column)?.as_datetime()?;
            let price = r.get(price_column)?.as_f64()?;
            Some(PricePoint { date, price })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Row};

    fn table(rows: &[(&str, &str)]) -> Table {
        Table::new(
            vec!["date".into(), "prix".into()],
            rows.iter()
                .map(|(d, p)| {
                    Row::from([
                        ("date".to_string(), CellValue::infer(d)),
                        ("prix".to_string(), CellValue::infer(p)),
                    ])
                })
                .collect(),
        )
    }

    #[test]
    fn test_summary() {
        let t = table(&[("2023-01-01", "1.0"), ("2023-01-02", "2"), ("2023-01-03", "")]);
        let s = PriceSummary::compute(&t, "prix").unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 2.0);
        assert!((s.mean - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_summary_unavailable() {
        assert!(PriceSummary::compute(&table(&[]), "prix").is_none());
        assert!(PriceSummary::compute(&table(&[("2023-01-01", "x")]), "prix").is_none());
        assert!(PriceSummary::compute(&table(&[("2023-01-01", "1")]), "cost").is_none());
    }

    #[test]
    fn test_series_sorted_by_date() {
        let t = table(&[
            ("2023-03-01", "1.3"),
            ("2023-01-01", "1.1"),
            ("not a date", "9.9"),
            ("2023-02-01", "1.2"),
        ]);
        let prices: Vec<f64> = price_series(&t, "date", "prix")
            .unwrap()
            .iter()
            .map(|p| p.price)
            .collect();
        assert_eq!(prices, vec![1.1, 1.2, 1.3]);
        assert!(price_series(&t, "jour", "prix").is_none());
    }
}
