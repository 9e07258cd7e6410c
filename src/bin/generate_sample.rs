//! Write a small sample catalog of price files.
//!
//! ```text
//! generate_sample [OUTPUT_DIR]        (default: data)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-spread, spread]`.
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * spread
    }
}

/// A product line: brand, type, size, origin and base price.
struct Product {
    brand: &'static str,
    kind: &'static str,
    size: &'static str,
    origin: &'static str,
    base_price: f64,
}

#[derive(Default)]
struct PriceRows {
    dates: Vec<NaiveDate>,
    brands: Vec<String>,
    kinds: Vec<String>,
    sizes: Vec<String>,
    origins: Vec<String>,
    prices: Vec<f64>,
}

/// Weekly prices for each product, drifting upwards with some noise.
fn weekly_prices(products: &[Product], weeks: i64, rng: &mut SimpleRng) -> PriceRows {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default();
    let mut rows = PriceRows::default();
    for week in 0..weeks {
        let date = start + Duration::weeks(week);
        for p in products {
            let drift = 1.0 + 0.004 * week as f64;
            let price = p.base_price * drift + rng.jitter(0.03 * p.base_price);
            rows.dates.push(date);
            rows.brands.push(p.brand.to_string());
            rows.kinds.push(p.kind.to_string());
            rows.sizes.push(p.size.to_string());
            rows.origins.push(p.origin.to_string());
            rows.prices.push((price * 100.0).round() / 100.0);
        }
    }
    rows
}

fn write_parquet(path: &Path, rows: &PriceRows) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let days: Vec<i32> = rows
        .dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("marque", DataType::Utf8, false),
        Field::new("type", DataType::Utf8, false),
        Field::new("gramage", DataType::Utf8, false),
        Field::new("origine", DataType::Utf8, false),
        Field::new("prix", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(days)),
            Arc::new(StringArray::from(rows.brands.clone())),
            Arc::new(StringArray::from(rows.kinds.clone())),
            Arc::new(StringArray::from(rows.sizes.clone())),
            Arc::new(StringArray::from(rows.origins.clone())),
            Arc::new(Float64Array::from(rows.prices.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

const HEADERS: [&str; 6] = ["date", "marque", "type", "gramage", "origine", "prix"];

fn write_xlsx(path: &Path, rows: &PriceRows) -> Result<()> {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let price_format = Format::new().set_num_format("0.00");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for i in 0..rows.dates.len() {
        let row = i as u32 + 1;
        let d = rows.dates[i];
        let date = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)?;
        sheet.write_datetime_with_format(row, 0, &date, &date_format)?;
        sheet.write_string(row, 1, rows.brands[i].as_str())?;
        sheet.write_string(row, 2, rows.kinds[i].as_str())?;
        sheet.write_string(row, 3, rows.sizes[i].as_str())?;
        sheet.write_string(row, 4, rows.origins[i].as_str())?;
        sheet.write_number_with_format(row, 5, rows.prices[i], &price_format)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(())
}

fn write_csv(path: &Path, rows: &PriceRows) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for i in 0..rows.dates.len() {
        writer.write_record([
            rows.dates[i].format("%Y-%m-%d").to_string(),
            rows.brands[i].clone(),
            rows.kinds[i].clone(),
            rows.sizes[i].clone(),
            rows.origins[i].clone(),
            format!("{:.2}", rows.prices[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let mut rng = SimpleRng::new(42);

    let milk = [
        Product { brand: "Lactel", kind: "Demi-écrémé", size: "1L", origin: "France", base_price: 1.20 },
        Product { brand: "Lactel", kind: "Entier", size: "1L", origin: "France", base_price: 1.32 },
        Product { brand: "Candia", kind: "Demi-écrémé", size: "1L", origin: "France", base_price: 1.15 },
        Product { brand: "Candia", kind: "Écrémé", size: "50cL", origin: "Belgique", base_price: 0.78 },
    ];
    let butter = [
        Product { brand: "Président", kind: "Doux", size: "250g", origin: "France", base_price: 2.65 },
        Product { brand: "Paysan Breton", kind: "Demi-sel", size: "250g", origin: "France", base_price: 2.89 },
        Product { brand: "Lurpak", kind: "Doux", size: "125g", origin: "Danemark", base_price: 2.10 },
    ];
    let insurance = [
        Product { brand: "MAIF", kind: "Tous risques", size: "Annuel", origin: "France", base_price: 612.0 },
        Product { brand: "Direct Assurance", kind: "Tiers", size: "Annuel", origin: "France", base_price: 348.0 },
    ];

    let yogurt = [
        Product { brand: "Danone", kind: "Nature", size: "4x125g", origin: "France", base_price: 1.45 },
        Product { brand: "Yoplait", kind: "Fruits", size: "8x125g", origin: "France", base_price: 2.35 },
    ];

    let dairy = root.join("Manufacturing").join("Alimentaire").join("Generale");
    let fresh = root.join("Manufacturing").join("Alimentaire").join("Frais");
    let auto = root.join("Assurance").join("Auto");
    for dir in [&dairy, &fresh, &auto, &root.join("Vide")] {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let files = [
        (dairy.join("lait.xlsx"), weekly_prices(&milk, 26, &mut rng)),
        (dairy.join("beurre.csv"), weekly_prices(&butter, 26, &mut rng)),
        (fresh.join("yaourt.parquet"), weekly_prices(&yogurt, 26, &mut rng)),
        (auto.join("prime_assurance.xlsx"), weekly_prices(&insurance, 12, &mut rng)),
    ];
    for (path, rows) in &files {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xlsx") => write_xlsx(path, rows)?,
            Some("parquet") => write_parquet(path, rows)?,
            _ => write_csv(path, rows)?,
        }
        println!("Wrote {} rows to {}", rows.prices.len(), path.display());
    }
    std::fs::write(root.join("README.txt"), "Sample price catalog\n")
        .context("writing README")?;

    Ok(())
}
