//! pricedash command-line front-end.
//!
//! ```text
//! pricedash [--data-dir DIR] [--config FILE] [-v] tree [--json]
//! pricedash [--data-dir DIR] [--config FILE] [-v] show FILE [filters] [--rows N] [--export PATH]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use pricedash::state::{DashboardState, ViewStatus};
use pricedash::ui::{grid, panels};
use pricedash::DashboardConfig;

enum Command {
    Tree { json: bool },
    Show(ShowArgs),
}

#[derive(Default)]
struct ShowArgs {
    file: PathBuf,
    brand: Option<String>,
    kind: Option<String>,
    size: Option<String>,
    origin: Option<String>,
    extra: Vec<(String, String)>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    rows: Option<usize>,
    export: Option<PathBuf>,
}

struct Args {
    data_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
    command: Command,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return ExitCode::SUCCESS;
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e:#}");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("pricedash - browse, filter and export price spreadsheets");
    println!();
    println!("Usage:");
    println!("  pricedash [OPTIONS] tree [--json]");
    println!("  pricedash [OPTIONS] show FILE [SHOW OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --data-dir DIR    Catalog root (default: data)");
    println!("  -c, --config FILE     JSON configuration file");
    println!("  -v, --verbose         Debug logging (RUST_LOG overrides)");
    println!("  -h, --help            Show this help");
    println!();
    println!("Show options:");
    println!("  --brand V | --type V | --size V | --origin V");
    println!("                        Keep rows whose column contains V (case-insensitive)");
    println!("  --filter COL=V        Same, for any column");
    println!("  --min-price N         Inclusive lower price bound");
    println!("  --max-price N         Inclusive upper price bound");
    println!("  --rows N              Rows shown in the grid (default: 20)");
    println!("  --export PATH         Write the filtered rows as CSV (a directory gets the default name)");
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut data_dir = None;
    let mut config = None;
    let mut verbose = false;
    let mut command = None;

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-d" | "--data-dir" => data_dir = Some(PathBuf::from(value(&mut it, arg)?)),
            "-c" | "--config" => config = Some(PathBuf::from(value(&mut it, arg)?)),
            "-v" | "--verbose" => verbose = true,
            "tree" => {
                let mut json = false;
                for rest in it.by_ref() {
                    match rest.as_str() {
                        "--json" => json = true,
                        other => bail!("unknown tree option: {other}"),
                    }
                }
                command = Some(Command::Tree { json });
            }
            "show" => {
                command = Some(Command::Show(parse_show(&mut it)?));
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    Ok(Args {
        data_dir,
        config,
        verbose,
        command: command.context("missing command (tree or show)")?,
    })
}

fn parse_show(it: &mut std::slice::Iter<'_, String>) -> Result<ShowArgs> {
    let mut show = ShowArgs::default();
    let mut file = None;
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--brand" => show.brand = Some(value(it, arg)?.to_string()),
            "--type" => show.kind = Some(value(it, arg)?.to_string()),
            "--size" => show.size = Some(value(it, arg)?.to_string()),
            "--origin" => show.origin = Some(value(it, arg)?.to_string()),
            "--filter" => {
                let raw = value(it, arg)?;
                let (col, val) = raw
                    .split_once('=')
                    .with_context(|| format!("--filter expects COL=VALUE, got {raw}"))?;
                show.extra.push((col.to_string(), val.to_string()));
            }
            "--min-price" => show.min_price = Some(number(value(it, arg)?, arg)?),
            "--max-price" => show.max_price = Some(number(value(it, arg)?, arg)?),
            "--rows" => {
                let raw = value(it, arg)?;
                show.rows = Some(raw.parse().with_context(|| format!("{arg}: {raw}"))?);
            }
            "--export" => show.export = Some(PathBuf::from(value(it, arg)?)),
            other if other.starts_with('-') => bail!("unknown show option: {other}"),
            other => {
                if file.replace(PathBuf::from(other)).is_some() {
                    bail!("show takes a single FILE");
                }
            }
        }
    }
    show.file = file.context("show requires a FILE")?;
    Ok(show)
}

fn value<'a>(it: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a str> {
    it.next()
        .map(|s| s.as_str())
        .with_context(|| format!("{flag} expects a value"))
}

fn number(raw: &str, flag: &str) -> Result<f64> {
    raw.parse()
        .with_context(|| format!("{flag}: {raw} is not a number"))
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config = config.data_dir(dir);
    }

    let mut state = DashboardState::new(config);
    match args.command {
        Command::Tree { json } => {
            let scanned = state.refresh_catalog();
            if json {
                println!("{}", serde_json::to_string_pretty(&state.catalog)?);
            } else {
                println!("{}", panels::navigation(&state).trim_end());
            }
            if !scanned {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Show(show) => return show_file(&mut state, show),
    }
    Ok(ExitCode::SUCCESS)
}

fn show_file(state: &mut DashboardState, show: ShowArgs) -> Result<ExitCode> {
    let file = if show.file.exists() {
        show.file
    } else {
        state.config.data_dir.join(&show.file)
    };

    state.select_file(&file);
    if state.table.is_none() {
        eprintln!("{}", panels::status_line(&state.view_status()));
        return Ok(ExitCode::FAILURE);
    }
    if let Some(table) = state.table.as_deref() {
        println!("Loaded {} entries from {}", table.len(), file.display());
    }

    let roles = state.config.columns.clone();
    let predicates = [
        (&roles.brand, show.brand),
        (&roles.kind, show.kind),
        (&roles.size, show.size),
        (&roles.origin, show.origin),
    ];
    for (col, val) in predicates {
        if val.is_some() {
            state.set_column_filter(col, val);
        }
    }
    for (col, val) in show.extra {
        state.set_column_filter(&col, Some(val));
    }
    if show.min_price.is_some() || show.max_price.is_some() {
        let (lo, hi) = state
            .filters
            .range
            .as_ref()
            .map(|r| (r.min, r.max))
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        state.set_price_range(show.min_price.unwrap_or(lo), show.max_price.unwrap_or(hi));
    }

    let choices = panels::filter_choices(state);
    if !choices.is_empty() {
        println!("\n== Filters ==\n{choices}");
    }

    let status = state.view_status();
    println!("{}", panels::status_line(&status));
    if !matches!(status, ViewStatus::Rows(_)) {
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(summary) = state.summary() {
        println!("\n== Statistics ==\n{}", panels::statistics(&summary));
    }
    match state.series() {
        Some(points) if !points.is_empty() => {
            println!("== Price evolution ==\n{}", panels::series(&points));
        }
        _ => println!("No data for the price chart ('{}'/'{}' missing)\n", roles.date, roles.price),
    }
    if let Some(filtered) = &state.filtered {
        println!("== Data ==\n{}", grid::data_grid(filtered, show.rows.unwrap_or(20))?);
    }

    if let Some(target) = show.export {
        if let Some(export) = state.export_csv() {
            let (name, csv) = export?;
            let target = if target.is_dir() { target.join(name) } else { target };
            std::fs::write(&target, csv)
                .with_context(|| format!("writing {}", target.display()))?;
            println!("\nExported filtered rows to {}", target.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
