// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode as ProcessExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser, Subcommand};
use greentaxa_ingest::{fix_traffic_light_activities, run_import, ImportOptions, ImportReport};
use greentaxa_store::{find_taxonomy_id, store_summary, Store, StoreSummary};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "greentaxa")]
#[command(about = "Greentaxa catalog operations CLI")]
#[command(version)]
struct Cli {
    /// Machine-readable JSON on stdout.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// Print totals only, no per-sheet breakdown.
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    /// Also list individual row warnings.
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a taxonomy workbook into a catalog database.
    Import {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value = "data/db_taxonomies.xlsx")]
        file: PathBuf,
        /// Parse and report without writing to --db.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Fallback sector for whitelist rows that carry none.
        #[arg(long)]
        caso2_sector: Option<String>,
        /// Accepted for compatibility; general criteria carry no sector.
        #[arg(long)]
        caso3_sector: Option<String>,
    },
    /// Rewrite mislabeled traffic-light activities into threshold shape.
    FixActivities {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value = "EU")]
        taxonomy: String,
    },
    /// Per-entity row counts for a catalog database.
    Summary {
        #[arg(long)]
        db: PathBuf,
    },
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    Internal = 10,
}

struct CliError {
    code: ExitCode,
    message: String,
}

impl CliError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Validation,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Internal,
            message: message.into(),
        }
    }
}

struct Output {
    json: bool,
    quiet: bool,
    verbose: u8,
}

fn main() -> ProcessExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::Usage,
            };
            let _ = err.print();
            return ProcessExitCode::from(code as u8);
        }
    };
    init_tracing();
    match run(cli) {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            eprintln!("{}", err.message);
            ProcessExitCode::from(err.code as u8)
        }
    }
}

/// Importer events land on stderr so stdout stays parseable. Quiet unless
/// `RUST_LOG` opts in or a library emits at warn.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("GREENTAXA_LOG_JSON")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let out = Output {
        json: cli.json,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };
    match cli.command {
        Commands::Import {
            db,
            file,
            dry_run,
            caso2_sector,
            caso3_sector,
        } => import_workbook(
            ImportOptions {
                workbook: file,
                db,
                dry_run,
                caso2_sector,
                caso3_sector,
                ..ImportOptions::default()
            },
            &out,
        ),
        Commands::FixActivities { db, taxonomy } => fix_activities(&db, &taxonomy, &out),
        Commands::Summary { db } => summarize(&db, &out),
    }
}

fn import_workbook(opts: ImportOptions, out: &Output) -> Result<(), CliError> {
    let report = run_import(&opts).map_err(|e| CliError::validation(e.to_string()))?;
    print_report(&report, out)?;
    if report.has_failures() {
        let failed: Vec<&str> = report
            .sheets
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.sheet.as_str())
            .collect();
        return Err(CliError::validation(format!(
            "{} sheet(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )));
    }
    Ok(())
}

fn print_report(report: &ImportReport, out: &Output) -> Result<(), CliError> {
    if out.json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).map_err(|e| CliError::internal(e.to_string()))?
        );
        return Ok(());
    }
    if !out.quiet {
        for sheet in &report.sheets {
            match &sheet.error {
                Some(error) => println!("{}: FAILED ({error})", sheet.sheet),
                None => println!(
                    "{}: created={} updated={} skipped={} warnings={}",
                    sheet.sheet,
                    sheet.counters.created,
                    sheet.counters.updated,
                    sheet.counters.skipped,
                    sheet.counters.warnings
                ),
            }
            if out.verbose > 0 {
                for warning in &sheet.warnings {
                    println!("  {warning}");
                }
            }
        }
    }
    let totals = report.totals;
    println!(
        "total{}: created={} updated={} skipped={} warnings={}",
        if report.dry_run { " (dry run)" } else { "" },
        totals.created,
        totals.updated,
        totals.skipped,
        totals.warnings
    );
    Ok(())
}

fn fix_activities(db: &Path, taxonomy: &str, out: &Output) -> Result<(), CliError> {
    if !db.exists() {
        return Err(CliError::validation(format!(
            "database '{}' not found",
            db.display()
        )));
    }
    let mut store = Store::open(db).map_err(|e| CliError::internal(e.to_string()))?;
    find_taxonomy_id(store.connection(), taxonomy)
        .map_err(|e| CliError::internal(e.to_string()))?
        .ok_or_else(|| CliError::validation(format!("taxonomy '{taxonomy}' not found")))?;
    let rewritten = fix_traffic_light_activities(&mut store, taxonomy)
        .map_err(|e| CliError::internal(e.to_string()))?;
    if out.json {
        println!("{}", json!({ "taxonomy": taxonomy, "rewritten": rewritten }));
    } else {
        println!("rewrote {rewritten} activities for '{taxonomy}'");
    }
    Ok(())
}

fn summarize(db: &Path, out: &Output) -> Result<(), CliError> {
    let store = Store::open_read_only(db).map_err(|e| {
        CliError::validation(format!("cannot open database '{}': {e}", db.display()))
    })?;
    let summary =
        store_summary(store.connection()).map_err(|e| CliError::internal(e.to_string()))?;
    if out.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary_json(&summary))
                .map_err(|e| CliError::internal(e.to_string()))?
        );
    } else {
        println!("taxonomies={}", summary.taxonomies);
        println!("objectives={}", summary.objectives);
        println!("sectors={}", summary.sectors);
        println!("subsectors={}", summary.subsectors);
        println!("activities={}", summary.activities);
        println!("practices={}", summary.practices);
        println!("rwanda_rows={}", summary.rwanda_rows);
        println!("whitelist_entries={}", summary.whitelist_entries);
        println!("general_criteria={}", summary.general_criteria);
    }
    Ok(())
}

fn summary_json(summary: &StoreSummary) -> serde_json::Value {
    json!({
        "taxonomies": summary.taxonomies,
        "objectives": summary.objectives,
        "sectors": summary.sectors,
        "subsectors": summary.subsectors,
        "activities": summary.activities,
        "practices": summary.practices,
        "rwanda_rows": summary.rwanda_rows,
        "whitelist_entries": summary.whitelist_entries,
        "general_criteria": summary.general_criteria,
    })
}
