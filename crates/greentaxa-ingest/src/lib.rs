// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]
//! Workbook importer: main taxonomy sheet plus the optional
//! Rwanda_Adaptation, whitelist (CASO2) and general-criteria (CASO3) sheets.
//!
//! Row-level problems become warnings and never abort the batch; a sheet
//! aborts (and rolls back) only on missing mandatory columns. Each sheet is
//! one transaction.

mod cases;
mod fix;
mod main_sheet;
mod rwanda;
mod workbook;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use greentaxa_model::ImportDefaults;
use greentaxa_store::{Store, Upsert};
use serde::Serialize;
use tracing::{error, info, warn};

pub use cases::{import_general_criteria_sheet, import_whitelist_sheet};
pub use fix::fix_traffic_light_activities;
pub use main_sheet::{import_main_sheet, REQUIRED_MAIN_COLUMNS};
pub use rwanda::import_rwanda_sheet;
pub use workbook::{cell_to_string, Workbook, CASO2_SHEET_NAMES, CASO3_SHEET_NAMES, RWANDA_SHEET_NAME};

pub const CRATE_NAME: &str = "greentaxa-ingest";

#[derive(Debug)]
pub struct IngestError(pub String);

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for IngestError {}

/// One import run. `db` is ignored when `dry_run` is set; the pipeline then
/// writes into a throwaway in-memory store so the counters still reflect
/// real upsert outcomes.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub workbook: PathBuf,
    pub db: PathBuf,
    pub dry_run: bool,
    /// Sector to fall back to for CASO2 rows without one.
    pub caso2_sector: Option<String>,
    /// Accepted for command-line compatibility; general criteria carry no
    /// sector, so the value is never read.
    pub caso3_sector: Option<String>,
    pub defaults: ImportDefaults,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub warnings: u64,
}

impl Counters {
    pub fn add(&mut self, other: Counters) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.warnings += other.warnings;
    }
}

/// A per-row data-quality note. `row` is the spreadsheet row number (header
/// is row 1); sheet-level warnings carry no row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub row: Option<usize>,
    pub message: String,
}

impl Display for RowWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {row}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    pub counters: Counters,
    pub warnings: Vec<RowWarning>,
    pub error: Option<String>,
}

impl SheetReport {
    fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            counters: Counters::default(),
            warnings: Vec::new(),
            error: None,
        }
    }

    fn failed(sheet: impl Into<String>, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(sheet)
        }
    }

    fn warn(&mut self, row: Option<usize>, message: impl Into<String>) {
        let message = message.into();
        warn!(sheet = %self.sheet, row, %message, "row warning");
        self.counters.warnings += 1;
        self.warnings.push(RowWarning { row, message });
    }

    fn record(&mut self, outcome: Upsert) {
        if outcome.created() {
            self.counters.created += 1;
        } else {
            self.counters.updated += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub dry_run: bool,
    pub sheets: Vec<SheetReport>,
    pub totals: Counters,
}

impl ImportReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            sheets: Vec::new(),
            totals: Counters::default(),
        }
    }

    fn push(&mut self, sheet: SheetReport) {
        match &sheet.error {
            Some(error) => error!(sheet = %sheet.sheet, %error, "sheet import failed"),
            None => info!(
                sheet = %sheet.sheet,
                created = sheet.counters.created,
                updated = sheet.counters.updated,
                skipped = sheet.counters.skipped,
                warnings = sheet.counters.warnings,
                "sheet imported"
            ),
        }
        self.totals.add(sheet.counters);
        self.sheets.push(sheet);
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.sheets.iter().any(|s| s.error.is_some())
    }
}

/// Import a whole workbook. The main sheet is the first sheet by position
/// and is mandatory; the three named auxiliary sheets are imported when
/// present and skipped silently otherwise. A sheet-level failure is recorded
/// in that sheet's report and the remaining sheets still run.
pub fn run_import(opts: &ImportOptions) -> Result<ImportReport, IngestError> {
    let mut workbook = Workbook::open(&opts.workbook)?;
    let mut store = if opts.dry_run {
        Store::open_in_memory()
    } else {
        Store::open(&opts.db)
    }
    .map_err(|e| IngestError(e.to_string()))?;

    let mut report = ImportReport::new(opts.dry_run);

    let main = workbook.first_sheet()?.ok_or_else(|| {
        IngestError(format!("workbook '{}' has no sheets", opts.workbook.display()))
    })?;
    report.push(
        import_main_sheet(&mut store, &main, &opts.defaults)
            .unwrap_or_else(|e| SheetReport::failed(main.name(), e.to_string())),
    );

    if let Some(table) = workbook.sheet_by_name(RWANDA_SHEET_NAME)? {
        report.push(
            import_rwanda_sheet(&mut store, &table, &opts.defaults)
                .unwrap_or_else(|e| SheetReport::failed(table.name(), e.to_string())),
        );
    }
    if let Some(table) = workbook.sheet_by_candidates(&CASO2_SHEET_NAMES)? {
        report.push(
            import_whitelist_sheet(&mut store, &table, &opts.defaults, opts.caso2_sector.as_deref())
                .unwrap_or_else(|e| SheetReport::failed(table.name(), e.to_string())),
        );
    }
    if let Some(table) = workbook.sheet_by_candidates(&CASO3_SHEET_NAMES)? {
        report.push(
            import_general_criteria_sheet(&mut store, &table, &opts.defaults)
                .unwrap_or_else(|e| SheetReport::failed(table.name(), e.to_string())),
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_absorb_sheet_counters() {
        let mut report = ImportReport::new(false);
        let mut a = SheetReport::new("Main");
        a.counters.created = 3;
        a.warn(Some(4), "whatever");
        let mut b = SheetReport::new("CASO2");
        b.counters.updated = 2;
        b.counters.skipped = 1;
        report.push(a);
        report.push(b);
        assert_eq!(
            report.totals,
            Counters {
                created: 3,
                updated: 2,
                skipped: 1,
                warnings: 1
            }
        );
        assert!(!report.has_failures());
        report.push(SheetReport::failed("CASO3", "missing columns".into()));
        assert!(report.has_failures());
    }

    #[test]
    fn warning_rendering_includes_row_numbers() {
        let with_row = RowWarning {
            row: Some(7),
            message: "bad cell".into(),
        };
        assert_eq!(with_row.to_string(), "row 7: bad cell");
        let sheet_level = RowWarning {
            row: None,
            message: "column absent".into(),
        };
        assert_eq!(sheet_level.to_string(), "column absent");
    }

    #[test]
    fn report_serializes_for_machine_consumers() {
        let mut report = ImportReport::new(true);
        let mut sheet = SheetReport::new("Rwanda_Adaptation");
        sheet.counters.created = 1;
        sheet.warn(Some(3), "missing hazard");
        report.push(sheet);

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["totals"]["created"], 1);
        assert_eq!(json["sheets"][0]["sheet"], "Rwanda_Adaptation");
        assert_eq!(json["sheets"][0]["warnings"][0]["row"], 3);
        assert_eq!(json["sheets"][0]["error"], serde_json::Value::Null);
    }
}
