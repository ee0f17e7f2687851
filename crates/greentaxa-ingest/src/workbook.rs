// SPDX-License-Identifier: Apache-2.0
//! Calamine boundary: materializes worksheets into [`SheetTable`]s.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use greentaxa_model::SheetTable;

use crate::IngestError;

/// Exact name of the Rwanda adaptation sheet.
pub const RWANDA_SHEET_NAME: &str = "Rwanda_Adaptation";
/// Accepted names for the whitelist-by-sector sheet, tried in order.
pub const CASO2_SHEET_NAMES: [&str; 5] =
    ["CASO2 (CR-PAN)", "Caso2_CR_PAN", "CASO2", "Case2", "caso2"];
/// Accepted names for the general-criteria sheet, tried in order.
pub const CASO3_SHEET_NAMES: [&str; 5] =
    ["CASO3 (CR-PAN)", "Caso3_CR_PAN", "CASO3", "Case3", "caso3"];

/// Total conversion from a spreadsheet cell to a string. Error cells read as
/// blank, the same as absent cells; integral floats drop the trailing `.0`.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{f}"),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{dt}"),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

pub struct Workbook {
    inner: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let inner = open_workbook_auto(path)
            .map_err(|e| IngestError(format!("cannot open workbook '{}': {e}", path.display())))?;
        Ok(Self { inner })
    }

    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    /// The main sheet is the first one by position, whatever its name.
    pub fn first_sheet(&mut self) -> Result<Option<SheetTable>, IngestError> {
        let Some(name) = self.sheet_names().into_iter().next() else {
            return Ok(None);
        };
        self.sheet_by_name(&name)
    }

    pub fn sheet_by_name(&mut self, name: &str) -> Result<Option<SheetTable>, IngestError> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| IngestError(format!("cannot read sheet '{name}': {e}")))?;
        Ok(Some(range_to_table(name, &range)))
    }

    /// First candidate name that exists in the workbook wins.
    pub fn sheet_by_candidates(
        &mut self,
        candidates: &[&str],
    ) -> Result<Option<SheetTable>, IngestError> {
        for name in candidates {
            if let Some(table) = self.sheet_by_name(name)? {
                return Ok(Some(table));
            }
        }
        Ok(None)
    }
}

fn range_to_table(name: &str, range: &calamine::Range<Data>) -> SheetTable {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    SheetTable::new(name, headers, data)
}
