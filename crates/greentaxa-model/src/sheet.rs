// SPDX-License-Identifier: Apache-2.0
//! Typed row access over a materialized sheet.
//!
//! Column names are matched case-insensitively against trimmed, lowercased
//! headers; cell access is total (absent or blank cells read as `""`).

use std::collections::BTreeMap;

/// One sheet, already converted to trimmed strings at the workbook boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    name: String,
    headers: Vec<String>,
    columns: BTreeMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Headers are trimmed and lowercased; the first occurrence wins when a
    /// header repeats. Cells are trimmed; short rows read as blank on the
    /// missing tail.
    #[must_use]
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let mut columns = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            columns.entry(header.clone()).or_insert(idx);
        }
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.trim().to_string()).collect())
            .collect();
        Self {
            name: name.into(),
            headers,
            columns,
            rows,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(&column.trim().to_lowercase())
    }

    /// Required columns absent from this sheet, in the order given.
    #[must_use]
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| (*c).to_string())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().enumerate().map(|(idx, cells)| RowView {
            columns: &self.columns,
            cells,
            // Header row is spreadsheet row 1; data starts at 2.
            row_number: idx + 2,
        })
    }
}

/// Borrowed view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a BTreeMap<String, usize>,
    cells: &'a [String],
    /// 1-based spreadsheet row number, counting the header row.
    pub row_number: usize,
}

impl<'a> RowView<'a> {
    /// Cell under `column`, `""` when the column is absent or the row is
    /// short.
    #[must_use]
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(&column.trim().to_lowercase())
            .and_then(|idx| self.cells.get(*idx))
            .map_or("", String::as_str)
    }

    /// Like [`Self::get`], but blank resolves to `default`.
    #[must_use]
    pub fn get_or(&self, column: &str, default: &'a str) -> &'a str {
        let value = self.get(column);
        if value.is_empty() {
            default
        } else {
            value
        }
    }

    /// First non-blank value among candidate column names, else `""`.
    #[must_use]
    pub fn pick(&self, candidates: &[&str]) -> &'a str {
        for candidate in candidates {
            let value = self.get(candidate);
            if !value.is_empty() {
                return value;
            }
        }
        ""
    }

    /// Like [`Self::pick`], but blank resolves to `default`.
    #[must_use]
    pub fn pick_or(&self, candidates: &[&str], default: &'a str) -> &'a str {
        let value = self.pick(candidates);
        if value.is_empty() {
            default
        } else {
            value
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }
}
