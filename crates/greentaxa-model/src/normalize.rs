// SPDX-License-Identifier: Apache-2.0
//! Spreadsheet value normalization: practice-level alias resolution, title
//! synthesis, and the default values applied during import.

use std::collections::BTreeMap;

use crate::constants::{
    CONTRIBUTION_NONE, PRACTICE_LEVEL_ADDITIONAL_GREEN, REGION_OTHER, SC_TYPE_THRESHOLD,
};

/// Longest synthesized title, in characters.
pub const TITLE_MAX_LEN: usize = 120;
pub const UNTITLED: &str = "Untitled";
pub const ELLIPSIS: char = '…';

/// Alias table resolving source-sheet practice levels (English and Spanish,
/// accented and unaccented spellings) to the canonical tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAliasTable {
    pub aliases: BTreeMap<String, String>,
}

impl Default for LevelAliasTable {
    fn default() -> Self {
        let pairs: &[(&str, &str)] = &[
            ("basic", "basic"),
            ("básico", "basic"),
            ("basico", "basic"),
            ("intermediate", "intermediate"),
            ("intermedio", "intermediate"),
            ("advanced", "advanced"),
            ("avanzado", "advanced"),
            ("amber", "amber"),
            ("ámbar", "amber"),
            ("ambar", "amber"),
            ("red", "red"),
            (PRACTICE_LEVEL_ADDITIONAL_GREEN, PRACTICE_LEVEL_ADDITIONAL_GREEN),
            ("additional green practices", PRACTICE_LEVEL_ADDITIONAL_GREEN),
            ("green additional", PRACTICE_LEVEL_ADDITIONAL_GREEN),
            ("adicionales elegibles verdes", PRACTICE_LEVEL_ADDITIONAL_GREEN),
            ("practicas verdes elegibles adicionales", PRACTICE_LEVEL_ADDITIONAL_GREEN),
            ("prácticas verdes elegibles adicionales", PRACTICE_LEVEL_ADDITIONAL_GREEN),
        ];
        let aliases = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { aliases }
    }
}

impl LevelAliasTable {
    /// Lowercases and trims, then resolves through the alias table.
    /// Unrecognized values pass through unchanged so the later allow-list
    /// check can report them.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> String {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return String::new();
        }
        self.aliases.get(&needle).cloned().unwrap_or(needle)
    }
}

#[must_use]
pub fn normalize_practice_level(raw: &str, table: &LevelAliasTable) -> String {
    table.resolve(raw)
}

/// First non-blank candidate, truncated to `max_len - 1` characters plus an
/// ellipsis when longer than `max_len`; `"Untitled"` when all are blank.
#[must_use]
pub fn synth_title(parts: &[&str], max_len: usize) -> String {
    for part in parts {
        let candidate = part.trim();
        if candidate.is_empty() {
            continue;
        }
        if candidate.chars().count() > max_len {
            let mut truncated: String = candidate.chars().take(max_len - 1).collect();
            truncated.push(ELLIPSIS);
            return truncated;
        }
        return candidate.to_string();
    }
    UNTITLED.to_string()
}

/// Default cell values applied by the importer, passed explicitly instead of
/// read from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDefaults {
    pub region: String,
    /// Main sheet and Rwanda_Adaptation rows.
    pub language: String,
    /// CASO2/CASO3 auxiliary sheets.
    pub case_language: String,
    pub contribution_type: String,
    pub sc_criteria_type: String,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            region: REGION_OTHER.to_string(),
            language: "EN".to_string(),
            case_language: "ES".to_string(),
            contribution_type: CONTRIBUTION_NONE.to_string(),
            sc_criteria_type: SC_TYPE_THRESHOLD.to_string(),
        }
    }
}
