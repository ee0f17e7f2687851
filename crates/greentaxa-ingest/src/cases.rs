// SPDX-License-Identifier: Apache-2.0
//! CASO2/CASO3 auxiliary sheets: adaptation whitelists per sector and
//! sector-less general criteria. Column names arrive in English or Spanish.

use greentaxa_model::{
    synth_title, GeneralCriterionRecord, ImportDefaults, SheetTable, TaxonomyDefaults,
    WhitelistRecord, TITLE_MAX_LEN,
};
use greentaxa_store::{
    get_or_create_objective, get_or_create_sector, get_or_create_taxonomy,
    upsert_general_criterion, upsert_whitelist, Store,
};

use crate::{IngestError, SheetReport};

const OBJECTIVE_ALIASES: [&str; 3] = ["environmental_objective", "objective", "objetivo"];
const TITLE_ALIASES: [&str; 3] = ["title", "titulo", "título"];

fn check_case_columns(table: &SheetTable) -> Result<(), IngestError> {
    let missing = table.missing_columns(&["taxonomy", "environmental_objective"]);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError(format!(
            "sheet '{}' is missing required columns: {}",
            table.name(),
            missing.join(", ")
        )))
    }
}

fn taxonomy_defaults(defaults: &ImportDefaults) -> TaxonomyDefaults {
    TaxonomyDefaults {
        region: defaults.region.clone(),
        language: defaults.language.clone(),
        dnsh_general: None,
        mss: None,
    }
}

/// CASO2: one whitelist entry per row, keyed by (taxonomy, objective, sector,
/// title). Rows without a sector fall back to `sector_override`; rows with
/// neither are skipped. A missing title is synthesized from the first
/// non-blank of eligible activities, description, and sector name.
pub fn import_whitelist_sheet(
    store: &mut Store,
    table: &SheetTable,
    defaults: &ImportDefaults,
    sector_override: Option<&str>,
) -> Result<SheetReport, IngestError> {
    check_case_columns(table)?;
    let mut report = SheetReport::new(table.name());
    let tx = store
        .transaction()
        .map_err(|e| IngestError(e.to_string()))?;

    for row in table.rows() {
        if row.is_blank() {
            continue;
        }
        let taxonomy_name = row.get("taxonomy");
        let objective_name = row.pick(&OBJECTIVE_ALIASES);
        if taxonomy_name.is_empty() || objective_name.is_empty() {
            report.warn(
                Some(row.row_number),
                "blank taxonomy or environmental_objective; row skipped",
            );
            report.counters.skipped += 1;
            continue;
        }
        let sector_name = {
            let from_sheet = row.get("sector");
            if from_sheet.is_empty() {
                sector_override.map_or("", str::trim)
            } else {
                from_sheet
            }
        };
        if sector_name.is_empty() {
            report.warn(
                Some(row.row_number),
                "no sector in the sheet and no override given; row skipped",
            );
            report.counters.skipped += 1;
            continue;
        }

        let description = row.pick(&["description", "descripcion", "descripción"]);
        let eligible = row.pick(&[
            "eligible_activities",
            "eligible_practices",
            "acciones_elegibles",
            "ejemplos",
        ]);
        let given_title = row.pick(&TITLE_ALIASES);
        let title = if given_title.is_empty() {
            synth_title(&[eligible, description, sector_name], TITLE_MAX_LEN)
        } else {
            given_title.to_string()
        };

        let taxonomy = get_or_create_taxonomy(&tx, taxonomy_name, &taxonomy_defaults(defaults))
            .map_err(|e| IngestError(e.to_string()))?;
        let objective = get_or_create_objective(&tx, taxonomy, objective_name)
            .map_err(|e| IngestError(e.to_string()))?;
        let sector = get_or_create_sector(&tx, taxonomy, objective, sector_name)
            .map_err(|e| IngestError(e.to_string()))?;

        let record = WhitelistRecord {
            language: row.get_or("language", &defaults.case_language).to_string(),
            title,
            description: description.to_string(),
            eligible_activities: eligible.to_string(),
        };
        let outcome = upsert_whitelist(&tx, taxonomy, objective, sector, &record)
            .map_err(|e| IngestError(e.to_string()))?;
        report.record(outcome);
    }

    tx.commit().map_err(|e| IngestError(e.to_string()))?;
    Ok(report)
}

/// CASO3: general criteria keyed by (taxonomy, objective, title, subcriteria).
/// No sector column applies. A missing title is synthesized from the first
/// non-blank of criteria, subcriteria, and objective name.
pub fn import_general_criteria_sheet(
    store: &mut Store,
    table: &SheetTable,
    defaults: &ImportDefaults,
) -> Result<SheetReport, IngestError> {
    check_case_columns(table)?;
    let mut report = SheetReport::new(table.name());
    let tx = store
        .transaction()
        .map_err(|e| IngestError(e.to_string()))?;

    for row in table.rows() {
        if row.is_blank() {
            continue;
        }
        let taxonomy_name = row.get("taxonomy");
        let objective_name = row.pick(&OBJECTIVE_ALIASES);
        if taxonomy_name.is_empty() || objective_name.is_empty() {
            report.warn(
                Some(row.row_number),
                "blank taxonomy or environmental_objective; row skipped",
            );
            report.counters.skipped += 1;
            continue;
        }

        let criteria = row.pick(&["criteria", "criterion", "criterio"]);
        let subcriteria = row.pick(&["subcriteria", "subcriterio", "detalle"]);
        let given_title = row.pick(&TITLE_ALIASES);
        let title = if given_title.is_empty() {
            synth_title(&[criteria, subcriteria, objective_name], TITLE_MAX_LEN)
        } else {
            given_title.to_string()
        };

        let taxonomy = get_or_create_taxonomy(&tx, taxonomy_name, &taxonomy_defaults(defaults))
            .map_err(|e| IngestError(e.to_string()))?;
        let objective = get_or_create_objective(&tx, taxonomy, objective_name)
            .map_err(|e| IngestError(e.to_string()))?;

        let record = GeneralCriterionRecord {
            language: row.get_or("language", &defaults.case_language).to_string(),
            title,
            criteria: criteria.to_string(),
            subcriteria: subcriteria.to_string(),
        };
        let outcome = upsert_general_criterion(&tx, taxonomy, objective, &record)
            .map_err(|e| IngestError(e.to_string()))?;
        report.record(outcome);
    }

    tx.commit().map_err(|e| IngestError(e.to_string()))?;
    Ok(report)
}
