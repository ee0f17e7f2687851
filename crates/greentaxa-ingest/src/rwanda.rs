// SPDX-License-Identifier: Apache-2.0
//! Rwanda_Adaptation sheet: flat rows keyed by an eleven-field natural key.

use greentaxa_model::{ImportDefaults, RwandaRecord, SheetTable, TaxonomyDefaults};
use greentaxa_store::{get_or_create_taxonomy, upsert_rwanda, Store};

use crate::{IngestError, SheetReport};

pub fn import_rwanda_sheet(
    store: &mut Store,
    table: &SheetTable,
    defaults: &ImportDefaults,
) -> Result<SheetReport, IngestError> {
    let mut report = SheetReport::new(table.name());
    let tx = store
        .transaction()
        .map_err(|e| IngestError(e.to_string()))?;

    for row in table.rows() {
        if row.is_blank() {
            continue;
        }
        let taxonomy_name = row.get("taxonomy");
        let record = RwandaRecord {
            language: row.get_or("language", &defaults.language).to_string(),
            environmental_objective: row.get("environmental_objective").to_string(),
            sector: row.get("sector").to_string(),
            hazard: row.get("hazard").to_string(),
            division: row.get("division").to_string(),
            investment: row.get("investment").to_string(),
            row_type: row.get("type").to_string(),
            level: row.get("level").to_string(),
            criteria_type: row.pick(&["criteria type", "criteria_type"]).to_string(),
            expected_effect: row.pick(&["expected effect", "expected_effect"]).to_string(),
            expected_result: row.pick(&["expected result", "expected_result"]).to_string(),
            generic_dnsh: row.pick(&["generic dnsh", "generic_dnsh"]).to_string(),
            source_ref: row.get("source_ref").to_string(),
        };

        // The unique key cannot be satisfied with blanks; nothing is created
        // for such rows, not even the taxonomy.
        if taxonomy_name.is_empty() || !record.has_key_fields() {
            report.warn(
                Some(row.row_number),
                "missing one of taxonomy/environmental_objective/sector/hazard/division/investment; row skipped",
            );
            report.counters.skipped += 1;
            continue;
        }

        let taxonomy = get_or_create_taxonomy(
            &tx,
            taxonomy_name,
            &TaxonomyDefaults {
                region: defaults.region.clone(),
                language: defaults.language.clone(),
                dnsh_general: None,
                mss: None,
            },
        )
        .map_err(|e| IngestError(e.to_string()))?;
        let outcome =
            upsert_rwanda(&tx, taxonomy, &record).map_err(|e| IngestError(e.to_string()))?;
        report.record(outcome);
    }

    tx.commit().map_err(|e| IngestError(e.to_string()))?;
    Ok(report)
}
