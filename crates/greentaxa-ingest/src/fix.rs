// SPDX-License-Identifier: Apache-2.0
//! One-shot repair for activities imported with the wrong criteria shape.

use greentaxa_model::{is_traffic_light, SC_TYPE_THRESHOLD};
use greentaxa_store::{activity_criteria_for_taxonomy, find_taxonomy_id, rewrite_activity_criteria, Store};

use crate::IngestError;

/// Rewrites every activity of `taxonomy` whose criteria got mislabeled:
/// `traffic_light` types become `threshold`, and when the substantial
/// contribution text is blank but the green column carries text, the text
/// moves over and the green column is cleared. Returns how many activities
/// changed.
pub fn fix_traffic_light_activities(store: &mut Store, taxonomy: &str) -> Result<u64, IngestError> {
    let tx = store
        .transaction()
        .map_err(|e| IngestError(e.to_string()))?;
    let taxonomy_id = find_taxonomy_id(&tx, taxonomy)
        .map_err(|e| IngestError(e.to_string()))?
        .ok_or_else(|| IngestError(format!("taxonomy '{taxonomy}' not found")))?;

    let mut updated = 0;
    for activity in
        activity_criteria_for_taxonomy(&tx, taxonomy_id).map_err(|e| IngestError(e.to_string()))?
    {
        let mut sc_type = activity.sc_criteria_type.clone();
        let mut substantial = activity.substantial_contribution_criteria.clone();
        let mut green = activity.sc_criteria_green.clone();
        let mut needs_update = false;

        if is_traffic_light(&sc_type) {
            sc_type = SC_TYPE_THRESHOLD.to_string();
            needs_update = true;
        }
        if substantial.trim().is_empty() && !green.trim().is_empty() {
            substantial = green.clone();
            green.clear();
            needs_update = true;
        }

        if needs_update {
            rewrite_activity_criteria(&tx, activity.id, &sc_type, &substantial, &green)
                .map_err(|e| IngestError(e.to_string()))?;
            updated += 1;
        }
    }

    tx.commit().map_err(|e| IngestError(e.to_string()))?;
    Ok(updated)
}
