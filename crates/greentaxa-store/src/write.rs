// SPDX-License-Identifier: Apache-2.0
//! Upsert-by-natural-key primitives.
//!
//! Upserts are select-then-write so callers can count created vs updated
//! rows; the select compares the nullable subsector with IS, which treats
//! two NULLs as equal.

use greentaxa_model::{
    ActivityDraft, GeneralCriterionRecord, PracticeCriteria, PracticeDraft, RwandaRecord,
    ScCriteria, TaxonomyDefaults, WhitelistRecord,
};
use rusqlite::{params, Connection, OptionalExtension};

use crate::StoreError;

/// Outcome of an update-or-create, carrying the row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created(i64),
    Updated(i64),
}

impl Upsert {
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }

    #[must_use]
    pub fn created(self) -> bool {
        matches!(self, Self::Created(_))
    }
}

pub fn find_taxonomy_id(conn: &Connection, name: &str) -> Result<Option<i64>, StoreError> {
    conn.query_row("SELECT id FROM taxonomy WHERE name = ?1", params![name], |row| {
        row.get(0)
    })
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

/// Update-or-create by taxonomy name. `dnsh_general`/`mss` stay untouched
/// when the workbook had no such columns.
pub fn upsert_taxonomy(
    conn: &Connection,
    name: &str,
    defaults: &TaxonomyDefaults,
) -> Result<Upsert, StoreError> {
    if let Some(id) = find_taxonomy_id(conn, name)? {
        conn.execute(
            "UPDATE taxonomy SET region = ?2, language = ?3,
               dnsh_general = COALESCE(?4, dnsh_general),
               mss = COALESCE(?5, mss)
             WHERE id = ?1",
            params![
                id,
                defaults.region,
                defaults.language,
                defaults.dnsh_general,
                defaults.mss
            ],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        return Ok(Upsert::Updated(id));
    }
    conn.execute(
        "INSERT INTO taxonomy (name, region, language, dnsh_general, mss)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            name,
            defaults.region,
            defaults.language,
            defaults.dnsh_general.clone().unwrap_or_default(),
            defaults.mss.clone().unwrap_or_default()
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(Upsert::Created(conn.last_insert_rowid()))
}

/// Get-or-create by name, used by the auxiliary sheets: an existing
/// taxonomy keeps its stored region/language untouched.
pub fn get_or_create_taxonomy(
    conn: &Connection,
    name: &str,
    defaults: &TaxonomyDefaults,
) -> Result<i64, StoreError> {
    if let Some(id) = find_taxonomy_id(conn, name)? {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO taxonomy (name, region, language, dnsh_general, mss)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            name,
            defaults.region,
            defaults.language,
            defaults.dnsh_general.clone().unwrap_or_default(),
            defaults.mss.clone().unwrap_or_default()
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_objective(
    conn: &Connection,
    taxonomy_id: i64,
    generic_name: &str,
) -> Result<i64, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM objective WHERE taxonomy_id = ?1 AND generic_name = ?2",
            params![taxonomy_id, generic_name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO objective (taxonomy_id, generic_name) VALUES (?1, ?2)",
        params![taxonomy_id, generic_name],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_sector(
    conn: &Connection,
    taxonomy_id: i64,
    objective_id: i64,
    name: &str,
) -> Result<i64, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM sector WHERE taxonomy_id = ?1 AND objective_id = ?2 AND name = ?3",
            params![taxonomy_id, objective_id, name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO sector (taxonomy_id, objective_id, name) VALUES (?1, ?2, ?3)",
        params![taxonomy_id, objective_id, name],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_subsector(
    conn: &Connection,
    sector_id: i64,
    name: &str,
) -> Result<i64, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM subsector WHERE sector_id = ?1 AND name = ?2",
            params![sector_id, name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO subsector (sector_id, name) VALUES (?1, ?2)",
        params![sector_id, name],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Upsert an Activity by (taxonomy, objective, sector, subsector, name).
/// The criteria variant decides which column group is written; the inactive
/// group is cleared regardless of what a previous import stored.
pub fn upsert_activity(
    conn: &Connection,
    taxonomy_id: i64,
    objective_id: i64,
    sector_id: i64,
    subsector_id: Option<i64>,
    draft: &ActivityDraft,
) -> Result<Upsert, StoreError> {
    let (sc_type, substantial, non_eligibility, green, amber, red) = match &draft.criteria {
        ScCriteria::Threshold {
            substantial_contribution,
            non_eligibility,
        } => (
            "threshold",
            substantial_contribution.as_str(),
            non_eligibility.as_str(),
            "",
            "",
            "",
        ),
        ScCriteria::TrafficLight { green, amber, red } => (
            "traffic_light",
            "",
            "",
            green.as_str(),
            amber.as_str(),
            red.as_str(),
        ),
    };

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM activity
             WHERE taxonomy_id = ?1 AND objective_id = ?2 AND sector_id = ?3
               AND subsector_id IS ?4 AND name = ?5",
            params![taxonomy_id, objective_id, sector_id, subsector_id, draft.name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE activity SET
               taxonomy_code = ?2, economic_code_system = ?3, economic_code = ?4,
               description = ?5, contribution_type = ?6, sc_criteria_type = ?7,
               substantial_contribution_criteria = ?8, non_eligibility_criteria = ?9,
               sc_criteria_green = ?10, sc_criteria_amber = ?11, sc_criteria_red = ?12,
               dnsh_climate_mitigation = ?13, dnsh_climate_adaptation = ?14, dnsh_water = ?15,
               dnsh_circular_economy = ?16, dnsh_pollution_prevention = ?17,
               dnsh_biodiversity = ?18, dnsh_land_management = ?19
             WHERE id = ?1",
            params![
                id,
                draft.taxonomy_code,
                draft.economic_code_system,
                draft.economic_code,
                draft.description,
                draft.contribution_type,
                sc_type,
                substantial,
                non_eligibility,
                green,
                amber,
                red,
                draft.dnsh.climate_mitigation,
                draft.dnsh.climate_adaptation,
                draft.dnsh.water,
                draft.dnsh.circular_economy,
                draft.dnsh.pollution_prevention,
                draft.dnsh.biodiversity,
                draft.dnsh.land_management
            ],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        return Ok(Upsert::Updated(id));
    }

    conn.execute(
        "INSERT INTO activity (
           taxonomy_id, objective_id, sector_id, subsector_id,
           taxonomy_code, economic_code_system, economic_code, name, description,
           contribution_type, sc_criteria_type,
           substantial_contribution_criteria, non_eligibility_criteria,
           sc_criteria_green, sc_criteria_amber, sc_criteria_red,
           dnsh_climate_mitigation, dnsh_climate_adaptation, dnsh_water,
           dnsh_circular_economy, dnsh_pollution_prevention, dnsh_biodiversity,
           dnsh_land_management
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                   ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
        params![
            taxonomy_id,
            objective_id,
            sector_id,
            subsector_id,
            draft.taxonomy_code,
            draft.economic_code_system,
            draft.economic_code,
            draft.name,
            draft.description,
            draft.contribution_type,
            sc_type,
            substantial,
            non_eligibility,
            green,
            amber,
            red,
            draft.dnsh.climate_mitigation,
            draft.dnsh.climate_adaptation,
            draft.dnsh.water,
            draft.dnsh.circular_economy,
            draft.dnsh.pollution_prevention,
            draft.dnsh.biodiversity,
            draft.dnsh.land_management
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(Upsert::Created(conn.last_insert_rowid()))
}

/// Upsert a Practice by (taxonomy, objective, sector, subsector, level, name).
pub fn upsert_practice(
    conn: &Connection,
    taxonomy_id: i64,
    objective_id: i64,
    sector_id: i64,
    subsector_id: Option<i64>,
    draft: &PracticeDraft,
) -> Result<Upsert, StoreError> {
    let (eligible, non_eligible, green, amber, red) = match &draft.criteria {
        PracticeCriteria::Eligibility {
            eligible,
            non_eligible,
        } => (eligible.as_str(), non_eligible.as_str(), "", "", ""),
        PracticeCriteria::Traffic { green, amber, red } => {
            ("", "", green.as_str(), amber.as_str(), red.as_str())
        }
    };

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM practice
             WHERE taxonomy_id = ?1 AND objective_id = ?2 AND sector_id = ?3
               AND subsector_id IS ?4 AND practice_level = ?5 AND practice_name = ?6",
            params![
                taxonomy_id,
                objective_id,
                sector_id,
                subsector_id,
                draft.level,
                draft.name
            ],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE practice SET
               practice_description = ?2, eligible_practices = ?3, non_eligible_practices = ?4,
               green_practices = ?5, amber_practices = ?6, red_practices = ?7
             WHERE id = ?1",
            params![
                id,
                draft.description,
                eligible,
                non_eligible,
                green,
                amber,
                red
            ],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        return Ok(Upsert::Updated(id));
    }

    conn.execute(
        "INSERT INTO practice (
           taxonomy_id, objective_id, sector_id, subsector_id,
           practice_level, practice_name, practice_description,
           eligible_practices, non_eligible_practices,
           green_practices, amber_practices, red_practices
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            taxonomy_id,
            objective_id,
            sector_id,
            subsector_id,
            draft.level,
            draft.name,
            draft.description,
            eligible,
            non_eligible,
            green,
            amber,
            red
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(Upsert::Created(conn.last_insert_rowid()))
}

/// Upsert a Rwanda row by its eleven-field natural key; only the non-key
/// fields (language, generic_dnsh, source_ref) are refreshed on update.
pub fn upsert_rwanda(
    conn: &Connection,
    taxonomy_id: i64,
    record: &RwandaRecord,
) -> Result<Upsert, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM rwanda_adaptation
             WHERE taxonomy_id = ?1 AND environmental_objective = ?2 AND sector = ?3
               AND hazard = ?4 AND division = ?5 AND investment = ?6
               AND row_type = ?7 AND level = ?8 AND criteria_type = ?9
               AND expected_effect = ?10 AND expected_result = ?11",
            params![
                taxonomy_id,
                record.environmental_objective,
                record.sector,
                record.hazard,
                record.division,
                record.investment,
                record.row_type,
                record.level,
                record.criteria_type,
                record.expected_effect,
                record.expected_result
            ],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE rwanda_adaptation SET language = ?2, generic_dnsh = ?3, source_ref = ?4
             WHERE id = ?1",
            params![id, record.language, record.generic_dnsh, record.source_ref],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        return Ok(Upsert::Updated(id));
    }

    conn.execute(
        "INSERT INTO rwanda_adaptation (
           taxonomy_id, language, environmental_objective, sector, hazard, division,
           investment, row_type, level, criteria_type, expected_effect, expected_result,
           generic_dnsh, source_ref
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            taxonomy_id,
            record.language,
            record.environmental_objective,
            record.sector,
            record.hazard,
            record.division,
            record.investment,
            record.row_type,
            record.level,
            record.criteria_type,
            record.expected_effect,
            record.expected_result,
            record.generic_dnsh,
            record.source_ref
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(Upsert::Created(conn.last_insert_rowid()))
}

pub fn upsert_whitelist(
    conn: &Connection,
    taxonomy_id: i64,
    objective_id: i64,
    sector_id: i64,
    record: &WhitelistRecord,
) -> Result<Upsert, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM adaptation_whitelist
             WHERE taxonomy_id = ?1 AND objective_id = ?2 AND sector_id = ?3 AND title = ?4",
            params![taxonomy_id, objective_id, sector_id, record.title],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE adaptation_whitelist SET language = ?2, description = ?3,
               eligible_activities = ?4
             WHERE id = ?1",
            params![id, record.language, record.description, record.eligible_activities],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        return Ok(Upsert::Updated(id));
    }

    conn.execute(
        "INSERT INTO adaptation_whitelist (
           taxonomy_id, objective_id, sector_id, language, title, description,
           eligible_activities
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            taxonomy_id,
            objective_id,
            sector_id,
            record.language,
            record.title,
            record.description,
            record.eligible_activities
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(Upsert::Created(conn.last_insert_rowid()))
}

pub fn upsert_general_criterion(
    conn: &Connection,
    taxonomy_id: i64,
    objective_id: i64,
    record: &GeneralCriterionRecord,
) -> Result<Upsert, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM adaptation_general_criterion
             WHERE taxonomy_id = ?1 AND objective_id = ?2 AND title = ?3 AND subcriteria = ?4",
            params![taxonomy_id, objective_id, record.title, record.subcriteria],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError(e.to_string()))?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE adaptation_general_criterion SET language = ?2, criteria = ?3 WHERE id = ?1",
            params![id, record.language, record.criteria],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        return Ok(Upsert::Updated(id));
    }

    conn.execute(
        "INSERT INTO adaptation_general_criterion (
           taxonomy_id, objective_id, language, title, criteria, subcriteria
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            taxonomy_id,
            objective_id,
            record.language,
            record.title,
            record.criteria,
            record.subcriteria
        ],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(Upsert::Created(conn.last_insert_rowid()))
}

/// Criteria columns of one activity, as needed by the legacy traffic-light
/// rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCriteriaFix {
    pub id: i64,
    pub sc_criteria_type: String,
    pub substantial_contribution_criteria: String,
    pub sc_criteria_green: String,
}

pub fn activity_criteria_for_taxonomy(
    conn: &Connection,
    taxonomy_id: i64,
) -> Result<Vec<ActivityCriteriaFix>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, sc_criteria_type, substantial_contribution_criteria, sc_criteria_green
             FROM activity WHERE taxonomy_id = ?1 ORDER BY id",
        )
        .map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params![taxonomy_id], |row| {
            Ok(ActivityCriteriaFix {
                id: row.get(0)?,
                sc_criteria_type: row.get(1)?,
                substantial_contribution_criteria: row.get(2)?,
                sc_criteria_green: row.get(3)?,
            })
        })
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn rewrite_activity_criteria(
    conn: &Connection,
    id: i64,
    sc_criteria_type: &str,
    substantial: &str,
    green: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE activity SET sc_criteria_type = ?2,
           substantial_contribution_criteria = ?3, sc_criteria_green = ?4
         WHERE id = ?1",
        params![id, sc_criteria_type, substantial, green],
    )
    .map_err(|e| StoreError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use greentaxa_model::DnshFields;

    fn defaults() -> TaxonomyDefaults {
        TaxonomyDefaults {
            region: "Other".into(),
            language: "EN".into(),
            dnsh_general: None,
            mss: None,
        }
    }

    fn activity_draft(name: &str, criteria: ScCriteria) -> ActivityDraft {
        ActivityDraft {
            taxonomy_code: "CCM 1.1".into(),
            economic_code_system: String::new(),
            economic_code: String::new(),
            name: name.into(),
            description: String::new(),
            contribution_type: "None".into(),
            criteria,
            dnsh: DnshFields::default(),
        }
    }

    #[test]
    fn taxonomy_upsert_counts_created_then_updated() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let first = upsert_taxonomy(conn, "EU", &defaults()).expect("create");
        assert!(first.created());
        let second = upsert_taxonomy(conn, "EU", &defaults()).expect("update");
        assert_eq!(second, Upsert::Updated(first.id()));
    }

    #[test]
    fn absent_optional_columns_preserve_stored_values() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let with_notes = TaxonomyDefaults {
            dnsh_general: Some("generic dnsh".into()),
            mss: Some("safeguards".into()),
            ..defaults()
        };
        upsert_taxonomy(conn, "EU", &with_notes).expect("create");
        upsert_taxonomy(conn, "EU", &defaults()).expect("update without columns");
        let (dnsh, mss): (String, String) = conn
            .query_row(
                "SELECT dnsh_general, mss FROM taxonomy WHERE name='EU'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("row");
        assert_eq!(dnsh, "generic dnsh");
        assert_eq!(mss, "safeguards");
    }

    #[test]
    fn get_or_create_taxonomy_never_updates_existing_rows() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let with_region = TaxonomyDefaults {
            region: "Europe".into(),
            ..defaults()
        };
        let id = upsert_taxonomy(conn, "EU", &with_region).expect("create").id();
        assert_eq!(get_or_create_taxonomy(conn, "EU", &defaults()).expect("get"), id);
        let region: String = conn
            .query_row(
                "SELECT region FROM taxonomy WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .expect("row");
        assert_eq!(region, "Europe");
    }

    #[test]
    fn activity_upsert_clears_inactive_group() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let tax = upsert_taxonomy(conn, "EU", &defaults()).expect("tax").id();
        let obj = get_or_create_objective(conn, tax, "Climate mitigation").expect("obj");
        let sec = get_or_create_sector(conn, tax, obj, "Energy").expect("sec");

        let traffic = activity_draft(
            "Solar PV",
            ScCriteria::TrafficLight {
                green: "Install ≥X MW".into(),
                amber: String::new(),
                red: String::new(),
            },
        );
        let first = upsert_activity(conn, tax, obj, sec, None, &traffic).expect("create");
        assert!(first.created());

        // Re-import as threshold: colors must be cleared.
        let threshold = activity_draft(
            "Solar PV",
            ScCriteria::Threshold {
                substantial_contribution: "meets threshold".into(),
                non_eligibility: "fossil".into(),
            },
        );
        let second = upsert_activity(conn, tax, obj, sec, None, &threshold).expect("update");
        assert_eq!(second, Upsert::Updated(first.id()));

        let (sc_type, substantial, green): (String, String, String) = conn
            .query_row(
                "SELECT sc_criteria_type, substantial_contribution_criteria, sc_criteria_green
                 FROM activity WHERE id = ?1",
                params![first.id()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("row");
        assert_eq!(sc_type, "threshold");
        assert_eq!(substantial, "meets threshold");
        assert_eq!(green, "");
    }

    #[test]
    fn missing_subsector_is_part_of_the_key() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let tax = upsert_taxonomy(conn, "EU", &defaults()).expect("tax").id();
        let obj = get_or_create_objective(conn, tax, "Water").expect("obj");
        let sec = get_or_create_sector(conn, tax, obj, "Utilities").expect("sec");
        let sub = get_or_create_subsector(conn, sec, "Desalination").expect("sub");

        let draft = activity_draft(
            "Reuse",
            ScCriteria::Threshold {
                substantial_contribution: "x".into(),
                non_eligibility: String::new(),
            },
        );
        let no_sub = upsert_activity(conn, tax, obj, sec, None, &draft).expect("none");
        let with_sub = upsert_activity(conn, tax, obj, sec, Some(sub), &draft).expect("some");
        assert_ne!(no_sub.id(), with_sub.id());
        // Same keys hit the same rows again.
        assert!(!upsert_activity(conn, tax, obj, sec, None, &draft)
            .expect("again")
            .created());
    }

    #[test]
    fn rwanda_upsert_keys_on_all_eleven_fields() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let tax = upsert_taxonomy(conn, "Rwanda", &defaults()).expect("tax").id();
        let record = RwandaRecord {
            language: "EN".into(),
            environmental_objective: "Climate adaptation".into(),
            sector: "Agriculture".into(),
            hazard: "Drought".into(),
            division: "Crops".into(),
            investment: "Irrigation".into(),
            row_type: "Adapted".into(),
            level: "Activity".into(),
            criteria_type: "Process-based".into(),
            expected_effect: "Lower losses".into(),
            expected_result: "Stable yield".into(),
            generic_dnsh: String::new(),
            source_ref: "NST-1".into(),
        };
        assert!(upsert_rwanda(conn, tax, &record).expect("create").created());
        assert!(!upsert_rwanda(conn, tax, &record).expect("update").created());
        let differs = RwandaRecord {
            hazard: "Flood".into(),
            ..record
        };
        assert!(upsert_rwanda(conn, tax, &differs).expect("new key").created());
    }

    #[test]
    fn general_criterion_key_includes_subcriteria() {
        let store = Store::open_in_memory().expect("open");
        let conn = store.connection();
        let tax = upsert_taxonomy(conn, "CR", &defaults()).expect("tax").id();
        let obj = get_or_create_objective(conn, tax, "Climate adaptation").expect("obj");
        let base = GeneralCriterionRecord {
            language: "ES".into(),
            title: "Criterio general".into(),
            criteria: "texto".into(),
            subcriteria: "a".into(),
        };
        assert!(upsert_general_criterion(conn, tax, obj, &base)
            .expect("create")
            .created());
        let other_sub = GeneralCriterionRecord {
            subcriteria: "b".into(),
            ..base.clone()
        };
        assert!(upsert_general_criterion(conn, tax, obj, &other_sub)
            .expect("distinct subcriteria")
            .created());
        assert!(!upsert_general_criterion(conn, tax, obj, &base)
            .expect("same key")
            .created());
    }
}
