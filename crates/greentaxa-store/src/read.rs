// SPDX-License-Identifier: Apache-2.0
//! Read-side queries.
//!
//! Rows come back as plain structs with parent briefs joined in; response
//! shaping (name fallbacks, adaptation gating) belongs to the API layer.

use greentaxa_model::DnshFields;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};

use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyBriefRow {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub region: String,
    pub country_code: String,
    pub language: String,
    pub dnsh_general: String,
    pub mss: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveBriefRow {
    pub id: i64,
    pub generic_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveRow {
    pub id: i64,
    pub taxonomy_id: i64,
    pub generic_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorBriefRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorRow {
    pub id: i64,
    pub taxonomy_id: i64,
    pub objective_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsectorRow {
    pub id: i64,
    pub sector_id: i64,
    pub name: String,
}

/// Column block shared by the full and slim activity projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFields {
    pub taxonomy_code: String,
    pub economic_code_system: String,
    pub economic_code: String,
    pub name: String,
    pub description: String,
    pub contribution_type: String,
    pub sc_criteria_type: String,
    pub substantial_contribution_criteria: String,
    pub non_eligibility_criteria: String,
    pub sc_criteria_green: String,
    pub sc_criteria_amber: String,
    pub sc_criteria_red: String,
    pub dnsh: DnshFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub id: i64,
    pub taxonomy: TaxonomyBriefRow,
    pub objective: ObjectiveBriefRow,
    pub sector: SectorBriefRow,
    pub subsector: Option<SubsectorRow>,
    pub fields: ActivityFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySlimRow {
    pub id: i64,
    pub subsector_id: Option<i64>,
    pub fields: ActivityFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeFields {
    pub practice_level: String,
    pub practice_name: String,
    pub practice_description: String,
    pub eligible_practices: String,
    pub non_eligible_practices: String,
    pub green_practices: String,
    pub amber_practices: String,
    pub red_practices: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeRow {
    pub id: i64,
    pub taxonomy: TaxonomyBriefRow,
    pub objective: ObjectiveBriefRow,
    pub sector: SectorBriefRow,
    pub subsector: Option<SubsectorRow>,
    pub fields: PracticeFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSlimRow {
    pub id: i64,
    pub subsector_id: Option<i64>,
    pub fields: PracticeFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RwandaRow {
    pub id: i64,
    pub taxonomy_id: i64,
    pub language: String,
    pub environmental_objective: String,
    pub sector: String,
    pub hazard: String,
    pub division: String,
    pub investment: String,
    pub row_type: String,
    pub level: String,
    pub criteria_type: String,
    pub expected_effect: String,
    pub expected_result: String,
    pub generic_dnsh: String,
    pub source_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistRow {
    pub id: i64,
    pub taxonomy_id: i64,
    pub objective_id: i64,
    pub sector: SectorBriefRow,
    pub language: String,
    pub title: String,
    pub description: String,
    pub eligible_activities: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralCriterionRow {
    pub id: i64,
    pub taxonomy_id: i64,
    pub objective_id: i64,
    pub language: String,
    pub title: String,
    pub criteria: String,
    pub subcriteria: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorNode {
    pub id: i64,
    pub name: String,
    pub subsectors: Vec<SubsectorRow>,
    pub activities: Vec<ActivitySlimRow>,
    pub practices: Vec<PracticeSlimRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveNode {
    pub objective: ObjectiveBriefRow,
    pub sectors: Vec<SectorNode>,
    pub whitelists: Vec<WhitelistRow>,
    pub general_criteria: Vec<GeneralCriterionRow>,
}

/// Everything under one taxonomy, fetched in hierarchy order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyTree {
    pub taxonomy: TaxonomyRow,
    pub objectives: Vec<ObjectiveNode>,
    pub rwanda: Vec<RwandaRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSummary {
    pub taxonomies: i64,
    pub objectives: i64,
    pub sectors: i64,
    pub subsectors: i64,
    pub activities: i64,
    pub practices: i64,
    pub rwanda_rows: i64,
    pub whitelist_entries: i64,
    pub general_criteria: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectiveFilter {
    pub taxonomy_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SectorFilter {
    pub taxonomy_id: Option<i64>,
    pub objective_id: Option<i64>,
    pub has_activities: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SubsectorFilter {
    pub sector_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub taxonomy_id: Option<i64>,
    pub objective_id: Option<i64>,
    pub sector_id: Option<i64>,
    pub subsector_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PracticeFilter {
    pub taxonomy_id: Option<i64>,
    pub objective_id: Option<i64>,
    /// Matches either the generic or the display name of the objective.
    pub objective: Option<String>,
    pub sector_id: Option<i64>,
    pub subsector_id: Option<i64>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RwandaFilter {
    pub taxonomy_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct WhitelistFilter {
    pub taxonomy_id: Option<i64>,
    pub objective_id: Option<i64>,
    pub sector_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct GeneralCriterionFilter {
    pub taxonomy_id: Option<i64>,
    pub objective_id: Option<i64>,
}

const ACTIVITY_FIELD_COLS: [&str; 19] = [
    "taxonomy_code",
    "economic_code_system",
    "economic_code",
    "name",
    "description",
    "contribution_type",
    "sc_criteria_type",
    "substantial_contribution_criteria",
    "non_eligibility_criteria",
    "sc_criteria_green",
    "sc_criteria_amber",
    "sc_criteria_red",
    "dnsh_climate_mitigation",
    "dnsh_climate_adaptation",
    "dnsh_water",
    "dnsh_circular_economy",
    "dnsh_pollution_prevention",
    "dnsh_biodiversity",
    "dnsh_land_management",
];

const PRACTICE_FIELD_COLS: [&str; 8] = [
    "practice_level",
    "practice_name",
    "practice_description",
    "eligible_practices",
    "non_eligible_practices",
    "green_practices",
    "amber_practices",
    "red_practices",
];

fn projected(prefix: &str, cols: &[&str]) -> String {
    cols.iter()
        .map(|c| format!("{prefix}{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_sql(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn activity_fields(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<ActivityFields> {
    Ok(ActivityFields {
        taxonomy_code: row.get(base)?,
        economic_code_system: row.get(base + 1)?,
        economic_code: row.get(base + 2)?,
        name: row.get(base + 3)?,
        description: row.get(base + 4)?,
        contribution_type: row.get(base + 5)?,
        sc_criteria_type: row.get(base + 6)?,
        substantial_contribution_criteria: row.get(base + 7)?,
        non_eligibility_criteria: row.get(base + 8)?,
        sc_criteria_green: row.get(base + 9)?,
        sc_criteria_amber: row.get(base + 10)?,
        sc_criteria_red: row.get(base + 11)?,
        dnsh: DnshFields {
            climate_mitigation: row.get(base + 12)?,
            climate_adaptation: row.get(base + 13)?,
            water: row.get(base + 14)?,
            circular_economy: row.get(base + 15)?,
            pollution_prevention: row.get(base + 16)?,
            biodiversity: row.get(base + 17)?,
            land_management: row.get(base + 18)?,
        },
    })
}

fn practice_fields(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<PracticeFields> {
    Ok(PracticeFields {
        practice_level: row.get(base)?,
        practice_name: row.get(base + 1)?,
        practice_description: row.get(base + 2)?,
        eligible_practices: row.get(base + 3)?,
        non_eligible_practices: row.get(base + 4)?,
        green_practices: row.get(base + 5)?,
        amber_practices: row.get(base + 6)?,
        red_practices: row.get(base + 7)?,
    })
}

pub fn list_taxonomies(conn: &Connection) -> Result<Vec<TaxonomyBriefRow>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, name, region, language FROM taxonomy ORDER BY id")
        .map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TaxonomyBriefRow {
                id: row.get(0)?,
                name: row.get(1)?,
                region: row.get(2)?,
                language: row.get(3)?,
            })
        })
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn get_taxonomy(conn: &Connection, id: i64) -> Result<Option<TaxonomyRow>, StoreError> {
    conn.query_row(
        "SELECT id, name, description, region, country_code, language, dnsh_general, mss
         FROM taxonomy WHERE id = ?1",
        params![id],
        |row| {
            Ok(TaxonomyRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                region: row.get(3)?,
                country_code: row.get(4)?,
                language: row.get(5)?,
                dnsh_general: row.get(6)?,
                mss: row.get(7)?,
            })
        },
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

pub fn list_objectives(
    conn: &Connection,
    filter: &ObjectiveFilter,
) -> Result<Vec<ObjectiveRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    let sql = format!(
        "SELECT id, taxonomy_id, generic_name, display_name FROM objective{} ORDER BY id",
        where_sql(&clauses)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_objective_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

fn map_objective_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ObjectiveRow> {
    Ok(ObjectiveRow {
        id: row.get(0)?,
        taxonomy_id: row.get(1)?,
        generic_name: row.get(2)?,
        display_name: row.get(3)?,
    })
}

pub fn get_objective(conn: &Connection, id: i64) -> Result<Option<ObjectiveRow>, StoreError> {
    conn.query_row(
        "SELECT id, taxonomy_id, generic_name, display_name FROM objective WHERE id = ?1",
        params![id],
        map_objective_row,
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

pub fn list_sectors(conn: &Connection, filter: &SectorFilter) -> Result<Vec<SectorRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.objective_id {
        clauses.push("objective_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if filter.has_activities {
        clauses.push("EXISTS (SELECT 1 FROM activity a WHERE a.sector_id = sector.id)".to_string());
    }
    let sql = format!(
        "SELECT id, taxonomy_id, objective_id, name FROM sector{} ORDER BY id",
        where_sql(&clauses)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_sector_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

fn map_sector_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SectorRow> {
    Ok(SectorRow {
        id: row.get(0)?,
        taxonomy_id: row.get(1)?,
        objective_id: row.get(2)?,
        name: row.get(3)?,
    })
}

pub fn get_sector(conn: &Connection, id: i64) -> Result<Option<SectorRow>, StoreError> {
    conn.query_row(
        "SELECT id, taxonomy_id, objective_id, name FROM sector WHERE id = ?1",
        params![id],
        map_sector_row,
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

pub fn list_subsectors(
    conn: &Connection,
    filter: &SubsectorFilter,
) -> Result<Vec<SubsectorRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.sector_id {
        clauses.push("sector_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    let sql = format!(
        "SELECT id, sector_id, name FROM subsector{} ORDER BY id",
        where_sql(&clauses)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_subsector_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

fn map_subsector_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubsectorRow> {
    Ok(SubsectorRow {
        id: row.get(0)?,
        sector_id: row.get(1)?,
        name: row.get(2)?,
    })
}

pub fn get_subsector(conn: &Connection, id: i64) -> Result<Option<SubsectorRow>, StoreError> {
    conn.query_row(
        "SELECT id, sector_id, name FROM subsector WHERE id = ?1",
        params![id],
        map_subsector_row,
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

fn activity_select(where_sql: &str) -> String {
    format!(
        "SELECT a.id, a.subsector_id, {fields}, \
         t.id, t.name, t.region, t.language, \
         o.id, o.generic_name, o.display_name, \
         s.id, s.name, \
         sub.id, sub.sector_id, sub.name \
         FROM activity a \
         JOIN taxonomy t ON t.id = a.taxonomy_id \
         JOIN objective o ON o.id = a.objective_id \
         JOIN sector s ON s.id = a.sector_id \
         LEFT JOIN subsector sub ON sub.id = a.subsector_id{where_sql} ORDER BY a.id",
        fields = projected("a.", &ACTIVITY_FIELD_COLS)
    )
}

fn map_activity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
    let subsector = match row.get::<_, Option<i64>>(30)? {
        Some(id) => Some(SubsectorRow {
            id,
            sector_id: row.get(31)?,
            name: row.get(32)?,
        }),
        None => None,
    };
    Ok(ActivityRow {
        id: row.get(0)?,
        taxonomy: TaxonomyBriefRow {
            id: row.get(21)?,
            name: row.get(22)?,
            region: row.get(23)?,
            language: row.get(24)?,
        },
        objective: ObjectiveBriefRow {
            id: row.get(25)?,
            generic_name: row.get(26)?,
            display_name: row.get(27)?,
        },
        sector: SectorBriefRow {
            id: row.get(28)?,
            name: row.get(29)?,
        },
        subsector,
        fields: activity_fields(row, 2)?,
    })
}

fn fetch_activities(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<Vec<ActivityRow>, StoreError> {
    let mut stmt = conn.prepare(sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_activity_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn list_activities(
    conn: &Connection,
    filter: &ActivityFilter,
) -> Result<Vec<ActivityRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("a.taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.objective_id {
        clauses.push("a.objective_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.sector_id {
        clauses.push("a.sector_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.subsector_id {
        clauses.push("a.subsector_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    fetch_activities(conn, &activity_select(&where_sql(&clauses)), &params)
}

pub fn get_activity(conn: &Connection, id: i64) -> Result<Option<ActivityRow>, StoreError> {
    let rows = fetch_activities(
        conn,
        &activity_select(" WHERE a.id = ?"),
        &[Value::Integer(id)],
    )?;
    Ok(rows.into_iter().next())
}

fn practice_select(where_sql: &str) -> String {
    format!(
        "SELECT p.id, p.subsector_id, {fields}, \
         t.id, t.name, t.region, t.language, \
         o.id, o.generic_name, o.display_name, \
         s.id, s.name, \
         sub.id, sub.sector_id, sub.name \
         FROM practice p \
         JOIN taxonomy t ON t.id = p.taxonomy_id \
         JOIN objective o ON o.id = p.objective_id \
         JOIN sector s ON s.id = p.sector_id \
         LEFT JOIN subsector sub ON sub.id = p.subsector_id{where_sql} ORDER BY p.id",
        fields = projected("p.", &PRACTICE_FIELD_COLS)
    )
}

fn map_practice_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PracticeRow> {
    let subsector = match row.get::<_, Option<i64>>(19)? {
        Some(id) => Some(SubsectorRow {
            id,
            sector_id: row.get(20)?,
            name: row.get(21)?,
        }),
        None => None,
    };
    Ok(PracticeRow {
        id: row.get(0)?,
        taxonomy: TaxonomyBriefRow {
            id: row.get(10)?,
            name: row.get(11)?,
            region: row.get(12)?,
            language: row.get(13)?,
        },
        objective: ObjectiveBriefRow {
            id: row.get(14)?,
            generic_name: row.get(15)?,
            display_name: row.get(16)?,
        },
        sector: SectorBriefRow {
            id: row.get(17)?,
            name: row.get(18)?,
        },
        subsector,
        fields: practice_fields(row, 2)?,
    })
}

fn fetch_practices(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<Vec<PracticeRow>, StoreError> {
    let mut stmt = conn.prepare(sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_practice_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn list_practices(
    conn: &Connection,
    filter: &PracticeFilter,
) -> Result<Vec<PracticeRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("p.taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.objective_id {
        clauses.push("p.objective_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(name) = &filter.objective {
        clauses.push("(o.generic_name = ? OR o.display_name = ?)".to_string());
        params.push(Value::Text(name.clone()));
        params.push(Value::Text(name.clone()));
    }
    if let Some(id) = filter.sector_id {
        clauses.push("p.sector_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.subsector_id {
        clauses.push("p.subsector_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(level) = &filter.level {
        clauses.push("p.practice_level = ?".to_string());
        params.push(Value::Text(level.clone()));
    }
    fetch_practices(conn, &practice_select(&where_sql(&clauses)), &params)
}

pub fn get_practice(conn: &Connection, id: i64) -> Result<Option<PracticeRow>, StoreError> {
    let rows = fetch_practices(
        conn,
        &practice_select(" WHERE p.id = ?"),
        &[Value::Integer(id)],
    )?;
    Ok(rows.into_iter().next())
}

const RWANDA_SELECT: &str = "SELECT id, taxonomy_id, language, environmental_objective, sector, \
     hazard, division, investment, row_type, level, criteria_type, expected_effect, \
     expected_result, generic_dnsh, source_ref FROM rwanda_adaptation";

fn map_rwanda_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RwandaRow> {
    Ok(RwandaRow {
        id: row.get(0)?,
        taxonomy_id: row.get(1)?,
        language: row.get(2)?,
        environmental_objective: row.get(3)?,
        sector: row.get(4)?,
        hazard: row.get(5)?,
        division: row.get(6)?,
        investment: row.get(7)?,
        row_type: row.get(8)?,
        level: row.get(9)?,
        criteria_type: row.get(10)?,
        expected_effect: row.get(11)?,
        expected_result: row.get(12)?,
        generic_dnsh: row.get(13)?,
        source_ref: row.get(14)?,
    })
}

pub fn list_rwanda(conn: &Connection, filter: &RwandaFilter) -> Result<Vec<RwandaRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    let sql = format!("{RWANDA_SELECT}{} ORDER BY id", where_sql(&clauses));
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_rwanda_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn get_rwanda(conn: &Connection, id: i64) -> Result<Option<RwandaRow>, StoreError> {
    conn.query_row(
        &format!("{RWANDA_SELECT} WHERE id = ?1"),
        params![id],
        map_rwanda_row,
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

const WHITELIST_SELECT: &str = "SELECT w.id, w.taxonomy_id, w.objective_id, s.id, s.name, \
     w.language, w.title, w.description, w.eligible_activities \
     FROM adaptation_whitelist w JOIN sector s ON s.id = w.sector_id";

fn map_whitelist_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WhitelistRow> {
    Ok(WhitelistRow {
        id: row.get(0)?,
        taxonomy_id: row.get(1)?,
        objective_id: row.get(2)?,
        sector: SectorBriefRow {
            id: row.get(3)?,
            name: row.get(4)?,
        },
        language: row.get(5)?,
        title: row.get(6)?,
        description: row.get(7)?,
        eligible_activities: row.get(8)?,
    })
}

/// Whitelist entries come back ordered by sector name then title, which is
/// the grouping order the detail view presents them in.
pub fn list_whitelists(
    conn: &Connection,
    filter: &WhitelistFilter,
) -> Result<Vec<WhitelistRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("w.taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.objective_id {
        clauses.push("w.objective_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.sector_id {
        clauses.push("w.sector_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    let sql = format!(
        "{WHITELIST_SELECT}{} ORDER BY s.name, w.title",
        where_sql(&clauses)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_whitelist_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn get_whitelist(conn: &Connection, id: i64) -> Result<Option<WhitelistRow>, StoreError> {
    conn.query_row(
        &format!("{WHITELIST_SELECT} WHERE w.id = ?1"),
        params![id],
        map_whitelist_row,
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

const GENERAL_CRITERION_SELECT: &str = "SELECT id, taxonomy_id, objective_id, language, title, \
     criteria, subcriteria FROM adaptation_general_criterion";

fn map_general_criterion_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GeneralCriterionRow> {
    Ok(GeneralCriterionRow {
        id: row.get(0)?,
        taxonomy_id: row.get(1)?,
        objective_id: row.get(2)?,
        language: row.get(3)?,
        title: row.get(4)?,
        criteria: row.get(5)?,
        subcriteria: row.get(6)?,
    })
}

pub fn list_general_criteria(
    conn: &Connection,
    filter: &GeneralCriterionFilter,
) -> Result<Vec<GeneralCriterionRow>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(id) = filter.taxonomy_id {
        clauses.push("taxonomy_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    if let Some(id) = filter.objective_id {
        clauses.push("objective_id = ?".to_string());
        params.push(Value::Integer(id));
    }
    let sql = format!(
        "{GENERAL_CRITERION_SELECT}{} ORDER BY title, subcriteria",
        where_sql(&clauses)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_general_criterion_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn get_general_criterion(
    conn: &Connection,
    id: i64,
) -> Result<Option<GeneralCriterionRow>, StoreError> {
    conn.query_row(
        &format!("{GENERAL_CRITERION_SELECT} WHERE id = ?1"),
        params![id],
        map_general_criterion_row,
    )
    .optional()
    .map_err(|e| StoreError(e.to_string()))
}

fn slim_activities_for_sector(
    conn: &Connection,
    sector_id: i64,
) -> Result<Vec<ActivitySlimRow>, StoreError> {
    let sql = format!(
        "SELECT id, subsector_id, {} FROM activity WHERE sector_id = ?1 ORDER BY id",
        projected("", &ACTIVITY_FIELD_COLS)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params![sector_id], |row| {
            Ok(ActivitySlimRow {
                id: row.get(0)?,
                subsector_id: row.get(1)?,
                fields: activity_fields(row, 2)?,
            })
        })
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

fn slim_practices_for_sector(
    conn: &Connection,
    sector_id: i64,
) -> Result<Vec<PracticeSlimRow>, StoreError> {
    let sql = format!(
        "SELECT id, subsector_id, {} FROM practice WHERE sector_id = ?1 ORDER BY id",
        projected("", &PRACTICE_FIELD_COLS)
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params![sector_id], |row| {
            Ok(PracticeSlimRow {
                id: row.get(0)?,
                subsector_id: row.get(1)?,
                fields: practice_fields(row, 2)?,
            })
        })
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

pub fn taxonomy_tree(conn: &Connection, taxonomy_id: i64) -> Result<Option<TaxonomyTree>, StoreError> {
    let Some(taxonomy) = get_taxonomy(conn, taxonomy_id)? else {
        return Ok(None);
    };

    let mut objectives = Vec::new();
    for objective in list_objectives(
        conn,
        &ObjectiveFilter {
            taxonomy_id: Some(taxonomy_id),
        },
    )? {
        let sector_rows = list_sectors(
            conn,
            &SectorFilter {
                taxonomy_id: Some(taxonomy_id),
                objective_id: Some(objective.id),
                has_activities: false,
            },
        )?;
        let mut sectors = Vec::with_capacity(sector_rows.len());
        for sector in sector_rows {
            sectors.push(SectorNode {
                id: sector.id,
                name: sector.name,
                subsectors: list_subsectors(
                    conn,
                    &SubsectorFilter {
                        sector_id: Some(sector.id),
                    },
                )?,
                activities: slim_activities_for_sector(conn, sector.id)?,
                practices: slim_practices_for_sector(conn, sector.id)?,
            });
        }
        let whitelists = list_whitelists(
            conn,
            &WhitelistFilter {
                objective_id: Some(objective.id),
                ..WhitelistFilter::default()
            },
        )?;
        let general_criteria = list_general_criteria(
            conn,
            &GeneralCriterionFilter {
                objective_id: Some(objective.id),
                ..GeneralCriterionFilter::default()
            },
        )?;
        objectives.push(ObjectiveNode {
            objective: ObjectiveBriefRow {
                id: objective.id,
                generic_name: objective.generic_name,
                display_name: objective.display_name,
            },
            sectors,
            whitelists,
            general_criteria,
        });
    }

    let rwanda = list_rwanda(
        conn,
        &RwandaFilter {
            taxonomy_id: Some(taxonomy_id),
        },
    )?;

    Ok(Some(TaxonomyTree {
        taxonomy,
        objectives,
        rwanda,
    }))
}

pub fn store_summary(conn: &Connection) -> Result<StoreSummary, StoreError> {
    conn.query_row(
        "SELECT (SELECT COUNT(*) FROM taxonomy), (SELECT COUNT(*) FROM objective),
                (SELECT COUNT(*) FROM sector), (SELECT COUNT(*) FROM subsector),
                (SELECT COUNT(*) FROM activity), (SELECT COUNT(*) FROM practice),
                (SELECT COUNT(*) FROM rwanda_adaptation),
                (SELECT COUNT(*) FROM adaptation_whitelist),
                (SELECT COUNT(*) FROM adaptation_general_criterion)",
        [],
        |row| {
            Ok(StoreSummary {
                taxonomies: row.get(0)?,
                objectives: row.get(1)?,
                sectors: row.get(2)?,
                subsectors: row.get(3)?,
                activities: row.get(4)?,
                practices: row.get(5)?,
                rwanda_rows: row.get(6)?,
                whitelist_entries: row.get(7)?,
                general_criteria: row.get(8)?,
            })
        },
    )
    .map_err(|e| StoreError(e.to_string()))
}
