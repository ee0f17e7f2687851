// SPDX-License-Identifier: Apache-2.0
//! Main-sheet pipeline: hierarchy upserts plus Activity and Practice leaves.

use greentaxa_model::{
    is_meo, is_threshold, is_traffic_light, normalize_practice_level, validate_practice_level,
    validate_sc_type, ActivityDraft, DnshFields, ImportDefaults, LevelAliasTable,
    PracticeCriteria, PracticeDraft, RowView, ScCriteria, SheetTable, TaxonomyDefaults,
    PRACTICE_LEVELS, SC_TYPE_THRESHOLD,
};
use greentaxa_store::{
    get_or_create_objective, get_or_create_sector, get_or_create_subsector, upsert_activity,
    upsert_practice, upsert_taxonomy, Store,
};
use rusqlite::Connection;

use crate::{IngestError, SheetReport};

/// Columns the main sheet must carry; a missing one is fatal for the sheet.
pub const REQUIRED_MAIN_COLUMNS: [&str; 20] = [
    "taxonomy",
    "region",
    "environmental_objective",
    "sector",
    "taxonomy_code",
    "activity",
    "contribution_type",
    "description",
    "sc_criteria_type",
    "substantial_contribution_criteria",
    "non_eligibility_criteria",
    "sc_criteria_green",
    "sc_criteria_amber",
    "sc_criteria_red",
    "dnsh_climate_adaptation",
    "dnsh_water",
    "dnsh_circular_economy",
    "dnsh_pollution_prevention",
    "dnsh_biodiversity",
    "dnsh_land_management",
];

pub fn import_main_sheet(
    store: &mut Store,
    table: &SheetTable,
    defaults: &ImportDefaults,
) -> Result<SheetReport, IngestError> {
    let missing = table.missing_columns(&REQUIRED_MAIN_COLUMNS);
    if !missing.is_empty() {
        return Err(IngestError(format!(
            "sheet '{}' is missing required columns: {}",
            table.name(),
            missing.join(", ")
        )));
    }

    let mut report = SheetReport::new(table.name());
    let has_dnsh_general = table.has_column("dnsh_general");
    let has_mss = table.has_column("mss");
    if !has_dnsh_general {
        report.warn(
            None,
            "optional column 'dnsh_general' is absent; stored taxonomy DNSH text is kept",
        );
    }
    if !has_mss {
        report.warn(
            None,
            "optional column 'mss' is absent; stored minimum social safeguards are kept",
        );
    }

    let levels = LevelAliasTable::default();
    let tx = store
        .transaction()
        .map_err(|e| IngestError(e.to_string()))?;
    for row in table.rows() {
        if row.is_blank() {
            continue;
        }
        import_main_row(
            &tx,
            &row,
            defaults,
            &levels,
            has_dnsh_general,
            has_mss,
            &mut report,
        )?;
    }
    tx.commit().map_err(|e| IngestError(e.to_string()))?;
    Ok(report)
}

fn import_main_row(
    conn: &Connection,
    row: &RowView<'_>,
    defaults: &ImportDefaults,
    levels: &LevelAliasTable,
    has_dnsh_general: bool,
    has_mss: bool,
    report: &mut SheetReport,
) -> Result<(), IngestError> {
    let taxonomy_name = row.get("taxonomy");
    let objective_name = row.get("environmental_objective");
    let sector_name = row.get("sector");
    if taxonomy_name.is_empty() || objective_name.is_empty() || sector_name.is_empty() {
        report.warn(
            Some(row.row_number),
            "blank taxonomy/environmental_objective/sector; row skipped",
        );
        report.counters.skipped += 1;
        return Ok(());
    }

    let taxonomy_defaults = TaxonomyDefaults {
        region: row.get_or("region", &defaults.region).to_string(),
        language: row.get_or("language", &defaults.language).to_string(),
        dnsh_general: has_dnsh_general.then(|| row.get("dnsh_general").to_string()),
        mss: has_mss.then(|| row.get("mss").to_string()),
    };
    let taxonomy = upsert_taxonomy(conn, taxonomy_name, &taxonomy_defaults)
        .map_err(|e| IngestError(e.to_string()))?
        .id();
    let objective = get_or_create_objective(conn, taxonomy, objective_name)
        .map_err(|e| IngestError(e.to_string()))?;
    let sector = get_or_create_sector(conn, taxonomy, objective, sector_name)
        .map_err(|e| IngestError(e.to_string()))?;
    let subsector_name = row.get("subsector");
    let subsector = if subsector_name.is_empty() {
        None
    } else {
        Some(
            get_or_create_subsector(conn, sector, subsector_name)
                .map_err(|e| IngestError(e.to_string()))?,
        )
    };

    let activity_name = row.get("activity");
    let mut sc_type = {
        let raw = row.get("sc_criteria_type");
        if raw.is_empty() {
            defaults.sc_criteria_type.clone()
        } else {
            raw.to_lowercase()
        }
    };

    if !activity_name.is_empty() {
        if validate_sc_type(&sc_type).is_err() {
            report.warn(
                Some(row.row_number),
                format!("sc_criteria_type '{sc_type}' is invalid; using 'threshold'"),
            );
            sc_type = SC_TYPE_THRESHOLD.to_string();
        }
        let criteria = if is_traffic_light(&sc_type) {
            ScCriteria::TrafficLight {
                green: row.get("sc_criteria_green").to_string(),
                amber: row.get("sc_criteria_amber").to_string(),
                red: row.get("sc_criteria_red").to_string(),
            }
        } else {
            ScCriteria::Threshold {
                substantial_contribution: row
                    .get("substantial_contribution_criteria")
                    .to_string(),
                non_eligibility: row.get("non_eligibility_criteria").to_string(),
            }
        };
        let draft = ActivityDraft {
            taxonomy_code: row.get("taxonomy_code").to_string(),
            economic_code_system: row.get("economic_code_system").to_string(),
            economic_code: row.get("economic_code").to_string(),
            name: activity_name.to_string(),
            description: row.get("description").to_string(),
            contribution_type: row
                .get_or("contribution_type", &defaults.contribution_type)
                .to_string(),
            criteria,
            dnsh: DnshFields {
                climate_mitigation: row.get("dnsh_climate_mitigation").to_string(),
                climate_adaptation: row.get("dnsh_climate_adaptation").to_string(),
                water: row.get("dnsh_water").to_string(),
                circular_economy: row.get("dnsh_circular_economy").to_string(),
                pollution_prevention: row.get("dnsh_pollution_prevention").to_string(),
                biodiversity: row.get("dnsh_biodiversity").to_string(),
                land_management: row.get("dnsh_land_management").to_string(),
            },
        };
        let outcome = upsert_activity(conn, taxonomy, objective, sector, subsector, &draft)
            .map_err(|e| IngestError(e.to_string()))?;
        report.record(outcome);
    }

    let raw_level = row.get("practice_level");
    if !raw_level.is_empty() {
        if is_meo(objective_name) {
            let level = normalize_practice_level(raw_level, levels);
            if validate_practice_level(&level).is_err() {
                report.warn(
                    Some(row.row_number),
                    format!(
                        "practice_level '{raw_level}' is not recognized; allowed: {}; row skipped",
                        PRACTICE_LEVELS.join(", ")
                    ),
                );
                report.counters.skipped += 1;
            } else if matches!(level.as_str(), "amber" | "red") {
                let colors = [
                    row.get("green_practices"),
                    row.get("amber_practices"),
                    row.get("red_practices"),
                ];
                let filled = colors.iter().filter(|v| !v.is_empty()).count();
                if filled != 1 {
                    report.warn(
                        Some(row.row_number),
                        "amber/red practice needs exactly one of green/amber/red with text; row skipped",
                    );
                    report.counters.skipped += 1;
                } else {
                    let draft = PracticeDraft {
                        level,
                        name: row.get("practice_name").to_string(),
                        description: row.get("practice_description").to_string(),
                        criteria: PracticeCriteria::Traffic {
                            green: colors[0].to_string(),
                            amber: colors[1].to_string(),
                            red: colors[2].to_string(),
                        },
                    };
                    let outcome =
                        upsert_practice(conn, taxonomy, objective, sector, subsector, &draft)
                            .map_err(|e| IngestError(e.to_string()))?;
                    report.record(outcome);
                }
            } else {
                let draft = PracticeDraft {
                    level,
                    name: row.get("practice_name").to_string(),
                    description: row.get("practice_description").to_string(),
                    criteria: PracticeCriteria::Eligibility {
                        eligible: row.get("eligible_practices").to_string(),
                        non_eligible: row.get("non_eligible_practices").to_string(),
                    },
                };
                let outcome =
                    upsert_practice(conn, taxonomy, objective, sector, subsector, &draft)
                        .map_err(|e| IngestError(e.to_string()))?;
                report.record(outcome);
            }
        } else {
            report.warn(
                Some(row.row_number),
                "practice_level is set but the objective is not the multiple-objectives sentinel; practice ignored",
            );
        }
    }

    if !activity_name.is_empty()
        && is_threshold(&sc_type)
        && row.get("substantial_contribution_criteria").is_empty()
    {
        report.warn(
            Some(row.row_number),
            format!(
                "threshold activity '{activity_name}' has no substantial_contribution_criteria text; imported anyway"
            ),
        );
    }

    Ok(())
}
