// SPDX-License-Identifier: Apache-2.0
//! Serde projections of store rows, plus the assembly rules the store
//! deliberately leaves to this layer: objective name fallback, MEO gating
//! of practices, and the adaptation gating of whitelist/criteria blocks.

use greentaxa_model::{
    is_meo, CONTRIBUTION_TYPES, ENV_OBJECTIVES, PRACTICE_LEVELS, REGIONS, RWANDA_CRITERIA_TYPES,
    RWANDA_LEVELS, RWANDA_TYPES, SC_TYPES,
};
use greentaxa_store::{
    ActivityRow, ActivitySlimRow, GeneralCriterionRow, ObjectiveBriefRow, ObjectiveRow,
    PracticeRow, PracticeSlimRow, RwandaRow, SectorBriefRow, SectorRow, SubsectorRow,
    TaxonomyBriefRow, TaxonomyRow, TaxonomyTree, WhitelistRow,
};
use serde::{Deserialize, Serialize};

/// Envelope for every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListResponseDto<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponseDto<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

/// `display_name` wins when non-blank, otherwise the canonical name.
#[must_use]
pub fn effective_objective_name(generic_name: &str, display_name: &str) -> String {
    if display_name.trim().is_empty() {
        generic_name.to_string()
    } else {
        display_name.to_string()
    }
}

/// Objectives whose effective name mentions adaptation carry the whitelist
/// and general-criteria blocks in the detail view.
#[must_use]
pub fn is_adaptation_objective(effective_name: &str) -> bool {
    effective_name.to_lowercase().contains("adaptation")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyBriefDto {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub language: String,
}

impl From<TaxonomyBriefRow> for TaxonomyBriefDto {
    fn from(row: TaxonomyBriefRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            region: row.region,
            language: row.language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub region: String,
    pub country_code: String,
    pub language: String,
    pub dnsh_general: String,
    pub mss: String,
}

impl From<TaxonomyRow> for TaxonomyDto {
    fn from(row: TaxonomyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            region: row.region,
            country_code: row.country_code,
            language: row.language,
            dnsh_general: row.dnsh_general,
            mss: row.mss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectiveBriefDto {
    pub id: i64,
    pub generic_name: String,
    pub display_name: String,
    /// Effective name; what UIs should render.
    pub name: String,
}

impl From<ObjectiveBriefRow> for ObjectiveBriefDto {
    fn from(row: ObjectiveBriefRow) -> Self {
        let name = effective_objective_name(&row.generic_name, &row.display_name);
        Self {
            id: row.id,
            generic_name: row.generic_name,
            display_name: row.display_name,
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectiveDto {
    pub id: i64,
    pub taxonomy_id: i64,
    pub generic_name: String,
    pub display_name: String,
    pub name: String,
}

impl From<ObjectiveRow> for ObjectiveDto {
    fn from(row: ObjectiveRow) -> Self {
        let name = effective_objective_name(&row.generic_name, &row.display_name);
        Self {
            id: row.id,
            taxonomy_id: row.taxonomy_id,
            generic_name: row.generic_name,
            display_name: row.display_name,
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorBriefDto {
    pub id: i64,
    pub name: String,
}

impl From<SectorBriefRow> for SectorBriefDto {
    fn from(row: SectorBriefRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorDto {
    pub id: i64,
    pub taxonomy_id: i64,
    pub objective_id: i64,
    pub name: String,
}

impl From<SectorRow> for SectorDto {
    fn from(row: SectorRow) -> Self {
        Self {
            id: row.id,
            taxonomy_id: row.taxonomy_id,
            objective_id: row.objective_id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubsectorDto {
    pub id: i64,
    pub sector_id: i64,
    pub name: String,
}

impl From<SubsectorRow> for SubsectorDto {
    fn from(row: SubsectorRow) -> Self {
        Self {
            id: row.id,
            sector_id: row.sector_id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityDto {
    pub id: i64,
    pub taxonomy: TaxonomyBriefDto,
    pub objective: ObjectiveBriefDto,
    pub sector: SectorBriefDto,
    pub subsector: Option<SubsectorDto>,
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
    pub dnsh_climate_mitigation: String,
    pub dnsh_climate_adaptation: String,
    pub dnsh_water: String,
    pub dnsh_circular_economy: String,
    pub dnsh_pollution_prevention: String,
    pub dnsh_biodiversity: String,
    pub dnsh_land_management: String,
}

impl From<ActivityRow> for ActivityDto {
    fn from(row: ActivityRow) -> Self {
        let f = row.fields;
        Self {
            id: row.id,
            taxonomy: row.taxonomy.into(),
            objective: row.objective.into(),
            sector: row.sector.into(),
            subsector: row.subsector.map(Into::into),
            taxonomy_code: f.taxonomy_code,
            economic_code_system: f.economic_code_system,
            economic_code: f.economic_code,
            name: f.name,
            description: f.description,
            contribution_type: f.contribution_type,
            sc_criteria_type: f.sc_criteria_type,
            substantial_contribution_criteria: f.substantial_contribution_criteria,
            non_eligibility_criteria: f.non_eligibility_criteria,
            sc_criteria_green: f.sc_criteria_green,
            sc_criteria_amber: f.sc_criteria_amber,
            sc_criteria_red: f.sc_criteria_red,
            dnsh_climate_mitigation: f.dnsh.climate_mitigation,
            dnsh_climate_adaptation: f.dnsh.climate_adaptation,
            dnsh_water: f.dnsh.water,
            dnsh_circular_economy: f.dnsh.circular_economy,
            dnsh_pollution_prevention: f.dnsh.pollution_prevention,
            dnsh_biodiversity: f.dnsh.biodiversity,
            dnsh_land_management: f.dnsh.land_management,
        }
    }
}

/// Criteria-only view: the discriminator, both field groups, and the seven
/// DNSH texts. Identity and hierarchy live on the full projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityCriteriaDto {
    pub sc_criteria_type: String,
    pub substantial_contribution_criteria: String,
    pub non_eligibility_criteria: String,
    pub sc_criteria_green: String,
    pub sc_criteria_amber: String,
    pub sc_criteria_red: String,
    pub dnsh_climate_mitigation: String,
    pub dnsh_climate_adaptation: String,
    pub dnsh_water: String,
    pub dnsh_circular_economy: String,
    pub dnsh_pollution_prevention: String,
    pub dnsh_biodiversity: String,
    pub dnsh_land_management: String,
}

impl From<ActivityRow> for ActivityCriteriaDto {
    fn from(row: ActivityRow) -> Self {
        let f = row.fields;
        Self {
            sc_criteria_type: f.sc_criteria_type,
            substantial_contribution_criteria: f.substantial_contribution_criteria,
            non_eligibility_criteria: f.non_eligibility_criteria,
            sc_criteria_green: f.sc_criteria_green,
            sc_criteria_amber: f.sc_criteria_amber,
            sc_criteria_red: f.sc_criteria_red,
            dnsh_climate_mitigation: f.dnsh.climate_mitigation,
            dnsh_climate_adaptation: f.dnsh.climate_adaptation,
            dnsh_water: f.dnsh.water,
            dnsh_circular_economy: f.dnsh.circular_economy,
            dnsh_pollution_prevention: f.dnsh.pollution_prevention,
            dnsh_biodiversity: f.dnsh.biodiversity,
            dnsh_land_management: f.dnsh.land_management,
        }
    }
}

/// Activity as nested inside the taxonomy detail tree; parents are implied
/// by position, only the optional subsector link is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivitySlimDto {
    pub id: i64,
    pub subsector_id: Option<i64>,
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
    pub dnsh_climate_mitigation: String,
    pub dnsh_climate_adaptation: String,
    pub dnsh_water: String,
    pub dnsh_circular_economy: String,
    pub dnsh_pollution_prevention: String,
    pub dnsh_biodiversity: String,
    pub dnsh_land_management: String,
}

impl From<ActivitySlimRow> for ActivitySlimDto {
    fn from(row: ActivitySlimRow) -> Self {
        let f = row.fields;
        Self {
            id: row.id,
            subsector_id: row.subsector_id,
            taxonomy_code: f.taxonomy_code,
            economic_code_system: f.economic_code_system,
            economic_code: f.economic_code,
            name: f.name,
            description: f.description,
            contribution_type: f.contribution_type,
            sc_criteria_type: f.sc_criteria_type,
            substantial_contribution_criteria: f.substantial_contribution_criteria,
            non_eligibility_criteria: f.non_eligibility_criteria,
            sc_criteria_green: f.sc_criteria_green,
            sc_criteria_amber: f.sc_criteria_amber,
            sc_criteria_red: f.sc_criteria_red,
            dnsh_climate_mitigation: f.dnsh.climate_mitigation,
            dnsh_climate_adaptation: f.dnsh.climate_adaptation,
            dnsh_water: f.dnsh.water,
            dnsh_circular_economy: f.dnsh.circular_economy,
            dnsh_pollution_prevention: f.dnsh.pollution_prevention,
            dnsh_biodiversity: f.dnsh.biodiversity,
            dnsh_land_management: f.dnsh.land_management,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PracticeDto {
    pub id: i64,
    pub taxonomy: TaxonomyBriefDto,
    pub objective: ObjectiveBriefDto,
    pub sector: SectorBriefDto,
    pub subsector: Option<SubsectorDto>,
    pub practice_level: String,
    pub practice_name: String,
    pub practice_description: String,
    pub eligible_practices: String,
    pub non_eligible_practices: String,
    pub green_practices: String,
    pub amber_practices: String,
    pub red_practices: String,
}

impl From<PracticeRow> for PracticeDto {
    fn from(row: PracticeRow) -> Self {
        let f = row.fields;
        Self {
            id: row.id,
            taxonomy: row.taxonomy.into(),
            objective: row.objective.into(),
            sector: row.sector.into(),
            subsector: row.subsector.map(Into::into),
            practice_level: f.practice_level,
            practice_name: f.practice_name,
            practice_description: f.practice_description,
            eligible_practices: f.eligible_practices,
            non_eligible_practices: f.non_eligible_practices,
            green_practices: f.green_practices,
            amber_practices: f.amber_practices,
            red_practices: f.red_practices,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PracticeSlimDto {
    pub id: i64,
    pub subsector_id: Option<i64>,
    pub practice_level: String,
    pub practice_name: String,
    pub practice_description: String,
    pub eligible_practices: String,
    pub non_eligible_practices: String,
    pub green_practices: String,
    pub amber_practices: String,
    pub red_practices: String,
}

impl From<PracticeSlimRow> for PracticeSlimDto {
    fn from(row: PracticeSlimRow) -> Self {
        let f = row.fields;
        Self {
            id: row.id,
            subsector_id: row.subsector_id,
            practice_level: f.practice_level,
            practice_name: f.practice_name,
            practice_description: f.practice_description,
            eligible_practices: f.eligible_practices,
            non_eligible_practices: f.non_eligible_practices,
            green_practices: f.green_practices,
            amber_practices: f.amber_practices,
            red_practices: f.red_practices,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RwandaAdaptationDto {
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

impl From<RwandaRow> for RwandaAdaptationDto {
    fn from(row: RwandaRow) -> Self {
        Self {
            id: row.id,
            taxonomy_id: row.taxonomy_id,
            language: row.language,
            environmental_objective: row.environmental_objective,
            sector: row.sector,
            hazard: row.hazard,
            division: row.division,
            investment: row.investment,
            row_type: row.row_type,
            level: row.level,
            criteria_type: row.criteria_type,
            expected_effect: row.expected_effect,
            expected_result: row.expected_result,
            generic_dnsh: row.generic_dnsh,
            source_ref: row.source_ref,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhitelistDto {
    pub id: i64,
    pub taxonomy_id: i64,
    pub objective_id: i64,
    pub sector: SectorBriefDto,
    pub language: String,
    pub title: String,
    pub description: String,
    pub eligible_activities: String,
}

impl From<WhitelistRow> for WhitelistDto {
    fn from(row: WhitelistRow) -> Self {
        Self {
            id: row.id,
            taxonomy_id: row.taxonomy_id,
            objective_id: row.objective_id,
            sector: row.sector.into(),
            language: row.language,
            title: row.title,
            description: row.description,
            eligible_activities: row.eligible_activities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralCriterionDto {
    pub id: i64,
    pub taxonomy_id: i64,
    pub objective_id: i64,
    pub language: String,
    pub title: String,
    pub criteria: String,
    pub subcriteria: String,
}

impl From<GeneralCriterionRow> for GeneralCriterionDto {
    fn from(row: GeneralCriterionRow) -> Self {
        Self {
            id: row.id,
            taxonomy_id: row.taxonomy_id,
            objective_id: row.objective_id,
            language: row.language,
            title: row.title,
            criteria: row.criteria,
            subcriteria: row.subcriteria,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorDetailDto {
    pub id: i64,
    pub name: String,
    pub subsectors: Vec<SubsectorDto>,
    pub activities: Vec<ActivitySlimDto>,
    pub practices: Vec<PracticeSlimDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectiveDetailDto {
    pub id: i64,
    pub generic_name: String,
    pub display_name: String,
    pub name: String,
    pub sectors: Vec<SectorDetailDto>,
    pub whitelists: Vec<WhitelistDto>,
    pub general_criteria: Vec<GeneralCriterionDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyDetailDto {
    pub taxonomy: TaxonomyDto,
    pub objectives: Vec<ObjectiveDetailDto>,
    pub rwanda_adaptation: Vec<RwandaAdaptationDto>,
}

/// Shapes the stored tree for clients. Practices survive only under the
/// MEO objective, whitelist and general-criteria blocks only under
/// objectives whose effective name mentions adaptation; everything else
/// comes out as empty arrays so the shape stays fixed.
#[must_use]
pub fn taxonomy_detail(tree: TaxonomyTree) -> TaxonomyDetailDto {
    let mut objectives = Vec::with_capacity(tree.objectives.len());
    for node in tree.objectives {
        let meo = is_meo(&node.objective.generic_name);
        let name = effective_objective_name(
            &node.objective.generic_name,
            &node.objective.display_name,
        );
        let adaptation = is_adaptation_objective(&name);

        let sectors = node
            .sectors
            .into_iter()
            .map(|sector| SectorDetailDto {
                id: sector.id,
                name: sector.name,
                subsectors: sector.subsectors.into_iter().map(Into::into).collect(),
                activities: sector.activities.into_iter().map(Into::into).collect(),
                practices: if meo {
                    sector.practices.into_iter().map(Into::into).collect()
                } else {
                    Vec::new()
                },
            })
            .collect();

        objectives.push(ObjectiveDetailDto {
            id: node.objective.id,
            generic_name: node.objective.generic_name,
            display_name: node.objective.display_name,
            name,
            sectors,
            whitelists: if adaptation {
                node.whitelists.into_iter().map(Into::into).collect()
            } else {
                Vec::new()
            },
            general_criteria: if adaptation {
                node.general_criteria.into_iter().map(Into::into).collect()
            } else {
                Vec::new()
            },
        });
    }

    TaxonomyDetailDto {
        taxonomy: tree.taxonomy.into(),
        objectives,
        rwanda_adaptation: tree.rwanda.into_iter().map(Into::into).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RwandaMetaDto {
    pub types: Vec<String>,
    pub levels: Vec<String>,
    pub criteria_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetaDto {
    pub regions: Vec<String>,
    pub environmental_objectives: Vec<String>,
    pub sc_criteria_types: Vec<String>,
    pub practice_levels: Vec<String>,
    pub contribution_types: Vec<String>,
    pub rwanda: RwandaMetaDto,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// The fixed enumerations served by `/v1/meta`.
#[must_use]
pub fn meta() -> MetaDto {
    MetaDto {
        regions: owned(REGIONS),
        environmental_objectives: owned(ENV_OBJECTIVES),
        sc_criteria_types: owned(SC_TYPES),
        practice_levels: owned(PRACTICE_LEVELS),
        contribution_types: owned(CONTRIBUTION_TYPES),
        rwanda: RwandaMetaDto {
            types: owned(RWANDA_TYPES),
            levels: owned(RWANDA_LEVELS),
            criteria_types: owned(RWANDA_CRITERIA_TYPES),
        },
    }
}
