// SPDX-License-Identifier: Apache-2.0
//! Leaf record drafts handed from the importer to the store.
//!
//! Criteria carry an explicit active-variant tag instead of a record with
//! conditionally meaningful fields; the store maps the inactive group to
//! blank columns on write.

use serde::{Deserialize, Serialize};

use crate::constants::{SC_TYPE_THRESHOLD, SC_TYPE_TRAFFIC_LIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScCriteriaType {
    Threshold,
    TrafficLight,
}

impl ScCriteriaType {
    /// Case-insensitive parse of the sheet discriminator.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            SC_TYPE_THRESHOLD => Some(Self::Threshold),
            SC_TYPE_TRAFFIC_LIGHT => Some(Self::TrafficLight),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => SC_TYPE_THRESHOLD,
            Self::TrafficLight => SC_TYPE_TRAFFIC_LIGHT,
        }
    }
}

/// Substantial-contribution criteria of an Activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScCriteria {
    Threshold {
        substantial_contribution: String,
        non_eligibility: String,
    },
    TrafficLight {
        green: String,
        amber: String,
        red: String,
    },
}

impl ScCriteria {
    #[must_use]
    pub fn criteria_type(&self) -> ScCriteriaType {
        match self {
            Self::Threshold { .. } => ScCriteriaType::Threshold,
            Self::TrafficLight { .. } => ScCriteriaType::TrafficLight,
        }
    }
}

/// Criteria of a Practice (MEO leaves).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PracticeCriteria {
    Eligibility {
        eligible: String,
        non_eligible: String,
    },
    Traffic {
        green: String,
        amber: String,
        red: String,
    },
}

/// The seven fixed do-no-significant-harm text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnshFields {
    pub climate_mitigation: String,
    pub climate_adaptation: String,
    pub water: String,
    pub circular_economy: String,
    pub pollution_prevention: String,
    pub biodiversity: String,
    pub land_management: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub taxonomy_code: String,
    pub economic_code_system: String,
    pub economic_code: String,
    pub name: String,
    pub description: String,
    pub contribution_type: String,
    pub criteria: ScCriteria,
    pub dnsh: DnshFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeDraft {
    /// Canonical token from the six-value allow-list.
    pub level: String,
    pub name: String,
    pub description: String,
    pub criteria: PracticeCriteria,
}

/// Taxonomy fields refreshed on every main-sheet row. `dnsh_general` and
/// `mss` are `None` when their columns are absent, leaving stored values
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyDefaults {
    pub region: String,
    pub language: String,
    pub dnsh_general: Option<String>,
    pub mss: Option<String>,
}

/// One Rwanda_Adaptation row. Classification fields are free text; the
/// generic hierarchy does not apply. Shared by the importer and the read
/// side, since stored rows keep exactly this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RwandaRecord {
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

impl RwandaRecord {
    /// The five row-local key fields required alongside the taxonomy name.
    #[must_use]
    pub fn has_key_fields(&self) -> bool {
        !(self.environmental_objective.is_empty()
            || self.sector.is_empty()
            || self.hazard.is_empty()
            || self.division.is_empty()
            || self.investment.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistRecord {
    pub language: String,
    pub title: String,
    pub description: String,
    pub eligible_activities: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralCriterionRecord {
    pub language: String,
    pub title: String,
    pub criteria: String,
    pub subcriteria: String,
}
