// SPDX-License-Identifier: Apache-2.0
//! Canonical vocabulary shared by the importer, the validators, and the
//! read API's meta endpoint.

/// Sentinel objective whose leaves are Practice-shaped instead of
/// Activity-shaped.
pub const OBJECTIVE_MEO: &str = "Multiple environmental objectives";

pub const ENV_OBJECTIVES: &[&str] = &[
    "Climate mitigation",
    "Climate adaptation",
    "Water",
    "Biodiversity",
    "Circular economy",
    "Pollution prevention",
    OBJECTIVE_MEO,
];

pub const REGION_OTHER: &str = "Other";

pub const REGIONS: &[&str] = &[
    "Europe",
    "Asia",
    "Africa",
    "Latin America and the Caribbean",
    "Oceania",
    "Middle East",
    REGION_OTHER,
];

pub const SC_TYPE_THRESHOLD: &str = "threshold";
pub const SC_TYPE_TRAFFIC_LIGHT: &str = "traffic_light";
pub const SC_TYPES: &[&str] = &[SC_TYPE_THRESHOLD, SC_TYPE_TRAFFIC_LIGHT];

pub const PRACTICE_LEVEL_ADDITIONAL_GREEN: &str = "additional eligible green practices";

/// Canonical practice levels in suggested render order.
pub const PRACTICE_LEVELS: &[&str] = &[
    "basic",
    "intermediate",
    "advanced",
    PRACTICE_LEVEL_ADDITIONAL_GREEN,
    "amber",
    "red",
];

pub const CONTRIBUTION_NONE: &str = "None";
pub const CONTRIBUTION_TYPES: &[&str] = &["Enabling", "Transitional", CONTRIBUTION_NONE];

// Rwanda Adaptation reference lists. Stored rows keep whatever the source
// sheet carried; these exist for the meta endpoint and front-end pickers.
pub const RWANDA_TYPES: &[&str] = &["Adapted", "Adapting", "Enabling"];
pub const RWANDA_LEVELS: &[&str] = &["Activity", "Measure"];
pub const RWANDA_CRITERIA_TYPES: &[&str] =
    &["Process-based", "Quantitative", "Qualitative", "Whitelist"];

#[must_use]
pub fn is_meo(objective: &str) -> bool {
    objective.trim() == OBJECTIVE_MEO
}

#[must_use]
pub fn is_traffic_light(sc_type: &str) -> bool {
    sc_type.trim() == SC_TYPE_TRAFFIC_LIGHT
}

#[must_use]
pub fn is_threshold(sc_type: &str) -> bool {
    sc_type.trim() == SC_TYPE_THRESHOLD
}
