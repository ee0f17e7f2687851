// SPDX-License-Identifier: Apache-2.0
//! Membership validators over the fixed enumerations, and the declarative
//! objective × criteria-type field-group matrix.

use std::fmt;

use serde::Serialize;

use crate::constants::{
    is_meo, ENV_OBJECTIVES, PRACTICE_LEVELS, SC_TYPES, SC_TYPE_THRESHOLD, SC_TYPE_TRAFFIC_LIGHT,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_env_objective(value: &str) -> Result<(), ValidationError> {
    let v = value.trim();
    if ENV_OBJECTIVES.contains(&v) {
        Ok(())
    } else {
        Err(ValidationError(format!(
            "invalid environmental_objective '{value}'; allowed: {ENV_OBJECTIVES:?}"
        )))
    }
}

pub fn validate_sc_type(value: &str) -> Result<(), ValidationError> {
    let v = value.trim().to_lowercase();
    if SC_TYPES.contains(&v.as_str()) {
        Ok(())
    } else {
        Err(ValidationError(format!(
            "invalid sc_criteria_type '{value}'; allowed: {SC_TYPES:?}"
        )))
    }
}

/// Blank levels are valid: a blank cell means the row carries no practice.
pub fn validate_practice_level(value: &str) -> Result<(), ValidationError> {
    let v = value.trim().to_lowercase();
    if v.is_empty() || PRACTICE_LEVELS.contains(&v.as_str()) {
        Ok(())
    } else {
        Err(ValidationError(format!(
            "invalid practice_level '{value}'; allowed: {PRACTICE_LEVELS:?}"
        )))
    }
}

/// Which field group is authoritative for a given objective and criteria
/// type. The importer enforces the same matrix procedurally; this is the
/// declarative source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    ActivityThreshold,
    ActivityTraffic,
    MeoThreshold,
    MeoTraffic,
}

impl FieldGroup {
    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::ActivityThreshold => {
                &["substantial_contribution_criteria", "non_eligibility_criteria"]
            }
            Self::ActivityTraffic => &["sc_criteria_green", "sc_criteria_amber", "sc_criteria_red"],
            Self::MeoThreshold => &[
                "practice_level",
                "practice_name",
                "practice_description",
                "eligible_practices",
                "non_eligible_practices",
            ],
            Self::MeoTraffic => &["green_practices", "amber_practices", "red_practices"],
        }
    }
}

pub fn decide_columns(objective: &str, sc_type: &str) -> Result<FieldGroup, ValidationError> {
    let meo = is_meo(objective);
    match sc_type.trim().to_lowercase().as_str() {
        SC_TYPE_TRAFFIC_LIGHT if meo => Ok(FieldGroup::MeoTraffic),
        SC_TYPE_TRAFFIC_LIGHT => Ok(FieldGroup::ActivityTraffic),
        SC_TYPE_THRESHOLD if meo => Ok(FieldGroup::MeoThreshold),
        SC_TYPE_THRESHOLD => Ok(FieldGroup::ActivityThreshold),
        _ => Err(ValidationError(format!(
            "unknown combination objective='{objective}' sc_type='{sc_type}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::OBJECTIVE_MEO;

    #[test]
    fn objective_membership() {
        assert!(validate_env_objective("Climate mitigation").is_ok());
        assert!(validate_env_objective(" Water ").is_ok());
        let err = validate_env_objective("Ozone").expect_err("out of domain");
        assert!(err.0.contains("Ozone"));
        assert!(err.0.contains("allowed"));
    }

    #[test]
    fn sc_type_membership() {
        assert!(validate_sc_type("threshold").is_ok());
        assert!(validate_sc_type("Traffic_Light").is_ok());
        assert!(validate_sc_type("semaforo").is_err());
    }

    #[test]
    fn practice_level_membership_accepts_blank() {
        assert!(validate_practice_level("").is_ok());
        assert!(validate_practice_level("basic").is_ok());
        assert!(validate_practice_level("Additional Eligible Green Practices").is_ok());
        let err = validate_practice_level("platinum").expect_err("out of domain");
        assert!(err.0.contains("platinum"));
    }

    #[test]
    fn matrix_covers_all_four_combinations() {
        assert_eq!(
            decide_columns(OBJECTIVE_MEO, "traffic_light"),
            Ok(FieldGroup::MeoTraffic)
        );
        assert_eq!(
            decide_columns("Climate mitigation", "traffic_light"),
            Ok(FieldGroup::ActivityTraffic)
        );
        assert_eq!(decide_columns(OBJECTIVE_MEO, "threshold"), Ok(FieldGroup::MeoThreshold));
        assert_eq!(
            decide_columns("Water", " threshold "),
            Ok(FieldGroup::ActivityThreshold)
        );
        assert!(decide_columns("Water", "other").is_err());
    }

    #[test]
    fn matrix_names_real_columns() {
        assert!(FieldGroup::ActivityThreshold
            .columns()
            .contains(&"non_eligibility_criteria"));
        assert!(FieldGroup::MeoTraffic.columns().contains(&"amber_practices"));
        assert_eq!(FieldGroup::ActivityTraffic.columns().len(), 3);
    }
}
