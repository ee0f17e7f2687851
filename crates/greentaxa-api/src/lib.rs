// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]
//! Transport-agnostic contract of the read API: the error envelope, query
//! parameter parsing, and the JSON projections served over HTTP.
//!
//! Nothing in here knows about axum; the server crate maps [`ApiError`]
//! codes to status lines and hands parsed params to the store.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub mod dto;

pub const CRATE_NAME: &str = "greentaxa-api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidParam,
    NotFound,
    Internal,
}

/// Wire-stable error envelope; every non-2xx body is one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self {
            code: ApiErrorCode::InvalidParam,
            message: format!("invalid query parameter: {name}"),
            details: json!({"parameter": name, "value": value}),
        }
    }

    #[must_use]
    pub fn unknown_param(name: &str) -> Self {
        Self {
            code: ApiErrorCode::InvalidParam,
            message: format!("unknown query parameter: {name}"),
            details: json!({"parameter": name}),
        }
    }

    #[must_use]
    pub fn invalid_id(raw: &str) -> Self {
        Self {
            code: ApiErrorCode::InvalidParam,
            message: "path id must be an integer".to_string(),
            details: json!({"parameter": "id", "value": raw}),
        }
    }

    #[must_use]
    pub fn not_found(entity: &str, id: i64) -> Self {
        Self {
            code: ApiErrorCode::NotFound,
            message: format!("{entity} not found"),
            details: json!({"entity": entity, "id": id}),
        }
    }

    #[must_use]
    pub fn internal(message: &str) -> Self {
        Self {
            code: ApiErrorCode::Internal,
            message: message.to_string(),
            details: json!({}),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

pub mod params {
    //! Query-string parsing over a `BTreeMap<String, String>`.
    //!
    //! Every endpoint has a closed set of accepted keys; anything else is
    //! rejected so typos surface as 400s instead of silently-unfiltered
    //! lists. Ids are `i64` and must parse exactly.

    use super::ApiError;
    use greentaxa_store::{
        ActivityFilter, GeneralCriterionFilter, ObjectiveFilter, PracticeFilter, RwandaFilter,
        SectorFilter, SubsectorFilter, WhitelistFilter,
    };
    use std::collections::BTreeMap;

    /// Rejects any key outside `allowed`. Endpoints without query params
    /// pass an empty slice.
    pub fn reject_unknown(
        query: &BTreeMap<String, String>,
        allowed: &[&str],
    ) -> Result<(), ApiError> {
        for key in query.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(ApiError::unknown_param(key));
            }
        }
        Ok(())
    }

    /// Parses a path segment as a row id.
    pub fn parse_path_id(raw: &str) -> Result<i64, ApiError> {
        raw.parse::<i64>().map_err(|_| ApiError::invalid_id(raw))
    }

    fn opt_id(query: &BTreeMap<String, String>, name: &str) -> Result<Option<i64>, ApiError> {
        match query.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ApiError::invalid_param(name, raw)),
        }
    }

    fn opt_flag(query: &BTreeMap<String, String>, name: &str) -> Result<bool, ApiError> {
        match query.get(name) {
            None => Ok(false),
            Some(raw) if raw == "1" || raw.eq_ignore_ascii_case("true") => Ok(true),
            Some(raw) if raw == "0" || raw.eq_ignore_ascii_case("false") => Ok(false),
            Some(raw) => Err(ApiError::invalid_param(name, raw)),
        }
    }

    pub fn parse_objective_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<ObjectiveFilter, ApiError> {
        reject_unknown(query, &["taxonomy_id"])?;
        Ok(ObjectiveFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
        })
    }

    pub fn parse_sector_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<SectorFilter, ApiError> {
        reject_unknown(query, &["taxonomy_id", "objective_id", "has_activities"])?;
        Ok(SectorFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
            objective_id: opt_id(query, "objective_id")?,
            has_activities: opt_flag(query, "has_activities")?,
        })
    }

    /// Variant for the nested sectors route where taxonomy and objective
    /// come from the path; only `has_activities` may appear in the query.
    pub fn parse_nested_sector_filter(
        query: &BTreeMap<String, String>,
        taxonomy_id: i64,
        objective_id: i64,
    ) -> Result<SectorFilter, ApiError> {
        reject_unknown(query, &["has_activities"])?;
        Ok(SectorFilter {
            taxonomy_id: Some(taxonomy_id),
            objective_id: Some(objective_id),
            has_activities: opt_flag(query, "has_activities")?,
        })
    }

    pub fn parse_subsector_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<SubsectorFilter, ApiError> {
        reject_unknown(query, &["sector_id"])?;
        Ok(SubsectorFilter {
            sector_id: opt_id(query, "sector_id")?,
        })
    }

    pub fn parse_activity_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<ActivityFilter, ApiError> {
        reject_unknown(query, &["taxonomy_id", "objective_id", "sector_id"])?;
        Ok(ActivityFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
            objective_id: opt_id(query, "objective_id")?,
            sector_id: opt_id(query, "sector_id")?,
            subsector_id: None,
        })
    }

    pub fn parse_practice_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<PracticeFilter, ApiError> {
        reject_unknown(
            query,
            &[
                "taxonomy_id",
                "objective_id",
                "objective",
                "sector_id",
                "subsector_id",
                "level",
            ],
        )?;
        Ok(PracticeFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
            objective_id: opt_id(query, "objective_id")?,
            objective: query.get("objective").cloned(),
            sector_id: opt_id(query, "sector_id")?,
            subsector_id: opt_id(query, "subsector_id")?,
            level: query.get("level").cloned(),
        })
    }

    pub fn parse_rwanda_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<RwandaFilter, ApiError> {
        reject_unknown(query, &["taxonomy_id"])?;
        Ok(RwandaFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
        })
    }

    pub fn parse_whitelist_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<WhitelistFilter, ApiError> {
        reject_unknown(query, &["taxonomy_id", "objective_id", "sector_id"])?;
        Ok(WhitelistFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
            objective_id: opt_id(query, "objective_id")?,
            sector_id: opt_id(query, "sector_id")?,
        })
    }

    pub fn parse_general_criterion_filter(
        query: &BTreeMap<String, String>,
    ) -> Result<GeneralCriterionFilter, ApiError> {
        reject_unknown(query, &["taxonomy_id", "objective_id"])?;
        Ok(GeneralCriterionFilter {
            taxonomy_id: opt_id(query, "taxonomy_id")?,
            objective_id: opt_id(query, "objective_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::params::{
        parse_activity_filter, parse_path_id, parse_practice_filter, parse_sector_filter,
        reject_unknown,
    };
    use super::{ApiError, ApiErrorCode};
    use std::collections::BTreeMap;

    fn q(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn error_codes_serialize_snake_case() {
        let e = ApiError::not_found("activity", 9);
        let v = serde_json::to_value(&e).expect("serialize");
        assert_eq!(v["code"], "not_found");
        assert_eq!(v["details"]["entity"], "activity");
        assert_eq!(v["details"]["id"], 9);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse_sector_filter(&q(&[("taxonmy_id", "1")])).expect_err("typo");
        assert_eq!(err.code, ApiErrorCode::InvalidParam);
        assert_eq!(err.details["parameter"], "taxonmy_id");
    }

    #[test]
    fn non_integer_id_is_rejected() {
        let err = parse_activity_filter(&q(&[("sector_id", "abc")])).expect_err("bad id");
        assert_eq!(err.code, ApiErrorCode::InvalidParam);
        assert_eq!(err.details["value"], "abc");
    }

    #[test]
    fn has_activities_accepts_bool_spellings() {
        assert!(
            parse_sector_filter(&q(&[("has_activities", "1")]))
                .expect("flag")
                .has_activities
        );
        assert!(
            parse_sector_filter(&q(&[("has_activities", "TRUE")]))
                .expect("flag")
                .has_activities
        );
        assert!(
            !parse_sector_filter(&q(&[("has_activities", "0")]))
                .expect("flag")
                .has_activities
        );
        assert!(parse_sector_filter(&q(&[("has_activities", "yes")])).is_err());
    }

    #[test]
    fn practice_filter_carries_text_params_verbatim() {
        let filter = parse_practice_filter(&q(&[
            ("objective", "Objetivos múltiples"),
            ("level", "amber"),
        ]))
        .expect("filter");
        assert_eq!(filter.objective.as_deref(), Some("Objetivos múltiples"));
        assert_eq!(filter.level.as_deref(), Some("amber"));
        assert_eq!(filter.taxonomy_id, None);
    }

    #[test]
    fn path_id_must_be_integer() {
        assert_eq!(parse_path_id("42").expect("id"), 42);
        let err = parse_path_id("42x").expect_err("bad id");
        assert_eq!(err.code, ApiErrorCode::InvalidParam);
    }

    #[test]
    fn empty_allow_list_rejects_everything() {
        assert!(reject_unknown(&q(&[]), &[]).is_ok());
        assert!(reject_unknown(&q(&[("pretty", "1")]), &[]).is_err());
    }
}
