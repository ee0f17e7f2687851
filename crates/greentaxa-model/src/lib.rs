// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]
//! Domain model for the greentaxa catalog.
//!
//! Single source of truth for the taxonomy hierarchy vocabulary: canonical
//! enumerations, the spreadsheet field normalizer, the criteria field-group
//! matrix, and the leaf record drafts the importer hands to the store.

mod constants;
mod normalize;
mod record;
mod sheet;
mod validate;

pub use constants::{
    is_meo, is_threshold, is_traffic_light, CONTRIBUTION_NONE, CONTRIBUTION_TYPES,
    ENV_OBJECTIVES, OBJECTIVE_MEO, PRACTICE_LEVELS, PRACTICE_LEVEL_ADDITIONAL_GREEN, REGIONS,
    REGION_OTHER, RWANDA_CRITERIA_TYPES, RWANDA_LEVELS, RWANDA_TYPES, SC_TYPES,
    SC_TYPE_THRESHOLD, SC_TYPE_TRAFFIC_LIGHT,
};
pub use normalize::{
    normalize_practice_level, synth_title, ImportDefaults, LevelAliasTable, ELLIPSIS,
    TITLE_MAX_LEN, UNTITLED,
};
pub use record::{
    ActivityDraft, DnshFields, GeneralCriterionRecord, PracticeCriteria, PracticeDraft,
    RwandaRecord, ScCriteria, ScCriteriaType, TaxonomyDefaults, WhitelistRecord,
};
pub use sheet::{RowView, SheetTable};
pub use validate::{
    decide_columns, validate_env_objective, validate_practice_level, validate_sc_type,
    FieldGroup, ValidationError,
};

pub const CRATE_NAME: &str = "greentaxa-model";
