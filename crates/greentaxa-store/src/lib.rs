// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]
//! SQLite persistence for the greentaxa catalog.
//!
//! The write side upserts by natural key inside one transaction per sheet;
//! the read side opens read-only connections and returns plain row structs
//! with the parent fields the API embeds.

use std::fmt;
use std::path::Path;

use rusqlite::{Connection, OpenFlags, Transaction};

mod read;
mod schema;
mod write;

pub use read::{
    get_activity, get_general_criterion, get_objective, get_practice, get_rwanda, get_sector,
    get_subsector, get_taxonomy, get_whitelist, list_activities, list_general_criteria,
    list_objectives, list_practices, list_rwanda, list_sectors, list_subsectors, list_taxonomies,
    list_whitelists, store_summary, taxonomy_tree,
};
pub use read::{
    ActivityFields, ActivityFilter, ActivityRow, ActivitySlimRow, GeneralCriterionFilter,
    GeneralCriterionRow, ObjectiveBriefRow, ObjectiveFilter, ObjectiveNode, ObjectiveRow,
    PracticeFields, PracticeFilter, PracticeRow, PracticeSlimRow, RwandaFilter, RwandaRow,
    SectorBriefRow, SectorFilter, SectorNode, SectorRow, StoreSummary, SubsectorFilter,
    SubsectorRow, TaxonomyBriefRow, TaxonomyRow, TaxonomyTree, WhitelistFilter, WhitelistRow,
};
pub use schema::SCHEMA_VERSION;
pub use write::{
    activity_criteria_for_taxonomy, find_taxonomy_id, get_or_create_objective,
    get_or_create_sector, get_or_create_subsector, get_or_create_taxonomy,
    rewrite_activity_criteria, upsert_activity, upsert_general_criterion, upsert_practice,
    upsert_rwanda, upsert_taxonomy, upsert_whitelist, ActivityCriteriaFix, Upsert,
};

pub const CRATE_NAME: &str = "greentaxa-store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Handle over one SQLite database holding the catalog.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if needed) a catalog database and ensures the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Fresh in-memory catalog; dry runs and tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Read-only handle for the query side; fails when the file is absent.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(Self { conn })
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError(e.to_string()))?;
        schema::init(&conn)?;
        Ok(Self { conn })
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// One transaction per imported sheet.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        self.conn
            .transaction()
            .map_err(|e| StoreError(e.to_string()))
    }
}
