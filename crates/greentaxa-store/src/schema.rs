// SPDX-License-Identifier: Apache-2.0
//! Catalog schema. Natural keys are enforced with unique indexes; the
//! nullable subsector column participates via COALESCE so absent subsectors
//! collide instead of multiplying.

use rusqlite::Connection;

use crate::StoreError;

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS taxonomy (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE,
  description TEXT NOT NULL DEFAULT '',
  region TEXT NOT NULL DEFAULT 'Other',
  country_code TEXT NOT NULL DEFAULT '',
  language TEXT NOT NULL DEFAULT '',
  dnsh_general TEXT NOT NULL DEFAULT '',
  mss TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS objective (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  generic_name TEXT NOT NULL,
  display_name TEXT NOT NULL DEFAULT '',
  UNIQUE (taxonomy_id, generic_name)
);
CREATE TABLE IF NOT EXISTS sector (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  objective_id INTEGER NOT NULL REFERENCES objective(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  UNIQUE (taxonomy_id, objective_id, name)
);
CREATE TABLE IF NOT EXISTS subsector (
  id INTEGER PRIMARY KEY,
  sector_id INTEGER NOT NULL REFERENCES sector(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  UNIQUE (sector_id, name)
);
CREATE TABLE IF NOT EXISTS activity (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  objective_id INTEGER NOT NULL REFERENCES objective(id) ON DELETE CASCADE,
  sector_id INTEGER NOT NULL REFERENCES sector(id) ON DELETE CASCADE,
  subsector_id INTEGER REFERENCES subsector(id) ON DELETE CASCADE,
  taxonomy_code TEXT NOT NULL DEFAULT '',
  economic_code_system TEXT NOT NULL DEFAULT '',
  economic_code TEXT NOT NULL DEFAULT '',
  name TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  contribution_type TEXT NOT NULL DEFAULT 'None',
  sc_criteria_type TEXT NOT NULL DEFAULT 'threshold',
  substantial_contribution_criteria TEXT NOT NULL DEFAULT '',
  non_eligibility_criteria TEXT NOT NULL DEFAULT '',
  sc_criteria_green TEXT NOT NULL DEFAULT '',
  sc_criteria_amber TEXT NOT NULL DEFAULT '',
  sc_criteria_red TEXT NOT NULL DEFAULT '',
  dnsh_climate_mitigation TEXT NOT NULL DEFAULT '',
  dnsh_climate_adaptation TEXT NOT NULL DEFAULT '',
  dnsh_water TEXT NOT NULL DEFAULT '',
  dnsh_circular_economy TEXT NOT NULL DEFAULT '',
  dnsh_pollution_prevention TEXT NOT NULL DEFAULT '',
  dnsh_biodiversity TEXT NOT NULL DEFAULT '',
  dnsh_land_management TEXT NOT NULL DEFAULT ''
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_activity_natural_key
  ON activity(taxonomy_id, objective_id, sector_id, COALESCE(subsector_id, 0), name);
CREATE TABLE IF NOT EXISTS practice (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  objective_id INTEGER NOT NULL REFERENCES objective(id) ON DELETE CASCADE,
  sector_id INTEGER NOT NULL REFERENCES sector(id) ON DELETE CASCADE,
  subsector_id INTEGER REFERENCES subsector(id) ON DELETE CASCADE,
  practice_level TEXT NOT NULL,
  practice_name TEXT NOT NULL DEFAULT '',
  practice_description TEXT NOT NULL DEFAULT '',
  eligible_practices TEXT NOT NULL DEFAULT '',
  non_eligible_practices TEXT NOT NULL DEFAULT '',
  green_practices TEXT NOT NULL DEFAULT '',
  amber_practices TEXT NOT NULL DEFAULT '',
  red_practices TEXT NOT NULL DEFAULT ''
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_practice_natural_key
  ON practice(taxonomy_id, objective_id, sector_id, COALESCE(subsector_id, 0), practice_level, practice_name);
CREATE TABLE IF NOT EXISTS rwanda_adaptation (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  language TEXT NOT NULL DEFAULT '',
  environmental_objective TEXT NOT NULL,
  sector TEXT NOT NULL,
  hazard TEXT NOT NULL,
  division TEXT NOT NULL,
  investment TEXT NOT NULL,
  row_type TEXT NOT NULL DEFAULT '',
  level TEXT NOT NULL DEFAULT '',
  criteria_type TEXT NOT NULL DEFAULT '',
  expected_effect TEXT NOT NULL DEFAULT '',
  expected_result TEXT NOT NULL DEFAULT '',
  generic_dnsh TEXT NOT NULL DEFAULT '',
  source_ref TEXT NOT NULL DEFAULT '',
  UNIQUE (taxonomy_id, environmental_objective, sector, hazard, division, investment,
          row_type, level, criteria_type, expected_effect, expected_result)
);
CREATE TABLE IF NOT EXISTS adaptation_whitelist (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  objective_id INTEGER NOT NULL REFERENCES objective(id) ON DELETE CASCADE,
  sector_id INTEGER NOT NULL REFERENCES sector(id) ON DELETE CASCADE,
  language TEXT NOT NULL DEFAULT '',
  title TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  eligible_activities TEXT NOT NULL DEFAULT '',
  UNIQUE (taxonomy_id, objective_id, sector_id, title)
);
CREATE TABLE IF NOT EXISTS adaptation_general_criterion (
  id INTEGER PRIMARY KEY,
  taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
  objective_id INTEGER NOT NULL REFERENCES objective(id) ON DELETE CASCADE,
  language TEXT NOT NULL DEFAULT '',
  title TEXT NOT NULL,
  criteria TEXT NOT NULL DEFAULT '',
  subcriteria TEXT NOT NULL DEFAULT '',
  UNIQUE (taxonomy_id, objective_id, title, subcriteria)
);
CREATE INDEX IF NOT EXISTS idx_objective_taxonomy ON objective(taxonomy_id);
CREATE INDEX IF NOT EXISTS idx_sector_scope ON sector(taxonomy_id, objective_id);
CREATE INDEX IF NOT EXISTS idx_subsector_sector ON subsector(sector_id);
CREATE INDEX IF NOT EXISTS idx_activity_scope ON activity(taxonomy_id, objective_id, sector_id);
CREATE INDEX IF NOT EXISTS idx_practice_scope ON practice(taxonomy_id, objective_id, sector_id);
CREATE INDEX IF NOT EXISTS idx_rwanda_taxonomy ON rwanda_adaptation(taxonomy_id);
CREATE INDEX IF NOT EXISTS idx_whitelist_scope ON adaptation_whitelist(taxonomy_id, objective_id, sector_id);
CREATE INDEX IF NOT EXISTS idx_general_criterion_scope ON adaptation_general_criterion(taxonomy_id, objective_id);
";

pub(crate) fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| StoreError(e.to_string()))?;
    conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(())
}
