// SPDX-License-Identifier: Apache-2.0
//! Sheet-level import behavior driven through in-memory tables, without a
//! workbook on disk.

use greentaxa_ingest::{
    fix_traffic_light_activities, import_general_criteria_sheet, import_main_sheet,
    import_rwanda_sheet, import_whitelist_sheet,
};
use greentaxa_model::{ImportDefaults, SheetTable, OBJECTIVE_MEO};
use greentaxa_store::{
    find_taxonomy_id, get_taxonomy, list_activities, list_general_criteria, list_practices,
    list_whitelists, store_summary, ActivityFilter, GeneralCriterionFilter, PracticeFilter, Store,
    WhitelistFilter,
};

const MAIN_HEADERS: [&str; 35] = [
    "taxonomy",
    "region",
    "language",
    "environmental_objective",
    "sector",
    "subsector",
    "taxonomy_code",
    "economic_code_system",
    "economic_code",
    "activity",
    "contribution_type",
    "description",
    "sc_criteria_type",
    "substantial_contribution_criteria",
    "non_eligibility_criteria",
    "sc_criteria_green",
    "sc_criteria_amber",
    "sc_criteria_red",
    "dnsh_general",
    "mss",
    "dnsh_climate_mitigation",
    "dnsh_climate_adaptation",
    "dnsh_water",
    "dnsh_circular_economy",
    "dnsh_pollution_prevention",
    "dnsh_biodiversity",
    "dnsh_land_management",
    "practice_level",
    "practice_name",
    "practice_description",
    "eligible_practices",
    "non_eligible_practices",
    "green_practices",
    "amber_practices",
    "red_practices",
];

/// A valid threshold activity row; overrides patch cells by column name.
fn main_row(overrides: &[(&str, &str)]) -> Vec<String> {
    let mut cells: Vec<String> = MAIN_HEADERS
        .iter()
        .map(|h| {
            match *h {
                "taxonomy" => "EU",
                "region" => "Europe",
                "language" => "EN",
                "environmental_objective" => "Climate mitigation",
                "sector" => "Energy",
                "taxonomy_code" => "4.1",
                "economic_code_system" => "NACE",
                "economic_code" => "D35.11",
                "activity" => "Solar photovoltaic power generation",
                "contribution_type" => "Enabling",
                "description" => "Electricity generation from solar PV",
                "sc_criteria_type" => "threshold",
                "substantial_contribution_criteria" => "Life-cycle emissions below 100 gCO2e/kWh",
                _ => "",
            }
            .to_string()
        })
        .collect();
    for (column, value) in overrides {
        let idx = MAIN_HEADERS
            .iter()
            .position(|h| h == column)
            .expect("known column");
        cells[idx] = (*value).to_string();
    }
    cells
}

fn main_table(rows: Vec<Vec<String>>) -> SheetTable {
    SheetTable::new(
        "DB_Taxonomies",
        MAIN_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    )
}

fn store() -> Store {
    Store::open_in_memory().expect("in-memory store")
}

#[test]
fn second_import_updates_instead_of_creating() {
    let mut store = store();
    let table = main_table(vec![
        main_row(&[]),
        main_row(&[
            ("environmental_objective", OBJECTIVE_MEO),
            ("sector", "Agriculture"),
            ("activity", ""),
            ("substantial_contribution_criteria", ""),
            ("practice_level", "basic"),
            ("practice_name", "Cover crops"),
            ("eligible_practices", "Cover cropping between harvests"),
        ]),
    ]);
    let defaults = ImportDefaults::default();

    let first = import_main_sheet(&mut store, &table, &defaults).expect("first import");
    assert_eq!(first.counters.created, 2);
    assert_eq!(first.counters.updated, 0);
    assert_eq!(first.counters.warnings, 0);

    let second = import_main_sheet(&mut store, &table, &defaults).expect("second import");
    assert_eq!(second.counters.created, 0);
    assert_eq!(second.counters.updated, 2);

    let summary = store_summary(store.connection()).expect("summary");
    assert_eq!(summary.taxonomies, 1);
    assert_eq!(summary.activities, 1);
    assert_eq!(summary.practices, 1);
}

#[test]
fn missing_required_columns_fail_the_sheet() {
    let mut store = store();
    let headers: Vec<String> = MAIN_HEADERS
        .iter()
        .filter(|h| **h != "sector" && **h != "sc_criteria_type")
        .map(|h| h.to_string())
        .collect();
    let table = SheetTable::new("DB_Taxonomies", headers, vec![]);

    let err = import_main_sheet(&mut store, &table, &ImportDefaults::default())
        .expect_err("missing columns must fail");
    assert!(err.to_string().contains("missing required columns"));
    assert!(err.to_string().contains("sector"));
    assert!(err.to_string().contains("sc_criteria_type"));
}

#[test]
fn blank_anchor_rows_warn_and_skip() {
    let mut store = store();
    let table = main_table(vec![main_row(&[("sector", "")]), main_row(&[])]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.skipped, 1);
    assert_eq!(report.counters.created, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].row, Some(2));
    assert!(report.warnings[0].message.contains("row skipped"));
}

#[test]
fn invalid_sc_type_coerces_to_threshold_with_warning() {
    let mut store = store();
    let table = main_table(vec![main_row(&[("sc_criteria_type", "colours")])]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.created, 1);
    assert_eq!(report.counters.warnings, 1);
    assert!(report.warnings[0].message.contains("using 'threshold'"));

    let rows = list_activities(store.connection(), &ActivityFilter::default()).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields.sc_criteria_type, "threshold");
    assert_eq!(
        rows[0].fields.substantial_contribution_criteria,
        "Life-cycle emissions below 100 gCO2e/kWh"
    );
}

#[test]
fn traffic_light_rows_clear_threshold_fields() {
    let mut store = store();
    let table = main_table(vec![main_row(&[
        ("sc_criteria_type", "Traffic_Light"),
        ("sc_criteria_green", "Nature-based solutions implemented"),
        ("sc_criteria_amber", "Hybrid measures"),
        ("sc_criteria_red", "Grey infrastructure only"),
        ("non_eligibility_criteria", "should be dropped"),
    ])]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.warnings, 0, "case folding is not an error");

    let rows = list_activities(store.connection(), &ActivityFilter::default()).expect("list");
    let fields = &rows[0].fields;
    assert_eq!(fields.sc_criteria_type, "traffic_light");
    assert_eq!(fields.substantial_contribution_criteria, "");
    assert_eq!(fields.non_eligibility_criteria, "");
    assert_eq!(fields.sc_criteria_green, "Nature-based solutions implemented");
    assert_eq!(fields.sc_criteria_amber, "Hybrid measures");
    assert_eq!(fields.sc_criteria_red, "Grey infrastructure only");
}

#[test]
fn practices_only_attach_to_the_meo_objective() {
    let mut store = store();
    let table = main_table(vec![
        // Objective is not the sentinel: the practice cells are ignored.
        main_row(&[
            ("practice_level", "basic"),
            ("practice_name", "Ignored"),
        ]),
        main_row(&[
            ("environmental_objective", OBJECTIVE_MEO),
            ("sector", "Agriculture"),
            ("activity", ""),
            ("substantial_contribution_criteria", ""),
            ("practice_level", "Avanzado"),
            ("practice_name", "Agroforestry"),
            ("eligible_practices", "Tree intercropping"),
        ]),
    ]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.warnings, 1);
    assert!(report.warnings[0].message.contains("practice ignored"));

    let practices = list_practices(store.connection(), &PracticeFilter::default()).expect("list");
    assert_eq!(practices.len(), 1);
    assert_eq!(practices[0].fields.practice_level, "advanced");
    assert_eq!(practices[0].fields.practice_name, "Agroforestry");
}

#[test]
fn amber_level_requires_exactly_one_colour() {
    let mut store = store();
    let meo = |overrides: &[(&str, &str)]| {
        let mut base = vec![
            ("environmental_objective", OBJECTIVE_MEO),
            ("sector", "Agriculture"),
            ("activity", ""),
            ("substantial_contribution_criteria", ""),
        ];
        base.extend_from_slice(overrides);
        main_row(&base)
    };
    let table = main_table(vec![
        // No colour text at all: skipped.
        meo(&[("practice_level", "amber"), ("practice_name", "Too bare")]),
        // Two colours: skipped.
        meo(&[
            ("practice_level", "red"),
            ("practice_name", "Too full"),
            ("green_practices", "some"),
            ("red_practices", "other"),
        ]),
        // Exactly one colour, Spanish alias for the level: imported.
        meo(&[
            ("practice_level", "Ámbar"),
            ("practice_name", "Reduced tillage"),
            ("amber_practices", "Strip-till on slopes"),
        ]),
    ]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.skipped, 2);
    assert_eq!(report.counters.created, 1);
    assert_eq!(report.counters.warnings, 2);

    let practices = list_practices(store.connection(), &PracticeFilter::default()).expect("list");
    assert_eq!(practices.len(), 1);
    assert_eq!(practices[0].fields.practice_level, "amber");
    assert_eq!(practices[0].fields.amber_practices, "Strip-till on slopes");
    assert_eq!(practices[0].fields.eligible_practices, "");
}

#[test]
fn unknown_practice_level_warns_and_skips() {
    let mut store = store();
    let table = main_table(vec![main_row(&[
        ("environmental_objective", OBJECTIVE_MEO),
        ("sector", "Agriculture"),
        ("activity", ""),
        ("substantial_contribution_criteria", ""),
        ("practice_level", "experimental"),
    ])]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.warnings, 1);
    assert_eq!(report.counters.skipped, 1);
    assert!(report.warnings[0].message.contains("not recognized"));
    assert!(
        list_practices(store.connection(), &PracticeFilter::default())
            .expect("list")
            .is_empty()
    );
}

#[test]
fn threshold_without_substantial_text_warns_but_imports() {
    let mut store = store();
    let table = main_table(vec![main_row(&[(
        "substantial_contribution_criteria",
        "",
    )])]);

    let report =
        import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.created, 1);
    assert_eq!(report.counters.warnings, 1);
    assert!(report.warnings[0].message.contains("imported anyway"));
}

#[test]
fn absent_optional_columns_keep_stored_taxonomy_text() {
    let mut store = store();
    let defaults = ImportDefaults::default();
    let full = main_table(vec![main_row(&[
        ("dnsh_general", "General DNSH text"),
        ("mss", "OECD guidelines apply"),
    ])]);
    import_main_sheet(&mut store, &full, &defaults).expect("seed import");

    let headers: Vec<String> = MAIN_HEADERS
        .iter()
        .filter(|h| **h != "dnsh_general" && **h != "mss")
        .map(|h| h.to_string())
        .collect();
    let without = SheetTable::new(
        "DB_Taxonomies",
        headers,
        vec![main_row(&[])
            .into_iter()
            .zip(MAIN_HEADERS.iter())
            .filter(|(_, h)| **h != "dnsh_general" && **h != "mss")
            .map(|(cell, _)| cell)
            .collect()],
    );
    let report = import_main_sheet(&mut store, &without, &defaults).expect("second import");
    assert_eq!(report.counters.warnings, 2);
    assert!(report.warnings.iter().all(|w| w.row.is_none()));

    let conn = store.connection();
    let id = find_taxonomy_id(conn, "EU").expect("lookup").expect("EU");
    let taxonomy = get_taxonomy(conn, id).expect("get").expect("row");
    assert_eq!(taxonomy.dnsh_general, "General DNSH text");
    assert_eq!(taxonomy.mss, "OECD guidelines apply");
}

#[test]
fn rwanda_rows_missing_key_fields_never_create_the_taxonomy() {
    let mut store = store();
    let headers = [
        "taxonomy",
        "language",
        "environmental_objective",
        "sector",
        "hazard",
        "division",
        "investment",
        "expected effect",
        "type",
        "level",
        "criteria type",
        "source_ref",
    ];
    let table = SheetTable::new(
        "Rwanda_Adaptation",
        headers.iter().map(|h| h.to_string()).collect(),
        vec![vec![
            "RW".into(),
            "EN".into(),
            "Climate adaptation".into(),
            "Agriculture".into(),
            // hazard missing
            String::new(),
            "Crop production".into(),
            "Irrigation".into(),
            "Reduced water stress".into(),
            "Adapted".into(),
            "Activity".into(),
            "Process-based".into(),
            "NST-1".into(),
        ]],
    );

    let report =
        import_rwanda_sheet(&mut store, &table, &ImportDefaults::default()).expect("import");
    assert_eq!(report.counters.skipped, 1);
    assert_eq!(report.counters.created, 0);
    assert!(report.warnings[0].message.contains("row skipped"));
    assert_eq!(
        find_taxonomy_id(store.connection(), "RW").expect("lookup"),
        None
    );
}

#[test]
fn caso2_falls_back_to_the_sector_override() {
    let mut store = store();
    let headers = ["taxonomy", "environmental_objective", "eligible_activities"];
    let table = SheetTable::new(
        "CASO2",
        headers.iter().map(|h| h.to_string()).collect(),
        vec![vec![
            "CR".into(),
            "Climate adaptation".into(),
            "Early-warning systems for hotels".into(),
        ]],
    );
    let defaults = ImportDefaults::default();

    let skipped = import_whitelist_sheet(&mut store, &table, &defaults, None).expect("no override");
    assert_eq!(skipped.counters.skipped, 1);
    assert!(skipped.warnings[0].message.contains("no override given"));

    let report = import_whitelist_sheet(&mut store, &table, &defaults, Some(" Tourism "))
        .expect("with override");
    assert_eq!(report.counters.created, 1);

    let rows = list_whitelists(store.connection(), &WhitelistFilter::default()).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sector.name, "Tourism");
    // No title column: synthesized from the first non-blank source.
    assert_eq!(rows[0].title, "Early-warning systems for hotels");
    assert_eq!(rows[0].language, "ES");
}

#[test]
fn caso2_requires_the_minimum_columns() {
    let mut store = store();
    let table = SheetTable::new(
        "CASO2",
        vec!["taxonomy".to_string(), "sector".to_string()],
        vec![],
    );
    let err = import_whitelist_sheet(&mut store, &table, &ImportDefaults::default(), None)
        .expect_err("objective column is required");
    assert!(err.to_string().contains("environmental_objective"));
}

#[test]
fn caso3_keys_on_title_and_subcriteria() {
    let mut store = store();
    let headers = ["taxonomy", "objetivo", "title", "criterio", "subcriteria"];
    let rows = vec![
        vec![
            "CR".to_string(),
            "Climate adaptation".to_string(),
            "General adaptation criteria".to_string(),
            "Address identified climate risks".to_string(),
            "Risk assessment documented".to_string(),
        ],
        vec![
            "CR".to_string(),
            "Climate adaptation".to_string(),
            "General adaptation criteria".to_string(),
            "Address identified climate risks".to_string(),
            "Monitoring plan in place".to_string(),
        ],
    ];
    let table = SheetTable::new(
        "CASO3",
        headers.iter().map(|h| h.to_string()).collect(),
        rows,
    );
    let defaults = ImportDefaults::default();

    let first = import_general_criteria_sheet(&mut store, &table, &defaults).expect("first");
    assert_eq!(first.counters.created, 2, "subcriteria split the key");

    let second = import_general_criteria_sheet(&mut store, &table, &defaults).expect("second");
    assert_eq!(second.counters.created, 0);
    assert_eq!(second.counters.updated, 2);

    let rows =
        list_general_criteria(store.connection(), &GeneralCriterionFilter::default())
            .expect("list");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.title == "General adaptation criteria"));
}

#[test]
fn fix_rewrites_mislabeled_eu_activities() {
    let mut store = store();
    let table = main_table(vec![
        main_row(&[
            ("activity", "Mislabeled"),
            ("sc_criteria_type", "traffic_light"),
            ("substantial_contribution_criteria", ""),
            ("sc_criteria_green", "Actually a threshold text"),
        ]),
        main_row(&[("activity", "Already fine")]),
    ]);
    import_main_sheet(&mut store, &table, &ImportDefaults::default()).expect("seed");

    let updated = fix_traffic_light_activities(&mut store, "EU").expect("fix");
    assert_eq!(updated, 1);

    let rows = list_activities(store.connection(), &ActivityFilter::default()).expect("list");
    let fixed = rows
        .iter()
        .find(|r| r.fields.name == "Mislabeled")
        .expect("fixed row");
    assert_eq!(fixed.fields.sc_criteria_type, "threshold");
    assert_eq!(
        fixed.fields.substantial_contribution_criteria,
        "Actually a threshold text"
    );
    assert_eq!(fixed.fields.sc_criteria_green, "");

    let err = fix_traffic_light_activities(&mut store, "XX").expect_err("unknown taxonomy");
    assert!(err.to_string().contains("not found"));
}
