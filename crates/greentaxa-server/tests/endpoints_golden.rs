// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use greentaxa_model::{
    ActivityDraft, DnshFields, GeneralCriterionRecord, PracticeCriteria, PracticeDraft,
    RwandaRecord, ScCriteria, TaxonomyDefaults, WhitelistRecord, OBJECTIVE_MEO,
};
use greentaxa_server::{build_router, AppState, ServerConfig};
use greentaxa_store::{
    get_or_create_objective, get_or_create_sector, get_or_create_subsector, get_or_create_taxonomy,
    upsert_activity, upsert_general_criterion, upsert_practice, upsert_rwanda, upsert_whitelist,
    Store,
};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn defaults(region: &str, language: &str) -> TaxonomyDefaults {
    TaxonomyDefaults {
        region: region.to_string(),
        language: language.to_string(),
        dnsh_general: None,
        mss: None,
    }
}

/// EU taxonomy with one activity (threshold, under a subsector), one MEO
/// practice, one adaptation whitelist plus criterion, and a second taxonomy
/// holding one Rwanda row. Rowids are insertion-ordered, so ids are fixed.
fn seed_catalog(path: &Path) {
    let store = Store::open(path).expect("open store");
    let conn = store.connection();

    let eu = get_or_create_taxonomy(conn, "EU", &defaults("Europe", "EN")).expect("taxonomy");
    let mitigation = get_or_create_objective(conn, eu, "Climate mitigation").expect("objective");
    let meo = get_or_create_objective(conn, eu, OBJECTIVE_MEO).expect("objective");
    let adaptation = get_or_create_objective(conn, eu, "Climate adaptation").expect("objective");

    let energy = get_or_create_sector(conn, eu, mitigation, "Energy").expect("sector");
    let agriculture = get_or_create_sector(conn, eu, meo, "Agriculture").expect("sector");
    let water = get_or_create_sector(conn, eu, adaptation, "Water supply").expect("sector");
    let solar = get_or_create_subsector(conn, energy, "Solar").expect("subsector");

    upsert_activity(
        conn,
        eu,
        mitigation,
        energy,
        Some(solar),
        &ActivityDraft {
            taxonomy_code: "4.1".to_string(),
            economic_code_system: "NACE".to_string(),
            economic_code: "D35.11".to_string(),
            name: "Solar PV".to_string(),
            description: "Electricity generation using solar photovoltaic technology".to_string(),
            contribution_type: "None".to_string(),
            criteria: ScCriteria::Threshold {
                substantial_contribution: "Life-cycle emissions below 100 gCO2e/kWh".to_string(),
                non_eligibility: String::new(),
            },
            dnsh: DnshFields {
                water: "No significant water impact".to_string(),
                ..DnshFields::default()
            },
        },
    )
    .expect("activity");

    upsert_practice(
        conn,
        eu,
        meo,
        agriculture,
        None,
        &PracticeDraft {
            level: "basic".to_string(),
            name: "Cover crops".to_string(),
            description: String::new(),
            criteria: PracticeCriteria::Eligibility {
                eligible: "Winter cover cropping".to_string(),
                non_eligible: String::new(),
            },
        },
    )
    .expect("practice");

    upsert_whitelist(
        conn,
        eu,
        adaptation,
        water,
        &WhitelistRecord {
            language: "EN".to_string(),
            title: "Drip irrigation".to_string(),
            description: String::new(),
            eligible_activities: "Efficient irrigation retrofits".to_string(),
        },
    )
    .expect("whitelist");

    upsert_general_criterion(
        conn,
        eu,
        adaptation,
        &GeneralCriterionRecord {
            language: "EN".to_string(),
            title: "Vulnerability assessment".to_string(),
            criteria: "Climate risk analysis performed".to_string(),
            subcriteria: "a".to_string(),
        },
    )
    .expect("criterion");

    let rwanda =
        get_or_create_taxonomy(conn, "Rwanda", &defaults("Africa", "EN")).expect("taxonomy");
    upsert_rwanda(
        conn,
        rwanda,
        &RwandaRecord {
            language: "EN".to_string(),
            environmental_objective: "Climate adaptation".to_string(),
            sector: "Agriculture".to_string(),
            hazard: "Drought".to_string(),
            division: "Crops".to_string(),
            investment: "Irrigation".to_string(),
            row_type: "Adapted".to_string(),
            level: "Activity".to_string(),
            criteria_type: "Whitelist".to_string(),
            expected_effect: "Reduced crop loss".to_string(),
            expected_result: "Stable yields".to_string(),
            generic_dnsh: String::new(),
            source_ref: String::new(),
        },
    )
    .expect("rwanda row");
}

async fn send_raw(addr: std::net::SocketAddr, path: &str) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, body.to_string())
}

async fn get_json(addr: std::net::SocketAddr, path: &str) -> (u16, serde_json::Value) {
    let (status, body) = send_raw(addr, path).await;
    let value = serde_json::from_str(&body).expect("json body");
    (status, value)
}

async fn spawn_server(db: &Path) -> std::net::SocketAddr {
    let config = ServerConfig {
        db_path: db.to_path_buf(),
        ..ServerConfig::default()
    };
    let app = build_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

#[tokio::test]
async fn identity_endpoints_answer_without_a_database() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("absent.sqlite");
    let addr = spawn_server(&db).await;

    let (status, body) = send_raw(addr, "/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");

    let (status, version) = get_json(addr, "/v1/version").await;
    assert_eq!(status, 200);
    assert_eq!(version["name"], "greentaxa-server");
    assert_eq!(version["schema_version"], 1);

    let (status, meta) = get_json(addr, "/v1/meta").await;
    assert_eq!(status, 200);
    assert!(meta["regions"]
        .as_array()
        .expect("regions array")
        .contains(&serde_json::json!("Europe")));
    assert_eq!(
        meta["practice_levels"]
            .as_array()
            .expect("levels array")
            .len(),
        6
    );
    assert_eq!(meta["rwanda"]["levels"][1], "Measure");
}

#[tokio::test]
async fn list_and_lookup_endpoints_return_stable_shapes() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("catalog.sqlite");
    seed_catalog(&db);
    let addr = spawn_server(&db).await;

    let (status, taxonomies) = get_json(addr, "/v1/taxonomies").await;
    assert_eq!(status, 200);
    assert_eq!(taxonomies["total"], 2);
    assert_eq!(taxonomies["items"][0]["name"], "EU");
    assert_eq!(taxonomies["items"][1]["region"], "Africa");

    let (status, taxonomy) = get_json(addr, "/v1/taxonomies/1").await;
    assert_eq!(status, 200);
    assert_eq!(taxonomy["name"], "EU");
    assert_eq!(taxonomy["dnsh_general"], "");

    let (status, objectives) = get_json(addr, "/v1/taxonomies/1/objectives").await;
    assert_eq!(status, 200);
    assert_eq!(objectives["total"], 3);
    // Effective name falls back to the canonical name when display is blank.
    assert_eq!(objectives["items"][0]["name"], "Climate mitigation");

    let (status, activities) = get_json(addr, "/v1/activities?taxonomy_id=1").await;
    assert_eq!(status, 200);
    assert_eq!(activities["total"], 1);
    let activity = &activities["items"][0];
    assert_eq!(activity["taxonomy"]["name"], "EU");
    assert_eq!(activity["sector"]["name"], "Energy");
    assert_eq!(activity["subsector"]["name"], "Solar");
    assert_eq!(activity["sc_criteria_type"], "threshold");
    assert_eq!(activity["dnsh_water"], "No significant water impact");
    assert_eq!(activity["sc_criteria_green"], "");

    let (status, criteria) = get_json(addr, "/v1/activities/1/criteria").await;
    assert_eq!(status, 200);
    assert_eq!(
        criteria["substantial_contribution_criteria"],
        "Life-cycle emissions below 100 gCO2e/kWh"
    );
    assert!(criteria.get("name").is_none());
    assert!(criteria.get("taxonomy").is_none());

    let (status, practices) = get_json(addr, "/v1/practices?level=basic").await;
    assert_eq!(status, 200);
    assert_eq!(practices["total"], 1);
    assert_eq!(practices["items"][0]["practice_name"], "Cover crops");

    let (status, practices) = get_json(addr, "/v1/practices?level=amber").await;
    assert_eq!(status, 200);
    assert_eq!(practices["total"], 0);
    assert_eq!(practices["items"].as_array().map(Vec::len), Some(0));

    let (status, subsectors) = get_json(addr, "/v1/subsectors?sector_id=1").await;
    assert_eq!(status, 200);
    assert_eq!(subsectors["items"][0]["name"], "Solar");

    let (status, rwanda) = get_json(addr, "/v1/rwanda-adaptation?taxonomy_id=2").await;
    assert_eq!(status, 200);
    assert_eq!(rwanda["total"], 1);
    assert_eq!(rwanda["items"][0]["division"], "Crops");

    let (status, whitelists) = get_json(addr, "/v1/adaptation-whitelists?objective_id=3").await;
    assert_eq!(status, 200);
    assert_eq!(whitelists["items"][0]["title"], "Drip irrigation");
    assert_eq!(whitelists["items"][0]["sector"]["name"], "Water supply");

    let (status, criteria) =
        get_json(addr, "/v1/adaptation-general-criteria?taxonomy_id=1").await;
    assert_eq!(status, 200);
    assert_eq!(criteria["items"][0]["title"], "Vulnerability assessment");
}

#[tokio::test]
async fn nested_routes_filter_by_path_ids() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("catalog.sqlite");
    seed_catalog(&db);
    let addr = spawn_server(&db).await;

    let (status, sectors) =
        get_json(addr, "/v1/taxonomies/1/objectives/1/sectors?has_activities=1").await;
    assert_eq!(status, 200);
    assert_eq!(sectors["total"], 1);
    assert_eq!(sectors["items"][0]["name"], "Energy");

    // Practices are not activities; the MEO sector filters out.
    let (status, sectors) =
        get_json(addr, "/v1/taxonomies/1/objectives/2/sectors?has_activities=1").await;
    assert_eq!(status, 200);
    assert_eq!(sectors["total"], 0);

    let (status, activities) =
        get_json(addr, "/v1/taxonomies/1/objectives/1/sectors/1/activities").await;
    assert_eq!(status, 200);
    assert_eq!(activities["total"], 1);
    assert_eq!(activities["items"][0]["name"], "Solar PV");

    // Path ids act as filters: an absent parent yields an empty list.
    let (status, activities) =
        get_json(addr, "/v1/taxonomies/99/objectives/1/sectors/1/activities").await;
    assert_eq!(status, 200);
    assert_eq!(activities["total"], 0);
}

#[tokio::test]
async fn detail_projection_gates_leaves_per_objective() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("catalog.sqlite");
    seed_catalog(&db);
    let addr = spawn_server(&db).await;

    let (status, detail) = get_json(addr, "/v1/taxonomies/1/detail").await;
    assert_eq!(status, 200);
    assert_eq!(detail["taxonomy"]["name"], "EU");
    let objectives = detail["objectives"].as_array().expect("objectives");
    assert_eq!(objectives.len(), 3);

    let mitigation = &objectives[0];
    assert_eq!(mitigation["generic_name"], "Climate mitigation");
    assert_eq!(mitigation["sectors"][0]["activities"][0]["name"], "Solar PV");
    assert_eq!(
        mitigation["sectors"][0]["subsectors"][0]["name"],
        "Solar"
    );
    assert_eq!(
        mitigation["sectors"][0]["practices"].as_array().map(Vec::len),
        Some(0)
    );
    assert_eq!(mitigation["whitelists"].as_array().map(Vec::len), Some(0));

    let meo = &objectives[1];
    assert_eq!(
        meo["sectors"][0]["practices"][0]["practice_name"],
        "Cover crops"
    );

    let adaptation = &objectives[2];
    assert_eq!(adaptation["whitelists"][0]["title"], "Drip irrigation");
    assert_eq!(
        adaptation["general_criteria"][0]["title"],
        "Vulnerability assessment"
    );
}

#[tokio::test]
async fn error_envelopes_cover_missing_and_malformed() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("catalog.sqlite");
    seed_catalog(&db);
    let addr = spawn_server(&db).await;

    let (status, err) = get_json(addr, "/v1/taxonomies/999").await;
    assert_eq!(status, 404);
    assert_eq!(err["code"], "not_found");
    assert_eq!(err["details"]["entity"], "taxonomy");

    let (status, err) = get_json(addr, "/v1/taxonomies/abc").await;
    assert_eq!(status, 400);
    assert_eq!(err["code"], "invalid_param");

    let (status, err) = get_json(addr, "/v1/activities?sector_id=abc").await;
    assert_eq!(status, 400);
    assert_eq!(err["code"], "invalid_param");
    assert_eq!(err["details"]["value"], "abc");

    let (status, err) = get_json(addr, "/v1/sectors?bogus=1").await;
    assert_eq!(status, 400);
    assert_eq!(err["code"], "invalid_param");
    assert_eq!(err["details"]["parameter"], "bogus");

    let (status, err) = get_json(addr, "/v1/practices/404").await;
    assert_eq!(status, 404);
    assert_eq!(err["details"]["entity"], "practice");
}

#[tokio::test]
async fn missing_database_maps_to_internal() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("absent.sqlite");
    let addr = spawn_server(&db).await;

    let (status, err) = get_json(addr, "/v1/taxonomies").await;
    assert_eq!(status, 500);
    assert_eq!(err["code"], "internal");
}
