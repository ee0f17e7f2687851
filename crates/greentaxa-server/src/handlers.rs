// SPDX-License-Identifier: Apache-2.0
//! One handler per route. Data handlers parse the query against a closed
//! key set, run the read inside `spawn_blocking`, and shape rows through
//! the api projections; list bodies are `{"items": [...], "total": n}`.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use greentaxa_api::dto::{
    self, ActivityCriteriaDto, ActivityDto, GeneralCriterionDto, ListResponseDto, ObjectiveDto,
    PracticeDto, RwandaAdaptationDto, SectorDto, SubsectorDto, TaxonomyBriefDto, TaxonomyDto,
    WhitelistDto,
};
use greentaxa_api::params;
use greentaxa_api::ApiError;
use greentaxa_store::{
    get_activity, get_general_criterion, get_objective, get_practice, get_rwanda, get_sector,
    get_subsector, get_taxonomy, get_whitelist, list_activities, list_general_criteria,
    list_objectives, list_practices, list_rwanda, list_sectors, list_subsectors, list_taxonomies,
    list_whitelists, taxonomy_tree, ActivityFilter, ObjectiveFilter, SectorFilter,
    SCHEMA_VERSION,
};

use crate::{with_store, AppState, HttpError, CRATE_NAME};

type Params = BTreeMap<String, String>;

fn ok_json<T: Serialize>(payload: T) -> Response {
    (StatusCode::OK, Json(payload)).into_response()
}

fn list_json<T: Serialize>(items: Vec<T>) -> Response {
    ok_json(ListResponseDto::new(items))
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "name": CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "schema_version": SCHEMA_VERSION,
    }))
}

pub(crate) async fn meta_handler() -> impl IntoResponse {
    Json(dto::meta())
}

pub(crate) async fn taxonomies_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    params::reject_unknown(&query, &[])?;
    let rows = with_store(&state, |store| list_taxonomies(store.connection())).await?;
    Ok(list_json(
        rows.into_iter().map(TaxonomyBriefDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn taxonomy_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_taxonomy(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("taxonomy", id))?;
    Ok(ok_json(TaxonomyDto::from(row)))
}

pub(crate) async fn taxonomy_detail_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let tree = with_store(&state, move |store| taxonomy_tree(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("taxonomy", id))?;
    Ok(ok_json(dto::taxonomy_detail(tree)))
}

pub(crate) async fn taxonomy_objectives_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let filter = ObjectiveFilter {
        taxonomy_id: Some(id),
    };
    let rows = with_store(&state, move |store| {
        list_objectives(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(ObjectiveDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn taxonomy_sectors_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let filter = SectorFilter {
        taxonomy_id: Some(id),
        ..SectorFilter::default()
    };
    let rows = with_store(&state, move |store| {
        list_sectors(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(SectorDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn objective_sectors_handler(
    State(state): State<AppState>,
    Path((raw_taxonomy, raw_objective)): Path<(String, String)>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let taxonomy_id = params::parse_path_id(&raw_taxonomy)?;
    let objective_id = params::parse_path_id(&raw_objective)?;
    let filter = params::parse_nested_sector_filter(&query, taxonomy_id, objective_id)?;
    let rows = with_store(&state, move |store| {
        list_sectors(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(SectorDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn sector_activities_handler(
    State(state): State<AppState>,
    Path((raw_taxonomy, raw_objective, raw_sector)): Path<(String, String, String)>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let taxonomy_id = params::parse_path_id(&raw_taxonomy)?;
    let objective_id = params::parse_path_id(&raw_objective)?;
    let sector_id = params::parse_path_id(&raw_sector)?;
    params::reject_unknown(&query, &[])?;
    let filter = ActivityFilter {
        taxonomy_id: Some(taxonomy_id),
        objective_id: Some(objective_id),
        sector_id: Some(sector_id),
        subsector_id: None,
    };
    let rows = with_store(&state, move |store| {
        list_activities(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(ActivityDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn objectives_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_objective_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_objectives(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(ObjectiveDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn objective_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_objective(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("objective", id))?;
    Ok(ok_json(ObjectiveDto::from(row)))
}

pub(crate) async fn sectors_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_sector_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_sectors(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(SectorDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn sector_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_sector(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("sector", id))?;
    Ok(ok_json(SectorDto::from(row)))
}

pub(crate) async fn subsectors_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_subsector_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_subsectors(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(SubsectorDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn subsector_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_subsector(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("subsector", id))?;
    Ok(ok_json(SubsectorDto::from(row)))
}

pub(crate) async fn activities_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_activity_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_activities(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(ActivityDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn activity_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_activity(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("activity", id))?;
    Ok(ok_json(ActivityDto::from(row)))
}

pub(crate) async fn activity_criteria_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_activity(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("activity", id))?;
    Ok(ok_json(ActivityCriteriaDto::from(row)))
}

pub(crate) async fn practices_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_practice_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_practices(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(PracticeDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn practice_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_practice(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("practice", id))?;
    Ok(ok_json(PracticeDto::from(row)))
}

pub(crate) async fn rwanda_adaptation_list_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_rwanda_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_rwanda(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter()
            .map(RwandaAdaptationDto::from)
            .collect::<Vec<_>>(),
    ))
}

pub(crate) async fn rwanda_adaptation_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_rwanda(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("rwanda_adaptation", id))?;
    Ok(ok_json(RwandaAdaptationDto::from(row)))
}

pub(crate) async fn whitelists_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_whitelist_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_whitelists(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter().map(WhitelistDto::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn whitelist_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| get_whitelist(store.connection(), id))
        .await?
        .ok_or_else(|| ApiError::not_found("adaptation_whitelist", id))?;
    Ok(ok_json(WhitelistDto::from(row)))
}

pub(crate) async fn general_criteria_handler(
    State(state): State<AppState>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let filter = params::parse_general_criterion_filter(&query)?;
    let rows = with_store(&state, move |store| {
        list_general_criteria(store.connection(), &filter)
    })
    .await?;
    Ok(list_json(
        rows.into_iter()
            .map(GeneralCriterionDto::from)
            .collect::<Vec<_>>(),
    ))
}

pub(crate) async fn general_criterion_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<Params>,
) -> Result<Response, HttpError> {
    let id = params::parse_path_id(&raw_id)?;
    params::reject_unknown(&query, &[])?;
    let row = with_store(&state, move |store| {
        get_general_criterion(store.connection(), id)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("adaptation_general_criterion", id))?;
    Ok(ok_json(GeneralCriterionDto::from(row)))
}
