//! `/api/material-methods` endpoints.

use api_types::{
    MethodType as ApiMethodType,
    material::MaterialRef,
    material_method::MaterialMethod,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, Uri},
};

use crate::{ServerError, headers, pagination, server::ServerState};

const ENTITY_NAME: &str = "materialMethod";

pub(crate) fn map_type(kind: engine::MethodType) -> ApiMethodType {
    match kind {
        engine::MethodType::Buy => ApiMethodType::Buy,
        engine::MethodType::Make => ApiMethodType::Make,
    }
}

fn unmap_type(kind: ApiMethodType) -> engine::MethodType {
    match kind {
        ApiMethodType::Buy => engine::MethodType::Buy,
        ApiMethodType::Make => engine::MethodType::Make,
    }
}

fn map_method(method: engine::MaterialMethod) -> MaterialMethod {
    MaterialMethod {
        id: method.id,
        method_type: Some(map_type(method.method_type)),
        material: method.material().map(|owner| MaterialRef {
            id: owner.id,
            name: owner.name.clone(),
            description: owner.description.clone(),
        }),
    }
}

fn method_data(payload: MaterialMethod) -> engine::MethodData {
    engine::MethodData {
        method_type: payload.method_type.map(unmap_type),
        material_id: payload.material.and_then(|owner| owner.id),
    }
}

/// Reject a body without `type`, before anything reaches the store.
fn require_type(state: &ServerState, payload: &MaterialMethod) -> Result<(), ServerError> {
    if payload.method_type.is_none() {
        return Err(state.bad_request("Type is required", ENTITY_NAME, "typerequired"));
    }
    Ok(())
}

/// Body id must be set, match the path and name an existing method.
async fn check_id(state: &ServerState, id: i64, payload: &MaterialMethod) -> Result<(), ServerError> {
    let Some(body_id) = payload.id else {
        return Err(state.bad_request("Invalid id", ENTITY_NAME, "idnull"));
    };
    if body_id != id {
        return Err(state.bad_request("Invalid ID", ENTITY_NAME, "idinvalid"));
    }
    if !state.engine.method_exists(id).await? {
        return Err(state.bad_request("Entity not found", ENTITY_NAME, "idnotfound"));
    }
    Ok(())
}

fn persisted_id(method: &engine::MaterialMethod) -> Result<i64, ServerError> {
    method
        .id
        .ok_or_else(|| ServerError::Internal("material method without id".to_string()))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<MaterialMethod>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<MaterialMethod>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(?payload, "REST request to save MaterialMethod");
    require_type(&state, &payload)?;
    if payload.id.is_some() {
        return Err(state.bad_request(
            "A new materialMethod cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let method = state.engine.save_method(method_data(payload)).await?;
    let id = persisted_id(&method)?;

    let mut headers = headers::created(&state.app_name, ENTITY_NAME, id);
    headers::location(&mut headers, &format!("/api/material-methods/{id}"));
    Ok((StatusCode::CREATED, headers, Json(map_method(method))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<MaterialMethod>, JsonRejection>,
) -> Result<(HeaderMap, Json<MaterialMethod>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(id, ?payload, "REST request to update MaterialMethod");
    require_type(&state, &payload)?;
    check_id(&state, id, &payload).await?;

    let method = state.engine.update_method(id, method_data(payload)).await?;
    Ok((
        headers::updated(&state.app_name, ENTITY_NAME, id),
        Json(map_method(method)),
    ))
}

pub async fn partial_update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<MaterialMethod>, JsonRejection>,
) -> Result<(HeaderMap, Json<MaterialMethod>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(id, ?payload, "REST request to partial update MaterialMethod");
    check_id(&state, id, &payload).await?;

    let method = state
        .engine
        .partial_update_method(id, method_data(payload))
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok((
        headers::updated(&state.app_name, ENTITY_NAME, id),
        Json(map_method(method)),
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<(HeaderMap, Json<Vec<MaterialMethod>>), ServerError> {
    tracing::debug!("REST request to get a page of MaterialMethods");
    let request = pagination::page_request(
        &state,
        ENTITY_NAME,
        engine::MaterialMethod::SORTABLE,
        &params,
    )?;
    let page = state.engine.find_all_methods(&request).await?.map(map_method);

    Ok((pagination::headers(&uri, &page), Json(page.content)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<MaterialMethod>, ServerError> {
    tracing::debug!(id, "REST request to get MaterialMethod");
    state
        .engine
        .find_method(id)
        .await?
        .map(|method| Json(map_method(method)))
        .ok_or(ServerError::NotFound)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, HeaderMap), ServerError> {
    tracing::debug!(id, "REST request to delete MaterialMethod");
    state.engine.delete_method(id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        headers::deleted(&state.app_name, ENTITY_NAME, id),
    ))
}
