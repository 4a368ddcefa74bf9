//! `/api/materials` endpoints.

use api_types::{material::Material, material_method::MaterialMethodRef};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, Uri},
};

use crate::{ServerError, headers, material_methods::map_type, pagination, server::ServerState};

const ENTITY_NAME: &str = "material";

fn map_material(material: engine::Material) -> Material {
    let methods = material
        .methods()
        .iter()
        .map(|method| MaterialMethodRef {
            id: method.id,
            method_type: Some(map_type(method.method_type)),
        })
        .collect();

    Material {
        id: material.id(),
        name: material.name().map(str::to_string),
        description: material.description().map(str::to_string),
        methods: Some(methods),
    }
}

fn material_data(state: &ServerState, payload: Material) -> Result<engine::MaterialData, ServerError> {
    let method_ids = match payload.methods {
        Some(methods) => Some(
            methods
                .into_iter()
                .map(|method| method.id)
                .collect::<Option<Vec<i64>>>()
                .ok_or_else(|| {
                    state.bad_request(
                        "Methods must be saved before they are attached",
                        ENTITY_NAME,
                        "methodidnull",
                    )
                })?,
        ),
        None => None,
    };

    Ok(engine::MaterialData {
        name: payload.name,
        description: payload.description,
        method_ids,
    })
}

async fn check_id(state: &ServerState, id: i64, payload: &Material) -> Result<(), ServerError> {
    let Some(body_id) = payload.id else {
        return Err(state.bad_request("Invalid id", ENTITY_NAME, "idnull"));
    };
    if body_id != id {
        return Err(state.bad_request("Invalid ID", ENTITY_NAME, "idinvalid"));
    }
    if !state.engine.material_exists(id).await? {
        return Err(state.bad_request("Entity not found", ENTITY_NAME, "idnotfound"));
    }
    Ok(())
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<Material>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Material>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(?payload, "REST request to save Material");
    if payload.id.is_some() {
        return Err(state.bad_request(
            "A new material cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let data = material_data(&state, payload)?;
    let material = state.engine.save_material(data).await?;
    let id = material
        .id()
        .ok_or_else(|| ServerError::Internal("material without id".to_string()))?;

    let mut headers = headers::created(&state.app_name, ENTITY_NAME, id);
    headers::location(&mut headers, &format!("/api/materials/{id}"));
    Ok((StatusCode::CREATED, headers, Json(map_material(material))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<Material>, JsonRejection>,
) -> Result<(HeaderMap, Json<Material>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(id, ?payload, "REST request to update Material");
    check_id(&state, id, &payload).await?;

    let data = material_data(&state, payload)?;
    let material = state.engine.update_material(id, data).await?;
    Ok((
        headers::updated(&state.app_name, ENTITY_NAME, id),
        Json(map_material(material)),
    ))
}

pub async fn partial_update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<Material>, JsonRejection>,
) -> Result<(HeaderMap, Json<Material>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(id, ?payload, "REST request to partial update Material");
    check_id(&state, id, &payload).await?;

    let data = material_data(&state, payload)?;
    let material = state
        .engine
        .partial_update_material(id, data)
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok((
        headers::updated(&state.app_name, ENTITY_NAME, id),
        Json(map_material(material)),
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<(HeaderMap, Json<Vec<Material>>), ServerError> {
    tracing::debug!("REST request to get a page of Materials");
    let request = pagination::page_request(
        &state,
        ENTITY_NAME,
        engine::Material::SORTABLE,
        &params,
    )?;
    let page = state
        .engine
        .find_all_materials(&request)
        .await?
        .map(map_material);

    Ok((pagination::headers(&uri, &page), Json(page.content)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Material>, ServerError> {
    tracing::debug!(id, "REST request to get Material");
    state
        .engine
        .find_material(id)
        .await?
        .map(|material| Json(map_material(material)))
        .ok_or(ServerError::NotFound)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, HeaderMap), ServerError> {
    tracing::debug!(id, "REST request to delete Material");
    state.engine.delete_material(id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        headers::deleted(&state.app_name, ENTITY_NAME, id),
    ))
}
