use crate::api::errors::{invalid_id, invalid_json, storage_error};
use crate::api::method_not_allowed;
use crate::state::AppState;
use crate::storage::{TrickFields, TrickRecord};
use axum::extract::{Path as AxumPath, State};
use axum::response::Response;
use axum::routing::{get, put};
use axum::{Json, Router};
use bytes::Bytes;
use serde::de::Error as _;
use serde_json::Value;
use std::sync::Arc;

const POSITIONAL_FIELD_COUNT: usize = 5;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // get 路由默认同时响应 HEAD，这里显式拒绝。
        .route(
            "/tricks",
            get(tricks_list)
                .head(method_not_allowed)
                .post(tricks_create),
        )
        .route("/tricks/{id}", put(tricks_update))
}

async fn tricks_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrickRecord>>, Response> {
    let tricks = state.tricks.list().await.map_err(storage_error)?;
    Ok(Json(tricks))
}

async fn tricks_create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TrickRecord>, Response> {
    let fields = decode_create_payload(&body).map_err(invalid_json)?;
    let created = state.tricks.create(fields).await.map_err(storage_error)?;
    Ok(Json(created))
}

async fn tricks_update(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
    body: Bytes,
) -> Result<Json<TrickRecord>, Response> {
    let id = raw_id.parse::<i64>().map_err(|_| invalid_id(&raw_id))?;
    let fields = decode_update_payload(&body).map_err(invalid_json)?;
    let updated = state.tricks.update(id, fields).await.map_err(storage_error)?;
    Ok(Json(updated))
}

/// Accepts a keyed trick object, or the legacy positional array
/// `[name, translatedName, description, difficulty, progress]`.
/// A `null` field decodes as an empty string.
pub(crate) fn decode_create_payload(body: &[u8]) -> Result<TrickFields, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Object(_) => serde_json::from_value(value),
        Value::Array(items) => {
            if items.len() != POSITIONAL_FIELD_COUNT {
                return Err(serde_json::Error::custom(format!(
                    "expected {POSITIONAL_FIELD_COUNT} trick fields, got {}",
                    items.len()
                )));
            }
            let [name, translated_name, description, difficulty, progress] =
                serde_json::from_value::<[Option<String>; POSITIONAL_FIELD_COUNT]>(
                    Value::Array(items),
                )?;
            Ok(TrickFields {
                name: name.unwrap_or_default(),
                translated_name: translated_name.unwrap_or_default(),
                description: description.unwrap_or_default(),
                difficulty: difficulty.unwrap_or_default(),
                progress: progress.unwrap_or_default(),
            })
        }
        _ => Err(serde_json::Error::custom(
            "expected a trick object or an array of trick fields",
        )),
    }
}

/// Updates take the keyed object only; an `id` in the body is ignored.
pub(crate) fn decode_update_payload(body: &[u8]) -> Result<TrickFields, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(serde_json::Error::custom("expected a trick object"));
    }
    serde_json::from_value(value)
}
