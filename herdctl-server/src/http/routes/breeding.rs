//! Breeding record endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get, put},
    Json, Router,
};
use herdctl_core::{BirthRegistration, BirthStatus, BreedingRecord, Deleted, NewBreedingRecord};

use crate::db::repos::BreedingRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordId};
use crate::http::server::AppState;

/// GET /api/breeding - list all breeding records
async fn list_breeding(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BreedingRecord>>, ApiError> {
    let records = BreedingRepo::new(state.driver()).list().await?;
    Ok(Json(records))
}

/// POST /api/breeding - record a breeding
async fn create_breeding(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewBreedingRecord>,
) -> Result<Json<BreedingRecord>, ApiError> {
    let record = BreedingRepo::new(state.driver()).create(req).await?;
    Ok(Json(record))
}

/// PUT /api/breeding/{id}/birth - register or clear a birth
///
/// Responds with `null` when no record has that id.
async fn register_birth(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    JsonBody(req): JsonBody<BirthRegistration>,
) -> Result<Json<Option<BreedingRecord>>, ApiError> {
    let Some(id) = id else {
        return Ok(Json(None));
    };
    let record = BreedingRepo::new(state.driver())
        .register_birth(id, BirthStatus::from(req))
        .await?;
    Ok(Json(record))
}

/// DELETE /api/breeding/{id} - remove a breeding record
async fn delete_breeding(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Deleted>, ApiError> {
    let Some(id) = id else {
        return Ok(Json(Deleted { deleted: 0 }));
    };
    let deleted = BreedingRepo::new(state.driver()).delete_by_id(id).await?;
    Ok(Json(deleted))
}

/// Breeding routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/breeding", get(list_breeding).post(create_breeding))
        .route("/api/breeding/{id}", delete(delete_breeding))
        .route("/api/breeding/{id}/birth", put(register_birth))
}
