//! Animal endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use herdctl_core::{Animal, Deleted, NewAnimal};

use crate::db::repos::AnimalRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordId};
use crate::http::server::AppState;

/// GET /api/animals - list all animals
async fn list_animals(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Animal>>, ApiError> {
    let animals = AnimalRepo::new(state.driver()).list().await?;
    Ok(Json(animals))
}

/// POST /api/animals - register an animal
async fn create_animal(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewAnimal>,
) -> Result<Json<Animal>, ApiError> {
    let animal = AnimalRepo::new(state.driver()).create(req).await?;
    Ok(Json(animal))
}

/// DELETE /api/animals/{id} - remove an animal
async fn delete_animal(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Deleted>, ApiError> {
    let Some(id) = id else {
        return Ok(Json(Deleted { deleted: 0 }));
    };
    let deleted = AnimalRepo::new(state.driver()).delete_by_id(id).await?;
    Ok(Json(deleted))
}

/// Animal routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/animals", get(list_animals).post(create_animal))
        .route("/api/animals/{id}", delete(delete_animal))
}
