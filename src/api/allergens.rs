use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Map, Value};
use tracing::info;

use super::{extract::JsonBody, extract::OwnerEmail, ApiError, AppState};
use crate::database::Collection;
use crate::models::{Document, DocumentId};

pub async fn list_allergens(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Vec<Document>>, ApiError> {
    let allergens = state
        .db
        .documents_for(Collection::Allergens, &email)
        .await
        .map_err(ApiError::internal("Failed to fetch allergens"))?;

    Ok(Json(allergens))
}

pub async fn create_allergen(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let allergen = Document::from_body(body)?;
    let allergen = state
        .db
        .insert_document(Collection::Allergens, allergen)
        .await
        .map_err(ApiError::rejected("Failed to save allergen"))?;

    info!("Saved allergen for {}", allergen.email);
    Ok((StatusCode::CREATED, Json(allergen)))
}

pub async fn delete_allergen(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: DocumentId = id.parse()?;

    let deleted = state
        .db
        .delete_document(Collection::Allergens, id)
        .await
        .map_err(ApiError::internal("Failed to delete allergen"))?;

    if !deleted {
        return Err(ApiError::NotFound("Allergen not found".to_string()));
    }

    info!("Deleted allergen {}", id);
    Ok(Json(json!({ "message": "Allergen deleted successfully" })))
}
