use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;

use super::{extract::JsonBody, extract::OwnerEmail, ApiError, AppState};
use crate::database::Collection;
use crate::models::Document;

pub async fn list_meal_plans(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Vec<Document>>, ApiError> {
    let plans = state
        .db
        .documents_for(Collection::MealPlans, &email)
        .await
        .map_err(ApiError::internal("Failed to fetch meal plans"))?;

    Ok(Json(plans))
}

pub async fn create_meal_plan(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let plan = Document::from_body(body)?;
    let plan = state
        .db
        .insert_document(Collection::MealPlans, plan)
        .await
        .map_err(ApiError::rejected("Failed to save meal plan"))?;

    info!("Saved meal plan for {}", plan.email);
    Ok((StatusCode::CREATED, Json(plan)))
}
