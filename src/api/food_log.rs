use axum::{extract::State, http::StatusCode, Json};
use chrono::{SubsecRound, Utc};
use serde_json::{json, Value};
use tracing::info;

use super::{extract::JsonBody, extract::OwnerEmail, ApiError, AppState};
use crate::food::analysis::{weekly_totals, DayTotals};
use crate::models::{FoodLog, NewFoodLog};

pub async fn create_food_log(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewFoodLog>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    // Stored with millisecond precision.
    let entry = body
        .into_entry(Utc::now().trunc_subsecs(3))
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    state
        .db
        .insert_food_log(&entry)
        .await
        .map_err(ApiError::internal("Failed to save food log"))?;

    info!("Logged {} for {}", entry.dish_name, entry.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Food log saved successfully", "id": entry.id })),
    ))
}

pub async fn list_food_logs(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Vec<FoodLog>>, ApiError> {
    let logs = state
        .db
        .food_logs_for(&email)
        .await
        .map_err(ApiError::internal("Failed to fetch food logs"))?;

    Ok(Json(logs))
}

pub async fn weekly_calories(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<[DayTotals; 7]>, ApiError> {
    let logs = state
        .db
        .food_logs_for(&email)
        .await
        .map_err(ApiError::internal("Failed to aggregate weekly nutrition"))?;

    Ok(Json(weekly_totals(&logs)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{app, get, post_json, send};

    async fn without_food_logs() -> axum::Router {
        let (app, db) = app().await;
        db.conn
            .call(|conn| {
                conn.execute_batch("DROP TABLE food_logs;")?;
                Ok(())
            })
            .await
            .unwrap();
        app
    }

    #[tokio::test]
    async fn weekly_aggregation_failure_is_a_server_error() {
        let app = without_food_logs().await;

        let (status, body) = send(&app, get("/api/weeklycalo?email=a@b.com")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to aggregate weekly nutrition" }));
    }

    #[tokio::test]
    async fn insert_failure_is_a_server_error() {
        let app = without_food_logs().await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/foodlog",
                json!({
                    "email": "a@b.com",
                    "dishName": "Salad",
                    "calories": 200,
                    "protein": 5,
                    "carbs": 20,
                    "fat": 3,
                    "ingredients": "lettuce",
                    "servingSize": "1 bowl",
                    "healthiness": "high"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to save food log" }));
    }

    #[tokio::test]
    async fn missing_email_is_rejected_before_storage() {
        let app = without_food_logs().await;

        let (status, _) = send(&app, get("/api/weeklycalo")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
