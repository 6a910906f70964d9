use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{extract::JsonBody, extract::OwnerEmail, ApiError, AppState};
use crate::database::DatabaseError;
use crate::models::Document;

pub async fn get_profile(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Document>, ApiError> {
    state
        .db
        .find_profile(&email)
        .await
        .map_err(ApiError::internal("Failed to fetch profile"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
}

/// Insert or fully replace the caller's profile.
pub async fn save_profile(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let profile = Document::from_body(body)?;
    let email = profile.email.clone();

    let profile = state.db.upsert_profile(profile).await.map_err(|e| match e {
        DatabaseError::DuplicateKey(detail) => {
            warn!("Profile upsert for {} lost a race: {}", email, detail);
            ApiError::Conflict("A profile with this email already exists".to_string())
        }
        other => ApiError::internal("Failed to save profile")(other),
    })?;

    info!("Saved profile for {}", profile.email);
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn has_details(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Value>, ApiError> {
    let exists = state
        .db
        .profile_exists(&email)
        .await
        .map_err(ApiError::internal("Failed to check profile"))?;

    Ok(Json(json!({ "exists": exists })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{app, post_json, send};

    #[tokio::test]
    async fn duplicate_key_on_save_is_a_conflict() {
        let (app, db) = app().await;
        // A second unique key the upsert does not resolve.
        db.conn
            .call(|conn| {
                conn.execute_batch("CREATE UNIQUE INDEX profiles_body_unique ON profiles (body);")?;
                Ok(())
            })
            .await
            .unwrap();

        let (status, _) = send(
            &app,
            post_json("/api/profile", json!({ "email": "a@b.com", "name": "Ann" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            post_json("/api/profile", json!({ "email": "c@d.com", "name": "Ann" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({ "error": "A profile with this email already exists" })
        );
    }

    #[tokio::test]
    async fn other_storage_failures_on_save_are_server_errors() {
        let (app, db) = app().await;
        db.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER profiles_frozen BEFORE INSERT ON profiles
                     BEGIN SELECT RAISE(ABORT, 'frozen'); END;",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let (status, body) = send(&app, post_json("/api/profile", json!({ "email": "a@b.com" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to save profile" }));
    }
}
