use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub mod allergens;
pub mod error;
pub mod extract;
pub mod food_log;
pub mod meal_planner;
pub mod profile;
pub mod upload;

pub use error::ApiError;

use crate::database::Database;
use crate::food::api::ImageHost;

// Phone photos routinely exceed axum's 2 MB default.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Everything a handler needs. Built only from an opened, indexed database,
/// so a router can never serve requests against an unready store.
#[derive(Clone)]
pub struct AppState {
    pub(crate) db: Database,
    pub(crate) images: Arc<dyn ImageHost>,
}

impl AppState {
    pub fn new(db: Database, images: Arc<dyn ImageHost>) -> Self {
        Self { db, images }
    }
}

/// Create and configure the API router
pub fn create_api(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/allergens",
            get(allergens::list_allergens).post(allergens::create_allergen),
        )
        .route("/api/allergens/:id", delete(allergens::delete_allergen))
        .route(
            "/api/mealPlanner",
            get(meal_planner::list_meal_plans).post(meal_planner::create_meal_plan),
        )
        .route(
            "/api/profile",
            get(profile::get_profile).post(profile::save_profile),
        )
        .route("/api/hasdetails", get(profile::has_details))
        .route(
            "/api/foodlog",
            get(food_log::list_food_logs).post(food_log::create_food_log),
        )
        .route("/api/weeklycalo", get(food_log::weekly_calories))
        .route("/api/scanfood", post(upload::scan_food))
        .route("/api/uploadImage", post(upload::upload_image))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
