pub mod api;
pub mod config;
pub mod database;
pub mod food;
pub mod models;

// Re-export commonly used items
pub use api::{create_api, AppState};
pub use config::Config;
pub use database::Database;
