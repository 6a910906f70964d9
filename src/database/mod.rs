pub mod database;
pub mod documents;
pub mod food_logs;

pub use database::Database;
pub use database::DatabaseError;
pub use documents::Collection;
