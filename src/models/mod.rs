pub mod document;
pub mod email;
pub mod food_log;
pub mod id;
pub mod number;

pub use document::Document;
pub use email::{Email, MissingEmail};
pub use food_log::{FoodLog, FoodLogRejected, NewFoodLog};
pub use id::{DocumentId, InvalidDocumentId};
