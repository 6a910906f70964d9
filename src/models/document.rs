use serde::Serialize;
use serde_json::{Map, Value};

use super::{DocumentId, Email, MissingEmail};

/// Schemaless record (profile, allergen, meal plan) keyed by its owner's email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub email: Email,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Split a request body into the owner key and the free-form fields.
    /// A caller-supplied `_id` is discarded; storage assigns identifiers.
    pub fn from_body(mut body: Map<String, Value>) -> Result<Self, MissingEmail> {
        body.remove("_id");
        let email = match body.remove("email") {
            Some(Value::String(raw)) => Email::parse(&raw)?,
            _ => return Err(MissingEmail),
        };

        Ok(Self {
            id: None,
            email,
            fields: body,
        })
    }

    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }
}
