use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::number::serialize_whole;
use super::{DocumentId, Email};

/// Body of `POST /api/foodlog`. Every field is optional at the serde layer so
/// that a missing field is reported as a validation failure rather than a
/// parse failure.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFoodLog {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub dish_name: Option<String>,
    #[validate(required)]
    pub calories: Option<f64>,
    #[validate(required)]
    pub protein: Option<f64>,
    #[validate(required)]
    pub carbs: Option<f64>,
    #[validate(required)]
    pub fat: Option<f64>,
    #[validate(required, length(min = 1))]
    pub ingredients: Option<String>,
    #[validate(required, length(min = 1))]
    pub serving_size: Option<String>,
    #[validate(required, length(min = 1))]
    pub healthiness: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing or empty fields: {}", .0.join(", "))]
pub struct FoodLogRejected(pub Vec<String>);

/// Immutable food log entry as stored and returned by `GET /api/foodlog`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodLog {
    pub id: DocumentId,
    pub email: Email,
    pub dish_name: String,
    #[serde(serialize_with = "serialize_whole")]
    pub calories: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub protein: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub carbs: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub fat: f64,
    pub ingredients: String,
    pub serving_size: String,
    pub healthiness: String,
    pub timestamp: DateTime<Utc>,
}

impl NewFoodLog {
    /// Validate presence of every field and stamp the entry. Numbers must be
    /// non-zero and strings non-empty.
    pub fn into_entry(self, timestamp: DateTime<Utc>) -> Result<FoodLog, FoodLogRejected> {
        let mut missing: Vec<String> = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .field_errors()
                .keys()
                .map(|field| camel_case(field))
                .collect(),
        };

        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if value == Some(0.0) && !missing.iter().any(|m| m == field) {
                missing.push(field.to_string());
            }
        }

        let email = self.email.as_deref().map(Email::parse).transpose().ok().flatten();
        if email.is_none() && !missing.iter().any(|m| m == "email") {
            missing.push("email".to_string());
        }

        match (
            email,
            self.dish_name,
            self.calories,
            self.protein,
            self.carbs,
            self.fat,
            self.ingredients,
            self.serving_size,
            self.healthiness,
        ) {
            (
                Some(email),
                Some(dish_name),
                Some(calories),
                Some(protein),
                Some(carbs),
                Some(fat),
                Some(ingredients),
                Some(serving_size),
                Some(healthiness),
            ) if missing.is_empty() => Ok(FoodLog {
                id: DocumentId::new(),
                email,
                dish_name,
                calories,
                protein,
                carbs,
                fat,
                ingredients,
                serving_size,
                healthiness,
                timestamp,
            }),
            _ => {
                missing.sort();
                missing.dedup();
                Err(FoodLogRejected(missing))
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn salad() -> NewFoodLog {
        serde_json::from_value(json!({
            "email": "a@b.com",
            "dishName": "Salad",
            "calories": 200,
            "protein": 5,
            "carbs": 20,
            "fat": 3,
            "ingredients": "lettuce",
            "servingSize": "1 bowl",
            "healthiness": "high"
        }))
        .unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn complete_body_becomes_entry() {
        let entry = salad().into_entry(noon()).unwrap();
        assert_eq!(entry.dish_name, "Salad");
        assert_eq!(entry.calories, 200.0);
        assert_eq!(entry.timestamp, noon());
    }

    #[test]
    fn reports_missing_and_empty_fields_by_wire_name() {
        let mut body = salad();
        body.dish_name = Some(String::new());
        body.serving_size = None;

        let err = body.into_entry(noon()).unwrap_err();
        assert_eq!(err.0, vec!["dishName".to_string(), "servingSize".to_string()]);
    }

    #[test]
    fn zero_numbers_are_rejected() {
        let mut body = salad();
        body.fat = Some(0.0);

        let err = body.into_entry(noon()).unwrap_err();
        assert_eq!(err.0, vec!["fat".to_string()]);
    }

    #[test]
    fn blank_email_is_rejected() {
        let mut body = salad();
        body.email = Some("   ".to_string());

        let err = body.into_entry(noon()).unwrap_err();
        assert_eq!(err.0, vec!["email".to_string()]);
    }

    #[test]
    fn empty_body_lists_every_field() {
        let err = NewFoodLog::default().into_entry(noon()).unwrap_err();
        assert_eq!(err.0.len(), 9);
    }

    #[test]
    fn serializes_camel_case_with_iso_timestamp() {
        let entry = salad().into_entry(noon()).unwrap();
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["dishName"], json!("Salad"));
        assert_eq!(value["servingSize"], json!("1 bowl"));
        assert_eq!(value["calories"], json!(200));
        assert_eq!(value["timestamp"], json!("2024-01-03T12:00:00Z"));
        assert_eq!(value["id"].as_str().map(str::len), Some(24));
    }
}
