use chrono::DateTime;
use rusqlite::params;
use tracing::debug;

use super::{Database, DatabaseError};
use crate::models::{DocumentId, Email, FoodLog};

struct FoodLogRow {
    id: String,
    email: String,
    dish_name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    ingredients: String,
    serving_size: String,
    healthiness: String,
    timestamp: i64,
}

impl FoodLogRow {
    fn decode(self) -> Result<FoodLog, DatabaseError> {
        let corrupt = |reason: String| DatabaseError::Corrupt {
            id: self.id.clone(),
            reason,
        };

        Ok(FoodLog {
            id: self.id.parse::<DocumentId>().map_err(|e| corrupt(format!("{}", e)))?,
            email: Email::parse(&self.email).map_err(|e| corrupt(e.to_string()))?,
            timestamp: DateTime::from_timestamp_millis(self.timestamp)
                .ok_or_else(|| corrupt(format!("timestamp {} out of range", self.timestamp)))?,
            dish_name: self.dish_name,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            ingredients: self.ingredients,
            serving_size: self.serving_size,
            healthiness: self.healthiness,
        })
    }
}

impl Database {
    pub async fn insert_food_log(&self, entry: &FoodLog) -> Result<(), DatabaseError> {
        let id = entry.id.to_string();
        let email = entry.email.to_string();
        let dish_name = entry.dish_name.clone();
        let (calories, protein, carbs, fat) = (entry.calories, entry.protein, entry.carbs, entry.fat);
        let ingredients = entry.ingredients.clone();
        let serving_size = entry.serving_size.clone();
        let healthiness = entry.healthiness.clone();
        let timestamp = entry.timestamp.timestamp_millis();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO food_logs (
                        id, email, dish_name, calories, protein, carbs, fat,
                        ingredients, serving_size, healthiness, timestamp
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        id,
                        email,
                        dish_name,
                        calories,
                        protein,
                        carbs,
                        fat,
                        ingredients,
                        serving_size,
                        healthiness,
                        timestamp
                    ],
                )?;
                Ok(())
            })
            .await?;

        debug!("Inserted food log {}", entry.id);
        Ok(())
    }

    /// Every entry owned by `email`, newest first.
    pub async fn food_logs_for(&self, email: &Email) -> Result<Vec<FoodLog>, DatabaseError> {
        let email = email.to_string();

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, email, dish_name, calories, protein, carbs, fat,
                            ingredients, serving_size, healthiness, timestamp
                     FROM food_logs
                     WHERE email = ?1
                     ORDER BY timestamp DESC, rowid DESC",
                )?;

                let rows = stmt.query_map([&email], |row| {
                    Ok(FoodLogRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        dish_name: row.get(2)?,
                        calories: row.get(3)?,
                        protein: row.get(4)?,
                        carbs: row.get(5)?,
                        fat: row.get(6)?,
                        ingredients: row.get(7)?,
                        serving_size: row.get(8)?,
                        healthiness: row.get(9)?,
                        timestamp: row.get(10)?,
                    })
                })?;

                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row?);
                }

                Ok(entries)
            })
            .await?;

        rows.into_iter().map(FoodLogRow::decode).collect()
    }
}
