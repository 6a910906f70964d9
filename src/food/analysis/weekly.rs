//! Weekly nutrition pattern.
//!
//! Every food log entry a user has ever recorded is bucketed by the weekday
//! of its timestamp in UTC. Entries from different calendar weeks that fall
//! on the same weekday share a bucket, so the result describes a typical
//! week rather than the current one. The output always has seven records,
//! Sunday first, with zeros for weekdays that have no entries.

use chrono::Datelike;
use serde::Serialize;

use crate::models::number::serialize_whole;
use crate::models::FoodLog;

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Summed nutrients for one weekday. `day_of_week` runs Sunday = 1 to
/// Saturday = 7.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayBucket {
    pub day_of_week: u32,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTotals {
    pub day: &'static str,
    #[serde(serialize_with = "serialize_whole")]
    pub calories: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub protein: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub carbs: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub fat: f64,
}

/// Group entries by UTC weekday and sum their nutrients. Only weekdays with
/// at least one entry produce a bucket. Protein, carbs and fat are rounded
/// half away from zero; calories are left as summed.
pub fn bucket_by_weekday(entries: &[FoodLog]) -> Vec<WeekdayBucket> {
    let mut sums: [Option<WeekdayBucket>; 7] = [None; 7];

    for entry in entries {
        let day_of_week = entry.timestamp.weekday().number_from_sunday();
        let bucket = sums[(day_of_week - 1) as usize].get_or_insert(WeekdayBucket {
            day_of_week,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        });

        bucket.calories += entry.calories;
        bucket.protein += entry.protein;
        bucket.carbs += entry.carbs;
        bucket.fat += entry.fat;
    }

    sums.into_iter()
        .flatten()
        .map(|bucket| WeekdayBucket {
            protein: bucket.protein.round(),
            carbs: bucket.carbs.round(),
            fat: bucket.fat.round(),
            ..bucket
        })
        .collect()
}

/// Expand sparse buckets into the fixed Sunday-first week.
pub fn fill_week(buckets: &[WeekdayBucket]) -> [DayTotals; 7] {
    let mut week = DAY_NAMES.map(|day| DayTotals {
        day,
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    });

    for (index, totals) in week.iter_mut().enumerate() {
        if let Some(bucket) = buckets.iter().find(|b| b.day_of_week as usize == index + 1) {
            totals.calories = bucket.calories;
            totals.protein = bucket.protein;
            totals.carbs = bucket.carbs;
            totals.fat = bucket.fat;
        }
    }

    week
}

pub fn weekly_totals(entries: &[FoodLog]) -> [DayTotals; 7] {
    fill_week(&bucket_by_weekday(entries))
}
