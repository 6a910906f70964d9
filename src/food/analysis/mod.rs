pub mod weekly;

pub use weekly::{weekly_totals, DayTotals, WeekdayBucket};
