//! Progress trends over the last week.
//!
//! Days are calendar days in the caller's time zone. Series come back
//! oldest first, ready to print or chart.

use crate::{AppState, FoodLogEntry, WeightSample};
use chrono::{DateTime, Days, NaiveDate, TimeZone};

/// Number of days (and weight samples) shown in trends
pub const TREND_DAYS: u64 = 7;

/// Calories eaten on one calendar day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyCalories {
    pub date: NaiveDate,
    pub calories: u64,
}

/// The progress view's data
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressTrends {
    /// Always [`TREND_DAYS`] entries ending today
    pub daily_calories: Vec<DailyCalories>,
    /// Up to [`TREND_DAYS`] most recent samples
    pub recent_weights: Vec<WeightSample>,
    pub calorie_goal: u32,
    pub target_weight_lbs: f64,
}

impl ProgressTrends {
    pub fn compute<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Self {
        Self {
            daily_calories: daily_calories(&state.food_logs, now),
            recent_weights: recent_weights(&state.weight_history),
            calorie_goal: state.profile.calorie_goal,
            target_weight_lbs: state.profile.target_weight_lbs,
        }
    }
}

/// Calorie totals for the last seven days including today
pub fn daily_calories<Tz: TimeZone>(
    food_logs: &[FoodLogEntry],
    now: &DateTime<Tz>,
) -> Vec<DailyCalories> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..TREND_DAYS)
        .rev()
        .filter_map(|days_ago| today.checked_sub_days(Days::new(days_ago)))
        .map(|date| {
            let calories = food_logs
                .iter()
                .filter(|entry| entry.timestamp.with_timezone(&tz).date_naive() == date)
                .map(|entry| u64::from(entry.calories))
                .sum();
            DailyCalories { date, calories }
        })
        .collect()
}

/// The latest samples, oldest first. `history` is newest first.
pub fn recent_weights(history: &[WeightSample]) -> Vec<WeightSample> {
    history
        .iter()
        .take(TREND_DAYS as usize)
        .rev()
        .cloned()
        .collect()
}
