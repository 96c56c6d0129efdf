//! Dashboard numbers for one user at one moment.

use crate::metrics::{self, GainPace, WeightRange};
use crate::AppState;
use chrono::{DateTime, TimeZone};

/// Everything the dashboard shows, derived from an [`AppState`]
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSummary {
    pub bmi: f64,
    pub healthy_range: WeightRange,
    /// Goal actually used for the numbers below (profile goal or fallback)
    pub calorie_goal: u32,
    pub maintenance: i64,
    pub surplus: i64,
    pub lbs_per_week: f64,
    pub pace: GainPace,
    pub lbs_to_gain: f64,
    /// `None` means a surplus is needed before the goal is reachable
    pub weeks_to_goal: Option<u32>,
    pub starting_weight: f64,
    pub goal_progress_percent: f64,
    pub consumed_today: u64,
    /// Negative once the goal is exceeded
    pub remaining_today: i64,
    pub calorie_progress_percent: f64,
    pub activity_minutes_today: u64,
}

impl DashboardSummary {
    /// Compute the summary as of `now`; "today" is `now`'s calendar day
    ///
    /// `default_calorie_goal` stands in for a profile goal of zero.
    pub fn compute<Tz: TimeZone>(
        state: &AppState,
        now: &DateTime<Tz>,
        default_calorie_goal: u32,
    ) -> Self {
        let profile = &state.profile;
        let height = profile.height();
        let weight = profile.current_weight_lbs;

        let calorie_goal = if profile.calorie_goal == 0 {
            default_calorie_goal
        } else {
            profile.calorie_goal
        };

        let maintenance = metrics::maintenance_calories(weight, height);
        let surplus = metrics::daily_surplus(calorie_goal, maintenance);
        let lbs_per_week = metrics::weekly_gain_rate(surplus);
        let starting_weight = metrics::starting_weight(&state.weight_history, weight);

        let today = metrics::day_start(now);
        let consumed_today = metrics::daily_calorie_total(&state.food_logs, today);
        let activity_minutes_today = state
            .activity_logs
            .iter()
            .filter(|entry| entry.timestamp >= today)
            .map(|entry| u64::from(entry.duration_minutes))
            .sum();

        Self {
            bmi: metrics::bmi(weight, height),
            healthy_range: metrics::healthy_weight_range(height, profile.age),
            calorie_goal,
            maintenance,
            surplus,
            lbs_per_week,
            pace: GainPace::from_rate(lbs_per_week),
            lbs_to_gain: (profile.target_weight_lbs - weight).max(0.0),
            weeks_to_goal: metrics::weeks_to_goal(weight, profile.target_weight_lbs, lbs_per_week),
            starting_weight,
            goal_progress_percent: metrics::progress_percent(
                starting_weight,
                weight,
                profile.target_weight_lbs,
            ),
            consumed_today,
            remaining_today: i64::from(calorie_goal) - consumed_today as i64,
            calorie_progress_percent: metrics::calorie_goal_percent(consumed_today, calorie_goal),
            activity_minutes_today,
        }
    }
}
