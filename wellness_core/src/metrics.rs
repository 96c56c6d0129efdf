//! Closed-form body metrics and weight-gain projections.
//!
//! Everything here is pure: no I/O, no clock reads, deterministic for the
//! same inputs. Callers pass in the instant they care about.
//!
//! The maintenance estimate is a deliberately simple heuristic
//! (`weight × 12 + inches × 5`), not a clinical equation.

use crate::{FoodLogEntry, Height, WeightSample};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

/// Pound/inch scaling factor for BMI
pub const BMI_IMPERIAL_FACTOR: f64 = 703.0;

/// Kilocalories treated as one pound of gained weight
pub const KCAL_PER_POUND: f64 = 3500.0;

/// Surplus added to maintenance when onboarding leaves the goal empty
pub const SUGGESTED_SURPLUS_KCAL: i64 = 300;

/// Smallest goal distance used by [`progress_percent`]
const MIN_GOAL_DISTANCE_LBS: f64 = 0.1;

/// Under this age the narrower teen BMI band is used
const ADULT_AGE: u32 = 18;

/// Longest DST jump searched past a skipped midnight
const MAX_DST_GAP_MINUTES: i64 = 180;

/// Healthy weight bounds in pounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

/// Qualitative label for a projected weekly gain rate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GainPace {
    VerySlow,
    Moderate,
    Fast,
}

impl GainPace {
    pub fn from_rate(lbs_per_week: f64) -> Self {
        if lbs_per_week < 0.5 {
            GainPace::VerySlow
        } else if lbs_per_week < 1.5 {
            GainPace::Moderate
        } else {
            GainPace::Fast
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GainPace::VerySlow => "Very Slow",
            GainPace::Moderate => "Moderate",
            GainPace::Fast => "Fast",
        }
    }
}

/// Body-mass index. Zero height yields 0 instead of dividing by zero.
pub fn bmi(weight_lbs: f64, height: Height) -> f64 {
    let inches = f64::from(height.total_inches());
    if inches == 0.0 {
        return 0.0;
    }
    BMI_IMPERIAL_FACTOR * weight_lbs / (inches * inches)
}

/// Weight bounds for a healthy BMI at this height, to one decimal
///
/// Under 18 the band is 17.5–24.0, otherwise 18.5–25.0.
pub fn healthy_weight_range(height: Height, age: u32) -> WeightRange {
    let inches = f64::from(height.total_inches());
    if inches == 0.0 {
        return WeightRange { min: 0.0, max: 0.0 };
    }

    let (min_bmi, max_bmi) = if age < ADULT_AGE {
        (17.5, 24.0)
    } else {
        (18.5, 25.0)
    };

    let to_weight = |bmi: f64| round_one_decimal(bmi * inches * inches / BMI_IMPERIAL_FACTOR);

    WeightRange {
        min: to_weight(min_bmi),
        max: to_weight(max_bmi),
    }
}

/// Estimated daily calories to hold the current weight
pub fn maintenance_calories(weight_lbs: f64, height: Height) -> i64 {
    let inches = f64::from(height.total_inches());
    (weight_lbs * 12.0 + inches * 5.0).round() as i64
}

/// Calorie goal minus maintenance; negative means a deficit
pub fn daily_surplus(calorie_goal: u32, maintenance: i64) -> i64 {
    i64::from(calorie_goal) - maintenance
}

/// Projected pounds gained per week. Never negative.
pub fn weekly_gain_rate(surplus: i64) -> f64 {
    (surplus as f64 * 7.0 / KCAL_PER_POUND).max(0.0)
}

/// Whole weeks until the target weight is reached
///
/// Returns `Some(0)` once the target is reached, and `None` when there is
/// weight left to gain but no projected gain.
pub fn weeks_to_goal(current_lbs: f64, target_lbs: f64, lbs_per_week: f64) -> Option<u32> {
    let to_gain = (target_lbs - current_lbs).max(0.0);
    if to_gain == 0.0 {
        return Some(0);
    }
    if lbs_per_week > 0.0 {
        Some((to_gain / lbs_per_week).ceil() as u32)
    } else {
        None
    }
}

/// Share of the start-to-target distance covered, clamped to 0–100
pub fn progress_percent(start_lbs: f64, current_lbs: f64, target_lbs: f64) -> f64 {
    let distance = (target_lbs - start_lbs).max(MIN_GOAL_DISTANCE_LBS);
    (100.0 * (current_lbs - start_lbs) / distance).clamp(0.0, 100.0)
}

/// Baseline for progress: the oldest weight sample, else the current weight
///
/// `history` is newest first.
pub fn starting_weight(history: &[WeightSample], current_lbs: f64) -> f64 {
    history.last().map(|s| s.weight).unwrap_or(current_lbs)
}

/// Calories from entries logged at or after `day_start`
pub fn daily_calorie_total(food_logs: &[FoodLogEntry], day_start: DateTime<Utc>) -> u64 {
    food_logs
        .iter()
        .filter(|entry| entry.timestamp >= day_start)
        .map(|entry| u64::from(entry.calories))
        .sum()
}

/// Share of the calorie goal consumed, capped at 100
pub fn calorie_goal_percent(consumed: u64, calorie_goal: u32) -> f64 {
    if calorie_goal == 0 {
        return 0.0;
    }
    (consumed as f64 / f64::from(calorie_goal) * 100.0).min(100.0)
}

/// Goal offered when onboarding is submitted without one
pub fn suggested_calorie_goal(maintenance: i64) -> u32 {
    (maintenance + SUGGESTED_SURPLUS_KCAL).clamp(0, i64::from(u32::MAX)) as u32
}

/// First instant of the calendar day containing `at`, in `at`'s zone
///
/// Usually local midnight. When a DST jump skips midnight the day starts
/// at the first local minute that exists.
pub fn day_start<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = at.date_naive().and_time(NaiveTime::MIN);
    (0..=MAX_DST_GAP_MINUTES)
        .map(|minute| midnight + Duration::minutes(minute))
        .find_map(|local| at.timezone().from_local_datetime(&local).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| at.with_timezone(&Utc))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn food(calories: u32, timestamp: DateTime<Utc>) -> FoodLogEntry {
        FoodLogEntry {
            id: Uuid::new_v4(),
            timestamp,
            meal_name: "Meal".into(),
            calories,
            groups: vec![],
        }
    }

    #[test]
    fn test_bmi_formula() {
        let height = Height::new(5, 4);
        let expected = 703.0 * 100.0 / (64.0 * 64.0);
        assert!((bmi(100.0, height) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bmi_zero_height_is_zero() {
        assert_eq!(bmi(150.0, Height::new(0, 0)), 0.0);
    }

    #[test]
    fn test_healthy_range_uses_teen_band_under_18() {
        let height = Height::new(5, 4);
        let teen = healthy_weight_range(height, 15);
        assert_eq!(teen.min, 102.0); // 17.5 * 4096 / 703 = 101.96
        assert_eq!(teen.max, 139.8); // 24.0 * 4096 / 703 = 139.83

        let adult = healthy_weight_range(height, 18);
        assert_eq!(adult.min, 107.8);
        assert_eq!(adult.max, 145.7);
        assert!(teen.min < teen.max);
    }

    #[test]
    fn test_healthy_range_zero_height() {
        let range = healthy_weight_range(Height::new(0, 0), 30);
        assert_eq!(range, WeightRange { min: 0.0, max: 0.0 });
    }

    #[test]
    fn test_teen_profile_projection() {
        let height = Height::new(5, 4);
        let maintenance = maintenance_calories(100.0, height);
        assert_eq!(maintenance, 1520);

        let surplus = daily_surplus(2200, maintenance);
        assert_eq!(surplus, 680);

        let rate = weekly_gain_rate(surplus);
        assert!((rate - 1.36).abs() < 1e-9);

        // 15 lbs at 1.36 lbs/week is 11.03 weeks, rounded up
        assert_eq!(weeks_to_goal(100.0, 115.0, rate), Some(12));
        assert_eq!(GainPace::from_rate(rate), GainPace::Moderate);
    }

    #[test]
    fn test_weekly_rate_never_negative() {
        assert_eq!(weekly_gain_rate(-500), 0.0);
        assert_eq!(weekly_gain_rate(0), 0.0);
        assert!((weekly_gain_rate(500) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weeks_to_goal_without_surplus() {
        assert_eq!(weeks_to_goal(100.0, 110.0, 0.0), None);
    }

    #[test]
    fn test_weeks_to_goal_when_target_reached() {
        assert_eq!(weeks_to_goal(120.0, 115.0, 1.0), Some(0));
        assert_eq!(weeks_to_goal(115.0, 115.0, 0.0), Some(0));
    }

    #[test]
    fn test_progress_percent_is_clamped() {
        assert_eq!(progress_percent(100.0, 107.5, 115.0), 50.0);
        assert_eq!(progress_percent(100.0, 130.0, 115.0), 100.0);
        assert_eq!(progress_percent(100.0, 95.0, 115.0), 0.0);
        // Target equal to start does not divide by zero
        assert!((progress_percent(100.0, 100.05, 100.0) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_starting_weight_prefers_oldest_sample() {
        let now = Utc::now();
        let history = vec![
            WeightSample { timestamp: now, weight: 104.0 },
            WeightSample { timestamp: now - Duration::days(7), weight: 100.0 },
        ];
        assert_eq!(starting_weight(&history, 104.0), 100.0);
        assert_eq!(starting_weight(&[], 98.0), 98.0);
    }

    #[test]
    fn test_daily_total_excludes_yesterday() {
        let today = Utc::now();
        let start = day_start(&today);
        let logs = vec![
            food(300, start + Duration::hours(8)),
            food(450, start + Duration::hours(12)),
            food(900, start - Duration::hours(2)),
        ];
        assert_eq!(daily_calorie_total(&logs, start), 750);
    }

    #[test]
    fn test_day_start_in_fixed_offset() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap();
        let start = day_start(&at);
        // 2024-03-10 00:00 +09:00 is 2024-03-09 15:00 UTC
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap());
    }

    /// UTC-4 until 2024-09-08 04:00 UTC, then UTC-3: local midnight that day never happens
    #[derive(Clone, Copy, Debug)]
    struct SkippedMidnight;

    impl SkippedMidnight {
        fn switch_utc() -> NaiveDateTime {
            Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap().naive_utc()
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for SkippedMidnight {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SkippedMidnight
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::switch_utc() - Duration::hours(4);
            let gap_end = gap_start + Duration::hours(1);
            if *local < gap_start {
                LocalResult::Single(Self::before())
            } else if *local < gap_end {
                LocalResult::None
            } else {
                LocalResult::Single(Self::after())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch_utc() {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    #[test]
    fn test_day_start_when_midnight_is_skipped() {
        let at = SkippedMidnight.from_utc_datetime(
            &Utc.with_ymd_and_hms(2024, 9, 8, 15, 0, 0).unwrap().naive_utc(),
        );
        let start = day_start(&at);
        // The day begins at 01:00 local (UTC-3), i.e. 04:00 UTC
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap());

        let logs = vec![
            food(300, start + Duration::hours(2)),
            // 23:30 local on the previous day
            food(900, start - Duration::minutes(30)),
        ];
        assert_eq!(daily_calorie_total(&logs, start), 300);
    }

    #[test]
    fn test_day_start_on_normal_day_in_same_zone() {
        let at = SkippedMidnight.from_utc_datetime(
            &Utc.with_ymd_and_hms(2024, 9, 10, 15, 0, 0).unwrap().naive_utc(),
        );
        assert_eq!(day_start(&at), Utc.with_ymd_and_hms(2024, 9, 10, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_calorie_goal_percent() {
        assert_eq!(calorie_goal_percent(1000, 2000), 50.0);
        assert_eq!(calorie_goal_percent(3000, 2000), 100.0);
        assert_eq!(calorie_goal_percent(100, 0), 0.0);
    }

    #[test]
    fn test_suggested_goal_adds_surplus() {
        assert_eq!(suggested_calorie_goal(1520), 1820);
    }

    #[test]
    fn test_gain_pace_labels() {
        assert_eq!(GainPace::from_rate(0.0).label(), "Very Slow");
        assert_eq!(GainPace::from_rate(1.0).label(), "Moderate");
        assert_eq!(GainPace::from_rate(2.0).label(), "Fast");
    }
}
