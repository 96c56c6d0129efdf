//! CSV export of a user's logs.
//!
//! Writes `food.csv`, `activity.csv` and `weight.csv` into a directory,
//! oldest entry first. Existing files are replaced.

use crate::{ActivityLogEntry, AppState, FoodLogEntry, Result, WeightSample};
use std::path::{Path, PathBuf};

#[derive(Debug, serde::Serialize)]
struct FoodRow {
    id: String,
    timestamp: String,
    meal_name: String,
    calories: u32,
    groups: String,
}

impl From<&FoodLogEntry> for FoodRow {
    fn from(entry: &FoodLogEntry) -> Self {
        FoodRow {
            id: entry.id.to_string(),
            timestamp: entry.timestamp.to_rfc3339(),
            meal_name: entry.meal_name.clone(),
            calories: entry.calories,
            groups: entry
                .groups
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct ActivityRow {
    id: String,
    timestamp: String,
    activity_type: String,
    duration_minutes: u32,
    calories_burned: Option<u32>,
}

impl From<&ActivityLogEntry> for ActivityRow {
    fn from(entry: &ActivityLogEntry) -> Self {
        ActivityRow {
            id: entry.id.to_string(),
            timestamp: entry.timestamp.to_rfc3339(),
            activity_type: entry.activity_type.clone(),
            duration_minutes: entry.duration_minutes,
            calories_burned: entry.calories_burned,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct WeightRow {
    timestamp: String,
    weight_lbs: f64,
}

impl From<&WeightSample> for WeightRow {
    fn from(sample: &WeightSample) -> Self {
        WeightRow {
            timestamp: sample.timestamp.to_rfc3339(),
            weight_lbs: sample.weight,
        }
    }
}

/// Files written by [`export_logs`]
#[derive(Debug)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

/// Export all logs of `state` into `dir`
pub fn export_logs(state: &AppState, dir: &Path) -> Result<ExportSummary> {
    std::fs::create_dir_all(dir)?;

    let food_path = dir.join("food.csv");
    let activity_path = dir.join("activity.csv");
    let weight_path = dir.join("weight.csv");

    let mut rows = 0;
    rows += write_rows(&food_path, state.food_logs.iter().rev().map(FoodRow::from))?;
    rows += write_rows(
        &activity_path,
        state.activity_logs.iter().rev().map(ActivityRow::from),
    )?;
    rows += write_rows(
        &weight_path,
        state.weight_history.iter().rev().map(WeightRow::from),
    )?;

    tracing::info!("Exported {} rows for {} to {:?}", rows, state.profile.username, dir);
    Ok(ExportSummary {
        files: vec![food_path, activity_path, weight_path],
        rows,
    })
}

fn write_rows<R, I>(path: &Path, rows: I) -> Result<usize>
where
    R: serde::Serialize,
    I: Iterator<Item = R>,
{
    let mut writer = csv::Writer::from_path(path)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FoodGroup;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn test_export_writes_oldest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let now = Utc::now();

        let mut state = AppState::for_new_user("alex", None);
        state.food_logs = vec![
            FoodLogEntry {
                id: Uuid::new_v4(),
                timestamp: now,
                meal_name: "Dinner, big".into(),
                calories: 800,
                groups: vec![FoodGroup::Proteins, FoodGroup::Carbs],
            },
            FoodLogEntry {
                id: Uuid::new_v4(),
                timestamp: now - Duration::hours(5),
                meal_name: "Lunch".into(),
                calories: 500,
                groups: vec![],
            },
        ];
        state.weight_history = vec![WeightSample {
            timestamp: now,
            weight: 101.0,
        }];

        let summary = export_logs(&state, temp_dir.path()).unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.files.len(), 3);

        let mut reader = csv::Reader::from_path(temp_dir.path().join("food.csv")).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][2], "Lunch");
        assert_eq!(&records[1][2], "Dinner, big");
        assert_eq!(&records[1][4], "Proteins;Carbs");
    }

    #[test]
    fn test_export_empty_logs_writes_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state = AppState::for_new_user("alex", None);
        let summary = export_logs(&state, &temp_dir.path().join("out")).unwrap();
        assert_eq!(summary.rows, 0);
        assert!(summary.files.iter().all(|f| f.exists()));
    }
}
