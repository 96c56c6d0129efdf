//! Core domain types for the wellness tracker.
//!
//! This module defines the per-user document and everything in it:
//! - The user profile collected at onboarding
//! - Food, activity and weight logs
//! - The coaching chat transcript
//!
//! Field names serialize in camelCase and timestamps as epoch milliseconds,
//! which is the on-disk document shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Calorie goal used when a profile has none
pub const DEFAULT_CALORIE_GOAL: u32 = 2000;

/// Youngest age accepted at onboarding
pub const MINIMUM_AGE: u32 = 12;

/// Largest accepted height components
pub const MAX_HEIGHT_FEET: u32 = 8;
pub const MAX_HEIGHT_INCHES: u32 = 11;

// ============================================================================
// Profile
// ============================================================================

/// Height split into feet and inches, the way users enter it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Height {
    pub feet: u32,
    pub inches: u32,
}

impl Height {
    pub fn new(feet: u32, inches: u32) -> Self {
        Self { feet, inches }
    }

    /// Total height in inches, saturating on absurd input
    pub fn total_inches(&self) -> u32 {
        self.feet.saturating_mul(12).saturating_add(self.inches)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}\"", self.feet, self.inches)
    }
}

/// A user's profile as collected by login and onboarding
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    /// Argon2 PHC string; `None` for accounts created without a password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub height_feet: u32,
    #[serde(default)]
    pub height_inches: u32,
    #[serde(default)]
    pub current_weight_lbs: f64,
    #[serde(default)]
    pub target_weight_lbs: f64,
    #[serde(default = "default_calorie_goal")]
    pub calorie_goal: u32,
    #[serde(default)]
    pub onboarded: bool,
}

fn default_calorie_goal() -> u32 {
    DEFAULT_CALORIE_GOAL
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: String::new(),
            password_hash: None,
            age: 0,
            height_feet: 0,
            height_inches: 0,
            current_weight_lbs: 0.0,
            target_weight_lbs: 0.0,
            calorie_goal: DEFAULT_CALORIE_GOAL,
            onboarded: false,
        }
    }
}

impl UserProfile {
    /// Fresh profile for a first login
    pub fn new(username: impl Into<String>, password_hash: Option<String>) -> Self {
        Self {
            username: username.into(),
            password_hash,
            ..Self::default()
        }
    }

    pub fn height(&self) -> Height {
        Height::new(self.height_feet, self.height_inches)
    }
}

// ============================================================================
// Logs
// ============================================================================

/// Food group tags a meal can carry
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FoodGroup {
    Proteins,
    Carbs,
    Fats,
    #[serde(rename = "Fruits/Veg")]
    FruitsVeg,
}

impl fmt::Display for FoodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FoodGroup::Proteins => "Proteins",
            FoodGroup::Carbs => "Carbs",
            FoodGroup::Fats => "Fats",
            FoodGroup::FruitsVeg => "Fruits/Veg",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for FoodGroup {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "proteins" | "protein" => Ok(FoodGroup::Proteins),
            "carbs" | "carb" => Ok(FoodGroup::Carbs),
            "fats" | "fat" => Ok(FoodGroup::Fats),
            "fruits/veg" | "fruits" | "veg" | "fruitsveg" => Ok(FoodGroup::FruitsVeg),
            other => Err(crate::Error::Validation(format!(
                "Unknown food group: {}",
                other
            ))),
        }
    }
}

/// A logged meal. Never modified after creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodLogEntry {
    pub id: Uuid,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub meal_name: String,
    pub calories: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<FoodGroup>,
}

/// A logged activity
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: Uuid,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub activity_type: String,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<u32>,
}

/// One weight reading in pounds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightSample {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub weight: f64,
}

// ============================================================================
// Chat
// ============================================================================

/// Who said a chat line
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One turn of the coaching transcript
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Everything stored for one user. Persisted as a single JSON document.
///
/// All lists except the chat transcript are newest first.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub profile: UserProfile,
    #[serde(default)]
    pub food_logs: Vec<FoodLogEntry>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityLogEntry>,
    #[serde(default)]
    pub weight_history: Vec<WeightSample>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

impl AppState {
    /// Empty state for a user logging in for the first time
    pub fn for_new_user(username: impl Into<String>, password_hash: Option<String>) -> Self {
        Self {
            profile: UserProfile::new(username, password_hash),
            ..Self::default()
        }
    }
}
