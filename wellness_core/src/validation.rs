//! Input checks applied before any state is touched.
//!
//! Every function returns `Error::Validation` with a user-facing message.

use crate::{Error, Height, Result, MAX_HEIGHT_FEET, MAX_HEIGHT_INCHES, MINIMUM_AGE};

/// Trim and lower-case a username, rejecting anything unsafe as a file name
pub fn normalize_username(raw: &str) -> Result<String> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() {
        return Err(Error::Validation(
            "Please enter both a username and password.".into(),
        ));
    }
    if username.starts_with('.')
        || !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(Error::Validation(format!(
            "Username '{}' may only contain letters, digits, '_', '-' and '.'",
            username
        )));
    }
    Ok(username)
}

pub fn require_password(raw: &str) -> Result<&str> {
    if raw.trim().is_empty() {
        return Err(Error::Validation(
            "Please enter both a username and password.".into(),
        ));
    }
    Ok(raw)
}

pub fn check_age(age: u32) -> Result<()> {
    if age < MINIMUM_AGE {
        return Err(Error::Validation(format!(
            "This app is for users aged {} and older.",
            MINIMUM_AGE
        )));
    }
    Ok(())
}

pub fn check_height(height: Height) -> Result<()> {
    if height.feet > MAX_HEIGHT_FEET || height.inches > MAX_HEIGHT_INCHES {
        return Err(Error::Validation(format!(
            "Height must be at most {} ft {} in.",
            MAX_HEIGHT_FEET, MAX_HEIGHT_INCHES
        )));
    }
    if height.total_inches() == 0 {
        return Err(Error::Validation("Height must be greater than zero.".into()));
    }
    Ok(())
}

/// Weights must be finite and positive
pub fn check_weight(label: &str, weight_lbs: f64) -> Result<()> {
    if !weight_lbs.is_finite() || weight_lbs <= 0.0 {
        return Err(Error::Validation(format!(
            "{} must be a positive number of pounds.",
            label
        )));
    }
    Ok(())
}

/// Returns the trimmed meal name
pub fn check_meal_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Please enter a meal name first.".into()));
    }
    Ok(name.to_string())
}

pub fn check_calories(calories: u32) -> Result<()> {
    if calories == 0 {
        return Err(Error::Validation("Calories must be greater than zero.".into()));
    }
    Ok(())
}

/// Returns the trimmed activity type
pub fn check_activity(activity_type: &str, duration_minutes: u32) -> Result<String> {
    let activity_type = activity_type.trim();
    if activity_type.is_empty() {
        return Err(Error::Validation("Please choose an activity.".into()));
    }
    if duration_minutes == 0 {
        return Err(Error::Validation("Duration must be greater than zero.".into()));
    }
    Ok(activity_type.to_string())
}

pub fn check_chat_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Validation("Message must not be empty.".into()));
    }
    Ok(())
}
