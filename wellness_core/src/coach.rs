//! AI coaching collaborator.
//!
//! The coach is any text-completion service behind [`CompletionService`].
//! This module only builds prompts and interprets the declared response
//! shapes; transport lives in implementations such as
//! [`crate::gemini::GeminiClient`].

use crate::{metrics, ChatMessage, Error, Result, UserProfile};
use serde::Deserialize;

/// Appended when the service answers with an empty reply
pub const EMPTY_REPLY_FALLBACK: &str = "I'm having trouble thinking. Try again?";

/// Appended when the service call fails
pub const CONNECTION_FALLBACK: &str = "Connection error. Let's try that again.";

/// Suggested opening questions for an empty transcript
pub const QUICK_PROMPTS: &[&str] = &[
    "How long will it take to reach my goal?",
    "Give me 3 light meal ideas to help me hit my goal.",
];

/// Shape the caller expects back from the service
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free text
    Text,
    /// A JSON object `{"calories": int, "explanation": string}`
    MealEstimateJson,
}

/// One request to the completion service
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub format: ResponseFormat,
}

/// A hosted text/JSON-completion capability
pub trait CompletionService {
    /// Send the request and return the raw reply text
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Stand-in used when no service is configured; every call fails
#[derive(Clone, Debug)]
pub struct UnavailableService {
    reason: String,
}

impl UnavailableService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CompletionService for UnavailableService {
    fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Err(Error::Completion(self.reason.clone()))
    }
}

/// Calorie estimate for a described meal
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MealEstimate {
    pub calories: u32,
    pub explanation: String,
}

/// System instruction for the coaching chat, embedding the profile's numbers
pub fn coach_instruction(profile: &UserProfile) -> String {
    let height = profile.height();
    let maintenance = metrics::maintenance_calories(profile.current_weight_lbs, height);
    let surplus = metrics::daily_surplus(profile.calorie_goal, maintenance);
    let rate = metrics::weekly_gain_rate(surplus);
    let to_gain = (profile.target_weight_lbs - profile.current_weight_lbs).max(0.0);
    let timeline = match metrics::weeks_to_goal(
        profile.current_weight_lbs,
        profile.target_weight_lbs,
        rate,
    ) {
        Some(weeks) => format!("~{} weeks", weeks),
        None => "not reachable without a calorie surplus".to_string(),
    };

    format!(
        "Role: ultra-concise wellness coach for {username} ({age} years old).\n\
         \n\
         Goal: support healthy growth and weight gain with direct, bulleted advice.\n\
         \n\
         Style rules:\n\
         - No conversational filler.\n\
         - Bullet points for every suggestion, at most 3-4 per reply.\n\
         - Get straight to the point.\n\
         \n\
         Projection for this user:\n\
         - Maintenance estimate: ({weight} lbs x 12) + ({inches} in x 5) = ~{maintenance} kcal.\n\
         - Daily calorie goal: {goal} kcal, surplus {surplus} kcal.\n\
         - Rule of thumb: a 500 kcal daily surplus is about 1 lb gained per week.\n\
         - Projected gain: {rate:.1} lbs/week; {to_gain} lbs to gain; timeline {timeline}.\n\
         \n\
         Light meal ideas for low appetite: smoothies with banana and nut butter, \
         avocado toast, Greek yogurt with honey and walnuts, energy balls, \
         chocolate protein milk.\n\
         \n\
         Always remind them that fueling their brain and growth is the priority.",
        username = profile.username,
        age = profile.age,
        weight = profile.current_weight_lbs,
        inches = height.total_inches(),
        maintenance = maintenance,
        goal = profile.calorie_goal,
        surplus = surplus,
        rate = rate,
        to_gain = to_gain,
        timeline = timeline,
    )
}

/// Request for the next coaching reply given the whole transcript
pub fn chat_request(
    profile: &UserProfile,
    transcript: &[ChatMessage],
    temperature: f32,
) -> CompletionRequest {
    CompletionRequest {
        system_instruction: Some(coach_instruction(profile)),
        turns: transcript.to_vec(),
        temperature: Some(temperature),
        format: ResponseFormat::Text,
    }
}

/// Request for a structured calorie estimate of one meal
pub fn meal_estimate_request(meal_name: &str, details: Option<&str>) -> CompletionRequest {
    let details = details
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Standard portion");
    let prompt = format!(
        "Estimate calories for: \"{}\".\n\
         Details (portion/cooking): \"{}\".\n\
         Provide a single integer estimate and a 1-sentence explanation.",
        meal_name, details
    );

    CompletionRequest {
        system_instruction: None,
        turns: vec![ChatMessage::user(prompt)],
        temperature: None,
        format: ResponseFormat::MealEstimateJson,
    }
}

/// Parse the service's JSON reply into a [`MealEstimate`]
///
/// Tolerates a Markdown code fence around the object. Zero calories is
/// treated as no estimate.
pub fn parse_meal_estimate(reply: &str) -> Result<MealEstimate> {
    let body = strip_code_fence(reply);
    let estimate: MealEstimate = serde_json::from_str(body)
        .map_err(|e| Error::Completion(format!("Unreadable meal estimate: {}", e)))?;
    if estimate.calories == 0 {
        return Err(Error::Completion("Meal estimate had no calories".into()));
    }
    Ok(estimate)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
