#![forbid(unsafe_code)]

//! Core domain model and business logic for the wellness tracker.
//!
//! This crate provides:
//! - Domain types (profile, food/activity/weight logs, chat transcript)
//! - The metrics engine (BMI, healthy range, gain projections)
//! - The per-user state controller and its persistence
//! - The AI coaching collaborator interface and a Gemini client
//! - Dashboard/progress summaries and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod validation;
pub mod auth;
pub mod store;
pub mod coach;
pub mod gemini;
pub mod app;
pub mod summary;
pub mod trends;
pub mod resources;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::UserStore;
pub use coach::{CompletionService, MealEstimate, UnavailableService};
pub use gemini::GeminiClient;
pub use app::{ActivityInput, FoodInput, OnboardingForm, WellnessApp};
pub use summary::DashboardSummary;
pub use trends::ProgressTrends;
pub use resources::HEALTH_RESOURCES;
