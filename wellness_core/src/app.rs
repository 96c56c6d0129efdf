//! The state-store controller for the logged-in user.
//!
//! [`WellnessApp`] exclusively owns the active user's [`AppState`]. Callers
//! read it through accessors and change it only through intent methods.
//! Each accepted intent builds the next state from a copy, persists it, and
//! only then swaps it in, so a rejected or failed intent leaves both memory
//! and disk untouched.

use crate::coach::{self, CompletionService, MealEstimate};
use crate::{
    auth, metrics, validation, ActivityLogEntry, AppState, ChatMessage, Error, FoodGroup,
    FoodLogEntry, Height, Result, UserStore, WeightSample,
};
use chrono::Utc;
use uuid::Uuid;

/// Default sampling temperature for coaching replies
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.6;

/// Answers collected by the onboarding questionnaire
#[derive(Clone, Debug)]
pub struct OnboardingForm {
    pub age: u32,
    pub height: Height,
    pub current_weight_lbs: f64,
    pub target_weight_lbs: f64,
    /// `None` or zero means "suggest one from maintenance"
    pub calorie_goal: Option<u32>,
}

/// A meal to log
#[derive(Clone, Debug, Default)]
pub struct FoodInput {
    pub meal_name: String,
    pub details: Option<String>,
    pub calories: u32,
    pub groups: Vec<FoodGroup>,
}

/// An activity to log
#[derive(Clone, Debug, Default)]
pub struct ActivityInput {
    pub activity_type: String,
    pub duration_minutes: u32,
    pub calories_burned: Option<u32>,
}

/// Controller for one logged-in user
pub struct WellnessApp {
    store: UserStore,
    state: AppState,
    chat_temperature: f32,
}

impl WellnessApp {
    /// Log in, creating the account on first use
    ///
    /// An existing account whose stored password does not match is rejected
    /// without touching storage or the active-user pointer.
    pub fn login(store: UserStore, username: &str, password: &str) -> Result<Self> {
        let username = validation::normalize_username(username)?;
        let password = validation::require_password(password)?;

        let state = match store.load(&username)? {
            Some(mut existing) => {
                match existing.profile.password_hash.as_deref() {
                    Some(hash) => {
                        if !auth::verify_password(password, hash) {
                            tracing::warn!("Password mismatch for {}", username);
                            return Err(Error::Auth(
                                "Incorrect password for this username. Please try again.".into(),
                            ));
                        }
                    }
                    None => {
                        tracing::info!("Account {} had no password; adopting this one", username);
                        existing.profile.password_hash = Some(auth::hash_password(password)?);
                    }
                }
                existing
            }
            None => {
                tracing::info!("Creating new account {}", username);
                AppState::for_new_user(&username, Some(auth::hash_password(password)?))
            }
        };

        store.save(&state)?;
        store.set_active_user(&username)?;

        Ok(Self {
            store,
            state,
            chat_temperature: DEFAULT_CHAT_TEMPERATURE,
        })
    }

    /// Reopen the session recorded by the active-user pointer
    pub fn resume(store: UserStore) -> Result<Option<Self>> {
        let Some(username) = store.active_user()? else {
            return Ok(None);
        };

        match store.load(&username)? {
            Some(state) => Ok(Some(Self {
                store,
                state,
                chat_temperature: DEFAULT_CHAT_TEMPERATURE,
            })),
            None => {
                tracing::warn!("Active user {} has no document; clearing pointer", username);
                store.clear_active_user()?;
                Ok(None)
            }
        }
    }

    /// Like [`resume`](Self::resume) but an absent session is an error
    pub fn require(store: UserStore) -> Result<Self> {
        Self::resume(store)?.ok_or(Error::NotLoggedIn)
    }

    /// End the session. The user's document stays on disk.
    pub fn logout(self) -> Result<()> {
        self.store.clear_active_user()?;
        tracing::info!("Logged out {}", self.state.profile.username);
        Ok(())
    }

    pub fn with_chat_temperature(mut self, temperature: f32) -> Self {
        self.chat_temperature = temperature;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn username(&self) -> &str {
        &self.state.profile.username
    }

    pub fn needs_onboarding(&self) -> bool {
        !self.state.profile.onboarded
    }

    /// Submit the questionnaire. May be repeated to update the profile.
    ///
    /// Weight history is seeded with the current weight only if empty.
    pub fn complete_onboarding(&mut self, form: OnboardingForm) -> Result<&AppState> {
        validation::check_age(form.age)?;
        validation::check_height(form.height)?;
        validation::check_weight("Current weight", form.current_weight_lbs)?;
        validation::check_weight("Target weight", form.target_weight_lbs)?;

        let calorie_goal = match form.calorie_goal {
            Some(goal) if goal > 0 => goal,
            _ => metrics::suggested_calorie_goal(metrics::maintenance_calories(
                form.current_weight_lbs,
                form.height,
            )),
        };

        self.transition(|state| {
            let profile = &mut state.profile;
            profile.age = form.age;
            profile.height_feet = form.height.feet;
            profile.height_inches = form.height.inches;
            profile.current_weight_lbs = form.current_weight_lbs;
            profile.target_weight_lbs = form.target_weight_lbs;
            profile.calorie_goal = calorie_goal;
            profile.onboarded = true;

            if state.weight_history.is_empty() {
                state.weight_history.push(WeightSample {
                    timestamp: Utc::now(),
                    weight: form.current_weight_lbs,
                });
            }
        })?;

        tracing::info!(
            "Onboarding complete for {} (goal {} kcal)",
            self.username(),
            calorie_goal
        );
        Ok(&self.state)
    }

    /// Prepend a meal to the food log
    pub fn log_food(&mut self, input: FoodInput) -> Result<&FoodLogEntry> {
        self.ensure_onboarded()?;
        let meal_name = validation::check_meal_name(&input.meal_name)?;
        validation::check_calories(input.calories)?;

        let meal_name = match input.details.as_deref().map(str::trim) {
            Some(details) if !details.is_empty() => format!("{} ({})", meal_name, details),
            _ => meal_name,
        };

        let entry = FoodLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            meal_name,
            calories: input.calories,
            groups: input.groups,
        };

        self.transition(|state| state.food_logs.insert(0, entry))?;
        tracing::info!("Logged food for {}", self.username());
        Ok(&self.state.food_logs[0])
    }

    /// Prepend an activity to the activity log
    pub fn log_activity(&mut self, input: ActivityInput) -> Result<&ActivityLogEntry> {
        self.ensure_onboarded()?;
        let activity_type =
            validation::check_activity(&input.activity_type, input.duration_minutes)?;

        let entry = ActivityLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            activity_type,
            duration_minutes: input.duration_minutes,
            calories_burned: input.calories_burned,
        };

        self.transition(|state| state.activity_logs.insert(0, entry))?;
        tracing::info!("Logged activity for {}", self.username());
        Ok(&self.state.activity_logs[0])
    }

    /// Record a new current weight
    pub fn log_weight(&mut self, weight_lbs: f64) -> Result<&WeightSample> {
        self.ensure_onboarded()?;
        validation::check_weight("Weight", weight_lbs)?;

        self.transition(|state| {
            state.profile.current_weight_lbs = weight_lbs;
            state.weight_history.insert(
                0,
                WeightSample {
                    timestamp: Utc::now(),
                    weight: weight_lbs,
                },
            );
        })?;
        tracing::info!("Logged weight {} for {}", weight_lbs, self.username());
        Ok(&self.state.weight_history[0])
    }

    /// Send a message to the coach and record the reply
    ///
    /// The user's turn is persisted before the service is called. A service
    /// failure is not an error here: a fallback reply is recorded instead.
    pub fn send_chat(
        &mut self,
        text: &str,
        service: &dyn CompletionService,
    ) -> Result<&ChatMessage> {
        self.ensure_onboarded()?;
        validation::check_chat_text(text)?;

        let user_turn = ChatMessage::user(text.trim());
        self.transition(|state| state.chat_history.push(user_turn))?;

        let request = coach::chat_request(
            &self.state.profile,
            &self.state.chat_history,
            self.chat_temperature,
        );
        let reply = match service.complete(&request) {
            Ok(reply) if reply.trim().is_empty() => coach::EMPTY_REPLY_FALLBACK.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Chat error: {}", e);
                coach::CONNECTION_FALLBACK.to_string()
            }
        };

        self.transition(|state| state.chat_history.push(ChatMessage::model(reply)))?;
        let last = self.state.chat_history.len() - 1;
        Ok(&self.state.chat_history[last])
    }

    /// Empty the coaching transcript
    pub fn clear_chat(&mut self) -> Result<()> {
        self.transition(|state| state.chat_history.clear())
    }

    /// Ask the coach for a calorie estimate. Does not change state.
    pub fn estimate_meal(
        &self,
        meal_name: &str,
        details: Option<&str>,
        service: &dyn CompletionService,
    ) -> Result<MealEstimate> {
        let meal_name = validation::check_meal_name(meal_name)?;
        let request = coach::meal_estimate_request(&meal_name, details);
        let reply = service.complete(&request).map_err(|e| {
            tracing::error!("AI estimation failed: {}", e);
            e
        })?;
        coach::parse_meal_estimate(&reply)
    }

    fn ensure_onboarded(&self) -> Result<()> {
        if self.needs_onboarding() {
            return Err(Error::NotOnboarded);
        }
        Ok(())
    }

    /// Apply `f` to a copy, persist it, then make it current
    fn transition<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppState),
    {
        let mut next = self.state.clone();
        f(&mut next);
        self.store.save(&next)?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::{CompletionRequest, ResponseFormat, UnavailableService};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Replies with a fixed string and remembers what it was asked
    struct ScriptedService {
        reply: String,
        seen: RefCell<Vec<CompletionRequest>>,
    }

    impl ScriptedService {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionService for ScriptedService {
        fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn setup() -> (TempDir, UserStore) {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(temp_dir.path());
        (temp_dir, store)
    }

    fn teen_form() -> OnboardingForm {
        OnboardingForm {
            age: 15,
            height: Height::new(5, 4),
            current_weight_lbs: 100.0,
            target_weight_lbs: 115.0,
            calorie_goal: Some(2200),
        }
    }

    fn onboarded_app(store: &UserStore) -> WellnessApp {
        let mut app = WellnessApp::login(store.clone(), "Alex", "secret").unwrap();
        app.complete_onboarding(teen_form()).unwrap();
        app
    }

    #[test]
    fn test_first_login_creates_account() {
        let (_dir, store) = setup();
        let app = WellnessApp::login(store.clone(), "  Alex ", "secret").unwrap();

        assert_eq!(app.username(), "alex");
        assert!(app.needs_onboarding());
        assert_eq!(store.active_user().unwrap(), Some("alex".into()));

        let saved = store.load("alex").unwrap().unwrap();
        let hash = saved.profile.password_hash.unwrap();
        assert!(auth::verify_password("secret", &hash));
    }

    #[test]
    fn test_wrong_password_rejected_without_side_effects() {
        let (_dir, store) = setup();
        let app = WellnessApp::login(store.clone(), "alex", "secret").unwrap();
        app.logout().unwrap();
        let before = std::fs::read_to_string(store.user_path("alex")).unwrap();

        let result = WellnessApp::login(store.clone(), "alex", "wrong");

        assert!(matches!(result, Err(Error::Auth(_))));
        assert_eq!(store.active_user().unwrap(), None);
        assert_eq!(std::fs::read_to_string(store.user_path("alex")).unwrap(), before);
    }

    #[test]
    fn test_relogin_restores_logs() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        app.log_food(FoodInput {
            meal_name: "Toast".into(),
            calories: 250,
            ..FoodInput::default()
        })
        .unwrap();
        app.logout().unwrap();

        let app = WellnessApp::login(store, "ALEX", "secret").unwrap();
        assert_eq!(app.state().food_logs.len(), 1);
        assert!(app.state().profile.onboarded);
    }

    #[test]
    fn test_account_without_password_adopts_one() {
        let (_dir, store) = setup();
        store.save(&AppState::for_new_user("legacy", None)).unwrap();

        WellnessApp::login(store.clone(), "legacy", "pw").unwrap();
        assert!(store.load("legacy").unwrap().unwrap().profile.password_hash.is_some());
        assert!(matches!(
            WellnessApp::login(store, "legacy", "other"),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_resume_and_require() {
        let (_dir, store) = setup();
        assert!(WellnessApp::resume(store.clone()).unwrap().is_none());
        assert!(matches!(
            WellnessApp::require(store.clone()),
            Err(Error::NotLoggedIn)
        ));

        WellnessApp::login(store.clone(), "sam", "pw").unwrap();
        let app = WellnessApp::require(store).unwrap();
        assert_eq!(app.username(), "sam");
    }

    #[test]
    fn test_onboarding_under_12_rejected() {
        let (_dir, store) = setup();
        let mut app = WellnessApp::login(store.clone(), "kid", "pw").unwrap();
        let before = app.state().clone();

        let result = app.complete_onboarding(OnboardingForm {
            age: 11,
            ..teen_form()
        });

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(app.state(), &before);
        assert_eq!(store.load("kid").unwrap().unwrap(), before);
    }

    #[test]
    fn test_onboarding_seeds_weight_history_once() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        assert_eq!(app.state().weight_history.len(), 1);
        assert_eq!(app.state().weight_history[0].weight, 100.0);

        app.complete_onboarding(OnboardingForm {
            current_weight_lbs: 104.0,
            ..teen_form()
        })
        .unwrap();
        assert_eq!(app.state().weight_history.len(), 1);
        assert_eq!(app.state().weight_history[0].weight, 100.0);
    }

    #[test]
    fn test_onboarding_suggests_goal_when_missing() {
        let (_dir, store) = setup();
        let mut app = WellnessApp::login(store, "alex", "pw").unwrap();
        app.complete_onboarding(OnboardingForm {
            calorie_goal: Some(0),
            ..teen_form()
        })
        .unwrap();
        assert_eq!(app.state().profile.calorie_goal, 1820);
    }

    #[test]
    fn test_logging_requires_onboarding() {
        let (_dir, store) = setup();
        let mut app = WellnessApp::login(store, "alex", "pw").unwrap();
        assert!(matches!(app.log_weight(100.0), Err(Error::NotOnboarded)));
    }

    #[test]
    fn test_food_entries_prepended_with_details() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        app.log_food(FoodInput {
            meal_name: "Pasta".into(),
            calories: 600,
            ..FoodInput::default()
        })
        .unwrap();
        let entry = app
            .log_food(FoodInput {
                meal_name: "Smoothie".into(),
                details: Some("banana, oat milk".into()),
                calories: 210,
                groups: vec![FoodGroup::FruitsVeg],
            })
            .unwrap();
        assert_eq!(entry.meal_name, "Smoothie (banana, oat milk)");

        let logs = &app.state().food_logs;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].calories, 210);
        assert_eq!(logs[1].meal_name, "Pasta");
    }

    #[test]
    fn test_invalid_food_leaves_state_unchanged() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        let result = app.log_food(FoodInput {
            meal_name: "Air".into(),
            calories: 0,
            ..FoodInput::default()
        });
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(app.state().food_logs.is_empty());
    }

    #[test]
    fn test_activity_logged() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        app.log_activity(ActivityInput {
            activity_type: "Soccer".into(),
            duration_minutes: 45,
            calories_burned: None,
        })
        .unwrap();
        assert_eq!(app.state().activity_logs[0].activity_type, "Soccer");
        assert!(app
            .log_activity(ActivityInput {
                activity_type: "Soccer".into(),
                duration_minutes: 0,
                calories_burned: None,
            })
            .is_err());
    }

    #[test]
    fn test_weight_updates_profile_and_history() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        app.log_weight(102.5).unwrap();

        let state = app.state();
        assert_eq!(state.profile.current_weight_lbs, 102.5);
        assert_eq!(state.weight_history.len(), 2);
        assert_eq!(state.weight_history[0].weight, 102.5);
        assert_eq!(metrics::starting_weight(&state.weight_history, 102.5), 100.0);
    }

    #[test]
    fn test_chat_records_both_turns() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        let service = ScriptedService::new("- Eat more snacks");

        let reply = app.send_chat("How long?", &service).unwrap();
        assert_eq!(reply.text, "- Eat more snacks");

        let seen = service.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].turns, vec![ChatMessage::user("How long?")]);
        assert!(seen[0].system_instruction.as_ref().unwrap().contains("alex"));

        let saved = store.load("alex").unwrap().unwrap();
        assert_eq!(saved.chat_history.len(), 2);
    }

    #[test]
    fn test_chat_failure_appends_fallback() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        let reply = app
            .send_chat("hello", &UnavailableService::new("offline"))
            .unwrap();
        assert_eq!(reply.text, coach::CONNECTION_FALLBACK);

        let history = &app.state().chat_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ChatMessage::user("hello"));
        assert_eq!(history[1], ChatMessage::model(coach::CONNECTION_FALLBACK));
    }

    #[test]
    fn test_chat_empty_reply_fallback() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        let reply = app.send_chat("hello", &ScriptedService::new("  ")).unwrap();
        assert_eq!(reply.text, coach::EMPTY_REPLY_FALLBACK);
    }

    #[test]
    fn test_blank_chat_rejected() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        assert!(app.send_chat("   ", &ScriptedService::new("x")).is_err());
        assert!(app.state().chat_history.is_empty());
    }

    #[test]
    fn test_clear_chat() {
        let (_dir, store) = setup();
        let mut app = onboarded_app(&store);
        app.send_chat("hi", &ScriptedService::new("yo")).unwrap();
        app.clear_chat().unwrap();
        assert!(store.load("alex").unwrap().unwrap().chat_history.is_empty());
    }

    #[test]
    fn test_estimate_meal() {
        let (_dir, store) = setup();
        let app = onboarded_app(&store);
        let service =
            ScriptedService::new(r#"{"calories": 450, "explanation": "Two slices with butter."}"#);

        let estimate = app.estimate_meal("Toast", Some("two slices"), &service).unwrap();
        assert_eq!(estimate.calories, 450);
        assert_eq!(service.seen.borrow()[0].format, ResponseFormat::MealEstimateJson);
        assert!(app.state().food_logs.is_empty());

        assert!(app
            .estimate_meal("Toast", None, &UnavailableService::new("offline"))
            .is_err());
        assert!(app.estimate_meal(" ", None, &service).is_err());
    }
}
