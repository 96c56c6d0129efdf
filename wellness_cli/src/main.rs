use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use wellness_core::metrics::GainPace;
use wellness_core::*;

#[derive(Parser)]
#[command(name = "wellness")]
#[command(about = "Personal wellness tracker with an AI coach", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in; new accounts are created automatically
    Login {
        #[arg(long, short)]
        username: String,

        /// Prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Sign out of the active account
    Logout,

    /// Show the active account
    Whoami,

    /// List accounts stored on this device
    Users,

    /// Answer the onboarding questionnaire
    Onboard {
        #[arg(long)]
        age: u32,

        #[arg(long)]
        feet: u32,

        #[arg(long, default_value_t = 0)]
        inches: u32,

        /// Current weight in lbs
        #[arg(long)]
        weight: f64,

        /// Target weight in lbs
        #[arg(long)]
        target: f64,

        /// Daily calorie goal; suggested from maintenance when omitted
        #[arg(long)]
        calorie_goal: Option<u32>,
    },

    /// Log a meal
    Food {
        #[arg(long)]
        meal: String,

        /// Portion or cooking details
        #[arg(long)]
        details: Option<String>,

        #[arg(long)]
        calories: Option<u32>,

        /// Ask the coach for a calorie estimate
        #[arg(long)]
        estimate: bool,

        /// Food groups (proteins, carbs, fats, fruits/veg)
        #[arg(long = "group")]
        groups: Vec<String>,
    },

    /// Estimate a meal's calories without logging it
    Estimate {
        #[arg(long)]
        meal: String,

        #[arg(long)]
        details: Option<String>,
    },

    /// Log an activity
    Activity {
        /// e.g. Walking, Running, Soccer, Dance
        #[arg(long = "type")]
        activity_type: String,

        #[arg(long, default_value_t = 30)]
        minutes: u32,

        #[arg(long)]
        calories_burned: Option<u32>,
    },

    /// Log your current weight in lbs
    Weight {
        lbs: f64,
    },

    /// Show today's status and the goal projection (default)
    Dashboard,

    /// Show the last 7 days of calories and weight
    Progress,

    /// Talk to the coach
    Chat {
        message: Option<String>,

        /// Erase the transcript
        #[arg(long, conflicts_with = "message")]
        clear: bool,
    },

    /// Print the chat transcript
    History,

    /// Reputable health resources
    Resources,

    /// Export logs to CSV files
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    wellness_core::logging::init(cli.verbose);

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = UserStore::new(data_dir);

    match cli.command {
        Some(Commands::Login { username, password }) => cmd_login(store, &username, password),
        Some(Commands::Logout) => cmd_logout(store),
        Some(Commands::Whoami) => cmd_whoami(store),
        Some(Commands::Users) => cmd_users(&store),
        Some(Commands::Onboard {
            age,
            feet,
            inches,
            weight,
            target,
            calorie_goal,
        }) => cmd_onboard(
            store,
            OnboardingForm {
                age,
                height: Height::new(feet, inches),
                current_weight_lbs: weight,
                target_weight_lbs: target,
                calorie_goal,
            },
        ),
        Some(Commands::Food {
            meal,
            details,
            calories,
            estimate,
            groups,
        }) => cmd_food(store, &config, meal, details, calories, estimate, groups),
        Some(Commands::Estimate { meal, details }) => {
            cmd_estimate(store, &config, &meal, details.as_deref())
        }
        Some(Commands::Activity {
            activity_type,
            minutes,
            calories_burned,
        }) => cmd_activity(
            store,
            ActivityInput {
                activity_type,
                duration_minutes: minutes,
                calories_burned,
            },
        ),
        Some(Commands::Weight { lbs }) => cmd_weight(store, lbs),
        Some(Commands::Progress) => cmd_progress(store),
        Some(Commands::Chat { message, clear }) => cmd_chat(store, &config, message, clear),
        Some(Commands::History) => cmd_history(store),
        Some(Commands::Resources) => {
            cmd_resources();
            Ok(())
        }
        Some(Commands::Export { out }) => cmd_export(store, &out),
        Some(Commands::Dashboard) | None => cmd_dashboard(store, &config),
    }
}

fn coach_service(config: &Config) -> Box<dyn CompletionService> {
    match GeminiClient::from_env(&config.coach) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::warn!("Coach unavailable: {}", e);
            Box::new(UnavailableService::new(e.to_string()))
        }
    }
}

fn cmd_login(store: UserStore, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    let app = WellnessApp::login(store, username, &password)?;
    println!("✓ Logged in as {}", app.username());
    if app.needs_onboarding() {
        println!("  Welcome! Next: `wellness onboard` to set up your profile.");
    }
    Ok(())
}

fn cmd_logout(store: UserStore) -> Result<()> {
    match WellnessApp::resume(store)? {
        Some(app) => {
            let username = app.username().to_string();
            app.logout()?;
            println!("✓ Logged out {}", username);
        }
        None => println!("No one is logged in."),
    }
    Ok(())
}

fn cmd_whoami(store: UserStore) -> Result<()> {
    let app = WellnessApp::require(store)?;
    let profile = &app.state().profile;
    println!("{}", profile.username);
    if profile.onboarded {
        println!(
            "  Age {} · {} · {} lbs → {} lbs · {} kcal/day",
            profile.age,
            profile.height(),
            profile.current_weight_lbs,
            profile.target_weight_lbs,
            profile.calorie_goal
        );
    } else {
        println!("  Onboarding not complete");
    }
    Ok(())
}

fn cmd_users(store: &UserStore) -> Result<()> {
    let users = store.list_users()?;
    if users.is_empty() {
        println!("No accounts yet. Run `wellness login` to create one.");
        return Ok(());
    }

    let active = store.active_user()?;
    for user in users {
        let marker = if active.as_deref() == Some(user.as_str()) { "*" } else { " " };
        println!("{} {}", marker, user);
    }
    Ok(())
}

fn cmd_onboard(store: UserStore, form: OnboardingForm) -> Result<()> {
    let mut app = WellnessApp::require(store)?;
    let state = app.complete_onboarding(form)?;
    let profile = &state.profile;
    let height = profile.height();

    let range = metrics::healthy_weight_range(height, profile.age);
    let maintenance = metrics::maintenance_calories(profile.current_weight_lbs, height);
    let rate = metrics::weekly_gain_rate(metrics::daily_surplus(profile.calorie_goal, maintenance));

    println!("✓ Profile saved");
    println!();
    println!(
        "  Healthy weight range for your height and age: {} – {} lbs",
        range.min, range.max
    );
    println!("  Maintenance estimate: {} kcal", maintenance);
    println!("  Daily calorie goal:   {} kcal", profile.calorie_goal);
    if resources::shows_growth_tip(profile.age) {
        println!();
        println!("  Growth Tip: {}", resources::GROWTH_TIP);
    }
    println!();
    println!("  Weight gain forecast");
    println!(
        "    Weekly gain: +{:.1} lbs ({})",
        rate,
        GainPace::from_rate(rate).label()
    );
    println!(
        "    Timeline to {} lbs: {}",
        profile.target_weight_lbs,
        format_weeks(metrics::weeks_to_goal(
            profile.current_weight_lbs,
            profile.target_weight_lbs,
            rate
        ))
    );
    Ok(())
}

fn cmd_food(
    store: UserStore,
    config: &Config,
    meal: String,
    details: Option<String>,
    calories: Option<u32>,
    estimate: bool,
    groups: Vec<String>,
) -> Result<()> {
    let mut app = WellnessApp::require(store)?;
    let groups = groups
        .iter()
        .map(|g| g.parse::<FoodGroup>())
        .collect::<Result<Vec<_>>>()?;

    let mut calories = calories;
    if estimate {
        let service = coach_service(config);
        match app.estimate_meal(&meal, details.as_deref(), service.as_ref()) {
            Ok(est) => {
                println!("  Coach estimate: {} kcal. {}", est.calories, est.explanation);
                calories = calories.or(Some(est.calories));
            }
            Err(Error::Validation(msg)) => return Err(Error::Validation(msg)),
            Err(_) => println!("  Could not estimate calories. Please enter them manually."),
        }
    }

    let calories = calories.ok_or_else(|| {
        Error::Validation("Calories are required (use --calories or --estimate).".into())
    })?;

    let entry = app.log_food(FoodInput {
        meal_name: meal,
        details,
        calories,
        groups,
    })?;
    println!("✓ Logged {} ({} kcal)", entry.meal_name, entry.calories);
    Ok(())
}

fn cmd_estimate(store: UserStore, config: &Config, meal: &str, details: Option<&str>) -> Result<()> {
    let app = WellnessApp::require(store)?;
    let service = coach_service(config);
    match app.estimate_meal(meal, details, service.as_ref()) {
        Ok(est) => {
            println!("{} kcal", est.calories);
            println!("  {}", est.explanation);
            Ok(())
        }
        Err(Error::Validation(msg)) => Err(Error::Validation(msg)),
        Err(e) => {
            println!("Could not estimate calories. Please enter them manually.");
            Err(e)
        }
    }
}

fn cmd_activity(store: UserStore, input: ActivityInput) -> Result<()> {
    let mut app = WellnessApp::require(store)?;
    let entry = app.log_activity(input)?;
    println!(
        "✓ Logged {} for {} min",
        entry.activity_type, entry.duration_minutes
    );
    Ok(())
}

fn cmd_weight(store: UserStore, lbs: f64) -> Result<()> {
    let mut app = WellnessApp::require(store)?;
    let sample = app.log_weight(lbs)?;
    println!("✓ Weight updated to {} lbs", sample.weight);
    Ok(())
}

fn cmd_dashboard(store: UserStore, config: &Config) -> Result<()> {
    let app = WellnessApp::require(store)?;
    if app.needs_onboarding() {
        println!("Hello, {}! Run `wellness onboard` to get started.", app.username());
        return Ok(());
    }

    let state = app.state();
    let summary = DashboardSummary::compute(state, &Local::now(), config.goals.default_calorie_goal);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  Hello, {}!", state.profile.username);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Daily status");
    println!(
        "    Eaten {} / {} kcal ({:.0}%)",
        summary.consumed_today, summary.calorie_goal, summary.calorie_progress_percent
    );
    if summary.remaining_today >= 0 {
        println!("    {} kcal to go", summary.remaining_today);
    } else {
        println!("    {} kcal over goal", -summary.remaining_today);
    }
    println!("    Active {} min today", summary.activity_minutes_today);
    println!();
    println!("  Goal projection");
    println!(
        "    {} lbs → {} lbs ({:.0}% of the way from {} lbs)",
        state.profile.current_weight_lbs,
        state.profile.target_weight_lbs,
        summary.goal_progress_percent,
        summary.starting_weight
    );
    println!(
        "    Weekly gain: +{:.1} lbs ({})",
        summary.lbs_per_week,
        summary.pace.label()
    );
    println!("    Time to goal: {}", format_weeks(summary.weeks_to_goal));
    println!(
        "    Calculated surplus of {} kcal/day (maintenance ~{} kcal)",
        summary.surplus, summary.maintenance
    );
    println!(
        "    BMI {:.1} · healthy range {} – {} lbs",
        summary.bmi, summary.healthy_range.min, summary.healthy_range.max
    );
    println!();
    println!("  Light & Nutritious Ideas");
    for idea in resources::MEAL_IDEAS {
        println!("    {:<16} {:>4} kcal  {}", idea.name, idea.calories, idea.kind);
    }
    println!("    More ideas: `wellness chat \"{}\"`", coach::QUICK_PROMPTS[1]);
    println!();
    Ok(())
}

fn cmd_progress(store: UserStore) -> Result<()> {
    let app = WellnessApp::require(store)?;
    let trends = ProgressTrends::compute(app.state(), &Local::now());

    println!("Daily calories (last 7 days, goal {} kcal)", trends.calorie_goal);
    for day in &trends.daily_calories {
        println!("  {}  {:>5} kcal", day.date.format("%b %d"), day.calories);
    }
    println!();
    println!("Weight trend (target {} lbs)", trends.target_weight_lbs);
    if trends.recent_weights.is_empty() {
        println!("  No weight logged yet");
    }
    for sample in &trends.recent_weights {
        println!(
            "  {}  {} lbs",
            sample.timestamp.with_timezone(&Local).format("%b %d"),
            sample.weight
        );
    }
    Ok(())
}

fn cmd_chat(store: UserStore, config: &Config, message: Option<String>, clear: bool) -> Result<()> {
    let mut app = WellnessApp::require(store)?.with_chat_temperature(config.coach.temperature);

    if clear {
        app.clear_chat()?;
        println!("✓ Chat history cleared");
        return Ok(());
    }

    let Some(message) = message else {
        println!("Ask your coach something, for example:");
        for quick in coach::QUICK_PROMPTS {
            println!("  wellness chat \"{}\"", quick);
        }
        return Ok(());
    };

    let service = coach_service(config);
    let reply = app.send_chat(&message, service.as_ref())?;
    println!("{}", reply.text);
    Ok(())
}

fn cmd_history(store: UserStore) -> Result<()> {
    let app = WellnessApp::require(store)?;
    let history = &app.state().chat_history;
    if history.is_empty() {
        println!("No messages yet.");
    }
    for message in history {
        let who = match message.role {
            ChatRole::User => "you",
            ChatRole::Model => "coach",
        };
        println!("[{}] {}", who, message.text);
    }
    Ok(())
}

fn cmd_resources() {
    println!("Help & resources");
    for resource in HEALTH_RESOURCES {
        println!();
        println!("  {}", resource.title);
        println!("    {}", resource.url);
        println!("    {}", resource.description);
    }
}

fn cmd_export(store: UserStore, out: &std::path::Path) -> Result<()> {
    let app = WellnessApp::require(store)?;
    let summary = export::export_logs(app.state(), out)?;
    println!("✓ Exported {} rows", summary.rows);
    for file in &summary.files {
        println!("  {}", file.display());
    }
    Ok(())
}

fn format_weeks(weeks: Option<u32>) -> String {
    match weeks {
        Some(weeks) => format!("~{} weeks", weeks),
        None => "Need Surplus".to_string(),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string())
}
