use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};
use tracing::{error, info, warn, Level};

use dietrs::chart::{Figure, SeriesColor, SeriesStyle};
use dietrs::config::AppConfig;
use dietrs::export::{export_trajectory, ExportFormat};
use dietrs::logging::init_logging;
use dietrs::scenarios::{self, ScenarioOptions};
use dietrs::{
    calc_bmr, calc_tdee, predict_calories_to_reach, predict_days_to_weight, predict_weight,
    steady_state_weight, weight_over_time, ActivityFactor, ActivityLevel, BodyProfile, DietError,
    Sex, Units, WeightTrajectory,
};

/// dietrs - Body-weight trajectory calculator
///
/// Estimates energy expenditure with the Mifflin-St Jeor equation, projects
/// body weight over time on a fixed daily intake, and solves for the intake or
/// the number of days needed to reach a target weight.
#[derive(Parser)]
#[command(name = "dietrs")]
#[command(version)]
#[command(about = "Body-weight trajectory calculator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Units for mass and height input/output (metric, imperial)
    #[arg(short, long, global = true)]
    units: Option<Units>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Profile overrides; anything omitted comes from the config file
#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    /// Height (cm, or inches with --units imperial)
    #[arg(long)]
    height: Option<f64>,

    /// Age in years
    #[arg(long)]
    age: Option<f64>,

    /// Sex (m, f)
    #[arg(long)]
    sex: Option<Sex>,

    /// Activity level (sedentary, light, moderate, very, extra) or a multiplier
    #[arg(short, long)]
    activity: Option<ActivityFactor>,
}

#[derive(Args, Debug, Clone)]
struct TrajectoryArgs {
    /// Number of days to project
    #[arg(short, long, default_value = "365")]
    days: usize,

    /// Daily calorie intake (kcal)
    #[arg(long)]
    calories: f64,

    /// Starting weight
    #[arg(short, long)]
    weight: f64,

    #[command(flatten)]
    profile: ProfileArgs,

    /// Draw the trajectory as a text chart
    #[arg(short, long)]
    plot: bool,

    /// Write the trajectory to a file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Export format (csv, json)
    #[arg(short = 'f', long, default_value = "csv")]
    format: ExportFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Basal metabolic rate
    Bmr {
        /// Body weight
        #[arg(short, long)]
        weight: f64,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Total daily energy expenditure
    Tdee {
        /// Body weight
        #[arg(short, long)]
        weight: f64,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Weight at which a daily intake is exactly maintenance
    SteadyState {
        /// Daily calorie intake (kcal)
        #[arg(long)]
        calories: f64,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Day-by-day simulation, recomputing BMR from the current weight
    Simulate(TrajectoryArgs),

    /// Closed-form exponential projection toward the steady-state weight
    Project {
        #[command(flatten)]
        trajectory: TrajectoryArgs,

        /// Overlay the steady-state weight on the chart
        #[arg(long)]
        show_steady_state: bool,
    },

    /// Daily intake needed to reach a target weight in a number of days
    CaloriesToTarget {
        /// Days available
        #[arg(short, long)]
        days: f64,

        /// Starting weight
        #[arg(short, long)]
        weight: f64,

        /// Target weight
        #[arg(short, long)]
        target: f64,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Days needed to reach a target weight on a daily intake
    DaysToTarget {
        /// Target weight
        #[arg(short, long)]
        target: f64,

        /// Daily calorie intake (kcal)
        #[arg(long)]
        calories: f64,

        /// Starting weight
        #[arg(short, long)]
        weight: f64,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Compare projections across all activity levels
    Compare {
        /// Number of days to project
        #[arg(short, long, default_value = "300")]
        days: usize,

        /// Daily calorie intake (kcal)
        #[arg(long)]
        calories: f64,

        /// Starting weight
        #[arg(short, long)]
        weight: f64,

        /// Goal weight drawn as a reference line
        #[arg(short, long)]
        goal: Option<f64>,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Run the built-in scenario suite
    Scenarios,

    /// Configure application settings
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,

        /// Print the configuration file path
        #[arg(short, long)]
        path: bool,
    },
}

/// Resolved settings every command runs with
struct Context {
    config: AppConfig,
    config_path: PathBuf,
    units: Units,
    color: bool,
}

impl Context {
    fn mass(&self, kg: f64) -> String {
        format!("{:.2} {}", self.units.mass_from_kg(kg), self.units.mass_label())
    }

    fn figure(&self) -> Figure {
        let mut figure = Figure::new(self.config.chart.width, self.config.chart.height);
        figure.color = self.color;
        figure
    }
}

impl ProfileArgs {
    fn resolve(&self, ctx: &Context) -> (BodyProfile, ActivityFactor) {
        let settings = &ctx.config.profile;
        let mut profile = settings.body_profile();
        if let Some(height) = self.height {
            profile.height_cm = ctx.units.length_to_cm(height);
        }
        if let Some(age) = self.age {
            profile.age_years = age;
        }
        if let Some(sex) = self.sex {
            profile.sex = sex;
        }
        let activity = self.activity.unwrap_or_else(|| settings.activity.into());
        (profile, activity)
    }
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Multiplier")]
    multiplier: String,
    #[tabled(rename = "Steady state")]
    steady_state: String,
    #[tabled(rename = "Final weight")]
    final_weight: String,
    #[tabled(rename = "Days to goal")]
    days_to_goal: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.with_verbosity(cli.verbose);
    init_logging(&log_config)?;

    let color = config.display.color && !cli.no_color;
    if !color {
        colored::control::set_override(false);
    }

    let ctx = Context {
        units: cli.units.unwrap_or(config.display.units),
        config,
        config_path,
        color,
    };
    info!(units = %ctx.units, config = %ctx.config_path.display(), "Starting dietrs");
    if cli.config.is_none() && !ctx.config_path.exists() {
        info!("No config file found, using built-in defaults");
    }

    let result = match cli.command {
        Commands::Bmr { weight, profile } => cmd_bmr(&ctx, weight, &profile),
        Commands::Tdee { weight, profile } => cmd_tdee(&ctx, weight, &profile),
        Commands::SteadyState { calories, profile } => cmd_steady_state(&ctx, calories, &profile),
        Commands::Simulate(args) => cmd_trajectory(&ctx, &args, false, false),
        Commands::Project {
            trajectory,
            show_steady_state,
        } => cmd_trajectory(&ctx, &trajectory, true, show_steady_state),
        Commands::CaloriesToTarget {
            days,
            weight,
            target,
            profile,
        } => cmd_calories_to_target(&ctx, days, weight, target, &profile),
        Commands::DaysToTarget {
            target,
            calories,
            weight,
            profile,
        } => cmd_days_to_target(&ctx, target, calories, weight, &profile),
        Commands::Compare {
            days,
            calories,
            weight,
            goal,
            profile,
        } => cmd_compare(&ctx, days, calories, weight, goal, &profile),
        Commands::Scenarios => cmd_scenarios(&ctx),
        Commands::Config { show, init, path } => return cmd_config(&ctx, show, init, path),
    };
    result.map_err(report)
}

/// Log a failed command at its severity and turn it into the exit error
fn report(err: DietError) -> anyhow::Error {
    if err.severity().to_tracing_level() == Level::ERROR {
        error!(error = %err, "Command failed");
    } else {
        warn!(error = %err, "Command failed");
    }
    anyhow::anyhow!(err.user_message())
}

fn cmd_bmr(ctx: &Context, weight: f64, args: &ProfileArgs) -> dietrs::Result<()> {
    let (profile, _) = args.resolve(ctx);
    let kg = ctx.units.mass_to_kg(weight);
    let bmr = calc_bmr(kg, profile.height_cm, profile.age_years, profile.sex);

    println!("{}", "Basal metabolic rate (Mifflin-St Jeor)".green().bold());
    println!("  Weight: {}", ctx.mass(kg));
    println!(
        "  Height: {:.1} {}",
        ctx.units.length_from_cm(profile.height_cm),
        ctx.units.length_label()
    );
    println!("  Age: {}  Sex: {}", profile.age_years, profile.sex);
    println!("  BMR: {:.2} kcal/day", bmr);
    Ok(())
}

fn cmd_tdee(ctx: &Context, weight: f64, args: &ProfileArgs) -> dietrs::Result<()> {
    let (profile, activity) = args.resolve(ctx);
    let kg = ctx.units.mass_to_kg(weight);
    let bmr = calc_bmr(kg, profile.height_cm, profile.age_years, profile.sex);
    let tdee = calc_tdee(bmr, activity);

    println!("{}", "Total daily energy expenditure".green().bold());
    println!("  BMR: {:.2} kcal/day", bmr);
    println!("  Activity multiplier: {}", activity);
    println!("  TDEE: {:.2} kcal/day", tdee);
    Ok(())
}

fn cmd_steady_state(ctx: &Context, calories: f64, args: &ProfileArgs) -> dietrs::Result<()> {
    let (profile, activity) = args.resolve(ctx);
    let ssw = steady_state_weight(
        calories,
        activity,
        profile.height_cm,
        profile.sex,
        profile.age_years,
    );

    println!("{}", "Steady-state weight".green().bold());
    println!("  Intake: {:.0} kcal/day at activity {}", calories, activity);
    println!("  Weight converges toward {}", ctx.mass(ssw));
    Ok(())
}

fn cmd_trajectory(
    ctx: &Context,
    args: &TrajectoryArgs,
    closed_form: bool,
    show_steady_state: bool,
) -> dietrs::Result<()> {
    let (profile, activity) = args.profile.resolve(ctx);
    let wt0 = ctx.units.mass_to_kg(args.weight);
    let trajectory = if closed_form {
        weight_over_time(args.days, args.calories, &profile, wt0, activity)
    } else {
        predict_weight(args.days, args.calories, &profile, wt0, activity)
    };
    let ssw = steady_state_weight(
        args.calories,
        activity,
        profile.height_cm,
        profile.sex,
        profile.age_years,
    );

    println!(
        "{}",
        format!("Weight projection ({}, {} days)", trajectory.model, args.days)
            .cyan()
            .bold()
    );
    if let (Some(first), Some(last)) = (trajectory.initial_kg(), trajectory.final_kg()) {
        println!("  Day 0: {}", ctx.mass(first));
        println!("  Day {}: {}", trajectory.len() - 1, ctx.mass(last));
        println!("  Change: {}", ctx.mass(last - first));
    }
    println!("  Steady state: {}", ctx.mass(ssw));

    if args.plot && !trajectory.is_empty() {
        println!("{}", plot_trajectory(ctx, &trajectory, show_steady_state.then_some(ssw))?);
    }

    if let Some(output) = &args.output {
        export_trajectory(&trajectory, ctx.units, output, args.format)?;
        println!("{}", format!("✓ Trajectory written to {}", output.display()).green());
    }
    Ok(())
}

fn plot_trajectory(
    ctx: &Context,
    trajectory: &WeightTrajectory,
    steady_state_kg: Option<f64>,
) -> dietrs::Result<String> {
    let days = trajectory.days();
    let weights: Vec<f64> = trajectory
        .weights_kg
        .iter()
        .map(|&kg| ctx.units.mass_from_kg(kg))
        .collect();

    let mut figure = ctx.figure();
    figure.plot(&days, &weights, SeriesStyle::labeled(SeriesColor::Red, "Weight"))?;
    if let Some(ssw) = steady_state_kg {
        let line = vec![ctx.units.mass_from_kg(ssw); days.len()];
        figure.plot(&days, &line, SeriesStyle::labeled(SeriesColor::Blue, "Steady State Weight"))?;
    }
    figure.show(ctx.config.chart.legend && steady_state_kg.is_some())
}

fn cmd_calories_to_target(
    ctx: &Context,
    days: f64,
    weight: f64,
    target: f64,
    args: &ProfileArgs,
) -> dietrs::Result<()> {
    let (profile, activity) = args.resolve(ctx);
    if profile.sex == Sex::Female {
        warn!("Calories-to-target uses the male BMR constant; the result overstates intake");
    }
    let wt0 = ctx.units.mass_to_kg(weight);
    let target_kg = ctx.units.mass_to_kg(target);
    let calories = predict_calories_to_reach(
        days,
        wt0,
        target_kg,
        profile.height_cm,
        profile.age_years,
        activity,
    )?;

    println!("{}", "Calories to reach target".yellow().bold());
    println!(
        "  From {} to {} in {} days",
        ctx.mass(wt0),
        ctx.mass(target_kg),
        days
    );
    println!("  Daily intake: {:.2} kcal/day", calories);
    Ok(())
}

fn cmd_days_to_target(
    ctx: &Context,
    target: f64,
    calories: f64,
    weight: f64,
    args: &ProfileArgs,
) -> dietrs::Result<()> {
    let (profile, activity) = args.resolve(ctx);
    let wt0 = ctx.units.mass_to_kg(weight);
    let target_kg = ctx.units.mass_to_kg(target);
    let days = predict_days_to_weight(target_kg, calories, wt0, &profile, activity)?;

    println!("{}", "Days to reach target".yellow().bold());
    println!(
        "  From {} to {} on {:.0} kcal/day",
        ctx.mass(wt0),
        ctx.mass(target_kg),
        calories
    );
    println!("  Days: {:.2}", days);
    Ok(())
}

fn cmd_compare(
    ctx: &Context,
    days: usize,
    calories: f64,
    weight: f64,
    goal: Option<f64>,
    args: &ProfileArgs,
) -> dietrs::Result<()> {
    let (profile, _) = args.resolve(ctx);
    let wt0 = ctx.units.mass_to_kg(weight);
    let goal_kg = goal.map(|g| ctx.units.mass_to_kg(g));
    let colors = [
        SeriesColor::Red,
        SeriesColor::Blue,
        SeriesColor::Green,
        SeriesColor::Yellow,
        SeriesColor::Magenta,
    ];
    let x = (0..days).map(|d| d as f64).collect::<Vec<_>>();

    let mut figure = ctx.figure();
    let mut rows = Vec::new();
    for (level, color) in ActivityLevel::ALL.into_iter().zip(colors) {
        let activity: ActivityFactor = level.into();
        let trajectory = weight_over_time(days, calories, &profile, wt0, activity);
        let ssw = steady_state_weight(calories, activity, profile.height_cm, profile.sex, profile.age_years);

        let weights: Vec<f64> = trajectory
            .weights_kg
            .iter()
            .map(|&kg| ctx.units.mass_from_kg(kg))
            .collect();
        figure.plot(&x, &weights, SeriesStyle::labeled(color, level.to_string()))?;

        let days_to_goal = match goal_kg {
            Some(goal_kg) => match predict_days_to_weight(goal_kg, calories, wt0, &profile, activity) {
                Ok(d) => format!("{:.1}", d),
                Err(_) => "unreachable".to_string(),
            },
            None => "-".to_string(),
        };
        rows.push(ComparisonRow {
            activity: level.to_string(),
            multiplier: level.multiplier().to_string(),
            steady_state: ctx.mass(ssw),
            final_weight: trajectory.final_kg().map(|kg| ctx.mass(kg)).unwrap_or_default(),
            days_to_goal,
        });
    }
    if let Some(goal_kg) = goal_kg {
        let line = vec![ctx.units.mass_from_kg(goal_kg); days];
        figure.plot(&x, &line, SeriesStyle::labeled(SeriesColor::White, "Goal"))?;
    }

    println!(
        "{}",
        format!("Activity comparison on {:.0} kcal/day over {} days", calories, days)
            .magenta()
            .bold()
    );
    println!("{}", Table::new(rows).with(Style::rounded()));
    if days > 0 {
        println!("{}", figure.show(ctx.config.chart.legend)?);
    }
    Ok(())
}

fn cmd_scenarios(ctx: &Context) -> dietrs::Result<()> {
    let options = ScenarioOptions {
        chart: ctx.config.chart.clone(),
        color: ctx.color,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    scenarios::run_all(&mut out, &options)
}

fn cmd_config(ctx: &Context, show: bool, init: bool, path: bool) -> Result<()> {
    if path {
        println!("{}", ctx.config_path.display());
    }

    if init {
        if ctx.config_path.exists() {
            anyhow::bail!("Config file already exists: {}", ctx.config_path.display());
        }
        let mut config = AppConfig::default();
        config
            .save_to_file(&ctx.config_path)
            .with_context(|| "Failed to initialize configuration")?;
        println!(
            "{}",
            format!("✓ Configuration written to {}", ctx.config_path.display()).green()
        );
    }

    if show || !(init || path) {
        let rendered = toml::to_string_pretty(&ctx.config)
            .with_context(|| "Failed to serialize configuration")?;
        println!("{}", rendered);
    }
    Ok(())
}
