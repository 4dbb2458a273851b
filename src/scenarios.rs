//! The scenario suite: fixed what-if calculations for one reference person
//!
//! Each scenario writes its report to any [`Write`] sink and runs only when
//! called; [`run_all`] runs them in order.

use std::io::Write;
use tracing::info;

use crate::chart::{approx_floor, plot_xy, Figure, SeriesColor, SeriesStyle};
use crate::config::ChartSettings;
use crate::error::Result;
use crate::metabolic::{calc_bmr, calc_tdee, steady_state_weight};
use crate::models::{ActivityFactor, ActivityLevel, BodyProfile, Sex};
use crate::trajectory::{
    predict_calories_to_reach, predict_days_to_weight, predict_weight, weight_over_time,
};
use crate::units::{to_cm, to_kg, to_lbs};

const THREE_YEARS: usize = 365 * 3;
const STARTING_LBS: f64 = 222.0;
const DAILY_CALORIES: f64 = 2100.0;
/// Width/height of the quick single-series plots
const QUICK_PLOT: (u32, u32) = (40, 10);

/// Presentation options shared by all scenarios
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    pub chart: ChartSettings,
    pub color: bool,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        ScenarioOptions {
            chart: ChartSettings::default(),
            color: false,
        }
    }
}

impl ScenarioOptions {
    fn figure(&self) -> Figure {
        let mut figure = Figure::new(self.chart.width, self.chart.height);
        figure.color = self.color;
        figure
    }

    fn quick_plot<W: Write>(&self, out: &mut W, x: &[f64], y: &[f64]) -> Result<()> {
        let rendered = plot_xy(x, y, QUICK_PLOT.0, QUICK_PLOT.1, self.color)?;
        writeln!(out, "{}", rendered)?;
        Ok(())
    }
}

fn sedentary() -> ActivityFactor {
    ActivityLevel::Sedentary.into()
}

fn days_axis(days: usize) -> Vec<f64> {
    (0..days).map(|d| d as f64).collect()
}

/// BMR, TDEE and steady-state weights for a 100 kg, 200 cm, 43 year old man
pub fn energy_expenditure<W: Write>(out: &mut W) -> Result<()> {
    info!("Scenario: energy expenditure");
    let reference = BodyProfile::reference();

    let bmr = calc_bmr(100.0, 200.0, 43.0, Sex::Male);
    writeln!(out, "Your BMR is {} calories per day.", bmr)?;

    let tdee = calc_tdee(bmr, sedentary());
    writeln!(out, "Your TDEE is {} calories per day.", tdee)?;

    let target_cal = tdee - 300.0;
    writeln!(out, "Your target calories is {} calories per day.", target_cal)?;

    let ssw_lbs = |calories: f64, level: ActivityLevel| {
        to_lbs(steady_state_weight(
            calories,
            level.into(),
            reference.height_cm,
            reference.sex,
            reference.age_years,
        ))
    };

    writeln!(
        out,
        "Your steady state weight w/ 1.2 and tdee calories is {} lbs.",
        ssw_lbs(tdee, ActivityLevel::Sedentary)
    )?;
    writeln!(
        out,
        "Your steady state weight w/ sedentary, tdee and a snack is {} lbs.",
        ssw_lbs(tdee * 1.1, ActivityLevel::Sedentary)
    )?;
    writeln!(
        out,
        "Your steady state weight w/ light activity is {} lbs.",
        ssw_lbs(target_cal, ActivityLevel::Light)
    )?;
    writeln!(
        out,
        "Your steady state weight w/ sedentary is {} lbs.",
        ssw_lbs(target_cal, ActivityLevel::Sedentary)
    )?;
    writeln!(
        out,
        "Your steady state weight w/ sedentary and a snack is {} lbs.",
        ssw_lbs(target_cal * 1.1, ActivityLevel::Sedentary)
    )?;

    let boxing_cal = calc_tdee(
        calc_bmr(to_kg(205.0), 200.0, 35.0, Sex::Male),
        ActivityLevel::VeryActive.into(),
    );
    writeln!(out, "Your boxing days calories is {} calories per day.", boxing_cal)?;
    let boxing_cal = calc_tdee(
        calc_bmr(to_kg(205.0), to_cm(77.0), 35.0, Sex::Male),
        ActivityLevel::ExtraActive.into(),
    );
    writeln!(out, "Your boxing days calories may have been {} calories per day.", boxing_cal)?;

    Ok(())
}

/// Three years on 2100 kcal from 222 lb: both models, then the closed form
/// against its steady state
pub fn three_year_projection<W: Write>(out: &mut W, options: &ScenarioOptions) -> Result<()> {
    info!("Scenario: three year projection");
    let profile = BodyProfile::reference();
    let days = days_axis(THREE_YEARS);

    let discrete = predict_weight(THREE_YEARS, DAILY_CALORIES, &profile, to_kg(STARTING_LBS), sedentary());
    writeln!(out, "Predicted weight over 3 years, using predict_wt")?;
    options.quick_plot(out, &days, &discrete.weights_lbs())?;

    let closed = weight_over_time(THREE_YEARS, DAILY_CALORIES, &profile, to_kg(STARTING_LBS), sedentary());
    let closed_lbs = closed.weights_lbs();
    writeln!(out, "Predicted weight over 3 years, using weight_over_time")?;
    options.quick_plot(out, &days, &closed_lbs)?;

    let ssw = to_lbs(steady_state_weight(
        DAILY_CALORIES,
        sedentary(),
        profile.height_cm,
        profile.sex,
        profile.age_years,
    ));

    let mut figure = options.figure();
    figure.set_y_limits(0.9 * ssw, 230.0);
    figure.set_x_limits(0.0, THREE_YEARS as f64);
    figure.plot(&days, &closed_lbs, SeriesStyle::labeled(SeriesColor::Red, "Weight (Predicted)"))?;
    figure.plot(
        &days,
        &vec![ssw; THREE_YEARS],
        SeriesStyle::labeled(SeriesColor::Blue, "Steady State Weight"),
    )?;
    writeln!(out, "{}", figure.show(true)?)?;

    Ok(())
}

/// Daily intake that takes 222 lb to 200 lb in 3 years and in 3 months,
/// checked against the closed form
pub fn calories_to_lose<W: Write>(out: &mut W, options: &ScenarioOptions) -> Result<()> {
    info!("Scenario: calories to lose");
    let profile = BodyProfile::reference();

    for (days, period) in [(THREE_YEARS, "3 years"), (90, "3 months")] {
        let calories = predict_calories_to_reach(
            days as f64,
            to_kg(STARTING_LBS),
            to_kg(200.0),
            profile.height_cm,
            profile.age_years,
            sedentary(),
        )?;
        writeln!(out, "Calories to lose 22 lbs in {}: {}", period, calories)?;

        let check = weight_over_time(days, calories, &profile, to_kg(STARTING_LBS), sedentary());
        let tail = &check.weights_kg[days - 5..days - 1];
        writeln!(out, "Check: {:?}", tail)?;

        if days == 90 {
            options.quick_plot(out, &check.days(), &check.weights_kg)?;
        }
    }

    Ok(())
}

/// 300 days on 2100 kcal at three activity levels against a 200 lb goal
pub fn activity_comparison<W: Write>(out: &mut W, options: &ScenarioOptions) -> Result<()> {
    info!("Scenario: activity comparison");
    const DAYS: usize = 300;
    const MARKER_EVERY: usize = 30;
    let profile = BodyProfile::reference();
    let days = days_axis(DAYS);

    let mut figure = options.figure();
    figure.set_y_limits(180.0, 230.0);
    figure.set_x_limits(0.0, DAYS as f64);
    figure.set_x_ticks_fn(approx_floor);
    figure.set_y_ticks_fn(approx_floor);

    let curves = [
        (ActivityLevel::Sedentary, SeriesColor::Red, "Sedentary", 'o'),
        (ActivityLevel::Light, SeriesColor::Blue, "Light", '+'),
        (ActivityLevel::Moderate, SeriesColor::Green, "Moderate", 'x'),
    ];
    for (level, color, label, marker) in curves {
        let trajectory = weight_over_time(DAYS, DAILY_CALORIES, &profile, to_kg(STARTING_LBS), level.into());
        figure.plot(&days, &trajectory.weights_lbs(), SeriesStyle::labeled(color, label))?;

        let (marker_x, marker_y): (Vec<f64>, Vec<f64>) = trajectory
            .sample_every(MARKER_EVERY)
            .into_iter()
            .map(|(day, kg)| (day, to_lbs(kg)))
            .unzip();
        figure.plot(&marker_x, &marker_y, SeriesStyle::markers(color, marker))?;
    }
    figure.plot(&days, &vec![200.0; DAYS], SeriesStyle::labeled(SeriesColor::White, "Goal"))?;

    writeln!(out, "{}", figure.show(false)?)?;
    Ok(())
}

/// Days from 222 lb to 190 lb at 2100 and 1800 kcal, and the intake that does
/// it in 158 days
pub fn days_to_goal<W: Write>(out: &mut W) -> Result<()> {
    info!("Scenario: days to goal");
    const DEADLINE_DAYS: f64 = 158.0;
    let profile = BodyProfile::reference();
    let start = to_kg(STARTING_LBS);
    let end = to_kg(190.0);
    let loss_lbs = to_lbs(start - end);
    let levels = [ActivityLevel::Sedentary, ActivityLevel::Light, ActivityLevel::Moderate];

    writeln!(out, "you have {} days!", DEADLINE_DAYS)?;
    for calories in [2100.0, 1800.0] {
        for level in levels {
            let days = predict_days_to_weight(end, calories, start, &profile, level.into())?;
            writeln!(
                out,
                "{} Days to lose {:0.1} lbs on {} calories per day: {:0.2}",
                level.short_name(),
                loss_lbs,
                calories,
                days
            )?;
        }
        writeln!(out)?;
    }

    for level in levels {
        let calories = predict_calories_to_reach(
            DEADLINE_DAYS,
            start,
            end,
            profile.height_cm,
            profile.age_years,
            level.into(),
        )?;
        writeln!(
            out,
            "{} Calories to lose {:0.1} lbs in {} days: {:0.2}",
            level.short_name(),
            loss_lbs,
            DEADLINE_DAYS,
            calories
        )?;
    }

    Ok(())
}

/// Run every scenario in order
pub fn run_all<W: Write>(out: &mut W, options: &ScenarioOptions) -> Result<()> {
    energy_expenditure(out)?;
    three_year_projection(out, options)?;
    calories_to_lose(out, options)?;
    activity_comparison(out, options)?;
    days_to_goal(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<F>(scenario: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buffer = Vec::new();
        scenario(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_energy_expenditure_lines() {
        let output = run(|out| energy_expenditure(out));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Your BMR is 2040 calories per day.");
        assert!(lines[1].starts_with("Your TDEE is 2448"));
        assert!(lines[2].starts_with("Your target calories is 2148"));
        assert!(lines[9].starts_with("Your boxing days calories may have been"));
    }

    #[test]
    fn test_calories_to_lose_prints_checks() {
        let output = run(|out| calories_to_lose(out, &ScenarioOptions::default()));

        assert!(output.contains("Calories to lose 22 lbs in 3 years: "));
        assert!(output.contains("Calories to lose 22 lbs in 3 months: "));
        assert_eq!(output.matches("Check: [").count(), 2);
    }

    #[test]
    fn test_days_to_goal_table() {
        let output = run(|out| days_to_goal(out));

        assert!(output.starts_with("you have 158 days!"));
        assert!(output.contains("SED Days to lose 32.0 lbs on 2100 calories per day: "));
        assert!(output.contains("MOD Days to lose 32.0 lbs on 1800 calories per day: "));
        assert!(output.contains("LIGHT Calories to lose 32.0 lbs in 158 days: "));
    }

    #[test]
    fn test_activity_comparison_renders_markers() {
        let output = run(|out| activity_comparison(out, &ScenarioOptions::default()));

        assert!(output.contains('o'));
        assert!(output.contains('+'));
        assert!(output.contains('>'));
        assert!(!output.contains("Sedentary"));

        let label_row = output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .last()
            .unwrap();
        assert!(!label_row.contains('*'), "x label row: {:?}", label_row);
        assert!(label_row.contains(">200"));
    }

    #[test]
    fn test_three_year_projection_legend() {
        let output = run(|out| three_year_projection(out, &ScenarioOptions::default()));

        assert!(output.contains("Weight (Predicted)"));
        assert!(output.contains("Steady State Weight"));
    }
}
