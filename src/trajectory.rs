//! Weight-over-time models and their inverses
//!
//! Two independent models of the same process live here:
//!
//! - [`predict_weight`] steps day by day, recomputing BMR from the current mass.
//! - [`weight_over_time`] is the closed-form exponential approach to the
//!   steady-state weight. It only approximately matches the discrete model.
//!
//! The inverses ([`predict_calories_to_reach`], [`predict_days_to_weight`]) are
//! derived from the closed form.

use tracing::debug;

use crate::error::{DietError, Result};
use crate::metabolic::{calc_bmr, calc_tdee, steady_state_weight, wt_change_kg, KCAL_PER_KG};
use crate::models::{ActivityFactor, BodyProfile, TrajectoryModel, WeightTrajectory};

/// Exponential decay rate (per day) of the distance to steady state
fn decay_rate(activity: ActivityFactor) -> f64 {
    10.0 * activity.value() / KCAL_PER_KG
}

/// Simulate `days` days of eating `calories` per day, starting at `wt0_kg`
///
/// Element 0 is `wt0_kg`; each following day adds that day's
/// [`wt_change_kg`], with BMR taken from the previous day's mass.
pub fn predict_weight(
    days: usize,
    calories: f64,
    profile: &BodyProfile,
    wt0_kg: f64,
    activity: ActivityFactor,
) -> WeightTrajectory {
    let mut weights = Vec::with_capacity(days);
    if days > 0 {
        weights.push(wt0_kg);
    }

    let mut current = wt0_kg;
    for _ in 1..days {
        let bmr = calc_bmr(current, profile.height_cm, profile.age_years, profile.sex);
        let tdee = calc_tdee(bmr, activity);
        current += wt_change_kg(tdee, calories);
        weights.push(current);
    }

    debug!(
        days,
        calories,
        start_kg = wt0_kg,
        end_kg = weights.last().copied().unwrap_or(wt0_kg),
        "Discrete trajectory simulated"
    );

    WeightTrajectory::new(TrajectoryModel::Discrete, weights)
}

/// Closed-form mass on (possibly fractional) day `day`
pub fn weight_at_day(
    day: f64,
    calories: f64,
    profile: &BodyProfile,
    wt0_kg: f64,
    activity: ActivityFactor,
) -> f64 {
    let ssw = steady_state_weight(
        calories,
        activity,
        profile.height_cm,
        profile.sex,
        profile.age_years,
    );
    ssw + (-decay_rate(activity) * day).exp() * (wt0_kg - ssw)
}

/// Closed-form trajectory over days `0..days`
///
/// `weight(t) = SSW + exp(-10 * L / 7700 * t) * (wt0 - SSW)`
pub fn weight_over_time(
    days: usize,
    calories: f64,
    profile: &BodyProfile,
    wt0_kg: f64,
    activity: ActivityFactor,
) -> WeightTrajectory {
    let weights = (0..days)
        .map(|t| weight_at_day(t as f64, calories, profile, wt0_kg, activity))
        .collect();

    WeightTrajectory::new(TrajectoryModel::ClosedForm, weights)
}

/// Constant daily intake that takes the closed-form model from `wt0_kg` to
/// `target_kg` in exactly `days` days
///
/// Only the male BMR constant is used: this solver takes height and age but no
/// sex, so for a female profile its answer is 166 * L kcal/day too high.
pub fn predict_calories_to_reach(
    days: f64,
    wt0_kg: f64,
    target_kg: f64,
    height_cm: f64,
    age_years: f64,
    activity: ActivityFactor,
) -> Result<f64> {
    if !days.is_finite() || days <= 0.0 {
        return Err(DietError::domain(
            "predict_calories_to_reach",
            format!("day count must be positive, got {}", days),
        ));
    }

    let c_e = (-decay_rate(activity) * days).exp();
    let c_p = (6.25 * height_cm - 5.0 * age_years + 5.0) / 10.0;
    let calories = 10.0 * activity.value() * (wt0_kg - (wt0_kg - target_kg) / (1.0 - c_e) + c_p);

    debug!(days, wt0_kg, target_kg, calories, "Calories to reach target solved");
    Ok(calories)
}

/// Days until the closed-form model on `calories` per day reaches `target_kg`
///
/// Fails with a domain error when the target cannot be reached: when it lies
/// beyond the steady-state weight, on the other side of the start from the
/// steady state, or when the start already is the steady state.
pub fn predict_days_to_weight(
    target_kg: f64,
    calories: f64,
    wt0_kg: f64,
    profile: &BodyProfile,
    activity: ActivityFactor,
) -> Result<f64> {
    let ssw = steady_state_weight(
        calories,
        activity,
        profile.height_cm,
        profile.sex,
        profile.age_years,
    );
    let numerator = target_kg - ssw;
    let denominator = wt0_kg - ssw;
    let ratio = numerator / denominator;

    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(DietError::domain(
            "predict_days_to_weight",
            format!(
                "target {:.2} kg is not between the start {:.2} kg and the steady state {:.2} kg",
                target_kg, wt0_kg, ssw
            ),
        ));
    }
    if ratio > 1.0 {
        return Err(DietError::domain(
            "predict_days_to_weight",
            format!(
                "intake moves weight toward {:.2} kg, away from the target {:.2} kg",
                ssw, target_kg
            ),
        ));
    }

    let days = -ratio.ln() / decay_rate(activity);
    debug!(target_kg, calories, wt0_kg, ssw, days, "Days to target solved");
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Sex};
    use crate::units::{to_cm, to_kg};
    use proptest::prelude::*;

    fn sedentary() -> ActivityFactor {
        ActivityLevel::Sedentary.into()
    }

    #[test]
    fn test_discrete_single_day_is_start() {
        let trajectory = predict_weight(1, 2000.0, &BodyProfile::reference(), 100.0, sedentary());
        assert_eq!(trajectory.weights_kg, vec![100.0]);
        assert_eq!(trajectory.model, TrajectoryModel::Discrete);
    }

    #[test]
    fn test_zero_days_is_empty() {
        let profile = BodyProfile::reference();
        assert!(predict_weight(0, 2000.0, &profile, 100.0, sedentary()).is_empty());
        assert!(weight_over_time(0, 2000.0, &profile, 100.0, sedentary()).is_empty());
    }

    #[test]
    fn test_discrete_length_and_monotonic_loss() {
        let trajectory = predict_weight(365, 2000.0, &BodyProfile::reference(), 100.0, sedentary());
        assert_eq!(trajectory.len(), 365);
        assert!(trajectory
            .weights_kg
            .windows(2)
            .all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn test_discrete_first_step() {
        let profile = BodyProfile::reference();
        let trajectory = predict_weight(2, 2000.0, &profile, 100.0, sedentary());

        let tdee = calc_tdee(calc_bmr(100.0, profile.height_cm, 43.0, Sex::Male), sedentary());
        assert!((trajectory.weights_kg[1] - (100.0 + (2000.0 - tdee) / 7700.0)).abs() < 1e-12);
    }

    #[test]
    fn test_closed_form_starts_at_wt0_and_approaches_ssw() {
        let profile = BodyProfile::reference();
        let trajectory = weight_over_time(3000, 2100.0, &profile, to_kg(222.0), sedentary());
        let ssw = steady_state_weight(2100.0, sedentary(), profile.height_cm, Sex::Male, 43.0);

        assert!((trajectory.weights_kg[0] - to_kg(222.0)).abs() < 1e-12);
        assert!((trajectory.final_kg().unwrap() - ssw).abs() < 0.3);
        assert!(trajectory.weights_kg.iter().all(|&w| w > ssw));
    }

    #[test]
    fn test_models_track_within_tolerance() {
        let profile = BodyProfile::reference();
        let days = 365 * 3;
        let discrete = predict_weight(days, 2100.0, &profile, to_kg(222.0), sedentary());
        let closed = weight_over_time(days, 2100.0, &profile, to_kg(222.0), sedentary());

        assert_eq!(discrete.len(), closed.len());
        let max_gap = discrete
            .weights_kg
            .iter()
            .zip(&closed.weights_kg)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(max_gap < 0.05, "models diverged by {} kg", max_gap);
        assert!(max_gap > 0.0, "models are independent and should not match exactly");
    }

    #[test]
    fn test_female_profile_flows_through_simulation() {
        let male = BodyProfile::new(170.0, 35.0, Sex::Male);
        let female = BodyProfile::new(170.0, 35.0, Sex::Female);
        let male_end = predict_weight(100, 2000.0, &male, 80.0, sedentary()).final_kg().unwrap();
        let female_end = predict_weight(100, 2000.0, &female, 80.0, sedentary()).final_kg().unwrap();

        // Lower expenditure means less loss on the same intake
        assert!(female_end > male_end);
    }

    #[test]
    fn test_days_to_weight_literal() {
        let profile = BodyProfile::reference();
        let days = predict_days_to_weight(to_kg(190.0), 2100.0, to_kg(222.0), &profile, sedentary()).unwrap();

        let ssw = steady_state_weight(2100.0, sedentary(), to_cm(77.0), Sex::Male, 43.0);
        let expected = -7700.0 / 12.0 * ((to_kg(190.0) - ssw) / (to_kg(222.0) - ssw)).ln();
        assert!((days - expected).abs() < 1e-9);
        assert!(days > 0.0);
    }

    #[test]
    fn test_days_to_weight_target_beyond_steady_state() {
        let profile = BodyProfile::reference();
        // Steady state on 2000 kcal is about 65.4 kg
        let result = predict_days_to_weight(60.0, 2000.0, 100.0, &profile, sedentary());
        assert!(matches!(result, Err(DietError::Domain { .. })));
    }

    #[test]
    fn test_days_to_weight_wrong_direction() {
        let profile = BodyProfile::reference();
        // Steady state on 3000 kcal is about 148.8 kg, so losing is impossible
        let result = predict_days_to_weight(90.0, 3000.0, 100.0, &profile, sedentary());
        assert!(matches!(result, Err(DietError::Domain { .. })));
    }

    #[test]
    fn test_days_to_weight_already_at_steady_state() {
        let profile = BodyProfile::reference();
        let ssw = steady_state_weight(2100.0, sedentary(), profile.height_cm, Sex::Male, 43.0);
        let result = predict_days_to_weight(ssw - 1.0, 2100.0, ssw, &profile, sedentary());
        assert!(result.is_err());
    }

    #[test]
    fn test_days_to_weight_target_equals_start() {
        let profile = BodyProfile::reference();
        let days = predict_days_to_weight(100.0, 2000.0, 100.0, &profile, sedentary()).unwrap();
        assert_eq!(days, 0.0);
    }

    #[test]
    fn test_calories_to_reach_hits_target() {
        let profile = BodyProfile::reference();
        let calories = predict_calories_to_reach(
            90.0,
            to_kg(222.0),
            to_kg(200.0),
            profile.height_cm,
            profile.age_years,
            sedentary(),
        )
        .unwrap();

        let reached = weight_at_day(90.0, calories, &profile, to_kg(222.0), sedentary());
        assert!((reached - to_kg(200.0)).abs() < 1e-9);
        assert!(calories < 2100.0);
    }

    #[test]
    fn test_calories_to_reach_rejects_zero_days() {
        let result = predict_calories_to_reach(0.0, 100.0, 90.0, 195.58, 43.0, sedentary());
        assert!(matches!(result, Err(DietError::Domain { .. })));
    }

    #[test]
    fn test_calories_to_reach_is_male_only() {
        // The solver ignores sex, so a female closed-form run misses the target
        let female = BodyProfile::new(170.0, 30.0, Sex::Female);
        let calories = predict_calories_to_reach(120.0, 80.0, 75.0, 170.0, 30.0, sedentary()).unwrap();
        let reached = weight_at_day(120.0, calories, &female, 80.0, sedentary());
        assert!(reached > 75.0 + 1.0);
    }

    proptest! {
        #[test]
        fn test_days_to_weight_round_trip(
            wt0 in 70.0f64..140.0,
            loss in 1.0f64..20.0,
            calories in 1500.0f64..2100.0,
            level in 0usize..3,
        ) {
            let profile = BodyProfile::reference();
            let activity: ActivityFactor = ActivityLevel::ALL[level].into();
            let target = wt0 - loss;

            match predict_days_to_weight(target, calories, wt0, &profile, activity) {
                Ok(days) => {
                    prop_assert!(days >= 0.0);
                    let reached = weight_at_day(days, calories, &profile, wt0, activity);
                    prop_assert!((reached - target).abs() < 1e-6);
                }
                Err(err) => {
                    let is_domain = matches!(err, DietError::Domain { .. });
                    prop_assert!(is_domain, "unexpected error: {:?}", err);
                }
            }
        }

        #[test]
        fn test_calories_to_reach_round_trip(
            wt0 in 70.0f64..140.0,
            delta in -15.0f64..15.0,
            days in 30.0f64..1000.0,
            multiplier in 1.2f64..1.9,
        ) {
            let profile = BodyProfile::reference();
            let activity = ActivityFactor::new(multiplier).unwrap();
            let target = wt0 + delta;

            let calories = predict_calories_to_reach(
                days, wt0, target, profile.height_cm, profile.age_years, activity,
            ).unwrap();
            let reached = weight_at_day(days, calories, &profile, wt0, activity);

            prop_assert!((reached - target).abs() < 1e-6);
        }
    }
}
