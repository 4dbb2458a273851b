//! Energy expenditure formulas
//!
//! Mifflin-St Jeor basal metabolic rate, activity-scaled total daily energy
//! expenditure, and the steady-state weight obtained by inverting both.
//!
//! All inputs are in kilograms, centimeters, years and kilocalories.

use crate::models::{ActivityFactor, Sex};

/// Kilocalories per kilogram of body-mass change
pub const KCAL_PER_KG: f64 = 7700.0;

/// Sex-specific constant term of the Mifflin-St Jeor equation
pub fn sex_offset(sex: Sex) -> f64 {
    match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    }
}

/// Height, age and sex terms of the BMR equation (everything but the mass term)
fn non_mass_terms(cm: f64, age: f64, sex: Sex) -> f64 {
    6.25 * cm - 5.0 * age + sex_offset(sex)
}

/// Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// # Arguments
/// * `kg` - Body mass in kilograms
/// * `cm` - Height in centimeters
/// * `age` - Age in years
/// * `sex` - Selects the +5 (male) or -161 (female) constant
///
/// # Returns
/// Resting energy expenditure in kcal/day
pub fn calc_bmr(kg: f64, cm: f64, age: f64, sex: Sex) -> f64 {
    10.0 * kg + non_mass_terms(cm, age, sex)
}

/// Total Daily Energy Expenditure
pub fn calc_tdee(bmr: f64, activity: ActivityFactor) -> f64 {
    bmr * activity.value()
}

/// Mass (kg) at which TDEE exactly equals `calories`
///
/// Inverts [`calc_bmr`] and [`calc_tdee`]: at this weight daily intake and
/// expenditure balance, so it is the value every trajectory converges toward.
pub fn steady_state_weight(
    calories: f64,
    activity: ActivityFactor,
    cm: f64,
    sex: Sex,
    age: f64,
) -> f64 {
    (calories / activity.value() - non_mass_terms(cm, age, sex)) / 10.0
}

/// Daily mass change (kg) when eating `calories` against an expenditure of `tdee`
pub fn wt_change_kg(tdee: f64, calories: f64) -> f64 {
    (calories - tdee) / KCAL_PER_KG
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;
    use proptest::prelude::*;

    #[test]
    fn test_bmr_male_literal() {
        let bmr = calc_bmr(100.0, 200.0, 43.0, Sex::Male);
        assert_eq!(bmr, 10.0 * 100.0 + 6.25 * 200.0 - 5.0 * 43.0 + 5.0);
        assert_eq!(bmr, 2040.0);
    }

    #[test]
    fn test_bmr_female_literal() {
        let bmr = calc_bmr(70.0, 170.0, 30.0, Sex::Female);
        assert_eq!(bmr, 700.0 + 1062.5 - 150.0 - 161.0);
    }

    #[test]
    fn test_bmr_sex_difference() {
        let male = calc_bmr(80.0, 180.0, 40.0, Sex::Male);
        let female = calc_bmr(80.0, 180.0, 40.0, Sex::Female);
        assert_eq!(male - female, 166.0);
    }

    #[test]
    fn test_tdee_sedentary() {
        let tdee = calc_tdee(2040.0, ActivityLevel::Sedentary.into());
        assert!((tdee - 2448.0).abs() < 1e-9);
    }

    #[test]
    fn test_steady_state_literal() {
        // (2100 / 1.2 - (6.25 * 195.58 - 5 * 43 + 5)) / 10
        let ssw = steady_state_weight(2100.0, ActivityLevel::Sedentary.into(), 195.58, Sex::Male, 43.0);
        assert!((ssw - 73.7625).abs() < 1e-9);
    }

    #[test]
    fn test_wt_change_sign() {
        assert!(wt_change_kg(2500.0, 2000.0) < 0.0);
        assert!((wt_change_kg(2000.0, 2770.0) - 0.1).abs() < 1e-12);
        assert_eq!(wt_change_kg(2000.0, 2000.0), 0.0);
    }

    proptest! {
        #[test]
        fn test_steady_state_is_fixed_point(
            calories in 1200.0f64..4500.0,
            multiplier in 1.1f64..2.0,
            cm in 140.0f64..210.0,
            age in 18.0f64..80.0,
            female in any::<bool>(),
        ) {
            let sex = if female { Sex::Female } else { Sex::Male };
            let activity = ActivityFactor::new(multiplier).unwrap();

            let ssw = steady_state_weight(calories, activity, cm, sex, age);
            let tdee = calc_tdee(calc_bmr(ssw, cm, age, sex), activity);

            prop_assert!((tdee - calories).abs() < 1e-6);
        }
    }
}
