use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DietError;
use crate::units::{slice_to_lbs, to_cm};

/// Biological sex, selecting the Mifflin-St Jeor constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = DietError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(DietError::InvalidArgument(format!(
                "sex: m|f only, got '{}'",
                s
            ))),
        }
    }
}

/// Named activity levels with their fixed TDEE multipliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    #[serde(rename = "very")]
    VeryActive,
    #[serde(rename = "extra")]
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Short label used in tables and legends
    pub fn short_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "SED",
            ActivityLevel::Light => "LIGHT",
            ActivityLevel::Moderate => "MOD",
            ActivityLevel::VeryActive => "VERY",
            ActivityLevel::ExtraActive => "EXTRA",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityLevel::Sedentary => write!(f, "Sedentary"),
            ActivityLevel::Light => write!(f, "Light"),
            ActivityLevel::Moderate => write!(f, "Moderate"),
            ActivityLevel::VeryActive => write!(f, "Very active"),
            ActivityLevel::ExtraActive => write!(f, "Extra active"),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = DietError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" | "sed" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" | "mod" => Ok(ActivityLevel::Moderate),
            "very" | "very_active" | "very-active" => Ok(ActivityLevel::VeryActive),
            "extra" | "extra_active" | "extra-active" => Ok(ActivityLevel::ExtraActive),
            _ => Err(DietError::InvalidArgument(format!(
                "activity: sedentary|light|moderate|very|extra, got '{}'",
                s
            ))),
        }
    }
}

/// Validated activity multiplier: a named level or any positive finite real
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ActivityFactor(f64);

impl ActivityFactor {
    pub fn new(multiplier: f64) -> Result<Self, DietError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(DietError::InvalidArgument(format!(
                "activity multiplier must be positive, got {}",
                multiplier
            )));
        }
        Ok(ActivityFactor(multiplier))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<ActivityLevel> for ActivityFactor {
    fn from(level: ActivityLevel) -> Self {
        ActivityFactor(level.multiplier())
    }
}

impl TryFrom<f64> for ActivityFactor {
    type Error = DietError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        ActivityFactor::new(value)
    }
}

impl From<ActivityFactor> for f64 {
    fn from(factor: ActivityFactor) -> Self {
        factor.0
    }
}

impl fmt::Display for ActivityFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActivityFactor {
    type Err = DietError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(value) => ActivityFactor::new(value),
            Err(_) => s.parse::<ActivityLevel>().map(ActivityFactor::from),
        }
    }
}

/// Body measurements that parameterize the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProfile {
    /// Height in centimeters
    pub height_cm: f64,

    /// Age in years
    pub age_years: f64,

    pub sex: Sex,
}

impl BodyProfile {
    pub fn new(height_cm: f64, age_years: f64, sex: Sex) -> Self {
        BodyProfile {
            height_cm,
            age_years,
            sex,
        }
    }

    /// 77 in (195.58 cm), 43 years, male: the profile the scenario suite is built around
    pub fn reference() -> Self {
        BodyProfile::new(to_cm(77.0), 43.0, Sex::Male)
    }
}

/// Which model produced a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryModel {
    /// Day-by-day simulation with BMR recomputed from the current mass
    Discrete,
    /// Exponential approach to steady-state weight
    ClosedForm,
}

impl fmt::Display for TrajectoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryModel::Discrete => write!(f, "discrete"),
            TrajectoryModel::ClosedForm => write!(f, "closed-form"),
        }
    }
}

/// Day-indexed body mass sequence; element `i` is the mass on day `i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTrajectory {
    pub model: TrajectoryModel,
    pub weights_kg: Vec<f64>,
}

impl WeightTrajectory {
    pub fn new(model: TrajectoryModel, weights_kg: Vec<f64>) -> Self {
        WeightTrajectory { model, weights_kg }
    }

    pub fn len(&self) -> usize {
        self.weights_kg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights_kg.is_empty()
    }

    /// Day offsets `0..len` as chart x values
    pub fn days(&self) -> Vec<f64> {
        (0..self.weights_kg.len()).map(|d| d as f64).collect()
    }

    pub fn weights_lbs(&self) -> Vec<f64> {
        slice_to_lbs(&self.weights_kg)
    }

    pub fn initial_kg(&self) -> Option<f64> {
        self.weights_kg.first().copied()
    }

    pub fn final_kg(&self) -> Option<f64> {
        self.weights_kg.last().copied()
    }

    /// `(day, kg)` pairs for every `step`-th day, starting at day 0
    pub fn sample_every(&self, step: usize) -> Vec<(f64, f64)> {
        self.weights_kg
            .iter()
            .enumerate()
            .step_by(step.max(1))
            .map(|(day, &kg)| (day as f64, kg))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_parsing() {
        assert_eq!("m".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert!(matches!(
            "x".parse::<Sex>(),
            Err(DietError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_activity_multipliers() {
        let multipliers: Vec<f64> = ActivityLevel::ALL.iter().map(|a| a.multiplier()).collect();
        assert_eq!(multipliers, vec![1.2, 1.375, 1.55, 1.725, 1.9]);
    }

    #[test]
    fn test_activity_level_serialization() {
        let json = serde_json::to_string(&ActivityLevel::VeryActive).unwrap();
        assert_eq!(json, "\"very\"");

        let level: ActivityLevel = serde_json::from_str("\"sedentary\"").unwrap();
        assert_eq!(level, ActivityLevel::Sedentary);
    }

    #[test]
    fn test_activity_factor_parsing() {
        assert_eq!("light".parse::<ActivityFactor>().unwrap().value(), 1.375);
        assert_eq!("1.45".parse::<ActivityFactor>().unwrap().value(), 1.45);
        assert!("0".parse::<ActivityFactor>().is_err());
        assert!("-1.2".parse::<ActivityFactor>().is_err());
        assert!("couch".parse::<ActivityFactor>().is_err());
        assert!(ActivityFactor::new(f64::NAN).is_err());
    }

    #[test]
    fn test_reference_profile() {
        let profile = BodyProfile::reference();
        assert!((profile.height_cm - 195.58).abs() < 1e-9);
        assert_eq!(profile.age_years, 43.0);
        assert_eq!(profile.sex, Sex::Male);
    }

    #[test]
    fn test_trajectory_sampling() {
        let trajectory = WeightTrajectory::new(
            TrajectoryModel::ClosedForm,
            (0..100).map(|d| 100.0 - d as f64 * 0.1).collect(),
        );

        let samples = trajectory.sample_every(30);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[1].0, 30.0);
        assert!((samples[1].1 - 97.0).abs() < 1e-9);

        assert_eq!(trajectory.days().len(), 100);
        assert_eq!(trajectory.initial_kg(), Some(100.0));
        assert!(WeightTrajectory::new(TrajectoryModel::Discrete, Vec::new()).final_kg().is_none());
    }
}
