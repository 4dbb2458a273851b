// Library interface for dietrs modules
// The CLI in main.rs and the integration tests both build on these

pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod metabolic;
pub mod models;
pub mod scenarios;
pub mod trajectory;
pub mod units;

// Re-export commonly used types for convenience
pub use models::*;
pub use error::{DietError, Result};
pub use metabolic::{calc_bmr, calc_tdee, steady_state_weight, wt_change_kg, KCAL_PER_KG};
pub use trajectory::{
    predict_calories_to_reach, predict_days_to_weight, predict_weight, weight_at_day,
    weight_over_time,
};
pub use units::{to_cm, to_inches, to_kg, to_lbs, Units};
pub use chart::{Figure, SeriesColor, SeriesStyle};
pub use config::AppConfig;
pub use logging::{LogConfig, LogFormat, LogLevel};
