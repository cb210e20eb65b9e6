use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::Pattern;
use crate::consts::{DAYS_PER_YEAR, DEFAULT_MAX_AGE_YEARS};

/// Settings for minting synthetic identity numbers.
///
/// Ages are counted in 365-day years. If `min_age_years` exceeds
/// `max_age_years` every generated number is exactly `max_age_years` old.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Youngest age, inclusive
    pub min_age_years: u32,
    /// Oldest age, exclusive
    pub max_age_years: u32,
    /// Directives for the trailing four digits
    pub pattern: Pattern,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_age_years: 0,
            max_age_years: DEFAULT_MAX_AGE_YEARS,
            pattern: Pattern::RANDOM,
        }
    }
}

impl GeneratorConfig {
    /// Default age window with serial digits in the reserved safe range.
    pub const fn safe() -> Self {
        Self {
            min_age_years: 0,
            max_age_years: DEFAULT_MAX_AGE_YEARS,
            pattern: Pattern::SAFE_RANDOM,
        }
    }

    #[must_use]
    pub const fn with_ages(mut self, min_age_years: u32, max_age_years: u32) -> Self {
        self.min_age_years = min_age_years;
        self.max_age_years = max_age_years;
        self
    }

    #[must_use]
    pub const fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Returns the age window as `(oldest, youngest)` durations before now.
    pub fn age_window(&self) -> (TimeDelta, TimeDelta) {
        (years(self.max_age_years), years(self.min_age_years))
    }
}

fn years(n: u32) -> TimeDelta {
    TimeDelta::try_days(i64::from(n) * DAYS_PER_YEAR).unwrap_or(TimeDelta::MAX)
}
