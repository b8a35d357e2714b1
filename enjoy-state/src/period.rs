//! Time-of-day periods. Contributions are bucketed into one of six periods
//! and each period applies its own karma multiplier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multipliers a period is allowed to carry.
pub const VALID_MULTIPLIERS: [f64; 6] = [1.15, 1.2, 1.25, 1.3, 1.4, 1.5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Dawn,
    Morning,
    Noon,
    Afternoon,
    Sunset,
    Night,
}

impl Period {
    pub const ALL: [Self; 6] = [
        Self::Dawn,
        Self::Morning,
        Self::Noon,
        Self::Afternoon,
        Self::Sunset,
        Self::Night,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dawn => "dawn",
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Afternoon => "afternoon",
            Self::Sunset => "sunset",
            Self::Night => "night",
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Dawn => 1.15,
            Self::Morning => 1.2,
            Self::Noon => 1.25,
            Self::Afternoon => 1.3,
            Self::Sunset => 1.4,
            Self::Night => 1.5,
        }
    }

    /// Comma-separated list of every period key, for messages.
    #[must_use]
    pub fn key_list() -> String {
        Self::ALL.map(Self::key).join(",")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time period '{0}'")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|period| period.key() == s)
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}
