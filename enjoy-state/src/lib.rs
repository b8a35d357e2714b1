//! ENJOY state model
//!
//! Typed view of the gamification state file (`state.json`) and of the
//! per-level definition files (`levels/*.yaml`), with loaders for both.
//! This crate only reads; nothing here writes back to the state file.

pub mod error;
pub mod levels;
pub mod period;
pub mod state;
pub mod timestamp;

pub use error::LoadError;
pub use levels::{LevelDefinition, LevelKarma, load_levels};
pub use period::{Period, UnknownPeriod, VALID_MULTIPLIERS};
pub use state::{
    Achievements, Bounties, Bounty, KarmaPool, LevelProgress, Meta, NextUnlock, PeriodStats,
    Player, Score, StateSnapshot, TimeSystem, UnlockProgress, load_state,
};
pub use timestamp::parse_timestamp;

/// Both inputs of a validation run, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub state: StateSnapshot,
    pub levels: Vec<LevelDefinition>,
}

impl Dataset {
    #[must_use]
    pub const fn new(state: StateSnapshot, levels: Vec<LevelDefinition>) -> Self {
        Self { state, levels }
    }

    /// Load `state_path` and every level file under `levels_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoadError`] hit by either loader.
    pub fn load(
        state_path: &std::path::Path,
        levels_dir: &std::path::Path,
    ) -> Result<Self, LoadError> {
        let state = load_state(state_path)?;
        let levels = load_levels(levels_dir)?;
        Ok(Self::new(state, levels))
    }

    /// Level definition with the given number, if loaded.
    #[must_use]
    pub fn level(&self, number: i64) -> Option<&LevelDefinition> {
        self.levels.iter().find(|level| level.level == number)
    }
}
