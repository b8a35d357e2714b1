//! The check catalog: eight suites over one loaded [`Dataset`].
//!
//! Every suite is a pure function of the dataset. The only exception is the
//! join-date check, which compares against the wall clock.

use enjoy_state::Dataset;

use crate::registry::Registry;

pub mod achievements;
pub mod bounties;
pub mod integrity;
pub mod karma;
pub mod level_config;
pub mod levels;
pub mod players;
pub mod time_system;

#[cfg(test)]
pub(crate) mod fixtures;

/// Level count the game ships with.
pub const LEVEL_COUNT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteKind {
    Karma,
    Levels,
    Players,
    TimeSystem,
    Achievements,
    Bounties,
    LevelConfig,
    Integrity,
}

impl SuiteKind {
    /// Run order.
    pub const ALL: [Self; 8] = [
        Self::Karma,
        Self::Levels,
        Self::Players,
        Self::TimeSystem,
        Self::Achievements,
        Self::Bounties,
        Self::LevelConfig,
        Self::Integrity,
    ];

    /// Short key accepted by `--suites`.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Karma => "karma",
            Self::Levels => "levels",
            Self::Players => "players",
            Self::TimeSystem => "time",
            Self::Achievements => "achievements",
            Self::Bounties => "bounties",
            Self::LevelConfig => "level-config",
            Self::Integrity => "integrity",
        }
    }

    /// Suite name as shown in the console and the report.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Karma => "Karma System",
            Self::Levels => "Level System",
            Self::Players => "Player System",
            Self::TimeSystem => "Time System",
            Self::Achievements => "Achievements",
            Self::Bounties => "Bounties",
            Self::LevelConfig => "Level Config",
            Self::Integrity => "Data Integrity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn register<'a>(self, registry: &mut Registry<'a>, data: &'a Dataset) {
        match self {
            Self::Karma => karma::register(registry, data),
            Self::Levels => levels::register(registry, data),
            Self::Players => players::register(registry, data),
            Self::TimeSystem => time_system::register(registry, data),
            Self::Achievements => achievements::register(registry, data),
            Self::Bounties => bounties::register(registry, data),
            Self::LevelConfig => level_config::register(registry, data),
            Self::Integrity => integrity::register(registry, data),
        }
    }

    /// Run this suite alone against `data`.
    #[cfg(test)]
    pub fn run(self, data: &Dataset) -> crate::registry::SuiteResult {
        let mut registry = Registry::new();
        self.register(&mut registry, data);
        registry
            .run(false)
            .into_iter()
            .next()
            .unwrap_or_else(|| crate::registry::SuiteResult {
                name: self.name().to_string(),
                tests: Vec::new(),
            })
    }
}

pub fn list_suites() -> Vec<(&'static str, &'static str)> {
    SuiteKind::ALL
        .into_iter()
        .map(|kind| (kind.key(), kind.name()))
        .collect()
}

/// Resolve `--suites` tokens. `all` expands to every suite; unknown keys are
/// returned separately so the caller can warn about them.
pub fn resolve_suites(tokens: &[String]) -> (Vec<SuiteKind>, Vec<String>) {
    let mut selected = Vec::new();
    let mut unknown = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("all") {
            selected.extend(SuiteKind::ALL);
        } else if let Some(kind) = SuiteKind::from_key(token) {
            selected.push(kind);
        } else {
            unknown.push(token.clone());
        }
    }
    // Catalog order regardless of the order given on the command line.
    let selected = SuiteKind::ALL
        .into_iter()
        .filter(|kind| selected.contains(kind))
        .collect();
    (selected, unknown)
}

pub fn register_suites<'a>(registry: &mut Registry<'a>, data: &'a Dataset, suites: &[SuiteKind]) {
    for kind in suites {
        kind.register(registry, data);
    }
}
