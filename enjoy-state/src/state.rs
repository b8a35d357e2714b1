use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;

/// Score counters for the whole project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub total: f64,
    pub today: f64,
    pub streak_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockProgress {
    pub score: f64,
    pub prs: i64,
}

/// Threshold for the next level to unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextUnlock {
    pub level_id: i64,
    pub requires_score: f64,
    pub requires_prs: i64,
    pub progress: UnlockProgress,
}

impl NextUnlock {
    #[must_use]
    pub fn score_needed(&self) -> f64 {
        self.requires_score - self.progress.score
    }

    #[must_use]
    pub const fn prs_needed(&self) -> i64 {
        self.requires_prs - self.progress.prs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub current: i64,
    pub max_level: i64,
    pub unlocked: Vec<i64>,
    pub next_unlock: NextUnlock,
    /// Level number (as written in the document) to milestone note.
    #[serde(default)]
    pub milestones: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KarmaPool {
    pub global: f64,
    pub multiplier_active: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub karma: f64,
    pub prs: i64,
    pub streak: i64,
    #[serde(default)]
    pub achievements: Vec<String>,
    pub joined: String,
    #[serde(default)]
    pub last_contribution: Option<String>,
}

/// Denormalized aggregates; expected to equal the sums over `players`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub total_prs: i64,
    pub total_players: i64,
}

/// A bounty entry. `id`, `title` and `karma` stay optional so the bounty
/// checks can report a missing field instead of the loader rejecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounty {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub karma: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Bounty {
    /// Identifier used in messages; `<missing id>` when absent.
    #[must_use]
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<missing id>")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounties {
    #[serde(default)]
    pub active: Vec<Bounty>,
    #[serde(default)]
    pub completed: Vec<Bounty>,
}

impl Bounties {
    /// Active bounties followed by completed ones.
    pub fn all(&self) -> impl Iterator<Item = &Bounty> {
        self.active.iter().chain(self.completed.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievements {
    #[serde(default)]
    pub unlocked_global: Option<Vec<String>>,
    #[serde(default)]
    pub players: BTreeMap<String, Vec<String>>,
}

impl Achievements {
    /// Global list, empty when the document omits it.
    #[must_use]
    pub fn global(&self) -> &[String] {
        self.unlocked_global.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_unlocked(&self, achievement: &str) -> bool {
        self.global().iter().any(|a| a == achievement)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total_prs: i64,
    pub total_karma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSystem {
    pub current_period: String,
    #[serde(default)]
    pub stats: BTreeMap<String, PeriodStats>,
}

/// The whole `state.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub score: Score,
    pub levels: LevelProgress,
    pub karma: KarmaPool,
    pub players: BTreeMap<String, Player>,
    pub meta: Meta,
    pub bounties: Bounties,
    pub achievements: Achievements,
    pub time_system: TimeSystem,
}

impl StateSnapshot {
    /// Parse a state document held in memory.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or for a document
    /// missing a required section or field.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn player_karma_total(&self) -> f64 {
        self.players.values().map(|p| p.karma).sum()
    }

    #[must_use]
    pub fn player_pr_total(&self) -> i64 {
        self.players.values().map(|p| p.prs).sum()
    }
}

/// Read and parse the state document at `path`.
///
/// # Errors
///
/// [`LoadError::Io`] if the file cannot be read, [`LoadError::Json`] if it
/// does not match the state shape.
pub fn load_state(path: &Path) -> Result<StateSnapshot, LoadError> {
    log::debug!("reading state document {}", path.display());
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::io(path, source))?;
    let state = StateSnapshot::from_json(&raw).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "loaded state {} with {} players",
        path.display(),
        state.players.len()
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "version": "1.2.3",
        "last_updated": "2025-01-01T00:00:00Z",
        "score": { "total": 15.5, "today": 3, "streak_days": 2 },
        "levels": {
            "current": 2,
            "max_level": 100,
            "unlocked": [1, 2],
            "next_unlock": {
                "level_id": 3,
                "requires_score": 50,
                "requires_prs": 5,
                "progress": { "score": 15.5, "prs": 3 }
            },
            "milestones": { "10": "First ten", "100": "The end" }
        },
        "karma": { "global": 15.5, "multiplier_active": 1.25 },
        "players": {
            "bob": { "karma": 5.5, "prs": 1, "streak": 0, "achievements": [], "joined": "2025-01-01" },
            "alice": {
                "karma": 10, "prs": 2, "streak": 1,
                "achievements": ["first_blood"],
                "joined": "2024-12-31T10:00:00Z",
                "last_contribution": "2025-01-01T00:00:00Z"
            }
        },
        "meta": { "total_prs": 3, "total_players": 2 },
        "bounties": {
            "active": [{ "id": "B1", "title": "Docs", "karma": 25, "difficulty": "easy" }],
            "completed": [{ "id": "B0", "title": "Logo" }]
        },
        "achievements": {
            "unlocked_global": ["first_blood"],
            "players": { "alice": ["first_blood"] }
        },
        "time_system": {
            "current_period": "noon",
            "stats": { "noon": { "total_prs": 3, "total_karma": 15.5 } }
        }
    }"#;

    #[test]
    fn parses_a_full_document() {
        let state = StateSnapshot::from_json(MINIMAL).unwrap();
        assert_eq!(state.version.as_deref(), Some("1.2.3"));
        assert_eq!(state.levels.unlocked, vec![1, 2]);
        assert_eq!(state.levels.milestones.len(), 2);
        assert_eq!(state.players.len(), 2);
        assert!((state.player_karma_total() - 15.5).abs() < f64::EPSILON);
        assert_eq!(state.player_pr_total(), 3);
        assert!(state.achievements.is_unlocked("first_blood"));
        assert_eq!(state.time_system.current_period, "noon");
    }

    #[test]
    fn players_iterate_in_name_order() {
        let state = StateSnapshot::from_json(MINIMAL).unwrap();
        let names: Vec<_> = state.players.keys().cloned().collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn bounty_keeps_unknown_fields_and_optional_karma() {
        let state = StateSnapshot::from_json(MINIMAL).unwrap();
        let active = &state.bounties.active[0];
        assert_eq!(active.extra.get("difficulty"), Some(&Value::from("easy")));
        let completed = &state.bounties.completed[0];
        assert_eq!(completed.karma, None);
        assert_eq!(state.bounties.all().count(), 2);
        assert_eq!(completed.label(), "B0");
    }

    #[test]
    fn next_unlock_reports_remaining_distance() {
        let state = StateSnapshot::from_json(MINIMAL).unwrap();
        let next = &state.levels.next_unlock;
        assert!((next.score_needed() - 34.5).abs() < f64::EPSILON);
        assert_eq!(next.prs_needed(), 2);
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let mut value: Value = serde_json::from_str(MINIMAL).unwrap();
        value.as_object_mut().unwrap().remove("meta");
        let err = StateSnapshot::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("meta"));
    }

    #[test]
    fn mistyped_field_is_a_parse_error() {
        let broken = MINIMAL.replace(r#""prs": 1,"#, r#""prs": "one","#);
        assert!(StateSnapshot::from_json(&broken).is_err());
    }

    #[test]
    fn optional_stamps_and_global_list_may_be_absent() {
        let mut value: Value = serde_json::from_str(MINIMAL).unwrap();
        let root = value.as_object_mut().unwrap();
        root.remove("version");
        root.remove("last_updated");
        root["achievements"]
            .as_object_mut()
            .unwrap()
            .remove("unlocked_global");
        let state = StateSnapshot::from_json(&value.to_string()).unwrap();
        assert!(state.version.is_none());
        assert!(state.achievements.unlocked_global.is_none());
        assert!(state.achievements.global().is_empty());
    }

    #[test]
    fn load_state_reports_missing_file_as_io() {
        let path = std::env::temp_dir().join("enjoy-state-does-not-exist.json");
        let err = load_state(&path).unwrap_err();
        assert!(!err.is_parse());
        assert_eq!(err.path(), path.as_path());
    }
}
