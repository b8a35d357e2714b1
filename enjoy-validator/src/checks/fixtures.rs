use std::collections::BTreeMap;

use enjoy_state::{Dataset, LevelDefinition, LevelKarma, StateSnapshot};
use serde_json::json;

pub const PHASES: [&str; 5] = ["Foundation", "Awakening", "Growth", "Mastery", "Transcendence"];

pub fn level(number: i64, name: &str, phase: &str, base: f64) -> LevelDefinition {
    LevelDefinition {
        level: number,
        name: Some(name.to_string()),
        phase: Some(phase.to_string()),
        karma: Some(LevelKarma {
            base,
            extra: BTreeMap::new(),
        }),
        rules: None,
        validation: None,
    }
}

/// Levels 1..=100, five phases of twenty, base karma `10 + 5n`.
pub fn valid_levels() -> Vec<LevelDefinition> {
    (1..=100_i64)
        .map(|n| {
            let phase = PHASES[usize::try_from((n - 1) / 20).unwrap_or(0)];
            #[allow(clippy::cast_precision_loss)]
            let base = 10.0 + 5.0 * n as f64;
            level(n, &format!("Level {n}"), phase, base)
        })
        .collect()
}

/// One player, alice, with 10 karma over 2 PRs.
pub fn valid_state() -> StateSnapshot {
    let value = json!({
        "version": "1.0.0",
        "last_updated": "2025-06-01T12:00:00Z",
        "score": { "total": 10, "today": 4, "streak_days": 1 },
        "levels": {
            "current": 3,
            "max_level": 100,
            "unlocked": [1, 2, 3],
            "next_unlock": {
                "level_id": 4,
                "requires_score": 100,
                "requires_prs": 5,
                "progress": { "score": 10, "prs": 2 }
            },
            "milestones": { "10": "First steps", "50": "Halfway", "100": "Enlightenment" }
        },
        "karma": { "global": 10, "multiplier_active": 1.2 },
        "players": {
            "alice": {
                "karma": 10,
                "prs": 2,
                "streak": 1,
                "achievements": ["first_blood"],
                "joined": "2025-01-01T00:00:00Z",
                "last_contribution": "2025-06-01T11:00:00Z"
            }
        },
        "meta": { "total_prs": 2, "total_players": 1 },
        "bounties": {
            "active": [{ "id": "B2", "title": "Write the docs", "karma": 50 }],
            "completed": [{ "id": "B1", "title": "Fix the build", "karma": 25 }]
        },
        "achievements": {
            "unlocked_global": ["first_blood"],
            "players": { "alice": ["first_blood"] }
        },
        "time_system": {
            "current_period": "morning",
            "stats": {
                "dawn": { "total_prs": 0, "total_karma": 0 },
                "morning": { "total_prs": 2, "total_karma": 10 },
                "noon": { "total_prs": 0, "total_karma": 0 },
                "afternoon": { "total_prs": 0, "total_karma": 0 },
                "sunset": { "total_prs": 0, "total_karma": 0 },
                "night": { "total_prs": 0, "total_karma": 0 }
            }
        }
    });
    serde_json::from_value(value).expect("fixture state is valid")
}

pub fn valid_dataset() -> Dataset {
    Dataset::new(valid_state(), valid_levels())
}
