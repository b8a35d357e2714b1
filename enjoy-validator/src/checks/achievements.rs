use enjoy_state::{Dataset, StateSnapshot};

use super::SuiteKind;
use crate::assertions::{AssertResult, assert_deep_equals, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::Achievements.name();

/// Awarded for the first merged PR; every populated state has it.
pub const FIRST_ACHIEVEMENT: &str = "first_blood";

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let state = &data.state;
    registry.register(SUITE, "Global achievements array exists", move || {
        global_list_exists(state)
    });
    registry.register(SUITE, "Player achievements match global tracking", move || {
        player_lists_match(state)
    });
    registry.register(
        SUITE,
        "First blood achievement exists if players exist",
        move || first_achievement_unlocked(state),
    );
}

fn global_list_exists(state: &StateSnapshot) -> AssertResult {
    ensure(
        state.achievements.unlocked_global.is_some(),
        "unlocked_global should be array",
    )
}

fn sorted(list: &[String]) -> Vec<&str> {
    let mut items: Vec<&str> = list.iter().map(String::as_str).collect();
    items.sort_unstable();
    items
}

fn player_lists_match(state: &StateSnapshot) -> AssertResult {
    for (name, tracked) in &state.achievements.players {
        let player = state.players.get(name);
        ensure(
            player.is_some(),
            format!("Achievement player {name} should exist in players"),
        )?;
        if let Some(player) = player {
            assert_deep_equals(
                &sorted(&player.achievements),
                &sorted(tracked),
                Some(&format!("Player {name} achievements should match")),
            )?;
        }
    }
    Ok(())
}

fn first_achievement_unlocked(state: &StateSnapshot) -> AssertResult {
    if state.players.is_empty() {
        return Ok(());
    }
    ensure(
        state.achievements.is_unlocked(FIRST_ACHIEVEMENT),
        format!("{FIRST_ACHIEVEMENT} should be unlocked"),
    )
}
