use enjoy_state::{Dataset, Period, StateSnapshot, VALID_MULTIPLIERS};

use super::SuiteKind;
use crate::assertions::{AssertResult, assert_equals, assert_in_range, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::Karma.name();

pub const MIN_MULTIPLIER: f64 = 1.0;
pub const MAX_MULTIPLIER: f64 = 3.0;

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let state = &data.state;
    registry.register(SUITE, "Global karma is non-negative", move || {
        global_karma_non_negative(state)
    });
    registry.register(SUITE, "All players have valid karma", move || {
        player_karma_non_negative(state)
    });
    registry.register(SUITE, "Total karma equals sum of player karma", move || {
        total_matches_players(state)
    });
    registry.register(SUITE, "Karma multiplier is in valid range", move || {
        multiplier_in_range(state)
    });
    registry.register(
        SUITE,
        "Time-based karma multipliers are valid",
        period_multipliers_valid,
    );
}

fn global_karma_non_negative(state: &StateSnapshot) -> AssertResult {
    let global = state.karma.global;
    ensure(
        global >= 0.0,
        format!("Global karma should be >= 0, got {global}"),
    )
}

fn player_karma_non_negative(state: &StateSnapshot) -> AssertResult {
    for (name, player) in &state.players {
        ensure(
            player.karma >= 0.0,
            format!("Player {name} should have karma >= 0, got {}", player.karma),
        )?;
    }
    Ok(())
}

fn total_matches_players(state: &StateSnapshot) -> AssertResult {
    assert_equals(
        &state.player_karma_total(),
        &state.score.total,
        Some("Total score should match sum of player karma"),
    )
}

fn multiplier_in_range(state: &StateSnapshot) -> AssertResult {
    let multiplier = state.karma.multiplier_active;
    assert_in_range(
        multiplier,
        MIN_MULTIPLIER,
        MAX_MULTIPLIER,
        Some(&format!(
            "Multiplier should be {MIN_MULTIPLIER}-{MAX_MULTIPLIER}, got {multiplier}"
        )),
    )
}

fn period_multipliers_valid() -> AssertResult {
    assert_equals(&Period::ALL.len(), &6, Some("Should have 6 time periods"))?;
    for period in Period::ALL {
        ensure(
            VALID_MULTIPLIERS.contains(&period.multiplier()),
            format!(
                "Period {period} multiplier {} is not one of {VALID_MULTIPLIERS:?}",
                period.multiplier()
            ),
        )?;
    }
    Ok(())
}
