use std::collections::BTreeSet;

use enjoy_state::{Dataset, LevelDefinition, StateSnapshot};

use super::{LEVEL_COUNT, SuiteKind};
use crate::assertions::{
    AssertResult, AssertionFailure, assert_equals, assert_greater_than, assert_in_range, ensure,
};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::Levels.name();

pub const MAX_BASE_KARMA: f64 = 1000.0;

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let state = &data.state;
    let levels = data.levels.as_slice();
    registry.register(SUITE, "Exactly 100 levels exist", move || {
        level_count(levels)
    });
    registry.register(SUITE, "Levels are numbered 1-100 consecutively", move || {
        numbered_consecutively(levels)
    });
    registry.register(SUITE, "All levels have valid base karma", move || {
        base_karma_in_range(levels)
    });
    registry.register(SUITE, "Current level is in valid range", move || {
        current_in_range(state)
    });
    registry.register(SUITE, "Unlocked levels include current level", move || {
        current_is_unlocked(state)
    });
    registry.register(SUITE, "Unlocked levels are contiguous from 1", move || {
        unlocked_contiguous(state)
    });
    registry.register(SUITE, "Max level is 100", move || max_level(state));
    registry.register(
        SUITE,
        "Next unlock requires more than current progress",
        move || next_unlock_ahead(state),
    );
    registry.register(SUITE, "All levels have unique names", move || {
        unique_names(levels)
    });
    registry.register(SUITE, "Milestones are at correct levels", move || {
        milestones_in_range(state)
    });
    registry.register(SUITE, "Karma scales with level", move || {
        karma_scales(levels)
    });
}

fn level_count(levels: &[LevelDefinition]) -> AssertResult {
    let actual = i64::try_from(levels.len()).unwrap_or(i64::MAX);
    assert_equals(
        &actual,
        &LEVEL_COUNT,
        Some("Should have exactly 100 levels"),
    )
}

fn numbered_consecutively(levels: &[LevelDefinition]) -> AssertResult {
    for expected in 1..=LEVEL_COUNT {
        let index = usize::try_from(expected - 1).unwrap_or(usize::MAX);
        let Some(level) = levels.get(index) else {
            return Err(AssertionFailure::new(format!(
                "Level {expected} should exist"
            )));
        };
        assert_equals(
            &level.level,
            &expected,
            Some(&format!("Level {expected} should exist")),
        )?;
    }
    Ok(())
}

fn base_karma_in_range(levels: &[LevelDefinition]) -> AssertResult {
    for level in levels {
        let number = level.level;
        let Some(base) = level.base_karma() else {
            return Err(AssertionFailure::new(format!(
                "Level {number} should have a base karma"
            )));
        };
        assert_greater_than(
            base,
            0.0,
            Some(&format!("Level {number} should have positive base karma")),
        )?;
        ensure(
            base <= MAX_BASE_KARMA,
            format!("Level {number} karma should be <= 1000, got {base}"),
        )?;
    }
    Ok(())
}

fn current_in_range(state: &StateSnapshot) -> AssertResult {
    assert_in_range(
        state.levels.current,
        1,
        LEVEL_COUNT,
        Some(&format!(
            "Current level should be 1-100, got {}",
            state.levels.current
        )),
    )
}

fn current_is_unlocked(state: &StateSnapshot) -> AssertResult {
    let current = state.levels.current;
    ensure(
        state.levels.unlocked.contains(&current),
        format!("Current level {current} should be unlocked"),
    )
}

fn unlocked_contiguous(state: &StateSnapshot) -> AssertResult {
    let mut sorted = state.levels.unlocked.clone();
    sorted.sort_unstable();
    for (expected, actual) in (1_i64..).zip(sorted) {
        ensure(
            actual == expected,
            format!("Unlocked levels should be contiguous: expected {expected}, got {actual}"),
        )?;
    }
    Ok(())
}

fn max_level(state: &StateSnapshot) -> AssertResult {
    assert_equals(
        &state.levels.max_level,
        &LEVEL_COUNT,
        Some("Max level should be 100"),
    )
}

fn next_unlock_ahead(state: &StateSnapshot) -> AssertResult {
    let fully_unlocked =
        i64::try_from(state.levels.unlocked.len()).unwrap_or(i64::MAX) >= LEVEL_COUNT;
    if fully_unlocked {
        return Ok(());
    }
    let next = &state.levels.next_unlock;
    ensure(
        next.score_needed() > 0.0 || next.prs_needed() > 0,
        format!(
            "Next level should require more progress (score {}/{}, PRs {}/{})",
            next.progress.score, next.requires_score, next.progress.prs, next.requires_prs
        ),
    )
}

fn unique_names(levels: &[LevelDefinition]) -> AssertResult {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for name in levels.iter().filter_map(|level| level.name.as_deref()) {
        if !seen.insert(name) {
            duplicates.insert(name);
        }
    }
    ensure(
        duplicates.is_empty(),
        format!("All level names should be unique, duplicated: {duplicates:?}"),
    )
}

fn milestones_in_range(state: &StateSnapshot) -> AssertResult {
    for key in state.levels.milestones.keys() {
        let message = format!("Milestone level {key} should be in range 1-100");
        let level = key
            .trim()
            .parse::<i64>()
            .map_err(|_| AssertionFailure::new(message.clone()))?;
        assert_in_range(level, 1, LEVEL_COUNT, Some(&message))?;
    }
    Ok(())
}

fn mean_base_karma(levels: &[LevelDefinition], range: std::ops::RangeInclusive<i64>) -> f64 {
    let bases: Vec<f64> = levels
        .iter()
        .filter(|level| range.contains(&level.level))
        .filter_map(LevelDefinition::base_karma)
        .collect();
    if bases.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = bases.len() as f64;
    bases.iter().sum::<f64>() / count
}

fn karma_scales(levels: &[LevelDefinition]) -> AssertResult {
    let low = mean_base_karma(levels, 1..=10);
    let high = mean_base_karma(levels, 91..=100);
    assert_greater_than(
        high,
        low,
        Some(&format!(
            "Higher levels should give more karma on average (levels 91-100: {high}, levels 1-10: {low})"
        )),
    )
}
