use std::collections::BTreeSet;

use enjoy_state::{Dataset, LevelDefinition};

use super::SuiteKind;
use crate::assertions::{AssertResult, AssertionFailure, assert_greater_than, assert_less_than, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::LevelConfig.name();

pub const MIN_PHASES: usize = 3;

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    registry.register(SUITE, "All levels have required fields", move || {
        required_fields(&data.levels)
    });
    registry.register(SUITE, "Phases progress correctly", move || {
        distinct_phases(&data.levels)
    });
    registry.register(SUITE, "Level 1 has easy requirements", move || {
        first_level_is_easy(data)
    });
    registry.register(SUITE, "Level 100 has special significance", move || {
        last_level_is_significant(data)
    });
}

fn required_fields(levels: &[LevelDefinition]) -> AssertResult {
    for level in levels {
        let number = level.level;
        ensure(
            level.name.is_some(),
            format!("Level {number} should have name"),
        )?;
        ensure(
            level.phase.is_some(),
            format!("Level {number} should have phase"),
        )?;
        ensure(
            level.karma.is_some(),
            format!("Level {number} should have karma config"),
        )?;
    }
    Ok(())
}

fn distinct_phases(levels: &[LevelDefinition]) -> AssertResult {
    let phases: BTreeSet<&str> = levels.iter().filter_map(|l| l.phase.as_deref()).collect();
    ensure(
        phases.len() >= MIN_PHASES,
        format!(
            "Should have at least {MIN_PHASES} unique phases, found {}",
            phases.len()
        ),
    )
}

fn base_of(data: &Dataset, number: i64) -> Result<f64, AssertionFailure> {
    let level = data
        .level(number)
        .ok_or_else(|| AssertionFailure::new(format!("Level {number} should exist")))?;
    level.base_karma().ok_or_else(|| {
        AssertionFailure::new(format!("Level {number} should have karma config"))
    })
}

fn first_level_is_easy(data: &Dataset) -> AssertResult {
    let base = base_of(data, 1)?;
    assert_less_than(
        base,
        50.0,
        Some(&format!("Level 1 karma should be < 50, got {base}")),
    )
}

fn last_level_is_significant(data: &Dataset) -> AssertResult {
    let base = base_of(data, 100)?;
    assert_greater_than(
        base,
        100.0,
        Some(&format!("Level 100 karma should be > 100, got {base}")),
    )
}
