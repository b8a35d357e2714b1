use std::sync::OnceLock;

use enjoy_state::{Dataset, StateSnapshot, parse_timestamp};
use regex::Regex;

use super::SuiteKind;
use crate::assertions::{AssertResult, AssertionFailure, assert_equals, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::Integrity.name();

fn version_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").ok())
        .as_ref()
}

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let state = &data.state;
    registry.register(SUITE, "Version string exists", move || version_valid(state));
    registry.register(SUITE, "Last updated is valid ISO date", move || {
        last_updated_valid(state)
    });
    registry.register(SUITE, "No orphaned achievements", move || {
        no_orphaned_achievements(state)
    });
    registry.register(SUITE, "Score breakdown is consistent", move || {
        score_consistent(state)
    });
}

fn version_valid(state: &StateSnapshot) -> AssertResult {
    let version = state
        .version
        .as_deref()
        .ok_or_else(|| AssertionFailure::new("Version should exist"))?;
    let pattern = version_pattern()
        .ok_or_else(|| AssertionFailure::new("version pattern failed to compile"))?;
    ensure(
        pattern.is_match(version),
        format!("Version should be semver format, got '{version}'"),
    )
}

fn last_updated_valid(state: &StateSnapshot) -> AssertResult {
    let raw = state.last_updated.as_deref().unwrap_or_default();
    ensure(
        parse_timestamp(raw).is_some(),
        format!("last_updated should be valid date, got '{raw}'"),
    )
}

fn no_orphaned_achievements(state: &StateSnapshot) -> AssertResult {
    for achievement in state.achievements.global() {
        let owned = state
            .achievements
            .players
            .values()
            .any(|list| list.contains(achievement));
        ensure(
            owned,
            format!("Achievement {achievement} should belong to at least one player"),
        )?;
    }
    Ok(())
}

fn score_consistent(state: &StateSnapshot) -> AssertResult {
    assert_equals(
        &(state.score.total >= state.score.today),
        &true,
        Some(&format!(
            "total score >= today score (total {}, today {})",
            state.score.total, state.score.today
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::valid_dataset;

    #[test]
    fn valid_integrity_passes() {
        assert!(SuiteKind::Integrity.run(&valid_dataset()).all_passed());
    }

    #[test]
    fn version_must_be_three_numeric_parts() {
        let mut data = valid_dataset();
        for bad in ["1.0", "v1.0.0", "1.0.0-beta", "1.a.0"] {
            data.state.version = Some(bad.to_string());
            let result = SuiteKind::Integrity.run(&data);
            assert_eq!(result.failures(), vec!["Version string exists"], "{bad}");
        }
        data.state.version = Some("12.0.345".to_string());
        assert!(SuiteKind::Integrity.run(&data).all_passed());

        data.state.version = None;
        let result = SuiteKind::Integrity.run(&data);
        assert_eq!(
            result.tests[0].error.as_deref(),
            Some("Version should exist")
        );
    }

    #[test]
    fn last_updated_must_parse() {
        let mut data = valid_dataset();
        data.state.last_updated = Some("not a date".to_string());
        let result = SuiteKind::Integrity.run(&data);
        assert_eq!(result.failures(), vec!["Last updated is valid ISO date"]);

        data.state.last_updated = None;
        let result = SuiteKind::Integrity.run(&data);
        assert_eq!(result.failures(), vec!["Last updated is valid ISO date"]);
    }

    #[test]
    fn orphaned_global_achievement_fails() {
        let mut data = valid_dataset();
        if let Some(global) = data.state.achievements.unlocked_global.as_mut() {
            global.push("night_owl".to_string());
        }
        let result = SuiteKind::Integrity.run(&data);
        assert_eq!(
            result.tests[2].error.as_deref(),
            Some("Achievement night_owl should belong to at least one player")
        );
    }

    #[test]
    fn today_above_total_fails() {
        let mut data = valid_dataset();
        data.state.score.today = 12.0;
        let result = SuiteKind::Integrity.run(&data);
        assert_eq!(result.failures(), vec!["Score breakdown is consistent"]);
        assert_eq!(
            result.tests[3].error.as_deref(),
            Some("total score >= today score (total 10, today 12) (expected true, got false)")
        );
    }
}
