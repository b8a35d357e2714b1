use chrono::{DateTime, Duration, Utc};
use enjoy_state::{Dataset, StateSnapshot, parse_timestamp};

use super::SuiteKind;
use crate::assertions::{AssertResult, AssertionFailure, assert_equals, assert_less_than, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::Players.name();

/// Clock skew tolerated before a join date counts as "in the future".
const FUTURE_TOLERANCE_MS: i64 = 1000;

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let state = &data.state;
    registry.register(SUITE, "Total players matches meta count", move || {
        player_count_matches(state)
    });
    registry.register(SUITE, "Total PRs matches meta count", move || {
        pr_total_matches(state)
    });
    registry.register(SUITE, "All players have valid join dates", move || {
        join_dates_valid(state, Utc::now())
    });
    registry.register(SUITE, "All players have non-negative PRs", move || {
        prs_non_negative(state)
    });
    registry.register(SUITE, "Player achievements are in global list", move || {
        achievements_in_global(state)
    });
    registry.register(SUITE, "Streaks are non-negative", move || {
        streaks_non_negative(state)
    });
}

fn player_count_matches(state: &StateSnapshot) -> AssertResult {
    let actual = i64::try_from(state.players.len()).unwrap_or(i64::MAX);
    assert_equals(
        &actual,
        &state.meta.total_players,
        Some("Player count should match meta.total_players"),
    )
}

fn pr_total_matches(state: &StateSnapshot) -> AssertResult {
    assert_equals(
        &state.player_pr_total(),
        &state.meta.total_prs,
        Some("PR count should match meta.total_prs"),
    )
}

fn join_dates_valid(state: &StateSnapshot, now: DateTime<Utc>) -> AssertResult {
    let horizon = now + Duration::milliseconds(FUTURE_TOLERANCE_MS);
    for (name, player) in &state.players {
        let joined = parse_timestamp(&player.joined).ok_or_else(|| {
            AssertionFailure::new(format!(
                "Player {name} should have valid join date, got '{}'",
                player.joined
            ))
        })?;
        assert_less_than(
            joined,
            horizon,
            Some(&format!("Player {name} join date should not be in future")),
        )?;
    }
    Ok(())
}

fn prs_non_negative(state: &StateSnapshot) -> AssertResult {
    for (name, player) in &state.players {
        ensure(
            player.prs >= 0,
            format!("Player {name} should have prs >= 0, got {}", player.prs),
        )?;
    }
    Ok(())
}

fn achievements_in_global(state: &StateSnapshot) -> AssertResult {
    for (name, player) in &state.players {
        for achievement in &player.achievements {
            ensure(
                state.achievements.is_unlocked(achievement),
                format!("Player {name} achievement {achievement} should be in global list"),
            )?;
        }
    }
    Ok(())
}

fn streaks_non_negative(state: &StateSnapshot) -> AssertResult {
    for (name, player) in &state.players {
        ensure(
            player.streak >= 0,
            format!("Player {name} streak should be >= 0, got {}", player.streak),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::valid_dataset;

    #[test]
    fn single_player_scenario_passes() {
        let result = SuiteKind::Players.run(&valid_dataset());
        assert_eq!(result.passed(), 6);
    }

    #[test]
    fn unknown_achievement_fails_only_global_list_check() {
        let mut data = valid_dataset();
        data.state
            .players
            .get_mut("alice")
            .unwrap()
            .achievements
            .push("night_owl".to_string());
        let result = SuiteKind::Players.run(&data);
        assert_eq!(
            result.failures(),
            vec!["Player achievements are in global list"]
        );
        assert_eq!(
            result.tests[4].error.as_deref(),
            Some("Player alice achievement night_owl should be in global list")
        );
    }

    #[test]
    fn meta_mismatches_fail_their_checks() {
        let mut data = valid_dataset();
        data.state.meta.total_players = 2;
        data.state.meta.total_prs = 5;
        let result = SuiteKind::Players.run(&data);
        assert_eq!(
            result.failures(),
            vec!["Total players matches meta count", "Total PRs matches meta count"]
        );
        assert_eq!(
            result.tests[1].error.as_deref(),
            Some("PR count should match meta.total_prs (expected 5, got 2)")
        );
    }

    #[test]
    fn join_date_must_parse() {
        let mut data = valid_dataset();
        data.state.players.get_mut("alice").unwrap().joined = "someday".to_string();
        let result = SuiteKind::Players.run(&data);
        assert_eq!(result.failures(), vec!["All players have valid join dates"]);
    }

    #[test]
    fn join_date_in_future_fails_with_tolerance() {
        let data = valid_dataset();
        let now = parse_timestamp("2025-01-01T00:00:00Z").unwrap();
        assert!(join_dates_valid(&data.state, now).is_ok());

        let before_join = now - Duration::milliseconds(500);
        assert!(join_dates_valid(&data.state, before_join).is_ok());

        let well_before = now - Duration::seconds(5);
        let err = join_dates_valid(&data.state, well_before).unwrap_err();
        assert_eq!(err.message(), "Player alice join date should not be in future");
    }

    #[test]
    fn negative_counters_fail() {
        let mut data = valid_dataset();
        let alice = data.state.players.get_mut("alice").unwrap();
        alice.streak = -1;
        let result = SuiteKind::Players.run(&data);
        assert_eq!(result.failures(), vec!["Streaks are non-negative"]);

        let mut data = valid_dataset();
        data.state.players.get_mut("alice").unwrap().prs = -2;
        data.state.meta.total_prs = -2;
        let result = SuiteKind::Players.run(&data);
        assert_eq!(result.failures(), vec!["All players have non-negative PRs"]);
    }
}
