use enjoy_state::{Dataset, Period, StateSnapshot};

use super::SuiteKind;
use crate::assertions::{AssertResult, AssertionFailure, assert_less_than, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::TimeSystem.name();

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let state = &data.state;
    registry.register(SUITE, "Current period is valid", move || {
        current_period_valid(state)
    });
    registry.register(SUITE, "All 6 periods have stats", move || {
        every_period_has_stats(state)
    });
    registry.register(SUITE, "Period stats have non-negative values", move || {
        stats_non_negative(state)
    });
    registry.register(SUITE, "Total period PRs equals total PRs", move || {
        period_prs_match_total(state)
    });
}

fn current_period_valid(state: &StateSnapshot) -> AssertResult {
    let current = &state.time_system.current_period;
    current.parse::<Period>().map(|_| ()).map_err(|_| {
        AssertionFailure::new(format!(
            "Current period should be one of {}, got '{current}'",
            Period::key_list()
        ))
    })
}

fn every_period_has_stats(state: &StateSnapshot) -> AssertResult {
    for period in Period::ALL {
        ensure(
            state.time_system.stats.contains_key(period.key()),
            format!("Stats for {period} should exist"),
        )?;
    }
    Ok(())
}

fn stats_non_negative(state: &StateSnapshot) -> AssertResult {
    for (period, stats) in &state.time_system.stats {
        ensure(
            stats.total_prs >= 0,
            format!("{period} total_prs should be >= 0, got {}", stats.total_prs),
        )?;
        ensure(
            stats.total_karma >= 0.0,
            format!(
                "{period} total_karma should be >= 0, got {}",
                stats.total_karma
            ),
        )?;
    }
    Ok(())
}

/// PRs merged before period tracking existed are not bucketed, so the period
/// sum may undercount. The bound only rejects a gap larger than the total.
fn period_prs_match_total(state: &StateSnapshot) -> AssertResult {
    let period_total: i64 = state.time_system.stats.values().map(|s| s.total_prs).sum();
    let total = state.meta.total_prs;
    assert_less_than(
        (period_total - total).abs(),
        total + 1,
        Some(&format!(
            "Period PR total should approximately match total PRs (periods {period_total}, total {total})"
        )),
    )
}
