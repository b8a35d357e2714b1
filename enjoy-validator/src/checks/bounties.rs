use std::collections::BTreeSet;

use enjoy_state::{Bounties, Dataset};

use super::SuiteKind;
use crate::assertions::{AssertResult, AssertionFailure, assert_equals, assert_greater_than, ensure};
use crate::registry::Registry;

const SUITE: &str = SuiteKind::Bounties.name();

pub fn register<'a>(registry: &mut Registry<'a>, data: &'a Dataset) {
    let bounties = &data.state.bounties;
    registry.register(SUITE, "Active bounties have required fields", move || {
        active_fields_present(bounties)
    });
    registry.register(SUITE, "Completed bounties are not in active", move || {
        completed_not_active(bounties)
    });
    registry.register(SUITE, "No duplicate bounty IDs", move || {
        unique_ids(bounties)
    });
}

fn active_fields_present(bounties: &Bounties) -> AssertResult {
    for bounty in &bounties.active {
        let label = bounty.label();
        ensure(bounty.id.is_some(), "Bounty should have id")?;
        ensure(
            bounty.title.is_some(),
            format!("Bounty {label} should have title"),
        )?;
        let karma = bounty.karma.ok_or_else(|| {
            AssertionFailure::new(format!("Bounty {label} should have karma reward"))
        })?;
        assert_greater_than(
            karma,
            0.0,
            Some(&format!("Bounty {label} karma should be positive, got {karma}")),
        )?;
    }
    Ok(())
}

fn completed_not_active(bounties: &Bounties) -> AssertResult {
    let active: BTreeSet<Option<&str>> = bounties
        .active
        .iter()
        .map(|b| b.id.as_deref())
        .collect();
    for bounty in &bounties.completed {
        ensure(
            !active.contains(&bounty.id.as_deref()),
            format!("Completed bounty {} should not be active", bounty.label()),
        )?;
    }
    Ok(())
}

/// Bounties without an id all share the same missing key.
fn unique_ids(bounties: &Bounties) -> AssertResult {
    let ids: Vec<Option<&str>> = bounties.all().map(|b| b.id.as_deref()).collect();
    let unique: BTreeSet<Option<&str>> = ids.iter().copied().collect();
    assert_equals(
        &unique.len(),
        &ids.len(),
        Some("All bounty IDs should be unique"),
    )
}
