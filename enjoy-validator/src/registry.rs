//! Check registration and execution.
//!
//! A [`Registry`] is built once per run, filled by the suite catalog and then
//! executed sequentially. Suites keep registration order and so do the checks
//! inside them. A failing or panicking check is recorded and the run moves on.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Once;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::assertions::AssertResult;

type CheckFn<'a> = Box<dyn Fn() -> AssertResult + 'a>;

pub struct Check<'a> {
    name: String,
    body: CheckFn<'a>,
}

impl Check<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct Suite<'a> {
    name: String,
    checks: Vec<Check<'a>>,
}

impl<'a> Suite<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checks(&self) -> &[Check<'a>] {
        &self.checks
    }
}

#[derive(Default)]
pub struct Registry<'a> {
    suites: Vec<Suite<'a>>,
}

impl<'a> Registry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check under `suite`, creating the suite on first use.
    pub fn register(
        &mut self,
        suite: &str,
        name: impl Into<String>,
        body: impl Fn() -> AssertResult + 'a,
    ) {
        let check = Check {
            name: name.into(),
            body: Box::new(body),
        };
        if let Some(existing) = self.suites.iter_mut().find(|s| s.name == suite) {
            existing.checks.push(check);
        } else {
            self.suites.push(Suite {
                name: suite.to_string(),
                checks: vec![check],
            });
        }
    }

    pub fn suites(&self) -> &[Suite<'a>] {
        &self.suites
    }

    pub fn check_count(&self) -> usize {
        self.suites.iter().map(|suite| suite.checks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn run(&self, verbose: bool) -> Vec<SuiteResult> {
        install_quiet_panic_hook();
        self.suites
            .iter()
            .map(|suite| {
                if verbose {
                    println!("🧪 Running suite: {}", suite.name().bright_white());
                }
                SuiteResult {
                    name: suite.name().to_string(),
                    tests: suite
                        .checks()
                        .iter()
                        .map(|check| run_check(check, verbose))
                        .collect(),
                }
            })
            .collect()
    }
}

thread_local! {
    static IN_CHECK: Cell<bool> = const { Cell::new(false) };
}

/// Panics raised inside a check end up in the report, so the default hook's
/// stderr dump is suppressed for them. Other panics go to the previous hook.
fn install_quiet_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if IN_CHECK.with(Cell::get) {
                log::debug!("check panicked: {info}");
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "check panicked".to_string()
    }
}

fn run_check(check: &Check<'_>, verbose: bool) -> CheckResult {
    log::debug!("running check '{}'", check.name());
    let start = Instant::now();
    IN_CHECK.with(|flag| flag.set(true));
    let outcome = catch_unwind(AssertUnwindSafe(|| (check.body)()));
    IN_CHECK.with(|flag| flag.set(false));
    let time = start.elapsed();

    let error = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(failure)) => Some(failure.message().to_string()),
        Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
    };

    if verbose {
        match &error {
            None => println!("  ✅ {} ({time:?})", check.name()),
            Some(err) => println!("  ❌ {}: {}", check.name(), err.red()),
        }
    }

    CheckResult {
        name: check.name().to_string(),
        passed: error.is_none(),
        error,
        time,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "duration_serde")]
    pub time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteResult {
    pub name: String,
    pub tests: Vec<CheckResult>,
}

impl SuiteResult {
    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.tests.len() - self.passed()
    }

    pub fn duration(&self) -> Duration {
        self.tests.iter().map(|t| t.time).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.tests.iter().all(|t| t.passed)
    }

    #[cfg(test)]
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.tests.iter().find(|t| t.name == name)
    }

    /// Names of the checks that failed, in run order.
    pub fn failures(&self) -> Vec<&str> {
        self.tests
            .iter()
            .filter(|t| !t.passed)
            .map(|t| t.name.as_str())
            .collect()
    }
}

pub mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::{AssertionFailure, ensure};
    use std::cell::RefCell;

    #[test]
    fn suites_are_created_lazily_in_registration_order() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register("Beta", "first", || Ok(()));
        registry.register("Alpha", "second", || Ok(()));
        registry.register("Beta", "third", || Ok(()));

        let names: Vec<_> = registry.suites().iter().map(Suite::name).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        let beta: Vec<_> = registry.suites()[0].checks().iter().map(Check::name).collect();
        assert_eq!(beta, vec!["first", "third"]);
        assert_eq!(registry.check_count(), 3);
    }

    #[test]
    fn failures_are_recorded_and_later_checks_still_run() {
        let mut registry = Registry::new();
        registry.register("Suite", "fails", || ensure(false, "boom"));
        registry.register("Suite", "passes", || Ok(()));

        let results = registry.run(false);
        let suite = &results[0];
        assert_eq!(suite.passed(), 1);
        assert_eq!(suite.failed(), 1);
        assert_eq!(suite.check("fails").unwrap().error.as_deref(), Some("boom"));
        assert!(suite.check("passes").unwrap().error.is_none());
        assert_eq!(suite.failures(), vec!["fails"]);
    }

    #[test]
    fn panicking_check_becomes_a_failure() {
        let mut registry = Registry::new();
        registry.register("Suite", "explodes", || -> AssertResult {
            panic!("index out of bounds");
        });
        registry.register("Suite", "after", || Ok(()));

        let results = registry.run(false);
        let exploded = results[0].check("explodes").unwrap();
        assert!(!exploded.passed);
        assert_eq!(
            exploded.error.as_deref(),
            Some("panicked: index out of bounds")
        );
        assert!(results[0].check("after").unwrap().passed);
    }

    #[test]
    fn check_panics_are_routed_away_from_the_default_hook() {
        let mut registry = Registry::new();
        registry.register("Suite", "explodes", || -> AssertResult {
            panic!("quiet please");
        });
        let results = registry.run(false);
        assert_eq!(
            results[0].tests[0].error.as_deref(),
            Some("panicked: quiet please")
        );
        assert!(!IN_CHECK.with(Cell::get));

        // Panics outside a check still unwind normally.
        let outside = catch_unwind(|| -> AssertResult { panic!("outside") });
        assert!(outside.is_err());
        assert!(!IN_CHECK.with(Cell::get));
    }

    #[test]
    fn checks_run_in_registration_order() {
        let order = RefCell::new(Vec::new());
        let mut registry = Registry::new();
        for name in ["one", "two", "three"] {
            let order = &order;
            registry.register("Ordered", name, move || {
                order.borrow_mut().push(name);
                Ok(())
            });
        }
        registry.run(false);
        assert_eq!(*order.borrow(), vec!["one", "two", "three"]);
    }

    #[test]
    fn check_result_serializes_time_as_millis_and_skips_missing_error() {
        let result = CheckResult {
            name: "Max level is 100".to_string(),
            passed: true,
            error: None,
            time: Duration::from_millis(7),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["time"], 7);
        assert!(json.get("error").is_none());

        let failed = CheckResult {
            error: Some(AssertionFailure::new("nope").to_string()),
            passed: false,
            ..result
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["error"], "nope");
    }
}
