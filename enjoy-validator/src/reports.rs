use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::registry::{CheckResult, SuiteResult, duration_serde};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub tests: Vec<CheckResult>,
}

/// The persisted `test-report.json` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    #[serde(rename = "duration_ms", with = "duration_serde")]
    pub duration: Duration,
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    pub fn from_results(results: &[SuiteResult], timestamp: DateTime<Utc>) -> Self {
        let suites: Vec<SuiteReport> = results
            .iter()
            .map(|suite| SuiteReport {
                name: suite.name.clone(),
                passed: suite.passed(),
                failed: suite.failed(),
                tests: suite.tests.clone(),
            })
            .collect();
        let passed: usize = suites.iter().map(|s| s.passed).sum();
        let failed: usize = suites.iter().map(|s| s.failed).sum();
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_tests: passed + failed,
            passed,
            failed,
            duration: results.iter().map(SuiteResult::duration).sum(),
            suites,
        }
    }

    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

fn millis(duration: Duration) -> u128 {
    duration.as_millis()
}

pub fn generate_console_report(out: &mut dyn Write, report: &RunReport) -> std::io::Result<()> {
    for suite in &report.suites {
        let status = if suite.failed == 0 { "✅" } else { "❌" };
        let suite_time: Duration = suite.tests.iter().map(|t| t.time).sum();
        writeln!(
            out,
            "{status} {} ({}/{} passed, {}ms)",
            suite.name.bold(),
            suite.passed,
            suite.tests.len(),
            millis(suite_time)
        )?;
        for test in &suite.tests {
            if test.passed {
                writeln!(
                    out,
                    "   {} {} ({}ms)",
                    "✓".green(),
                    test.name,
                    millis(test.time)
                )?;
            } else {
                writeln!(out, "   {} {}", "✗".red(), test.name)?;
                let error = test.error.as_deref().unwrap_or("failed");
                writeln!(out, "     {}", format!("→ {error}").red())?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", "━".repeat(50).cyan())?;
    writeln!(out)?;
    if report.all_passed() {
        writeln!(out, "{}", "✅ ALL TESTS PASSED!".green().bold())?;
        writeln!(
            out,
            "{}",
            format!(
                "   {} tests in {}ms",
                report.passed,
                millis(report.duration)
            )
            .green()
        )?;
    } else {
        writeln!(out, "{}", "❌ SOME TESTS FAILED".red().bold())?;
        writeln!(out, "{}", format!("   Passed: {}", report.passed).green())?;
        writeln!(out, "{}", format!("   Failed: {}", report.failed).red())?;
        writeln!(out, "   Total time: {}ms", millis(report.duration))?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &RunReport) -> std::io::Result<()> {
    writeln!(out, "# ENJOY State Validation Results\n")?;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Generated**: {}", report.timestamp)?;
    writeln!(out, "- **Total checks**: {}", report.total_tests)?;
    writeln!(out, "- **Passed**: {}", report.passed)?;
    writeln!(out, "- **Failed**: {}", report.failed)?;
    writeln!(out, "- **Duration**: {}ms\n", millis(report.duration))?;

    writeln!(out, "## Suites\n")?;
    for suite in &report.suites {
        let status = if suite.failed == 0 { "✅" } else { "❌" };
        writeln!(
            out,
            "### {status} {} ({}/{})\n",
            suite.name,
            suite.passed,
            suite.tests.len()
        )?;
        for test in &suite.tests {
            if test.passed {
                writeln!(out, "- ✓ {}", test.name)?;
            } else {
                let error = test.error.as_deref().unwrap_or("failed");
                writeln!(out, "- ✗ {}: {error}", test.name)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).context("serializing report")?;
    writeln!(out)?;
    Ok(())
}

pub fn save_json_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut payload = Vec::new();
    generate_json_report(&mut payload, report)?;
    std::fs::write(path, payload).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote report to {}", path.display());
    Ok(())
}
