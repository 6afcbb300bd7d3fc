//! Summary output for both commands
//!
//! Text output mirrors the layout researchers paste into manuscripts; JSON
//! output serializes the summary structs directly.

use crate::cli::OutputFormat;
use crate::error::{Result, VetoError};
use crate::simulation::SimulationSummary;
use crate::stress::StressSummary;
use serde::Serialize;
use std::fmt::Write as _;

const RULE: &str = "============================================================";

/// Stress-test summary as printed in text mode
pub fn format_stress_text(s: &StressSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "[Stress Test Result] Spurious tracklets (N={})",
        s.n_artifacts
    );
    let _ = writeln!(
        out,
        " - Uniform displacement range: [{}, {}] arcsec over {} days",
        s.disp_min, s.disp_max, s.baseline_days
    );
    let _ = writeln!(
        out,
        " - Filter window: {:.2} ~ {:.2} arcsec over {} days",
        s.window.limit_min, s.window.limit_max, s.baseline_days
    );
    let _ = writeln!(out, " - False positives (passed): {} objects", s.n_passed);
    let _ = writeln!(out, " - Pass fraction f_bg: {:.4}", s.f_bg);
    let _ = writeln!(
        out,
        " - Rejection rate: {:.4} ({:.2}%)",
        s.rejection_rate,
        s.rejection_rate * 100.0
    );
    let _ = writeln!(
        out,
        " - Expected f_bg (uniform pdf inside window): {:.4}",
        s.expected_f_bg
    );
    let _ = writeln!(out, "{RULE}");
    out
}

/// Baseline simulation summary as printed in text mode
pub fn format_simulation_text(s: &SimulationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Filter Window for {:.0} AU (+/- {:.0}): {:.2} ~ {:.2} arcsec",
        s.target_dist, s.shell_width, s.window.limit_min, s.window.limit_max
    );
    for p in &s.populations {
        let _ = writeln!(out, " - {}: {}/{} passed", p.kind, p.passed, p.n);
    }
    let _ = writeln!(out, "Recovery Rate: {:.2}%", s.recovery_rate * 100.0);
    let _ = writeln!(out, "Rejection Rate: {:.2}%", s.rejection_rate * 100.0);
    out
}

/// Serialize any summary as pretty JSON
pub fn format_json<T: Serialize>(summary: &T) -> Result<String> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| VetoError::invalid(format!("summary is not serializable: {e}")))
}

/// Render a stress summary in the requested format
pub fn render_stress(s: &StressSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_stress_text(s)),
        OutputFormat::Json => format_json(s),
    }
}

/// Render a simulation summary in the requested format
pub fn render_simulation(s: &SimulationSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_simulation_text(s)),
        OutputFormat::Json => format_json(s),
    }
}
