//! Formatted terminal output for the non-interactive `fetch` command.
//!
//! We keep formatting code in one place so output changes stay localized.

use crate::chart::ChartFrame;
use crate::domain::{DisplayMode, LoanRequest};

/// Summary header plus one row per reset date.
pub fn format_schedule(request: &LoanRequest, frame: &ChartFrame) -> String {
    let mut out = String::new();
    let fmt = value_formatter(frame.mode);

    out.push_str("=== loan-rates - Rate Schedule ===\n");
    out.push_str(&format!(
        "Reference: {} | Maturity: {}\n",
        request.reference_rate.display_name(),
        request.wire_maturity_date(),
    ));
    out.push_str(&format!(
        "Floor: {} | Ceiling: {} | Spread: {}\n",
        fmt(request.rate_floor * frame.mode.scale()),
        fmt(request.rate_ceiling * frame.mode.scale()),
        fmt(request.rate_spread * frame.mode.scale()),
    ));

    if frame.labels.is_empty() {
        out.push_str("\n(no rates returned)\n");
        return out;
    }

    out.push_str(&format!("\n{:<12} {:>12}\n", "date", frame.mode.unit_label()));
    for (date, value) in frame.labels.iter().zip(&frame.datasets.series) {
        let marker = bound_marker(*value, frame.datasets.floor_line[0], frame.datasets.ceiling_line[0]);
        out.push_str(&format!("{date:<12} {:>12}{marker}\n", fmt(*value)));
    }

    out
}

fn value_formatter(mode: DisplayMode) -> fn(f64) -> String {
    match mode {
        DisplayMode::Decimal => fmt_decimal,
        DisplayMode::Percentage => fmt_percent,
    }
}

fn fmt_decimal(v: f64) -> String {
    format!("{v:.6}")
}

fn fmt_percent(v: f64) -> String {
    format!("{v:.4}%")
}

/// Flags rows pinned at the floor or ceiling.
fn bound_marker(value: f64, floor: f64, ceiling: f64) -> &'static str {
    const EPS: f64 = 1e-12;
    if (value - ceiling).abs() <= EPS {
        "  (ceiling)"
    } else if (value - floor).abs() <= EPS {
        "  (floor)"
    } else {
        ""
    }
}
