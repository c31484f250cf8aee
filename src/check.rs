//! License threshold evaluation.
//!
//! The decision core of the probe: pure functions that map subscribed SKUs
//! plus warning/critical thresholds onto a plugin status, message, and
//! perf-data. No I/O happens here.
//!
//! The threshold comparison is a literal chained bound,
//! `warning > value < critical`, evaluated through a fixed bucket order
//! (OK, then WARNING, then CRITICAL, then the fall-through). The buckets
//! are not mutually exclusive by construction; the first match wins.
//! Output is byte-stable: downstream monitoring parses the line.

use crate::graph::{CapabilityStatus, LicenseSku};

/// Nagios/Icinga plugin status levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Process exit code per the Nagios plugin convention.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }
}

/// Warning/critical levels as supplied on the command line.
///
/// Deliberately not validated for `warning < critical`: the classification
/// below is defined for any ordering, including the degenerate
/// `warning >= critical` case.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub warning: i64,
    pub critical: i64,
}

/// Which quantity the single-SKU check compares against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    /// Integer-truncated consumption percentage.
    Percent,
    /// Absolute units left in the prepaid pool (signed; overallocation
    /// yields a negative value).
    UnitsLeft,
}

/// Outcome of a check: status level, status line text, perf-data suffix.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub status: Status,
    pub message: String,
    /// Carries its own separator (` |...` in aggregate mode, ` | ...` in
    /// single-SKU mode, empty when the SKU was not found) so that
    /// [`Evaluation::render`] is a plain concatenation.
    pub perf_data: String,
}

impl Evaluation {
    /// The single stdout line of the plugin.
    pub fn render(&self) -> String {
        format!("{}{}", self.message, self.perf_data)
    }
}

/// Integer-truncated consumption percentage.
///
/// An empty prepaid pool counts as fully consumed as soon as anything is
/// assigned to it.
fn percent_taken(consumed: u64, prepaid: u64) -> i64 {
    if prepaid == 0 {
        if consumed == 0 {
            0
        } else {
            100
        }
    } else {
        (consumed * 100 / prepaid) as i64
    }
}

/// The chained bound `warning > value < critical`: below both thresholds.
fn below_both(value: i64, t: &Thresholds) -> bool {
    t.warning > value && value < t.critical
}

/// `warning <= value < critical`.
fn in_warning_band(value: i64, t: &Thresholds) -> bool {
    t.warning <= value && value < t.critical
}

/// Aggregate check over every enabled SKU, percent-only.
///
/// Perf-data lists one `'<name>'=<pct>%` entry per enabled SKU in
/// encounter order. An inventory with no enabled SKUs is vacuously OK.
pub fn evaluate_all(skus: &[LicenseSku], thresholds: &Thresholds) -> Evaluation {
    let usage: Vec<(&str, i64)> = skus
        .iter()
        .filter(|sku| sku.capability_status == CapabilityStatus::Enabled)
        .map(|sku| {
            (
                sku.sku_part_number.as_str(),
                percent_taken(sku.consumed_units, sku.prepaid_units.enabled),
            )
        })
        .collect();

    let mut entries = String::new();
    for (name, pct) in &usage {
        entries.push_str(&format!(" '{name}'={pct}%;"));
    }
    let perf_data = format!(" |{}", entries.trim_end().trim_end_matches(';'));

    let (status, message) = if usage.iter().all(|(_, pct)| below_both(*pct, thresholds)) {
        (Status::Ok, "LICENSE USAGE OK".to_string())
    } else if usage.iter().any(|(_, pct)| in_warning_band(*pct, thresholds)) {
        (
            Status::Warning,
            format!(
                "LICENSE USAGE WARNING: {}",
                list_offenders(&usage, |pct| in_warning_band(pct, thresholds))
            ),
        )
    } else if usage.iter().any(|(_, pct)| *pct >= thresholds.critical) {
        (
            Status::Critical,
            format!(
                "LICENSE USAGE CRITICAL: {}",
                list_offenders(&usage, |pct| pct >= thresholds.critical)
            ),
        )
    } else {
        (Status::Unknown, "LICENSE USAGE UNKNOWN".to_string())
    };

    Evaluation {
        status,
        message: message.trim_end().trim_end_matches(',').to_string(),
        perf_data,
    }
}

/// `<name>: <pct>%, ` per matching SKU; the trailing `, ` is trimmed by
/// the caller along with everything else.
fn list_offenders(usage: &[(&str, i64)], matches: impl Fn(i64) -> bool) -> String {
    let mut listing = String::new();
    for (name, pct) in usage.iter().filter(|(_, pct)| matches(*pct)) {
        listing.push_str(&format!("{name}: {pct}%, "));
    }
    listing
}

/// Single-SKU check, against the consumption percentage or the units left
/// depending on `mode`.
///
/// A target that is not in the inventory is UNKNOWN, reported once after
/// the whole scan. On a match, the threshold comparison always has the
/// last word, even for an exhausted pool; the fall-through bucket reports
/// an UNKNOWN message with CRITICAL severity.
pub fn evaluate_sku(
    skus: &[LicenseSku],
    target: &str,
    mode: ThresholdMode,
    thresholds: &Thresholds,
) -> Evaluation {
    let Some(sku) = skus.iter().find(|s| s.sku_part_number == target) else {
        return Evaluation {
            status: Status::Unknown,
            message: format!("Product {target} not found in tenant."),
            perf_data: String::new(),
        };
    };

    let name = &sku.sku_part_number;
    let consumed = sku.consumed_units;
    let prepaid = sku.prepaid_units.enabled;
    let pct = percent_taken(consumed, prepaid);
    let units_left = prepaid as i64 - consumed as i64;

    let perf_data = format!(
        " | consumed_units={consumed}; prepaid_units={prepaid}; percent_taken={pct}; units_left={units_left}"
    );

    let (value, detail) = match mode {
        ThresholdMode::Percent => (pct, format!("{pct}% used.")),
        ThresholdMode::UnitsLeft => (units_left, format!("{units_left} left.")),
    };

    // Exhaustion (consumed == prepaid) is not a separate terminal state:
    // the threshold chain below is exhaustive over i64 and always decides
    // the final status, so an exhausted pool lands in whichever bucket its
    // value falls into. The fall-through arm reports an UNKNOWN message
    // with CRITICAL severity.
    let (status, message) = if below_both(value, thresholds) {
        (Status::Ok, format!("LICENSE USAGE OK for {name}: {detail}"))
    } else if in_warning_band(value, thresholds) {
        (
            Status::Warning,
            format!("LICENSE USAGE WARNING for {name}: {detail}"),
        )
    } else if value >= thresholds.critical {
        (
            Status::Critical,
            format!("LICENSE USAGE CRITICAL for {name}: {detail}"),
        )
    } else {
        (
            Status::Critical,
            format!("LICENSE USAGE UNKNOWN for {name}"),
        )
    };

    Evaluation {
        status,
        message,
        perf_data,
    }
}
