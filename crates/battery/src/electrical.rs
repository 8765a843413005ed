//! Equivalent-circuit discharge model: an ideal voltage source behind a series resistance.
//!
//! For a load drawing power `P` the terminal equation `P = OCV·I − R·I²` has two roots; the
//! lower-current one is the physical operating point. Above `OCV²/(4R)` there is no real root
//! and the current is held at the maximum-power point instead.

use ev_vehicle::BatteryParameters;
use tracing::warn;

/// Discharge operating point for a single power request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discharge {
    pub current_a: f64,
    /// The request exceeded the battery's maximum deliverable power and was capped.
    pub saturated: bool,
}

/// Solve the discharge current for a battery power request (W).
///
/// Requests above the maximum power saturate at `OCV / (2·R)` and log a warning; the caller
/// gets the capped current back rather than an error. Negative requests are treated as zero.
pub fn discharge_current(battery: &BatteryParameters, power_w: f64) -> Discharge {
    let ocv = battery.ocv_v;
    let r = battery.internal_resistance_ohm;
    let power = power_w.max(0.0);
    let p_max = battery.maximum_power_w();

    if power > p_max {
        warn!(
            requested_w = power,
            maximum_w = p_max,
            "requested power exceeds battery capability, capping at maximum power point"
        );
        return Discharge {
            current_a: battery.maximum_power_current_a(),
            saturated: true,
        };
    }

    // discriminant can dip a hair below zero at the ceiling through rounding
    let discriminant = (ocv * ocv - 4.0 * r * power).max(0.0);
    Discharge {
        current_a: (ocv - discriminant.sqrt()) / (2.0 * r),
        saturated: false,
    }
}

/// Discharge rate relative to the currently available capacity.
///
/// An exhausted battery (capacity ≤ 0) yields `+∞` rather than a division by zero.
#[inline]
pub fn c_rate(current_a: f64, capacity_ah: f64) -> f64 {
    if capacity_ah > 0.0 {
        current_a / capacity_ah
    } else {
        f64::INFINITY
    }
}
