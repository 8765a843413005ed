//! Semi-empirical capacity-fade model integrated segment by segment along a route.

use ev_core::time::seconds_to_hours;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::electrical::c_rate;

/// Calibrated prefactor of the C-rate power law.
pub const DEFAULT_K: f64 = 0.200;
/// Calibrated C-rate exponent.
pub const DEFAULT_N: f64 = 0.2286;

/// Aging law `loss = k · c^n · cycle_fraction`, with `cycle_fraction = hours · c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradationModel {
    pub k: f64,
    pub n: f64,
}

impl Default for DegradationModel {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            n: DEFAULT_N,
        }
    }
}

impl DegradationModel {
    /// Capacity loss (Ah) for dwelling `time_s` seconds at `c_rate`.
    ///
    /// Non-finite inputs (unreachable segments, exhausted battery) contribute nothing.
    pub fn capacity_loss(&self, c_rate: f64, time_s: f64) -> f64 {
        if !c_rate.is_finite() || !time_s.is_finite() || c_rate <= 0.0 || time_s <= 0.0 {
            return 0.0;
        }
        let cycle_fraction = seconds_to_hours(time_s) * c_rate;
        self.k * c_rate.powf(self.n) * cycle_fraction
    }
}

/// Outcome of recording one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegradationStep {
    /// Charge drawn by the segment (Ah).
    pub charge_drawn_ah: f64,
    /// Available capacity after the segment (Ah).
    pub capacity_ah: f64,
    /// Segment C-rate against the post-segment capacity.
    pub c_rate: f64,
    /// Aging loss attributed to the segment (Ah).
    pub aging_loss_ah: f64,
}

/// Running capacity bookkeeping for one traversal.
#[derive(Debug, Clone)]
pub struct DegradationAccumulator {
    model: DegradationModel,
    ocv_v: f64,
    capacity_ah: f64,
    charge_drawn_ah: f64,
    aging_loss_ah: f64,
    exhausted: bool,
}

impl DegradationAccumulator {
    pub fn new(model: DegradationModel, ocv_v: f64, nominal_capacity_ah: f64) -> Self {
        Self {
            model,
            ocv_v,
            capacity_ah: nominal_capacity_ah,
            charge_drawn_ah: 0.0,
            aging_loss_ah: 0.0,
            exhausted: nominal_capacity_ah <= 0.0,
        }
    }

    /// Record a segment's consumption, peak current and duration.
    ///
    /// The charge drawn is subtracted first so the segment's C-rate reflects what is left.
    pub fn record(&mut self, consumption_wh: f64, current_a: f64, time_s: f64) -> DegradationStep {
        let drawn = if consumption_wh.is_finite() && consumption_wh > 0.0 {
            consumption_wh / self.ocv_v
        } else {
            0.0
        };
        self.capacity_ah -= drawn;
        self.charge_drawn_ah += drawn;

        let rate = c_rate(current_a, self.capacity_ah);
        if !rate.is_finite() && !self.exhausted {
            warn!(
                capacity_ah = self.capacity_ah,
                "available capacity exhausted, C-rate is unbounded"
            );
            self.exhausted = true;
        }

        let loss = self.model.capacity_loss(rate, time_s);
        self.aging_loss_ah += loss;

        DegradationStep {
            charge_drawn_ah: drawn,
            capacity_ah: self.capacity_ah,
            c_rate: rate,
            aging_loss_ah: loss,
        }
    }

    pub fn capacity_ah(&self) -> f64 {
        self.capacity_ah
    }

    pub fn charge_drawn_ah(&self) -> f64 {
        self.charge_drawn_ah
    }

    /// Accumulated aging loss over every recorded segment (Ah).
    pub fn total_loss_ah(&self) -> f64 {
        self.aging_loss_ah
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
