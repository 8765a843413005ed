//! Routing cost for road paths.
//!
//! Steep climbs are penalized super-linearly, descents mildly, distance linearly, and paths that
//! force a standing start pay a flat surcharge. Very large sums are compressed with a square
//! root so one extreme path does not dominate a search, then clamped to a fixed band.

use std::collections::BTreeMap;

use ev_network::{RoadNetwork, RoadPath};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest weight any path can receive.
pub const MIN_WEIGHT: f64 = 1.5;
/// Largest weight any path can receive; also returned for non-finite inputs.
pub const MAX_WEIGHT: f64 = 200.0;
/// Sum above which the square-root compression kicks in.
pub const COMPRESSION_KNEE: f64 = 50.0;

const UPHILL_FACTOR: f64 = 1.5;
const DOWNHILL_FACTOR: f64 = 0.8;
const SMOOTH_START_FACTOR: f64 = 1.0;
const STANDING_START_FACTOR: f64 = 3.5;

/// Relative importance of each cost term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightCoefficients {
    pub incline_weight: f64,
    pub max_incline_weight: f64,
    pub distance_weight: f64,
    pub zero_start_weight: f64,
}

impl Default for WeightCoefficients {
    fn default() -> Self {
        Self {
            incline_weight: 1.0,
            max_incline_weight: 1.0,
            distance_weight: 1.0,
            zero_start_weight: 1.0,
        }
    }
}

/// Aggregate geometry of one path as seen by the cost function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathMetrics {
    pub avg_incline_deg: f64,
    pub max_incline_deg: f64,
    pub distance_m: f64,
    /// Velocity carries into the path (no standing start).
    pub zero_start: bool,
}

impl PathMetrics {
    /// Summarize a path's sections.
    ///
    /// The average incline is distance-weighted over sections with a known incline; the maximum
    /// is the signed value with the largest magnitude.
    pub fn from_path(path: &RoadPath) -> Self {
        let distance_m = path.distance_m();

        let (weighted, known_distance) = path
            .sections
            .iter()
            .filter_map(|s| s.avg_incline_deg.map(|incline| (incline, s.distance_m)))
            .fold((0.0, 0.0), |(sum, len), (incline, d)| {
                (sum + incline * d, len + d)
            });
        let avg_incline_deg = if known_distance > 0.0 {
            weighted / known_distance
        } else {
            0.0
        };

        let max_incline_deg = path
            .sections
            .iter()
            .filter_map(|s| s.max_incline_deg)
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });

        Self {
            avg_incline_deg,
            max_incline_deg,
            distance_m,
            zero_start: path.carries_velocity() && !path.starts_at_stop(),
        }
    }

    pub fn weight(&self, coefficients: &WeightCoefficients) -> f64 {
        path_weight(
            self.avg_incline_deg,
            self.max_incline_deg,
            self.distance_m,
            self.zero_start,
            coefficients,
        )
    }
}

/// Scalar routing cost of a path, always within `[MIN_WEIGHT, MAX_WEIGHT]`.
pub fn path_weight(
    avg_incline_deg: f64,
    max_incline_deg: f64,
    distance_m: f64,
    zero_start: bool,
    coefficients: &WeightCoefficients,
) -> f64 {
    if !(avg_incline_deg.is_finite() && max_incline_deg.is_finite() && distance_m.is_finite()) {
        return MAX_WEIGHT;
    }

    let direction = if avg_incline_deg > 0.0 {
        UPHILL_FACTOR
    } else {
        DOWNHILL_FACTOR
    };
    let incline = (1.0 + (avg_incline_deg.abs() / 3.0).powf(2.5))
        * direction
        * coefficients.incline_weight;
    let max_incline = (1.0 + (max_incline_deg.abs() / 2.0).powi(3)) * coefficients.max_incline_weight;
    let distance = distance_m / 10.0 * coefficients.distance_weight;
    let start = coefficients.zero_start_weight
        * if zero_start {
            SMOOTH_START_FACTOR
        } else {
            STANDING_START_FACTOR
        };

    let mut total = incline + max_incline + distance + start;
    if total > COMPRESSION_KNEE {
        total = COMPRESSION_KNEE + 20.0 * (total - COMPRESSION_KNEE).sqrt();
    }
    if total.is_nan() {
        return MAX_WEIGHT;
    }
    total.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// Weight for every directed node pair in the network; parallel paths keep the cheapest.
pub fn edge_weights(
    network: &RoadNetwork,
    coefficients: &WeightCoefficients,
) -> BTreeMap<(u64, u64), f64> {
    let mut weights: BTreeMap<(u64, u64), f64> = BTreeMap::new();
    for path in network.paths() {
        let weight = PathMetrics::from_path(path).weight(coefficients);
        debug!(path = %path.id, weight, "path weight");
        weights
            .entry((path.entry_node(), path.exit_node()))
            .and_modify(|w| *w = w.min(weight))
            .or_insert(weight);
    }
    weights
}
