//! Sequential traversal of a route: velocity and capacity carry from one segment to the next.

use ev_battery::{DegradationAccumulator, DegradationModel, DegradationStep};
use ev_core::units::m_to_km;
use ev_kinematics::{SegmentContext, SegmentInputs, SegmentResult, simulate_segment};
use ev_network::RoadPath;
use ev_vehicle::{BatteryParameters, EnvironmentParameters, VehicleParameters};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::RouteError;

/// Mutable state threaded through one traversal. Available capacity lives in the battery
/// accumulator, which is its only owner.
#[derive(Debug, Clone)]
pub struct KinematicState {
    pub current_velocity_m_s: f64,
    battery: DegradationAccumulator,
}

impl KinematicState {
    /// Standing start with a full battery.
    pub fn new(battery: DegradationAccumulator) -> Self {
        Self {
            current_velocity_m_s: 0.0,
            battery,
        }
    }

    pub fn stop(&mut self) {
        self.current_velocity_m_s = 0.0;
    }

    /// Available capacity (Ah); never increases.
    pub fn current_capacity_ah(&self) -> f64 {
        self.battery.capacity_ah()
    }

    pub fn battery(&self) -> &DegradationAccumulator {
        &self.battery
    }

    /// Charge the battery for a finished segment and move on at its exit velocity.
    pub fn advance(&mut self, result: &SegmentResult) -> DegradationStep {
        self.current_velocity_m_s = result.final_velocity_m_s;
        self.battery.record(
            result.total_energy_wh,
            result.peak_current_a,
            result.total_time_s,
        )
    }
}

/// Per-run knobs layered on top of the parameter sets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationOptions {
    /// Cruise speed; the vehicle's maximum speed when absent.
    pub target_velocity_m_s: Option<f64>,
    /// Motor power ceiling; the vehicle override or the battery's maximum power when absent.
    pub max_motor_power_w: Option<f64>,
    pub degradation: DegradationModel,
}

/// Validated inputs of a route simulation, shared read-only across traversals.
#[derive(Debug, Clone)]
pub struct RouteParameters {
    pub vehicle: VehicleParameters,
    pub environment: EnvironmentParameters,
    pub battery: BatteryParameters,
    pub options: SimulationOptions,
}

impl RouteParameters {
    /// Fail-fast precondition check over every parameter set and option.
    pub fn validate(&self) -> Result<(), RouteError> {
        self.vehicle.validate()?;
        self.environment.validate()?;
        self.battery.validate()?;

        let target = self.target_velocity_m_s();
        if !target.is_finite() || target <= 0.0 {
            return Err(RouteError::InvalidTargetVelocity(target));
        }
        let power = self.max_motor_power_w();
        if !power.is_finite() || power <= 0.0 {
            return Err(RouteError::InvalidMotorPower(power));
        }
        let model = self.options.degradation;
        if !(model.k.is_finite() && model.n.is_finite()) || model.k < 0.0 {
            return Err(RouteError::InvalidDegradationModel {
                k: model.k,
                n: model.n,
            });
        }
        Ok(())
    }

    pub fn target_velocity_m_s(&self) -> f64 {
        self.options
            .target_velocity_m_s
            .unwrap_or(self.vehicle.max_speed_m_s)
    }

    pub fn max_motor_power_w(&self) -> f64 {
        self.options
            .max_motor_power_w
            .or(self.vehicle.max_motor_power_w)
            .unwrap_or_else(|| self.battery.maximum_power_w())
    }

    fn context(&self, capacity_ah: f64) -> SegmentContext<'_> {
        SegmentContext {
            vehicle: &self.vehicle,
            environment: &self.environment,
            battery: &self.battery,
            max_motor_power_w: self.max_motor_power_w(),
            capacity_ah,
        }
    }
}

/// One simulated section with its degradation bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub path_id: String,
    pub section_id: String,
    pub distance_m: f64,
    /// Unknown for synthetic subsections.
    pub climb_m: Option<f64>,
    /// Incline actually simulated (unknown inclines run flat).
    pub incline_deg: f64,
    pub result: SegmentResult,
    pub charge_drawn_ah: f64,
    pub capacity_after_ah: f64,
    /// Peak current against the post-segment capacity.
    pub degradation_c_rate: f64,
    pub aging_loss_ah: f64,
}

/// Sections of one path, in traversal order.
#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub id: String,
    pub nodes: [u64; 2],
    pub velocity_reset: bool,
    pub segments: Vec<SegmentReport>,
}

/// Whole-route aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteSummary {
    pub total_distance_m: f64,
    pub total_energy_wh: f64,
    pub total_climb_m: f64,
    /// Sum over feasible segments only.
    pub total_time_s: f64,
    pub wh_per_km: f64,
    pub wh_per_climb_m: f64,
    pub current_list: Vec<f64>,
    pub climb_list: Vec<f64>,
    pub distance_list: Vec<f64>,
    pub consumption_list: Vec<f64>,
    pub charge_drawn_ah: f64,
    pub final_capacity_ah: f64,
    pub aging_loss_ah: f64,
    pub infeasible_segments: usize,
    pub saturated_phases: usize,
    pub missing_segments: usize,
    pub missing_pairs: Vec<(u64, u64)>,
    pub capacity_exhausted: bool,
}

impl RouteSummary {
    pub fn segment_count(&self) -> usize {
        self.distance_list.len()
    }

    fn finish(&mut self) {
        self.wh_per_km = if self.total_distance_m > 0.0 {
            self.total_energy_wh / m_to_km(self.total_distance_m)
        } else {
            0.0
        };
        self.wh_per_climb_m = if self.total_climb_m > 0.0 {
            self.total_energy_wh / self.total_climb_m
        } else {
            0.0
        };
    }

    /// Record node pairs that had no path data.
    pub fn set_missing(&mut self, missing: Vec<(u64, u64)>) {
        self.missing_segments = missing.len();
        self.missing_pairs = missing;
    }
}

/// Full traversal output.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub paths: Vec<PathReport>,
    pub summary: RouteSummary,
}

impl RouteReport {
    pub fn segments(&self) -> impl Iterator<Item = &SegmentReport> {
        self.paths.iter().flat_map(|p| p.segments.iter())
    }
}

/// Simulate an ordered list of paths from a standing start with a full battery.
///
/// Parameters and every section distance are checked before the first segment runs.
/// Infeasible segments, battery saturation and capacity exhaustion are recorded in the
/// summary rather than aborting the route.
pub fn simulate_route(
    params: &RouteParameters,
    paths: &[&RoadPath],
) -> Result<RouteReport, RouteError> {
    params.validate()?;
    for path in paths {
        for section in &path.sections {
            section.validate()?;
        }
    }

    let target = params.target_velocity_m_s();
    let mut state = KinematicState::new(DegradationAccumulator::new(
        params.options.degradation,
        params.battery.ocv_v,
        params.battery.capacity_ah,
    ));
    let mut summary = RouteSummary::default();
    let mut reports = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        let velocity_reset = index > 0 && !path.carries_velocity();
        if velocity_reset {
            state.stop();
        }

        let mut segments = Vec::with_capacity(path.sections.len());
        for section in &path.sections {
            if section.is_stop_start {
                state.stop();
            }

            let incline = section.avg_incline_deg.unwrap_or(0.0);
            let ctx = params.context(state.current_capacity_ah());
            let inputs = SegmentInputs {
                initial_velocity_m_s: state.current_velocity_m_s,
                target_velocity_m_s: target,
                distance_m: section.distance_m,
                incline_deg: incline,
            };
            let result = simulate_segment(&ctx, &inputs);

            if !result.feasible {
                warn!(
                    path = %path.id,
                    section = %section.id,
                    incline_deg = incline,
                    "segment cannot be climbed from standstill"
                );
                summary.infeasible_segments += 1;
            } else {
                summary.total_time_s += result.total_time_s;
            }
            summary.saturated_phases += result.saturated_phases();

            let step = state.advance(&result);

            debug!(
                path = %path.id,
                section = %section.id,
                v0 = result.initial_velocity_m_s,
                v1 = result.final_velocity_m_s,
                energy_wh = result.total_energy_wh,
                peak_current_a = result.peak_current_a,
                capacity_ah = step.capacity_ah,
                "segment simulated"
            );

            let climb = section.climb_m.unwrap_or(0.0);
            summary.total_distance_m += section.distance_m;
            summary.total_energy_wh += result.total_energy_wh;
            summary.total_climb_m += climb;
            summary.current_list.push(result.peak_current_a);
            summary.climb_list.push(climb);
            summary.distance_list.push(section.distance_m);
            summary.consumption_list.push(result.total_energy_wh);

            segments.push(SegmentReport {
                path_id: path.id.clone(),
                section_id: section.id.clone(),
                distance_m: section.distance_m,
                climb_m: section.climb_m,
                incline_deg: incline,
                result,
                charge_drawn_ah: step.charge_drawn_ah,
                capacity_after_ah: step.capacity_ah,
                degradation_c_rate: step.c_rate,
                aging_loss_ah: step.aging_loss_ah,
            });
        }

        reports.push(PathReport {
            id: path.id.clone(),
            nodes: path.nodes,
            velocity_reset,
            segments,
        });
    }

    let battery = state.battery();
    summary.charge_drawn_ah = battery.charge_drawn_ah();
    summary.final_capacity_ah = battery.capacity_ah();
    summary.aging_loss_ah = battery.total_loss_ah();
    summary.capacity_exhausted = battery.is_exhausted();
    summary.finish();

    info!(
        paths = reports.len(),
        segments = summary.segment_count(),
        distance_m = summary.total_distance_m,
        energy_wh = summary.total_energy_wh,
        infeasible = summary.infeasible_segments,
        saturated = summary.saturated_phases,
        "route simulated"
    );

    Ok(RouteReport {
        paths: reports,
        summary,
    })
}
