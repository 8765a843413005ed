//! Segment kinematics: how far a power-limited vehicle accelerates toward its cruising speed
//! on one road segment, and what the battery pays for each phase of that motion.

use ev_battery::{c_rate, discharge_current};
use ev_core::units::joules_to_wh;
use ev_vehicle::{
    BatteryParameters, EnvironmentParameters, MIN_TRACTION_SPEED_M_S, VehicleParameters,
    battery_power, road_load, tractive_power,
};
use serde::Serialize;
use tracing::debug;

/// Relative slack when deciding whether the acceleration phase used up the whole segment.
const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Read-only context shared by every segment of a traversal, plus the capacity snapshot
/// used for C-rates.
#[derive(Debug, Clone, Copy)]
pub struct SegmentContext<'a> {
    pub vehicle: &'a VehicleParameters,
    pub environment: &'a EnvironmentParameters,
    pub battery: &'a BatteryParameters,
    pub max_motor_power_w: f64,
    pub capacity_ah: f64,
}

/// Motion request for a single segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentInputs {
    pub initial_velocity_m_s: f64,
    pub target_velocity_m_s: f64,
    pub distance_m: f64,
    pub incline_deg: f64,
}

/// Energy and electrical stress for one phase of a segment. All-zero when the phase is absent.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseResult {
    pub distance_m: f64,
    pub time_s: f64,
    pub velocity_m_s: f64,
    pub battery_power_w: f64,
    pub energy_wh: f64,
    pub discharge_current_a: f64,
    pub c_rate: f64,
    pub saturated: bool,
}

/// Full outcome of simulating one segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub initial_velocity_m_s: f64,
    pub final_velocity_m_s: f64,
    pub acceleration_m_s2: f64,
    pub acceleration_phase: PhaseResult,
    pub constant_phase: PhaseResult,
    pub total_time_s: f64,
    pub total_energy_wh: f64,
    pub peak_current_a: f64,
    pub avg_current_a: f64,
    pub peak_c_rate: f64,
    pub avg_c_rate: f64,
    pub reached_target: bool,
    pub feasible: bool,
}

impl SegmentResult {
    /// Sentinel for a segment the vehicle cannot climb from standstill.
    fn infeasible() -> Self {
        Self {
            initial_velocity_m_s: 0.0,
            final_velocity_m_s: 0.0,
            acceleration_m_s2: 0.0,
            acceleration_phase: PhaseResult::default(),
            constant_phase: PhaseResult::default(),
            total_time_s: f64::INFINITY,
            total_energy_wh: 0.0,
            peak_current_a: 0.0,
            avg_current_a: 0.0,
            peak_c_rate: 0.0,
            avg_c_rate: 0.0,
            reached_target: false,
            feasible: false,
        }
    }

    /// Number of phases whose power request hit the battery ceiling.
    pub fn saturated_phases(&self) -> usize {
        usize::from(self.acceleration_phase.saturated) + usize::from(self.constant_phase.saturated)
    }
}

/// Acceleration needed to go from `v0` to `vt` over `distance_m`.
#[inline]
pub fn required_acceleration(v0: f64, vt: f64, distance_m: f64) -> f64 {
    (vt * vt - v0 * v0) / (2.0 * distance_m)
}

/// Largest acceleration the motor can sustain at `velocity_m_s` once road load is paid for.
pub fn max_available_acceleration(
    ctx: &SegmentContext<'_>,
    velocity_m_s: f64,
    incline_deg: f64,
) -> f64 {
    let load = road_load(ctx.vehicle, ctx.environment, velocity_m_s, incline_deg);
    let maintain_power = load.total_n() * velocity_m_s;
    let available = (ctx.max_motor_power_w - maintain_power).max(0.0);
    available / (ctx.vehicle.mass_kg * velocity_m_s.max(MIN_TRACTION_SPEED_M_S))
}

/// Chosen acceleration and the exit velocity it produces over the segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationPlan {
    pub acceleration_m_s2: f64,
    pub final_velocity_m_s: f64,
    pub reaches_target: bool,
}

/// Pick `min(a_req, a_max)`, evaluating `a_max` at the mean of entry and target speed.
pub fn plan_acceleration(ctx: &SegmentContext<'_>, inputs: &SegmentInputs) -> AccelerationPlan {
    let v0 = inputs.initial_velocity_m_s;
    let vt = inputs.target_velocity_m_s;
    let required = required_acceleration(v0, vt, inputs.distance_m);
    let available = max_available_acceleration(ctx, 0.5 * (v0 + vt), inputs.incline_deg);

    if required <= available {
        AccelerationPlan {
            acceleration_m_s2: required,
            final_velocity_m_s: vt,
            reaches_target: true,
        }
    } else {
        debug!(required, available, "acceleration limited by motor power");
        AccelerationPlan {
            acceleration_m_s2: available,
            final_velocity_m_s: (v0 * v0 + 2.0 * available * inputs.distance_m).sqrt(),
            reaches_target: false,
        }
    }
}

/// Battery-side cost of moving `distance_m` in `time_s` at a representative speed and acceleration.
pub fn evaluate_phase(
    ctx: &SegmentContext<'_>,
    distance_m: f64,
    time_s: f64,
    velocity_m_s: f64,
    acceleration_m_s2: f64,
    incline_deg: f64,
) -> PhaseResult {
    let tractive = tractive_power(
        ctx.vehicle,
        ctx.environment,
        velocity_m_s,
        acceleration_m_s2,
        incline_deg,
    );
    let power = battery_power(tractive, ctx.vehicle.motor_efficiency);
    let discharge = discharge_current(ctx.battery, power);
    PhaseResult {
        distance_m,
        time_s,
        velocity_m_s,
        battery_power_w: power,
        energy_wh: joules_to_wh(power * time_s),
        discharge_current_a: discharge.current_a,
        c_rate: c_rate(discharge.current_a, ctx.capacity_ah),
        saturated: discharge.saturated,
    }
}

/// Simulate one segment from `inputs.initial_velocity_m_s`.
///
/// A vehicle that cannot accelerate either keeps its entry speed or, from standstill, cannot
/// traverse the segment at all (infinite time, no energy). Otherwise the segment splits into an
/// acceleration phase and, if distance is left over, a constant-speed phase.
pub fn simulate_segment(ctx: &SegmentContext<'_>, inputs: &SegmentInputs) -> SegmentResult {
    let v0 = inputs.initial_velocity_m_s;
    let vt = inputs.target_velocity_m_s;
    let distance = inputs.distance_m;
    let incline = inputs.incline_deg;
    let plan = plan_acceleration(ctx, inputs);
    let a = plan.acceleration_m_s2;

    if a <= 0.0 {
        if v0 <= 0.0 {
            return SegmentResult::infeasible();
        }
        let time = distance / v0;
        let cruise = evaluate_phase(ctx, distance, time, v0, 0.0, incline);
        return assemble(v0, v0, 0.0, PhaseResult::default(), cruise, v0 >= vt);
    }

    let accel_time = (plan.final_velocity_m_s - v0) / a;
    let accel_distance = v0 * accel_time + 0.5 * a * accel_time * accel_time;

    if accel_distance >= distance * (1.0 - DISTANCE_TOLERANCE) {
        let v_exit = (v0 * v0 + 2.0 * a * distance).sqrt();
        let time = (v_exit - v0) / a;
        let mean = (0.5 * (v0 + v_exit)).max(MIN_TRACTION_SPEED_M_S);
        let accel = evaluate_phase(ctx, distance, time, mean, a, incline);
        return assemble(
            v0,
            v_exit,
            a,
            accel,
            PhaseResult::default(),
            plan.reaches_target,
        );
    }

    let v_exit = plan.final_velocity_m_s;
    let mean = (0.5 * (v0 + v_exit)).max(MIN_TRACTION_SPEED_M_S);
    let accel = evaluate_phase(ctx, accel_distance, accel_time, mean, a, incline);
    let cruise_distance = distance - accel_distance;
    let cruise_time = if v_exit > 0.0 {
        cruise_distance / v_exit
    } else {
        0.0
    };
    let cruise = evaluate_phase(ctx, cruise_distance, cruise_time, v_exit, 0.0, incline);
    assemble(v0, v_exit, a, accel, cruise, plan.reaches_target)
}

fn assemble(
    v0: f64,
    v_exit: f64,
    acceleration: f64,
    accel: PhaseResult,
    cruise: PhaseResult,
    reached_target: bool,
) -> SegmentResult {
    let phases = [accel, cruise];
    let active = || phases.iter().filter(|p| p.time_s > 0.0);

    let total_time: f64 = phases.iter().map(|p| p.time_s).sum();
    let total_energy: f64 = phases.iter().map(|p| p.energy_wh).sum();
    let peak_current = active().map(|p| p.discharge_current_a).fold(0.0, f64::max);
    let peak_c_rate = active().map(|p| p.c_rate).fold(0.0, f64::max);
    let (avg_current, avg_c_rate) = if total_time > 0.0 {
        (
            active().map(|p| p.discharge_current_a * p.time_s).sum::<f64>() / total_time,
            active().map(|p| p.c_rate * p.time_s).sum::<f64>() / total_time,
        )
    } else {
        (peak_current, peak_c_rate)
    };

    SegmentResult {
        initial_velocity_m_s: v0,
        final_velocity_m_s: v_exit,
        acceleration_m_s2: acceleration,
        acceleration_phase: accel,
        constant_phase: cruise,
        total_time_s: total_time,
        total_energy_wh: total_energy,
        peak_current_a: peak_current,
        avg_current_a: avg_current,
        peak_c_rate,
        avg_c_rate,
        reached_target,
        feasible: true,
    }
}
