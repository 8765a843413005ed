//! Vehicle, environment and battery descriptors shared across the simulation crates.
//!
//! The parameter sets are constant for a simulation run and are only ever read
//! by the models. `validate` on each set is the fail-fast precondition check
//! callers run before any segment is simulated.

use thiserror::Error;

/// Speed floor (m/s) used wherever a power term is divided by velocity.
pub const MIN_TRACTION_SPEED_M_S: f64 = 0.1;

/// Rigid-body and drivetrain description of the vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParameters {
    pub name: String,
    pub mass_kg: f64,
    pub frontal_area_m2: f64,
    pub drag_coefficient: f64,
    pub rolling_resistance: f64,
    pub max_speed_m_s: f64,
    pub motor_efficiency: f64,
    /// Optional motor power ceiling. When absent the battery's maximum deliverable power is used.
    pub max_motor_power_w: Option<f64>,
}

/// Ambient conditions for the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentParameters {
    pub air_density_kg_m3: f64,
    pub gravity_m_s2: f64,
}

/// Equivalent-circuit battery description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryParameters {
    pub ocv_v: f64,
    pub internal_resistance_ohm: f64,
    pub capacity_ah: f64,
}

/// Precondition failures detected before simulation starts.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("motor efficiency must lie in (0, 1], got {0}")]
    Efficiency(f64),
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ParameterError::NonPositive { field, value });
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(ParameterError::Negative { field, value });
    }
    Ok(())
}

impl VehicleParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        require_positive("mass_kg", self.mass_kg)?;
        require_non_negative("frontal_area_m2", self.frontal_area_m2)?;
        require_non_negative("drag_coefficient", self.drag_coefficient)?;
        require_non_negative("rolling_resistance", self.rolling_resistance)?;
        require_positive("max_speed_m_s", self.max_speed_m_s)?;
        if !self.motor_efficiency.is_finite()
            || self.motor_efficiency <= 0.0
            || self.motor_efficiency > 1.0
        {
            return Err(ParameterError::Efficiency(self.motor_efficiency));
        }
        if let Some(power) = self.max_motor_power_w {
            require_positive("max_motor_power_w", power)?;
        }
        Ok(())
    }
}

impl EnvironmentParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        require_non_negative("air_density_kg_m3", self.air_density_kg_m3)?;
        require_positive("gravity_m_s2", self.gravity_m_s2)
    }
}

impl Default for EnvironmentParameters {
    fn default() -> Self {
        Self {
            air_density_kg_m3: 1.225,
            gravity_m_s2: 9.81,
        }
    }
}

impl BatteryParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        require_positive("ocv_v", self.ocv_v)?;
        require_positive("internal_resistance_ohm", self.internal_resistance_ohm)?;
        require_positive("capacity_ah", self.capacity_ah)
    }

    /// Hard power ceiling of the equivalent circuit, `OCV² / (4·R)` (W).
    #[inline]
    pub fn maximum_power_w(&self) -> f64 {
        self.ocv_v * self.ocv_v / (4.0 * self.internal_resistance_ohm)
    }

    /// Current drawn at the maximum power point, `OCV / (2·R)` (A).
    #[inline]
    pub fn maximum_power_current_a(&self) -> f64 {
        self.ocv_v / (2.0 * self.internal_resistance_ohm)
    }
}

/// Breakdown of the road-load forces acting on the vehicle (N).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadLoad {
    pub drag_n: f64,
    pub grade_n: f64,
    pub rolling_n: f64,
}

impl RoadLoad {
    /// Force needed to hold the current speed.
    #[inline]
    pub fn total_n(&self) -> f64 {
        self.drag_n + self.grade_n + self.rolling_n
    }
}

/// Aerodynamic, grade and rolling resistance at `velocity_m_s` on a slope of `incline_deg`.
pub fn road_load(
    vehicle: &VehicleParameters,
    environment: &EnvironmentParameters,
    velocity_m_s: f64,
    incline_deg: f64,
) -> RoadLoad {
    let theta = incline_deg.to_radians();
    let weight = vehicle.mass_kg * environment.gravity_m_s2;
    RoadLoad {
        drag_n: 0.5
            * environment.air_density_kg_m3
            * vehicle.frontal_area_m2
            * vehicle.drag_coefficient
            * velocity_m_s
            * velocity_m_s,
        grade_n: weight * theta.sin(),
        rolling_n: weight * theta.cos() * vehicle.rolling_resistance,
    }
}

/// Mechanical power at the wheels including the inertial term, clamped at zero (W).
///
/// Negative values would mean energy recovery, which the model does not account for.
pub fn tractive_power(
    vehicle: &VehicleParameters,
    environment: &EnvironmentParameters,
    velocity_m_s: f64,
    acceleration_m_s2: f64,
    incline_deg: f64,
) -> f64 {
    let load = road_load(vehicle, environment, velocity_m_s, incline_deg);
    let force = load.total_n() + vehicle.mass_kg * acceleration_m_s2;
    (force * velocity_m_s).max(0.0)
}

/// Power the battery must deliver for a given tractive demand (W).
#[inline]
pub fn battery_power(tractive_power_w: f64, motor_efficiency: f64) -> f64 {
    tractive_power_w / motor_efficiency
}
