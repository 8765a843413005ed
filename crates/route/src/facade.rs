//! Re-exported APIs for consumers of the route crate.

pub use crate::assemble::{AssembledRoute, assemble_route, simulate_node_route};
pub use crate::batch::{BatchOutcome, RouteRequest, simulate_batch};
pub use crate::traversal::{
    KinematicState, PathReport, RouteParameters, RouteReport, RouteSummary, SegmentReport,
    SimulationOptions, simulate_route,
};
pub use ev_battery::DegradationModel;
pub use ev_weighting::WeightCoefficients;

pub mod parameters {
    use ev_battery::DegradationModel;
    use ev_config::{
        BatteryConfig, EnvironmentConfig, ScenarioConfig, SimulationConfig, VehicleConfig,
        WeightConfig,
    };
    use ev_vehicle::{BatteryParameters, EnvironmentParameters, VehicleParameters};
    use ev_weighting::WeightCoefficients;

    use crate::RouteError;
    use crate::traversal::{RouteParameters, SimulationOptions};

    /// Convert a `VehicleConfig` into the runtime vehicle description.
    pub fn vehicle_from_config(config: &VehicleConfig) -> VehicleParameters {
        VehicleParameters {
            name: config.name.clone(),
            mass_kg: config.mass_kg,
            frontal_area_m2: config.frontal_area_m2,
            drag_coefficient: config.drag_coefficient,
            rolling_resistance: config.rolling_resistance,
            max_speed_m_s: config.max_speed_m_s,
            motor_efficiency: config.motor_efficiency,
            max_motor_power_w: config.max_motor_power_w,
        }
    }

    pub fn environment_from_config(config: &EnvironmentConfig) -> EnvironmentParameters {
        EnvironmentParameters {
            air_density_kg_m3: config.air_density_kg_m3,
            gravity_m_s2: config.gravity_m_s2,
        }
    }

    pub fn battery_from_config(config: &BatteryConfig) -> BatteryParameters {
        BatteryParameters {
            ocv_v: config.ocv_v,
            internal_resistance_ohm: config.internal_resistance_ohm,
            capacity_ah: config.capacity_ah,
        }
    }

    pub fn weights_from_config(config: &WeightConfig) -> WeightCoefficients {
        WeightCoefficients {
            incline_weight: config.incline_weight,
            max_incline_weight: config.max_incline_weight,
            distance_weight: config.distance_weight,
            zero_start_weight: config.zero_start_weight,
        }
    }

    pub fn options_from_config(config: &SimulationConfig) -> SimulationOptions {
        SimulationOptions {
            target_velocity_m_s: config.target_velocity_m_s,
            max_motor_power_w: None,
            degradation: DegradationModel {
                k: config.degradation_k,
                n: config.degradation_n,
            },
        }
    }

    /// Build validated route parameters from the three parameter sets and run options.
    pub fn from_parts(
        vehicle: &VehicleConfig,
        environment: &EnvironmentConfig,
        battery: &BatteryConfig,
        simulation: &SimulationConfig,
    ) -> Result<RouteParameters, RouteError> {
        let params = RouteParameters {
            vehicle: vehicle_from_config(vehicle),
            environment: environment_from_config(environment),
            battery: battery_from_config(battery),
            options: options_from_config(simulation),
        };
        params.validate()?;
        Ok(params)
    }

    /// Build validated route parameters from a scenario manifest.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<RouteParameters, RouteError> {
        from_parts(
            &scenario.vehicle,
            &scenario.environment,
            &scenario.battery,
            &scenario.simulation,
        )
    }
}
