use std::fs;
use std::path::Path;

use ev_route_planner::config::{
    ConfigError, load_battery, load_environment, load_scenario, load_vehicle,
    load_vehicle_configs,
};
use ev_route_planner::inputs::{ParameterSources, load_parameters};

#[test]
fn scenario_manifest_loads_every_section() {
    let scenario = load_scenario("configs/scenario.toml").expect("scenario");
    assert_eq!(scenario.vehicle.name, "compact-ev");
    assert_eq!(scenario.vehicle.max_motor_power_w, Some(80_000.0));
    assert_eq!(scenario.battery.ocv_v, 350.0);
    assert_eq!(scenario.environment.gravity_m_s2, 9.81);
    assert_eq!(scenario.weights.zero_start_weight, 1.0);
    assert_eq!(scenario.simulation.degradation_n, 0.2286);
    assert_eq!(scenario.simulation.target_velocity_m_s, None);
}

#[test]
fn legacy_parameter_files_use_short_keys() {
    let vehicle = load_vehicle("configs/legacy/vehicle.json").expect("vehicle");
    assert_eq!(vehicle.name, "vehicle");
    assert_eq!(vehicle.drag_coefficient, 0.29);
    assert_eq!(vehicle.rolling_resistance, 0.01);
    assert_eq!(vehicle.motor_efficiency, 0.9);
    assert_eq!(vehicle.max_motor_power_w, None);

    let environment = load_environment("configs/legacy/static.json").expect("environment");
    assert_eq!(environment.air_density_kg_m3, 1.225);

    let battery = load_battery("configs/legacy/battery.json").expect("battery");
    assert_eq!(battery.internal_resistance_ohm, 0.1);
    assert_eq!(battery.capacity_ah, 100.0);
}

#[test]
fn yaml_scenario_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenario.yaml");
    fs::write(
        &path,
        "vehicle:\n  mass: 1200\n  frontal_area: 2.0\n  drag_coeff: 0.3\n  roll_res: 0.012\n  max_speed: 12.0\n  motor_eff: 0.85\nbattery:\n  OCV: 400\n  R_internal: 0.05\n  Capacity: 60\nsimulation:\n  max_section_length_m: 20\n",
    )
    .unwrap();

    let scenario = load_scenario(&path).expect("yaml scenario");
    assert_eq!(scenario.vehicle.mass_kg, 1200.0);
    assert_eq!(scenario.environment.air_density_kg_m3, 1.225);
    assert_eq!(scenario.simulation.max_section_length_m, Some(20.0));
    assert_eq!(scenario.simulation.degradation_k, 0.2);
    assert_eq!(scenario.weights.distance_weight, 1.0);
}

#[test]
fn vehicle_catalog_directory_is_sorted() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (file, name) in [("b.toml", "second"), ("a.toml", "first")] {
        fs::write(
            dir.path().join(file),
            format!(
                "name = \"{name}\"\nmass_kg = 1000.0\nfrontal_area_m2 = 2.0\ndrag_coefficient = 0.3\nrolling_resistance = 0.01\nmax_speed_m_s = 10.0\nmotor_efficiency = 0.9\n"
            ),
        )
        .unwrap();
    }
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let vehicles = load_vehicle_configs(dir.path()).expect("catalog");
    let names: Vec<&str> = vehicles.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);

    let empty = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        load_vehicle_configs(empty.path()),
        Err(ConfigError::Empty(_))
    ));
}

#[test]
fn separate_files_override_the_scenario() {
    let merged = load_parameters(ParameterSources {
        scenario: Some(Path::new("configs/scenario.toml")),
        vehicle: Some(Path::new("configs/legacy/vehicle.json")),
        ..Default::default()
    })
    .expect("merged");
    assert_eq!(merged.vehicle.name, "vehicle");
    assert_eq!(merged.battery.capacity_ah, 100.0);

    let missing = load_parameters(ParameterSources {
        vehicle: Some(Path::new("configs/legacy/vehicle.json")),
        ..Default::default()
    });
    assert!(missing.is_err());
}
