use std::collections::BTreeSet;

use ev_route_planner::battery::DegradationAccumulator;
use ev_route_planner::config::load_scenario;
use ev_route_planner::network::{RoadNetwork, RoadPath, RoadSegment, load_network};
use ev_route_planner::route::parameters::from_scenario;
use ev_route_planner::route::{
    KinematicState, RouteError, RouteParameters, RouteRequest, assemble_route, simulate_batch,
    simulate_node_route, simulate_route,
};

fn params() -> RouteParameters {
    let scenario = load_scenario("configs/scenario.toml").expect("scenario");
    from_scenario(&scenario).expect("valid scenario")
}

fn sample_network() -> RoadNetwork {
    load_network("data/sample_network.json").expect("sample network")
}

fn flat_section(id: &str, distance_m: f64, incline: f64) -> RoadSegment {
    RoadSegment {
        id: id.into(),
        distance_m,
        coordinates: [0.0; 4],
        climb_m: Some(distance_m * incline.to_radians().sin()),
        avg_incline_deg: Some(incline),
        max_incline_deg: Some(incline),
        is_stop_start: false,
        is_smooth: None,
    }
}

#[test]
fn capacity_never_increases_along_a_route() {
    let params = params();
    let network = sample_network();
    let report = simulate_node_route(&params, &network, &[1, 2, 3, 4]).expect("route");

    let mut previous = params.battery.capacity_ah;
    for segment in report.segments() {
        assert!(segment.capacity_after_ah <= previous);
        previous = segment.capacity_after_ah;
    }
    let summary = &report.summary;
    assert!((summary.final_capacity_ah - previous).abs() < 1e-12);
    assert!(
        (params.battery.capacity_ah - summary.final_capacity_ah - summary.charge_drawn_ah).abs()
            < 1e-9
    );
    assert!(summary.aging_loss_ah > 0.0);
    assert!(!summary.capacity_exhausted);
}

#[test]
fn summary_lists_follow_segment_order() {
    let params = params();
    let network = sample_network();
    let report = simulate_node_route(&params, &network, &[1, 2, 3, 4]).unwrap();
    let summary = &report.summary;

    assert_eq!(summary.segment_count(), 4);
    assert_eq!(summary.distance_list, vec![47.0, 30.0, 120.0, 60.0]);
    // unknown climb counts as zero
    assert_eq!(summary.climb_list, vec![1.0, 0.0, 3.0, -2.0]);
    assert!((summary.total_distance_m - 257.0).abs() < 1e-9);
    assert!((summary.total_climb_m - 2.0).abs() < 1e-9);

    let energy: f64 = summary.consumption_list.iter().sum();
    assert!((summary.total_energy_wh - energy).abs() < 1e-9);
    assert!((summary.wh_per_km - summary.total_energy_wh / 0.257).abs() < 1e-9);
    assert!((summary.wh_per_climb_m - summary.total_energy_wh / 2.0).abs() < 1e-9);
    assert_eq!(summary.missing_segments, 0);
    assert_eq!(summary.infeasible_segments, 0);
}

#[test]
fn velocity_carries_only_into_smooth_paths() {
    let params = params();
    let network = sample_network();
    let report = simulate_node_route(&params, &network, &[1, 2, 3, 4]).unwrap();

    let path_a = &report.paths[0];
    assert_eq!(path_a.segments[0].result.initial_velocity_m_s, 0.0);
    let carried = path_a.segments[1].result.initial_velocity_m_s;
    assert!(carried > 0.0);

    let path_b = &report.paths[1];
    assert!(!path_b.velocity_reset);
    assert!(path_b.segments[0].result.initial_velocity_m_s > 0.0);

    let path_c = &report.paths[2];
    assert!(path_c.velocity_reset);
    assert_eq!(path_c.segments[0].result.initial_velocity_m_s, 0.0);
}

#[test]
fn stop_start_entry_resets_velocity_inside_a_smooth_chain() {
    let params = params();
    let mut network = sample_network();
    // path_b is smooth, so only the stop-start flag can reset it
    network.mark_stop_start_entries(&BTreeSet::from([2]));
    let report = simulate_node_route(&params, &network, &[1, 2, 3]).unwrap();
    assert_eq!(report.paths[1].segments[0].result.initial_velocity_m_s, 0.0);
}

#[test]
fn missing_pairs_are_reported_and_skipped() {
    let params = params();
    let network = sample_network();

    let assembled = assemble_route(&network, &[1, 2, 9, 3, 4, 5]);
    assert_eq!(assembled.paths.len(), 2);
    assert_eq!(assembled.missing, vec![(2, 9), (9, 3), (4, 5)]);
    assert!(!assembled.is_complete());

    let report = simulate_node_route(&params, &network, &[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(report.summary.missing_segments, 1);
    assert_eq!(report.summary.missing_pairs, vec![(4, 5)]);
    assert_eq!(report.paths.len(), 3);
}

#[test]
fn infeasible_segment_is_counted_not_fatal() {
    let mut params = params();
    params.options.max_motor_power_w = Some(5_000.0);
    let wall = RoadPath {
        id: "wall".into(),
        nodes: [1, 2],
        smooth: false,
        sections: vec![flat_section("section_0", 30.0, 25.0), flat_section("section_1", 30.0, 0.0)],
    };
    let report = simulate_route(&params, &[&wall]).expect("route still completes");
    let summary = &report.summary;

    assert_eq!(summary.infeasible_segments, 1);
    assert!(summary.total_time_s.is_finite());
    assert!(!report.paths[0].segments[0].result.feasible);
    assert_eq!(report.paths[0].segments[0].aging_loss_ah, 0.0);
    assert!(report.paths[0].segments[1].result.feasible);
}

#[test]
fn saturated_phases_are_counted() {
    let mut params = params();
    params.battery.internal_resistance_ohm = 2.0; // 350² / 8 ≈ 15.3 kW ceiling
    let climb = RoadPath {
        id: "climb".into(),
        nodes: [1, 2],
        smooth: false,
        sections: vec![flat_section("section_0", 100.0, 6.0)],
    };
    let report = simulate_route(&params, &[&climb]).unwrap();
    assert!(report.summary.saturated_phases >= 1);
    let peak = report.paths[0].segments[0].result.peak_current_a;
    assert!((peak - params.battery.maximum_power_current_a()).abs() < 1e-9);
}

#[test]
fn invalid_inputs_fail_before_simulation() {
    let mut params = params();
    params.vehicle.motor_efficiency = 0.0;
    let network = sample_network();
    assert!(matches!(
        simulate_node_route(&params, &network, &[1, 2]),
        Err(RouteError::Parameter(_))
    ));

    let params = self::params();
    let broken = RoadPath {
        id: "broken".into(),
        nodes: [1, 2],
        smooth: false,
        sections: vec![flat_section("ok", 10.0, 0.0), flat_section("bad", 0.0, 0.0)],
    };
    assert!(matches!(
        simulate_route(&params, &[&broken]),
        Err(RouteError::Network(_))
    ));

    let mut params = self::params();
    params.options.target_velocity_m_s = Some(-1.0);
    assert!(matches!(
        params.validate(),
        Err(RouteError::InvalidTargetVelocity(_))
    ));
}

#[test]
fn motor_power_defaults_to_battery_ceiling() {
    let mut params = params();
    assert_eq!(params.max_motor_power_w(), 80_000.0);
    params.vehicle.max_motor_power_w = None;
    assert_eq!(params.max_motor_power_w(), params.battery.maximum_power_w());
    params.options.max_motor_power_w = Some(1_000.0);
    assert_eq!(params.max_motor_power_w(), 1_000.0);
    assert_eq!(params.target_velocity_m_s(), 13.9);
}

#[test]
fn batch_matches_individual_runs() {
    let params = params();
    let network = sample_network();
    let requests = vec![
        RouteRequest {
            id: "full".into(),
            nodes: vec![1, 2, 3, 4],
        },
        RouteRequest {
            id: "gap".into(),
            nodes: vec![1, 2, 3, 4, 5],
        },
        RouteRequest {
            id: "short".into(),
            nodes: vec![2, 3],
        },
    ];
    let outcomes = simulate_batch(&params, &network, &requests).expect("batch");
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[1].id, "gap");

    for (request, outcome) in requests.iter().zip(&outcomes) {
        let single = simulate_node_route(&params, &network, &request.nodes).unwrap();
        let summary = outcome.result.as_ref().expect("route succeeds");
        assert_eq!(summary.total_energy_wh, single.summary.total_energy_wh);
        assert_eq!(summary.missing_segments, single.summary.missing_segments);
    }
}

#[test]
fn c_rate_uses_capacity_left_after_previous_segment() {
    let mut params = params();
    params.battery.capacity_ah = 0.5;
    let nominal = params.battery.capacity_ah;
    let sections = (0..4)
        .map(|i| flat_section(&format!("section_{i}"), 100.0, 0.0))
        .collect();
    let path = RoadPath {
        id: "small_pack".into(),
        nodes: [1, 2],
        smooth: false,
        sections,
    };
    let report = simulate_route(&params, &[&path]).unwrap();
    let segments = &report.paths[0].segments;
    assert!(!report.summary.capacity_exhausted);

    for pair in segments.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        assert!(previous.capacity_after_ah < nominal);
        let phases = [
            &current.result.acceleration_phase,
            &current.result.constant_phase,
        ];
        let mut checked = 0;
        for phase in phases.into_iter().filter(|p| p.time_s > 0.0) {
            let expected = phase.discharge_current_a / previous.capacity_after_ah;
            assert!((phase.c_rate - expected).abs() <= 1e-9 * expected);
            assert!(phase.c_rate > phase.discharge_current_a / nominal);
            checked += 1;
        }
        assert!(checked > 0);
    }
}

#[test]
fn kinematic_state_owns_the_battery_capacity() {
    let params = params();
    let network = sample_network();
    let report = simulate_node_route(&params, &network, &[1, 2]).unwrap();

    let mut state = KinematicState::new(DegradationAccumulator::new(
        params.options.degradation,
        params.battery.ocv_v,
        params.battery.capacity_ah,
    ));
    assert_eq!(state.current_capacity_ah(), params.battery.capacity_ah);

    for segment in report.segments() {
        let step = state.advance(&segment.result);
        assert!((step.capacity_ah - segment.capacity_after_ah).abs() < 1e-12);
        assert_eq!(state.current_capacity_ah(), step.capacity_ah);
        assert_eq!(state.current_velocity_m_s, segment.result.final_velocity_m_s);
    }
    assert!((state.current_capacity_ah() - report.summary.final_capacity_ah).abs() < 1e-12);
    assert!((state.battery().charge_drawn_ah() - report.summary.charge_drawn_ah).abs() < 1e-12);

    state.stop();
    assert_eq!(state.current_velocity_m_s, 0.0);
}
