use std::collections::BTreeSet;

use ev_route_planner::network::discretize::{DEFAULT_MAX_SECTION_LENGTH_M, MAX_PIECES_PER_SECTION};
use ev_route_planner::network::stop_start::{highway_rank, parse_speed, primary_highway};
use ev_route_planner::network::{
    EdgeRecord, NetworkError, RoadSegment, classify_stop_start, discretize_network,
    discretize_segment, load_edges, load_network, parse_network, save_network,
};

fn segment(distance_m: f64) -> RoadSegment {
    RoadSegment {
        id: "section_0".into(),
        distance_m,
        coordinates: [0.0, 0.0, 0.003, 0.0],
        climb_m: Some(2.0),
        avg_incline_deg: Some(2.4),
        max_incline_deg: Some(3.1),
        is_stop_start: true,
        is_smooth: Some(true),
    }
}

fn edge(osmid: &str, u: u64, v: u64, highway: &str, maxspeed: &str, junction: &str) -> EdgeRecord {
    let tag = |s: &str| (!s.is_empty()).then(|| s.to_string());
    EdgeRecord {
        osmid: osmid.into(),
        u,
        v,
        highway: tag(highway),
        maxspeed: tag(maxspeed),
        junction: tag(junction),
    }
}

#[test]
fn forty_seven_metres_split_into_three_pieces() {
    let pieces = discretize_segment(&segment(47.0), DEFAULT_MAX_SECTION_LENGTH_M).unwrap();
    assert_eq!(pieces.len(), 3);
    for piece in &pieces {
        assert!((piece.distance_m - 47.0 / 3.0).abs() < 1e-12);
        assert_eq!(piece.climb_m, None);
        assert_eq!(piece.avg_incline_deg, None);
        assert_eq!(piece.max_incline_deg, Some(3.1));
    }
    let total: f64 = pieces.iter().map(|p| p.distance_m).sum();
    assert!((total - 47.0).abs() < 1e-9);

    let ids: Vec<&str> = pieces.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["section_0", "section_0_1", "section_0_2"]);
    assert!(pieces[0].is_stop_start && !pieces[1].is_stop_start);
    assert_eq!(pieces[0].is_smooth, Some(true));
    assert_eq!(pieces[2].is_smooth, None);

    assert!((pieces[0].coordinates[2] - 0.001).abs() < 1e-12);
    assert!((pieces[2].coordinates[2] - 0.003).abs() < 1e-12);
}

#[test]
fn short_segments_pass_through_unchanged() {
    let original = segment(12.0);
    let pieces = discretize_segment(&original, 20.0).unwrap();
    assert_eq!(pieces, vec![original]);
}

#[test]
fn non_positive_section_length_is_rejected() {
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            discretize_segment(&segment(47.0), bad),
            Err(NetworkError::InvalidSectionLength(_))
        ));
    }
}

#[test]
fn sample_network_loads_in_file_order() {
    let network = load_network("data/sample_network.json").expect("sample network");
    assert_eq!(network.len(), 4);

    let ids: Vec<&str> = network.paths().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["path_a", "path_b", "path_c", "path_c_alt"]);

    let path_a = network.get("path_a").unwrap();
    assert_eq!(path_a.nodes, [1, 2]);
    assert!(!path_a.smooth);
    assert_eq!(path_a.sections.len(), 2);
    assert_eq!(path_a.sections[1].climb_m, None);
    assert_eq!(path_a.sections[1].avg_incline_deg, None);
    assert!((path_a.distance_m() - 77.0).abs() < 1e-12);

    assert_eq!(network.find_path(3, 4).unwrap().id, "path_c");
    assert_eq!(network.paths_between(3, 4).count(), 2);
    assert!(network.find_path(4, 3).is_none());
}

#[test]
fn paths_without_nodes_are_rejected() {
    let json = r#"{ "p": { "section_0": { "distance": 10.0 } } }"#;
    assert!(matches!(
        parse_network(json),
        Err(NetworkError::MissingNodes(id)) if id == "p"
    ));
    assert!(matches!(parse_network("[1, 2]"), Err(NetworkError::NotAnObject)));
}

#[test]
fn discretized_network_survives_save_and_reload() {
    let network = load_network("data/sample_network.json").unwrap();
    let fine = discretize_network(&network, 20.0).unwrap();
    assert_eq!(fine.get("path_a").unwrap().sections.len(), 5);

    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("nested").join("fine.json");
    save_network(&fine, &out).expect("save");

    let reloaded = load_network(&out).expect("reload");
    assert_eq!(reloaded.len(), fine.len());
    for (a, b) in fine.paths().iter().zip(reloaded.paths()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.smooth, b.smooth);
        assert_eq!(a.sections.len(), b.sections.len());
        for (x, y) in a.sections.iter().zip(&b.sections) {
            assert_eq!(x.id, y.id);
            assert!((x.distance_m - y.distance_m).abs() < 1e-9);
            assert_eq!(x.climb_m.is_some(), y.climb_m.is_some());
            assert_eq!(x.is_stop_start, y.is_stop_start);
        }
    }
}

#[test]
fn edge_csv_is_read_with_optional_tags() {
    let edges = load_edges("data/sample_edges.csv").expect("edges");
    assert_eq!(edges.len(), 6);
    assert_eq!(edges[0].osmid, "100");
    assert_eq!(edges[0].junction, None);
    assert_eq!(edges[2].junction.as_deref(), Some("roundabout"));
    assert_eq!(edges[5].maxspeed, None);
}

#[test]
fn tag_helpers() {
    assert_eq!(highway_rank("motorway"), 1);
    assert_eq!(highway_rank("steps"), 11);
    assert_eq!(highway_rank("bridleway"), 99);
    assert_eq!(
        primary_highway("['secondary', 'primary']").as_deref(),
        Some("secondary")
    );
    assert_eq!(primary_highway("").as_deref(), None);
    assert_eq!(parse_speed("30 mph"), Some(30.0));
    assert_eq!(parse_speed("signals"), None);
}

#[test]
fn complex_junction_is_flagged() {
    let edges = load_edges("data/sample_edges.csv").unwrap();
    let report = classify_stop_start(&edges);

    // node 3: degree 5 (3) + roundabout (2) + motorway/footway gap (2) + 30/110 speeds (2)
    assert_eq!(report.node_scores.get(&3), Some(&12.9));
    // node 4: roundabout only
    assert_eq!(report.node_scores.get(&4), Some(&2.9));
    assert!(!report.node_scores.contains_key(&1));

    assert_eq!(report.stop_start_nodes(), BTreeSet::from([3]));
    assert!(report.is_stop_start_node(3));
    assert!(!report.is_stop_start_node(4));

    let flag = report.edges["102"];
    assert!(flag.is_stop_start);
    assert_eq!(flag.confidence, 12.9);
    let quiet = report.edges["100"];
    assert!(!quiet.is_stop_start);
    assert_eq!(quiet.confidence, 0.0);
    assert_eq!(report.flagged_edges(), 5);
}

#[test]
fn signal_caps_and_threshold() {
    // four-way junction of equal roads: degree 4 gives 2 points, 2.9 normalized
    let edges = vec![
        edge("a", 1, 10, "residential", "30", ""),
        edge("b", 10, 2, "residential", "30", ""),
        edge("c", 3, 10, "residential", "30", ""),
        edge("d", 10, 4, "residential", "30", ""),
    ];
    let report = classify_stop_start(&edges);
    assert_eq!(report.node_scores.get(&10), Some(&2.9));
    assert_eq!(report.flagged_edges(), 0);

    // primary (3) meets residential (7): gap 4 adds 2; 50 vs 20 km/h adds 2; total 6 -> 8.6
    let edges = vec![
        edge("a", 1, 10, "primary", "50", ""),
        edge("b", 10, 2, "primary", "50", ""),
        edge("c", 3, 10, "residential", "20", ""),
        edge("d", 10, 4, "residential", "20", ""),
    ];
    let report = classify_stop_start(&edges);
    assert_eq!(report.node_scores.get(&10), Some(&8.6));
    assert_eq!(report.flagged_edges(), 4);
}

#[test]
fn duplicate_edge_ids_keep_the_highest_confidence() {
    let edges = vec![
        edge("dup", 1, 2, "residential", "", ""),
        edge("dup", 5, 6, "residential", "", "roundabout"),
        edge("x", 6, 7, "residential", "", "roundabout"),
        edge("y", 6, 8, "primary", "", ""),
    ];
    let report = classify_stop_start(&edges);
    // node 6: roundabout (2) + residential/primary gap 4 (2) -> 4 -> 5.7
    assert_eq!(report.edges["dup"].confidence, 5.7);
    assert!(report.edges["dup"].is_stop_start);
}

#[test]
fn stop_start_entries_are_marked() {
    let mut network = load_network("data/sample_network.json").unwrap();
    let marked = network.mark_stop_start_entries(&BTreeSet::from([3]));
    assert_eq!(marked, 2);
    assert!(network.get("path_c").unwrap().starts_at_stop());
    assert!(!network.get("path_b").unwrap().starts_at_stop());
}

#[test]
fn discretizer_rejects_unusable_distances() {
    for bad in [f64::NAN, 0.0, -3.0, f64::INFINITY] {
        assert!(matches!(
            discretize_segment(&segment(bad), 20.0),
            Err(NetworkError::InvalidDistance { .. })
        ));
    }

    let json = r#"{ "p": { "nodes": [1, 2], "section_0": { "distance": 1e300 } } }"#;
    let network = parse_network(json).unwrap();
    assert!(matches!(
        discretize_network(&network, 20.0),
        Err(NetworkError::TooManyPieces { id, limit, .. })
            if id == "section_0" && limit == MAX_PIECES_PER_SECTION
    ));
}

#[test]
fn malformed_paths_are_rejected() {
    let fractional = r#"{ "p": { "nodes": [1.5, 2], "section_0": { "distance": 10.0 } } }"#;
    assert!(matches!(
        parse_network(fractional),
        Err(NetworkError::MissingNodes(id)) if id == "p"
    ));

    let whole = r#"{ "p": { "nodes": [1.0, "2"], "section_0": { "distance": 10.0 } } }"#;
    assert_eq!(parse_network(whole).unwrap().paths()[0].nodes, [1, 2]);

    let not_object = r#"{ "p": { "nodes": [1, 2] }, "q": 7 }"#;
    assert!(matches!(
        parse_network(not_object),
        Err(NetworkError::InvalidPath(id)) if id == "q"
    ));
}
