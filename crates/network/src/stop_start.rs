//! Heuristic stop-start junction classification.
//!
//! Each node collects points from four independent signals: many roads meeting, an explicit
//! junction tag, a large jump in road class, and a large jump in posted speed. The raw total is
//! normalized to 0–10 against the attainable maximum and thresholded. False positives and
//! negatives are expected; this only decides where the simulation resets velocity.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::info;

use crate::edges::EdgeRecord;

/// Nodes with at least this many incident edge endpoints count as complex intersections.
pub const COMPLEX_DEGREE: usize = 4;
/// Minimum road-class hierarchy gap that counts as a transition.
pub const HIERARCHY_GAP: u32 = 3;
/// Minimum speed-limit difference that counts as a transition.
pub const SPEED_GAP: f64 = 15.0;
/// Largest attainable raw score (3 + 2 + 2, with the speed signal overlapping).
pub const MAX_RAW_SCORE: f64 = 7.0;
/// Normalized confidence required to flag a node or edge.
pub const CONFIDENCE_THRESHOLD: f64 = 5.0;
/// Rank given to highway classes outside the hierarchy.
pub const UNRANKED_CLASS: u32 = 99;

/// Classification of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StopStartFlag {
    pub is_stop_start: bool,
    /// Normalized confidence on a 0–10 scale, one decimal.
    pub confidence: f64,
}

/// Classifier output for a whole edge list.
#[derive(Debug, Clone, Default)]
pub struct StopStartReport {
    /// Edge id → flag.
    pub edges: BTreeMap<String, StopStartFlag>,
    /// Normalized confidence for every node that triggered at least one signal.
    pub node_scores: BTreeMap<u64, f64>,
}

impl StopStartReport {
    pub fn is_stop_start_node(&self, node: u64) -> bool {
        self.node_scores
            .get(&node)
            .is_some_and(|score| *score >= CONFIDENCE_THRESHOLD)
    }

    /// Nodes whose confidence clears the threshold.
    pub fn stop_start_nodes(&self) -> BTreeSet<u64> {
        self.node_scores
            .iter()
            .filter(|(_, score)| **score >= CONFIDENCE_THRESHOLD)
            .map(|(node, _)| *node)
            .collect()
    }

    pub fn flagged_edges(&self) -> usize {
        self.edges.values().filter(|f| f.is_stop_start).count()
    }
}

/// Position of a highway class in the road hierarchy (1 = motorway).
pub fn highway_rank(class: &str) -> u32 {
    match class.trim().to_ascii_lowercase().as_str() {
        "motorway" => 1,
        "trunk" => 2,
        "primary" => 3,
        "secondary" => 4,
        "tertiary" => 5,
        "unclassified" => 6,
        "residential" => 7,
        "service" => 8,
        "track" => 9,
        "path" => 10,
        "footway" | "cycleway" | "steps" => 11,
        _ => UNRANKED_CLASS,
    }
}

/// Primary class of a highway tag; list-valued tags such as `['primary', 'secondary']` use the
/// first entry.
pub fn primary_highway(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return None;
    }
    if tag.starts_with('[') {
        let first = tag
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .next()
            .map(|s| s.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|s| !s.is_empty());
        return Some(first.unwrap_or_else(|| "unknown".to_string()));
    }
    Some(tag.to_string())
}

/// First integer found in a speed tag (`"30 mph"` → 30).
pub fn parse_speed(tag: &str) -> Option<f64> {
    let digits: String = tag
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[inline]
fn normalize(raw: f64) -> f64 {
    (raw / MAX_RAW_SCORE * 10.0 * 10.0).round() / 10.0
}

/// Score every node of the edge list and flag edges touching confident stop-start nodes.
pub fn classify_stop_start(edges: &[EdgeRecord]) -> StopStartReport {
    let mut raw: HashMap<u64, f64> = HashMap::new();
    let mut triggered: BTreeSet<u64> = BTreeSet::new();

    let mut degree: HashMap<u64, usize> = HashMap::new();
    for edge in edges {
        *degree.entry(edge.u).or_default() += 1;
        *degree.entry(edge.v).or_default() += 1;
    }
    for (&node, &count) in &degree {
        if count >= COMPLEX_DEGREE {
            triggered.insert(node);
            raw.insert(node, (count - 2).min(3) as f64);
        }
    }

    let junction_nodes: BTreeSet<u64> = edges
        .iter()
        .filter(|e| e.junction.as_deref().is_some_and(|j| !j.trim().is_empty()))
        .flat_map(|e| [e.u, e.v])
        .collect();
    for &node in &junction_nodes {
        triggered.insert(node);
        *raw.entry(node).or_default() += 2.0;
    }

    let mut classes: HashMap<u64, BTreeSet<String>> = HashMap::new();
    for edge in edges {
        if let Some(class) = edge.highway.as_deref().and_then(primary_highway) {
            classes.entry(edge.u).or_default().insert(class.clone());
            classes.entry(edge.v).or_default().insert(class);
        }
    }
    for (&node, unique) in &classes {
        if unique.len() < 2 {
            continue;
        }
        let ranks: Vec<u32> = unique.iter().map(|c| highway_rank(c)).collect();
        let gap = ranks.iter().max().copied().unwrap_or(0) - ranks.iter().min().copied().unwrap_or(0);
        if gap >= HIERARCHY_GAP {
            triggered.insert(node);
            *raw.entry(node).or_default() += f64::from((gap - 2).min(2));
        }
    }

    let mut speeds: HashMap<u64, Vec<f64>> = HashMap::new();
    for edge in edges {
        if let Some(speed) = edge.maxspeed.as_deref().and_then(parse_speed) {
            speeds.entry(edge.u).or_default().push(speed);
            speeds.entry(edge.v).or_default().push(speed);
        }
    }
    for (&node, values) in &speeds {
        if values.len() < 2 {
            continue;
        }
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let diff = max - min;
        if diff >= SPEED_GAP {
            triggered.insert(node);
            *raw.entry(node).or_default() += (diff / 10.0).min(2.0);
        }
    }

    let node_scores: BTreeMap<u64, f64> = triggered
        .iter()
        .map(|node| (*node, normalize(raw.get(node).copied().unwrap_or(0.0))))
        .collect();

    let mut flags: BTreeMap<String, StopStartFlag> = BTreeMap::new();
    for edge in edges {
        let confidence = [edge.u, edge.v]
            .iter()
            .filter_map(|node| node_scores.get(node))
            .copied()
            .fold(0.0, f64::max);
        let flag = StopStartFlag {
            is_stop_start: confidence >= CONFIDENCE_THRESHOLD,
            confidence,
        };
        flags
            .entry(edge.osmid.clone())
            .and_modify(|existing| {
                if flag.confidence > existing.confidence {
                    *existing = flag;
                }
            })
            .or_insert(flag);
    }

    let report = StopStartReport {
        edges: flags,
        node_scores,
    };
    info!(
        edges = edges.len(),
        flagged = report.flagged_edges(),
        stop_nodes = report.stop_start_nodes().len(),
        "classified stop-start junctions"
    );
    report
}
