//! Path and section records in the on-disk JSON layout.
//!
//! The file is an object keyed by path id. Each path carries `nodes: [u, v]`, an optional
//! `smooth` flag, and any number of keys containing `"section"` holding segment records in
//! traversal order. Elevation-derived fields that were never sampled are stored as `false`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use ev_core::geo::LonLat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NetworkError;

/// Immutable geometric/physical record for one stretch of road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "distance")]
    pub distance_m: f64,
    /// `[lon0, lat0, lon1, lat1]`.
    #[serde(rename = "coords", default)]
    pub coordinates: [f64; 4],
    #[serde(rename = "climb", default, with = "measured")]
    pub climb_m: Option<f64>,
    #[serde(rename = "avg_incline_angle", default, with = "measured")]
    pub avg_incline_deg: Option<f64>,
    #[serde(rename = "max_incline_angle", default, with = "measured")]
    pub max_incline_deg: Option<f64>,
    #[serde(
        rename = "stop_start",
        alias = "is_stop_start",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_stop_start: bool,
    #[serde(
        rename = "smooth",
        alias = "is_smooth",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_smooth: Option<bool>,
}

impl RoadSegment {
    pub fn start(&self) -> LonLat {
        [self.coordinates[0], self.coordinates[1]]
    }

    pub fn end(&self) -> LonLat {
        [self.coordinates[2], self.coordinates[3]]
    }

    /// Reject segments the kinematic model cannot divide by.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.distance_m.is_finite() && self.distance_m > 0.0 {
            Ok(())
        } else {
            Err(NetworkError::InvalidDistance {
                id: self.id.clone(),
                distance: self.distance_m,
            })
        }
    }
}

/// Ordered run of sections between two graph nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPath {
    pub id: String,
    pub nodes: [u64; 2],
    pub smooth: bool,
    pub sections: Vec<RoadSegment>,
}

impl RoadPath {
    pub fn entry_node(&self) -> u64 {
        self.nodes[0]
    }

    pub fn exit_node(&self) -> u64 {
        self.nodes[1]
    }

    pub fn distance_m(&self) -> f64 {
        self.sections.iter().map(|s| s.distance_m).sum()
    }

    /// Whether velocity carries in from the previous path; an explicit flag on the entry
    /// section wins over the path-level one.
    pub fn carries_velocity(&self) -> bool {
        self.sections
            .first()
            .and_then(|s| s.is_smooth)
            .unwrap_or(self.smooth)
    }

    /// Whether the path starts at a junction that forces the vehicle to stop.
    pub fn starts_at_stop(&self) -> bool {
        self.sections.first().is_some_and(|s| s.is_stop_start)
    }
}

/// Collection of paths with lookup by directed node pair.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    paths: Vec<RoadPath>,
    by_nodes: BTreeMap<(u64, u64), Vec<usize>>,
}

impl RoadNetwork {
    pub fn new(paths: Vec<RoadPath>) -> Self {
        let mut by_nodes: BTreeMap<(u64, u64), Vec<usize>> = BTreeMap::new();
        for (index, path) in paths.iter().enumerate() {
            by_nodes
                .entry((path.entry_node(), path.exit_node()))
                .or_default()
                .push(index);
        }
        Self { paths, by_nodes }
    }

    pub fn paths(&self) -> &[RoadPath] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<RoadPath> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RoadPath> {
        self.paths.iter().find(|p| p.id == id)
    }

    /// First path (in file order) running from `from` to `to`.
    pub fn find_path(&self, from: u64, to: u64) -> Option<&RoadPath> {
        self.by_nodes
            .get(&(from, to))
            .and_then(|indices| indices.first())
            .map(|&i| &self.paths[i])
    }

    /// All paths running from `from` to `to`, in file order.
    pub fn paths_between(&self, from: u64, to: u64) -> impl Iterator<Item = &RoadPath> {
        self.by_nodes
            .get(&(from, to))
            .into_iter()
            .flatten()
            .map(|&i| &self.paths[i])
    }

    /// Flag the entry section of every path whose entry node is a stop-start junction.
    /// Returns how many paths were marked.
    pub fn mark_stop_start_entries(&mut self, stop_nodes: &BTreeSet<u64>) -> usize {
        let mut marked = 0;
        for path in &mut self.paths {
            if !stop_nodes.contains(&path.nodes[0]) {
                continue;
            }
            if let Some(first) = path.sections.first_mut() {
                first.is_stop_start = true;
                marked += 1;
            }
        }
        marked
    }
}

/// Load a road network from the JSON layout described at module level.
pub fn load_network<P: AsRef<Path>>(path: P) -> Result<RoadNetwork, NetworkError> {
    let contents = fs::read_to_string(path)?;
    parse_network(&contents)
}

/// Parse a road network from a JSON string.
pub fn parse_network(json: &str) -> Result<RoadNetwork, NetworkError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(root) = root else {
        return Err(NetworkError::NotAnObject);
    };

    let mut paths = Vec::with_capacity(root.len());
    for (path_id, content) in root {
        let Value::Object(fields) = content else {
            return Err(NetworkError::InvalidPath(path_id));
        };
        paths.push(parse_path(path_id, fields)?);
    }
    Ok(RoadNetwork::new(paths))
}

fn parse_path(id: String, fields: Map<String, Value>) -> Result<RoadPath, NetworkError> {
    let nodes = fields
        .get("nodes")
        .and_then(Value::as_array)
        .filter(|nodes| nodes.len() >= 2)
        .and_then(|nodes| Some([node_id(&nodes[0])?, node_id(&nodes[1])?]))
        .ok_or_else(|| NetworkError::MissingNodes(id.clone()))?;
    let smooth = fields
        .get("smooth")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut sections = Vec::new();
    for (key, value) in fields {
        if !key.contains("section") {
            continue;
        }
        let mut segment: RoadSegment = serde_json::from_value(value)?;
        segment.id = key;
        sections.push(segment);
    }

    Ok(RoadPath {
        id,
        nodes,
        smooth,
        sections,
    })
}

fn node_id(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
                .map(|v| v as u64)
        })
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Write a road network back out in the same JSON layout.
pub fn save_network<P: AsRef<Path>>(network: &RoadNetwork, path: P) -> Result<(), NetworkError> {
    let mut root = Map::new();
    for road_path in network.paths() {
        let mut fields = Map::new();
        fields.insert("nodes".into(), Value::from(road_path.nodes.to_vec()));
        fields.insert("smooth".into(), Value::Bool(road_path.smooth));
        for section in &road_path.sections {
            fields.insert(section.id.clone(), serde_json::to_value(section)?);
        }
        root.insert(road_path.id.clone(), Value::Object(fields));
    }
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(&Value::Object(root))?)?;
    Ok(())
}

/// Serde adapter for values that are either a number or `false` when unknown.
mod measured {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Value(f64),
        Flag(bool),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Value(v)) => Some(v),
            Some(Raw::Flag(_)) | None => None,
        })
    }
}
