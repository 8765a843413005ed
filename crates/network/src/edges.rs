//! Edge-list CSV rows as exported from the road graph (`osmid,u,v,highway,maxspeed,junction,...`).

use std::path::Path;

use serde::Deserialize;

use crate::NetworkError;

/// One directed edge of the road graph with the tags the stop-start heuristics read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRecord {
    pub osmid: String,
    pub u: u64,
    pub v: u64,
    #[serde(default)]
    pub highway: Option<String>,
    #[serde(default)]
    pub maxspeed: Option<String>,
    #[serde(default)]
    pub junction: Option<String>,
}

/// Read every edge row from a CSV file with a header line. Extra columns are ignored.
pub fn load_edges<P: AsRef<Path>>(path: P) -> Result<Vec<EdgeRecord>, NetworkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut edges = Vec::new();
    for record in reader.deserialize() {
        edges.push(record?);
    }
    Ok(edges)
}
