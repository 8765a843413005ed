//! Road network data consumed by the simulation: path/section records, the discretizer that
//! bounds section length, and the stop-start junction classifier.

pub mod discretize;
pub mod edges;
pub mod segment;
pub mod stop_start;

pub use discretize::{discretize_network, discretize_path, discretize_segment};
pub use edges::{EdgeRecord, load_edges};
pub use segment::{RoadNetwork, RoadPath, RoadSegment, load_network, parse_network, save_network};
pub use stop_start::{StopStartFlag, StopStartReport, classify_stop_start};

use thiserror::Error;

/// Errors raised while loading or transforming road data.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to read road data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse road data JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse edge CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("road data root must be a JSON object of paths")]
    NotAnObject,
    #[error("path '{0}' is missing a two-node 'nodes' list")]
    MissingNodes(String),
    #[error("section '{id}' has invalid distance {distance}")]
    InvalidDistance { id: String, distance: f64 },
    #[error("maximum section length must be positive and finite, got {0}")]
    InvalidSectionLength(f64),
    #[error("section '{id}' would split into {pieces} pieces (limit {limit})")]
    TooManyPieces { id: String, pieces: f64, limit: usize },
    #[error("path '{0}' is not a JSON object")]
    InvalidPath(String),
}
