//! Split long sections so the per-segment kinematics stay close to linear.
//!
//! Elevation was only sampled at the original endpoints, so every synthetic subsection has its
//! climb and average incline marked unknown rather than zero.

use ev_core::geo::lerp;

use crate::NetworkError;
use crate::segment::{RoadNetwork, RoadPath, RoadSegment};

/// Default upper bound on section length (m).
pub const DEFAULT_MAX_SECTION_LENGTH_M: f64 = 20.0;

/// Most pieces a single section may be split into.
pub const MAX_PIECES_PER_SECTION: usize = 100_000;

fn check_max_length(max_length_m: f64) -> Result<(), NetworkError> {
    if max_length_m.is_finite() && max_length_m > 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidSectionLength(max_length_m))
    }
}

/// Split `segment` into `ceil(L / max)` equal pieces, or return it unchanged if short enough.
///
/// Sections with a non-positive or non-finite distance are rejected, as are sections that
/// would need more than [`MAX_PIECES_PER_SECTION`] pieces.
///
/// The first piece keeps the original id and any entry flags; later pieces are named
/// `{id}_{i}`.
pub fn discretize_segment(
    segment: &RoadSegment,
    max_length_m: f64,
) -> Result<Vec<RoadSegment>, NetworkError> {
    check_max_length(max_length_m)?;
    segment.validate()?;
    if segment.distance_m <= max_length_m {
        return Ok(vec![segment.clone()]);
    }

    let exact_pieces = (segment.distance_m / max_length_m).ceil();
    if exact_pieces > MAX_PIECES_PER_SECTION as f64 {
        return Err(NetworkError::TooManyPieces {
            id: segment.id.clone(),
            pieces: exact_pieces,
            limit: MAX_PIECES_PER_SECTION,
        });
    }
    let pieces = exact_pieces as usize;
    let piece_length = segment.distance_m / pieces as f64;
    let start = segment.start();
    let end = segment.end();

    Ok((0..pieces)
        .map(|i| {
            let a = lerp(&start, &end, i as f64 / pieces as f64);
            let b = lerp(&start, &end, (i + 1) as f64 / pieces as f64);
            let first = i == 0;
            RoadSegment {
                id: if first {
                    segment.id.clone()
                } else {
                    format!("{}_{}", segment.id, i)
                },
                distance_m: piece_length,
                coordinates: [a[0], a[1], b[0], b[1]],
                climb_m: None,
                avg_incline_deg: None,
                max_incline_deg: segment.max_incline_deg,
                is_stop_start: first && segment.is_stop_start,
                is_smooth: if first { segment.is_smooth } else { None },
            }
        })
        .collect())
}

/// Discretize every section of a path, preserving order.
pub fn discretize_path(path: &RoadPath, max_length_m: f64) -> Result<RoadPath, NetworkError> {
    let mut sections = Vec::with_capacity(path.sections.len());
    for section in &path.sections {
        sections.extend(discretize_segment(section, max_length_m)?);
    }
    Ok(RoadPath {
        id: path.id.clone(),
        nodes: path.nodes,
        smooth: path.smooth,
        sections,
    })
}

/// Discretize a whole network, producing a new one.
pub fn discretize_network(
    network: &RoadNetwork,
    max_length_m: f64,
) -> Result<RoadNetwork, NetworkError> {
    check_max_length(max_length_m)?;
    let paths = network
        .paths()
        .iter()
        .map(|path| discretize_path(path, max_length_m))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RoadNetwork::new(paths))
}
