//! Route-level orchestration: assemble paths from node lists, traverse them segment by segment
//! while carrying velocity and battery capacity, and evaluate many routes in parallel.

pub mod assemble;
pub mod batch;
pub mod traversal;

pub use facade::*;

mod facade;

use ev_network::NetworkError;
use ev_vehicle::ParameterError;

/// Fatal precondition failures; recoverable conditions are reported in the summary instead.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid parameters: {0}")]
    Parameter(#[from] ParameterError),
    #[error("invalid road data: {0}")]
    Network(#[from] NetworkError),
    #[error("target velocity must be positive and finite, got {0}")]
    InvalidTargetVelocity(f64),
    #[error("maximum motor power must be positive and finite, got {0}")]
    InvalidMotorPower(f64),
    #[error("degradation model coefficients are invalid (k = {k}, n = {n})")]
    InvalidDegradationModel { k: f64, n: f64 },
}
