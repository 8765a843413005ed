//! EV route energy and battery-degradation planner.
//!
//! The physics and data handling live in the workspace crates; this package re-exports them
//! under one roof and carries the glue shared by the command-line front ends.

pub use ev_battery as battery;
pub use ev_config as config;
pub use ev_export as export;
pub use ev_kinematics as kinematics;
pub use ev_network as network;
pub use ev_route as route;
pub use ev_vehicle as vehicle;
pub use ev_weighting as weighting;

pub mod inputs;
pub mod logging;
pub mod report;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
