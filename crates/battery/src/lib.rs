//! Battery electrical model (discharge current, C-rate) and degradation accumulator.

pub mod degradation;
pub mod electrical;

pub use degradation::{DegradationAccumulator, DegradationModel, DegradationStep};
pub use electrical::{Discharge, c_rate, discharge_current};
