//! Core units, constants, and shared primitives for the EV route planner workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    /// Joules per watt-hour.
    pub const JOULES_PER_WH: f64 = 3_600.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::JOULES_PER_WH;

    /// Convert joules to watt-hours.
    #[inline]
    pub fn joules_to_wh(v: f64) -> f64 {
        v / JOULES_PER_WH
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::SECONDS_PER_HOUR;

    /// Convert seconds to hours.
    #[inline]
    pub fn seconds_to_hours(seconds: f64) -> f64 {
        seconds / SECONDS_PER_HOUR
    }

    /// Split a duration into whole hours, minutes and seconds. Negative and non-finite
    /// durations collapse to zero.
    pub fn split_hms(seconds: f64) -> (i64, i64, i64) {
        let total = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        let hours = (total / SECONDS_PER_HOUR).floor() as i64;
        let remaining = total - hours as f64 * SECONDS_PER_HOUR;
        let minutes = (remaining / 60.0).floor() as i64;
        let secs = (remaining - minutes as f64 * 60.0).floor() as i64;
        (hours, minutes, secs)
    }
}

/// Minimal lon/lat helpers so segment geometry does not need ad-hoc `[f64; 2]` math everywhere.
pub mod geo {
    /// Longitude/latitude pair in decimal degrees.
    pub type LonLat = [f64; 2];

    /// Linear interpolation between two points; `t = 0` yields `a`, `t = 1` yields `b`.
    #[inline]
    pub fn lerp(a: &LonLat, b: &LonLat, t: f64) -> LonLat {
        [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]
    }
}
