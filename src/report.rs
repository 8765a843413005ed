//! Mapping of simulation outputs onto the export record types, plus the console summary.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};

use ev_core::time::split_hms;
use ev_export::{batch, segments, stop_start, weights};
use ev_network::StopStartReport;
use ev_route::{BatchOutcome, RouteReport, RouteSummary};

/// Write the per-segment trace of `report` as CSV, header included.
pub fn write_segments_csv(report: &RouteReport, writer: &mut dyn Write) -> io::Result<()> {
    segments::write_header(writer)?;
    for segment in report.segments() {
        let result = &segment.result;
        segments::Record {
            path_id: &segment.path_id,
            section_id: &segment.section_id,
            distance_m: segment.distance_m,
            climb_m: segment.climb_m,
            incline_deg: segment.incline_deg,
            initial_velocity_m_s: result.initial_velocity_m_s,
            final_velocity_m_s: result.final_velocity_m_s,
            acceleration_m_s2: result.acceleration_m_s2,
            accel_time_s: result.acceleration_phase.time_s,
            constant_time_s: result.constant_phase.time_s,
            total_time_s: result.total_time_s,
            energy_wh: result.total_energy_wh,
            peak_current_a: result.peak_current_a,
            avg_current_a: result.avg_current_a,
            peak_c_rate: result.peak_c_rate,
            avg_c_rate: result.avg_c_rate,
            capacity_after_ah: segment.capacity_after_ah,
            aging_loss_ah: segment.aging_loss_ah,
            reached_target: result.reached_target,
            feasible: result.feasible,
            saturated: result.saturated_phases() > 0,
        }
        .write_to(writer)?;
    }
    writer.flush()
}

pub fn write_weights_csv(
    edge_weights: &BTreeMap<(u64, u64), f64>,
    writer: &mut dyn Write,
) -> io::Result<()> {
    weights::write_header(writer)?;
    for (&(u, v), &weight) in edge_weights {
        weights::Record { u, v, weight }.write_to(writer)?;
    }
    writer.flush()
}

pub fn write_stop_start_csv(report: &StopStartReport, writer: &mut dyn Write) -> io::Result<()> {
    stop_start::write_header(writer)?;
    for (osmid, flag) in &report.edges {
        stop_start::Record {
            osmid,
            is_stop_start: flag.is_stop_start,
            confidence: flag.confidence,
        }
        .write_to(writer)?;
    }
    writer.flush()
}

/// One row per batch entry; failed routes carry their error text.
pub fn write_batch_csv(outcomes: &[BatchOutcome], writer: &mut dyn Write) -> io::Result<()> {
    batch::write_header(writer)?;
    for outcome in outcomes {
        match &outcome.result {
            Ok(summary) => batch::Record {
                route_id: &outcome.id,
                segments: summary.segment_count(),
                distance_m: summary.total_distance_m,
                energy_wh: summary.total_energy_wh,
                climb_m: summary.total_climb_m,
                time_s: summary.total_time_s,
                wh_per_km: summary.wh_per_km,
                charge_drawn_ah: summary.charge_drawn_ah,
                final_capacity_ah: summary.final_capacity_ah,
                aging_loss_ah: summary.aging_loss_ah,
                infeasible_segments: summary.infeasible_segments,
                saturated_phases: summary.saturated_phases,
                missing_segments: summary.missing_segments,
                capacity_exhausted: summary.capacity_exhausted,
                error: None,
            }
            .write_to(writer)?,
            Err(err) => {
                let message = err.to_string();
                batch::Record::failed(&outcome.id, &message).write_to(writer)?
            }
        }
    }
    writer.flush()
}

/// Human-readable route summary for the console.
pub fn format_summary(summary: &RouteSummary) -> String {
    let (h, m, s) = split_hms(summary.total_time_s);
    let mut out = String::new();
    let _ = writeln!(out, "=== Route Summary ===");
    let _ = writeln!(
        out,
        "Segments: {} | Distance: {:.1} m | Climb: {:.1} m",
        summary.segment_count(),
        summary.total_distance_m,
        summary.total_climb_m
    );
    let _ = writeln!(
        out,
        "Energy: {:.3} Wh ({:.2} Wh/km, {:.2} Wh/m climb)",
        summary.total_energy_wh, summary.wh_per_km, summary.wh_per_climb_m
    );
    let _ = writeln!(out, "Time: {h:02}:{m:02}:{s:02}");
    let _ = writeln!(
        out,
        "Battery: drew {:.4} Ah, {:.4} Ah left, aging loss {:.3e} Ah",
        summary.charge_drawn_ah, summary.final_capacity_ah, summary.aging_loss_ah
    );
    let _ = write!(
        out,
        "Infeasible: {} | Saturated phases: {} | Missing segments: {}",
        summary.infeasible_segments, summary.saturated_phases, summary.missing_segments
    );
    if summary.capacity_exhausted {
        let _ = write!(out, "\nWARNING: battery capacity exhausted");
    }
    out
}
