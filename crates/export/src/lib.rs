//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

/// Per-segment trace of a simulated route.
pub mod segments {
    use std::io::{self, Write};

    const HEADER: &str = "path_id,section_id,distance_m,climb_m,incline_deg,initial_velocity_m_s,final_velocity_m_s,acceleration_m_s2,accel_time_s,constant_time_s,total_time_s,energy_wh,peak_current_a,avg_current_a,peak_c_rate,avg_c_rate,capacity_after_ah,aging_loss_ah,reached_target,feasible,saturated";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row emitted for every simulated section.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub path_id: &'a str,
        pub section_id: &'a str,
        pub distance_m: f64,
        pub climb_m: Option<f64>,
        pub incline_deg: f64,
        pub initial_velocity_m_s: f64,
        pub final_velocity_m_s: f64,
        pub acceleration_m_s2: f64,
        pub accel_time_s: f64,
        pub constant_time_s: f64,
        pub total_time_s: f64,
        pub energy_wh: f64,
        pub peak_current_a: f64,
        pub avg_current_a: f64,
        pub peak_c_rate: f64,
        pub avg_c_rate: f64,
        pub capacity_after_ah: f64,
        pub aging_loss_ah: f64,
        pub reached_target: bool,
        pub feasible: bool,
        pub saturated: bool,
    }

    impl Record<'_> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{},{:.3},{},{:.4},{:.4},{:.4},{:.5},{:.3},{:.3},{:.3},{:.6},{:.4},{:.4},{:.5},{:.5},{:.6},{:.9},{},{},{}",
                self.path_id,
                self.section_id,
                self.distance_m,
                super::optional(self.climb_m),
                self.incline_deg,
                self.initial_velocity_m_s,
                self.final_velocity_m_s,
                self.acceleration_m_s2,
                self.accel_time_s,
                self.constant_time_s,
                self.total_time_s,
                self.energy_wh,
                self.peak_current_a,
                self.avg_current_a,
                self.peak_c_rate,
                self.avg_c_rate,
                self.capacity_after_ah,
                self.aging_loss_ah,
                self.reached_target,
                self.feasible,
                self.saturated,
            )
        }
    }
}

/// Routing weights per directed node pair.
pub mod weights {
    use std::io::{self, Write};

    const HEADER: &str = "u,v,weight";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    #[derive(Debug, Clone, Copy)]
    pub struct Record {
        pub u: u64,
        pub v: u64,
        pub weight: f64,
    }

    impl Record {
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(writer, "{},{},{:.6}", self.u, self.v, self.weight)
        }
    }
}

/// Stop-start flags per edge.
pub mod stop_start {
    use std::io::{self, Write};

    const HEADER: &str = "osmid,is_stop_start,confidence";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub osmid: &'a str,
        pub is_stop_start: bool,
        pub confidence: f64,
    }

    impl Record<'_> {
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            // ids may be list-valued ("[1, 2]") so they are quoted
            writeln!(
                writer,
                "\"{}\",{},{:.1}",
                self.osmid.replace('"', "\"\""),
                self.is_stop_start,
                self.confidence
            )
        }
    }
}

/// One summary row per route of a batch run.
pub mod batch {
    use std::io::{self, Write};

    const HEADER: &str = "route_id,segments,distance_m,energy_wh,climb_m,time_s,wh_per_km,charge_drawn_ah,final_capacity_ah,aging_loss_ah,infeasible_segments,saturated_phases,missing_segments,capacity_exhausted,error";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// Route totals, or the error that stopped the route.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub route_id: &'a str,
        pub segments: usize,
        pub distance_m: f64,
        pub energy_wh: f64,
        pub climb_m: f64,
        pub time_s: f64,
        pub wh_per_km: f64,
        pub charge_drawn_ah: f64,
        pub final_capacity_ah: f64,
        pub aging_loss_ah: f64,
        pub infeasible_segments: usize,
        pub saturated_phases: usize,
        pub missing_segments: usize,
        pub capacity_exhausted: bool,
        pub error: Option<&'a str>,
    }

    impl Record<'_> {
        pub fn failed<'a>(route_id: &'a str, error: &'a str) -> Record<'a> {
            Record {
                route_id,
                segments: 0,
                distance_m: 0.0,
                energy_wh: 0.0,
                climb_m: 0.0,
                time_s: 0.0,
                wh_per_km: 0.0,
                charge_drawn_ah: 0.0,
                final_capacity_ah: 0.0,
                aging_loss_ah: 0.0,
                infeasible_segments: 0,
                saturated_phases: 0,
                missing_segments: 0,
                capacity_exhausted: false,
                error: Some(error),
            }
        }

        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{},{:.3},{:.6},{:.3},{:.3},{:.4},{:.6},{:.6},{:.9},{},{},{},{},\"{}\"",
                self.route_id,
                self.segments,
                self.distance_m,
                self.energy_wh,
                self.climb_m,
                self.time_s,
                self.wh_per_km,
                self.charge_drawn_ah,
                self.final_capacity_ah,
                self.aging_loss_ah,
                self.infeasible_segments,
                self.saturated_phases,
                self.missing_segments,
                self.capacity_exhausted,
                self.error.unwrap_or_default().replace('"', "\"\""),
            )
        }
    }
}

/// Pretty JSON sidecar wrapping a route summary with run metadata.
pub mod summary {
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    use chrono::{SecondsFormat, Utc};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// What was simulated.
    #[derive(Debug)]
    pub struct Metadata<'a> {
        pub vehicle: &'a str,
        pub network: &'a str,
        pub route: &'a str,
    }

    #[derive(Serialize)]
    struct Sidecar<'a, T: Serialize> {
        generated_at: String,
        vehicle: &'a str,
        network: &'a str,
        route: &'a str,
        summary: &'a T,
    }

    /// Write `summary` with metadata and a UTC generation timestamp to `output`.
    pub fn write_sidecar<T: Serialize>(
        output: &Path,
        meta: &Metadata<'_>,
        summary: &T,
    ) -> io::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sidecar = Sidecar {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            vehicle: meta.vehicle,
            network: meta.network,
            route: meta.route,
            summary,
        };
        to_writer_pretty(File::create(output)?, &sidecar)?;
        Ok(())
    }
}
