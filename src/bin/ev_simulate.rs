use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use ev_route_planner::export::{summary, writer_for_path};
use ev_route_planner::inputs::{ParameterSources, load_parameters, prepare_network};
use ev_route_planner::network::RoadPath;
use ev_route_planner::report::{format_summary, write_segments_csv};
use ev_route_planner::route::parameters::from_scenario;
use ev_route_planner::route::{simulate_node_route, simulate_route};
use ev_route_planner::logging;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Simulate energy use and battery stress along a route"
)]
struct Cli {
    /// Combined scenario manifest (TOML, YAML or JSON)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Vehicle parameter file (overrides the scenario)
    #[arg(long)]
    vehicle: Option<PathBuf>,

    /// Environment parameter file (overrides the scenario)
    #[arg(long)]
    environment: Option<PathBuf>,

    /// Battery parameter file (overrides the scenario)
    #[arg(long)]
    battery: Option<PathBuf>,

    /// Road segment data (JSON)
    #[arg(long)]
    network: PathBuf,

    /// Edge-list CSV used to flag stop-start junctions
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Split sections longer than this many metres before simulating
    #[arg(long)]
    max_section_length: Option<f64>,

    /// Ordered node ids of the route (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "paths")]
    nodes: Vec<u64>,

    /// Ordered path ids of the route (comma separated); all paths in file order when omitted
    #[arg(long, value_delimiter = ',')]
    paths: Vec<String>,

    /// Cruise speed in m/s (defaults to the vehicle's maximum speed)
    #[arg(long)]
    target_velocity: Option<f64>,

    /// Write the per-segment trace as CSV (`-` for stdout)
    #[arg(long)]
    segments_csv: Option<PathBuf>,

    /// Write the route summary as a JSON sidecar
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut scenario = load_parameters(ParameterSources {
        scenario: cli.scenario.as_deref(),
        vehicle: cli.vehicle.as_deref(),
        environment: cli.environment.as_deref(),
        battery: cli.battery.as_deref(),
    })?;
    if let Some(target) = cli.target_velocity {
        scenario.simulation.target_velocity_m_s = Some(target);
    }
    let params = from_scenario(&scenario)?;

    let max_section_length = cli
        .max_section_length
        .or(scenario.simulation.max_section_length_m);
    let network = prepare_network(&cli.network, cli.edges.as_deref(), max_section_length)?;

    let report = if !cli.nodes.is_empty() {
        if cli.nodes.len() < 2 {
            bail!("a node route needs at least two nodes");
        }
        simulate_node_route(&params, &network, &cli.nodes)?
    } else {
        let paths: Vec<&RoadPath> = if cli.paths.is_empty() {
            network.paths().iter().collect()
        } else {
            cli.paths
                .iter()
                .map(|id| {
                    network
                        .get(id)
                        .ok_or_else(|| anyhow!("path '{id}' not found in {}", cli.network.display()))
                })
                .collect::<Result<Vec<_>>>()?
        };
        simulate_route(&params, &paths)?
    };

    println!("{}", format_summary(&report.summary));

    if let Some(path) = &cli.segments_csv {
        let mut writer =
            writer_for_path(path).with_context(|| format!("failed to open {}", path.display()))?;
        write_segments_csv(&report, writer.as_mut())?;
    }

    if let Some(path) = &cli.summary_json {
        let route = if cli.nodes.is_empty() {
            cli.paths.join(",")
        } else {
            cli.nodes
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        let network_name = cli.network.display().to_string();
        summary::write_sidecar(
            path,
            &summary::Metadata {
                vehicle: &params.vehicle.name,
                network: &network_name,
                route: &route,
            },
            &report.summary,
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
