use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ev_route_planner::export::writer_for_path;
use ev_route_planner::inputs::{ParameterSources, load_parameters, prepare_network};
use ev_route_planner::logging;
use ev_route_planner::report::write_batch_csv;
use ev_route_planner::route::parameters::from_scenario;
use ev_route_planner::route::{RouteRequest, simulate_batch};

#[derive(Parser)]
#[command(author, version, about = "Evaluate many node routes in parallel")]
struct Cli {
    /// Combined scenario manifest (TOML, YAML or JSON)
    #[arg(long)]
    scenario: PathBuf,

    /// Road segment data (JSON)
    #[arg(long)]
    network: PathBuf,

    /// JSON array of {"id": ..., "nodes": [...]} route requests
    #[arg(long)]
    routes: PathBuf,

    /// Edge-list CSV used to flag stop-start junctions
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Output CSV with one summary row per route (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let scenario = load_parameters(ParameterSources {
        scenario: Some(&cli.scenario),
        ..Default::default()
    })?;
    let params = from_scenario(&scenario)?;
    let network = prepare_network(
        &cli.network,
        cli.edges.as_deref(),
        scenario.simulation.max_section_length_m,
    )?;

    let requests: Vec<RouteRequest> = serde_json::from_reader(
        File::open(&cli.routes)
            .with_context(|| format!("failed to open {}", cli.routes.display()))?,
    )
    .with_context(|| format!("failed to parse {}", cli.routes.display()))?;

    let outcomes = simulate_batch(&params, &network, &requests)?;

    let mut writer = writer_for_path(&cli.output)
        .with_context(|| format!("failed to open {}", cli.output.display()))?;
    write_batch_csv(&outcomes, writer.as_mut())?;
    Ok(())
}
