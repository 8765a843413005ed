use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ev_route_planner::config::WeightConfig;
use ev_route_planner::export::writer_for_path;
use ev_route_planner::inputs::prepare_network;
use ev_route_planner::logging;
use ev_route_planner::report::write_weights_csv;
use ev_route_planner::route::parameters::weights_from_config;
use ev_route_planner::weighting::edge_weights;

#[derive(Parser)]
#[command(author, version, about = "Compute routing weights for every edge of a road network")]
struct Cli {
    /// Road segment data (JSON)
    #[arg(long)]
    network: PathBuf,

    /// Scenario manifest whose [weights] table supplies the coefficients
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Edge-list CSV used to flag stop-start junctions
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Output CSV (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let weights = match &cli.scenario {
        Some(path) => {
            ev_route_planner::config::load_scenario(path)
                .with_context(|| format!("failed to load {}", path.display()))?
                .weights
        }
        None => WeightConfig::default(),
    };
    let network = prepare_network(&cli.network, cli.edges.as_deref(), None)?;
    let table = edge_weights(&network, &weights_from_config(&weights));

    let mut writer = writer_for_path(&cli.output)
        .with_context(|| format!("failed to open {}", cli.output.display()))?;
    write_weights_csv(&table, writer.as_mut())?;
    Ok(())
}
