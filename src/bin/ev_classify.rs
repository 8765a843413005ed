use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ev_route_planner::export::writer_for_path;
use ev_route_planner::logging;
use ev_route_planner::network::{classify_stop_start, load_edges, load_network, save_network};
use ev_route_planner::report::write_stop_start_csv;

#[derive(Parser)]
#[command(author, version, about = "Flag likely stop-start junctions in an edge list")]
struct Cli {
    /// Edge-list CSV (osmid,u,v,highway,maxspeed,junction,...)
    #[arg(long)]
    edges: PathBuf,

    /// Output CSV of per-edge flags (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Road segment data to mark with the flags
    #[arg(long, requires = "network_output")]
    network: Option<PathBuf>,

    /// Where to write the marked road segment data
    #[arg(long)]
    network_output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let edges = load_edges(&cli.edges)
        .with_context(|| format!("failed to load {}", cli.edges.display()))?;
    let report = classify_stop_start(&edges);

    let mut writer = writer_for_path(&cli.output)
        .with_context(|| format!("failed to open {}", cli.output.display()))?;
    write_stop_start_csv(&report, writer.as_mut())?;

    if let (Some(input), Some(output)) = (&cli.network, &cli.network_output) {
        let mut network =
            load_network(input).with_context(|| format!("failed to load {}", input.display()))?;
        let marked = network.mark_stop_start_entries(&report.stop_start_nodes());
        save_network(&network, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        eprintln!("Marked {marked} path entries as stop-start");
    }

    Ok(())
}
