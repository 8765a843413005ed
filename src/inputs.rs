//! Input assembly shared by the binaries: parameter sets and prepared road data.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ev_config::{
    EnvironmentConfig, ScenarioConfig, SimulationConfig, WeightConfig, load_battery,
    load_environment, load_scenario, load_vehicle,
};
use ev_network::{RoadNetwork, classify_stop_start, discretize_network, load_edges, load_network};
use tracing::info;

/// Where the parameter sets come from: a combined scenario, separate per-set files, or both
/// (separate files override the scenario's sections).
#[derive(Debug, Default, Clone, Copy)]
pub struct ParameterSources<'a> {
    pub scenario: Option<&'a Path>,
    pub vehicle: Option<&'a Path>,
    pub environment: Option<&'a Path>,
    pub battery: Option<&'a Path>,
}

pub fn load_parameters(sources: ParameterSources<'_>) -> Result<ScenarioConfig> {
    let base = sources
        .scenario
        .map(|path| {
            load_scenario(path).with_context(|| format!("failed to load {}", path.display()))
        })
        .transpose()?;

    let vehicle = match sources.vehicle {
        Some(path) => {
            load_vehicle(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => base
            .as_ref()
            .map(|s| s.vehicle.clone())
            .ok_or_else(|| anyhow!("no vehicle parameters: pass --scenario or --vehicle"))?,
    };
    let battery = match sources.battery {
        Some(path) => {
            load_battery(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => base
            .as_ref()
            .map(|s| s.battery)
            .ok_or_else(|| anyhow!("no battery parameters: pass --scenario or --battery"))?,
    };
    let environment = match sources.environment {
        Some(path) => load_environment(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => base
            .as_ref()
            .map(|s| s.environment)
            .unwrap_or_else(EnvironmentConfig::default),
    };

    Ok(ScenarioConfig {
        vehicle,
        environment,
        battery,
        weights: base
            .as_ref()
            .map(|s| s.weights)
            .unwrap_or_else(WeightConfig::default),
        simulation: base
            .as_ref()
            .map(|s| s.simulation)
            .unwrap_or_else(SimulationConfig::default),
    })
}

/// Load road data, apply stop-start flags from an edge list, and optionally discretize.
pub fn prepare_network(
    network_path: &Path,
    edges_path: Option<&Path>,
    max_section_length_m: Option<f64>,
) -> Result<RoadNetwork> {
    let mut network = load_network(network_path)
        .with_context(|| format!("failed to load {}", network_path.display()))?;

    if let Some(edges_path) = edges_path {
        let edges = load_edges(edges_path)
            .with_context(|| format!("failed to load {}", edges_path.display()))?;
        let report = classify_stop_start(&edges);
        let marked = network.mark_stop_start_entries(&report.stop_start_nodes());
        info!(marked, "applied stop-start flags to path entries");
    }

    if let Some(max_length) = max_section_length_m {
        network = discretize_network(&network, max_length)?;
        info!(
            max_length_m = max_length,
            sections = network.paths().iter().map(|p| p.sections.len()).sum::<usize>(),
            "discretized network"
        );
    }
    Ok(network)
}
