//! Relay network scenario runner.
//!
//! Loads a scenario, warms the network up with a full refresh, then runs
//! the requested number of ticks while nodes move along their orbits.
//!
//! Usage:
//!   cargo run -p relaynet-cli --bin relaynet-sim -- --scenario constellation --ticks 500

use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use relaynet_cli::apply_env;
use relaynet_cli::sim::{
    constellation, occluded_chain, relay_chain, ConnectivityLog, EventCounts, NodeReport,
    Scenario, Simulation,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Available built-in scenarios
#[derive(Debug, Clone, ValueEnum)]
enum ScenarioType {
    /// Three vessels in a line, last one is the command station
    RelayChain,
    /// Relay chain with a moon blocking the first hop
    OccludedChain,
    /// Random orbiting relays around a planet with a ground station
    Constellation,
}

/// Relay network simulator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Built-in scenario to run
    #[arg(long, value_enum, default_value = "relay-chain")]
    scenario: ScenarioType,

    /// Scenario JSON file (overrides --scenario)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Number of ticks to run after warm-up
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Seed for the constellation scenario
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Relay count for the constellation scenario
    #[arg(long, default_value_t = 12)]
    satellites: usize,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SimReport {
    scenario: String,
    ticks: u64,
    time_s: f64,
    events: EventCounts,
    nodes: Vec<NodeReport>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relaynet_core=warn".parse()?)
                .add_directive("relaynet_cli=info".parse()?)
                .add_directive("relaynet_sim=info".parse()?),
        )
        .init();

    let args = Args::parse();
    ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "--dt must be a positive number of seconds"
    );

    let mut scenario = match &args.file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
            Scenario::from_json(&text)
                .with_context(|| format!("Failed to load scenario {}", path.display()))?
        }
        None => match args.scenario {
            ScenarioType::RelayChain => relay_chain(),
            ScenarioType::OccludedChain => occluded_chain(),
            ScenarioType::Constellation => constellation(args.seed, args.satellites),
        },
    };
    scenario.config = apply_env(scenario.config);

    tracing::info!(
        "Scenario {}: {} station(s), {} vessel(s), {} body(ies), refresh window {}",
        scenario.name,
        scenario.stations.len(),
        scenario.vessels.len(),
        scenario.bodies.len(),
        scenario.config.refresh_window
    );

    let mut sim = Simulation::new(scenario).context("Invalid network configuration")?;
    let mut log = ConnectivityLog::new(sim.names());

    let warm = sim.warm_up(&mut log);
    tracing::info!(
        "Warm-up: {} link(s), {}/{} node(s) connected to {} hub(s)",
        warm.links_added,
        warm.connected,
        warm.refreshed.len(),
        warm.hubs
    );

    for _ in 0..args.ticks {
        sim.step(args.dt, &mut log);
    }

    let report = SimReport {
        scenario: sim.scenario().name.clone(),
        ticks: sim.network().tick_count(),
        time_s: sim.time_s(),
        events: log.counts(),
        nodes: sim.report(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SimReport) {
    println!(
        "\nScenario: {} after {} tick(s), t = {:.1} s",
        report.scenario, report.ticks, report.time_s
    );
    println!(
        "Events: +{} / -{} link(s), {} connection(s) gained, {} lost\n",
        report.events.links_added,
        report.events.links_removed,
        report.events.connections_gained,
        report.events.connections_lost
    );

    for node in &report.nodes {
        let marker = if node.hub { "*" } else { " " };
        match (node.distance_m, node.delay_s) {
            (Some(distance), Some(delay)) => println!(
                "{}{:<20} {:>2} link(s)  {:>12.0} m  {:>9.4} s  {}",
                marker,
                node.name,
                node.links,
                distance,
                delay,
                node.route.join(" -> ")
            ),
            _ => println!(
                "{}{:<20} {:>2} link(s)  no connection",
                marker, node.name, node.links
            ),
        }
    }
}
