use qtsim::{ScenarioConfig, Scenario};
use qtsim::{bench_advance, run};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless quadtree particle arena")]
struct Args {
    /// Scenario file; looked up under `scenarios/` unless the path exists as given
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Override the number of ticks from the scenario
    #[arg(long)]
    ticks: Option<u64>,

    /// Print the tree-vs-all-pairs timing table instead of running a scenario
    #[arg(long)]
    bench: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log: String,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.is_file() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let scenario_cfg = ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.bench {
        bench_advance()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("failed to build scenario")?;

    let ticks = args.ticks.unwrap_or(scenario.engine.ticks);
    let totals = run(&mut scenario, ticks);

    info!(
        ticks,
        particles = scenario.tree.count(),
        strays = scenario.tree.strays().len(),
        regions = scenario.tree.node_count(),
        leaves = scenario.tree.leaf_count(),
        depth = scenario.tree.depth(),
        collisions = totals.resolved,
        coincident = totals.coincident,
        splits = totals.splits,
        collapses = totals.collapses,
        "run finished"
    );

    Ok(())
}
