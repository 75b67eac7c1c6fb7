//! Wheelhouse command line
//!
//! Usage:
//!   wheelhouse run --preset martingale-red --trials 5000 --seed 7
//!   wheelhouse run --file my-strategy.json --parallel --store data.json
//!   wheelhouse presets                     - List built-in strategies
//!   wheelhouse validate my-strategy.json   - Check a strategy file
//!   wheelhouse compare martingale-red dalembert-system
//!   wheelhouse history --store data.json [--clear]
//!   wheelhouse export --store data.json --out backup.json
//!   wheelhouse import --store data.json backup.json

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use wh_core::{Strategy, presets};
use wh_engine::strategy_ev;
use wh_sim::{MonteCarlo, Progress, SimConfig, SimulationResults, TrialRetention, compare, report};
use wh_store::{JsonFileStore, StrategyStore};

#[derive(Parser, Debug)]
#[command(name = "wheelhouse", version, about = "Monte Carlo simulator for roulette betting strategies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate one strategy and print the report
    Run {
        /// Strategy JSON file
        #[arg(short, long, conflicts_with = "preset")]
        file: Option<PathBuf>,
        /// Built-in strategy id
        #[arg(short, long)]
        preset: Option<String>,
        #[command(flatten)]
        sim: SimArgs,
        /// Write the full results as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Append the results to this store's history
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// List built-in strategies
    Presets,
    /// Check a strategy file and print every violated rule
    Validate {
        file: PathBuf,
    },
    /// Run two strategies with the same settings and compare them
    Compare {
        /// Preset id or strategy file
        first: String,
        /// Preset id or strategy file
        second: String,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Show or clear saved simulation history
    History {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        clear: bool,
    },
    /// Back up a store
    Export {
        #[arg(long)]
        store: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace a store's contents with a backup
    Import {
        #[arg(long)]
        store: PathBuf,
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct SimArgs {
    /// Number of trials
    #[arg(short, long)]
    trials: Option<usize>,
    /// Base seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,
    /// Trials per progress update
    #[arg(short, long)]
    batch: Option<usize>,
    /// Run trials on all cores
    #[arg(long)]
    parallel: bool,
    /// Worker threads for --parallel
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,
    /// Keep aggregate statistics only
    #[arg(long)]
    summary_only: bool,
}

impl SimArgs {
    fn config(&self, default_trials: usize) -> SimConfig {
        let mut config = SimConfig::standard()
            .with_trials(self.trials.unwrap_or(default_trials))
            .with_parallel(self.parallel);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(batch) = self.batch {
            config = config.with_batch_size(batch);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        if self.summary_only {
            config = config.with_retention(TrialRetention::Summary);
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            preset,
            sim,
            out,
            store,
        } => run(file, preset, &sim, out.as_deref(), store.as_deref()),
        Commands::Presets => list_presets(),
        Commands::Validate { file } => validate(&file),
        Commands::Compare { first, second, sim } => compare_strategies(&first, &second, &sim),
        Commands::History { store, clear } => history(&store, clear),
        Commands::Export { store, out } => export(&store, out.as_deref()),
        Commands::Import { store, file } => import(&store, &file),
    }
}

fn read_strategy(path: &Path) -> Result<Strategy> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse strategy {}", path.display()))
}

/// Preset id if one matches, otherwise a file path
fn resolve_strategy(reference: &str) -> Result<Strategy> {
    match presets::preset(reference) {
        Some(strategy) => Ok(strategy),
        None => read_strategy(Path::new(reference)),
    }
}

fn open_store(path: &Path) -> Result<JsonFileStore> {
    JsonFileStore::open(path).with_context(|| format!("Failed to open store {}", path.display()))
}

fn simulate(strategy: &Strategy, config: SimConfig) -> Result<SimulationResults> {
    let total = config.num_trials;
    let mut stderr = std::io::stderr();
    let mut sink = |p: &Progress<'_>| {
        let _ = write!(stderr, "\r{}: {}/{} trials ({:.0}%)", strategy.name, p.completed, total, p.percent);
        if p.is_done() {
            let _ = writeln!(stderr);
        }
    };

    MonteCarlo::new(config)
        .run_with(strategy, &mut sink, None)
        .with_context(|| format!("Simulation of '{}' failed", strategy.name))
}

fn run(
    file: Option<PathBuf>,
    preset: Option<String>,
    sim: &SimArgs,
    out: Option<&Path>,
    store: Option<&Path>,
) -> Result<()> {
    let strategy = match (file, preset) {
        (Some(path), _) => read_strategy(&path)?,
        (None, Some(id)) => presets::preset(&id).with_context(|| format!("Unknown preset '{}'", id))?,
        (None, None) => bail!("Pass --file <json> or --preset <id>"),
    };

    let store = store.map(open_store).transpose()?;
    let default_trials = store
        .as_ref()
        .map(|s| s.preferences().default_simulation_count)
        .unwrap_or(SimConfig::standard().num_trials);

    let results = simulate(&strategy, sim.config(default_trials))?;
    println!("{}", report::to_text(&results));

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Results written to {}", path.display());
    }
    if let Some(store) = store {
        store.append_result(results).context("Failed to save results")?;
        println!("Results saved to {}", store.path().display());
    }
    Ok(())
}

fn list_presets() -> Result<()> {
    println!("{:<26} {:<30} {:>6} {:>12}", "ID", "NAME", "STEPS", "EV/SPIN");
    for strategy in presets::preloaded() {
        let ev = strategy_ev(&strategy, 1.0);
        println!("{:<26} {:<30} {:>6} {:>12.4}", strategy.id, strategy.name, strategy.steps.len(), ev);
    }
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let strategy = read_strategy(path)?;
    for warning in strategy.warnings() {
        println!("warning: {}", warning);
    }

    let errors = strategy.validation_errors();
    if errors.is_empty() {
        println!("{}: valid ({} steps)", strategy.name, strategy.steps.len());
        return Ok(());
    }
    for error in &errors {
        println!("error: {}", error);
    }
    bail!("{} has {} validation error(s)", path.display(), errors.len())
}

fn compare_strategies(first: &str, second: &str, sim: &SimArgs) -> Result<()> {
    let a = resolve_strategy(first)?;
    let b = resolve_strategy(second)?;

    // Both sides share one seed so they see comparable wheels
    let mut config = sim.config(SimConfig::standard().num_trials);
    if config.seed.is_none() {
        config = config.with_seed(rand::random());
    }

    let first_results = simulate(&a, config.clone())?;
    let second_results = simulate(&b, config)?;
    let cmp = compare(&first_results, &second_results);
    println!("{}", report::comparison_text(&first_results, &second_results, &cmp));
    Ok(())
}

fn history(path: &Path, clear: bool) -> Result<()> {
    let store = open_store(path)?;
    if clear {
        store.clear_results().context("Failed to clear history")?;
        println!("History cleared");
        return Ok(());
    }

    let results = store.list_results()?;
    if results.is_empty() {
        println!("No saved simulations");
        return Ok(());
    }
    println!("{:<24} {:<30} {:>8} {:>9} {:>12}", "WHEN", "STRATEGY", "TRIALS", "SUCCESS", "AVG FINAL");
    for r in &results {
        let when = report::format_timestamp(r.timestamp);
        println!(
            "{:<24} {:<30} {:>8} {:>8.1}% {:>12.2}",
            when, r.strategy_name, r.num_trials, r.success_rate, r.avg_final_bankroll
        );
    }
    Ok(())
}

fn export(path: &Path, out: Option<&Path>) -> Result<()> {
    let json = open_store(path)?.export_json()?;
    match out {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Exported to {}", out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn import(path: &Path, file: &Path) -> Result<()> {
    let json = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let store = open_store(path)?;
    store
        .import_json(&json)
        .with_context(|| format!("Failed to import {}", file.display()))?;
    println!("Imported {} strategies", store.list()?.len());
    Ok(())
}
