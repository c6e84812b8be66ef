use std::path::{Path, PathBuf};

use alembic::chemistry::{ReactionDefinition, ReactionRegistry, Reagents, load_ron};
use alembic::config;
use alembic::scenario::{ScenarioDefinition, ScenarioRunner};
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario RON file (default: built-in demo)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Extra reaction rules RON file
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Config file base name, `.ron` is appended when missing
    #[arg(long, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    /// Number of ticks to run (overrides run.ticks)
    #[arg(long)]
    ticks: Option<u32>,

    /// Seed for reaction ordering (overrides run.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Log every vessel every N ticks (0 = only at the end)
    #[arg(long, default_value = "50")]
    report_every: u32,

    /// Save the final state of every vessel as RON
    #[arg(long)]
    save: Option<PathBuf>,

    /// List the reagent catalog and exit
    #[arg(long)]
    list_reagents: bool,

    /// List the reaction rules and exit
    #[arg(long)]
    list_reactions: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = config::load(&args.config)?;
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }

    let scenario = match &args.scenario {
        Some(path) => ScenarioDefinition::from_file(path)?,
        None => ScenarioDefinition::demo(),
    };
    let extra_rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => Vec::new(),
    };

    if args.list_reagents || args.list_reactions {
        let catalog = scenario.catalog();
        if args.list_reagents {
            list_reagents(&catalog);
        }
        if args.list_reactions {
            list_reactions(&scenario.registry(&catalog, &extra_rules)?, &catalog);
        }
        return Ok(());
    }

    let ticks = config.run.ticks;
    log::info!("Starting Alembic");
    log::info!("  Scenario: {}", scenario.name);
    log::info!("  Ticks: {}", ticks);
    log::info!("  Seed: {}", config.run.seed);

    let network = scenario.build(config, &extra_rules)?;
    let mut runner = ScenarioRunner::new(scenario, network);
    let report = runner.run(ticks, args.report_every);
    println!("{}", report.summary());

    if let Some(path) = &args.save {
        runner.save(path)?;
    }

    if !report.passed() {
        anyhow::bail!("{} verification check(s) failed", report.failed_count());
    }
    Ok(())
}

fn load_rules(path: &Path) -> anyhow::Result<Vec<ReactionDefinition>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
    let rules = load_ron(&text)
        .with_context(|| format!("Failed to parse RON rules: {}", path.display()))?;
    log::info!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

fn list_reagents(catalog: &Reagents) {
    println!("{:<20} {:>10} {:>10} {:>12}", "reagent", "melts °C", "boils °C", "J/(mol·K)");
    for (_, def) in catalog.iter().filter(|(id, _)| !id.is_empty()) {
        println!(
            "{:<20} {:>10.1} {:>10.1} {:>12.2}  state at 20 °C: {:?}",
            def.name,
            def.melting_point,
            def.boiling_point,
            def.heat_capacity,
            def.state_at(20.0)
        );
    }
}

fn list_reactions(registry: &ReactionRegistry, catalog: &Reagents) {
    for (_, rule) in registry.iter() {
        let side = |parts: Vec<String>| parts.join(" + ");
        let ingredients = side(
            rule.ingredients
                .iter()
                .map(|i| format!("{} {}", i.amount, catalog.name(i.reagent)))
                .collect(),
        );
        let results = side(
            rule.results
                .iter()
                .map(|p| format!("{} {}", p.amount, catalog.name(p.reagent)))
                .collect(),
        );
        println!(
            "{:<24} {} -> {}  [{:?}, {} J]",
            rule.name, ingredients, results, rule.flags, rule.energy
        );
    }
}
