use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use scission_networks::{
    loader,
    reaction::ReactionGraph,
    scission::recursive_scissions,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Seed molecule files (atoms/bonds JSON), one per species.
    #[arg(required = true)]
    seeds: Vec<PathBuf>,

    /// Log the frontier at each expansion round.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let mut seeds = Vec::new();
    for path in &cli.seeds {
        let molecule = loader::parse(path).with_context(|| format!("loading {path:?}"))?;
        tracing::debug!("loaded {molecule}:\n{}", molecule.info());
        seeds.push(molecule);
    }

    let enumeration = recursive_scissions(&seeds);
    if !enumeration.failures.is_empty() {
        eprintln!("{} species failed to expand", enumeration.failures.len());
    }

    // Merge the per-event networks into one graph for printing.
    let mut merged = ReactionGraph::new();
    for event in &enumeration.network {
        for (reactants, products) in event.to_reaction_list() {
            merged.add_reaction(&reactants, &products);
        }
    }
    println!("{merged}");
    println!("{} reactions", merged.reaction_count());
    Ok(())
}
