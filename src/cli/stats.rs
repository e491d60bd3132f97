//! Stats command: what the graph store currently holds

use anyhow::{Context, Result};
use console::style;

use lngraph::config::UserConfig;
use lngraph::graph::{self, Label, RelType};

pub fn run(config: &UserConfig) -> Result<()> {
    let mut sink = graph::open(config.url(), &config.credentials())
        .with_context(|| format!("failed to open graph store {}", config.url()))?;
    let counts = sink.counts().context("failed to count graph")?;

    println!("\n{}", style(sink.describe()).bold());
    println!("{}", style("──────────────────────────────────────").dim());

    println!("{}", style("NODES").bold());
    for label in Label::ALL {
        println!("  {:<14} {}", label, style(counts.nodes_of(label)).cyan());
    }

    println!("{}", style("RELATIONSHIPS").bold());
    for rel in RelType::ALL {
        println!("  {:<14} {}", rel, style(counts.relationships_of(rel)).cyan());
    }

    Ok(())
}
