//! Import command: source -> pipeline -> graph store

use anyhow::{Context, Result};
use console::style;
use std::time::Instant;
use tracing::debug;

use super::Cli;
use lngraph::config::{LndTarget, UserConfig};
use lngraph::graph;
use lngraph::pipeline::Pipeline;
use lngraph::source::{JsonInputs, JsonSource, Source};

pub fn run(cli: &Cli, config: &UserConfig) -> Result<()> {
    let start = Instant::now();

    let mut source = open_source(cli, config)?;
    let mut sink = graph::open(config.url(), &config.credentials())
        .with_context(|| format!("failed to open graph store {}", config.url()))?;

    if !cli.no_delete && !cli.no_progress {
        println!("{}", style("⚡ Deleting existing data").bold());
    }

    let mut pipeline = Pipeline::new(sink.as_mut());
    if cli.no_delete {
        pipeline = pipeline.keep_existing();
    }
    if cli.no_progress {
        pipeline = pipeline.without_progress();
    }
    let stats = pipeline.run(source.as_mut())?;

    println!(
        "{} {} in {:.1}s",
        style("⚡ Imported").bold(),
        stats.summary(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Files win over a configured lnd node; flags for both are rejected by clap.
fn open_source(cli: &Cli, config: &UserConfig) -> Result<Box<dyn Source>> {
    if !cli.has_files() {
        if let Some(target) = config.lnd_target() {
            return lnd_source(&target);
        }
    }

    let inputs = JsonInputs {
        graph: cli.graph.clone(),
        chaintxns: cli.chaintxns.clone(),
        peers: cli.peers.clone(),
        getinfo: cli.getinfo.clone(),
    };
    debug!("JSON inputs: {:?}", inputs);
    Ok(Box::new(JsonSource::new(inputs)?))
}

#[cfg(feature = "lnd")]
fn lnd_source(target: &LndTarget) -> Result<Box<dyn Source>> {
    let source = lngraph::source::LndSource::connect(target)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "lnd"))]
fn lnd_source(target: &LndTarget) -> Result<Box<dyn Source>> {
    anyhow::bail!(
        "cannot import from lnd at {}: lngraph was built without the `lnd` feature",
        target.address
    )
}
