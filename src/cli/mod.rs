//! CLI command definitions and handlers

mod import;
mod stats;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lngraph::config::{LndConfig, StoreConfig, UserConfig};

/// lngraph - Lightning Network graph importer
#[derive(Parser, Debug)]
#[command(name = "lngraph")]
#[command(
    version,
    about = "Import Lightning Network data into a graph database",
    long_about = "lngraph loads the channel graph, on-chain transactions and peers of a \
Lightning node into Neo4j (or an embedded graph store) as Node, Channel and \
Transaction nodes linked by OPENED, FUNDED and PEER relationships.\n\n\
Input comes from `lncli` JSON output or straight from lnd over gRPC.",
    after_help = "\
Examples:
  lncli describegraph > graph.json
  lngraph --graph graph.json                         Import nodes and channels
  lngraph --graph graph.json --chaintxns txns.json   Also link funding transactions
  lncli listpeers | lngraph --peers - --getinfo info.json --nodelete
  lngraph --lnd-grpc localhost:10009                 Import everything over gRPC
  lngraph --url file://./lngraph-data stats          Count what an embedded store holds"
)]
pub struct Cli {
    /// Graph store url: bolt://, neo4j://, file://<dir> or memory: [default: bolt://localhost:7687]
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Neo4j user [default: neo4j]
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Config file (default: ~/.config/lngraph/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Hide progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Output of `lncli describegraph` (`-` reads stdin)
    #[arg(long, value_name = "FILE", conflicts_with = "lnd_grpc")]
    pub graph: Option<PathBuf>,

    /// Output of `lncli listchaintxns`
    #[arg(long, value_name = "FILE", conflicts_with = "lnd_grpc")]
    pub chaintxns: Option<PathBuf>,

    /// Output of `lncli listpeers` (needs --getinfo)
    #[arg(long, value_name = "FILE", requires = "getinfo", conflicts_with = "lnd_grpc")]
    pub peers: Option<PathBuf>,

    /// Output of `lncli getinfo`
    #[arg(long, value_name = "FILE", conflicts_with = "lnd_grpc")]
    pub getinfo: Option<PathBuf>,

    /// Start without deleting existing data
    #[arg(long = "nodelete")]
    pub no_delete: bool,

    /// Import over gRPC from lnd at HOST:PORT instead of files
    #[arg(long = "lnd-grpc", value_name = "HOST:PORT")]
    pub lnd_grpc: Option<String>,

    /// Macaroon for --lnd-grpc
    #[arg(long, value_name = "FILE")]
    pub macaroon: Option<PathBuf>,

    /// TLS certificate for --lnd-grpc
    #[arg(long = "tls-cert", value_name = "FILE")]
    pub tls_cert: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Import into the graph store (default)
    Import,

    /// Print node and relationship counts of the graph store
    Stats,
}

impl Cli {
    /// Settings given on the command line, as a config layer.
    fn overrides(&self) -> UserConfig {
        UserConfig {
            store: StoreConfig {
                url: self.url.clone(),
                user: self.user.clone(),
                password: self.password.clone(),
            },
            lnd: LndConfig {
                grpc: self.lnd_grpc.clone(),
                macaroon: self.macaroon.clone(),
                tls_cert: self.tls_cert.clone(),
            },
        }
    }

    /// Whether any JSON input file was given.
    fn has_files(&self) -> bool {
        self.graph.is_some()
            || self.chaintxns.is_some()
            || self.peers.is_some()
            || self.getinfo.is_some()
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let mut config = UserConfig::load(cli.config.as_deref())?;
    config.merge(cli.overrides());

    match cli.command.unwrap_or(Commands::Import) {
        Commands::Import => import::run(&cli, &config),
        Commands::Stats => stats::run(&config),
    }
}
