//! User-level configuration for lngraph
//!
//! Supports loading config from:
//! - Command line flags and their environment variables
//! - ~/.config/lngraph/config.toml (or `--config <FILE>`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::Credentials;

pub const DEFAULT_URL: &str = "bolt://localhost:7687";
pub const DEFAULT_USER: &str = "neo4j";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub lnd: LndConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Graph store url (default: bolt://localhost:7687)
    pub url: Option<String>,

    /// Neo4j user (default: neo4j)
    pub user: Option<String>,

    /// Neo4j password
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct LndConfig {
    /// gRPC `host:port`; set to import over RPC instead of files
    pub grpc: Option<String>,

    /// Macaroon path (default: ~/.lnd/data/chain/bitcoin/mainnet/admin.macaroon)
    pub macaroon: Option<PathBuf>,

    /// TLS certificate path (default: ~/.lnd/tls.cert)
    pub tls_cert: Option<PathBuf>,
}

/// Where to reach an lnd node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LndTarget {
    pub address: String,
    pub macaroon: PathBuf,
    pub tls_cert: PathBuf,
}

impl UserConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist and parse. The default location is
    /// optional and skipped when missing or unreadable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        Ok(Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| match Self::from_file(&p) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring config file: {:#}", e);
                    None
                }
            })
            .unwrap_or_default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lngraph").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: UserConfig) {
        if other.store.url.is_some() {
            self.store.url = other.store.url;
        }
        if other.store.user.is_some() {
            self.store.user = other.store.user;
        }
        if other.store.password.is_some() {
            self.store.password = other.store.password;
        }
        if other.lnd.grpc.is_some() {
            self.lnd.grpc = other.lnd.grpc;
        }
        if other.lnd.macaroon.is_some() {
            self.lnd.macaroon = other.lnd.macaroon;
        }
        if other.lnd.tls_cert.is_some() {
            self.lnd.tls_cert = other.lnd.tls_cert;
        }
    }

    /// Get the graph store url
    pub fn url(&self) -> &str {
        self.store.url.as_deref().unwrap_or(DEFAULT_URL)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self
                .store
                .user
                .clone()
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: self.store.password.clone().unwrap_or_default(),
        }
    }

    /// The lnd node to import from, if RPC mode is configured.
    pub fn lnd_target(&self) -> Option<LndTarget> {
        let address = self.lnd.grpc.clone()?;
        let lnd_dir = dirs::home_dir().unwrap_or_default().join(".lnd");
        Some(LndTarget {
            address,
            macaroon: self.lnd.macaroon.clone().unwrap_or_else(|| {
                lnd_dir.join("data/chain/bitcoin/mainnet/admin.macaroon")
            }),
            tls_cert: self
                .lnd
                .tls_cert
                .clone()
                .unwrap_or_else(|| lnd_dir.join("tls.cert")),
        })
    }
}
