//! Configuration module for lngraph
//!
//! Settings come from three layers, highest priority first:
//! - command line flags (and the environment variables clap reads for them)
//! - the TOML config file
//! - built-in defaults

mod user_config;

pub use user_config::{
    LndConfig, LndTarget, StoreConfig, UserConfig, DEFAULT_URL, DEFAULT_USER,
};
