//! lngraph - Lightning Network graph importer
//!
//! Reads the channel graph, wallet transactions and peers of a Lightning
//! node and writes them to a graph store as typed nodes and relationships.

pub mod bootstrap;
pub mod config;
pub mod graph;
pub mod importers;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod source;
