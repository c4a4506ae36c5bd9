//! On-disk persistence for graphs
//!
//! One directory per graph, with a text manifest for the name and
//! adjacency and one small directory of text files per node.

mod config;
mod encoding;
mod fs_ops;
mod graph_store;
mod info;
pub mod manifest;

pub use config::*;
pub use encoding::{decode, encode};
pub use graph_store::*;
pub use info::*;
