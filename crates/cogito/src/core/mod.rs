//! In-memory graph model
//!
//! Nodes, the directed graph that owns them, graph-space geometry and the
//! observer registry views use to follow changes.

mod error;
mod geometry;
mod graph;
mod ids;
pub mod logging;
mod node;
mod observer;

pub use error::*;
pub use geometry::*;
pub use graph::*;
pub use ids::*;
pub use node::*;
pub use observer::*;
