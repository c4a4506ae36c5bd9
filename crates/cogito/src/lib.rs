//! Cogito - a personal mind-map of titled notes and directed links
//!
//! The crate holds the two pieces of real logic behind the editor: an
//! in-memory directed [`Graph`] of [`Node`]s with spatial queries for
//! hit-testing and viewport culling, and a [`GraphStore`] that saves and
//! loads graphs as directory trees without ever leaving a half-written
//! graph behind.
//!
//! # Quick Start
//!
//! ```rust
//! use cogito::prelude::*;
//!
//! let mut graph = Graph::named("demo").unwrap();
//! let a = graph.add(Node::at("Alpha", 0, 0).unwrap()).unwrap();
//! let b = graph.add(Node::at("Beta", 10, 10).unwrap()).unwrap();
//! graph.link(a, b).unwrap();
//!
//! assert_eq!(graph.node_at(10, 10, 0.0).unwrap(), Some(b));
//! assert_eq!(graph.nodes_in_rectangle(&Rectangle::new(0, 0, 5, 5)), vec![a]);
//! ```
//!
//! # Persistence
//!
//! ```rust
//! use cogito::prelude::*;
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let store = GraphStore::open(StoreConfig::new(tmp.path())).unwrap();
//!
//! let mut graph = Graph::named("notes").unwrap();
//! graph.add(Node::new("First thought").unwrap()).unwrap();
//! store.save(&graph).unwrap();
//!
//! let listed = store.list_saved().unwrap();
//! assert_eq!(listed[0].name, "notes");
//! let loaded = store.load(listed[0].id).unwrap();
//! assert_eq!(loaded.len(), 1);
//! ```

pub mod core;
pub mod store;

pub use crate::core::*;
pub use store::{GraphInfo, GraphStore, SaveStrategy, StoreConfig, TextEncoding};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        CogitoError, Graph, GraphId, Node, NodeId, Observer, ObserverRef, Rectangle, SubGraph,
    };
    pub use crate::store::{GraphInfo, GraphStore, SaveStrategy, StoreConfig, TextEncoding};
}

/// Load a saved graph from the installation directory named by the
/// environment (`COGITO_HOME`, else `~/.cogito`)
pub fn load(id: GraphId) -> Result<Graph> {
    GraphStore::new(StoreConfig::from_env()).load(id)
}

/// Save a graph into the installation directory named by the environment
pub fn save(graph: &Graph) -> Result<()> {
    GraphStore::new(StoreConfig::from_env()).save(graph)
}

/// List graphs saved in the installation directory named by the environment
pub fn list_saved() -> Result<Vec<GraphInfo>> {
    GraphStore::new(StoreConfig::from_env()).list_saved()
}
