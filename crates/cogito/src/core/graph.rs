//! Directed graph of nodes with spatial queries
//!
//! The graph owns its nodes. Each member maps to an ordered list of
//! out-neighbours; the list is not deduplicated, so linking the same pair
//! twice yields two entries. Members iterate in insertion order, which
//! makes hit-testing and the textual form deterministic.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use super::{CogitoError, GraphId, Node, NodeId, ObserverRef, Observers, Rectangle, Result};

/// Maximum graph name length in characters
pub const MAX_NAME_LEN: usize = 100;

/// Visibility-filtered adjacency returned by [`Graph::subgraph_in_rectangle`]
pub type SubGraph = HashMap<NodeId, Vec<NodeId>>;

#[derive(Debug)]
struct Entry {
    node: Node,
    links: Vec<NodeId>,
}

/// A named, identified set of nodes and directed links between them
#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    name: Option<String>,
    entries: HashMap<NodeId, Entry>,
    /// Member ids in insertion order
    order: Vec<NodeId>,
    observers: Observers<Graph>,
}

impl Graph {
    /// Create an empty, unnamed graph
    pub fn new() -> Self {
        Self::build(None, GraphId::new())
    }

    /// Create an empty graph with a display name
    pub fn named(name: impl Into<String>) -> Result<Self> {
        Self::with_id(Some(name.into()), GraphId::new())
    }

    /// Create an empty graph with a known identifier
    ///
    /// Used when reconstructing a saved graph.
    pub fn with_id(name: Option<String>, id: GraphId) -> Result<Self> {
        if let Some(name) = &name {
            check_name(name)?;
        }
        Ok(Self::build(name, id))
    }

    fn build(name: Option<String>, id: GraphId) -> Self {
        Self {
            id,
            name,
            entries: HashMap::new(),
            order: Vec::new(),
            observers: Observers::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Display name: the assigned name, or the identifier when unnamed
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }

    /// The assigned name, if any
    pub fn assigned_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        check_name(&name)?;
        self.name = Some(name);
        self.update_observers();
        Ok(())
    }

    /// Number of member nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of links, counting duplicates
    pub fn link_count(&self) -> usize {
        self.entries.values().map(|e| e.links.len()).sum()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entries.get(&id).map(|e| &e.node)
    }

    /// Mutable access to a member, for editing its fields in place
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entries.get_mut(&id).map(|e| &mut e.node)
    }

    /// Members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.node(*id))
    }

    /// Snapshot of member identifiers in insertion order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    /// Add `node` with no out-links
    pub fn add(&mut self, node: Node) -> Result<NodeId> {
        let id = node.id();
        if self.contains(id) {
            return Err(CogitoError::invalid_state("Node already in graph"));
        }
        trace!(graph_id = %self.id, node_id = %id, title = %node.title(), "Adding node to graph");
        self.entries.insert(
            id,
            Entry {
                node,
                links: Vec::new(),
            },
        );
        self.order.push(id);
        debug!(node_count = self.len(), "Node added");
        self.update_observers();
        Ok(id)
    }

    /// Remove a member and every link pointing at it
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        let entry = self
            .entries
            .remove(&id)
            .ok_or_else(|| CogitoError::invalid_state("Node not in graph"))?;
        self.order.retain(|member| *member != id);
        let mut scrubbed = 0;
        for other in self.entries.values_mut() {
            let before = other.links.len();
            other.links.retain(|dst| *dst != id);
            scrubbed += before - other.links.len();
        }
        debug!(
            graph_id = %self.id,
            node_id = %id,
            incoming_removed = scrubbed,
            node_count = self.len(),
            "Node removed"
        );
        self.update_observers();
        Ok(entry.node)
    }

    fn check_endpoints(&self, src: NodeId, dst: NodeId) -> Result<()> {
        if !self.contains(src) || !self.contains(dst) {
            return Err(CogitoError::invalid_state("Node not in graph"));
        }
        if src == dst {
            return Err(CogitoError::invalid_state("Node can not be linked to itself"));
        }
        Ok(())
    }

    /// Append `dst` to the out-links of `src`
    pub fn link(&mut self, src: NodeId, dst: NodeId) -> Result<()> {
        self.check_endpoints(src, dst)?;
        if let Some(entry) = self.entries.get_mut(&src) {
            entry.links.push(dst);
        }
        trace!(src = %src, dst = %dst, "Linked nodes");
        self.update_observers();
        Ok(())
    }

    /// Remove the first link from `src` to `dst`, if there is one
    pub fn unlink(&mut self, src: NodeId, dst: NodeId) -> Result<()> {
        self.check_endpoints(src, dst)?;
        let removed = match self.entries.get_mut(&src) {
            Some(entry) => match entry.links.iter().position(|l| *l == dst) {
                Some(index) => {
                    entry.links.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };
        trace!(src = %src, dst = %dst, removed, "Unlinked nodes");
        if removed {
            self.update_observers();
        }
        Ok(())
    }

    /// Copy of the out-links of `id`, in insertion order
    pub fn nodes_linked_to(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.entries
            .get(&id)
            .map(|e| e.links.clone())
            .ok_or_else(|| CogitoError::invalid_state("Node not in graph"))
    }

    /// First member, in insertion order, within `radius` of `(x, y)`
    ///
    /// Radius zero matches only a node exactly at the point.
    pub fn node_at(&self, x: i32, y: i32, radius: f64) -> Result<Option<NodeId>> {
        if radius.is_nan() || radius < 0.0 {
            return Err(CogitoError::invalid_argument(
                "Radius must be a non-negative number",
            ));
        }
        Ok(self
            .iter()
            .find(|node| node.distance_from(x, y) <= radius)
            .map(Node::id))
    }

    /// Members positioned inside `rect`, edges included
    pub fn nodes_in_rectangle(&self, rect: &Rectangle) -> Vec<NodeId> {
        self.iter()
            .filter(|node| rect.contains_inclusive(node.x(), node.y()))
            .map(Node::id)
            .collect()
    }

    /// Adjacency restricted to what touches `rect`
    ///
    /// Nodes inside keep their full out-link list. Nodes outside appear
    /// only if they link into the rectangle, and then only with those
    /// in-bounds destinations.
    pub fn subgraph_in_rectangle(&self, rect: &Rectangle) -> SubGraph {
        let inside = |id: &NodeId| {
            self.node(*id)
                .is_some_and(|n| rect.contains_inclusive(n.x(), n.y()))
        };
        let mut sub = SubGraph::new();
        for id in &self.order {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            if inside(id) {
                sub.insert(*id, entry.links.clone());
            } else {
                let crossing: Vec<NodeId> =
                    entry.links.iter().copied().filter(|dst| inside(dst)).collect();
                if !crossing.is_empty() {
                    sub.insert(*id, crossing);
                }
            }
        }
        debug!(
            rect = %rect,
            visible = sub.len(),
            total = self.len(),
            "Computed visible subgraph"
        );
        sub
    }

    pub fn subscribe(&mut self, observer: ObserverRef<Graph>) -> Result<()> {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, observer: &ObserverRef<Graph>) {
        self.observers.unsubscribe(observer)
    }

    /// Deliver this graph to one of its observers
    pub fn update(&self, observer: &ObserverRef<Graph>) -> Result<()> {
        self.observers.notify_one(observer, self)
    }

    /// Deliver this graph to all of its observers
    pub fn update_observers(&self) {
        self.observers.notify_all(self)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Textual form stored as the graph manifest
///
/// The first line is the display name; then one line per member in
/// insertion order: the member id followed by its out-links, comma
/// separated.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name())?;
        for id in &self.order {
            write!(f, "{}", id)?;
            if let Some(entry) = self.entries.get(id) {
                for dst in &entry.links {
                    write!(f, ",{}", dst)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        return Err(CogitoError::validation("Graph name can not be empty"));
    }
    if len > MAX_NAME_LEN {
        return Err(CogitoError::validation(format!(
            "Graph name can not be longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    if name.contains(|c: char| c == '\n' || c == '\r') {
        return Err(CogitoError::validation(
            "Graph name can not contain line breaks",
        ));
    }
    Ok(())
}
