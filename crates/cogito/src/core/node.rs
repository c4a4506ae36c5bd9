//! Titled, freeform-text nodes positioned in graph space

use std::hash::{Hash, Hasher};

use tracing::trace;

use super::geometry::truncated_distance;
use super::{CogitoError, NodeId, ObserverRef, Observers, Result};

/// Minimum title length in characters
pub const MIN_TITLE_LEN: usize = 1;
/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum information length in characters
pub const MAX_INFORMATION_LEN: usize = 5000;

/// A note on the canvas
///
/// Equality and hashing go by identifier only: two nodes are the same node
/// when they carry the same [`NodeId`], whatever their current contents.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    title: String,
    information: String,
    x: i32,
    y: i32,
    observers: Observers<Node>,
}

impl Node {
    /// Create a node at the origin with empty information
    pub fn new(title: impl Into<String>) -> Result<Self> {
        Self::restore(title, String::new(), 0, 0, NodeId::new())
    }

    /// Create a node at the given position
    pub fn at(title: impl Into<String>, x: i32, y: i32) -> Result<Self> {
        Self::restore(title, String::new(), x, y, NodeId::new())
    }

    /// Create a node at the origin carrying some information
    pub fn with_information(
        title: impl Into<String>,
        information: impl Into<String>,
    ) -> Result<Self> {
        Self::restore(title, information, 0, 0, NodeId::new())
    }

    /// Rebuild a node with a known identifier
    ///
    /// Used when loading from disk so identity survives a save/load cycle.
    pub fn restore(
        title: impl Into<String>,
        information: impl Into<String>,
        x: i32,
        y: i32,
        id: NodeId,
    ) -> Result<Self> {
        let title = title.into();
        let information = information.into();
        check_title(&title)?;
        check_information(&information)?;
        trace!(node_id = %id, title = %title, x, y, "Creating node");
        Ok(Self {
            id,
            title,
            information,
            x,
            y,
            observers: Observers::new(),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the title, notifying observers if it changed
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        check_title(&title)?;
        if self.title != title {
            self.title = title;
            self.update_observers();
        }
        Ok(())
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    /// Replace the information text, notifying observers if it changed
    pub fn set_information(&mut self, information: impl Into<String>) -> Result<()> {
        let information = information.into();
        check_information(&information)?;
        if self.information != information {
            self.information = information;
            self.update_observers();
        }
        Ok(())
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn set_x(&mut self, x: i32) {
        if self.x != x {
            self.x = x;
            self.update_observers();
        }
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn set_y(&mut self, y: i32) {
        if self.y != y {
            self.y = y;
            self.update_observers();
        }
    }

    /// Move the node, with a single notification
    pub fn set_position(&mut self, x: i32, y: i32) {
        if (self.x, self.y) != (x, y) {
            self.x = x;
            self.y = y;
            self.update_observers();
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Position in the `x,y` form used by the on-disk `position` file
    pub fn position_string(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Distance from this node to `(x, y)`, truncated to two decimals
    pub fn distance_from(&self, x: i32, y: i32) -> f64 {
        truncated_distance((self.x, self.y), (x, y))
    }

    pub fn subscribe(&mut self, observer: ObserverRef<Node>) -> Result<()> {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, observer: &ObserverRef<Node>) {
        self.observers.unsubscribe(observer)
    }

    /// Deliver this node to one of its observers
    pub fn update(&self, observer: &ObserverRef<Node>) -> Result<()> {
        self.observers.notify_one(observer, self)
    }

    /// Deliver this node to all of its observers
    pub fn update_observers(&self) {
        self.observers.notify_all(self)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

fn check_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(CogitoError::validation("Node title can not be empty"));
    }
    if len > MAX_TITLE_LEN {
        return Err(CogitoError::validation(format!(
            "Node title can not be longer than {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn check_information(information: &str) -> Result<()> {
    if information.chars().count() > MAX_INFORMATION_LEN {
        return Err(CogitoError::validation(format!(
            "Node information can not be longer than {} characters",
            MAX_INFORMATION_LEN
        )));
    }
    Ok(())
}
