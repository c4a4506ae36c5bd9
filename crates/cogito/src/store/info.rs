//! Lightweight listing entries for saved graphs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::GraphId;

/// Name and identifier of a saved graph, read without loading its nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphInfo {
    pub name: String,
    pub id: GraphId,
}

impl GraphInfo {
    pub fn new(name: impl Into<String>, id: GraphId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Shows the name only, as in a picker list
impl fmt::Display for GraphInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_name() {
        let info = GraphInfo::new("Ideas", GraphId::new());
        assert_eq!(info.to_string(), "Ideas");
    }

    #[test]
    fn test_serializes_id_as_string() {
        let id = GraphId::new();
        let json = serde_json::to_value(GraphInfo::new("Ideas", id)).unwrap();
        assert_eq!(json["name"], "Ideas");
        assert_eq!(json["id"], id.to_string());
    }
}
