//! Plain-text tables for terminal output
//!
//! Columns are padded by display width so titles with wide characters
//! stay aligned.

use unicode_width::UnicodeWidthStr;

use cogito::{Graph, GraphInfo, NodeId, SubGraph};

const SHORT_ID_LEN: usize = 8;

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Control characters shown as escapes so one record stays on one line
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

fn short_id(id: NodeId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// One line per saved graph: name, then identifier
pub fn graph_list(infos: &[GraphInfo]) -> String {
    let names: Vec<String> = infos.iter().map(|i| printable(&i.name)).collect();
    let width = names.iter().map(|n| n.width()).max().unwrap_or(0);
    infos
        .iter()
        .zip(&names)
        .map(|(info, name)| format!("{}  {}\n", pad(name, width), info.id))
        .collect()
}

/// Header with the graph name followed by one row per node
pub fn graph_table(graph: &Graph) -> String {
    let mut out = format!("{} ({})\n", printable(&graph.name()), graph.id());
    if graph.is_empty() {
        out.push_str("(no nodes)\n");
        return out;
    }
    let rows = graph.iter().map(|node| {
        let links = graph.nodes_linked_to(node.id()).unwrap_or_default();
        (node.id(), links)
    });
    out.push_str(&node_rows(graph, rows));
    out
}

/// Rows for the nodes of a culled view, in graph order
pub fn subgraph(graph: &Graph, visible: &SubGraph) -> String {
    let rows = graph
        .iter()
        .filter_map(|node| visible.get(&node.id()).map(|links| (node.id(), links.clone())));
    node_rows(graph, rows)
}

fn node_rows(graph: &Graph, rows: impl Iterator<Item = (NodeId, Vec<NodeId>)>) -> String {
    let rows: Vec<(NodeId, Vec<NodeId>)> = rows.collect();
    let title_of = |id: NodeId| graph.node(id).map(|n| printable(n.title())).unwrap_or_default();
    let position_of = |id: NodeId| graph.node(id).map(|n| n.position_string()).unwrap_or_default();

    let title_width = rows.iter().map(|(id, _)| title_of(*id).width()).max().unwrap_or(0);
    let position_width = rows
        .iter()
        .map(|(id, _)| position_of(*id).width())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (id, links) in &rows {
        let mut line = format!(
            "{}  {}  {}",
            short_id(*id),
            pad(&title_of(*id), title_width),
            pad(&position_of(*id), position_width)
        );
        if !links.is_empty() {
            let targets: Vec<String> = links.iter().map(|dst| title_of(*dst)).collect();
            line.push_str("  -> ");
            line.push_str(&targets.join(", "));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
