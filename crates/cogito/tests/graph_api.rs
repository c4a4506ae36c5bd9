//! Integration tests for the graph model's public API

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cogito::prelude::*;

fn demo() -> (Graph, NodeId, NodeId, NodeId) {
    let mut g = Graph::named("demo").unwrap();
    let a = g.add(Node::at("Alpha", 0, 0).unwrap()).unwrap();
    let b = g.add(Node::at("Beta", 10, 10).unwrap()).unwrap();
    let c = g.add(Node::at("Gamma", 20, 0).unwrap()).unwrap();
    g.link(a, b).unwrap();
    g.link(b, c).unwrap();
    g.link(c, a).unwrap();
    (g, a, b, c)
}

#[test]
fn test_demo_textual_form() {
    let (g, a, b, c) = demo();
    let text = g.to_string();
    assert!(text.starts_with("demo\n"));
    let lines: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![format!("{a},{b}"), format!("{b},{c}"), format!("{c},{a}")]
    );
}

#[test]
fn test_demo_visible_subgraph() {
    let (g, a, b, c) = demo();
    let sub = g.subgraph_in_rectangle(&Rectangle::new(0, 0, 10, 10));
    let keys: HashSet<NodeId> = sub.keys().copied().collect();
    assert_eq!(keys, HashSet::from([a, b, c]));
    assert_eq!(sub[&a], vec![b]);
    assert_eq!(sub[&b], vec![c]);
    assert_eq!(sub[&c], vec![a]);
}

#[test]
fn test_outside_node_without_edge_in_is_omitted() {
    let (mut g, a, _, _) = demo();
    let far = g.add(Node::at("Far", 500, 500).unwrap()).unwrap();
    g.link(a, far).unwrap();
    let sub = g.subgraph_in_rectangle(&Rectangle::new(0, 0, 10, 10));
    assert!(!sub.contains_key(&far));
    // inside nodes keep their full list, including out-of-view targets
    assert!(sub[&a].contains(&far));
}

#[test]
fn test_empty_rectangle_query() {
    let (g, ..) = demo();
    let rect = Rectangle::new(100, 100, 5, 5);
    assert!(g.nodes_in_rectangle(&rect).is_empty());
    assert!(g.subgraph_in_rectangle(&rect).is_empty());
}

#[test]
fn test_removing_a_node_leaves_no_dangling_links() {
    let (mut g, a, b, c) = demo();
    g.link(c, b).unwrap();
    g.remove(b).unwrap();
    assert!(!g.contains(b));
    for member in g.nodes() {
        assert!(!g.nodes_linked_to(member).unwrap().contains(&b));
    }
    assert_eq!(g.nodes_linked_to(c).unwrap(), vec![a]);
    assert!(g.nodes_linked_to(b).is_err());
}

#[test]
fn test_views_follow_graph_and_node_changes() {
    let (mut g, a, ..) = demo();
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let graph_log = Arc::clone(&log);
    let graph_view: ObserverRef<Graph> =
        Arc::new(move |g: &Graph| graph_log.lock().unwrap().push(format!("graph:{}", g.len())));
    g.subscribe(Arc::clone(&graph_view)).unwrap();

    let node_log = Arc::clone(&log);
    let node_view: ObserverRef<Node> =
        Arc::new(move |n: &Node| node_log.lock().unwrap().push(format!("node:{}", n.title())));
    g.node_mut(a).unwrap().subscribe(Arc::clone(&node_view)).unwrap();

    g.add(Node::new("Delta").unwrap()).unwrap();
    g.node_mut(a).unwrap().set_title("Alpha prime").unwrap();
    g.node_mut(a).unwrap().set_information("details").unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "graph:4".to_string(),
            "node:Alpha prime".to_string(),
            "node:Alpha prime".to_string(),
        ]
    );
}

#[test]
fn test_observer_struct_implementation() {
    struct Counter(AtomicUsize);

    impl Observer<Graph> for Counter {
        fn update(&self, _subject: &Graph) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let handle: ObserverRef<Graph> = counter.clone();
    let mut g = Graph::new();
    g.subscribe(Arc::clone(&handle)).unwrap();
    g.add(Node::new("x").unwrap()).unwrap();
    g.update_observers();
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}

#[test]
fn test_errors_are_user_errors() {
    let (mut g, a, ..) = demo();
    for err in [
        g.link(a, a).unwrap_err(),
        g.remove(NodeId::new()).unwrap_err(),
        g.node_at(0, 0, -1.0).unwrap_err(),
        Node::new("").unwrap_err(),
    ] {
        assert!(err.is_user_error(), "{err}");
    }
}
