//! Integration tests for saving, loading and listing graphs

use std::fs;
use std::path::Path;

use cogito::prelude::*;
use cogito::store::{INFO_FILE, POSITION_FILE, TITLE_FILE};

fn store(dir: &Path) -> GraphStore {
    GraphStore::new(StoreConfig::new(dir.join("graphs")).with_shadow_dir(dir.join("shadow")))
}

fn populated() -> Graph {
    let mut g = Graph::named("research").unwrap();
    let a = g
        .add(Node::restore("Alpha", "first line\nsecond line\n", -5, 7, NodeId::new()).unwrap())
        .unwrap();
    let b = g.add(Node::at("Beta", 10, 10).unwrap()).unwrap();
    let c = g.add(Node::with_information("Gamma", "").unwrap()).unwrap();
    let d = g.add(Node::new("Lonely").unwrap()).unwrap();
    g.link(a, b).unwrap();
    g.link(a, c).unwrap();
    g.link(a, b).unwrap();
    g.link(c, a).unwrap();
    g.link(d, b).unwrap();
    g
}

fn assert_same_graph(left: &Graph, right: &Graph) {
    assert_eq!(left.id(), right.id());
    assert_eq!(left.name(), right.name());
    assert_eq!(left.nodes(), right.nodes());
    for id in left.nodes() {
        let (l, r) = (left.node(id).unwrap(), right.node(id).unwrap());
        assert_eq!(l.title(), r.title());
        assert_eq!(l.information(), r.information());
        assert_eq!(l.position(), r.position());
        assert_eq!(
            left.nodes_linked_to(id).unwrap(),
            right.nodes_linked_to(id).unwrap()
        );
    }
    assert_eq!(left.to_string(), right.to_string());
}

#[test]
fn test_round_trip_preserves_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = populated();
    store.save(&graph).unwrap();
    let loaded = store.load(graph.id()).unwrap();
    assert_same_graph(&graph, &loaded);
}

#[test]
fn test_save_and_load_on_worker_threads() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let mut graph = populated();
    let view: ObserverRef<Graph> = std::sync::Arc::new(|_: &Graph| {});
    graph.subscribe(view).unwrap();

    std::thread::scope(|s| {
        s.spawn(|| store.save(&graph).unwrap()).join().unwrap();
    });

    let worker_store = store.clone();
    let id = graph.id();
    let loaded = std::thread::spawn(move || worker_store.load(id).unwrap())
        .join()
        .unwrap();
    assert_same_graph(&graph, &loaded);
}

#[test]
fn test_round_trip_utf16_and_staged_rename() {
    let tmp = tempfile::tempdir().unwrap();
    let store = GraphStore::new(
        StoreConfig::new(tmp.path().join("graphs"))
            .with_encoding(TextEncoding::Utf16)
            .with_strategy(SaveStrategy::StagedRename),
    );
    let mut graph = populated();
    store.save(&graph).unwrap();
    graph.add(Node::at("Later", 1, 1).unwrap()).unwrap();
    store.save(&graph).unwrap();
    assert_same_graph(&graph, &store.load(graph.id()).unwrap());
}

#[test]
fn test_overwrite_drops_removed_nodes() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let mut graph = populated();
    store.save(&graph).unwrap();
    let gone = graph.nodes()[1];
    graph.remove(gone).unwrap();
    store.save(&graph).unwrap();

    assert!(!store.graph_dir(graph.id()).join(gone.to_string()).exists());
    let loaded = store.load(graph.id()).unwrap();
    assert_eq!(loaded.len(), 3);
    assert!(!loaded.contains(gone));
}

#[test]
fn test_on_disk_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = populated();
    store.save(&graph).unwrap();

    let dir = store.graph_dir(graph.id());
    let manifest = fs::read_to_string(dir.join(format!("{}.gr", graph.id()))).unwrap();
    assert_eq!(manifest, graph.to_string());

    let a = graph.nodes()[0];
    let node_dir = dir.join(a.to_string());
    assert_eq!(fs::read_to_string(node_dir.join(TITLE_FILE)).unwrap(), "Alpha");
    assert_eq!(
        fs::read_to_string(node_dir.join(INFO_FILE)).unwrap(),
        "first line\nsecond line\n"
    );
    assert_eq!(fs::read_to_string(node_dir.join(POSITION_FILE)).unwrap(), "-5,7\n");
}

#[test]
fn test_unnamed_graph_stays_unnamed() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = Graph::new();
    store.save(&graph).unwrap();
    let loaded = store.load(graph.id()).unwrap();
    assert!(loaded.assigned_name().is_none());
    assert_eq!(loaded.name(), graph.id().to_string());
}

#[test]
fn test_link_target_without_row_is_materialized() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let mut graph = Graph::named("partial").unwrap();
    let a = graph.add(Node::new("A").unwrap()).unwrap();
    let b = graph.add(Node::at("B", 3, 3).unwrap()).unwrap();
    graph.link(a, b).unwrap();
    store.save(&graph).unwrap();

    // Hand-edit the manifest so B only appears as a link target.
    let manifest = store.graph_dir(graph.id()).join(format!("{}.gr", graph.id()));
    fs::write(&manifest, format!("partial\n{a},{b}\n")).unwrap();

    let loaded = store.load(graph.id()).unwrap();
    assert_eq!(loaded.nodes(), vec![a, b]);
    assert_eq!(loaded.node(b).unwrap().position(), (3, 3));
}

#[test]
fn test_load_missing_graph() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let id = GraphId::new();
    assert!(matches!(store.load(id), Err(CogitoError::NotFound { .. })));
    assert!(matches!(store.delete(id), Err(CogitoError::NotFound { .. })));
}

#[test]
fn test_load_reports_missing_node_files() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = populated();
    store.save(&graph).unwrap();
    let a = graph.nodes()[0];
    fs::remove_file(store.graph_dir(graph.id()).join(a.to_string()).join(POSITION_FILE)).unwrap();
    assert!(matches!(store.load(graph.id()), Err(CogitoError::Io { .. })));
}

#[test]
fn test_load_reports_corrupt_position() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = populated();
    store.save(&graph).unwrap();
    let a = graph.nodes()[0];
    let position = store.graph_dir(graph.id()).join(a.to_string()).join(POSITION_FILE);
    fs::write(&position, "left,up\n").unwrap();
    match store.load(graph.id()) {
        Err(CogitoError::CorruptData { path, .. }) => assert_eq!(path, position),
        other => panic!("expected corrupt data, got {other:?}"),
    }
}

#[test]
fn test_load_reports_self_link_in_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let mut graph = Graph::named("loop").unwrap();
    let a = graph.add(Node::new("A").unwrap()).unwrap();
    store.save(&graph).unwrap();
    let manifest = store.graph_dir(graph.id()).join(format!("{}.gr", graph.id()));
    fs::write(&manifest, format!("loop\n{a},{a}\n")).unwrap();
    assert!(matches!(
        store.load(graph.id()),
        Err(CogitoError::CorruptData { .. })
    ));
}

#[test]
fn test_overlong_title_on_disk_is_truncated() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = populated();
    store.save(&graph).unwrap();
    let a = graph.nodes()[0];
    let title = store.graph_dir(graph.id()).join(a.to_string()).join(TITLE_FILE);
    fs::write(&title, "t".repeat(150)).unwrap();
    let loaded = store.load(graph.id()).unwrap();
    assert_eq!(loaded.node(a).unwrap().title(), "t".repeat(100));
}

#[test]
fn test_reads_files_written_by_desktop_app() {
    // Java's UTF_16 charset: big-endian with a byte-order mark.
    fn utf16(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        bytes
    }

    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let (gid, a) = (GraphId::new(), NodeId::new());
    let dir = store.graph_dir(gid);
    fs::create_dir_all(dir.join(a.to_string())).unwrap();
    fs::write(dir.join(format!("{gid}.gr")), utf16(&format!("Légende\n{a}"))).unwrap();
    fs::write(dir.join(a.to_string()).join(TITLE_FILE), utf16("Idée")).unwrap();
    fs::write(dir.join(a.to_string()).join(INFO_FILE), utf16("")).unwrap();
    fs::write(dir.join(a.to_string()).join(POSITION_FILE), utf16("12,34\n")).unwrap();

    let loaded = store.load(gid).unwrap();
    assert_eq!(loaded.name(), "Légende");
    let node = loaded.node(a).unwrap();
    assert_eq!(node.title(), "Idée");
    assert_eq!(node.position(), (12, 34));
}

#[test]
fn test_list_saved() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    assert!(store.list_saved().unwrap().is_empty());

    let zeta = Graph::named("zeta").unwrap();
    let alpha = populated();
    store.save(&zeta).unwrap();
    store.save(&alpha).unwrap();
    fs::write(store.graphs_dir().join("stray.txt"), "x").unwrap();
    fs::create_dir(store.graphs_dir().join("not-a-graph")).unwrap();

    let infos = store.list_saved().unwrap();
    assert_eq!(
        infos,
        vec![
            GraphInfo::new("research", alpha.id()),
            GraphInfo::new("zeta", zeta.id()),
        ]
    );
}

#[test]
fn test_list_saved_surfaces_missing_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    store.ensure_layout().unwrap();
    fs::create_dir(store.graph_dir(GraphId::new())).unwrap();
    assert!(matches!(store.list_saved(), Err(CogitoError::Io { .. })));
}

#[test]
fn test_delete() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(tmp.path());
    let graph = populated();
    store.save(&graph).unwrap();
    assert!(store.exists(graph.id()));
    store.delete(graph.id()).unwrap();
    assert!(!store.exists(graph.id()));
    assert!(store.list_saved().unwrap().is_empty());
}

#[test]
fn test_open_creates_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let config = StoreConfig::in_install_dir(tmp.path().join(".cogito"));
    let store = GraphStore::open(config).unwrap();
    assert!(store.graphs_dir().is_dir());
    assert!(store.graphs_dir().ends_with("graphs"));
}
