//! Directory-per-graph persistence
//!
//! Layout under the configured graphs directory:
//!
//! ```text
//! <graph-id>/
//!     <graph-id>.gr      manifest: name line, then one line per node
//!     <node-id>/
//!         title
//!         info
//!         position       "x,y"
//! ```
//!
//! Saving over an existing graph never leaves it half written: either the
//! new contents are complete on disk or the previous contents are put back
//! and [`CogitoError::SaveRolledBack`] is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span, trace, warn};

use super::fs_ops::{self, DiskSink, FileSink};
use super::manifest::{self, Manifest};
use super::{GraphInfo, SaveStrategy, StoreConfig};
use crate::core::{
    CogitoError, Graph, GraphId, Node, NodeId, Result, MAX_INFORMATION_LEN, MAX_TITLE_LEN,
};

/// Node title file name
pub const TITLE_FILE: &str = "title";
/// Node information file name
pub const INFO_FILE: &str = "info";
/// Node position file name
pub const POSITION_FILE: &str = "position";
/// Manifest file extension
pub const MANIFEST_EXTENSION: &str = "gr";

/// Saves, loads and lists graphs under one graphs directory
///
/// Calls are synchronous and take no locks; at most one save or load
/// should run against a given graph at a time.
#[derive(Debug, Clone)]
pub struct GraphStore {
    config: StoreConfig,
}

impl GraphStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Open the store, creating the graphs directory if needed
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config);
        store.ensure_layout()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn graphs_dir(&self) -> &Path {
        &self.config.graphs_dir
    }

    /// Create the graphs directory and its parents
    pub fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.config.graphs_dir)?;
        Ok(())
    }

    /// Directory holding the graph `id`
    pub fn graph_dir(&self, id: GraphId) -> PathBuf {
        self.config.graphs_dir.join(id.to_string())
    }

    fn manifest_path(dir: &Path, id: GraphId) -> PathBuf {
        dir.join(format!("{}.{}", id, MANIFEST_EXTENSION))
    }

    /// Whether a saved graph with this id has a manifest on disk
    pub fn exists(&self, id: GraphId) -> bool {
        Self::manifest_path(&self.graph_dir(id), id).is_file()
    }

    /// Write `graph` to disk, replacing any previous save of it
    pub fn save(&self, graph: &Graph) -> Result<()> {
        self.save_with(graph, &mut DiskSink)
    }

    pub(crate) fn save_with(&self, graph: &Graph, sink: &mut dyn FileSink) -> Result<()> {
        let span = info_span!("save_graph", graph_id = %graph.id(), node_count = graph.len());
        let _enter = span.enter();

        self.ensure_layout()?;
        let dir = self.graph_dir(graph.id());

        if !dir.exists() {
            debug!(dir = %dir.display(), "Saving new graph");
            fs::create_dir(&dir)?;
            if let Err(e) = self.write_graph(&dir, graph, sink) {
                warn!(error = %e, "Save of new graph failed, removing partial directory");
                fs_ops::remove_dir_if_present(&dir)?;
                return Err(e.into());
            }
        } else {
            match self.config.strategy {
                SaveStrategy::ShadowCopy => self.overwrite_with_shadow(&dir, graph, sink)?,
                SaveStrategy::StagedRename => self.overwrite_staged(&dir, graph, sink)?,
            }
        }

        info!(link_count = graph.link_count(), "Graph saved");
        Ok(())
    }

    /// Back up `dir`, rewrite it in place, and restore the backup on failure
    fn overwrite_with_shadow(&self, dir: &Path, graph: &Graph, sink: &mut dyn FileSink) -> Result<()> {
        let id = graph.id();
        let shadow_root = self.config.shadow_root();
        fs::create_dir_all(&shadow_root)?;
        let shadow = tempfile::Builder::new()
            .prefix(&format!("cogito-{}-", id))
            .tempdir_in(&shadow_root)?;
        let backup = shadow.path().join(id.to_string());

        // Nothing has been touched yet if the backup itself fails.
        fs_ops::copy_dir_all(dir, &backup)?;
        trace!(backup = %backup.display(), "Shadow copy taken");

        let attempt = fs::remove_dir_all(dir)
            .and_then(|()| fs::create_dir(dir))
            .and_then(|()| self.write_graph(dir, graph, sink));

        let Err(write_error) = attempt else {
            return Ok(());
        };

        warn!(error = %write_error, "Overwrite failed, restoring previous contents");
        let restored = fs_ops::remove_dir_if_present(dir).and_then(|()| fs_ops::copy_dir_all(&backup, dir));
        match restored {
            Ok(()) => Err(CogitoError::SaveRolledBack {
                id,
                source: write_error,
            }),
            Err(restore_error) => {
                // Keep the only good copy around for manual recovery.
                #[allow(deprecated)]
                let kept = shadow.into_path();
                error!(
                    error = %restore_error,
                    backup = %kept.join(id.to_string()).display(),
                    "Restore failed, backup left in place"
                );
                Err(restore_error.into())
            }
        }
    }

    /// Write a sibling directory, then swap it in with two renames
    fn overwrite_staged(&self, dir: &Path, graph: &Graph, sink: &mut dyn FileSink) -> Result<()> {
        let id = graph.id();
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}.staging-", id))
            .tempdir_in(&self.config.graphs_dir)?;

        if let Err(write_error) = self.write_graph(staging.path(), graph, sink) {
            warn!(error = %write_error, "Staged write failed, original untouched");
            return Err(CogitoError::SaveRolledBack {
                id,
                source: write_error,
            });
        }

        let retired = self.config.graphs_dir.join(format!(".{}.old", id));
        fs_ops::remove_dir_if_present(&retired)?;
        sink.rename(dir, &retired)?;
        if let Err(swap_error) = sink.rename(staging.path(), dir) {
            warn!(error = %swap_error, "Swap failed, putting original back");
            if let Err(restore_error) = sink.rename(&retired, dir) {
                error!(
                    error = %restore_error,
                    backup = %retired.display(),
                    "Restore failed, previous contents left in hidden directory"
                );
                return Err(restore_error.into());
            }
            return Err(CogitoError::SaveRolledBack {
                id,
                source: swap_error,
            });
        }
        if let Err(e) = fs::remove_dir_all(&retired) {
            warn!(error = %e, retired = %retired.display(), "Could not remove replaced graph directory");
        }
        Ok(())
    }

    /// Write the manifest and one directory per node into `dir`
    fn write_graph(&self, dir: &Path, graph: &Graph, sink: &mut dyn FileSink) -> io::Result<()> {
        let encoding = self.config.encoding;
        let manifest = Self::manifest_path(dir, graph.id());
        fs_ops::write_text(sink, &manifest, &graph.to_string(), encoding)?;

        for node in graph.iter() {
            let node_dir = dir.join(node.id().to_string());
            sink.create_dir(&node_dir)?;
            fs_ops::write_text(sink, &node_dir.join(TITLE_FILE), node.title(), encoding)?;
            fs_ops::write_text(sink, &node_dir.join(INFO_FILE), node.information(), encoding)?;
            let position = format!("{}\n", node.position_string());
            fs_ops::write_text(sink, &node_dir.join(POSITION_FILE), &position, encoding)?;
            trace!(node_id = %node.id(), "Node written");
        }
        Ok(())
    }

    /// Reconstruct the saved graph `id`
    ///
    /// Node identities, fields, member order and link order are as they
    /// were when saved.
    pub fn load(&self, id: GraphId) -> Result<Graph> {
        let span = info_span!("load_graph", graph_id = %id);
        let _enter = span.enter();

        let dir = self.graph_dir(id);
        if !dir.is_dir() {
            return Err(CogitoError::NotFound { id });
        }

        let manifest_path = Self::manifest_path(&dir, id);
        let text = read_decoded(&manifest_path)?;
        let manifest =
            Manifest::parse(&text).map_err(|message| CogitoError::corrupt(&manifest_path, message))?;

        let name = (manifest.name != id.to_string()).then_some(manifest.name);
        let mut graph = Graph::with_id(name, id)
            .map_err(|e| CogitoError::corrupt(&manifest_path, e.to_string()))?;

        // Row heads first so member order matches the manifest, then any
        // link target that has no row of its own.
        let referenced = manifest
            .rows
            .iter()
            .map(|row| row.id)
            .chain(manifest.rows.iter().flat_map(|row| row.links.iter().copied()));
        for node_id in referenced {
            if !graph.contains(node_id) {
                graph.add(load_node(&dir, node_id)?)?;
            }
        }

        for row in &manifest.rows {
            for dst in &row.links {
                graph
                    .link(row.id, *dst)
                    .map_err(|e| CogitoError::corrupt(&manifest_path, e.to_string()))?;
            }
        }

        info!(
            node_count = graph.len(),
            link_count = graph.link_count(),
            "Graph loaded"
        );
        Ok(graph)
    }

    /// Names and identifiers of every saved graph, sorted by name
    ///
    /// Only the first line of each manifest is read. Entries that are not
    /// graph directories are skipped. The first I/O error ends the scan.
    pub fn list_saved(&self) -> Result<Vec<GraphInfo>> {
        let span = info_span!("list_saved", graphs_dir = %self.config.graphs_dir.display());
        let _enter = span.enter();

        if !self.config.graphs_dir.exists() {
            debug!("Graphs directory does not exist yet");
            return Ok(Vec::new());
        }

        let mut infos = Vec::new();
        for entry in fs::read_dir(&self.config.graphs_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(dir_name) = file_name.to_str() else {
                warn!(entry = ?file_name, "Skipping entry with non UTF-8 name");
                continue;
            };
            if dir_name.starts_with('.') {
                trace!(entry = dir_name, "Skipping hidden entry");
                continue;
            }
            let Ok(id) = dir_name.parse::<GraphId>() else {
                warn!(entry = dir_name, "Skipping directory not named by a graph identifier");
                continue;
            };
            let manifest_path = Self::manifest_path(&entry.path(), id);
            let text = read_decoded(&manifest_path)?;
            let name = match text.lines().next() {
                Some(line) if !line.trim().is_empty() => line.to_string(),
                _ => {
                    return Err(CogitoError::corrupt(
                        &manifest_path,
                        "missing graph name on first line",
                    ))
                }
            };
            infos.push(GraphInfo::new(name, id));
        }

        infos.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        debug!(graph_count = infos.len(), "Listed saved graphs");
        Ok(infos)
    }

    /// Remove a saved graph from disk
    pub fn delete(&self, id: GraphId) -> Result<()> {
        let dir = self.graph_dir(id);
        if !dir.is_dir() {
            return Err(CogitoError::NotFound { id });
        }
        fs::remove_dir_all(&dir)?;
        info!(graph_id = %id, "Graph deleted");
        Ok(())
    }
}

fn read_decoded(path: &Path) -> Result<String> {
    fs_ops::read_text(path)?.map_err(|message| CogitoError::corrupt(path, message))
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((cut, _)) = text.char_indices().nth(max) {
        text.truncate(cut);
    }
    text
}

fn load_node(graph_dir: &Path, id: NodeId) -> Result<Node> {
    let node_dir = graph_dir.join(id.to_string());
    let title = truncate_chars(read_decoded(&node_dir.join(TITLE_FILE))?, MAX_TITLE_LEN);
    let information = truncate_chars(read_decoded(&node_dir.join(INFO_FILE))?, MAX_INFORMATION_LEN);
    let position_path = node_dir.join(POSITION_FILE);
    let (x, y) = manifest::parse_position(&read_decoded(&position_path)?)
        .map_err(|message| CogitoError::corrupt(&position_path, message))?;
    trace!(node_id = %id, x, y, "Node read");
    Node::restore(title, information, x, y, id)
        .map_err(|e| CogitoError::corrupt(&node_dir, e.to_string()))
}
