//! Command-line interface for browsing and editing saved thought graphs

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use cogito::core::logging::{init_logging, FORMAT_ENV, LEVEL_ENV};
use cogito::{
    Graph, GraphId, GraphStore, Node, NodeId, Rectangle, SaveStrategy, StoreConfig, TextEncoding,
};

use crate::render;

/// Cogito - a personal graph of thoughts
#[derive(Parser)]
#[command(name = "cogito")]
#[command(about = "Create, browse and edit saved thought graphs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Install directory holding the `graphs` folder (defaults to $COGITO_HOME or ~/.cogito)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Directory for shadow copies taken while overwriting a graph
    #[arg(long, global = true)]
    pub shadow_dir: Option<PathBuf>,

    /// Text encoding used when writing files
    #[arg(long, value_enum, global = true, default_value_t = EncodingChoice::Utf8)]
    pub encoding: EncodingChoice,

    /// How an existing graph directory is replaced on save
    #[arg(long, value_enum, global = true, default_value_t = StrategyChoice::ShadowCopy)]
    pub strategy: StrategyChoice,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error|off)
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Encodings accepted for written files
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum EncodingChoice {
    /// UTF-8 without a byte order mark
    #[default]
    Utf8,
    /// Big-endian UTF-16 with a leading FE FF mark
    Utf16,
}

impl From<EncodingChoice> for TextEncoding {
    fn from(value: EncodingChoice) -> Self {
        match value {
            EncodingChoice::Utf8 => TextEncoding::Utf8,
            EncodingChoice::Utf16 => TextEncoding::Utf16,
        }
    }
}

/// Overwrite strategies
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum StrategyChoice {
    /// Copy the old directory aside and restore it if writing fails
    #[default]
    ShadowCopy,
    /// Write a sibling directory and rename it into place
    StagedRename,
}

impl From<StrategyChoice> for SaveStrategy {
    fn from(value: StrategyChoice) -> Self {
        match value {
            StrategyChoice::ShadowCopy => SaveStrategy::ShadowCopy,
            StrategyChoice::StagedRename => SaveStrategy::StagedRename,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saved graphs
    List {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Create and save an empty graph, printing its identifier
    New {
        /// Display name of the graph
        name: String,
    },

    /// Show the nodes and links of a graph
    Show {
        /// Graph identifier, unique identifier prefix or exact name
        graph: String,
    },

    /// Rename a graph
    Rename {
        graph: String,
        /// New display name
        name: String,
    },

    /// Add a node to a graph, printing its identifier
    AddNode {
        graph: String,
        /// Node title (1 to 100 characters)
        title: String,
        /// Free-form information text
        #[arg(long)]
        info: Option<String>,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        x: i32,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        y: i32,
    },

    /// Change the title, information or position of a node
    EditNode {
        graph: String,
        /// Node identifier, unique identifier prefix or exact title
        node: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        info: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        x: Option<i32>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<i32>,
    },

    /// Remove a node and every link pointing at it
    RemoveNode { graph: String, node: String },

    /// Add a directed link between two nodes
    Link {
        graph: String,
        from: String,
        to: String,
    },

    /// Remove one directed link between two nodes
    Unlink {
        graph: String,
        from: String,
        to: String,
    },

    /// Find the first node within a radius of a point
    At {
        graph: String,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        /// Search radius
        #[arg(long, default_value_t = 10.0)]
        radius: f64,
    },

    /// Show the part of a graph visible through a rectangle
    View {
        graph: String,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        #[arg(allow_negative_numbers = true)]
        width: i32,
        #[arg(allow_negative_numbers = true)]
        height: i32,
    },

    /// Delete a saved graph
    Delete { graph: String },
}

/// Install logging from CLI flags; environment variables take precedence
pub fn setup_logging(cli: &Cli) {
    let level = std::env::var(LEVEL_ENV)
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| cli.log_level.as_str().to_string());

    let format = std::env::var(FORMAT_ENV)
        .ok()
        .unwrap_or_else(|| cli.log_format.as_str().to_string());

    if let Err(e) = init_logging(Some(&level), Some(&format)) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
}

/// Main CLI application
pub struct CogitoApp {
    store: GraphStore,
    verbose: bool,
}

impl CogitoApp {
    /// Create an application over an existing store
    pub fn new(store: GraphStore) -> Self {
        Self {
            store,
            verbose: false,
        }
    }

    /// Build the store from the global flags, creating its directory if needed
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.home {
            Some(home) => StoreConfig::in_install_dir(home),
            None => StoreConfig::from_env(),
        }
        .with_encoding(cli.encoding.into())
        .with_strategy(cli.strategy.into());
        if let Some(dir) = &cli.shadow_dir {
            config = config.with_shadow_dir(dir);
        }

        let store = GraphStore::open(config).context("Failed to prepare the graphs directory")?;
        if cli.verbose {
            eprintln!("Cogito v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("Graphs directory: {}", store.graphs_dir().display());
        }
        Ok(Self {
            store,
            verbose: cli.verbose,
        })
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Run one command, writing its output to `out`
    pub fn run(&self, command: Commands, out: &mut impl Write) -> Result<()> {
        debug!(graphs_dir = %self.store.graphs_dir().display(), "Running command");
        match command {
            Commands::List { json } => self.list_command(json, out),
            Commands::New { name } => self.new_command(name, out),
            Commands::Show { graph } => self.show_command(&graph, out),
            Commands::Rename { graph, name } => self.rename_command(&graph, name),
            Commands::AddNode {
                graph,
                title,
                info,
                x,
                y,
            } => self.add_node_command(&graph, title, info, x, y, out),
            Commands::EditNode {
                graph,
                node,
                title,
                info,
                x,
                y,
            } => self.edit_node_command(&graph, &node, title, info, x, y),
            Commands::RemoveNode { graph, node } => self.remove_node_command(&graph, &node),
            Commands::Link { graph, from, to } => self.link_command(&graph, &from, &to, true),
            Commands::Unlink { graph, from, to } => self.link_command(&graph, &from, &to, false),
            Commands::At {
                graph,
                x,
                y,
                radius,
            } => self.at_command(&graph, x, y, radius, out),
            Commands::View {
                graph,
                x,
                y,
                width,
                height,
            } => self.view_command(&graph, Rectangle::new(x, y, width, height), out),
            Commands::Delete { graph } => self.delete_command(&graph),
        }
    }

    fn list_command(&self, json: bool, out: &mut impl Write) -> Result<()> {
        let infos = self.store.list_saved().context("Failed to list saved graphs")?;
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&infos)?)?;
        } else {
            write!(out, "{}", render::graph_list(&infos))?;
        }
        Ok(())
    }

    fn new_command(&self, name: String, out: &mut impl Write) -> Result<()> {
        let graph = Graph::named(name)?;
        self.store
            .save(&graph)
            .with_context(|| format!("Failed to save graph {}", graph.id()))?;
        info!(graph = %graph.id(), name = %graph.name(), "Created graph");
        writeln!(out, "{}", graph.id())?;
        Ok(())
    }

    fn show_command(&self, key: &str, out: &mut impl Write) -> Result<()> {
        let graph = self.load(key)?;
        write!(out, "{}", render::graph_table(&graph))?;
        Ok(())
    }

    fn rename_command(&self, key: &str, name: String) -> Result<()> {
        let mut graph = self.load(key)?;
        graph.rename(name)?;
        self.save(&graph)
    }

    fn add_node_command(
        &self,
        key: &str,
        title: String,
        info: Option<String>,
        x: i32,
        y: i32,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut graph = self.load(key)?;
        let mut node = Node::at(title, x, y)?;
        if let Some(info) = info {
            node.set_information(info)?;
        }
        let id = graph.add(node)?;
        self.save(&graph)?;
        writeln!(out, "{}", id)?;
        Ok(())
    }

    fn edit_node_command(
        &self,
        key: &str,
        node_key: &str,
        title: Option<String>,
        info: Option<String>,
        x: Option<i32>,
        y: Option<i32>,
    ) -> Result<()> {
        if title.is_none() && info.is_none() && x.is_none() && y.is_none() {
            bail!("Nothing to change: pass --title, --info, --x or --y");
        }
        let mut graph = self.load(key)?;
        let id = resolve_node(&graph, node_key)?;
        let node = graph
            .node_mut(id)
            .ok_or_else(|| anyhow!("Node {} vanished from the graph", id))?;
        if let Some(title) = title {
            node.set_title(title)?;
        }
        if let Some(info) = info {
            node.set_information(info)?;
        }
        if let Some(x) = x {
            node.set_x(x);
        }
        if let Some(y) = y {
            node.set_y(y);
        }
        self.save(&graph)
    }

    fn remove_node_command(&self, key: &str, node_key: &str) -> Result<()> {
        let mut graph = self.load(key)?;
        let id = resolve_node(&graph, node_key)?;
        let removed = graph.remove(id)?;
        if self.verbose {
            eprintln!("Removed node '{}'", removed.title());
        }
        self.save(&graph)
    }

    fn link_command(&self, key: &str, from: &str, to: &str, add: bool) -> Result<()> {
        let mut graph = self.load(key)?;
        let src = resolve_node(&graph, from)?;
        let dst = resolve_node(&graph, to)?;
        if add {
            graph.link(src, dst)?;
        } else {
            graph.unlink(src, dst)?;
        }
        self.save(&graph)
    }

    fn at_command(
        &self,
        key: &str,
        x: i32,
        y: i32,
        radius: f64,
        out: &mut impl Write,
    ) -> Result<()> {
        let graph = self.load(key)?;
        match graph.node_at(x, y, radius)? {
            Some(id) => {
                if let Some(node) = graph.node(id) {
                    writeln!(out, "{}\t{}", id, node.title())?;
                }
            }
            None => {
                if self.verbose {
                    eprintln!("No node within {} of {},{}", radius, x, y);
                }
            }
        }
        Ok(())
    }

    fn view_command(&self, key: &str, rect: Rectangle, out: &mut impl Write) -> Result<()> {
        let graph = self.load(key)?;
        let visible = graph.subgraph_in_rectangle(&rect);
        if self.verbose {
            eprintln!("{} of {} nodes inside {}", visible.len(), graph.len(), rect);
        }
        write!(out, "{}", render::subgraph(&graph, &visible))?;
        Ok(())
    }

    fn delete_command(&self, key: &str) -> Result<()> {
        let id = self.resolve_graph(key)?;
        self.store
            .delete(id)
            .with_context(|| format!("Failed to delete graph {}", id))
    }

    fn load(&self, key: &str) -> Result<Graph> {
        let id = self.resolve_graph(key)?;
        self.store
            .load(id)
            .with_context(|| format!("Failed to load graph {}", id))
    }

    fn save(&self, graph: &Graph) -> Result<()> {
        self.store
            .save(graph)
            .with_context(|| format!("Failed to save graph {}", graph.id()))
    }

    /// Resolve a full identifier, an exact name or a unique identifier prefix
    pub fn resolve_graph(&self, key: &str) -> Result<GraphId> {
        if let Ok(id) = key.parse::<GraphId>() {
            return Ok(id);
        }

        let infos = self.store.list_saved().context("Failed to list saved graphs")?;
        let by_name: Vec<GraphId> = infos.iter().filter(|i| i.name == key).map(|i| i.id).collect();
        match by_name.as_slice() {
            [id] => return Ok(*id),
            [] => {}
            _ => bail!("Several graphs are named '{}', use an identifier", key),
        }

        let prefix = key.to_ascii_lowercase();
        let by_prefix: Vec<GraphId> = infos
            .iter()
            .filter(|i| i.id.to_string().starts_with(&prefix))
            .map(|i| i.id)
            .collect();
        debug!(key, matches = by_prefix.len(), "Resolved graph by identifier prefix");
        match by_prefix.as_slice() {
            [id] => Ok(*id),
            [] => Err(anyhow!("No saved graph matches '{}'", key)),
            _ => Err(anyhow!("Identifier prefix '{}' is ambiguous", key)),
        }
    }
}

/// Resolve a node by identifier, exact title or unique identifier prefix
pub fn resolve_node(graph: &Graph, key: &str) -> Result<NodeId> {
    if let Ok(id) = key.parse::<NodeId>() {
        if graph.contains(id) {
            return Ok(id);
        }
        bail!("Node {} is not in graph '{}'", id, graph.name());
    }

    let by_title: Vec<NodeId> = graph
        .iter()
        .filter(|n| n.title() == key)
        .map(|n| n.id())
        .collect();
    match by_title.as_slice() {
        [id] => return Ok(*id),
        [] => {}
        _ => bail!("Several nodes are titled '{}', use an identifier", key),
    }

    let prefix = key.to_ascii_lowercase();
    let by_prefix: Vec<NodeId> = graph
        .iter()
        .map(|n| n.id())
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match by_prefix.as_slice() {
        [id] => Ok(*id),
        [] => Err(anyhow!("No node in '{}' matches '{}'", graph.name(), key)),
        _ => Err(anyhow!("Identifier prefix '{}' is ambiguous", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogito::GraphInfo;
    use tempfile::tempdir;

    fn app_in(dir: &std::path::Path) -> CogitoApp {
        CogitoApp::new(GraphStore::new(StoreConfig::in_install_dir(dir)))
    }

    fn run(app: &CogitoApp, args: &[&str]) -> Result<String> {
        let mut argv = vec!["cogito"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        app.run(cli.command, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_cli_parsing_global_flags() {
        let cli = Cli::try_parse_from([
            "cogito",
            "list",
            "--home",
            "/tmp/h",
            "--encoding",
            "utf16",
            "--strategy",
            "staged-rename",
        ])
        .unwrap();

        assert_eq!(cli.home.unwrap().to_string_lossy(), "/tmp/h");
        assert_eq!(cli.encoding, EncodingChoice::Utf16);
        assert_eq!(cli.strategy, StrategyChoice::StagedRename);
        assert_eq!(cli.log_level, LogLevel::Warn); // default
        match cli.command {
            Commands::List { json } => assert!(!json),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_parsing_negative_coordinates() {
        let cli = Cli::try_parse_from(["cogito", "view", "g", "-10", "-20", "30", "40"]).unwrap();
        match cli.command {
            Commands::View {
                x,
                y,
                width,
                height,
                ..
            } => {
                assert_eq!((x, y, width, height), (-10, -20, 30, 40));
            }
            _ => panic!("Expected View command"),
        }

        let cli = Cli::try_parse_from(["cogito", "add-node", "g", "T", "--x", "-5"]).unwrap();
        match cli.command {
            Commands::AddNode { x, y, info, .. } => {
                assert_eq!((x, y), (-5, 0));
                assert!(info.is_none());
            }
            _ => panic!("Expected AddNode command"),
        }
    }

    #[test]
    fn test_cli_parsing_at_default_radius() {
        let cli = Cli::try_parse_from(["cogito", "at", "g", "1", "2"]).unwrap();
        match cli.command {
            Commands::At { radius, .. } => assert_eq!(radius, 10.0),
            _ => panic!("Expected At command"),
        }
    }

    #[test]
    fn test_choice_conversions() {
        assert_eq!(TextEncoding::from(EncodingChoice::Utf16), TextEncoding::Utf16);
        assert_eq!(
            SaveStrategy::from(StrategyChoice::ShadowCopy),
            SaveStrategy::ShadowCopy
        );
        assert_eq!(LogLevel::Off.as_str(), "off");
        assert_eq!(LogFormat::Json.as_str(), "json");
    }

    #[test]
    fn test_new_then_edit_flow() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        app.store().ensure_layout().unwrap();

        let id = run(&app, &["new", "Ideas"]).unwrap().trim().to_string();
        let a = run(&app, &["add-node", "Ideas", "A", "--x", "5", "--y", "5"]).unwrap();
        let b = run(&app, &["add-node", &id, "B", "--info", "second"]).unwrap();
        run(&app, &["link", "Ideas", "A", b.trim()]).unwrap();
        run(&app, &["edit-node", "Ideas", a.trim(), "--title", "Alpha"]).unwrap();

        let graph = app.store().load(id.parse().unwrap()).unwrap();
        let alpha = graph.node(a.trim().parse().unwrap()).unwrap();
        assert_eq!(alpha.title(), "Alpha");
        assert_eq!(
            graph.nodes_linked_to(alpha.id()).unwrap(),
            vec![b.trim().parse::<NodeId>().unwrap()]
        );
        assert_eq!(
            graph.node(b.trim().parse().unwrap()).unwrap().information(),
            "second"
        );
    }

    #[test]
    fn test_at_and_view_output() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        app.store().ensure_layout().unwrap();
        run(&app, &["new", "Map"]).unwrap();
        let a = run(&app, &["add-node", "Map", "Near", "--x", "1", "--y", "1"]).unwrap();
        run(&app, &["add-node", "Map", "Far", "--x", "500", "--y", "500"]).unwrap();
        run(&app, &["link", "Map", "Near", "Far"]).unwrap();

        let found = run(&app, &["at", "Map", "0", "0", "--radius", "2"]).unwrap();
        assert_eq!(found, format!("{}\tNear\n", a.trim()));
        assert_eq!(run(&app, &["at", "Map", "100", "100"]).unwrap(), "");

        // Far is only a link target here, never a row of its own
        let view = run(&app, &["view", "Map", "0", "0", "10", "10"]).unwrap();
        assert_eq!(view.lines().count(), 1);
        assert!(view.starts_with(&a.trim()[..8]));
        assert!(view.contains("-> Far"));
    }

    #[test]
    fn test_edit_node_requires_a_change() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        app.store().ensure_layout().unwrap();
        run(&app, &["new", "G"]).unwrap();
        run(&app, &["add-node", "G", "A"]).unwrap();

        let err = run(&app, &["edit-node", "G", "A"]).unwrap_err();
        assert!(err.to_string().contains("Nothing to change"));
    }

    #[test]
    fn test_resolve_graph_by_prefix_and_ambiguity() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        app.store().ensure_layout().unwrap();
        let first = Graph::named("Same").unwrap();
        let second = Graph::named("Same").unwrap();
        app.store().save(&first).unwrap();
        app.store().save(&second).unwrap();

        assert!(app
            .resolve_graph("Same")
            .unwrap_err()
            .to_string()
            .contains("Several graphs"));
        assert_eq!(
            app.resolve_graph(&first.id().to_string()).unwrap(),
            first.id()
        );
        assert!(app.resolve_graph("zz-not-there").is_err());
    }

    #[test]
    fn test_list_json_round_trips() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        app.store().ensure_layout().unwrap();
        run(&app, &["new", "Beta"]).unwrap();
        run(&app, &["new", "Alpha"]).unwrap();

        let json = run(&app, &["list", "--json"]).unwrap();
        let infos: Vec<GraphInfo> = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_resolve_node_rejects_foreign_id() {
        let mut graph = Graph::named("G").unwrap();
        graph.add(Node::new("A").unwrap()).unwrap();
        let foreign = NodeId::new();
        assert!(resolve_node(&graph, &foreign.to_string()).is_err());
        assert!(resolve_node(&graph, "A").is_ok());
    }
}
