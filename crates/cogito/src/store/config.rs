//! Store configuration
//!
//! The location of saved graphs is an explicit value handed to
//! [`GraphStore`](super::GraphStore), never a process-wide global, so tests
//! and alternate installations can point it anywhere.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the installation directory
pub const HOME_ENV: &str = "COGITO_HOME";
/// Installation directory name under the user's home
pub const INSTALL_DIR_NAME: &str = ".cogito";
/// Subdirectory of the installation directory holding one folder per graph
pub const GRAPHS_DIR_NAME: &str = "graphs";

/// Character encoding used when writing text files
///
/// Reading always detects the encoding from the byte-order mark, so either
/// setting loads files written with the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TextEncoding {
    /// UTF-8 without byte-order mark
    #[default]
    Utf8,
    /// Big-endian UTF-16 with a leading byte-order mark
    Utf16,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "utf-8"),
            TextEncoding::Utf16 => write!(f, "utf-16"),
        }
    }
}

/// How an existing graph directory is replaced on save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SaveStrategy {
    /// Back the directory up elsewhere, rewrite it in place, and restore
    /// the backup if writing fails
    ///
    /// A crash between deleting the directory and restoring it loses the
    /// graph; the backup is left in the shadow directory in that case.
    #[default]
    ShadowCopy,
    /// Write a complete sibling directory first, then swap it in with two
    /// renames
    ///
    /// The original is untouched until the new contents are fully on disk.
    StagedRename,
}

impl fmt::Display for SaveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStrategy::ShadowCopy => write!(f, "shadow-copy"),
            SaveStrategy::StagedRename => write!(f, "staged-rename"),
        }
    }
}

/// Where and how graphs are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory containing one subdirectory per saved graph
    pub graphs_dir: PathBuf,
    /// Where overwrite backups are made; the OS temp dir when unset
    pub shadow_dir: Option<PathBuf>,
    pub encoding: TextEncoding,
    pub strategy: SaveStrategy,
}

impl StoreConfig {
    /// Store graphs directly under `graphs_dir`
    pub fn new(graphs_dir: impl Into<PathBuf>) -> Self {
        Self {
            graphs_dir: graphs_dir.into(),
            shadow_dir: None,
            encoding: TextEncoding::default(),
            strategy: SaveStrategy::default(),
        }
    }

    /// Store graphs under `<install_dir>/graphs`
    pub fn in_install_dir(install_dir: impl AsRef<Path>) -> Self {
        Self::new(install_dir.as_ref().join(GRAPHS_DIR_NAME))
    }

    /// Resolve the installation directory from the environment
    ///
    /// `COGITO_HOME` wins, then `.cogito` under the user's home directory,
    /// then `.cogito` in the working directory.
    pub fn from_env() -> Self {
        Self::in_install_dir(default_install_dir())
    }

    pub fn with_shadow_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shadow_dir = Some(dir.into());
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_strategy(mut self, strategy: SaveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Directory under which overwrite backups are created
    pub fn shadow_root(&self) -> PathBuf {
        self.shadow_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// The installation directory implied by the environment
pub fn default_install_dir() -> PathBuf {
    resolve_install_dir(std::env::var_os(HOME_ENV), dirs::home_dir())
}

/// `override_dir` when set and non-empty, else `<home>/.cogito`, else `.cogito`
fn resolve_install_dir(override_dir: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }
    match home {
        Some(home) => home.join(INSTALL_DIR_NAME),
        None => PathBuf::from(INSTALL_DIR_NAME),
    }
}
