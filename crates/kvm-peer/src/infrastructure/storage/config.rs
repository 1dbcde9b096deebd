//! TOML-based configuration persistence for a KVM Mesh peer.
//!
//! Reads and writes [`PeerConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\KvmMesh\config.toml`
//! - Linux:    `~/.config/kvmmesh/config.toml`
//! - macOS:    `~/Library/Application Support/KvmMesh/config.toml`
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  It looks similar to INI files but with more
//! data types.  Example:
//!
//! ```toml
//! [peer]
//! name = "alpha"
//! log_level = "info"
//!
//! [workspace]
//! desktop_order = ["alpha", "beta"]
//! sticky_corner_size = 6
//! block_transfer_while_button_pressed = false
//!
//! [workspace.y_offsets]
//! beta = 120
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  A peer can
//! therefore start without any config file at all.
//!
//! # Live settings
//!
//! The workspace reads its settings through
//! [`ConfigurationProvider`] every time it needs them.  [`ConfigStore`] holds
//! the current [`PeerConfig`] behind a lock so that [`ConfigStore::reload`]
//! takes effect on the next roster change without restarting.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use kvm_core::{DesktopName, DEFAULT_STICKY_CORNER_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::application::ports::ConfigurationProvider;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level peer configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PeerConfig {
    #[serde(default)]
    pub peer: PeerSection,
    #[serde(default)]
    pub workspace: WorkspaceSection,
}

/// Identity and logging of this machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeerSection {
    /// Desktop name announced to the other peers; unique per workspace,
    /// compared case-insensitively.
    #[serde(default = "default_name")]
    pub name: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// How desktops are arranged and handed off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceSection {
    /// Left-to-right order; desktops not listed follow in join order.
    #[serde(default)]
    pub desktop_order: Vec<String>,
    /// Height in pixels of the band at the top and bottom of a display in
    /// which edge crossings are suppressed.
    #[serde(default = "default_sticky_corner_size")]
    pub sticky_corner_size: i32,
    #[serde(default)]
    pub block_transfer_while_button_pressed: bool,
    /// Vertical offset of each desktop in the shared plane.
    #[serde(default)]
    pub y_offsets: BTreeMap<String, i32>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_sticky_corner_size() -> i32 {
    DEFAULT_STICKY_CORNER_SIZE
}

impl Default for PeerSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            desktop_order: Vec::new(),
            sticky_corner_size: default_sticky_corner_size(),
            block_transfer_while_button_pressed: false,
            y_offsets: BTreeMap::new(),
        }
    }
}

impl ConfigurationProvider for PeerConfig {
    fn self_name(&self) -> DesktopName {
        DesktopName::new(self.peer.name.as_str())
    }

    fn desktop_order(&self) -> Vec<DesktopName> {
        self.workspace
            .desktop_order
            .iter()
            .map(|name| DesktopName::new(name.as_str()))
            .collect()
    }

    fn y_offsets(&self) -> HashMap<DesktopName, i32> {
        self.workspace
            .y_offsets
            .iter()
            .map(|(name, offset)| (DesktopName::new(name.as_str()), *offset))
            .collect()
    }

    fn sticky_corner_size(&self) -> i32 {
        self.workspace.sticky_corner_size
    }

    fn block_transfer_while_button_pressed(&self) -> bool {
        self.workspace.block_transfer_while_button_pressed
    }
}

// ── Config store ──────────────────────────────────────────────────────────────

/// A [`PeerConfig`] bound to its file, reloadable at runtime.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: RwLock<PeerConfig>,
    /// Takes precedence over `peer.name`; never written to the file.
    name_override: Option<String>,
}

impl ConfigStore {
    /// Loads `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// See [`load_config`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = load_config(&path)?;
        Ok(Self {
            path,
            config: RwLock::new(config),
            name_override: None,
        })
    }

    /// Uses `name` as this desktop's name instead of the configured one.
    pub fn with_name_override(mut self, name: Option<String>) -> Self {
        self.name_override = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the current settings.
    pub fn current(&self) -> PeerConfig {
        self.read(PeerConfig::clone)
    }

    /// Re-reads the file.  On error the previous settings stay in effect.
    ///
    /// # Errors
    ///
    /// See [`load_config`].
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = load_config(&self.path)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        info!(path = %self.path.display(), "configuration reloaded");
        Ok(())
    }

    /// Applies `change` and writes the result back to the file.
    ///
    /// # Errors
    ///
    /// See [`save_config`].
    pub fn update(&self, change: impl FnOnce(&mut PeerConfig)) -> Result<(), ConfigError> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut *config);
        save_config(&self.path, &*config)
    }

    fn read<T>(&self, f: impl FnOnce(&PeerConfig) -> T) -> T {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        f(&*config)
    }
}

impl ConfigurationProvider for ConfigStore {
    fn self_name(&self) -> DesktopName {
        match &self.name_override {
            Some(name) => DesktopName::new(name.as_str()),
            None => self.read(PeerConfig::self_name),
        }
    }

    fn desktop_order(&self) -> Vec<DesktopName> {
        self.read(PeerConfig::desktop_order)
    }

    fn y_offsets(&self) -> HashMap<DesktopName, i32> {
        self.read(PeerConfig::y_offsets)
    }

    fn sticky_corner_size(&self) -> i32 {
        self.read(PeerConfig::sticky_corner_size)
    }

    fn block_transfer_while_button_pressed(&self) -> bool {
        self.read(PeerConfig::block_transfer_while_button_pressed)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default path of the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads a [`PeerConfig`] from `path`, returning `PeerConfig::default()` if
/// the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<PeerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PeerConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &PeerConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory, including the `KvmMesh` folder.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KvmMesh"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kvmmesh"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KvmMesh")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
