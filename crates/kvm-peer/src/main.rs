//! KVM Mesh peer: entry point.
//!
//! Every machine in a KVM Mesh workspace runs the same peer.  Each one can
//! drive the others' cursors and can be driven by them; which role it plays
//! at any moment is decided by the workspace state machine in
//! [`kvm_peer::application`].
//!
//! This binary runs a headless node: the workspace is wired to the in-memory
//! input manager and to a loopback hub.  `--simulate` adds further desktops
//! to the same hub, which is enough to watch handoffs and layout changes in
//! the logs without any OS hooks or sockets.
//!
//! # Usage
//!
//! ```text
//! kvm-peer [OPTIONS]
//!
//! Options:
//!   --config   <PATH>     Config file [default: platform config dir]
//!   --name     <NAME>     Desktop name, overriding the config file
//!   --simulate <NAME>...  Extra in-process desktops to join the hub
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                         |
//! |-------------------|-------------------------------------|
//! | `KVM_MESH_CONFIG` | Config file path                    |
//! | `KVM_MESH_NAME`   | Desktop name                        |
//! | `RUST_LOG`        | Log filter, overrides `log_level`   |
//!
//! # Architecture overview
//!
//! ```text
//! main()
//!  ├─ ConfigStore::open()           -- TOML settings, live-reloadable
//!  ├─ LoopbackHub                   -- in-process peer network
//!  └─ per desktop
//!       ├─ MockInputManager         -- keyboard, mouse, monitors
//!       ├─ Workspace::new()
//!       └─ runtime::spawn()         -- single worker task per workspace
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kvm_core::Desktop;
use kvm_peer::application::ports::{ConfigurationProvider, InputManager};
use kvm_peer::application::runtime::{self, WorkspaceHandle};
use kvm_peer::application::workspace::Workspace;
use kvm_peer::infrastructure::input::mock::MockInputManager;
use kvm_peer::infrastructure::network::loopback::LoopbackHub;
use kvm_peer::infrastructure::storage::config::{default_config_path, ConfigStore, PeerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// KVM Mesh peer.
///
/// Shares one keyboard and mouse across several desktops arranged side by
/// side.
#[derive(Debug, Parser)]
#[command(
    name = "kvm-peer",
    about = "Keyboard and mouse sharing peer for KVM Mesh",
    version
)]
struct Cli {
    /// Path of the TOML configuration file.
    #[arg(long, env = "KVM_MESH_CONFIG")]
    config: Option<PathBuf>,

    /// Desktop name announced to the other peers.
    #[arg(long, env = "KVM_MESH_NAME")]
    name: Option<String>,

    /// Names of extra in-process desktops (1920×1080 each) to join the hub.
    #[arg(long, num_args = 1..)]
    simulate: Vec<String>,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => default_config_path().context("no --config given"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config_path()?;
    let store = ConfigStore::open(&path)
        .with_context(|| format!("loading {}", path.display()))?
        .with_name_override(cli.name.clone());
    let settings = store.current();

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.peer.log_level)),
        )
        .init();

    let store = Arc::new(store);
    let self_name = store.self_name();
    info!(desktop = %self_name, config = %path.display(), "KVM Mesh peer starting");

    let hub = LoopbackHub::new();
    let mut nodes = vec![start_node(&hub, store.clone()).await?];
    for name in &cli.simulate {
        let mut config = PeerConfig::default();
        config.peer.name = name.clone();
        config.workspace = settings.workspace.clone();
        nodes.push(start_node(&hub, Arc::new(config)).await?);
    }
    info!(members = hub.members().len(), "workspace running; press Ctrl-C to stop");

    wait_for_shutdown(&store, &hub).await;

    for node in nodes {
        node.shutdown().await;
    }
    info!("KVM Mesh peer stopped");
    Ok(())
}

/// Creates one desktop on `hub` and initializes its workspace.
async fn start_node(
    hub: &LoopbackHub,
    config: Arc<dyn ConfigurationProvider>,
) -> anyhow::Result<WorkspaceHandle> {
    let input = Arc::new(MockInputManager::single(1920, 1080));
    let displays = input.displays()?;
    let name = config.self_name();
    let desktop = Desktop::new(name.clone(), displays.displays, displays.primary);
    let network = Arc::new(hub.join(desktop));

    let handle = runtime::spawn(Workspace::new(config, network, input));
    handle
        .initialize()
        .await
        .with_context(|| format!("initializing workspace for {name}"))?;
    Ok(handle)
}

/// Waits for Ctrl-C.  On Unix, SIGHUP reloads the configuration and asks
/// every desktop to rebuild its layout.
#[cfg(unix)]
async fn wait_for_shutdown(store: &ConfigStore, hub: &LoopbackHub) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "SIGHUP reload unavailable");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return,
            _ = hangup.recv() => match store.reload() {
                Ok(()) => {
                    hub.announce_roster_changed();
                }
                Err(e) => warn!(error = %e, "configuration reload failed"),
            },
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_store: &ConfigStore, _hub: &LoopbackHub) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C handler failed");
    }
}
