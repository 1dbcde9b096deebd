//! The workspace: the single owner of this machine's view of the shared desktop.
//!
//! The [`Workspace`] holds the desktop roster, the [`DisplayLayout`] built from
//! it, and the [`LocalState`] describing what role this machine plays right
//! now.  It reacts to every [`WorkspaceEvent`] and is the only code that ever
//! changes any of that state.
//!
//! # Ordering
//!
//! A `Workspace` is not shared.  [`super::runtime::spawn`] moves it into one
//! worker task that handles events strictly one after the other, awaiting
//! each handler (including the peer calls it makes) before starting the next.
//! Two boundary crossings can therefore never interleave, and a topology
//! change is never observed halfway through a handoff.
//!
//! The handlers themselves are split by concern into sibling modules:
//! `mouse`, `keyboard`, `control`, and `topology`.

use std::collections::HashSet;
use std::sync::Arc;

use kvm_core::{
    DeltaDebounce, Desktop, DesktopName, DisplayLayout, LayoutError, LocalState, MouseButton,
    PeerCall, Point, Rectangle,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::events::{LocalEvent, PeerEvent, WorkspaceEvent};
use super::ports::{
    ConfigurationProvider, InputError, InputManager, NetworkError, WorkspaceNetwork,
};
use super::runtime::EventSink;
use super::topology::order_desktops;

/// Error type for workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("workspace is not initialized")]
    NotInitialized,

    #[error("workspace has shut down")]
    ShutDown,

    #[error("workspace queue is full")]
    QueueFull,
}

/// Immutable view of the workspace, published after every change.
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    pub self_name: DesktopName,
    pub state: LocalState,
    pub desktops: Arc<Vec<Desktop>>,
    pub layout: Arc<DisplayLayout>,
}

/// Orchestrates local input, peer events, and the handoff state machine.
pub struct Workspace {
    pub(super) config: Arc<dyn ConfigurationProvider>,
    pub(super) network: Arc<dyn WorkspaceNetwork>,
    pub(super) input: Arc<dyn InputManager>,
    pub(super) self_name: DesktopName,
    /// Replaced, never mutated, so published snapshots stay valid.
    pub(super) desktops: Arc<Vec<Desktop>>,
    pub(super) layout: Arc<DisplayLayout>,
    pub(super) state: LocalState,
    /// Last global cursor position seen on this machine.
    pub(super) last_global_point: Point,
    /// Local cursor position captured when input was last blocked.
    pub(super) blocked_local_point: Point,
    pub(super) debounce: DeltaDebounce,
    pub(super) pressed_buttons: HashSet<MouseButton>,
    initialized: bool,
    disposed: bool,
    snapshots: watch::Sender<Arc<WorkspaceSnapshot>>,
}

impl Workspace {
    /// Creates an uninitialised workspace.  The self name is read from
    /// `config` once, here.
    pub fn new(
        config: Arc<dyn ConfigurationProvider>,
        network: Arc<dyn WorkspaceNetwork>,
        input: Arc<dyn InputManager>,
    ) -> Self {
        let self_name = config.self_name();
        let state = LocalState::uncontrolled(Rectangle::default());
        let desktops = Arc::new(Vec::new());
        let layout = Arc::new(DisplayLayout::default());
        let (snapshots, _) = watch::channel(Arc::new(WorkspaceSnapshot {
            self_name: self_name.clone(),
            state: state.clone(),
            desktops: Arc::clone(&desktops),
            layout: Arc::clone(&layout),
        }));

        Self {
            config,
            network,
            input,
            self_name,
            desktops,
            layout,
            state,
            last_global_point: Point::default(),
            blocked_local_point: Point::default(),
            debounce: DeltaDebounce::default(),
            pressed_buttons: HashSet::new(),
            initialized: false,
            disposed: false,
            snapshots,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Routes local input and peer events into `sink`.
    pub fn subscribe(&self, sink: EventSink) {
        self.input.subscribe(sink.clone());
        self.network.subscribe(sink);
    }

    /// Builds the initial roster and layout and places this machine
    /// `Uncontrolled` on the display under the cursor.
    ///
    /// Calling it again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Input`] if the local displays or cursor cannot
    /// be read, and [`WorkspaceError::Layout`] if the roster is malformed.
    pub fn initialize(&mut self) -> Result<(), WorkspaceError> {
        if self.initialized {
            return Ok(());
        }
        if self.disposed {
            return Err(WorkspaceError::ShutDown);
        }

        let local = self.input.displays()?;
        let mut roster = vec![local.into_desktop(self.self_name.clone())];
        for desktop in self.network.connected_desktops() {
            if !roster.iter().any(|d| d.name == desktop.name) {
                roster.push(desktop);
            }
        }
        let roster = order_desktops(&self.config.desktop_order(), roster);
        let layout = DisplayLayout::build(&roster, &self.config.y_offsets())?;
        self.desktops = Arc::new(roster);
        self.layout = Arc::new(layout);

        let home = self.home_display();
        let cursor = self.to_global(self.input.cursor_position()?);
        let active_display = match self.layout.find_point(cursor) {
            Some(hit) if hit.desktop == self.self_name => hit.global,
            _ => home,
        };
        self.state = LocalState::Uncontrolled {
            active_display,
            base_display: home,
        };
        self.last_global_point = cursor;
        self.initialized = true;

        info!(
            desktop = %self.self_name,
            desktops = self.desktops.len(),
            displays = self.layout.len(),
            "workspace initialized"
        );
        self.publish_snapshot();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Stops listening to input and the network and releases local input.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.input.unsubscribe();
        self.network.unsubscribe();
        if let Err(e) = self.input.block_input(false) {
            warn!(error = %e, "failed to unblock input during dispose");
        }
        info!(desktop = %self.self_name, "workspace disposed");
    }

    // ── Event dispatch ────────────────────────────────────────────────────────

    /// Handles one event to completion.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotInitialized`] before [`initialize`](Self::initialize)
    /// and [`WorkspaceError::ShutDown`] after [`dispose`](Self::dispose); otherwise
    /// whatever the handler's collaborators reported.
    pub async fn handle(&mut self, event: WorkspaceEvent) -> Result<(), WorkspaceError> {
        if self.disposed {
            return Err(WorkspaceError::ShutDown);
        }
        if !self.initialized {
            return Err(WorkspaceError::NotInitialized);
        }

        let result = match event {
            WorkspaceEvent::Local(event) => self.handle_local(event).await,
            WorkspaceEvent::Peer(event) => self.handle_peer(event).await,
        };
        self.publish_snapshot();
        result
    }

    async fn handle_local(&mut self, event: LocalEvent) -> Result<(), WorkspaceError> {
        match event {
            LocalEvent::MouseMoved(point) => self.on_mouse_moved(point).await,
            LocalEvent::MouseButtonPressed(button) => self.on_mouse_button(button, true).await,
            LocalEvent::MouseButtonReleased(button) => self.on_mouse_button(button, false).await,
            LocalEvent::MouseWheel { delta, direction } => {
                self.on_mouse_wheel(delta, direction).await
            }
            LocalEvent::KeyPressed(key) => self.on_key(key, true).await,
            LocalEvent::KeyReleased(key) => self.on_key(key, false).await,
            LocalEvent::DisplaysChanged(displays) => {
                self.on_local_displays_changed(displays).await
            }
            LocalEvent::SystemEvent => {
                info!(state = %self.state, "system event; returning to the primary display");
                self.return_to_primary_display(true).await;
                Ok(())
            }
        }
    }

    async fn handle_peer(&mut self, event: PeerEvent) -> Result<(), WorkspaceError> {
        match event {
            PeerEvent::ClientConnected(desktop) => self.on_client_connected(desktop).await,
            PeerEvent::ClientDisconnected(name) => self.on_client_disconnected(name).await,
            PeerEvent::ClientDisplaysChanged {
                desktop,
                displays,
                primary,
            } => self.on_client_displays_changed(desktop, displays, primary).await,
            PeerEvent::DesktopRosterChanged => self.on_desktop_roster_changed().await,
            PeerEvent::ControlAssumed(from) => self.on_control_assumed(from).await,
            PeerEvent::ControlRelinquished(from) => self.on_control_relinquished(from),
            PeerEvent::ResignedFromControl(from) => {
                self.on_resigned_from_control(from).await;
                Ok(())
            }
            PeerEvent::MouseMoveReceived { from, point } => self.on_remote_mouse_move(&from, point),
            PeerEvent::MouseButtonReceived {
                from,
                button,
                pressed,
            } => self.on_remote_mouse_button(&from, button, pressed),
            PeerEvent::MouseWheelReceived {
                from,
                delta,
                direction,
            } => self.on_remote_mouse_wheel(&from, delta, direction),
            PeerEvent::KeyboardReceived { from, key, pressed } => {
                self.on_remote_key(&from, key, pressed)
            }
            PeerEvent::ControlledMouseMoveReceived { from, point } => {
                self.on_controlled_mouse_move(&from, point);
                Ok(())
            }
        }
    }

    // ── Return to primary ─────────────────────────────────────────────────────

    /// Abandons whatever this machine was doing and puts the cursor back in
    /// the middle of its own primary display, with local input released.
    ///
    /// When leaving `Controlling`, the active desktop is told to
    /// `RelinquishControl` if `notify_active` is set and it is still in the
    /// roster.  When leaving `Controlled`, every controller is told to
    /// `ResignFromControl`.  Peer failures are logged, never propagated.
    pub async fn return_to_primary_display(&mut self, notify_active: bool) {
        let home = self.home_display();
        let previous = std::mem::replace(&mut self.state, LocalState::uncontrolled(home));
        let center = home.center();
        self.last_global_point = center;

        if previous.is_uncontrolled() {
            debug!("returning to the primary display");
        } else {
            info!(previous = %previous, "returning to the primary display");
        }

        if let Err(e) = self.input.block_input(false) {
            warn!(error = %e, "failed to unblock local input");
        }
        if let Err(e) = self.input.controller().move_mouse(self.to_local(center)) {
            warn!(error = %e, "failed to recenter the local cursor");
        }

        match previous {
            LocalState::Controlling { active_desktop, .. }
                if notify_active && self.is_known_desktop(&active_desktop) =>
            {
                self.notify(&active_desktop, PeerCall::RelinquishControl).await;
            }
            LocalState::Controlled { by } => {
                for controller in &by {
                    self.notify(controller, PeerCall::ResignFromControl).await;
                }
            }
            _ => {}
        }

        self.publish_snapshot();
    }

    // ── Peer calls ────────────────────────────────────────────────────────────

    /// Sends `call` to the desktop this machine is driving.  A target that is
    /// no longer connected sends this machine home instead of failing.
    pub(super) async fn forward(
        &mut self,
        target: &DesktopName,
        call: PeerCall,
    ) -> Result<(), WorkspaceError> {
        match self.network.call(target, call).await {
            Err(NetworkError::UnknownDesktop(name)) => {
                warn!(
                    desktop = %name,
                    "controlled desktop is gone; returning to the primary display"
                );
                self.return_to_primary_display(false).await;
                Ok(())
            }
            other => other.map_err(WorkspaceError::from),
        }
    }

    /// Sends `call` and only logs a failure.
    pub(super) async fn notify(&self, target: &DesktopName, call: PeerCall) {
        let name = call.name();
        if let Err(e) = self.network.call(target, call).await {
            warn!(desktop = %target, call = name, error = %e, "peer call failed");
        }
    }

    // ── Geometry helpers ──────────────────────────────────────────────────────

    pub(super) fn self_desktop(&self) -> Option<&Desktop> {
        self.desktops.iter().find(|d| d.name == self.self_name)
    }

    pub(super) fn is_known_desktop(&self, name: &DesktopName) -> bool {
        self.desktops.iter().any(|d| &d.name == name)
    }

    /// This machine's primary display in local coordinates.
    pub(super) fn local_primary_display(&self) -> Option<Rectangle> {
        self.self_desktop().and_then(Desktop::primary_or_first)
    }

    /// This machine's primary display in global coordinates; an empty
    /// rectangle at the desktop origin if it has no displays.
    pub(super) fn home_display(&self) -> Rectangle {
        let origin = self.layout.origin(&self.self_name).unwrap_or_default();
        match self.local_primary_display() {
            Some(local) => local.offset(origin.x, origin.y),
            None => Rectangle::new(origin.x, origin.y, 0, 0),
        }
    }

    pub(super) fn to_global(&self, local: Point) -> Point {
        self.layout.to_global(&self.self_name, local).unwrap_or(local)
    }

    pub(super) fn to_local(&self, global: Point) -> Point {
        self.layout.to_local(&self.self_name, global).unwrap_or(global)
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    pub fn self_name(&self) -> &DesktopName {
        &self.self_name
    }

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    pub fn layout(&self) -> Arc<DisplayLayout> {
        Arc::clone(&self.layout)
    }

    pub fn desktops(&self) -> Arc<Vec<Desktop>> {
        Arc::clone(&self.desktops)
    }

    /// Receiver for the snapshots published after every change.
    pub fn snapshots(&self) -> watch::Receiver<Arc<WorkspaceSnapshot>> {
        self.snapshots.subscribe()
    }

    pub(super) fn publish_snapshot(&self) {
        self.snapshots.send_if_modified(|current| {
            let changed = current.state != self.state
                || !Arc::ptr_eq(&current.desktops, &self.desktops)
                || !Arc::ptr_eq(&current.layout, &self.layout);
            if changed {
                *current = Arc::new(WorkspaceSnapshot {
                    self_name: self.self_name.clone(),
                    state: self.state.clone(),
                    desktops: Arc::clone(&self.desktops),
                    layout: Arc::clone(&self.layout),
                });
            }
            changed
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
