//! Collaborator traits the workspace depends on.
//!
//! The workspace never talks to the operating system or the network directly.
//! Everything it needs from the outside world is expressed here as a trait and
//! injected at construction time, so the whole state machine can be driven
//! from unit tests with recording doubles.
//!
//! - [`WorkspaceNetwork`] – calls to other desktops, plus the events they send.
//! - [`InputManager`] – this machine's keyboard and mouse: capture, blocking,
//!   cursor position, monitor geometry, and injection via [`InputController`].
//! - [`ConfigurationProvider`] – who we are and how desktops are arranged.

use std::collections::HashMap;

use async_trait::async_trait;
use kvm_core::{
    Desktop, DesktopName, KeyCode, MouseButton, PeerCall, Point, ProtocolError, Rectangle,
    WheelDirection,
};
use thiserror::Error;

use super::runtime::EventSink;

/// Error type for outbound peer calls.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The target desktop is not (or no longer) connected.
    #[error("desktop {0} is not connected")]
    UnknownDesktop(DesktopName),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Error type for local input operations.
#[derive(Debug, Error)]
pub enum InputError {
    /// The platform input API reported a failure.
    #[error("platform input error: {0}")]
    Platform(String),
}

/// This machine's monitors, in local coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalDisplays {
    pub displays: Vec<Rectangle>,
    pub primary: Option<Rectangle>,
}

impl LocalDisplays {
    pub fn new(displays: Vec<Rectangle>, primary: Option<Rectangle>) -> Self {
        Self { displays, primary }
    }

    /// One monitor at the local origin, also the primary.
    pub fn single(width: i32, height: i32) -> Self {
        let display = Rectangle::new(0, 0, width, height);
        Self::new(vec![display], Some(display))
    }

    pub fn into_desktop(self, name: DesktopName) -> Desktop {
        Desktop::new(name, self.displays, self.primary)
    }
}

/// Connection to every other desktop in the workspace.
///
/// Inbound calls from peers are turned into [`PeerEvent`](super::events::PeerEvent)s
/// and pushed into the sink given to [`subscribe`](Self::subscribe).
#[async_trait]
pub trait WorkspaceNetwork: Send + Sync {
    /// Starts delivering peer events into `sink`.
    fn subscribe(&self, sink: EventSink);

    /// Stops delivering peer events.
    fn unsubscribe(&self);

    /// The desktops currently connected, excluding this one.
    fn connected_desktops(&self) -> Vec<Desktop>;

    /// Sends `call` to one desktop.
    async fn call(&self, target: &DesktopName, call: PeerCall) -> Result<(), NetworkError>;

    /// Sends `call` to every connected desktop.
    async fn broadcast(&self, call: PeerCall) -> Result<(), NetworkError>;
}

/// Injects input on this machine.
pub trait InputController: Send + Sync {
    /// Moves the cursor to `position` in local coordinates.
    fn move_mouse(&self, position: Point) -> Result<(), InputError>;
    fn press_mouse_button(&self, button: MouseButton) -> Result<(), InputError>;
    fn release_mouse_button(&self, button: MouseButton) -> Result<(), InputError>;
    fn wheel(&self, delta: i32, direction: WheelDirection) -> Result<(), InputError>;
    fn press_keyboard_button(&self, key: KeyCode) -> Result<(), InputError>;
    fn release_keyboard_button(&self, key: KeyCode) -> Result<(), InputError>;
}

/// This machine's keyboard and mouse.
///
/// Captured hardware events are pushed into the sink given to
/// [`subscribe`](Self::subscribe) as [`LocalEvent`](super::events::LocalEvent)s,
/// even while input is blocked.
pub trait InputManager: Send + Sync {
    fn subscribe(&self, sink: EventSink);
    fn unsubscribe(&self);

    /// While blocked, hardware events are still reported but no longer reach
    /// the local operating system.
    fn block_input(&self, block: bool) -> Result<(), InputError>;
    fn is_input_blocked(&self) -> bool;

    /// Current cursor position in local coordinates.
    fn cursor_position(&self) -> Result<Point, InputError>;

    fn displays(&self) -> Result<LocalDisplays, InputError>;

    fn controller(&self) -> &dyn InputController;
}

/// Settings the workspace reads whenever it needs them.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigurationProvider: Send + Sync {
    fn self_name(&self) -> DesktopName;

    /// Preferred left-to-right order of desktops.
    fn desktop_order(&self) -> Vec<DesktopName>;

    /// Per-desktop vertical offsets in pixels; absent desktops sit at 0.
    fn y_offsets(&self) -> HashMap<DesktopName, i32>;

    fn sticky_corner_size(&self) -> i32;

    /// Refuse to hand control to another desktop while a mouse button is held.
    fn block_transfer_while_button_pressed(&self) -> bool;
}
