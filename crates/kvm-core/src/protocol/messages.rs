//! Peer-to-peer call vocabulary.
//!
//! Every machine in the workspace talks to every other machine using the same
//! small set of calls.  A call is always wrapped in a [`PeerEnvelope`] naming
//! the sender, because the receiver's reaction depends on who is asking (for
//! example, `RelinquishControl` removes *that* desktop from the set of
//! controllers).

use serde::{Deserialize, Serialize};

use crate::domain::desktop::DesktopName;
use crate::domain::geometry::{Point, Rectangle};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Magic number at the start of every frame ("KM").
pub const FRAME_MAGIC: u16 = 0x4B4D;

/// Total size of the frame header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Largest payload accepted by the decoder.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

// ── Input primitives ──────────────────────────────────────────────────────────

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// First extended button (usually "back").
    X1,
    /// Second extended button (usually "forward").
    X2,
}

/// Platform-neutral key code, passed through untouched between peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u32);

/// Axis of a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDirection {
    Vertical,
    Horizontal,
}

// ── Calls ─────────────────────────────────────────────────────────────────────

/// One outbound call to a peer desktop.
///
/// Points in `MoveMouse` and `ControlledMouseMove` are global coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerCall {
    AssumeControl,
    RelinquishControl,
    MoveMouse(Point),
    PressMouseButton(MouseButton),
    ReleaseMouseButton(MouseButton),
    Wheel {
        delta: i32,
        direction: WheelDirection,
    },
    PressKeyboardButton(KeyCode),
    ReleaseKeyboardButton(KeyCode),
    /// The sender's monitors changed; rectangles are sender-local.
    DisplaysChanged {
        displays: Vec<Rectangle>,
        primary: Option<Rectangle>,
    },
    ResignFromControl,
    /// The sender is being controlled and its local cursor moved.
    ControlledMouseMove(Point),
}

impl PeerCall {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PeerCall::AssumeControl => "AssumeControl",
            PeerCall::RelinquishControl => "RelinquishControl",
            PeerCall::MoveMouse(_) => "MoveMouse",
            PeerCall::PressMouseButton(_) => "PressMouseButton",
            PeerCall::ReleaseMouseButton(_) => "ReleaseMouseButton",
            PeerCall::Wheel { .. } => "Wheel",
            PeerCall::PressKeyboardButton(_) => "PressKeyboardButton",
            PeerCall::ReleaseKeyboardButton(_) => "ReleaseKeyboardButton",
            PeerCall::DisplaysChanged { .. } => "DisplaysChanged",
            PeerCall::ResignFromControl => "ResignFromControl",
            PeerCall::ControlledMouseMove(_) => "ControlledMouseMove",
        }
    }
}

/// A call together with the name of the desktop that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEnvelope {
    pub sender: DesktopName,
    pub call: PeerCall,
}

impl PeerEnvelope {
    pub fn new(sender: DesktopName, call: PeerCall) -> Self {
        Self { sender, call }
    }
}
