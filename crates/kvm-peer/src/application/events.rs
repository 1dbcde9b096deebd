//! Everything that can happen to the workspace.
//!
//! Local input and network traffic both arrive as a [`WorkspaceEvent`] on the
//! same queue, so the workspace sees one totally ordered stream.

use kvm_core::{
    Desktop, DesktopName, KeyCode, MouseButton, PeerCall, PeerEnvelope, Point, Rectangle,
    WheelDirection,
};

use super::ports::LocalDisplays;

/// One event for the workspace.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    Local(LocalEvent),
    Peer(PeerEvent),
}

impl From<LocalEvent> for WorkspaceEvent {
    fn from(event: LocalEvent) -> Self {
        WorkspaceEvent::Local(event)
    }
}

impl From<PeerEvent> for WorkspaceEvent {
    fn from(event: PeerEvent) -> Self {
        WorkspaceEvent::Peer(event)
    }
}

/// Hardware and session events from this machine.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEvent {
    /// Raw pointer position in local coordinates.
    MouseMoved(Point),
    MouseButtonPressed(MouseButton),
    MouseButtonReleased(MouseButton),
    MouseWheel { delta: i32, direction: WheelDirection },
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    /// This machine's monitor arrangement changed.
    DisplaysChanged(LocalDisplays),
    /// Session-level interruption such as a desktop switch or lock screen.
    SystemEvent,
}

/// Events raised by the network on behalf of other desktops.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    ClientConnected(Desktop),
    ClientDisconnected(DesktopName),
    /// `displays` and `primary` are in the client's local coordinates.
    ClientDisplaysChanged {
        desktop: DesktopName,
        displays: Vec<Rectangle>,
        primary: Option<Rectangle>,
    },
    /// The set or order of desktops changed; resynchronise with the network
    /// and the configured order.
    DesktopRosterChanged,
    ControlAssumed(DesktopName),
    ControlRelinquished(DesktopName),
    ResignedFromControl(DesktopName),
    /// `point` is in global coordinates.
    MouseMoveReceived { from: DesktopName, point: Point },
    MouseButtonReceived {
        from: DesktopName,
        button: MouseButton,
        pressed: bool,
    },
    MouseWheelReceived {
        from: DesktopName,
        delta: i32,
        direction: WheelDirection,
    },
    KeyboardReceived {
        from: DesktopName,
        key: KeyCode,
        pressed: bool,
    },
    /// A desktop we control reports where its cursor is, in global coordinates.
    ControlledMouseMoveReceived { from: DesktopName, point: Point },
}

impl PeerEvent {
    /// Maps a call received from another desktop to the event it raises here.
    pub fn from_envelope(envelope: PeerEnvelope) -> Self {
        let from = envelope.sender;
        match envelope.call {
            PeerCall::AssumeControl => PeerEvent::ControlAssumed(from),
            PeerCall::RelinquishControl => PeerEvent::ControlRelinquished(from),
            PeerCall::ResignFromControl => PeerEvent::ResignedFromControl(from),
            PeerCall::MoveMouse(point) => PeerEvent::MouseMoveReceived { from, point },
            PeerCall::PressMouseButton(button) => PeerEvent::MouseButtonReceived {
                from,
                button,
                pressed: true,
            },
            PeerCall::ReleaseMouseButton(button) => PeerEvent::MouseButtonReceived {
                from,
                button,
                pressed: false,
            },
            PeerCall::Wheel { delta, direction } => PeerEvent::MouseWheelReceived {
                from,
                delta,
                direction,
            },
            PeerCall::PressKeyboardButton(key) => PeerEvent::KeyboardReceived {
                from,
                key,
                pressed: true,
            },
            PeerCall::ReleaseKeyboardButton(key) => PeerEvent::KeyboardReceived {
                from,
                key,
                pressed: false,
            },
            PeerCall::DisplaysChanged { displays, primary } => PeerEvent::ClientDisplaysChanged {
                desktop: from,
                displays,
                primary,
            },
            PeerCall::ControlledMouseMove(point) => {
                PeerEvent::ControlledMouseMoveReceived { from, point }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
