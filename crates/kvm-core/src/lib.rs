//! # kvm-core
//!
//! Shared library for KVM Mesh containing the display geometry engine, the
//! control-handoff rules, and the peer-to-peer call protocol.
//!
//! It has zero dependencies on OS APIs, UI frameworks, async runtimes, or
//! network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! KVM Mesh lets several computers (called "desktops") share one keyboard and
//! mouse.  Their screens are tiled side by side into one large virtual desktop;
//! pushing the pointer past the edge of one machine's screen hands control of
//! input to the neighbouring machine.  Every machine runs the same peer
//! program, so any of them can be the one whose keyboard and mouse are in use.
//!
//! This crate (`kvm-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business logic.  The most important piece is the
//!   `DisplayLayout`: the global tiling of every monitor of every desktop,
//!   with lookups from a global point to the monitor (and machine) under it.
//!
//! - **`protocol`** – The calls peers make to each other (`PeerCall`) and how
//!   they are framed into bytes for the network.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kvm_core::DisplayLayout` instead of `kvm_core::domain::layout::DisplayLayout`.
pub use domain::desktop::{Desktop, DesktopName};
pub use domain::geometry::{Point, Rectangle};
pub use domain::handoff::{is_sticky_corner, DeltaDebounce, DEFAULT_STICKY_CORNER_SIZE};
pub use domain::layout::{DisplayId, DisplayLayout, LayoutDisplay, LayoutError};
pub use domain::local_state::LocalState;
pub use protocol::codec::{decode_envelope, encode_envelope, ProtocolError};
pub use protocol::messages::{KeyCode, MouseButton, PeerCall, PeerEnvelope, WheelDirection};
