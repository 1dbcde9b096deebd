//! Network adapters implementing
//! [`WorkspaceNetwork`](crate::application::ports::WorkspaceNetwork).
//!
//! # Sub-modules
//!
//! - **`loopback`** – Connects several workspaces running in one process.
//!   Every call is still encoded and decoded with the `kvm-core` wire codec,
//!   so the headless node and the integration tests exercise the real frame
//!   format end to end.
//!
//! A socket transport would sit next to `loopback`, framing the same
//! [`PeerEnvelope`](kvm_core::PeerEnvelope)s over TCP.

pub mod loopback;
