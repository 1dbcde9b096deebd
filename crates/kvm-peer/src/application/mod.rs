//! Application layer: the workspace and the ports it talks through.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure geometry and state types in `kvm-core`) and the infrastructure
//! (OS input hooks, the network, configuration files).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a goal (e.g., "hand the
//!   keyboard and mouse to the desktop the cursor just crossed into").
//! - **Depends on abstractions** (traits in [`ports`]) rather than concrete
//!   implementations, so the infrastructure can be swapped without changing
//!   this code.
//! - **Contains no OS calls, no sockets, no file system access**.
//!
//! # Sub-modules
//!
//! - **`workspace`** – The [`Workspace`](workspace::Workspace) aggregate:
//!   roster, layout, state, and event dispatch.
//! - **`mouse`**, **`keyboard`** – Local pointer and key handling, boundary
//!   crossings, and injection of remote input.
//! - **`control`** – Peers assuming, relinquishing, and resigning control.
//! - **`topology`** – Desktops joining, leaving, and changing monitors.
//! - **`runtime`** – The single worker task that owns the workspace.
//! - **`events`**, **`ports`** – The event vocabulary and the traits the
//!   infrastructure implements.

mod control;
pub mod events;
mod keyboard;
mod mouse;
pub mod ports;
pub mod runtime;
pub mod topology;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
