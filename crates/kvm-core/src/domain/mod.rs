//! Domain entities for the shared workspace.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, network libraries, or async runtimes.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here that means the geometry of every machine's monitors, how those
//! monitors are tiled into one global space, the rules that decide whether a
//! pointer really crossed from one machine to the next, and the role this
//! machine is currently playing.

pub mod desktop;
pub mod geometry;
pub mod handoff;

/// Global display tiling, the core geometric concept.
///
/// See [`layout::DisplayLayout`] for the main type.
pub mod layout;
pub mod local_state;
