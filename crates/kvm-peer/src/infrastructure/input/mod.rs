//! Local keyboard and mouse adapters.
//!
//! A production build installs OS hooks (low-level hooks on Windows, XInput2
//! on Linux, event taps on macOS) and implements
//! [`InputManager`](crate::application::ports::InputManager) on top of them.
//! Hook callbacks must return quickly, so they only push
//! [`LocalEvent`](crate::application::events::LocalEvent)s into the
//! workspace's [`EventSink`](crate::application::runtime::EventSink) with
//! `try_send` and never wait on the workspace.
//!
//! [`mock::MockInputManager`] is the in-memory implementation used by the
//! headless node and by every test.

pub mod mock;
