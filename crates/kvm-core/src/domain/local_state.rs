//! The role this machine currently plays in the workspace.

use std::collections::BTreeSet;
use std::fmt;

use super::desktop::DesktopName;
use super::geometry::{Point, Rectangle};

/// Exactly one of these is held by the workspace at any time.
///
/// All display rectangles and cursor positions are in global coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalState {
    /// The pointer is local.
    Uncontrolled {
        /// The display the local cursor is currently inside.
        active_display: Rectangle,
        /// The display this machine returned home to.
        base_display: Rectangle,
    },

    /// Local input is captured and forwarded to `active_desktop`.
    Controlling {
        active_desktop: DesktopName,
        active_display: Rectangle,
        /// Last known cursor position on the remote side.
        cursor_position: Point,
    },

    /// One or more remote desktops are driving this machine.
    Controlled { by: BTreeSet<DesktopName> },

    /// Every controller has let go; local input stays blocked until the next
    /// terminating local event.
    Relinquished,
}

impl LocalState {
    pub fn uncontrolled(display: Rectangle) -> Self {
        LocalState::Uncontrolled {
            active_display: display,
            base_display: display,
        }
    }

    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            LocalState::Uncontrolled { .. } => "uncontrolled",
            LocalState::Controlling { .. } => "controlling",
            LocalState::Controlled { .. } => "controlled",
            LocalState::Relinquished => "relinquished",
        }
    }

    /// The display the pointer is on, for the two states that track one.
    pub fn active_display(&self) -> Option<Rectangle> {
        match self {
            LocalState::Uncontrolled { active_display, .. }
            | LocalState::Controlling { active_display, .. } => Some(*active_display),
            _ => None,
        }
    }

    /// The desktop being driven, if this machine is controlling one.
    pub fn controlled_desktop(&self) -> Option<&DesktopName> {
        match self {
            LocalState::Controlling { active_desktop, .. } => Some(active_desktop),
            _ => None,
        }
    }

    /// Current controllers; empty unless [`LocalState::Controlled`].
    pub fn controllers(&self) -> impl Iterator<Item = &DesktopName> {
        let set = match self {
            LocalState::Controlled { by } => Some(by),
            _ => None,
        };
        set.into_iter().flatten()
    }

    pub fn is_uncontrolled(&self) -> bool {
        matches!(self, LocalState::Uncontrolled { .. })
    }

    pub fn is_controlling(&self, desktop: &DesktopName) -> bool {
        self.controlled_desktop() == Some(desktop)
    }

    pub fn is_controlled_by(&self, desktop: &DesktopName) -> bool {
        matches!(self, LocalState::Controlled { by } if by.contains(desktop))
    }
}

impl fmt::Display for LocalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalState::Controlling { active_desktop, .. } => {
                write!(f, "controlling {active_desktop}")
            }
            LocalState::Controlled { by } => {
                f.write_str("controlled by")?;
                for name in by {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
            other => f.write_str(other.kind()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
