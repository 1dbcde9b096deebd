//! Inbound control protocol: other desktops assuming, relinquishing, and
//! resigning control.
//!
//! Several desktops may control this machine at once; their input is simply
//! applied in arrival order.

use std::collections::BTreeSet;

use kvm_core::{DesktopName, LocalState, PeerCall, Point};
use tracing::{debug, info};

use super::workspace::{Workspace, WorkspaceError};

impl Workspace {
    /// `from` starts driving this machine.
    pub(super) async fn on_control_assumed(
        &mut self,
        from: DesktopName,
    ) -> Result<(), WorkspaceError> {
        if let LocalState::Controlling { active_desktop, .. } = &self.state {
            let previous = active_desktop.clone();
            info!(from = %previous, "giving up control before being controlled");
            self.state = LocalState::Controlled {
                by: BTreeSet::new(),
            };
            self.notify(&previous, PeerCall::RelinquishControl).await;
        }

        if let LocalState::Controlled { by } = &mut self.state {
            by.insert(from.clone());
        } else {
            self.state = LocalState::Controlled {
                by: BTreeSet::from([from.clone()]),
            };
        }
        info!(by = %from, state = %self.state, "control assumed");

        self.input.block_input(false)?;
        Ok(())
    }

    /// `from` stops driving this machine.  When nobody is left, local input
    /// stays blocked until the next local release event.
    pub(super) fn on_control_relinquished(
        &mut self,
        from: DesktopName,
    ) -> Result<(), WorkspaceError> {
        let LocalState::Controlled { by } = &mut self.state else {
            debug!(desktop = %from, "ignoring relinquish while not controlled");
            return Ok(());
        };
        if !by.remove(&from) {
            debug!(desktop = %from, "ignoring relinquish from a non-controller");
            return Ok(());
        }
        if by.is_empty() {
            info!(by = %from, "control relinquished");
            self.state = LocalState::Relinquished;
            self.input.block_input(true)?;
        }
        Ok(())
    }

    /// `from` refuses or ended the session we started with it.
    pub(super) async fn on_resigned_from_control(&mut self, from: DesktopName) {
        if self.state.is_controlling(&from) {
            info!(desktop = %from, "controlled desktop resigned");
            self.return_to_primary_display(false).await;
        } else {
            debug!(desktop = %from, "ignoring resign from a desktop we do not control");
        }
    }

    /// The desktop we control reports its real cursor position.
    pub(super) fn on_controlled_mouse_move(&mut self, from: &DesktopName, point: Point) {
        let LocalState::Controlling {
            active_desktop,
            active_display,
            cursor_position,
        } = &mut self.state
        else {
            return;
        };
        if active_desktop != from {
            return;
        }

        *cursor_position = point;
        if !active_display.contains(point) {
            if let Some(hit) = self.layout.find_point(point) {
                if &hit.desktop == from {
                    *active_display = hit.global;
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
