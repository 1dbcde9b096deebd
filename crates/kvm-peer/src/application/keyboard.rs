//! Keyboard forwarding and injection.
//!
//! Keys follow the same rules as mouse buttons: forwarded while this machine
//! is controlling another desktop, injected while it is controlled, and a key
//! release while relinquished brings the cursor home.

use kvm_core::{DesktopName, KeyCode, LocalState, PeerCall};
use tracing::debug;

use super::workspace::{Workspace, WorkspaceError};

impl Workspace {
    pub(super) async fn on_key(
        &mut self,
        key: KeyCode,
        pressed: bool,
    ) -> Result<(), WorkspaceError> {
        match &self.state {
            LocalState::Controlling { active_desktop, .. } => {
                let target = active_desktop.clone();
                let call = if pressed {
                    PeerCall::PressKeyboardButton(key)
                } else {
                    PeerCall::ReleaseKeyboardButton(key)
                };
                self.forward(&target, call).await
            }
            LocalState::Relinquished if !pressed => {
                self.return_to_primary_display(true).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(super) fn on_remote_key(
        &mut self,
        from: &DesktopName,
        key: KeyCode,
        pressed: bool,
    ) -> Result<(), WorkspaceError> {
        if !self.state.is_controlled_by(from) {
            debug!(desktop = %from, "ignoring key from a non-controller");
            return Ok(());
        }
        let controller = self.input.controller();
        if pressed {
            controller.press_keyboard_button(key)?;
        } else {
            controller.release_keyboard_button(key)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
