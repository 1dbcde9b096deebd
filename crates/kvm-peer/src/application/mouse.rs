//! Pointer handling: boundary detection, handoff, and forwarding.
//!
//! What a local mouse move means depends on the current [`LocalState`]:
//!
//! - **Uncontrolled**: the pointer is ours.  Leaving the active display may
//!   hand control to another desktop.
//! - **Controlling**: local input is blocked and the physical pointer is
//!   pinned; the raw delta from the pinned position drives the remote cursor.
//! - **Controlled**: a remote desktop drives us; local motion is echoed back,
//!   and leaving our own displays hands control onward.
//! - **Relinquished**: ignored; only a release event brings us home.

use kvm_core::{
    is_sticky_corner, DeltaDebounce, DesktopName, LocalState, MouseButton, PeerCall, Point,
    Rectangle, WheelDirection,
};
use tracing::{debug, info, trace};

use super::workspace::{Workspace, WorkspaceError};

impl Workspace {
    pub(super) async fn on_mouse_moved(&mut self, local: Point) -> Result<(), WorkspaceError> {
        match self.state {
            LocalState::Uncontrolled { .. } => self.move_uncontrolled(local).await,
            LocalState::Controlling { .. } => self.move_controlling(local).await,
            LocalState::Controlled { .. } => self.move_controlled(local).await,
            LocalState::Relinquished => Ok(()),
        }
    }

    async fn move_uncontrolled(&mut self, local: Point) -> Result<(), WorkspaceError> {
        let LocalState::Uncontrolled {
            active_display,
            base_display,
        } = self.state
        else {
            return Ok(());
        };

        let global = self.to_global(local);
        let before = std::mem::replace(&mut self.last_global_point, global);
        if active_display.contains(global) {
            return Ok(());
        }

        let Some((owner, display)) = self.resolve(global) else {
            return Ok(());
        };

        if owner == self.self_name {
            let rect = display;
            trace!(?rect, "cursor moved to another local display");
            self.state = LocalState::Uncontrolled {
                active_display: rect,
                base_display,
            };
            return Ok(());
        }

        if self.crossing_suppressed(before, global, &active_display) {
            let clamped = active_display.clamp(global);
            debug!(desktop = %owner, x = global.x, y = global.y, "crossing suppressed");
            self.last_global_point = clamped;
            self.input.controller().move_mouse(self.to_local(clamped))?;
            return Ok(());
        }

        self.assume_control_of(owner, display, global).await
    }

    async fn move_controlling(&mut self, local: Point) -> Result<(), WorkspaceError> {
        let (dx, dy) = local.delta_from(self.blocked_local_point);
        if self.input.is_input_blocked() && self.debounce.is_spurious(dx, dy) {
            debug!(dx, dy, "discarding spurious pointer delta");
            return Ok(());
        }

        let LocalState::Controlling {
            ref active_desktop,
            active_display,
            cursor_position,
        } = self.state
        else {
            return Ok(());
        };
        let current = active_desktop.clone();
        let target = cursor_position.offset(dx, dy);

        if active_display.contains(target) {
            return self.move_remote_cursor(current, active_display, target).await;
        }

        match self.resolve(target) {
            None => {
                let clamped = active_display.clamp(target);
                self.move_remote_cursor(current, active_display, clamped).await
            }
            Some((owner, display)) if owner == current => {
                self.move_remote_cursor(current, display, target).await
            }
            Some((owner, display)) => {
                if self.crossing_suppressed(cursor_position, target, &active_display) {
                    debug!(desktop = %owner, x = target.x, y = target.y, "crossing suppressed");
                    let clamped = active_display.clamp(target);
                    return self.move_remote_cursor(current, active_display, clamped).await;
                }
                if owner == self.self_name {
                    self.take_back_control(current, display, target).await
                } else {
                    self.notify(&current, PeerCall::RelinquishControl).await;
                    self.assume_control_of(owner, display, target).await
                }
            }
        }
    }

    async fn move_controlled(&mut self, local: Point) -> Result<(), WorkspaceError> {
        let global = self.to_global(local);
        let inside_own_displays = self
            .self_desktop()
            .is_some_and(|desktop| desktop.display_at(local).is_some());
        let controllers: Vec<DesktopName> = self.state.controllers().cloned().collect();

        if inside_own_displays {
            self.last_global_point = global;
            for controller in &controllers {
                self.notify(controller, PeerCall::ControlledMouseMove(global)).await;
            }
            return Ok(());
        }

        let Some((owner, display)) = self.resolve(global) else {
            return Ok(());
        };
        if owner == self.self_name {
            return Ok(());
        }

        info!(desktop = %owner, "handing control onward while controlled");
        for controller in &controllers {
            self.notify(controller, PeerCall::ResignFromControl).await;
        }
        self.assume_control_of(owner, display, global).await
    }

    /// Captures local input and starts driving `target`.
    pub(super) async fn assume_control_of(
        &mut self,
        target: DesktopName,
        display: Rectangle,
        point: Point,
    ) -> Result<(), WorkspaceError> {
        self.input.block_input(true)?;
        self.blocked_local_point = self.input.cursor_position()?;
        self.debounce = self
            .local_primary_display()
            .map(|primary| DeltaDebounce::from_display(&primary))
            .unwrap_or_default();

        info!(desktop = %target, x = point.x, y = point.y, "assuming control");
        self.state = LocalState::Controlling {
            active_desktop: target.clone(),
            active_display: display,
            cursor_position: point,
        };
        self.publish_snapshot();

        self.forward(&target, PeerCall::AssumeControl).await?;
        if self.state.is_controlling(&target) {
            self.forward(&target, PeerCall::MoveMouse(point)).await?;
        }
        Ok(())
    }

    /// The remote cursor crossed back onto one of our displays.
    async fn take_back_control(
        &mut self,
        previous: DesktopName,
        display: Rectangle,
        point: Point,
    ) -> Result<(), WorkspaceError> {
        info!(from = %previous, "control returned to this desktop");
        self.state = LocalState::Uncontrolled {
            active_display: display,
            base_display: self.home_display(),
        };
        self.last_global_point = point;
        self.input.controller().move_mouse(self.to_local(point))?;
        self.input.block_input(false)?;
        self.publish_snapshot();
        self.notify(&previous, PeerCall::RelinquishControl).await;
        Ok(())
    }

    async fn move_remote_cursor(
        &mut self,
        target: DesktopName,
        display: Rectangle,
        point: Point,
    ) -> Result<(), WorkspaceError> {
        if let LocalState::Controlling {
            active_display,
            cursor_position,
            ..
        } = &mut self.state
        {
            *active_display = display;
            *cursor_position = point;
        }
        self.forward(&target, PeerCall::MoveMouse(point)).await
    }

    /// Owner and global rectangle of the display under `global`.
    fn resolve(&self, global: Point) -> Option<(DesktopName, Rectangle)> {
        self.layout
            .find_point(global)
            .map(|hit| (hit.desktop.clone(), hit.global))
    }

    /// Whether a crossing from `display` into another desktop must be held back.
    fn crossing_suppressed(&self, before: Point, after: Point, display: &Rectangle) -> bool {
        let held_button = self.config.block_transfer_while_button_pressed()
            && !self.pressed_buttons.is_empty();
        held_button || is_sticky_corner(before, after, display, self.config.sticky_corner_size())
    }

    // ── Buttons and wheel ─────────────────────────────────────────────────────

    pub(super) async fn on_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
    ) -> Result<(), WorkspaceError> {
        if pressed {
            self.pressed_buttons.insert(button);
        } else {
            self.pressed_buttons.remove(&button);
        }

        match &self.state {
            LocalState::Controlling { active_desktop, .. } => {
                let target = active_desktop.clone();
                let call = if pressed {
                    PeerCall::PressMouseButton(button)
                } else {
                    PeerCall::ReleaseMouseButton(button)
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

    pub(super) async fn on_mouse_wheel(
        &mut self,
        delta: i32,
        direction: WheelDirection,
    ) -> Result<(), WorkspaceError> {
        match &self.state {
            LocalState::Controlling { active_desktop, .. } => {
                let target = active_desktop.clone();
                self.forward(&target, PeerCall::Wheel { delta, direction }).await
            }
            LocalState::Relinquished => {
                self.return_to_primary_display(true).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    // ── Remote pointer input ──────────────────────────────────────────────────

    pub(super) fn on_remote_mouse_move(
        &mut self,
        from: &DesktopName,
        global: Point,
    ) -> Result<(), WorkspaceError> {
        if !self.state.is_controlled_by(from) {
            debug!(desktop = %from, "ignoring mouse move from a non-controller");
            return Ok(());
        }
        let local = self.to_local(global);
        self.last_global_point = global;
        self.input.controller().move_mouse(local)?;
        Ok(())
    }

    pub(super) fn on_remote_mouse_button(
        &mut self,
        from: &DesktopName,
        button: MouseButton,
        pressed: bool,
    ) -> Result<(), WorkspaceError> {
        if !self.state.is_controlled_by(from) {
            debug!(desktop = %from, "ignoring mouse button from a non-controller");
            return Ok(());
        }
        let controller = self.input.controller();
        if pressed {
            controller.press_mouse_button(button)?;
        } else {
            controller.release_mouse_button(button)?;
        }
        Ok(())
    }

    pub(super) fn on_remote_mouse_wheel(
        &mut self,
        from: &DesktopName,
        delta: i32,
        direction: WheelDirection,
    ) -> Result<(), WorkspaceError> {
        if !self.state.is_controlled_by(from) {
            debug!(desktop = %from, "ignoring wheel from a non-controller");
            return Ok(());
        }
        self.input.controller().wheel(delta, direction)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
