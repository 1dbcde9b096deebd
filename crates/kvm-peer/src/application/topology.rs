//! Roster maintenance: desktops joining, leaving, and changing monitors.
//!
//! Every topology change follows the same steps:
//!
//! 1. Remember the stable id of the display the pointer is on.
//! 2. Build the new roster, ordered by the configured desktop order.
//! 3. Rebuild the [`DisplayLayout`].
//! 4. If the remembered display still exists, shift the held cursor by the
//!    distance that display moved and carry on; otherwise go home.

use std::sync::Arc;

use kvm_core::{Desktop, DesktopName, DisplayLayout, LocalState, PeerCall, Rectangle};
use tracing::{debug, info, warn};

use super::ports::LocalDisplays;
use super::workspace::{Workspace, WorkspaceError};

/// Orders `desktops` so that those named in `order` come first, in that order,
/// followed by the rest sorted by name.
///
/// The result depends only on the set of desktops and the configured order,
/// never on which peer computes it, so every peer tiles the same global
/// space.
pub fn order_desktops(order: &[DesktopName], desktops: Vec<Desktop>) -> Vec<Desktop> {
    let mut remaining = desktops;
    let mut ordered = Vec::with_capacity(remaining.len());
    for name in order {
        if let Some(index) = remaining.iter().position(|d| &d.name == name) {
            ordered.push(remaining.remove(index));
        }
    }
    remaining.sort_by(|a, b| a.name.normalized().cmp(b.name.normalized()));
    ordered.extend(remaining);
    ordered
}

impl Workspace {
    pub(super) async fn on_client_connected(
        &mut self,
        desktop: Desktop,
    ) -> Result<(), WorkspaceError> {
        if desktop.name == self.self_name {
            return Ok(());
        }
        info!(desktop = %desktop.name, displays = desktop.displays.len(), "desktop connected");

        let mut roster = self.desktops.as_ref().clone();
        match roster.iter_mut().find(|d| d.name == desktop.name) {
            Some(existing) => *existing = desktop,
            None => roster.push(desktop),
        }
        self.reconcile(roster).await
    }

    pub(super) async fn on_client_disconnected(
        &mut self,
        name: DesktopName,
    ) -> Result<(), WorkspaceError> {
        if name == self.self_name {
            return Ok(());
        }
        info!(desktop = %name, "desktop disconnected");

        let mut roster = self.desktops.as_ref().clone();
        roster.retain(|d| d.name != name);
        self.reconcile(roster).await?;

        if let LocalState::Controlled { by } = &mut self.state {
            if by.remove(&name) && by.is_empty() {
                warn!(
                    desktop = %name,
                    "last controller vanished; returning to the primary display"
                );
                self.return_to_primary_display(false).await;
            }
        }
        Ok(())
    }

    pub(super) async fn on_client_displays_changed(
        &mut self,
        name: DesktopName,
        displays: Vec<Rectangle>,
        primary: Option<Rectangle>,
    ) -> Result<(), WorkspaceError> {
        if name == self.self_name {
            return Ok(());
        }

        let mut roster = self.desktops.as_ref().clone();
        let Some(desktop) = roster.iter_mut().find(|d| d.name == name) else {
            debug!(desktop = %name, "displays changed for an unknown desktop");
            return Ok(());
        };
        info!(desktop = %name, displays = displays.len(), "desktop displays changed");
        desktop.displays = displays;
        desktop.primary_display = primary;
        self.reconcile(roster).await
    }

    /// Resynchronises the roster with the network and the configured order.
    pub(super) async fn on_desktop_roster_changed(&mut self) -> Result<(), WorkspaceError> {
        let mut roster: Vec<Desktop> = self.self_desktop().cloned().into_iter().collect();
        for desktop in self.network.connected_desktops() {
            if !roster.iter().any(|d| d.name == desktop.name) {
                roster.push(desktop);
            }
        }
        info!(desktops = roster.len(), "desktop roster changed");
        self.reconcile(roster).await
    }

    /// This machine's own monitors changed; peers are told as well.
    pub(super) async fn on_local_displays_changed(
        &mut self,
        local: LocalDisplays,
    ) -> Result<(), WorkspaceError> {
        info!(displays = local.displays.len(), "local displays changed");

        let mut roster = self.desktops.as_ref().clone();
        let updated = local.clone().into_desktop(self.self_name.clone());
        match roster.iter_mut().find(|d| d.name == self.self_name) {
            Some(existing) => *existing = updated,
            None => roster.insert(0, updated),
        }
        self.reconcile(roster).await?;

        let call = PeerCall::DisplaysChanged {
            displays: local.displays,
            primary: local.primary,
        };
        if let Err(e) = self.network.broadcast(call).await {
            warn!(error = %e, "failed to announce display change");
        }
        Ok(())
    }

    /// Installs `roster` and a freshly built layout, then re-maps the state
    /// onto the new layout.
    pub(super) async fn reconcile(&mut self, roster: Vec<Desktop>) -> Result<(), WorkspaceError> {
        let remembered_active = self
            .state
            .active_display()
            .and_then(|rect| self.layout.id_of(&rect).map(|id| (id, rect)));
        let remembered_base = match &self.state {
            LocalState::Uncontrolled { base_display, .. } => self.layout.id_of(base_display),
            _ => None,
        };

        let roster = order_desktops(&self.config.desktop_order(), roster);
        let layout = DisplayLayout::build(&roster, &self.config.y_offsets())?;
        self.desktops = Arc::new(roster);
        self.layout = Arc::new(layout);
        debug!(
            desktops = self.desktops.len(),
            displays = self.layout.len(),
            "layout rebuilt"
        );

        let Some((id, old_rect)) = remembered_active else {
            self.publish_snapshot();
            return Ok(());
        };
        let Some(new_rect) = self.layout.display(id) else {
            warn!("active display is gone; returning to the primary display");
            self.return_to_primary_display(true).await;
            return Ok(());
        };

        let (dx, dy) = new_rect.origin().delta_from(old_rect.origin());
        let base = remembered_base
            .and_then(|id| self.layout.display(id))
            .unwrap_or_else(|| self.home_display());
        match &mut self.state {
            LocalState::Uncontrolled {
                active_display,
                base_display,
            } => {
                *active_display = new_rect;
                *base_display = base;
                self.last_global_point = self.last_global_point.offset(dx, dy);
            }
            LocalState::Controlling {
                active_display,
                cursor_position,
                ..
            } => {
                *active_display = new_rect;
                *cursor_position = cursor_position.offset(dx, dy);
            }
            _ => {}
        }
        self.publish_snapshot();
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
