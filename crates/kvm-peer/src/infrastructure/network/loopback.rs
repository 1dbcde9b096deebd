//! In-process network: several workspaces sharing one [`LoopbackHub`].
//!
//! Every call is framed with the `kvm-core` codec on the way out and decoded
//! again on the way in, so a loopback session exercises the same wire format
//! as a socket transport would.  Delivery never waits: a full receiver queue
//! is reported as a transport failure, and two busy peers can never
//! deadlock each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use kvm_core::{decode_envelope, encode_envelope, Desktop, DesktopName, PeerCall, PeerEnvelope};
use tracing::{debug, info, trace, warn};

use crate::application::events::{PeerEvent, WorkspaceEvent};
use crate::application::ports::{NetworkError, WorkspaceNetwork};
use crate::application::runtime::EventSink;

/// A subscribed participant.
#[derive(Debug, Clone)]
struct Member {
    desktop: Desktop,
    sink: EventSink,
}

/// Shared switchboard connecting every [`LoopbackNetwork`] created from it.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    members: Arc<Mutex<HashMap<DesktopName, Member>>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the network endpoint for `desktop`.  It becomes visible to the
    /// other members once its workspace subscribes.
    pub fn join(&self, desktop: Desktop) -> LoopbackNetwork {
        LoopbackNetwork {
            hub: self.clone(),
            desktop: Mutex::new(desktop),
        }
    }

    /// Names of the currently subscribed desktops, sorted.
    pub fn members(&self) -> Vec<DesktopName> {
        let mut names: Vec<_> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Tells every member to resynchronise its roster, e.g. after the
    /// configured desktop order was edited.  Returns the members that could
    /// not be reached.
    pub fn announce_roster_changed(&self) -> Vec<DesktopName> {
        self.notify_others(None, PeerEvent::DesktopRosterChanged)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DesktopName, Member>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `event` for every member except `except` and returns the ones
    /// whose queue refused it.
    fn notify_others(&self, except: Option<&DesktopName>, event: PeerEvent) -> Vec<DesktopName> {
        let targets: Vec<_> = match except {
            Some(name) => self.others(name),
            None => self
                .lock()
                .iter()
                .map(|(name, m)| (name.clone(), m.sink.clone()))
                .collect(),
        };

        let mut failed = Vec::new();
        for (target, sink) in targets {
            if let Err(e) = sink.try_send(event.clone().into()) {
                warn!(to = %target, event = ?event, error = %e, "hub notification failed");
                failed.push(target);
            }
        }
        failed
    }

    /// Sinks of every member except `except`.
    fn others(&self, except: &DesktopName) -> Vec<(DesktopName, EventSink)> {
        self.lock()
            .iter()
            .filter(|(name, _)| *name != except)
            .map(|(name, m)| (name.clone(), m.sink.clone()))
            .collect()
    }
}

/// One desktop's view of a [`LoopbackHub`].
#[derive(Debug)]
pub struct LoopbackNetwork {
    hub: LoopbackHub,
    desktop: Mutex<Desktop>,
}

impl LoopbackNetwork {
    fn desktop(&self) -> Desktop {
        self.desktop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn name(&self) -> DesktopName {
        self.desktop().name
    }

    fn deliver(
        &self,
        target: &DesktopName,
        sink: &EventSink,
        call: PeerCall,
    ) -> Result<(), NetworkError> {
        let envelope = PeerEnvelope::new(self.name(), call);
        let frame = encode_envelope(&envelope)?;
        let (received, _) = decode_envelope(&frame)?;
        trace!(to = %target, call = received.call.name(), bytes = frame.len(), "loopback call");

        sink.try_send(WorkspaceEvent::Peer(PeerEvent::from_envelope(received)))
            .map_err(|e| NetworkError::Transport(format!("{target}: {e}")))
    }
}

#[async_trait]
impl WorkspaceNetwork for LoopbackNetwork {
    fn subscribe(&self, sink: EventSink) {
        let desktop = self.desktop();
        let name = desktop.name.clone();
        self.hub.lock().insert(
            name.clone(),
            Member {
                desktop: desktop.clone(),
                sink,
            },
        );
        info!(desktop = %name, "joined loopback hub");

        self.hub
            .notify_others(Some(&name), PeerEvent::ClientConnected(desktop));
    }

    fn unsubscribe(&self) {
        let name = self.name();
        if self.hub.lock().remove(&name).is_none() {
            return;
        }
        info!(desktop = %name, "left loopback hub");

        self.hub
            .notify_others(Some(&name), PeerEvent::ClientDisconnected(name.clone()));
    }

    fn connected_desktops(&self) -> Vec<Desktop> {
        let name = self.name();
        self.hub
            .lock()
            .values()
            .filter(|m| m.desktop.name != name)
            .map(|m| m.desktop.clone())
            .collect()
    }

    async fn call(&self, target: &DesktopName, call: PeerCall) -> Result<(), NetworkError> {
        let sink = self
            .hub
            .lock()
            .get(target)
            .map(|m| m.sink.clone())
            .ok_or_else(|| NetworkError::UnknownDesktop(target.clone()))?;
        self.deliver(target, &sink, call)
    }

    async fn broadcast(&self, call: PeerCall) -> Result<(), NetworkError> {
        if let PeerCall::DisplaysChanged { displays, primary } = &call {
            let mut desktop = self.desktop.lock().unwrap_or_else(PoisonError::into_inner);
            desktop.displays = displays.clone();
            desktop.primary_display = *primary;
            if let Some(member) = self.hub.lock().get_mut(&desktop.name) {
                member.desktop = desktop.clone();
            }
        }

        let name = self.name();
        let mut first_error = None;
        for (target, sink) in self.hub.others(&name) {
            if let Err(e) = self.deliver(&target, &sink, call.clone()) {
                debug!(to = %target, error = %e, "broadcast delivery failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
