//! The workspace worker task.
//!
//! [`spawn`] moves a [`Workspace`] into a single tokio task and hands back a
//! [`WorkspaceHandle`].  Every producer (local input hooks, the network)
//! talks to the task through the same bounded queue, so events are applied
//! one at a time in the order they were enqueued.
//!
//! # Event flow
//!
//! ```text
//!  InputManager ──┐
//!                 ├── EventSink ──► mpsc (1024) ──► worker ──► Workspace::handle
//!  Network ───────┘                                   │
//!                                                     └──► watch<WorkspaceSnapshot>
//! ```
//!
//! Events that arrive before [`WorkspaceHandle::initialize`] completes are
//! held back and replayed, in order, right after initialization.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::events::WorkspaceEvent;
use super::workspace::{Workspace, WorkspaceError, WorkspaceSnapshot};

/// Capacity of the workspace command queue.
pub const QUEUE_CAPACITY: usize = 1024;

/// Messages understood by the worker task.
#[derive(Debug)]
pub enum WorkspaceCommand {
    Initialize(oneshot::Sender<Result<(), WorkspaceError>>),
    Event(WorkspaceEvent),
    /// Replies once every command queued before it has been handled.
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable producer side of the workspace queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<WorkspaceCommand>,
}

impl EventSink {
    /// Enqueues `event`, waiting for room in the queue.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::ShutDown`] once the worker has stopped.
    pub async fn send(&self, event: WorkspaceEvent) -> Result<(), WorkspaceError> {
        self.tx
            .send(WorkspaceCommand::Event(event))
            .await
            .map_err(|_| WorkspaceError::ShutDown)
    }

    /// Enqueues `event` without waiting; for callers that cannot `.await`,
    /// such as OS input hooks.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::QueueFull`] if the queue has no room and
    /// [`WorkspaceError::ShutDown`] if the worker has stopped.
    pub fn try_send(&self, event: WorkspaceEvent) -> Result<(), WorkspaceError> {
        self.tx
            .try_send(WorkspaceCommand::Event(event))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    warn!("workspace queue is full; dropping event");
                    WorkspaceError::QueueFull
                }
                mpsc::error::TrySendError::Closed(_) => WorkspaceError::ShutDown,
            })
    }
}

/// Control surface of a running workspace task.
pub struct WorkspaceHandle {
    tx: mpsc::Sender<WorkspaceCommand>,
    initialized: watch::Receiver<bool>,
    snapshots: watch::Receiver<Arc<WorkspaceSnapshot>>,
    task: JoinHandle<()>,
}

/// Subscribes `workspace` to its input and network sources and starts the
/// worker task that owns it.
pub fn spawn(workspace: Workspace) -> WorkspaceHandle {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    let (init_tx, initialized) = watch::channel(false);
    let snapshots = workspace.snapshots();

    workspace.subscribe(EventSink { tx: tx.clone() });
    let task = tokio::spawn(run(workspace, rx, init_tx));

    WorkspaceHandle {
        tx,
        initialized,
        snapshots,
        task,
    }
}

async fn run(
    mut workspace: Workspace,
    mut rx: mpsc::Receiver<WorkspaceCommand>,
    initialized: watch::Sender<bool>,
) {
    let mut pending: VecDeque<WorkspaceEvent> = VecDeque::new();

    while let Some(command) = rx.recv().await {
        match command {
            WorkspaceCommand::Initialize(reply) => {
                let result = workspace.initialize();
                if result.is_ok() {
                    initialized.send_replace(true);
                    if !pending.is_empty() {
                        debug!(count = pending.len(), "replaying events queued before init");
                    }
                    while let Some(event) = pending.pop_front() {
                        dispatch(&mut workspace, event).await;
                    }
                }
                let _ = reply.send(result);
            }
            WorkspaceCommand::Event(event) if !workspace.is_initialized() => {
                pending.push_back(event);
            }
            WorkspaceCommand::Event(event) => dispatch(&mut workspace, event).await,
            WorkspaceCommand::Flush(reply) => {
                let _ = reply.send(());
            }
            WorkspaceCommand::Shutdown(reply) => {
                workspace.dispose();
                let _ = reply.send(());
                return;
            }
        }
    }

    info!("workspace queue closed");
    workspace.dispose();
}

async fn dispatch(workspace: &mut Workspace, event: WorkspaceEvent) {
    if let Err(e) = workspace.handle(event).await {
        error!(error = %e, state = %workspace.state(), "workspace event failed");
    }
}

impl WorkspaceHandle {
    /// Initializes the workspace inside the worker task.
    ///
    /// # Errors
    ///
    /// Whatever [`Workspace::initialize`] reported, or
    /// [`WorkspaceError::ShutDown`] if the task is gone.
    pub async fn initialize(&self) -> Result<(), WorkspaceError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(WorkspaceCommand::Initialize(reply))
            .await
            .map_err(|_| WorkspaceError::ShutDown)?;
        response.await.map_err(|_| WorkspaceError::ShutDown)?
    }

    /// Resolves once the workspace has been initialized.
    pub async fn initialized(&self) -> Result<(), WorkspaceError> {
        let mut rx = self.initialized.clone();
        rx.wait_for(|done| *done)
            .await
            .map(|_| ())
            .map_err(|_| WorkspaceError::ShutDown)
    }

    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
        }
    }

    /// Enqueues one event.
    pub async fn send(&self, event: impl Into<WorkspaceEvent>) -> Result<(), WorkspaceError> {
        self.sink().send(event.into()).await
    }

    /// Waits until everything enqueued so far has been handled.
    pub async fn flush(&self) -> Result<(), WorkspaceError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(WorkspaceCommand::Flush(reply))
            .await
            .map_err(|_| WorkspaceError::ShutDown)?;
        done.await.map_err(|_| WorkspaceError::ShutDown)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<WorkspaceSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified whenever a new snapshot is published.
    pub fn watch(&self) -> watch::Receiver<Arc<WorkspaceSnapshot>> {
        self.snapshots.clone()
    }

    /// Disposes the workspace and waits for the worker task to finish.
    pub async fn shutdown(self) {
        let (reply, done) = oneshot::channel();
        if self.tx.send(WorkspaceCommand::Shutdown(reply)).await.is_ok() {
            let _ = done.await;
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "workspace task panicked");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
