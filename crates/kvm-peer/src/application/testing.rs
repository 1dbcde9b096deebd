//! Shared test doubles for the application layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kvm_core::{Desktop, DesktopName, PeerCall, Point, Rectangle, DEFAULT_STICKY_CORNER_SIZE};

use super::ports::{ConfigurationProvider, LocalDisplays, NetworkError, WorkspaceNetwork};
use super::runtime::EventSink;
use super::workspace::Workspace;
use crate::infrastructure::input::mock::MockInputManager;

// ── Configuration ─────────────────────────────────────────────────────────────

pub struct TestConfig {
    name: DesktopName,
    order: Mutex<Vec<DesktopName>>,
    y_offsets: Mutex<HashMap<DesktopName, i32>>,
    sticky_corner_size: Mutex<i32>,
    block_on_button: Mutex<bool>,
}

impl TestConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            order: Mutex::new(Vec::new()),
            y_offsets: Mutex::new(HashMap::new()),
            sticky_corner_size: Mutex::new(DEFAULT_STICKY_CORNER_SIZE),
            block_on_button: Mutex::new(false),
        }
    }

    pub fn set_order(&self, names: &[&str]) {
        *self.order.lock().unwrap() = names.iter().map(|n| DesktopName::new(*n)).collect();
    }

    pub fn set_y_offset(&self, name: &str, offset: i32) {
        self.y_offsets.lock().unwrap().insert(name.into(), offset);
    }

    pub fn set_block_on_button(&self, block: bool) {
        *self.block_on_button.lock().unwrap() = block;
    }
}

impl ConfigurationProvider for TestConfig {
    fn self_name(&self) -> DesktopName {
        self.name.clone()
    }

    fn desktop_order(&self) -> Vec<DesktopName> {
        self.order.lock().unwrap().clone()
    }

    fn y_offsets(&self) -> HashMap<DesktopName, i32> {
        self.y_offsets.lock().unwrap().clone()
    }

    fn sticky_corner_size(&self) -> i32 {
        *self.sticky_corner_size.lock().unwrap()
    }

    fn block_transfer_while_button_pressed(&self) -> bool {
        *self.block_on_button.lock().unwrap()
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Records every outbound call; calls to desktops not in `peers` fail with
/// [`NetworkError::UnknownDesktop`].
#[derive(Default)]
pub struct RecordingNetwork {
    peers: Mutex<Vec<Desktop>>,
    calls: Mutex<Vec<(DesktopName, PeerCall)>>,
    broadcasts: Mutex<Vec<PeerCall>>,
    sink: Mutex<Option<EventSink>>,
    unsubscribed: Mutex<bool>,
}

impl RecordingNetwork {
    pub fn with_peers(peers: Vec<Desktop>) -> Self {
        Self {
            peers: Mutex::new(peers),
            ..Default::default()
        }
    }

    pub fn add_peer(&self, desktop: Desktop) {
        self.peers.lock().unwrap().push(desktop);
    }

    pub fn remove_peer(&self, name: &str) {
        let name = DesktopName::new(name);
        self.peers.lock().unwrap().retain(|d| d.name != name);
    }

    pub fn calls(&self) -> Vec<(DesktopName, PeerCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn broadcasts(&self) -> Vec<PeerCall> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn was_unsubscribed(&self) -> bool {
        *self.unsubscribed.lock().unwrap()
    }
}

#[async_trait]
impl WorkspaceNetwork for RecordingNetwork {
    fn subscribe(&self, sink: EventSink) {
        *self.sink.lock().unwrap() = Some(sink);
    }

    fn unsubscribe(&self) {
        self.sink.lock().unwrap().take();
        *self.unsubscribed.lock().unwrap() = true;
    }

    fn connected_desktops(&self) -> Vec<Desktop> {
        self.peers.lock().unwrap().clone()
    }

    async fn call(&self, target: &DesktopName, call: PeerCall) -> Result<(), NetworkError> {
        if !self.peers.lock().unwrap().iter().any(|d| &d.name == target) {
            return Err(NetworkError::UnknownDesktop(target.clone()));
        }
        self.calls.lock().unwrap().push((target.clone(), call));
        Ok(())
    }

    async fn broadcast(&self, call: PeerCall) -> Result<(), NetworkError> {
        self.broadcasts.lock().unwrap().push(call);
        Ok(())
    }
}

// ── Fixture ───────────────────────────────────────────────────────────────────

pub struct PeerSetup {
    pub desktop: Desktop,
}

impl PeerSetup {
    /// A peer with one 1920×1080 display.
    pub fn single(name: &str) -> Self {
        Self {
            desktop: Desktop::single(name, 1920, 1080),
        }
    }

    pub fn with_displays(name: &str, displays: Vec<Rectangle>, primary: Option<Rectangle>) -> Self {
        Self {
            desktop: Desktop::new(name, displays, primary),
        }
    }
}

pub struct Fixture {
    pub workspace: Workspace,
    pub config: Arc<TestConfig>,
    pub input: Arc<MockInputManager>,
    pub network: Arc<RecordingNetwork>,
}

/// Builds a workspace for `name` (one 1920×1080 display, cursor at its
/// center) next to `peers`.
pub fn fixture(name: &str, peers: &[PeerSetup]) -> Fixture {
    fixture_with_displays(name, LocalDisplays::single(1920, 1080), peers)
}

pub fn fixture_with_displays(name: &str, displays: LocalDisplays, peers: &[PeerSetup]) -> Fixture {
    let config = Arc::new(TestConfig::new(name));
    let input = Arc::new(MockInputManager::new(displays));
    let network = Arc::new(RecordingNetwork::with_peers(
        peers.iter().map(|p| p.desktop.clone()).collect(),
    ));
    let workspace = Workspace::new(config.clone(), network.clone(), input.clone());
    Fixture {
        workspace,
        config,
        input,
        network,
    }
}

/// Drives the workspace from `Uncontrolled` on A to `Controlling` B by
/// crossing A's right edge at mid-height.
pub async fn cross_into_right_neighbour(fixture: &mut Fixture) {
    use super::events::LocalEvent;

    fixture.input.set_cursor(Point::new(1919, 500));
    fixture
        .workspace
        .handle(LocalEvent::MouseMoved(Point::new(1919, 500)).into())
        .await
        .unwrap();
    fixture
        .workspace
        .handle(LocalEvent::MouseMoved(Point::new(1921, 500)).into())
        .await
        .unwrap();
}
