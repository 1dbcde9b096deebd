//! In-memory input manager.
//!
//! Simulates one machine's keyboard, mouse, and monitors without any OS
//! hooks.  Hardware events are simulated with [`MockInputManager::inject`];
//! everything the workspace injects is recorded and can be inspected with
//! [`MockInputManager::injected`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use kvm_core::{KeyCode, MouseButton, Point, WheelDirection};

use crate::application::events::LocalEvent;
use crate::application::ports::{InputController, InputError, InputManager, LocalDisplays};
use crate::application::runtime::EventSink;

/// One input action performed by the workspace on this machine.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectedInput {
    MouseMove(Point),
    MouseButton { button: MouseButton, pressed: bool },
    Wheel { delta: i32, direction: WheelDirection },
    Key { key: KeyCode, pressed: bool },
}

#[derive(Debug)]
struct State {
    displays: LocalDisplays,
    cursor: Point,
    blocked: bool,
    sink: Option<EventSink>,
    injected: Vec<InjectedInput>,
}

impl State {
    /// Where the cursor ends up when the hardware pushes it toward `point`:
    /// it cannot leave the monitors, so off-screen targets are clamped to the
    /// display the cursor is on.
    fn reachable(&self, point: Point) -> Point {
        if self.displays.displays.iter().any(|d| d.contains(point)) {
            return point;
        }
        self.displays
            .displays
            .iter()
            .find(|d| d.contains(self.cursor))
            .map_or(point, |d| d.clamp(point))
    }
}

/// An [`InputManager`] backed by plain memory.
#[derive(Debug)]
pub struct MockInputManager {
    state: Mutex<State>,
}

impl MockInputManager {
    /// Creates a manager for `displays`, with the cursor in the middle of the
    /// primary display.
    pub fn new(displays: LocalDisplays) -> Self {
        let cursor = displays
            .primary
            .or_else(|| displays.displays.first().copied())
            .map(|d| d.center())
            .unwrap_or_default();
        Self {
            state: Mutex::new(State {
                displays,
                cursor,
                blocked: false,
                sink: None,
                injected: Vec::new(),
            }),
        }
    }

    /// A manager with a single `width` × `height` monitor.
    pub fn single(width: i32, height: i32) -> Self {
        Self::new(LocalDisplays::single(width, height))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates a hardware event.
    ///
    /// A pointer move only moves the cursor while input is not blocked, and
    /// never off the monitors; the event is reported either way.  Returns
    /// `false` when nobody is subscribed or the queue did not accept it.
    pub fn inject(&self, event: LocalEvent) -> bool {
        let sink = {
            let mut state = self.lock();
            if let LocalEvent::MouseMoved(point) = &event {
                if !state.blocked {
                    state.cursor = state.reachable(*point);
                }
            }
            state.sink.clone()
        };
        match sink {
            Some(sink) => sink.try_send(event.into()).is_ok(),
            None => false,
        }
    }

    /// Replaces the monitor arrangement and reports the change.
    pub fn set_displays(&self, displays: LocalDisplays) -> bool {
        self.lock().displays = displays.clone();
        self.inject(LocalEvent::DisplaysChanged(displays))
    }

    /// Places the cursor without reporting a move.
    pub fn set_cursor(&self, point: Point) {
        self.lock().cursor = point;
    }

    pub fn cursor(&self) -> Point {
        self.lock().cursor
    }

    pub fn is_blocked(&self) -> bool {
        self.lock().blocked
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Everything injected so far, oldest first.
    pub fn injected(&self) -> Vec<InjectedInput> {
        self.lock().injected.clone()
    }

    fn record(&self, input: InjectedInput) -> Result<(), InputError> {
        self.lock().injected.push(input);
        Ok(())
    }
}

impl InputController for MockInputManager {
    fn move_mouse(&self, position: Point) -> Result<(), InputError> {
        let mut state = self.lock();
        state.cursor = position;
        state.injected.push(InjectedInput::MouseMove(position));
        Ok(())
    }

    fn press_mouse_button(&self, button: MouseButton) -> Result<(), InputError> {
        self.record(InjectedInput::MouseButton {
            button,
            pressed: true,
        })
    }

    fn release_mouse_button(&self, button: MouseButton) -> Result<(), InputError> {
        self.record(InjectedInput::MouseButton {
            button,
            pressed: false,
        })
    }

    fn wheel(&self, delta: i32, direction: WheelDirection) -> Result<(), InputError> {
        self.record(InjectedInput::Wheel { delta, direction })
    }

    fn press_keyboard_button(&self, key: KeyCode) -> Result<(), InputError> {
        self.record(InjectedInput::Key { key, pressed: true })
    }

    fn release_keyboard_button(&self, key: KeyCode) -> Result<(), InputError> {
        self.record(InjectedInput::Key {
            key,
            pressed: false,
        })
    }
}

impl InputManager for MockInputManager {
    fn subscribe(&self, sink: EventSink) {
        self.lock().sink = Some(sink);
    }

    fn unsubscribe(&self) {
        self.lock().sink = None;
    }

    fn block_input(&self, block: bool) -> Result<(), InputError> {
        self.lock().blocked = block;
        Ok(())
    }

    fn is_input_blocked(&self) -> bool {
        self.lock().blocked
    }

    fn cursor_position(&self) -> Result<Point, InputError> {
        Ok(self.lock().cursor)
    }

    fn displays(&self) -> Result<LocalDisplays, InputError> {
        Ok(self.lock().displays.clone())
    }

    fn controller(&self) -> &dyn InputController {
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
