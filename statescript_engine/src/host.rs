//! Host-owned services the engine borrows.
//!
//! Every event source is an injected hub owned by the host and handed to
//! the machine at load time, so tests can drive fake input and bus traffic
//! without touching any process-global state. Handles are opaque: whoever
//! subscribes keeps the handle and gives it back on unsubscribe, which
//! makes the enter/exit pairing of listener ownership checkable via
//! `listener_count`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use statescript_graph::Value;

use crate::entity::OwnerEntity;

/// Mouse button identity as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Extra buttons (back/forward, ...); no action maps these.
    Other(u8),
}

impl MouseButton {
    /// Parse the editor-facing button name used in action settings.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Left" => Some(MouseButton::Left),
            "Middle" => Some(MouseButton::Middle),
            "Right" => Some(MouseButton::Right),
            _ => None,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other),
        }
    }
}

/// One input occurrence dispatched by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(u32),
    KeyUp(u32),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    TouchStart,
    TouchEnd,
}

/// Opaque handle to a registered input listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type InputHandler = Rc<dyn Fn(&InputEvent)>;

#[derive(Default)]
struct InputState {
    next_id: u64,
    listeners: Vec<(ListenerId, InputHandler)>,
    keys_down: HashSet<u32>,
    buttons_down: HashSet<MouseButton>,
}

/// Injected keyboard/mouse/touch event hub with pressed-state tracking.
/// Clones share the hub.
#[derive(Clone, Default)]
pub struct InputSource {
    inner: Rc<RefCell<InputState>>,
}

impl InputSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&InputEvent) + 'static) -> ListenerId {
        let mut state = self.inner.borrow_mut();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Rc::new(handler)));
        id
    }

    /// Returns false when the handle is not registered (already removed).
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(listener, _)| *listener != id);
        state.listeners.len() != before
    }

    /// Deliver one event: pressed-state bookkeeping first, then every
    /// listener in registration order. The listener list is snapshotted so
    /// a callback may not observe the hub mid-mutation.
    pub fn dispatch(&self, event: InputEvent) {
        {
            let mut state = self.inner.borrow_mut();
            match &event {
                InputEvent::KeyDown(code) => {
                    state.keys_down.insert(*code);
                }
                InputEvent::KeyUp(code) => {
                    state.keys_down.remove(code);
                }
                InputEvent::MouseDown(button) => {
                    state.buttons_down.insert(*button);
                }
                InputEvent::MouseUp(button) => {
                    state.buttons_down.remove(button);
                }
                InputEvent::TouchStart | InputEvent::TouchEnd => {}
            }
        }
        let handlers: Vec<InputHandler> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn key_down(&self, code: u32) -> bool {
        self.inner.borrow().keys_down.contains(&code)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.inner.borrow().buttons_down.contains(&button)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Opaque handle to a bus subscription: the channel plus the listener slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    channel: String,
    id: ListenerId,
}

type BusHandler = Rc<dyn Fn(&Value)>;

#[derive(Default)]
struct BusState {
    next_id: u64,
    channels: HashMap<String, Vec<(ListenerId, BusHandler)>>,
}

/// Named-channel publish/subscribe bus. The empty channel name is the
/// default channel, subscribable like any other. Clones share the bus.
#[derive(Clone, Default)]
pub struct MessageBus {
    inner: Rc<RefCell<BusState>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: &str, handler: impl Fn(&Value) + 'static) -> Subscription {
        let mut state = self.inner.borrow_mut();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state
            .channels
            .entry(channel.to_string())
            .or_default()
            .push((id, Rc::new(handler)));
        Subscription {
            channel: channel.to_string(),
            id,
        }
    }

    /// Returns false when the subscription is not registered.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut state = self.inner.borrow_mut();
        let Some(listeners) = state.channels.get_mut(&subscription.channel) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            state.channels.remove(&subscription.channel);
        }
        removed
    }

    pub fn publish(&self, channel: &str, payload: &Value) {
        let handlers: Vec<BusHandler> = self
            .inner
            .borrow()
            .channels
            .get(channel)
            .map(|listeners| listeners.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler(payload);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .channels
            .values()
            .map(Vec::len)
            .sum()
    }
}

/// Everything the host lends the machine for the lifetime of a run.
#[derive(Clone, Default)]
pub struct MachineHost {
    pub input: InputSource,
    pub bus: MessageBus,
    pub owner: OwnerEntity,
}

impl MachineHost {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn dispatch_tracks_pressed_state_and_reaches_listeners() {
        let input = InputSource::new();
        let seen = Rc::new(Cell::new(0u32));
        let seen_in_listener = seen.clone();
        let id = input.subscribe(move |event| {
            if matches!(event, InputEvent::KeyDown(65)) {
                seen_in_listener.set(seen_in_listener.get() + 1);
            }
        });

        input.dispatch(InputEvent::KeyDown(65));
        assert!(input.key_down(65));
        assert_eq!(seen.get(), 1);

        input.dispatch(InputEvent::KeyUp(65));
        assert!(!input.key_down(65));

        assert!(input.unsubscribe(id));
        assert!(!input.unsubscribe(id));
        assert_eq!(input.listener_count(), 0);
    }

    #[test]
    fn mouse_buttons_press_and_release() {
        let input = InputSource::new();
        input.dispatch(InputEvent::MouseDown(MouseButton::Left));
        assert!(input.button_down(MouseButton::Left));
        assert!(!input.button_down(MouseButton::Right));
        input.dispatch(InputEvent::MouseUp(MouseButton::Left));
        assert!(!input.button_down(MouseButton::Left));
    }

    #[test]
    fn bus_delivers_only_to_the_named_channel() {
        let bus = MessageBus::new();
        let hits = Rc::new(Cell::new(0u32));

        let on_door = hits.clone();
        let door = bus.subscribe("door", move |_| on_door.set(on_door.get() + 1));
        let on_default = hits.clone();
        let unnamed = bus.subscribe("", move |_| on_default.set(on_default.get() + 10));

        bus.publish("door", &Value::Null);
        assert_eq!(hits.get(), 1);
        bus.publish("", &Value::String("ping".to_string()));
        assert_eq!(hits.get(), 11);
        bus.publish("elsewhere", &Value::Null);
        assert_eq!(hits.get(), 11);

        assert!(bus.unsubscribe(&door));
        assert!(bus.unsubscribe(&unnamed));
        assert!(!bus.unsubscribe(&door));
        assert_eq!(bus.listener_count(), 0);
    }
}
