//! Keyboard listener actions: a single configurable key, the arrow keys,
//! and the WASD cluster.
//!
//! All three install their hub listener on `enter` and release it on
//! `exit`. A listener whose key is unrecognized or whose outlet is unwired
//! stays installed but never fires.

use log::{debug, warn};
use statescript_graph::{ActionDescriptor, ParamKind, ParameterSpec, TransitionSpec, Value};

use crate::action::{Action, OutletMap, Settings};
use crate::host::{InputEvent, ListenerId};
use crate::keys::{self, KEY_A, KEY_D, KEY_DOWN, KEY_LEFT, KEY_RIGHT, KEY_S, KEY_UP, KEY_W};
use crate::machine::TickContext;
use crate::registry::ActionRegistry;

pub fn register(registry: &mut ActionRegistry) {
    registry.register(key_down_descriptor(), |settings, outlets| {
        Box::new(KeyDownAction::configure(settings, outlets))
    });
    registry.register(arrows_descriptor(), |_, outlets| {
        Box::new(KeyMapAction::arrows(outlets))
    });
    registry.register(wasd_descriptor(), |_, outlets| {
        Box::new(KeyMapAction::wasd(outlets))
    });
}

fn key_down_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "keyDown",
        name: "Key Down",
        category: "controls",
        description: "Listens for a configured key press and performs a transition",
        can_transition: true,
        parameters: vec![ParameterSpec {
            name: "Key",
            key: "key",
            kind: ParamKind::String,
            default: Some(Value::String("A".to_string())),
        }],
        transitions: vec![TransitionSpec {
            key: "keydown",
            name: "Key down",
            description: "State to transition to when the key is pressed",
        }],
    }
}

fn arrows_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "arrowKeys",
        name: "Arrow Keys",
        category: "controls",
        description: "Transitions to other states when arrow keys are pressed",
        can_transition: true,
        parameters: Vec::new(),
        transitions: vec![
            TransitionSpec {
                key: "up",
                name: "Key UP",
                description: "Up arrow pressed",
            },
            TransitionSpec {
                key: "left",
                name: "Key LEFT",
                description: "Left arrow pressed",
            },
            TransitionSpec {
                key: "down",
                name: "Key DOWN",
                description: "Down arrow pressed",
            },
            TransitionSpec {
                key: "right",
                name: "Key RIGHT",
                description: "Right arrow pressed",
            },
        ],
    }
}

fn wasd_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "wasdKeys",
        name: "WASD Keys",
        category: "controls",
        description: "Transitions to other states when the WASD keys are pressed",
        can_transition: true,
        parameters: Vec::new(),
        transitions: vec![
            TransitionSpec {
                key: "w",
                name: "Key W",
                description: "Key 'w' pressed",
            },
            TransitionSpec {
                key: "a",
                name: "Key A",
                description: "Key 'a' pressed",
            },
            TransitionSpec {
                key: "s",
                name: "Key S",
                description: "Key 's' pressed",
            },
            TransitionSpec {
                key: "d",
                name: "Key D",
                description: "Key 'd' pressed",
            },
        ],
    }
}

/// Listens for one configured key.
struct KeyDownAction {
    key: Option<u32>,
    target: Option<String>,
    listener: Option<ListenerId>,
}

impl KeyDownAction {
    fn configure(settings: &Settings, outlets: &OutletMap) -> Self {
        let name = settings.string("key");
        let key = name.and_then(keys::key_code);
        if key.is_none() {
            if let Some(name) = name {
                debug!("key name `{name}` not recognized; listener will never fire");
            }
        }
        KeyDownAction {
            key,
            target: outlets.target("keydown").map(str::to_string),
            listener: None,
        }
    }
}

impl Action for KeyDownAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        let sender = ctx.sender();
        let key = self.key;
        let target = self.target.clone();
        self.listener = Some(ctx.input().subscribe(move |event| {
            let InputEvent::KeyDown(code) = event else {
                return;
            };
            if Some(*code) == key {
                if let Some(target) = target.as_deref() {
                    sender.send(target);
                }
            }
        }));
    }

    fn exit(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(id) = self.listener.take() {
            if !ctx.input().unsubscribe(id) {
                warn!("key-down listener was already unregistered");
            }
        }
    }
}

/// Shared implementation for the arrow-keys and WASD listeners: a fixed
/// key-code -> outlet table, with unwired outlets dropped at configure
/// time so unmapped codes cost nothing at dispatch.
struct KeyMapAction {
    label: &'static str,
    bindings: Vec<(u32, String)>,
    listener: Option<ListenerId>,
}

impl KeyMapAction {
    fn arrows(outlets: &OutletMap) -> Self {
        Self::bound(
            "arrow-keys",
            &[
                (KEY_UP, "up"),
                (KEY_LEFT, "left"),
                (KEY_DOWN, "down"),
                (KEY_RIGHT, "right"),
            ],
            outlets,
        )
    }

    fn wasd(outlets: &OutletMap) -> Self {
        Self::bound(
            "wasd",
            &[(KEY_W, "w"), (KEY_A, "a"), (KEY_S, "s"), (KEY_D, "d")],
            outlets,
        )
    }

    fn bound(label: &'static str, table: &[(u32, &str)], outlets: &OutletMap) -> Self {
        let bindings = table
            .iter()
            .filter_map(|(code, outlet)| {
                outlets
                    .target(outlet)
                    .map(|target| (*code, target.to_string()))
            })
            .collect();
        KeyMapAction {
            label,
            bindings,
            listener: None,
        }
    }
}

impl Action for KeyMapAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        let sender = ctx.sender();
        let bindings = self.bindings.clone();
        self.listener = Some(ctx.input().subscribe(move |event| {
            let InputEvent::KeyDown(code) = event else {
                return;
            };
            if let Some((_, target)) = bindings.iter().find(|(bound, _)| bound == code) {
                sender.send(target);
            }
        }));
    }

    fn exit(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(id) = self.listener.take() {
            if !ctx.input().unsubscribe(id) {
                warn!("{} listener was already unregistered", self.label);
            }
        }
    }
}
