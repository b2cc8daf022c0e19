//! Scripted host events: the headless stand-in for a player and the rest
//! of the application, so graphs exercising listeners can run without a
//! window or a real input device.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use statescript_engine::{keys, InputEvent, Machine, MachineHost, MouseButton};
use statescript_graph::Value;

use glam::Vec3;

fn null_payload() -> Value {
    Value::Null
}

/// One host-side occurrence the runner injects into the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HostEvent {
    KeyDown { key: String },
    KeyUp { key: String },
    MouseDown { button: String },
    MouseUp { button: String },
    TouchEnd,
    Publish {
        channel: String,
        #[serde(default = "null_payload")]
        payload: Value,
    },
    SetVariable { name: String, value: Value },
    MoveEntity { translation: [f32; 3] },
    /// Ask the machine for a transition directly, as host code would.
    Send { key: String },
}

impl HostEvent {
    pub fn apply(&self, machine: &mut Machine, host: &MachineHost) {
        match self {
            HostEvent::KeyDown { key } => match keys::key_code(key) {
                Some(code) => host.input.dispatch(InputEvent::KeyDown(code)),
                None => warn!("script: unknown key name `{key}`; event dropped"),
            },
            HostEvent::KeyUp { key } => match keys::key_code(key) {
                Some(code) => host.input.dispatch(InputEvent::KeyUp(code)),
                None => warn!("script: unknown key name `{key}`; event dropped"),
            },
            HostEvent::MouseDown { button } => match MouseButton::from_name(button) {
                Some(button) => host.input.dispatch(InputEvent::MouseDown(button)),
                None => warn!("script: unknown mouse button `{button}`; event dropped"),
            },
            HostEvent::MouseUp { button } => match MouseButton::from_name(button) {
                Some(button) => host.input.dispatch(InputEvent::MouseUp(button)),
                None => warn!("script: unknown mouse button `{button}`; event dropped"),
            },
            HostEvent::TouchEnd => host.input.dispatch(InputEvent::TouchEnd),
            HostEvent::Publish { channel, payload } => host.bus.publish(channel, payload),
            HostEvent::SetVariable { name, value } => {
                machine.set_variable(name.clone(), value.clone());
            }
            HostEvent::MoveEntity { translation } => {
                host.owner.set_translation(Vec3::from_array(*translation));
            }
            HostEvent::Send { key } => machine.send(key),
        }
    }
}

/// An event pinned to the tick it fires before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedEvent {
    pub at_tick: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventScript {
    pub events: Vec<ScriptedEvent>,
}

impl EventScript {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading event script {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing event script {}", path.display()))
    }

    /// Events scheduled for `tick`, in authoring order.
    pub fn due(&self, tick: u64) -> impl Iterator<Item = &HostEvent> {
        self.events
            .iter()
            .filter(move |scripted| scripted.at_tick == tick)
            .map(|scripted| &scripted.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_document_roundtrips() {
        let script = EventScript {
            events: vec![
                ScriptedEvent {
                    at_tick: 1,
                    event: HostEvent::KeyDown {
                        key: "E".to_string(),
                    },
                },
                ScriptedEvent {
                    at_tick: 4,
                    event: HostEvent::Publish {
                        channel: "door".to_string(),
                        payload: Value::Null,
                    },
                },
            ],
        };
        let json = serde_json::to_string(&script).expect("serialize script");
        let back: EventScript = serde_json::from_str(&json).expect("parse script");
        assert_eq!(back, script);
    }

    #[test]
    fn tagged_form_reads_naturally() {
        let raw = r#"{
            "events": [
                { "atTick": 2, "event": "keyDown", "key": "W" },
                { "atTick": 3, "event": "touchEnd" },
                { "atTick": 5, "event": "publish", "channel": "" },
                { "atTick": 6, "event": "moveEntity", "translation": [0.5, 0.0, 0.5] }
            ]
        }"#;
        let script: EventScript = serde_json::from_str(raw).expect("parse script");
        assert_eq!(script.events.len(), 4);
        assert_eq!(
            script.events[2].event,
            HostEvent::Publish {
                channel: String::new(),
                payload: Value::Null,
            }
        );
        assert_eq!(script.due(3).count(), 1);
        assert_eq!(script.due(4).count(), 0);
    }
}
