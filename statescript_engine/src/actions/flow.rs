//! Flow-control actions: the unconditional transition, the message-bus
//! listener, and the counter comparator.

use std::cmp::Ordering;

use log::{debug, warn};
use statescript_graph::{ActionDescriptor, ParamKind, ParameterSpec, TransitionSpec, Value};

use crate::action::{Action, OutletMap, Settings};
use crate::host::Subscription;
use crate::machine::TickContext;
use crate::registry::ActionRegistry;

pub fn register(registry: &mut ActionRegistry) {
    registry.register(transition_descriptor(), |_, outlets| {
        Box::new(TransitionAction::configure(outlets))
    });
    registry.register(on_message_descriptor(), |settings, outlets| {
        Box::new(OnMessageAction::configure(settings, outlets))
    });
    registry.register(compare_counters_descriptor(), |settings, outlets| {
        Box::new(CompareCountersAction::configure(settings, outlets))
    });
}

fn transition_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "transition",
        name: "Transition",
        category: "transitions",
        description: "Transitions to the selected state as soon as this state is entered",
        can_transition: true,
        parameters: Vec::new(),
        transitions: vec![TransitionSpec {
            key: "transition",
            name: "On Transition",
            description: "State to transition to",
        }],
    }
}

fn on_message_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "transitionOnMessage",
        name: "Listen",
        category: "transitions",
        description: "Performs a transition on receiving a bus message on a specific channel",
        can_transition: true,
        parameters: vec![ParameterSpec {
            name: "Message channel",
            key: "channel",
            kind: ParamKind::String,
            default: Some(Value::String(String::new())),
        }],
        transitions: vec![TransitionSpec {
            key: "transition",
            name: "On Message",
            description: "State to transition to",
        }],
    }
}

fn compare_counters_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "compareCounters",
        name: "Compare 2 Counters",
        category: "transitions",
        description: "Compares the values of two named variables",
        can_transition: true,
        parameters: vec![
            ParameterSpec {
                name: "First counter",
                key: "name1",
                kind: ParamKind::String,
                default: None,
            },
            ParameterSpec {
                name: "Second counter",
                key: "name2",
                kind: ParamKind::String,
                default: None,
            },
            ParameterSpec {
                name: "On every frame",
                key: "everyFrame",
                kind: ParamKind::Boolean,
                default: Some(Value::Bool(true)),
            },
        ],
        transitions: vec![
            TransitionSpec {
                key: "less",
                name: "Less",
                description: "First counter is smaller than the second",
            },
            TransitionSpec {
                key: "equal",
                name: "Equal",
                description: "Both counters hold the same value",
            },
            TransitionSpec {
                key: "greater",
                name: "Greater",
                description: "First counter is larger than the second",
            },
        ],
    }
}

/// Fires its single outlet immediately on enter; used to chain states
/// with no condition.
struct TransitionAction {
    target: Option<String>,
}

impl TransitionAction {
    fn configure(outlets: &OutletMap) -> Self {
        TransitionAction {
            target: outlets.target("transition").map(str::to_string),
        }
    }
}

impl Action for TransitionAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(target) = self.target.as_deref() {
            ctx.send(target);
        }
    }
}

/// Subscribes to a bus channel for the lifetime of the state activation.
/// The empty channel name is the default channel, subscribable like any
/// other.
struct OnMessageAction {
    channel: String,
    target: Option<String>,
    subscription: Option<Subscription>,
}

impl OnMessageAction {
    fn configure(settings: &Settings, outlets: &OutletMap) -> Self {
        OnMessageAction {
            channel: settings.string("channel").unwrap_or_default().to_string(),
            target: outlets.target("transition").map(str::to_string),
            subscription: None,
        }
    }
}

impl Action for OnMessageAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        let sender = ctx.sender();
        let target = self.target.clone();
        self.subscription = Some(ctx.bus().subscribe(&self.channel, move |_payload| {
            if let Some(target) = target.as_deref() {
                sender.send(target);
            }
        }));
    }

    fn exit(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(subscription) = self.subscription.take() {
            if !ctx.bus().unsubscribe(&subscription) {
                warn!("bus subscription on `{}` was already removed", self.channel);
            }
        }
    }
}

/// Orders two named variables and fires the matching outlet. Either
/// variable missing (or not a number) means the comparison is
/// indeterminate: nothing fires.
struct CompareCountersAction {
    name1: Option<String>,
    name2: Option<String>,
    every_frame: bool,
    less: Option<String>,
    equal: Option<String>,
    greater: Option<String>,
}

impl CompareCountersAction {
    fn configure(settings: &Settings, outlets: &OutletMap) -> Self {
        CompareCountersAction {
            name1: settings.string("name1").map(str::to_string),
            name2: settings.string("name2").map(str::to_string),
            every_frame: settings.boolean_or("everyFrame", true),
            less: outlets.target("less").map(str::to_string),
            equal: outlets.target("equal").map(str::to_string),
            greater: outlets.target("greater").map(str::to_string),
        }
    }

    fn compare(&self, ctx: &TickContext<'_>) {
        let (Some(name1), Some(name2)) = (self.name1.as_deref(), self.name2.as_deref()) else {
            return;
        };
        let (Some(first), Some(second)) =
            (ctx.variables().number(name1), ctx.variables().number(name2))
        else {
            debug!("cannot compare `{name1}` and `{name2}`; at least one is undefined");
            return;
        };
        let outlet = match first.partial_cmp(&second) {
            Some(Ordering::Less) => &self.less,
            Some(Ordering::Equal) => &self.equal,
            Some(Ordering::Greater) => &self.greater,
            None => {
                debug!("cannot compare `{name1}` and `{name2}`; not a number");
                return;
            }
        };
        if let Some(target) = outlet.as_deref() {
            ctx.send(target);
        }
    }
}

impl Action for CompareCountersAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        if !self.every_frame {
            self.compare(ctx);
        }
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.every_frame {
            self.compare(ctx);
        }
    }
}
