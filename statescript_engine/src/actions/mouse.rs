//! Mouse and touch actions: a pressed-state poll and a release listener.

use log::{debug, warn};
use statescript_graph::{ActionDescriptor, ParamKind, ParameterSpec, TransitionSpec, Value};

use crate::action::{Action, OutletMap, Settings};
use crate::host::{InputEvent, ListenerId, MouseButton};
use crate::machine::TickContext;
use crate::registry::ActionRegistry;

pub fn register(registry: &mut ActionRegistry) {
    registry.register(mouse_pressed_descriptor(), |settings, outlets| {
        Box::new(MousePressedAction::configure(settings, outlets))
    });
    registry.register(mouse_up_descriptor(), |_, outlets| {
        Box::new(MouseUpAction::configure(outlets))
    });
}

fn mouse_pressed_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "mousePressed",
        name: "Mouse Button Pressed",
        category: "controls",
        description: "Transitions while a mouse button is held down; the check runs on \
                      state entry and every tick, so it works across transition boundaries",
        can_transition: true,
        parameters: vec![ParameterSpec {
            name: "Button",
            key: "button",
            kind: ParamKind::String,
            default: Some(Value::String("Left".to_string())),
        }],
        transitions: vec![TransitionSpec {
            key: "mousedown",
            name: "Button Pressed",
            description: "State to transition to while the button is down",
        }],
    }
}

fn mouse_up_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "mouseUp",
        name: "Mouse Up / Touch End",
        category: "controls",
        description: "Listens for a mouse button release (or touch end) and performs a transition",
        can_transition: true,
        parameters: Vec::new(),
        transitions: vec![
            TransitionSpec {
                key: "mouseLeftUp",
                name: "Left mouse up",
                description: "Left button released",
            },
            TransitionSpec {
                key: "middleMouseUp",
                name: "Middle mouse up",
                description: "Middle button released",
            },
            TransitionSpec {
                key: "rightMouseUp",
                name: "Right mouse up",
                description: "Right button released",
            },
            TransitionSpec {
                key: "touchUp",
                name: "Touch release",
                description: "Touch ended",
            },
        ],
    }
}

/// Polls the host's pressed-state query instead of listening for events,
/// so a button already held when the state activates still counts.
struct MousePressedAction {
    button: Option<MouseButton>,
    target: Option<String>,
}

impl MousePressedAction {
    fn configure(settings: &Settings, outlets: &OutletMap) -> Self {
        let name = settings.string("button");
        let button = name.and_then(MouseButton::from_name);
        if button.is_none() {
            if let Some(name) = name {
                debug!("mouse button name `{name}` not recognized; poll will never fire");
            }
        }
        MousePressedAction {
            button,
            target: outlets.target("mousedown").map(str::to_string),
        }
    }

    fn poll(&self, ctx: &TickContext<'_>) {
        let Some(button) = self.button else {
            return;
        };
        if ctx.input().button_down(button) {
            if let Some(target) = self.target.as_deref() {
                ctx.send(target);
            }
        }
    }
}

impl Action for MousePressedAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        self.poll(ctx);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.poll(ctx);
    }
}

#[derive(Clone, Default)]
struct ReleaseTargets {
    left: Option<String>,
    middle: Option<String>,
    right: Option<String>,
    touch: Option<String>,
}

impl ReleaseTargets {
    fn for_event(&self, event: &InputEvent) -> Option<&str> {
        match event {
            InputEvent::MouseUp(MouseButton::Left) => self.left.as_deref(),
            InputEvent::MouseUp(MouseButton::Middle) => self.middle.as_deref(),
            InputEvent::MouseUp(MouseButton::Right) => self.right.as_deref(),
            // Extra buttons have no outlet.
            InputEvent::MouseUp(MouseButton::Other(_)) => None,
            InputEvent::TouchEnd => self.touch.as_deref(),
            _ => None,
        }
    }
}

/// One hub listener covers both mouse-up and touch-end.
struct MouseUpAction {
    targets: ReleaseTargets,
    listener: Option<ListenerId>,
}

impl MouseUpAction {
    fn configure(outlets: &OutletMap) -> Self {
        MouseUpAction {
            targets: ReleaseTargets {
                left: outlets.target("mouseLeftUp").map(str::to_string),
                middle: outlets.target("middleMouseUp").map(str::to_string),
                right: outlets.target("rightMouseUp").map(str::to_string),
                touch: outlets.target("touchUp").map(str::to_string),
            },
            listener: None,
        }
    }
}

impl Action for MouseUpAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        let sender = ctx.sender();
        let targets = self.targets.clone();
        self.listener = Some(ctx.input().subscribe(move |event| {
            if let Some(target) = targets.for_event(event) {
                sender.send(target);
            }
        }));
    }

    fn exit(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(id) = self.listener.take() {
            if !ctx.input().unsubscribe(id) {
                warn!("mouse-up listener was already unregistered");
            }
        }
    }
}
