//! Actions that read or mutate the owner entity's transform.

use statescript_graph::{ActionDescriptor, ParamKind, ParameterSpec, TransitionSpec, Value};

use crate::action::{Action, OutletMap, Settings};
use crate::machine::TickContext;
use crate::registry::ActionRegistry;

pub fn register(registry: &mut ActionRegistry) {
    registry.register(rotate_descriptor(), |settings, _| {
        Box::new(RotateAction::configure(settings))
    });
    registry.register(in_box_descriptor(), |settings, outlets| {
        Box::new(InBoxAction::configure(settings, outlets))
    });
}

fn rotate_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "rotate",
        name: "Rotate",
        category: "animation",
        description: "Rotates the owner entity by the configured angles (degrees)",
        can_transition: false,
        parameters: vec![
            ParameterSpec {
                name: "Rotation",
                key: "rotation",
                kind: ParamKind::Rotation,
                default: Some(Value::Vec3([0.0, 0.0, 0.0])),
            },
            ParameterSpec {
                name: "Relative",
                key: "relative",
                kind: ParamKind::Boolean,
                default: Some(Value::Bool(true)),
            },
            ParameterSpec {
                name: "On every frame",
                key: "everyFrame",
                kind: ParamKind::Boolean,
                default: Some(Value::Bool(true)),
            },
        ],
        transitions: Vec::new(),
    }
}

fn in_box_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        key: "inBox",
        name: "In Box",
        category: "collision",
        description: "Checks whether the owner entity's world position is inside an \
                      axis-aligned box; the bounds themselves count as outside",
        can_transition: true,
        parameters: vec![
            ParameterSpec {
                name: "Point1",
                key: "point1",
                kind: ParamKind::Vec3,
                default: Some(Value::Vec3([-1.0, -1.0, -1.0])),
            },
            ParameterSpec {
                name: "Point2",
                key: "point2",
                kind: ParamKind::Vec3,
                default: Some(Value::Vec3([1.0, 1.0, 1.0])),
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
                key: "inside",
                name: "Inside",
                description: "Entity is strictly inside the box",
            },
            TransitionSpec {
                key: "outside",
                name: "Outside",
                description: "Entity is on or beyond the bounds",
            },
        ],
    }
}

/// Pure transform mutation; fires no outlet.
///
/// Relative mode composes X, then Y, then Z increments onto the current
/// rotation; absolute mode replaces it with the XYZ Euler pose. Under
/// `everyFrame` the configured angles are scaled by `tpf` first, so
/// relative mode accumulates degrees-per-second while absolute mode tracks
/// the tick delta without accumulating.
struct RotateAction {
    rotation: [f64; 3],
    relative: bool,
    every_frame: bool,
}

impl RotateAction {
    fn configure(settings: &Settings) -> Self {
        RotateAction {
            rotation: settings.vec3_or("rotation", [0.0, 0.0, 0.0]),
            relative: settings.boolean_or("relative", true),
            every_frame: settings.boolean_or("everyFrame", true),
        }
    }

    fn apply(&self, ctx: &TickContext<'_>) {
        let scale = if self.every_frame { ctx.tpf() } else { 1.0 };
        let [x, y, z] = self.rotation;
        let (rx, ry, rz) = (
            (x * scale).to_radians() as f32,
            (y * scale).to_radians() as f32,
            (z * scale).to_radians() as f32,
        );
        let owner = ctx.owner();
        if self.relative {
            owner.rotate_x(rx);
            owner.rotate_y(ry);
            owner.rotate_z(rz);
        } else {
            owner.set_rotation_xyz(rx, ry, rz);
        }
    }
}

impl Action for RotateAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        if !self.every_frame {
            self.apply(ctx);
        }
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.every_frame {
            self.apply(ctx);
        }
    }
}

/// Strict open-bounds containment test against world translation. The
/// bounds are taken exactly as authored: a reversed box (a `point1`
/// component at or above `point2`) can never contain anything and always
/// classifies as outside.
struct InBoxAction {
    point1: [f64; 3],
    point2: [f64; 3],
    every_frame: bool,
    inside: Option<String>,
    outside: Option<String>,
}

impl InBoxAction {
    fn configure(settings: &Settings, outlets: &OutletMap) -> Self {
        InBoxAction {
            point1: settings.vec3_or("point1", [-1.0, -1.0, -1.0]),
            point2: settings.vec3_or("point2", [1.0, 1.0, 1.0]),
            every_frame: settings.boolean_or("everyFrame", true),
            inside: outlets.target("inside").map(str::to_string),
            outside: outlets.target("outside").map(str::to_string),
        }
    }

    fn evaluate(&self, ctx: &TickContext<'_>) {
        let translation = ctx.owner().world_translation().to_array();
        let contained = translation.iter().enumerate().all(|(axis, component)| {
            let component = *component as f64;
            component > self.point1[axis] && component < self.point2[axis]
        });
        let outlet = if contained { &self.inside } else { &self.outside };
        if let Some(target) = outlet.as_deref() {
            ctx.send(target);
        }
    }
}

impl Action for InBoxAction {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        if !self.every_frame {
            self.evaluate(ctx);
        }
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.every_frame {
            self.evaluate(ctx);
        }
    }
}
