//! Capability metadata describing an action variant to the authoring tool.
//!
//! Descriptors are registered once per variant and never mutated afterwards.
//! The serialized form is a stable contract consumed by an external visual
//! editor, so field names stay camelCase regardless of what the runtime
//! calls them internally.

use serde::Serialize;
use thiserror::Error;

use crate::value::Value;

/// Declared type of an action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Boolean,
    Int,
    Float,
    Vec3,
    Rotation,
}

impl ParamKind {
    /// Name used in schema output and error messages.
    pub fn name(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Boolean => "boolean",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Vec3 => "vec3",
            ParamKind::Rotation => "rotation",
        }
    }

    /// Whether `value` is acceptable for a parameter of this kind.
    /// Numeric kinds accept both `Int` and `Float`; `Rotation` is a vec3
    /// of degrees.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => matches!(value, Value::String(_)),
            ParamKind::Boolean => matches!(value, Value::Bool(_)),
            ParamKind::Int | ParamKind::Float => {
                matches!(value, Value::Int(_) | Value::Float(_))
            }
            ParamKind::Vec3 | ParamKind::Rotation => matches!(value, Value::Vec3(_)),
        }
    }
}

/// One typed, defaultable parameter of an action variant.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub key: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// One named transition outlet an action variant can fire.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Immutable capability description for an action kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub can_transition: bool,
    pub parameters: Vec<ParameterSpec>,
    pub transitions: Vec<TransitionSpec>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor `{descriptor}` declares duplicate parameter key `{key}`")]
    DuplicateParameter {
        descriptor: &'static str,
        key: &'static str,
    },
    #[error("descriptor `{descriptor}` declares duplicate transition outlet `{key}`")]
    DuplicateOutlet {
        descriptor: &'static str,
        key: &'static str,
    },
    #[error("descriptor `{descriptor}` declares outlets but canTransition is false")]
    OutletsWithoutTransition { descriptor: &'static str },
    #[error("descriptor `{descriptor}` default for `{key}` does not match its declared type")]
    DefaultTypeMismatch {
        descriptor: &'static str,
        key: &'static str,
    },
}

impl ActionDescriptor {
    pub fn parameter(&self, key: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|spec| spec.key == key)
    }

    pub fn outlet(&self, key: &str) -> Option<&TransitionSpec> {
        self.transitions.iter().find(|spec| spec.key == key)
    }

    /// Structural well-formedness: unique keys, defaults matching their
    /// declared type, no outlets on variants that cannot transition.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        for (index, spec) in self.parameters.iter().enumerate() {
            if self.parameters[..index].iter().any(|s| s.key == spec.key) {
                return Err(DescriptorError::DuplicateParameter {
                    descriptor: self.key,
                    key: spec.key,
                });
            }
            if let Some(default) = spec.default.as_ref() {
                if !spec.kind.accepts(default) {
                    return Err(DescriptorError::DefaultTypeMismatch {
                        descriptor: self.key,
                        key: spec.key,
                    });
                }
            }
        }
        for (index, spec) in self.transitions.iter().enumerate() {
            if self.transitions[..index].iter().any(|s| s.key == spec.key) {
                return Err(DescriptorError::DuplicateOutlet {
                    descriptor: self.key,
                    key: spec.key,
                });
            }
        }
        if !self.can_transition && !self.transitions.is_empty() {
            return Err(DescriptorError::OutletsWithoutTransition {
                descriptor: self.key,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionDescriptor {
        ActionDescriptor {
            key: "sample",
            name: "Sample",
            category: "tests",
            description: "A descriptor used by the unit tests",
            can_transition: true,
            parameters: vec![ParameterSpec {
                name: "Every frame",
                key: "everyFrame",
                kind: ParamKind::Boolean,
                default: Some(Value::Bool(true)),
            }],
            transitions: vec![TransitionSpec {
                key: "done",
                name: "Done",
                description: "Fired when the sample finishes",
            }],
        }
    }

    #[test]
    fn valid_descriptor_passes() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn duplicate_outlet_is_rejected() {
        let mut descriptor = sample();
        descriptor.transitions.push(TransitionSpec {
            key: "done",
            name: "Done again",
            description: "Duplicate outlet",
        });
        assert_eq!(
            descriptor.validate(),
            Err(DescriptorError::DuplicateOutlet {
                descriptor: "sample",
                key: "done",
            })
        );
    }

    #[test]
    fn outlets_require_can_transition() {
        let mut descriptor = sample();
        descriptor.can_transition = false;
        assert_eq!(
            descriptor.validate(),
            Err(DescriptorError::OutletsWithoutTransition {
                descriptor: "sample",
            })
        );
    }

    #[test]
    fn default_must_match_declared_type() {
        let mut descriptor = sample();
        descriptor.parameters[0].default = Some(Value::String("yes".to_string()));
        assert_eq!(
            descriptor.validate(),
            Err(DescriptorError::DefaultTypeMismatch {
                descriptor: "sample",
                key: "everyFrame",
            })
        );
    }

    #[test]
    fn serialized_schema_uses_editor_field_names() {
        let json = serde_json::to_value(sample()).expect("serialize descriptor");
        assert_eq!(json["canTransition"], serde_json::Value::Bool(true));
        assert_eq!(json["parameters"][0]["type"], "boolean");
        assert_eq!(json["parameters"][0]["default"], true);
        assert_eq!(json["transitions"][0]["key"], "done");
    }
}
