//! The action lifecycle contract and configuration helpers.
//!
//! An action is configured exactly once, at machine-load time, through its
//! variant's factory: settings are validated against the descriptor and
//! filled from its defaults, and the wired outlets are resolved into an
//! `OutletMap`. Configuration registers no external resource; listeners
//! and subscriptions are acquired in `enter` and must be released in the
//! paired `exit`.

use std::collections::BTreeMap;

use statescript_graph::{ActionDescriptor, Value};

use crate::error::ConfigError;
use crate::machine::TickContext;

/// Uniform lifecycle every variant implements. `enter` runs once per
/// state-activation and may immediately request a transition; `update`
/// runs every tick while the owning state is current; `exit` runs once per
/// activation and releases whatever `enter` acquired, idempotently.
pub trait Action {
    fn enter(&mut self, ctx: &mut TickContext<'_>) {
        let _ = ctx;
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        let _ = ctx;
    }

    fn exit(&mut self, ctx: &mut TickContext<'_>) {
        let _ = ctx;
    }
}

/// Descriptor-validated parameter values, defaults already applied.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

impl Settings {
    /// Check `provided` against the descriptor's parameter specs and fill
    /// in declared defaults for anything absent.
    pub fn resolve(
        descriptor: &ActionDescriptor,
        provided: &BTreeMap<String, Value>,
    ) -> Result<Self, ConfigError> {
        for (key, value) in provided {
            let Some(spec) = descriptor.parameter(key) else {
                return Err(ConfigError::UnknownParameter {
                    variant: descriptor.key,
                    key: key.clone(),
                });
            };
            if !spec.kind.accepts(value) {
                return Err(ConfigError::SettingTypeMismatch {
                    variant: descriptor.key,
                    key: key.clone(),
                    expected: spec.kind.name(),
                    found: value.kind_name(),
                });
            }
        }

        let mut values = provided.clone();
        for spec in &descriptor.parameters {
            if !values.contains_key(spec.key) {
                if let Some(default) = spec.default.as_ref() {
                    values.insert(spec.key.to_string(), default.clone());
                }
            }
        }
        Ok(Settings { values })
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn boolean_or(&self, key: &str, fallback: bool) -> bool {
        self.boolean(key).unwrap_or(fallback)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_number)
    }

    pub fn vec3(&self, key: &str) -> Option<[f64; 3]> {
        self.values.get(key).and_then(Value::as_vec3)
    }

    pub fn vec3_or(&self, key: &str, fallback: [f64; 3]) -> [f64; 3] {
        self.vec3(key).unwrap_or(fallback)
    }
}

/// Wired transition outlets, resolved once at configure time: descriptor
/// outlet key -> the symbolic transition key the state table understands.
/// Only outlets the descriptor declares can be wired, which is what keeps
/// a variant's runtime sends inside its published capability contract.
#[derive(Debug, Clone, Default)]
pub struct OutletMap {
    targets: BTreeMap<&'static str, String>,
}

impl OutletMap {
    pub fn resolve(
        descriptor: &ActionDescriptor,
        wired: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut targets = BTreeMap::new();
        for (outlet, transition_key) in wired {
            let Some(spec) = descriptor.outlet(outlet) else {
                return Err(ConfigError::UnknownOutlet {
                    variant: descriptor.key,
                    outlet: outlet.clone(),
                });
            };
            targets.insert(spec.key, transition_key.clone());
        }
        Ok(OutletMap { targets })
    }

    /// The transition key wired to `outlet`, if the author connected it.
    pub fn target(&self, outlet: &str) -> Option<&str> {
        self.targets.get(outlet).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use statescript_graph::{ParamKind, ParameterSpec, TransitionSpec};

    use super::*;

    fn descriptor() -> ActionDescriptor {
        ActionDescriptor {
            key: "probe",
            name: "Probe",
            category: "tests",
            description: "Settings resolution fixture",
            can_transition: true,
            parameters: vec![
                ParameterSpec {
                    name: "Key",
                    key: "key",
                    kind: ParamKind::String,
                    default: Some(Value::String("A".to_string())),
                },
                ParameterSpec {
                    name: "Every frame",
                    key: "everyFrame",
                    kind: ParamKind::Boolean,
                    default: Some(Value::Bool(true)),
                },
            ],
            transitions: vec![TransitionSpec {
                key: "fired",
                name: "Fired",
                description: "Probe fired",
            }],
        }
    }

    #[test]
    fn defaults_fill_missing_parameters() {
        let settings = Settings::resolve(&descriptor(), &BTreeMap::new()).expect("resolve");
        assert_eq!(settings.string("key"), Some("A"));
        assert!(settings.boolean_or("everyFrame", false));
    }

    #[test]
    fn unknown_parameter_is_fatal() {
        let provided = BTreeMap::from([("bogus".to_string(), Value::Bool(true))]);
        let err = Settings::resolve(&descriptor(), &provided).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownParameter {
                variant: "probe",
                key: "bogus".to_string(),
            }
        );
    }

    #[test]
    fn type_mismatch_is_fatal() {
        let provided = BTreeMap::from([("everyFrame".to_string(), Value::Int(1))]);
        let err = Settings::resolve(&descriptor(), &provided).unwrap_err();
        assert_eq!(
            err,
            ConfigError::SettingTypeMismatch {
                variant: "probe",
                key: "everyFrame".to_string(),
                expected: "boolean",
                found: "int",
            }
        );
    }

    #[test]
    fn outlets_resolve_only_declared_keys() {
        let wired = BTreeMap::from([("fired".to_string(), "toNext".to_string())]);
        let outlets = OutletMap::resolve(&descriptor(), &wired).expect("resolve outlets");
        assert_eq!(outlets.target("fired"), Some("toNext"));
        assert_eq!(outlets.target("unwired"), None);

        let bad = BTreeMap::from([("exploded".to_string(), "toNext".to_string())]);
        let err = OutletMap::resolve(&descriptor(), &bad).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownOutlet {
                variant: "probe",
                outlet: "exploded".to_string(),
            }
        );
    }
}
