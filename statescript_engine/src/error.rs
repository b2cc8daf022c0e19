use thiserror::Error;

/// Fatal problems found while loading a graph document into a machine.
///
/// Everything here aborts the load; runtime conditions (an unmapped
/// transition key, an undefined compared variable) are deliberately not
/// errors and only surface as log diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("graph `{graph}` declares duplicate state id `{state}`")]
    DuplicateState { graph: String, state: String },

    #[error("graph `{graph}` names missing initial state `{state}`")]
    UnknownInitialState { graph: String, state: String },

    #[error("state `{state}` routes transition `{key}` to missing state `{target}`")]
    UnknownTargetState {
        state: String,
        key: String,
        target: String,
    },

    #[error("state `{state}` uses unknown action variant `{variant}`")]
    UnknownVariant { state: String, variant: String },

    #[error("action `{variant}` does not declare parameter `{key}`")]
    UnknownParameter { variant: &'static str, key: String },

    #[error("action `{variant}` parameter `{key}` expects {expected}, got {found}")]
    SettingTypeMismatch {
        variant: &'static str,
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("action `{variant}` does not declare transition outlet `{outlet}`")]
    UnknownOutlet { variant: &'static str, outlet: String },
}
