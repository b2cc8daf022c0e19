//! Action-driven finite-state-machine scripting runtime.
//!
//! Behavior is authored as a graph of named states; each state is an
//! ordered list of parameterized action units sharing one lifecycle
//! (configure at load, enter, per-tick update, exit). The host calls
//! [`Machine::update`] once per simulation tick; actions request
//! transitions by symbolic key, synchronously from the update pass or
//! later from a host event callback, and the machine applies at most one
//! state change per tick, after the full pass.
//!
//! Everything the engine touches in the outside world arrives through
//! [`MachineHost`]: an input event hub, a message bus and the owner-entity
//! transform handle. Tests and headless hosts drive those directly.

pub mod action;
pub mod actions;
pub mod entity;
pub mod error;
pub mod host;
pub mod keys;
pub mod machine;
pub mod registry;
pub mod signal;
pub mod variables;

pub use action::{Action, OutletMap, Settings};
pub use entity::{OwnerEntity, Transform};
pub use error::ConfigError;
pub use host::{
    InputEvent, InputSource, ListenerId, MachineHost, MessageBus, MouseButton, Subscription,
};
pub use machine::{Machine, TickContext, TransitionRecord};
pub use registry::{ActionFactory, ActionRegistry, RegistryEntry};
pub use signal::{TransitionSender, TransitionSignal};
pub use variables::VariableStore;
