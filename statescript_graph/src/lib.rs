//! Shared statescript document model.
//!
//! This crate keeps the serializable pieces in one place so the runtime,
//! the headless runner and any external authoring tool stay interoperable:
//! the state-graph document, the action-descriptor schema the editor
//! consumes, and the dynamic `Value` type used by settings, variables and
//! bus payloads.

pub mod descriptor;
pub mod document;
pub mod value;

pub use descriptor::{ActionDescriptor, DescriptorError, ParamKind, ParameterSpec, TransitionSpec};
pub use document::{ActionDoc, GraphDoc, StateDoc};
pub use value::Value;
