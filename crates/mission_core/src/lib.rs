//! Deterministic mission runtime.
//!
//! No IO, no wall clock. Time arrives through `Tick` actions and every state
//! change goes through the reducer, which records one log entry per action.

mod checkpoint;
pub mod completion;
mod definition;
mod engine;
mod error;
mod id;
pub mod projection;
mod registry;
pub mod replay;
mod runtime;
mod state;
mod steps;
mod tools;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use completion::{evaluate, Evaluation, StepSignal, Verdict};
pub use definition::ValidatedDefinition;
pub use engine::{apply, ReduceContext};
pub use error::{DefinitionError, Rejection, ReplayError};
pub use id::{generate_run_id, generate_uuid};
pub use projection::{project, Projection};
pub use registry::{LayoutDescriptor, Registry, ToolDescriptor};
pub use replay::{replay, verify_replay};
pub use runtime::{MissionRuntime, ToolContext};
pub use types::*;

#[cfg(test)]
mod tests;
