//! Shared type definitions for the runcheck workflow analysis engine.
//!
//! The models here are plain data: the engine crate parses workflow documents
//! into them, and the CLI renders them. Nothing in this crate performs I/O.

pub mod agent;
pub mod workflow;

pub use agent::{AgentLabelSet, RunnerAgent};
pub use workflow::validation::validate_dispatch_value;
pub use workflow::{
    DISPATCH_TRIGGER, DispatchInput, DispatchSchema, Job, TriggerSpec, WorkflowDiagnostic, WorkflowDocument, WorkflowEntry,
    WorkflowFile,
};
