//! # Runcheck Engine
//!
//! Static analysis for automation workflow files. Given the raw text of a
//! workflow and the labels advertised by the currently online execution agents,
//! the engine answers three questions:
//!
//! - can the job graph be scheduled at all (is there a job without `needs`)?
//! - does some online agent advertise every `runs-on` label of every job?
//! - if the workflow can be started manually, which inputs does that accept?
//!
//! At most one diagnostic is produced per workflow. Malformed documents never
//! abort a listing: they surface as a `ParseError` diagnostic, and malformed
//! fragments inside the trigger section fall back to defaults.
//!
//! ## Usage
//!
//! ```rust
//! use runcheck_engine::{MessageCatalog, analyze_workflow};
//! use runcheck_types::AgentLabelSet;
//!
//! let workflow = br#"
//! on: push
//! jobs:
//!   build:
//!     runs-on: gpu
//! "#;
//!
//! let labels = AgentLabelSet::from_labels(["linux"]);
//! let analysis = analyze_workflow(workflow, &labels);
//! let message = MessageCatalog::default().render(&analysis.diagnostic);
//! assert_eq!(message, "No matching online runner with label: gpu");
//! ```
//!
//! ## Architecture
//!
//! - **`decode`**: best-effort conversion of YAML nodes into typed values
//! - **`document`**: parsing workflow bytes into a `WorkflowDocument`
//! - **`analysis`**: dispatch extraction, graph validation, label matching, and evaluation
//! - **`messages`**: rendering diagnostics into user-facing text
//! - **`listing`**: collaborator traits and per-project listing assembly

pub mod analysis;
pub mod decode;
pub mod document;
pub mod error;
pub mod listing;
pub mod messages;

pub use analysis::dispatch::{extract_dispatch, resolve_dispatch_inputs};
pub use analysis::evaluate::{WorkflowAnalysis, analyze_workflow, evaluate};
pub use analysis::graph::{GraphVerdict, JobGraphTally, validate_job_graph};
pub use analysis::requirements::{EXPRESSION_MARKER, first_unmet_label, is_expression_label};
pub use decode::decode_node;
pub use document::parse_workflow;
pub use error::{DispatchInputError, DocumentError};
pub use listing::{
    AgentRegistry, DispatchForm, ListingSelection, RequiredWorkflow, SelectedWorkflow, SharedWorkflowSource, WorkflowListing,
    WorkflowSource, build_listing, collect_workflow_files, is_workflow_file, order_branches, snapshot_labels,
};
pub use messages::MessageCatalog;
