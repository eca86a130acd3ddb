//! Error types surfaced by the analysis engine.

use thiserror::Error;

/// A workflow file that cannot be turned into a [`runcheck_types::WorkflowDocument`].
///
/// The display text becomes the detail of a `ParseError` diagnostic.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("workflow must be a mapping at the top level")]
    NotAMapping,

    #[error("'jobs' must be a mapping of job identifiers to job definitions")]
    InvalidJobs,

    #[error("job '{job}': {reason}")]
    InvalidJob { job: String, reason: String },
}

impl DocumentError {
    pub fn invalid_job(job: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidJob {
            job: job.into(),
            reason: reason.into(),
        }
    }
}

/// A manual-run submission rejected against the workflow's dispatch schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchInputError {
    #[error("workflow does not support manual dispatch")]
    NotDispatchable,

    #[error("input '{name}' is required")]
    MissingRequired { name: String },

    #[error("input '{name}' is not declared by the workflow")]
    UnknownInput { name: String },

    #[error("input '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}
