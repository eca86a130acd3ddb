//! Human-readable rendering of workflow diagnostics.
//!
//! Each diagnostic kind maps to one message template. Templates carry at most
//! one `%s` placeholder, filled with the parse error detail or the unmet label.

use runcheck_types::WorkflowDiagnostic;
use serde::{Deserialize, Serialize};

const PLACEHOLDER: &str = "%s";

/// Message templates keyed by diagnostic kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub invalid_workflow_helper: String,
    pub no_matching_online_runner_helper: String,
    pub no_job_without_needs: String,
    pub no_job: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            invalid_workflow_helper: "Workflow config file is invalid. Please check your config file: %s".to_string(),
            no_matching_online_runner_helper: "No matching online runner with label: %s".to_string(),
            no_job_without_needs: "The workflow must contain at least one job without dependencies.".to_string(),
            no_job: "The workflow must contain at least one job.".to_string(),
        }
    }
}

impl MessageCatalog {
    /// Renders `diagnostic`; the empty diagnostic renders as an empty string.
    pub fn render(&self, diagnostic: &WorkflowDiagnostic) -> String {
        match diagnostic {
            WorkflowDiagnostic::None => String::new(),
            WorkflowDiagnostic::ParseError(detail) => fill(&self.invalid_workflow_helper, detail),
            WorkflowDiagnostic::UnmetRequirement(label) => fill(&self.no_matching_online_runner_helper, label),
            WorkflowDiagnostic::NoRunnableJob => self.no_job_without_needs.clone(),
            WorkflowDiagnostic::AllJobsEmpty => self.no_job.clone(),
        }
    }
}

fn fill(template: &str, argument: &str) -> String {
    if template.contains(PLACEHOLDER) {
        template.replacen(PLACEHOLDER, argument, 1)
    } else {
        format!("{template} {argument}")
    }
}
