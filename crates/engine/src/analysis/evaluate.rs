//! Combining the static checks into a single diagnostic per workflow.

use runcheck_types::{AgentLabelSet, WorkflowDiagnostic, WorkflowDocument};
use tracing::debug;

use super::graph::{GraphVerdict, JobGraphTally};
use super::requirements::first_unmet_label;
use crate::document::parse_workflow;

/// Result of analysing one workflow file.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowAnalysis {
    pub diagnostic: WorkflowDiagnostic,
    /// The parsed document, absent when the file failed to parse.
    pub document: Option<WorkflowDocument>,
}

/// Parses and evaluates raw workflow content.
pub fn analyze_workflow(content: &[u8], available: &AgentLabelSet) -> WorkflowAnalysis {
    match parse_workflow(content) {
        Ok(document) => WorkflowAnalysis {
            diagnostic: evaluate(&document, available),
            document: Some(document),
        },
        Err(error) => {
            debug!(%error, "workflow failed to parse");
            WorkflowAnalysis {
                diagnostic: WorkflowDiagnostic::ParseError(error.to_string()),
                document: None,
            }
        }
    }
}

/// Evaluates a parsed workflow against the online agent labels.
///
/// Structural problems outrank label mismatches: an empty job set first, then a
/// job set with no runnable root, then the first unmet `runs-on` label in
/// declaration order. The walk over jobs always completes so the structural
/// counts cover every job.
pub fn evaluate(document: &WorkflowDocument, available: &AgentLabelSet) -> WorkflowDiagnostic {
    let mut tally = JobGraphTally::default();
    let mut unmet = None;

    for (job_id, job) in &document.jobs {
        tally.record(job.as_ref());
        if unmet.is_some() {
            continue;
        }
        if let Some(job) = job
            && let Some(label) = first_unmet_label(job, available)
        {
            debug!(job = %job_id, label, "no online agent advertises label");
            unmet = Some(label.to_string());
        }
    }

    match tally.verdict() {
        GraphVerdict::AllJobsEmpty => WorkflowDiagnostic::AllJobsEmpty,
        GraphVerdict::NoRunnableJob => WorkflowDiagnostic::NoRunnableJob,
        GraphVerdict::Schedulable => unmet.map(WorkflowDiagnostic::UnmetRequirement).unwrap_or_default(),
    }
}
