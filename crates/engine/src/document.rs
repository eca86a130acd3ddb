//! Parsing raw workflow bytes into a [`WorkflowDocument`].
//!
//! Only the parts of a workflow the engine reasons about are read: the trigger
//! section, and each job's `needs` and `runs-on`. Everything else is ignored.
//! Structural problems at the document or job level are reported as
//! [`DocumentError`]; the trigger section is kept raw and never fails the parse.

use indexmap::IndexMap;
use runcheck_types::{Job, TriggerSpec, WorkflowDocument};
use serde_yaml::{Mapping, Value as YamlValue};
use tracing::debug;

use crate::decode::{parse_source, scalar_text};
use crate::error::DocumentError;

/// Parses a workflow file.
///
/// Content is read as UTF-8, replacing invalid sequences. Scalars keep their
/// source spelling, so `runs-on: 3.10` asks for the label `3.10`.
pub fn parse_workflow(content: &[u8]) -> Result<WorkflowDocument, DocumentError> {
    let text = String::from_utf8_lossy(content);
    let root = parse_source(&text)?;
    let YamlValue::Mapping(root) = root else {
        return Err(DocumentError::NotAMapping);
    };

    let name = root.get("name").and_then(scalar_text);
    let on = root.get("on").cloned().map(TriggerSpec::from_node).unwrap_or(TriggerSpec::Unsupported);
    let jobs = match root.get("jobs") {
        None | Some(YamlValue::Null) => IndexMap::new(),
        Some(YamlValue::Mapping(jobs)) => parse_jobs(jobs)?,
        Some(_) => return Err(DocumentError::InvalidJobs),
    };

    debug!(trigger = on.kind(), jobs = jobs.len(), "parsed workflow document");
    Ok(WorkflowDocument { name, on, jobs })
}

fn parse_jobs(jobs: &Mapping) -> Result<IndexMap<String, Option<Job>>, DocumentError> {
    let mut parsed = IndexMap::with_capacity(jobs.len());
    for (key, body) in jobs {
        let job_id = scalar_text(key).ok_or(DocumentError::InvalidJobs)?;
        let job = match body {
            YamlValue::Null => None,
            YamlValue::Mapping(definition) => Some(parse_job(&job_id, definition)?),
            _ => return Err(DocumentError::invalid_job(job_id, "job definition must be a mapping")),
        };
        parsed.insert(job_id, job);
    }
    Ok(parsed)
}

fn parse_job(job_id: &str, definition: &Mapping) -> Result<Job, DocumentError> {
    let needs = string_list(definition.get("needs")).map_err(|reason| DocumentError::invalid_job(job_id, format!("needs {reason}")))?;

    let runs_on = runs_on_labels(definition.get("runs-on")).map_err(|reason| DocumentError::invalid_job(job_id, format!("runs-on {reason}")))?;

    Ok(Job { needs, runs_on })
}

/// Labels a job asks for. A `{ group, labels }` target lists its labels, then the group.
fn runs_on_labels(node: Option<&YamlValue>) -> Result<Vec<String>, String> {
    let Some(YamlValue::Mapping(target)) = node else {
        return string_list(node);
    };
    let mut labels = string_list(target.get("labels"))?;
    match target.get("group") {
        None | Some(YamlValue::Null) => {}
        Some(group) => labels.push(scalar_text(group).ok_or_else(|| "group must be a string".to_string())?),
    }
    Ok(labels)
}

/// Reads a node written either as a single scalar or as a list of scalars.
fn string_list(node: Option<&YamlValue>) -> Result<Vec<String>, String> {
    match node {
        None | Some(YamlValue::Null) => Ok(Vec::new()),
        Some(YamlValue::Sequence(items)) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| "must only contain strings".to_string()))
            .collect(),
        Some(scalar) => scalar_text(scalar)
            .map(|text| vec![text])
            .ok_or_else(|| "must be a string or a list of strings".to_string()),
    }
}
