//! Assembling the workflow listing of a project.
//!
//! The caller gathers workflow files and agent labels through the collaborator
//! traits below, then hands plain data to [`build_listing`]. Nothing here
//! touches the collaborators while workflows are being evaluated.

use anyhow::Result;
use runcheck_types::{AgentLabelSet, DispatchSchema, RunnerAgent, WorkflowEntry, WorkflowFile};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::dispatch::extract_dispatch;
use crate::analysis::evaluate::analyze_workflow;
use crate::messages::MessageCatalog;

/// Supplies the workflow files of the current project.
pub trait WorkflowSource {
    fn list_workflows(&self) -> Result<Vec<WorkflowFile>>;
}

/// Supplies workflow files of other projects that share workflows.
pub trait SharedWorkflowSource {
    fn list_shared_workflows(&self, repository: &str) -> Result<Vec<WorkflowFile>>;
}

/// Supplies the execution agents registered for the current project.
pub trait AgentRegistry {
    fn list_agents(&self) -> Result<Vec<RunnerAgent>>;
}

/// A workflow another project requires this project to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredWorkflow {
    /// Project that owns the workflow file.
    pub repository: String,
    /// Workflow file name within that project.
    pub workflow: String,
}

/// True for file names the listing treats as workflow definitions.
pub fn is_workflow_file(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

/// Takes a one-shot snapshot of labels advertised by online agents.
pub fn snapshot_labels(registry: &dyn AgentRegistry) -> Result<AgentLabelSet> {
    let agents = registry.list_agents()?;
    let labels = AgentLabelSet::from_agents(&agents);
    debug!(agents = agents.len(), labels = labels.len(), "built agent label snapshot");
    Ok(labels)
}

/// Collects the project's own workflow files followed by required shared workflows.
///
/// Requirements owned by the current project are skipped. A shared project that
/// cannot be read is logged and skipped; only a failure of the project's own
/// source is returned as an error.
pub fn collect_workflow_files(
    own: &dyn WorkflowSource,
    shared: &dyn SharedWorkflowSource,
    current_repository: &str,
    required: &[RequiredWorkflow],
) -> Result<Vec<WorkflowFile>> {
    let mut files = own.list_workflows()?;

    for requirement in required {
        if requirement.repository == current_repository {
            debug!(repository = %requirement.repository, "skipping required workflow owned by the current project");
            continue;
        }
        let shared_files = match shared.list_shared_workflows(&requirement.repository) {
            Ok(shared_files) => shared_files,
            Err(error) => {
                warn!(repository = %requirement.repository, %error, "failed to read shared workflows");
                continue;
            }
        };
        files.extend(
            shared_files
                .into_iter()
                .filter(|file| file.name == requirement.workflow)
                .map(|file| WorkflowFile { global: true, ..file }),
        );
    }

    Ok(files)
}

/// Which workflow (if any) the listing was requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSelection {
    pub workflow: Option<String>,
    /// Workflow names for which manual dispatch is turned off.
    pub disabled: Vec<String>,
}

/// The selected workflow and the manual-run schema offered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedWorkflow {
    pub name: String,
    pub disabled: bool,
    /// Present when the workflow parsed, is enabled, and declares manual dispatch.
    pub dispatch: Option<DispatchSchema>,
}

/// Every listed workflow with its rendered diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowListing {
    pub workflows: Vec<WorkflowEntry>,
    pub selected: Option<SelectedWorkflow>,
}

/// Analyses every file and renders one listing entry per file, in input order.
pub fn build_listing(
    files: &[WorkflowFile],
    available: &AgentLabelSet,
    messages: &MessageCatalog,
    selection: &ListingSelection,
) -> WorkflowListing {
    let mut workflows = Vec::with_capacity(files.len());
    let mut selected_document = None;

    for file in files {
        let analysis = analyze_workflow(&file.content, available);
        let err_msg = messages.render(&analysis.diagnostic);
        if !err_msg.is_empty() {
            debug!(workflow = %file.name, %err_msg, "workflow has a diagnostic");
        }
        workflows.push(WorkflowEntry {
            name: file.name.clone(),
            global: file.global,
            err_msg,
            diagnostic: analysis.diagnostic,
        });

        if selection.workflow.as_deref() == Some(file.name.as_str())
            && let Some(document) = analysis.document
        {
            selected_document = Some(document);
        }
    }

    let selected = selection.workflow.as_ref().map(|name| {
        let disabled = selection.disabled.iter().any(|disabled| disabled == name);
        let dispatch = if disabled {
            None
        } else {
            selected_document.as_ref().and_then(|document| extract_dispatch(&document.on))
        };
        SelectedWorkflow {
            name: name.clone(),
            disabled,
            dispatch,
        }
    });

    WorkflowListing { workflows, selected }
}

/// Everything needed to render a manual-run form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchForm {
    pub schema: DispatchSchema,
    /// Branch names with the default branch first.
    pub branches: Vec<String>,
    pub tags: Vec<String>,
}

impl DispatchForm {
    pub fn new(schema: DispatchSchema, branches: Vec<String>, default_branch: &str, tags: Vec<String>) -> Self {
        Self {
            schema,
            branches: order_branches(branches, default_branch),
            tags,
        }
    }
}

/// Moves `default_branch` to the front when present, keeping the order of the rest.
pub fn order_branches(branches: Vec<String>, default_branch: &str) -> Vec<String> {
    if !branches.iter().any(|branch| branch == default_branch) {
        return branches;
    }
    let mut ordered = Vec::with_capacity(branches.len());
    ordered.push(default_branch.to_string());
    ordered.extend(branches.into_iter().filter(|branch| branch != default_branch));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use runcheck_types::WorkflowDiagnostic;

    fn file(name: &str, content: &str) -> WorkflowFile {
        WorkflowFile {
            name: name.to_string(),
            content: content.as_bytes().to_vec(),
            global: false,
        }
    }

    struct StaticSource(Vec<WorkflowFile>);

    impl WorkflowSource for StaticSource {
        fn list_workflows(&self) -> Result<Vec<WorkflowFile>> {
            Ok(self.0.clone())
        }
    }

    struct SharedProjects;

    impl SharedWorkflowSource for SharedProjects {
        fn list_shared_workflows(&self, repository: &str) -> Result<Vec<WorkflowFile>> {
            match repository {
                "ops.workflow" => Ok(vec![file("audit.yml", "on: push"), file("release.yml", "on: push")]),
                other => Err(anyhow!("repository {other} not found")),
            }
        }
    }

    struct StaticAgents(Vec<RunnerAgent>);

    impl AgentRegistry for StaticAgents {
        fn list_agents(&self) -> Result<Vec<RunnerAgent>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn recognises_workflow_extensions() {
        assert!(is_workflow_file("build.yml"));
        assert!(is_workflow_file("deploy.yaml"));
        assert!(!is_workflow_file("README.md"));
    }

    #[test]
    fn snapshot_only_includes_online_agents() {
        let registry = StaticAgents(vec![
            RunnerAgent {
                name: "online".into(),
                labels: vec!["linux".into()],
                online: true,
                available: true,
            },
            RunnerAgent {
                name: "offline".into(),
                labels: vec!["windows".into()],
                online: false,
                available: true,
            },
        ]);
        let labels = snapshot_labels(&registry).expect("snapshot");

        assert!(labels.contains("linux"));
        assert!(!labels.contains("windows"));
    }

    #[test]
    fn shared_workflows_are_appended_and_marked_global() {
        let own = StaticSource(vec![file("ci.yml", "on: push")]);
        let required = vec![
            RequiredWorkflow {
                repository: "ops.workflow".into(),
                workflow: "audit.yml".into(),
            },
            RequiredWorkflow {
                repository: "app".into(),
                workflow: "ci.yml".into(),
            },
            RequiredWorkflow {
                repository: "missing.workflow".into(),
                workflow: "x.yml".into(),
            },
        ];

        let files = collect_workflow_files(&own, &SharedProjects, "app", &required).expect("collect files");

        let names: Vec<(&str, bool)> = files.iter().map(|file| (file.name.as_str(), file.global)).collect();
        assert_eq!(names, vec![("ci.yml", false), ("audit.yml", true)]);
    }

    #[test]
    fn listing_keeps_every_workflow_and_renders_messages() {
        let files = vec![
            file("ok.yml", "on: push\njobs:\n  build:\n    runs-on: linux\n"),
            file("broken.yml", "on: push\njobs: nope\n"),
            file("gpu.yml", "on: push\njobs:\n  train:\n    runs-on: gpu\n"),
        ];
        let listing = build_listing(
            &files,
            &AgentLabelSet::from_labels(["linux"]),
            &MessageCatalog::default(),
            &ListingSelection::default(),
        );

        assert_eq!(listing.workflows.len(), 3);
        assert_eq!(listing.workflows[0].err_msg, "");
        assert!(matches!(listing.workflows[1].diagnostic, WorkflowDiagnostic::ParseError(_)));
        assert_eq!(listing.workflows[2].err_msg, "No matching online runner with label: gpu");
        assert!(listing.selected.is_none());
    }

    #[test]
    fn selected_workflow_exposes_dispatch_schema() {
        let files = vec![file(
            "deploy.yml",
            "on:\n  workflow_dispatch:\n    inputs:\n      env:\n        type: choice\n        options: [prod, staging]\njobs:\n  deploy:\n    runs-on: linux\n",
        )];
        let selection = ListingSelection {
            workflow: Some("deploy.yml".into()),
            disabled: Vec::new(),
        };
        let listing = build_listing(&files, &AgentLabelSet::default(), &MessageCatalog::default(), &selection);

        let selected = listing.selected.expect("selected workflow");
        let dispatch = selected.dispatch.expect("dispatch schema");
        assert_eq!(dispatch.inputs[0].name, "env");
        assert_eq!(listing.workflows[0].diagnostic, WorkflowDiagnostic::UnmetRequirement("linux".into()));
    }

    #[test]
    fn disabled_workflow_offers_no_dispatch() {
        let files = vec![file("deploy.yml", "on: workflow_dispatch\njobs:\n  deploy:\n    runs-on: linux\n")];
        let selection = ListingSelection {
            workflow: Some("deploy.yml".into()),
            disabled: vec!["deploy.yml".into()],
        };
        let listing = build_listing(&files, &AgentLabelSet::default(), &MessageCatalog::default(), &selection);

        let selected = listing.selected.expect("selected workflow");
        assert!(selected.disabled);
        assert!(selected.dispatch.is_none());
    }

    #[test]
    fn unparsable_selection_offers_no_dispatch() {
        let files = vec![file("deploy.yml", "on: workflow_dispatch\njobs: [x]\n")];
        let selection = ListingSelection {
            workflow: Some("deploy.yml".into()),
            disabled: Vec::new(),
        };
        let listing = build_listing(&files, &AgentLabelSet::default(), &MessageCatalog::default(), &selection);

        assert!(listing.selected.expect("selected workflow").dispatch.is_none());
    }

    #[test]
    fn default_branch_moves_to_front() {
        let branches = vec!["feature".to_string(), "main".to_string(), "release".to_string()];
        assert_eq!(order_branches(branches, "main"), vec!["main", "feature", "release"]);
    }

    #[test]
    fn missing_default_branch_keeps_order() {
        let branches = vec!["b".to_string(), "a".to_string()];
        assert_eq!(order_branches(branches, "main"), vec!["b", "a"]);
    }

    #[test]
    fn dispatch_form_orders_branches() {
        let form = DispatchForm::new(
            DispatchSchema::default(),
            vec!["dev".into(), "trunk".into()],
            "trunk",
            vec!["v1.0.0".into()],
        );
        assert_eq!(form.branches, vec!["trunk", "dev"]);
        assert_eq!(form.tags, vec!["v1.0.0"]);
    }
}
