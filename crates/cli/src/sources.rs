//! Filesystem-backed collaborators for the listing engine.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use runcheck_engine::{AgentRegistry, SharedWorkflowSource, WorkflowSource, is_workflow_file};
use runcheck_types::{RunnerAgent, WorkflowFile};
use tracing::debug;

/// Workflow files found in the first existing workflow directory of a checkout.
#[derive(Debug, Clone)]
pub struct DirectoryWorkflowSource {
    root: PathBuf,
    workflow_dirs: Vec<String>,
}

impl DirectoryWorkflowSource {
    pub fn new(root: impl Into<PathBuf>, workflow_dirs: &[String]) -> Self {
        Self {
            root: root.into(),
            workflow_dirs: workflow_dirs.to_vec(),
        }
    }

    fn workflow_dir(&self) -> Option<PathBuf> {
        self.workflow_dirs
            .iter()
            .map(|relative| self.root.join(relative))
            .find(|candidate| candidate.is_dir())
    }
}

impl WorkflowSource for DirectoryWorkflowSource {
    fn list_workflows(&self) -> Result<Vec<WorkflowFile>> {
        let Some(directory) = self.workflow_dir() else {
            debug!(root = %self.root.display(), "no workflow directory found");
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&directory).with_context(|| format!("Failed to list {}", directory.display()))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_file() && is_workflow_file(&name) {
                names.push(name);
            }
        }
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let path = directory.join(&name);
                let content = fs::read(&path).with_context(|| format!("Failed to read workflow file: {}", path.display()))?;
                Ok(WorkflowFile {
                    name,
                    content,
                    global: false,
                })
            })
            .collect()
    }
}

/// Shared workflow projects checked out at known locations.
#[derive(Debug, Clone, Default)]
pub struct SharedCheckouts {
    roots: HashMap<String, PathBuf>,
    workflow_dirs: Vec<String>,
}

impl SharedCheckouts {
    pub fn new(roots: HashMap<String, PathBuf>, workflow_dirs: &[String]) -> Self {
        Self {
            roots,
            workflow_dirs: workflow_dirs.to_vec(),
        }
    }
}

impl SharedWorkflowSource for SharedCheckouts {
    fn list_shared_workflows(&self, repository: &str) -> Result<Vec<WorkflowFile>> {
        let root = self
            .roots
            .get(repository)
            .ok_or_else(|| anyhow!("no checkout configured for repository '{repository}'"))?;
        DirectoryWorkflowSource::new(root, &self.workflow_dirs).list_workflows()
    }
}

/// Agent registry read from the configuration file.
#[derive(Debug, Clone)]
pub struct ConfiguredAgents<'a> {
    agents: &'a [RunnerAgent],
}

impl<'a> ConfiguredAgents<'a> {
    pub fn new(agents: &'a [RunnerAgent]) -> Self {
        Self { agents }
    }
}

impl AgentRegistry for ConfiguredAgents<'_> {
    fn list_agents(&self) -> Result<Vec<RunnerAgent>> {
        Ok(self.agents.to_vec())
    }
}

/// Reads a single workflow file given on the command line.
pub fn read_workflow_file(path: &Path) -> Result<WorkflowFile> {
    let content = fs::read(path).with_context(|| format!("Failed to read workflow file: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(WorkflowFile {
        name,
        content,
        global: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_dirs() -> Vec<String> {
        vec![".gitea/workflows".to_string(), ".github/workflows".to_string()]
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn lists_workflow_files_sorted_by_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), ".gitea/workflows/test.yaml", "on: push");
        write(temp_dir.path(), ".gitea/workflows/build.yml", "on: push");
        write(temp_dir.path(), ".gitea/workflows/notes.md", "# notes");

        let files = DirectoryWorkflowSource::new(temp_dir.path(), &default_dirs()).list_workflows().unwrap();

        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["build.yml", "test.yaml"]);
        assert_eq!(files[0].content, b"on: push");
    }

    #[test]
    fn first_existing_directory_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), ".gitea/workflows/gitea.yml", "on: push");
        write(temp_dir.path(), ".github/workflows/github.yml", "on: push");

        let files = DirectoryWorkflowSource::new(temp_dir.path(), &default_dirs()).list_workflows().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "gitea.yml");
    }

    #[test]
    fn falls_back_to_later_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), ".github/workflows/github.yml", "on: push");

        let files = DirectoryWorkflowSource::new(temp_dir.path(), &default_dirs()).list_workflows().unwrap();
        assert_eq!(files[0].name, "github.yml");
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let files = DirectoryWorkflowSource::new(temp_dir.path(), &default_dirs()).list_workflows().unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn unknown_shared_repository_is_an_error() {
        let shared = SharedCheckouts::new(HashMap::new(), &default_dirs());
        assert!(shared.list_shared_workflows("ops.workflow").is_err());
    }

    #[test]
    fn reads_single_file_by_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "deploy.yml", "on: workflow_dispatch");

        let file = read_workflow_file(&temp_dir.path().join("deploy.yml")).unwrap();
        assert_eq!(file.name, "deploy.yml");
        assert!(!file.global);
    }
}
