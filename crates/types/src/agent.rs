//! Execution agents and the label snapshot the engine matches against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An execution agent as reported by the agent registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerAgent {
    pub name: String,
    /// Capability labels advertised by the agent.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Whether the agent currently holds a live connection.
    #[serde(default)]
    pub online: bool,
    /// Whether the agent is eligible to pick up work for the project.
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// Capability labels available on at least one online agent.
///
/// Built once before evaluation and never mutated afterwards; no per-agent
/// distinction is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentLabelSet {
    labels: BTreeSet<String>,
}

impl AgentLabelSet {
    /// Aggregates labels across every online, available agent.
    pub fn from_agents<'a>(agents: impl IntoIterator<Item = &'a RunnerAgent>) -> Self {
        let labels = agents
            .into_iter()
            .filter(|agent| agent.online && agent.available)
            .flat_map(|agent| agent.labels.iter().cloned())
            .collect();
        Self { labels }
    }

    /// Builds a snapshot from bare label strings.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new snapshot that also contains `extra`.
    pub fn union<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, labels: &[&str], online: bool) -> RunnerAgent {
        RunnerAgent {
            name: name.to_string(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
            online,
            available: true,
        }
    }

    #[test]
    fn offline_agents_do_not_contribute_labels() {
        let agents = vec![agent("a", &["linux", "x64"], true), agent("b", &["gpu"], false)];
        let set = AgentLabelSet::from_agents(&agents);

        assert!(set.contains("linux"));
        assert!(set.contains("x64"));
        assert!(!set.contains("gpu"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn unavailable_agents_are_skipped() {
        let mut busy = agent("busy", &["arm64"], true);
        busy.available = false;
        let set = AgentLabelSet::from_agents([&busy]);

        assert!(set.is_empty());
    }

    #[test]
    fn labels_shared_across_agents_collapse() {
        let agents = vec![agent("a", &["linux"], true), agent("b", &["linux", "docker"], true)];
        let set = AgentLabelSet::from_agents(&agents).union(["macos"]);

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["docker", "linux", "macos"]);
    }

    #[test]
    fn agent_availability_defaults_to_true() {
        let parsed: RunnerAgent = serde_json::from_str(r#"{"name":"r1","labels":["linux"],"online":true}"#).expect("parse agent");
        assert!(parsed.available);
    }
}
