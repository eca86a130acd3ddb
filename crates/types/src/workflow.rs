//! Workflow document model shared by the analysis engine and its callers.
//!
//! Job maps and dispatch inputs preserve authoring order (via `IndexMap` and
//! ordered `Vec`s) so listings and manual-run forms render in the sequence the
//! author wrote them.

pub mod validation;

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value as YamlValue};

/// Trigger name that enables on-demand invocation of a workflow.
pub const DISPATCH_TRIGGER: &str = "workflow_dispatch";

/// Parsed representation of a single workflow file.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDocument {
    /// Optional display name declared at the top of the file.
    pub name: Option<String>,
    /// The `on:` section resolved into its authored shape.
    pub on: TriggerSpec,
    /// Jobs keyed by identifier in declaration order. `None` marks an empty job body.
    pub jobs: IndexMap<String, Option<Job>>,
}

impl WorkflowDocument {
    /// Number of job entries whose body is null.
    pub fn empty_job_count(&self) -> usize {
        self.jobs.values().filter(|job| job.is_none()).count()
    }
}

/// A unit of work inside a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Identifiers of jobs that must finish before this one starts.
    #[serde(default)]
    pub needs: Vec<String>,
    /// Capability labels (or unresolved expressions) the executing agent must advertise.
    #[serde(default)]
    pub runs_on: Vec<String>,
}

impl Job {
    /// True when the job can start without waiting on another job.
    pub fn is_root(&self) -> bool {
        self.needs.is_empty()
    }
}

/// The `on:` section of a workflow in whichever of the three valid shapes the author used.
///
/// Nodes are kept raw; the dispatch extractor decodes them on demand so that a
/// malformed trigger degrades to "dispatch not supported" instead of failing the parse.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerSpec {
    /// `on: push`
    Scalar(YamlValue),
    /// `on: [push, workflow_dispatch]`
    Sequence(Vec<YamlValue>),
    /// `on: { push: ..., workflow_dispatch: ... }`
    Mapping(Mapping),
    /// Absent, null, or any other shape.
    Unsupported,
}

impl TriggerSpec {
    /// Resolves a raw YAML node into its trigger shape.
    pub fn from_node(node: YamlValue) -> Self {
        match node {
            YamlValue::String(_) | YamlValue::Bool(_) | YamlValue::Number(_) => TriggerSpec::Scalar(node),
            YamlValue::Sequence(items) => TriggerSpec::Sequence(items),
            YamlValue::Mapping(mapping) => TriggerSpec::Mapping(mapping),
            YamlValue::Tagged(tagged) => TriggerSpec::from_node(tagged.value),
            YamlValue::Null => TriggerSpec::Unsupported,
        }
    }

    /// Short name of the active shape, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerSpec::Scalar(_) => "scalar",
            TriggerSpec::Sequence(_) => "sequence",
            TriggerSpec::Mapping(_) => "mapping",
            TriggerSpec::Unsupported => "unsupported",
        }
    }
}

/// Parameters accepted by a manual run of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSchema {
    /// Inputs in the order the author declared them.
    #[serde(default)]
    pub inputs: Vec<DispatchInput>,
}

impl DispatchSchema {
    /// Looks up an input by name. When names repeat, the last declaration wins.
    pub fn input(&self, name: &str) -> Option<&DispatchInput> {
        self.inputs.iter().rev().find(|input| input.name == name)
    }
}

/// A single manual-run parameter.
///
/// Scalar fields accept any YAML scalar as written (`default: 3.10` reads as
/// `"3.10"`), `required` accepts YAML 1.1 spellings such as `yes`, and every
/// field falls back to its empty value when the author omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchInput {
    /// Parameter name. Always replaced by the key the input was declared under.
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub description: String,
    #[serde(default, deserialize_with = "yaml_flag")]
    pub required: bool,
    #[serde(default, deserialize_with = "scalar_text")]
    pub default: String,
    /// Declared input type (`string`, `boolean`, `choice`, `number`, ...).
    #[serde(default, deserialize_with = "scalar_text")]
    pub r#type: String,
    /// Allowed values for `choice` inputs, in declaration order.
    #[serde(default, deserialize_with = "scalar_text_list")]
    pub options: Vec<String>,
}

/// The single prioritized explanation attached to a listed workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WorkflowDiagnostic {
    #[default]
    None,
    /// The document could not be parsed; carries the parser's message.
    ParseError(String),
    /// Every job waits on another job, so nothing can start.
    NoRunnableJob,
    /// Every job entry has an empty body.
    AllJobsEmpty,
    /// No online agent advertises this label.
    UnmetRequirement(String),
}

impl WorkflowDiagnostic {
    pub fn is_none(&self) -> bool {
        matches!(self, WorkflowDiagnostic::None)
    }
}

/// Raw workflow file handed to the engine by a workflow source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFile {
    /// File name (for example, `build.yml`), used as the workflow identifier.
    pub name: String,
    pub content: Vec<u8>,
    /// Whether the file comes from a shared project rather than this project's tree.
    pub global: bool,
}

/// One row of a workflow listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    pub name: String,
    pub global: bool,
    /// Rendered diagnostic; empty when the workflow looks runnable.
    pub err_msg: String,
    pub diagnostic: WorkflowDiagnostic,
}

/// Reads any scalar as the text written in the source.
///
/// Strings are requested from the deserializer, so YAML text input hands over
/// the scalar's spelling (`3.10`, `010`) rather than a reparsed number.
struct ScalarTextVisitor;

impl<'de> Visitor<'de> for ScalarTextVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_str(self)
    }
}

struct ScalarText(String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(ScalarTextVisitor).map(ScalarText)
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(ScalarTextVisitor)
}

fn scalar_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<ScalarText>>::deserialize(deserializer)?;
    Ok(values.unwrap_or_default().into_iter().map(|ScalarText(text)| text).collect())
}

/// Boolean flag accepting the YAML 1.1 spellings (`yes`, `on`, `y`, ...) as well as `true`/`false`.
struct YamlFlagVisitor;

impl<'de> Visitor<'de> for YamlFlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        match value {
            "true" | "True" | "TRUE" | "y" | "Y" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Ok(true),
            "false" | "False" | "FALSE" | "n" | "N" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => Ok(false),
            other => Err(E::invalid_value(Unexpected::Str(other), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(self)
    }
}

fn yaml_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(YamlFlagVisitor)
}
