//! Best-effort conversion of generic YAML nodes into typed values.
//!
//! Workflow files are hand-written and frequently deviate from the shapes the
//! engine expects. Every such mismatch funnels through [`decode_node`], which
//! logs the offending node and hands back `None` so callers can fall back to
//! defaults or skip the entry.
//!
//! Documents are read with [`parse_source`], so plain scalars reach the
//! decoder as the text the author wrote (`3.10` stays `"3.10"`).

use std::fmt;

use serde::de::{DeserializeOwned, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_yaml::{Mapping, Value as YamlValue};
use tracing::warn;

/// Parses a YAML document, replacing every boolean and numeric scalar with its source text.
///
/// The node shape comes from a regular parse; a second pass over the same
/// text, guided by that shape, recovers the spelling of each non-string
/// scalar. Null and tagged nodes are kept as parsed. A mapping key whose
/// text would collide with a string key of the same mapping keeps its parsed form.
pub fn parse_source(text: &str) -> Result<YamlValue, serde_yaml::Error> {
    let structure: YamlValue = serde_yaml::from_str(text)?;
    if structure.is_null() {
        return Ok(structure);
    }
    SourceText(&structure).deserialize(serde_yaml::Deserializer::from_str(text))
}

/// Decodes `node` into `T`, returning `None` (and logging a warning) on mismatch.
pub fn decode_node<T: DeserializeOwned>(node: &YamlValue) -> Option<T> {
    match serde_yaml::from_value::<T>(node.clone()) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(
                node = %render_node(node),
                target_type = std::any::type_name::<T>(),
                %error,
                "failed to decode workflow node"
            );
            None
        }
    }
}

/// Text of a scalar node.
///
/// Nodes produced by [`parse_source`] carry scalars as strings already; other
/// numbers and booleans are formatted. Returns `None` for null, sequence, and
/// mapping nodes.
pub fn scalar_text(node: &YamlValue) -> Option<String> {
    match node {
        YamlValue::String(text) => Some(text.clone()),
        YamlValue::Bool(flag) => Some(flag.to_string()),
        YamlValue::Number(number) => Some(number.to_string()),
        YamlValue::Tagged(tagged) => scalar_text(&tagged.value),
        YamlValue::Null | YamlValue::Sequence(_) | YamlValue::Mapping(_) => None,
    }
}

struct SourceText<'a>(&'a YamlValue);

impl<'de> DeserializeSeed<'de> for SourceText<'_> {
    type Value = YamlValue;

    fn deserialize<D>(self, deserializer: D) -> Result<YamlValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.0 {
            YamlValue::Mapping(mapping) => deserializer.deserialize_map(MappingText(mapping)),
            YamlValue::Sequence(items) => deserializer.deserialize_seq(SequenceText(items)),
            YamlValue::Bool(_) | YamlValue::Number(_) => String::deserialize(deserializer).map(YamlValue::String),
            YamlValue::Null | YamlValue::String(_) | YamlValue::Tagged(_) => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(self.0.clone())
            }
        }
    }
}

struct MappingText<'a>(&'a Mapping);

impl<'de> Visitor<'de> for MappingText<'_> {
    type Value = YamlValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping")
    }

    fn visit_map<A>(self, mut access: A) -> Result<YamlValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = Mapping::with_capacity(self.0.len());
        for (key, value) in self.0 {
            let Some(text_key) = access.next_key_seed(SourceText(key))? else {
                break;
            };
            let value = access.next_value_seed(SourceText(value))?;
            let key = if self.0.contains_key(&text_key) { key.clone() } else { text_key };
            mapping.insert(key, value);
        }
        Ok(YamlValue::Mapping(mapping))
    }
}

struct SequenceText<'a>(&'a [YamlValue]);

impl<'de> Visitor<'de> for SequenceText<'_> {
    type Value = YamlValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<YamlValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(self.0.len());
        for item in self.0 {
            match access.next_element_seed(SourceText(item))? {
                Some(value) => items.push(value),
                None => break,
            }
        }
        Ok(YamlValue::Sequence(items))
    }
}

fn render_node(node: &YamlValue) -> String {
    serde_yaml::to_string(node)
        .map(|rendered| rendered.trim_end().to_string())
        .unwrap_or_else(|_| format!("{node:?}"))
}
