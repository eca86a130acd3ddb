//! Manual-dispatch schema extraction and submission checks.

use indexmap::IndexMap;
use runcheck_types::{DISPATCH_TRIGGER, DispatchInput, DispatchSchema, TriggerSpec, validate_dispatch_value};
use serde_yaml::{Mapping, Value as YamlValue};
use tracing::debug;

use crate::decode::{decode_node, scalar_text};
use crate::error::DispatchInputError;

/// Returns the manual-run schema when the workflow declares the dispatch trigger.
///
/// Malformed trigger nodes never fail: an undecodable scalar or list means
/// "dispatch not supported", an undecodable dispatch body means "dispatch
/// supported without inputs", and an undecodable input is skipped.
pub fn extract_dispatch(trigger: &TriggerSpec) -> Option<DispatchSchema> {
    match trigger {
        TriggerSpec::Scalar(node) => {
            let event: String = decode_node(node)?;
            (event == DISPATCH_TRIGGER).then(DispatchSchema::default)
        }
        TriggerSpec::Sequence(items) => {
            let events: Vec<String> = decode_node(&YamlValue::Sequence(items.clone()))?;
            events.iter().any(|event| event == DISPATCH_TRIGGER).then(DispatchSchema::default)
        }
        TriggerSpec::Mapping(mapping) => extract_from_mapping(mapping),
        TriggerSpec::Unsupported => None,
    }
}

fn extract_from_mapping(mapping: &Mapping) -> Option<DispatchSchema> {
    let triggers: IndexMap<String, YamlValue> = decode_node(&YamlValue::Mapping(mapping.clone()))?;
    let dispatch_node = triggers.get(DISPATCH_TRIGGER)?;

    let mut schema = DispatchSchema::default();
    if dispatch_node.is_null() {
        return Some(schema);
    }
    let Some(details) = decode_node::<IndexMap<String, YamlValue>>(dispatch_node) else {
        return Some(schema);
    };
    let Some(YamlValue::Mapping(inputs)) = details.get("inputs") else {
        return Some(schema);
    };

    for (key, value) in inputs {
        let Some(name) = scalar_text(key) else {
            debug!("skipping dispatch input with a non-scalar key");
            continue;
        };
        let decoded = if value.is_null() {
            Some(DispatchInput::default())
        } else {
            decode_node::<DispatchInput>(value)
        };
        if let Some(mut input) = decoded {
            input.name = name;
            schema.inputs.push(input);
        }
    }
    Some(schema)
}

/// Resolves a manual-run submission against `schema`.
///
/// Inputs are walked in declaration order. A submitted value wins over the
/// declared default; a required input with neither is rejected. Optional inputs
/// left empty resolve to an empty string and skip type checks.
pub fn resolve_dispatch_inputs(
    schema: &DispatchSchema,
    submitted: &IndexMap<String, String>,
) -> Result<IndexMap<String, String>, DispatchInputError> {
    if let Some(unknown) = submitted.keys().find(|name| schema.input(name).is_none()) {
        return Err(DispatchInputError::UnknownInput { name: unknown.clone() });
    }

    let mut resolved = IndexMap::with_capacity(schema.inputs.len());
    for input in &schema.inputs {
        let value = submitted
            .get(&input.name)
            .cloned()
            .or_else(|| (!input.default.is_empty()).then(|| input.default.clone()));

        let value = match value {
            Some(value) => {
                validate_dispatch_value(&value, input).map_err(|reason| DispatchInputError::InvalidValue {
                    name: input.name.clone(),
                    reason,
                })?;
                value
            }
            None if input.required => {
                return Err(DispatchInputError::MissingRequired { name: input.name.clone() });
            }
            None => String::new(),
        };
        resolved.insert(input.name.clone(), value);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_source;

    fn trigger(yaml_text: &str) -> TriggerSpec {
        TriggerSpec::from_node(parse_source(yaml_text).expect("trigger yaml"))
    }

    #[test]
    fn bare_scalar_dispatch_has_no_inputs() {
        let schema = extract_dispatch(&trigger("workflow_dispatch")).expect("dispatch supported");
        assert!(schema.inputs.is_empty());
    }

    #[test]
    fn other_scalars_and_sequences_do_not_dispatch() {
        assert!(extract_dispatch(&trigger("push")).is_none());
        assert!(extract_dispatch(&trigger("[push, pull_request]")).is_none());
        assert!(extract_dispatch(&trigger("true")).is_none());
        assert!(extract_dispatch(&TriggerSpec::Unsupported).is_none());
    }

    #[test]
    fn sequence_containing_dispatch_is_supported() {
        let schema = extract_dispatch(&trigger("[push, workflow_dispatch]")).expect("dispatch supported");
        assert!(schema.inputs.is_empty());
    }

    #[test]
    fn sequence_with_numeric_events_still_dispatches() {
        let schema = extract_dispatch(&trigger("[workflow_dispatch, 1]")).expect("dispatch supported");
        assert!(schema.inputs.is_empty());
    }

    #[test]
    fn sequence_with_nested_nodes_is_not_supported() {
        assert!(extract_dispatch(&trigger("[workflow_dispatch, {push: {}}]")).is_none());
    }

    #[test]
    fn mapping_without_dispatch_key_is_not_supported() {
        assert!(extract_dispatch(&trigger("push:\n  branches: [main]")).is_none());
    }

    #[test]
    fn empty_dispatch_body_is_supported() {
        let schema = extract_dispatch(&trigger("push:\nworkflow_dispatch:")).expect("dispatch supported");
        assert!(schema.inputs.is_empty());
    }

    #[test]
    fn unparsable_dispatch_body_still_supports_dispatch() {
        let schema = extract_dispatch(&trigger("workflow_dispatch: [not, a, mapping]")).expect("dispatch supported");
        assert!(schema.inputs.is_empty());

        let schema = extract_dispatch(&trigger("workflow_dispatch:\n  inputs: [env]")).expect("dispatch supported");
        assert!(schema.inputs.is_empty());
    }

    #[test]
    fn choice_input_keeps_option_order() {
        let schema = extract_dispatch(&trigger("workflow_dispatch: {inputs: {env: {type: choice, options: [prod, staging]}}}"))
            .expect("dispatch supported");

        assert_eq!(schema.inputs.len(), 1);
        let input = &schema.inputs[0];
        assert_eq!(input.name, "env");
        assert_eq!(input.r#type, "choice");
        assert_eq!(input.options, vec!["prod", "staging"]);
    }

    #[test]
    fn numeric_choices_keep_their_spelling() {
        let schema = extract_dispatch(&trigger(
            "workflow_dispatch: {inputs: {python: {type: choice, default: 3.10, options: [3.8, 3.9, 3.10]}, mode: {default: 010}, limit: {type: number, default: 1e3}}}",
        ))
        .expect("dispatch supported");

        let python = schema.input("python").expect("python input");
        assert_eq!(python.default, "3.10");
        assert_eq!(python.options, vec!["3.8", "3.9", "3.10"]);
        assert_eq!(schema.input("mode").map(|input| input.default.as_str()), Some("010"));
        assert_eq!(schema.input("limit").map(|input| input.default.as_str()), Some("1e3"));

        let resolved = resolve_dispatch_inputs(&schema, &IndexMap::new()).expect("defaults are valid");
        assert_eq!(resolved["python"], "3.10");
    }

    #[test]
    fn yaml_one_one_required_flags_keep_the_input() {
        let schema = extract_dispatch(&trigger("workflow_dispatch: {inputs: {env: {required: yes}, debug: {required: off}}}"))
            .expect("dispatch supported");

        assert_eq!(schema.inputs.len(), 2);
        assert!(schema.inputs[0].required);
        assert!(!schema.inputs[1].required);
    }

    #[test]
    fn inputs_follow_declaration_order() {
        let schema = extract_dispatch(&trigger(
            r#"
workflow_dispatch:
  inputs:
    zone:
      description: Target zone
    app:
      required: true
    dry_run:
      type: boolean
      default: false
"#,
        ))
        .expect("dispatch supported");

        let names: Vec<&str> = schema.inputs.iter().map(|input| input.name.as_str()).collect();
        assert_eq!(names, vec!["zone", "app", "dry_run"]);
        assert_eq!(schema.inputs[0].description, "Target zone");
        assert!(schema.inputs[1].required);
        assert_eq!(schema.inputs[2].default, "false");
    }

    #[test]
    fn key_overrides_declared_name() {
        let schema = extract_dispatch(&trigger("workflow_dispatch:\n  inputs:\n    region:\n      name: something-else"))
            .expect("dispatch supported");
        assert_eq!(schema.inputs[0].name, "region");
    }

    #[test]
    fn undecodable_input_is_skipped() {
        let schema = extract_dispatch(&trigger(
            r#"
workflow_dispatch:
  inputs:
    broken: just text
    tag:
      required: maybe
    version: {}
    blank:
"#,
        ))
        .expect("dispatch supported");

        let names: Vec<&str> = schema.inputs.iter().map(|input| input.name.as_str()).collect();
        assert_eq!(names, vec!["version", "blank"]);
    }

    fn deploy_schema() -> DispatchSchema {
        extract_dispatch(&trigger(
            r#"
workflow_dispatch:
  inputs:
    env:
      type: choice
      required: true
      options: [prod, staging]
    replicas:
      type: number
      default: 2
    notes:
      description: Free text
"#,
        ))
        .expect("dispatch supported")
    }

    #[test]
    fn submission_fills_defaults_in_declaration_order() {
        let submitted = IndexMap::from([("env".to_string(), "staging".to_string())]);
        let resolved = resolve_dispatch_inputs(&deploy_schema(), &submitted).expect("valid submission");

        assert_eq!(resolved.keys().collect::<Vec<_>>(), vec!["env", "replicas", "notes"]);
        assert_eq!(resolved["replicas"], "2");
        assert_eq!(resolved["notes"], "");
    }

    #[test]
    fn submission_missing_required_input_is_rejected() {
        let error = resolve_dispatch_inputs(&deploy_schema(), &IndexMap::new()).expect_err("env is required");
        assert_eq!(error, DispatchInputError::MissingRequired { name: "env".into() });
    }

    #[test]
    fn submission_with_unknown_input_is_rejected() {
        let submitted = IndexMap::from([
            ("env".to_string(), "prod".to_string()),
            ("color".to_string(), "blue".to_string()),
        ]);
        let error = resolve_dispatch_inputs(&deploy_schema(), &submitted).expect_err("color is unknown");
        assert_eq!(error, DispatchInputError::UnknownInput { name: "color".into() });
    }

    #[test]
    fn submission_with_invalid_choice_is_rejected() {
        let submitted = IndexMap::from([("env".to_string(), "dev".to_string())]);
        let error = resolve_dispatch_inputs(&deploy_schema(), &submitted).expect_err("dev is not an option");
        assert!(matches!(error, DispatchInputError::InvalidValue { ref name, .. } if name == "env"));
    }
}
