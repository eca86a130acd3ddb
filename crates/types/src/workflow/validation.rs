//! Value rules for manual-run inputs.
//!
//! These routines check a submitted (or defaulted) value against the type
//! declared for a dispatch input. Presence checks for `required` inputs live in
//! the engine, which knows whether a value was supplied at all.

use super::DispatchInput;

/// Validate a textual candidate against the declared type of a dispatch input.
///
/// - `boolean` inputs accept `true` or `false`.
/// - `number` inputs must parse as a number.
/// - `choice` inputs must match one of the declared options, when any are declared.
/// - Every other type (including an empty one) accepts arbitrary text.
pub fn validate_dispatch_value(candidate: &str, input: &DispatchInput) -> Result<(), String> {
    match input.r#type.as_str() {
        "boolean" => match candidate {
            "true" | "false" => Ok(()),
            _ => Err("value must be true or false".to_string()),
        },
        "number" => candidate
            .trim()
            .parse::<f64>()
            .map(|_| ())
            .map_err(|_| format!("value '{}' is not a number", candidate)),
        "choice" => {
            if input.options.is_empty() || input.options.iter().any(|option| option == candidate) {
                Ok(())
            } else {
                Err(format!("value must be one of: {}", input.options.join(", ")))
            }
        }
        _ => Ok(()),
    }
}
