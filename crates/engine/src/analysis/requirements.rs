//! Matching job `runs-on` labels against the labels of online agents.

use runcheck_types::{AgentLabelSet, Job};

/// Marker opening an unresolved template expression.
pub const EXPRESSION_MARKER: &str = "${{";

/// True when `label` embeds an expression that cannot be resolved statically.
pub fn is_expression_label(label: &str) -> bool {
    label.contains(EXPRESSION_MARKER)
}

/// Returns the first `runs-on` label no online agent advertises.
///
/// Expression labels are skipped: they are evaluated at run time, so a static
/// mismatch would only be a guess.
pub fn first_unmet_label<'a>(job: &'a Job, available: &AgentLabelSet) -> Option<&'a str> {
    job.runs_on
        .iter()
        .map(String::as_str)
        .filter(|label| !is_expression_label(label))
        .find(|label| !available.contains(label))
}
