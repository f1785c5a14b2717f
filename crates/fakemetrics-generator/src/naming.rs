//! Canonical metric identity rendering.

use std::collections::HashMap;

/// Renders the canonical identity string for a metric.
///
/// With an empty label map the identity is just `prefix` + `base_name`;
/// otherwise the labels are appended as a `{key="value",...}` block. Pairs
/// appear in the map's iteration order, so the order of distinct keys is not
/// stable between calls, but every label appears exactly once per call.
/// Values are rendered verbatim, so they must not contain `"`.
pub fn metric_identity(prefix: &str, base_name: &str, labels: &HashMap<String, String>) -> String {
    if labels.is_empty() {
        return format!("{}{}", prefix, base_name);
    }

    let pairs: Vec<String> = labels
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, value))
        .collect();

    format!("{}{}{{{}}}", prefix, base_name, pairs.join(","))
}
