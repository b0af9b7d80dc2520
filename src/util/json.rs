use anyhow::{Context, Result};
use serde_json::Value;

/// Follows `path` through nested objects and returns the string at the end.
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str> {
    let mut current = value;
    for key in path {
        current = current
            .get(key)
            .with_context(|| format!("response is missing `{}`", path.join(".")))?;
    }
    current
        .as_str()
        .with_context(|| format!("`{}` is not a string", path.join(".")))
}

/// The `entities` array of a v3 list response; absent means empty.
pub fn entities(value: &Value) -> &[Value] {
    value
        .get("entities")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
