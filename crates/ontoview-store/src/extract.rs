//! Extractors: caller-supplied functions that read labels, ids and
//! relations out of raw records.
//!
//! Stores only ever call extractors; they never look inside a record
//! themselves. The helpers here cover the common "just a field name" case
//! and are resolved where the store is built, not inside it.

use std::sync::Arc;

use serde_json::Value;

use ontoview_core::{Error, Result};

/// A raw domain record as supplied by the caller.
pub type Record = Value;

/// Shared string extractor kept by stores that need it after construction.
pub type TextFn = Arc<dyn Fn(&Record) -> Result<String> + Send + Sync>;

/// Read a field as a string. `name` is either a top-level key or a JSON
/// pointer (`/author/name`). Numbers and booleans are stringified.
pub fn field(name: impl Into<String>) -> impl Fn(&Record) -> Result<String> + Clone + Send + Sync + 'static {
    let name = name.into();
    move |record: &Record| {
        lookup(record, &name)
            .and_then(scalar_text)
            .ok_or_else(|| Error::MissingField(name.clone()))
    }
}

/// Read a `(source, target)` pair of labels from two fields.
pub fn endpoints(
    source: impl Into<String>,
    target: impl Into<String>,
) -> impl Fn(&Record) -> Result<(String, String)> + Clone + Send + Sync + 'static {
    let source = field(source);
    let target = field(target);
    move |record: &Record| Ok((source(record)?, target(record)?))
}

/// Read an array field of member labels.
pub fn members(name: impl Into<String>) -> impl Fn(&Record) -> Result<Vec<String>> + Clone + Send + Sync + 'static {
    let name = name.into();
    move |record: &Record| {
        let items = lookup(record, &name)
            .and_then(Value::as_array)
            .ok_or_else(|| Error::MissingField(name.clone()))?;
        items
            .iter()
            .map(|v| scalar_text(v).ok_or_else(|| Error::MissingField(format!("{}[]", name))))
            .collect()
    }
}

/// Human-readable label for a bare id: `red_wine-vinegar` → `Red Wine Vinegar`.
pub fn default_label(id: &str) -> String {
    id.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    if name.starts_with('/') {
        record.pointer(name)
    } else {
        record.get(name)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
