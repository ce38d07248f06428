//! Content-derived identifiers.
//!
//! Every record is serialized canonically (object keys sorted at every
//! depth) and hashed, so submitting the same logical record twice yields
//! the same id regardless of field order.

use indexmap::IndexMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Number of hex digits kept from the digest.
pub const ID_LEN: usize = 8;

/// Serialize a JSON value with object keys sorted recursively.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Truncated SHA-256 of the canonical serialization.
pub fn content_id(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(value).as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..ID_LEN].to_string()
}

/// Insert `value` under its content id. A repeat of an identical record
/// is dropped; a distinct record that collides on the id replaces the
/// earlier one in place.
pub(crate) fn insert_by_content<V>(
    map: &mut IndexMap<String, V>,
    id: String,
    value: V,
    raw: impl Fn(&V) -> &Value,
    kind: &str,
) {
    match map.get_mut(&id) {
        Some(existing) => {
            if raw(existing) == raw(&value) {
                debug!("Duplicate {} record {} ignored", kind, id);
            } else {
                warn!(
                    "Distinct {} records share id {}; keeping the later one",
                    kind, id
                );
                *existing = value;
            }
        }
        None => {
            map.insert(id, value);
        }
    }
}
