//! Asset references as written in the source of truth, e.g. `^rack1-server1`.

use serde_json::Value;

pub const REFERENCE_SIGIL: char = '^';

/// Name of the asset a reference token points at. Only a single leading
/// sigil is stripped; tokens without one are returned as they are.
pub fn resolve(token: &str) -> &str {
    token.strip_prefix(REFERENCE_SIGIL).unwrap_or(token)
}

/// Resolves `key` of `record` if it holds a reference token.
pub fn resolve_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str).map(resolve)
}
