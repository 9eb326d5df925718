//! Field join between two objects

use crate::design::{Object, TRANSFORM_KEY};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Pair the fields of `source` with the fields of `target`.
///
/// A field is matched on its `transform:key` metadata when present, on its
/// name otherwise. The result maps source field names to target field
/// names; fields with no counterpart are left out.
///
/// # Errors
/// - [`Error::MalformedMappingKey`] when the key metadata holds no value
/// - [`Error::DuplicateMappingKey`] when two fields of one object share a
///   key
pub fn compute_mapping(
    source: &Object,
    target: &Object,
    source_ctx: &str,
    target_ctx: &str,
) -> Result<BTreeMap<String, String>> {
    let source_keys = mapping_keys(source, source_ctx)?;
    let target_keys = mapping_keys(target, target_ctx)?;
    Ok(source_keys
        .into_iter()
        .filter_map(|(key, s)| target_keys.get(&key).map(|t| (s, t.clone())))
        .collect())
}

/// Join key of every field, keyed by join key
fn mapping_keys(obj: &Object, ctx: &str) -> Result<BTreeMap<String, String>> {
    let mut keys = BTreeMap::new();
    for (name, att) in obj {
        let key = match att.meta(TRANSFORM_KEY) {
            None => name.clone(),
            Some([]) => {
                return Err(Error::MalformedMappingKey {
                    attribute: name.clone(),
                    context: ctx.to_string(),
                })
            }
            Some([key, ..]) => key.clone(),
        };
        if let Some(first) = keys.insert(key.clone(), name.clone()) {
            return Err(Error::DuplicateMappingKey {
                key,
                first,
                second: name.clone(),
                context: ctx.to_string(),
            });
        }
    }
    Ok(keys)
}
