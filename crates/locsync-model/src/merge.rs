//! Right-biased merge of flat string resources.

use crate::config::StringMap;

/// Merge `incoming` into `existing`, returning the union.
///
/// On key collision the incoming value wins; every other existing key is
/// preserved untouched. Both platform mergers apply this rule, whatever the
/// on-disk serialization.
pub fn merge_strings(existing: &StringMap, incoming: &StringMap) -> StringMap {
    let mut merged = existing.clone();
    for (key, value) in incoming {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
