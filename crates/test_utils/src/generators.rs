//! Property-Based Test Generators
//!
//! proptest strategies for WooCommerce payloads.

use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for zone ids as WooCommerce assigns them
pub fn zone_id_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000i64
}

/// Strategy for an optional zone id; `None` stands for a record without `id`
pub fn maybe_zone_id_strategy() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![
        4 => zone_id_strategy().prop_map(Some),
        1 => Just(None),
    ]
}

/// Strategy for two-letter uppercase country codes
pub fn country_code_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2}"
}

/// Builds a search response from optional ids, in order
pub fn search_response(ids: &[Option<i64>]) -> Value {
    Value::Array(
        ids.iter()
            .enumerate()
            .map(|(position, id)| match id {
                Some(id) => json!({"id": id, "name": format!("Zone {position}")}),
                None => json!({"name": format!("Zone {position}")}),
            })
            .collect(),
    )
}
