//! Property tests for the tree differ.

use colltrack_core::diff::model::is_hash_token;
use colltrack_core::diff::{diff, ChangeType, DiffOptions};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Arbitrary documents whose keys never name a list container.
fn arb_document() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-e]{1,3}", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]{1,3}", arb_document(), 1..6)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

/// Collection entries with unique names plus some unkeyed payload.
fn arb_entries() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::btree_set("[A-Z][a-z]{0,5}", 2..7).prop_flat_map(|names| {
        let n = names.len();
        (
            Just(names),
            prop::collection::vec(arb_document(), n..=n),
        )
            .prop_map(|(names, payloads)| {
                names
                    .into_iter()
                    .zip(payloads)
                    .map(|(name, payload)| json!({"name": name, "payload": payload}))
                    .collect()
            })
    })
}

/// Descend through nested objects up to `depth` levels and insert a key no
/// generated document uses.
fn insert_new_key(doc: &mut Value, depth: usize) {
    let Value::Object(map) = doc else { return };
    if depth > 0 {
        let next = map.iter().find(|(_, v)| v.is_object()).map(|(k, _)| k.clone());
        if let Some(k) = next {
            if let Some(child) = map.get_mut(&k) {
                insert_new_key(child, depth - 1);
                return;
            }
        }
    }
    map.insert("zz_new".to_string(), json!({"fresh": true}));
}

proptest! {
    #[test]
    fn prop_diff_with_self_is_empty(doc in arb_document()) {
        prop_assert!(diff(&doc, &doc, &DiffOptions::default()).is_empty());
    }

    #[test]
    fn prop_diff_with_self_is_empty_for_entries(entries in arb_entries()) {
        let mut doc = json!({"item": entries});
        // unkeyed members must not break idempotence
        doc["item"].as_array_mut().unwrap().push(json!({"description": "no identity"}));
        prop_assert!(diff(&doc, &doc, &DiffOptions::default()).is_empty());
    }

    #[test]
    fn prop_added_and_deleted_are_symmetric(a in arb_document(), b in arb_document()) {
        let opts = DiffOptions::default();
        let forward = diff(&a, &b, &opts);
        let backward = diff(&b, &a, &opts);
        for change in forward.iter().filter(|c| c.change_type == ChangeType::Added) {
            prop_assert!(
                backward.iter().any(|c| c.change_type == ChangeType::Deleted && c.path == change.path),
                "no deletion at {} in reverse diff", change.path
            );
        }
    }

    #[test]
    fn prop_pure_insertion_yields_single_addition(a in arb_object(), depth in 0usize..4) {
        let mut b = a.clone();
        insert_new_key(&mut b, depth);
        let changes = diff(&a, &b, &DiffOptions::default());
        prop_assert_eq!(changes.len(), 1);
        prop_assert_eq!(changes[0].change_type, ChangeType::Added);
        prop_assert!(changes[0].path.ends_with("zz_new"));
    }

    #[test]
    fn prop_reordered_entries_are_unchanged(
        entries in arb_entries(),
        i in 0usize..7,
        j in 0usize..7,
    ) {
        let n = entries.len();
        let mut swapped = entries.clone();
        swapped.swap(i % n, j % n);
        let changes = diff(&json!({"item": entries}), &json!({"item": swapped}), &DiffOptions::default());
        prop_assert!(changes.is_empty(), "unexpected changes {:?}", changes);
    }

    #[test]
    fn prop_hash_threshold_decides_token(len in 0usize..300, threshold in 1usize..200) {
        let opts = DiffOptions { hash_threshold: threshold, ..DiffOptions::default() };
        let value = "v".repeat(len);
        let changes = diff(&json!({}), &json!({"k": value}), &opts);
        let stored = changes[0].modification.as_deref().unwrap();
        let serialized_len = len + 2;
        prop_assert_eq!(is_hash_token(stored), serialized_len > threshold);
    }
}
