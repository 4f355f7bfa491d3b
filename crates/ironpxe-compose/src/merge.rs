//! The recursive merge algorithm.
//!
//! Folds an overlay mapping into a base mapping key by key. The structural
//! kind of a key must agree across layers; sequences either append or
//! replace depending on policy, and scalars are idempotent for identical
//! values.

use indexmap::map::Entry;
use ironpxe_doc::{Kind, Mapping, Value};
use serde::{Deserialize, Serialize};

use crate::error::ConflictError;

/// Conflict/overwrite/append policy for a composition.
///
/// `overwrite` governs scalar conflicts; `append` governs how two sequences
/// combine. `overwrite` deliberately has no effect on sequence keys: an
/// overlay sequence always replaces the base one unless `append` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePolicy {
    pub overwrite: bool,
    pub append: bool,
}

/// Merge `src` into `dst`, mutating `dst`.
///
/// `context_path` is the dotted path of `dst` within the document, used in
/// conflict diagnostics; pass [`crate::resolve::ROOT_CONTEXT`] at the root.
///
/// # Errors
///
/// Returns a [`ConflictError`] when the layers disagree on a key's kind or
/// duplicate a scalar key with different values while `policy.overwrite` is
/// false.
pub fn merge_into(
    dst: &mut Mapping,
    src: Mapping,
    context_path: &str,
    policy: MergePolicy,
) -> Result<(), ConflictError> {
    for (key, sv) in src {
        let cpath = format!("{context_path}.{key}");
        match sv {
            Value::Sequence(sv) => match dst.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(Value::Sequence(sv));
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Value::Sequence(dv) => {
                        if policy.append {
                            // Base elements first, then overlay elements.
                            dv.extend(sv);
                        } else {
                            *dv = sv;
                        }
                    }
                    other => {
                        return Err(ConflictError::KindMismatch {
                            context_path: cpath,
                            dst_kind: other.kind(),
                            src_kind: Kind::Sequence,
                        })
                    }
                },
            },

            Value::Mapping(sv) => {
                // An absent key gets a fresh empty mapping to recurse into,
                // so overlay subtrees are merged rather than moved.
                let slot = dst
                    .entry(key)
                    .or_insert_with(|| Value::Mapping(Mapping::new()));
                match slot {
                    Value::Mapping(dv) => merge_into(dv, sv, &cpath, policy)?,
                    other => {
                        return Err(ConflictError::KindMismatch {
                            context_path: cpath,
                            dst_kind: other.kind(),
                            src_kind: Kind::Mapping,
                        })
                    }
                }
            }

            sv => {
                match dst.get(&key) {
                    // Identical values merge as a no-op.
                    Some(existing) if *existing == sv => continue,
                    Some(_) if !policy.overwrite => {
                        return Err(ConflictError::DuplicateKey {
                            context_path: cpath,
                        })
                    }
                    _ => {}
                }
                dst.insert(key, sv);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ROOT_CONTEXT;

    fn parse(text: &str) -> Mapping {
        match serde_yaml::from_str(text).unwrap() {
            Value::Mapping(map) => map,
            other => panic!("expected mapping root, got {:?}", other),
        }
    }

    fn merge(dst: &str, src: &str, policy: MergePolicy) -> Result<Mapping, ConflictError> {
        let mut base = parse(dst);
        merge_into(&mut base, parse(src), ROOT_CONTEXT, policy)?;
        Ok(base)
    }

    #[test]
    fn disjoint_keys_union() {
        let merged = merge("a: 1", "b: 2", MergePolicy::default()).unwrap();
        assert_eq!(merged, parse("a: 1\nb: 2"));
    }

    #[test]
    fn empty_overlay_is_a_noop() {
        let merged = merge("a: {b: 1}", "{}", MergePolicy::default()).unwrap();
        assert_eq!(merged, parse("a: {b: 1}"));
    }

    #[test]
    fn equal_scalars_merge_idempotently() {
        let merged = merge("a: 1", "a: 1", MergePolicy::default()).unwrap();
        assert_eq!(merged, parse("a: 1"));
    }

    #[test]
    fn differing_scalars_conflict_without_overwrite() {
        let err = merge("a: 1", "a: 2", MergePolicy::default()).unwrap_err();
        assert_eq!(
            err,
            ConflictError::DuplicateKey {
                context_path: "$.a".into()
            }
        );
    }

    #[test]
    fn differing_scalars_replaced_with_overwrite() {
        let policy = MergePolicy {
            overwrite: true,
            append: false,
        };
        let merged = merge("a: 1", "a: 2", policy).unwrap();
        assert_eq!(merged, parse("a: 2"));
    }

    #[test]
    fn sequences_append_in_base_then_overlay_order() {
        let policy = MergePolicy {
            overwrite: false,
            append: true,
        };
        let merged = merge("c: [1, 2]", "c: [3, 4]", policy).unwrap();
        assert_eq!(merged, parse("c: [1, 2, 3, 4]"));
    }

    #[test]
    fn sequences_replace_without_append_regardless_of_overwrite() {
        for overwrite in [false, true] {
            let policy = MergePolicy {
                overwrite,
                append: false,
            };
            let merged = merge("c: [1, 2]", "c: [3, 4]", policy).unwrap();
            assert_eq!(merged, parse("c: [3, 4]"), "overwrite={overwrite}");
        }
    }

    #[test]
    fn sequence_into_absent_key_inserts() {
        let merged = merge("a: 1", "c: [1]", MergePolicy::default()).unwrap();
        assert_eq!(merged, parse("a: 1\nc: [1]"));
    }

    #[test]
    fn sequence_vs_scalar_is_a_kind_mismatch() {
        let err = merge("c: 1", "c: [1]", MergePolicy::default()).unwrap_err();
        assert_eq!(
            err,
            ConflictError::KindMismatch {
                context_path: "$.c".into(),
                dst_kind: Kind::Scalar,
                src_kind: Kind::Sequence,
            }
        );
    }

    #[test]
    fn mapping_vs_sequence_is_a_kind_mismatch() {
        let err = merge("a: [1, 2]", "a: {x: 1}", MergePolicy::default()).unwrap_err();
        assert_eq!(
            err,
            ConflictError::KindMismatch {
                context_path: "$.a".into(),
                dst_kind: Kind::Sequence,
                src_kind: Kind::Mapping,
            }
        );
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let merged = merge("a: {b: 1}", "a: {c: 2}", MergePolicy::default()).unwrap();
        assert_eq!(merged, parse("a: {b: 1, c: 2}"));
    }

    #[test]
    fn nested_conflict_reports_full_context_path() {
        let err = merge("a: {b: {c: 1}}", "a: {b: {c: 2}}", MergePolicy::default()).unwrap_err();
        assert_eq!(err.context_path(), "$.a.b.c");
    }

    #[test]
    fn overlay_mapping_into_absent_key_deep_merges() {
        let merged = merge("x: 1", "a: {b: {c: 2}}", MergePolicy::default()).unwrap();
        assert_eq!(merged, parse("x: 1\na: {b: {c: 2}}"));
    }

    #[test]
    fn equal_scalar_and_replaced_sequence_in_one_pass() {
        // Equal scalar is a no-op; the sequence is replaced unconditionally.
        let merged = merge(
            "a: {b: 1, c: [1, 2]}",
            "a: {b: 1, c: [3, 4]}",
            MergePolicy::default(),
        )
        .unwrap();
        assert_eq!(merged, parse("a: {b: 1, c: [3, 4]}"));
    }
}
