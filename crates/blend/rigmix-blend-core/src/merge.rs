//! Two-source channel map composition.
//!
//! The merge is deliberately asymmetric: when a key's pairing is not
//! interpolatable (Trigger, Opaque, kind mismatch, or the key is absent from
//! B), A's value is copied verbatim and the weight is ignored. Swapping the
//! sides therefore changes the result for non-blendable channels; callers
//! must preserve child order. Boundary weights 0 and 1 do not suppress
//! non-blendable channels from the losing side.

use rigmix_api_core::blend::blend_channel_values;
use rigmix_api_core::ChannelMap;

/// Merge `a` and `b` at `weight` (0 -> pure A, 1 -> pure B) into `out`,
/// which is cleared first so a reused buffer never leaks stale keys. The
/// result key set is exactly the union of the input key sets. An absent side
/// passes the other side through unchanged, weight ignored; a missing child
/// is not "weight 0".
pub fn combine_maps_into(
    a: Option<&ChannelMap>,
    b: Option<&ChannelMap>,
    weight: f32,
    out: &mut ChannelMap,
) {
    out.clear();
    match (a, b) {
        (None, None) => {}
        (Some(a), None) => {
            out.reserve(a.len());
            for (key, value) in a.iter() {
                out.insert(key.clone(), value.clone());
            }
        }
        (None, Some(b)) => {
            out.reserve(b.len());
            for (key, value) in b.iter() {
                out.insert(key.clone(), value.clone());
            }
        }
        (Some(a), Some(b)) => {
            out.reserve(a.len() + b.len());
            for (key, va) in a.iter() {
                let merged = match b.get(key) {
                    Some(vb) => {
                        blend_channel_values(va, vb, weight).unwrap_or_else(|| va.clone())
                    }
                    None => va.clone(),
                };
                out.insert(key.clone(), merged);
            }
            for (key, vb) in b.iter() {
                if !out.contains_key(key) {
                    out.insert(key.clone(), vb.clone());
                }
            }
        }
    }
}

/// Allocating wrapper over [`combine_maps_into`].
pub fn combine_maps(a: Option<&ChannelMap>, b: Option<&ChannelMap>, weight: f32) -> ChannelMap {
    let mut out = ChannelMap::new();
    combine_maps_into(a, b, weight, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigmix_api_core::{ChannelValue, Transform};

    fn map_of(entries: &[(&str, ChannelValue)]) -> ChannelMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn absent_side_passes_through() {
        let a = map_of(&[("x", ChannelValue::Scalars(vec![1.0]))]);
        assert_eq!(combine_maps(Some(&a), None, 0.75), a);
        assert_eq!(combine_maps(None, Some(&a), 0.75), a);
        assert!(combine_maps(None, None, 0.5).is_empty());
    }

    #[test]
    fn stale_keys_cleared_on_reuse() {
        let a = map_of(&[("x", ChannelValue::Scalars(vec![1.0]))]);
        let b = map_of(&[("y", ChannelValue::Scalars(vec![2.0]))]);
        let mut out = map_of(&[("stale", ChannelValue::Scalars(vec![9.0]))]);
        combine_maps_into(Some(&a), Some(&b), 0.5, &mut out);
        assert!(!out.contains_key("stale"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn transform_lerp_and_union() {
        let a = map_of(&[
            ("t", ChannelValue::Transform(Transform::from_translation([0.0, 0.0, 0.0]))),
            ("only_a", ChannelValue::Scalars(vec![1.0])),
        ]);
        let b = map_of(&[
            ("t", ChannelValue::Transform(Transform::from_translation([1.0, 0.0, 0.0]))),
            ("only_b", ChannelValue::Scalars(vec![2.0])),
        ]);
        let out = combine_maps(Some(&a), Some(&b), 0.25);
        let t = out["t"].as_transform().unwrap();
        assert!((t.translation[0] - 0.25).abs() < 1e-6);
        assert_eq!(out["only_a"], a["only_a"]);
        assert_eq!(out["only_b"], b["only_b"]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn a_wins_on_kind_mismatch_at_any_weight() {
        let a = map_of(&[("k", ChannelValue::Opaque(serde_json::json!("left")))]);
        let b = map_of(&[("k", ChannelValue::Opaque(serde_json::json!("right")))]);
        for w in [0.0, 0.5, 1.0] {
            let out = combine_maps(Some(&a), Some(&b), w);
            assert_eq!(out["k"], a["k"], "A must win at weight {w}");
        }
    }
}
