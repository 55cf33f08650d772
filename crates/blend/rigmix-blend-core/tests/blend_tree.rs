use std::collections::HashMap;
use std::sync::Arc;

use rigmix_blend_core::{
    combine_maps, joint_channel_name, BlendNode, ChannelValue, FilteredSource, ManagedSource,
    PlaybackRegistry, Repeat, Transform,
};
use rigmix_test_fixtures::{idle_clip, walk_clip, JOINTS};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn params(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn idle_walk_blend(registry: &mut PlaybackRegistry) -> BlendNode {
    let idle = registry.register(Arc::new(idle_clip()));
    let walk = registry.register(Arc::new(walk_clip()));
    for id in [idle, walk] {
        registry.state_mut(id).unwrap().set_repeat(Repeat::Forever);
    }
    BlendNode::blend(
        Some(BlendNode::clip(idle)),
        Some(BlendNode::clip(walk)),
        "w",
    )
}

#[test]
fn blend_weight_pulled_from_store_each_tick() {
    let mut registry = PlaybackRegistry::new();
    let tree = idle_walk_blend(&mut registry);
    let store = params(&[("w", 0.3)]);

    assert!(tree.advance_time(1.0, &mut registry));
    let map = tree.sample(&mut registry, &store);

    // walk at local 1.0 has joint y = 0.5; idle holds y = 0.
    for i in 0..JOINTS {
        let t = map[&joint_channel_name(i)].as_transform().unwrap();
        approx(t.translation[0], i as f32, 1e-5);
        approx(t.translation[1], 0.3 * 0.5, 1e-5);
    }
    // Scalars blend componentwise: idle 0.0, walk 0.5.
    approx(map["speed"].as_scalars().unwrap()[0], 0.3 * 0.5, 1e-5);
}

#[test]
fn missing_weight_defaults_to_pure_a() {
    let mut registry = PlaybackRegistry::new();
    let tree = idle_walk_blend(&mut registry);
    let store: HashMap<String, f64> = HashMap::new();

    tree.advance_time(1.0, &mut registry);
    let map = tree.sample(&mut registry, &store);
    for i in 0..JOINTS {
        let t = map[&joint_channel_name(i)].as_transform().unwrap();
        approx(t.translation[1], 0.0, 1e-6);
    }
}

#[test]
fn boundary_weight_keeps_a_wins_channels() {
    // Weight 1.0 hands the interpolatable channels to B, but the opaque
    // channel still resolves to A. This asymmetry is intentional.
    let mut registry = PlaybackRegistry::new();
    let tree = idle_walk_blend(&mut registry);
    let store = params(&[("w", 1.0)]);

    tree.advance_time(1.0, &mut registry);
    let map = tree.sample(&mut registry, &store);
    for i in 0..JOINTS {
        let t = map[&joint_channel_name(i)].as_transform().unwrap();
        approx(t.translation[1], 0.5, 1e-5);
    }
    assert_eq!(
        map["pose_meta"],
        ChannelValue::Opaque(serde_json::json!("idle"))
    );
}

#[test]
fn missing_child_is_pass_through_not_weight_zero() {
    let mut registry = PlaybackRegistry::new();
    let walk = registry.register(Arc::new(walk_clip()));
    registry.state_mut(walk).unwrap().set_repeat(Repeat::Forever);
    let tree = BlendNode::blend(None, Some(BlendNode::clip(walk)), "w");
    let store = params(&[("w", 0.25)]);

    tree.advance_time(1.0, &mut registry);
    let map = tree.sample(&mut registry, &store);
    // B passes through unweighted.
    let t = map[&joint_channel_name(0)].as_transform().unwrap();
    approx(t.translation[1], 0.5, 1e-5);
}

#[test]
fn lerp_boundaries_and_midpoint() {
    let x = Transform::from_translation([0.0, 0.0, 0.0]);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let y = Transform {
        translation: [2.0, 0.0, 0.0],
        rotation: [0.0, 0.0, half, half], // 90 degrees about Z
        scale: [1.0, 1.0, 1.0],
    };
    let a: rigmix_blend_core::ChannelMap =
        [("k".to_string(), ChannelValue::Transform(x))].into_iter().collect();
    let b: rigmix_blend_core::ChannelMap =
        [("k".to_string(), ChannelValue::Transform(y))].into_iter().collect();

    let at0 = combine_maps(Some(&a), Some(&b), 0.0);
    assert_eq!(at0["k"], a["k"]);
    let at1 = combine_maps(Some(&a), Some(&b), 1.0);
    let t1 = at1["k"].as_transform().unwrap();
    approx(t1.translation[0], 2.0, 1e-6);
    approx(t1.rotation[2], half, 1e-5);

    let mid = combine_maps(Some(&a), Some(&b), 0.5);
    let tm = mid["k"].as_transform().unwrap();
    approx(tm.translation[0], 1.0, 1e-6);
    // Spherical midpoint: 45 degrees about Z.
    let eighth = (std::f32::consts::FRAC_PI_8).sin();
    approx(tm.rotation[2], eighth, 1e-4);
    approx(tm.rotation[3], (std::f32::consts::FRAC_PI_8).cos(), 1e-4);
}

#[test]
fn include_filter_keeps_only_named_channels() {
    let mut registry = PlaybackRegistry::new();
    let idle = registry.register(Arc::new(idle_clip()));
    let tree = BlendNode::Filtered(FilteredSource::including(
        idle,
        [joint_channel_name(0)],
    ));
    let store: HashMap<String, f64> = HashMap::new();

    tree.advance_time(0.0, &mut registry);
    let map = tree.sample(&mut registry, &store);
    assert_eq!(map.len(), 1);
    assert!(map.contains_key(&joint_channel_name(0)));
}

#[test]
fn exclude_filter_removes_named_channels() {
    let mut registry = PlaybackRegistry::new();
    let idle = registry.register(Arc::new(idle_clip()));
    let tree = BlendNode::Filtered(FilteredSource::excluding(
        idle,
        [joint_channel_name(0), "speed".to_string()],
    ));
    let store: HashMap<String, f64> = HashMap::new();

    tree.advance_time(0.0, &mut registry);
    let map = tree.sample(&mut registry, &store);
    assert!(!map.contains_key(&joint_channel_name(0)));
    assert!(!map.contains_key("speed"));
    assert!(map.contains_key(&joint_channel_name(1)));
    assert!(map.contains_key("pose_meta"));
}

#[test]
fn key_union_spans_both_sides() {
    let mut registry = PlaybackRegistry::new();
    let idle = registry.register(Arc::new(idle_clip()));
    let walk = registry.register(Arc::new(walk_clip()));
    registry.state_mut(walk).unwrap().set_repeat(Repeat::Forever);
    // A contributes only joint 0; everything else reaches the result from B
    // verbatim.
    let tree = BlendNode::blend(
        Some(BlendNode::Filtered(FilteredSource::including(
            idle,
            [joint_channel_name(0)],
        ))),
        Some(BlendNode::clip(walk)),
        "w",
    );
    let store = params(&[("w", 0.5)]);

    tree.advance_time(1.0, &mut registry);
    let map = tree.sample(&mut registry, &store);
    let b_only = map[&joint_channel_name(1)].as_transform().unwrap();
    approx(b_only.translation[1], 0.5, 1e-5);
    let blended = map[&joint_channel_name(0)].as_transform().unwrap();
    approx(blended.translation[1], 0.25, 1e-5);
}

#[test]
fn managed_source_snapshots_are_independent() {
    let mut source = ManagedSource::new("overlay");
    source.set_translation(5, [1.0, 2.0, 3.0]);
    let first = source.sample();
    source.set_translation(5, [9.0, 9.0, 9.0]);
    let second = source.sample();

    let t1 = first[&joint_channel_name(5)].as_transform().unwrap();
    assert_eq!(t1.translation, [1.0, 2.0, 3.0]);
    let t2 = second[&joint_channel_name(5)].as_transform().unwrap();
    assert_eq!(t2.translation, [9.0, 9.0, 9.0]);
}

#[test]
fn managed_setters_upsert_one_slot() {
    let mut source = ManagedSource::new("overlay");
    source.set_translation(2, [1.0, 0.0, 0.0]);
    source.set_rotation(2, [0.0, 0.0, 0.0, 1.0]);
    source.set_scale(2, [2.0, 2.0, 2.0]);
    let map = source.sample();
    assert_eq!(map.len(), 1);
    let t = map[&joint_channel_name(2)].as_transform().unwrap();
    assert_eq!(t.translation, [1.0, 0.0, 0.0]);
    assert_eq!(t.scale, [2.0, 2.0, 2.0]);
}

#[test]
fn managed_mut_reaches_through_nesting() {
    let mut registry = PlaybackRegistry::new();
    let idle = registry.register(Arc::new(idle_clip()));
    let mut tree = BlendNode::blend(
        Some(BlendNode::clip(idle)),
        Some(BlendNode::blend(
            None,
            Some(BlendNode::Managed(ManagedSource::new("overlay"))),
            "inner",
        )),
        "outer",
    );

    tree.managed_mut("overlay")
        .expect("managed source by name")
        .set_translation(0, [5.0, 0.0, 0.0]);
    assert!(tree.managed_mut("absent").is_none());
}

#[test]
fn all_children_advance_even_after_one_finishes() {
    let mut registry = PlaybackRegistry::new();
    let a = registry.register(Arc::new(walk_clip()));
    let b = registry.register(Arc::new(walk_clip()));
    let tree = BlendNode::blend(
        Some(BlendNode::clip(a)),
        Some(BlendNode::clip(b)),
        "w",
    );

    // Both default to Count(1); one tick past the end finishes both, which
    // proves the right child was advanced despite the left already reporting.
    assert!(!tree.advance_time(2.5, &mut registry));
    assert_eq!(registry.drain_events().len(), 2);
    assert!(!tree.is_active(&registry));
}

#[test]
fn activity_is_ored_across_children() {
    let mut registry = PlaybackRegistry::new();
    let once = registry.register(Arc::new(walk_clip()));
    let forever = registry.register(Arc::new(walk_clip()));
    registry
        .state_mut(forever)
        .unwrap()
        .set_repeat(Repeat::Forever);
    let tree = BlendNode::blend(
        Some(BlendNode::clip(once)),
        Some(BlendNode::clip(forever)),
        "w",
    );

    assert!(tree.advance_time(2.5, &mut registry));
    assert!(tree.is_active(&registry));
    assert!(!BlendNode::clip(once).is_active(&registry));
}
