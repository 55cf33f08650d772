use std::collections::HashMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rigmix_blend_core::{BlendNode, PlaybackRegistry, Repeat};
use rigmix_test_fixtures::{idle_clip, walk_clip};

fn bench_blend_step(c: &mut Criterion) {
    let mut registry = PlaybackRegistry::new();
    let idle = registry.register(Arc::new(idle_clip()));
    let walk = registry.register(Arc::new(walk_clip()));
    for id in [idle, walk] {
        registry.state_mut(id).unwrap().set_repeat(Repeat::Forever);
    }
    let tree = BlendNode::blend(
        Some(BlendNode::clip(idle)),
        Some(BlendNode::clip(walk)),
        "w",
    );
    let params: HashMap<String, f64> = [("w".to_string(), 0.5)].into_iter().collect();

    let mut t = 0.0f64;
    c.bench_function("advance_and_sample", |b| {
        b.iter(|| {
            t += 1.0 / 60.0;
            tree.advance_time(t, &mut registry);
            black_box(tree.sample(&mut registry, &params));
            registry.drain_events();
        })
    });
}

criterion_group!(benches, bench_blend_step);
criterion_main!(benches);
