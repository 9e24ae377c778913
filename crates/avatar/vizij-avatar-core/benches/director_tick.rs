use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vizij_avatar_core::headless::{HeadlessBackend, ManualScheduler, QueuedAssetSource};
use vizij_avatar_core::{LoadedAsset, ModelNode, SceneHost, StageConfig};

fn bench_director_tick(c: &mut Criterion) {
    let mut host = SceneHost::new(
        HeadlessBackend::new().counting_only(),
        QueuedAssetSource::new(),
        ManualScheduler::new(),
    );
    host.configure(StageConfig::new("bench.glb", 1280, 720))
        .expect("headless configure");
    let ticket = host.assets_mut().take_next().expect("asset request");
    let clips = (0..16).map(|i| (format!("clip{i}"), 2.0));
    host.complete_asset(
        ticket.generation,
        Ok(LoadedAsset::new(ModelNode::new("Bench"), clips)),
    );

    let mut now = 0.0_f64;
    let mut next_clip = 0usize;
    c.bench_function("scene_host_frame", |b| {
        b.iter(|| {
            if host.active_index().is_none() {
                host.play(next_clip % 16);
                next_clip += 1;
            }
            now += 1.0 / 60.0;
            if let Some(handle) = host.scheduler_mut().take_scheduled() {
                host.on_frame(black_box(handle), black_box(now));
            }
        })
    });
}

criterion_group!(benches, bench_director_tick);
criterion_main!(benches);
