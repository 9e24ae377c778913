use anyhow::{anyhow, Result};
use vizij_avatar_core::headless::{HeadlessBackend, ManualScheduler, QueuedAssetSource};
use vizij_avatar_core::{
    AssetDescriptor, EventRecorder, PlaybackState, SceneHost, StageConfig, StageEvent,
};
use vizij_test_fixtures::{avatars, stages};

type Host = SceneHost<HeadlessBackend, QueuedAssetSource, ManualScheduler>;

fn mounted(stage: &str) -> Result<(Host, EventRecorder)> {
    let config: StageConfig = stages::load(stage)?;
    let mut host = SceneHost::new(
        HeadlessBackend::new(),
        QueuedAssetSource::new(),
        ManualScheduler::new(),
    );
    let recorder = EventRecorder::new();
    host.subscribe(recorder.listener());
    host.configure(config)?;

    if let Some(ticket) = host.assets_mut().take_next() {
        let avatar: AssetDescriptor = stages::avatar(stage)?
            .ok_or_else(|| anyhow!("stage '{stage}' requests an asset but has no avatar"))?;
        host.complete_asset(ticket.generation, Ok(avatar.into_loaded()));
    }
    Ok((host, recorder))
}

fn tick(host: &mut Host, now: f64) {
    if let Some(handle) = host.scheduler_mut().take_scheduled() {
        host.on_frame(handle, now);
    }
}

#[test]
fn fallback_stage_has_no_clips() -> Result<()> {
    let (mut host, recorder) = mounted("fallback-400")?;
    assert!(host.scene().has_fallback());
    assert!(host.director().clips().is_empty());
    assert!(!host.play(0));
    assert_eq!(host.playback_state(), PlaybackState::Idle);
    assert!(recorder.is_empty());
    Ok(())
}

#[test]
fn two_clip_robot_switch_and_complete() -> Result<()> {
    let (mut host, recorder) = mounted("robot-400")?;
    assert_eq!(host.director().clips().len(), 2);

    host.play(0);
    assert_eq!(recorder.take(), vec![StageEvent::AnimationStart { index: 0 }]);

    host.play(1);
    assert_eq!(recorder.take(), vec![StageEvent::AnimationStart { index: 1 }]);

    let duration = host.director().clips()[1].duration_seconds as f64;
    tick(&mut host, 0.0);
    tick(&mut host, duration);
    assert_eq!(recorder.take(), vec![StageEvent::AnimationEnd { index: 1 }]);
    assert_eq!(host.active_index(), None);
    Ok(())
}

#[test]
fn wide_stage_uses_widget_attribute_name() -> Result<()> {
    let (host, _) = mounted("robot-wide")?;
    let config = host.config().ok_or_else(|| anyhow!("nothing live"))?;
    assert_eq!(config.asset_url, "https://models.vizij.ai/robot.glb");
    assert_eq!(host.context().map(|c| c.camera().aspect), Some(2.0));
    Ok(())
}

#[test]
fn unnamed_clips_are_labelled_and_capped() -> Result<()> {
    let descriptor: AssetDescriptor = avatars::load("unnamed-clips")?;
    let asset = descriptor.into_loaded();
    assert_eq!(asset.clips.len(), 7);
    assert_eq!(asset.clips[2].duration_seconds, 0.0);

    let mut host = SceneHost::new(
        HeadlessBackend::new(),
        QueuedAssetSource::new(),
        ManualScheduler::new(),
    );
    host.configure(StageConfig::new("mannequin.glb", 400, 400))?;
    let ticket = host
        .assets_mut()
        .take_next()
        .ok_or_else(|| anyhow!("no asset request issued"))?;
    host.complete_asset(ticket.generation, Ok(asset));

    let controls = host.controls();
    let labels: Vec<&str> = controls.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Animation 1", "Idle", "Animation 3", "Run", "Walk"]);
    Ok(())
}

#[test]
fn static_prop_loads_without_clips() -> Result<()> {
    let descriptor: AssetDescriptor = avatars::load("static-prop")?;
    let asset = descriptor.into_loaded();
    assert_eq!(asset.root.as_str(), "Crate");
    assert!(asset.clips.is_empty());
    Ok(())
}

#[test]
fn every_avatar_fixture_parses() -> Result<()> {
    for key in avatars::keys() {
        let _: AssetDescriptor = avatars::load(&key)?;
    }
    for key in stages::keys() {
        let config: StageConfig = stages::load(&key)?;
        config.validate()?;
    }
    Ok(())
}

#[test]
fn raw_fixture_text_matches_typed_loader() -> Result<()> {
    for key in avatars::keys() {
        let raw: AssetDescriptor = serde_json::from_str(&avatars::json(&key)?)?;
        assert_eq!(raw, avatars::load::<AssetDescriptor>(&key)?);
        assert!(avatars::path(&key)?.is_file(), "missing avatar file for {key}");
    }
    for key in stages::keys() {
        let raw: StageConfig = serde_json::from_str(&stages::json(&key)?)?;
        assert_eq!(raw, stages::load::<StageConfig>(&key)?);
        assert!(stages::path(&key)?.is_file(), "missing stage file for {key}");
    }
    Ok(())
}
