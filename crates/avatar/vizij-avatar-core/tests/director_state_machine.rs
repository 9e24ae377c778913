use vizij_avatar_core::{
    AnimationDirector, EventRecorder, LoadedAsset, ModelNode, PlaybackState, StageEvent,
};

fn robot(durations: &[f32]) -> LoadedAsset {
    LoadedAsset::new(
        ModelNode::new("Robot"),
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("clip{i}"), *d)),
    )
}

fn director_with(durations: &[f32]) -> (AnimationDirector, EventRecorder) {
    let mut director = AnimationDirector::new();
    let recorder = EventRecorder::new();
    director.subscribe(recorder.listener());
    director.seed(&robot(durations));
    (director, recorder)
}

#[test]
fn play_sets_active_index_and_emits_one_start() {
    for index in 0..3 {
        let (mut director, recorder) = director_with(&[1.0, 2.0, 0.5]);
        assert!(director.play(index));
        assert_eq!(director.active_index(), Some(index));
        assert_eq!(recorder.events(), vec![StageEvent::AnimationStart { index }]);
    }
}

#[test]
fn switching_clips_never_reports_stale_end() {
    let (mut director, recorder) = director_with(&[1.0, 1.0]);
    director.play(0);
    director.advance(0.9);
    director.play(1);
    // Enough time for clip 0 to have finished twice over.
    director.advance(0.5);
    director.advance(0.5);
    director.advance(1.0);
    assert_eq!(
        recorder.events(),
        vec![
            StageEvent::AnimationStart { index: 0 },
            StageEvent::AnimationStart { index: 1 },
            StageEvent::AnimationEnd { index: 1 },
        ]
    );
    assert!(!recorder
        .events()
        .contains(&StageEvent::AnimationEnd { index: 0 }));
}

#[test]
fn stop_is_silent_and_noop_when_idle() {
    let (mut director, recorder) = director_with(&[1.0]);
    director.stop();
    assert_eq!(director.state(), PlaybackState::Idle);
    assert!(recorder.is_empty());

    director.play(0);
    recorder.take();
    director.stop();
    assert_eq!(director.state(), PlaybackState::Idle);
    assert!(recorder.is_empty());
}

#[test]
fn full_duration_completes_exactly_once() {
    let (mut director, recorder) = director_with(&[1.0]);
    director.play(0);
    recorder.take();
    director.advance(1.0);
    assert_eq!(director.state(), PlaybackState::Idle);
    director.advance(1.0);
    director.advance(1.0);
    assert_eq!(recorder.events(), vec![StageEvent::AnimationEnd { index: 0 }]);
}

#[test]
fn completion_accumulates_over_ticks() {
    let (mut director, recorder) = director_with(&[1.0]);
    director.play(0);
    for _ in 0..3 {
        director.advance(0.25);
    }
    assert_eq!(director.state(), PlaybackState::Playing(0));
    director.advance(0.25);
    assert_eq!(director.state(), PlaybackState::Idle);
    assert_eq!(recorder.take().last(), Some(&StageEvent::AnimationEnd { index: 0 }));
}

#[test]
fn replaying_same_clip_restarts_it() {
    let (mut director, recorder) = director_with(&[1.0]);
    director.play(0);
    director.advance(0.75);
    director.play(0);
    director.advance(0.5);
    assert_eq!(director.state(), PlaybackState::Playing(0));
    director.advance(0.5);
    assert_eq!(
        recorder.events(),
        vec![
            StageEvent::AnimationStart { index: 0 },
            StageEvent::AnimationStart { index: 0 },
            StageEvent::AnimationEnd { index: 0 },
        ]
    );
}

#[test]
fn invalid_requests_are_ignored() {
    let mut unseeded = AnimationDirector::new();
    let recorder = EventRecorder::new();
    unseeded.subscribe(recorder.listener());
    assert!(!unseeded.play(0));
    assert!(recorder.is_empty());

    let (mut director, recorder) = director_with(&[1.0, 1.0]);
    director.play(1);
    assert!(!director.play(2));
    assert!(!director.play(usize::MAX));
    assert_eq!(director.state(), PlaybackState::Playing(1));
    assert_eq!(recorder.events().len(), 1);
}

#[test]
fn reseeding_resets_to_idle_and_drops_hook() {
    let (mut director, recorder) = director_with(&[1.0]);
    director.play(0);
    director.seed(&robot(&[3.0, 3.0]));
    assert_eq!(director.state(), PlaybackState::Idle);
    assert_eq!(director.clips().len(), 2);
    director.advance(5.0);
    assert_eq!(recorder.events(), vec![StageEvent::AnimationStart { index: 0 }]);
}

#[test]
fn zero_length_clip_ends_on_first_tick() {
    let (mut director, recorder) = director_with(&[0.0]);
    director.play(0);
    assert_eq!(director.state(), PlaybackState::Playing(0));
    director.advance(0.0);
    assert_eq!(director.state(), PlaybackState::Idle);
    assert_eq!(
        recorder.events(),
        vec![
            StageEvent::AnimationStart { index: 0 },
            StageEvent::AnimationEnd { index: 0 },
        ]
    );
}

#[test]
fn start_is_observed_before_play_returns() {
    let (mut director, recorder) = director_with(&[1.0]);
    let observed = recorder.clone();
    director.play(0);
    // Nothing has been ticked; the event must already be there.
    assert_eq!(observed.events(), vec![StageEvent::AnimationStart { index: 0 }]);
}

#[test]
fn controls_disable_the_playing_clip() {
    let (mut director, _) = director_with(&[1.0, 1.0]);
    director.play(1);
    let disabled: Vec<bool> = director.controls(5).iter().map(|c| c.disabled).collect();
    assert_eq!(disabled, vec![false, true]);
    director.advance(1.0);
    assert!(director.controls(5).iter().all(|c| !c.disabled));
}
