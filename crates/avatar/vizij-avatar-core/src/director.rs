//! AnimationDirector: exclusive clip playback with start/end notifications.
//!
//! States are `Idle` and `Playing(i)`:
//! - `play(i)`: `Idle | Playing(j)` → `Playing(i)`, emits `animation-start`
//! - natural completion during `advance`: `Playing(i)` → `Idle`, emits `animation-end`
//! - `stop()`: `Playing(i)` → `Idle`, silent
//! - `seed`/`clear`: any → `Idle`
//!
//! Each `play` registers one completion hook. The previous hook is dropped
//! before the new one is registered, so a superseded clip can never report an end.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::asset::{AnimationClip, LoadedAsset};
use crate::controls::{controls_for, ControlEntry};
use crate::events::{EventEmitter, StageEvent};
use crate::scene::{ClipPose, ModelNode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing(usize),
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing(_) => "playing",
        }
    }

    #[inline]
    pub fn active_index(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Playing(index) => Some(*index),
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DriverStatus {
    Running,
    Finished,
    Halted,
}

/// Plays one clip once from the start; no looping.
#[derive(Clone, Debug, PartialEq)]
struct ClipDriver {
    index: usize,
    duration: f32,
    time: f32,
    running: bool,
}

impl ClipDriver {
    fn new(clip: &AnimationClip) -> Self {
        Self {
            index: clip.index,
            duration: clip.duration_seconds,
            time: 0.0,
            running: false,
        }
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.running = false;
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn halt(&mut self) {
        self.running = false;
    }

    fn advance(&mut self, delta: f32) -> DriverStatus {
        if !self.running {
            return DriverStatus::Halted;
        }
        self.time = (self.time + delta).min(self.duration);
        if self.time >= self.duration {
            self.running = false;
            DriverStatus::Finished
        } else {
            DriverStatus::Running
        }
    }

    fn pose(&self) -> ClipPose {
        ClipPose {
            index: self.index,
            time: self.time,
        }
    }
}

/// Completion hook registered by a single `play` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct CompletionHook {
    index: usize,
    play: u64,
}

#[derive(Debug, Default)]
pub struct AnimationDirector {
    root: Option<ModelNode>,
    clips: Vec<AnimationClip>,
    drivers: Vec<ClipDriver>,
    state: PlaybackState,
    hook: Option<CompletionHook>,
    plays: u64,
    events: EventEmitter,
}

impl AnimationDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StageEvent) + 'static) {
        self.events.subscribe(listener);
    }

    /// Bind to a freshly loaded asset. Any playback of the previous asset is
    /// dropped without notification.
    pub fn seed(&mut self, asset: &LoadedAsset) {
        self.unbind();
        self.root = Some(asset.root.clone());
        self.clips = asset.clips.clone();
        self.drivers = asset.clips.iter().map(ClipDriver::new).collect();
    }

    /// Forget the current asset; `play` becomes a no-op until the next `seed`.
    pub fn clear(&mut self) {
        self.unbind();
    }

    fn unbind(&mut self) {
        self.hook = None;
        self.state = PlaybackState::Idle;
        self.root = None;
        self.clips.clear();
        self.drivers.clear();
    }

    #[inline]
    pub fn is_seeded(&self) -> bool {
        self.root.is_some()
    }

    #[inline]
    pub fn root(&self) -> Option<&ModelNode> {
        self.root.as_ref()
    }

    #[inline]
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn active_index(&self) -> Option<usize> {
        self.state.active_index()
    }

    /// Start clip `index`, stopping whatever is playing. Returns `false` and
    /// does nothing when unseeded or when `index` is out of range.
    pub fn play(&mut self, index: usize) -> bool {
        if self.root.is_none() || index >= self.drivers.len() {
            debug!(
                "play({index}) ignored: {} clip(s) seeded",
                self.drivers.len()
            );
            return false;
        }

        self.halt_active();

        let driver = &mut self.drivers[index];
        driver.reset();
        driver.start();
        self.plays = self.plays.wrapping_add(1);
        self.hook = Some(CompletionHook {
            index,
            play: self.plays,
        });
        self.state = PlaybackState::Playing(index);
        self.events.emit(StageEvent::AnimationStart { index });
        true
    }

    /// Halt the active clip without emitting `animation-end`.
    pub fn stop(&mut self) {
        self.halt_active();
    }

    fn halt_active(&mut self) {
        self.hook = None;
        if let PlaybackState::Playing(index) = self.state {
            if let Some(driver) = self.drivers.get_mut(index) {
                driver.halt();
            }
            self.state = PlaybackState::Idle;
        }
    }

    /// Step the active clip by `delta_seconds`. Negative or non-finite deltas
    /// count as zero.
    pub fn advance(&mut self, delta_seconds: f32) {
        let PlaybackState::Playing(index) = self.state else {
            return;
        };
        let delta = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };
        let status = match self.drivers.get_mut(index) {
            Some(driver) => driver.advance(delta),
            None => DriverStatus::Halted,
        };
        if status == DriverStatus::Finished {
            self.on_complete(index);
        }
    }

    fn on_complete(&mut self, index: usize) {
        let Some(hook) = self.hook.take() else {
            return;
        };
        if hook.index != index {
            self.hook = Some(hook);
            return;
        }
        debug!("clip {index} completed (play #{})", hook.play);
        self.state = PlaybackState::Idle;
        self.events.emit(StageEvent::AnimationEnd { index });
    }

    /// Pose of the active clip, for the model root.
    pub fn pose(&self) -> Option<ClipPose> {
        let index = self.state.active_index()?;
        self.drivers.get(index).map(ClipDriver::pose)
    }

    pub fn controls(&self, limit: usize) -> Vec<ControlEntry> {
        controls_for(&self.clips, self.state, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventRecorder;

    fn seeded(clips: &[(&str, f32)]) -> (AnimationDirector, EventRecorder) {
        let mut director = AnimationDirector::new();
        let recorder = EventRecorder::new();
        director.subscribe(recorder.listener());
        director.seed(&LoadedAsset::new(
            ModelNode::new("Robot"),
            clips.iter().copied(),
        ));
        (director, recorder)
    }

    #[test]
    fn completion_hook_is_dropped_on_stop() {
        let (mut director, recorder) = seeded(&[("Wave", 1.0)]);
        director.play(0);
        director.stop();
        assert!(director.hook.is_none());
        director.advance(5.0);
        assert_eq!(recorder.events(), vec![StageEvent::AnimationStart { index: 0 }]);
    }

    #[test]
    fn pose_tracks_driver_time() {
        let (mut director, _) = seeded(&[("Wave", 1.0)]);
        assert_eq!(director.pose(), None);
        director.play(0);
        director.advance(0.4);
        let pose = director.pose().unwrap();
        assert_eq!(pose.index, 0);
        assert!((pose.time - 0.4).abs() < 1e-6);
    }

    #[test]
    fn bad_deltas_do_not_move_time() {
        let (mut director, _) = seeded(&[("Wave", 1.0)]);
        director.play(0);
        director.advance(-1.0);
        director.advance(f32::NAN);
        assert_eq!(director.pose().map(|p| p.time), Some(0.0));
        assert!(director.state().is_playing());
    }

    #[test]
    fn playback_state_serializes_tagged() {
        let json = serde_json::to_value(PlaybackState::Playing(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "playing", "index": 3 }));
        let idle = serde_json::to_value(PlaybackState::Idle).unwrap();
        assert_eq!(idle, serde_json::json!({ "state": "idle" }));
    }
}
