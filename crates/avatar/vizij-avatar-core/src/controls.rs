//! Read model for a control surface (one button per clip).

use serde::{Deserialize, Serialize};

use crate::asset::AnimationClip;
use crate::director::PlaybackState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEntry {
    pub index: usize,
    pub label: String,
    /// True for the clip that is currently playing.
    pub disabled: bool,
}

/// Clip name, or a 1-based placeholder for unnamed clips.
pub fn control_label(clip: &AnimationClip) -> String {
    if clip.name.is_empty() {
        format!("Animation {}", clip.index + 1)
    } else {
        clip.name.clone()
    }
}

pub fn controls_for(
    clips: &[AnimationClip],
    state: PlaybackState,
    limit: usize,
) -> Vec<ControlEntry> {
    clips
        .iter()
        .take(limit)
        .map(|clip| ControlEntry {
            index: clip.index,
            label: control_label(clip),
            disabled: state.active_index() == Some(clip.index),
        })
        .collect()
}
