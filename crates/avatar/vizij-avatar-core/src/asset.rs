//! Asset source contract and loaded-asset model.
//!
//! The platform owns fetching and parsing. The host hands an [`AssetTicket`] to
//! an [`AssetSource`]; the platform later returns it together with the result
//! through `SceneHost::complete_asset`. The ticket's generation decides whether
//! the result is still wanted.

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::ids::Generation;
use crate::scene::ModelNode;

/// A named, finite clip. `index` is its position in the asset's clip list and
/// is the public identifier used by `play`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub index: usize,
    pub duration_seconds: f32,
}

/// Result of a successful load: one model root and its ordered clips.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedAsset {
    pub root: ModelNode,
    pub clips: Vec<AnimationClip>,
}

impl LoadedAsset {
    /// Build from `(name, duration)` pairs; indices follow iteration order.
    pub fn new<I, S>(root: ModelNode, clips: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let clips = clips
            .into_iter()
            .enumerate()
            .map(|(index, (name, duration))| AnimationClip {
                name: name.into(),
                index,
                duration_seconds: sanitize_duration(duration),
            })
            .collect();
        Self { root, clips }
    }
}

fn sanitize_duration(duration: f32) -> f32 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

/// Serializable clip list a platform loader reports after parsing a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub root: String,
    #[serde(default)]
    pub clips: Vec<ClipDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "duration", alias = "durationSeconds")]
    pub duration_seconds: f32,
}

impl AssetDescriptor {
    pub fn into_loaded(self) -> LoadedAsset {
        LoadedAsset::new(
            ModelNode(self.root),
            self.clips.into_iter().map(|c| (c.name, c.duration_seconds)),
        )
    }
}

/// Identifies one asset request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTicket {
    pub generation: Generation,
    pub url: String,
}

pub type AssetResult = Result<LoadedAsset, AssetError>;

/// Starts asynchronous loads. Implementations must not retry and must deliver
/// at most one result per ticket.
pub trait AssetSource {
    fn request(&mut self, ticket: AssetTicket);
}
