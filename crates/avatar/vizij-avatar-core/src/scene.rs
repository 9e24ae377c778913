//! The single-model scene drawn by a render context.

use serde::{Deserialize, Serialize};

use crate::config::RenderSettings;

/// Platform-side identifier of a loaded model root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelNode(pub String);

impl ModelNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Placeholder box shown when no asset is configured or loading failed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallbackGeometry {
    pub size: f32,
    pub color: u32,
}

impl FallbackGeometry {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            size: settings.fallback_size,
            color: settings.fallback_color,
        }
    }
}

/// Clip and local time a backend should sample when skinning the model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipPose {
    pub index: usize,
    pub time: f32,
}

/// What currently occupies the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneRoot {
    Empty,
    Fallback(FallbackGeometry),
    Model {
        node: ModelNode,
        #[serde(default)]
        pose: Option<ClipPose>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub background: u32,
    root: SceneRoot,
}

impl Scene {
    pub fn new(background: u32) -> Self {
        Self {
            background,
            root: SceneRoot::Empty,
        }
    }

    #[inline]
    pub fn root(&self) -> &SceneRoot {
        &self.root
    }

    /// Replace whatever is in the scene with the loaded model root.
    pub fn set_model(&mut self, node: ModelNode) {
        self.root = SceneRoot::Model { node, pose: None };
    }

    pub fn set_fallback(&mut self, geometry: FallbackGeometry) {
        self.root = SceneRoot::Fallback(geometry);
    }

    pub fn clear(&mut self) {
        self.root = SceneRoot::Empty;
    }

    /// Update the pose sampled on the model root; ignored for other roots.
    pub fn set_pose(&mut self, next: Option<ClipPose>) {
        if let SceneRoot::Model { pose, .. } = &mut self.root {
            *pose = next;
        }
    }

    pub fn model(&self) -> Option<&ModelNode> {
        match &self.root {
            SceneRoot::Model { node, .. } => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn has_fallback(&self) -> bool {
        matches!(self.root, SceneRoot::Fallback(_))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.root, SceneRoot::Empty)
    }
}
