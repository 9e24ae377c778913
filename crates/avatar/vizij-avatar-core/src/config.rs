//! Stage configuration and fixed render settings.

use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// Inbound configuration from the embedding caller. Any change to the asset
/// URL rebuilds the render context and reloads the asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    #[serde(alias = "assetUrl", alias = "glbUrl")]
    pub asset_url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            asset_url: String::new(),
            width: 400,
            height: 400,
        }
    }
}

impl StageConfig {
    pub fn new(asset_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            asset_url: asset_url.into(),
            width,
            height,
        }
    }

    /// Reject sizes that must never reach a render context.
    pub fn validate(&self) -> Result<(), StageError> {
        validate_size(self.width, self.height)
    }

    /// Whether an asset request should be issued; otherwise the fallback is shown.
    #[inline]
    pub fn has_asset(&self) -> bool {
        !self.asset_url.trim().is_empty()
    }
}

pub fn validate_size(width: u32, height: u32) -> Result<(), StageError> {
    if width == 0 || height == 0 {
        return Err(StageError::InvalidSize { width, height });
    }
    Ok(())
}

/// Fixed camera, light and placeholder parameters used by every render context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: [f32; 3],
    pub light_position: [f32; 3],
    pub light_color: u32,
    pub light_intensity: f32,
    pub background: u32,
    pub fallback_size: f32,
    pub fallback_color: u32,
    /// Upper bound on the number of clips offered to a control surface.
    pub max_controls: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
            camera_position: [0.0, 1.0, 3.0],
            light_position: [2.0, 2.0, 4.0],
            light_color: 0xffffff,
            light_intensity: 1.0,
            background: 0x222222,
            fallback_size: 1.0,
            fallback_color: 0x55aaff,
            max_controls: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(StageConfig::new("", 400, 400).validate().is_ok());
        assert_eq!(
            StageConfig::new("", 0, 400).validate(),
            Err(StageError::InvalidSize {
                width: 0,
                height: 400
            })
        );
        assert!(validate_size(10, 0).is_err());
    }

    #[test]
    fn accepts_widget_attribute_names() {
        let cfg: StageConfig =
            serde_json::from_str(r#"{ "glbUrl": "robot.glb", "width": 320 }"#).unwrap();
        assert_eq!(cfg, StageConfig::new("robot.glb", 320, 400));

        let cfg: StageConfig = serde_json::from_str(r#"{ "assetUrl": "  " }"#).unwrap();
        assert!(!cfg.has_asset());
    }
}
