//! Vizij Avatar Core (engine-agnostic)
//!
//! Renders one animated model into a host surface and plays its clips one at a
//! time. The crate owns the lifecycle rules; graphics, asset loading and frame
//! scheduling are supplied by the embedding platform through traits:
//!
//! - [`GraphicsBackend`] / [`RenderSurface`]: surface allocation and drawing
//! - [`AssetSource`]: asynchronous model loading, answered via [`SceneHost::complete_asset`]
//! - [`FrameScheduler`]: per-frame callbacks, answered via [`SceneHost::on_frame`]
//!
//! [`headless`] provides in-process implementations of all three.

pub mod asset;
pub mod clock;
pub mod config;
pub mod controls;
pub mod director;
pub mod error;
pub mod events;
pub mod headless;
pub mod host;
pub mod ids;
pub mod render;
pub mod scene;

// Re-exports for consumers (adapters)
pub use asset::{
    AnimationClip, AssetDescriptor, AssetResult, AssetSource, AssetTicket, ClipDescriptor,
    LoadedAsset,
};
pub use clock::FrameClock;
pub use config::{RenderSettings, StageConfig};
pub use controls::ControlEntry;
pub use director::{AnimationDirector, PlaybackState};
pub use error::{AssetError, StageError};
pub use events::{EventEmitter, EventRecorder, StageEvent};
pub use host::{FrameScheduler, SceneHost};
pub use ids::{FrameHandle, Generation};
pub use render::{
    Camera, DirectionalLight, FrameSnapshot, GraphicsBackend, RenderContext, RenderSurface,
};
pub use scene::{ClipPose, FallbackGeometry, ModelNode, Scene, SceneRoot};
