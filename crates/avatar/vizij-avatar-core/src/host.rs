//! SceneHost: owns the live render context, issues asset requests and drives
//! the per-frame loop.
//!
//! Everything runs on one thread. The platform calls back into the host for
//! two things only: frame callbacks ([`SceneHost::on_frame`]) and asset
//! results ([`SceneHost::complete_asset`]). Both are checked against the live
//! state before they touch anything:
//! - a frame callback must carry the handle the host is waiting for;
//! - an asset result must carry the live generation and arrive only once.

use log::{debug, error, info};

use crate::asset::{AssetResult, AssetSource, AssetTicket};
use crate::clock::FrameClock;
use crate::config::{validate_size, RenderSettings, StageConfig};
use crate::controls::ControlEntry;
use crate::director::{AnimationDirector, PlaybackState};
use crate::error::StageError;
use crate::events::StageEvent;
use crate::ids::{FrameHandle, Generation, GenerationCounter};
use crate::render::{GraphicsBackend, RenderContext, RenderSurface};
use crate::scene::{FallbackGeometry, Scene};

/// Platform per-frame callback mechanism (e.g. `requestAnimationFrame`).
pub trait FrameScheduler {
    /// Schedule the next callback. Handles must be unique per scheduler.
    fn request_frame(&mut self) -> Result<FrameHandle, StageError>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Everything tied to one configuration.
#[derive(Debug)]
struct LiveStage<S: RenderSurface> {
    config: StageConfig,
    context: RenderContext<S>,
    generation: Generation,
    pending_frame: Option<FrameHandle>,
    asset_settled: bool,
}

pub struct SceneHost<B: GraphicsBackend, A: AssetSource, F: FrameScheduler> {
    settings: RenderSettings,
    backend: B,
    assets: A,
    scheduler: F,
    generations: GenerationCounter,
    live: Option<LiveStage<B::Surface>>,
    scene: Scene,
    director: AnimationDirector,
    clock: FrameClock,
}

impl<B: GraphicsBackend, A: AssetSource, F: FrameScheduler> SceneHost<B, A, F> {
    pub fn new(backend: B, assets: A, scheduler: F) -> Self {
        Self::with_settings(backend, assets, scheduler, RenderSettings::default())
    }

    pub fn with_settings(backend: B, assets: A, scheduler: F, settings: RenderSettings) -> Self {
        Self {
            scene: Scene::new(settings.background),
            settings,
            backend,
            assets,
            scheduler,
            generations: GenerationCounter::new(),
            live: None,
            director: AnimationDirector::new(),
            clock: FrameClock::new(),
        }
    }

    /// Register a listener for `animation-start` / `animation-end`.
    pub fn subscribe(&mut self, listener: impl FnMut(&StageEvent) + 'static) {
        self.director.subscribe(listener);
    }

    /// Tear down whatever is live and rebuild for `config`.
    ///
    /// Invalid sizes are rejected before anything is touched. A graphics or
    /// scheduler failure leaves the host with nothing live and is returned as-is.
    pub fn configure(&mut self, config: StageConfig) -> Result<(), StageError> {
        config.validate()?;
        self.teardown();

        let generation = self.generations.advance();
        let mut context = RenderContext::create(
            &mut self.backend,
            config.width,
            config.height,
            &self.settings,
        )?;
        let first_frame = match self.scheduler.request_frame() {
            Ok(handle) => handle,
            Err(err) => {
                error!("configure generation {:?} aborted: {err}", generation);
                context.dispose();
                return Err(err);
            }
        };
        debug!(
            "configure generation {:?}: {}x{} url={:?}",
            generation, config.width, config.height, config.asset_url
        );

        let request = config.has_asset().then(|| AssetTicket {
            generation,
            url: config.asset_url.clone(),
        });
        self.live = Some(LiveStage {
            config,
            context,
            generation,
            pending_frame: Some(first_frame),
            asset_settled: request.is_none(),
        });

        match request {
            Some(ticket) => self.assets.request(ticket),
            None => self
                .scene
                .set_fallback(FallbackGeometry::from_settings(&self.settings)),
        }
        Ok(())
    }

    /// Apply a new configuration with the least work: a changed asset URL (or
    /// nothing live) rebuilds, a size-only change resizes in place.
    pub fn update_config(&mut self, config: StageConfig) -> Result<(), StageError> {
        config.validate()?;
        let same_asset = match &self.live {
            Some(live) if live.config == config => return Ok(()),
            Some(live) => live.config.asset_url == config.asset_url,
            None => false,
        };
        if same_asset {
            self.resize(config.width, config.height)
        } else {
            self.configure(config)
        }
    }

    /// Forward a size change to the live context. No rebuild, no reload.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), StageError> {
        validate_size(width, height)?;
        let Some(live) = self.live.as_mut() else {
            debug!("resize({width}x{height}) with nothing live");
            return Ok(());
        };
        live.context.resize(width, height)?;
        live.config.width = width;
        live.config.height = height;
        Ok(())
    }

    /// Deliver the result for `generation`. Returns whether it was applied.
    ///
    /// Results for a superseded or disposed generation, and repeat results for
    /// the live one, are dropped without side effects.
    pub fn complete_asset(&mut self, generation: Generation, result: AssetResult) -> bool {
        let Some(live) = self.live.as_mut() else {
            debug!("asset result for {:?} dropped: host disposed", generation);
            return false;
        };
        if live.generation != generation || live.asset_settled {
            debug!(
                "asset result for {:?} dropped: live generation is {:?}",
                generation, live.generation
            );
            return false;
        }
        live.asset_settled = true;

        match result {
            Ok(asset) => {
                info!(
                    "loaded {} with {} clip(s)",
                    live.config.asset_url,
                    asset.clips.len()
                );
                self.scene.set_model(asset.root.clone());
                self.director.seed(&asset);
            }
            Err(err) => {
                error!("failed to load {}: {err}", live.config.asset_url);
                self.director.clear();
                self.scene
                    .set_fallback(FallbackGeometry::from_settings(&self.settings));
            }
        }
        true
    }

    /// One frame-loop tick: advance playback, draw, reschedule.
    ///
    /// Callbacks for anything but the pending handle are ignored, which covers
    /// callbacks that fire after `dispose` or after a reconfigure cancelled them.
    /// If the next frame cannot be scheduled the loop stops with nothing pending.
    pub fn on_frame(&mut self, handle: FrameHandle, now_seconds: f64) {
        let Some(live) = self.live.as_mut() else {
            debug!("frame {:?} ignored: host disposed", handle);
            return;
        };
        if live.pending_frame != Some(handle) {
            debug!("frame {:?} ignored: not the pending callback", handle);
            return;
        }
        live.pending_frame = None;

        let delta = self.clock.delta(now_seconds);
        self.director.advance(delta);
        self.scene.set_pose(self.director.pose());

        if let Err(err) = live.context.render_frame(&self.scene) {
            error!("frame {:?} not rendered: {err}", handle);
            return;
        }
        match self.scheduler.request_frame() {
            Ok(next) => live.pending_frame = Some(next),
            Err(err) => error!("frame loop stopped after {:?}: {err}", handle),
        }
    }

    /// Play clip `index`. Invalid indices are ignored.
    pub fn play(&mut self, index: usize) -> bool {
        self.director.play(index)
    }

    pub fn stop(&mut self) {
        self.director.stop();
    }

    /// Cancel the pending frame, release the context and invalidate the
    /// generation so in-flight loads are dropped on arrival. Idempotent.
    pub fn dispose(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut live) = self.live.take() {
            debug!("tearing down generation {:?}", live.generation);
            if let Some(handle) = live.pending_frame.take() {
                self.scheduler.cancel_frame(handle);
            }
            live.context.dispose();
        }
        self.director.clear();
        self.scene.clear();
        self.clock.reset();
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn config(&self) -> Option<&StageConfig> {
        self.live.as_ref().map(|live| &live.config)
    }

    pub fn generation(&self) -> Option<Generation> {
        self.live.as_ref().map(|live| live.generation)
    }

    pub fn context(&self) -> Option<&RenderContext<B::Surface>> {
        self.live.as_ref().map(|live| &live.context)
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.live.as_ref().and_then(|live| live.pending_frame)
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn director(&self) -> &AnimationDirector {
        &self.director
    }

    #[inline]
    pub fn playback_state(&self) -> PlaybackState {
        self.director.state()
    }

    #[inline]
    pub fn active_index(&self) -> Option<usize> {
        self.director.active_index()
    }

    pub fn controls(&self) -> Vec<ControlEntry> {
        self.director.controls(self.settings.max_controls)
    }

    #[inline]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn assets(&self) -> &A {
        &self.assets
    }

    #[inline]
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    #[inline]
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}

impl<B: GraphicsBackend, A: AssetSource, F: FrameScheduler> Drop for SceneHost<B, A, F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
