//! In-process platform pieces: a recording graphics backend, a manually
//! pumped frame scheduler and a queued asset source.
//!
//! Used for server-side snapshots, benches and tests, where there is no real
//! GPU or browser event loop. Frames and asset results are delivered by
//! whoever drives the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::asset::{AssetSource, AssetTicket};
use crate::error::StageError;
use crate::host::FrameScheduler;
use crate::ids::FrameHandle;
use crate::render::{FrameSnapshot, GraphicsBackend, RenderSurface};
use crate::scene::{ClipPose, SceneRoot};

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub surface: u64,
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
    pub projection: [[f32; 4]; 4],
    pub root: SceneRoot,
}

impl DrawRecord {
    pub fn pose(&self) -> Option<ClipPose> {
        match &self.root {
            SceneRoot::Model { pose, .. } => *pose,
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadlessStats {
    pub surfaces_created: usize,
    pub frames_drawn: usize,
    pub surfaces_released: usize,
    pub resizes: Vec<(u32, u32)>,
    pub draws: Vec<DrawRecord>,
}

impl HeadlessStats {
    #[inline]
    pub fn live_surfaces(&self) -> usize {
        self.surfaces_created - self.surfaces_released
    }

    pub fn last_draw(&self) -> Option<&DrawRecord> {
        self.draws.last()
    }
}

/// Graphics backend that records what it is asked to do.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: Rc<RefCell<HeadlessStats>>,
    next_surface: u64,
    fail_next: Option<String>,
    skip_draw_log: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count frames without keeping a [`DrawRecord`] per draw.
    pub fn counting_only(mut self) -> Self {
        self.skip_draw_log = true;
        self
    }

    /// Make the next `create_surface` fail with a graphics error.
    pub fn fail_next_create(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    pub fn stats(&self) -> HeadlessStats {
        self.stats.borrow().clone()
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Surface = HeadlessSurface;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<HeadlessSurface, StageError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(StageError::graphics(reason));
        }
        let id = self.next_surface;
        self.next_surface += 1;
        self.stats.borrow_mut().surfaces_created += 1;
        Ok(HeadlessSurface {
            id,
            width,
            height,
            released: false,
            log_draws: !self.skip_draw_log,
            stats: Rc::clone(&self.stats),
        })
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    id: u64,
    width: u32,
    height: u32,
    released: bool,
    log_draws: bool,
    stats: Rc<RefCell<HeadlessStats>>,
}

impl HeadlessSurface {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.stats.borrow_mut().resizes.push((width, height));
    }

    fn draw(&mut self, frame: &FrameSnapshot<'_>) {
        let mut stats = self.stats.borrow_mut();
        stats.frames_drawn += 1;
        if !self.log_draws {
            return;
        }
        stats.draws.push(DrawRecord {
            surface: self.id,
            width: frame.width,
            height: frame.height,
            aspect: frame.camera.aspect,
            projection: frame.projection,
            root: frame.scene.root().clone(),
        });
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.borrow_mut().surfaces_released += 1;
        }
    }
}

/// Frame scheduler whose callbacks fire only when the driver takes them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    scheduled: Option<FrameHandle>,
    fail_next: Option<String>,
    pub requested: usize,
    pub cancelled: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The callback that would fire next, if any.
    #[inline]
    pub fn scheduled(&self) -> Option<FrameHandle> {
        self.scheduled
    }

    /// Make the next `request_frame` fail with a scheduler error.
    pub fn fail_next_request(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Pop the scheduled callback so the caller can deliver it.
    pub fn take_scheduled(&mut self) -> Option<FrameHandle> {
        self.scheduled.take()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, StageError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(StageError::scheduler(reason));
        }
        let handle = FrameHandle(self.next);
        self.next += 1;
        self.requested += 1;
        self.scheduled = Some(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.scheduled == Some(handle) {
            self.scheduled = None;
        }
        self.cancelled.push(handle);
    }
}

/// Asset source that queues tickets until the driver resolves them.
#[derive(Debug, Default)]
pub struct QueuedAssetSource {
    pending: VecDeque<AssetTicket>,
    pub issued: usize,
}

impl QueuedAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_next(&mut self) -> Option<AssetTicket> {
        self.pending.pop_front()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl AssetSource for QueuedAssetSource {
    fn request(&mut self, ticket: AssetTicket) {
        self.issued += 1;
        self.pending.push_back(ticket);
    }
}
