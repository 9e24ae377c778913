//! Render context: one drawable surface, one perspective camera, one light.
//!
//! Graphics APIs plug in through [`GraphicsBackend`] (surface factory) and
//! [`RenderSurface`] (the allocated surface). A [`RenderContext`] owns its
//! surface and releases it exactly once, on `dispose` or on drop.

use nalgebra::{Matrix4, Perspective3, Point3};
use serde::Serialize;

use crate::config::{validate_size, RenderSettings};
use crate::error::StageError;
use crate::scene::Scene;

pub trait GraphicsBackend {
    type Surface: RenderSurface;

    /// Allocate a `width`×`height` surface. An error here is fatal for the widget.
    fn create_surface(&mut self, width: u32, height: u32) -> Result<Self::Surface, StageError>;
}

pub trait RenderSurface {
    fn resize(&mut self, width: u32, height: u32);
    fn draw(&mut self, frame: &FrameSnapshot<'_>);
    /// Free GPU-side resources. Called once.
    fn release(&mut self);
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Camera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Camera {
    pub fn perspective(settings: &RenderSettings, width: u32, height: u32) -> Self {
        Self {
            fov_y_degrees: settings.fov_y_degrees,
            aspect: aspect_ratio(width, height),
            near: settings.near,
            far: settings.far,
            position: settings.camera_position,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn projection(&self) -> Perspective3<f32> {
        Perspective3::new(
            self.aspect,
            self.fov_y_degrees.to_radians(),
            self.near,
            self.far,
        )
    }

    #[inline]
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection().to_homogeneous()
    }

    #[inline]
    pub fn eye(&self) -> Point3<f32> {
        Point3::from(self.position)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height as f32
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DirectionalLight {
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl DirectionalLight {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            color: settings.light_color,
            intensity: settings.light_intensity,
            position: settings.light_position,
        }
    }
}

/// Everything a surface needs to draw one frame.
#[derive(Debug, Serialize)]
pub struct FrameSnapshot<'a> {
    pub width: u32,
    pub height: u32,
    /// Column-major projection of `camera` at the current aspect.
    pub projection: [[f32; 4]; 4],
    pub camera: &'a Camera,
    pub light: &'a DirectionalLight,
    pub scene: &'a Scene,
}

#[derive(Debug)]
pub struct RenderContext<S: RenderSurface> {
    surface: S,
    camera: Camera,
    light: DirectionalLight,
    width: u32,
    height: u32,
    live: bool,
}

impl<S: RenderSurface> RenderContext<S> {
    pub fn create<B>(
        backend: &mut B,
        width: u32,
        height: u32,
        settings: &RenderSettings,
    ) -> Result<Self, StageError>
    where
        B: GraphicsBackend<Surface = S>,
    {
        validate_size(width, height)?;
        let surface = backend.create_surface(width, height)?;
        Ok(Self {
            surface,
            camera: Camera::perspective(settings, width, height),
            light: DirectionalLight::from_settings(settings),
            width,
            height,
            live: true,
        })
    }

    /// Update surface size and camera aspect in place. Repeating the current
    /// size does nothing.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), StageError> {
        if !self.live {
            return Err(StageError::Disposed { operation: "resize" });
        }
        validate_size(width, height)?;
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.surface.resize(width, height);
        self.camera.set_aspect(width, height);
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn render_frame(&mut self, scene: &Scene) -> Result<(), StageError> {
        if !self.live {
            return Err(StageError::Disposed {
                operation: "render_frame",
            });
        }
        let frame = FrameSnapshot {
            width: self.width,
            height: self.height,
            projection: self.camera.projection_matrix().into(),
            camera: &self.camera,
            light: &self.light,
            scene,
        };
        self.surface.draw(&frame);
        Ok(())
    }

    pub fn dispose(&mut self) {
        if self.live {
            self.live = false;
            self.surface.release();
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: RenderSurface> Drop for RenderContext<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
