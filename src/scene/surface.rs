//! Renderer boundary.

use super::camera::Camera;
use super::CreatureId;
use crate::animation::PropertyTable;
use crate::error::SkitterError;
use crate::locomotion::Skeleton;

/// Everything a renderer needs to draw one frame.
#[derive(Debug)]
pub struct RenderFrame<'a> {
    /// View to draw from.
    pub camera: &'a Camera,
    /// Posed skeleton of every ready creature.
    pub creatures: Vec<(CreatureId, &'a Skeleton)>,
    /// Current tweened property values (prop scales, light intensities).
    pub properties: &'a PropertyTable,
}

/// Where frames go. Implemented by the host's GPU renderer.
pub trait RenderSurface {
    /// Acquire whatever the renderer needs.
    fn init(&mut self) -> Result<(), SkitterError>;

    /// The viewport changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame.
    fn render_frame(&mut self, frame: &RenderFrame<'_>);

    /// Release renderer resources.
    fn dispose(&mut self);
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn init(&mut self) -> Result<(), SkitterError> {
        (**self).init()
    }

    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height);
    }

    fn render_frame(&mut self, frame: &RenderFrame<'_>) {
        (**self).render_frame(frame);
    }

    fn dispose(&mut self) {
        (**self).dispose();
    }
}

/// Surface that draws nothing and just records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    frames: u64,
    last_creature_count: usize,
    initialized: bool,
    disposals: u32,
}

impl HeadlessSurface {
    /// Fresh surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Creatures drawn in the latest frame.
    #[must_use]
    pub fn last_creature_count(&self) -> usize {
        self.last_creature_count
    }

    /// Last viewport size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether `init` has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// How many times `dispose` was called.
    #[must_use]
    pub fn disposals(&self) -> u32 {
        self.disposals
    }
}

impl RenderSurface for HeadlessSurface {
    fn init(&mut self) -> Result<(), SkitterError> {
        self.initialized = true;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn render_frame(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        self.last_creature_count = frame.creatures.len();
    }

    fn dispose(&mut self) {
        self.initialized = false;
        self.disposals += 1;
    }
}
