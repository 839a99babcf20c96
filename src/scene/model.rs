//! Model loader boundary.
//!
//! Loading is modelled as a pollable state so the stage can keep rendering
//! while assets stream in.

use crate::animation::AnimationClip;
use crate::error::SkitterError;
use crate::locomotion::RigDescriptor;

/// What a finished load hands over: the rig plus its named clips.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    /// The resolved skeleton.
    pub rig: RigDescriptor,
    /// Animation clips shipped with the model; may be empty.
    pub clips: Vec<AnimationClip>,
}

/// Progress of one model load.
#[derive(Debug)]
pub enum LoadState {
    /// Still loading; poll again next frame.
    Pending,
    /// Loaded; the rig is ready to animate.
    Ready(LoadedModel),
    /// Loading failed for good.
    Failed(SkitterError),
}

/// A model being loaded by the host.
pub trait ModelSource {
    /// Current state. Not called again after `Ready` or `Failed`.
    fn poll(&mut self) -> LoadState;
}

/// Source that is ready immediately.
#[derive(Debug, Clone)]
pub struct ReadyModel {
    model: LoadedModel,
}

impl ReadyModel {
    /// Wrap an already-resolved rig with no clips.
    #[must_use]
    pub fn new(rig: RigDescriptor) -> Self {
        Self {
            model: LoadedModel {
                rig,
                clips: Vec::new(),
            },
        }
    }

    /// Ship `clips` with the rig.
    #[must_use]
    pub fn with_clips(mut self, clips: Vec<AnimationClip>) -> Self {
        self.model.clips = clips;
        self
    }
}

impl ModelSource for ReadyModel {
    fn poll(&mut self) -> LoadState {
        LoadState::Ready(self.model.clone())
    }
}

/// Source that always fails.
#[derive(Debug, Clone)]
pub struct FailingModel {
    reason: String,
}

impl FailingModel {
    /// Fail with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ModelSource for FailingModel {
    fn poll(&mut self) -> LoadState {
        LoadState::Failed(SkitterError::AssetLoad(self.reason.clone()))
    }
}

/// Wraps another source and reports `Pending` for a fixed number of polls
/// first, like a download in flight.
pub struct DelayedModel {
    remaining: u32,
    inner: Box<dyn ModelSource>,
}

impl DelayedModel {
    /// Delay `inner` by `polls` polls.
    #[must_use]
    pub fn new(polls: u32, inner: Box<dyn ModelSource>) -> Self {
        Self {
            remaining: polls,
            inner,
        }
    }
}

impl ModelSource for DelayedModel {
    fn poll(&mut self) -> LoadState {
        if self.remaining > 0 {
            self.remaining -= 1;
            return LoadState::Pending;
        }
        self.inner.poll()
    }
}

impl std::fmt::Debug for DelayedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedModel")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::procedural_spider;

    #[test]
    fn delayed_model_waits_then_delegates() {
        let inner = ReadyModel::new(procedural_spider(1, 1.0));
        let mut model = DelayedModel::new(2, Box::new(inner));
        assert!(matches!(model.poll(), LoadState::Pending));
        assert!(matches!(model.poll(), LoadState::Pending));
        assert!(matches!(model.poll(), LoadState::Ready(_)));
    }

    #[test]
    fn ready_model_carries_its_clips() {
        let clip = AnimationClip::new("idle", 1.0).unwrap();
        let mut model = ReadyModel::new(procedural_spider(1, 1.0))
            .with_clips(vec![clip.clone()]);
        assert!(matches!(
            model.poll(),
            LoadState::Ready(LoadedModel { ref clips, .. })
                if clips.len() == 1 && clips[0] == clip
        ));
    }

    #[test]
    fn failing_model_reports_asset_error() {
        let mut model = FailingModel::new("404");
        assert!(matches!(
            model.poll(),
            LoadState::Failed(SkitterError::AssetLoad(ref r)) if r == "404"
        ));
    }
}
