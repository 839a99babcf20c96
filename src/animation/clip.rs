//! Named skeletal clips and a small player that cross-fades between them.
//!
//! Clips are keyframed bone offsets in the rig's bind frame. The player
//! keeps at most two actions alive (the one fading out and the one fading
//! in) and stores the cross-fade weight as a tweened property, so fades run
//! on the same [`Tweener`] as every other cosmetic animation.

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::tween::{PropertyTable, Tween, TweenHandle, TweenTarget, Tweener};
use crate::error::SkitterError;
use crate::locomotion::Skeleton;

/// Property holding the weight of the clip fading in, in `[0, 1]`.
pub const CLIP_WEIGHT: &str = "clip_weight";

/// Clip the player falls back to after a one-shot action.
pub const IDLE_CLIP: &str = "idle";

/// Cross-fade used when a one-shot action hands back to idle.
pub const RETURN_TO_IDLE_FADE: f32 = 0.25;

/// Keyframed offset track for one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTrack {
    /// Name of the animated bone.
    pub bone: String,
    keys: Vec<(f32, Vec3)>,
}

impl BoneTrack {
    /// Track from `(time, offset)` keys in ascending time order.
    pub fn new(
        bone: impl Into<String>,
        keys: Vec<(f32, Vec3)>,
    ) -> Result<Self, SkitterError> {
        let bone = bone.into();
        if keys.is_empty() {
            return Err(SkitterError::AssetLoad(format!(
                "track for '{bone}' has no keys"
            )));
        }
        let ordered = keys.iter().all(|(t, _)| t.is_finite())
            && keys.windows(2).all(|w| w[0].0 <= w[1].0);
        if !ordered {
            return Err(SkitterError::AssetLoad(format!(
                "track for '{bone}' has unordered key times"
            )));
        }
        Ok(Self { bone, keys })
    }

    /// Offset at `time`, linearly interpolated and held past either end.
    #[must_use]
    pub fn sample(&self, time: f32) -> Vec3 {
        let Some(&(first_time, first)) = self.keys.first() else {
            return Vec3::ZERO;
        };
        if time <= first_time {
            return first;
        }
        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if time < t1 {
                let span = t1 - t0;
                return if span > 0.0 {
                    v0.lerp(v1, (time - t0) / span)
                } else {
                    v1
                };
            }
        }
        self.keys.last().map_or(Vec3::ZERO, |&(_, v)| v)
    }
}

/// A named animation shipped with a skeletal model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name as authored (`idle`, `jump`, ...).
    pub name: String,
    /// Length in seconds.
    pub duration: f32,
    /// Per-bone offset tracks.
    pub tracks: Vec<BoneTrack>,
}

impl AnimationClip {
    /// Empty clip lasting `duration` seconds.
    pub fn new(
        name: impl Into<String>,
        duration: f32,
    ) -> Result<Self, SkitterError> {
        let name = name.into();
        if !duration.is_finite() || duration < 0.0 {
            return Err(SkitterError::AssetLoad(format!(
                "clip '{name}' has invalid duration {duration}"
            )));
        }
        Ok(Self {
            name,
            duration,
            tracks: Vec::new(),
        })
    }

    /// Add a bone track.
    #[must_use]
    pub fn with_track(mut self, track: BoneTrack) -> Self {
        self.tracks.push(track);
        self
    }
}

/// How an action behaves when it reaches the end of its clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipLoop {
    /// Play once and hold the last frame.
    Once,
    /// Wrap around forever.
    Repeat,
}

/// One clip being played.
#[derive(Debug, Clone, Copy)]
struct ClipAction {
    clip: usize,
    time: f32,
    mode: ClipLoop,
    finished: bool,
}

impl ClipAction {
    fn new(clip: usize, mode: ClipLoop) -> Self {
        Self {
            clip,
            time: 0.0,
            mode,
            finished: false,
        }
    }

    /// Returns `true` on the frame a one-shot action reaches its end.
    fn advance(&mut self, dt: f32, clip: &AnimationClip) -> bool {
        if self.finished {
            return false;
        }
        self.time += dt;
        match self.mode {
            ClipLoop::Repeat => {
                if clip.duration > 0.0 {
                    self.time = self.time.rem_euclid(clip.duration);
                }
                false
            }
            ClipLoop::Once => {
                if self.time < clip.duration {
                    return false;
                }
                self.time = clip.duration;
                self.finished = true;
                true
            }
        }
    }
}

/// Plays a creature's clips with cross-fades.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    clips: Vec<AnimationClip>,
    weight_target: TweenTarget,
    current: Option<ClipAction>,
    previous: Option<ClipAction>,
    fade: Option<TweenHandle>,
    return_to_idle: bool,
}

impl ClipPlayer {
    /// Player over `clips`, keeping its fade weight on `weight_target`.
    #[must_use]
    pub fn new(clips: Vec<AnimationClip>, weight_target: TweenTarget) -> Self {
        Self {
            clips,
            weight_target,
            current: None,
            previous: None,
            fade: None,
            return_to_idle: false,
        }
    }

    /// Tween target the fade weight lives on.
    #[must_use]
    pub fn weight_target(&self) -> TweenTarget {
        self.weight_target
    }

    /// Names of every clip, in load order.
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }

    /// Whether a clip called `name` exists.
    #[must_use]
    pub fn has_clip(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name == name)
    }

    /// Name of the clip fading in (or playing).
    #[must_use]
    pub fn current_clip(&self) -> Option<&str> {
        self.current.map(|a| self.clips[a.clip].name.as_str())
    }

    /// Name of the clip still fading out, if a fade is running.
    #[must_use]
    pub fn previous_clip(&self) -> Option<&str> {
        self.previous.map(|a| self.clips[a.clip].name.as_str())
    }

    /// Playback time of the current clip.
    #[must_use]
    pub fn time(&self) -> Option<f32> {
        self.current.map(|a| a.time)
    }

    /// Whether a one-shot action has played to its end and is holding.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current.is_some_and(|a| a.finished)
    }

    /// Weight of the current clip; the previous clip gets the rest.
    #[must_use]
    pub fn weight(&self, properties: &PropertyTable) -> f32 {
        properties
            .get(self.weight_target, CLIP_WEIGHT)
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    /// Restart `name` from its first frame, fading it in over `fade`
    /// seconds while the current clip fades out. A zero fade cuts.
    pub fn fade_to(
        &mut self,
        name: &str,
        fade: f32,
        mode: ClipLoop,
        tweens: &mut Tweener,
        properties: &mut PropertyTable,
    ) -> Result<(), SkitterError> {
        let Some(clip) = self.index_of(name) else {
            return Err(SkitterError::InvalidConfiguration(format!(
                "no clip named '{name}'"
            )));
        };
        if let Some(handle) = self.fade.take() {
            let _ = tweens.remove(handle);
        }
        self.return_to_idle = false;

        let action = ClipAction::new(clip, mode);
        if fade > 0.0 {
            self.previous = self.current.replace(action);
            properties.set(self.weight_target, CLIP_WEIGHT, 0.0);
            self.fade = Some(tweens.add(
                Tween::new(self.weight_target, CLIP_WEIGHT, 1.0, fade)
                    .starting_at(0.0),
            ));
        } else {
            self.previous = None;
            self.current = Some(action);
            properties.set(self.weight_target, CLIP_WEIGHT, 1.0);
        }
        Ok(())
    }

    /// Loop `name` forever.
    pub fn play(
        &mut self,
        name: &str,
        fade: f32,
        tweens: &mut Tweener,
        properties: &mut PropertyTable,
    ) -> Result<(), SkitterError> {
        self.fade_to(name, fade, ClipLoop::Repeat, tweens, properties)
    }

    /// Cut to `name`, play it once, then fade back to [`IDLE_CLIP`] if the
    /// model has one.
    pub fn play_once(
        &mut self,
        name: &str,
        tweens: &mut Tweener,
        properties: &mut PropertyTable,
    ) -> Result<(), SkitterError> {
        self.fade_to(name, 0.0, ClipLoop::Once, tweens, properties)?;
        self.return_to_idle = name != IDLE_CLIP && self.has_clip(IDLE_CLIP);
        Ok(())
    }

    /// Stop every action and cancel a running fade.
    pub fn stop(&mut self, tweens: &mut Tweener) {
        if let Some(handle) = self.fade.take() {
            let _ = tweens.remove(handle);
        }
        self.current = None;
        self.previous = None;
        self.return_to_idle = false;
    }

    /// Advance playback by `dt`. Returns the name of a one-shot clip that
    /// finished this frame.
    pub fn update(
        &mut self,
        dt: f32,
        tweens: &mut Tweener,
        properties: &mut PropertyTable,
    ) -> Option<String> {
        let dt = dt.max(0.0);
        if let Some(previous) = self.previous.as_mut() {
            let _ = previous.advance(dt, &self.clips[previous.clip]);
        }
        if self.fade.is_some_and(|handle| !tweens.is_active(handle)) {
            self.fade = None;
            self.previous = None;
        }

        let current = self.current.as_mut()?;
        if !current.advance(dt, &self.clips[current.clip]) {
            return None;
        }
        let finished = self.clips[current.clip].name.clone();
        if self.return_to_idle {
            self.return_to_idle = false;
            let idle =
                self.play(IDLE_CLIP, RETURN_TO_IDLE_FADE, tweens, properties);
            if let Err(e) = idle {
                log::warn!("could not return to idle: {e}");
            }
        }
        Some(finished)
    }

    /// Blended bone offsets for `skeleton`, in the rig's bind frame,
    /// ordered by bone index.
    ///
    /// Tracks naming bones the skeleton lacks are skipped.
    #[must_use]
    pub fn blended_offsets(
        &self,
        skeleton: &Skeleton,
        properties: &PropertyTable,
    ) -> Vec<(usize, Vec3)> {
        let weight = self.weight(properties);
        let mut sums = FxHashMap::default();
        if let Some(current) = &self.current {
            self.accumulate(current, weight, skeleton, &mut sums);
        }
        if let Some(previous) = &self.previous {
            self.accumulate(previous, 1.0 - weight, skeleton, &mut sums);
        }
        let mut offsets: Vec<_> = sums.into_iter().collect();
        offsets.sort_unstable_by_key(|(bone, _)| *bone);
        offsets
    }

    fn accumulate(
        &self,
        action: &ClipAction,
        weight: f32,
        skeleton: &Skeleton,
        sums: &mut FxHashMap<usize, Vec3>,
    ) {
        for track in &self.clips[action.clip].tracks {
            if let Some(bone) = skeleton.find(&track.bone) {
                *sums.entry(bone).or_insert(Vec3::ZERO) +=
                    track.sample(action.time) * weight;
            }
        }
    }
}
