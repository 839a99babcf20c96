//! Frame-stepped property tweens.
//!
//! A [`Tweener`] holds every running tween and advances them once per frame
//! against a [`Tweenable`] sink. Tweens are addressed by [`TweenHandle`] and
//! grouped by [`TweenTarget`] so a whole object's tweens can be cancelled
//! at once. Completion is reported by handle from
//! [`Tweener::advance`], so follow-up work is scheduled by the caller
//! rather than through callbacks.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::util::easing::EasingFunction;

/// Identifies an animated object (a prop, a light, the camera...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenTarget(pub u32);

/// Identifies one scheduled tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(u64);

/// What a tween does once it reaches the end of its duration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Run once, then complete.
    #[default]
    Once,
    /// Jump back to the start and run again, forever.
    Loop,
    /// Run forward, then backward, forever.
    Alternate,
}

/// Receives tweened values.
pub trait Tweenable {
    /// Current value of `property` on `target`, if known.
    fn property(
        &self,
        target: TweenTarget,
        property: &'static str,
    ) -> Option<f32>;

    /// Write a tweened value.
    fn set_property(
        &mut self,
        target: TweenTarget,
        property: &'static str,
        value: f32,
    );
}

/// One property animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Object being animated.
    pub target: TweenTarget,
    /// Property name on the target.
    pub property: &'static str,
    /// Start value. `None` captures the sink's value when the tween starts.
    pub from: Option<f32>,
    /// End value.
    pub to: f32,
    /// Seconds per pass.
    pub duration: f32,
    /// Seconds to wait before the first pass.
    pub delay: f32,
    /// Curve applied to each pass.
    pub easing: EasingFunction,
    /// End-of-pass behaviour.
    pub repeat: Repeat,
    elapsed: f32,
}

impl Tween {
    /// Linear, undelayed, single-pass tween from the current value to `to`.
    #[must_use]
    pub fn new(
        target: TweenTarget,
        property: &'static str,
        to: f32,
        duration: f32,
    ) -> Self {
        Self {
            target,
            property,
            from: None,
            to,
            duration,
            delay: 0.0,
            easing: EasingFunction::Linear,
            repeat: Repeat::Once,
            elapsed: 0.0,
        }
    }

    /// Start from an explicit value instead of the current one.
    #[must_use]
    pub fn starting_at(mut self, value: f32) -> Self {
        self.from = Some(value);
        self
    }

    /// Wait `seconds` before starting.
    #[must_use]
    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    /// Use a different easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Set the end-of-pass behaviour.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Seconds since the tween was scheduled, delay included.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Eased progress through the current pass, or `None` while delayed.
    /// The flag is set once a single-pass tween is done.
    fn sample(&self) -> Option<(f32, bool)> {
        let local = self.elapsed - self.delay;
        if local < 0.0 {
            return None;
        }
        if self.duration <= 0.0 {
            return Some((self.easing.evaluate(1.0), true));
        }

        let passes = local / self.duration;
        let (t, done) = match self.repeat {
            Repeat::Once => (passes.min(1.0), passes >= 1.0),
            Repeat::Loop => (passes.fract(), false),
            Repeat::Alternate => {
                let t = passes.fract();
                if passes.floor() as u64 % 2 == 1 {
                    (1.0 - t, false)
                } else {
                    (t, false)
                }
            }
        };
        Some((self.easing.evaluate(t), done))
    }
}

/// Active tween list.
#[derive(Debug, Default)]
pub struct Tweener {
    tweens: Vec<(TweenHandle, Tween)>,
    /// Start values captured for tweens that had no explicit `from`.
    starts: FxHashMap<TweenHandle, f32>,
    next_id: u64,
}

impl Tweener {
    /// Empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a tween.
    pub fn add(&mut self, tween: Tween) -> TweenHandle {
        let handle = TweenHandle(self.next_id);
        self.next_id += 1;
        self.tweens.push((handle, tween));
        handle
    }

    /// Advance every tween by `dt` seconds, write values into `sink`, and
    /// return the handles that finished this frame.
    pub fn advance(
        &mut self,
        dt: f32,
        sink: &mut impl Tweenable,
    ) -> Vec<TweenHandle> {
        let dt = dt.max(0.0);
        let mut completed = Vec::new();

        for (handle, tween) in &mut self.tweens {
            tween.elapsed += dt;
            let Some((eased, done)) = tween.sample() else {
                continue;
            };

            let from = tween.from.unwrap_or_else(|| {
                *self.starts.entry(*handle).or_insert_with(|| {
                    sink.property(tween.target, tween.property)
                        .unwrap_or(tween.to)
                })
            });
            sink.set_property(
                tween.target,
                tween.property,
                from + (tween.to - from) * eased,
            );
            if done {
                completed.push(*handle);
            }
        }

        if !completed.is_empty() {
            self.tweens.retain(|(handle, _)| !completed.contains(handle));
            for handle in &completed {
                let _ = self.starts.remove(handle);
            }
        }
        completed
    }

    /// Cancel one tween. Returns whether it was still running.
    pub fn remove(&mut self, handle: TweenHandle) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|(h, _)| *h != handle);
        let _ = self.starts.remove(&handle);
        self.tweens.len() != before
    }

    /// Cancel every tween on `target`. Returns how many were running.
    pub fn remove_target(&mut self, target: TweenTarget) -> usize {
        let before = self.tweens.len();
        let starts = &mut self.starts;
        self.tweens.retain(|(handle, tween)| {
            let keep = tween.target != target;
            if !keep {
                let _ = starts.remove(handle);
            }
            keep
        });
        before - self.tweens.len()
    }

    /// Whether `handle` is still scheduled.
    #[must_use]
    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.tweens.iter().any(|(h, _)| *h == handle)
    }

    /// Number of scheduled tweens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.tweens.clear();
        self.starts.clear();
    }
}

/// Plain property store, for hosts without a scene graph of their own.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    values: FxHashMap<(TweenTarget, &'static str), f32>,
}

impl PropertyTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value.
    #[must_use]
    pub fn get(
        &self,
        target: TweenTarget,
        property: &'static str,
    ) -> Option<f32> {
        self.values.get(&(target, property)).copied()
    }

    /// Write a value directly, bypassing any tween.
    pub fn set(
        &mut self,
        target: TweenTarget,
        property: &'static str,
        value: f32,
    ) {
        let _ = self.values.insert((target, property), value);
    }
}

impl Tweenable for PropertyTable {
    fn property(
        &self,
        target: TweenTarget,
        property: &'static str,
    ) -> Option<f32> {
        self.get(target, property)
    }

    fn set_property(
        &mut self,
        target: TweenTarget,
        property: &'static str,
        value: f32,
    ) {
        self.set(target, property, value);
    }
}
