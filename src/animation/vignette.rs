//! Scroll-driven story vignettes.
//!
//! A [`Storyboard`] splits the scroll range `[0, 1]` evenly between its
//! vignettes. Scrolling into a new vignette asks the old one to leave and
//! the new one to enter; each returns the tweens that carry it out, and the
//! vignette settles once those tweens have finished.

use super::tween::{Repeat, Tween, TweenHandle, TweenTarget, Tweener};
use crate::util::easing::EasingFunction;

/// Where a vignette is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VignetteState {
    /// Off screen, nothing scheduled.
    #[default]
    Dormant,
    /// Entrance tweens running.
    Entering,
    /// Fully on screen.
    Active,
    /// Exit tweens running.
    Leaving,
}

/// A self-contained piece of a scrolling story.
pub trait Vignette {
    /// Display name, used in logs.
    fn name(&self) -> &str;

    /// Schedule the entrance. The vignette counts as entered once every
    /// returned tween has finished.
    fn enter(&mut self, tweens: &mut Tweener) -> Vec<TweenHandle>;

    /// Per-frame hook while the vignette is not dormant.
    fn update(&mut self, _dt: f32) {}

    /// Schedule the exit. The vignette is dormant again once every
    /// returned tween has finished.
    fn leave(&mut self, tweens: &mut Tweener) -> Vec<TweenHandle>;

    /// React to scrolling within this vignette; `progress` is in `[0, 1]`.
    fn apply(&mut self, _progress: f32, _tweens: &mut Tweener) {}
}

struct Chapter {
    vignette: Box<dyn Vignette>,
    state: VignetteState,
    pending: Vec<TweenHandle>,
}

/// Ordered vignettes sharing one scroll range.
#[derive(Default)]
pub struct Storyboard {
    chapters: Vec<Chapter>,
    active: Option<usize>,
}

impl Storyboard {
    /// Empty storyboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vignette after the existing ones.
    pub fn push(&mut self, vignette: Box<dyn Vignette>) {
        self.chapters.push(Chapter {
            vignette,
            state: VignetteState::Dormant,
            pending: Vec::new(),
        });
    }

    /// Number of vignettes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether there are no vignettes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Index of the vignette the scroll position currently selects.
    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Lifecycle state of vignette `index`.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<VignetteState> {
        self.chapters.get(index).map(|chapter| chapter.state)
    }

    /// Move the scroll position to `ratio` (clamped to `[0, 1]`).
    pub fn scroll(&mut self, ratio: f32, tweens: &mut Tweener) {
        let count = self.chapters.len();
        if count == 0 {
            return;
        }

        let scaled = ratio.clamp(0.0, 1.0) * count as f32;
        let index = (scaled as usize).min(count - 1);
        let progress = (scaled - index as f32).clamp(0.0, 1.0);

        if self.active != Some(index) {
            if let Some(previous) = self.active {
                self.leave(previous, tweens);
            }
            let chapter = &mut self.chapters[index];
            log::debug!("vignette '{}' entering", chapter.vignette.name());
            chapter.pending = chapter.vignette.enter(tweens);
            chapter.state = VignetteState::Entering;
            self.active = Some(index);
        }

        self.chapters[index].vignette.apply(progress, tweens);
    }

    /// Settle lifecycle states against finished tweens and run per-frame
    /// hooks. Call after the frame's tweens have advanced.
    pub fn update(&mut self, dt: f32, tweens: &Tweener) {
        for chapter in &mut self.chapters {
            if chapter.state == VignetteState::Dormant {
                continue;
            }
            chapter.pending.retain(|handle| tweens.is_active(*handle));
            if chapter.pending.is_empty() {
                chapter.state = match chapter.state {
                    VignetteState::Entering => VignetteState::Active,
                    VignetteState::Leaving => VignetteState::Dormant,
                    settled => settled,
                };
            }
            if chapter.state != VignetteState::Dormant {
                chapter.vignette.update(dt);
            }
        }
    }

    /// Ask whichever vignette is on screen to leave.
    pub fn leave_all(&mut self, tweens: &mut Tweener) {
        if let Some(active) = self.active.take() {
            self.leave(active, tweens);
        }
    }

    fn leave(&mut self, index: usize, tweens: &mut Tweener) {
        let chapter = &mut self.chapters[index];
        log::debug!("vignette '{}' leaving", chapter.vignette.name());
        chapter.pending = chapter.vignette.leave(tweens);
        chapter.state = VignetteState::Leaving;
    }
}

impl std::fmt::Debug for Storyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storyboard")
            .field("vignettes", &self.chapters.len())
            .field("active", &self.active)
            .finish()
    }
}

/// Property scaled in and out by [`FadeVignette`].
pub const SCALE: &str = "scale";
/// Light property faded by [`FadeVignette`].
pub const LIGHT_INTENSITY: &str = "light_intensity";
/// Camera distance property driven by [`FadeVignette::with_dolly`].
pub const CAMERA_DISTANCE: &str = "distance";
/// Spin angle property of a [`FadeVignette`] prop.
pub const SPIN: &str = "spin";

/// Stock vignette: a prop grows in while a light fades up, and both go
/// away again on exit. The prop spins slowly while on screen.
#[derive(Debug, Clone)]
pub struct FadeVignette {
    name: String,
    prop: TweenTarget,
    light: TweenTarget,
    light_intensity: f32,
    enter_duration: f32,
    leave_duration: f32,
    light_duration: f32,
    spin_period: f32,
    dolly: Option<Dolly>,
}

#[derive(Debug, Clone, Copy)]
struct Dolly {
    camera: TweenTarget,
    far: f32,
    near: f32,
    current: Option<TweenHandle>,
}

impl FadeVignette {
    /// Vignette animating `prop` and `light`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        prop: TweenTarget,
        light: TweenTarget,
        light_intensity: f32,
    ) -> Self {
        Self {
            name: name.into(),
            prop,
            light,
            light_intensity,
            enter_duration: 1.5,
            leave_duration: 0.7,
            light_duration: 4.0,
            spin_period: 23.0,
            dolly: None,
        }
    }

    /// Also pull `camera` in from `far` to `near` as the vignette is
    /// scrolled through.
    #[must_use]
    pub fn with_dolly(
        mut self,
        camera: TweenTarget,
        far: f32,
        near: f32,
    ) -> Self {
        self.dolly = Some(Dolly {
            camera,
            far,
            near,
            current: None,
        });
        self
    }

    fn cancel_all(&self, tweens: &mut Tweener) {
        let _ = tweens.remove_target(self.prop);
        let _ = tweens.remove_target(self.light);
    }
}

impl Vignette for FadeVignette {
    fn name(&self) -> &str {
        &self.name
    }

    fn enter(&mut self, tweens: &mut Tweener) -> Vec<TweenHandle> {
        self.cancel_all(tweens);
        let _ = tweens.add(
            Tween::new(self.prop, SPIN, std::f32::consts::TAU, self.spin_period)
                .starting_at(0.0)
                .with_repeat(Repeat::Loop),
        );
        vec![
            tweens.add(
                Tween::new(self.prop, SCALE, 1.0, self.enter_duration)
                    .starting_at(0.0)
                    .with_easing(EasingFunction::QuadraticInOut),
            ),
            tweens.add(Tween::new(
                self.light,
                LIGHT_INTENSITY,
                self.light_intensity,
                self.light_duration,
            )),
        ]
    }

    fn leave(&mut self, tweens: &mut Tweener) -> Vec<TweenHandle> {
        self.cancel_all(tweens);
        vec![
            tweens.add(
                Tween::new(self.prop, SCALE, 0.0, self.leave_duration)
                    .with_easing(EasingFunction::ExpoOut),
            ),
            tweens.add(Tween::new(
                self.light,
                LIGHT_INTENSITY,
                0.0,
                self.light_duration,
            )),
        ]
    }

    fn apply(&mut self, progress: f32, tweens: &mut Tweener) {
        let Some(dolly) = self.dolly.as_mut() else {
            return;
        };
        if let Some(previous) = dolly.current.take() {
            let _ = tweens.remove(previous);
        }
        let distance = dolly.far + (dolly.near - dolly.far) * progress;
        dolly.current = Some(tweens.add(Tween::new(
            dolly.camera,
            CAMERA_DISTANCE,
            distance,
            1.0,
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tween::PropertyTable;

    const PROP_A: TweenTarget = TweenTarget(10);
    const PROP_B: TweenTarget = TweenTarget(20);
    const LIGHT: TweenTarget = TweenTarget(30);
    const CAMERA: TweenTarget = TweenTarget(40);

    fn two_vignettes() -> Storyboard {
        let mut board = Storyboard::new();
        board.push(Box::new(FadeVignette::new("a", PROP_A, LIGHT, 2.0)));
        board.push(Box::new(FadeVignette::new("b", PROP_B, LIGHT, 3.0)));
        board
    }

    fn run(
        board: &mut Storyboard,
        tweens: &mut Tweener,
        table: &mut PropertyTable,
        seconds: f32,
    ) {
        let dt = 1.0 / 60.0;
        for _ in 0..(seconds / dt) as usize {
            let _ = tweens.advance(dt, table);
            board.update(dt, tweens);
        }
    }

    #[test]
    fn scroll_selects_vignette_by_ratio() {
        let mut board = two_vignettes();
        let mut tweens = Tweener::new();
        board.scroll(0.2, &mut tweens);
        assert_eq!(board.active(), Some(0));
        board.scroll(0.75, &mut tweens);
        assert_eq!(board.active(), Some(1));
        board.scroll(1.0, &mut tweens);
        assert_eq!(board.active(), Some(1));
        board.scroll(-3.0, &mut tweens);
        assert_eq!(board.active(), Some(0));
    }

    #[test]
    fn lifecycle_follows_tween_completion() {
        let mut board = two_vignettes();
        let mut tweens = Tweener::new();
        let mut table = PropertyTable::new();

        assert_eq!(board.state(0), Some(VignetteState::Dormant));
        board.scroll(0.1, &mut tweens);
        assert_eq!(board.state(0), Some(VignetteState::Entering));

        run(&mut board, &mut tweens, &mut table, 4.5);
        assert_eq!(board.state(0), Some(VignetteState::Active));
        assert!((table.get(PROP_A, SCALE).unwrap() - 1.0).abs() < 1e-5);
        let light = table.get(LIGHT, LIGHT_INTENSITY).unwrap();
        assert!((light - 2.0).abs() < 1e-4);

        board.scroll(0.9, &mut tweens);
        assert_eq!(board.state(0), Some(VignetteState::Leaving));
        assert_eq!(board.state(1), Some(VignetteState::Entering));

        run(&mut board, &mut tweens, &mut table, 4.5);
        assert_eq!(board.state(0), Some(VignetteState::Dormant));
        assert_eq!(board.state(1), Some(VignetteState::Active));
        assert!(table.get(PROP_A, SCALE).unwrap().abs() < 1e-4);
        let light = table.get(LIGHT, LIGHT_INTENSITY).unwrap();
        assert!((light - 3.0).abs() < 1e-4);
    }

    #[test]
    fn reentering_cancels_the_exit() {
        let mut board = two_vignettes();
        let mut tweens = Tweener::new();
        let mut table = PropertyTable::new();

        board.scroll(0.1, &mut tweens);
        run(&mut board, &mut tweens, &mut table, 0.5);
        board.scroll(0.9, &mut tweens);
        board.scroll(0.1, &mut tweens);
        assert_eq!(board.state(0), Some(VignetteState::Entering));

        run(&mut board, &mut tweens, &mut table, 4.5);
        assert_eq!(board.state(0), Some(VignetteState::Active));
        assert!((table.get(PROP_A, SCALE).unwrap() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn dolly_tracks_scroll_progress() {
        let mut board = Storyboard::new();
        board.push(Box::new(
            FadeVignette::new("lego", PROP_A, LIGHT, 1.0)
                .with_dolly(CAMERA, 100.0, 75.0),
        ));
        let mut tweens = Tweener::new();
        let mut table = PropertyTable::new();
        table.set(CAMERA, CAMERA_DISTANCE, 100.0);

        board.scroll(0.0, &mut tweens);
        board.scroll(1.0, &mut tweens);
        run(&mut board, &mut tweens, &mut table, 1.5);
        let distance = table.get(CAMERA, CAMERA_DISTANCE).unwrap();
        assert!((distance - 75.0).abs() < 1e-3);
    }

    #[test]
    fn leave_all_clears_the_active_vignette() {
        let mut board = two_vignettes();
        let mut tweens = Tweener::new();
        board.scroll(0.1, &mut tweens);
        board.leave_all(&mut tweens);
        assert_eq!(board.active(), None);
        assert_eq!(board.state(0), Some(VignetteState::Leaving));
    }
}
