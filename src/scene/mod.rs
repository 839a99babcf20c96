//! Scene host: the explicit context that owns every creature, the shared
//! paths, the camera, the tween scheduler and the render surface, and
//! drives them once per frame.
//!
//! Creatures are loaded asynchronously through [`ModelSource`]s. A creature
//! whose model fails to load, or whose rig is malformed, is logged and left
//! inert; it never takes the frame loop down with it. Models that ship
//! animation clips get a [`ClipPlayer`] that starts on `idle` and is layered
//! over the procedural pose.

mod camera;
mod model;
mod surface;

use std::sync::Arc;

pub use camera::Camera;
pub use model::{
    DelayedModel, FailingModel, LoadState, LoadedModel, ModelSource, ReadyModel,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
pub use surface::{HeadlessSurface, RenderFrame, RenderSurface};

use crate::animation::clip::IDLE_CLIP;
use crate::animation::vignette::CAMERA_DISTANCE;
use crate::animation::{
    AnimationClip, ClipPlayer, PropertyTable, Storyboard, TweenTarget,
    Tweener,
};
use crate::error::SkitterError;
use crate::locomotion::{generate_path_from_options, CreatureAnimator, Path};
use crate::options::Options;

/// Tween target that drives the stage camera. Tweening
/// [`CAMERA_DISTANCE`] on it dollies the camera toward its target.
pub const CAMERA_TWEEN_TARGET: TweenTarget = TweenTarget(0);

/// Tween targets at or above this value belong to creatures; a creature's
/// clip fade weight lives on `CREATURE_TWEEN_BASE | id`.
pub const CREATURE_TWEEN_BASE: u32 = 1 << 31;

// ---------------------------------------------------------------------------
// Creatures
// ---------------------------------------------------------------------------

/// Stable handle to a spawned creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Raw numeric id.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Tween target reserved for this creature.
    #[must_use]
    pub fn tween_target(self) -> TweenTarget {
        TweenTarget(CREATURE_TWEEN_BASE | self.0)
    }
}

/// Where a creature is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatureStatus {
    /// Model still loading.
    Loading,
    /// Animating.
    Ready,
    /// Loaded, but the rig could not be animated.
    Disabled,
    /// Model failed to load.
    Failed,
}

/// One spawned creature.
pub struct Creature {
    model: Option<Box<dyn ModelSource>>,
    path: Arc<Path>,
    speed: f32,
    animator: Option<CreatureAnimator>,
    clips: Option<ClipPlayer>,
    status: CreatureStatus,
}

impl Creature {
    /// Current status.
    #[must_use]
    pub fn status(&self) -> CreatureStatus {
        self.status
    }

    /// Walking speed drawn at spawn time.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Path the creature follows.
    #[must_use]
    pub fn path(&self) -> &Arc<Path> {
        &self.path
    }

    /// The animator, once the model has loaded.
    #[must_use]
    pub fn animator(&self) -> Option<&CreatureAnimator> {
        self.animator.as_ref()
    }

    /// Clip playback, if the model shipped clips.
    #[must_use]
    pub fn clips(&self) -> Option<&ClipPlayer> {
        self.clips.as_ref()
    }

    /// Poll a pending model and build the animator once it arrives.
    fn poll_model(
        &mut self,
        id: CreatureId,
        options: &Options,
        tweens: &mut Tweener,
        properties: &mut PropertyTable,
    ) {
        let Some(model) = self.model.as_mut() else {
            return;
        };
        match model.poll() {
            LoadState::Pending => return,
            LoadState::Ready(loaded) => {
                self.clips = start_clips(id, loaded.clips, tweens, properties);
                match CreatureAnimator::new_or_disabled(
                    &loaded.rig,
                    Arc::clone(&self.path),
                    self.speed,
                    options,
                ) {
                    Ok(animator) => {
                        self.status = if animator.is_enabled() {
                            CreatureStatus::Ready
                        } else {
                            CreatureStatus::Disabled
                        };
                        log::debug!(
                            "creature {} ready ({:?})",
                            id.0,
                            self.status
                        );
                        self.animator = Some(animator);
                    }
                    Err(e) => {
                        log::error!(
                            "creature {} could not be animated: {e}",
                            id.0
                        );
                        self.status = CreatureStatus::Failed;
                    }
                }
            }
            LoadState::Failed(e) => {
                log::error!("creature {} failed to load: {e}", id.0);
                self.status = CreatureStatus::Failed;
            }
        }
        self.model = None;
    }

    /// Run procedural motion, then layer clip offsets over it.
    fn animate(
        &mut self,
        id: CreatureId,
        dt: f32,
        tweens: &mut Tweener,
        properties: &mut PropertyTable,
    ) {
        if let Some(animator) = self.animator.as_mut() {
            animator.update(dt);
        }
        let Some(player) = self.clips.as_mut() else {
            return;
        };
        if let Some(clip) = player.update(dt, tweens, properties) {
            log::debug!("creature {} finished clip '{clip}'", id.0);
        }
        let Some(animator) = self.animator.as_mut() else {
            return;
        };
        let offsets = animator
            .skeleton()
            .map(|skeleton| player.blended_offsets(skeleton, properties));
        if let Some(offsets) = offsets {
            animator.layer_offsets(&offsets);
        }
    }
}

/// Clip player for a freshly loaded model, already looping `idle` when the
/// model has it.
fn start_clips(
    id: CreatureId,
    clips: Vec<AnimationClip>,
    tweens: &mut Tweener,
    properties: &mut PropertyTable,
) -> Option<ClipPlayer> {
    if clips.is_empty() {
        return None;
    }
    let mut player = ClipPlayer::new(clips, id.tween_target());
    if player.has_clip(IDLE_CLIP) {
        let started = player.play(IDLE_CLIP, 0.0, tweens, properties);
        if let Err(e) = started {
            log::warn!("creature {} could not start idle: {e}", id.0);
        }
    }
    Some(player)
}

impl std::fmt::Debug for Creature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creature")
            .field("status", &self.status)
            .field("speed", &self.speed)
            .field("animator", &self.animator)
            .field("clips", &self.clips)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The scene host context. No global state: everything a frame touches
/// hangs off this value.
pub struct Stage<S: RenderSurface> {
    options: Options,
    surface: S,
    camera: Camera,
    paths: Vec<Arc<Path>>,
    creatures: FxHashMap<CreatureId, Creature>,
    next_creature_id: u32,
    rng: StdRng,
    tweens: Tweener,
    properties: PropertyTable,
    storyboard: Storyboard,
    initialized: bool,
    disposed: bool,
    frames: u64,
}

impl<S: RenderSurface> Stage<S> {
    /// Stage rendering into `surface`. Options are validated up front.
    pub fn new(options: Options, surface: S) -> Result<Self, SkitterError> {
        options.validate()?;
        let camera = Camera::from_options(&options.camera);
        Ok(Self {
            options,
            surface,
            camera,
            paths: Vec::new(),
            creatures: FxHashMap::default(),
            next_creature_id: 0,
            rng: StdRng::from_os_rng(),
            tweens: Tweener::new(),
            properties: PropertyTable::new(),
            storyboard: Storyboard::new(),
            initialized: false,
            disposed: false,
            frames: 0,
        })
    }

    /// Replace the stage RNG with a seeded one, for reproducible scenes.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Bring up the render surface. Calling it again is a no-op.
    pub fn init(&mut self) -> Result<(), SkitterError> {
        if self.disposed {
            return Err(SkitterError::InvalidConfiguration(
                "stage has been disposed".to_owned(),
            ));
        }
        if self.initialized {
            return Ok(());
        }
        self.surface.init()?;
        self.properties.set(
            CAMERA_TWEEN_TARGET,
            CAMERA_DISTANCE,
            self.camera.distance(),
        );
        self.initialized = true;
        log::info!("stage initialized");
        Ok(())
    }

    /// The viewport changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.camera.resize(width, height);
        self.surface.resize(width, height);
    }

    // -- Paths --

    /// Share `path` with the stage.
    pub fn add_path(&mut self, path: Path) -> Arc<Path> {
        let path = Arc::new(path);
        self.paths.push(Arc::clone(&path));
        path
    }

    /// Generate a path from the stage options and share it.
    pub fn generate_path(&mut self) -> Result<Arc<Path>, SkitterError> {
        let path =
            generate_path_from_options(&self.options.path, &mut self.rng)?;
        Ok(self.add_path(path))
    }

    /// Every path added so far.
    #[must_use]
    pub fn paths(&self) -> &[Arc<Path>] {
        &self.paths
    }

    // -- Creatures --

    /// Spawn a creature whose model comes from `model`, walking `path` at a
    /// speed drawn uniformly from `speed_range`.
    pub fn spawn_creature(
        &mut self,
        model: Box<dyn ModelSource>,
        path: Arc<Path>,
        speed_range: [f32; 2],
    ) -> Result<CreatureId, SkitterError> {
        let [min, max] = speed_range;
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(SkitterError::InvalidConfiguration(format!(
                "speed range [{min}, {max}] must be positive and ordered"
            )));
        }
        let speed = if min < max {
            self.rng.random_range(min..=max)
        } else {
            min
        };

        let id = CreatureId(self.next_creature_id);
        self.next_creature_id += 1;
        let _ = self.creatures.insert(
            id,
            Creature {
                model: Some(model),
                path,
                speed,
                animator: None,
                clips: None,
                status: CreatureStatus::Loading,
            },
        );
        log::debug!("spawned creature {} at speed {speed:.2}", id.0);
        Ok(id)
    }

    /// Spawn using the speed range from the stage options.
    pub fn spawn_creature_with_default_speed(
        &mut self,
        model: Box<dyn ModelSource>,
        path: Arc<Path>,
    ) -> Result<CreatureId, SkitterError> {
        let range = self.options.locomotion.speed_range;
        self.spawn_creature(model, path, range)
    }

    /// Remove a creature. It is never touched again; the caller gets the
    /// final state back.
    pub fn remove_creature(&mut self, id: CreatureId) -> Option<Creature> {
        let creature = self.creatures.remove(&id)?;
        let _ = self.tweens.remove_target(id.tween_target());
        Some(creature)
    }

    /// Cross-fade a creature to the looping clip `name` over `fade`
    /// seconds.
    pub fn play_clip(
        &mut self,
        id: CreatureId,
        name: &str,
        fade: f32,
    ) -> Result<(), SkitterError> {
        let player = Self::clip_player(&mut self.creatures, id)?;
        player.play(name, fade, &mut self.tweens, &mut self.properties)
    }

    /// Play the clip `name` once on a creature, then fade back to idle.
    pub fn play_clip_once(
        &mut self,
        id: CreatureId,
        name: &str,
    ) -> Result<(), SkitterError> {
        let player = Self::clip_player(&mut self.creatures, id)?;
        player.play_once(name, &mut self.tweens, &mut self.properties)
    }

    fn clip_player(
        creatures: &mut FxHashMap<CreatureId, Creature>,
        id: CreatureId,
    ) -> Result<&mut ClipPlayer, SkitterError> {
        creatures
            .get_mut(&id)
            .and_then(|creature| creature.clips.as_mut())
            .ok_or_else(|| {
                SkitterError::InvalidConfiguration(format!(
                    "creature {} has no loaded clips",
                    id.0
                ))
            })
    }

    /// Look up a creature.
    #[must_use]
    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    /// Number of live creatures, in any status.
    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    /// Number of creatures currently animating.
    #[must_use]
    pub fn ready_count(&self) -> usize {
        self.creatures
            .values()
            .filter(|c| c.status == CreatureStatus::Ready)
            .count()
    }

    // -- Frame --

    /// Advance everything by `dt` seconds and render one frame.
    ///
    /// Does nothing before [`init`](Self::init) or after
    /// [`dispose`](Self::dispose).
    pub fn update(&mut self, dt: f32) {
        if !self.initialized || self.disposed {
            return;
        }

        for (&id, creature) in &mut self.creatures {
            creature.poll_model(
                id,
                &self.options,
                &mut self.tweens,
                &mut self.properties,
            );
        }

        let _ = self.tweens.advance(dt, &mut self.properties);
        self.storyboard.update(dt, &self.tweens);
        if let Some(distance) =
            self.properties.get(CAMERA_TWEEN_TARGET, CAMERA_DISTANCE)
        {
            self.camera.set_distance(distance);
        }

        for (&id, creature) in &mut self.creatures {
            creature.animate(id, dt, &mut self.tweens, &mut self.properties);
        }

        let mut creatures: Vec<_> = self
            .creatures
            .iter()
            .filter_map(|(&id, c)| {
                c.animator
                    .as_ref()
                    .and_then(CreatureAnimator::skeleton)
                    .map(|skeleton| (id, skeleton))
            })
            .collect();
        creatures.sort_by_key(|(id, _)| *id);

        self.surface.render_frame(&RenderFrame {
            camera: &self.camera,
            creatures,
            properties: &self.properties,
        });
        self.frames += 1;
    }

    /// Move the story scroll position to `ratio` in `[0, 1]`.
    pub fn scroll(&mut self, ratio: f32) {
        self.storyboard.scroll(ratio, &mut self.tweens);
    }

    /// Drop every creature, cancel all tweens and release the surface.
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.creatures.clear();
        self.tweens.clear();
        self.surface.dispose();
        self.initialized = false;
        self.disposed = true;
        log::info!("stage disposed after {} frames", self.frames);
    }

    // -- Accessors --

    /// Options the stage was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera, for orbit controls and the like.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The render surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Tween scheduler, for scheduling cosmetic animation.
    pub fn tweens_mut(&mut self) -> &mut Tweener {
        &mut self.tweens
    }

    /// Tweened property values.
    #[must_use]
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Mutable property values, for seeding tween start points.
    pub fn properties_mut(&mut self) -> &mut PropertyTable {
        &mut self.properties
    }

    /// The story vignettes.
    #[must_use]
    pub fn storyboard(&self) -> &Storyboard {
        &self.storyboard
    }

    /// Mutable story vignettes, for adding chapters.
    pub fn storyboard_mut(&mut self) -> &mut Storyboard {
        &mut self.storyboard
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<S: RenderSurface> std::fmt::Debug for Stage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("creatures", &self.creatures.len())
            .field("paths", &self.paths.len())
            .field("frames", &self.frames)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use web_time::{Duration, Instant};

    use super::*;
    use crate::animation::{BoneTrack, FadeVignette, Tween};
    use crate::locomotion::{procedural_spider, Bone, RigDescriptor};
    use crate::util::frame_timing::FrameClock;

    const DT: f32 = 1.0 / 60.0;

    fn stage() -> Stage<HeadlessSurface> {
        let mut stage = Stage::new(Options::default(), HeadlessSurface::new())
            .unwrap()
            .with_seed(3);
        stage.init().unwrap();
        stage
    }

    fn spider() -> Box<dyn ModelSource> {
        Box::new(ReadyModel::new(procedural_spider(2, 2.0)))
    }

    /// Spider whose idle clip raises the body by one unit.
    fn dancer() -> Box<dyn ModelSource> {
        let idle = AnimationClip::new("idle", 1.0).unwrap().with_track(
            BoneTrack::new("body", vec![(0.0, Vec3::Y)]).unwrap(),
        );
        let jump = AnimationClip::new("jump", 0.5).unwrap();
        Box::new(
            ReadyModel::new(procedural_spider(2, 2.0))
                .with_clips(vec![idle, jump]),
        )
    }

    #[test]
    fn update_before_init_does_nothing() {
        let mut stage = Stage::new(Options::default(), HeadlessSurface::new())
            .unwrap();
        stage.update(0.1);
        assert_eq!(stage.frames_rendered(), 0);
        assert_eq!(stage.surface().frames(), 0);
    }

    #[test]
    fn creatures_load_and_render() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let id = stage
            .spawn_creature(
                Box::new(DelayedModel::new(3, spider())),
                path,
                [2.0, 3.0],
            )
            .unwrap();

        for _ in 0..3 {
            stage.update(1.0 / 60.0);
            let status = stage.creature(id).unwrap().status();
            assert_eq!(status, CreatureStatus::Loading);
        }
        stage.update(1.0 / 60.0);
        assert_eq!(stage.creature(id).unwrap().status(), CreatureStatus::Ready);
        assert_eq!(stage.surface().last_creature_count(), 1);
        assert_eq!(stage.surface().frames(), 4);

        let speed = stage.creature(id).unwrap().speed();
        assert!((2.0..=3.0).contains(&speed));
    }

    #[test]
    fn failed_load_is_isolated() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let missing = Box::new(FailingModel::new("missing.glb"));
        let bad = stage
            .spawn_creature(missing, Arc::clone(&path), [3.5, 3.5])
            .unwrap();
        let good = stage.spawn_creature(spider(), path, [3.5, 3.5]).unwrap();

        for _ in 0..30 {
            stage.update(1.0 / 60.0);
        }
        let bad = stage.creature(bad).unwrap();
        assert_eq!(bad.status(), CreatureStatus::Failed);
        assert!(bad.animator().is_none());
        let good = stage.creature(good).unwrap();
        assert_eq!(good.status(), CreatureStatus::Ready);
        assert_eq!(stage.ready_count(), 1);
    }

    #[test]
    fn malformed_rig_is_disabled_not_fatal() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let rig = RigDescriptor::from_bones(
            "statue",
            vec![Bone::new("root", None, Vec3::ZERO)],
        );
        let id = stage
            .spawn_creature(Box::new(ReadyModel::new(rig)), path, [3.5, 3.5])
            .unwrap();
        stage.update(1.0 / 60.0);
        let status = stage.creature(id).unwrap().status();
        assert_eq!(status, CreatureStatus::Disabled);
        assert_eq!(stage.surface().last_creature_count(), 0);
    }

    #[test]
    fn removed_creature_is_never_mutated_again() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let id = stage.spawn_creature(spider(), path, [3.5, 3.5]).unwrap();
        for _ in 0..10 {
            stage.update(1.0 / 60.0);
        }

        let removed = stage.remove_creature(id).unwrap();
        let frozen = removed.animator().unwrap().root_pose();
        for _ in 0..60 {
            stage.update(1.0 / 60.0);
        }
        assert_eq!(removed.animator().unwrap().root_pose(), frozen);
        assert!(stage.creature(id).is_none());
        assert!(stage.remove_creature(id).is_none());
        assert_eq!(stage.surface().last_creature_count(), 0);
    }

    #[test]
    fn bad_speed_range_is_rejected() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        assert!(stage
            .spawn_creature(spider(), Arc::clone(&path), [3.0, 1.0])
            .is_err());
        assert!(stage.spawn_creature(spider(), path, [0.0, 1.0]).is_err());
        assert_eq!(stage.creature_count(), 0);
    }

    #[test]
    fn resize_updates_camera_and_surface() {
        let mut stage = stage();
        stage.resize(1920, 1080);
        assert!((stage.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(stage.surface().size(), (1920, 1080));
    }

    #[test]
    fn camera_distance_follows_tweens() {
        let mut stage = stage();
        let _ = stage
            .tweens_mut()
            .add(Tween::new(CAMERA_TWEEN_TARGET, CAMERA_DISTANCE, 20.0, 0.5));
        for _ in 0..40 {
            stage.update(1.0 / 60.0);
        }
        assert!((stage.camera().distance() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn scroll_drives_the_storyboard() {
        let mut stage = stage();
        stage.storyboard_mut().push(Box::new(FadeVignette::new(
            "intro",
            TweenTarget(1),
            TweenTarget(2),
            1.5,
        )));
        stage.scroll(0.5);
        assert_eq!(stage.storyboard().active(), Some(0));
        for _ in 0..300 {
            stage.update(1.0 / 60.0);
        }
        let scale = crate::animation::vignette::SCALE;
        assert_eq!(stage.properties().get(TweenTarget(1), scale), Some(1.0));
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let _ = stage.spawn_creature(spider(), path, [3.5, 3.5]).unwrap();
        stage.update(1.0 / 60.0);

        stage.dispose();
        stage.dispose();
        assert!(stage.is_disposed());
        assert_eq!(stage.creature_count(), 0);
        assert_eq!(stage.surface().disposals(), 1);

        let frames = stage.frames_rendered();
        stage.update(1.0 / 60.0);
        assert_eq!(stage.frames_rendered(), frames);
        assert!(stage.init().is_err());
    }

    #[test]
    fn loaded_clips_idle_and_return_after_one_shots() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let id = stage.spawn_creature(dancer(), path, [3.5, 3.5]).unwrap();
        assert!(stage.play_clip_once(id, "jump").is_err(), "still loading");

        stage.update(DT);
        let creature = stage.creature(id).unwrap();
        assert_eq!(creature.clips().unwrap().current_clip(), Some("idle"));
        let skeleton = creature.animator().unwrap().skeleton().unwrap();
        let body = skeleton.find("body").unwrap();
        assert!((skeleton.position(body).y - 1.8).abs() < 1e-4);

        stage.play_clip_once(id, "jump").unwrap();
        assert!(stage.play_clip(id, "dance", 0.5).is_err());
        for _ in 0..60 {
            stage.update(DT);
        }
        let clips = stage.creature(id).unwrap().clips().unwrap();
        assert_eq!(clips.current_clip(), Some("idle"));
        assert_eq!(clips.previous_clip(), None);
    }

    #[test]
    fn models_without_clips_have_no_player() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let id = stage.spawn_creature(spider(), path, [3.5, 3.5]).unwrap();
        stage.update(DT);
        assert!(stage.creature(id).unwrap().clips().is_none());
        assert!(stage.play_clip(id, "idle", 0.0).is_err());
    }

    #[test]
    fn removing_a_creature_cancels_its_fades() {
        let mut stage = stage();
        let path = stage.generate_path().unwrap();
        let id = stage.spawn_creature(dancer(), path, [3.5, 3.5]).unwrap();
        stage.update(DT);
        stage.play_clip(id, "jump", 1.0).unwrap();
        assert_eq!(stage.tweens_mut().len(), 1);

        let _ = stage.remove_creature(id).unwrap();
        assert!(stage.tweens_mut().is_empty());
    }

    #[test]
    fn frame_clock_deltas_drive_the_stage() {
        let mut stage = stage();
        let square = Path::from_control_points(
            vec![
                Vec3::new(-10.0, 0.0, -10.0),
                Vec3::new(10.0, 0.0, -10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(-10.0, 0.0, 10.0),
            ],
            100,
        )
        .unwrap();
        let path = stage.add_path(square);
        let id = stage.spawn_creature(spider(), path, [1.0, 1.0]).unwrap();
        stage.update(0.0);

        // A five second stall arrives as one clamped 0.1 s step.
        let mut clock =
            FrameClock::with_max_delta(Duration::from_millis(100));
        let stalled = Instant::now() + Duration::from_secs(5);
        stage.update(clock.delta_at(stalled));

        let locomotion =
            stage.creature(id).unwrap().animator().unwrap().locomotion();
        let elapsed = locomotion.unwrap().segment_elapsed();
        assert!((elapsed - 0.1).abs() < 1e-4, "elapsed {elapsed}");
        assert_eq!(stage.frames_rendered(), 2);
    }
}
