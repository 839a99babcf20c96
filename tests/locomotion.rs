//! End-to-end walking scenarios.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use skitter::locomotion::{
    generate_path, procedural_spider, CreatureAnimator, PathBounds,
};
use skitter::options::Options;
use skitter::scene::{CreatureStatus, HeadlessSurface, ReadyModel, Stage};

const DT: f32 = 1.0 / 60.0;

#[test]
fn four_legged_walker_laps_the_path() {
    let mut rng = StdRng::seed_from_u64(42);
    let path = Arc::new(
        generate_path(8, &PathBounds::square(10.0, 0.0), &mut rng).unwrap(),
    );
    let rig = procedural_spider(2, 2.0);
    let mut animator =
        CreatureAnimator::new(&rig, Arc::clone(&path), 3.5, &Options::default())
            .unwrap()
            .with_phase_offsets(&[0.0, 0.5, 1.0, 1.5])
            .unwrap();
    assert_eq!(animator.legs().len(), 4);

    let start = animator.locomotion().unwrap().current_node();
    let mut returned_to_start = false;
    let mut left_start = false;
    for _ in 0..(120.0 / DT) as usize {
        animator.update(DT);
        let node = animator.locomotion().unwrap().current_node();
        if node != start {
            left_start = true;
        } else if left_start {
            returned_to_start = true;
        }
    }

    assert!(returned_to_start, "never completed a lap");
    assert!(animator.locomotion().unwrap().laps() >= 1);
    for (i, leg) in animator.legs().iter().enumerate() {
        assert!(
            leg.steps_taken() >= 10,
            "leg {i} took {} steps",
            leg.steps_taken()
        );
    }
}

#[test]
fn legs_never_step_in_unison() {
    let mut rng = StdRng::seed_from_u64(7);
    let path = Arc::new(
        generate_path(8, &PathBounds::square(10.0, 0.0), &mut rng).unwrap(),
    );
    let rig = procedural_spider(2, 2.0);
    let mut animator =
        CreatureAnimator::new(&rig, path, 3.5, &Options::default()).unwrap();

    // 0.3 s steps staggered by 0.5 s: at most one foot is ever airborne.
    for _ in 0..(20.0 / DT) as usize {
        animator.update(DT);
        let airborne =
            animator.legs().iter().filter(|leg| leg.is_stepping()).count();
        assert!(airborne <= 1);
    }
}

#[test]
fn stage_walks_a_herd() {
    let mut stage = Stage::new(Options::default(), HeadlessSurface::new())
        .unwrap()
        .with_seed(1);
    stage.init().unwrap();
    let path = stage.generate_path().unwrap();

    let ids: Vec<_> = (0..5)
        .map(|_| {
            stage
                .spawn_creature_with_default_speed(
                    Box::new(ReadyModel::new(procedural_spider(4, 2.0))),
                    Arc::clone(&path),
                )
                .unwrap()
        })
        .collect();

    for _ in 0..(10.0 / DT) as usize {
        stage.update(DT);
    }

    assert_eq!(stage.ready_count(), 5);
    assert_eq!(stage.surface().last_creature_count(), 5);
    for id in &ids {
        let creature = stage.creature(*id).unwrap();
        assert_eq!(creature.status(), CreatureStatus::Ready);
        assert!((1.5..=3.5).contains(&creature.speed()));
        let legs = creature.animator().unwrap().legs();
        assert_eq!(legs.len(), 8);
        assert!(legs.iter().all(|leg| leg.steps_taken() > 0));
    }

    let removed = stage.remove_creature(ids[0]).unwrap();
    let pose = removed.animator().unwrap().root_pose();
    stage.update(DT);
    assert_eq!(removed.animator().unwrap().root_pose(), pose);
    assert_eq!(stage.surface().last_creature_count(), 4);

    stage.dispose();
    assert_eq!(stage.creature_count(), 0);
}
