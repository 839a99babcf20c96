//! Headless demo: walks procedural spiders around a generated path and logs
//! how far they got.
//!
//! ```text
//! skitter [--realtime] [SECONDS] [CREATURES] [OPTIONS.toml]
//! skitter --schema
//! ```
//!
//! By default the stage is stepped at a fixed 1/60 s as fast as possible.
//! With `--realtime` each frame takes its delta from the wall clock and the
//! loop sleeps between frames like a render loop would.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use skitter::locomotion::procedural_spider;
use skitter::options::Options;
use skitter::scene::{
    CreatureStatus, HeadlessSurface, ReadyModel, RenderSurface, Stage,
};
use skitter::util::frame_timing::FrameClock;

/// Fixed simulation step.
const DT: f32 = 1.0 / 60.0;

/// Sleep between real-time frames.
const FRAME_BUDGET: Duration = Duration::from_millis(16);

struct Args {
    realtime: bool,
    seconds: f32,
    creatures: usize,
    options: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1).peekable();
    let realtime = args.next_if(|arg| arg == "--realtime").is_some();
    let seconds = match args.next() {
        Some(arg) => arg
            .parse()
            .map_err(|_| format!("SECONDS must be a number, got '{arg}'"))?,
        None => 30.0,
    };
    let creatures = match args.next() {
        Some(arg) => arg.parse().map_err(|_| {
            format!("CREATURES must be an integer, got '{arg}'")
        })?,
        None => 1,
    };
    Ok(Args {
        realtime,
        seconds,
        creatures,
        options: args.next(),
    })
}

/// Step the stage at a fixed rate until `seconds` have been simulated.
fn run_fixed<S: RenderSurface>(stage: &mut Stage<S>, seconds: f32) {
    let frames = (seconds / DT).ceil() as u64;
    for _ in 0..frames {
        stage.update(DT);
    }
}

/// Step the stage from the wall clock until `seconds` have been simulated.
fn run_realtime<S: RenderSurface>(
    stage: &mut Stage<S>,
    seconds: f32,
) -> FrameClock {
    let mut clock = FrameClock::new();
    let mut simulated = 0.0;
    while simulated < seconds {
        std::thread::sleep(FRAME_BUDGET);
        let dt = clock.delta();
        stage.update(dt);
        simulated += dt;
    }
    clock
}

fn run(args: &Args) -> Result<(), skitter::error::SkitterError> {
    let options = match &args.options {
        Some(path) => Options::load(Path::new(path))?,
        None => Options::default(),
    };

    let mut stage = Stage::new(options, HeadlessSurface::new())?;
    stage.init()?;
    stage.resize(1280, 960);

    let path = stage.generate_path()?;
    let mut ids = Vec::with_capacity(args.creatures);
    for _ in 0..args.creatures {
        let model = Box::new(ReadyModel::new(procedural_spider(4, 2.0)));
        ids.push(
            stage.spawn_creature_with_default_speed(model, Arc::clone(&path))?,
        );
    }

    if args.realtime {
        let clock = run_realtime(&mut stage, args.seconds);
        log::info!("real-time loop averaged {:.0} fps", clock.fps());
    } else {
        run_fixed(&mut stage, args.seconds);
    }

    for id in ids {
        let Some(creature) = stage.creature(id) else {
            continue;
        };
        let Some(animator) = creature
            .animator()
            .filter(|_| creature.status() == CreatureStatus::Ready)
        else {
            log::warn!("creature {} never animated", id.get());
            continue;
        };
        let laps = animator.locomotion().map_or(0, |l| l.laps());
        let steps: Vec<u32> =
            animator.legs().iter().map(|leg| leg.steps_taken()).collect();
        log::info!(
            "creature {}: speed {:.2}, {laps} laps, steps per leg {steps:?}",
            id.get(),
            creature.speed()
        );
    }
    log::info!(
        "simulated {:.1}s in {} frames",
        args.seconds,
        stage.frames_rendered()
    );

    stage.dispose();
    Ok(())
}

fn main() {
    env_logger::init();

    if std::env::args().nth(1).as_deref() == Some("--schema") {
        match Options::json_schema_string() {
            Ok(schema) => log::info!("{schema}"),
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!(
                "Usage: skitter [--realtime] [SECONDS] [CREATURES] \
                 [OPTIONS.toml]"
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
