// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Procedural legged-locomotion animation.
//!
//! Skitter walks multi-legged creatures along closed wandering paths. The
//! body glides along a sampled spline with smoothed heading, each leg runs
//! a small gait state machine that plants and swings its foot in an arc,
//! and an inverse-kinematics pass bends the leg joints onto the feet.
//!
//! # Key entry points
//!
//! - [`scene::Stage`] - the per-scene context that owns creatures, paths,
//!   the camera and the render surface, and drives them once per frame
//! - [`locomotion::CreatureAnimator`] - animates a single rig along a path
//! - [`locomotion::generate_path`] - builds a closed wandering path
//! - [`options::Options`] - gait, root motion, path and camera tuning with
//!   TOML presets
//! - [`animation`] - property tweens and scroll-driven story vignettes
//!
//! # Architecture
//!
//! Everything is single-threaded and frame-stepped: the host calls
//! [`scene::Stage::update`] once per frame with the elapsed seconds.
//! Rendering, model loading and IK are collaborators behind traits
//! ([`scene::RenderSurface`], [`scene::ModelSource`],
//! [`locomotion::IkSolver`]), so the crate runs headless in tests and
//! benchmarks.

pub mod animation;
pub mod error;
pub mod locomotion;
pub mod options;
pub mod scene;
pub mod util;
