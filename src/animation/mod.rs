//! Cosmetic animation: property tweens, skeletal clips with cross-fades,
//! and the scroll-driven vignettes built on them.

pub mod clip;
pub mod tween;
pub mod vignette;

pub use clip::{AnimationClip, BoneTrack, ClipLoop, ClipPlayer};
pub use tween::{
    PropertyTable, Repeat, Tween, TweenHandle, TweenTarget, Tweenable, Tweener,
};
pub use vignette::{FadeVignette, Storyboard, Vignette, VignetteState};
