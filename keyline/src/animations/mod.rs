//! Defines the timeline engine: keyframes interpolating live targets over time.

pub use easing::{Ease, Easing};
pub use frames::{Frame, FrameOptions, Frames};
pub use keyframe::Keyframe;
pub use player::Player;
pub use target::{LiveState, Target};
pub use track::{Evaluation, Track};

mod easing;
mod frames;
mod keyframe;
mod player;
mod target;
mod track;
