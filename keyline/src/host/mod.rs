//! Defines the glue binding a clock, a player and live recording into a host render loop.

pub use stage::{FrameReport, Stage};

mod stage;
