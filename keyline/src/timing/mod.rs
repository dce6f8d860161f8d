//! Defines the time sources driving players.

pub use clock::{Clock, ClockMode};

mod clock;
