//! Test doubles for the engine seams.

pub use crate::mocks::target::MockTarget;

mod target;
