pub use crate::utils::events::{Call, CallRegistry};
pub use crate::utils::scale::Scalable;
pub use crate::utils::state::State;

mod events;
mod scale;
mod state;
