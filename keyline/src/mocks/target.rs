use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::animations::Target;
use crate::errors::{Error, InvalidValueSnafu};
use crate::utils::State;

/// Mock [`Target`] for testing purposes: records how many writes it received.
///
/// Clones share the same state and counter.
#[derive(Clone, Debug, Default)]
pub struct MockTarget {
    state: Arc<RwLock<State>>,
    writes: Arc<AtomicUsize>,
    rejecting: bool,
}

impl MockTarget {
    pub fn new<S: Into<State>>(state: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(state.into())),
            ..Default::default()
        }
    }

    /// A target refusing every write.
    pub fn rejecting<S: Into<State>>(state: S) -> Self {
        Self {
            rejecting: true,
            ..Self::new(state)
        }
    }

    /// Number of writes received (accepted or not).
    pub fn get_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Display for MockTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockTarget [state={}]", self.state.read())
    }
}

impl Target for MockTarget {
    fn get_state(&self) -> State {
        self.state.read().clone()
    }

    fn set_state(&mut self, patch: &State) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        match self.rejecting {
            true => InvalidValueSnafu {
                info: "mock target is read-only",
            }
            .fail(),
            false => self.state.write().merge(patch),
        }
    }
}
