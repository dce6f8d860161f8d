use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use dyn_clone::DynClone;
use parking_lot::RwLock;

use crate::errors::Error;
use crate::utils::State;

/// A live object a [`Track`](crate::animations::Track) animates.
///
/// The host owns the object; the track only reads it (to capture "what is live right now") and
/// writes the fields present in its keyframes. During playback the track is the only writer.
pub trait Target: DynClone + Debug + Send + Sync {
    /// Retrieves the target current values.
    fn get_state(&self) -> State;
    /// Writes a sparse patch of values onto the target.
    fn set_state(&mut self, patch: &State) -> Result<(), Error>;
}
dyn_clone::clone_trait_object!(Target);

/// A shareable live state bag: the default [`Target`].
///
/// Clones share the same underlying value, which is how several tracks (or the host and a track)
/// point to the same object. Aliasing is explicit: hand the same `LiveState` to each track.
///
/// # Example
/// ```
/// use keyline::animations::{LiveState, Target};
/// use keyline::utils::State;
///
/// let tendrils = LiveState::new(State::from_iter([("speed", 0.2), ("noiseScale", 60.0)]));
/// let mut alias = tendrils.clone();
/// alias.set_state(&State::from_iter([("speed", 0.5)])).unwrap();
/// assert_eq!(tendrils.get("speed"), Some(State::Scalar(0.5)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LiveState {
    state: Arc<RwLock<State>>,
}

impl LiveState {
    pub fn new<S: Into<State>>(state: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(state.into())),
        }
    }

    /// Returns a copy of the field `key`, if the state is a record holding it.
    pub fn get(&self, key: &str) -> Option<State> {
        self.state.read().get(key).cloned()
    }

    /// Sets one field from the host side (GUI, input handler...).
    pub fn set<K: Into<String>, S: Into<State>>(&self, key: K, value: S) {
        let mut state = self.state.write();
        match &mut *state {
            State::Record(fields) => {
                fields.insert(key.into(), value.into());
            }
            other => *other = State::from_iter([(key.into(), value.into())]),
        }
    }

    /// Replaces the whole value from the host side.
    pub fn replace<S: Into<State>>(&self, state: S) {
        *self.state.write() = state.into();
    }

    /// Whether both handles point to the same live object.
    pub fn ptr_eq(&self, other: &LiveState) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Display for LiveState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LiveState {}", self.state.read())
    }
}

impl Target for LiveState {
    fn get_state(&self) -> State {
        self.state.read().clone()
    }

    fn set_state(&mut self, patch: &State) -> Result<(), Error> {
        self.state.write().merge(patch)
    }
}
