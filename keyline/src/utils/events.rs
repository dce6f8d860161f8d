//! Defines the keyframe callback registry.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

type Handler = Arc<dyn Fn() + Send + Sync>;

/// A zero-argument side effect carried by keyframes.
///
/// A `Call` is a shared handle: clones point to the same slot, which is how the player recognises a
/// call shared by several keyframes and invokes it once. Replacing the handler behind a slot
/// (see [`CallRegistry::rebind`]) is visible to every keyframe holding it.
#[derive(Clone)]
pub struct Call {
    slot: Arc<RwLock<Handler>>,
}

impl Call {
    /// Wraps a closure into a call handle.
    ///
    /// # Example
    /// ```
    /// use keyline::utils::Call;
    /// let call = Call::new(|| println!("cue"));
    /// call.invoke();
    /// ```
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(handler))),
        }
    }

    /// Runs the handler synchronously.
    ///
    /// The slot is not locked while the handler runs: it may replace itself.
    pub fn invoke(&self) {
        let handler = self.slot.read().clone();
        handler();
    }

    /// Swaps the handler behind this slot for every holder of the call.
    pub fn replace<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.slot.write() = Arc::new(handler);
    }

    /// Whether both handles point to the same slot.
    pub fn ptr_eq(&self, other: &Call) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Debug for Call {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Call({:p})", Arc::as_ptr(&self.slot))
    }
}

/// Maps stable identifiers to [`Call`] handles.
///
/// The registry lives with the host: the engine only stores opaque handles and uses the registry to
/// give them a textual identity when exporting frames, or to resolve identifiers when importing.
/// Clones share the same underlying table.
#[derive(Clone, Default)]
pub struct CallRegistry {
    calls: Arc<RwLock<IndexMap<String, Call>>>,
}

impl CallRegistry {
    /// Registers a handler under `id` and returns its call handle.
    ///
    /// Registering an existing id rebinds it: the returned handle is the one already in use.
    ///
    /// # Example
    /// ```
    /// use keyline::utils::CallRegistry;
    /// let registry = CallRegistry::default();
    /// let reset = registry.register("reset", || println!("reset"));
    /// assert_eq!(registry.identify(&reset).as_deref(), Some("reset"));
    /// ```
    pub fn register<S, F>(&self, id: S, handler: F) -> Call
    where
        S: Into<String>,
        F: Fn() + Send + Sync + 'static,
    {
        let id = id.into();
        let mut calls = self.calls.write();
        match calls.get(&id) {
            Some(call) => {
                call.replace(handler);
                call.clone()
            }
            None => {
                let call = Call::new(handler);
                calls.insert(id, call.clone());
                call
            }
        }
    }

    /// Registers an existing handle under `id`, replacing any previous entry for that id.
    pub fn insert<S: Into<String>>(&self, id: S, call: Call) {
        self.calls.write().insert(id.into(), call);
    }

    /// Removes `id` from the registry. Keyframes already holding the handle keep it.
    pub fn unregister(&self, id: &str) -> Option<Call> {
        self.calls.write().shift_remove(id)
    }

    /// Retrieves the handle registered for `id`.
    pub fn get(&self, id: &str) -> Option<Call> {
        self.calls.read().get(id).cloned()
    }

    /// Replaces the handler behind `id`.
    ///
    /// # Returns
    /// `false` if no call is registered under that id.
    pub fn rebind<F>(&self, id: &str, handler: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        let call = self.calls.read().get(id).cloned();
        match call {
            Some(call) => {
                call.replace(handler);
                true
            }
            None => false,
        }
    }

    /// Reverse lookup: the identifier a handle was registered under.
    pub fn identify(&self, call: &Call) -> Option<String> {
        self.calls
            .read()
            .iter()
            .find(|(_, registered)| registered.ptr_eq(call))
            .map(|(id, _)| id.clone())
    }

    /// Registered identifiers, in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.calls.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.calls.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.read().is_empty()
    }
}

impl Debug for CallRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
