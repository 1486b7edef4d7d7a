//! Single-fire continuation guard.

use crate::ClientResult;

/// Wraps a callback so it runs at most once.
///
/// The callback is moved out of its slot on the first `complete`; later
/// calls find the slot empty and are dropped.
pub struct Completion<T, F>
where
    F: FnOnce(ClientResult<T>),
{
    slot: Option<F>,
    _result: std::marker::PhantomData<fn(T)>,
}

impl<T, F> Completion<T, F>
where
    F: FnOnce(ClientResult<T>),
{
    /// Creates a pending completion.
    pub const fn new(callback: F) -> Self {
        Self {
            slot: Some(callback),
            _result: std::marker::PhantomData,
        }
    }

    /// Returns true until the callback has run.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// Delivers the result. Returns false if the callback already ran.
    pub fn complete(&mut self, result: ClientResult<T>) -> bool {
        match self.slot.take() {
            Some(callback) => {
                callback(result);
                true
            }
            None => {
                tracing::warn!("completion invoked more than once; ignoring");
                false
            }
        }
    }
}

impl<T, F> std::fmt::Debug for Completion<T, F>
where
    F: FnOnce(ClientResult<T>),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.is_pending())
            .finish()
    }
}
