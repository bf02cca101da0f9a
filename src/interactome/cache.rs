use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A value that is loaded on first use and kept until explicitly cleared.
pub struct LoadOnce<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for LoadOnce<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> LoadOnce<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value, running `load` only when nothing is cached.
    /// Concurrent callers wait for the first load instead of repeating it.
    /// A failed load leaves the cache empty.
    pub fn get_or_try_load<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = self.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(load()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }
}
