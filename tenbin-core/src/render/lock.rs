//! Render lock
//!
//! Every mutation of the surface, whether from the tick loop or from the
//! web collaborator, happens inside one critical section. Closures passed
//! here must not block or re-enter the lock.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::surface::Surface;

/// Mutual-exclusion wrapper around the render surface
pub struct RenderLock<M: RawMutex> {
    inner: Mutex<M, RefCell<Surface>>,
}

impl<M: RawMutex> Default for RenderLock<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> RenderLock<M> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Surface::new())),
        }
    }

    /// Mutate the surface under the lock
    pub fn update<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Read the surface under the lock
    pub fn read<R>(&self, f: impl FnOnce(&Surface) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    /// Copy out the surface if it changed, marking it clean
    ///
    /// Lets the caller present without holding the lock across display I/O.
    pub fn take_dirty(&self) -> Option<Surface> {
        self.update(|surface| {
            if surface.is_dirty() {
                surface.mark_clean();
                Some(surface.clone())
            } else {
                None
            }
        })
    }

    /// Re-raise the dirty flag after a failed present
    pub fn mark_dirty(&self) {
        self.update(|surface| surface.mark_dirty());
    }
}
