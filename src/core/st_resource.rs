use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, reference-counted handle with interior mutability.
///
/// `StResource` is how the batch, its drain task and the task handle share
/// state on the tick thread: the world, the work queue and the task state all
/// live behind one. Every clone points at the same value, so a block enqueued
/// through the batch between two ticks is seen by the drain task on the next
/// tick without any locking.
///
/// # Examples
///
/// ```
/// use mass_block_update::core::StResource;
///
/// let queue = StResource::new(Vec::new());
/// let producer = queue.clone();
///
/// producer.get_mut().push(1);
/// assert_eq!(queue.get().len(), 1);
/// ```
///
/// # Panics
/// `get` panics while a `get_mut` guard is alive, and `get_mut` panics while
/// any other guard is alive. Guards must not be held across calls that reach
/// back into the same resource.
pub struct StResource<T> {
    resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Wraps `resource` in a new shared handle.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }

    /// Borrows the value immutably.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Borrows the value mutably.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Returns `true` when both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Default> Default for StResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
