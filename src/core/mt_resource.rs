//! # Multi-threaded Resource
//!
//! Shared, lock-guarded state handed between the owning thread and task workers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` is how generation and meshing tasks share state with the
/// owning thread: sample regions, the world arena and the mesh store are all
/// handed to workers as cloned `MtResource` handles.
///
/// # Examples
///
/// ```
/// use voxel_terrain::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Poisoning
/// A panic while a guard is held does not make the resource unusable: the
/// guard is recovered from the poisoned lock. Terrain data is rebuilt from
/// the seed, so a half-written chunk is a visual artifact, not a crash.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard over the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard over the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }

    /// Unwraps the value if this is the last handle, otherwise returns the handle.
    pub fn try_unwrap(self) -> Result<T, Self> {
        match Arc::try_unwrap(self.resource) {
            Ok(lock) => Ok(lock.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(resource) => Err(Self { resource }),
        }
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = MtResource::new(vec![1, 2, 3]);
        let b = a.clone();
        b.get_mut().push(4);
        assert_eq!(a.get().len(), 4);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn try_unwrap_requires_last_handle() {
        let a = MtResource::new(7u32);
        let b = a.clone();
        let a = a.try_unwrap().unwrap_err();
        drop(b);
        assert_eq!(a.try_unwrap().ok(), Some(7));
    }
}
