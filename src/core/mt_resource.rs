use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

/// Returned when a thread panicked while holding the lock of an [`MtResource`].
///
/// The guarded value may be half-updated at that point, so it is never handed out again.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("shared resource lock was poisoned by a panicking thread")]
pub struct PoisonedResource;

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be shared
/// across threads. It uses an `Arc<RwLock<T>>` internally to manage concurrent access.
/// The voxel world is the main user: the simulation thread reads it during every physics
/// frame while the streaming worker writes it when chunks load or unload.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ## Basic Usage
/// ```
/// use voxel_world::core::MtResource;
///
/// let counter = MtResource::new(0);
/// *counter.get_mut().unwrap() += 1;
/// assert_eq!(*counter.get().unwrap(), 1);
/// ```
///
/// ## Sharing Between Threads
/// ```
/// # use std::thread;
/// use voxel_world::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = thread::spawn(move || {
///     *counter_clone.get_mut().unwrap() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get().unwrap(), 1);
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
/// - Hold a guard for the whole compound operation; readers never observe a write half-done
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

    /// Returns a read-only guard that allows reading the contained value.
    ///
    /// # Errors
    /// Returns [`PoisonedResource`] if a writer panicked while holding the lock.
    pub fn get(&self) -> Result<RwLockReadGuard<'_, T>, PoisonedResource> {
        self.resource.read().map_err(|_| PoisonedResource)
    }

    /// Returns a mutable guard that allows modifying the contained value.
    ///
    /// # Errors
    /// Returns [`PoisonedResource`] if a writer panicked while holding the lock.
    pub fn get_mut(&self) -> Result<RwLockWriteGuard<'_, T>, PoisonedResource> {
        self.resource.write().map_err(|_| PoisonedResource)
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
    use std::thread;

    #[test]
    fn clones_share_the_same_value() {
        let resource = MtResource::new(vec![1, 2, 3]);
        let other = resource.clone();
        other.get_mut().unwrap().push(4);
        assert_eq!(*resource.get().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn panicking_writer_poisons_the_resource() {
        let resource = MtResource::new(0u32);
        let writer = resource.clone();
        let result = thread::spawn(move || {
            let _guard = writer.get_mut().unwrap();
            panic!("writer died");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(resource.get().err(), Some(PoisonedResource));
        assert!(resource.get_mut().is_err());
    }
}
