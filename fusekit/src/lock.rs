//! Locking policies guarding the node tree

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;

/// A strategy serializing access to the node tree.
///
/// The dispatcher holds a [`TreeGuard`] for the whole resolve-then-invoke
/// sequence of every operation.
pub trait LockingPolicy: Send + Sync {
    /// Blocks until the caller may access the tree
    fn acquire(&self);

    /// Ends an access started by [`LockingPolicy::acquire`]
    ///
    /// # Safety
    /// The calling thread must hold an acquisition that has not been released yet.
    unsafe fn release(&self);

    /// Whether the policy actually excludes concurrent accesses
    fn is_exclusive(&self) -> bool;
}

/// No exclusion. Only sound when the bridge delivers one operation at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl LockingPolicy for NoLock {
    #[inline]
    fn acquire(&self) {}

    #[inline]
    unsafe fn release(&self) {}

    #[inline]
    fn is_exclusive(&self) -> bool {
        false
    }
}

/// Mutual exclusion: at most one operation touches the tree at a time
pub struct MutexLock {
    /// tree mutex
    raw: RawMutex,
}

impl MutexLock {
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawMutex::INIT }
    }

    /// Whether some operation currently holds the tree
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for MutexLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for MutexLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl LockingPolicy for MutexLock {
    #[inline]
    fn acquire(&self) {
        self.raw.lock();
    }

    #[inline]
    unsafe fn release(&self) {
        self.raw.unlock();
    }

    #[inline]
    fn is_exclusive(&self) -> bool {
        true
    }
}

/// A policy shared with other owners, e.g. to observe [`MutexLock::is_locked`]
impl<P: LockingPolicy + ?Sized> LockingPolicy for Arc<P> {
    #[inline]
    fn acquire(&self) {
        (**self).acquire();
    }

    #[inline]
    unsafe fn release(&self) {
        (**self).release();
    }

    #[inline]
    fn is_exclusive(&self) -> bool {
        (**self).is_exclusive()
    }
}

/// Scoped acquisition of a [`LockingPolicy`], released on drop
#[must_use = "the tree is released as soon as the guard is dropped"]
pub struct TreeGuard<'a> {
    /// policy to release
    policy: &'a dyn LockingPolicy,
}

impl<'a> TreeGuard<'a> {
    /// Acquires `policy` until the guard goes out of scope
    pub fn acquire(policy: &'a dyn LockingPolicy) -> Self {
        policy.acquire();
        Self { policy }
    }
}

impl Drop for TreeGuard<'_> {
    fn drop(&mut self) {
        // the guard only exists after a successful acquire
        unsafe { self.policy.release() }
    }
}

impl Debug for TreeGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeGuard")
            .field("exclusive", &self.policy.is_exclusive())
            .finish()
    }
}
