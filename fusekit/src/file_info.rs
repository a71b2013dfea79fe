//! Per-open-file context

use crate::types::AccessMode;

use std::any::Any;
use std::fmt::{self, Debug};

/// An owned per-open-file resource attached by a node on `open`/`opendir`
pub type FileHandle = Box<dyn Any + Send>;

/// Per-open-file context threaded through `open` .. `release`.
///
/// The handle slot is either empty or owns exactly one handle, so freeing a
/// handle twice is impossible: [`FileInfo::release_handle`] empties the slot.
///
/// The bridge fills `flags`, `flush` and `lock_owner` from the kernel request
/// and copies `direct_io`, `keep_cache` and `nonseekable` back into its reply
/// after `open`/`opendir`. The dispatcher itself only touches the handle.
#[derive(Default)]
pub struct FileInfo {
    /// open flags (`O_*`)
    pub flags: i32,
    /// bypass the page cache for this open file
    pub direct_io: bool,
    /// keep previously cached data on open
    pub keep_cache: bool,
    /// the file is not seekable
    pub nonseekable: bool,
    /// set on `flush` requests caused by `close(2)`
    pub flush: bool,
    /// lock owner id
    pub lock_owner: u64,
    /// attached handle
    handle: Option<FileHandle>,
}

impl Debug for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileInfo")
            .field("flags", &format_args!("{:#o}", self.flags))
            .field("direct_io", &self.direct_io)
            .field("keep_cache", &self.keep_cache)
            .field("nonseekable", &self.nonseekable)
            .field("flush", &self.flush)
            .field("lock_owner", &self.lock_owner)
            .field("handle", &self.handle.as_ref().map(|_| "<FileHandle>"))
            .finish()
    }
}

impl FileInfo {
    /// Creates a context for an open request with the given flags
    #[must_use]
    pub fn new(flags: i32) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// Access mode of the open flags
    #[must_use]
    pub const fn access_mode(&self) -> Option<AccessMode> {
        AccessMode::from_flags(self.flags)
    }

    /// Attaches a handle, returning the one it replaces
    pub fn set_handle<T: Any + Send>(&mut self, handle: T) -> Option<FileHandle> {
        self.handle.replace(Box::new(handle))
    }

    /// Whether a handle is attached
    #[must_use]
    pub const fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Borrows the attached handle if it has type `T`
    #[must_use]
    pub fn handle<T: Any>(&self) -> Option<&T> {
        self.handle.as_ref()?.downcast_ref()
    }

    /// Mutably borrows the attached handle if it has type `T`
    pub fn handle_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.handle.as_mut()?.downcast_mut()
    }

    /// Detaches the handle, transferring ownership to the caller
    pub fn take_handle(&mut self) -> Option<FileHandle> {
        self.handle.take()
    }

    /// Frees the attached handle. Returns whether one was attached.
    pub fn release_handle(&mut self) -> bool {
        self.take_handle().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn typed_access() {
        let mut fi = FileInfo::new(libc::O_WRONLY);
        assert_eq!(fi.access_mode(), Some(AccessMode::WriteOnly));
        assert!(!fi.has_handle());

        assert!(fi.set_handle(7_u32).is_none());
        assert_eq!(fi.handle::<u32>(), Some(&7));
        assert_eq!(fi.handle::<u64>(), None);
        *fi.handle_mut::<u32>().unwrap() += 1;
        assert_eq!(fi.handle::<u32>(), Some(&8));
    }

    #[test]
    fn release_frees_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut fi = FileInfo::default();
        fi.set_handle(Counted(Arc::clone(&drops)));

        assert!(fi.release_handle());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(!fi.release_handle());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replacing_returns_previous() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut fi = FileInfo::default();
        fi.set_handle(Counted(Arc::clone(&drops)));
        let old = fi.set_handle(Counted(Arc::clone(&drops)));
        assert!(old.is_some());
        drop(old);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        drop(fi);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }
}
