//! The node capability set

use crate::errno::Errno;
use crate::file_info::FileInfo;
use crate::types::{FileAttr, FileMode, StMode, StatFs, TimeSpec};

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of a node operation
pub type NodeResult<T> = Result<T, Errno>;

/// Sink for directory entries produced by `readdir`
pub trait DirFiller {
    /// Adds an entry. `next_offset` is the offset of the following entry,
    /// or `0` when the node does not track offsets.
    ///
    /// Returns `true` when the sink is full and the node must stop.
    fn fill(&mut self, name: &OsStr, attr: Option<&FileAttr>, next_offset: i64) -> bool;
}

impl<F> DirFiller for F
where
    F: FnMut(&OsStr, Option<&FileAttr>, i64) -> bool,
{
    fn fill(&mut self, name: &OsStr, attr: Option<&FileAttr>, next_offset: i64) -> bool {
        (self)(name, attr, next_offset)
    }
}

/// A handler responsible for one location in the file hierarchy.
///
/// Every operation defaults to `ENOSYS`; a node overrides what it supports.
/// Nodes own their children and are shared between threads, so mutation
/// goes through interior mutability.
///
/// Operations that create or remove entries (`mknod`, `mkdir`, `symlink`,
/// `unlink`, `rmdir`) are invoked on the *parent* with the leaf name.
#[allow(unused_variables)]
pub trait Node: Send + Sync {
    /// Looks up the direct child called `name`
    fn child(&self, name: &OsStr) -> Option<Arc<dyn Node>> {
        None
    }

    /// `getattr`
    fn stat(&self) -> NodeResult<FileAttr> {
        Err(Errno::ENOSYS)
    }

    /// `readlink`
    fn readlink(&self) -> NodeResult<PathBuf> {
        Err(Errno::ENOSYS)
    }

    fn opendir(&self, fi: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn readdir(&self, filler: &mut dyn DirFiller, offset: i64, fi: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn releasedir(&self, fi: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    /// Reads into `buf`, returning the number of bytes read
    fn read(&self, buf: &mut [u8], offset: i64, fi: &mut FileInfo) -> NodeResult<usize> {
        Err(Errno::ENOSYS)
    }

    /// Writes `data`, returning the number of bytes written
    fn write(&self, data: &[u8], offset: i64, fi: &mut FileInfo) -> NodeResult<usize> {
        Err(Errno::ENOSYS)
    }

    fn truncate(&self, size: i64) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn open(&self, fi: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    /// Closes an open file. A node that attached a handle on `open` frees it here.
    fn release(&self, fi: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn flush(&self, fi: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    /// Permission check, `mask` is a combination of `R_OK`, `W_OK`, `X_OK` or `F_OK`
    fn access(&self, mask: i32) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn chmod(&self, mode: FileMode) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn mknod(&self, name: &OsStr, mode: StMode, rdev: u64) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn unlink(&self, name: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn mkdir(&self, name: &OsStr, mode: FileMode) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn rmdir(&self, name: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    /// Creates the child `name` as a symbolic link pointing at `target`
    fn symlink(&self, name: &OsStr, target: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn setxattr(&self, name: &OsStr, value: &[u8], flags: i32) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    /// Copies the attribute value into `buf`. With an empty `buf`, returns
    /// the size the value needs.
    fn getxattr(&self, name: &OsStr, buf: &mut [u8]) -> NodeResult<usize> {
        Err(Errno::ENOSYS)
    }

    /// Copies the NUL-separated attribute names into `buf`. With an empty
    /// `buf`, returns the size the list needs.
    fn listxattr(&self, buf: &mut [u8]) -> NodeResult<usize> {
        Err(Errno::ENOSYS)
    }

    fn removexattr(&self, name: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    /// Updates `[atime, mtime]`
    fn utimens(&self, times: &[TimeSpec; 2]) -> NodeResult<()> {
        Err(Errno::ENOSYS)
    }

    fn statfs(&self) -> NodeResult<StatFs> {
        Err(Errno::ENOSYS)
    }
}
