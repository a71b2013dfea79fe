//! The "no such entry" node

use crate::errno::Errno;
use crate::file_info::FileInfo;
use crate::node::{DirFiller, Node, NodeResult};
use crate::types::{FileAttr, FileMode, StMode, StatFs, TimeSpec};

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

/// Stands in for a path that does not exist. Every operation fails with `ENOENT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntry;

/// The shared sentinel instance
pub static NO_ENTRY: NoEntry = NoEntry;

impl Node for NoEntry {
    fn child(&self, _: &OsStr) -> Option<Arc<dyn Node>> {
        None
    }

    fn stat(&self) -> NodeResult<FileAttr> {
        Err(Errno::ENOENT)
    }

    fn readlink(&self) -> NodeResult<PathBuf> {
        Err(Errno::ENOENT)
    }

    fn opendir(&self, _: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn readdir(&self, _: &mut dyn DirFiller, _: i64, _: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn releasedir(&self, _: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn read(&self, _: &mut [u8], _: i64, _: &mut FileInfo) -> NodeResult<usize> {
        Err(Errno::ENOENT)
    }

    fn write(&self, _: &[u8], _: i64, _: &mut FileInfo) -> NodeResult<usize> {
        Err(Errno::ENOENT)
    }

    fn truncate(&self, _: i64) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn open(&self, _: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn release(&self, _: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn flush(&self, _: &mut FileInfo) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn access(&self, _: i32) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn chmod(&self, _: FileMode) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn mknod(&self, _: &OsStr, _: StMode, _: u64) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn unlink(&self, _: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn mkdir(&self, _: &OsStr, _: FileMode) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn rmdir(&self, _: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn symlink(&self, _: &OsStr, _: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn setxattr(&self, _: &OsStr, _: &[u8], _: i32) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn getxattr(&self, _: &OsStr, _: &mut [u8]) -> NodeResult<usize> {
        Err(Errno::ENOENT)
    }

    fn listxattr(&self, _: &mut [u8]) -> NodeResult<usize> {
        Err(Errno::ENOENT)
    }

    fn removexattr(&self, _: &OsStr) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn utimens(&self, _: &[TimeSpec; 2]) -> NodeResult<()> {
        Err(Errno::ENOENT)
    }

    fn statfs(&self) -> NodeResult<StatFs> {
        Err(Errno::ENOENT)
    }
}
