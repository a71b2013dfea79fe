//! In-memory nodes for tests

use crate::errno::Errno;
use crate::file_info::FileInfo;
use crate::node::{DirFiller, Node, NodeResult};
use crate::types::{FileAttr, FileMode, FileType, StMode, StatFs, TimeSpec};

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn attr_of(ty: FileType, mode: FileMode) -> FileAttr {
    let now = TimeSpec::from(SystemTime::now());
    FileAttr {
        mode: StMode::new(ty, mode),
        nlink: 1,
        blksize: 4096,
        atime: now,
        mtime: now,
        ctime: now,
        ..FileAttr::default()
    }
}

fn apply_times(attr: &mut FileAttr, times: &[TimeSpec; 2]) {
    let resolve = |t: TimeSpec, old: TimeSpec| {
        if t.is_omit() {
            old
        } else if t.is_now() {
            TimeSpec::from(SystemTime::now())
        } else {
            t
        }
    };
    attr.atime = resolve(times[0], attr.atime);
    attr.mtime = resolve(times[1], attr.mtime);
}

fn to_offset(offset: i64) -> NodeResult<usize> {
    usize::try_from(offset).map_err(|_| Errno::EINVAL)
}

/// Extended attributes
#[derive(Default)]
struct XAttrs(Mutex<BTreeMap<OsString, Vec<u8>>>);

impl XAttrs {
    fn set(&self, name: &OsStr, value: &[u8], flags: i32) -> NodeResult<()> {
        let mut map = self.0.lock();
        let exists = map.contains_key(name);
        if flags & libc::XATTR_CREATE != 0 && exists {
            return Err(Errno::EEXIST);
        }
        if flags & libc::XATTR_REPLACE != 0 && !exists {
            return Err(Errno::ENODATA);
        }
        map.insert(name.to_owned(), value.to_vec());
        Ok(())
    }

    fn get(&self, name: &OsStr, buf: &mut [u8]) -> NodeResult<usize> {
        let map = self.0.lock();
        let value = map.get(name).ok_or(Errno::ENODATA)?;
        copy_sized(value, buf)
    }

    fn list(&self, buf: &mut [u8]) -> NodeResult<usize> {
        let mut list = Vec::new();
        for name in self.0.lock().keys() {
            list.extend_from_slice(name.as_bytes());
            list.push(0);
        }
        copy_sized(&list, buf)
    }

    fn remove(&self, name: &OsStr) -> NodeResult<()> {
        match self.0.lock().remove(name) {
            Some(_) => Ok(()),
            None => Err(Errno::ENODATA),
        }
    }
}

fn copy_sized(src: &[u8], buf: &mut [u8]) -> NodeResult<usize> {
    if buf.is_empty() {
        return Ok(src.len());
    }
    let dst = buf.get_mut(..src.len()).ok_or(Errno::ERANGE)?;
    dst.copy_from_slice(src);
    Ok(src.len())
}

pub struct MemDir {
    attr: Mutex<FileAttr>,
    entries: RwLock<BTreeMap<OsString, Arc<dyn Node>>>,
    xattrs: XAttrs,
}

impl MemDir {
    pub const STATFS: StatFs = StatFs {
        bsize: 4096,
        frsize: 4096,
        blocks: 1024,
        bfree: 512,
        bavail: 512,
        files: 64,
        ffree: 32,
        namemax: 255,
    };

    pub fn new() -> Self {
        Self::with_mode(FileMode::from_bits_truncate(0o755))
    }

    pub fn with_mode(mode: FileMode) -> Self {
        let mut attr = attr_of(FileType::Directory, mode);
        attr.nlink = 2;
        attr.size = 4096;
        Self {
            attr: Mutex::new(attr),
            entries: RwLock::new(BTreeMap::new()),
            xattrs: XAttrs::default(),
        }
    }

    pub fn insert(&self, name: impl Into<OsString>, node: Arc<dyn Node>) {
        let _ = self.entries.write().insert(name.into(), node);
    }

    pub fn names(&self) -> Vec<OsString> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn attr(&self) -> FileAttr {
        *self.attr.lock()
    }

    fn create(&self, name: &OsStr, node: Arc<dyn Node>) -> NodeResult<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(Errno::EEXIST);
        }
        entries.insert(name.to_owned(), node);
        Ok(())
    }

    fn remove(&self, name: &OsStr, want_dir: bool) -> NodeResult<()> {
        let mut entries = self.entries.write();
        let node = entries.get(name).ok_or(Errno::ENOENT)?;
        let is_dir = node.stat()?.mode.file_type() == FileType::Directory;
        match (want_dir, is_dir) {
            (true, false) => return Err(Errno::ENOTDIR),
            (false, true) => return Err(Errno::EISDIR),
            _ => {}
        }
        entries.remove(name);
        Ok(())
    }
}

impl Node for MemDir {
    fn child(&self, name: &OsStr) -> Option<Arc<dyn Node>> {
        self.entries.read().get(name).cloned()
    }

    fn stat(&self) -> NodeResult<FileAttr> {
        Ok(self.attr())
    }

    fn opendir(&self, _: &mut FileInfo) -> NodeResult<()> {
        Ok(())
    }

    fn readdir(&self, filler: &mut dyn DirFiller, offset: i64, _: &mut FileInfo) -> NodeResult<()> {
        let skip = to_offset(offset)?;
        let dots = [OsString::from("."), OsString::from("..")];
        let entries = self.entries.read();
        let names = dots.iter().chain(entries.keys());
        for (idx, name) in names.enumerate().skip(skip) {
            let next = i64::try_from(idx.wrapping_add(1)).map_err(|_| Errno::EINVAL)?;
            if filler.fill(name, None, next) {
                break;
            }
        }
        Ok(())
    }

    fn releasedir(&self, _: &mut FileInfo) -> NodeResult<()> {
        Ok(())
    }

    fn access(&self, _: i32) -> NodeResult<()> {
        Ok(())
    }

    fn chmod(&self, mode: FileMode) -> NodeResult<()> {
        let mut attr = self.attr.lock();
        attr.mode = StMode::new(FileType::Directory, mode);
        Ok(())
    }

    fn mknod(&self, name: &OsStr, mode: StMode, _: u64) -> NodeResult<()> {
        if mode.file_type() != FileType::Regular {
            return Err(Errno::EPERM);
        }
        self.create(name, Arc::new(MemFile::with_mode(mode.file_mode(), b"")))
    }

    fn unlink(&self, name: &OsStr) -> NodeResult<()> {
        self.remove(name, false)
    }

    fn mkdir(&self, name: &OsStr, mode: FileMode) -> NodeResult<()> {
        self.create(name, Arc::new(Self::with_mode(mode)))
    }

    fn rmdir(&self, name: &OsStr) -> NodeResult<()> {
        self.remove(name, true)
    }

    fn symlink(&self, name: &OsStr, target: &OsStr) -> NodeResult<()> {
        self.create(name, Arc::new(MemLink::new(target)))
    }

    fn setxattr(&self, name: &OsStr, value: &[u8], flags: i32) -> NodeResult<()> {
        self.xattrs.set(name, value, flags)
    }

    fn getxattr(&self, name: &OsStr, buf: &mut [u8]) -> NodeResult<usize> {
        self.xattrs.get(name, buf)
    }

    fn listxattr(&self, buf: &mut [u8]) -> NodeResult<usize> {
        self.xattrs.list(buf)
    }

    fn removexattr(&self, name: &OsStr) -> NodeResult<()> {
        self.xattrs.remove(name)
    }

    fn utimens(&self, times: &[TimeSpec; 2]) -> NodeResult<()> {
        apply_times(&mut self.attr.lock(), times);
        Ok(())
    }

    fn statfs(&self) -> NodeResult<StatFs> {
        Ok(Self::STATFS)
    }
}

/// Handle attached by [`MemFile::open`]
#[derive(Debug)]
pub struct OpenFile {
    pub writable: bool,
}

pub struct MemFile {
    attr: Mutex<FileAttr>,
    data: RwLock<Vec<u8>>,
    xattrs: XAttrs,
}

impl MemFile {
    pub fn new(data: &[u8]) -> Self {
        Self::with_mode(FileMode::from_bits_truncate(0o644), data)
    }

    pub fn with_mode(mode: FileMode, data: &[u8]) -> Self {
        Self {
            attr: Mutex::new(attr_of(FileType::Regular, mode)),
            data: RwLock::new(data.to_vec()),
            xattrs: XAttrs::default(),
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl Node for MemFile {
    fn stat(&self) -> NodeResult<FileAttr> {
        let mut attr = *self.attr.lock();
        attr.size = u64::try_from(self.data.read().len()).map_err(|_| Errno::EIO)?;
        attr.blocks = attr.size.wrapping_add(511) / 512;
        Ok(attr)
    }

    fn open(&self, fi: &mut FileInfo) -> NodeResult<()> {
        let writable = fi.access_mode().ok_or(Errno::EINVAL)?.is_writable();
        let _ = fi.set_handle(OpenFile { writable });
        // contents only change through this node
        fi.keep_cache = true;
        Ok(())
    }

    fn release(&self, fi: &mut FileInfo) -> NodeResult<()> {
        let _ = fi.release_handle();
        Ok(())
    }

    fn flush(&self, _: &mut FileInfo) -> NodeResult<()> {
        Ok(())
    }

    fn read(&self, buf: &mut [u8], offset: i64, _: &mut FileInfo) -> NodeResult<usize> {
        let data = self.data.read();
        let start = to_offset(offset)?.min(data.len());
        let end = start.saturating_add(buf.len()).min(data.len());
        let src = &data[start..end];
        buf[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    fn write(&self, src: &[u8], offset: i64, fi: &mut FileInfo) -> NodeResult<usize> {
        match fi.handle::<OpenFile>() {
            Some(open) if open.writable => {}
            _ => return Err(Errno::EBADF),
        }
        let start = to_offset(offset)?;
        let end = start.checked_add(src.len()).ok_or(Errno::EINVAL)?;
        let mut data = self.data.write();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(src);
        Ok(src.len())
    }

    fn truncate(&self, size: i64) -> NodeResult<()> {
        let size = to_offset(size)?;
        self.data.write().resize(size, 0);
        Ok(())
    }

    fn access(&self, _: i32) -> NodeResult<()> {
        Ok(())
    }

    fn chmod(&self, mode: FileMode) -> NodeResult<()> {
        self.attr.lock().mode = StMode::new(FileType::Regular, mode);
        Ok(())
    }

    fn setxattr(&self, name: &OsStr, value: &[u8], flags: i32) -> NodeResult<()> {
        self.xattrs.set(name, value, flags)
    }

    fn getxattr(&self, name: &OsStr, buf: &mut [u8]) -> NodeResult<usize> {
        self.xattrs.get(name, buf)
    }

    fn listxattr(&self, buf: &mut [u8]) -> NodeResult<usize> {
        self.xattrs.list(buf)
    }

    fn removexattr(&self, name: &OsStr) -> NodeResult<()> {
        self.xattrs.remove(name)
    }

    fn utimens(&self, times: &[TimeSpec; 2]) -> NodeResult<()> {
        apply_times(&mut self.attr.lock(), times);
        Ok(())
    }
}

pub struct MemLink {
    attr: FileAttr,
    target: PathBuf,
}

impl MemLink {
    pub fn new(target: &OsStr) -> Self {
        let mut attr = attr_of(FileType::SymbolicLink, FileMode::from_bits_truncate(0o777));
        attr.size = u64::try_from(target.len()).unwrap_or(u64::MAX);
        Self {
            attr,
            target: PathBuf::from(target),
        }
    }
}

impl Node for MemLink {
    fn stat(&self) -> NodeResult<FileAttr> {
        Ok(self.attr)
    }

    fn readlink(&self) -> NodeResult<PathBuf> {
        Ok(self.target.clone())
    }
}

/// Counts how many times handles created by it were dropped
#[derive(Debug, Default, Clone)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    pub fn handle(&self) -> Tracked {
        Tracked(Arc::clone(&self.0))
    }

    pub fn drops(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct Tracked(Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collects `readdir` output, reporting full after `capacity` entries
#[derive(Debug)]
pub struct Listing {
    pub names: Vec<OsString>,
    pub offsets: Vec<i64>,
    pub capacity: usize,
}

impl Listing {
    pub fn new(capacity: usize) -> Self {
        Self {
            names: Vec::new(),
            offsets: Vec::new(),
            capacity,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.names.iter().filter_map(|n| n.to_str()).collect()
    }
}

impl DirFiller for Listing {
    fn fill(&mut self, name: &OsStr, _: Option<&FileAttr>, next_offset: i64) -> bool {
        self.names.push(name.to_owned());
        self.offsets.push(next_offset);
        self.names.len() >= self.capacity
    }
}
