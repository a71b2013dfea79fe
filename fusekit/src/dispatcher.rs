//! Binds every file system operation to the node responsible for its path

use crate::errno::Errno;
use crate::file_info::FileInfo;
use crate::fs::{DefaultGlobals, FileSystem, GlobalOperations};
use crate::lock::{LockingPolicy, NoLock, TreeGuard};
use crate::node::{DirFiller, Node, NodeResult};
use crate::ops::{Operation, Reply};
use crate::path::Path;
use crate::resolve::{resolve, Resolved};
use crate::types::{FileAttr, FileMode, StMode, StatFs, TimeSpec, UtimBuf};

use std::ffi::OsStr;
use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

/// The builder of [`Dispatcher`]
pub struct DispatcherBuilder {
    /// root node
    root: Arc<dyn Node>,
    /// locking policy
    locking: Box<dyn LockingPolicy>,
    /// global operations
    globals: Box<dyn GlobalOperations>,
}

impl DispatcherBuilder {
    /// Starts to build a [`Dispatcher`] owning `root`
    #[must_use]
    pub fn new(root: Arc<dyn Node>) -> Self {
        Self {
            root,
            locking: Box::new(NoLock),
            globals: Box::new(DefaultGlobals),
        }
    }

    /// Sets the locking policy. Defaults to [`NoLock`].
    #[must_use]
    pub fn locking(mut self, policy: impl LockingPolicy + 'static) -> Self {
        self.locking = Box::new(policy);
        self
    }

    /// Sets the handlers of `init`, `destroy` and `statfs`
    #[must_use]
    pub fn global(mut self, globals: impl GlobalOperations + 'static) -> Self {
        self.globals = Box::new(globals);
        self
    }

    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            root: self.root,
            locking: self.locking,
            globals: self.globals,
        }
    }
}

impl Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("exclusive", &self.locking.is_exclusive())
            .finish()
    }
}

/// Owns the node tree and forwards each operation to the node its path
/// resolves to.
///
/// Every handler holds the tree guard for its whole resolve-then-invoke
/// sequence and returns the node's result unchanged.
pub struct Dispatcher {
    /// root node
    root: Arc<dyn Node>,
    /// locking policy
    locking: Box<dyn LockingPolicy>,
    /// global operations
    globals: Box<dyn GlobalOperations>,
}

impl Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &format_args!("{:p}", Arc::as_ptr(&self.root)))
            .field("exclusive", &self.locking.is_exclusive())
            .finish()
    }
}

impl Dispatcher {
    /// A dispatcher with the default policies
    #[must_use]
    pub fn new(root: Arc<dyn Node>) -> Self {
        DispatcherBuilder::new(root).build()
    }

    /// Starts to build a dispatcher owning `root`
    #[must_use]
    pub fn builder(root: Arc<dyn Node>) -> DispatcherBuilder {
        DispatcherBuilder::new(root)
    }

    /// The root node
    #[must_use]
    pub fn root(&self) -> &Arc<dyn Node> {
        &self.root
    }

    /// The locking policy
    #[must_use]
    pub fn locking(&self) -> &dyn LockingPolicy {
        &*self.locking
    }

    /// Acquires the tree for the rest of the caller's scope
    pub fn lock(&self) -> TreeGuard<'_> {
        TreeGuard::acquire(&*self.locking)
    }

    /// Resolves a parsed path. The caller is responsible for holding the guard.
    pub fn resolve(&self, path: &Path) -> Resolved {
        resolve(&self.root, path)
    }

    /// Resolves a raw request path
    fn find(&self, path: &OsStr) -> Resolved {
        self.resolve(&Path::parse(path))
    }

    /// Resolves the parent of `path` and invokes `f` with it and the leaf name
    fn with_parent<T>(
        &self,
        path: &OsStr,
        f: impl FnOnce(&dyn Node, &OsStr) -> NodeResult<T>,
    ) -> NodeResult<T> {
        match Path::parse(path).split_leaf() {
            Some((parent, leaf)) => {
                let parent = self.resolve(&parent);
                f(parent.node(), leaf.as_os_str())
            }
            // the root is nobody's child
            None => Err(Errno::ENOENT),
        }
    }

    pub fn getattr(&self, path: impl AsRef<OsStr>) -> NodeResult<FileAttr> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.stat()
    }

    pub fn readlink(&self, path: impl AsRef<OsStr>) -> NodeResult<PathBuf> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.readlink()
    }

    pub fn opendir(&self, path: impl AsRef<OsStr>, fi: &mut FileInfo) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.opendir(fi)
    }

    pub fn readdir(
        &self,
        path: impl AsRef<OsStr>,
        filler: &mut dyn DirFiller,
        offset: i64,
        fi: &mut FileInfo,
    ) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.readdir(filler, offset, fi)
    }

    pub fn releasedir(&self, path: impl AsRef<OsStr>, fi: &mut FileInfo) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.releasedir(fi)
    }

    pub fn read(
        &self,
        path: impl AsRef<OsStr>,
        buf: &mut [u8],
        offset: i64,
        fi: &mut FileInfo,
    ) -> NodeResult<usize> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.read(buf, offset, fi)
    }

    pub fn write(
        &self,
        path: impl AsRef<OsStr>,
        data: &[u8],
        offset: i64,
        fi: &mut FileInfo,
    ) -> NodeResult<usize> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.write(data, offset, fi)
    }

    pub fn truncate(&self, path: impl AsRef<OsStr>, size: i64) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.truncate(size)
    }

    pub fn open(&self, path: impl AsRef<OsStr>, fi: &mut FileInfo) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.open(fi)
    }

    /// Closes an open file.
    ///
    /// The node may have been removed since it was opened. In that case the
    /// sentinel reports `ENOENT` and the handle still attached to `fi` is
    /// freed here.
    pub fn release(&self, path: impl AsRef<OsStr>, fi: &mut FileInfo) -> NodeResult<()> {
        let path = path.as_ref();
        let _guard = self.lock();
        let node = self.find(path);
        let ret = node.release(fi);
        if ret == Err(Errno::ENOENT) && fi.release_handle() {
            warn!(?path, "freed the handle of a vanished node");
        }
        ret
    }

    pub fn flush(&self, path: impl AsRef<OsStr>, fi: &mut FileInfo) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.flush(fi)
    }

    pub fn access(&self, path: impl AsRef<OsStr>, mask: i32) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.access(mask)
    }

    pub fn chmod(&self, path: impl AsRef<OsStr>, mode: FileMode) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.chmod(mode)
    }

    pub fn mknod(&self, path: impl AsRef<OsStr>, mode: StMode, rdev: u64) -> NodeResult<()> {
        let _guard = self.lock();
        self.with_parent(path.as_ref(), |parent, name| parent.mknod(name, mode, rdev))
    }

    pub fn unlink(&self, path: impl AsRef<OsStr>) -> NodeResult<()> {
        let _guard = self.lock();
        self.with_parent(path.as_ref(), |parent, name| parent.unlink(name))
    }

    pub fn mkdir(&self, path: impl AsRef<OsStr>, mode: FileMode) -> NodeResult<()> {
        let _guard = self.lock();
        self.with_parent(path.as_ref(), |parent, name| parent.mkdir(name, mode))
    }

    pub fn rmdir(&self, path: impl AsRef<OsStr>) -> NodeResult<()> {
        let _guard = self.lock();
        self.with_parent(path.as_ref(), |parent, name| parent.rmdir(name))
    }

    /// Creates the link `path` pointing at `target`
    pub fn symlink(&self, path: impl AsRef<OsStr>, target: impl AsRef<OsStr>) -> NodeResult<()> {
        let target = target.as_ref();
        let _guard = self.lock();
        self.with_parent(path.as_ref(), |parent, name| parent.symlink(name, target))
    }

    pub fn setxattr(
        &self,
        path: impl AsRef<OsStr>,
        name: impl AsRef<OsStr>,
        value: &[u8],
        flags: i32,
    ) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.setxattr(name.as_ref(), value, flags)
    }

    pub fn getxattr(
        &self,
        path: impl AsRef<OsStr>,
        name: impl AsRef<OsStr>,
        buf: &mut [u8],
    ) -> NodeResult<usize> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.getxattr(name.as_ref(), buf)
    }

    pub fn listxattr(&self, path: impl AsRef<OsStr>, buf: &mut [u8]) -> NodeResult<usize> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.listxattr(buf)
    }

    pub fn removexattr(&self, path: impl AsRef<OsStr>, name: impl AsRef<OsStr>) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.removexattr(name.as_ref())
    }

    /// Legacy timestamp update, forwarded as [`Dispatcher::utimens`] with
    /// zero nanoseconds
    pub fn utime(&self, path: impl AsRef<OsStr>, times: UtimBuf) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.utimens(&times.to_timespecs())
    }

    pub fn utimens(&self, path: impl AsRef<OsStr>, times: &[TimeSpec; 2]) -> NodeResult<()> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        node.utimens(times)
    }

    pub fn statfs(&self, path: impl AsRef<OsStr>) -> NodeResult<StatFs> {
        let _guard = self.lock();
        let node = self.find(path.as_ref());
        self.globals.statfs(&*node)
    }

    pub fn init(&self) {
        let _guard = self.lock();
        self.globals.init(&self.root);
    }

    pub fn destroy(&self) {
        let _guard = self.lock();
        self.globals.destroy(&self.root);
    }
}

impl FileSystem for Dispatcher {
    fn dispatch(&self, op: Operation<'_>) -> NodeResult<Reply> {
        let name = op.name();
        debug!(op = name, path = ?op.path());

        let ret = match op {
            Operation::Init => {
                self.init();
                Ok(Reply::Empty)
            }
            Operation::Destroy => {
                self.destroy();
                Ok(Reply::Empty)
            }
            Operation::GetAttr { path } => self.getattr(path).map(Reply::Attr),
            Operation::ReadLink { path } => self.readlink(path).map(Reply::Link),
            Operation::OpenDir { path, fi } => self.opendir(path, fi).map(|()| Reply::Empty),
            Operation::ReadDir {
                path,
                filler,
                offset,
                fi,
            } => self
                .readdir(path, filler, offset, fi)
                .map(|()| Reply::Empty),
            Operation::ReleaseDir { path, fi } => self.releasedir(path, fi).map(|()| Reply::Empty),
            Operation::Read {
                path,
                buf,
                offset,
                fi,
            } => self.read(path, buf, offset, fi).map(Reply::Size),
            Operation::Write {
                path,
                data,
                offset,
                fi,
            } => self.write(path, data, offset, fi).map(Reply::Size),
            Operation::Truncate { path, size } => self.truncate(path, size).map(|()| Reply::Empty),
            Operation::Open { path, fi } => self.open(path, fi).map(|()| Reply::Empty),
            Operation::Release { path, fi } => self.release(path, fi).map(|()| Reply::Empty),
            Operation::Access { path, mask } => self.access(path, mask).map(|()| Reply::Empty),
            Operation::Chmod { path, mode } => self.chmod(path, mode).map(|()| Reply::Empty),
            Operation::MkNod { path, mode, rdev } => {
                self.mknod(path, mode, rdev).map(|()| Reply::Empty)
            }
            Operation::Unlink { path } => self.unlink(path).map(|()| Reply::Empty),
            Operation::MkDir { path, mode } => self.mkdir(path, mode).map(|()| Reply::Empty),
            Operation::RmDir { path } => self.rmdir(path).map(|()| Reply::Empty),
            Operation::SymLink { path, target } => {
                self.symlink(path, target).map(|()| Reply::Empty)
            }
            Operation::Flush { path, fi } => self.flush(path, fi).map(|()| Reply::Empty),
            Operation::SetXAttr {
                path,
                name,
                value,
                flags,
            } => self
                .setxattr(path, name, value, flags)
                .map(|()| Reply::Empty),
            Operation::GetXAttr { path, name, buf } => {
                self.getxattr(path, name, buf).map(Reply::Size)
            }
            Operation::ListXAttr { path, buf } => self.listxattr(path, buf).map(Reply::Size),
            Operation::RemoveXAttr { path, name } => {
                self.removexattr(path, name).map(|()| Reply::Empty)
            }
            Operation::Utime { path, times } => self.utime(path, times).map(|()| Reply::Empty),
            Operation::Utimens { path, times } => {
                self.utimens(path, &times).map(|()| Reply::Empty)
            }
            Operation::StatFs { path } => self.statfs(path).map(Reply::StatFs),
        };

        if let Err(errno) = &ret {
            debug!(op = name, %errno, "operation failed");
        }
        ret
    }
}
