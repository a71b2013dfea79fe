//! The operation table seen by the kernel bridge

use crate::errno::Errno;
use crate::file_info::FileInfo;
use crate::node::{DirFiller, NodeResult};
use crate::types::{FileAttr, FileMode, StMode, StatFs, TimeSpec, UtimBuf};

use std::convert::TryFrom;
use std::ffi::OsStr;
use std::fmt::{self, Debug};
use std::path::PathBuf;

/// A file system operation, as delivered by the kernel bridge.
///
/// Every path-based variant carries the raw request path; the dispatcher
/// parses and resolves it.
#[non_exhaustive]
pub enum Operation<'a> {
    Init,
    Destroy,
    GetAttr {
        path: &'a OsStr,
    },
    ReadLink {
        path: &'a OsStr,
    },
    OpenDir {
        path: &'a OsStr,
        fi: &'a mut FileInfo,
    },
    ReadDir {
        path: &'a OsStr,
        filler: &'a mut dyn DirFiller,
        offset: i64,
        fi: &'a mut FileInfo,
    },
    ReleaseDir {
        path: &'a OsStr,
        fi: &'a mut FileInfo,
    },
    Read {
        path: &'a OsStr,
        buf: &'a mut [u8],
        offset: i64,
        fi: &'a mut FileInfo,
    },
    Write {
        path: &'a OsStr,
        data: &'a [u8],
        offset: i64,
        fi: &'a mut FileInfo,
    },
    Truncate {
        path: &'a OsStr,
        size: i64,
    },
    Open {
        path: &'a OsStr,
        fi: &'a mut FileInfo,
    },
    Release {
        path: &'a OsStr,
        fi: &'a mut FileInfo,
    },
    Access {
        path: &'a OsStr,
        mask: i32,
    },
    Chmod {
        path: &'a OsStr,
        mode: FileMode,
    },
    MkNod {
        path: &'a OsStr,
        mode: StMode,
        rdev: u64,
    },
    Unlink {
        path: &'a OsStr,
    },
    MkDir {
        path: &'a OsStr,
        mode: FileMode,
    },
    RmDir {
        path: &'a OsStr,
    },
    /// `path` is the link to create, `target` its content
    SymLink {
        path: &'a OsStr,
        target: &'a OsStr,
    },
    Flush {
        path: &'a OsStr,
        fi: &'a mut FileInfo,
    },
    SetXAttr {
        path: &'a OsStr,
        name: &'a OsStr,
        value: &'a [u8],
        flags: i32,
    },
    GetXAttr {
        path: &'a OsStr,
        name: &'a OsStr,
        buf: &'a mut [u8],
    },
    ListXAttr {
        path: &'a OsStr,
        buf: &'a mut [u8],
    },
    RemoveXAttr {
        path: &'a OsStr,
        name: &'a OsStr,
    },
    /// legacy second-resolution timestamps
    Utime {
        path: &'a OsStr,
        times: UtimBuf,
    },
    Utimens {
        path: &'a OsStr,
        times: [TimeSpec; 2],
    },
    StatFs {
        path: &'a OsStr,
    },
}

impl Operation<'_> {
    /// The operation name used by the kernel bridge
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Destroy => "destroy",
            Self::GetAttr { .. } => "getattr",
            Self::ReadLink { .. } => "readlink",
            Self::OpenDir { .. } => "opendir",
            Self::ReadDir { .. } => "readdir",
            Self::ReleaseDir { .. } => "releasedir",
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::Truncate { .. } => "truncate",
            Self::Open { .. } => "open",
            Self::Release { .. } => "release",
            Self::Access { .. } => "access",
            Self::Chmod { .. } => "chmod",
            Self::MkNod { .. } => "mknod",
            Self::Unlink { .. } => "unlink",
            Self::MkDir { .. } => "mkdir",
            Self::RmDir { .. } => "rmdir",
            Self::SymLink { .. } => "symlink",
            Self::Flush { .. } => "flush",
            Self::SetXAttr { .. } => "setxattr",
            Self::GetXAttr { .. } => "getxattr",
            Self::ListXAttr { .. } => "listxattr",
            Self::RemoveXAttr { .. } => "removexattr",
            Self::Utime { .. } => "utime",
            Self::Utimens { .. } => "utimens",
            Self::StatFs { .. } => "statfs",
        }
    }

    /// The request path, `None` for global operations
    #[must_use]
    pub fn path(&self) -> Option<&OsStr> {
        match *self {
            Self::Init | Self::Destroy => None,
            Self::GetAttr { path }
            | Self::ReadLink { path }
            | Self::OpenDir { path, .. }
            | Self::ReadDir { path, .. }
            | Self::ReleaseDir { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Truncate { path, .. }
            | Self::Open { path, .. }
            | Self::Release { path, .. }
            | Self::Access { path, .. }
            | Self::Chmod { path, .. }
            | Self::MkNod { path, .. }
            | Self::Unlink { path }
            | Self::MkDir { path, .. }
            | Self::RmDir { path }
            | Self::SymLink { path, .. }
            | Self::Flush { path, .. }
            | Self::SetXAttr { path, .. }
            | Self::GetXAttr { path, .. }
            | Self::ListXAttr { path, .. }
            | Self::RemoveXAttr { path, .. }
            | Self::Utime { path, .. }
            | Self::Utimens { path, .. }
            | Self::StatFs { path } => Some(path),
        }
    }
}

impl Debug for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name())
            .field("path", &self.path())
            .finish()
    }
}

/// The successful outcome of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Empty,
    Attr(FileAttr),
    Link(PathBuf),
    /// byte count of `read`, `write`, `getxattr` and `listxattr`
    Size(usize),
    StatFs(StatFs),
}

/// Conversion into the integer status contract of the kernel bridge:
/// `0` or a byte count on success, a negated error number on failure.
pub trait Status {
    fn status(&self) -> i32;
}

impl Status for () {
    fn status(&self) -> i32 {
        0
    }
}

impl Status for usize {
    fn status(&self) -> i32 {
        i32::try_from(*self).unwrap_or(i32::MAX)
    }
}

impl Status for Reply {
    fn status(&self) -> i32 {
        match self {
            Self::Size(n) => n.status(),
            Self::Empty | Self::Attr(_) | Self::Link(_) | Self::StatFs(_) => 0,
        }
    }
}

impl Status for Errno {
    fn status(&self) -> i32 {
        self.as_raw().wrapping_neg()
    }
}

impl<T: Status> Status for NodeResult<T> {
    fn status(&self) -> i32 {
        match self {
            Ok(val) => val.status(),
            Err(errno) => Status::status(errno),
        }
    }
}
