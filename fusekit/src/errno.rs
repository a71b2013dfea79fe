//! POSIX error numbers

/// A raw POSIX error number reported by a node.
///
/// Nodes fail with an [`Errno`]; the dispatcher hands it to the bridge
/// untouched, where it becomes the negated status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{} (os error {})", describe(.0), .0)]
pub struct Errno(i32);

/// libc description of a raw error number
fn describe(raw: &i32) -> &'static str {
    nix::errno::Errno::from_i32(*raw).desc()
}

impl Errno {
    /// Wraps a raw error number
    #[must_use]
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw (positive) error number
    #[must_use]
    #[inline]
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Returns the negated error number expected by the kernel bridge
    #[must_use]
    #[inline]
    pub const fn status(self) -> i32 {
        self.0.wrapping_neg()
    }
}

macro_rules! errno_consts {
    ($($name:ident,)+) => {
        impl Errno {
            $(
                #[allow(missing_docs)]
                pub const $name: Self = Self(libc::$name);
            )+
        }
    };
}

errno_consts!(
    EACCES,
    EBADF,
    EEXIST,
    EINVAL,
    EIO,
    EISDIR,
    ENAMETOOLONG,
    ENODATA,
    ENOENT,
    ENOSPC,
    ENOSYS,
    ENOTDIR,
    ENOTEMPTY,
    EPERM,
    ERANGE,
    EROFS,
);
