//! File types and permission bits

use std::convert::TryFrom;

use bitflags::bitflags;

/// The access mode of an open request (`O_ACCMODE` bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// `O_RDONLY`
    ReadOnly,
    /// `O_WRONLY`
    WriteOnly,
    /// `O_RDWR`
    ReadWrite,
}

impl AccessMode {
    /// Returns the raw `O_*` value
    #[must_use]
    #[inline]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::ReadOnly => libc::O_RDONLY,
            Self::WriteOnly => libc::O_WRONLY,
            Self::ReadWrite => libc::O_RDWR,
        }
    }

    /// Decodes the access mode of open flags, `None` if the bits are invalid
    #[must_use]
    #[inline]
    pub const fn from_flags(o_flags: i32) -> Option<Self> {
        match o_flags & libc::O_ACCMODE {
            libc::O_RDONLY => Some(Self::ReadOnly),
            libc::O_WRONLY => Some(Self::WriteOnly),
            libc::O_RDWR => Some(Self::ReadWrite),
            _ => None,
        }
    }

    /// Whether the mode permits writing
    #[must_use]
    #[inline]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

/// File type, encoded as a `d_type` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    NamedPipe,
    CharacterDevice,
    Directory,
    BlockDevice,
    Regular,
    SymbolicLink,
    Socket,
}

impl FileType {
    /// Decodes a `d_type` value; unrecognized values map to [`FileType::Unknown`]
    #[inline]
    #[must_use]
    pub const fn from_raw(d_type: u8) -> Self {
        match d_type {
            libc::DT_FIFO => Self::NamedPipe,
            libc::DT_CHR => Self::CharacterDevice,
            libc::DT_DIR => Self::Directory,
            libc::DT_BLK => Self::BlockDevice,
            libc::DT_REG => Self::Regular,
            libc::DT_LNK => Self::SymbolicLink,
            libc::DT_SOCK => Self::Socket,
            _ => Self::Unknown,
        }
    }

    /// Returns the `d_type` value
    #[must_use]
    #[inline]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::Unknown => libc::DT_UNKNOWN,
            Self::NamedPipe => libc::DT_FIFO,
            Self::CharacterDevice => libc::DT_CHR,
            Self::Directory => libc::DT_DIR,
            Self::BlockDevice => libc::DT_BLK,
            Self::Regular => libc::DT_REG,
            Self::SymbolicLink => libc::DT_LNK,
            Self::Socket => libc::DT_SOCK,
        }
    }
}

bitflags! {
    /// Permission bits of `st_mode`
    #[derive(Default)]
    pub struct FileMode: u32 {
        const RWXO = 0o0007;
        const ROTH = 0o0004;
        const WOTH = 0o0002;
        const XOTH = 0o0001;

        const RWXG = 0o0070;
        const RGRP = 0o0040;
        const WGRP = 0o0020;
        const XGRP = 0o0010;

        const RWXU = 0o0700;
        const RUSR = 0o0400;
        const WUSR = 0o0200;
        const XUSR = 0o0100;

        const SUID = 0o4000;
        const SGID = 0o2000;
        const SVTX = 0o1000;
    }
}

/// A full `st_mode`: file type in the high bits, permissions in the low bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StMode(u32);

impl StMode {
    #[must_use]
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// `S_IFMT` bits are the `d_type` value shifted by 12
    #[must_use]
    #[inline]
    pub fn new(ty: FileType, mode: FileMode) -> Self {
        let ty_u32 = u32::from(ty.as_raw());
        Self(ty_u32.wrapping_shl(12) | mode.bits())
    }

    #[must_use]
    #[inline]
    pub fn file_type(self) -> FileType {
        let d_type = u8::try_from(self.0.wrapping_shr(12) & 0o17).unwrap_or(libc::DT_UNKNOWN);
        FileType::from_raw(d_type)
    }

    #[must_use]
    #[inline]
    pub const fn file_mode(self) -> FileMode {
        FileMode::from_bits_truncate(self.0)
    }
}
