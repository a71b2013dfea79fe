//! File attributes and timestamps

use super::file::StMode;

use std::convert::TryFrom;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A high-resolution timestamp, as in `struct timespec`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpec {
    /// seconds since the epoch
    pub sec: i64,
    /// nanoseconds, or one of the `UTIME_*` markers
    pub nsec: i64,
}

impl TimeSpec {
    /// Set the timestamp to the current time (`UTIME_NOW`)
    pub const NOW: Self = Self::new(0, libc::UTIME_NOW);

    /// Leave the timestamp unchanged (`UTIME_OMIT`)
    pub const OMIT: Self = Self::new(0, libc::UTIME_OMIT);

    #[must_use]
    #[inline]
    pub const fn new(sec: i64, nsec: i64) -> Self {
        Self { sec, nsec }
    }

    /// Whole seconds with a zero sub-second part
    #[must_use]
    #[inline]
    pub const fn from_secs(sec: i64) -> Self {
        Self::new(sec, 0)
    }

    #[must_use]
    #[inline]
    pub const fn is_now(self) -> bool {
        self.nsec == libc::UTIME_NOW
    }

    #[must_use]
    #[inline]
    pub const fn is_omit(self) -> bool {
        self.nsec == libc::UTIME_OMIT
    }

    /// Converts to a [`SystemTime`]; markers and out-of-range values yield `None`
    #[must_use]
    pub fn to_system_time(self) -> Option<SystemTime> {
        if self.is_now() || self.is_omit() {
            return None;
        }
        let nsec = u32::try_from(self.nsec).ok()?;
        match u64::try_from(self.sec) {
            Ok(sec) => UNIX_EPOCH.checked_add(Duration::new(sec, nsec)),
            Err(_) => {
                let before = Duration::from_secs(self.sec.unsigned_abs());
                UNIX_EPOCH
                    .checked_sub(before)?
                    .checked_add(Duration::from_nanos(u64::from(nsec)))
            }
        }
    }
}

impl From<SystemTime> for TimeSpec {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => Self::new(
                i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
                i64::from(d.subsec_nanos()),
            ),
            Err(err) => {
                let d = err.duration();
                let sec = i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
                if d.subsec_nanos() == 0 {
                    Self::new(sec.wrapping_neg(), 0)
                } else {
                    let nsec = 1_000_000_000_i64.wrapping_sub(i64::from(d.subsec_nanos()));
                    Self::new(sec.wrapping_neg().wrapping_sub(1), nsec)
                }
            }
        }
    }
}

/// The legacy two-field timestamp pair, as in `struct utimbuf`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtimBuf {
    /// access time in seconds
    pub actime: i64,
    /// modification time in seconds
    pub modtime: i64,
}

impl UtimBuf {
    /// `[atime, mtime]` in high-resolution form.
    ///
    /// The legacy form carries no sub-second part, so both are zero.
    #[must_use]
    pub const fn to_timespecs(self) -> [TimeSpec; 2] {
        [
            TimeSpec::from_secs(self.actime),
            TimeSpec::from_secs(self.modtime),
        ]
    }
}

/// File attributes returned by `getattr`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileAttr {
    pub ino: u64,
    pub mode: StMode,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    pub blksize: u32,
    pub blocks: u64,
    pub atime: TimeSpec,
    pub mtime: TimeSpec,
    pub ctime: TimeSpec,
}

/// File system statistics returned by `statfs`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatFs {
    pub bsize: u32,
    pub frsize: u32,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub namemax: u32,
}
