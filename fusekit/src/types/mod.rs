//! Value types exchanged between the dispatcher and nodes

mod attr;
mod file;

pub use self::attr::{FileAttr, StatFs, TimeSpec, UtimBuf};
pub use self::file::{AccessMode, FileMode, FileType, StMode};
