//! Path-based dispatch of FUSE operations onto a tree of nodes.
//!
//! The kernel bridge hands every operation over together with the
//! slash-delimited path it targets. The [`Dispatcher`] walks the path one
//! component at a time from its root [`Node`], guarded by a pluggable
//! [`LockingPolicy`], and forwards the operation to the node it finds.
//! A path that does not exist resolves to the [`NoEntry`] sentinel.

#![deny(
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    variant_size_differences,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod daemon;
mod dispatcher;
mod errno;
mod file_info;
mod fs;
mod lock;
mod no_entry;
mod node;
mod resolve;

pub mod ops;
pub mod path;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use self::daemon::{
    Daemon, KernelBridge, OwnerOptions, DEFAULT_PERMISSIONS, MOUNT_OPTION, SINGLE_THREADED,
};
pub use self::dispatcher::{Dispatcher, DispatcherBuilder};
pub use self::errno::Errno;
pub use self::file_info::{FileHandle, FileInfo};
pub use self::fs::{DefaultGlobals, FileSystem, GlobalOperations};
pub use self::lock::{LockingPolicy, MutexLock, NoLock, TreeGuard};
pub use self::no_entry::{NoEntry, NO_ENTRY};
pub use self::node::{DirFiller, Node, NodeResult};
pub use self::ops::{Operation, Reply, Status};
pub use self::path::Path;
pub use self::resolve::{resolve, Resolved};
