//! Start-up: assembles the bridge arguments and runs the kernel bridge

use crate::dispatcher::Dispatcher;
use crate::fs::FileSystem;

use std::ffi::OsString;
use std::sync::Arc;

use nix::unistd::{getgid, getuid};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

/// Deliver one operation at a time
pub const SINGLE_THREADED: &str = "-s";

/// Introduces a mount option
pub const MOUNT_OPTION: &str = "-o";

/// Let the kernel check permissions against the `getattr` mode bits
pub const DEFAULT_PERMISSIONS: &str = "default_permissions";

/// The external framework that mounts the file system and delivers
/// operations to it
pub trait KernelBridge {
    /// Runs until the file system is unmounted and returns the exit code.
    ///
    /// `args` is the complete command line, program name included.
    fn main(&self, args: Vec<OsString>, fs: Arc<dyn FileSystem>) -> i32;
}

/// `uid=<n>` and `gid=<n>` mount options of the current process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerOptions {
    pub uid: String,
    pub gid: String,
}

impl OwnerOptions {
    /// Reads the real user and group id of this process
    #[must_use]
    pub fn current() -> Self {
        Self {
            uid: format!("uid={}", getuid()),
            gid: format!("gid={}", getgid()),
        }
    }
}

/// Mounts a [`Dispatcher`] through a [`KernelBridge`]
#[derive(Debug)]
pub struct Daemon {
    /// dispatcher shared with the bridge
    dispatcher: Arc<Dispatcher>,
    /// computed on the first run with default options
    owner: OnceCell<OwnerOptions>,
}

impl Daemon {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            owner: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The owner options, computed once per daemon
    pub fn owner_options(&self) -> &OwnerOptions {
        self.owner.get_or_init(OwnerOptions::current)
    }

    /// `-s -o default_permissions -o uid=<uid> -o gid=<gid>`
    pub fn default_options(&self) -> Vec<OsString> {
        let owner = self.owner_options();
        vec![
            SINGLE_THREADED.into(),
            MOUNT_OPTION.into(),
            DEFAULT_PERMISSIONS.into(),
            MOUNT_OPTION.into(),
            owner.uid.as_str().into(),
            MOUNT_OPTION.into(),
            owner.gid.as_str().into(),
        ]
    }

    /// Runs the bridge with `args` and returns its exit code unchanged.
    ///
    /// With `use_default_options`, operations are delivered one at a time,
    /// the kernel checks permissions, and files are owned by the current
    /// user and group.
    #[tracing::instrument(level = "info", skip(self, bridge, args))]
    pub fn run<B, I, S>(&self, bridge: &B, args: I, use_default_options: bool) -> i32
    where
        B: KernelBridge + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if use_default_options {
            argv.extend(self.default_options());
        }
        debug!(?argv);

        let fs: Arc<dyn FileSystem> = Arc::<Dispatcher>::clone(&self.dispatcher);
        info!("starting kernel bridge");
        let code = bridge.main(argv, fs);
        info!(code, "kernel bridge exited");
        code
    }
}
