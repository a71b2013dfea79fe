//! The seam between the kernel bridge and the dispatcher

use crate::node::{Node, NodeResult};
use crate::ops::{Operation, Reply};
use crate::types::StatFs;

use std::sync::Arc;

/// A file system the kernel bridge forwards operations to
pub trait FileSystem: Send + Sync {
    /// dispatch operations
    fn dispatch(&self, op: Operation<'_>) -> NodeResult<Reply>;
}

/// Handlers for operations that are not bound to a node of the tree.
///
/// Installed once when the dispatcher is built; the path-based handlers
/// are fixed and cannot be replaced.
#[allow(unused_variables)]
pub trait GlobalOperations: Send + Sync {
    /// Called once the bridge has established the connection
    fn init(&self, root: &Arc<dyn Node>) {}

    /// Called when the file system is unmounted
    fn destroy(&self, root: &Arc<dyn Node>) {}

    /// File system statistics; `node` is the resolved request path
    fn statfs(&self, node: &dyn Node) -> NodeResult<StatFs> {
        node.statfs()
    }
}

/// Forwards `statfs` to the node and ignores `init`/`destroy`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGlobals;

impl GlobalOperations for DefaultGlobals {}
