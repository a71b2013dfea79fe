//! Path resolution

use crate::no_entry::NO_ENTRY;
use crate::node::Node;
use crate::path::Path;

use std::fmt::{self, Debug};
use std::ops::Deref;
use std::sync::Arc;

use tracing::trace;

/// The outcome of resolving a path.
///
/// Derefs to the responsible node; an absent path derefs to the
/// [`NoEntry`](crate::NoEntry) sentinel, so callers never branch on absence.
pub enum Resolved {
    /// the node responsible for the path
    Found(Arc<dyn Node>),
    /// some component of the path does not exist
    Absent,
}

impl Resolved {
    /// Whether resolution failed
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The node operations are forwarded to
    #[must_use]
    pub fn node(&self) -> &(dyn Node + 'static) {
        match self {
            Self::Found(node) => &**node,
            Self::Absent => &NO_ENTRY,
        }
    }
}

impl Deref for Resolved {
    type Target = dyn Node;

    fn deref(&self) -> &Self::Target {
        self.node()
    }
}

impl Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(node) => f
                .debug_tuple("Found")
                .field(&format_args!("{:p}", Arc::as_ptr(node)))
                .finish(),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

/// Walks `path` from `root` one component at a time.
///
/// The root path resolves to `root` itself. The first component without a
/// matching child ends the walk with [`Resolved::Absent`]. The tree is only
/// read, and nothing is cached.
pub fn resolve(root: &Arc<dyn Node>, path: &Path) -> Resolved {
    let mut cursor = Arc::clone(root);
    for (depth, name) in path.iter().enumerate() {
        match cursor.child(name) {
            Some(child) => cursor = child,
            None => {
                trace!(%path, depth, ?name, "no such child");
                return Resolved::Absent;
            }
        }
    }
    Resolved::Found(cursor)
}
