//! Slash-delimited request paths

use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display};
use std::os::unix::ffi::OsStrExt;
use std::slice;

use memchr::memchr_iter;
use smallvec::SmallVec;

/// Most requests target shallow trees; deeper paths spill to the heap.
const INLINE_COMPONENTS: usize = 8;

/// A parsed request path.
///
/// The path is the sequence of non-empty components between `/` separators,
/// so leading, trailing and repeated slashes are ignored. The root (`/`)
/// parses to the empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    /// components, front to back
    components: SmallVec<[OsString; INLINE_COMPONENTS]>,
}

impl Path {
    /// Parses a raw request path. Never fails.
    #[must_use]
    pub fn parse(raw: impl AsRef<OsStr>) -> Self {
        let bytes = raw.as_ref().as_bytes();
        let mut components = SmallVec::new();
        let mut start = 0;
        for end in memchr_iter(b'/', bytes).chain(Some(bytes.len())) {
            let segment = &bytes[start..end];
            if !segment.is_empty() {
                components.push(OsStr::from_bytes(segment).to_owned());
            }
            start = end.wrapping_add(1);
        }
        Self { components }
    }

    /// The root path
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this path names the root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of components
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Same as [`Path::is_root`]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// The last component, `None` for the root
    #[must_use]
    pub fn back(&self) -> Option<&OsStr> {
        self.components.last().map(OsString::as_os_str)
    }

    /// Removes the last component, turning this path into its parent
    pub fn pop_back(&mut self) -> Option<OsString> {
        self.components.pop()
    }

    /// Splits a path into its parent and leaf name.
    ///
    /// Returns `None` for the root, which has no parent.
    #[must_use]
    pub fn split_leaf(mut self) -> Option<(Self, OsString)> {
        let leaf = self.pop_back()?;
        Some((self, leaf))
    }

    /// Iterates components front to back
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.components.iter(),
        }
    }
}

/// Iterator over the components of a [`Path`]
#[derive(Debug, Clone)]
pub struct Iter<'p> {
    /// inner iterator
    inner: slice::Iter<'p, OsString>,
}

impl<'p> Iterator for Iter<'p> {
    type Item = &'p OsStr;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(OsString::as_os_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(OsString::as_os_str)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'p> IntoIterator for &'p Path {
    type Item = &'p OsStr;
    type IntoIter = Iter<'p>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for component in self {
            write!(f, "/{}", component.to_string_lossy())?;
        }
        Ok(())
    }
}
