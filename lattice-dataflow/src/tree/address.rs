//! Tree addresses.
//!
//! An [`Address`] names a position in the conceptual UI tree as the path of
//! [`Segment`]s taken from the root. Addresses are purely structural: they are
//! derived from the order of calls during a traversal and from explicit keys,
//! never from the contents of state.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use smallvec::SmallVec;

/// One step of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// The n-th positional slot taken in the enclosing scope.
    Slot(u32),

    /// The n-th arm of a branch.
    Arm(u32),

    /// An explicit key, stored as its hash.
    Key(u64),
}

impl Segment {
    /// A key segment for any hashable value.
    pub fn key<K: Hash + ?Sized>(key: &K) -> Self {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Segment::Key(hasher.finish())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Slot(index) => write!(f, "{index}"),
            Segment::Arm(index) => write!(f, "arm{index}"),
            Segment::Key(hash) => write!(f, "#{hash:016x}"),
        }
    }
}

/// Structural position of a node in the traversal tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(SmallVec<[Segment; 8]>);

impl Address {
    /// The address of the tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// The address one step below this one.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` lies in the subtree rooted at `ancestor` (inclusive).
    pub fn starts_with(&self, ancestor: &Address) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    pub fn parent(&self) -> Option<Address> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.iter().copied().collect()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<Segment> for Address {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
