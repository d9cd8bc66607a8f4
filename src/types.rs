//! Type-safe identifiers for base events and sub-trees.
//!
//! Input rows share a single integer id space: ids above [`BASE_ID_THRESHOLD`]
//! denote base events, everything else references another sub-tree by its `ID`
//! parameter. The newtypes here keep the two kinds apart once a row is classified.
use std::fmt;

/// Row ids strictly greater than this value are base events.
pub const BASE_ID_THRESHOLD: i64 = 1000;

/// A base event identifier.
///
/// The numeric order of base ids is the BDD variable order: a node testing a
/// smaller id always sits above nodes testing larger ids.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BaseId(u32);

impl BaseId {
    /// Creates a base id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not above [`BASE_ID_THRESHOLD`].
    pub fn new(id: u32) -> Self {
        assert!(
            id as i64 > BASE_ID_THRESHOLD,
            "Base event IDs must be > {}",
            BASE_ID_THRESHOLD
        );
        BaseId(id)
    }

    /// Returns the raw id.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BaseId> for u32 {
    fn from(id: BaseId) -> Self {
        id.0
    }
}

/// A sub-tree identifier, as given by the `ID` parameter of its page.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TreeId(i64);

impl TreeId {
    pub fn new(id: i64) -> Self {
        TreeId(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A row id after classification.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RowKind {
    Base(BaseId),
    Tree(TreeId),
}

impl RowKind {
    /// Classifies a raw row id, or returns `None` if it is a base id that does not fit in `u32`.
    pub fn classify(id: i64) -> Option<Self> {
        if id > BASE_ID_THRESHOLD {
            u32::try_from(id).ok().map(|id| RowKind::Base(BaseId(id)))
        } else {
            Some(RowKind::Tree(TreeId(id)))
        }
    }
}
