use std::fmt::{Display, Formatter};

/// Handle to a node stored in the [`Bdd`][crate::bdd::Bdd] arena.
///
/// Index 0 is the table sentry; the two constants occupy the first two real slots.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    /// The constant `0` (the top event does not occur).
    pub const FALSE: Ref = Ref(1);
    /// The constant `1` (the top event occurs).
    pub const TRUE: Ref = Ref(2);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_constant(self) -> bool {
        self.0 == Self::FALSE.0 || self.0 == Self::TRUE.0
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Ref::FALSE => write!(f, "@0"),
            Ref::TRUE => write!(f, "@1"),
            Ref(i) => write!(f, "@{}", i),
        }
    }
}
