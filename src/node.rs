use crate::reference::Ref;
use crate::types::BaseId;
use crate::utils::{pairing2, pairing3, MyHash};

/// A node of a fault tree BDD.
///
/// `Base(b)` is the terminal for a single base event and means the same as
/// `Ite { var: b, high: TRUE, low: FALSE }`; the manager never builds the latter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Node {
    #[default]
    False,
    True,
    Base(BaseId),
    /// `high` is taken when `var` fails, `low` when it does not.
    Ite { var: BaseId, high: Ref, low: Ref },
}

impl Node {
    /// The variable tested by this node, `None` for constants.
    pub fn variable(&self) -> Option<BaseId> {
        match *self {
            Node::False | Node::True => None,
            Node::Base(var) | Node::Ite { var, .. } => Some(var),
        }
    }

    /// The `(high, low)` branches, with a base terminal expanded to `(TRUE, FALSE)`.
    pub fn branches(&self) -> Option<(Ref, Ref)> {
        match *self {
            Node::False | Node::True => None,
            Node::Base(_) => Some((Ref::TRUE, Ref::FALSE)),
            Node::Ite { high, low, .. } => Some((high, low)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Node::Ite { .. })
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        match *self {
            Node::False => 0,
            Node::True => 1,
            Node::Base(var) => pairing2(var.id() as u64, 2),
            Node::Ite { var, high, low } => {
                pairing3(var.id() as u64, high.get() as u64, low.get() as u64)
            }
        }
    }
}
