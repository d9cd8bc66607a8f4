//! Error types for fault tree loading and evaluation.

use thiserror::Error;

use crate::types::{BaseId, TreeId};

/// All errors produced while loading, combining, or analyzing a fault tree forest.
///
/// Any of these aborts the whole batch: no report is produced for the failing
/// sub-tree or for anything that depends on it.
#[derive(Error, Debug)]
pub enum Error {
    /// The node arena reached its configured capacity.
    #[error("BDD storage is full (capacity {capacity} nodes)")]
    StorageFull { capacity: usize },

    /// A sub-tree member references a sub-tree id that no page defines.
    #[error("Sub-tree '{tree}' member {position} references unknown sub-tree {member}")]
    UnresolvedDependency {
        tree: String,
        member: TreeId,
        position: usize,
    },

    /// `LogicalType` is neither 0 (AND) nor 1 (OR).
    #[error("Sub-tree '{tree}' has invalid LogicalType {code} (expected 0=AND or 1=OR)")]
    InvalidGate { tree: String, code: i16 },

    /// `LogicalTypeDesc` names the other gate than `LogicalType`.
    #[error("Sub-tree '{tree}' declares LogicalType {gate} but LogicalTypeDesc '{desc}'")]
    InconsistentGate {
        tree: String,
        gate: crate::gate::Gate,
        desc: String,
    },

    /// The sub-tree references form a cycle.
    #[error("Dependency cycle between sub-trees [{}] (blocked: [{}])", cycle.join(" -> "), blocked.join(", "))]
    DependencyCycle {
        /// Names of the sub-trees on one cycle, in reference order.
        cycle: Vec<String>,
        /// Other sub-trees that cannot be computed because of the cycle.
        blocked: Vec<String>,
    },

    /// A sub-tree id lies inside the base event id space.
    #[error("Sub-tree '{tree}' has ID {id}, which is reserved for base events")]
    OutOfRangeId { tree: String, id: i64 },

    /// Two pages declare the same sub-tree id.
    #[error("Duplicate sub-tree ID {id}")]
    DuplicateTree { id: TreeId },

    /// A probability outside of `[0, 1]` (or NaN).
    #[error("Invalid probability {value} for base event {id}")]
    InvalidProbability { id: BaseId, value: f64 },

    /// A BDD references a base event that is not in the store.
    #[error("Unknown base event {id}")]
    UnknownBaseEvent { id: BaseId },

    /// A base event label is forced both good and bad.
    #[error("Base event '{label}' is forced both good and bad")]
    ConflictingForce { label: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
