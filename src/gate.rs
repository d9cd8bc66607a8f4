use std::fmt;

use crate::reference::Ref;

/// Logical gate of a sub-tree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Gate {
    And,
    Or,
}

impl Gate {
    /// Decodes the `LogicalType` parameter: `0` is AND, `1` is OR.
    pub fn from_code(code: i16) -> Option<Gate> {
        match code {
            0 => Some(Gate::And),
            1 => Some(Gate::Or),
            _ => None,
        }
    }

    /// Returns the `LogicalType` code of the gate.
    pub fn code(self) -> i16 {
        match self {
            Gate::And => 0,
            Gate::Or => 1,
        }
    }

    /// Parses a free-form `LogicalTypeDesc`, if it names a gate.
    pub fn from_desc(desc: &str) -> Option<Gate> {
        match desc.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Gate::And),
            "OR" => Some(Gate::Or),
            _ => None,
        }
    }

    /// The constant `c` such that `c gate x == c` for any `x`.
    pub fn absorbing(self) -> Ref {
        match self {
            Gate::And => Ref::FALSE,
            Gate::Or => Ref::TRUE,
        }
    }

    /// The constant `c` such that `c gate x == x` for any `x`.
    pub fn identity(self) -> Ref {
        match self {
            Gate::And => Ref::TRUE,
            Gate::Or => Ref::FALSE,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::And => write!(f, "AND"),
            Gate::Or => write!(f, "OR"),
        }
    }
}
