//! Debug utilities for inspecting fault tree BDDs.
//!
//! [`Bdd::write_structure`] produces the verbose structure dump: one line per
//! distinct decision node in pre-order, holding the tested base id followed by
//! the then-child and the else-child. A child is printed as its own tested base
//! id, or as `1`/`0` for the constants.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io;

use crate::bdd::Bdd;
use crate::node::Node;
use crate::reference::Ref;
use crate::types::BaseId;

/// Detailed information about a single BDD node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub node_ref: Ref,
    /// Tested base event (None for constants)
    pub variable: Option<BaseId>,
    /// Then-branch (None for constants)
    pub high: Option<Ref>,
    /// Else-branch (None for constants)
    pub low: Option<Ref>,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.variable, self.high, self.low) {
            (Some(var), Some(high), Some(low)) => {
                write!(f, "{}(var={}, high={}, low={})", self.node_ref, var, high, low)
            }
            _ if self.node_ref == Ref::TRUE => write!(f, "ONE"),
            _ => write!(f, "ZERO"),
        }
    }
}

impl Bdd {
    pub fn node_info(&self, node_ref: Ref) -> NodeInfo {
        let node = self.node(node_ref);
        let (high, low) = match node.branches() {
            Some((high, low)) => (Some(high), Some(low)),
            None => (None, None),
        };
        NodeInfo {
            node_ref,
            variable: node.variable(),
            high,
            low,
        }
    }

    /// Format: one `NodeInfo` per line, in pre-order.
    pub fn debug_string(&self, root: Ref) -> String {
        let nodes = self.descendants(root);
        let mut result = String::new();
        writeln!(&mut result, "BDD {} (size={}):", root, self.size(root)).unwrap();
        for node in nodes {
            writeln!(&mut result, "  {}", self.node_info(node)).unwrap();
        }
        result
    }

    fn child_label(&self, child: Ref) -> String {
        match self.node(child) {
            Node::False => "0".to_string(),
            Node::True => "1".to_string(),
            Node::Base(var) | Node::Ite { var, .. } => var.to_string(),
        }
    }

    /// Write the structure dump of `root`.
    pub fn write_structure<W: io::Write>(&self, root: Ref, out: &mut W) -> io::Result<()> {
        for node in self.descendants(root) {
            if let (Some(var), Some((high, low))) = (self.variable(node), self.node(node).branches()) {
                writeln!(
                    out,
                    "{} {} {}",
                    var,
                    self.child_label(high),
                    self.child_label(low)
                )?;
            }
        }
        Ok(())
    }

    /// Check that test variables strictly increase along every path from `root`.
    pub fn is_ordered(&self, root: Ref) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if let Node::Ite { var, high, low } = self.node(node) {
                for child in [high, low] {
                    if self.variable(child).is_some_and(|v| v <= var) {
                        return false;
                    }
                    stack.push(child);
                }
            }
        }
        true
    }
}
