//! Fault BDD to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Terminal nodes** (0 and 1) are rendered as squares at the bottom (sink rank)
//! - **Decision nodes** are rendered as circles labeled with the tested base id,
//!   grouped by base id
//! - **Edges**: solid lines are failed (then) branches, dashed lines are working (else) branches
//! - **Root nodes** are rendered as rectangles at the top (source rank), labeled with
//!   the caller-supplied names
//!
//! # Examples
//!
//! ```
//! use fault_bdd::bdd::Bdd;
//! use fault_bdd::gate::Gate;
//! use fault_bdd::types::BaseId;
//!
//! let bdd = Bdd::default();
//! let x = bdd.mk_base(BaseId::new(1001)).unwrap();
//! let y = bdd.mk_base(BaseId::new(1002)).unwrap();
//! let f = bdd.combine(x, y, Gate::And).unwrap();
//!
//! let dot = bdd.to_dot(&[("Top", f)]).unwrap();
//! assert!(dot.contains("label=\"1001\""));
//! // Render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::BaseId;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for decision nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for terminal nodes (default: "square")
    pub terminal_shape: &'static str,
    /// Shape for root nodes (default: "rect")
    pub root_shape: &'static str,
    /// Style for failed (then) edges (default: "solid")
    pub high_edge_style: &'static str,
    /// Style for working (else) edges (default: "dashed")
    pub low_edge_style: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            terminal_shape: "square",
            root_shape: "rect",
            high_edge_style: "solid",
            low_edge_style: "dashed",
        }
    }
}

fn dot_id(node: Ref) -> String {
    match node {
        Ref::FALSE => "0".to_string(),
        Ref::TRUE => "1".to_string(),
        _ => format!("n{}", node.index()),
    }
}

impl Bdd {
    /// Converts the diagrams of named roots to DOT format.
    ///
    /// Nodes shared between roots are displayed once.
    pub fn to_dot(&self, roots: &[(&str, Ref)]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[(&str, Ref)], config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "graph {{")?;
        writeln!(dot, "node [shape={}, fixedsize=true];", config.node_shape)?;

        // Terminal nodes
        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "0 [shape={}, label=\"0\"];", config.terminal_shape)?;
        writeln!(dot, "1 [shape={}, label=\"1\"];", config.terminal_shape)?;
        writeln!(dot, "}}")?;

        let mut seen = HashSet::new();
        let mut all_nodes = Vec::new();
        for &(_, root) in roots {
            for node in self.descendants(root) {
                if !node.is_constant() && seen.insert(node) {
                    all_nodes.push(node);
                }
            }
        }

        let mut levels = BTreeMap::<BaseId, Vec<Ref>>::new();
        for &node in &all_nodes {
            if let Some(var) = self.variable(node) {
                levels.entry(var).or_default().push(node);
            }
        }
        for (var, nodes) in &levels {
            writeln!(dot, "{{ rank=same")?;
            for &node in nodes {
                writeln!(dot, "{} [label=\"{}\"];", dot_id(node), var)?;
            }
            writeln!(dot, "}}")?;
        }

        for &node in &all_nodes {
            if let Some((high, low)) = self.node(node).branches() {
                let id = dot_id(node);
                writeln!(dot, "{} -- {} [style={}];", id, dot_id(high), config.high_edge_style)?;
                writeln!(dot, "{} -- {} [style={}];", id, dot_id(low), config.low_edge_style)?;
            }
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, (name, _)) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, name.escape_default())?;
        }
        writeln!(dot, "}}")?;
        for (i, &(_, root)) in roots.iter().enumerate() {
            writeln!(dot, "r{} -- {};", i, dot_id(root))?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
