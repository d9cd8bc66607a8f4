//! # fault-bdd: fault tree analysis with Binary Decision Diagrams
//!
//! **`fault-bdd`** converts a multi-level AND/OR fault tree into a reduced ordered
//! Binary Decision Diagram, evaluates the probability of its top event, and ranks
//! the base events by importance.
//!
//! ## How it works
//!
//! A fault tree is a forest of *sub-trees*. Each sub-tree is a single AND or OR gate
//! over its members, and a member is either a *base event* (a component failure with
//! a known probability, id above 1000) or another sub-tree.
//!
//! - All diagram operations go through the [`Bdd`][crate::bdd::Bdd] manager, which
//!   hash-conses nodes and memoizes [`combine`][crate::bdd::Bdd::combine] results.
//!   Callers hold lightweight [`Ref`][crate::reference::Ref] handles.
//! - The [`Forest`][crate::forest::Forest] loads sub-tree pages, combines all-base
//!   sub-trees right away, and resolves the rest in dependency order.
//! - [`evaluate`][crate::bdd::Bdd::evaluate] computes the top-event probability in one
//!   pass over the diagram, and [`sensitivity`][crate::bdd::Bdd::sensitivity] derives
//!   MIF and DIF of every base event.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fault_bdd::analysis::{run, Options};
//! use fault_bdd::forest::TreePage;
//! use fault_bdd::gate::Gate;
//!
//! let pages = vec![
//!     TreePage::new(1, "Top", Gate::Or)
//!         .with_base(1001, 0.1, "x")
//!         .with_tree(2),
//!     TreePage::new(2, "Pumps", Gate::And)
//!         .with_base(1002, 0.2, "y")
//!         .with_base(1003, 0.3, "z"),
//! ];
//!
//! let reports = run(pages, &Options::default()).unwrap();
//! let top = reports.iter().find(|r| r.tree_name == "Top").unwrap();
//! assert!((top.ps - 0.154).abs() < 1e-12);
//! assert!((top.rows[0].mif - 0.94).abs() < 1e-12);
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: The manager and the gate combinator.
//! - **[`forest`]** and **[`scheduler`]**: Loading sub-trees and ordering them by dependencies.
//! - **[`eval`]** and **[`sensitivity`]**: Probabilities and importance measures.
//! - **[`analysis`]**: The batch driver producing one report per sub-tree.
//! - **[`dot`]**: Visualizing diagrams with Graphviz.
//! - **[`sat`]**: Counting failure states and finding a failure scenario.

pub mod analysis;
pub mod base;
pub mod bdd;
pub mod cache;
pub mod debug;
pub mod dot;
pub mod error;
pub mod eval;
pub mod forest;
pub mod gate;
pub mod node;
pub mod reference;
pub mod sat;
pub mod scheduler;
pub mod sensitivity;
pub mod table;
pub mod types;
pub mod utils;
