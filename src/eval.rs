//! Top-event probability of a diagram.
//!
//! Evaluation never mutates the base event store: hypothetical probabilities are
//! passed as an [`Overrides`] map layered over the stored values.

use std::collections::HashMap;

use log::debug;

use crate::base::{check_probability, BaseEvents};
use crate::bdd::Bdd;
use crate::error::Result;
use crate::node::Node;
use crate::reference::Ref;
use crate::types::BaseId;

/// Probabilities replacing the stored ones for the duration of one evaluation.
pub type Overrides = HashMap<BaseId, f64>;

pub(crate) fn probability_of(events: &BaseEvents, overrides: &Overrides, var: BaseId) -> Result<f64> {
    match overrides.get(&var) {
        Some(&p) => check_probability(var, p),
        None => events.probability(var),
    }
}

impl Bdd {
    /// Probability that the top event of `root` occurs.
    ///
    /// Each `ite(v, high, low)` contributes `p(v)·P(high) + (1 − p(v))·P(low)`.
    /// The walk is an iterative post-order over the DAG, so deep diagrams do not
    /// grow the native stack, and every shared node is computed once per call.
    pub fn evaluate(&self, root: Ref, events: &BaseEvents, overrides: &Overrides) -> Result<f64> {
        let mut values: HashMap<Ref, f64> = HashMap::new();
        let mut stack = vec![(root, false)];

        while let Some((node, expanded)) = stack.pop() {
            if values.contains_key(&node) {
                continue;
            }
            let value = match self.node(node) {
                Node::False => 0.0,
                Node::True => 1.0,
                Node::Base(var) => probability_of(events, overrides, var)?,
                Node::Ite { var, high, low } => {
                    if !expanded {
                        stack.push((node, true));
                        stack.push((low, false));
                        stack.push((high, false));
                        continue;
                    }
                    let p = probability_of(events, overrides, var)?;
                    p * values[&high] + (1.0 - p) * values[&low]
                }
            };
            values.insert(node, value);
        }

        let ps = values[&root];
        debug!("evaluate(root = {}) -> {}", root, ps);
        Ok(ps)
    }

    /// Whether the top event occurs when exactly the base events in `failed` have failed.
    pub fn top_event(&self, root: Ref, failed: impl Fn(BaseId) -> bool) -> bool {
        let mut node = root;
        loop {
            match self.node(node) {
                Node::False => return false,
                Node::True => return true,
                Node::Base(var) => return failed(var),
                Node::Ite { var, high, low } => {
                    node = if failed(var) { high } else { low };
                }
            }
        }
    }
}
