//! Counting and witnessing failure states.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::node::Node;
use crate::reference::Ref;
use crate::types::BaseId;

impl Bdd {
    /// One assignment of base events under which the top event occurs.
    ///
    /// Base events not listed may take any value. Returns `None` if the top
    /// event can never occur.
    pub fn failure_scenario(&self, root: Ref) -> Option<Vec<(BaseId, bool)>> {
        if self.is_zero(root) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = root;

        // Walk down, preferring the failed branch whenever it can still reach 1
        loop {
            match self.node(current) {
                Node::True => break,
                Node::False => unreachable!("reduced diagrams never route into 0 from a satisfiable node"),
                Node::Base(var) => {
                    path.push((var, true));
                    break;
                }
                Node::Ite { var, high, low } => {
                    if !self.is_zero(high) {
                        path.push((var, true));
                        current = high;
                    } else {
                        path.push((var, false));
                        current = low;
                    }
                }
            }
        }

        Some(path)
    }

    /// Number of failed/working assignments of the base events of `root`
    /// for which the top event occurs.
    pub fn failure_count(&self, root: Ref) -> BigUint {
        self.failure_count_over(root, self.bases(root).len())
    }

    /// Like [`failure_count`][Bdd::failure_count], over `num_vars` base events,
    /// which must include every base event of `root`.
    pub fn failure_count_over(&self, root: Ref, num_vars: usize) -> BigUint {
        let max = BigUint::from(1u8) << num_vars;
        let mut counts: HashMap<Ref, BigUint> = HashMap::new();
        let mut stack = vec![(root, false)];

        while let Some((node, expanded)) = stack.pop() {
            if counts.contains_key(&node) {
                continue;
            }
            let count = match self.node(node) {
                Node::False => BigUint::ZERO,
                Node::True => max.clone(),
                Node::Base(_) => &max >> 1,
                Node::Ite { high, low, .. } => {
                    if !expanded {
                        stack.push((node, true));
                        stack.push((low, false));
                        stack.push((high, false));
                        continue;
                    }
                    (&counts[&high] + &counts[&low]) >> 1
                }
            };
            counts.insert(node, count);
        }

        counts.remove(&root).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;

    #[test]
    fn test_failure_count_small() {
        let bdd = Bdd::default();
        let x = bdd.mk_base(BaseId::new(1001)).unwrap();
        let y = bdd.mk_base(BaseId::new(1002)).unwrap();
        let and = bdd.combine(x, y, Gate::And).unwrap();
        let or = bdd.combine(x, y, Gate::Or).unwrap();
        assert_eq!(bdd.failure_count(and), BigUint::from(1u32));
        assert_eq!(bdd.failure_count(or), BigUint::from(3u32));
        assert_eq!(bdd.failure_count(x), BigUint::from(1u32));
        assert_eq!(bdd.failure_count_over(x, 3), BigUint::from(4u32));
        assert_eq!(bdd.failure_count(Ref::FALSE), BigUint::ZERO);
        assert_eq!(bdd.failure_count(Ref::TRUE), BigUint::from(1u32));
    }

    #[test]
    fn test_failure_count_wide_or() {
        let bdd = Bdd::default();
        let nodes: Vec<Ref> = (0..100)
            .map(|i| bdd.mk_base(BaseId::new(1001 + i)).unwrap())
            .collect();
        let f = bdd.combine_all(nodes, Gate::Or).unwrap();
        // Every assignment except "nothing failed".
        let expected = (BigUint::from(1u8) << 100usize) - BigUint::from(1u8);
        assert_eq!(bdd.failure_count(f), expected);
    }

    #[test]
    fn test_failure_scenario() {
        let bdd = Bdd::default();
        let x = bdd.mk_base(BaseId::new(1001)).unwrap();
        let y = bdd.mk_base(BaseId::new(1002)).unwrap();
        let and = bdd.combine(x, y, Gate::And).unwrap();
        assert_eq!(
            bdd.failure_scenario(and),
            Some(vec![(BaseId::new(1001), true), (BaseId::new(1002), true)])
        );
        assert_eq!(bdd.failure_scenario(Ref::FALSE), None);
        assert_eq!(bdd.failure_scenario(Ref::TRUE), Some(vec![]));

        let scenario = bdd.failure_scenario(and).unwrap();
        assert!(bdd.top_event(and, |v| scenario.contains(&(v, true))));
    }
}
