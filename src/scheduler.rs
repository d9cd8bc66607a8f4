//! Dependency ordering of sub-trees.
//!
//! A sub-tree can only be combined once every sub-tree it references has a root.
//! [`schedule`] orders the sub-trees with a layered Kahn topological sort: wave 1
//! holds the sub-trees without references, wave `k + 1` the ones whose references
//! all lie in waves `1..=k`. Within a wave, sub-trees keep their input order.

use std::collections::{BTreeSet, HashMap};

/// A complete evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Sub-tree indices, dependencies first.
    pub order: Vec<usize>,
    /// Number of waves (at most the number of sub-trees).
    pub waves: usize,
}

/// The sort got stuck on a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stuck {
    /// One cycle, closed: the first index is repeated at the end.
    pub cycle: Vec<usize>,
    /// Every other index that could not be scheduled, ascending.
    pub blocked: Vec<usize>,
}

/// Order `n = deps.len()` items where `deps[i]` lists the items `i` depends on.
pub fn schedule(deps: &[Vec<usize>]) -> Result<Schedule, Stuck> {
    let n = deps.len();

    let mut pending = vec![0usize; n];
    let mut dependents = vec![Vec::new(); n];
    for (i, ds) in deps.iter().enumerate() {
        let unique: BTreeSet<usize> = ds.iter().copied().collect();
        pending[i] = unique.len();
        for d in unique {
            assert!(d < n, "Dependency index {} out of range", d);
            dependents[d].push(i);
        }
    }

    let mut order = Vec::with_capacity(n);
    let mut waves = 0;
    let mut wave: Vec<usize> = (0..n).filter(|&i| pending[i] == 0).collect();

    while !wave.is_empty() {
        waves += 1;
        let mut next = Vec::new();
        for &i in &wave {
            order.push(i);
            for &j in &dependents[i] {
                pending[j] -= 1;
                if pending[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        wave = next;
    }

    if order.len() == n {
        return Ok(Schedule { order, waves });
    }

    // Every remaining item still waits on at least one remaining item,
    // so following those edges from any of them must close a cycle.
    let remaining: Vec<usize> = (0..n).filter(|&i| pending[i] > 0).collect();
    let mut path = Vec::new();
    let mut position = HashMap::new();
    let mut current = remaining[0];
    let cycle = loop {
        if let Some(&pos) = position.get(&current) {
            let mut cycle: Vec<usize> = path[pos..].to_vec();
            cycle.push(current);
            break cycle;
        }
        position.insert(current, path.len());
        path.push(current);
        current = match deps[current].iter().find(|&&d| pending[d] > 0) {
            Some(&d) => d,
            None => unreachable!("item {} is pending without pending dependencies", current),
        };
    };

    let on_cycle: BTreeSet<usize> = cycle.iter().copied().collect();
    let blocked = remaining
        .into_iter()
        .filter(|i| !on_cycle.contains(i))
        .collect();

    Err(Stuck { cycle, blocked })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent() {
        let s = schedule(&[vec![], vec![], vec![]]).unwrap();
        assert_eq!(s.order, vec![0, 1, 2]);
        assert_eq!(s.waves, 1);
    }

    #[test]
    fn test_chain() {
        // 0 -> 1 -> 2 (0 needs 1, 1 needs 2)
        let s = schedule(&[vec![1], vec![2], vec![]]).unwrap();
        assert_eq!(s.order, vec![2, 1, 0]);
        assert_eq!(s.waves, 3);
    }

    #[test]
    fn test_diamond_with_duplicates() {
        let deps = vec![vec![1, 2, 1], vec![3], vec![3], vec![]];
        let s = schedule(&deps).unwrap();
        assert_eq!(s.order, vec![3, 1, 2, 0]);
        assert_eq!(s.waves, 3);
    }

    #[test]
    fn test_empty() {
        let s = schedule(&[]).unwrap();
        assert!(s.order.is_empty());
        assert_eq!(s.waves, 0);
    }

    #[test]
    fn test_self_reference() {
        let stuck = schedule(&[vec![], vec![1]]).unwrap_err();
        assert_eq!(stuck.cycle, vec![1, 1]);
        assert!(stuck.blocked.is_empty());
    }

    #[test]
    fn test_cycle_with_blocked() {
        // 1 <-> 2, 3 needs 1, 0 is free.
        let deps = vec![vec![], vec![2], vec![1], vec![1]];
        let stuck = schedule(&deps).unwrap_err();
        assert_eq!(stuck.cycle, vec![1, 2, 1]);
        assert_eq!(stuck.blocked, vec![3]);
    }

    #[test]
    fn test_blocked_item_reaches_cycle() {
        // 0 needs 1, 1 <-> 2: walking from 0 ends in the 1-2 cycle.
        let deps = vec![vec![1], vec![2], vec![1]];
        let stuck = schedule(&deps).unwrap_err();
        assert_eq!(stuck.cycle, vec![1, 2, 1]);
        assert_eq!(stuck.blocked, vec![0]);
    }
}
