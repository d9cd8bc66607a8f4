//! The [`Bdd`] manager: node arena, combinator, and traversals.
//!
//! Every node lives in a unique table owned by the manager and is addressed by a
//! [`Ref`]. Structurally equal nodes are stored once (hash consing), and results
//! of [`Bdd::combine`] are memoized in a computed table. Nodes are never freed
//! individually: the whole arena is dropped together with the manager.

use std::cell::RefCell;
use std::cmp::min;
use std::collections::HashSet;
use std::fmt::Debug;

use log::debug;

use crate::cache::{Cache, OpKey};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::node::Node;
use crate::reference::Ref;
use crate::table::Table;
use crate::types::BaseId;

type Storage = Table<Node>;

/// Pending work of an iterative [`Bdd::combine`].
enum Step {
    /// Combine two operands.
    Expand(Ref, Ref),
    /// Pop the high and low results and build `ite(var, high, low)`.
    Build(OpKey, BaseId),
}

pub struct Bdd {
    storage: RefCell<Storage>,
    cache: RefCell<Cache<OpKey, Ref>>,
}

impl Bdd {
    /// Create a manager holding at most `2^storage_bits` nodes.
    pub fn new(storage_bits: usize) -> Self {
        assert!(
            (2..=31).contains(&storage_bits),
            "Storage bits should be in the range 2..=31"
        );

        let cache_bits = min(storage_bits, 16);

        let mut storage = Storage::new(storage_bits);

        // Allocate the constants at their reserved slots:
        let zero = storage.put(Node::False);
        assert_eq!(zero, Some(Ref::FALSE.index()));
        let one = storage.put(Node::True);
        assert_eq!(one, Some(Ref::TRUE.index()));

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(cache_bits)),
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(20)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .finish()
    }
}

impl Bdd {
    pub fn cache(&self) -> std::cell::Ref<'_, Cache<OpKey, Ref>> {
        self.cache.borrow()
    }

    /// Number of nodes in the arena, constants included.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    pub fn node(&self, node: Ref) -> Node {
        *self.storage.borrow().value(node.index())
    }

    /// The variable tested at `node`, `None` for constants.
    pub fn variable(&self, node: Ref) -> Option<BaseId> {
        self.node(node).variable()
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == Ref::FALSE
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == Ref::TRUE
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        self.node(node).is_terminal()
    }

    fn put(&self, node: Node) -> Result<Ref> {
        let mut storage = self.storage.borrow_mut();
        match storage.put(node) {
            Some(i) => Ok(Ref::new(i as u32)),
            None => Err(Error::StorageFull {
                capacity: storage.capacity(),
            }),
        }
    }

    /// The terminal for a single base event.
    pub fn mk_base(&self, var: BaseId) -> Result<Ref> {
        self.put(Node::Base(var))
    }

    /// Build `ite(var, high, low)`.
    ///
    /// Both branches must test only variables greater than `var`.
    pub fn mk_ite(&self, var: BaseId, high: Ref, low: Ref) -> Result<Ref> {
        debug!("mk(v = {}, high = {}, low = {})", var, high, low);

        debug_assert!(self.variable(high).map_or(true, |v| v > var));
        debug_assert!(self.variable(low).map_or(true, |v| v > var));

        // Handle duplicates
        if high == low {
            debug!("mk: duplicates {} == {}", high, low);
            return Ok(high);
        }

        // ite(v, 1, 0) is the base terminal itself
        if self.is_one(high) && self.is_zero(low) {
            return self.mk_base(var);
        }

        self.put(Node::Ite { var, high, low })
    }

    /// Cofactors `(high, low)` of `node` with respect to `v`, which must not be below the top variable.
    pub fn top_cofactors(&self, node: Ref, v: BaseId) -> (Ref, Ref) {
        let n = self.node(node);
        match (n.variable(), n.branches()) {
            (Some(var), Some(branches)) if var == v => branches,
            (Some(var), _) => {
                assert!(v < var, "Variable {} is below the top variable {}", v, var);
                (node, node)
            }
            _ => (node, node),
        }
    }

    /// Combine two diagrams under a gate.
    ///
    /// ```
    /// use fault_bdd::bdd::Bdd;
    /// use fault_bdd::gate::Gate;
    /// use fault_bdd::types::BaseId;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_base(BaseId::new(1001)).unwrap();
    /// let y = bdd.mk_base(BaseId::new(1002)).unwrap();
    /// let f = bdd.combine(x, y, Gate::And).unwrap();
    /// assert_eq!(f, bdd.mk_ite(BaseId::new(1001), y, fault_bdd::reference::Ref::FALSE).unwrap());
    /// ```
    pub fn combine(&self, a: Ref, b: Ref, gate: Gate) -> Result<Ref> {
        debug!("combine(a = {}, b = {}, gate = {})", a, b, gate);

        // Explicit work stack: the depth of a Shannon expansion grows with the
        // number of variables along a path, which may be thousands.
        let mut stack = vec![Step::Expand(a, b)];
        let mut results: Vec<Ref> = Vec::new();

        while let Some(step) = stack.pop() {
            match step {
                Step::Expand(a, b) => {
                    if let Some(res) = self.combine_terminal(a, b, gate) {
                        results.push(res);
                        continue;
                    }

                    let key = OpKey::new(a, b, gate);
                    if let Some(&res) = self.cache.borrow().get(&key) {
                        debug!("cache: combine(a = {}, b = {}, gate = {}) -> {}", a, b, gate, res);
                        results.push(res);
                        continue;
                    }

                    // From now on, both operands test some variable.
                    //
                    // Every remaining case is a Shannon expansion on the smaller top variable m,
                    // where a base terminal b has cofactors (1, 0):
                    //   b(i) op b(j), i < j  => AND: ite(i, b(j), 0)   OR: ite(i, 1, b(j))
                    //   b op F, b < var(F)   => AND: ite(b, F, 0)      OR: ite(b, 1, F)
                    //   b op F, b > var(F)   => ite(var(F), b op F1, b op F0)
                    //   b op F, b == var(F)  => AND: ite(b, F1, 0)     OR: ite(b, 1, F0)
                    //   F op G               => ite(m, F|m op G|m, F|~m op G|~m)
                    let m = match (self.variable(a), self.variable(b)) {
                        (Some(i), Some(j)) => i.min(j),
                        (Some(i), None) | (None, Some(i)) => i,
                        (None, None) => unreachable!("constant operands are handled by the base cases"),
                    };

                    let (a1, a0) = self.top_cofactors(a, m);
                    let (b1, b0) = self.top_cofactors(b, m);

                    // The high result is pushed first, so it sits below the low one.
                    stack.push(Step::Build(key, m));
                    stack.push(Step::Expand(a0, b0));
                    stack.push(Step::Expand(a1, b1));
                }
                Step::Build(key, m) => {
                    let (Some(low), Some(high)) = (results.pop(), results.pop()) else {
                        unreachable!("combine step {:?} is missing its operand results", key);
                    };
                    let res = self.mk_ite(m, high, low)?;
                    debug!("computed: combine {:?} -> {}", key, res);
                    self.cache.borrow_mut().insert(&key, res);
                    results.push(res);
                }
            }
        }

        debug_assert_eq!(results.len(), 1);
        match results.pop() {
            Some(res) => Ok(res),
            None => unreachable!("combine finished without a result"),
        }
    }

    /// Base cases of [`combine`][Bdd::combine]:
    ///   0 & G => 0,  1 | G => 1
    ///   1 & G => G,  0 | G => G
    ///   F op F => F
    fn combine_terminal(&self, a: Ref, b: Ref, gate: Gate) -> Option<Ref> {
        let absorbing = gate.absorbing();
        if a == absorbing || b == absorbing {
            return Some(absorbing);
        }
        if a == gate.identity() {
            return Some(b);
        }
        if b == gate.identity() {
            return Some(a);
        }
        if a == b {
            debug!("combine: idempotence {} {} {}", a, gate, b);
            return Some(a);
        }
        None
    }

    /// Fold `nodes` under `gate`: the first two are combined, then each next one
    /// is combined into the accumulator.
    ///
    /// A single node is returned as is; an empty input yields the gate's identity.
    pub fn combine_all(&self, nodes: impl IntoIterator<Item = Ref>, gate: Gate) -> Result<Ref> {
        let mut nodes = nodes.into_iter();
        let Some(mut acc) = nodes.next() else {
            return Ok(gate.identity());
        };
        for node in nodes {
            acc = self.combine(acc, node, gate)?;
        }
        Ok(acc)
    }

    /// All distinct nodes reachable from `root` (constants included), in pre-order
    /// with the high branch visited before the low one.
    pub fn descendants(&self, root: Ref) -> Vec<Ref> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            order.push(node);
            if let Node::Ite { high, low, .. } = self.node(node) {
                stack.push(low);
                stack.push(high);
            }
        }

        order
    }

    /// Distinct base events tested in `root`, in discovery order.
    pub fn bases(&self, root: Ref) -> Vec<BaseId> {
        let mut seen = HashSet::new();
        self.descendants(root)
            .into_iter()
            .filter_map(|node| self.variable(node))
            .filter(|&var| seen.insert(var))
            .collect()
    }

    /// Number of distinct non-constant nodes reachable from `f`.
    pub fn size(&self, f: Ref) -> usize {
        self.descendants(f)
            .into_iter()
            .filter(|node| !node.is_constant())
            .count()
    }
}
