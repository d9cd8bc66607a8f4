//! Sub-tree loading and dependency resolution.
//!
//! Input arrives as one [`TreePage`] per sub-tree. Rows with ids above
//! [`BASE_ID_THRESHOLD`] are base events; the others reference another sub-tree
//! by its `ID` parameter. A sub-tree made only of base events is combined while
//! loading; the rest are combined by [`Forest::resolve`] in dependency order.

use std::cmp::Reverse;
use std::collections::HashMap;

use log::{debug, info};

use crate::base::{BaseEvent, BaseEvents};
use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::reference::Ref;
use crate::scheduler::{schedule, Schedule, Stuck};
use crate::types::{BaseId, RowKind, TreeId, BASE_ID_THRESHOLD};

/// Page parameters describing one sub-tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeParams {
    pub id: i64,
    pub tree_name: String,
    pub description: String,
    /// `0` for AND, `1` for OR.
    pub logical_type: i16,
    pub logical_type_desc: String,
}

/// One member row of a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub id: i64,
    /// Ignored for rows referencing sub-trees.
    pub probability: f64,
    pub description: String,
    pub guidance: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreePage {
    pub params: TreeParams,
    pub rows: Vec<Row>,
}

impl TreePage {
    pub fn new(id: i64, tree_name: &str, gate: Gate) -> Self {
        Self {
            params: TreeParams {
                id,
                tree_name: tree_name.to_string(),
                description: String::new(),
                logical_type: gate.code(),
                logical_type_desc: gate.to_string(),
            },
            rows: Vec::new(),
        }
    }

    pub fn with_base(mut self, id: i64, probability: f64, label: &str) -> Self {
        self.rows.push(Row {
            id,
            probability,
            label: label.to_string(),
            ..Row::default()
        });
        self
    }

    pub fn with_tree(mut self, id: i64) -> Self {
        self.rows.push(Row {
            id,
            ..Row::default()
        });
        self
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Member {
    Base(BaseId),
    Tree(TreeId),
}

#[derive(Debug, Clone)]
pub struct SubTree {
    pub id: TreeId,
    pub name: String,
    pub description: String,
    pub gate: Gate,
    pub gate_desc: String,
    pub members: Vec<Member>,
    root: Option<Ref>,
}

impl SubTree {
    /// The combined diagram, once computed.
    pub fn root(&self) -> Option<Ref> {
        self.root
    }

    pub fn is_computed(&self) -> bool {
        self.root.is_some()
    }

    pub fn is_all_base(&self) -> bool {
        self.members.iter().all(|m| matches!(m, Member::Base(_)))
    }

    fn dependencies(&self) -> impl Iterator<Item = (usize, TreeId)> + '_ {
        self.members.iter().enumerate().filter_map(|(pos, m)| match *m {
            Member::Tree(id) => Some((pos, id)),
            Member::Base(_) => None,
        })
    }
}

/// All sub-trees of one batch, together with the manager owning their diagrams.
#[derive(Debug)]
pub struct Forest {
    bdd: Bdd,
    events: BaseEvents,
    trees: Vec<SubTree>,
    index: HashMap<TreeId, usize>,
}

impl Forest {
    pub fn load(pages: impl IntoIterator<Item = TreePage>) -> Result<Self> {
        Self::load_with(Bdd::default(), pages)
    }

    /// Load pages into the given manager.
    ///
    /// Fails on the first invalid page or on a reference to an undefined sub-tree.
    pub fn load_with(bdd: Bdd, pages: impl IntoIterator<Item = TreePage>) -> Result<Self> {
        let mut forest = Forest {
            bdd,
            events: BaseEvents::new(),
            trees: Vec::new(),
            index: HashMap::new(),
        };

        for page in pages {
            forest.add_page(page)?;
        }
        forest.check_references()?;

        info!(
            "Total Bases: {}, Total sub-trees: {}",
            forest.events.len(),
            forest.trees.len()
        );
        Ok(forest)
    }

    fn add_page(&mut self, page: TreePage) -> Result<()> {
        let TreePage { params, rows } = page;

        if rows.is_empty() {
            debug!("skipping empty page for sub-tree '{}'", params.tree_name);
            return Ok(());
        }

        let gate = Gate::from_code(params.logical_type).ok_or_else(|| Error::InvalidGate {
            tree: params.tree_name.clone(),
            code: params.logical_type,
        })?;
        if let Some(desc_gate) = Gate::from_desc(&params.logical_type_desc) {
            if desc_gate != gate {
                return Err(Error::InconsistentGate {
                    tree: params.tree_name,
                    gate,
                    desc: params.logical_type_desc,
                });
            }
        }

        if params.id > BASE_ID_THRESHOLD {
            return Err(Error::OutOfRangeId {
                tree: params.tree_name,
                id: params.id,
            });
        }
        let id = TreeId::new(params.id);
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateTree { id });
        }

        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            match RowKind::classify(row.id) {
                Some(RowKind::Base(base)) => {
                    self.events.insert(BaseEvent {
                        id: base,
                        probability: row.probability,
                        label: row.label,
                        description: row.description,
                        guidance: row.guidance,
                    })?;
                    members.push(Member::Base(base));
                }
                Some(RowKind::Tree(tree)) => members.push(Member::Tree(tree)),
                None => {
                    return Err(Error::OutOfRangeId {
                        tree: params.tree_name,
                        id: row.id,
                    })
                }
            }
        }

        let mut tree = SubTree {
            id,
            name: params.tree_name,
            description: params.description,
            gate,
            gate_desc: params.logical_type_desc,
            members,
            root: None,
        };

        if tree.is_all_base() {
            let nodes = tree
                .members
                .iter()
                .filter_map(|m| match *m {
                    Member::Base(base) => Some(self.bdd.mk_base(base)),
                    Member::Tree(_) => None,
                })
                .collect::<Result<Vec<_>>>()?;
            let root = self.combine_members(nodes, gate)?;
            debug!("sub-tree '{}' combined at load: root = {}", tree.name, root);
            tree.root = Some(root);
        }

        self.index.insert(id, self.trees.len());
        self.trees.push(tree);
        Ok(())
    }

    fn check_references(&self) -> Result<()> {
        for tree in &self.trees {
            for (position, member) in tree.dependencies() {
                if !self.index.contains_key(&member) {
                    return Err(Error::UnresolvedDependency {
                        tree: tree.name.clone(),
                        member,
                        position,
                    });
                }
            }
        }
        Ok(())
    }

    /// Combine every pending sub-tree, dependencies first.
    ///
    /// Returns the evaluation order over all sub-trees. A cycle fails the whole
    /// batch before any pending sub-tree is combined.
    pub fn resolve(&mut self) -> Result<Schedule> {
        let deps: Vec<Vec<usize>> = self
            .trees
            .iter()
            .map(|tree| tree.dependencies().map(|(_, id)| self.index[&id]).collect())
            .collect();

        let schedule = schedule(&deps).map_err(|Stuck { cycle, blocked }| {
            let name = |i: usize| self.trees[i].name.clone();
            Error::DependencyCycle {
                cycle: cycle.into_iter().map(name).collect(),
                blocked: blocked.into_iter().map(name).collect(),
            }
        })?;
        debug!(
            "schedule: {} sub-trees in {} waves",
            schedule.order.len(),
            schedule.waves
        );

        for &i in &schedule.order {
            if self.trees[i].is_computed() {
                continue;
            }
            let nodes = self.trees[i]
                .members
                .iter()
                .enumerate()
                .map(|(position, &member)| self.member_root(i, position, member))
                .collect::<Result<Vec<_>>>()?;
            let root = self.combine_members(nodes, self.trees[i].gate)?;
            let tree = &mut self.trees[i];
            debug!("sub-tree '{}' combined: root = {}", tree.name, root);
            tree.root = Some(root);
        }

        Ok(schedule)
    }

    /// Fold the member roots of one sub-tree under `gate`.
    ///
    /// Nodes are interned, so the root does not depend on the fold order. Folding
    /// from the largest top variable down keeps a wide gate over base events a
    /// single chain, while an ascending fold allocates `n²/2` intermediate nodes.
    fn combine_members(&self, mut nodes: Vec<Ref>, gate: Gate) -> Result<Ref> {
        nodes.sort_by_key(|&node| Reverse(self.bdd.variable(node)));
        self.bdd.combine_all(nodes, gate)
    }

    fn member_root(&self, tree: usize, position: usize, member: Member) -> Result<Ref> {
        match member {
            Member::Base(base) => self.bdd.mk_base(base),
            Member::Tree(id) => self
                .index
                .get(&id)
                .and_then(|&j| self.trees[j].root)
                .ok_or_else(|| Error::UnresolvedDependency {
                    tree: self.trees[tree].name.clone(),
                    member: id,
                    position,
                }),
        }
    }

    pub fn bdd(&self) -> &Bdd {
        &self.bdd
    }

    pub fn events(&self) -> &BaseEvents {
        &self.events
    }

    pub fn trees(&self) -> &[SubTree] {
        &self.trees
    }

    pub fn tree(&self, id: TreeId) -> Option<&SubTree> {
        self.index.get(&id).map(|&i| &self.trees[i])
    }

    pub fn tree_by_name(&self, name: &str) -> Option<&SubTree> {
        self.trees.iter().find(|tree| tree.name == name)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn pages() -> Vec<TreePage> {
        vec![
            TreePage::new(1, "Top", Gate::Or)
                .with_base(1001, 0.1, "a")
                .with_tree(2),
            TreePage::new(2, "Both", Gate::And)
                .with_base(1002, 0.2, "b")
                .with_base(1003, 0.3, "c"),
        ]
    }

    #[test]
    fn test_load_all_base_combined_immediately() {
        let forest = Forest::load(pages()).unwrap();
        assert_eq!(forest.trees().len(), 2);
        assert_eq!(forest.events().len(), 3);

        let top = forest.tree(TreeId::new(1)).unwrap();
        assert!(!top.is_computed());
        assert_eq!(
            top.members,
            vec![Member::Base(BaseId::new(1001)), Member::Tree(TreeId::new(2))]
        );

        let both = forest.tree_by_name("Both").unwrap();
        assert!(both.is_all_base());
        assert!(both.is_computed());
    }

    #[test]
    fn test_resolve() {
        let mut forest = Forest::load(pages()).unwrap();
        let schedule = forest.resolve().unwrap();
        assert_eq!(schedule.order, vec![1, 0]);
        assert_eq!(schedule.waves, 2);

        let bdd = forest.bdd();
        let both = forest.tree(TreeId::new(2)).unwrap().root().unwrap();
        let top = forest.tree(TreeId::new(1)).unwrap().root().unwrap();
        let a = bdd.mk_base(BaseId::new(1001)).unwrap();
        assert_eq!(top, bdd.combine(a, both, Gate::Or).unwrap());
    }

    #[test]
    fn test_single_member_tree() {
        let pages = vec![
            TreePage::new(1, "Wrapper", Gate::And).with_tree(2),
            TreePage::new(2, "Leaf", Gate::Or).with_base(1001, 0.5, "a"),
        ];
        let mut forest = Forest::load(pages).unwrap();
        forest.resolve().unwrap();
        let bdd = forest.bdd();
        let leaf = bdd.mk_base(BaseId::new(1001)).unwrap();
        assert_eq!(forest.tree(TreeId::new(1)).unwrap().root(), Some(leaf));
        assert_eq!(forest.tree(TreeId::new(2)).unwrap().root(), Some(leaf));
    }

    #[test]
    fn test_shared_base_first_occurrence() {
        let pages = vec![
            TreePage::new(1, "X", Gate::Or)
                .with_base(1001, 0.1, "a")
                .with_base(1002, 0.2, "b"),
            TreePage::new(2, "Y", Gate::And)
                .with_base(1001, 0.9, "a-again")
                .with_base(1003, 0.3, "c"),
        ];
        let forest = Forest::load(pages).unwrap();
        let a = forest.events().get(BaseId::new(1001)).unwrap();
        assert_eq!(a.probability, 0.1);
        assert_eq!(a.label, "a");
    }

    #[test]
    fn test_empty_page_skipped() {
        let pages = vec![
            TreePage::new(1, "Empty", Gate::And),
            TreePage::new(2, "Leaf", Gate::Or).with_base(1001, 0.5, "a"),
        ];
        let forest = Forest::load(pages).unwrap();
        assert_eq!(forest.trees().len(), 1);
        assert!(forest.tree(TreeId::new(1)).is_none());
    }

    #[test]
    fn test_unresolved_dependency() {
        let pages = vec![TreePage::new(1, "Top", Gate::Or)
            .with_base(1001, 0.1, "a")
            .with_tree(7)];
        match Forest::load(pages) {
            Err(Error::UnresolvedDependency {
                tree,
                member,
                position,
            }) => {
                assert_eq!(tree, "Top");
                assert_eq!(member, TreeId::new(7));
                assert_eq!(position, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_gate() {
        let mut page = TreePage::new(1, "Top", Gate::Or).with_base(1001, 0.1, "a");
        page.params.logical_type = 3;
        assert!(matches!(
            Forest::load([page]),
            Err(Error::InvalidGate { code: 3, .. })
        ));
    }

    #[test]
    fn test_inconsistent_gate() {
        let mut page = TreePage::new(1, "Top", Gate::Or).with_base(1001, 0.1, "a");
        page.params.logical_type_desc = "and".to_string();
        assert!(matches!(
            Forest::load([page]),
            Err(Error::InconsistentGate { gate: Gate::Or, .. })
        ));

        // Free-form descriptions are accepted.
        let mut page = TreePage::new(1, "Top", Gate::Or).with_base(1001, 0.1, "a");
        page.params.logical_type_desc = "any of".to_string();
        assert!(Forest::load([page]).is_ok());
    }

    #[test]
    fn test_out_of_range_tree_id() {
        let page = TreePage::new(1001, "Top", Gate::Or).with_base(1002, 0.1, "a");
        assert!(matches!(
            Forest::load([page]),
            Err(Error::OutOfRangeId { id: 1001, .. })
        ));

        let page = TreePage::new(1, "Top", Gate::Or).with_base(1i64 << 40, 0.1, "a");
        assert!(matches!(
            Forest::load([page]),
            Err(Error::OutOfRangeId { .. })
        ));
    }

    #[test]
    fn test_duplicate_tree() {
        let pages = vec![
            TreePage::new(1, "A", Gate::Or).with_base(1001, 0.1, "a"),
            TreePage::new(1, "B", Gate::Or).with_base(1002, 0.1, "b"),
        ];
        assert!(matches!(
            Forest::load(pages),
            Err(Error::DuplicateTree { .. })
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let pages = vec![
            TreePage::new(1, "A", Gate::Or)
                .with_base(1001, 0.1, "a")
                .with_tree(2),
            TreePage::new(2, "B", Gate::And)
                .with_base(1002, 0.2, "b")
                .with_tree(1),
            TreePage::new(3, "C", Gate::And)
                .with_base(1003, 0.3, "c")
                .with_tree(1),
        ];
        let mut forest = Forest::load(pages).unwrap();
        match forest.resolve() {
            Err(Error::DependencyCycle { cycle, blocked }) => {
                assert_eq!(cycle, vec!["A", "B", "A"]);
                assert_eq!(blocked, vec!["C"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!forest.tree(TreeId::new(3)).unwrap().is_computed());
    }

    #[test]
    fn test_wide_gate_stays_linear() {
        let n = 1500;
        let page = (0..n).fold(TreePage::new(1, "Wide", Gate::Or), |page, i| {
            page.with_base(1001 + i, 0.01, "")
        });
        // 2^12 slots hold the n base terminals and the n - 1 chain nodes above them.
        let forest = Forest::load_with(Bdd::new(12), [page]).unwrap();
        let root = forest.tree(TreeId::new(1)).unwrap().root().unwrap();
        assert_eq!(forest.bdd().size(root), n as usize);
        assert_eq!(forest.bdd().num_nodes(), 2 * n as usize - 1 + 2);
    }
}
