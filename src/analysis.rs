//! Batch analysis of a fault tree forest.
//!
//! [`analyze`] combines every sub-tree in dependency order and produces one
//! [`TreeReport`] per selected sub-tree, holding the top-event probability and
//! the importance of each base event below it.

use std::collections::HashSet;
use std::io::{self, Write};

use log::{info, warn};

use crate::base::BaseEvents;
use crate::error::{Error, Result};
use crate::eval::Overrides;
use crate::forest::{Forest, SubTree, TreePage};
use crate::gate::Gate;
use crate::reference::Ref;
use crate::types::{BaseId, TreeId};

/// Selection controls of a batch.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Names of the sub-trees to report on; `None` reports on all of them.
    pub selected: Option<Vec<String>>,
    /// Labels of base events known to work (probability 0).
    pub good: Vec<String>,
    /// Labels of base events known to have failed (probability 1).
    pub bad: Vec<String>,
    /// Dump the structure of every combined sub-tree.
    pub verbose: bool,
}

/// One base event row of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub base_id: BaseId,
    pub label: String,
    pub probability: f64,
    pub dif: f64,
    pub mif: f64,
    /// Top-event probability with this base event failed.
    pub ps: f64,
    /// Top-event probability with this base event working.
    pub pes: f64,
    pub description: String,
    pub guidance: String,
}

/// Result page of one sub-tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeReport {
    pub id: TreeId,
    pub tree_name: String,
    pub description: String,
    pub gate: Gate,
    pub logical_type_desc: String,
    /// Top-event probability of the sub-tree.
    pub ps: f64,
    pub rows: Vec<ReportRow>,
}

/// Probabilities of known-good (0) and known-bad (1) base events, by label.
///
/// The store itself is left untouched, so every batch starts from the loaded values.
pub fn forced_overrides(events: &BaseEvents, good: &[String], bad: &[String]) -> Result<Overrides> {
    if let Some(label) = good.iter().find(|label| bad.contains(label)) {
        return Err(Error::ConflictingForce {
            label: label.clone(),
        });
    }
    let mut overrides = Overrides::new();
    for (labels, value) in [(good, 0.0), (bad, 1.0)] {
        for label in labels {
            match events.find_label(label) {
                Some(id) => {
                    info!("base event {} ('{}') forced to {}", id, label, value);
                    overrides.insert(id, value);
                }
                None => warn!("no base event labeled '{}', ignoring", label),
            }
        }
    }
    Ok(overrides)
}

/// Load `pages` and analyze them, dumping structures to stderr when verbose.
pub fn run(pages: impl IntoIterator<Item = TreePage>, options: &Options) -> Result<Vec<TreeReport>> {
    let mut forest = Forest::load(pages)?;
    analyze(&mut forest, options)
}

pub fn analyze(forest: &mut Forest, options: &Options) -> Result<Vec<TreeReport>> {
    analyze_with_dump(forest, options, &mut io::stderr().lock())
}

/// Analyze `forest`, writing verbose structure dumps to `dump`.
pub fn analyze_with_dump<W: Write>(
    forest: &mut Forest,
    options: &Options,
    dump: &mut W,
) -> Result<Vec<TreeReport>> {
    let forced = forced_overrides(forest.events(), &options.good, &options.bad)?;

    let selected: Option<HashSet<&str>> = options
        .selected
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect());
    if let Some(names) = &selected {
        for &name in names {
            if forest.tree_by_name(name).is_none() {
                warn!("no sub-tree named '{}', ignoring", name);
            }
        }
    }

    let schedule = forest.resolve()?;

    let mut reports = Vec::new();
    for i in schedule.order {
        let tree = &forest.trees()[i];
        let Some(root) = tree.root() else {
            unreachable!("resolved sub-tree '{}' has no root", tree.name);
        };

        if options.verbose {
            writeln!(dump, "Sub-tree '{}' (ID {}):", tree.name, tree.id.id())?;
            forest.bdd().write_structure(root, dump)?;
        }

        if selected
            .as_ref()
            .is_some_and(|names| !names.contains(tree.name.as_str()))
        {
            continue;
        }

        reports.push(report(forest, tree, root, &forced)?);
    }

    info!("Reported {} sub-trees", reports.len());
    Ok(reports)
}

fn report(forest: &Forest, tree: &SubTree, root: Ref, forced: &Overrides) -> Result<TreeReport> {
    let sensitivity = forest.bdd().sensitivity_with(root, forest.events(), forced)?;

    let rows = sensitivity
        .importances
        .into_iter()
        .map(|imp| {
            let event = forest
                .events()
                .get(imp.base)
                .ok_or(Error::UnknownBaseEvent { id: imp.base })?;
            Ok(ReportRow {
                base_id: imp.base,
                label: event.label.clone(),
                probability: imp.probability,
                dif: imp.dif,
                mif: imp.mif,
                ps: imp.ps,
                pes: imp.pes,
                description: event.description.clone(),
                guidance: event.guidance.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TreeReport {
        id: tree.id,
        tree_name: tree.name.clone(),
        description: tree.description.clone(),
        gate: tree.gate,
        logical_type_desc: tree.gate_desc.clone(),
        ps: sensitivity.ps,
        rows,
    })
}
