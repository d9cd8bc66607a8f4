//! Importance measures of base events.
//!
//! For a base event `b` with probability `p` below a top event with probability `PS`:
//!
//! ```text
//! PS(b)  = P(top | b = 1)
//! PES(b) = P(top | b = 0)
//! MIF(b) = PS(b) − PES(b)
//! DIF(b) = p + p·(1 − p)·MIF(b) / PS
//! ```
//!
//! `DIF` is `p` when `PS` is zero.

use log::debug;

use crate::base::BaseEvents;
use crate::bdd::Bdd;
use crate::error::Result;
use crate::eval::{probability_of, Overrides};
use crate::reference::Ref;
use crate::types::BaseId;

/// Importance of one base event within one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Importance {
    pub base: BaseId,
    /// The base event's own probability.
    pub probability: f64,
    /// Top-event probability with the base event forced to 1.
    pub ps: f64,
    /// Top-event probability with the base event forced to 0.
    pub pes: f64,
    /// Marginal Importance Factor.
    pub mif: f64,
    /// Diagnostic Importance Factor.
    pub dif: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sensitivity {
    /// Top-event probability under the stored probabilities.
    pub ps: f64,
    /// One entry per distinct base event of the diagram, in discovery order.
    pub importances: Vec<Importance>,
}

impl Sensitivity {
    pub fn get(&self, base: BaseId) -> Option<&Importance> {
        self.importances.iter().find(|imp| imp.base == base)
    }
}

pub(crate) fn diagnostic_importance(p: f64, mif: f64, ps: f64) -> f64 {
    if ps == 0.0 {
        p
    } else {
        p + p * (1.0 - p) * mif / ps
    }
}

impl Bdd {
    /// Compute MIF and DIF of every base event below `root`.
    pub fn sensitivity(&self, root: Ref, events: &BaseEvents) -> Result<Sensitivity> {
        self.sensitivity_with(root, events, &Overrides::new())
    }

    /// Like [`sensitivity`][Bdd::sensitivity], with `base` probabilities layered
    /// over the stored ones for every evaluation.
    pub fn sensitivity_with(&self, root: Ref, events: &BaseEvents, base: &Overrides) -> Result<Sensitivity> {
        let ps = self.evaluate(root, events, base)?;

        let mut importances = Vec::new();
        let mut overrides = base.clone();
        for var in self.bases(root) {
            let probability = probability_of(events, base, var)?;

            overrides.insert(var, 1.0);
            let ps1 = self.evaluate(root, events, &overrides)?;
            overrides.insert(var, 0.0);
            let ps0 = self.evaluate(root, events, &overrides)?;
            match base.get(&var) {
                Some(&p) => overrides.insert(var, p),
                None => overrides.remove(&var),
            };

            let mif = ps1 - ps0;
            let dif = diagnostic_importance(probability, mif, ps);
            debug!(
                "Base {}: prob={:.6}, ps={:.6}, pes={:.6}, MIF={:.6}, DIF={:.6}",
                var, probability, ps1, ps0, mif, dif
            );

            importances.push(Importance {
                base: var,
                probability,
                ps: ps1,
                pes: ps0,
                mif,
                dif,
            });
        }

        Ok(Sensitivity { ps, importances })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::base::BaseEvent;
    use crate::gate::Gate;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_sensitivity_or_of_and() {
        let bdd = Bdd::default();
        let mut events = BaseEvents::new();
        let ids: Vec<BaseId> = (1001..=1003).map(BaseId::new).collect();
        for (&id, p) in ids.iter().zip([0.1, 0.2, 0.3]) {
            events.insert(BaseEvent::new(id, p)).unwrap();
        }
        let x = bdd.mk_base(ids[0]).unwrap();
        let y = bdd.mk_base(ids[1]).unwrap();
        let z = bdd.mk_base(ids[2]).unwrap();
        let yz = bdd.combine(y, z, Gate::And).unwrap();
        let f = bdd.combine(x, yz, Gate::Or).unwrap();

        let s = bdd.sensitivity(f, &events).unwrap();
        assert_close(s.ps, 0.154);
        assert_eq!(
            s.importances.iter().map(|imp| imp.base).collect::<Vec<_>>(),
            ids
        );

        let x_imp = s.get(ids[0]).unwrap();
        assert_close(x_imp.ps, 1.0);
        assert_close(x_imp.pes, 0.06);
        assert_close(x_imp.mif, 0.94);
        assert_close(x_imp.dif, 0.1 + 0.1 * 0.9 * 0.94 / 0.154);

        // y only matters when x works and z fails.
        let y_imp = s.get(ids[1]).unwrap();
        assert_close(y_imp.mif, 0.9 * 0.3);

        // Stored probabilities are not touched.
        assert_eq!(events.probability(ids[0]).unwrap(), 0.1);
    }

    #[test]
    fn test_dif_with_zero_ps() {
        assert_eq!(diagnostic_importance(0.3, 0.0, 0.0), 0.3);
        assert_close(diagnostic_importance(0.5, 0.5, 0.25), 0.5 + 0.25 * 0.5 / 0.25);
    }

    #[test]
    fn test_sensitivity_constant_root() {
        let bdd = Bdd::default();
        let events = BaseEvents::new();
        let s = bdd.sensitivity(Ref::TRUE, &events).unwrap();
        assert_eq!(s.ps, 1.0);
        assert!(s.importances.is_empty());
    }

    #[test]
    fn test_sensitivity_with_overrides() {
        let bdd = Bdd::default();
        let mut events = BaseEvents::new();
        let ids: Vec<BaseId> = (1001..=1003).map(BaseId::new).collect();
        for (&id, p) in ids.iter().zip([0.1, 0.2, 0.3]) {
            events.insert(BaseEvent::new(id, p)).unwrap();
        }
        let nodes: Vec<Ref> = ids.iter().map(|&id| bdd.mk_base(id).unwrap()).collect();
        let yz = bdd.combine(nodes[1], nodes[2], Gate::And).unwrap();
        let f = bdd.combine(nodes[0], yz, Gate::Or).unwrap();

        // x works for sure: the top event is y AND z.
        let base = Overrides::from([(ids[0], 0.0)]);
        let s = bdd.sensitivity_with(f, &events, &base).unwrap();
        assert_close(s.ps, 0.06);
        let x_imp = s.get(ids[0]).unwrap();
        assert_eq!(x_imp.probability, 0.0);
        assert_close(x_imp.mif, 0.94);
        assert_eq!(x_imp.dif, 0.0);
        // The forced value of x stays in place while y is varied.
        assert_close(s.get(ids[1]).unwrap().mif, 0.3);

        assert_close(bdd.sensitivity(f, &events).unwrap().ps, 0.154);
    }
}
