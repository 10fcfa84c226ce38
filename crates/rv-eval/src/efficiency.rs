//! Efficiency-factor propagation up the group hierarchy.
//!
//! A well's efficiency factor does not scale its own instantaneous rate;
//! it models short open/shut intervals inside a step, so it only applies
//! to accumulated values. Groups behave the same way: a group's own factor
//! is excluded from that group's rate (the rate is the sum of the
//! children's already-factored rates) but included in everything above it.
//! Region and field vectors carry the full chain for both rates and
//! totals.

use rv_core::Real;
use rv_schedule::{Schedule, Well};

use crate::node::{Category, Kind, SummaryNode};

#[derive(Clone, Debug, Default)]
pub struct EfficiencyFactors {
    factors: Vec<(String, Real)>,
}

impl EfficiencyFactors {
    /// Compute the per-well factor table for one node at one step.
    ///
    /// Left empty for well/connection/segment rate vectors, which are
    /// never efficiency-scaled.
    pub fn resolve(
        node: &SummaryNode,
        schedule: &Schedule,
        wells: &[&Well],
        sim_step: usize,
    ) -> Self {
        let mut out = Self::default();

        let is_field = node.category == Category::Field;
        let is_group = node.category == Category::Group;
        let is_region = node.category == Category::Region;
        let is_rate = node.kind != Kind::Total;

        if !is_field && !is_group && !is_region && is_rate {
            return out;
        }

        let step = schedule.step(sim_step);
        for well in wells {
            let mut factor = well.efficiency_factor;

            let mut group = step.group(&well.group);
            while let Some(g) = group {
                // A group's own factor applies to accumulation above it,
                // not to the group's instantaneous rate.
                if is_group && is_rate && g.name == node.name() {
                    break;
                }
                factor *= g.efficiency_factor;
                group = g.parent.as_deref().and_then(|p| step.group(p));
            }

            out.factors.push((well.name.clone(), factor));
        }

        out
    }

    /// Factor for one well; wells outside the table are unscaled.
    pub fn factor(&self, name: &str) -> Real {
        self.factors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| *f)
            .unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rv_schedule::{Group, ScheduleStep};

    /// FIELD(1.0) -> G1(0.8) -> G2(0.5) -> OP01(0.9)
    fn hierarchy() -> Schedule {
        let mut field = Group::new("FIELD", 0, None);
        field.groups.push("G1".to_owned());
        let mut g1 = Group::new("G1", 1, Some("FIELD"));
        g1.efficiency_factor = 0.8;
        g1.groups.push("G2".to_owned());
        let mut g2 = Group::new("G2", 2, Some("G1"));
        g2.efficiency_factor = 0.5;
        g2.wells.push("OP01".to_owned());

        let mut op = Well::new("OP01", 0, "G2");
        op.efficiency_factor = 0.9;

        let step = ScheduleStep::new(vec![op], vec![field, g1, g2]);
        Schedule::new(Utc::now(), vec![step]).unwrap()
    }

    fn node(keyword: &str, category: Category, kind: Kind, wgname: Option<&str>) -> SummaryNode {
        SummaryNode {
            keyword: keyword.to_owned(),
            category,
            kind,
            wgname: wgname.map(str::to_owned),
            number: 0,
            fip_region2: None,
        }
    }

    #[test]
    fn well_rate_has_no_factors() {
        let sched = hierarchy();
        let wells: Vec<_> = sched.step(0).wells().iter().collect();
        let eff = EfficiencyFactors::resolve(
            &node("WOPR", Category::Well, Kind::Rate, Some("OP01")),
            &sched,
            &wells,
            0,
        );
        assert!(eff.is_empty());
        assert_eq!(eff.factor("OP01"), 1.0);
    }

    #[test]
    fn well_total_carries_full_chain() {
        let sched = hierarchy();
        let wells: Vec<_> = sched.step(0).wells().iter().collect();
        let eff = EfficiencyFactors::resolve(
            &node("WOPT", Category::Well, Kind::Total, Some("OP01")),
            &sched,
            &wells,
            0,
        );
        // 0.9 * 0.5 * 0.8 * 1.0
        assert!((eff.factor("OP01") - 0.36).abs() < 1e-12);
    }

    #[test]
    fn group_rate_excludes_own_factor() {
        let sched = hierarchy();
        let wells: Vec<_> = sched.step(0).wells().iter().collect();
        let eff = EfficiencyFactors::resolve(
            &node("GOPR", Category::Group, Kind::Rate, Some("G2")),
            &sched,
            &wells,
            0,
        );
        // Chain stops at (and excludes) G2: only the well's own 0.9.
        assert!((eff.factor("OP01") - 0.9).abs() < 1e-12);
    }

    #[test]
    fn group_total_includes_own_factor() {
        let sched = hierarchy();
        let wells: Vec<_> = sched.step(0).wells().iter().collect();
        let eff = EfficiencyFactors::resolve(
            &node("GOPT", Category::Group, Kind::Total, Some("G2")),
            &sched,
            &wells,
            0,
        );
        assert!((eff.factor("OP01") - 0.36).abs() < 1e-12);
    }

    #[test]
    fn field_rate_carries_full_chain() {
        let sched = hierarchy();
        let wells: Vec<_> = sched.step(0).wells().iter().collect();
        let eff = EfficiencyFactors::resolve(
            &node("FOPR", Category::Field, Kind::Rate, None),
            &sched,
            &wells,
            0,
        );
        assert!((eff.factor("OP01") - 0.36).abs() < 1e-12);
    }
}
