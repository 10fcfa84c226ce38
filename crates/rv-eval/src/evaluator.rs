//! Per-node evaluation dispatch.
//!
//! One closed enum instead of a trait object per node: the set of
//! evaluation strategies is fixed at classification time and matching
//! exhaustively keeps the step loop flat.

use chrono::{Datelike, Duration as ChronoDuration};

use rv_core::{Real, UnitSystem, UnitTag};
use rv_schedule::{Grid, RegionCache, Schedule, Well};

use crate::efficiency::EfficiencyFactors;
use crate::entity;
use crate::funcs::{Eval, FnArgs};
use crate::node::{Category, Kind, SummaryNode};
use crate::results::StepSnapshot;
use crate::state::SummaryState;

const SECONDS_PER_YEAR: Real = 365.25 * 86_400.0;

/// Static run inputs shared by every evaluator.
pub struct InputData<'a> {
    pub schedule: &'a Schedule,
    pub grid: &'a Grid,
    pub region_cache: &'a RegionCache,
    pub unit_system: UnitSystem,
}

/// Which channel of an aquifer solution a vector reads.
#[derive(Clone, Copy, Debug)]
pub enum AquiferField {
    Pressure,
    InfluxRate,
    InfluxTotal,
}

/// Direction filter for inter-region flow vectors: net flow, or one
/// direction only (`+`/`-` keyword variants).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowDirection {
    Net,
    Positive,
    Negative,
}

pub enum Evaluator {
    /// Registry-backed vector evaluated through the derivation functions.
    Function {
        node: SummaryNode,
        unit: UnitTag,
        eval: Eval,
    },
    /// Direct lookup of a block (cell) value.
    Block { node: SummaryNode, unit: UnitTag },
    /// Direct lookup into a per-region property array. `table_keyword` is
    /// the base keyword before any region-set suffix.
    Region {
        node: SummaryNode,
        table_keyword: String,
        unit: UnitTag,
    },
    /// Flow across one region pair, decoded from the compound number.
    InterRegion {
        node: SummaryNode,
        phase: usize,
        total: bool,
        direction: FlowDirection,
    },
    Aquifer {
        node: SummaryNode,
        field: AquiferField,
        unit: UnitTag,
    },
    /// Direct lookup of a global single value.
    Global { node: SummaryNode, unit: UnitTag },
    /// User-defined quantity: allocated in the output, never evaluated here.
    UserDefined { node: SummaryNode },
    Time { node: SummaryNode },
    Day { node: SummaryNode },
    Month { node: SummaryNode },
    Year { node: SummaryNode },
    Years { node: SummaryNode },
}

fn misc_node(keyword: &str) -> SummaryNode {
    SummaryNode {
        keyword: keyword.to_owned(),
        category: Category::Miscellaneous,
        kind: Kind::Undefined,
        wgname: None,
        number: 0,
        fip_region2: None,
    }
}

impl Evaluator {
    pub fn time() -> Self {
        Evaluator::Time {
            node: misc_node("TIME"),
        }
    }

    pub fn day() -> Self {
        Evaluator::Day {
            node: misc_node("DAY"),
        }
    }

    pub fn month() -> Self {
        Evaluator::Month {
            node: misc_node("MONTH"),
        }
    }

    pub fn year() -> Self {
        Evaluator::Year {
            node: misc_node("YEAR"),
        }
    }

    pub fn years() -> Self {
        Evaluator::Years {
            node: misc_node("YEARS"),
        }
    }

    pub fn node(&self) -> &SummaryNode {
        match self {
            Evaluator::Function { node, .. }
            | Evaluator::Block { node, .. }
            | Evaluator::Region { node, .. }
            | Evaluator::InterRegion { node, .. }
            | Evaluator::Aquifer { node, .. }
            | Evaluator::Global { node, .. }
            | Evaluator::UserDefined { node }
            | Evaluator::Time { node }
            | Evaluator::Day { node }
            | Evaluator::Month { node }
            | Evaluator::Year { node }
            | Evaluator::Years { node } => node,
        }
    }

    /// Output unit label written to the specification block.
    pub fn unit_name(&self, usys: UnitSystem) -> &'static str {
        match self {
            Evaluator::Function { unit, .. }
            | Evaluator::Block { unit, .. }
            | Evaluator::Region { unit, .. }
            | Evaluator::Aquifer { unit, .. }
            | Evaluator::Global { unit, .. } => usys.name(*unit),
            Evaluator::InterRegion { phase, total, .. } => {
                let unit = inter_region_unit(*phase, *total);
                usys.name(unit)
            }
            // The unit of a user-defined quantity is not known here.
            Evaluator::UserDefined { .. } => "?????",
            Evaluator::Time { .. } => usys.name(UnitTag::Time),
            Evaluator::Years { .. } => "YEARS",
            Evaluator::Day { .. } | Evaluator::Month { .. } | Evaluator::Year { .. } => "",
        }
    }

    /// Evaluate this node for one step and store the result.
    ///
    /// Entities absent this step leave the previous stored value in place.
    pub fn update(
        &self,
        sim_step: usize,
        duration: Real,
        input: &InputData<'_>,
        snapshot: &StepSnapshot,
        state: &mut SummaryState,
    ) {
        match self {
            Evaluator::Function { node, eval, .. } => {
                let needs = entity::need_wells(node);
                let wells: Vec<&Well> = if needs {
                    entity::find_wells(input.schedule, node, sim_step, input.region_cache)
                } else {
                    Vec::new()
                };
                if needs && wells.is_empty() {
                    return;
                }

                let efficiency =
                    EfficiencyFactors::resolve(node, input.schedule, &wells, sim_step);
                let group_name =
                    (node.category == Category::Group).then(|| node.name());

                let args = FnArgs {
                    wells: &wells,
                    group_name,
                    keyword: &node.keyword,
                    duration,
                    sim_step,
                    number: node.number,
                    state,
                    snapshot,
                    region_cache: input.region_cache,
                    grid: input.grid,
                    efficiency: &efficiency,
                };
                let q = eval(&args);
                let value = input.unit_system.from_si(q.unit, q.value);
                // Registry totals come out as this step's increment
                // (rate x duration) and accumulate; rates, ratios and
                // pressures are live values and replace.
                store(node, value, state, node.kind == Kind::Total);
            }

            Evaluator::Block { node, unit } => {
                let key = (node.keyword.clone(), node.number);
                if let Some(v) = snapshot.block.get(&key) {
                    let value = input.unit_system.from_si(*unit, *v);
                    store(node, value, state, false);
                }
            }

            Evaluator::Region {
                node,
                table_keyword,
                unit,
            } => {
                let index = (node.number - 1).max(0) as usize;
                if let Some(v) = snapshot
                    .region
                    .get(table_keyword)
                    .and_then(|values| values.get(index))
                {
                    let value = input.unit_system.from_si(*unit, *v);
                    store(node, value, state, false);
                }
            }

            Evaluator::InterRegion {
                node,
                phase,
                total,
                direction,
            } => {
                let r2 = node.fip_region2.unwrap_or_default();
                let flow = snapshot.inter_region.get(node.number, r2);
                let v = if *total {
                    flow.total[*phase]
                } else {
                    flow.rate[*phase]
                };
                let v = match direction {
                    FlowDirection::Net => v,
                    FlowDirection::Positive => v.max(0.0),
                    FlowDirection::Negative => (-v).max(0.0),
                };
                let unit = inter_region_unit(*phase, *total);
                store(node, input.unit_system.from_si(unit, v), state, false);
            }

            Evaluator::Aquifer { node, field, unit } => {
                if let Some(aq) = snapshot.aquifers.get(&node.number) {
                    let v = match field {
                        AquiferField::Pressure => aq.pressure,
                        AquiferField::InfluxRate => aq.influx_rate,
                        AquiferField::InfluxTotal => aq.influx_total,
                    };
                    store(node, input.unit_system.from_si(*unit, v), state, false);
                }
            }

            Evaluator::Global { node, unit } => {
                if let Some(v) = snapshot.single.get(&node.keyword) {
                    store(node, input.unit_system.from_si(*unit, *v), state, false);
                }
            }

            Evaluator::UserDefined { .. } => {}

            Evaluator::Time { node } => {
                let elapsed = state.get_elapsed() + duration;
                let value = input.unit_system.from_si(UnitTag::Time, elapsed);
                store(node, value, state, false);
            }

            Evaluator::Day { node } => {
                store(node, f64::from(self.date_at(input, state, duration).0), state, false);
            }
            Evaluator::Month { node } => {
                store(node, f64::from(self.date_at(input, state, duration).1), state, false);
            }
            Evaluator::Year { node } => {
                store(node, f64::from(self.date_at(input, state, duration).2), state, false);
            }

            Evaluator::Years { node } => {
                let elapsed = state.get_elapsed() + duration;
                store(node, elapsed / SECONDS_PER_YEAR, state, false);
            }
        }
    }

    /// Calendar (day, month, year) at the end of the current step.
    fn date_at(
        &self,
        input: &InputData<'_>,
        state: &SummaryState,
        duration: Real,
    ) -> (u32, u32, i32) {
        let elapsed = state.get_elapsed() + duration;
        let when = input.schedule.start_time()
            + ChronoDuration::milliseconds((elapsed * 1e3) as i64);
        (when.day(), when.month(), when.year())
    }
}

fn inter_region_unit(phase: usize, total: bool) -> UnitTag {
    // Phase index convention: 0 water, 1 oil, 2 gas.
    match (phase, total) {
        (2, false) => UnitTag::GasRate,
        (2, true) => UnitTag::GasVolume,
        (_, false) => UnitTag::LiquidRate,
        (_, true) => UnitTag::LiquidVolume,
    }
}

/// Route one computed value into the store. Direct lookups always carry
/// the live value (already cumulative for influx/flow totals) and never
/// accumulate here.
fn store(node: &SummaryNode, value: Real, state: &mut SummaryState, accumulate: bool) {
    match node.category {
        Category::Well if accumulate => state.add_well_var(node.name(), &node.keyword, value),
        Category::Well => state.update_well_var(node.name(), &node.keyword, value),
        Category::Group | Category::Node if accumulate => {
            state.add_group_var(node.name(), &node.keyword, value)
        }
        Category::Group | Category::Node => {
            state.update_group_var(node.name(), &node.keyword, value)
        }
        _ if accumulate => state.add(node.unique_key(), value),
        _ => state.update(node.unique_key(), value),
    }
}
