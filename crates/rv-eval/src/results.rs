//! Read-only simulator result snapshots handed to the engine each step.
//!
//! All values are SI and signed with the simulator's convention: positive
//! flow is injection, negative is production. The evaluators apply the
//! output sign conventions.

use std::collections::HashMap;

use rv_core::Real;

/// Per-entity rate channels provided by the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateKind {
    Water,
    Oil,
    Gas,
    Solvent,
    DissolvedGas,
    VaporizedOil,
    ReservoirWater,
    ReservoirOil,
    ReservoirGas,
    PotentialWater,
    PotentialOil,
    PotentialGas,
    PiWater,
    PiOil,
    PiGas,
}

/// Sparse rate vector; unset channels read as zero.
#[derive(Clone, Debug, Default)]
pub struct Rates {
    values: HashMap<RateKind, Real>,
}

impl Rates {
    pub fn get(&self, kind: RateKind) -> Real {
        self.values.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, kind: RateKind, value: Real) -> &mut Self {
        self.values.insert(kind, value);
        self
    }

    pub fn any_flowing(&self) -> bool {
        self.values.values().any(|v| *v != 0.0)
    }
}

/// Dynamic control mode of a producing well, with the conventional output
/// codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProducerCMode {
    #[default]
    Undefined,
    Orat,
    Wrat,
    Grat,
    Lrat,
    Crat,
    Resv,
    Thp,
    Bhp,
    Group,
}

impl ProducerCMode {
    pub fn code(self) -> i32 {
        match self {
            ProducerCMode::Undefined => 0,
            ProducerCMode::Orat => 1,
            ProducerCMode::Wrat => 2,
            ProducerCMode::Grat => 3,
            ProducerCMode::Lrat => 4,
            ProducerCMode::Resv => 5,
            ProducerCMode::Thp => 6,
            ProducerCMode::Bhp => 7,
            ProducerCMode::Crat => 9,
            ProducerCMode::Group => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InjectorCMode {
    #[default]
    Undefined,
    Rate,
    Resv,
    Thp,
    Bhp,
    Group,
}

impl InjectorCMode {
    pub fn code(self) -> i32 {
        match self {
            InjectorCMode::Undefined => 0,
            InjectorCMode::Rate => 1,
            InjectorCMode::Resv => 5,
            InjectorCMode::Thp => 6,
            InjectorCMode::Bhp => 7,
            InjectorCMode::Group => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentControl {
    pub is_producer: bool,
    pub prod: ProducerCMode,
    pub inj: InjectorCMode,
}

impl CurrentControl {
    /// Whether the simulator reported an active control mode at all.
    pub fn defined(&self) -> bool {
        (self.is_producer && self.prod != ProducerCMode::Undefined)
            || (!self.is_producer && self.inj != InjectorCMode::Undefined)
    }

    pub fn code(&self) -> i32 {
        if self.is_producer {
            self.prod.code()
        } else {
            self.inj.code()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConnectionSolution {
    pub global_index: usize,
    pub rates: Rates,
    pub pressure: Real,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentPressures {
    pub pressure: Real,
    pub pdrop: Real,
    pub pdrop_hydrostatic: Real,
    pub pdrop_friction: Real,
    pub pdrop_accel: Real,
}

#[derive(Clone, Debug, Default)]
pub struct SegmentSolution {
    pub rates: Rates,
    pub pressures: SegmentPressures,
}

/// Dynamic state of one well for the step.
#[derive(Clone, Debug, Default)]
pub struct WellSolution {
    pub bhp: Real,
    pub thp: Real,
    pub rates: Rates,
    /// Tracer mass rates keyed by tracer name, signed like phase rates.
    pub tracer_rates: HashMap<String, Real>,
    /// Guide-rate allocation weights per surface phase (water, oil, gas).
    pub guide_rates: [Real; 3],
    /// Artificial-lift quantity (gas-lift injection rate when configured).
    pub alq: Real,
    pub current_control: CurrentControl,
    pub connections: Vec<ConnectionSolution>,
    /// Keyed by one-based segment number.
    pub segments: HashMap<usize, SegmentSolution>,
}

impl WellSolution {
    pub fn flowing(&self) -> bool {
        self.rates.any_flowing()
    }

    pub fn connection(&self, global_index: usize) -> Option<&ConnectionSolution> {
        self.connections
            .iter()
            .find(|c| c.global_index == global_index)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupProductionCMode {
    #[default]
    None,
    Orat,
    Wrat,
    Grat,
    Lrat,
    Crat,
    Resv,
    Prbl,
    Fld,
}

impl GroupProductionCMode {
    pub fn code(self) -> i32 {
        match self {
            GroupProductionCMode::None | GroupProductionCMode::Fld => 0,
            GroupProductionCMode::Orat => 1,
            GroupProductionCMode::Wrat => 2,
            GroupProductionCMode::Grat => 3,
            GroupProductionCMode::Lrat => 4,
            GroupProductionCMode::Resv => 5,
            GroupProductionCMode::Prbl => 6,
            GroupProductionCMode::Crat => 9,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupInjectionCMode {
    #[default]
    None,
    Rate,
    Resv,
    Rein,
    Vrep,
    Fld,
    Sale,
}

impl GroupInjectionCMode {
    pub fn code(self) -> i32 {
        match self {
            GroupInjectionCMode::None | GroupInjectionCMode::Fld | GroupInjectionCMode::Sale => 0,
            GroupInjectionCMode::Rate => 1,
            GroupInjectionCMode::Resv => 2,
            GroupInjectionCMode::Rein => 3,
            GroupInjectionCMode::Vrep => 4,
        }
    }
}

/// Dynamic state of one group (or the field) for the step.
#[derive(Clone, Debug, Default)]
pub struct GroupSolution {
    pub prod_cmode: GroupProductionCMode,
    pub water_inj_cmode: GroupInjectionCMode,
    pub gas_inj_cmode: GroupInjectionCMode,
    /// Guide-rate allocation weights per surface phase (water, oil, gas).
    pub guide_rates: [Real; 3],
}

/// Dynamic state of one analytic or numerical aquifer.
#[derive(Clone, Copy, Debug, Default)]
pub struct AquiferSolution {
    pub pressure: Real,
    pub influx_rate: Real,
    pub influx_total: Real,
}

/// Net flows crossing region boundaries, pre-aggregated by the simulator.
///
/// Stored under the canonical ordered pair `(min, max)`; a positive value
/// is flow from the lower-numbered into the higher-numbered region.
#[derive(Clone, Debug, Default)]
pub struct InterRegionFlows {
    flows: HashMap<(i64, i64), InterRegionFlow>,
}

/// Per-phase (water, oil, gas) rate and cumulative flow between one pair
/// of regions.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterRegionFlow {
    pub rate: [Real; 3],
    pub total: [Real; 3],
}

impl InterRegionFlows {
    pub fn insert(&mut self, r1: i64, r2: i64, mut flow: InterRegionFlow) {
        if r1 > r2 {
            for v in flow.rate.iter_mut().chain(flow.total.iter_mut()) {
                *v = -*v;
            }
        }
        self.flows.insert((r1.min(r2), r1.max(r2)), flow);
    }

    /// Signed flow from `r1` into `r2`; zero when the pair is unknown.
    pub fn get(&self, r1: i64, r2: i64) -> InterRegionFlow {
        let key = (r1.min(r2), r1.max(r2));
        let mut flow = self.flows.get(&key).copied().unwrap_or_default();
        if r1 > r2 {
            for v in flow.rate.iter_mut().chain(flow.total.iter_mut()) {
                *v = -*v;
            }
        }
        flow
    }
}

/// Everything the simulator hands over after one completed step.
#[derive(Clone, Debug, Default)]
pub struct StepSnapshot {
    pub wells: HashMap<String, WellSolution>,
    pub groups: HashMap<String, GroupSolution>,
    /// Global single values (TCPU, TIMESTEP, in-place totals, ...).
    pub single: HashMap<String, Real>,
    /// Region property arrays keyed by keyword, one value per region,
    /// one-based region number indexes position `number - 1`.
    pub region: HashMap<String, Vec<Real>>,
    /// Block values keyed by (keyword, global cell number).
    pub block: HashMap<(String, i64), Real>,
    pub aquifers: HashMap<i64, AquiferSolution>,
    pub inter_region: InterRegionFlows,
}

impl StepSnapshot {
    pub fn well(&self, name: &str) -> Option<&WellSolution> {
        self.wells.get(name)
    }

    /// Connection-level rate lookup used by region aggregation.
    pub fn connection_rate(&self, well: &str, global_index: usize, kind: RateKind) -> Real {
        self.wells
            .get(well)
            .and_then(|w| w.connection(global_index))
            .map(|c| c.rates.get(kind))
            .unwrap_or(0.0)
    }
}
