//! Derivation function registry.
//!
//! Every keyword's formula is expressed as a composition of small handler
//! closures over a shared argument struct. The `sum`/`sub`/`mul`/`div`
//! combinators keep the per-keyword entries declarative: a cumulative
//! vector is literally its rate vector multiplied by the step duration,
//! and a ratio vector is a division of two rate vectors.

use std::collections::HashMap;
use std::sync::Arc;

use rv_core::{Quantity, UnitTag};
use rv_schedule::{Grid, Phase, RegionCache, TracerConfig, Well, WellStatus};

use crate::efficiency::EfficiencyFactors;
use crate::results::{RateKind, StepSnapshot};
use crate::state::SummaryState;

pub const INJECTOR: bool = true;
pub const PRODUCER: bool = false;

/// All handlers share one parameter pack and use whatever they care about.
pub struct FnArgs<'a> {
    /// Resolved contributing wells, in definition order.
    pub wells: &'a [&'a Well],
    /// Group name for group-scoped vectors.
    pub group_name: Option<&'a str>,
    /// The requested keyword; tracer handlers read their tracer name from
    /// its suffix.
    pub keyword: &'a str,
    /// Step duration in seconds.
    pub duration: f64,
    pub sim_step: usize,
    /// Region number, one-based cell number, segment number or aquifer id.
    pub number: i64,
    pub state: &'a SummaryState,
    pub snapshot: &'a StepSnapshot,
    pub region_cache: &'a RegionCache,
    pub grid: &'a Grid,
    pub efficiency: &'a EfficiencyFactors,
}

pub type Eval = Arc<dyn Fn(&FnArgs<'_>) -> Quantity + Send + Sync>;

pub fn sum(f: Eval, g: Eval) -> Eval {
    Arc::new(move |args| f(args) + g(args))
}

pub fn sub(f: Eval, g: Eval) -> Eval {
    Arc::new(move |args| f(args) - g(args))
}

pub fn mul(f: Eval, g: Eval) -> Eval {
    Arc::new(move |args| f(args) * g(args))
}

pub fn div(f: Eval, g: Eval) -> Eval {
    Arc::new(move |args| f(args) / g(args))
}

/// Unit tag for one rate channel.
pub fn rate_unit(kind: RateKind) -> UnitTag {
    use RateKind::*;

    match kind {
        Water | Oil | VaporizedOil | PotentialWater | PotentialOil => UnitTag::LiquidRate,
        Gas | Solvent | DissolvedGas | PotentialGas => UnitTag::GasRate,
        ReservoirWater | ReservoirOil | ReservoirGas => UnitTag::ResRate,
        PiWater | PiOil => UnitTag::LiquidPi,
        PiGas => UnitTag::GasPi,
    }
}

fn phase_rate_unit(phase: Phase) -> UnitTag {
    match phase {
        Phase::Water | Phase::Oil => UnitTag::LiquidRate,
        Phase::Gas => UnitTag::GasRate,
    }
}

/// Sum of the entity set's signed rates in the requested direction.
///
/// An entity flowing against the requested direction contributes zero,
/// never a negative offset. Efficiency factors come from the resolved
/// table; wells outside it are unscaled.
pub fn rate(kind: RateKind, injection: bool) -> Eval {
    Arc::new(move |args| {
        let mut total = 0.0;

        for well in args.wells {
            let Some(sol) = args.snapshot.well(&well.name) else {
                continue;
            };
            let v = sol.rates.get(kind) * args.efficiency.factor(&well.name);
            if (v > 0.0) == injection {
                total += v;
            }
        }

        if !injection {
            total = -total;
        }

        Quantity::new(total, rate_unit(kind))
    })
}

/// Rate of a single connection, looked up by one-based cell number.
pub fn connection_rate(kind: RateKind, injection: bool) -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(rate_unit(kind));
        let Some(well) = args.wells.first() else {
            return zero;
        };
        // The number is the one-based cell number of the output file;
        // connection lookup uses the 0-based global index.
        let global_index = (args.number - 1).max(0) as usize;
        let Some(sol) = args.snapshot.well(&well.name) else {
            return zero;
        };
        let Some(conn) = sol.connection(global_index) else {
            return zero;
        };

        let mut v = conn.rates.get(kind) * args.efficiency.factor(&well.name);
        if (v > 0.0) != injection {
            return zero;
        }
        if !injection {
            v = -v;
        }
        Quantity::new(v, rate_unit(kind))
    })
}

/// Rate of a single well segment. Segment rates carry the opposite sign
/// convention from well rates and are flipped unconditionally.
pub fn segment_rate(kind: RateKind) -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(rate_unit(kind));
        let Some(well) = args.wells.first() else {
            return zero;
        };
        let Some(sol) = args.snapshot.well(&well.name) else {
            return zero;
        };
        let Some(segment) = sol.segments.get(&(args.number.max(0) as usize)) else {
            return zero;
        };

        let v = -segment.rates.get(kind) * args.efficiency.factor(&well.name);
        Quantity::new(v, rate_unit(kind))
    })
}

#[derive(Clone, Copy, Debug)]
pub enum SegPress {
    Pressure,
    Drop,
    DropHydrostatic,
    DropFriction,
    DropAccel,
}

pub fn segment_pressure(which: SegPress) -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(UnitTag::Pressure);
        let Some(well) = args.wells.first() else {
            return zero;
        };
        let Some(sol) = args.snapshot.well(&well.name) else {
            return zero;
        };
        let Some(segment) = sol.segments.get(&(args.number.max(0) as usize)) else {
            return zero;
        };

        let p = &segment.pressures;
        let v = match which {
            SegPress::Pressure => p.pressure,
            SegPress::Drop => p.pdrop,
            SegPress::DropHydrostatic => p.pdrop_hydrostatic,
            SegPress::DropFriction => p.pdrop_friction,
            SegPress::DropAccel => p.pdrop_accel,
        };
        Quantity::new(v, UnitTag::Pressure)
    })
}

/// Connection transmissibility factor from the schedule topology.
pub fn trans_factors() -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(UnitTag::Transmissibility);
        let Some(well) = args.wells.first() else {
            return zero;
        };
        let global_index = (args.number - 1).max(0) as usize;
        match well
            .connections
            .iter()
            .find(|c| c.global_index == global_index)
        {
            Some(conn) => Quantity::new(conn.cf, UnitTag::Transmissibility),
            None => zero,
        }
    })
}

pub fn bhp() -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(UnitTag::Pressure);
        let Some(well) = args.wells.first() else {
            return zero;
        };
        match args.snapshot.well(&well.name) {
            Some(sol) => Quantity::new(sol.bhp, UnitTag::Pressure),
            None => zero,
        }
    })
}

pub fn thp() -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(UnitTag::Pressure);
        let Some(well) = args.wells.first() else {
            return zero;
        };
        match args.snapshot.well(&well.name) {
            Some(sol) => Quantity::new(sol.thp, UnitTag::Pressure),
            None => zero,
        }
    })
}

pub fn bhp_history() -> Eval {
    Arc::new(move |args| match args.wells.first() {
        Some(well) => Quantity::new(well.history.bhp, UnitTag::Pressure),
        None => Quantity::zero(UnitTag::Pressure),
    })
}

pub fn thp_history() -> Eval {
    Arc::new(move |args| match args.wells.first() {
        Some(well) => Quantity::new(well.history.thp, UnitTag::Pressure),
        None => Quantity::zero(UnitTag::Pressure),
    })
}

/// Recorded historical production rate. Zero before the well is defined,
/// which matches the reference output convention.
pub fn production_history(phase: Phase) -> Eval {
    Arc::new(move |args| {
        let mut total = 0.0;
        for well in args.wells {
            total += well.history.production_rate(phase) * args.efficiency.factor(&well.name);
        }
        Quantity::new(total, phase_rate_unit(phase))
    })
}

pub fn injection_history(phase: Phase) -> Eval {
    Arc::new(move |args| {
        let mut total = 0.0;
        for well in args.wells {
            total += well.history.injection_rate(phase) * args.efficiency.factor(&well.name);
        }
        Quantity::new(total, phase_rate_unit(phase))
    })
}

pub fn duration() -> Eval {
    Arc::new(move |args| Quantity::new(args.duration, UnitTag::Time))
}

/// Direction-clamped rate aggregated over the connections mapped into the
/// requested region.
pub fn region_rate(kind: RateKind, injection: bool) -> Eval {
    Arc::new(move |args| {
        let mut total = 0.0;

        for (well_name, global_index) in args.region_cache.connections(args.number) {
            let mut v = args.snapshot.connection_rate(well_name, *global_index, kind)
                * args.efficiency.factor(well_name);
            if (v > 0.0) != injection {
                v = 0.0;
            }
            total += v;
        }

        if !injection {
            total = -total;
        }
        Quantity::new(total, rate_unit(kind))
    })
}

/// Unclamped sum of a rate channel over wells of the selected role. Used
/// for potential and productivity-index vectors, which are defined for
/// one role only and never efficiency-scaled.
pub fn potential_rate(kind: RateKind, output_producer: bool, output_injector: bool) -> Eval {
    Arc::new(move |args| {
        let mut total = 0.0;

        for well in args.wells {
            let Some(sol) = args.snapshot.well(&well.name) else {
                continue;
            };
            if (well.is_injector && output_injector) || (well.is_producer() && output_producer) {
                total += sol.rates.get(kind);
            }
        }

        Quantity::new(total, rate_unit(kind))
    })
}

/// Count of wells of the selected role with any flow this step.
pub fn flowing(injection: bool) -> Eval {
    Arc::new(move |args| {
        // Only wells open in the schedule count; a shut or stopped well's
        // snapshot may still carry the last flowing rates.
        let count = args
            .wells
            .iter()
            .filter(|w| {
                w.status == WellStatus::Open
                    && w.is_injector == injection
                    && args
                        .snapshot
                        .well(&w.name)
                        .is_some_and(|sol| sol.flowing())
            })
            .count();
        Quantity::new(count as f64, UnitTag::Identity)
    })
}

/// Active well control mode as the conventional numeric code. Shut or
/// undefined wells report zero rather than failing.
pub fn well_control_mode() -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(UnitTag::Identity);
        let Some(well) = args.wells.first() else {
            return zero;
        };
        if well.status == WellStatus::Shut {
            return zero;
        }
        let Some(sol) = args.snapshot.well(&well.name) else {
            return zero;
        };
        if !sol.current_control.defined() {
            return zero;
        }
        Quantity::new(f64::from(sol.current_control.code()), UnitTag::Identity)
    })
}

#[derive(Clone, Copy, Debug)]
pub enum GroupControlTarget {
    Production,
    WaterInjection,
    GasInjection,
}

/// Group (or field) control mode as the conventional numeric code.
pub fn group_control(is_group: bool, target: GroupControlTarget) -> Eval {
    Arc::new(move |args| {
        let zero = Quantity::zero(UnitTag::Identity);

        let name = if is_group {
            match args.group_name {
                Some(name) => name,
                None => return zero,
            }
        } else {
            "FIELD"
        };

        let Some(sol) = args.snapshot.groups.get(name) else {
            return zero;
        };

        let code = match target {
            GroupControlTarget::Production => sol.prod_cmode.code(),
            GroupControlTarget::WaterInjection => sol.water_inj_cmode.code(),
            GroupControlTarget::GasInjection => sol.gas_inj_cmode.code(),
        };
        Quantity::new(f64::from(code), UnitTag::Identity)
    })
}

/// Guide-rate allocation weight of a single well, per surface phase.
pub fn well_guide_rate(phase: Phase) -> Eval {
    Arc::new(move |args| {
        let unit = phase_rate_unit(phase);
        let Some(well) = args.wells.first() else {
            return Quantity::zero(unit);
        };
        match args.snapshot.well(&well.name) {
            Some(sol) => Quantity::new(sol.guide_rates[phase as usize], unit),
            None => Quantity::zero(unit),
        }
    })
}

/// Guide-rate allocation weight of a group.
pub fn group_guide_rate(phase: Phase) -> Eval {
    Arc::new(move |args| {
        let unit = phase_rate_unit(phase);
        let Some(name) = args.group_name else {
            return Quantity::zero(unit);
        };
        match args.snapshot.groups.get(name) {
            Some(sol) => Quantity::new(sol.guide_rates[phase as usize], unit),
            None => Quantity::zero(unit),
        }
    })
}

/// Artificial-lift quantity. The unit is resolved once at registry
/// construction: gas rate when gas-lift optimization is configured for
/// any well in the run, identity otherwise.
pub fn alq(unit: UnitTag) -> Eval {
    Arc::new(move |args| {
        let Some(well) = args.wells.first() else {
            return Quantity::zero(unit);
        };
        match args.snapshot.well(&well.name) {
            Some(sol) => Quantity::new(sol.alq, unit),
            None => Quantity::zero(unit),
        }
    })
}

/// Group artificial-lift quantity: sum of the member wells' values.
pub fn group_alq(unit: UnitTag) -> Eval {
    Arc::new(move |args| {
        let mut total = 0.0;
        for well in args.wells {
            if let Some(sol) = args.snapshot.well(&well.name) {
                total += sol.alq;
            }
        }
        Quantity::new(total, unit)
    })
}

/// Tracer rate; the tracer name is the keyword remainder after the
/// four-character family prefix.
pub fn tracer_rate(injection: bool) -> Eval {
    Arc::new(move |args| {
        let tracer = args.keyword.get(4..).unwrap_or("");
        let mut total = 0.0;

        for well in args.wells {
            let Some(sol) = args.snapshot.well(&well.name) else {
                continue;
            };
            let v = sol.tracer_rates.get(tracer).copied().unwrap_or(0.0)
                * args.efficiency.factor(&well.name);
            if (v > 0.0) == injection {
                total += v;
            }
        }

        if !injection {
            total = -total;
        }
        Quantity::new(total, UnitTag::MassRate)
    })
}

/// Per-run configuration the registry depends on.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Unit of the artificial-lift quantity, resolved once at setup.
    pub alq_unit: UnitTag,
    pub tracers: TracerConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            alq_unit: UnitTag::Identity,
            tracers: TracerConfig::default(),
        }
    }
}

impl RegistryConfig {
    pub fn new(gas_lift_optimization: bool, tracers: TracerConfig) -> Self {
        Self {
            alq_unit: if gas_lift_optimization {
                UnitTag::GasRate
            } else {
                UnitTag::Identity
            },
            tracers,
        }
    }
}

fn add(reg: &mut HashMap<String, Eval>, kw: &str, ev: Eval) {
    reg.insert(kw.to_owned(), ev);
}

/// Build the keyword -> evaluator mapping. Registered once at startup and
/// never mutated during a run.
pub fn build_registry(cfg: &RegistryConfig) -> HashMap<String, Eval> {
    use GroupControlTarget::*;
    use RateKind::*;

    let mut reg: HashMap<String, Eval> = HashMap::new();
    let r = &mut reg;

    // Reservoir-voidage rate: sum of the three reservoir-phase channels.
    let voidage = |injection: bool| {
        sum(
            sum(
                rate(ReservoirWater, injection),
                rate(ReservoirOil, injection),
            ),
            rate(ReservoirGas, injection),
        )
    };

    // Well, group and field vectors share evaluators; the scope letter
    // only changes which entity set gets resolved.
    for scope in ["W", "G", "F"] {
        let k = |suffix: &str| format!("{scope}{suffix}");

        // Injection rates and totals.
        add(r, &k("WIR"), rate(Water, INJECTOR));
        add(r, &k("OIR"), rate(Oil, INJECTOR));
        add(r, &k("GIR"), rate(Gas, INJECTOR));
        add(r, &k("NIR"), rate(Solvent, INJECTOR));
        add(r, &k("VIR"), voidage(INJECTOR));
        add(r, &k("LIR"), sum(rate(Water, INJECTOR), rate(Oil, INJECTOR)));
        add(r, &k("WIT"), mul(rate(Water, INJECTOR), duration()));
        add(r, &k("OIT"), mul(rate(Oil, INJECTOR), duration()));
        add(r, &k("GIT"), mul(rate(Gas, INJECTOR), duration()));
        add(r, &k("NIT"), mul(rate(Solvent, INJECTOR), duration()));
        add(r, &k("VIT"), mul(voidage(INJECTOR), duration()));
        add(
            r,
            &k("LIT"),
            mul(sum(rate(Water, INJECTOR), rate(Oil, INJECTOR)), duration()),
        );

        // Production rates and totals, with the free/dissolved splits.
        add(r, &k("WPR"), rate(Water, PRODUCER));
        add(r, &k("OPR"), rate(Oil, PRODUCER));
        add(r, &k("GPR"), rate(Gas, PRODUCER));
        add(r, &k("NPR"), rate(Solvent, PRODUCER));
        add(r, &k("VPR"), voidage(PRODUCER));
        add(r, &k("LPR"), sum(rate(Water, PRODUCER), rate(Oil, PRODUCER)));
        add(r, &k("GPRS"), rate(DissolvedGas, PRODUCER));
        add(
            r,
            &k("GPRF"),
            sub(rate(Gas, PRODUCER), rate(DissolvedGas, PRODUCER)),
        );
        add(r, &k("OPRS"), rate(VaporizedOil, PRODUCER));
        add(
            r,
            &k("OPRF"),
            sub(rate(Oil, PRODUCER), rate(VaporizedOil, PRODUCER)),
        );

        add(r, &k("WPT"), mul(rate(Water, PRODUCER), duration()));
        add(r, &k("OPT"), mul(rate(Oil, PRODUCER), duration()));
        add(r, &k("GPT"), mul(rate(Gas, PRODUCER), duration()));
        add(r, &k("NPT"), mul(rate(Solvent, PRODUCER), duration()));
        add(r, &k("VPT"), mul(voidage(PRODUCER), duration()));
        add(
            r,
            &k("LPT"),
            mul(sum(rate(Water, PRODUCER), rate(Oil, PRODUCER)), duration()),
        );
        add(r, &k("GPTS"), mul(rate(DissolvedGas, PRODUCER), duration()));
        add(
            r,
            &k("GPTF"),
            mul(
                sub(rate(Gas, PRODUCER), rate(DissolvedGas, PRODUCER)),
                duration(),
            ),
        );
        add(r, &k("OPTS"), mul(rate(VaporizedOil, PRODUCER), duration()));
        add(
            r,
            &k("OPTF"),
            mul(
                sub(rate(Oil, PRODUCER), rate(VaporizedOil, PRODUCER)),
                duration(),
            ),
        );

        // Ratios inherit zero-on-zero-denominator from the quantity algebra.
        add(
            r,
            &k("WCT"),
            div(
                rate(Water, PRODUCER),
                sum(rate(Water, PRODUCER), rate(Oil, PRODUCER)),
            ),
        );
        add(r, &k("GOR"), div(rate(Gas, PRODUCER), rate(Oil, PRODUCER)));
        add(
            r,
            &k("GLR"),
            div(
                rate(Gas, PRODUCER),
                sum(rate(Water, PRODUCER), rate(Oil, PRODUCER)),
            ),
        );

        // History vectors from recorded schedule rates.
        add(r, &k("WPRH"), production_history(Phase::Water));
        add(r, &k("OPRH"), production_history(Phase::Oil));
        add(r, &k("GPRH"), production_history(Phase::Gas));
        add(
            r,
            &k("LPRH"),
            sum(
                production_history(Phase::Water),
                production_history(Phase::Oil),
            ),
        );
        add(r, &k("WPTH"), mul(production_history(Phase::Water), duration()));
        add(r, &k("OPTH"), mul(production_history(Phase::Oil), duration()));
        add(r, &k("GPTH"), mul(production_history(Phase::Gas), duration()));
        add(
            r,
            &k("LPTH"),
            mul(
                sum(
                    production_history(Phase::Water),
                    production_history(Phase::Oil),
                ),
                duration(),
            ),
        );
        add(r, &k("WIRH"), injection_history(Phase::Water));
        add(r, &k("OIRH"), injection_history(Phase::Oil));
        add(r, &k("GIRH"), injection_history(Phase::Gas));
        add(r, &k("WITH"), mul(injection_history(Phase::Water), duration()));
        add(r, &k("OITH"), mul(injection_history(Phase::Oil), duration()));
        add(r, &k("GITH"), mul(injection_history(Phase::Gas), duration()));
        add(
            r,
            &k("WCTH"),
            div(
                production_history(Phase::Water),
                sum(
                    production_history(Phase::Water),
                    production_history(Phase::Oil),
                ),
            ),
        );
        add(
            r,
            &k("GORH"),
            div(
                production_history(Phase::Gas),
                production_history(Phase::Oil),
            ),
        );
        add(
            r,
            &k("GLRH"),
            div(
                production_history(Phase::Gas),
                sum(
                    production_history(Phase::Water),
                    production_history(Phase::Oil),
                ),
            ),
        );

        // Potentials.
        add(r, &k("WPP"), potential_rate(PotentialWater, true, false));
        add(r, &k("OPP"), potential_rate(PotentialOil, true, false));
        add(r, &k("GPP"), potential_rate(PotentialGas, true, false));
        add(r, &k("WPI"), potential_rate(PotentialWater, false, true));
        add(r, &k("OPI"), potential_rate(PotentialOil, false, true));
        add(r, &k("GPI"), potential_rate(PotentialGas, false, true));

        // Tracer families: classifier step 5 rewrites `WTPR<name>` into a
        // phase-tagged lookup key before hitting the registry.
        if !cfg.tracers.is_empty() {
            for tag in ["#W", "#O", "#G"] {
                add(r, &format!("{scope}TPR{tag}"), tracer_rate(PRODUCER));
                add(
                    r,
                    &format!("{scope}TPT{tag}"),
                    mul(tracer_rate(PRODUCER), duration()),
                );
                add(r, &format!("{scope}TIR{tag}"), tracer_rate(INJECTOR));
                add(
                    r,
                    &format!("{scope}TIT{tag}"),
                    mul(tracer_rate(INJECTOR), duration()),
                );
            }
        }
    }

    // Well-only vectors.
    add(r, "WBHP", bhp());
    add(r, "WTHP", thp());
    add(r, "WBHPH", bhp_history());
    add(r, "WTHPH", thp_history());
    add(r, "WMCTL", well_control_mode());
    add(r, "WGVIR", rate(ReservoirGas, INJECTOR));
    add(r, "WWVIR", rate(ReservoirWater, INJECTOR));
    add(r, "WGVPR", rate(ReservoirGas, PRODUCER));
    add(r, "WALQ", alq(cfg.alq_unit));

    // Well productivity index.
    add(r, "WPIW", potential_rate(PiWater, true, true));
    add(r, "WPIO", potential_rate(PiOil, true, true));
    add(r, "WPIG", potential_rate(PiGas, true, true));
    add(
        r,
        "WPIL",
        sum(
            potential_rate(PiWater, true, true),
            potential_rate(PiOil, true, true),
        ),
    );

    // Aliases kept for compatibility with existing decks.
    add(r, "WWIP", potential_rate(PotentialWater, false, true));
    add(r, "WGIP", potential_rate(PotentialGas, false, true));

    // Guide rates.
    add(r, "WOPGR", well_guide_rate(Phase::Oil));
    add(r, "WWPGR", well_guide_rate(Phase::Water));
    add(r, "WGPGR", well_guide_rate(Phase::Gas));
    add(r, "GOPGR", group_guide_rate(Phase::Oil));
    add(r, "GWPGR", group_guide_rate(Phase::Water));
    add(r, "GGPGR", group_guide_rate(Phase::Gas));

    add(r, "GALQ", group_alq(cfg.alq_unit));

    // Flowing-well counters exist at group and field scope only.
    add(r, "GMWPR", flowing(PRODUCER));
    add(r, "GMWIN", flowing(INJECTOR));
    add(r, "FMWPR", flowing(PRODUCER));
    add(r, "FMWIN", flowing(INJECTOR));

    // Group and field control modes.
    add(r, "GMCTP", group_control(true, Production));
    add(r, "GMCTW", group_control(true, WaterInjection));
    add(r, "GMCTG", group_control(true, GasInjection));
    add(r, "FMCTP", group_control(false, Production));
    add(r, "FMCTW", group_control(false, WaterInjection));
    add(r, "FMCTG", group_control(false, GasInjection));

    // Connection vectors.
    add(r, "CWIR", connection_rate(Water, INJECTOR));
    add(r, "CGIR", connection_rate(Gas, INJECTOR));
    add(r, "CWIT", mul(connection_rate(Water, INJECTOR), duration()));
    add(r, "CGIT", mul(connection_rate(Gas, INJECTOR), duration()));
    add(r, "CNIT", mul(connection_rate(Solvent, INJECTOR), duration()));
    add(r, "CWPR", connection_rate(Water, PRODUCER));
    add(r, "COPR", connection_rate(Oil, PRODUCER));
    add(r, "CGPR", connection_rate(Gas, PRODUCER));
    add(r, "CWPT", mul(connection_rate(Water, PRODUCER), duration()));
    add(r, "COPT", mul(connection_rate(Oil, PRODUCER), duration()));
    add(r, "CGPT", mul(connection_rate(Gas, PRODUCER), duration()));
    add(r, "CNPT", mul(connection_rate(Solvent, PRODUCER), duration()));
    add(
        r,
        "CWCT",
        div(
            connection_rate(Water, PRODUCER),
            sum(
                connection_rate(Water, PRODUCER),
                connection_rate(Oil, PRODUCER),
            ),
        ),
    );
    add(
        r,
        "CGOR",
        div(
            connection_rate(Gas, PRODUCER),
            connection_rate(Oil, PRODUCER),
        ),
    );
    // Net flow vectors are explicitly signed: production minus injection,
    // without the direction clamp.
    add(
        r,
        "CWFR",
        sub(
            connection_rate(Water, PRODUCER),
            connection_rate(Water, INJECTOR),
        ),
    );
    add(
        r,
        "COFR",
        sub(
            connection_rate(Oil, PRODUCER),
            connection_rate(Oil, INJECTOR),
        ),
    );
    add(
        r,
        "CGFR",
        sub(
            connection_rate(Gas, PRODUCER),
            connection_rate(Gas, INJECTOR),
        ),
    );
    add(
        r,
        "CNFR",
        sub(
            connection_rate(Solvent, PRODUCER),
            connection_rate(Solvent, INJECTOR),
        ),
    );
    add(r, "CTFAC", trans_factors());

    // Region flow vectors aggregate through the region cache.
    add(r, "ROIR", region_rate(Oil, INJECTOR));
    add(r, "RGIR", region_rate(Gas, INJECTOR));
    add(r, "RWIR", region_rate(Water, INJECTOR));
    add(r, "ROPR", region_rate(Oil, PRODUCER));
    add(r, "RGPR", region_rate(Gas, PRODUCER));
    add(r, "RWPR", region_rate(Water, PRODUCER));
    add(r, "ROIT", mul(region_rate(Oil, INJECTOR), duration()));
    add(r, "RGIT", mul(region_rate(Gas, INJECTOR), duration()));
    add(r, "RWIT", mul(region_rate(Water, INJECTOR), duration()));
    add(r, "ROPT", mul(region_rate(Oil, PRODUCER), duration()));
    add(r, "RGPT", mul(region_rate(Gas, PRODUCER), duration()));
    add(r, "RWPT", mul(region_rate(Water, PRODUCER), duration()));

    // Multi-segment well vectors.
    add(r, "SOFR", segment_rate(Oil));
    add(r, "SWFR", segment_rate(Water));
    add(r, "SGFR", segment_rate(Gas));
    add(r, "SPR", segment_pressure(SegPress::Pressure));
    add(r, "SPRD", segment_pressure(SegPress::Drop));
    add(r, "SPRDH", segment_pressure(SegPress::DropHydrostatic));
    add(r, "SPRDF", segment_pressure(SegPress::DropFriction));
    add(r, "SPRDA", segment_pressure(SegPress::DropAccel));

    reg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::WellSolution;

    fn args_with<'a>(
        wells: &'a [&'a Well],
        snapshot: &'a StepSnapshot,
        state: &'a SummaryState,
        region_cache: &'a RegionCache,
        grid: &'a Grid,
        efficiency: &'a EfficiencyFactors,
        duration_s: f64,
    ) -> FnArgs<'a> {
        FnArgs {
            wells,
            group_name: None,
            keyword: "WOPR",
            duration: duration_s,
            sim_step: 0,
            number: 0,
            state,
            snapshot,
            region_cache,
            grid,
            efficiency,
        }
    }

    #[test]
    fn producer_rate_is_positive_and_clamped() {
        let mut producer = Well::new("OP01", 0, "FIELD");
        producer.is_injector = false;
        let wells = [&producer];

        let mut snapshot = StepSnapshot::default();
        let mut sol = WellSolution::default();
        // Simulator sign convention: production is negative.
        sol.rates.set(RateKind::Oil, -100.0);
        snapshot.wells.insert("OP01".to_owned(), sol);

        let state = SummaryState::new();
        let cache = RegionCache::default();
        let grid = Grid::cartesian(1, 1, 1);
        let eff = EfficiencyFactors::default();
        let args = args_with(&wells, &snapshot, &state, &cache, &grid, &eff, 86_400.0);

        let q = rate(RateKind::Oil, PRODUCER)(&args);
        assert_eq!(q.value, 100.0);
        assert_eq!(q.unit, UnitTag::LiquidRate);

        // The same well contributes zero to the injection direction.
        let q = rate(RateKind::Oil, INJECTOR)(&args);
        assert_eq!(q.value, 0.0);
    }

    #[test]
    fn cumulative_is_rate_times_duration() {
        let mut producer = Well::new("OP01", 0, "FIELD");
        producer.is_injector = false;
        let wells = [&producer];

        let mut snapshot = StepSnapshot::default();
        let mut sol = WellSolution::default();
        sol.rates.set(RateKind::Water, -2.0);
        snapshot.wells.insert("OP01".to_owned(), sol);

        let state = SummaryState::new();
        let cache = RegionCache::default();
        let grid = Grid::cartesian(1, 1, 1);
        let eff = EfficiencyFactors::default();
        let args = args_with(&wells, &snapshot, &state, &cache, &grid, &eff, 43_200.0);

        let total = mul(rate(RateKind::Water, PRODUCER), duration())(&args);
        assert_eq!(total.value, 2.0 * 43_200.0);
        assert_eq!(total.unit, UnitTag::LiquidVolume);
    }

    #[test]
    fn shut_wells_neither_flow_nor_report_a_control() {
        use crate::results::{CurrentControl, ProducerCMode};
        use rv_schedule::WellStatus;

        let open = Well::new("OP01", 0, "FIELD");
        let mut shut = Well::new("OP02", 1, "FIELD");
        shut.status = WellStatus::Shut;
        let wells = [&open, &shut];

        // Both snapshots still carry the last flowing solution.
        let mut snapshot = StepSnapshot::default();
        for name in ["OP01", "OP02"] {
            let mut sol = WellSolution::default();
            sol.rates.set(RateKind::Oil, -10.0);
            sol.current_control = CurrentControl {
                is_producer: true,
                prod: ProducerCMode::Orat,
                ..CurrentControl::default()
            };
            snapshot.wells.insert(name.to_owned(), sol);
        }

        let state = SummaryState::new();
        let cache = RegionCache::default();
        let grid = Grid::cartesian(1, 1, 1);
        let eff = EfficiencyFactors::default();
        let args = args_with(&wells, &snapshot, &state, &cache, &grid, &eff, 86_400.0);

        let count = flowing(PRODUCER)(&args);
        assert_eq!(count.value, 1.0);

        let shut_only = [&shut];
        let args = args_with(&shut_only, &snapshot, &state, &cache, &grid, &eff, 86_400.0);
        let mode = well_control_mode()(&args);
        assert_eq!(mode.value, 0.0);
    }

    #[test]
    fn water_cut_zero_when_nothing_flows() {
        let producer = Well::new("OP01", 0, "FIELD");
        let wells = [&producer];

        let snapshot = StepSnapshot::default();
        let state = SummaryState::new();
        let cache = RegionCache::default();
        let grid = Grid::cartesian(1, 1, 1);
        let eff = EfficiencyFactors::default();
        let args = args_with(&wells, &snapshot, &state, &cache, &grid, &eff, 86_400.0);

        let wct = div(
            rate(RateKind::Water, PRODUCER),
            sum(rate(RateKind::Water, PRODUCER), rate(RateKind::Oil, PRODUCER)),
        )(&args);
        assert_eq!(wct.value, 0.0);
        assert_eq!(wct.unit, UnitTag::WaterCut);
    }

    #[test]
    fn registry_has_core_families() {
        let reg = build_registry(&RegistryConfig::default());
        for kw in ["WOPR", "GOPT", "FWCT", "CGOR", "ROPR", "SPR", "WMCTL", "FMCTP"] {
            assert!(reg.contains_key(kw), "missing {kw}");
        }
        // Tracer entries only exist when tracers are configured.
        assert!(!reg.contains_key("WTPR#W"));
    }

    #[test]
    fn alq_unit_follows_gas_lift_configuration() {
        assert_eq!(
            RegistryConfig::new(true, TracerConfig::default()).alq_unit,
            UnitTag::GasRate
        );
        assert_eq!(
            RegistryConfig::new(false, TracerConfig::default()).alq_unit,
            UnitTag::Identity
        );
    }
}
