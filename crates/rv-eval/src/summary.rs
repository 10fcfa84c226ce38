//! Per-run engine: node list construction, the step evaluation pass, and
//! mini-step capture into the output writer.

use std::collections::HashSet;
use std::path::PathBuf;

use rv_core::UnitSystem;
use rv_output::{ParamSpec, SummarySpecification, SummaryWriter};
use rv_schedule::{Grid, RegionCache, Schedule, TracerConfig};

use crate::classify::Factory;
use crate::error::{EvalError, EvalResult};
use crate::evaluator::{Evaluator, InputData};
use crate::funcs::{build_registry, RegistryConfig};
use crate::node::{Location, SummaryRequest};
use crate::results::StepSnapshot;
use crate::state::SummaryState;

/// Run-level configuration assembled from the input deck.
#[derive(Clone, Debug)]
pub struct SummaryEngineConfig {
    pub requests: Vec<SummaryRequest>,
    pub tracers: TracerConfig,
    /// Gas-lift optimization active for any well; fixes the ALQ unit.
    pub gas_lift_optimization: bool,
    pub unit_system: UnitSystem,
    /// One unified stream file vs. one file per report step.
    pub unified: bool,
    /// Region number per global cell, for region flow aggregation.
    pub region_mapping: Vec<i64>,
}

impl Default for SummaryEngineConfig {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            tracers: TracerConfig::default(),
            gas_lift_optimization: false,
            unit_system: UnitSystem::Metric,
            unified: true,
            region_mapping: Vec::new(),
        }
    }
}

pub struct Summary {
    schedule: Schedule,
    grid: Grid,
    region_cache: RegionCache,
    unit_system: UnitSystem,
    /// Vectors written to the output files, positionally aligned with the
    /// writer's parameter list.
    evaluators: Vec<Evaluator>,
    /// Accumulation-store key per written vector.
    value_keys: Vec<String>,
    /// Vectors evaluated for restart/UDQ consumers but not written.
    extra_evaluators: Vec<Evaluator>,
    writer: SummaryWriter,
}

/// Vectors a restart of the run will need regardless of what the deck
/// requests.
const RESTART_WELL_VECTORS: &[&str] = &[
    "WBHP", "WOPR", "WWPR", "WGPR", "WOPT", "WWPT", "WGPT",
];
const RESTART_GROUP_VECTORS: &[&str] = &["GOPR", "GWPR", "GGPR"];
const RESTART_FIELD_VECTORS: &[&str] = &["FOPR", "FWPR", "FGPR", "FOPT", "FWPT", "FGPT"];
const RESTART_SEGMENT_VECTORS: &[&str] = &["SOFR", "SWFR", "SGFR", "SPR"];

impl Summary {
    pub fn new(
        config: &SummaryEngineConfig,
        grid: Grid,
        schedule: Schedule,
        out_dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
    ) -> Self {
        let region_cache = RegionCache::new(&config.region_mapping, &grid, &schedule);
        let registry = build_registry(&RegistryConfig::new(
            config.gas_lift_optimization,
            config.tracers.clone(),
        ));
        let factory = Factory::new(&registry, &config.tracers);

        let mut evaluators = vec![Evaluator::time(), Evaluator::years()];
        let mut unsupported: Vec<(String, Location)> = Vec::new();

        for req in &config.requests {
            match req.keyword.as_str() {
                // TIME and YEARS are always present; the calendar vectors
                // join on request.
                "TIME" | "YEARS" => continue,
                "DAY" => {
                    evaluators.push(Evaluator::day());
                    continue;
                }
                "MONTH" => {
                    evaluators.push(Evaluator::month());
                    continue;
                }
                "YEAR" => {
                    evaluators.push(Evaluator::year());
                    continue;
                }
                _ => {}
            }
            match factory.create(req) {
                Some(ev) => evaluators.push(ev),
                None => unsupported.push((req.keyword.clone(), req.location.clone())),
            }
        }

        report_unsupported(unsupported);

        let extra_evaluators = restart_vectors(&factory, &schedule, &evaluators);

        let value_keys: Vec<String> = evaluators
            .iter()
            .map(|ev| ev.node().unique_key())
            .collect();
        let params: Vec<ParamSpec> = evaluators
            .iter()
            .map(|ev| {
                let node = ev.node();
                ParamSpec {
                    keyword: node.keyword.clone(),
                    wgname: node.wgname.clone(),
                    number: node.number,
                    unit: ev.unit_name(config.unit_system).to_owned(),
                }
            })
            .collect();
        let spec = SummarySpecification {
            start_time: schedule.start_time().to_rfc3339(),
            unit_convention: config.unit_system,
            grid_dims: grid.dims(),
            params,
        };
        let writer = SummaryWriter::new(out_dir, base_name, config.unified, spec);

        Self {
            schedule,
            grid,
            region_cache,
            unit_system: config.unit_system,
            evaluators,
            value_keys,
            extra_evaluators,
            writer,
        }
    }

    /// Evaluate every vector for one completed step.
    ///
    /// `secs_elapsed` is the total simulated time at the end of the step;
    /// it must never decrease between calls. Validation happens before any
    /// store mutation so a failed call leaves the state untouched.
    pub fn eval(
        &self,
        state: &mut SummaryState,
        report_step: u32,
        secs_elapsed: f64,
        snapshot: &StepSnapshot,
    ) -> EvalResult<()> {
        let secs_elapsed = rv_core::ensure_finite(secs_elapsed, "elapsed seconds")?;
        let current = state.get_elapsed();
        // Restart replays may land a hair below the stored stamp; only a
        // genuine step backwards is fatal.
        if secs_elapsed < current
            && !rv_core::nearly_equal(secs_elapsed, current, rv_core::Tolerances::elapsed_time())
        {
            return Err(EvalError::NonMonotonicTime {
                incoming: secs_elapsed,
                current,
            });
        }
        let duration = (secs_elapsed - current).max(0.0);
        // Step 1 reports against the schedule's first (index 0) step.
        let sim_step = (report_step as usize).saturating_sub(1);

        let input = InputData {
            schedule: &self.schedule,
            grid: &self.grid,
            region_cache: &self.region_cache,
            unit_system: self.unit_system,
        };

        for ev in self.evaluators.iter().chain(&self.extra_evaluators) {
            ev.update(sim_step, duration, &input, snapshot, state);
        }

        state.update_elapsed(duration);
        Ok(())
    }

    /// Capture the current state as one buffered mini-step.
    pub fn add_timestep(&mut self, state: &SummaryState, report_step: u32) {
        let slot = self.writer.next_mini_step(report_step);
        for (i, key) in self.value_keys.iter().enumerate() {
            slot.params[i] = state.get_or(key, 0.0) as f32;
        }
    }

    /// Flush buffered mini-steps to disk.
    pub fn write(&mut self) -> EvalResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Written vector identities, in writer order.
    pub fn keys(&self) -> &[String] {
        &self.value_keys
    }
}

/// Build the always-evaluated restart vector set, skipping anything the
/// deck already requested.
fn restart_vectors(
    factory: &Factory<'_>,
    schedule: &Schedule,
    requested: &[Evaluator],
) -> Vec<Evaluator> {
    let have: HashSet<String> = requested
        .iter()
        .map(|ev| ev.node().unique_key())
        .collect();
    let mut extra = Vec::new();
    let mut push = |req: SummaryRequest| {
        if let Some(ev) = factory.create(&req) {
            if !have.contains(&ev.node().unique_key()) {
                extra.push(ev);
            }
        }
    };

    let last = schedule.num_steps().saturating_sub(1);
    let step = schedule.step(last);

    for well in step.wells() {
        for kw in RESTART_WELL_VECTORS {
            push(SummaryRequest::for_entity(*kw, well.name.clone()));
        }
        for segment in 1..=well.segment_count {
            for kw in RESTART_SEGMENT_VECTORS {
                let mut req = SummaryRequest::for_entity(*kw, well.name.clone());
                req.number = Some(segment as i64);
                push(req);
            }
        }
    }
    for group in schedule.group_names() {
        let vectors = if group == "FIELD" {
            RESTART_FIELD_VECTORS
        } else {
            RESTART_GROUP_VECTORS
        };
        for kw in vectors {
            if group == "FIELD" {
                push(SummaryRequest::new(*kw));
            } else {
                push(SummaryRequest::for_entity(*kw, group.clone()));
            }
        }
    }

    extra
}

/// One batched warning for every unsupported keyword, ordered by input
/// location and de-duplicated.
fn report_unsupported(mut unsupported: Vec<(String, Location)>) {
    if unsupported.is_empty() {
        return;
    }
    unsupported.sort_by(|a, b| (&a.1, &a.0).cmp(&(&b.1, &b.0)));
    unsupported.dedup();

    let mut message = String::from("Unhandled summary keywords:\n");
    for (keyword, location) in &unsupported {
        if location.filename.is_empty() {
            message.push_str(&format!("  {keyword}\n"));
        } else {
            message.push_str(&format!("  {keyword} ({location})\n"));
        }
    }
    tracing::warn!("{}", message.trim_end());
}
