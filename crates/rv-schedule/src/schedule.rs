//! Per-step schedule state and lookups.
//!
//! The engine only ever reads the schedule: for a given simulation step it
//! needs the wells that exist, the group tree, and stable definition order.

use std::collections::HashMap;
use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::{ScheduleError, ScheduleResult};
use crate::group::Group;
use crate::well::Well;

/// Snapshot of wells and groups effective for one simulation step.
#[derive(Clone, Debug, Default)]
pub struct ScheduleStep {
    wells: Vec<Well>,
    well_index: HashMap<String, usize>,
    groups: Vec<Group>,
    group_index: HashMap<String, usize>,
}

impl ScheduleStep {
    pub fn new(mut wells: Vec<Well>, groups: Vec<Group>) -> Self {
        wells.sort_by_key(|w| w.insert_index);
        let well_index = wells
            .iter()
            .enumerate()
            .map(|(i, w)| (w.name.clone(), i))
            .collect();
        let group_index = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.clone(), i))
            .collect();
        Self {
            wells,
            well_index,
            groups,
            group_index,
        }
    }

    pub fn has_well(&self, name: &str) -> bool {
        self.well_index.contains_key(name)
    }

    pub fn well(&self, name: &str) -> Option<&Well> {
        self.well_index.get(name).map(|&i| &self.wells[i])
    }

    /// All wells in definition order.
    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group_index.contains_key(name)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.group_index.get(name).map(|&i| &self.groups[i])
    }

    /// Breadth-first descent from `name`, collecting every well reachable
    /// through well-group leaves, in definition order within each group.
    pub fn child_wells(&self, name: &str) -> Vec<&Well> {
        let mut out = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(name);

        while let Some(gname) = queue.pop_front() {
            let Some(group) = self.group(gname) else {
                continue;
            };
            if group.is_well_group() {
                for wname in &group.wells {
                    if let Some(well) = self.well(wname) {
                        out.push(well);
                    }
                }
            } else {
                for child in &group.groups {
                    queue.push_back(child);
                }
            }
        }

        out
    }
}

/// The full run schedule: a start timestamp plus one state per step.
///
/// Step indices past the end clamp to the last state, matching the usual
/// "schedule frozen after the last report date" convention.
#[derive(Clone, Debug)]
pub struct Schedule {
    start: DateTime<Utc>,
    steps: Vec<ScheduleStep>,
}

impl Schedule {
    pub fn new(start: DateTime<Utc>, steps: Vec<ScheduleStep>) -> ScheduleResult<Self> {
        if steps.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for step in &steps {
            for g in step.groups.iter() {
                if !g.wells.is_empty() && !g.groups.is_empty() {
                    return Err(ScheduleError::MixedGroup {
                        name: g.name.clone(),
                    });
                }
            }
        }
        Ok(Self { start, steps })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, sim_step: usize) -> &ScheduleStep {
        let idx = sim_step.min(self.steps.len() - 1);
        &self.steps[idx]
    }

    pub fn has_well(&self, name: &str, sim_step: usize) -> bool {
        self.step(sim_step).has_well(name)
    }

    pub fn well(&self, name: &str, sim_step: usize) -> ScheduleResult<&Well> {
        self.step(sim_step)
            .well(name)
            .ok_or_else(|| ScheduleError::UnknownWell {
                name: name.to_owned(),
            })
    }

    pub fn has_group(&self, name: &str, sim_step: usize) -> bool {
        self.step(sim_step).has_group(name)
    }

    pub fn group(&self, name: &str, sim_step: usize) -> ScheduleResult<&Group> {
        self.step(sim_step)
            .group(name)
            .ok_or_else(|| ScheduleError::UnknownGroup {
                name: name.to_owned(),
            })
    }

    /// Well names across all steps, in first-definition order.
    pub fn well_names(&self) -> Vec<String> {
        let mut seen = HashMap::new();
        for step in &self.steps {
            for w in step.wells() {
                seen.entry(w.name.clone()).or_insert(w.insert_index);
            }
        }
        let mut names: Vec<_> = seen.into_iter().collect();
        names.sort_by_key(|(_, idx)| *idx);
        names.into_iter().map(|(n, _)| n).collect()
    }

    /// Group names across all steps, in definition order.
    pub fn group_names(&self) -> Vec<String> {
        let mut seen = HashMap::new();
        for step in &self.steps {
            for g in step.groups.iter() {
                seen.entry(g.name.clone()).or_insert(g.insert_index);
            }
        }
        let mut names: Vec<_> = seen.into_iter().collect();
        names.sort_by_key(|(_, idx)| *idx);
        names.into_iter().map(|(n, _)| n).collect()
    }
}
