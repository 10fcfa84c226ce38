//! Time-series accumulation store.
//!
//! The live mapping from fully-qualified vector key to its latest value,
//! plus the run's cumulative elapsed time. Grows or updates in place, never
//! shrinks; downstream UDQ/condition consumers read it between steps.
//!
//! The store does not decide which vectors are cumulative: the evaluator
//! calls `add*` for per-step increments (registry totals) and `update*`
//! for live values (rates, ratios, direct lookups).

use std::collections::HashMap;

use rv_core::Real;

#[derive(Clone, Debug, Default)]
pub struct SummaryState {
    values: HashMap<String, Real>,
    /// keyword -> well -> value, for scoped lookups by UDQ-style consumers.
    well_values: HashMap<String, HashMap<String, Real>>,
    group_values: HashMap<String, HashMap<String, Real>>,
    elapsed: Real,
}

impl SummaryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored value.
    pub fn update(&mut self, key: impl Into<String>, value: Real) {
        *self.values.entry(key.into()).or_default() = value;
    }

    /// Accumulate this step's increment onto the stored value.
    pub fn add(&mut self, key: impl Into<String>, value: Real) {
        *self.values.entry(key.into()).or_default() += value;
    }

    pub fn update_well_var(&mut self, well: &str, keyword: &str, value: Real) {
        self.set_well(well, keyword, value, false);
    }

    pub fn add_well_var(&mut self, well: &str, keyword: &str, value: Real) {
        self.set_well(well, keyword, value, true);
    }

    pub fn update_group_var(&mut self, group: &str, keyword: &str, value: Real) {
        self.set_group(group, keyword, value, false);
    }

    pub fn add_group_var(&mut self, group: &str, keyword: &str, value: Real) {
        self.set_group(group, keyword, value, true);
    }

    fn set_well(&mut self, well: &str, keyword: &str, value: Real, accumulate: bool) {
        let flat = self.values.entry(format!("{keyword}:{well}")).or_default();
        if accumulate {
            *flat += value;
        } else {
            *flat = value;
        }
        let scoped = self
            .well_values
            .entry(keyword.to_owned())
            .or_default()
            .entry(well.to_owned())
            .or_default();
        if accumulate {
            *scoped += value;
        } else {
            *scoped = value;
        }
    }

    fn set_group(&mut self, group: &str, keyword: &str, value: Real, accumulate: bool) {
        let flat = self.values.entry(format!("{keyword}:{group}")).or_default();
        if accumulate {
            *flat += value;
        } else {
            *flat = value;
        }
        let scoped = self
            .group_values
            .entry(keyword.to_owned())
            .or_default()
            .entry(group.to_owned())
            .or_default();
        if accumulate {
            *scoped += value;
        } else {
            *scoped = value;
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Real> {
        self.values.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: Real) -> Real {
        self.get(key).unwrap_or(default)
    }

    pub fn get_well_var(&self, well: &str, keyword: &str) -> Option<Real> {
        self.well_values.get(keyword)?.get(well).copied()
    }

    pub fn get_group_var(&self, group: &str, keyword: &str) -> Option<Real> {
        self.group_values.get(keyword)?.get(group).copied()
    }

    /// Names of all wells any well-scoped variable has been stored for,
    /// sorted for deterministic iteration.
    pub fn wells(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .well_values
            .values()
            .flat_map(|m| m.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn groups(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .group_values
            .values()
            .flat_map(|m| m.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn get_elapsed(&self) -> Real {
        self.elapsed
    }

    /// Advance the elapsed-time counter by one step's duration.
    pub fn update_elapsed(&mut self, duration: Real) {
        self.elapsed += duration;
    }
}
