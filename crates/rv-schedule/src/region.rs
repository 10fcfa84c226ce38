//! Region-to-connection cache.
//!
//! Region-scoped vectors aggregate over the wells connected into a region.
//! The mapping from region number to (well, connection) pairs is fixed for
//! the run, so it is computed once from the region property and the
//! connection topology of the final schedule state.

use std::collections::HashMap;

use crate::grid::Grid;
use crate::schedule::Schedule;

#[derive(Clone, Debug, Default)]
pub struct RegionCache {
    /// region number -> ordered (well name, global cell index)
    connections: HashMap<i64, Vec<(String, usize)>>,
}

impl RegionCache {
    /// `region_of_cell` maps global cell index to region number (e.g. the
    /// FIPNUM property). Wells are visited in definition order so that
    /// region aggregation stays deterministic.
    pub fn new(region_of_cell: &[i64], grid: &Grid, schedule: &Schedule) -> Self {
        let mut connections: HashMap<i64, Vec<(String, usize)>> = HashMap::new();

        let last_step = schedule.num_steps() - 1;
        for well in schedule.step(last_step).wells() {
            for conn in &well.connections {
                if !grid.cell_active(conn.global_index) {
                    continue;
                }
                let Some(&region) = region_of_cell.get(conn.global_index) else {
                    continue;
                };
                connections
                    .entry(region)
                    .or_default()
                    .push((well.name.clone(), conn.global_index));
            }
        }

        Self { connections }
    }

    pub fn connections(&self, region: i64) -> &[(String, usize)] {
        self.connections
            .get(&region)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
