//! Entity resolution: which wells contribute to a node's value.

use rv_schedule::{RegionCache, Schedule, Well};

use crate::node::{Category, SummaryNode};

/// Whether evaluating `node` requires a resolved well set at all. Aquifer,
/// block and miscellaneous values come straight from the snapshot; region
/// values only need wells for the flow-aggregation keyword shapes
/// (`R[OGW][IP][RT]`).
pub fn need_wells(node: &SummaryNode) -> bool {
    match node.category {
        Category::Well
        | Category::Group
        | Category::Field
        | Category::Connection
        | Category::Segment => true,
        Category::Region => is_region_flow_keyword(&node.keyword),
        Category::Aquifer | Category::Block | Category::Node | Category::Miscellaneous => false,
    }
}

fn is_region_flow_keyword(kw: &str) -> bool {
    let b = kw.as_bytes();
    b.len() == 4
        && b[0] == b'R'
        && matches!(b[1], b'O' | b'G' | b'W')
        && matches!(b[2], b'I' | b'P')
        && matches!(b[3], b'R' | b'T')
}

/// Resolve the ordered entity set for `node` at `sim_step`.
///
/// Ordering follows each well's definition-insertion index so that
/// downstream consumers see a stable axis. A well that does not yet exist
/// resolves to the empty set, never an error.
pub fn find_wells<'a>(
    schedule: &'a Schedule,
    node: &SummaryNode,
    sim_step: usize,
    region_cache: &RegionCache,
) -> Vec<&'a Well> {
    let step = schedule.step(sim_step);

    match node.category {
        Category::Well | Category::Connection | Category::Segment => {
            step.well(node.name()).into_iter().collect()
        }

        Category::Group => {
            if !step.has_group(node.name()) {
                return Vec::new();
            }
            step.child_wells(node.name())
        }

        Category::Field => step.wells().iter().collect(),

        Category::Region => {
            let mut wells: Vec<&Well> = Vec::new();
            for (well_name, _) in region_cache.connections(node.number) {
                if let Some(well) = step.well(well_name) {
                    if !wells.iter().any(|w| w.name == well.name) {
                        wells.push(well);
                    }
                }
            }
            wells
        }

        Category::Aquifer | Category::Block | Category::Node | Category::Miscellaneous => {
            Vec::new()
        }
    }
}
