//! Well description as seen by the evaluation engine.

use rv_core::Real;

/// Surface phases tracked by history vectors and tracer definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Water,
    Oil,
    Gas,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WellStatus {
    #[default]
    Open,
    Stopped,
    Shut,
}

/// One grid connection of a well. `global_index` is the 0-based cartesian
/// cell index; `cf` is the connection transmissibility factor (SI).
#[derive(Clone, Debug)]
pub struct Connection {
    pub global_index: usize,
    pub cf: Real,
}

/// Observed (historical) rates and pressures from the input deck, read by
/// the `...H` history vectors. All values are SI.
#[derive(Clone, Debug, Default)]
pub struct WellHistory {
    pub production: [Real; 3],
    pub injection: [Real; 3],
    pub bhp: Real,
    pub thp: Real,
}

impl WellHistory {
    pub fn production_rate(&self, phase: Phase) -> Real {
        self.production[phase as usize]
    }

    pub fn injection_rate(&self, phase: Phase) -> Real {
        self.injection[phase as usize]
    }
}

#[derive(Clone, Debug)]
pub struct Well {
    pub name: String,
    /// Definition-insertion index; drives deterministic entity ordering.
    pub insert_index: usize,
    /// Parent group name.
    pub group: String,
    pub status: WellStatus,
    pub is_injector: bool,
    /// Fractional uptime (0-1) applied when accumulating volumes.
    pub efficiency_factor: Real,
    pub connections: Vec<Connection>,
    /// Number of segments for multi-segment wells, 0 otherwise.
    pub segment_count: usize,
    pub history: WellHistory,
}

impl Well {
    pub fn new(name: impl Into<String>, insert_index: usize, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insert_index,
            group: group.into(),
            status: WellStatus::Open,
            is_injector: false,
            efficiency_factor: 1.0,
            connections: Vec::new(),
            segment_count: 0,
            history: WellHistory::default(),
        }
    }

    pub fn is_producer(&self) -> bool {
        !self.is_injector
    }

    pub fn is_multi_segment(&self) -> bool {
        self.segment_count > 0
    }
}
