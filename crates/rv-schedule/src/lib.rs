//! rv-schedule: static per-run inputs for the summary-vector engine.
//!
//! Provides:
//! - wells and groups with the dynamic group tree
//! - per-step schedule state with ordered lookups
//! - grid stub and region-to-connection cache
//! - tracer definitions

pub mod error;
pub mod grid;
pub mod group;
pub mod region;
pub mod schedule;
pub mod tracer;
pub mod well;

// Re-exports for public API
pub use error::{ScheduleError, ScheduleResult};
pub use grid::Grid;
pub use group::Group;
pub use region::RegionCache;
pub use schedule::{Schedule, ScheduleStep};
pub use tracer::{Tracer, TracerConfig};
pub use well::{Connection, Phase, Well, WellHistory, WellStatus};
