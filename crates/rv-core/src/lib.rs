//! rv-core: stable foundation for the summary-vector engine.
//!
//! Contains:
//! - units (runtime unit tags + output unit-system conversion)
//! - quantity (tagged value with unit-inferring arithmetic)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod quantity;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use quantity::Quantity;
pub use units::{UnitSystem, UnitTag};
