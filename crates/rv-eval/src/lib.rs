//! rv-eval: the summary-vector evaluation engine.
//!
//! Given a simulator's per-step well/group/region/block/aquifer state, this
//! crate computes the configured named output quantities, accumulates them
//! in a [`state::SummaryState`], and hands full snapshots to `rv-output` for
//! buffered binary storage.
//!
//! Provides:
//! - summary node model and keyword classifier
//! - derivation function registry with unit-inferring combinators
//! - entity resolution and efficiency-factor propagation
//! - the per-step evaluation pass and mini-step capture

pub mod classify;
pub mod efficiency;
pub mod entity;
pub mod error;
pub mod evaluator;
pub mod funcs;
pub mod node;
pub mod results;
pub mod state;
pub mod summary;

// Re-exports for public API
pub use classify::Factory;
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, InputData};
pub use funcs::{Eval, FnArgs, RegistryConfig, build_registry};
pub use node::{Category, Kind, Location, SummaryNode, SummaryRequest};
pub use results::{
    AquiferSolution, GroupSolution, InterRegionFlows, RateKind, StepSnapshot, WellSolution,
};
pub use state::SummaryState;
pub use summary::{Summary, SummaryEngineConfig};
