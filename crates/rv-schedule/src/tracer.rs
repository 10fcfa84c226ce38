//! Tracer definitions from the input deck.

use crate::well::Phase;

#[derive(Clone, Debug)]
pub struct Tracer {
    pub name: String,
    pub phase: Phase,
}

#[derive(Clone, Debug, Default)]
pub struct TracerConfig {
    tracers: Vec<Tracer>,
}

impl TracerConfig {
    pub fn new(tracers: Vec<Tracer>) -> Self {
        Self { tracers }
    }

    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }

    /// Phase of the named tracer, if configured.
    pub fn phase_of(&self, name: &str) -> Option<Phase> {
        self.tracers
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.phase)
    }
}
