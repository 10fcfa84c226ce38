//! Container types for the summary output files.

use rv_core::UnitSystem;
use serde::{Deserialize, Serialize};

/// Identity of one output vector as written to the specification file.
/// Position in the list fixes the vector's slot in every parameter record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub keyword: String,
    /// Well or group name; empty for non-entity vectors.
    #[serde(default)]
    pub wgname: Option<String>,
    /// Region/cell/segment/aquifer number; zero when unused.
    #[serde(default)]
    pub number: i64,
    /// Output unit label under the run's unit convention.
    pub unit: String,
}

/// The specification block written once per run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummarySpecification {
    /// Simulation start, RFC 3339.
    pub start_time: String,
    pub unit_convention: UnitSystem,
    pub grid_dims: [usize; 3],
    pub params: Vec<ParamSpec>,
}

/// One evaluated time point, positionally aligned with the specification's
/// parameter list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MiniStep {
    /// Monotonically increasing mini-step id within the run.
    pub id: u32,
    /// Report step this mini-step belongs to.
    pub seq: u32,
    pub params: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specification_json_round_trip() {
        let spec = SummarySpecification {
            start_time: "2025-01-01T00:00:00Z".to_owned(),
            unit_convention: UnitSystem::Metric,
            grid_dims: [10, 10, 3],
            params: vec![
                ParamSpec {
                    keyword: "TIME".to_owned(),
                    wgname: None,
                    number: 0,
                    unit: "DAYS".to_owned(),
                },
                ParamSpec {
                    keyword: "WOPR".to_owned(),
                    wgname: Some("OP01".to_owned()),
                    number: 0,
                    unit: "SM3/DAY".to_owned(),
                },
            ],
        };

        let json = serde_json::to_string(&spec).unwrap();
        let back: SummarySpecification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
