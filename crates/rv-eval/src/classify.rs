//! Request classification: from raw keyword to a concrete evaluator.
//!
//! Precedence, first match wins: user-defined quantities, the direct
//! lookup tables (block, aquifer, inter-region, region, global single
//! values), the function registry, a region-set-suffix retry, and finally
//! tracer-suffix synthesis. Anything left over is unsupported and the
//! caller reports it.

use std::collections::HashMap;

use rv_core::{Quantity, UnitTag};
use rv_schedule::{Grid, Phase, RegionCache, TracerConfig};

use crate::efficiency::EfficiencyFactors;
use crate::evaluator::{AquiferField, Evaluator, FlowDirection};
use crate::funcs::{Eval, FnArgs};
use crate::node::{Category, Kind, SummaryNode, SummaryRequest};
use crate::results::StepSnapshot;
use crate::state::SummaryState;

/// Compound-number encoding of an inter-region pair.
const REGION2_OFFSET: i64 = 10;
const REGION2_STRIDE: i64 = 32_768;

fn single_value_unit(kw: &str) -> Option<UnitTag> {
    let unit = match kw {
        "TCPU" | "ELAPSED" | "NEWTON" | "MSUMNEWT" | "MSUMLINS" => UnitTag::Identity,
        "TIMESTEP" => UnitTag::Time,
        "FPR" => UnitTag::Pressure,
        "FOIP" | "FOIPL" | "FOIPG" | "FWIP" => UnitTag::LiquidVolume,
        "FGIP" | "FGIPL" | "FGIPG" => UnitTag::GasVolume,
        "FRPV" | "FOPV" | "FWPV" | "FGPV" | "FHPV" => UnitTag::ResVolume,
        _ => return None,
    };
    Some(unit)
}

fn region_unit(kw: &str) -> Option<UnitTag> {
    let unit = match kw {
        "RPR" => UnitTag::Pressure,
        "ROIP" | "ROIPL" | "ROIPG" | "RWIP" => UnitTag::LiquidVolume,
        "RGIP" | "RGIPL" | "RGIPG" => UnitTag::GasVolume,
        "RRPV" | "ROPV" | "RWPV" | "RGPV" | "RHPV" => UnitTag::ResVolume,
        _ => return None,
    };
    Some(unit)
}

fn block_unit(kw: &str) -> Option<UnitTag> {
    let unit = match kw {
        "BPR" | "BWPC" | "BGPC" => UnitTag::Pressure,
        "BSWAT" | "BSOIL" | "BSGAS" => UnitTag::Identity,
        "BWKR" | "BOKR" | "BGKR" | "BKRW" | "BKRO" | "BKRG" => UnitTag::Identity,
        "BVWAT" | "BVOIL" | "BVGAS" => UnitTag::Viscosity,
        _ => return None,
    };
    Some(unit)
}

fn aquifer_field(kw: &str) -> Option<(AquiferField, UnitTag)> {
    // Analytic (AAQ*) and numerical (ANQ*) aquifers share the channel set.
    let entry = match kw {
        "AAQP" | "ANQP" => (AquiferField::Pressure, UnitTag::Pressure),
        "AAQR" | "ANQR" => (AquiferField::InfluxRate, UnitTag::LiquidRate),
        "AAQT" | "ANQT" => (AquiferField::InfluxTotal, UnitTag::LiquidVolume),
        _ => return None,
    };
    Some(entry)
}

/// Match the inter-region flow keyword shape `R[OGW]F[RT]` with an
/// optional trailing direction sign.
fn inter_region_shape(kw: &str) -> Option<(usize, bool, FlowDirection)> {
    let b = kw.as_bytes();
    if b.len() < 4 || b.len() > 5 || b[0] != b'R' || b[2] != b'F' {
        return None;
    }
    let phase = match b[1] {
        b'W' => 0,
        b'O' => 1,
        b'G' => 2,
        _ => return None,
    };
    let total = match b[3] {
        b'R' => false,
        b'T' => true,
        _ => return None,
    };
    let direction = match b.get(4) {
        None => FlowDirection::Net,
        Some(b'+') => FlowDirection::Positive,
        Some(b'-') => FlowDirection::Negative,
        Some(_) => return None,
    };
    Some((phase, total, direction))
}

/// Decode `num = r1 + 32768 * (r2 + 10)` into the region pair. A number
/// that does not encode two positive regions is malformed.
fn decode_region_pair(number: i64) -> Option<(i64, i64)> {
    let r2 = number / REGION2_STRIDE - REGION2_OFFSET;
    let r1 = number % REGION2_STRIDE;
    (r1 > 0 && r2 > 0).then_some((r1, r2))
}

fn category_of(kw: &str) -> Category {
    match kw.as_bytes().first() {
        Some(b'W') => Category::Well,
        Some(b'G') => Category::Group,
        Some(b'F') => Category::Field,
        Some(b'C') => Category::Connection,
        Some(b'R') => Category::Region,
        Some(b'B') => Category::Block,
        Some(b'S') => Category::Segment,
        Some(b'A') => Category::Aquifer,
        _ => Category::Miscellaneous,
    }
}

/// Derive the physical kind from a probed unit tag, with the control-mode
/// keyword shapes special-cased (their probed unit is identity).
fn kind_of(kw: &str, unit: UnitTag) -> Kind {
    if kw.get(1..4) == Some("MCT") {
        return Kind::Mode;
    }
    match unit {
        UnitTag::LiquidRate
        | UnitTag::GasRate
        | UnitTag::ResRate
        | UnitTag::MassRate
        | UnitTag::LiquidPi
        | UnitTag::GasPi => Kind::Rate,
        UnitTag::LiquidVolume | UnitTag::GasVolume | UnitTag::ResVolume | UnitTag::Mass => {
            Kind::Total
        }
        UnitTag::WaterCut | UnitTag::GasOilRatio | UnitTag::OilGasRatio => Kind::Ratio,
        UnitTag::Pressure => Kind::Pressure,
        _ => Kind::Undefined,
    }
}

/// Evaluate a registry entry against empty inputs to learn its unit tag.
/// Every handler returns a correctly-tagged neutral quantity for an empty
/// entity set, so this is safe at setup time.
fn probe_unit(eval: &Eval, keyword: &str, number: i64) -> UnitTag {
    let snapshot = StepSnapshot::default();
    let state = SummaryState::new();
    let region_cache = RegionCache::default();
    let grid = Grid::cartesian(1, 1, 1);
    let efficiency = EfficiencyFactors::default();

    let args = FnArgs {
        wells: &[],
        group_name: None,
        keyword,
        duration: 0.0,
        sim_step: 0,
        number,
        state: &state,
        snapshot: &snapshot,
        region_cache: &region_cache,
        grid: &grid,
        efficiency: &efficiency,
    };
    let q: Quantity = eval(&args);
    q.unit
}

pub struct Factory<'a> {
    registry: &'a HashMap<String, Eval>,
    tracers: &'a TracerConfig,
}

impl<'a> Factory<'a> {
    pub fn new(registry: &'a HashMap<String, Eval>, tracers: &'a TracerConfig) -> Self {
        Self { registry, tracers }
    }

    /// Classify one request. `None` means the keyword is unsupported.
    pub fn create(&self, req: &SummaryRequest) -> Option<Evaluator> {
        let kw = req.keyword.as_str();
        let number = req.number.unwrap_or(0);

        if SummaryNode::is_user_defined(kw) {
            return Some(Evaluator::UserDefined {
                node: self.node(req, Kind::Undefined, None),
            });
        }

        if let Some(unit) = block_unit(kw) {
            return Some(Evaluator::Block {
                node: self.node(req, kind_of(kw, unit), None),
                unit,
            });
        }

        if let Some((field, unit)) = aquifer_field(kw) {
            return Some(Evaluator::Aquifer {
                node: self.node(req, kind_of(kw, unit), None),
                field,
                unit,
            });
        }

        if let Some((phase, total, direction)) = inter_region_shape(kw) {
            let (r1, r2) = decode_region_pair(number)?;
            let mut node = self.node(req, if total { Kind::Total } else { Kind::Rate }, None);
            node.number = r1;
            node.fip_region2 = Some(r2);
            return Some(Evaluator::InterRegion {
                node,
                phase,
                total,
                direction,
            });
        }

        if let Some(unit) = region_unit(kw) {
            return Some(Evaluator::Region {
                node: self.node(req, kind_of(kw, unit), None),
                table_keyword: kw.to_owned(),
                unit,
            });
        }

        if let Some(unit) = single_value_unit(kw) {
            let mut node = self.node(req, kind_of(kw, unit), None);
            node.category = Category::Miscellaneous;
            return Some(Evaluator::Global { node, unit });
        }

        if let Some(eval) = self.registry.get(kw) {
            return Some(self.function(req, kw, eval.clone()));
        }

        // Region-set suffix: `RPR_FIPABC` reads the `RPR` table of the
        // alternate region set while keeping the full keyword identity.
        if let Some(base) = kw.split('_').next().filter(|b| b.len() < kw.len()) {
            if let Some(unit) = region_unit(base) {
                return Some(Evaluator::Region {
                    node: self.node(req, kind_of(base, unit), None),
                    table_keyword: base.to_owned(),
                    unit,
                });
            }
            if let Some(eval) = self.registry.get(base) {
                return Some(self.function(req, kw, eval.clone()));
            }
        }

        // Tracer synthesis: `WTPRSEA` with a configured water tracer `SEA`
        // resolves through the phase-tagged `WTPR#W` entry.
        if kw.len() > 4 {
            let (prefix, tracer) = kw.split_at(4);
            if let Some(phase) = self.tracers.phase_of(tracer) {
                let tag = match phase {
                    Phase::Water => "#W",
                    Phase::Oil => "#O",
                    Phase::Gas => "#G",
                };
                if let Some(eval) = self.registry.get(&format!("{prefix}{tag}")) {
                    return Some(self.function(req, kw, eval.clone()));
                }
            }
        }

        None
    }

    fn function(&self, req: &SummaryRequest, keyword: &str, eval: Eval) -> Evaluator {
        let unit = probe_unit(&eval, keyword, req.number.unwrap_or(0));
        Evaluator::Function {
            node: self.node(req, kind_of(keyword, unit), None),
            unit,
            eval,
        }
    }

    fn node(&self, req: &SummaryRequest, kind: Kind, fip_region2: Option<i64>) -> SummaryNode {
        SummaryNode {
            keyword: req.keyword.clone(),
            category: category_of(&req.keyword),
            kind,
            wgname: req.wgname.clone(),
            number: req.number.unwrap_or(0),
            fip_region2,
        }
    }
}

/// Encode an inter-region pair into the compound request number.
pub fn encode_region_pair(r1: i64, r2: i64) -> i64 {
    r1 + REGION2_STRIDE * (r2 + REGION2_OFFSET)
}
