//! Runtime unit tags and output unit-system conversion.
//!
//! Internally every value is SI (seconds, pascals, m3, kg). Output streams
//! use one of the conventional reservoir unit systems, so each tag carries a
//! conversion factor and a display name per system.

/// Unit of measure attached to an evaluated quantity.
///
/// This is a runtime tag, not a compile-time dimension: the registry infers
/// units through composition (rate x time -> volume, rate / rate -> ratio)
/// and those inference tables need a closed value-level enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitTag {
    Identity,
    Time,
    Pressure,
    LiquidRate,
    GasRate,
    ResRate,
    MassRate,
    LiquidVolume,
    GasVolume,
    ResVolume,
    Mass,
    GasOilRatio,
    OilGasRatio,
    WaterCut,
    Transmissibility,
    Viscosity,
    LiquidPi,
    GasPi,
}

/// Unit inference for multiplication. Rates integrate to volumes over time;
/// identity is neutral; anything else keeps the left operand's tag.
pub fn mul_unit(lhs: UnitTag, rhs: UnitTag) -> UnitTag {
    use UnitTag::*;

    if lhs == rhs {
        return lhs;
    }

    match (lhs, rhs) {
        (LiquidRate, Time) | (Time, LiquidRate) => LiquidVolume,
        (GasRate, Time) | (Time, GasRate) => GasVolume,
        (ResRate, Time) | (Time, ResRate) => ResVolume,
        (MassRate, Time) | (Time, MassRate) => Mass,
        (Identity, other) => other,
        (other, Identity) => other,
        _ => lhs,
    }
}

/// Unit inference for division. Phase-rate ratios get their conventional
/// tags; everything unlisted collapses to identity.
pub fn div_unit(numer: UnitTag, denom: UnitTag) -> UnitTag {
    use UnitTag::*;

    match (numer, denom) {
        (GasRate, LiquidRate) => GasOilRatio,
        (LiquidRate, GasRate) => OilGasRatio,
        (LiquidRate, LiquidRate) => WaterCut,
        (LiquidRate, Time) => LiquidVolume,
        (GasRate, Time) => GasVolume,
        (MassRate, Time) => Mass,
        _ => Identity,
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const BAR: f64 = 1.0e5;
const PSIA: f64 = 6.894_757_293_168e3;
const ATM: f64 = 101_325.0;
const STB: f64 = 0.158_987_294_928;
const MSCF: f64 = 28.316_846_592;
const LB: f64 = 0.453_592_37;
const CENTIPOISE: f64 = 1.0e-3;
const CUBIC_CENTIMETRE: f64 = 1.0e-6;

/// Output unit convention for the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitSystem {
    #[default]
    Metric,
    Field,
    Lab,
}

impl UnitSystem {
    /// SI magnitude of one output unit for `tag` under this convention.
    fn si_factor(self, tag: UnitTag) -> f64 {
        use UnitTag::*;

        match self {
            UnitSystem::Metric => match tag {
                Identity | WaterCut => 1.0,
                Time => SECONDS_PER_DAY,
                Pressure => BAR,
                LiquidRate | GasRate | ResRate => 1.0 / SECONDS_PER_DAY,
                MassRate => 1.0 / SECONDS_PER_DAY,
                LiquidVolume | GasVolume | ResVolume => 1.0,
                Mass => 1.0,
                GasOilRatio | OilGasRatio => 1.0,
                Transmissibility => CENTIPOISE / SECONDS_PER_DAY / BAR,
                Viscosity => CENTIPOISE,
                LiquidPi | GasPi => 1.0 / SECONDS_PER_DAY / BAR,
            },
            UnitSystem::Field => match tag {
                Identity | WaterCut => 1.0,
                Time => SECONDS_PER_DAY,
                Pressure => PSIA,
                LiquidRate => STB / SECONDS_PER_DAY,
                GasRate => MSCF / SECONDS_PER_DAY,
                ResRate => STB / SECONDS_PER_DAY,
                MassRate => LB / SECONDS_PER_DAY,
                LiquidVolume => STB,
                GasVolume => MSCF,
                ResVolume => STB,
                Mass => LB,
                GasOilRatio => MSCF / STB,
                OilGasRatio => STB / MSCF,
                Transmissibility => CENTIPOISE * STB / SECONDS_PER_DAY / PSIA,
                Viscosity => CENTIPOISE,
                LiquidPi => STB / SECONDS_PER_DAY / PSIA,
                GasPi => MSCF / SECONDS_PER_DAY / PSIA,
            },
            UnitSystem::Lab => match tag {
                Identity | WaterCut => 1.0,
                Time => SECONDS_PER_HOUR,
                Pressure => ATM,
                LiquidRate | GasRate | ResRate => CUBIC_CENTIMETRE / SECONDS_PER_HOUR,
                MassRate => 1.0e-3 / SECONDS_PER_HOUR,
                LiquidVolume | GasVolume | ResVolume => CUBIC_CENTIMETRE,
                Mass => 1.0e-3,
                GasOilRatio | OilGasRatio => 1.0,
                Transmissibility => CENTIPOISE * CUBIC_CENTIMETRE / SECONDS_PER_HOUR / ATM,
                Viscosity => CENTIPOISE,
                LiquidPi | GasPi => CUBIC_CENTIMETRE / SECONDS_PER_HOUR / ATM,
            },
        }
    }

    /// Convert an internal SI value to this convention's output unit.
    pub fn from_si(self, tag: UnitTag, value: f64) -> f64 {
        value / self.si_factor(tag)
    }

    /// Convert an output-convention value back to SI.
    pub fn to_si(self, tag: UnitTag, value: f64) -> f64 {
        value * self.si_factor(tag)
    }

    /// Display name of the output unit, as written to the specification block.
    pub fn name(self, tag: UnitTag) -> &'static str {
        use UnitTag::*;

        match self {
            UnitSystem::Metric => match tag {
                Identity | WaterCut => "",
                Time => "DAYS",
                Pressure => "BARSA",
                LiquidRate => "SM3/DAY",
                GasRate => "SM3/DAY",
                ResRate => "RM3/DAY",
                MassRate => "KG/DAY",
                LiquidVolume => "SM3",
                GasVolume => "SM3",
                ResVolume => "RM3",
                Mass => "KG",
                GasOilRatio => "SM3/SM3",
                OilGasRatio => "SM3/SM3",
                Transmissibility => "CPM3/DAY/BARS",
                Viscosity => "CP",
                LiquidPi | GasPi => "SM3/DAY/BARS",
            },
            UnitSystem::Field => match tag {
                Identity | WaterCut => "",
                Time => "DAYS",
                Pressure => "PSIA",
                LiquidRate => "STB/DAY",
                GasRate => "MSCF/DAY",
                ResRate => "RB/DAY",
                MassRate => "LB/DAY",
                LiquidVolume => "STB",
                GasVolume => "MSCF",
                ResVolume => "RB",
                Mass => "LB",
                GasOilRatio => "MSCF/STB",
                OilGasRatio => "STB/MSCF",
                Transmissibility => "CPRB/DAY/PSI",
                Viscosity => "CP",
                LiquidPi => "STB/DAY/PSI",
                GasPi => "MSCF/DAY/PSI",
            },
            UnitSystem::Lab => match tag {
                Identity | WaterCut => "",
                Time => "HR",
                Pressure => "ATMA",
                LiquidRate | GasRate => "SCC/HR",
                ResRate => "RCC/HR",
                MassRate => "GM/HR",
                LiquidVolume | GasVolume => "SCC",
                ResVolume => "RCC",
                Mass => "GM",
                GasOilRatio | OilGasRatio => "SCC/SCC",
                Transmissibility => "CPCC/HR/ATM",
                Viscosity => "CP",
                LiquidPi | GasPi => "SCC/HR/ATM",
            },
        }
    }
}
