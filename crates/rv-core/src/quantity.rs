//! Value-with-unit pair produced by every evaluator.
//!
//! Arithmetic infers the result tag through the tables in [`crate::units`],
//! which lets a vector's formula be written as a composition of smaller
//! evaluators without hand-tracking units at every site.

use core::ops::{Add, Div, Mul, Sub};

use crate::units::{div_unit, mul_unit, UnitTag};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: UnitTag,
}

impl Quantity {
    pub const fn new(value: f64, unit: UnitTag) -> Self {
        Self { value, unit }
    }

    pub const fn zero(unit: UnitTag) -> Self {
        Self { value: 0.0, unit }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        // Mismatched operands here mean a registry formula is wrong, which
        // is a programming error and not a data condition.
        assert_eq!(
            self.unit, rhs.unit,
            "unit mismatch in quantity addition"
        );
        Quantity::new(self.value + rhs.value, self.unit)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        assert_eq!(
            self.unit, rhs.unit,
            "unit mismatch in quantity subtraction"
        );
        Quantity::new(self.value - rhs.value, self.unit)
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        Quantity::new(self.value * rhs.value, mul_unit(self.unit, rhs.unit))
    }
}

impl Div for Quantity {
    type Output = Quantity;

    /// Division by zero yields zero in the inferred unit. Ratio vectors must
    /// stay total over steps with no activity, so this never produces
    /// NaN/Inf and never panics.
    fn div(self, rhs: Quantity) -> Quantity {
        let unit = div_unit(self.unit, rhs.unit);
        if rhs.value == 0.0 {
            return Quantity::zero(unit);
        }
        Quantity::new(self.value / rhs.value, unit)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, divisor: f64) -> Quantity {
        if divisor == 0.0 {
            return Quantity::zero(self.unit);
        }
        Quantity::new(self.value / divisor, self.unit)
    }
}
