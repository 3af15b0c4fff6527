use serde::{Deserialize, Serialize};

use super::measure::{Length, LengthUnit, UnitSystem, Weight, WeightUnit};
use crate::ValidationError;

/// Physical package: three lengths and a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub length: Length,
    pub width: Length,
    pub height: Length,
    pub weight: Weight,
}

impl Parcel {
    pub const fn new(length: Length, width: Length, height: Length, weight: Weight) -> Self {
        Self {
            length,
            width,
            height,
            weight,
        }
    }

    /// Parcel known only by its weight (tracking responses rarely expose dimensions).
    pub fn weight_only(weight: Weight, length_unit: LengthUnit) -> Self {
        let zero = Length::zero(length_unit);
        Self::new(zero, zero, zero, weight)
    }

    pub fn convert_to(
        &self,
        length_unit: LengthUnit,
        weight_unit: WeightUnit,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            length: self.length.convert(length_unit)?,
            width: self.width.convert(length_unit)?,
            height: self.height.convert(length_unit)?,
            weight: self.weight.convert(weight_unit)?,
        })
    }

    pub fn convert_to_system(&self, system: UnitSystem) -> Result<Self, ValidationError> {
        self.convert_to(system.length_unit(), system.weight_unit())
    }
}
