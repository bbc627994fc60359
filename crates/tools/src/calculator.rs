//! Calculation engine: material estimates for reinforced spot repairs.
//!
//! The model is never trusted with arithmetic. Every quantity the assistant
//! quotes comes from [`calculate_spot_repair`], which rounds each material up
//! to whole purchasable units.

use serde::{Deserialize, Serialize};
use tensive_core::{MaterialLine, MaterialManifest};
use thiserror::Error;

/// Square feet covered by one gallon of base coat.
pub const BASE_COAT_COVERAGE: f64 = 50.0;

/// Square feet covered by one gallon of top coat.
pub const TOP_COAT_COVERAGE: f64 = 70.0;

/// Square feet covered by one roll of reinforcement fleece.
pub const FLEECE_COVERAGE: f64 = 400.0;

pub const BASE_COAT: &str = "Base Coat Resin";
pub const TOP_COAT: &str = "Top Coat Resin";
pub const FLEECE: &str = "Reinforcement Fleece";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("count must be at least 1")]
    ZeroCount,

    #[error("{0} is already set")]
    AlreadySet(&'static str),

    #[error("{field} cannot be set before {missing}")]
    OutOfOrder {
        field: &'static str,
        missing: &'static str,
    },

    #[error("{0} does not apply to this repair type")]
    NotApplicable(&'static str),

    #[error("area of {0} sq ft is too large to estimate")]
    TooLarge(f64),
}

/// Kinds of repair the guided estimator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairType {
    SpotRepair,
    FullRoof,
    LinearFlashing,
}

impl RepairType {
    pub const ALL: [RepairType; 3] = [Self::SpotRepair, Self::FullRoof, Self::LinearFlashing];

    /// Wire value, as sent back by option buttons.
    pub fn value(self) -> &'static str {
        match self {
            Self::SpotRepair => "spot_repair",
            Self::FullRoof => "full_roof",
            Self::LinearFlashing => "linear_flashing",
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SpotRepair => "Spot Repair (Patches)",
            Self::FullRoof => "Full Roof Restoration",
            Self::LinearFlashing => "Linear Flashing",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.value() == value)
    }
}

/// Patch dimensions in feet. Both sides are positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions")]
pub struct Dimensions {
    length: f64,
    width: f64,
}

#[derive(Deserialize)]
struct RawDimensions {
    length: f64,
    width: f64,
}

impl TryFrom<RawDimensions> for Dimensions {
    type Error = CalculationError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        Self::new(raw.length, raw.width)
    }
}

impl Dimensions {
    pub fn new(length: f64, width: f64) -> Result<Self, CalculationError> {
        Ok(Self {
            length: positive("length", length)?,
            width: positive("width", width)?,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, CalculationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalculationError::NonPositive { field, value })
    }
}

/// Compute the material manifest for `count` identical patches.
///
/// Lines are always base coat, top coat, fleece, in that order.
pub fn calculate_spot_repair(
    length: f64,
    width: f64,
    count: u32,
) -> Result<MaterialManifest, CalculationError> {
    let dimensions = Dimensions::new(length, width)?;
    if count == 0 {
        return Err(CalculationError::ZeroCount);
    }

    let total_area = dimensions.area() * f64::from(count);
    if !total_area.is_finite() {
        return Err(CalculationError::TooLarge(total_area));
    }

    Ok(MaterialManifest {
        total_area,
        materials: vec![
            line(BASE_COAT, units(total_area, BASE_COAT_COVERAGE)?, "gallons"),
            line(TOP_COAT, units(total_area, TOP_COAT_COVERAGE)?, "gallons"),
            line(FLEECE, units(total_area, FLEECE_COVERAGE)?, "rolls"),
        ],
    })
}

fn units(area: f64, coverage: f64) -> Result<u32, CalculationError> {
    let quantity = (area / coverage).ceil();
    if quantity > f64::from(u32::MAX) {
        return Err(CalculationError::TooLarge(area));
    }
    Ok(quantity as u32)
}

fn line(name: &str, quantity: u32, unit: &str) -> MaterialLine {
    MaterialLine {
        name: name.into(),
        quantity,
        unit: unit.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantities(manifest: &MaterialManifest) -> Vec<u32> {
        manifest.materials.iter().map(|m| m.quantity).collect()
    }

    #[test]
    fn ten_by_ten_single_patch() {
        let manifest = calculate_spot_repair(10.0, 10.0, 1).unwrap();
        assert_eq!(manifest.total_area, 100.0);
        assert_eq!(quantities(&manifest), vec![2, 2, 1]);
    }

    #[test]
    fn twenty_by_twenty_two_patches() {
        let manifest = calculate_spot_repair(20.0, 20.0, 2).unwrap();
        assert_eq!(manifest.total_area, 800.0);
        assert_eq!(quantities(&manifest), vec![16, 12, 2]);
    }

    #[test]
    fn lines_are_in_fixed_order_with_units() {
        let manifest = calculate_spot_repair(8.0, 4.0, 1).unwrap();
        let names: Vec<&str> = manifest.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec![BASE_COAT, TOP_COAT, FLEECE]);
        assert_eq!(manifest.line(BASE_COAT).unwrap().unit, "gallons");
        assert_eq!(manifest.line(FLEECE).unwrap().unit, "rolls");
    }

    #[test]
    fn exact_multiples_do_not_round_up() {
        let manifest = calculate_spot_repair(10.0, 5.0, 1).unwrap();
        assert_eq!(manifest.line(BASE_COAT).unwrap().quantity, 1);
        let manifest = calculate_spot_repair(7.0, 10.0, 1).unwrap();
        assert_eq!(manifest.line(TOP_COAT).unwrap().quantity, 1);
    }

    #[test]
    fn tiny_area_still_needs_one_of_each() {
        let manifest = calculate_spot_repair(0.5, 0.5, 1).unwrap();
        assert_eq!(quantities(&manifest), vec![1, 1, 1]);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert_eq!(
            calculate_spot_repair(0.0, 4.0, 1).unwrap_err(),
            CalculationError::NonPositive {
                field: "length",
                value: 0.0
            }
        );
        assert!(matches!(
            calculate_spot_repair(4.0, -2.0, 1),
            Err(CalculationError::NonPositive { field: "width", .. })
        ));
        assert!(calculate_spot_repair(f64::NAN, 4.0, 1).is_err());
        assert!(calculate_spot_repair(f64::INFINITY, 4.0, 1).is_err());
    }

    #[test]
    fn rejects_zero_count() {
        assert_eq!(
            calculate_spot_repair(4.0, 4.0, 0).unwrap_err(),
            CalculationError::ZeroCount
        );
    }

    #[test]
    fn rejects_quantities_that_do_not_fit() {
        // 1e18 sq ft needs far more than u32::MAX gallons.
        assert!(matches!(
            calculate_spot_repair(1e6, 1e6, 1_000_000),
            Err(CalculationError::TooLarge(_))
        ));
        // Each side is finite but the area overflows.
        assert!(matches!(
            calculate_spot_repair(1e200, 1e200, 1),
            Err(CalculationError::TooLarge(area)) if area.is_infinite()
        ));
    }

    #[test]
    fn largest_fitting_quantity_is_kept() {
        let manifest = calculate_spot_repair(50.0, f64::from(u32::MAX), 1).unwrap();
        assert_eq!(manifest.line(BASE_COAT).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn repair_type_values_round_trip() {
        for t in RepairType::ALL {
            assert_eq!(RepairType::from_value(t.value()), Some(t));
        }
        assert_eq!(RepairType::from_value("gutter"), None);
        assert_eq!(
            serde_json::to_value(RepairType::LinearFlashing).unwrap(),
            "linear_flashing"
        );
    }

    #[test]
    fn dimensions_deserialize_with_validation() {
        let dims: Dimensions = serde_json::from_str(r#"{"length": 8, "width": 4}"#).unwrap();
        assert_eq!(dims.area(), 32.0);
        assert!(serde_json::from_str::<Dimensions>(r#"{"length": 0, "width": 4}"#).is_err());
    }
}
