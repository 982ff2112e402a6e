//! # Price Book
//!
//! Every unit price, coefficient and lookup table the estimator uses lives
//! in one immutable [`PriceBook`]. It is built once at startup, either from
//! the built-in standard tables or from a TOML file, and then shared
//! read-only by any number of estimates.
//!
//! ## TOML Layout
//!
//! ```toml
//! markup = 1.2
//! door_unit = 80000.0
//!
//! [walls]
//! labor_per_m2 = 1300.0
//! multiplier = 1.3
//!
//! [[walls.sandwich]]
//! thickness_mm = 100
//! price = 2855.0
//! ```
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::prices::PriceBook;
//! use estimate_core::request::WallKind;
//!
//! let book = PriceBook::standard();
//! assert_eq!(book.wall_panel_price(WallKind::Sandwich, 100), Some(2855.0));
//! assert_eq!(book.wall_panel_price(WallKind::Pir, 200), None);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::request::{Floors, WallKind};

/// Tolerance used when matching slab thickness keys (meters)
const THICKNESS_EPSILON: f64 = 1e-9;

/// Panel price keyed by panel thickness in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPrice {
    pub thickness_mm: u32,
    pub price: f64,
}

/// Unit price keyed by an opening size label such as `"3x4"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedPrice {
    pub size: String,
    pub price: f64,
}

/// Design documentation (sections АР, КМ, КМД)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPrices {
    pub fee: f64,
    pub sections: u32,
}

/// Concrete, rebar and labor prices for slab and strip foundations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundationPrices {
    /// Concrete per m³
    pub concrete_per_m3: f64,
    /// Labor per m³ of slab concrete
    pub labor_per_m3: f64,
    /// Pumps, vibrators and formwork rental per m³
    pub equipment_per_m3: f64,
    /// Rebar per kg
    pub rebar_per_kg: f64,
    /// Slab rebar consumption, kg per m² of slab
    pub slab_rebar_kg_per_m2: f64,
    /// Slab area margin for installation (1.1 = +10 %)
    pub slab_area_margin: f64,
    /// Accepted slab thicknesses in meters
    pub slab_thicknesses_m: Vec<f64>,
    /// Strip footing concrete, m³ per linear meter
    pub strip_m3_per_m: f64,
    /// Strip footing rebar, kg per linear meter
    pub strip_rebar_kg_per_m: f64,
    /// Strip footing labor per linear meter
    pub strip_labor_per_m: f64,
}

/// Steel frame tonnage coefficients and prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalPrices {
    /// Frame mass per m² of footprint for a single-floor building (t/m²)
    pub tons_per_m2_single_floor: f64,
    /// Frame mass per m² of footprint for a two-floor building (t/m²)
    pub tons_per_m2_two_floors: f64,
    pub material_per_ton: f64,
    pub fabrication_per_ton: f64,
}

/// Wall panel prices and installation coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallPrices {
    pub labor_per_m2: f64,
    /// Installation overhead beyond labor and panel cost
    pub multiplier: f64,
    pub sandwich: Vec<PanelPrice>,
    pub pir: Vec<PanelPrice>,
}

/// Roof material prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofPrices {
    pub labor_per_m2: f64,
    /// Roof area margin for overhang and waste (1.2 = +20 %)
    pub area_margin: f64,
    pub sandwich: Vec<PanelPrice>,
    pub membrane_per_m2: f64,
}

/// Surcharges applied to the cash total for invoiced payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentSurcharges {
    /// Payment through a sole proprietor (ИП)
    pub sole_proprietor: f64,
    /// Payment through a company with VAT (ООО)
    pub company: f64,
}

/// Complete, immutable set of prices for one estimator instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBook {
    /// Client-facing markup applied to the subtotal and to every row
    pub markup: f64,
    /// Price of one steel entry door
    pub door_unit: f64,
    pub project: ProjectPrices,
    pub foundation: FoundationPrices,
    pub metal: MetalPrices,
    pub walls: WallPrices,
    pub roof: RoofPrices,
    pub gates: Vec<SizedPrice>,
    pub windows: Vec<SizedPrice>,
    pub payment: PaymentSurcharges,
}

impl Default for PriceBook {
    fn default() -> Self {
        PriceBook::standard()
    }
}

fn panels(rows: &[(u32, f64)]) -> Vec<PanelPrice> {
    rows.iter()
        .map(|&(thickness_mm, price)| PanelPrice { thickness_mm, price })
        .collect()
}

fn sized(rows: &[(&str, f64)]) -> Vec<SizedPrice> {
    rows.iter()
        .map(|&(size, price)| SizedPrice {
            size: size.to_string(),
            price,
        })
        .collect()
}

impl PriceBook {
    /// The standard price list.
    pub fn standard() -> Self {
        PriceBook {
            markup: 1.2,
            door_unit: 80_000.0,
            project: ProjectPrices {
                fee: 300_000.0,
                sections: 3,
            },
            foundation: FoundationPrices {
                concrete_per_m3: 7_500.0,
                labor_per_m3: 4_500.0,
                equipment_per_m3: 1_500.0,
                rebar_per_kg: 90.0,
                slab_rebar_kg_per_m2: 25.0,
                slab_area_margin: 1.1,
                slab_thicknesses_m: vec![0.2, 0.3, 0.4],
                strip_m3_per_m: 0.24,
                strip_rebar_kg_per_m: 20.0,
                strip_labor_per_m: 3_500.0,
            },
            metal: MetalPrices {
                tons_per_m2_single_floor: 0.042,
                tons_per_m2_two_floors: 0.070,
                material_per_ton: 120_000.0,
                fabrication_per_ton: 65_000.0,
            },
            walls: WallPrices {
                labor_per_m2: 1_300.0,
                multiplier: 1.3,
                sandwich: panels(&[(100, 2_855.0), (120, 3_055.0), (150, 3_355.0)]),
                pir: panels(&[(60, 2_750.0), (100, 3_350.0), (150, 4_300.0)]),
            },
            roof: RoofPrices {
                labor_per_m2: 1_100.0,
                area_margin: 1.2,
                sandwich: panels(&[(100, 3_000.0), (150, 3_600.0), (200, 4_200.0)]),
                membrane_per_m2: 800.0,
            },
            gates: sized(&[
                ("3x2", 200_000.0),
                ("3x3", 250_000.0),
                ("3x4", 320_000.0),
                ("3x5", 380_000.0),
                ("4x5", 450_000.0),
            ]),
            windows: sized(&[("1.2x2", 45_000.0), ("1.2x3", 65_000.0), ("1.2x5", 90_000.0)]),
            payment: PaymentSurcharges {
                sole_proprietor: 0.07,
                company: 0.20,
            },
        }
    }

    /// Parse and validate a price book from TOML text.
    pub fn from_toml_str(text: &str) -> EstimateResult<Self> {
        let book: PriceBook =
            toml::from_str(text).map_err(|e| EstimateError::invalid_price_book(e.to_string()))?;
        book.validate()?;
        Ok(book)
    }

    /// Load and validate a price book from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> EstimateResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EstimateError::invalid_price_book(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML (used to print the standard list as a starting point).
    pub fn to_toml_string(&self) -> EstimateResult<String> {
        toml::to_string_pretty(self).map_err(|e| EstimateError::invalid_price_book(e.to_string()))
    }

    /// Check that every value is usable for pricing.
    pub fn validate(&self) -> EstimateResult<()> {
        if !self.markup.is_finite() || self.markup < 1.0 {
            return Err(EstimateError::invalid_price_book(format!(
                "markup must be a finite value >= 1.0, got {}",
                self.markup
            )));
        }

        let f = &self.foundation;
        let m = &self.metal;
        let scalars = [
            ("door_unit", self.door_unit),
            ("project.fee", self.project.fee),
            ("foundation.concrete_per_m3", f.concrete_per_m3),
            ("foundation.labor_per_m3", f.labor_per_m3),
            ("foundation.equipment_per_m3", f.equipment_per_m3),
            ("foundation.rebar_per_kg", f.rebar_per_kg),
            ("foundation.slab_rebar_kg_per_m2", f.slab_rebar_kg_per_m2),
            ("foundation.slab_area_margin", f.slab_area_margin),
            ("foundation.strip_m3_per_m", f.strip_m3_per_m),
            ("foundation.strip_rebar_kg_per_m", f.strip_rebar_kg_per_m),
            ("foundation.strip_labor_per_m", f.strip_labor_per_m),
            ("metal.tons_per_m2_single_floor", m.tons_per_m2_single_floor),
            ("metal.tons_per_m2_two_floors", m.tons_per_m2_two_floors),
            ("metal.material_per_ton", m.material_per_ton),
            ("metal.fabrication_per_ton", m.fabrication_per_ton),
            ("walls.labor_per_m2", self.walls.labor_per_m2),
            ("walls.multiplier", self.walls.multiplier),
            ("roof.labor_per_m2", self.roof.labor_per_m2),
            ("roof.area_margin", self.roof.area_margin),
            ("roof.membrane_per_m2", self.roof.membrane_per_m2),
            ("payment.sole_proprietor", self.payment.sole_proprietor),
            ("payment.company", self.payment.company),
        ];
        for (name, value) in scalars {
            check_amount(name, value)?;
        }

        for (name, table) in [
            ("walls.sandwich", &self.walls.sandwich),
            ("walls.pir", &self.walls.pir),
            ("roof.sandwich", &self.roof.sandwich),
        ] {
            if table.is_empty() {
                return Err(EstimateError::invalid_price_book(format!("{} is empty", name)));
            }
            for row in table {
                check_amount(name, row.price)?;
            }
        }

        for (name, table) in [("gates", &self.gates), ("windows", &self.windows)] {
            if table.is_empty() {
                return Err(EstimateError::invalid_price_book(format!("{} is empty", name)));
            }
            for row in table {
                check_amount(name, row.price)?;
            }
        }

        if f.slab_thicknesses_m.is_empty() {
            return Err(EstimateError::invalid_price_book(
                "foundation.slab_thicknesses_m is empty",
            ));
        }
        for &t in &f.slab_thicknesses_m {
            if !t.is_finite() || t <= 0.0 {
                return Err(EstimateError::invalid_price_book(format!(
                    "foundation.slab_thicknesses_m contains {}",
                    t
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Wall panel price for a panel type and thickness, if that panel exists
    pub fn wall_panel_price(&self, kind: WallKind, thickness_mm: u32) -> Option<f64> {
        let table = match kind {
            WallKind::Sandwich => &self.walls.sandwich,
            WallKind::Pir => &self.walls.pir,
        };
        panel_lookup(table, thickness_mm)
    }

    /// Accepted wall thicknesses for a panel type, in table order
    pub fn wall_thicknesses(&self, kind: WallKind) -> Vec<u32> {
        let table = match kind {
            WallKind::Sandwich => &self.walls.sandwich,
            WallKind::Pir => &self.walls.pir,
        };
        table.iter().map(|p| p.thickness_mm).collect()
    }

    /// Sandwich roof panel price for a thickness
    pub fn roof_panel_price(&self, thickness_mm: u32) -> Option<f64> {
        panel_lookup(&self.roof.sandwich, thickness_mm)
    }

    /// Accepted sandwich roof thicknesses
    pub fn roof_thicknesses(&self) -> Vec<u32> {
        self.roof.sandwich.iter().map(|p| p.thickness_mm).collect()
    }

    /// Whether a slab thickness (meters) is one of the accepted keys
    pub fn is_slab_thickness(&self, thickness_m: f64) -> bool {
        self.foundation
            .slab_thicknesses_m
            .iter()
            .any(|&t| (t - thickness_m).abs() < THICKNESS_EPSILON)
    }

    pub fn gate_price(&self, size: &str) -> Option<f64> {
        sized_lookup(&self.gates, size)
    }

    pub fn window_price(&self, size: &str) -> Option<f64> {
        sized_lookup(&self.windows, size)
    }

    /// Frame tonnage coefficient for the floor count (t/m²)
    pub fn metal_tons_per_m2(&self, floors: Floors) -> f64 {
        match floors {
            Floors::One => self.metal.tons_per_m2_single_floor,
            Floors::Two => self.metal.tons_per_m2_two_floors,
        }
    }
}

fn check_amount(name: &str, value: f64) -> EstimateResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EstimateError::invalid_price_book(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn panel_lookup(table: &[PanelPrice], thickness_mm: u32) -> Option<f64> {
    table
        .iter()
        .find(|p| p.thickness_mm == thickness_mm)
        .map(|p| p.price)
}

fn sized_lookup(table: &[SizedPrice], size: &str) -> Option<f64> {
    table.iter().find(|p| p.size == size).map(|p| p.price)
}

/// Join table keys for error messages: `"100, 120, 150"`
pub(crate) fn list_keys<T: ToString>(keys: impl IntoIterator<Item = T>) -> String {
    keys.into_iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_book_is_valid() {
        assert!(PriceBook::standard().validate().is_ok());
        assert_eq!(PriceBook::default(), PriceBook::standard());
    }

    #[test]
    fn test_wall_lookup() {
        let book = PriceBook::standard();
        assert_eq!(book.wall_panel_price(WallKind::Sandwich, 120), Some(3055.0));
        assert_eq!(book.wall_panel_price(WallKind::Pir, 60), Some(2750.0));
        assert_eq!(book.wall_panel_price(WallKind::Sandwich, 60), None);
        assert_eq!(book.wall_panel_price(WallKind::Sandwich, 99), None);
        assert_eq!(book.wall_thicknesses(WallKind::Pir), vec![60, 100, 150]);
    }

    #[test]
    fn test_roof_and_opening_lookup() {
        let book = PriceBook::standard();
        assert_eq!(book.roof_panel_price(200), Some(4200.0));
        assert_eq!(book.roof_panel_price(120), None);
        assert_eq!(book.gate_price("4x5"), Some(450_000.0));
        assert_eq!(book.gate_price("5x5"), None);
        assert_eq!(book.window_price("1.2x3"), Some(65_000.0));
        assert_eq!(book.window_price("1x1"), None);
    }

    #[test]
    fn test_slab_thickness_keys() {
        let book = PriceBook::standard();
        assert!(book.is_slab_thickness(0.2));
        assert!(book.is_slab_thickness(0.1 + 0.2));
        assert!(book.is_slab_thickness(0.4));
        assert!(!book.is_slab_thickness(0.25));
        assert!(!book.is_slab_thickness(0.0));
    }

    #[test]
    fn test_metal_coefficient_by_floors() {
        let book = PriceBook::standard();
        assert_eq!(book.metal_tons_per_m2(Floors::One), 0.042);
        assert_eq!(book.metal_tons_per_m2(Floors::Two), 0.070);
    }

    #[test]
    fn test_toml_roundtrip() {
        let book = PriceBook::standard();
        let text = book.to_toml_string().unwrap();
        let parsed = PriceBook::from_toml_str(&text).unwrap();
        assert_eq!(book, parsed);
    }

    #[test]
    fn test_rejects_markup_below_one() {
        let mut book = PriceBook::standard();
        book.markup = 0.9;
        let err = book.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PRICE_BOOK");
        assert!(err.to_string().contains("markup"));
    }

    #[test]
    fn test_rejects_negative_price() {
        let mut book = PriceBook::standard();
        book.walls.pir[1].price = -1.0;
        let err = book.validate().unwrap_err();
        assert!(err.to_string().contains("walls.pir"));
    }

    #[test]
    fn test_rejects_empty_table() {
        let mut book = PriceBook::standard();
        book.gates.clear();
        assert!(book.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = PriceBook::from_toml_str("markup = \"high\"").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PRICE_BOOK");
    }

    #[test]
    fn test_list_keys() {
        assert_eq!(list_keys([100, 120, 150]), "100, 120, 150");
    }
}
