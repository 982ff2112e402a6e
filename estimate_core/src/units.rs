//! # Unit Types
//!
//! Lightweight `f64` wrappers for the quantities that appear in an estimate.
//! They keep square meters from being multiplied by a per-ton price by
//! accident while serializing as plain numbers.
//!
//! All quantities are metric: meters, square meters, cubic meters,
//! kilograms and metric tons.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{Meters, SquareMeters};
//!
//! let area: SquareMeters = Meters(10.0) * Meters(8.0);
//! assert_eq!(area.0, 80.0);
//! assert_eq!(area.scaled(1.2).0, 96.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

// ============================================================================
// Length and Area
// ============================================================================

/// Length in meters (also used for linear meters of strip footing)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

/// Volume in cubic meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMeters(pub f64);

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Mul for Meters {
    type Output = SquareMeters;
    fn mul(self, rhs: Meters) -> SquareMeters {
        SquareMeters(self.0 * rhs.0)
    }
}

impl Mul<Meters> for SquareMeters {
    type Output = CubicMeters;
    fn mul(self, rhs: Meters) -> CubicMeters {
        CubicMeters(self.0 * rhs.0)
    }
}

impl Meters {
    /// Multiply by a dimensionless factor
    pub fn scaled(self, factor: f64) -> Meters {
        Meters(self.0 * factor)
    }
}

impl SquareMeters {
    /// Multiply by a dimensionless factor (installation margins, overhang)
    pub fn scaled(self, factor: f64) -> SquareMeters {
        SquareMeters(self.0 * factor)
    }
}

// ============================================================================
// Mass
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Mass in metric tons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tons(pub f64);
