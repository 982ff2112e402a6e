//! # Markup Reconciliation
//!
//! Applies the markup coefficient to the subtotal and, independently, to
//! every row, rounds both to whole currency units, then pushes any rounding
//! drift into the last row so that
//!
//! ```text
//! sum(row.price) == total_cash
//! ```
//!
//! holds exactly. The drift always lands on the structurally last row
//! present; it is never spread across rows.
//!
//! Amounts must stay within [`MAX_AMOUNT`], the largest value an `f64`
//! carries to whole units exactly. Larger buildings are rejected with
//! [`EstimateError::InvalidInput`] on the `total` field.

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::pricing::PricedItems;

/// Largest representable amount (2^53 currency units)
pub const MAX_AMOUNT: f64 = 9_007_199_254_740_992.0;

/// One priced row of the estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Fixed category code ("01".."08")
    pub code: String,
    pub title: String,
    /// Material or size description
    pub subtitle: String,
    /// Quantity with unit, e.g. "216 м²"
    pub volume: String,
    /// Final marked-up price in whole currency units
    pub price: i64,
}

/// Final estimate: rows in canonical category order plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub rows: Vec<LineItem>,
    pub total_cash: i64,
}

impl Estimate {
    /// Sum of row prices (always equal to `total_cash`)
    pub fn rows_sum(&self) -> i64 {
        self.rows.iter().map(|r| r.price).sum()
    }

    /// Find a row by its category code
    pub fn row(&self, code: &str) -> Option<&LineItem> {
        self.rows.iter().find(|r| r.code == code)
    }
}

/// Round to the nearest whole currency unit, halves away from zero.
pub fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

/// Round a marked-up amount, refusing anything non-finite, negative or
/// above [`MAX_AMOUNT`].
fn checked_amount(field: &str, value: f64) -> EstimateResult<i64> {
    if !value.is_finite() || value < 0.0 || value > MAX_AMOUNT {
        return Err(EstimateError::invalid_input(
            field,
            value.to_string(),
            "Estimate exceeds the largest supported amount; check the building dimensions",
        ));
    }
    Ok(round_currency(value))
}

/// Turn raw priced rows into the final estimate.
pub fn reconcile(priced: PricedItems, markup: f64) -> EstimateResult<Estimate> {
    let total_cash = checked_amount("total", priced.subtotal * markup)?;

    let mut rows = Vec::with_capacity(priced.items.len());
    for item in priced.items {
        let code = item.category.code();
        rows.push(LineItem {
            code: code.to_string(),
            title: item.category.title().to_string(),
            subtitle: item.subtitle,
            volume: item.volume,
            price: checked_amount(&format!("total.{}", code), item.raw_price * markup)?,
        });
    }

    let rows_sum = rows
        .iter()
        .try_fold(0i64, |acc, r| acc.checked_add(r.price))
        .ok_or_else(|| {
            EstimateError::invalid_input("total", total_cash.to_string(), "Row prices overflow")
        })?;
    let drift = total_cash - rows_sum;
    if drift != 0 {
        if let Some(last) = rows.last_mut() {
            tracing::debug!(drift, code = %last.code, "absorbing rounding drift");
            last.price += drift;
        }
    }

    Ok(Estimate { rows, total_cash })
}
