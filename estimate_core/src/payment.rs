//! # Payment Options
//!
//! The estimate total is the cash price. Paying by invoice through a sole
//! proprietor or a company adds a surcharge; these figures are shown next to
//! the estimate and are not part of its rows.

use serde::{Deserialize, Serialize};

use crate::prices::PaymentSurcharges;
use crate::reconcile::{round_currency, Estimate};

/// How the client pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// Invoice from a sole proprietor (ИП)
    SoleProprietor,
    /// Invoice from a company (ООО)
    Company,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Наличный расчет",
            PaymentMethod::SoleProprietor => "ИП",
            PaymentMethod::Company => "ООО",
        }
    }
}

/// Total for one payment method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub method: PaymentMethod,
    /// Fraction added to the cash total (0.07 = +7 %)
    pub surcharge: f64,
    pub total: i64,
}

/// Totals for every payment method, cash first.
pub fn payment_options(estimate: &Estimate, surcharges: &PaymentSurcharges) -> Vec<PaymentOption> {
    [
        (PaymentMethod::Cash, 0.0),
        (PaymentMethod::SoleProprietor, surcharges.sole_proprietor),
        (PaymentMethod::Company, surcharges.company),
    ]
    .into_iter()
    .map(|(method, surcharge)| PaymentOption {
        method,
        surcharge,
        total: round_currency(estimate.total_cash as f64 * (1.0 + surcharge)),
    })
    .collect()
}
