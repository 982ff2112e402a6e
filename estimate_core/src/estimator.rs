//! # Estimator
//!
//! The full pipeline: validate → price → reconcile. An [`Estimator`] owns
//! its [`PriceBook`] and is otherwise stateless, so one instance can serve
//! any number of threads at once without locking.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::Estimator;
//!
//! let estimator = Estimator::default();
//! let estimate = estimator
//!     .estimate_json(r#"{
//!         "length": 10, "width": 8, "height": 6, "floors": 1,
//!         "hasProject": true,
//!         "walls": { "type": "sandwich", "thickness": 100 },
//!         "roof": { "type": "membrane" }
//!     }"#)
//!     .unwrap();
//!
//! assert_eq!(estimate.total_cash, 2_364_869);
//! assert_eq!(estimate.rows_sum(), estimate.total_cash);
//! ```

use tracing::debug;

use crate::errors::{EstimateError, EstimateResult};
use crate::payment::{payment_options, PaymentOption};
use crate::prices::PriceBook;
use crate::pricing::Pricer;
use crate::reconcile::{reconcile, Estimate};
use crate::request::{EstimateRequest, RawEstimateRequest};
use crate::validation::validate_request;

/// Building cost estimator bound to one price book.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    prices: PriceBook,
}

impl Estimator {
    /// Create an estimator. The price book is trusted as-is; use
    /// [`Estimator::with_checked_prices`] for books loaded from disk.
    pub fn new(prices: PriceBook) -> Self {
        Estimator { prices }
    }

    /// Create an estimator after validating the price book.
    pub fn with_checked_prices(prices: PriceBook) -> EstimateResult<Self> {
        prices.validate()?;
        Ok(Estimator { prices })
    }

    pub fn prices(&self) -> &PriceBook {
        &self.prices
    }

    /// Validate, price and reconcile a raw request.
    pub fn estimate(&self, raw: &RawEstimateRequest) -> EstimateResult<Estimate> {
        let request = validate_request(raw, &self.prices).inspect_err(|e| {
            debug!(code = e.error_code(), field = e.field(), "request rejected: {}", e);
        })?;
        self.estimate_validated(&request)
    }

    /// Price and reconcile an already validated request.
    pub fn estimate_validated(&self, request: &EstimateRequest) -> EstimateResult<Estimate> {
        let priced = Pricer::new(&self.prices).price(request)?;
        debug!(rows = priced.items.len(), subtotal = priced.subtotal, "priced request");
        let estimate = reconcile(priced, self.prices.markup)?;
        debug!(total_cash = estimate.total_cash, "estimate ready");
        Ok(estimate)
    }

    /// Parse a JSON request body and estimate it.
    pub fn estimate_json(&self, body: &str) -> EstimateResult<Estimate> {
        let raw: RawEstimateRequest = serde_json::from_str(body)
            .map_err(|e| EstimateError::invalid_input("body", "<json>", e.to_string()))?;
        self.estimate(&raw)
    }

    /// Cash, sole-proprietor and company totals for an estimate.
    pub fn payment_options(&self, estimate: &Estimate) -> Vec<PaymentOption> {
        payment_options(estimate, &self.prices.payment)
    }
}
