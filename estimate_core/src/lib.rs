//! # estimate_core - Building Cost Estimation Engine
//!
//! `estimate_core` turns a description of a steel-frame building (footprint,
//! wall height, floor count, foundation/wall/roof materials, openings) into
//! an itemized construction-cost estimate whose rows always add up to its
//! total.
//!
//! ## Pipeline
//!
//! ```text
//! RawEstimateRequest ──validate──▶ EstimateRequest ──price──▶ PricedItems ──reconcile──▶ Estimate
//! ```
//!
//! - **Stateless**: an [`Estimator`] only holds its immutable [`PriceBook`]
//! - **JSON-First**: requests and estimates are serde types
//! - **Fail fast**: the first invalid field is reported, nothing is guessed
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::{Estimator, RawEstimateRequest};
//!
//! let raw: RawEstimateRequest = serde_json::from_str(r#"{
//!     "length": 10, "width": 8, "height": 6, "floors": 1,
//!     "hasProject": true,
//!     "walls": { "type": "sandwich", "thickness": 100 },
//!     "roof": { "type": "membrane" },
//!     "doors": 1
//! }"#).unwrap();
//!
//! let estimate = Estimator::default().estimate(&raw).unwrap();
//! assert_eq!(estimate.total_cash, 2_460_869);
//! ```
//!
//! ## Modules
//!
//! - [`request`] - Raw and validated request types
//! - [`validation`] - Request validation
//! - [`prices`] - Price book (unit prices, tables, coefficients)
//! - [`pricing`] - Per-category raw costs
//! - [`reconcile`] - Markup, rounding and drift correction
//! - [`estimator`] - The full pipeline
//! - [`payment`] - Invoice surcharges on the cash total
//! - [`pdf`] - PDF rendering of an estimate
//! - [`format`] - Quantity and ru-RU number formatting
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod errors;
pub mod estimator;
pub mod format;
pub mod payment;
pub mod pdf;
pub mod prices;
pub mod pricing;
pub mod reconcile;
pub mod request;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use errors::{EstimateError, EstimateResult};
pub use estimator::Estimator;
pub use prices::PriceBook;
pub use reconcile::{Estimate, LineItem};
pub use request::{EstimateRequest, RawEstimateRequest};
