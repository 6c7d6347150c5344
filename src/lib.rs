//! Exhibition participation cost estimator for the Indian trade-show market.
//!
//! The pipeline runs strictly forward: raw wizard state is normalized, unit
//! rates are resolved from an injected [`RateTables`], seven category
//! calculators produce subtotals, tax and contingency are added, and the
//! seasonal and team-size multipliers adjust the grand total. Every call is
//! independent; nothing is cached between calls.
pub mod adjust;
pub mod categories;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod output;
pub mod rates;
pub mod report;
pub mod types;
pub mod util;

pub use engine::{
    calculate, compute_exhibition_cost, compute_exhibition_cost_with, estimate, estimate_with,
};
pub use error::EstimateError;
pub use rates::{RateResolver, RateTables, DEFAULT_RATES};
pub use types::{
    CalculationInput, CalculationResult, CalculatorInput, CostBreakdown, EnhancedEstimate,
};
