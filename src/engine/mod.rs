//! Availability, pricing and revenue over a [`CourtStore`](crate::store::CourtStore).
//!
//! Nothing here holds state between calls: each query reads a fresh snapshot
//! from the store and derives its answer from that alone.

mod availability;
mod conflict;
mod error;
mod finance;
mod planner;
mod pricing;
#[cfg(test)]
mod tests;

pub use availability::AvailabilityResolver;
pub use conflict::{claims_at, detect_conflicts};
pub use error::EngineError;
pub use finance::FinanceAggregator;
pub use planner::{build_grid, operating_hours_for, plan_day, quote};
pub use pricing::PriceTable;
