//! Rating service boundary - the pipeline's only external dependency.

mod rating_errors;
mod rating_model;
mod rating_service;
mod rating_traits;

pub use rating_errors::*;
pub use rating_model::*;
pub use rating_service::*;
pub use rating_traits::*;

// The wire item/aggregate shapes double as the cached calculated shapes on
// the domain side, so they are re-exported for the rest of the crate.
pub use premia_rating::{
    CalculatedRiskItem, RawBreakdown, SectionAggregate, SectionPayload, StockItemPayload,
};
