//! Proposals domain - aggregation, adjustments, pro-rata, session state.

pub mod adjustment_calculator;
pub mod aggregate_calculator;
mod context;
mod proposal_model;
pub mod proposal_service;
mod proposals_errors;
pub mod pro_rata_calculator;

pub use adjustment_calculator::*;
pub use aggregate_calculator::*;
pub use context::*;
pub use pro_rata_calculator::*;
pub use proposal_model::*;
pub use proposal_service::*;
pub use proposals_errors::*;
