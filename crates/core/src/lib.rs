//! Premia Core - Proposal premium aggregation pipeline.
//!
//! This crate contains the calculation core of the Premia back office:
//! the staged pipeline that turns a set of user-edited risk items into a
//! final, pro-rated premium figure. It is transport-agnostic and consumes
//! the remote rating service through the `RatingServiceTrait` seam
//! (implemented over `premia-rating`).
//!
//! The pipeline stages, leaves first:
//!
//! 1. item preview/merge (`sections::item_calculator`)
//! 2. section calculate-all (`sections::SectionCalculator`)
//! 3. multi-section aggregation (`proposals::AggregateCalculator`)
//! 4. named discount/loading adjustments (`proposals::adjustment_calculator`)
//! 5. pro-rata day-count adjustment (`proposals::pro_rata_calculator`)
//!
//! `breakdown::normalize` can re-derive a consistent display view from
//! whatever partial calculation data exists, because stages may be invoked
//! out of order or repeated.

pub mod breakdown;
pub mod constants;
pub mod errors;
pub mod proposals;
pub mod rating;
pub mod sections;
pub mod utils;

// Re-export common types from the pipeline modules
pub use breakdown::*;
pub use proposals::*;
pub use sections::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
