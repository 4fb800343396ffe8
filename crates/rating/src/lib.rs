//! Premia Rating Crate
//!
//! HTTP transport for the remote rating service consumed by the premium
//! aggregation pipeline in `premia-core`.
//!
//! # Overview
//!
//! The rating service owns the actual numeric rating formulas. This crate
//! only knows how to reach it:
//!
//! - `POST /calculations/risk-items` — rate the items of one section
//! - `POST /calculations/aggregate` — roll sections up into aggregates
//! - `POST /calculations/adjustments` — apply named discounts/loadings
//! - `POST /calculations/pro-rata` — apply a day-count ratio
//! - `GET  /calculations/breakdown/{id}` — fetch the calculation breakdown
//!
//! # Core Types
//!
//! - [`RatingProvider`] — the async trait the pipeline consumes
//! - [`RatingApiClient`] / [`RatingClientConfig`] — the reqwest implementation
//! - [`CalculatedRiskItem`] — the shared request/response item row
//! - [`RawBreakdown`] — the heterogeneous breakdown response

pub mod client;
pub mod errors;
pub mod models;
pub mod provider;

pub use client::{RatingApiClient, RatingClientConfig};
pub use errors::RatingClientError;
pub use models::{
    AdjustmentRatesPayload, AdjustmentResultPayload, ApplyAdjustmentsRequest,
    CalculateAggregateRequest, CalculateAggregateResponse, CalculateRiskItemsRequest,
    CalculateRiskItemsResponse, CalculatedRiskItem, ProRataRequest, ProRataResultPayload,
    RawAppliedAdjustment, RawBreakdown, RawBreakdownItem, RawBreakdownSection,
    RawCalculationSteps, RawFinalResults, RawProRataStep, RawSectionAdjustments,
    SectionAggregate, SectionPayload, SectionTotalsPayload, StockItemPayload,
};
pub use provider::RatingProvider;
