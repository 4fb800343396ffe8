//! Rating provider trait definition.
//!
//! `RatingProvider` is the seam between the premium pipeline and the remote
//! rating service. [`RatingApiClient`] is the production implementation;
//! tests substitute their own.

use async_trait::async_trait;

use crate::client::RatingApiClient;
use crate::errors::RatingClientError;
use crate::models::{
    AdjustmentResultPayload, ApplyAdjustmentsRequest, CalculateAggregateRequest,
    CalculateAggregateResponse, CalculateRiskItemsRequest, CalculateRiskItemsResponse,
    ProRataRequest, ProRataResultPayload, RawBreakdown,
};

/// Transport boundary for the rating service.
///
/// One method per endpoint; implementations must not retry or reorder
/// requests on their own. Responses are returned as-is — reconciliation with
/// local state is the caller's concern.
#[async_trait]
pub trait RatingProvider: Send + Sync {
    /// Rate a batch of risk items belonging to one section.
    async fn calculate_risk_items(
        &self,
        request: &CalculateRiskItemsRequest,
    ) -> Result<CalculateRiskItemsResponse, RatingClientError>;

    /// Aggregate section payloads into per-section totals.
    async fn calculate_aggregate(
        &self,
        request: &CalculateAggregateRequest,
    ) -> Result<CalculateAggregateResponse, RatingClientError>;

    /// Apply the named discount/loading rates to an aggregate premium.
    async fn apply_adjustments(
        &self,
        request: &ApplyAdjustmentsRequest,
    ) -> Result<AdjustmentResultPayload, RatingClientError>;

    /// Apply a day-count ratio to a net premium.
    async fn calculate_pro_rata(
        &self,
        request: &ProRataRequest,
    ) -> Result<ProRataResultPayload, RatingClientError>;

    /// Fetch the (possibly raw, possibly fully-computed) calculation
    /// breakdown for a proposal.
    async fn calculation_breakdown(
        &self,
        proposal_id: &str,
    ) -> Result<RawBreakdown, RatingClientError>;
}

#[async_trait]
impl RatingProvider for RatingApiClient {
    async fn calculate_risk_items(
        &self,
        request: &CalculateRiskItemsRequest,
    ) -> Result<CalculateRiskItemsResponse, RatingClientError> {
        RatingApiClient::calculate_risk_items(self, request).await
    }

    async fn calculate_aggregate(
        &self,
        request: &CalculateAggregateRequest,
    ) -> Result<CalculateAggregateResponse, RatingClientError> {
        RatingApiClient::calculate_aggregate(self, request).await
    }

    async fn apply_adjustments(
        &self,
        request: &ApplyAdjustmentsRequest,
    ) -> Result<AdjustmentResultPayload, RatingClientError> {
        RatingApiClient::apply_adjustments(self, request).await
    }

    async fn calculate_pro_rata(
        &self,
        request: &ProRataRequest,
    ) -> Result<ProRataResultPayload, RatingClientError> {
        RatingApiClient::calculate_pro_rata(self, request).await
    }

    async fn calculation_breakdown(
        &self,
        proposal_id: &str,
    ) -> Result<RawBreakdown, RatingClientError> {
        RatingApiClient::calculation_breakdown(self, proposal_id).await
    }
}
