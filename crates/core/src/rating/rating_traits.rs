use async_trait::async_trait;
use rust_decimal::Decimal;

use super::rating_model::SectionRatingOutcome;
use crate::errors::Result;
use crate::proposals::{AdjustmentResult, ProRataResult, ProposalAdjustments};
use premia_rating::{CalculatedRiskItem, RawBreakdown, SectionAggregate, SectionPayload};

/// The rating operations the pipeline consumes.
///
/// Implementations translate between domain types and the wire shapes of
/// one concrete rating deployment. Tests substitute hand-written mocks.
#[async_trait]
pub trait RatingServiceTrait: Send + Sync {
    /// Rate the full current item list of one section.
    async fn rate_section_items(
        &self,
        sub_risk: &str,
        proportion_rate: Decimal,
        risk_items: Vec<CalculatedRiskItem>,
    ) -> Result<SectionRatingOutcome>;

    /// Roll section payloads up into per-section aggregates.
    async fn aggregate_sections(
        &self,
        sections: Vec<SectionPayload>,
    ) -> Result<Vec<SectionAggregate>>;

    /// Apply the named discount/loading rates against an aggregate premium.
    async fn apply_adjustments(
        &self,
        total_aggregate_premium: Decimal,
        rates: &ProposalAdjustments,
    ) -> Result<AdjustmentResult>;

    /// Apply a day-count ratio to a net premium.
    async fn calculate_pro_rata(
        &self,
        net_premium_due: Decimal,
        cover_days: i64,
    ) -> Result<ProRataResult>;

    /// Fetch the raw calculation breakdown for a proposal.
    async fn calculation_breakdown(&self, proposal_id: &str) -> Result<RawBreakdown>;
}
