use async_trait::async_trait;
use log::{debug, error};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::rating_errors::RatingError;
use super::rating_model::SectionRatingOutcome;
use super::rating_traits::RatingServiceTrait;
use crate::errors::Result;
use crate::proposals::{AdjustmentResult, ProRataResult, ProposalAdjustments};
use premia_rating::{
    ApplyAdjustmentsRequest, CalculateAggregateRequest, CalculateRiskItemsRequest,
    CalculatedRiskItem, ProRataRequest, RatingProvider, RawBreakdown, SectionAggregate,
    SectionPayload,
};

/// Production implementation of [`RatingServiceTrait`] over a
/// [`RatingProvider`] transport.
#[derive(Clone)]
pub struct RatingService {
    provider: Arc<dyn RatingProvider>,
}

impl RatingService {
    pub fn new(provider: Arc<dyn RatingProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RatingServiceTrait for RatingService {
    async fn rate_section_items(
        &self,
        sub_risk: &str,
        proportion_rate: Decimal,
        risk_items: Vec<CalculatedRiskItem>,
    ) -> Result<SectionRatingOutcome> {
        debug!(
            "Rating {} item(s) for sub-risk {}",
            risk_items.len(),
            sub_risk
        );

        let request = CalculateRiskItemsRequest {
            sub_risk: sub_risk.to_string(),
            proportion_rate,
            risk_items,
        };

        let response = self
            .provider
            .calculate_risk_items(&request)
            .await
            .map_err(RatingError::Client)?;

        Ok(SectionRatingOutcome {
            calculated_items: response.calculated_items,
            totals: response.totals.map(Into::into),
        })
    }

    async fn aggregate_sections(
        &self,
        sections: Vec<SectionPayload>,
    ) -> Result<Vec<SectionAggregate>> {
        debug!("Aggregating {} section(s)", sections.len());

        let request = CalculateAggregateRequest { sections };
        let response = self
            .provider
            .calculate_aggregate(&request)
            .await
            .map_err(RatingError::Client)?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "no reason given".to_string());
            error!("Aggregate calculation rejected: {}", message);
            return Err(RatingError::AggregateRejected(message).into());
        }

        Ok(response.section_aggregates)
    }

    async fn apply_adjustments(
        &self,
        total_aggregate_premium: Decimal,
        rates: &ProposalAdjustments,
    ) -> Result<AdjustmentResult> {
        debug!(
            "Applying proposal adjustments to premium {}",
            total_aggregate_premium
        );

        let request = ApplyAdjustmentsRequest {
            total_aggregate_premium,
            adjustments: rates.clone().into(),
        };

        let payload = self
            .provider
            .apply_adjustments(&request)
            .await
            .map_err(RatingError::Client)?;

        Ok(payload.into())
    }

    async fn calculate_pro_rata(
        &self,
        net_premium_due: Decimal,
        cover_days: i64,
    ) -> Result<ProRataResult> {
        debug!(
            "Calculating pro-rata for premium {} over {} day(s)",
            net_premium_due, cover_days
        );

        let request = ProRataRequest {
            net_premium_due,
            cover_days,
        };

        let payload = self
            .provider
            .calculate_pro_rata(&request)
            .await
            .map_err(RatingError::Client)?;

        Ok(payload.into())
    }

    async fn calculation_breakdown(&self, proposal_id: &str) -> Result<RawBreakdown> {
        debug!("Fetching calculation breakdown for {}", proposal_id);

        self.provider
            .calculation_breakdown(proposal_id)
            .await
            .map_err(RatingError::Client)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use async_trait::async_trait;
    use premia_rating::{
        AdjustmentResultPayload, CalculateAggregateResponse, CalculateRiskItemsResponse,
        ProRataResultPayload, RatingClientError, SectionAggregate,
    };
    use rust_decimal_macros::dec;

    struct MockProvider {
        aggregate_response: CalculateAggregateResponse,
    }

    #[async_trait]
    impl RatingProvider for MockProvider {
        async fn calculate_risk_items(
            &self,
            request: &CalculateRiskItemsRequest,
        ) -> std::result::Result<CalculateRiskItemsResponse, RatingClientError> {
            Ok(CalculateRiskItemsResponse {
                calculated_items: request.risk_items.clone(),
                totals: None,
            })
        }

        async fn calculate_aggregate(
            &self,
            _request: &CalculateAggregateRequest,
        ) -> std::result::Result<CalculateAggregateResponse, RatingClientError> {
            Ok(CalculateAggregateResponse {
                section_aggregates: self.aggregate_response.section_aggregates.clone(),
                success: self.aggregate_response.success,
                message: self.aggregate_response.message.clone(),
            })
        }

        async fn apply_adjustments(
            &self,
            request: &ApplyAdjustmentsRequest,
        ) -> std::result::Result<AdjustmentResultPayload, RatingClientError> {
            Ok(AdjustmentResultPayload {
                starting_premium: request.total_aggregate_premium,
                net_premium_due: request.total_aggregate_premium,
                ..Default::default()
            })
        }

        async fn calculate_pro_rata(
            &self,
            request: &ProRataRequest,
        ) -> std::result::Result<ProRataResultPayload, RatingClientError> {
            Ok(ProRataResultPayload {
                pro_rata_factor: Decimal::ONE,
                pro_rata_premium: request.net_premium_due,
                is_pro_rated: false,
                cover_days: request.cover_days,
                standard_days: 365,
            })
        }

        async fn calculation_breakdown(
            &self,
            _proposal_id: &str,
        ) -> std::result::Result<RawBreakdown, RatingClientError> {
            Ok(RawBreakdown::default())
        }
    }

    #[tokio::test]
    async fn rejected_aggregate_surfaces_the_service_message() {
        let service = RatingService::new(Arc::new(MockProvider {
            aggregate_response: CalculateAggregateResponse {
                section_aggregates: vec![],
                success: false,
                message: Some("unknown sub-risk".to_string()),
            },
        }));

        let result = service.aggregate_sections(vec![]).await;

        match result {
            Err(Error::Rating(RatingError::AggregateRejected(message))) => {
                assert_eq!(message, "unknown sub-risk");
            }
            other => panic!("expected AggregateRejected, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn successful_aggregate_passes_the_section_results_through() {
        let service = RatingService::new(Arc::new(MockProvider {
            aggregate_response: CalculateAggregateResponse {
                section_aggregates: vec![SectionAggregate {
                    section_id: "s-1".to_string(),
                    section_sum_insured: dec!(500000),
                    section_aggregate_premium: dec!(2500),
                    risk_item_count: 1,
                }],
                success: true,
                message: None,
            },
        }));

        let aggregates = service.aggregate_sections(vec![]).await.unwrap();
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].section_aggregate_premium, dec!(2500));
    }

    #[tokio::test]
    async fn adjustment_payload_maps_into_the_domain_result() {
        let service = RatingService::new(Arc::new(MockProvider {
            aggregate_response: CalculateAggregateResponse {
                section_aggregates: vec![],
                success: true,
                message: None,
            },
        }));

        let result = service
            .apply_adjustments(dec!(5500), &crate::proposals::ProposalAdjustments::default())
            .await
            .unwrap();

        assert_eq!(result.starting_premium, dec!(5500));
        assert_eq!(result.net_premium_due, dec!(5500));
    }
}
