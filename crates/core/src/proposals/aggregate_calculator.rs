//! Multi-section aggregation: payload assembly and strict aggregate merge.

use chrono::Utc;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::proposals::proposal_model::{ProposalTotals, TotalsProvenance};
use crate::proposals::proposals_errors::ProposalError;
use crate::rating::{RatingError, RatingServiceTrait};
use crate::sections::Section;
use premia_rating::{CalculatedRiskItem, SectionAggregate, SectionPayload};

/// Builds the outbound aggregate payload for one proposal.
///
/// Per section: a previously cached calculated-items array takes
/// precedence (it preserves every server-computed field verbatim, e.g.
/// `actualPremium` and `shareValue`); otherwise the section's raw items go
/// out for the service to compute.
pub fn build_payload(
    sections: &[Section],
    calculated_cache: &HashMap<String, Vec<CalculatedRiskItem>>,
    proportion_rate: Decimal,
) -> Vec<SectionPayload> {
    sections
        .iter()
        .map(|section| match calculated_cache.get(&section.id) {
            Some(calculated) if !calculated.is_empty() => SectionPayload {
                section_id: section.id.clone(),
                section_name: section.name.clone(),
                location: section.location.clone(),
                proportion_rate,
                risk_items: calculated.clone(),
            },
            _ => section.to_payload(proportion_rate),
        })
        .collect()
}

/// Result of one aggregate round-trip: the sections with merged aggregate
/// fields, the raw per-section aggregates for the summary cache, and the
/// proposal-level totals.
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub sections: Vec<Section>,
    pub aggregates: Vec<SectionAggregate>,
    pub totals: ProposalTotals,
}

/// Rolls all sections of a proposal up into proposal-level totals via the
/// rating service.
pub struct AggregateCalculator {
    rating: Arc<dyn RatingServiceTrait>,
}

impl AggregateCalculator {
    pub fn new(rating: Arc<dyn RatingServiceTrait>) -> Self {
        Self { rating }
    }

    /// Dispatches the aggregate payload and merges the per-section
    /// aggregates back, matched strictly by section id. Section ids are
    /// stable, so no heuristic fallback exists at this level: an aggregate
    /// for an unknown id fails the whole merge, and an empty aggregate
    /// list is an error rather than a zero premium.
    pub async fn calculate_aggregate(
        &self,
        sections: &[Section],
        calculated_cache: &HashMap<String, Vec<CalculatedRiskItem>>,
        proportion_rate: Decimal,
    ) -> Result<AggregateOutcome> {
        if sections.is_empty() {
            return Err(ProposalError::NoSections.into());
        }

        let payload = build_payload(sections, calculated_cache, proportion_rate);
        debug!("Dispatching aggregate payload of {} section(s)", payload.len());

        let aggregates = self.rating.aggregate_sections(payload).await?;
        if aggregates.is_empty() {
            return Err(RatingError::EmptyAggregateResponse.into());
        }

        let mut merged = sections.to_vec();
        for aggregate in &aggregates {
            let section = merged
                .iter_mut()
                .find(|section| section.id == aggregate.section_id)
                .ok_or_else(|| {
                    RatingError::UnknownSectionAggregate(aggregate.section_id.clone())
                })?;

            if aggregate.risk_item_count as usize != section.risk_items.len() {
                warn!(
                    "Aggregate for section '{}' covers {} item(s), local list has {}",
                    section.name,
                    aggregate.risk_item_count,
                    section.risk_items.len()
                );
            }

            section.section_sum_insured = aggregate.section_sum_insured;
            section.section_premium = aggregate.section_aggregate_premium;
        }

        let total_sum_insured = aggregates
            .iter()
            .map(|aggregate| aggregate.section_sum_insured)
            .sum::<Decimal>();
        let total_premium = aggregates
            .iter()
            .map(|aggregate| aggregate.section_aggregate_premium)
            .sum::<Decimal>();

        Ok(AggregateOutcome {
            sections: merged,
            aggregates,
            totals: ProposalTotals {
                total_sum_insured,
                total_premium,
                provenance: TotalsProvenance::ServerAggregate,
                as_of: Utc::now(),
            },
        })
    }
}
