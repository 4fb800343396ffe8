//! Section-level "calculate all" and snapshot reconciliation.

use chrono::Utc;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{Result, ValidationError};
use crate::rating::RatingServiceTrait;
use crate::sections::item_calculator::merge_calculated_item;
use crate::sections::sections_model::{RiskItem, Section};
use premia_rating::CalculatedRiskItem;

/// Runs the rating round-trip for a whole section and merges the response
/// back into a fresh copy of it.
pub struct SectionCalculator {
    rating: Arc<dyn RatingServiceTrait>,
}

/// Outcome of a section calculate-all: the updated section plus the raw
/// calculated-items array, which callers cache for later payload building.
#[derive(Debug, Clone)]
pub struct SectionCalculationOutcome {
    pub section: Section,
    pub calculated_items: Vec<CalculatedRiskItem>,
}

impl SectionCalculator {
    pub fn new(rating: Arc<dyn RatingServiceTrait>) -> Self {
        Self { rating }
    }

    /// Sends the section's full current item list for rating and merges
    /// each returned item into the matching local item by id.
    ///
    /// The input section is not mutated: on any failure (transport, or a
    /// returned item that matches no local item) the caller's state is
    /// exactly as it was. On success the returned section carries the
    /// merged items, adopted response totals and a fresh `last_calculated`.
    pub async fn calculate_all_items(
        &self,
        section: &Section,
        sub_risk: &str,
        proportion_rate: Decimal,
    ) -> Result<SectionCalculationOutcome> {
        if section.risk_items.is_empty() {
            return Err(ValidationError::InvalidInput(format!(
                "Section '{}' has no risk items to calculate",
                section.name
            ))
            .into());
        }

        debug!(
            "Calculating all {} item(s) of section '{}'",
            section.risk_items.len(),
            section.name
        );

        let payload: Vec<CalculatedRiskItem> =
            section.risk_items.iter().map(RiskItem::to_payload).collect();

        let outcome = self
            .rating
            .rate_section_items(sub_risk, proportion_rate, payload)
            .await?;

        let mut updated = section.clone();
        for calculated in &outcome.calculated_items {
            let item = updated
                .risk_items
                .iter_mut()
                .find(|item| item.id == calculated.item_id);
            match item {
                Some(item) => merge_calculated_item(item, calculated)?,
                None => {
                    return Err(crate::rating::RatingError::UnmatchedCalculatedItem {
                        section_id: section.id.clone(),
                        item_id: calculated.item_id,
                    }
                    .into())
                }
            }
        }

        match &outcome.totals {
            Some(totals) => {
                if let Some(sum_insured) = totals.sum_insured {
                    updated.section_sum_insured = sum_insured;
                }
                if let Some(gross_premium) = totals.gross_premium {
                    updated.section_premium = gross_premium;
                }
                if let Some(net_premium) = totals.net_premium {
                    updated.section_net_premium = net_premium;
                }
            }
            None => {
                warn!(
                    "Rating response for section '{}' carried no totals; keeping prior values",
                    section.name
                );
            }
        }

        updated.last_calculated = Some(Utc::now());

        Ok(SectionCalculationOutcome {
            section: updated,
            calculated_items: outcome.calculated_items,
        })
    }
}

/// Collapses duplicate section snapshots (same id, e.g. stale + fresh) down
/// to the most recent one per id.
///
/// The entry with the greater `last_calculated` wins; an entry without a
/// timestamp never overrides one that has one. First-appearance order of
/// the ids is preserved.
pub fn dedupe_sections_by_recency(sections: Vec<Section>) -> Vec<Section> {
    let mut order: Vec<String> = Vec::new();
    let mut freshest: HashMap<String, Section> = HashMap::new();

    for section in sections {
        match freshest.get(&section.id) {
            Some(existing) => {
                // Option<DateTime> ordering puts None before any Some
                if section.last_calculated > existing.last_calculated {
                    freshest.insert(section.id.clone(), section);
                }
            }
            None => {
                order.push(section.id.clone());
                freshest.insert(section.id.clone(), section);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| freshest.remove(&id))
        .collect()
}
