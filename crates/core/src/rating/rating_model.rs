//! Domain-side views of rating service responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use premia_rating::{CalculatedRiskItem, SectionTotalsPayload};

/// Section-level totals attached to a risk-items rating response.
///
/// Every field is optional: older rating deployments return items only and
/// leave the section totals for the client to keep or derive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTotals {
    pub sum_insured: Option<Decimal>,
    pub gross_premium: Option<Decimal>,
    pub net_premium: Option<Decimal>,
}

impl From<SectionTotalsPayload> for SectionTotals {
    fn from(payload: SectionTotalsPayload) -> Self {
        SectionTotals {
            sum_insured: payload.section_sum_insured,
            gross_premium: payload.section_premium,
            net_premium: payload.section_net_premium,
        }
    }
}

/// Outcome of rating one section's risk items.
#[derive(Debug, Clone)]
pub struct SectionRatingOutcome {
    /// The rated items, computed fields filled in by the service.
    pub calculated_items: Vec<CalculatedRiskItem>,
    /// Section totals, when the service chose to attach them.
    pub totals: Option<SectionTotals>,
}
