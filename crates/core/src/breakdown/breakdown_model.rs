//! Canonical calculation breakdown models.
//!
//! The serialized shape of [`CalculationBreakdown`] is exactly the
//! fully-structured variant of the wire's `RawBreakdown`, so a normalized
//! snapshot can be fed back through the normalizer without double-wrapping
//! or field loss.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use premia_rating::{
    RawAppliedAdjustment, RawBreakdown, RawBreakdownItem, RawBreakdownSection,
    RawCalculationSteps, RawFinalResults, RawProRataStep, RawSectionAdjustments,
};

/// One risk-item row of a breakdown, computed fields defaulted to zero
/// when the service only echoed inputs back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCalculation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default)]
    pub item_no: u32,
    #[serde(default)]
    pub smi_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actual_value: Decimal,
    #[serde(default)]
    pub item_rate: Decimal,
    #[serde(default)]
    pub actual_premium: Decimal,
    #[serde(default)]
    pub share_value: Decimal,
    #[serde(default)]
    pub premium_value: Decimal,
    #[serde(default)]
    pub net_premium_after_discounts: Decimal,
}

/// A single named discount or loading inside a section waterfall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedAdjustment {
    pub name: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Per-section adjustment waterfall: the starting premium, the named
/// discounts and loadings applied to it, and the resulting net premium.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAdjustments {
    pub starting_premium: Decimal,
    #[serde(default)]
    pub discounts_applied: Vec<AppliedAdjustment>,
    #[serde(default)]
    pub loadings_applied: Vec<AppliedAdjustment>,
    pub final_net_premium: Decimal,
}

/// Calculation detail for one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCalculation {
    pub section_id: String,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub risk_items: Vec<ItemCalculation>,
    #[serde(default)]
    pub section_sum_insured: Decimal,
    #[serde(default)]
    pub section_gross_premium: Decimal,
    #[serde(default)]
    pub section_net_premium: Decimal,
    #[serde(default)]
    pub section_adjustments: SectionAdjustments,
}

/// The pro-rata step, when one has been applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProRataStep {
    pub net_premium_due: Decimal,
    pub cover_days: i64,
    pub pro_rata_factor: Decimal,
    pub pro_rata_premium: Decimal,
}

/// Proposal-level totals of a breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResults {
    #[serde(default)]
    pub total_sum_insured: Decimal,
    #[serde(default)]
    pub total_gross_premium: Decimal,
    #[serde(default)]
    pub total_net_premium: Decimal,
}

/// The calculation steps wrapper, mirroring the wire layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSteps {
    #[serde(default)]
    pub section_calculations: Vec<SectionCalculation>,
}

/// A normalized, display-ready calculation breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    pub calculation_steps: CalculationSteps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_rata: Option<ProRataStep>,
    pub final_results: FinalResults,
}

// === Back-conversion to the wire shape ===
//
// Normalization is re-invoked every time the breakdown response changes;
// these impls let an already-normalized snapshot travel the same path.

impl From<ItemCalculation> for RawBreakdownItem {
    fn from(item: ItemCalculation) -> Self {
        RawBreakdownItem {
            item_id: item.item_id,
            item_no: item.item_no,
            smi_code: item.smi_code,
            description: item.description,
            actual_value: item.actual_value,
            item_rate: item.item_rate,
            actual_premium: Some(item.actual_premium),
            share_value: Some(item.share_value),
            premium_value: Some(item.premium_value),
            net_premium_after_discounts: Some(item.net_premium_after_discounts),
        }
    }
}

impl From<AppliedAdjustment> for RawAppliedAdjustment {
    fn from(adjustment: AppliedAdjustment) -> Self {
        RawAppliedAdjustment {
            name: adjustment.name,
            rate: adjustment.rate,
            amount: adjustment.amount,
        }
    }
}

impl From<SectionAdjustments> for RawSectionAdjustments {
    fn from(adjustments: SectionAdjustments) -> Self {
        RawSectionAdjustments {
            starting_premium: adjustments.starting_premium,
            discounts_applied: adjustments
                .discounts_applied
                .into_iter()
                .map(Into::into)
                .collect(),
            loadings_applied: adjustments
                .loadings_applied
                .into_iter()
                .map(Into::into)
                .collect(),
            final_net_premium: adjustments.final_net_premium,
        }
    }
}

impl From<SectionCalculation> for RawBreakdownSection {
    fn from(section: SectionCalculation) -> Self {
        RawBreakdownSection {
            section_id: section.section_id,
            section_name: section.section_name,
            risk_items: section.risk_items.into_iter().map(Into::into).collect(),
            section_sum_insured: Some(section.section_sum_insured),
            section_gross_premium: Some(section.section_gross_premium),
            section_net_premium: Some(section.section_net_premium),
            section_adjustments: Some(section.section_adjustments.into()),
        }
    }
}

impl From<CalculationBreakdown> for RawBreakdown {
    fn from(breakdown: CalculationBreakdown) -> Self {
        RawBreakdown {
            proposal_id: breakdown.proposal_id,
            generated_at: breakdown.generated_at,
            calculation_steps: Some(RawCalculationSteps {
                section_calculations: breakdown
                    .calculation_steps
                    .section_calculations
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            }),
            sections: None,
            pro_rata: breakdown.pro_rata.map(|step| RawProRataStep {
                net_premium_due: step.net_premium_due,
                cover_days: step.cover_days,
                pro_rata_factor: step.pro_rata_factor,
                pro_rata_premium: step.pro_rata_premium,
            }),
            final_results: Some(RawFinalResults {
                total_sum_insured: breakdown.final_results.total_sum_insured,
                total_gross_premium: breakdown.final_results.total_gross_premium,
                total_net_premium: breakdown.final_results.total_net_premium,
            }),
        }
    }
}
