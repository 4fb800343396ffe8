//! Wire models for the rating service API.
//!
//! All monetary values are decimal numbers in the proposal's base currency,
//! percentages are plain numbers in the 0-100 range, and dates are ISO-8601
//! strings. Field names on the wire are camelCase.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock sub-record carried by some risk items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemPayload {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub stock_sum_insured: Decimal,
    pub stock_rate: Decimal,
    #[serde(default)]
    pub stock_discount_rate: Decimal,
}

/// One risk item row as sent to and returned by the rating service.
///
/// The same shape is used for requests (computed fields defaulted to zero
/// when the item has never been rated) and for responses (computed fields
/// filled in by the service). `itemId` is the stable identity key; `itemNo`
/// is display position only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedRiskItem {
    pub item_id: Uuid,
    pub item_no: u32,
    pub section_id: String,
    pub smi_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub actual_value: Decimal,
    pub item_rate: Decimal,
    pub multiply_rate: Decimal,
    #[serde(default)]
    pub fea_discount_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_item: Option<StockItemPayload>,

    // Computed by the service; zero until a rating round-trip has happened.
    #[serde(default)]
    pub actual_premium: Decimal,
    #[serde(default)]
    pub share_value: Decimal,
    #[serde(default)]
    pub premium_value: Decimal,
    #[serde(default)]
    pub stock_discount_amount: Decimal,
    #[serde(default)]
    pub fea_discount_amount: Decimal,
    #[serde(default)]
    pub net_premium_after_discounts: Decimal,

    // Human-readable derivations for display surfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_premium_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_premium_formula: Option<String>,
}

/// Request body for `POST /calculations/risk-items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRiskItemsRequest {
    pub sub_risk: String,
    pub proportion_rate: Decimal,
    pub risk_items: Vec<CalculatedRiskItem>,
}

/// Section-level totals the service may attach to a risk-items response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTotalsPayload {
    pub section_sum_insured: Option<Decimal>,
    #[serde(alias = "sectionGrossPremium")]
    pub section_premium: Option<Decimal>,
    pub section_net_premium: Option<Decimal>,
}

/// Response body for `POST /calculations/risk-items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRiskItemsResponse {
    #[serde(default)]
    pub calculated_items: Vec<CalculatedRiskItem>,
    #[serde(default)]
    pub totals: Option<SectionTotalsPayload>,
}

/// One section as submitted to `POST /calculations/aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    pub section_id: String,
    pub section_name: String,
    #[serde(default)]
    pub location: String,
    pub proportion_rate: Decimal,
    pub risk_items: Vec<CalculatedRiskItem>,
}

/// Request body for `POST /calculations/aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateAggregateRequest {
    pub sections: Vec<SectionPayload>,
}

/// Per-section aggregate returned by the aggregate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAggregate {
    pub section_id: String,
    pub section_sum_insured: Decimal,
    /// Older deployments name this `sectionPremium`.
    #[serde(alias = "sectionPremium")]
    pub section_aggregate_premium: Decimal,
    #[serde(default)]
    pub risk_item_count: u32,
}

/// Response body for `POST /calculations/aggregate`.
///
/// Older deployments return the aggregates under `sections` instead of
/// `sectionAggregates`; both spellings deserialize into the same field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateAggregateResponse {
    #[serde(default, alias = "sections")]
    pub section_aggregates: Vec<SectionAggregate>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// The nine named adjustment rates, as percentages in 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRatesPayload {
    #[serde(default)]
    pub special_discount_rate: Decimal,
    #[serde(default)]
    pub deductible_discount_rate: Decimal,
    #[serde(default)]
    pub spread_discount_rate: Decimal,
    #[serde(default)]
    pub lta_discount_rate: Decimal,
    #[serde(default)]
    pub other_discounts_rate: Decimal,
    #[serde(default)]
    pub theft_loading_rate: Decimal,
    #[serde(default)]
    pub srcc_loading_rate: Decimal,
    #[serde(default)]
    pub other_loading2_rate: Decimal,
    #[serde(default)]
    pub other_loadings_rate: Decimal,
}

/// Request body for `POST /calculations/adjustments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAdjustmentsRequest {
    pub total_aggregate_premium: Decimal,
    pub adjustments: AdjustmentRatesPayload,
}

/// Adjustment result as returned by the service: one named amount per rate
/// plus the running net premium.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResultPayload {
    pub starting_premium: Decimal,
    #[serde(default)]
    pub special_discount_amount: Decimal,
    #[serde(default)]
    pub deductible_discount_amount: Decimal,
    #[serde(default)]
    pub spread_discount_amount: Decimal,
    #[serde(default)]
    pub lta_discount_amount: Decimal,
    #[serde(default)]
    pub other_discounts_amount: Decimal,
    #[serde(default)]
    pub theft_loading_amount: Decimal,
    #[serde(default)]
    pub srcc_loading_amount: Decimal,
    #[serde(default)]
    pub other_loading2_amount: Decimal,
    #[serde(default)]
    pub other_loadings_amount: Decimal,
    pub net_premium_due: Decimal,
}

/// Request body for `POST /calculations/pro-rata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProRataRequest {
    pub net_premium_due: Decimal,
    pub cover_days: i64,
}

/// Response body for `POST /calculations/pro-rata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProRataResultPayload {
    pub pro_rata_factor: Decimal,
    pub pro_rata_premium: Decimal,
    pub is_pro_rated: bool,
    pub cover_days: i64,
    pub standard_days: i64,
}

/// One raw risk-item row inside a breakdown response. Everything beyond the
/// identity fields is optional: the service may echo inputs back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBreakdownItem {
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
    pub actual_premium: Option<Decimal>,
    pub share_value: Option<Decimal>,
    pub premium_value: Option<Decimal>,
    pub net_premium_after_discounts: Option<Decimal>,
}

/// One section inside a breakdown response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBreakdownSection {
    pub section_id: String,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub risk_items: Vec<RawBreakdownItem>,
    pub section_sum_insured: Option<Decimal>,
    #[serde(alias = "sectionPremium")]
    pub section_gross_premium: Option<Decimal>,
    pub section_net_premium: Option<Decimal>,
    #[serde(default)]
    pub section_adjustments: Option<RawSectionAdjustments>,
}

/// Per-section adjustment waterfall, when the service has computed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSectionAdjustments {
    pub starting_premium: Decimal,
    #[serde(default)]
    pub discounts_applied: Vec<RawAppliedAdjustment>,
    #[serde(default)]
    pub loadings_applied: Vec<RawAppliedAdjustment>,
    pub final_net_premium: Decimal,
}

/// A single named discount or loading inside a waterfall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAppliedAdjustment {
    pub name: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Fully-computed calculation steps, present only when the service did the
/// work server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculationSteps {
    #[serde(default)]
    pub section_calculations: Vec<RawBreakdownSection>,
}

/// Proposal-level totals inside a breakdown response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinalResults {
    #[serde(default)]
    pub total_sum_insured: Decimal,
    #[serde(default)]
    pub total_gross_premium: Decimal,
    #[serde(default)]
    pub total_net_premium: Decimal,
}

/// Pro-rata step inside a breakdown response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProRataStep {
    pub net_premium_due: Decimal,
    pub cover_days: i64,
    pub pro_rata_factor: Decimal,
    pub pro_rata_premium: Decimal,
}

/// Raw breakdown as returned by `GET /calculations/breakdown/{proposalId}`.
///
/// Heterogeneous by design: the service either returns fully-computed
/// `calculationSteps`, or just echoes the raw section inputs under
/// `sections`, or anything in between. Consumers are expected to run this
/// through a normalizer before display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBreakdown {
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub calculation_steps: Option<RawCalculationSteps>,
    #[serde(default)]
    pub sections: Option<Vec<RawBreakdownSection>>,
    #[serde(default)]
    pub pro_rata: Option<RawProRataStep>,
    #[serde(default)]
    pub final_results: Option<RawFinalResults>,
}
