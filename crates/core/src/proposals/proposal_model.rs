//! Proposal domain models: the top-level quotation record, the named
//! adjustment rates and the staged calculation results.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::STANDARD_COVER_DAYS;
use crate::errors::ValidationError;
use crate::sections::Section;
use premia_rating::{AdjustmentRatesPayload, AdjustmentResultPayload, ProRataResultPayload};

/// The top-level quotation/policy record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub proposal_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    pub insured_party_id: String,
    pub product_code: String,
    pub sub_risk: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default = "default_proportion_rate")]
    pub proportion_rate: Decimal,
    pub currency: String,
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: Decimal,
    #[serde(default = "default_cover_days")]
    pub cover_days: i64,
    #[serde(default)]
    pub adjustments: ProposalAdjustments,
}

fn default_proportion_rate() -> Decimal {
    dec!(100)
}

fn default_exchange_rate() -> Decimal {
    Decimal::ONE
}

fn default_cover_days() -> i64 {
    STANDARD_COVER_DAYS
}

/// The nine named adjustment rates, percentages in 0-100.
///
/// Five discounts reduce the premium, four loadings increase it. Each rate
/// is applied independently against the starting premium; order matters
/// only for display (discounts listed before loadings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalAdjustments {
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

impl ProposalAdjustments {
    /// The discount rates in display order, with their waterfall labels.
    pub fn discounts(&self) -> [(&'static str, Decimal); 5] {
        [
            ("Special Discount", self.special_discount_rate),
            ("Deductible Discount", self.deductible_discount_rate),
            ("Spread Discount", self.spread_discount_rate),
            ("LTA Discount", self.lta_discount_rate),
            ("Other Discounts", self.other_discounts_rate),
        ]
    }

    /// The loading rates in display order, with their waterfall labels.
    pub fn loadings(&self) -> [(&'static str, Decimal); 4] {
        [
            ("Theft Loading", self.theft_loading_rate),
            ("SRCC Loading", self.srcc_loading_rate),
            ("Other Loading 2", self.other_loading2_rate),
            ("Other Loadings", self.other_loadings_rate),
        ]
    }

    /// Rejects any rate outside the 0-100 percentage range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named_rates = self
            .discounts()
            .into_iter()
            .chain(self.loadings());

        for (name, rate) in named_rates {
            if rate < Decimal::ZERO || rate > dec!(100) {
                return Err(ValidationError::RateOutOfRange {
                    name: name.to_string(),
                    value: rate,
                });
            }
        }
        Ok(())
    }
}

/// Result of applying the nine named rates to a starting premium: one
/// named amount per rate plus the resulting net premium due.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResult {
    pub starting_premium: Decimal,
    pub special_discount_amount: Decimal,
    pub deductible_discount_amount: Decimal,
    pub spread_discount_amount: Decimal,
    pub lta_discount_amount: Decimal,
    pub other_discounts_amount: Decimal,
    pub theft_loading_amount: Decimal,
    pub srcc_loading_amount: Decimal,
    pub other_loading2_amount: Decimal,
    pub other_loadings_amount: Decimal,
    pub net_premium_due: Decimal,
}

impl AdjustmentResult {
    pub fn total_discounts(&self) -> Decimal {
        self.special_discount_amount
            + self.deductible_discount_amount
            + self.spread_discount_amount
            + self.lta_discount_amount
            + self.other_discounts_amount
    }

    pub fn total_loadings(&self) -> Decimal {
        self.theft_loading_amount
            + self.srcc_loading_amount
            + self.other_loading2_amount
            + self.other_loadings_amount
    }

    /// The discount amounts in display order, with their waterfall labels.
    pub fn discount_amounts(&self) -> [(&'static str, Decimal); 5] {
        [
            ("Special Discount", self.special_discount_amount),
            ("Deductible Discount", self.deductible_discount_amount),
            ("Spread Discount", self.spread_discount_amount),
            ("LTA Discount", self.lta_discount_amount),
            ("Other Discounts", self.other_discounts_amount),
        ]
    }

    /// The loading amounts in display order, with their waterfall labels.
    pub fn loading_amounts(&self) -> [(&'static str, Decimal); 4] {
        [
            ("Theft Loading", self.theft_loading_amount),
            ("SRCC Loading", self.srcc_loading_amount),
            ("Other Loading 2", self.other_loading2_amount),
            ("Other Loadings", self.other_loadings_amount),
        ]
    }
}

/// Result of the pro-rata day-count adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProRataResult {
    pub pro_rata_factor: Decimal,
    pub pro_rata_premium: Decimal,
    pub is_pro_rated: bool,
    pub cover_days: i64,
    pub standard_days: i64,
}

/// Which of the three totals states a proposal-level figure came from.
///
/// Display surfaces must state this alongside the figure so a stale
/// aggregate is never silently mixed with fresh section edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TotalsProvenance {
    /// Raw locally-summed section totals.
    LocalSum,
    /// A server-calculated aggregate.
    ServerAggregate,
    /// A server-adjusted (and possibly pro-rated) final figure.
    AdjustedFinal,
}

/// Proposal-level totals snapshot with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTotals {
    pub total_sum_insured: Decimal,
    pub total_premium: Decimal,
    pub provenance: TotalsProvenance,
    pub as_of: DateTime<Utc>,
}

/// State of the canonical sections list within a calculation session.
///
/// Exactly one canonical list exists per proposal session; this state says
/// whether it still matches the proposal record, carries local edits not
/// yet rated, or reflects the most recent server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionsState {
    /// Sections match the proposal record; nothing edited or synced yet.
    #[default]
    Clean,
    /// The user edited sections locally since the last server response.
    LocallyEdited,
    /// The most recent write came from a server calculation.
    ServerSynced,
}

// === Wire conversions ===

impl From<ProposalAdjustments> for AdjustmentRatesPayload {
    fn from(rates: ProposalAdjustments) -> Self {
        AdjustmentRatesPayload {
            special_discount_rate: rates.special_discount_rate,
            deductible_discount_rate: rates.deductible_discount_rate,
            spread_discount_rate: rates.spread_discount_rate,
            lta_discount_rate: rates.lta_discount_rate,
            other_discounts_rate: rates.other_discounts_rate,
            theft_loading_rate: rates.theft_loading_rate,
            srcc_loading_rate: rates.srcc_loading_rate,
            other_loading2_rate: rates.other_loading2_rate,
            other_loadings_rate: rates.other_loadings_rate,
        }
    }
}

impl From<AdjustmentResultPayload> for AdjustmentResult {
    fn from(payload: AdjustmentResultPayload) -> Self {
        AdjustmentResult {
            starting_premium: payload.starting_premium,
            special_discount_amount: payload.special_discount_amount,
            deductible_discount_amount: payload.deductible_discount_amount,
            spread_discount_amount: payload.spread_discount_amount,
            lta_discount_amount: payload.lta_discount_amount,
            other_discounts_amount: payload.other_discounts_amount,
            theft_loading_amount: payload.theft_loading_amount,
            srcc_loading_amount: payload.srcc_loading_amount,
            other_loading2_amount: payload.other_loading2_amount,
            other_loadings_amount: payload.other_loadings_amount,
            net_premium_due: payload.net_premium_due,
        }
    }
}

impl From<AdjustmentResult> for AdjustmentResultPayload {
    fn from(result: AdjustmentResult) -> Self {
        AdjustmentResultPayload {
            starting_premium: result.starting_premium,
            special_discount_amount: result.special_discount_amount,
            deductible_discount_amount: result.deductible_discount_amount,
            spread_discount_amount: result.spread_discount_amount,
            lta_discount_amount: result.lta_discount_amount,
            other_discounts_amount: result.other_discounts_amount,
            theft_loading_amount: result.theft_loading_amount,
            srcc_loading_amount: result.srcc_loading_amount,
            other_loading2_amount: result.other_loading2_amount,
            other_loadings_amount: result.other_loadings_amount,
            net_premium_due: result.net_premium_due,
        }
    }
}

impl From<ProRataResultPayload> for ProRataResult {
    fn from(payload: ProRataResultPayload) -> Self {
        ProRataResult {
            pro_rata_factor: payload.pro_rata_factor,
            pro_rata_premium: payload.pro_rata_premium,
            is_pro_rated: payload.is_pro_rated,
            cover_days: payload.cover_days,
            standard_days: payload.standard_days,
        }
    }
}

impl From<ProRataResult> for ProRataResultPayload {
    fn from(result: ProRataResult) -> Self {
        ProRataResultPayload {
            pro_rata_factor: result.pro_rata_factor,
            pro_rata_premium: result.pro_rata_premium,
            is_pro_rated: result.is_pro_rated,
            cover_days: result.cover_days,
            standard_days: result.standard_days,
        }
    }
}
