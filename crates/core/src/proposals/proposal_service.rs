//! Proposal calculation session orchestration.
//!
//! One `ProposalCalculationService` owns one proposal's calculation
//! lifecycle: section and item editing, the staged rating calls, the
//! cached stage results, and the breakdown refresh. All shared state
//! lives in the session's [`CalculationContext`].

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::breakdown::{normalize, CalculationBreakdown};
use crate::constants::STANDARD_COVER_DAYS;
use crate::errors::{CalculatorError, Result, ValidationError};
use crate::proposals::adjustment_calculator::{apply_adjustment_rates, starting_premium};
use crate::proposals::aggregate_calculator::AggregateCalculator;
use crate::proposals::context::CalculationContext;
use crate::proposals::pro_rata_calculator::apply_pro_rata;
use crate::proposals::proposal_model::{
    AdjustmentResult, ProRataResult, Proposal, ProposalAdjustments, ProposalTotals,
    SectionsState, TotalsProvenance,
};
use crate::proposals::proposals_errors::ProposalError;
use crate::rating::{RatingError, RatingServiceTrait};
use crate::sections::item_calculator::{merge_calculated_item, preview_item};
use crate::sections::section_calculator::SectionCalculator;
use crate::sections::{
    ComputedPremium, NewRiskItem, RiskItemUpdate, Section, SectionError,
};
use crate::utils::FetchGeneration;

/// Key for the per-item in-flight apply markers: two different items never
/// collide, and the same item cannot have two applies in flight.
type ApplyKey = (String, Uuid);

pub struct ProposalCalculationService {
    proposal: RwLock<Proposal>,
    context: CalculationContext,
    rating: Arc<dyn RatingServiceTrait>,
    section_calculator: SectionCalculator,
    aggregate_calculator: AggregateCalculator,
    applying: DashMap<ApplyKey, ()>,
    aggregate_generation: FetchGeneration,
    breakdown_generation: FetchGeneration,
}

impl ProposalCalculationService {
    /// Opens a calculation session for `proposal`. The proposal's section
    /// list seeds the canonical list in state `Clean`.
    pub fn new(rating: Arc<dyn RatingServiceTrait>, proposal: Proposal) -> Self {
        let context = CalculationContext::new(proposal.sections.clone());
        ProposalCalculationService {
            proposal: RwLock::new(proposal),
            context,
            rating: rating.clone(),
            section_calculator: SectionCalculator::new(rating.clone()),
            aggregate_calculator: AggregateCalculator::new(rating),
            applying: DashMap::new(),
            aggregate_generation: FetchGeneration::new(),
            breakdown_generation: FetchGeneration::new(),
        }
    }

    pub fn proposal(&self) -> Result<Proposal> {
        let proposal = self
            .proposal
            .read()
            .map_err(|e| ProposalError::ContextLock(e.to_string()))?;
        Ok(proposal.clone())
    }

    pub fn sections(&self) -> Result<Vec<Section>> {
        self.context.sections()
    }

    pub fn sections_state(&self) -> Result<SectionsState> {
        self.context.sections_state()
    }

    // --- proposal-level inputs ---

    pub fn set_adjustment_rates(&self, rates: ProposalAdjustments) -> Result<()> {
        rates.validate()?;
        let mut proposal = self
            .proposal
            .write()
            .map_err(|e| ProposalError::ContextLock(e.to_string()))?;
        proposal.adjustments = rates;
        Ok(())
    }

    pub fn set_cover_days(&self, cover_days: i64) -> Result<()> {
        if cover_days <= 0 {
            return Err(ValidationError::NonPositiveCoverDays(cover_days).into());
        }
        let mut proposal = self
            .proposal
            .write()
            .map_err(|e| ProposalError::ContextLock(e.to_string()))?;
        proposal.cover_days = cover_days;
        Ok(())
    }

    // --- section and item editing ---

    /// Creates a section and appends it to the canonical list.
    pub fn add_section(&self, name: &str, location: &str) -> Result<Section> {
        let mut section = Section::new(name, location)?;
        section.proportion_rate = self.proposal()?.proportion_rate;
        self.context.push_section(section.clone())?;
        Ok(section)
    }

    /// Deletes a section by id and purges any cached calculated array and
    /// summary entry for it.
    pub fn remove_section(&self, section_id: &str) -> Result<()> {
        self.context.purge_section(section_id)
    }

    /// Adds a risk item to a section, returning the generated item id.
    pub fn add_risk_item(&self, section_id: &str, input: NewRiskItem) -> Result<Uuid> {
        let mut section = self.require_section(section_id)?;
        let item_id = section.add_item(input);
        self.context
            .replace_section(section, SectionsState::LocallyEdited)?;
        Ok(item_id)
    }

    /// Applies a partial edit to a risk item. Editing a rating input marks
    /// the item's computed figures stale; they are kept for display until
    /// the next calculation overwrites them.
    pub fn update_risk_item(
        &self,
        section_id: &str,
        item_id: Uuid,
        update: RiskItemUpdate,
    ) -> Result<()> {
        let mut section = self.require_section(section_id)?;
        let item = section
            .item_mut(item_id)
            .ok_or_else(|| SectionError::ItemNotFound {
                section_id: section_id.to_string(),
                item_id,
            })?;
        item.apply_update(update);
        self.context
            .replace_section(section, SectionsState::LocallyEdited)
    }

    /// Removes a risk item; the remaining items are renumbered `1..n`.
    pub fn remove_risk_item(&self, section_id: &str, item_id: Uuid) -> Result<()> {
        let mut section = self.require_section(section_id)?;
        section.remove_item(item_id)?;
        self.context
            .replace_section(section, SectionsState::LocallyEdited)
    }

    /// Local preview of one item's premium figures, for instant feedback
    /// before a rating round-trip. Never persisted as authoritative.
    pub fn preview_risk_item(&self, section_id: &str, item_id: Uuid) -> Result<ComputedPremium> {
        let section = self.require_section(section_id)?;
        let item = section
            .item(item_id)
            .ok_or_else(|| SectionError::ItemNotFound {
                section_id: section_id.to_string(),
                item_id,
            })?;
        Ok(preview_item(item, self.proposal()?.proportion_rate))
    }

    // --- stage 1: per-item apply ---

    /// Rates a single risk item and merges the result back by id.
    ///
    /// While the request is in flight the item is marked as applying;
    /// re-entry for the same item is rejected so a control surface can
    /// disable itself instead of double-submitting. Failure leaves the
    /// item's computed fields unchanged.
    pub async fn apply_item(&self, section_id: &str, item_id: Uuid) -> Result<Section> {
        let key: ApplyKey = (section_id.to_string(), item_id);
        if self.applying.insert(key.clone(), ()).is_some() {
            return Err(ProposalError::ApplyInFlight {
                section_id: section_id.to_string(),
                item_id,
            }
            .into());
        }

        let result = self.apply_item_inner(section_id, item_id).await;
        self.applying.remove(&key);
        result
    }

    async fn apply_item_inner(&self, section_id: &str, item_id: Uuid) -> Result<Section> {
        let section = self.require_section(section_id)?;
        let item = section
            .item(item_id)
            .ok_or_else(|| SectionError::ItemNotFound {
                section_id: section_id.to_string(),
                item_id,
            })?;

        let (sub_risk, proportion_rate) = {
            let proposal = self.proposal()?;
            (proposal.sub_risk, proposal.proportion_rate)
        };

        let outcome = self
            .rating
            .rate_section_items(&sub_risk, proportion_rate, vec![item.to_payload()])
            .await?;

        let calculated = outcome
            .calculated_items
            .iter()
            .find(|calculated| calculated.item_id == item_id)
            .ok_or_else(|| RatingError::MissingCalculatedItem {
                section_id: section_id.to_string(),
                item_id,
            })?;

        let mut updated = section;
        let slot = updated
            .item_mut(item_id)
            .ok_or_else(|| SectionError::ItemNotFound {
                section_id: section_id.to_string(),
                item_id,
            })?;
        merge_calculated_item(slot, calculated)?;

        // The cached calculate-all array (if any) no longer reflects this
        // section; drop it so the aggregate payload rebuilds from items.
        self.context.drop_calculated_items(section_id)?;
        self.context
            .replace_section(updated.clone(), SectionsState::ServerSynced)?;

        Ok(updated)
    }

    // --- stage 2: section calculate-all ---

    /// Rates the full item list of one section and adopts the merged
    /// section as canonical. The calculated-items array is cached for the
    /// aggregate payload builder.
    pub async fn calculate_section(&self, section_id: &str) -> Result<Section> {
        let section = self.require_section(section_id)?;
        let (sub_risk, proportion_rate) = {
            let proposal = self.proposal()?;
            (proposal.sub_risk, proposal.proportion_rate)
        };

        let outcome = self
            .section_calculator
            .calculate_all_items(&section, &sub_risk, proportion_rate)
            .await?;

        self.context
            .cache_calculated_items(section_id, outcome.calculated_items.clone())?;
        self.context
            .replace_section(outcome.section.clone(), SectionsState::ServerSynced)?;

        Ok(outcome.section)
    }

    /// Runs calculate-all for every section of the proposal, fanning the
    /// rating calls out concurrently. Each section merges atomically:
    /// sections that rated cleanly are adopted even when another section's
    /// calculation failed, and the first failure is then surfaced.
    pub async fn calculate_all_sections(&self) -> Result<Vec<Section>> {
        let sections = self.context.sections()?;
        if sections.is_empty() {
            return Err(ProposalError::NoSections.into());
        }

        let (sub_risk, proportion_rate) = {
            let proposal = self.proposal()?;
            (proposal.sub_risk, proposal.proportion_rate)
        };

        let outcomes = futures::future::join_all(sections.iter().map(|section| {
            self.section_calculator
                .calculate_all_items(section, &sub_risk, proportion_rate)
        }))
        .await;

        let mut updated = Vec::with_capacity(outcomes.len());
        let mut first_failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => {
                    self.context.cache_calculated_items(
                        &outcome.section.id,
                        outcome.calculated_items.clone(),
                    )?;
                    self.context
                        .replace_section(outcome.section.clone(), SectionsState::ServerSynced)?;
                    updated.push(outcome.section);
                }
                Err(err) => {
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(updated),
        }
    }

    // --- stage 3: proposal aggregate ---

    /// Rolls all sections up into proposal-level totals.
    ///
    /// The fetch is generation-stamped: if a newer aggregate run starts
    /// before this one's response lands, the stale response is discarded
    /// (returns `Ok(None)`) instead of overwriting fresher state.
    pub async fn calculate_aggregate(&self) -> Result<Option<ProposalTotals>> {
        let token = self.aggregate_generation.begin();

        let sections = self.context.sections()?;
        let calculated_cache = self.context.calculated_items_snapshot()?;
        let proportion_rate = self.proposal()?.proportion_rate;

        let outcome = self
            .aggregate_calculator
            .calculate_aggregate(&sections, &calculated_cache, proportion_rate)
            .await?;

        if !self.aggregate_generation.is_current(token) {
            warn!("Discarding superseded aggregate response");
            return Ok(None);
        }

        self.context
            .replace_sections(outcome.sections, SectionsState::ServerSynced)?;
        self.context.store_summary(&outcome.aggregates)?;

        Ok(Some(outcome.totals))
    }

    // --- stage 4: named adjustments ---

    /// Applies the proposal's discount/loading rates to the aggregate
    /// premium via the rating service and caches the result; the cached
    /// figure is what a later pro-rata step consumes.
    pub async fn apply_adjustments(&self) -> Result<AdjustmentResult> {
        let rates = {
            let proposal = self.proposal()?;
            proposal.adjustments
        };
        rates.validate()?;

        let sections = self.context.sections()?;
        let premium = starting_premium(&sections);
        debug!("Applying adjustments to starting premium {}", premium);

        let result = self.rating.apply_adjustments(premium, &rates).await?;
        self.context.store_adjustment_result(result.clone())?;

        Ok(result)
    }

    /// Local preview of the adjustment arithmetic, for instant feedback
    /// before the server round-trip. Not cached as authoritative.
    pub fn preview_adjustments(&self) -> Result<AdjustmentResult> {
        let rates = self.proposal()?.adjustments;
        rates.validate()?;
        let sections = self.context.sections()?;
        Ok(apply_adjustment_rates(starting_premium(&sections), &rates))
    }

    // --- stage 5: pro-rata ---

    /// Applies the day-count ratio to the authoritative net premium via
    /// the rating service and caches the result.
    ///
    /// The authoritative figure is the cached adjustment result when one
    /// exists, else the most recent server aggregate; pro-rata over a
    /// stale or zero premium is rejected before any network call.
    pub async fn apply_pro_rata(&self) -> Result<ProRataResult> {
        let cover_days = self.proposal()?.cover_days;
        if cover_days <= 0 {
            return Err(ValidationError::NonPositiveCoverDays(cover_days).into());
        }

        let net_premium_due = self.authoritative_net_premium()?;

        let result = self
            .rating
            .calculate_pro_rata(net_premium_due, cover_days)
            .await?;
        self.context.store_pro_rata_result(result.clone())?;

        Ok(result)
    }

    /// Local preview of the pro-rata arithmetic over the authoritative
    /// net premium. Not cached as authoritative.
    pub fn preview_pro_rata(&self) -> Result<ProRataResult> {
        let cover_days = self.proposal()?.cover_days;
        apply_pro_rata(
            self.authoritative_net_premium()?,
            cover_days,
            STANDARD_COVER_DAYS,
        )
    }

    fn authoritative_net_premium(&self) -> Result<Decimal> {
        if let Some(adjustment) = self.context.adjustment_result()? {
            if adjustment.net_premium_due > Decimal::ZERO {
                return Ok(adjustment.net_premium_due);
            }
            return Err(CalculatorError::NonPositiveNetPremium(
                adjustment.net_premium_due,
            )
            .into());
        }

        let summary = self.context.summary()?;
        if !summary.is_empty() {
            let aggregate_premium = summary
                .values()
                .map(|aggregate| aggregate.section_aggregate_premium)
                .sum::<Decimal>();
            if aggregate_premium > Decimal::ZERO {
                return Ok(aggregate_premium);
            }
        }

        Err(CalculatorError::MissingAuthoritativePremium(
            "run the adjustment or aggregate stage before pro-rata".to_string(),
        )
        .into())
    }

    // --- totals and breakdown ---

    /// The proposal-level totals a display surface should show right now,
    /// labelled with their provenance. Local edits always push the view
    /// back to the locally-summed state; a stale server figure is never
    /// mixed with fresh edits.
    pub fn current_totals(&self) -> Result<ProposalTotals> {
        let sections = self.context.sections()?;
        let state = self.context.sections_state()?;

        if state != SectionsState::LocallyEdited {
            if let Some(pro_rata) = self.context.pro_rata_result()? {
                return Ok(ProposalTotals {
                    total_sum_insured: self.summary_sum_insured(&sections)?,
                    total_premium: pro_rata.pro_rata_premium,
                    provenance: TotalsProvenance::AdjustedFinal,
                    as_of: Utc::now(),
                });
            }
            if let Some(adjustment) = self.context.adjustment_result()? {
                return Ok(ProposalTotals {
                    total_sum_insured: self.summary_sum_insured(&sections)?,
                    total_premium: adjustment.net_premium_due,
                    provenance: TotalsProvenance::AdjustedFinal,
                    as_of: Utc::now(),
                });
            }

            let summary = self.context.summary()?;
            if !summary.is_empty() {
                return Ok(ProposalTotals {
                    total_sum_insured: summary
                        .values()
                        .map(|aggregate| aggregate.section_sum_insured)
                        .sum(),
                    total_premium: summary
                        .values()
                        .map(|aggregate| aggregate.section_aggregate_premium)
                        .sum(),
                    provenance: TotalsProvenance::ServerAggregate,
                    as_of: Utc::now(),
                });
            }
        }

        Ok(ProposalTotals {
            total_sum_insured: sections
                .iter()
                .map(|section| section.local_sum_insured())
                .sum(),
            total_premium: sections
                .iter()
                .map(|section| section.local_net_premium())
                .sum(),
            provenance: TotalsProvenance::LocalSum,
            as_of: Utc::now(),
        })
    }

    fn summary_sum_insured(&self, sections: &[Section]) -> Result<Decimal> {
        let summary = self.context.summary()?;
        if summary.is_empty() {
            return Ok(sections
                .iter()
                .map(|section| section.local_sum_insured())
                .sum());
        }
        Ok(summary
            .values()
            .map(|aggregate| aggregate.section_sum_insured)
            .sum())
    }

    /// Fetches and normalizes the calculation breakdown.
    ///
    /// Generation-stamped like the aggregate: a response superseded by a
    /// newer refresh is discarded and `Ok(None)` returned.
    pub async fn refresh_breakdown(&self) -> Result<Option<CalculationBreakdown>> {
        let token = self.breakdown_generation.begin();
        let proposal_number = self.proposal()?.proposal_number;

        let raw = self.rating.calculation_breakdown(&proposal_number).await?;

        if !self.breakdown_generation.is_current(token) {
            warn!(
                "Discarding superseded breakdown response for {}",
                proposal_number
            );
            return Ok(None);
        }

        let breakdown = normalize(&raw);
        self.context.store_breakdown(breakdown.clone())?;

        Ok(Some(breakdown))
    }

    /// The most recently fetched breakdown, if any.
    pub fn breakdown(&self) -> Result<Option<CalculationBreakdown>> {
        self.context.breakdown()
    }

    fn require_section(&self, section_id: &str) -> Result<Section> {
        self.context
            .section(section_id)?
            .ok_or_else(|| SectionError::SectionNotFound(section_id.to_string()).into())
    }
}
