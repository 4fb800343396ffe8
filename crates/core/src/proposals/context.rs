//! Per-proposal calculation state.
//!
//! `CalculationContext` is owned by the proposal session and passed into
//! the aggregation stages; there is no ambient module-level cache. Every
//! write replaces a whole value so concurrent readers never observe a
//! half-updated section list or cache entry.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::breakdown::CalculationBreakdown;
use crate::errors::Result;
use crate::proposals::proposal_model::{
    AdjustmentResult, ProRataResult, SectionsState,
};
use crate::proposals::proposals_errors::ProposalError;
use crate::sections::{Section, SectionError};
use premia_rating::{CalculatedRiskItem, SectionAggregate};

/// The single canonical sections list plus the caches the pipeline stages
/// share: the last full calculated-items array per section, the most
/// recent per-section server aggregates, and the cached adjustment,
/// pro-rata and breakdown results.
#[derive(Debug, Default)]
pub struct CalculationContext {
    sections: RwLock<CanonicalSections>,
    calculated_items: RwLock<HashMap<String, Vec<CalculatedRiskItem>>>,
    summary: RwLock<HashMap<String, SectionAggregate>>,
    adjustment_result: RwLock<Option<AdjustmentResult>>,
    pro_rata_result: RwLock<Option<ProRataResult>>,
    breakdown: RwLock<Option<CalculationBreakdown>>,
}

#[derive(Debug, Default)]
struct CanonicalSections {
    sections: Vec<Section>,
    state: SectionsState,
}

fn poisoned<E: std::fmt::Display>(err: E) -> ProposalError {
    ProposalError::ContextLock(err.to_string())
}

impl CalculationContext {
    pub fn new(sections: Vec<Section>) -> Self {
        CalculationContext {
            sections: RwLock::new(CanonicalSections {
                sections,
                state: SectionsState::Clean,
            }),
            ..Default::default()
        }
    }

    // --- canonical sections ---

    pub fn sections(&self) -> Result<Vec<Section>> {
        let canonical = self.sections.read().map_err(poisoned)?;
        Ok(canonical.sections.clone())
    }

    pub fn sections_state(&self) -> Result<SectionsState> {
        let canonical = self.sections.read().map_err(poisoned)?;
        Ok(canonical.state)
    }

    pub fn section(&self, section_id: &str) -> Result<Option<Section>> {
        let canonical = self.sections.read().map_err(poisoned)?;
        Ok(canonical
            .sections
            .iter()
            .find(|section| section.id == section_id)
            .cloned())
    }

    /// Replaces the whole canonical list in one write.
    pub fn replace_sections(
        &self,
        sections: Vec<Section>,
        state: SectionsState,
    ) -> Result<()> {
        let mut canonical = self.sections.write().map_err(poisoned)?;
        *canonical = CanonicalSections { sections, state };
        Ok(())
    }

    /// Replaces one section whole, keyed by id, and moves the list to
    /// `state`. The section must already exist in the canonical list.
    pub fn replace_section(
        &self,
        section: Section,
        state: SectionsState,
    ) -> Result<()> {
        let mut canonical = self.sections.write().map_err(poisoned)?;
        let slot = canonical
            .sections
            .iter_mut()
            .find(|existing| existing.id == section.id);

        match slot {
            Some(slot) => {
                *slot = section;
                canonical.state = state;
                Ok(())
            }
            None => Err(SectionError::SectionNotFound(section.id).into()),
        }
    }

    /// Appends a section and marks the list locally edited.
    pub fn push_section(&self, section: Section) -> Result<()> {
        let mut canonical = self.sections.write().map_err(poisoned)?;
        canonical.sections.push(section);
        canonical.state = SectionsState::LocallyEdited;
        Ok(())
    }

    /// Removes a section by id and purges every cache keyed by it.
    pub fn purge_section(&self, section_id: &str) -> Result<()> {
        let mut canonical = self.sections.write().map_err(poisoned)?;
        let before = canonical.sections.len();
        canonical.sections.retain(|section| section.id != section_id);

        if canonical.sections.len() == before {
            return Err(SectionError::SectionNotFound(section_id.to_string()).into());
        }
        canonical.state = SectionsState::LocallyEdited;
        drop(canonical);

        self.calculated_items
            .write()
            .map_err(poisoned)?
            .remove(section_id);
        self.summary.write().map_err(poisoned)?.remove(section_id);

        Ok(())
    }

    // --- calculated-items cache ---

    pub fn cache_calculated_items(
        &self,
        section_id: &str,
        items: Vec<CalculatedRiskItem>,
    ) -> Result<()> {
        self.calculated_items
            .write()
            .map_err(poisoned)?
            .insert(section_id.to_string(), items);
        Ok(())
    }

    pub fn calculated_items(
        &self,
        section_id: &str,
    ) -> Result<Option<Vec<CalculatedRiskItem>>> {
        let cache = self.calculated_items.read().map_err(poisoned)?;
        Ok(cache.get(section_id).cloned())
    }

    pub fn drop_calculated_items(&self, section_id: &str) -> Result<()> {
        self.calculated_items
            .write()
            .map_err(poisoned)?
            .remove(section_id);
        Ok(())
    }

    /// Snapshot of the whole calculated-items cache for payload building.
    pub fn calculated_items_snapshot(
        &self,
    ) -> Result<HashMap<String, Vec<CalculatedRiskItem>>> {
        let cache = self.calculated_items.read().map_err(poisoned)?;
        Ok(cache.clone())
    }

    // --- summary cache ---

    /// Replaces the whole per-section aggregate summary in one write.
    pub fn store_summary(&self, aggregates: &[SectionAggregate]) -> Result<()> {
        let fresh: HashMap<String, SectionAggregate> = aggregates
            .iter()
            .map(|aggregate| (aggregate.section_id.clone(), aggregate.clone()))
            .collect();
        *self.summary.write().map_err(poisoned)? = fresh;
        Ok(())
    }

    pub fn summary(&self) -> Result<HashMap<String, SectionAggregate>> {
        Ok(self.summary.read().map_err(poisoned)?.clone())
    }

    // --- cached stage results ---

    pub fn store_adjustment_result(&self, result: AdjustmentResult) -> Result<()> {
        *self.adjustment_result.write().map_err(poisoned)? = Some(result);
        Ok(())
    }

    pub fn adjustment_result(&self) -> Result<Option<AdjustmentResult>> {
        Ok(self.adjustment_result.read().map_err(poisoned)?.clone())
    }

    pub fn store_pro_rata_result(&self, result: ProRataResult) -> Result<()> {
        *self.pro_rata_result.write().map_err(poisoned)? = Some(result);
        Ok(())
    }

    pub fn pro_rata_result(&self) -> Result<Option<ProRataResult>> {
        Ok(self.pro_rata_result.read().map_err(poisoned)?.clone())
    }

    pub fn store_breakdown(&self, breakdown: CalculationBreakdown) -> Result<()> {
        *self.breakdown.write().map_err(poisoned)? = Some(breakdown);
        Ok(())
    }

    pub fn breakdown(&self) -> Result<Option<CalculationBreakdown>> {
        Ok(self.breakdown.read().map_err(poisoned)?.clone())
    }
}
