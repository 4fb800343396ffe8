//! Reshapes heterogeneous breakdown responses into the canonical form.

use log::debug;
use rust_decimal::Decimal;

use super::breakdown_model::{
    CalculationBreakdown, CalculationSteps, FinalResults, ItemCalculation, ProRataStep,
    SectionAdjustments, SectionCalculation,
};
use premia_rating::{RawBreakdown, RawBreakdownItem, RawBreakdownSection};

/// Normalizes a raw breakdown response into [`CalculationBreakdown`].
///
/// A response carrying fully-computed `calculationSteps` passes through
/// unchanged; otherwise one is synthesized from the raw section inputs,
/// with absent computed fields defaulted to zero and missing totals
/// re-derived by summation. Normalizing an already-normalized structure
/// returns an equivalent structure, because the response is re-normalized
/// every time it changes.
pub fn normalize(raw: &RawBreakdown) -> CalculationBreakdown {
    let raw_sections: &[RawBreakdownSection] = match &raw.calculation_steps {
        Some(steps) if !steps.section_calculations.is_empty() => &steps.section_calculations,
        _ => {
            debug!("Breakdown response carries no calculation steps; synthesizing from inputs");
            raw.sections.as_deref().unwrap_or(&[])
        }
    };

    let section_calculations: Vec<SectionCalculation> =
        raw_sections.iter().map(normalize_section).collect();

    let final_results = match &raw.final_results {
        Some(results) => FinalResults {
            total_sum_insured: results.total_sum_insured,
            total_gross_premium: results.total_gross_premium,
            total_net_premium: results.total_net_premium,
        },
        None => sum_final_results(&section_calculations),
    };

    CalculationBreakdown {
        proposal_id: raw.proposal_id.clone(),
        generated_at: raw.generated_at,
        calculation_steps: CalculationSteps {
            section_calculations,
        },
        pro_rata: raw.pro_rata.as_ref().map(|step| ProRataStep {
            net_premium_due: step.net_premium_due,
            cover_days: step.cover_days,
            pro_rata_factor: step.pro_rata_factor,
            pro_rata_premium: step.pro_rata_premium,
        }),
        final_results,
    }
}

fn normalize_section(raw: &RawBreakdownSection) -> SectionCalculation {
    let risk_items: Vec<ItemCalculation> = raw.risk_items.iter().map(normalize_item).collect();

    // Section aggregates fall back to summing the item rows when the
    // service left them out.
    let section_sum_insured = raw.section_sum_insured.unwrap_or_else(|| {
        risk_items
            .iter()
            .map(|item| item.actual_value)
            .sum::<Decimal>()
    });
    let section_gross_premium = raw.section_gross_premium.unwrap_or_else(|| {
        risk_items
            .iter()
            .map(|item| item.premium_value)
            .sum::<Decimal>()
    });
    let section_net_premium = raw.section_net_premium.unwrap_or_else(|| {
        risk_items
            .iter()
            .map(|item| item.net_premium_after_discounts)
            .sum::<Decimal>()
    });

    let section_adjustments = match &raw.section_adjustments {
        Some(adjustments) => SectionAdjustments {
            starting_premium: adjustments.starting_premium,
            discounts_applied: adjustments
                .discounts_applied
                .iter()
                .map(|applied| super::breakdown_model::AppliedAdjustment {
                    name: applied.name.clone(),
                    rate: applied.rate,
                    amount: applied.amount,
                })
                .collect(),
            loadings_applied: adjustments
                .loadings_applied
                .iter()
                .map(|applied| super::breakdown_model::AppliedAdjustment {
                    name: applied.name.clone(),
                    rate: applied.rate,
                    amount: applied.amount,
                })
                .collect(),
            final_net_premium: adjustments.final_net_premium,
        },
        // No waterfall computed: a trivial one from gross straight to net.
        None => SectionAdjustments {
            starting_premium: section_gross_premium,
            discounts_applied: Vec::new(),
            loadings_applied: Vec::new(),
            final_net_premium: section_net_premium,
        },
    };

    SectionCalculation {
        section_id: raw.section_id.clone(),
        section_name: raw.section_name.clone(),
        risk_items,
        section_sum_insured,
        section_gross_premium,
        section_net_premium,
        section_adjustments,
    }
}

fn normalize_item(raw: &RawBreakdownItem) -> ItemCalculation {
    ItemCalculation {
        item_id: raw.item_id,
        item_no: raw.item_no,
        smi_code: raw.smi_code.clone(),
        description: raw.description.clone(),
        actual_value: raw.actual_value,
        item_rate: raw.item_rate,
        actual_premium: raw.actual_premium.unwrap_or(Decimal::ZERO),
        share_value: raw.share_value.unwrap_or(Decimal::ZERO),
        premium_value: raw.premium_value.unwrap_or(Decimal::ZERO),
        net_premium_after_discounts: raw.net_premium_after_discounts.unwrap_or(Decimal::ZERO),
    }
}

fn sum_final_results(sections: &[SectionCalculation]) -> FinalResults {
    FinalResults {
        total_sum_insured: sections
            .iter()
            .map(|section| section.section_sum_insured)
            .sum(),
        total_gross_premium: sections
            .iter()
            .map(|section| section.section_gross_premium)
            .sum(),
        total_net_premium: sections
            .iter()
            .map(|section| section.section_net_premium)
            .sum(),
    }
}
