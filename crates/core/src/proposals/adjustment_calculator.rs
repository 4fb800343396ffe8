//! Named discount/loading application against an aggregate premium.
//!
//! Each of the nine rates is applied independently against the starting
//! premium, not compounded on a running balance. The waterfall a display
//! surface renders lists discounts before loadings, but that order is
//! presentation only; the arithmetic has no ordering dependency.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::proposals::proposal_model::{AdjustmentResult, ProposalAdjustments};
use crate::sections::Section;

const PERCENT: Decimal = dec!(100);

/// Sums the sections' premium fields into the adjustment starting premium,
/// clamped at zero against bad input.
pub fn starting_premium(sections: &[Section]) -> Decimal {
    sections
        .iter()
        .map(|section| section.section_premium)
        .sum::<Decimal>()
        .max(Decimal::ZERO)
}

/// Applies the nine named rates to `starting_premium`.
///
/// Every amount is `starting_premium x rate / 100`; discounts subtract,
/// loadings add, and the net premium due is floored at zero.
pub fn apply_adjustment_rates(
    starting_premium: Decimal,
    rates: &ProposalAdjustments,
) -> AdjustmentResult {
    let starting_premium = starting_premium.max(Decimal::ZERO);
    let amount = |rate: Decimal| starting_premium * rate / PERCENT;

    let result = AdjustmentResult {
        starting_premium,
        special_discount_amount: amount(rates.special_discount_rate),
        deductible_discount_amount: amount(rates.deductible_discount_rate),
        spread_discount_amount: amount(rates.spread_discount_rate),
        lta_discount_amount: amount(rates.lta_discount_rate),
        other_discounts_amount: amount(rates.other_discounts_rate),
        theft_loading_amount: amount(rates.theft_loading_rate),
        srcc_loading_amount: amount(rates.srcc_loading_rate),
        other_loading2_amount: amount(rates.other_loading2_rate),
        other_loadings_amount: amount(rates.other_loadings_rate),
        net_premium_due: Decimal::ZERO,
    };

    let net_premium_due = (starting_premium - result.total_discounts()
        + result.total_loadings())
    .max(Decimal::ZERO);

    AdjustmentResult {
        net_premium_due,
        ..result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_independent_of_each_other() {
        let rates = ProposalAdjustments {
            special_discount_rate: dec!(10),
            theft_loading_rate: dec!(5),
            ..Default::default()
        };

        let result = apply_adjustment_rates(dec!(100000), &rates);

        assert_eq!(result.special_discount_amount, dec!(10000));
        assert_eq!(result.theft_loading_amount, dec!(5000));
        assert_eq!(result.net_premium_due, dec!(95000));
    }

    #[test]
    fn all_nine_rates_apply_against_the_starting_premium() {
        let rates = ProposalAdjustments {
            special_discount_rate: dec!(1),
            deductible_discount_rate: dec!(2),
            spread_discount_rate: dec!(3),
            lta_discount_rate: dec!(4),
            other_discounts_rate: dec!(5),
            theft_loading_rate: dec!(6),
            srcc_loading_rate: dec!(7),
            other_loading2_rate: dec!(8),
            other_loadings_rate: dec!(9),
        };

        let result = apply_adjustment_rates(dec!(1000), &rates);

        assert_eq!(result.total_discounts(), dec!(150));
        assert_eq!(result.total_loadings(), dec!(300));
        // 1000 - 150 + 300; no compounding on a running balance
        assert_eq!(result.net_premium_due, dec!(1150));
    }

    #[test]
    fn net_premium_floors_at_zero() {
        let rates = ProposalAdjustments {
            special_discount_rate: dec!(60),
            deductible_discount_rate: dec!(60),
            ..Default::default()
        };

        let result = apply_adjustment_rates(dec!(1000), &rates);
        assert_eq!(result.net_premium_due, Decimal::ZERO);
    }

    #[test]
    fn negative_starting_premium_is_clamped() {
        let result = apply_adjustment_rates(dec!(-500), &ProposalAdjustments::default());
        assert_eq!(result.starting_premium, Decimal::ZERO);
        assert_eq!(result.net_premium_due, Decimal::ZERO);
    }

    #[test]
    fn starting_premium_sums_section_premiums() {
        let mut a = Section::new("Building", "HQ").unwrap();
        a.section_premium = dec!(2500);
        let mut b = Section::new("Contents", "HQ").unwrap();
        b.section_premium = dec!(3000);

        assert_eq!(starting_premium(&[a, b]), dec!(5500));
    }

    #[test]
    fn starting_premium_clamps_negative_sum() {
        let mut a = Section::new("Building", "HQ").unwrap();
        a.section_premium = dec!(-2500);

        assert_eq!(starting_premium(&[a]), Decimal::ZERO);
    }
}
