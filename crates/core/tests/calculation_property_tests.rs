//! Property-based tests for the premium aggregation pipeline.
//!
//! These verify that the arithmetic and reconciliation invariants hold
//! across all valid inputs, using the `proptest` crate for random test
//! case generation.

use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use premia_core::breakdown::normalize;
use premia_core::proposals::{apply_adjustment_rates, apply_pro_rata, ProposalAdjustments};
use premia_core::sections::{dedupe_sections_by_recency, NewRiskItem, Section};
use premia_rating::{RawBreakdown, RawBreakdownItem, RawBreakdownSection};

// =============================================================================
// Generators
// =============================================================================

/// Generates a monetary amount in [0, 10_000_000) with two decimal places.
fn arb_money() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generates a percentage rate in [0, 100] with two decimal places.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|basis_points| Decimal::new(basis_points, 2))
}

/// Generates the nine named adjustment rates.
fn arb_adjustments() -> impl Strategy<Value = ProposalAdjustments> {
    (
        [arb_rate(), arb_rate(), arb_rate(), arb_rate(), arb_rate()],
        [arb_rate(), arb_rate(), arb_rate(), arb_rate()],
    )
        .prop_map(|(discounts, loadings)| ProposalAdjustments {
            special_discount_rate: discounts[0],
            deductible_discount_rate: discounts[1],
            spread_discount_rate: discounts[2],
            lta_discount_rate: discounts[3],
            other_discounts_rate: discounts[4],
            theft_loading_rate: loadings[0],
            srcc_loading_rate: loadings[1],
            other_loading2_rate: loadings[2],
            other_loadings_rate: loadings[3],
        })
}

fn arb_optional_money() -> impl Strategy<Value = Option<Decimal>> {
    proptest::option::of(arb_money())
}

/// Generates a raw breakdown item where any computed field may be absent.
fn arb_raw_item() -> impl Strategy<Value = RawBreakdownItem> {
    (
        1u32..20,
        "[A-Z]{3}[0-9]{2}",
        arb_money(),
        arb_rate(),
        arb_optional_money(),
        arb_optional_money(),
        arb_optional_money(),
        arb_optional_money(),
    )
        .prop_map(
            |(item_no, smi_code, actual_value, item_rate, premium, share, value, net)| {
                RawBreakdownItem {
                    item_id: None,
                    item_no,
                    smi_code,
                    description: String::new(),
                    actual_value,
                    item_rate,
                    actual_premium: premium,
                    share_value: share,
                    premium_value: value,
                    net_premium_after_discounts: net,
                }
            },
        )
}

/// Generates a raw breakdown section with optional aggregate fields.
fn arb_raw_section() -> impl Strategy<Value = RawBreakdownSection> {
    (
        "s-[0-9]{1,3}",
        "[A-Z][a-z]{3,10}",
        proptest::collection::vec(arb_raw_item(), 0..4),
        arb_optional_money(),
        arb_optional_money(),
        arb_optional_money(),
    )
        .prop_map(
            |(section_id, section_name, risk_items, sum_insured, gross, net)| {
                RawBreakdownSection {
                    section_id,
                    section_name,
                    risk_items,
                    section_sum_insured: sum_insured,
                    section_gross_premium: gross,
                    section_net_premium: net,
                    section_adjustments: None,
                }
            },
        )
}

/// Generates a raw breakdown in the inputs-only shape the rating service
/// returns when it has not computed anything server-side.
fn arb_raw_breakdown() -> impl Strategy<Value = RawBreakdown> {
    proptest::collection::vec(arb_raw_section(), 0..4).prop_map(|sections| RawBreakdown {
        proposal_id: Some("Q-PROP".to_string()),
        sections: Some(sections),
        ..Default::default()
    })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every adjustment amount is `startingPremium x rate / 100`, applied
    /// independently, and the net premium due is
    /// `max(0, starting - discounts + loadings)`.
    #[test]
    fn prop_adjustment_arithmetic(
        starting in arb_money(),
        rates in arb_adjustments()
    ) {
        let result = apply_adjustment_rates(starting, &rates);

        prop_assert_eq!(
            result.special_discount_amount,
            starting * rates.special_discount_rate / Decimal::ONE_HUNDRED
        );
        prop_assert_eq!(
            result.theft_loading_amount,
            starting * rates.theft_loading_rate / Decimal::ONE_HUNDRED
        );

        let expected = (starting - result.total_discounts() + result.total_loadings())
            .max(Decimal::ZERO);
        prop_assert_eq!(result.net_premium_due, expected);
        prop_assert!(result.net_premium_due >= Decimal::ZERO);
    }

    /// Rates applied independently commute: the result never depends on
    /// any ordering of the nine rates, only on their sums.
    #[test]
    fn prop_adjustments_have_no_ordering_dependency(
        starting in arb_money(),
        rates in arb_adjustments()
    ) {
        let swapped = ProposalAdjustments {
            special_discount_rate: rates.other_discounts_rate,
            other_discounts_rate: rates.special_discount_rate,
            theft_loading_rate: rates.other_loadings_rate,
            other_loadings_rate: rates.theft_loading_rate,
            ..rates.clone()
        };

        let a = apply_adjustment_rates(starting, &rates);
        let b = apply_adjustment_rates(starting, &swapped);

        prop_assert_eq!(a.net_premium_due, b.net_premium_due);
        prop_assert_eq!(a.total_discounts(), b.total_discounts());
        prop_assert_eq!(a.total_loadings(), b.total_loadings());
    }

    /// The pro-rata premium is the net premium scaled by the day-count
    /// ratio, rounded to two decimal places half away from zero.
    #[test]
    fn prop_pro_rata_factor(
        net in (1i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2)),
        cover_days in 1i64..1000
    ) {
        let result = apply_pro_rata(net, cover_days, 365).unwrap();

        let expected = (net * Decimal::from(cover_days) / Decimal::from(365))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        prop_assert_eq!(result.pro_rata_premium, expected);
        prop_assert_eq!(result.is_pro_rated, cover_days != 365);
    }

    /// Normalizing an already-normalized breakdown returns an equivalent
    /// structure: no double-wrapping, no field loss.
    #[test]
    fn prop_normalization_is_idempotent(raw in arb_raw_breakdown()) {
        let once = normalize(&raw);
        let twice = normalize(&RawBreakdown::from(once.clone()));

        prop_assert_eq!(once, twice);
    }

    /// Normalized proposal totals always equal the sum of the normalized
    /// section aggregates when the service supplied no final results.
    #[test]
    fn prop_normalized_totals_sum_sections(raw in arb_raw_breakdown()) {
        let breakdown = normalize(&raw);

        let summed: Decimal = breakdown
            .calculation_steps
            .section_calculations
            .iter()
            .map(|section| section.section_net_premium)
            .sum();
        prop_assert_eq!(breakdown.final_results.total_net_premium, summed);
    }

    /// Removing any item from a section leaves `item_no` values exactly
    /// `1..n-1` in order.
    #[test]
    fn prop_item_removal_renumbers(
        count in 1usize..12,
        victim_index in 0usize..12
    ) {
        let mut section = Section::new("Building", "HQ").unwrap();
        for index in 0..count {
            section.add_item(NewRiskItem {
                smi_code: format!("SMI{:02}", index),
                actual_value: Decimal::new(1000, 0),
                item_rate: Decimal::ONE,
                ..Default::default()
            });
        }
        let victim = section.risk_items[victim_index % count].id;

        section.remove_item(victim).unwrap();

        let numbers: Vec<u32> = section.risk_items.iter().map(|item| item.item_no).collect();
        let expected: Vec<u32> = (1..count as u32).collect();
        prop_assert_eq!(numbers, expected);
    }

    /// Deduplication always keeps the snapshot with the greater timestamp
    /// and never lets an untimestamped one win over a timestamped one.
    #[test]
    fn prop_section_dedup_keeps_most_recent(
        first_ts in proptest::option::of(0i64..2_000_000_000),
        second_ts in proptest::option::of(0i64..2_000_000_000)
    ) {
        use chrono::{TimeZone, Utc};

        let mut first = Section::new("Building", "HQ").unwrap();
        first.last_calculated = first_ts.map(|secs| Utc.timestamp_opt(secs, 0).unwrap());
        let mut second = first.clone();
        second.last_calculated = second_ts.map(|secs| Utc.timestamp_opt(secs, 0).unwrap());
        second.section_premium = Decimal::ONE;

        let deduped = dedupe_sections_by_recency(vec![first.clone(), second.clone()]);

        prop_assert_eq!(deduped.len(), 1);
        let winner = &deduped[0];
        // Option ordering: None is older than any Some
        if second.last_calculated > first.last_calculated {
            prop_assert_eq!(winner.last_calculated, second.last_calculated);
            prop_assert_eq!(winner.section_premium, Decimal::ONE);
        } else {
            prop_assert_eq!(winner.last_calculated, first.last_calculated);
            prop_assert_eq!(winner.section_premium, Decimal::ZERO);
        }
    }
}
