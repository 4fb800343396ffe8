//! Per-item premium preview and server-response merge.
//!
//! The rating service owns the authoritative formulas. The preview here
//! exists only for instant feedback before a round-trip: it is never
//! persisted as authoritative and is replaced wholesale by the server's
//! figures on merge.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::rating::RatingError;
use crate::sections::sections_model::{ComputedPremium, RiskItem};
use premia_rating::CalculatedRiskItem;

const PERCENT: Decimal = dec!(100);

/// Computes the local preview figures for one risk item.
///
/// `premium = sum insured x rate x multiplier / 100`, with the retained
/// share taken from `proportion_rate` and the FEA/stock discounts derived
/// from their respective rates. The net figure is floored at zero.
pub fn preview_item(item: &RiskItem, proportion_rate: Decimal) -> ComputedPremium {
    let actual_premium = item.actual_value * item.item_rate * item.multiply_rate / PERCENT;
    let share_value = actual_premium * proportion_rate / PERCENT;

    let (stock_premium, stock_discount_amount) = match &item.stock_item {
        Some(stock) => {
            let stock_premium = stock.stock_sum_insured * stock.stock_rate / PERCENT;
            let stock_discount = stock_premium * stock.stock_discount_rate / PERCENT;
            (stock_premium, stock_discount)
        }
        None => (Decimal::ZERO, Decimal::ZERO),
    };

    let premium_value = share_value + stock_premium;
    let fea_discount_amount = premium_value * item.fea_discount_rate / PERCENT;

    let net_premium_after_discounts =
        (premium_value - fea_discount_amount - stock_discount_amount).max(Decimal::ZERO);

    let actual_premium_formula = format!(
        "{} × {}% × {}",
        item.actual_value.normalize(),
        item.item_rate.normalize(),
        item.multiply_rate.normalize()
    );
    let premium_formula = if stock_premium.is_zero() {
        format!(
            "{} × {}%",
            actual_premium.normalize(),
            proportion_rate.normalize()
        )
    } else {
        format!(
            "{} × {}% + {}",
            actual_premium.normalize(),
            proportion_rate.normalize(),
            stock_premium.normalize()
        )
    };
    let net_premium_formula = format!(
        "{} - {} - {}",
        premium_value.normalize(),
        fea_discount_amount.normalize(),
        stock_discount_amount.normalize()
    );

    ComputedPremium {
        actual_premium,
        share_value,
        premium_value,
        stock_discount_amount,
        fea_discount_amount,
        net_premium_after_discounts,
        actual_premium_formula: Some(actual_premium_formula),
        premium_formula: Some(premium_formula),
        net_premium_formula: Some(net_premium_formula),
    }
}

/// Merges a server-calculated item into the matching local item.
///
/// Matching is strictly by the stable item id; a mismatch aborts without
/// touching the local item. On success the computed fields (including the
/// server's formula strings) replace any preview and the stale mark is
/// cleared. Local rating inputs are left as the user entered them.
pub fn merge_calculated_item(
    item: &mut RiskItem,
    calculated: &CalculatedRiskItem,
) -> Result<(), RatingError> {
    if calculated.item_id != item.id {
        return Err(RatingError::UnmatchedCalculatedItem {
            section_id: item.section_id.clone(),
            item_id: calculated.item_id,
        });
    }

    item.computed = Some(ComputedPremium {
        actual_premium: calculated.actual_premium,
        share_value: calculated.share_value,
        premium_value: calculated.premium_value,
        stock_discount_amount: calculated.stock_discount_amount,
        fea_discount_amount: calculated.fea_discount_amount,
        net_premium_after_discounts: calculated.net_premium_after_discounts,
        actual_premium_formula: calculated.actual_premium_formula.clone(),
        premium_formula: calculated.premium_formula.clone(),
        net_premium_formula: calculated.net_premium_formula.clone(),
    });
    item.computed_stale = false;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::sections_model::{NewRiskItem, Section, StockItem};

    fn building_section() -> Section {
        Section::new("Building", "Head Office").unwrap()
    }

    fn plain_item(section: &mut Section) -> RiskItem {
        let item_id = section.add_item(NewRiskItem {
            smi_code: "BLD01".to_string(),
            description: "Main building".to_string(),
            location: "Head Office".to_string(),
            actual_value: dec!(500000),
            item_rate: dec!(0.5),
            multiply_rate: None,
            fea_discount_rate: Decimal::ZERO,
            stock_item: None,
        });
        section.item(item_id).unwrap().clone()
    }

    #[test]
    fn preview_applies_local_fallback_formula() {
        let mut section = building_section();
        let item = plain_item(&mut section);

        let preview = preview_item(&item, dec!(100));

        assert_eq!(preview.actual_premium, dec!(2500));
        assert_eq!(preview.share_value, dec!(2500));
        assert_eq!(preview.premium_value, dec!(2500));
        assert_eq!(preview.net_premium_after_discounts, dec!(2500));
        assert_eq!(
            preview.actual_premium_formula.as_deref(),
            Some("500000 × 0.5% × 1")
        );
    }

    #[test]
    fn preview_takes_proportion_share() {
        let mut section = building_section();
        let item = plain_item(&mut section);

        let preview = preview_item(&item, dec!(60));

        assert_eq!(preview.actual_premium, dec!(2500));
        assert_eq!(preview.share_value, dec!(1500));
    }

    #[test]
    fn preview_derives_stock_and_fea_discounts() {
        let mut section = building_section();
        let item_id = section.add_item(NewRiskItem {
            smi_code: "STK01".to_string(),
            actual_value: dec!(100000),
            item_rate: dec!(1),
            fea_discount_rate: dec!(10),
            stock_item: Some(StockItem {
                code: "ST-1".to_string(),
                description: String::new(),
                stock_sum_insured: dec!(20000),
                stock_rate: dec!(2),
                stock_discount_rate: dec!(25),
            }),
            ..Default::default()
        });
        let item = section.item(item_id).unwrap().clone();

        let preview = preview_item(&item, dec!(100));

        // 100000 x 1% = 1000 premium, stock 20000 x 2% = 400
        assert_eq!(preview.actual_premium, dec!(1000));
        assert_eq!(preview.premium_value, dec!(1400));
        assert_eq!(preview.stock_discount_amount, dec!(100));
        assert_eq!(preview.fea_discount_amount, dec!(140));
        assert_eq!(preview.net_premium_after_discounts, dec!(1160));
    }

    #[test]
    fn preview_net_premium_floors_at_zero() {
        let mut section = building_section();
        let item_id = section.add_item(NewRiskItem {
            smi_code: "BLD01".to_string(),
            actual_value: dec!(1000),
            item_rate: dec!(1),
            fea_discount_rate: dec!(150),
            ..Default::default()
        });
        let item = section.item(item_id).unwrap().clone();

        let preview = preview_item(&item, dec!(100));
        assert_eq!(preview.net_premium_after_discounts, Decimal::ZERO);
    }

    #[test]
    fn merge_fills_computed_fields_and_clears_stale_mark() {
        let mut section = building_section();
        let mut item = plain_item(&mut section);
        item.computed = Some(preview_item(&item, dec!(100)));
        item.computed_stale = true;

        let mut calculated = item.to_payload();
        calculated.actual_premium = dec!(2600);
        calculated.share_value = dec!(2600);
        calculated.premium_value = dec!(2600);
        calculated.net_premium_after_discounts = dec!(2600);
        calculated.actual_premium_formula = Some("server formula".to_string());

        merge_calculated_item(&mut item, &calculated).unwrap();

        let computed = item.computed.unwrap();
        assert_eq!(computed.actual_premium, dec!(2600));
        assert_eq!(
            computed.actual_premium_formula.as_deref(),
            Some("server formula")
        );
        assert!(!item.computed_stale);
    }

    #[test]
    fn merge_rejects_foreign_item_and_leaves_state_untouched() {
        let mut section = building_section();
        let mut item = plain_item(&mut section);

        let mut calculated = item.to_payload();
        calculated.item_id = uuid::Uuid::new_v4();
        calculated.actual_premium = dec!(9999);

        let result = merge_calculated_item(&mut item, &calculated);

        assert!(matches!(
            result,
            Err(RatingError::UnmatchedCalculatedItem { .. })
        ));
        assert!(item.computed.is_none());
    }
}
