#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result, ValidationError};
    use crate::rating::{RatingError, RatingServiceTrait, SectionRatingOutcome, SectionTotals};
    use crate::sections::section_calculator::{
        dedupe_sections_by_recency, SectionCalculator,
    };
    use crate::sections::{NewRiskItem, Section};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use premia_rating::{
        CalculatedRiskItem, RatingClientError, RawBreakdown, SectionAggregate, SectionPayload,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Rates every incoming item with the standard formula and echoes it
    /// back, optionally corrupting ids or failing outright.
    struct MockRatingService {
        totals: Option<SectionTotals>,
        corrupt_item_ids: bool,
        fail_transport: bool,
    }

    impl MockRatingService {
        fn new() -> Self {
            MockRatingService {
                totals: None,
                corrupt_item_ids: false,
                fail_transport: false,
            }
        }

        fn with_totals(mut self, totals: SectionTotals) -> Self {
            self.totals = Some(totals);
            self
        }

        fn rate(item: &CalculatedRiskItem, proportion_rate: Decimal) -> CalculatedRiskItem {
            let mut rated = item.clone();
            rated.actual_premium =
                item.actual_value * item.item_rate * item.multiply_rate / dec!(100);
            rated.share_value = rated.actual_premium * proportion_rate / dec!(100);
            rated.premium_value = rated.share_value;
            rated.net_premium_after_discounts = rated.premium_value;
            rated.actual_premium_formula = Some(format!(
                "{} x {}% x {}",
                item.actual_value, item.item_rate, item.multiply_rate
            ));
            rated
        }
    }

    #[async_trait]
    impl RatingServiceTrait for MockRatingService {
        async fn rate_section_items(
            &self,
            _sub_risk: &str,
            proportion_rate: Decimal,
            risk_items: Vec<CalculatedRiskItem>,
        ) -> Result<SectionRatingOutcome> {
            if self.fail_transport {
                return Err(Error::Rating(RatingError::Client(RatingClientError::Http(
                    "connection refused".to_string(),
                ))));
            }

            let mut calculated_items: Vec<CalculatedRiskItem> = risk_items
                .iter()
                .map(|item| Self::rate(item, proportion_rate))
                .collect();

            if self.corrupt_item_ids {
                if let Some(first) = calculated_items.first_mut() {
                    first.item_id = Uuid::new_v4();
                }
            }

            Ok(SectionRatingOutcome {
                calculated_items,
                totals: self.totals.clone(),
            })
        }

        async fn aggregate_sections(
            &self,
            _sections: Vec<SectionPayload>,
        ) -> Result<Vec<SectionAggregate>> {
            unimplemented!("Not needed for these tests")
        }

        async fn apply_adjustments(
            &self,
            _total_aggregate_premium: Decimal,
            _rates: &crate::proposals::ProposalAdjustments,
        ) -> Result<crate::proposals::AdjustmentResult> {
            unimplemented!("Not needed for these tests")
        }

        async fn calculate_pro_rata(
            &self,
            _net_premium_due: Decimal,
            _cover_days: i64,
        ) -> Result<crate::proposals::ProRataResult> {
            unimplemented!("Not needed for these tests")
        }

        async fn calculation_breakdown(&self, _proposal_id: &str) -> Result<RawBreakdown> {
            unimplemented!("Not needed for these tests")
        }
    }

    fn two_item_section() -> Section {
        let mut section = Section::new("Building", "Head Office").unwrap();
        section.add_item(NewRiskItem {
            smi_code: "BLD01".to_string(),
            actual_value: dec!(500000),
            item_rate: dec!(0.5),
            ..Default::default()
        });
        section.add_item(NewRiskItem {
            smi_code: "BLD02".to_string(),
            actual_value: dec!(200000),
            item_rate: dec!(1),
            ..Default::default()
        });
        section
    }

    #[tokio::test]
    async fn calculate_all_merges_every_item_by_id() {
        let calculator = Arc::new(MockRatingService::new());
        let section = two_item_section();

        let outcome = SectionCalculator::new(calculator)
            .calculate_all_items(&section, "FIRE", dec!(100))
            .await
            .unwrap();

        let first = outcome.section.risk_items[0].computed.as_ref().unwrap();
        let second = outcome.section.risk_items[1].computed.as_ref().unwrap();
        assert_eq!(first.actual_premium, dec!(2500));
        assert_eq!(second.actual_premium, dec!(2000));
        assert!(outcome.section.last_calculated.is_some());
        assert_eq!(outcome.calculated_items.len(), 2);
    }

    #[tokio::test]
    async fn calculate_all_adopts_response_totals() {
        let calculator = Arc::new(MockRatingService::new().with_totals(SectionTotals {
            sum_insured: Some(dec!(700000)),
            gross_premium: Some(dec!(4500)),
            net_premium: Some(dec!(4400)),
        }));
        let section = two_item_section();

        let outcome = SectionCalculator::new(calculator)
            .calculate_all_items(&section, "FIRE", dec!(100))
            .await
            .unwrap();

        assert_eq!(outcome.section.section_sum_insured, dec!(700000));
        assert_eq!(outcome.section.section_premium, dec!(4500));
        assert_eq!(outcome.section.section_net_premium, dec!(4400));
    }

    #[tokio::test]
    async fn calculate_all_keeps_prior_totals_when_response_has_none() {
        let calculator = Arc::new(MockRatingService::new());
        let mut section = two_item_section();
        section.section_sum_insured = dec!(123);
        section.section_premium = dec!(45);

        let outcome = SectionCalculator::new(calculator)
            .calculate_all_items(&section, "FIRE", dec!(100))
            .await
            .unwrap();

        assert_eq!(outcome.section.section_sum_insured, dec!(123));
        assert_eq!(outcome.section.section_premium, dec!(45));
    }

    #[tokio::test]
    async fn unmatched_calculated_item_fails_the_whole_merge() {
        let mut mock = MockRatingService::new();
        mock.corrupt_item_ids = true;
        let section = two_item_section();

        let result = SectionCalculator::new(Arc::new(mock))
            .calculate_all_items(&section, "FIRE", dec!(100))
            .await;

        assert!(matches!(
            result,
            Err(Error::Rating(RatingError::UnmatchedCalculatedItem { .. }))
        ));
        // Caller's section is untouched: nothing was rated
        assert!(section.risk_items.iter().all(|item| item.computed.is_none()));
        assert!(section.last_calculated.is_none());
    }

    #[tokio::test]
    async fn transport_failure_surfaces_without_partial_merge() {
        let mut mock = MockRatingService::new();
        mock.fail_transport = true;
        let section = two_item_section();

        let result = SectionCalculator::new(Arc::new(mock))
            .calculate_all_items(&section, "FIRE", dec!(100))
            .await;

        assert!(matches!(
            result,
            Err(Error::Rating(RatingError::Client(_)))
        ));
        assert!(section.risk_items.iter().all(|item| item.computed.is_none()));
    }

    #[tokio::test]
    async fn empty_section_is_rejected_before_any_network_call() {
        let calculator = Arc::new(MockRatingService::new());
        let section = Section::new("Building", "HQ").unwrap();

        let result = SectionCalculator::new(calculator)
            .calculate_all_items(&section, "FIRE", dec!(100))
            .await;

        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidInput(_)))
        ));
    }

    #[test]
    fn dedupe_keeps_the_most_recent_snapshot_per_id() {
        let mut stale = Section::new("Building", "HQ").unwrap();
        stale.last_calculated = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        stale.section_premium = dec!(1000);

        let mut fresh = stale.clone();
        fresh.last_calculated = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        fresh.section_premium = dec!(1100);

        let deduped = dedupe_sections_by_recency(vec![fresh.clone(), stale]);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].section_premium, dec!(1100));
        assert_eq!(deduped[0].last_calculated, fresh.last_calculated);
    }

    #[test]
    fn untimestamped_snapshot_never_overrides_a_timestamped_one() {
        let mut timestamped = Section::new("Contents", "HQ").unwrap();
        timestamped.last_calculated = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        timestamped.section_premium = dec!(900);

        let mut untimestamped = timestamped.clone();
        untimestamped.last_calculated = None;
        untimestamped.section_premium = dec!(0);

        let deduped = dedupe_sections_by_recency(vec![untimestamped, timestamped.clone()]);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].section_premium, dec!(900));
    }

    #[test]
    fn dedupe_preserves_first_appearance_order_of_distinct_sections() {
        let a = Section::new("Building", "HQ").unwrap();
        let b = Section::new("Contents", "HQ").unwrap();
        let ids = vec![a.id.clone(), b.id.clone()];

        let deduped = dedupe_sections_by_recency(vec![a, b]);

        let kept: Vec<String> = deduped.into_iter().map(|section| section.id).collect();
        assert_eq!(kept, ids);
    }
}
