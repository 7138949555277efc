//! Property tests for aging classification.

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use codledger_shared::types::AgentId;

use super::classifier::AgingClassifier;
use super::types::{AgeBucket, OutstandingCollection};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Buckets are exhaustive and exclusive: per agent they add up to the total,
    /// and the totals add up to the summary.
    #[test]
    fn buckets_sum_to_total(
        items in prop::collection::vec((0usize..4, 1i64..1_000_000, -48i64..24 * 40), 0..80)
    ) {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let agents: Vec<AgentId> = (0..4).map(|_| AgentId::new()).collect();
        let collections: Vec<OutstandingCollection> = items
            .iter()
            .map(|(agent, cents, age_hours)| OutstandingCollection {
                agent_id: agents[*agent],
                amount: Decimal::new(*cents, 2),
                collection_date: now - Duration::hours(*age_hours),
            })
            .collect();

        let report = AgingClassifier::classify(now, &collections, &HashSet::new());

        let mut grand_total = Decimal::ZERO;
        for row in &report.buckets {
            let sum = [
                AgeBucket::ZeroToOne,
                AgeBucket::TwoToThree,
                AgeBucket::FourToSeven,
                AgeBucket::EightPlus,
            ]
            .into_iter()
            .map(|b| row.amount_in(b))
            .sum::<Decimal>();
            prop_assert_eq!(sum, row.total_balance);
            grand_total += row.total_balance;
        }
        let expected: Decimal = collections.iter().map(|c| c.amount).sum();
        prop_assert_eq!(grand_total, expected);
        prop_assert_eq!(report.summary.total_outstanding_amount, expected);
    }

    /// Rows are ordered by critical amount, largest first.
    #[test]
    fn rows_sorted_by_critical_amount(
        items in prop::collection::vec((0usize..6, 1i64..100_000, 0i64..20), 1..40)
    ) {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let agents: Vec<AgentId> = (0..6).map(|_| AgentId::new()).collect();
        let collections: Vec<OutstandingCollection> = items
            .iter()
            .map(|(agent, cents, days)| OutstandingCollection {
                agent_id: agents[*agent],
                amount: Decimal::new(*cents, 2),
                collection_date: now - Duration::days(*days),
            })
            .collect();

        let report = AgingClassifier::classify(now, &collections, &HashSet::new());
        for pair in report.buckets.windows(2) {
            prop_assert!(pair[0].bucket_8_plus >= pair[1].bucket_8_plus);
        }
    }
}
