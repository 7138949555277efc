//! Groups outstanding collections by agent and age.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use codledger_shared::types::AgentId;

use super::types::{
    days_since, AgeBucket, AgentAging, AgingReport, AgingSummary, OutstandingCollection,
};

/// Builds aging reports from outstanding collections.
pub struct AgingClassifier;

impl AgingClassifier {
    /// Classifies every collection by its age at `now`.
    ///
    /// `blocked` is the externally maintained set of blocked agents.
    /// Rows are sorted by 8+ amount descending, then by agent id.
    #[must_use]
    pub fn classify(
        now: DateTime<Utc>,
        collections: &[OutstandingCollection],
        blocked: &HashSet<AgentId>,
    ) -> AgingReport {
        let mut by_agent: HashMap<AgentId, AgentAging> = HashMap::new();

        for collection in collections {
            let bucket = AgeBucket::for_days(days_since(now, collection.collection_date));
            by_agent
                .entry(collection.agent_id)
                .or_insert_with(|| AgentAging::empty(collection.agent_id, collection.collection_date))
                .add(bucket, collection.amount, collection.collection_date);
        }

        let mut buckets: Vec<AgentAging> = by_agent
            .into_values()
            .map(|mut row| {
                row.is_blocked = blocked.contains(&row.agent_id);
                row
            })
            .collect();
        buckets.sort_by(|a, b| {
            b.bucket_8_plus
                .cmp(&a.bucket_8_plus)
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });

        let summary = Self::summarize(&buckets, blocked);
        AgingReport {
            generated_at: now,
            summary,
            buckets,
        }
    }

    /// Agents holding cash aged four days or more that are not blocked yet.
    #[must_use]
    pub fn agents_to_block(report: &AgingReport) -> Vec<AgentId> {
        report
            .buckets
            .iter()
            .filter(|row| row.needs_block())
            .map(|row| row.agent_id)
            .collect()
    }

    /// Aging of a single agent, if it holds anything.
    #[must_use]
    pub fn for_agent(
        now: DateTime<Utc>,
        agent_id: AgentId,
        collections: &[OutstandingCollection],
        blocked: &HashSet<AgentId>,
    ) -> Option<AgentAging> {
        let own: Vec<OutstandingCollection> = collections
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .cloned()
            .collect();
        Self::classify(now, &own, blocked).buckets.into_iter().next()
    }

    fn summarize(buckets: &[AgentAging], blocked: &HashSet<AgentId>) -> AgingSummary {
        let mut summary = AgingSummary {
            blocked_agents_count: u32::try_from(blocked.len()).unwrap_or(u32::MAX),
            ..AgingSummary::default()
        };
        for row in buckets {
            summary.total_agents_with_balance += 1;
            summary.total_outstanding_amount += row.total_balance;
            summary.critical_overdue_amount += row.bucket_8_plus;
            summary.warning_overdue_amount += row.bucket_4_7;
            if row.is_overdue() {
                summary.overdue_agents_count += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 20, 12, 0, 0).unwrap()
    }

    fn outstanding(agent_id: AgentId, amount: Decimal, age: Duration) -> OutstandingCollection {
        OutstandingCollection {
            agent_id,
            amount,
            collection_date: now() - age,
        }
    }

    #[test]
    fn nine_day_old_collection_is_critical() {
        let agent = AgentId::new();
        let report = AgingClassifier::classify(
            now(),
            &[outstanding(agent, dec!(50), Duration::days(9))],
            &HashSet::new(),
        );

        let row = &report.buckets[0];
        assert_eq!(row.bucket_8_plus, dec!(50));
        assert_eq!(row.total_balance, dec!(50));
        assert_eq!(report.summary.total_outstanding_amount, dec!(50));
        assert_eq!(report.summary.critical_overdue_amount, dec!(50));
        assert_eq!(report.summary.overdue_agents_count, 1);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(AgeBucket::for_days(-3), AgeBucket::ZeroToOne);
        assert_eq!(AgeBucket::for_days(0), AgeBucket::ZeroToOne);
        assert_eq!(AgeBucket::for_days(1), AgeBucket::ZeroToOne);
        assert_eq!(AgeBucket::for_days(2), AgeBucket::TwoToThree);
        assert_eq!(AgeBucket::for_days(3), AgeBucket::TwoToThree);
        assert_eq!(AgeBucket::for_days(4), AgeBucket::FourToSeven);
        assert_eq!(AgeBucket::for_days(7), AgeBucket::FourToSeven);
        assert_eq!(AgeBucket::for_days(8), AgeBucket::EightPlus);
    }

    #[test]
    fn days_are_floored() {
        assert_eq!(days_since(now(), now() - Duration::hours(47)), 1);
        assert_eq!(days_since(now(), now() - Duration::hours(48)), 2);
        assert_eq!(days_since(now(), now() + Duration::hours(1)), -1);
    }

    #[test]
    fn groups_and_sorts_agents() {
        let calm = AgentId::new();
        let late = AgentId::new();
        let collections = vec![
            outstanding(calm, dec!(100), Duration::hours(5)),
            outstanding(calm, dec!(40), Duration::days(3)),
            outstanding(late, dec!(10), Duration::days(1)),
            outstanding(late, dec!(25), Duration::days(5)),
            outstanding(late, dec!(70), Duration::days(12)),
        ];
        let blocked: HashSet<AgentId> = [late].into_iter().collect();

        let report = AgingClassifier::classify(now(), &collections, &blocked);

        assert_eq!(report.buckets.len(), 2);
        let first = &report.buckets[0];
        assert_eq!(first.agent_id, late);
        assert!(first.is_blocked);
        assert_eq!(first.collection_count, 3);
        assert_eq!(first.oldest_collection_date, now() - Duration::days(12));
        assert_eq!(first.total_balance, dec!(105));

        let second = &report.buckets[1];
        assert_eq!(second.bucket_0_1, dec!(100));
        assert_eq!(second.bucket_2_3, dec!(40));
        assert!(!second.is_overdue());

        let summary = &report.summary;
        assert_eq!(summary.total_agents_with_balance, 2);
        assert_eq!(summary.total_outstanding_amount, dec!(245));
        assert_eq!(summary.overdue_agents_count, 1);
        assert_eq!(summary.warning_overdue_amount, dec!(25));
        assert_eq!(summary.critical_overdue_amount, dec!(70));
        assert_eq!(summary.blocked_agents_count, 1);
    }

    #[test]
    fn only_unblocked_overdue_agents_are_blocked() {
        let calm = AgentId::new();
        let late = AgentId::new();
        let already = AgentId::new();
        let collections = vec![
            outstanding(calm, dec!(100), Duration::days(3)),
            outstanding(late, dec!(25), Duration::days(4)),
            outstanding(already, dec!(70), Duration::days(12)),
        ];
        let blocked: HashSet<AgentId> = [already].into_iter().collect();

        let report = AgingClassifier::classify(now(), &collections, &blocked);

        assert_eq!(AgingClassifier::agents_to_block(&report), vec![late]);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = AgingClassifier::classify(now(), &[], &HashSet::new());
        assert!(report.buckets.is_empty());
        assert_eq!(report.summary.total_outstanding_amount, Decimal::ZERO);
    }

    #[test]
    fn single_agent_view() {
        let agent = AgentId::new();
        let other = AgentId::new();
        let collections = vec![
            outstanding(agent, dec!(5), Duration::days(6)),
            outstanding(other, dec!(9), Duration::days(1)),
        ];
        let row = AgingClassifier::for_agent(now(), agent, &collections, &HashSet::new()).unwrap();
        assert_eq!(row.bucket_4_7, dec!(5));
        assert!(AgingClassifier::for_agent(now(), AgentId::new(), &collections, &HashSet::new()).is_none());
    }
}
