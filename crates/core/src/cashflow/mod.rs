//! Near-term cash position forecast from trailing averages.
//!
//! Day `i` of the horizon (1-based) projects
//! `seed + i * (avg_collection - avg_expense)`, where the averages are trailing-window
//! totals divided by the window length and the seed is cash in hand plus cash still held
//! by agents.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use codledger_shared::types::AgentId;

use crate::aging::AgingReport;

/// Longest forecast horizon accepted.
pub const MAX_HORIZON_DAYS: u32 = 365;

const AVERAGE_DP: u32 = 4;

/// Figures the forecast is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastInputs {
    /// Cash in hand account balance.
    pub cash_in_hand: Decimal,
    /// Unreconciled collections held by agents.
    pub agent_holdings: Decimal,
    /// Collections dated inside the trailing window.
    pub trailing_collections: Decimal,
    /// Expense postings dated inside the trailing window.
    pub trailing_expenses: Decimal,
    /// Trailing window length in days.
    pub lookback_days: u32,
}

impl ForecastInputs {
    /// Starting balance of the projection.
    #[must_use]
    pub fn seed(&self) -> Decimal {
        self.cash_in_hand + self.agent_holdings
    }

    /// Average daily collections over the window.
    #[must_use]
    pub fn average_collection(&self) -> Decimal {
        Self::daily(self.trailing_collections, self.lookback_days)
    }

    /// Average daily expenses over the window.
    #[must_use]
    pub fn average_expense(&self) -> Decimal {
        Self::daily(self.trailing_expenses, self.lookback_days)
    }

    fn daily(total: Decimal, days: u32) -> Decimal {
        if days == 0 {
            return Decimal::ZERO;
        }
        (total / Decimal::from(days)).round_dp(AVERAGE_DP)
    }
}

/// One projected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    /// The day.
    pub date: NaiveDate,
    /// Expected collections that day.
    pub expected_collection: Decimal,
    /// Expected expenses that day.
    pub expected_expense: Decimal,
    /// Projected cumulative cash position at end of day.
    pub projected_balance: Decimal,
}

/// Current cash position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowKpis {
    /// Cash in hand account balance.
    pub cash_in_hand: Decimal,
    /// Cash in transit account balance.
    pub cash_in_transit: Decimal,
    /// Receivable from agents account balance.
    pub ar_agents: Decimal,
    /// Unreconciled collections held by agents.
    pub agent_holdings: Decimal,
    /// Cash in hand, in transit and receivable from agents.
    pub total_cash_position: Decimal,
}

impl CashFlowKpis {
    /// Builds the KPIs from account balances and agent holdings.
    #[must_use]
    pub fn new(
        cash_in_hand: Decimal,
        cash_in_transit: Decimal,
        ar_agents: Decimal,
        agent_holdings: Decimal,
    ) -> Self {
        Self {
            cash_in_hand,
            cash_in_transit,
            ar_agents,
            agent_holdings,
            total_cash_position: cash_in_hand + cash_in_transit + ar_agents,
        }
    }
}

/// Cash held by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHolding {
    /// The agent.
    pub agent_id: AgentId,
    /// Amount held.
    pub amount: Decimal,
    /// Number of outstanding collections.
    pub collection_count: u32,
    /// Oldest outstanding collection.
    pub oldest_collection_date: DateTime<Utc>,
}

/// Cash flow report: position, forecast and per-agent holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowReport {
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
    /// Current position.
    pub kpis: CashFlowKpis,
    /// Day-by-day projection.
    pub forecast: Vec<ForecastDay>,
    /// Holdings by agent, largest first.
    pub agent_breakdown: Vec<AgentHolding>,
}

/// Builds forecasts.
pub struct CashFlowForecaster;

impl CashFlowForecaster {
    /// Projects `horizon_days` days starting the day after `today`.
    ///
    /// The horizon is clamped to `1..=MAX_HORIZON_DAYS`.
    #[must_use]
    pub fn forecast(today: NaiveDate, horizon_days: u32, inputs: &ForecastInputs) -> Vec<ForecastDay> {
        let horizon = horizon_days.clamp(1, MAX_HORIZON_DAYS);
        let seed = inputs.seed();
        let expected_collection = inputs.average_collection();
        let expected_expense = inputs.average_expense();
        let daily_net = expected_collection - expected_expense;

        (1..=horizon)
            .filter_map(|i| {
                let date = today.checked_add_days(Days::new(u64::from(i)))?;
                Some(ForecastDay {
                    date,
                    expected_collection,
                    expected_expense,
                    projected_balance: seed + daily_net * Decimal::from(i),
                })
            })
            .collect()
    }

    /// Per-agent holdings taken from an aging snapshot.
    #[must_use]
    pub fn agent_breakdown(aging: &AgingReport) -> Vec<AgentHolding> {
        let mut holdings: Vec<AgentHolding> = aging
            .buckets
            .iter()
            .map(|row| AgentHolding {
                agent_id: row.agent_id,
                amount: row.total_balance,
                collection_count: row.collection_count,
                oldest_collection_date: row.oldest_collection_date,
            })
            .collect();
        holdings.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.agent_id.cmp(&b.agent_id)));
        holdings
    }

    /// Assembles the full report.
    #[must_use]
    pub fn report(
        now: DateTime<Utc>,
        horizon_days: u32,
        kpis: CashFlowKpis,
        inputs: &ForecastInputs,
        aging: &AgingReport,
    ) -> CashFlowReport {
        CashFlowReport {
            generated_at: now,
            forecast: Self::forecast(now.date_naive(), horizon_days, inputs),
            agent_breakdown: Self::agent_breakdown(aging),
            kpis,
        }
    }
}
