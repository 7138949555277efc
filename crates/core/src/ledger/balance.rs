//! Running balance tracking per account.
//!
//! Every posted line records the account's version and balance before and after it.
//! For a fixed account, ordering lines by version replays the balance exactly:
//! `current[n] = previous[n] + change[n]` and `previous[n] = current[n - 1]`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance snapshot attached to a posted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Account version after this line (1 for the first line).
    pub account_version: i64,
    /// Balance before this line.
    pub previous_balance: Decimal,
    /// Balance after this line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// State of an account with nothing posted.
    #[must_use]
    pub const fn opening() -> Self {
        Self {
            account_version: 0,
            previous_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
        }
    }

    /// State of an account whose latest line left it at `version` / `balance`.
    #[must_use]
    pub const fn at(version: i64, balance: Decimal) -> Self {
        Self {
            account_version: version,
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// Snapshot after applying `change` on top of `self`.
    #[must_use]
    pub fn apply(&self, change: Decimal) -> Self {
        Self {
            account_version: self.account_version + 1,
            previous_balance: self.current_balance,
            current_balance: self.current_balance + change,
        }
    }

    /// Replays `changes` from an empty account.
    pub fn replay(changes: impl IntoIterator<Item = Decimal>) -> Vec<Self> {
        let mut state = Self::opening();
        changes
            .into_iter()
            .map(|change| {
                state = state.apply(change);
                state
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn first_line_starts_from_zero() {
        let rb = RunningBalance::opening().apply(dec!(100));
        assert_eq!(rb.account_version, 1);
        assert_eq!(rb.previous_balance, Decimal::ZERO);
        assert_eq!(rb.current_balance, dec!(100));
    }

    #[test]
    fn continues_from_stored_state() {
        let rb = RunningBalance::at(7, dec!(250.50)).apply(dec!(-50.50));
        assert_eq!(rb.account_version, 8);
        assert_eq!(rb.previous_balance, dec!(250.50));
        assert_eq!(rb.current_balance, dec!(200));
    }

    fn change() -> impl Strategy<Value = Decimal> {
        (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn consecutive_lines_chain(changes in prop::collection::vec(change(), 1..60)) {
            let chain = RunningBalance::replay(changes.iter().copied());
            for (i, rb) in chain.iter().enumerate() {
                prop_assert_eq!(rb.current_balance, rb.previous_balance + changes[i]);
                prop_assert_eq!(rb.account_version, i64::try_from(i).unwrap() + 1);
                if i > 0 {
                    prop_assert_eq!(rb.previous_balance, chain[i - 1].current_balance);
                }
            }
        }

        #[test]
        fn final_balance_is_sum(changes in prop::collection::vec(change(), 1..60)) {
            let chain = RunningBalance::replay(changes.iter().copied());
            let expected: Decimal = changes.iter().copied().sum();
            prop_assert_eq!(chain.last().map(|rb| rb.current_balance), Some(expected));
        }
    }
}
