//! Property tests for entry validation.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use codledger_shared::types::AccountId;

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountInfo, JournalLineInput, NormalBalance, PostEntryInput, SourceType};

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn chart(n: usize) -> HashMap<AccountId, AccountInfo> {
    (0..n)
        .map(|i| {
            let id = AccountId::new();
            let side = if i % 2 == 0 {
                NormalBalance::Debit
            } else {
                NormalBalance::Credit
            };
            (
                id,
                AccountInfo {
                    id,
                    code: format!("{}", 1000 + i),
                    normal_balance: side,
                    is_active: true,
                    last_entry_date: None,
                },
            )
        })
        .collect()
}

fn input(lines: Vec<JournalLineInput>) -> PostEntryInput {
    PostEntryInput {
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        description: "generated".to_string(),
        source_type: SourceType::Manual,
        source_id: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Debits split across several lines, balanced by a single credit, always validate.
    #[test]
    fn split_debits_with_matching_credit_validate(debits in prop::collection::vec(amount(), 1..8)) {
        let accounts = chart(debits.len() + 1);
        let ids: Vec<AccountId> = accounts.keys().copied().collect();
        let total: Decimal = debits.iter().copied().sum();

        let mut lines: Vec<JournalLineInput> = debits
            .iter()
            .zip(&ids)
            .map(|(amount, id)| JournalLineInput::debit(*id, *amount))
            .collect();
        lines.push(JournalLineInput::credit(ids[debits.len()], total));

        let validated = LedgerService::validate_entry(&input(lines), |id| accounts.get(&id).cloned());
        prop_assert!(validated.is_ok());
        let validated = validated.unwrap();
        prop_assert!(validated.totals.is_balanced());
        prop_assert_eq!(validated.totals.total_debit, total);
    }

    /// Any nonzero mismatch between sides is rejected as unbalanced.
    #[test]
    fn mismatched_sides_are_rejected(debit in amount(), credit in amount()) {
        prop_assume!(debit != credit);
        let accounts = chart(2);
        let ids: Vec<AccountId> = accounts.keys().copied().collect();
        let lines = vec![
            JournalLineInput::debit(ids[0], debit),
            JournalLineInput::credit(ids[1], credit),
        ];
        let result = LedgerService::validate_entry(&input(lines), |id| accounts.get(&id).cloned());
        let is_unbalanced = matches!(result, Err(LedgerError::Unbalanced { .. }));
        prop_assert!(is_unbalanced);
    }

    /// Sum of signed balance changes equals zero when debit and credit sides
    /// hit accounts of the same normal side.
    #[test]
    fn same_side_accounts_net_to_zero(amount in amount()) {
        let a = AccountId::new();
        let b = AccountId::new();
        let info = |id| AccountInfo {
            id,
            code: "1010".to_string(),
            normal_balance: NormalBalance::Debit,
            is_active: true,
            last_entry_date: None,
        };
        let lines = vec![JournalLineInput::debit(a, amount), JournalLineInput::credit(b, amount)];
        let validated = LedgerService::validate_entry(&input(lines), |id| Some(info(id))).unwrap();
        let net: Decimal = validated.lines.iter().map(|l| l.balance_change).sum();
        prop_assert_eq!(net, Decimal::ZERO);
    }
}
