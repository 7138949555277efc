//! Statement tests, including property checks of the accounting identity.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use codledger_shared::types::AccountId;

use super::error::ReportError;
use super::service::ReportService;
use super::types::AccountActivity;
use crate::ledger::{AccountSubtype, AccountType};

fn account(code: &str, account_type: AccountType, debit: Decimal, credit: Decimal) -> AccountActivity {
    AccountActivity {
        account_id: AccountId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
        subtype: None,
        normal_balance: account_type.natural_side(),
        total_debit: debit,
        total_credit: credit,
    }
}

fn cogs(code: &str, debit: Decimal) -> AccountActivity {
    AccountActivity {
        subtype: Some(AccountSubtype::CostOfGoodsSold),
        ..account(code, AccountType::Expense, debit, Decimal::ZERO)
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
}

#[test]
fn balance_sheet_includes_retained_earnings() {
    // Capital buys inventory 500, a sale brings in 1000 cash and consumes 400 of stock,
    // and 100 of commission is accrued.
    let activity = vec![
        account("1010", AccountType::Asset, dec!(1000), Decimal::ZERO),
        account("1200", AccountType::Asset, dec!(500), dec!(400)),
        account("2020", AccountType::Liability, Decimal::ZERO, dec!(100)),
        account("3000", AccountType::Equity, Decimal::ZERO, dec!(500)),
        account("4010", AccountType::Revenue, Decimal::ZERO, dec!(1000)),
        cogs("5010", dec!(400)),
        account("5040", AccountType::Expense, dec!(100), Decimal::ZERO),
    ];

    let sheet = ReportService::balance_sheet(day(30), &activity);

    assert_eq!(sheet.assets.total, dec!(1100));
    assert_eq!(sheet.liabilities.total, dec!(100));
    assert_eq!(sheet.equity.retained_earnings, dec!(500));
    assert_eq!(sheet.equity.total, dec!(1000));
    assert_eq!(sheet.total_liabilities_and_equity, dec!(1100));
    assert!(sheet.is_balanced);
    assert_eq!(sheet.assets.accounts[0].code, "1010");
}

#[test]
fn corrupted_line_is_surfaced_not_fixed() {
    let activity = vec![
        account("1010", AccountType::Asset, dec!(100.01), Decimal::ZERO),
        account("4010", AccountType::Revenue, Decimal::ZERO, dec!(100)),
    ];
    let sheet = ReportService::balance_sheet(day(1), &activity);
    assert!(!sheet.is_balanced);
    assert_eq!(sheet.assets.total, dec!(100.01));
    assert_eq!(sheet.total_liabilities_and_equity, dec!(100));
}

#[test]
fn empty_ledger_is_balanced() {
    let sheet = ReportService::balance_sheet(day(1), &[]);
    assert!(sheet.is_balanced);
    assert_eq!(sheet.assets.total, Decimal::ZERO);
}

#[test]
fn profit_and_loss_margins() {
    let activity = vec![
        account("4010", AccountType::Revenue, Decimal::ZERO, dec!(3000)),
        cogs("5010", dec!(1200)),
        account("5020", AccountType::Expense, dec!(300), Decimal::ZERO),
        account("5040", AccountType::Expense, dec!(150), Decimal::ZERO),
        account("1010", AccountType::Asset, dec!(9999), Decimal::ZERO),
    ];

    let pnl = ReportService::profit_and_loss(day(1), day(30), &activity).unwrap();

    assert_eq!(pnl.revenue.total, dec!(3000));
    assert_eq!(pnl.cogs.total, dec!(1200));
    assert_eq!(pnl.gross_profit, dec!(1800));
    assert_eq!(pnl.gross_margin_percentage, dec!(60));
    assert_eq!(pnl.expenses.total, dec!(450));
    assert_eq!(pnl.net_income, dec!(1350));
    assert_eq!(pnl.net_margin_percentage, dec!(45));
    assert_eq!(pnl.expenses.accounts.len(), 2);
}

#[test]
fn margins_are_zero_without_revenue() {
    let activity = vec![account("5020", AccountType::Expense, dec!(80), Decimal::ZERO)];
    let pnl = ReportService::profit_and_loss(day(1), day(2), &activity).unwrap();
    assert_eq!(pnl.net_income, dec!(-80));
    assert_eq!(pnl.gross_margin_percentage, Decimal::ZERO);
    assert_eq!(pnl.net_margin_percentage, Decimal::ZERO);
}

#[test]
fn margin_rounds_to_two_places() {
    assert_eq!(ReportService::margin(dec!(1), dec!(3)), dec!(33.33));
    assert_eq!(ReportService::margin(dec!(2), dec!(3)), dec!(66.67));
}

#[test]
fn rejects_inverted_range() {
    let err = ReportService::profit_and_loss(day(10), day(9), &[]).unwrap_err();
    assert!(matches!(err, ReportError::InvalidDateRange { .. }));
    assert_eq!(err.http_status_code(), 400);
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Indexes into a fixed chart: asset, asset, liability, equity, revenue, cogs, expense.
fn chart_index() -> impl Strategy<Value = usize> {
    0usize..7
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of balanced two-line postings yields a balanced sheet.
    #[test]
    fn balanced_postings_balance_the_sheet(
        postings in prop::collection::vec((chart_index(), chart_index(), amount()), 0..40)
    ) {
        let mut activity = vec![
            account("1010", AccountType::Asset, Decimal::ZERO, Decimal::ZERO),
            account("1020", AccountType::Asset, Decimal::ZERO, Decimal::ZERO),
            account("2010", AccountType::Liability, Decimal::ZERO, Decimal::ZERO),
            account("3000", AccountType::Equity, Decimal::ZERO, Decimal::ZERO),
            account("4010", AccountType::Revenue, Decimal::ZERO, Decimal::ZERO),
            cogs("5010", Decimal::ZERO),
            account("5020", AccountType::Expense, Decimal::ZERO, Decimal::ZERO),
        ];
        for (debit_idx, credit_idx, amount) in postings {
            activity[debit_idx].total_debit += amount;
            activity[credit_idx].total_credit += amount;
        }

        let sheet = ReportService::balance_sheet(day(15), &activity);
        prop_assert!(sheet.is_balanced);
        prop_assert_eq!(sheet.assets.total, sheet.total_liabilities_and_equity);
    }

    /// A one-sided change to any line breaks the identity.
    #[test]
    fn one_sided_change_unbalances(idx in chart_index(), amount in amount()) {
        let mut activity = vec![
            account("1010", AccountType::Asset, dec!(50), Decimal::ZERO),
            account("1020", AccountType::Asset, Decimal::ZERO, Decimal::ZERO),
            account("2010", AccountType::Liability, Decimal::ZERO, Decimal::ZERO),
            account("3000", AccountType::Equity, Decimal::ZERO, dec!(50)),
            account("4010", AccountType::Revenue, Decimal::ZERO, Decimal::ZERO),
            cogs("5010", Decimal::ZERO),
            account("5020", AccountType::Expense, Decimal::ZERO, Decimal::ZERO),
        ];
        activity[idx].total_debit += amount;
        let sheet = ReportService::balance_sheet(day(15), &activity);
        prop_assert!(!sheet.is_balanced);
    }

    /// P&L net income equals the retained earnings the balance sheet derives
    /// from the same activity.
    #[test]
    fn net_income_matches_retained_earnings(
        revenue in amount(), cost in amount(), expense in amount()
    ) {
        let activity = vec![
            account("4010", AccountType::Revenue, Decimal::ZERO, revenue),
            cogs("5010", cost),
            account("5020", AccountType::Expense, expense, Decimal::ZERO),
        ];
        let pnl = ReportService::profit_and_loss(day(1), day(30), &activity).unwrap();
        let sheet = ReportService::balance_sheet(day(30), &activity);
        prop_assert_eq!(pnl.net_income, sheet.equity.retained_earnings);
    }
}
