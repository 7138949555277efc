//! Integration tests for statements built from posted entries.

mod common;

use codledger_core::ledger::{AccountSubtype, AccountType, JournalLineInput, PostEntryInput, SourceType};
use codledger_db::repositories::{JournalRepository, StatementRepository};
use common::{create_account, date, TestDb};
use rust_decimal_macros::dec;

fn pair(
    entry_date: chrono::NaiveDate,
    debit: uuid::Uuid,
    credit: uuid::Uuid,
    amount: rust_decimal::Decimal,
) -> PostEntryInput {
    PostEntryInput {
        entry_date,
        description: "Statement fixture".to_string(),
        source_type: SourceType::Manual,
        source_id: None,
        lines: vec![
            JournalLineInput::debit(debit.into(), amount),
            JournalLineInput::credit(credit.into(), amount),
        ],
    }
}

#[tokio::test]
async fn test_statements_from_posted_activity() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, Some(AccountSubtype::Cash)).await;
    let payable = create_account(db, "2010", "Payables", AccountType::Liability, None).await;
    let capital = create_account(db, "3010", "Capital", AccountType::Equity, Some(AccountSubtype::Capital)).await;
    let sales = create_account(db, "4010", "Sales", AccountType::Revenue, None).await;
    let cogs = create_account(
        db,
        "5010",
        "Cost of Goods Sold",
        AccountType::Expense,
        Some(AccountSubtype::CostOfGoodsSold),
    )
    .await;
    let rent = create_account(db, "5020", "Rent", AccountType::Expense, None).await;

    let journal = JournalRepository::new(db.clone());
    for input in [
        pair(date(2026, 1, 2), cash.id, capital.id, dec!(5000)),
        pair(date(2026, 1, 10), cash.id, sales.id, dec!(2000)),
        pair(date(2026, 1, 10), cogs.id, cash.id, dec!(800)),
        pair(date(2026, 1, 20), rent.id, payable.id, dec!(300)),
        pair(date(2026, 2, 5), cash.id, sales.id, dec!(1000)),
    ] {
        journal.post_entry(input).await.unwrap();
    }

    let statements = StatementRepository::new(db.clone());

    let sheet = statements.balance_sheet(date(2026, 1, 31)).await.unwrap();
    assert!(sheet.is_balanced);
    assert_eq!(sheet.assets.total, dec!(6200));
    assert_eq!(sheet.liabilities.total, dec!(300));
    assert_eq!(sheet.equity.retained_earnings, dec!(900));
    assert_eq!(sheet.total_liabilities_and_equity, dec!(6200));

    let pnl = statements.profit_and_loss(date(2026, 1, 1), date(2026, 1, 31)).await.unwrap();
    assert_eq!(pnl.revenue.total, dec!(2000));
    assert_eq!(pnl.cogs.total, dec!(800));
    assert_eq!(pnl.gross_profit, dec!(1200));
    assert_eq!(pnl.expenses.total, dec!(300));
    assert_eq!(pnl.net_income, dec!(900));

    let february = statements.profit_and_loss(date(2026, 2, 1), date(2026, 2, 28)).await.unwrap();
    assert_eq!(february.net_income, dec!(1000));

    let err = statements
        .profit_and_loss(date(2026, 2, 1), date(2026, 1, 1))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_DATE_RANGE");

    test.teardown().await;
}
