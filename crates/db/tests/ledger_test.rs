//! Integration tests for journal posting and ledger queries.

#![allow(clippy::items_after_statements)]

mod common;

use codledger_core::ledger::{AccountType, JournalLineInput, LedgerError, PostEntryInput, SourceType};
use codledger_db::repositories::{
    AccountRepository, DateRange, JournalRepository, LedgerQueryRepository, LedgerStoreError,
};
use codledger_shared::types::{AccountId, PageRequest};
use common::{create_account, date, TestDb};
use futures::{StreamExt, TryStreamExt};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn entry(entry_date: chrono::NaiveDate, lines: Vec<JournalLineInput>) -> PostEntryInput {
    PostEntryInput {
        entry_date,
        description: "Test entry".to_string(),
        source_type: SourceType::Manual,
        source_id: None,
        lines,
    }
}

#[tokio::test]
async fn test_balanced_entry_posts_and_unbalanced_changes_nothing() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let revenue = create_account(db, "4010", "Sales", AccountType::Revenue, None).await;
    let journal = JournalRepository::new(db.clone());
    let accounts = AccountRepository::new(db.clone());

    let posted = journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash.id.into(), dec!(100)),
                JournalLineInput::credit(revenue.id.into(), dec!(100)),
            ],
        ))
        .await
        .expect("balanced entry posts");

    assert_eq!(posted.entry.total_amount, dec!(100));
    assert_eq!(posted.lines.len(), 2);
    assert_eq!(accounts.get(cash.id.into()).await.unwrap().current_balance, dec!(100));
    assert_eq!(accounts.get(revenue.id.into()).await.unwrap().current_balance, dec!(100));

    let err = journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash.id.into(), dec!(40)),
                JournalLineInput::credit(revenue.id.into(), dec!(60)),
            ],
        ))
        .await
        .expect_err("unbalanced entry is rejected");

    assert!(matches!(err, LedgerStoreError::Ledger(LedgerError::Unbalanced { .. })));
    assert_eq!(err.error_code(), "UNBALANCED_ENTRY");

    let cash_after = accounts.get(cash.id.into()).await.unwrap();
    assert_eq!(cash_after.current_balance, dec!(100));
    assert_eq!(cash_after.version, 1);
    assert_eq!(journal.last_sequence(date(2026, 3, 1)).await.unwrap(), Some(1));

    test.teardown().await;
}

#[tokio::test]
async fn test_sub_cent_amounts_are_rejected_before_storage() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let revenue = create_account(db, "4010", "Sales", AccountType::Revenue, None).await;
    let journal = JournalRepository::new(db.clone());
    let accounts = AccountRepository::new(db.clone());

    let err = journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash.id.into(), dec!(10.00004)),
                JournalLineInput::debit(cash.id.into(), dec!(10.00004)),
                JournalLineInput::credit(revenue.id.into(), dec!(20.00008)),
            ],
        ))
        .await
        .expect_err("five decimal places are rejected");
    assert_eq!(err.error_code(), "INVALID_LINE");
    assert!(matches!(
        err,
        LedgerStoreError::Ledger(LedgerError::InvalidLine { line: 0, .. })
    ));

    let err = journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash.id.into(), dec!(0.00001)),
                JournalLineInput::credit(revenue.id.into(), dec!(0.00001)),
            ],
        ))
        .await
        .expect_err("amounts below the smallest unit are rejected");
    assert_eq!(err.error_code(), "INVALID_LINE");

    let cash_after = accounts.get(cash.id.into()).await.unwrap();
    assert_eq!(cash_after.current_balance, Decimal::ZERO);
    assert_eq!(cash_after.version, 0);
    assert_eq!(journal.last_sequence(date(2026, 3, 1)).await.unwrap(), None);

    let posted = journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash.id.into(), dec!(10.0001)),
                JournalLineInput::debit(cash.id.into(), dec!(10.0001)),
                JournalLineInput::credit(revenue.id.into(), dec!(20.0002)),
            ],
        ))
        .await
        .expect("four decimal places post");
    let debits: Decimal = posted.lines.iter().map(|l| l.debit_amount).sum();
    let credits: Decimal = posted.lines.iter().map(|l| l.credit_amount).sum();
    assert_eq!(debits, credits);

    test.teardown().await;
}

#[tokio::test]
async fn test_entry_numbers_are_sequential_per_date() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let capital = create_account(db, "3010", "Capital", AccountType::Equity, None).await;
    let journal = JournalRepository::new(db.clone());

    let lines = || {
        vec![
            JournalLineInput::debit(cash.id.into(), dec!(10)),
            JournalLineInput::credit(capital.id.into(), dec!(10)),
        ]
    };

    let first = journal.post_entry(entry(date(2026, 3, 2), lines())).await.unwrap();
    let second = journal.post_entry(entry(date(2026, 3, 2), lines())).await.unwrap();
    let next_day = journal.post_entry(entry(date(2026, 3, 3), lines())).await.unwrap();

    assert_eq!(first.entry.entry_number, "JE-20260302-00001");
    assert_eq!(second.entry.entry_number, "JE-20260302-00002");
    assert_eq!(next_day.entry.entry_number, "JE-20260303-00001");

    test.teardown().await;
}

#[tokio::test]
async fn test_backdated_entry_is_rejected() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let capital = create_account(db, "3010", "Capital", AccountType::Equity, None).await;
    let journal = JournalRepository::new(db.clone());

    let lines = || {
        vec![
            JournalLineInput::debit(cash.id.into(), dec!(5)),
            JournalLineInput::credit(capital.id.into(), dec!(5)),
        ]
    };

    journal.post_entry(entry(date(2026, 3, 10), lines())).await.unwrap();
    let err = journal
        .post_entry(entry(date(2026, 3, 9), lines()))
        .await
        .expect_err("entry dated before the account's last entry");

    assert!(matches!(err, LedgerStoreError::Ledger(LedgerError::BackdatedEntry { .. })));

    test.teardown().await;
}

#[tokio::test]
async fn test_running_balance_and_balance_as_of() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let expense = create_account(db, "5010", "Rent", AccountType::Expense, None).await;
    let capital = create_account(db, "3010", "Capital", AccountType::Equity, None).await;
    let journal = JournalRepository::new(db.clone());
    let ledger = LedgerQueryRepository::new(db.clone());
    let cash_id: AccountId = cash.id.into();

    journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash_id, dec!(1000)),
                JournalLineInput::credit(capital.id.into(), dec!(1000)),
            ],
        ))
        .await
        .unwrap();
    journal
        .post_entry(entry(
            date(2026, 3, 5),
            vec![
                JournalLineInput::debit(expense.id.into(), dec!(250)),
                JournalLineInput::credit(cash_id, dec!(250)),
            ],
        ))
        .await
        .unwrap();

    let view = ledger
        .get_ledger(cash_id, DateRange::default(), PageRequest::default())
        .await
        .unwrap();

    let balances: Vec<Decimal> = view.transactions.data.iter().map(|l| l.running_balance).collect();
    assert_eq!(balances, vec![dec!(1000), dec!(750)]);
    let versions: Vec<i64> = view.transactions.data.iter().map(|l| l.account_version).collect();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(view.transactions.pagination.total, 2);

    assert_eq!(ledger.balance_as_of(cash_id, date(2026, 2, 28)).await.unwrap(), Decimal::ZERO);
    assert_eq!(ledger.balance_as_of(cash_id, date(2026, 3, 4)).await.unwrap(), dec!(1000));
    assert_eq!(ledger.balance_as_of(cash_id, date(2026, 3, 31)).await.unwrap(), dec!(750));

    let march_fifth = ledger
        .get_ledger(
            cash_id,
            DateRange { start: Some(date(2026, 3, 5)), end: None },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(march_fifth.transactions.data.len(), 1);
    assert_eq!(march_fifth.transactions.data[0].credit_amount, dec!(250));

    test.teardown().await;
}

#[tokio::test]
async fn test_reversal_restores_balances() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let revenue = create_account(db, "4010", "Sales", AccountType::Revenue, None).await;
    let journal = JournalRepository::new(db.clone());
    let accounts = AccountRepository::new(db.clone());

    let original = journal
        .post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash.id.into(), dec!(80)),
                JournalLineInput::credit(revenue.id.into(), dec!(80)),
            ],
        ))
        .await
        .unwrap();

    let reversal = journal
        .reverse_entry(original.entry.id.into(), date(2026, 3, 2), None)
        .await
        .unwrap();

    assert_eq!(reversal.entry.source_id, Some(original.entry.id));
    assert_eq!(accounts.get(cash.id.into()).await.unwrap().current_balance, Decimal::ZERO);
    assert_eq!(accounts.get(revenue.id.into()).await.unwrap().current_balance, Decimal::ZERO);

    test.teardown().await;
}

#[tokio::test]
async fn test_concurrent_postings_keep_balance_and_versions_consistent() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let revenue = create_account(db, "4010", "Sales", AccountType::Revenue, None).await;
    let journal = JournalRepository::new(db.clone());
    let cash_id: AccountId = cash.id.into();

    const POSTINGS: usize = 40;
    let results = futures::future::join_all((0..POSTINGS).map(|_| {
        journal.post_entry(entry(
            date(2026, 3, 1),
            vec![
                JournalLineInput::debit(cash_id, dec!(2.50)),
                JournalLineInput::credit(revenue.id.into(), dec!(2.50)),
            ],
        ))
    }))
    .await;
    assert!(results.iter().all(Result::is_ok));

    let account = AccountRepository::new(db.clone()).get(cash_id).await.unwrap();
    assert_eq!(account.current_balance, dec!(100.00));
    assert_eq!(account.version, i64::try_from(POSTINGS).unwrap());

    let view = LedgerQueryRepository::new(db.clone())
        .get_ledger(cash_id, DateRange::default(), PageRequest { page: 1, page_size: 100 })
        .await
        .unwrap();
    for (index, line) in view.transactions.data.iter().enumerate() {
        let version = i64::try_from(index + 1).unwrap();
        assert_eq!(line.account_version, version);
        assert_eq!(line.running_balance, dec!(2.50) * Decimal::from(version));
    }

    test.teardown().await;
}

#[tokio::test]
async fn test_export_streams_header_and_every_line() {
    let Some(test) = TestDb::setup().await else { return };
    let db = &test.db;

    let cash = create_account(db, "1010", "Cash", AccountType::Asset, None).await;
    let capital = create_account(db, "3010", "Capital", AccountType::Equity, None).await;
    let journal = JournalRepository::new(db.clone());

    for day in 1..=3 {
        journal
            .post_entry(entry(
                date(2026, 3, day),
                vec![
                    JournalLineInput::debit(cash.id.into(), dec!(10)),
                    JournalLineInput::credit(capital.id.into(), dec!(10)),
                ],
            ))
            .await
            .unwrap();
    }

    let chunks: Vec<Vec<u8>> = LedgerQueryRepository::new(db.clone())
        .export_ledger(cash.id.into(), DateRange::default())
        .await
        .unwrap()
        .boxed()
        .try_collect()
        .await
        .unwrap();

    let csv = String::from_utf8(chunks.concat()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Date,"));
    assert!(lines[3].contains("JE-20260303-00001"));

    test.teardown().await;
}

#[tokio::test]
async fn test_export_of_unknown_account_fails_before_streaming() {
    let Some(test) = TestDb::setup().await else { return };

    let result = LedgerQueryRepository::new(test.db.clone())
        .export_ledger(AccountId::new(), DateRange::default())
        .await;
    assert!(matches!(result, Err(LedgerStoreError::Ledger(LedgerError::AccountNotFound(_)))));

    test.teardown().await;
}
