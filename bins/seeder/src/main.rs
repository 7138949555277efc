//! Database seeder for codledger.
//!
//! Seeds the chart of accounts the collection flow and the order lifecycle post
//! against. Existing codes are left untouched, so the seeder can be re-run.
//!
//! Usage: cargo run --bin seeder

use codledger_core::ledger::{AccountSubtype, AccountType, LedgerError};
use codledger_db::repositories::{AccountRepository, CreateAccountInput, LedgerStoreError};

/// `(code, name, type, subtype)` of every seeded account.
const CHART_OF_ACCOUNTS: &[(&str, &str, AccountType, Option<AccountSubtype>)] = &[
    ("1010", "Cash in Hand", AccountType::Asset, Some(AccountSubtype::Cash)),
    ("1015", "Cash in Transit", AccountType::Asset, Some(AccountSubtype::Cash)),
    ("1020", "Accounts Receivable - Delivery Agents", AccountType::Asset, Some(AccountSubtype::Receivable)),
    ("1200", "Inventory", AccountType::Asset, Some(AccountSubtype::Inventory)),
    ("2010", "Refund Liability", AccountType::Liability, Some(AccountSubtype::CurrentLiability)),
    ("2020", "Commissions Payable", AccountType::Liability, Some(AccountSubtype::CurrentLiability)),
    ("3010", "Owner's Capital", AccountType::Equity, Some(AccountSubtype::Capital)),
    ("4010", "Product Revenue", AccountType::Revenue, Some(AccountSubtype::OperatingRevenue)),
    ("5010", "Cost of Goods Sold", AccountType::Expense, Some(AccountSubtype::CostOfGoodsSold)),
    ("5020", "Failed Delivery Expense", AccountType::Expense, Some(AccountSubtype::OperatingExpense)),
    ("5030", "Return Processing Expense", AccountType::Expense, Some(AccountSubtype::OperatingExpense)),
    ("5040", "Delivery Agent Commission", AccountType::Expense, Some(AccountSubtype::OperatingExpense)),
    ("5050", "Sales Rep Commission", AccountType::Expense, Some(AccountSubtype::OperatingExpense)),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => codledger_shared::AppConfig::load()?.database.url,
    };

    println!("Connecting to database...");
    let db = codledger_db::connect(&database_url).await?;
    let accounts = AccountRepository::new(db);

    println!("Seeding chart of accounts...");
    let mut created = 0;
    for &(code, name, account_type, subtype) in CHART_OF_ACCOUNTS {
        let input = CreateAccountInput {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            account_type,
            account_subtype: subtype,
            normal_balance: account_type.natural_side(),
        };

        match accounts.create(input).await {
            Ok(_) => {
                created += 1;
                println!("  Created {code} {name}");
            }
            Err(LedgerStoreError::Ledger(LedgerError::DuplicateAccountCode(_))) => {
                println!("  {code} already exists, skipping...");
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("Seeding complete! {created} account(s) created.");
    Ok(())
}
