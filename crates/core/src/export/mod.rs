//! CSV rendering for ledger, aging and forecast exports.
//!
//! Each function renders a self-contained chunk so callers can stream large exports:
//! send the header once, then encode rows page by page.

use chrono::SecondsFormat;
use thiserror::Error;

use crate::aging::AgingReport;
use crate::cashflow::ForecastDay;
use crate::ledger::LedgerLineView;

/// Ledger export header.
pub const LEDGER_HEADER: [&str; 7] = [
    "Date",
    "Entry Number",
    "Description",
    "Memo",
    "Debit",
    "Credit",
    "Running Balance",
];

/// Aging export header.
pub const AGING_HEADER: [&str; 7] = [
    "Agent",
    "Total Balance",
    "0-1 Day",
    "2-3 Days",
    "4-7 Days",
    "8+ Days",
    "Oldest Collection",
];

/// Forecast export header.
pub const FORECAST_HEADER: [&str; 4] = [
    "Date",
    "Expected Collection",
    "Expected Expense",
    "Projected Balance",
];

/// Errors raised while rendering CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The CSV writer failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the buffer failed.
    #[error("CSV flush error: {0}")]
    Flush(String),
}

struct Chunk {
    writer: csv::Writer<Vec<u8>>,
}

impl Chunk {
    fn new() -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(Vec::new()),
        }
    }

    fn record<I, T>(&mut self, fields: I) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(fields)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.error().to_string()))
    }
}

/// Header line of the ledger export.
///
/// # Errors
///
/// Returns `ExportError` if the writer fails.
pub fn ledger_header() -> Result<Vec<u8>, ExportError> {
    let mut chunk = Chunk::new();
    chunk.record(LEDGER_HEADER)?;
    chunk.finish()
}

/// Ledger rows, no header.
///
/// # Errors
///
/// Returns `ExportError` if the writer fails.
pub fn ledger_rows(lines: &[LedgerLineView]) -> Result<Vec<u8>, ExportError> {
    let mut chunk = Chunk::new();
    for line in lines {
        chunk.record([
            line.entry_date.to_string(),
            line.entry_number.clone(),
            line.description.clone(),
            line.memo.clone().unwrap_or_default(),
            line.debit_amount.to_string(),
            line.credit_amount.to_string(),
            line.running_balance.to_string(),
        ])?;
    }
    chunk.finish()
}

/// Complete aging export.
///
/// # Errors
///
/// Returns `ExportError` if the writer fails.
pub fn aging_csv(report: &AgingReport) -> Result<Vec<u8>, ExportError> {
    let mut chunk = Chunk::new();
    chunk.record(AGING_HEADER)?;
    for row in &report.buckets {
        chunk.record([
            row.agent_id.to_string(),
            row.total_balance.to_string(),
            row.bucket_0_1.to_string(),
            row.bucket_2_3.to_string(),
            row.bucket_4_7.to_string(),
            row.bucket_8_plus.to_string(),
            row.oldest_collection_date
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ])?;
    }
    chunk.finish()
}

/// Complete forecast export.
///
/// # Errors
///
/// Returns `ExportError` if the writer fails.
pub fn forecast_csv(days: &[ForecastDay]) -> Result<Vec<u8>, ExportError> {
    let mut chunk = Chunk::new();
    chunk.record(FORECAST_HEADER)?;
    for day in days {
        chunk.record([
            day.date.to_string(),
            day.expected_collection.to_string(),
            day.expected_expense.to_string(),
            day.projected_balance.to_string(),
        ])?;
    }
    chunk.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aging::{AgingClassifier, OutstandingCollection};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use codledger_shared::types::{AgentId, JournalEntryId, LedgerLineId};

    #[test]
    fn ledger_chunks_concatenate() {
        let line = LedgerLineView {
            id: LedgerLineId::new(),
            journal_entry_id: JournalEntryId::new(),
            entry_number: "JE-20260102-00001".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            description: "Sale, cash".to_string(),
            memo: None,
            debit_amount: dec!(100.00),
            credit_amount: dec!(0),
            running_balance: dec!(100.00),
            account_version: 1,
        };

        let mut out = ledger_header().unwrap();
        out.extend(ledger_rows(std::slice::from_ref(&line)).unwrap());
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Date,Entry Number,Description,Memo,Debit,Credit,Running Balance\n\
             2026-01-02,JE-20260102-00001,\"Sale, cash\",,100.00,0,100.00\n"
        );
    }

    #[test]
    fn aging_export_has_fixed_header() {
        let now = Utc.with_ymd_and_hms(2026, 7, 20, 12, 0, 0).unwrap();
        let agent = AgentId::new();
        let report = AgingClassifier::classify(
            now,
            &[OutstandingCollection {
                agent_id: agent,
                amount: dec!(50),
                collection_date: Utc.with_ymd_and_hms(2026, 7, 11, 12, 0, 0).unwrap(),
            }],
            &HashSet::new(),
        );

        let text = String::from_utf8(aging_csv(&report).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Agent,Total Balance,0-1 Day,2-3 Days,4-7 Days,8+ Days,Oldest Collection")
        );
        assert_eq!(
            lines.next(),
            Some(format!("{agent},50,0,0,0,50,2026-07-11T12:00:00Z").as_str())
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn forecast_export_rows() {
        let days = vec![ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            expected_collection: dec!(1000),
            expected_expense: dec!(500),
            projected_balance: dec!(3500),
        }];
        let text = String::from_utf8(forecast_csv(&days).unwrap()).unwrap();
        assert_eq!(
            text,
            "Date,Expected Collection,Expected Expense,Projected Balance\n2026-02-01,1000,500,3500\n"
        );
    }
}
