//! Detail (entry) records supplied by the caller, and CSV ingestion of them.

use crate::error::{AchError, Result};
use crate::money::parse_dollars;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;
use std::io::Read;

/// Direction of money movement for an entry, from the receiver's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

/// Supported entry transaction codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionCode {
    /// 22: deposit to checking.
    CheckingCredit,
    /// 27: debit from checking.
    CheckingDebit,
    /// 32: deposit to savings.
    SavingsCredit,
    /// 37: debit from savings.
    SavingsDebit,
}

impl TransactionCode {
    pub fn code(self) -> u16 {
        match self {
            TransactionCode::CheckingCredit => 22,
            TransactionCode::CheckingDebit => 27,
            TransactionCode::SavingsCredit => 32,
            TransactionCode::SavingsDebit => 37,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            TransactionCode::CheckingCredit | TransactionCode::SavingsCredit => Direction::Credit,
            TransactionCode::CheckingDebit | TransactionCode::SavingsDebit => Direction::Debit,
        }
    }
}

impl TryFrom<u16> for TransactionCode {
    type Error = u16;

    fn try_from(code: u16) -> std::result::Result<Self, Self::Error> {
        match code {
            22 => Ok(TransactionCode::CheckingCredit),
            27 => Ok(TransactionCode::CheckingDebit),
            32 => Ok(TransactionCode::SavingsCredit),
            37 => Ok(TransactionCode::SavingsDebit),
            other => Err(other),
        }
    }
}

/// One transaction to be written as an entry detail line.
///
/// The transaction code is kept raw so that unsupported codes are reported
/// by the builder with the entry's position in its batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    /// Receiver name (22 characters on the wire).
    pub customer_name: String,

    /// Receiver's identification number at the originator (15 characters).
    pub customer_account: String,

    /// Amount in cents. Must not be negative.
    pub amount: i64,

    /// Nine-digit routing number of the receiving bank, check digit included.
    pub routing_number: String,

    /// Receiver's account number at the receiving bank (17 characters).
    pub bank_account: String,

    /// One of 22, 27, 32, 37.
    pub transaction_code: u16,

    /// Trace number; generated from the origin DFI and entry sequence when absent.
    pub entry_trace: Option<String>,

    /// Two-character discretionary data, blank when absent.
    pub discretionary: Option<String>,
}

impl DetailRecord {
    pub fn new(
        customer_name: impl Into<String>,
        customer_account: impl Into<String>,
        amount: i64,
        routing_number: impl Into<String>,
        bank_account: impl Into<String>,
        transaction_code: u16,
    ) -> Self {
        DetailRecord {
            customer_name: customer_name.into(),
            customer_account: customer_account.into(),
            amount,
            routing_number: routing_number.into(),
            bank_account: bank_account.into(),
            transaction_code,
            entry_trace: None,
            discretionary: None,
        }
    }

    pub fn with_entry_trace(mut self, trace: impl Into<String>) -> Self {
        self.entry_trace = Some(trace.into());
        self
    }

    pub fn with_discretionary(mut self, data: impl Into<String>) -> Self {
        self.discretionary = Some(data.into());
        self
    }
}

/// Raw detail row as read from CSV.
///
/// `amount` is a dollar amount such as `25.01`.
#[derive(Debug, Deserialize)]
pub struct DetailRow {
    pub customer_name: String,
    pub customer_account: String,
    pub amount: String,
    pub routing_number: String,
    pub bank_account: String,
    pub transaction_code: u16,
    #[serde(default)]
    pub entry_trace: Option<String>,
}

impl DetailRow {
    /// Converts the row into a [`DetailRecord`], parsing the dollar amount.
    pub fn parse(self, row: usize) -> Result<DetailRecord> {
        let amount = parse_dollars(&self.amount)
            .map_err(|message| AchError::InvalidRecord { row, message })?;

        let entry_trace = self
            .entry_trace
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(DetailRecord {
            customer_name: self.customer_name,
            customer_account: self.customer_account,
            amount,
            routing_number: self.routing_number,
            bank_account: self.bank_account,
            transaction_code: self.transaction_code,
            entry_trace,
            discretionary: None,
        })
    }
}

/// Reads detail records from CSV with a header row.
///
/// Any unreadable row fails the whole read: dropping a payment would leave
/// the caller with a file that silently disagrees with its input.
pub fn read_detail_records<R: Read>(reader: R) -> Result<Vec<DetailRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_idx, result) in csv_reader.deserialize::<DetailRow>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row
        let record = result?.parse(row_num)?;
        debug!(
            "Row {}: read entry for {} ({} cents, code {})",
            row_num, record.customer_name, record.amount, record.transaction_code
        );
        records.push(record);
    }

    Ok(records)
}
