//! Running totals for batches and the file.
//!
//! # Invariants
//!
//! - File totals always equal the sum of the totals of all closed batches
//! - A rejected entry never touches any accumulator
//! - Entry hashes are written modulo 10^10; the raw sums are kept so that
//!   the file hash is the same whether it is folded from raw or truncated
//!   batch hashes

use crate::config::{ServiceClass, BLOCKING_FACTOR};
use crate::detail::{DetailRecord, Direction, TransactionCode};
use crate::error::{AchError, Result};
use crate::format::check_ascii;

/// Modulus applied to entry hashes before they are written.
pub const ENTRY_HASH_MODULUS: u64 = 10_000_000_000;

/// Largest amount that fits the 10-digit entry amount field.
pub const MAX_ENTRY_AMOUNT: u64 = 9_999_999_999;

/// Largest total that fits the 12-digit control total fields.
pub const MAX_TOTAL: u64 = 999_999_999_999;

/// Largest entry count of one batch (6-digit field).
pub const MAX_BATCH_ENTRIES: u64 = 999_999;

/// Largest entry count of the file (8-digit field).
pub const MAX_FILE_ENTRIES: u64 = 99_999_999;

/// Largest batch count of the file (6-digit field). Also bounds the 7-digit
/// batch number.
pub const MAX_BATCH_COUNT: u32 = 999_999;

/// Largest block count of the file (6-digit field).
pub const MAX_BLOCK_COUNT: u64 = 999_999;

/// Largest generated trace sequence (7 digits after the origin DFI).
pub const MAX_TRACE_SEQUENCE: u64 = 9_999_999;

/// Lines a batch adds besides its entries: header and control.
const BATCH_FRAME_LINES: u64 = 2;

/// An entry that passed validation, ready to be posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub code: TransactionCode,
    pub amount: u64,
    pub hash_contribution: u64,
}

impl ClassifiedEntry {
    pub fn direction(&self) -> Direction {
        self.code.direction()
    }
}

/// Returns the eight-digit DFI identification of a routing number, which
/// leaves out the check digit.
pub fn routing_prefix(routing: &str) -> Option<&str> {
    routing.get(..8)
}

/// Validates one entry against the batch's service class.
///
/// `index` is the entry's 0-based position in its batch, used in errors.
pub fn classify(
    record: &DetailRecord,
    index: usize,
    service_class: ServiceClass,
) -> Result<ClassifiedEntry> {
    if record.amount < 0 {
        return Err(AchError::NegativeAmount {
            index,
            amount: record.amount,
        });
    }
    let amount = record.amount as u64;
    if amount > MAX_ENTRY_AMOUNT {
        return Err(AchError::AmountOverflow);
    }

    let code = TransactionCode::try_from(record.transaction_code)
        .map_err(|code| AchError::UnsupportedTransactionCode { index, code })?;

    if !service_class.allows(code.direction()) {
        return Err(AchError::ServiceClassMismatch {
            index,
            code: code.code(),
            service_class: service_class.code(),
        });
    }

    check_ascii("customer_name", &record.customer_name)?;
    check_ascii("customer_account", &record.customer_account)?;
    check_ascii("bank_account", &record.bank_account)?;
    if let Some(trace) = &record.entry_trace {
        check_ascii("entry_trace", trace)?;
    }
    if let Some(data) = &record.discretionary {
        check_ascii("discretionary", data)?;
    }

    let routing = record.routing_number.as_str();
    let hash_contribution = routing_prefix(routing)
        .filter(|_| routing.len() == 9 && routing.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|prefix| prefix.parse::<u64>().ok())
        .ok_or_else(|| AchError::InvalidRoutingNumber {
            index,
            routing: record.routing_number.clone(),
        })?;

    Ok(ClassifiedEntry {
        code,
        amount,
        hash_contribution,
    })
}

fn checked_total(current: u64, amount: u64) -> Result<u64> {
    current
        .checked_add(amount)
        .filter(|total| *total <= MAX_TOTAL)
        .ok_or(AchError::AmountOverflow)
}

/// Totals of one batch, from its header to its control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchState {
    /// 1-based batch number within the file.
    pub batch_number: u32,
    pub entry_count: u64,
    /// Raw, untruncated sum of routing prefixes.
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
}

impl BatchState {
    /// Opens a batch with zeroed totals.
    pub fn new(batch_number: u32) -> Self {
        BatchState {
            batch_number,
            entry_count: 0,
            entry_hash: 0,
            total_debit: 0,
            total_credit: 0,
        }
    }

    /// Adds a validated entry to the batch totals.
    ///
    /// Fails without changing anything if a total or the entry count would
    /// exceed its field.
    pub fn post(&mut self, entry: &ClassifiedEntry) -> Result<()> {
        if self.entry_count >= MAX_BATCH_ENTRIES {
            return Err(AchError::CountOverflow {
                field: "batch entry count",
                limit: MAX_BATCH_ENTRIES,
            });
        }
        let (debit, credit) = match entry.direction() {
            Direction::Debit => (checked_total(self.total_debit, entry.amount)?, self.total_credit),
            Direction::Credit => (self.total_debit, checked_total(self.total_credit, entry.amount)?),
        };

        self.total_debit = debit;
        self.total_credit = credit;
        self.entry_count += 1;
        self.entry_hash += entry.hash_contribution;
        Ok(())
    }

    /// Entry hash as written in the batch control line.
    pub fn entry_hash_field(&self) -> u64 {
        self.entry_hash % ENTRY_HASH_MODULUS
    }
}

/// Totals across every batch of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileState {
    pub batch_count: u32,
    pub entry_count: u64,
    /// Raw, untruncated sum of routing prefixes.
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
    /// Lines emitted so far, headers and controls included.
    pub line_count: u64,
}

impl FileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the next batch will carry.
    pub fn next_batch_number(&self) -> u32 {
        self.batch_count + 1
    }

    /// Checks that folding `batch` in would keep the file totals and counts
    /// in range, file control line included.
    pub fn check_fold(&self, batch: &BatchState) -> Result<()> {
        checked_total(self.total_debit, batch.total_debit)?;
        checked_total(self.total_credit, batch.total_credit)?;

        if self.batch_count >= MAX_BATCH_COUNT {
            return Err(AchError::CountOverflow {
                field: "batch count",
                limit: u64::from(MAX_BATCH_COUNT),
            });
        }
        if self.entry_count + batch.entry_count > MAX_FILE_ENTRIES {
            return Err(AchError::CountOverflow {
                field: "file entry count",
                limit: MAX_FILE_ENTRIES,
            });
        }

        let lines = self.line_count + batch.entry_count + BATCH_FRAME_LINES + 1;
        if lines.div_ceil(BLOCKING_FACTOR) > MAX_BLOCK_COUNT {
            return Err(AchError::CountOverflow {
                field: "block count",
                limit: MAX_BLOCK_COUNT,
            });
        }
        Ok(())
    }

    /// Sequence number of a generated trace for the entry at `offset` in the
    /// batch about to be folded.
    pub fn trace_sequence(&self, offset: usize) -> Result<u64> {
        let sequence = self.entry_count + offset as u64 + 1;
        if sequence > MAX_TRACE_SEQUENCE {
            return Err(AchError::CountOverflow {
                field: "trace sequence",
                limit: MAX_TRACE_SEQUENCE,
            });
        }
        Ok(sequence)
    }

    /// Folds a closed batch into the file totals.
    pub fn fold(&mut self, batch: &BatchState) -> Result<()> {
        self.check_fold(batch)?;
        self.batch_count += 1;
        self.entry_count += batch.entry_count;
        self.entry_hash += batch.entry_hash;
        self.total_debit += batch.total_debit;
        self.total_credit += batch.total_credit;
        Ok(())
    }

    /// Entry hash as written in the file control line.
    pub fn entry_hash_field(&self) -> u64 {
        self.entry_hash % ENTRY_HASH_MODULUS
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }

    /// Blocks needed to hold `line_count` lines.
    pub fn block_count(&self, blocking_factor: u64) -> u64 {
        self.line_count.div_ceil(blocking_factor)
    }
}
