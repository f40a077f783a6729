//! File builder: sequences header, batch and control lines.
//!
//! The builder is a small state machine. Each operation checks the current
//! [`FileStage`] and fails with [`AchError::OutOfOrder`] instead of writing a
//! line in the wrong place. Batches are atomic: every entry is validated and
//! every line assembled before anything is appended or any total changes.

use crate::accountant::{classify, BatchState, FileState};
use crate::config::{
    parse_date, FileConfig, ServiceClass, Settings, BLOCKING_FACTOR, DATE_FORMAT, FORMAT_CODE,
    PRIORITY_CODE,
};
use crate::detail::DetailRecord;
use crate::error::{AchError, Result};
use crate::money::format_cents;
use crate::record::{
    assemble, BatchControlFields, BatchHeaderFields, EntryDetailFields, FileControlFields,
    FileHeaderFields,
};
use crate::schema::{validate_definitions, RECORD_SIZE};
use log::{debug, info};
use std::fmt;

/// Position of a file build in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    /// Nothing written yet.
    Empty,
    /// File header written, no batch yet.
    HeaderWritten,
    /// At least one batch written and closed.
    BatchClosed,
    /// File control written; no further lines accepted.
    Finalized,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Empty => "empty",
            FileStage::HeaderWritten => "awaiting first batch",
            FileStage::BatchClosed => "between batches",
            FileStage::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Per-batch overrides of the file configuration.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub service_class: Option<ServiceClass>,
    pub entry_description: Option<String>,
    /// Company discretionary data (20 characters).
    pub company_note: Option<String>,
    /// Effective entry date as `YYMMDD`.
    pub effective_date: Option<String>,
}

/// Builds one ACH file line by line.
///
/// # Example
///
/// ```
/// use ach_writer::{AchFileBuilder, DetailRecord, FileConfig};
///
/// let config = FileConfig::new(
///     "1234567890", "ACME CORP", "123123123", "DEST BANK", "12312311", "ORIGIN BANK",
/// );
/// let mut builder = AchFileBuilder::new(config).unwrap();
/// builder.make_file_header_record().unwrap();
/// builder
///     .make_batch(&[
///         DetailRecord::new("Alice", "C-1", 2501, "010010101", "111", 32),
///         DetailRecord::new("Bob", "C-2", 2501, "010010401", "222", 27),
///     ])
///     .unwrap();
/// builder.make_file_control_record().unwrap();
///
/// let file = builder.render().unwrap();
/// assert!(file.lines().all(|line| line.len() == 94));
/// ```
pub struct AchFileBuilder {
    settings: Settings,
    stage: FileStage,
    totals: FileState,
    lines: Vec<String>,
}

impl AchFileBuilder {
    /// Validates the configuration and record layouts, and creates an empty builder.
    pub fn new(config: FileConfig) -> Result<Self> {
        validate_definitions()?;
        let settings = config.validate()?;
        debug!(
            "Builder created for company {} ({} -> {})",
            settings.company_id, settings.origination_routing, settings.destination_routing
        );

        Ok(AchFileBuilder {
            settings,
            stage: FileStage::Empty,
            totals: FileState::new(),
            lines: Vec::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stage(&self) -> FileStage {
        self.stage
    }

    /// File-scope totals accumulated so far.
    pub fn file_totals(&self) -> FileState {
        self.totals
    }

    fn expect_stage(&self, operation: &'static str, allowed: &[FileStage]) -> Result<()> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(AchError::OutOfOrder {
                operation,
                stage: self.stage,
            })
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push(line);
        self.totals.line_count += 1;
    }

    /// Writes the file header line.
    pub fn make_file_header_record(&mut self) -> Result<()> {
        self.expect_stage("write file header", &[FileStage::Empty])?;

        let s = &self.settings;
        let header = FileHeaderFields {
            priority_code: PRIORITY_CODE,
            // leading blank, then the routing number
            immediate_destination: format!(" {}", s.destination_routing),
            immediate_origin: format!(" {}", s.origination_routing),
            creation_date: s.created_at.format(DATE_FORMAT).to_string(),
            creation_time: s.created_at.format("%H%M").to_string(),
            file_id_modifier: s.file_id_modifier,
            record_size: RECORD_SIZE,
            blocking_factor: BLOCKING_FACTOR,
            format_code: FORMAT_CODE,
            destination_name: s.destination_name.clone(),
            origin_name: s.origination_name.clone(),
            reference_code: s.reference_code.clone(),
        };

        let line = assemble(&header)?;
        self.push_line(line);
        self.stage = FileStage::HeaderWritten;
        debug!("File header written");
        Ok(())
    }

    /// Writes one batch using the file's default batch settings.
    pub fn make_batch(&mut self, records: &[DetailRecord]) -> Result<BatchState> {
        self.make_batch_with(records, &BatchOptions::default())
    }

    /// Writes one batch: a header, one detail line per record, and a control line.
    ///
    /// Returns the closed batch's totals. On error nothing is written and no
    /// total changes.
    pub fn make_batch_with(
        &mut self,
        records: &[DetailRecord],
        options: &BatchOptions,
    ) -> Result<BatchState> {
        self.expect_stage(
            "write batch",
            &[FileStage::HeaderWritten, FileStage::BatchClosed],
        )?;

        if records.is_empty() {
            return Err(AchError::EmptyBatch);
        }

        let service_class = options.service_class.unwrap_or(self.settings.service_class);
        let effective_date = match &options.effective_date {
            Some(date) => parse_date("effective date", date)?,
            None => self.settings.effective_date,
        };

        let entries = records
            .iter()
            .enumerate()
            .map(|(index, record)| classify(record, index, service_class))
            .collect::<Result<Vec<_>>>()?;

        let mut batch = BatchState::new(self.totals.next_batch_number());
        for entry in &entries {
            batch.post(entry)?;
        }
        self.totals.check_fold(&batch)?;

        let s = &self.settings;
        let mut lines = Vec::with_capacity(records.len() + 2);

        lines.push(assemble(&BatchHeaderFields {
            service_class_code: service_class.code(),
            company_name: s.company_name.clone(),
            company_note: options.company_note.clone().unwrap_or_default(),
            company_id: s.company_id.clone(),
            entry_class_code: s.entry_class_code.clone(),
            entry_description: options
                .entry_description
                .clone()
                .unwrap_or_else(|| s.entry_description.clone()),
            descriptive_date: s.created_at.format(DATE_FORMAT).to_string(),
            effective_date: effective_date.format(DATE_FORMAT).to_string(),
            origin_dfi: s.origin_dfi.clone(),
            batch_number: batch.batch_number,
        })?);

        for (offset, (record, entry)) in records.iter().zip(&entries).enumerate() {
            let trace_number = match &record.entry_trace {
                Some(trace) => trace.clone(),
                None => format!("{}{:07}", s.origin_dfi, self.totals.trace_sequence(offset)?),
            };

            lines.push(assemble(&EntryDetailFields {
                transaction_code: entry.code.code(),
                routing_number: record.routing_number.clone(),
                bank_account: record.bank_account.clone(),
                amount: entry.amount,
                customer_account: record.customer_account.clone(),
                customer_name: record.customer_name.clone(),
                discretionary: record.discretionary.clone().unwrap_or_default(),
                trace_number,
            })?);
        }

        lines.push(assemble(&BatchControlFields {
            service_class_code: service_class.code(),
            entry_count: batch.entry_count,
            entry_hash: batch.entry_hash_field(),
            total_debit: batch.total_debit,
            total_credit: batch.total_credit,
            company_id: s.company_id.clone(),
            origin_dfi: s.origin_dfi.clone(),
            batch_number: batch.batch_number,
        })?);

        self.totals.fold(&batch)?;
        for line in lines {
            self.push_line(line);
        }
        self.stage = FileStage::BatchClosed;

        debug!(
            "Batch {} closed: {} entries, debit {}, credit {}, hash {}",
            batch.batch_number,
            batch.entry_count,
            format_cents(batch.total_debit),
            format_cents(batch.total_credit),
            batch.entry_hash_field()
        );
        Ok(batch)
    }

    /// Writes the file control line and closes the file.
    ///
    /// Fails if total debits and total credits differ; an unbalanced file is
    /// never finalized.
    pub fn make_file_control_record(&mut self) -> Result<()> {
        self.expect_stage("write file control", &[FileStage::BatchClosed])?;

        if !self.totals.is_balanced() {
            return Err(AchError::Unbalanced {
                debit: self.totals.total_debit,
                credit: self.totals.total_credit,
            });
        }

        let mut counted = self.totals;
        counted.line_count += 1;
        let block_count = counted.block_count(BLOCKING_FACTOR);

        let line = assemble(&FileControlFields {
            batch_count: self.totals.batch_count,
            block_count,
            entry_count: self.totals.entry_count,
            entry_hash: self.totals.entry_hash_field(),
            total_debit: self.totals.total_debit,
            total_credit: self.totals.total_credit,
        })?;
        self.push_line(line);

        if self.settings.pad_blocks {
            while self.totals.line_count % BLOCKING_FACTOR != 0 {
                self.push_line("9".repeat(RECORD_SIZE));
            }
        }

        self.stage = FileStage::Finalized;
        info!(
            "File finalized: {} batches, {} entries, {} blocks, debit/credit {}",
            self.totals.batch_count,
            self.totals.entry_count,
            block_count,
            format_cents(self.totals.total_debit)
        );
        Ok(())
    }

    /// Returns every line written so far, joined by newlines.
    pub fn render(&self) -> Result<String> {
        self.expect_stage(
            "render file",
            &[
                FileStage::HeaderWritten,
                FileStage::BatchClosed,
                FileStage::Finalized,
            ],
        )?;
        Ok(self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> FileConfig {
        FileConfig::new(
            "1234567890",
            "ACME CORP",
            "123123123",
            "DEST BANK",
            "12312311",
            "ORIGIN BANK",
        )
        .with_created_at(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
        )
    }

    fn balanced_pair() -> Vec<DetailRecord> {
        vec![
            DetailRecord::new("Alice", "C-1", 2501, "010010101", "111", 32),
            DetailRecord::new("Bob", "C-2", 2501, "010010401", "222", 27),
        ]
    }

    fn started() -> AchFileBuilder {
        let mut builder = AchFileBuilder::new(config()).unwrap();
        builder.make_file_header_record().unwrap();
        builder
    }

    #[test]
    fn test_file_header_line() {
        let builder = started();
        let out = builder.render().unwrap();
        assert_eq!(out.len(), RECORD_SIZE);
        assert_eq!(&out[0..3], "101");
        assert_eq!(&out[3..13], " 123123123");
        assert_eq!(&out[13..23], "  12312311");
        assert_eq!(&out[23..29], "240309");
        assert_eq!(&out[29..33], "1405");
        assert_eq!(&out[33..40], "A094101");
        assert_eq!(&out[40..63], "DEST BANK              ");
        assert_eq!(&out[63..86], "ORIGIN BANK            ");
        assert_eq!(&out[86..94], "        ");
    }

    #[test]
    fn test_header_twice_is_usage_error() {
        let mut builder = started();
        let err = builder.make_file_header_record().unwrap_err();
        assert!(matches!(
            err,
            AchError::OutOfOrder {
                stage: FileStage::HeaderWritten,
                ..
            }
        ));
    }

    #[test]
    fn test_batch_before_header_is_usage_error() {
        let mut builder = AchFileBuilder::new(config()).unwrap();
        assert!(matches!(
            builder.make_batch(&balanced_pair()),
            Err(AchError::OutOfOrder { .. })
        ));
        assert!(matches!(builder.render(), Err(AchError::OutOfOrder { .. })));
    }

    #[test]
    fn test_control_before_batch_is_usage_error() {
        let mut builder = started();
        assert!(matches!(
            builder.make_file_control_record(),
            Err(AchError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_batch_header_line() {
        let mut builder = started();
        builder.make_batch(&balanced_pair()).unwrap();
        let out = builder.render().unwrap();
        let header = out.lines().nth(1).unwrap();
        assert_eq!(&header[0..4], "5200");
        assert_eq!(&header[4..20], "ACME CORP       ");
        assert_eq!(&header[40..50], "1234567890");
        assert_eq!(&header[50..53], "PPD");
        assert_eq!(&header[53..63], "PAYMENT   ");
        assert_eq!(&header[63..69], "240309");
        assert_eq!(&header[69..75], "240310");
        assert_eq!(&header[75..79], "   1");
        assert_eq!(&header[79..87], "12312311");
        assert_eq!(&header[87..94], "0000001");
    }

    #[test]
    fn test_generated_trace_numbers_continue_across_batches() {
        let mut builder = started();
        builder.make_batch(&balanced_pair()).unwrap();
        builder.make_batch(&balanced_pair()).unwrap();
        let out = builder.render().unwrap();
        let traces: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with('6'))
            .map(|l| &l[79..94])
            .collect();
        assert_eq!(
            traces,
            vec![
                "123123110000001",
                "123123110000002",
                "123123110000003",
                "123123110000004"
            ]
        );
    }

    #[test]
    fn test_caller_trace_is_kept() {
        let mut builder = started();
        let records = vec![
            DetailRecord::new("Alice", "C-1", 5, "010010101", "111", 22)
                .with_entry_trace("999999990000042"),
            DetailRecord::new("Bob", "C-2", 5, "010010401", "222", 37),
        ];
        builder.make_batch(&records).unwrap();
        let out = builder.render().unwrap();
        let first_detail = out.lines().nth(2).unwrap();
        assert_eq!(&first_detail[79..94], "999999990000042");
    }

    #[test]
    fn test_failed_batch_leaves_builder_untouched() {
        let mut builder = started();
        let before = builder.render().unwrap();
        let records = vec![
            DetailRecord::new("Alice", "C-1", 5, "010010101", "111", 22),
            DetailRecord::new("Bob", "C-2", 5, "010010401", "222", 99),
        ];
        assert!(matches!(
            builder.make_batch(&records),
            Err(AchError::UnsupportedTransactionCode { index: 1, code: 99 })
        ));
        assert_eq!(builder.render().unwrap(), before);
        assert_eq!(builder.file_totals(), {
            let mut expected = FileState::new();
            expected.line_count = 1;
            expected
        });
        assert_eq!(builder.stage(), FileStage::HeaderWritten);

        // the next good batch still gets number 1
        let batch = builder.make_batch(&balanced_pair()).unwrap();
        assert_eq!(batch.batch_number, 1);
    }

    #[test]
    fn test_batch_options_override() {
        let mut builder = started();
        let options = BatchOptions {
            service_class: Some(ServiceClass::CreditsOnly),
            entry_description: Some("PAYROLL".to_string()),
            company_note: Some("MARCH".to_string()),
            effective_date: Some("240401".to_string()),
        };
        let credits = vec![DetailRecord::new("Alice", "C-1", 5, "010010101", "111", 22)];
        builder.make_batch_with(&credits, &options).unwrap();

        let out = builder.render().unwrap();
        let header = out.lines().nth(1).unwrap();
        assert_eq!(&header[1..4], "220");
        assert_eq!(&header[20..40], "MARCH               ");
        assert_eq!(&header[53..63], "PAYROLL   ");
        assert_eq!(&header[69..75], "240401");
        let control = out.lines().nth(3).unwrap();
        assert_eq!(&control[1..4], "220");
    }

    #[test]
    fn test_bad_batch_effective_date() {
        let mut builder = started();
        let options = BatchOptions {
            effective_date: Some("24-4-1".to_string()),
            ..BatchOptions::default()
        };
        assert!(matches!(
            builder.make_batch_with(&balanced_pair(), &options),
            Err(AchError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_no_operations_after_finalize() {
        let mut builder = started();
        builder.make_batch(&balanced_pair()).unwrap();
        builder.make_file_control_record().unwrap();
        assert_eq!(builder.stage(), FileStage::Finalized);
        assert!(builder.make_batch(&balanced_pair()).is_err());
        assert!(builder.make_file_control_record().is_err());
        assert!(builder.make_file_header_record().is_err());
    }

    #[test]
    fn test_pad_blocks_fills_last_block() {
        let mut builder = AchFileBuilder::new(config().with_pad_blocks(true)).unwrap();
        builder.make_file_header_record().unwrap();
        builder.make_batch(&balanced_pair()).unwrap();
        builder.make_file_control_record().unwrap();

        let out = builder.render().unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[5].starts_with('9'));
        assert_eq!(&lines[5][7..13], "000001");
        for filler in &lines[6..] {
            assert_eq!(*filler, "9".repeat(RECORD_SIZE));
        }
    }

    #[test]
    fn test_generated_trace_sequence_limit() {
        use crate::accountant::MAX_TRACE_SEQUENCE;

        let mut builder = started();
        builder.totals.entry_count = MAX_TRACE_SEQUENCE - 1;
        let before = builder.file_totals();

        let err = builder.make_batch(&balanced_pair()).unwrap_err();
        assert!(matches!(
            err,
            AchError::CountOverflow {
                field: "trace sequence",
                ..
            }
        ));
        assert_eq!(builder.file_totals(), before);
        assert_eq!(builder.lines.len(), 1);

        builder.make_batch(&balanced_pair()[..1]).unwrap();
        let out = builder.render().unwrap();
        let detail = out.lines().nth(2).unwrap();
        assert_eq!(&detail[79..94], "123123119999999");

        // explicit traces do not consume the generated sequence
        let traced: Vec<DetailRecord> = balanced_pair()
            .into_iter()
            .map(|r| r.with_entry_trace("123123110000001"))
            .collect();
        builder.make_batch(&traced).unwrap();
    }

    #[test]
    fn test_batch_count_limit_leaves_file_untouched() {
        use crate::accountant::MAX_BATCH_COUNT;

        let mut builder = started();
        builder.make_batch(&balanced_pair()).unwrap();
        builder.totals.batch_count = MAX_BATCH_COUNT;
        let before = builder.file_totals();
        let rendered = builder.render().unwrap();

        let err = builder.make_batch(&balanced_pair()).unwrap_err();
        assert!(matches!(err, AchError::CountOverflow { field: "batch count", .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert_eq!(builder.file_totals(), before);
        assert_eq!(builder.render().unwrap(), rendered);
    }

    #[test]
    fn test_non_ascii_batch_option_rejected_atomically() {
        let mut builder = started();
        let options = BatchOptions {
            company_note: Some("NÓMINA".to_string()),
            ..BatchOptions::default()
        };
        assert!(matches!(
            builder.make_batch_with(&balanced_pair(), &options),
            Err(AchError::NonAsciiText { .. })
        ));
        assert_eq!(builder.stage(), FileStage::HeaderWritten);
        assert_eq!(builder.file_totals().line_count, 1);
    }
}
