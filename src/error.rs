//! Error types for the ACH file builder.

use crate::builder::FileStage;
use thiserror::Error;

/// Result type alias for builder operations
pub type Result<T> = std::result::Result<T, AchError>;

/// Broad category of an [`AchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad identifiers or options supplied at construction time.
    Configuration,
    /// A record definition disagrees with the field registry.
    Schema,
    /// Caller-supplied entries or totals that would corrupt the file.
    Validation,
    /// Builder operation called in the wrong stage.
    Usage,
    /// Failure reading caller input (CSV).
    Input,
}

/// Errors that can occur while building a file.
#[derive(Error, Debug)]
pub enum AchError {
    /// Missing or malformed configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Service class code outside 200/220/225
    #[error("Invalid service class code {0}: expected 200, 220 or 225")]
    InvalidServiceClass(u16),

    /// Date that does not parse as YYMMDD
    #[error("Invalid {field} '{value}': expected YYMMDD")]
    InvalidDate { field: &'static str, value: String },

    /// Record definition names a field the registry does not know
    #[error("Undefined field '{0}' in record definition")]
    UndefinedField(String),

    /// Record definition whose field widths do not add up to the record size
    #[error("Record '{record}' is {actual} characters wide, expected {expected}")]
    RecordWidth {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Negative entry amount
    #[error("Entry {index}: negative amount {amount}")]
    NegativeAmount { index: usize, amount: i64 },

    /// Transaction code outside 22/27/32/37
    #[error("Entry {index}: unsupported transaction code {code}")]
    UnsupportedTransactionCode { index: usize, code: u16 },

    /// Credit in a debits-only batch, or the reverse
    #[error("Entry {index}: transaction code {code} not allowed in service class {service_class}")]
    ServiceClassMismatch {
        index: usize,
        code: u16,
        service_class: u16,
    },

    /// Routing number that is not exactly nine digits
    #[error("Entry {index}: invalid routing number '{routing}'")]
    InvalidRoutingNumber { index: usize, routing: String },

    /// Batch with no entries
    #[error("Batch contains no entries")]
    EmptyBatch,

    /// Running total exceeded the representable range
    #[error("Amount total overflow")]
    AmountOverflow,

    /// Count or sequence number that would not fit its zero-filled field
    #[error("{field} would exceed {limit}")]
    CountOverflow { field: &'static str, limit: u64 },

    /// Text that cannot be written as single-byte characters
    #[error("{field} '{value}' contains non-ASCII characters")]
    NonAsciiText { field: &'static str, value: String },

    /// Debit and credit totals differ at finalization
    #[error("File is unbalanced: total debit {debit} != total credit {credit}")]
    Unbalanced { debit: u64, credit: u64 },

    /// Builder operation called out of order
    #[error("Cannot {operation} while file is {stage}")]
    OutOfOrder {
        operation: &'static str,
        stage: FileStage,
    },

    /// Invalid detail row in CSV input
    #[error("Invalid detail record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

impl AchError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AchError::Config(_) | AchError::InvalidServiceClass(_) | AchError::InvalidDate { .. } => {
                ErrorKind::Configuration
            }
            AchError::UndefinedField(_) | AchError::RecordWidth { .. } => ErrorKind::Schema,
            AchError::NegativeAmount { .. }
            | AchError::UnsupportedTransactionCode { .. }
            | AchError::ServiceClassMismatch { .. }
            | AchError::InvalidRoutingNumber { .. }
            | AchError::EmptyBatch
            | AchError::AmountOverflow
            | AchError::CountOverflow { .. }
            | AchError::NonAsciiText { .. }
            | AchError::Unbalanced { .. } => ErrorKind::Validation,
            AchError::OutOfOrder { .. } => ErrorKind::Usage,
            AchError::InvalidRecord { .. } | AchError::Csv(_) => ErrorKind::Input,
        }
    }
}
