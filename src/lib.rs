//! # ACH Writer
//!
//! Builds fixed-width ACH batch files: a file header, one or more batches
//! (batch header, entry detail lines, batch control), and a file control
//! trailer. Every line is exactly 94 characters.
//!
//! ## Design Principles
//!
//! - **Declarative layouts**: every field is described once in a static
//!   registry; record definitions are ordered lists of field names
//! - **Reconciled totals**: batch and file entry counts, entry hashes and
//!   debit/credit totals are accumulated in [`BatchState`] and [`FileState`]
//! - **Explicit lifecycle**: the builder rejects out-of-order calls and
//!   refuses to finalize an unbalanced file
//! - **Atomic batches**: a rejected entry leaves the builder untouched
//!
//! ## Example
//!
//! ```
//! use ach_writer::{AchFileBuilder, DetailRecord, FileConfig};
//!
//! let config = FileConfig::new(
//!     "1234567890", "ACME CORP", "123123123", "DEST BANK", "12312311", "ORIGIN BANK",
//! )
//! .with_entry_class_code("WEB");
//!
//! let mut builder = AchFileBuilder::new(config).unwrap();
//! builder.make_file_header_record().unwrap();
//! let batch = builder
//!     .make_batch(&[
//!         DetailRecord::new("Alice", "C-1", 2501, "010010101", "111", 32),
//!         DetailRecord::new("Bob", "C-2", 2501, "010010401", "222", 27),
//!     ])
//!     .unwrap();
//! assert_eq!(batch.entry_hash, 2_002_050);
//!
//! builder.make_file_control_record().unwrap();
//! println!("{}", builder.render().unwrap());
//! ```

pub mod accountant;
pub mod builder;
pub mod config;
pub mod detail;
pub mod error;
pub mod format;
pub mod money;
pub mod record;
pub mod schema;

pub use accountant::{BatchState, FileState};
pub use builder::{AchFileBuilder, BatchOptions, FileStage};
pub use config::{FileConfig, ServiceClass, Settings};
pub use detail::{read_detail_records, DetailRecord, Direction, TransactionCode};
pub use error::{AchError, ErrorKind, Result};
pub use format::FieldValue;
pub use schema::{FieldKind, FieldSpec, Justify, RECORD_SIZE};
