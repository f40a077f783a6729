//! Record assembler and the typed field sets of each line type.
//!
//! Each line type has one struct holding its values. A struct maps field
//! names from its [`RecordDefinition`] to values; [`assemble`] walks the
//! definition in order and formats every field.

use crate::error::{AchError, Result};
use crate::format::{check_ascii, format_field, FieldValue};
use crate::schema::{
    lookup, RecordDefinition, BATCH_CONTROL, BATCH_HEADER, ENTRY_DETAIL, FILE_CONTROL,
    FILE_HEADER, RECORD_SIZE,
};
use log::warn;

/// A line type whose values can be looked up by field name.
pub trait Record {
    /// Field layout of this line type.
    const DEFINITION: RecordDefinition;

    /// Value for `field`, or `None` if this record has no value for it.
    fn value(&self, field: &str) -> Option<FieldValue>;
}

/// Renders `record` into one fixed-width line.
///
/// A field with no value is written blank and logged at warn level. A field
/// missing from the registry, or a text value outside ASCII, aborts assembly.
pub fn assemble<R: Record>(record: &R) -> Result<String> {
    let definition = R::DEFINITION;
    let mut line = String::with_capacity(RECORD_SIZE);

    for name in definition.fields {
        let spec = lookup(name)?;
        let value = record.value(name);
        match &value {
            None => warn!(
                "{} record: no value for field '{}', writing blank",
                definition.name, name
            ),
            Some(FieldValue::Text(text)) => check_ascii(*name, text)?,
            Some(_) => {}
        }
        line.push_str(&format_field(spec, value.as_ref()));
    }

    let actual = line.len();
    if actual != RECORD_SIZE {
        return Err(AchError::RecordWidth {
            record: definition.name,
            expected: RECORD_SIZE,
            actual,
        });
    }

    Ok(line)
}

fn blank() -> Option<FieldValue> {
    Some(FieldValue::Text(String::new()))
}

/// Values of the file header line (type 1).
#[derive(Debug, Clone)]
pub struct FileHeaderFields {
    pub priority_code: u64,
    pub immediate_destination: String,
    pub immediate_origin: String,
    pub creation_date: String,
    pub creation_time: String,
    pub file_id_modifier: char,
    pub record_size: usize,
    pub blocking_factor: u64,
    pub format_code: u64,
    pub destination_name: String,
    pub origin_name: String,
    pub reference_code: String,
}

impl Record for FileHeaderFields {
    const DEFINITION: RecordDefinition = FILE_HEADER;

    fn value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "record_type" => Self::DEFINITION.type_code.into(),
            "priority_code" => self.priority_code.into(),
            "immediate_destination" => self.immediate_destination.as_str().into(),
            "immediate_origin" => self.immediate_origin.as_str().into(),
            "file_creation_date" => self.creation_date.as_str().into(),
            "file_creation_time" => self.creation_time.as_str().into(),
            "file_id_modifier" => self.file_id_modifier.into(),
            "record_size" => self.record_size.into(),
            "blocking_factor" => self.blocking_factor.into(),
            "format_code" => self.format_code.into(),
            "immediate_destination_name" => self.destination_name.as_str().into(),
            "immediate_origin_name" => self.origin_name.as_str().into(),
            "reference_code" => self.reference_code.as_str().into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Values of a batch header line (type 5).
#[derive(Debug, Clone)]
pub struct BatchHeaderFields {
    pub service_class_code: u16,
    pub company_name: String,
    pub company_note: String,
    pub company_id: String,
    pub entry_class_code: String,
    pub entry_description: String,
    pub descriptive_date: String,
    pub effective_date: String,
    pub origin_dfi: String,
    pub batch_number: u32,
}

impl Record for BatchHeaderFields {
    const DEFINITION: RecordDefinition = BATCH_HEADER;

    fn value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "record_type" => Self::DEFINITION.type_code.into(),
            "service_class_code" => self.service_class_code.into(),
            "company_name" => self.company_name.as_str().into(),
            "company_discretionary_data" => self.company_note.as_str().into(),
            "company_id" => self.company_id.as_str().into(),
            "standard_entry_class" => self.entry_class_code.as_str().into(),
            "company_entry_description" => self.entry_description.as_str().into(),
            "company_descriptive_date" => self.descriptive_date.as_str().into(),
            "effective_entry_date" => self.effective_date.as_str().into(),
            // Filled in by the receiving operator.
            "settlement_date" => return blank(),
            "originator_status_code" => '1'.into(),
            "originating_dfi" => self.origin_dfi.as_str().into(),
            "batch_number" => self.batch_number.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Values of an entry detail line (type 6).
#[derive(Debug, Clone)]
pub struct EntryDetailFields {
    pub transaction_code: u16,
    pub routing_number: String,
    pub bank_account: String,
    pub amount: u64,
    pub customer_account: String,
    pub customer_name: String,
    pub discretionary: String,
    pub trace_number: String,
}

impl Record for EntryDetailFields {
    const DEFINITION: RecordDefinition = ENTRY_DETAIL;

    fn value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "record_type" => Self::DEFINITION.type_code.into(),
            "transaction_code" => self.transaction_code.into(),
            "receiving_dfi_routing" => self.routing_number.as_str().into(),
            "dfi_account_number" => self.bank_account.as_str().into(),
            "amount" => self.amount.into(),
            "individual_id_number" => self.customer_account.as_str().into(),
            "individual_name" => self.customer_name.as_str().into(),
            "discretionary_data" => self.discretionary.as_str().into(),
            "addenda_record_indicator" => 0u64.into(),
            "trace_number" => self.trace_number.as_str().into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Values of a batch control line (type 8).
#[derive(Debug, Clone)]
pub struct BatchControlFields {
    pub service_class_code: u16,
    pub entry_count: u64,
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
    pub company_id: String,
    pub origin_dfi: String,
    pub batch_number: u32,
}

impl Record for BatchControlFields {
    const DEFINITION: RecordDefinition = BATCH_CONTROL;

    fn value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "record_type" => Self::DEFINITION.type_code.into(),
            "service_class_code" => self.service_class_code.into(),
            "batch_entry_count" => self.entry_count.into(),
            "entry_hash" => self.entry_hash.into(),
            "total_debit" => self.total_debit.into(),
            "total_credit" => self.total_credit.into(),
            "company_id" => self.company_id.as_str().into(),
            "message_authentication_code" | "reserved_batch" => return blank(),
            "originating_dfi" => self.origin_dfi.as_str().into(),
            "batch_number" => self.batch_number.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Values of the file control line (type 9).
#[derive(Debug, Clone)]
pub struct FileControlFields {
    pub batch_count: u32,
    pub block_count: u64,
    pub entry_count: u64,
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
}

impl Record for FileControlFields {
    const DEFINITION: RecordDefinition = FILE_CONTROL;

    fn value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "record_type" => Self::DEFINITION.type_code.into(),
            "batch_count" => self.batch_count.into(),
            "block_count" => self.block_count.into(),
            "file_entry_count" => self.entry_count.into(),
            "entry_hash" => self.entry_hash.into(),
            "total_debit" => self.total_debit.into(),
            "total_credit" => self.total_credit.into(),
            "reserved_file" => return blank(),
            _ => return None,
        };
        Some(value)
    }
}
