//! Field schema registry and record layouts.
//!
//! Every field of every line type is described once in a static table. The
//! table is indexed by name on first use and never mutated afterwards, so any
//! number of builders can share it.

use crate::error::{AchError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Width of every physical line in the file.
pub const RECORD_SIZE: usize = 94;

/// Side a value is aligned to within its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// How a value is rendered before padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Display string, space padded.
    Text,
    /// Decimal digits; right-justified fields pad with `'0'`.
    ZeroFilledInteger,
    /// Decimal with a fixed number of fractional digits, padded like integers.
    FixedPoint(u32),
}

/// Format descriptor for one named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub justify: Justify,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn text(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            justify: Justify::Left,
            kind: FieldKind::Text,
        }
    }

    const fn text_right(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            justify: Justify::Right,
            kind: FieldKind::Text,
        }
    }

    const fn number(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            justify: Justify::Right,
            kind: FieldKind::ZeroFilledInteger,
        }
    }

    /// Character used to fill the unused part of the field.
    pub fn pad_char(&self) -> char {
        match (self.kind, self.justify) {
            (FieldKind::Text, _) | (_, Justify::Left) => ' ',
            _ => '0',
        }
    }
}

static FIELDS: &[FieldSpec] = &[
    FieldSpec::text("record_type", 1),
    // file header
    FieldSpec::number("priority_code", 2),
    FieldSpec::text_right("immediate_destination", 10),
    FieldSpec::text_right("immediate_origin", 10),
    FieldSpec::text("file_creation_date", 6),
    FieldSpec::text("file_creation_time", 4),
    FieldSpec::text("file_id_modifier", 1),
    FieldSpec::number("record_size", 3),
    FieldSpec::number("blocking_factor", 2),
    FieldSpec::number("format_code", 1),
    FieldSpec::text("immediate_destination_name", 23),
    FieldSpec::text("immediate_origin_name", 23),
    FieldSpec::text("reference_code", 8),
    // batch header
    FieldSpec::number("service_class_code", 3),
    FieldSpec::text("company_name", 16),
    FieldSpec::text("company_discretionary_data", 20),
    FieldSpec::text("company_id", 10),
    FieldSpec::text("standard_entry_class", 3),
    FieldSpec::text("company_entry_description", 10),
    FieldSpec::text("company_descriptive_date", 6),
    FieldSpec::text("effective_entry_date", 6),
    FieldSpec::text("settlement_date", 3),
    FieldSpec::text("originator_status_code", 1),
    FieldSpec::text("originating_dfi", 8),
    FieldSpec::number("batch_number", 7),
    // entry detail
    FieldSpec::number("transaction_code", 2),
    FieldSpec::text("receiving_dfi_routing", 9),
    FieldSpec::text("dfi_account_number", 17),
    FieldSpec::number("amount", 10),
    FieldSpec::text("individual_id_number", 15),
    FieldSpec::text("individual_name", 22),
    FieldSpec::text("discretionary_data", 2),
    FieldSpec::number("addenda_record_indicator", 1),
    FieldSpec::text("trace_number", 15),
    // batch control
    FieldSpec::number("batch_entry_count", 6),
    FieldSpec::number("entry_hash", 10),
    FieldSpec::number("total_debit", 12),
    FieldSpec::number("total_credit", 12),
    FieldSpec::text("message_authentication_code", 19),
    FieldSpec::text("reserved_batch", 6),
    // file control
    FieldSpec::number("batch_count", 6),
    FieldSpec::number("block_count", 6),
    FieldSpec::number("file_entry_count", 8),
    FieldSpec::text("reserved_file", 39),
];

fn registry() -> &'static HashMap<&'static str, FieldSpec> {
    static REGISTRY: OnceLock<HashMap<&'static str, FieldSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| FIELDS.iter().map(|spec| (spec.name, *spec)).collect())
}

/// Looks up the descriptor for `name`.
///
/// A miss is a defect in a record definition, not in caller data.
pub fn lookup(name: &str) -> Result<&'static FieldSpec> {
    registry()
        .get(name)
        .ok_or_else(|| AchError::UndefinedField(name.to_string()))
}

/// Ordered field layout of one physical line type.
#[derive(Debug, Clone, Copy)]
pub struct RecordDefinition {
    pub name: &'static str,
    pub type_code: char,
    pub fields: &'static [&'static str],
}

impl RecordDefinition {
    /// Sum of the widths of all fields in this layout.
    pub fn width(&self) -> Result<usize> {
        self.fields
            .iter()
            .try_fold(0, |acc: usize, name| -> Result<usize> {
                Ok(acc + lookup(name)?.width)
            })
    }

    /// Checks every field resolves and the layout fills exactly one record.
    pub fn validate(&self) -> Result<()> {
        let actual = self.width()?;
        if actual != RECORD_SIZE {
            return Err(AchError::RecordWidth {
                record: self.name,
                expected: RECORD_SIZE,
                actual,
            });
        }
        Ok(())
    }
}

pub const FILE_HEADER: RecordDefinition = RecordDefinition {
    name: "file header",
    type_code: '1',
    fields: &[
        "record_type",
        "priority_code",
        "immediate_destination",
        "immediate_origin",
        "file_creation_date",
        "file_creation_time",
        "file_id_modifier",
        "record_size",
        "blocking_factor",
        "format_code",
        "immediate_destination_name",
        "immediate_origin_name",
        "reference_code",
    ],
};

pub const BATCH_HEADER: RecordDefinition = RecordDefinition {
    name: "batch header",
    type_code: '5',
    fields: &[
        "record_type",
        "service_class_code",
        "company_name",
        "company_discretionary_data",
        "company_id",
        "standard_entry_class",
        "company_entry_description",
        "company_descriptive_date",
        "effective_entry_date",
        "settlement_date",
        "originator_status_code",
        "originating_dfi",
        "batch_number",
    ],
};

pub const ENTRY_DETAIL: RecordDefinition = RecordDefinition {
    name: "entry detail",
    type_code: '6',
    fields: &[
        "record_type",
        "transaction_code",
        "receiving_dfi_routing",
        "dfi_account_number",
        "amount",
        "individual_id_number",
        "individual_name",
        "discretionary_data",
        "addenda_record_indicator",
        "trace_number",
    ],
};

pub const BATCH_CONTROL: RecordDefinition = RecordDefinition {
    name: "batch control",
    type_code: '8',
    fields: &[
        "record_type",
        "service_class_code",
        "batch_entry_count",
        "entry_hash",
        "total_debit",
        "total_credit",
        "company_id",
        "message_authentication_code",
        "reserved_batch",
        "originating_dfi",
        "batch_number",
    ],
};

pub const FILE_CONTROL: RecordDefinition = RecordDefinition {
    name: "file control",
    type_code: '9',
    fields: &[
        "record_type",
        "batch_count",
        "block_count",
        "file_entry_count",
        "entry_hash",
        "total_debit",
        "total_credit",
        "reserved_file",
    ],
};

/// All line types written by the builder.
pub const ALL_RECORDS: [RecordDefinition; 5] =
    [FILE_HEADER, BATCH_HEADER, ENTRY_DETAIL, BATCH_CONTROL, FILE_CONTROL];

/// Validates every built-in record definition against the registry.
pub fn validate_definitions() -> Result<()> {
    ALL_RECORDS.iter().try_for_each(RecordDefinition::validate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_definitions_are_record_sized() {
        validate_definitions().unwrap();
        for def in ALL_RECORDS {
            assert_eq!(def.width().unwrap(), RECORD_SIZE, "{}", def.name);
        }
    }

    #[test]
    fn test_lookup_known_field() {
        let spec = lookup("entry_hash").unwrap();
        assert_eq!(spec.width, 10);
        assert_eq!(spec.justify, Justify::Right);
        assert_eq!(spec.kind, FieldKind::ZeroFilledInteger);
    }

    #[test]
    fn test_lookup_unknown_field_is_schema_error() {
        let err = lookup("no_such_field").unwrap_err();
        assert!(matches!(err, AchError::UndefinedField(ref name) if name == "no_such_field"));
    }

    #[test]
    fn test_definition_with_unknown_field_fails_validation() {
        let def = RecordDefinition {
            name: "broken",
            type_code: 'X',
            fields: &["record_type", "missing_field"],
        };
        assert!(matches!(def.validate(), Err(AchError::UndefinedField(_))));
    }

    #[test]
    fn test_definition_with_wrong_width_fails_validation() {
        let def = RecordDefinition {
            name: "short",
            type_code: 'X',
            fields: &["record_type", "entry_hash"],
        };
        match def.validate() {
            Err(AchError::RecordWidth { actual, expected, .. }) => {
                assert_eq!(actual, 11);
                assert_eq!(expected, RECORD_SIZE);
            }
            other => panic!("Expected RecordWidth, got {:?}", other),
        }
    }

    #[test]
    fn test_field_names_are_unique() {
        assert_eq!(registry().len(), FIELDS.len());
    }

    #[test]
    fn test_pad_chars() {
        assert_eq!(lookup("amount").unwrap().pad_char(), '0');
        assert_eq!(lookup("company_name").unwrap().pad_char(), ' ');
        assert_eq!(lookup("immediate_destination").unwrap().pad_char(), ' ');
    }
}
