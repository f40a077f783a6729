//! File configuration: identifiers and options fixed for one file build.

use crate::accountant::routing_prefix;
use crate::detail::Direction;
use crate::error::{AchError, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// Lines per block.
pub const BLOCKING_FACTOR: u64 = 10;

/// File format code.
pub const FORMAT_CODE: u64 = 1;

/// File header priority code.
pub const PRIORITY_CODE: u64 = 1;

/// Date format used by every date field (`YYMMDD`).
pub const DATE_FORMAT: &str = "%y%m%d";

/// Batch-level restriction on entry directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceClass {
    /// 200: credits and debits.
    Mixed,
    /// 220: credits only.
    CreditsOnly,
    /// 225: debits only.
    DebitsOnly,
}

impl ServiceClass {
    pub fn code(self) -> u16 {
        match self {
            ServiceClass::Mixed => 200,
            ServiceClass::CreditsOnly => 220,
            ServiceClass::DebitsOnly => 225,
        }
    }

    /// Returns `true` if entries moving money in `direction` may appear.
    pub fn allows(self, direction: Direction) -> bool {
        match self {
            ServiceClass::Mixed => true,
            ServiceClass::CreditsOnly => direction == Direction::Credit,
            ServiceClass::DebitsOnly => direction == Direction::Debit,
        }
    }
}

impl TryFrom<u16> for ServiceClass {
    type Error = AchError;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            200 => Ok(ServiceClass::Mixed),
            220 => Ok(ServiceClass::CreditsOnly),
            225 => Ok(ServiceClass::DebitsOnly),
            other => Err(AchError::InvalidServiceClass(other)),
        }
    }
}

/// Parses a `YYMMDD` date.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() != 6 {
        return Err(AchError::InvalidDate {
            field,
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| AchError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Caller-supplied configuration for one file.
///
/// Required identifiers are taken by [`FileConfig::new`]; everything else
/// has a default and a `with_*` setter. Nothing is checked until
/// [`FileConfig::validate`].
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub company_id: String,
    pub company_name: String,
    /// Nine-digit routing number of the receiving point.
    pub destination_routing: String,
    pub destination_name: String,
    /// Routing number (or its eight-digit DFI identification) of the originator's bank.
    pub origination_routing: String,
    pub origination_name: String,
    /// Three-character standard entry class, e.g. PPD or WEB.
    pub entry_class_code: String,
    pub entry_description: String,
    pub service_class_code: u16,
    pub file_id_modifier: char,
    pub reference_code: String,
    /// Effective entry date as `YYMMDD`; defaults to the day after creation.
    pub effective_date: Option<String>,
    /// Creation timestamp; defaults to the local time at validation.
    pub created_at: Option<NaiveDateTime>,
    /// Fill the last block with all-'9' lines.
    pub pad_blocks: bool,
}

impl FileConfig {
    pub fn new(
        company_id: impl Into<String>,
        company_name: impl Into<String>,
        destination_routing: impl Into<String>,
        destination_name: impl Into<String>,
        origination_routing: impl Into<String>,
        origination_name: impl Into<String>,
    ) -> Self {
        FileConfig {
            company_id: company_id.into(),
            company_name: company_name.into(),
            destination_routing: destination_routing.into(),
            destination_name: destination_name.into(),
            origination_routing: origination_routing.into(),
            origination_name: origination_name.into(),
            entry_class_code: "PPD".to_string(),
            entry_description: "PAYMENT".to_string(),
            service_class_code: ServiceClass::Mixed.code(),
            file_id_modifier: 'A',
            reference_code: String::new(),
            effective_date: None,
            created_at: None,
            pad_blocks: false,
        }
    }

    pub fn with_entry_class_code(mut self, code: impl Into<String>) -> Self {
        self.entry_class_code = code.into();
        self
    }

    pub fn with_entry_description(mut self, description: impl Into<String>) -> Self {
        self.entry_description = description.into();
        self
    }

    pub fn with_service_class_code(mut self, code: u16) -> Self {
        self.service_class_code = code;
        self
    }

    pub fn with_file_id_modifier(mut self, modifier: char) -> Self {
        self.file_id_modifier = modifier;
        self
    }

    pub fn with_reference_code(mut self, reference: impl Into<String>) -> Self {
        self.reference_code = reference.into();
        self
    }

    pub fn with_effective_date(mut self, yymmdd: impl Into<String>) -> Self {
        self.effective_date = Some(yymmdd.into());
        self
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_pad_blocks(mut self, pad: bool) -> Self {
        self.pad_blocks = pad;
        self
    }

    /// Checks every identifier and resolves defaults.
    pub fn validate(&self) -> Result<Settings> {
        let required = [
            ("company id", &self.company_id),
            ("company name", &self.company_name),
            ("destination routing number", &self.destination_routing),
            ("destination name", &self.destination_name),
            ("origination routing number", &self.origination_routing),
            ("origination name", &self.origination_name),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(AchError::Config(format!("missing {}", label)));
            }
        }

        let text = [
            ("company name", &self.company_name),
            ("company id", &self.company_id),
            ("destination name", &self.destination_name),
            ("origination name", &self.origination_name),
            ("entry class code", &self.entry_class_code),
            ("entry description", &self.entry_description),
            ("reference code", &self.reference_code),
        ];
        for (label, value) in text {
            if !value.is_ascii() {
                return Err(AchError::Config(format!(
                    "{} '{}' must be ASCII",
                    label, value
                )));
            }
        }

        let destination = self.destination_routing.trim();
        if destination.len() != 9 || !is_digits(destination) {
            return Err(AchError::Config(format!(
                "destination routing number '{}' must be 9 digits",
                destination
            )));
        }

        let origination = self.origination_routing.trim();
        if !(8..=9).contains(&origination.len()) || !is_digits(origination) {
            return Err(AchError::Config(format!(
                "origination routing number '{}' must be 8 or 9 digits",
                origination
            )));
        }
        let origin_dfi = routing_prefix(origination)
            .ok_or_else(|| AchError::Config("origination routing number too short".to_string()))?
            .to_string();

        let entry_class_code = self.entry_class_code.trim();
        if entry_class_code.chars().count() != 3 {
            return Err(AchError::Config(format!(
                "entry class code '{}' must be 3 characters",
                entry_class_code
            )));
        }

        if !(self.file_id_modifier.is_ascii_uppercase() || self.file_id_modifier.is_ascii_digit()) {
            return Err(AchError::Config(format!(
                "file id modifier '{}' must be A-Z or 0-9",
                self.file_id_modifier
            )));
        }

        let service_class = ServiceClass::try_from(self.service_class_code)?;

        let created_at = self
            .created_at
            .unwrap_or_else(|| Local::now().naive_local());

        let effective_date = match &self.effective_date {
            Some(date) => parse_date("effective date", date)?,
            None => created_at.date() + Duration::days(1),
        };

        Ok(Settings {
            company_id: self.company_id.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
            destination_routing: destination.to_string(),
            destination_name: self.destination_name.trim().to_string(),
            origination_routing: origination.to_string(),
            origination_name: self.origination_name.trim().to_string(),
            origin_dfi,
            entry_class_code: entry_class_code.to_string(),
            entry_description: self.entry_description.trim().to_string(),
            service_class,
            file_id_modifier: self.file_id_modifier,
            reference_code: self.reference_code.clone(),
            effective_date,
            created_at,
            pad_blocks: self.pad_blocks,
        })
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Validated, immutable configuration held by a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub company_id: String,
    pub company_name: String,
    pub destination_routing: String,
    pub destination_name: String,
    pub origination_routing: String,
    pub origination_name: String,
    /// First eight digits of the origination routing number.
    pub origin_dfi: String,
    pub entry_class_code: String,
    pub entry_description: String,
    pub service_class: ServiceClass,
    pub file_id_modifier: char,
    pub reference_code: String,
    pub effective_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub pad_blocks: bool,
}
