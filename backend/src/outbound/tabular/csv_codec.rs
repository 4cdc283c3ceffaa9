//! CSV lead export/import adapter.
//!
//! A format adapter external to the policy core: the service decides which
//! leads are visible and whether the caller may import at all; this module
//! only translates between rows and drafts. Multi-valued cells (tags,
//! notes) are joined with `;`.

use std::str::FromStr;

use crate::domain::error::Error;
use crate::domain::lead::{Lead, LeadDraft, LeadStatus, PhoneNumber};
use crate::domain::user::{EmailAddress, UserId};

/// Column order written by the exporter. The importer resolves columns by
/// header name instead, so re-ordered or extra columns still import.
pub const EXPORT_COLUMNS: [&str; 9] = [
    "name",
    "email",
    "phone",
    "source",
    "status",
    "tags",
    "notes",
    "assigned_to",
    "created_at",
];

const MULTI_VALUE_SEPARATOR: &str = ";";

/// A successfully parsed import row, tagged with its 1-based file line.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub line: u64,
    pub draft: LeadDraft,
}

/// A rejected import row, tagged with its 1-based file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

/// Render leads into a CSV document with the [`EXPORT_COLUMNS`] header.
pub fn leads_to_csv(leads: &[Lead]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|err| Error::internal(format!("failed to write export header: {err}")))?;
    for lead in leads {
        let assigned_to = lead
            .assigned_to()
            .map(ToString::to_string)
            .unwrap_or_default();
        writer
            .write_record([
                lead.name(),
                lead.email().as_ref(),
                lead.phone().as_ref(),
                lead.source().unwrap_or_default(),
                &lead.status().to_string(),
                &lead.tags().join(MULTI_VALUE_SEPARATOR),
                &lead.notes().join(MULTI_VALUE_SEPARATOR),
                &assigned_to,
                &lead.created_at().to_rfc3339(),
            ])
            .map_err(|err| Error::internal(format!("failed to write export row: {err}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| Error::internal(format!("failed to flush export: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| Error::internal(format!("export was not valid UTF-8: {err}")))
}

struct ColumnIndex {
    name: usize,
    email: usize,
    phone: usize,
    source: Option<usize>,
    status: Option<usize>,
    tags: Option<usize>,
    notes: Option<usize>,
    assigned_to: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, Error> {
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(wanted))
        };
        let required = |wanted: &str| {
            position(wanted).ok_or_else(|| {
                Error::invalid_request(format!("import is missing the required column {wanted}"))
            })
        };
        Ok(Self {
            name: required("name")?,
            email: required("email")?,
            phone: required("phone")?,
            source: position("source"),
            status: position("status"),
            tags: position("tags"),
            notes: position("notes"),
            assigned_to: position("assigned_to"),
        })
    }
}

fn split_multi(cell: &str) -> Vec<String> {
    cell.split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnIndex) -> Result<LeadDraft, String> {
    let cell = |index: usize| record.get(index).unwrap_or_default().trim();
    let optional_cell = |index: Option<usize>| index.map(cell).filter(|value| !value.is_empty());

    let email = EmailAddress::new(cell(columns.email)).map_err(|err| err.to_string())?;
    let phone = PhoneNumber::new(cell(columns.phone)).map_err(|err| err.to_string())?;
    let name = cell(columns.name);
    if name.is_empty() {
        return Err("lead name must not be empty".to_owned());
    }

    let mut draft = LeadDraft::new(name, email, phone);
    draft.source = optional_cell(columns.source).map(str::to_owned);
    if let Some(status) = optional_cell(columns.status) {
        draft.status = LeadStatus::from_str(status).map_err(|err| err.to_string())?;
    }
    if let Some(tags) = optional_cell(columns.tags) {
        draft.tags = split_multi(tags);
    }
    if let Some(notes) = optional_cell(columns.notes) {
        draft.notes = split_multi(notes);
    }
    if let Some(assigned_to) = optional_cell(columns.assigned_to) {
        draft.assigned_to = Some(UserId::new(assigned_to).map_err(|err| err.to_string())?);
    }
    Ok(draft)
}

/// Parse an uploaded CSV document into drafts.
///
/// Unreadable headers fail the whole upload; individual bad rows are
/// reported alongside the good ones so one typo does not sink a batch.
pub fn parse_leads_csv(bytes: &[u8]) -> Result<(Vec<ParsedRow>, Vec<RowError>), Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|err| Error::invalid_request(format!("import is not parseable CSV: {err}")))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Header occupies line 1.
        let line = index as u64 + 2;
        match record {
            Ok(record) => match parse_row(&record, &columns) {
                Ok(draft) => rows.push(ParsedRow { line, draft }),
                Err(message) => errors.push(RowError { line, message }),
            },
            Err(err) => errors.push(RowError {
                line,
                message: format!("unreadable row: {err}"),
            }),
        }
    }
    Ok((rows, errors))
}
