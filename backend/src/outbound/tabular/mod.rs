//! Outbound tabular-format adapters.

mod csv_codec;

pub use csv_codec::{EXPORT_COLUMNS, ParsedRow, RowError, leads_to_csv, parse_leads_csv};
