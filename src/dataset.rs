//! Dataset
//!
//! Reads the historical booking file into a [`BookingTable`], derives
//! `total_nights` and removes rows that carry no data at all.
use crate::constants::{TOTAL_NIGHTS, WEEKEND_NIGHTS, WEEK_NIGHTS};
use crate::data::{BookingTable, Cell};
use crate::errors::CancelGuardError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Load the booking dataset stored as CSV with a header row.
///
/// * `path` - Location of the CSV file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<BookingTable, CancelGuardError> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|e| CancelGuardError::UnableToRead(format!("{}: {}", path.display(), e)))?;
    let table = load_from_reader(BufReader::new(file))?;
    info!(
        "Loaded {} bookings with {} columns from {}",
        table.rows(),
        table.cols(),
        path.display()
    );
    Ok(table)
}

/// Load a booking dataset from any CSV source.
pub fn load_from_reader<R: Read>(reader: R) -> Result<BookingTable, CancelGuardError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(CancelGuardError::MalformedCsv("missing header row".to_string()));
    }

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        records.push(record.iter().map(Cell::parse).collect::<Vec<Cell>>());
    }

    let mut table = BookingTable::from_records(headers, records)?;
    normalize(&mut table);
    Ok(table)
}

/// Derive `total_nights` when absent and drop fully empty rows.
pub fn normalize(table: &mut BookingTable) {
    if table.derive_sum(TOTAL_NIGHTS, WEEKEND_NIGHTS, WEEK_NIGHTS) {
        debug!("Derived {} from {} and {}", TOTAL_NIGHTS, WEEKEND_NIGHTS, WEEK_NIGHTS);
    }
    let before = table.rows();
    table.retain_rows(|row| !row.iter().all(|c| c.is_missing()));
    let dropped = before - table.rows();
    if dropped > 0 {
        debug!("Dropped {} empty rows", dropped);
    }
}
