//! Reader for Freetrade activity exports

mod record;
mod splits;

pub use record::{action_from_str, parse_date, CsvColumn, FreetradeRecord, BROKER};
pub use splits::{SplitTable, SplitTableError, StockSplit};

use crate::error::{ParsingError, ParsingErrorKind};
use crate::model::BrokerTransaction;
use csv::StringRecord;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read and normalise a Freetrade export.
///
/// A missing file is not an error: it means nothing was traded through
/// Freetrade, so a warning is logged and no transactions are returned.
pub fn read_freetrade_transactions(
    path: &Path,
    splits: &SplitTable,
) -> Result<Vec<BrokerTransaction>, ParsingError> {
    let file_name = path.display().to_string();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::warn!("Couldn't locate Freetrade transactions file ({})", file_name);
            return Ok(Vec::new());
        }
        Err(err) => return Err(ParsingError::new(file_name, err.into())),
    };

    let transactions = read_transactions(file, &file_name, splits)?;
    if transactions.is_empty() {
        log::warn!("No transactions detected in file {}", file_name);
    }
    Ok(transactions)
}

/// Read an export from any reader; `file` names the source in errors.
pub fn read_transactions<R: Read>(
    reader: R,
    file: &str,
    splits: &SplitTable,
) -> Result<Vec<BrokerTransaction>, ParsingError> {
    let csv_error = |err: csv::Error| ParsingError::new(file, ParsingErrorKind::Csv(err));

    let mut rdr = csv::Reader::from_reader(reader);
    let header = rdr.headers().map_err(csv_error)?.clone();
    validate_header(&header, file)?;

    let mut rows = rdr
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(csv_error)?;
    log::info!("Read {} csv records from {}", rows.len(), file);

    // Exports list newest first but transactions are consumed oldest first.
    // Rows stamped on the same day keep their reversed export order.
    rows.reverse();

    rows.iter()
        .map(|row| -> Result<BrokerTransaction, ParsingError> {
            let record: FreetradeRecord = row.deserialize(Some(&header)).map_err(csv_error)?;
            let tx = record.into_transaction(file)?;
            Ok(splits.adjust(tx))
        })
        .collect()
}

/// Fail on the first header cell that isn't a known Freetrade column.
pub fn validate_header<'a, I>(header: I, file: &str) -> Result<(), ParsingError>
where
    I: IntoIterator<Item = &'a str>,
{
    match header
        .into_iter()
        .find(|column| !FreetradeRecord::is_known_column(column))
    {
        Some(column) => Err(ParsingError::new(
            file,
            ParsingErrorKind::UnknownColumn(column.to_string()),
        )),
        None => Ok(()),
    }
}
