use crate::model::ActionType;

/// A failure while reading a broker export, tagged with the file it came from.
#[derive(Debug, thiserror::Error)]
#[error("{file}: {kind}")]
pub struct ParsingError {
    pub file: String,
    pub kind: ParsingErrorKind,
}

impl ParsingError {
    pub fn new(file: impl Into<String>, kind: ParsingErrorKind) -> Self {
        ParsingError {
            file: file.into(),
            kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParsingErrorKind {
    #[error("Unknown column {0}")]
    UnknownColumn(String),
    #[error("Non-GBP accounts are unsupported (account currency {0})")]
    UnsupportedCurrency(String),
    #[error("Unknown type: {0}")]
    UnknownType(String),
    #[error("Unknown buy_sell: {0}")]
    UnknownBuySell(String),
    #[error("No symbol for action: {0}")]
    MissingSymbol(ActionType),
    #[error("invalid timestamp: {0}")]
    InvalidDate(String),
    #[error("invalid number in column '{column}': '{value}'")]
    InvalidNumber { column: &'static str, value: String },
    #[error("zero rate in column '{column}'")]
    ZeroRate { column: &'static str },
    #[error("cannot convert to GBP: rate in column '{column}' overflows the amount")]
    RateOverflow { column: &'static str },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}
