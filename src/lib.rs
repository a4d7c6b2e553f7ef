pub mod cmd;
pub mod error;
pub mod freetrade;
pub mod model;

pub use error::{ParsingError, ParsingErrorKind};
pub use freetrade::{read_freetrade_transactions, SplitTable, StockSplit};
pub use model::{ActionType, BrokerTransaction};
