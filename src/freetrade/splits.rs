use crate::model::{ActionType, BrokerTransaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum SplitTableError {
    #[error("invalid stock split record: {0}")]
    Csv(#[from] csv::Error),
    #[error("stock split factor for {symbol} must be positive")]
    InvalidFactor { symbol: String },
}

/// A stock split that took effect on `date`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockSplit {
    pub symbol: String,
    pub date: NaiveDate,
    pub factor: u32,
}

impl StockSplit {
    fn new(symbol: &str, (year, month, day): (i32, u32, u32), factor: u32) -> Self {
        StockSplit {
            symbol: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            factor,
        }
    }

    fn applies_to(&self, tx: &BrokerTransaction) -> bool {
        tx.action == ActionType::Sell
            && tx.symbol.as_deref() == Some(self.symbol.as_str())
            && self.date < tx.date
    }
}

/// Ordered stock splits consulted when reading sells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTable {
    splits: Vec<StockSplit>,
}

impl Default for SplitTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SplitTable {
    /// Splits known to affect Freetrade holdings
    pub fn builtin() -> Self {
        SplitTable {
            splits: vec![
                StockSplit::new("GOOGL", (2022, 7, 18), 20),
                StockSplit::new("TSLA", (2022, 8, 25), 3),
                StockSplit::new("NDAQ", (2022, 8, 29), 3),
            ],
        }
    }

    pub fn empty() -> Self {
        SplitTable { splits: Vec::new() }
    }

    /// Read `symbol,date,factor` rows, dates as YYYY-MM-DD.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, SplitTableError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let splits = rdr
            .deserialize::<StockSplit>()
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(split) = splits.iter().find(|split| split.factor == 0) {
            return Err(SplitTableError::InvalidFactor {
                symbol: split.symbol.clone(),
            });
        }
        log::info!("Read {} stock splits", splits.len());
        Ok(SplitTable { splits })
    }

    /// Append `other` after the existing entries.
    pub fn extend(&mut self, other: SplitTable) {
        self.splits.extend(other.splits);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockSplit> {
        self.splits.iter()
    }

    /// Restate a sell made after a split in pre-split shares, as if the split
    /// never happened. Matching entries compound in table order.
    pub fn adjust(&self, mut tx: BrokerTransaction) -> BrokerTransaction {
        for split in &self.splits {
            if !split.applies_to(&tx) {
                continue;
            }
            let factor = Decimal::from(split.factor);
            tx.quantity = tx.quantity.map(|quantity| quantity / factor);
            tx.price = tx.price.map(|price| price * factor);
            log::debug!(
                "Applied {}x split of {} on {} to sell on {}",
                split.factor,
                split.symbol,
                split.date,
                tx.date
            );
        }
        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sell(symbol: &str, date: (i32, u32, u32), quantity: Decimal, price: Decimal) -> BrokerTransaction {
        BrokerTransaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            action: ActionType::Sell,
            symbol: Some(symbol.to_string()),
            description: format!("{} SELL", symbol),
            quantity: Some(quantity),
            price: Some(price),
            fees: Decimal::ZERO,
            amount: quantity * price,
            currency: "GBP".to_string(),
            broker: "Freetrade".to_string(),
        }
    }

    #[test]
    fn builtin_splits() {
        let splits: Vec<_> = SplitTable::builtin()
            .iter()
            .map(|s| (s.symbol.clone(), s.date, s.factor))
            .collect();
        assert_eq!(
            splits,
            vec![
                ("GOOGL".to_string(), NaiveDate::from_ymd_opt(2022, 7, 18).unwrap(), 20),
                ("TSLA".to_string(), NaiveDate::from_ymd_opt(2022, 8, 25).unwrap(), 3),
                ("NDAQ".to_string(), NaiveDate::from_ymd_opt(2022, 8, 29).unwrap(), 3),
            ]
        );
        assert_eq!(SplitTable::default(), SplitTable::builtin());
    }

    #[test]
    fn sell_after_split_is_restated() {
        let tx = SplitTable::builtin().adjust(sell("TSLA", (2022, 9, 1), dec!(9), dec!(10)));
        assert_eq!(tx.quantity, Some(dec!(3)));
        assert_eq!(tx.price, Some(dec!(30)));
        assert_eq!(tx.amount, dec!(90));
    }

    #[test]
    fn sell_on_split_date_is_untouched() {
        let tx = sell("TSLA", (2022, 8, 25), dec!(9), dec!(10));
        assert_eq!(SplitTable::builtin().adjust(tx.clone()), tx);
    }

    #[test]
    fn sell_before_split_is_untouched() {
        let tx = sell("GOOGL", (2022, 7, 1), dec!(1), dec!(2000));
        assert_eq!(SplitTable::builtin().adjust(tx.clone()), tx);
    }

    #[test]
    fn buys_are_untouched() {
        let tx = BrokerTransaction {
            action: ActionType::Buy,
            ..sell("TSLA", (2022, 9, 1), dec!(9), dec!(10))
        };
        assert_eq!(SplitTable::builtin().adjust(tx.clone()), tx);
    }

    #[test]
    fn other_symbols_are_untouched() {
        let tx = sell("AAPL", (2022, 9, 1), dec!(9), dec!(10));
        assert_eq!(SplitTable::builtin().adjust(tx.clone()), tx);
    }

    #[test]
    fn repeated_splits_compound() {
        let mut table = SplitTable::builtin();
        table.extend(
            SplitTable::read_csv("symbol,date,factor\nTSLA,2023-01-10,2\n".as_bytes()).unwrap(),
        );
        let tx = table.adjust(sell("TSLA", (2023, 2, 1), dec!(12), dec!(5)));
        assert_eq!(tx.quantity, Some(dec!(2)));
        assert_eq!(tx.price, Some(dec!(30)));
    }

    #[test]
    fn read_csv_splits() {
        let table =
            SplitTable::read_csv("symbol,date,factor\nAMZN,2022-06-06,20\nSHOP,2022-06-29,10\n".as_bytes())
                .unwrap();
        let symbols: Vec<_> = table.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AMZN", "SHOP"]);
        assert_eq!(
            table.iter().next().unwrap().date,
            NaiveDate::from_ymd_opt(2022, 6, 6).unwrap()
        );
    }

    #[test]
    fn read_csv_rejects_zero_factor() {
        let err = SplitTable::read_csv("symbol,date,factor\nAMZN,2022-06-06,0\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, SplitTableError::InvalidFactor { ref symbol } if symbol == "AMZN"));
    }

    #[test]
    fn read_csv_rejects_bad_date() {
        let err = SplitTable::read_csv("symbol,date,factor\nAMZN,06/06/2022,20\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, SplitTableError::Csv(_)));
    }

    #[test]
    fn empty_table_changes_nothing() {
        let tx = sell("TSLA", (2022, 9, 1), dec!(9), dec!(10));
        assert_eq!(SplitTable::empty().adjust(tx.clone()), tx);
    }
}
