use crate::error::{ParsingError, ParsingErrorKind};
use crate::model::{ActionType, BrokerTransaction, TARGET_CURRENCY};
use chrono::{DateTime, NaiveDate};
use freetrade_derive::CsvColumns;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

pub const BROKER: &str = "Freetrade";

const FREESHARE_ORDER: &str = "FREESHARE_ORDER";
const WITHDRAWAL: &str = "WITHDRAWAL";

/// A column accepted in a Freetrade export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumn {
    pub name: &'static str,
    pub description: &'static str,
}

/// One row of a Freetrade activity export.
///
/// Every cell is kept as text: which cells are meaningful depends on `Type`,
/// and columns missing from the file read as empty.
#[derive(Debug, Clone, Default, Deserialize, CsvColumns)]
#[serde(default)]
pub struct FreetradeRecord {
    /// Instrument or activity title
    #[serde(rename = "Title")]
    pub title: String,
    /// ORDER, FREESHARE_ORDER, DIVIDEND, TOP_UP, WITHDRAWAL or INTEREST_FROM_CASH
    #[serde(rename = "Type")]
    pub tx_type: String,
    /// ISO-8601 UTC timestamp, e.g. 2022-08-26T14:30:00.123Z
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Currency of the account, must be GBP
    #[serde(rename = "Account Currency")]
    pub account_currency: String,
    /// Cash amount for top ups, withdrawals and interest
    #[serde(rename = "Total Amount")]
    pub total_amount: String,
    /// BUY or SELL for orders
    #[serde(rename = "Buy / Sell")]
    pub buy_sell: String,
    /// Instrument ticker
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Instrument ISIN
    #[serde(rename = "ISIN")]
    pub isin: String,
    /// Share price converted by Freetrade
    #[serde(rename = "Price per Share in Account Currency")]
    pub price_per_share_in_account_currency: String,
    /// Stamp duty charged on the order
    #[serde(rename = "Stamp Duty")]
    pub stamp_duty: String,
    /// Number of shares traded
    #[serde(rename = "Quantity")]
    pub quantity: String,
    /// Execution venue
    #[serde(rename = "Venue")]
    pub venue: String,
    /// Freetrade order identifier
    #[serde(rename = "Order ID")]
    pub order_id: String,
    /// Market or limit order
    #[serde(rename = "Order Type")]
    pub order_type: String,
    /// Currency the instrument trades in
    #[serde(rename = "Instrument Currency")]
    pub instrument_currency: String,
    /// Value of the shares in instrument currency
    #[serde(rename = "Total Shares Amount")]
    pub total_shares_amount: String,
    /// Share price in instrument currency
    #[serde(rename = "Price per Share")]
    pub price_per_share: String,
    /// Rate applied to the order, instrument currency per GBP
    #[serde(rename = "FX Rate")]
    pub fx_rate: String,
    /// Reference rate before Freetrade's FX fee
    #[serde(rename = "Base FX Rate")]
    pub base_fx_rate: String,
    /// FX fee in basis points
    #[serde(rename = "FX Fee (BPS)")]
    pub fx_fee_bps: String,
    /// FX fee charged
    #[serde(rename = "FX Fee Amount")]
    pub fx_fee_amount: String,
    /// Dividend ex-date
    #[serde(rename = "Dividend Ex Date")]
    pub dividend_ex_date: String,
    /// Dividend payment date
    #[serde(rename = "Dividend Pay Date")]
    pub dividend_pay_date: String,
    /// Shares eligible for the dividend
    #[serde(rename = "Dividend Eligible Quantity")]
    pub dividend_eligible_quantity: String,
    /// Dividend per share
    #[serde(rename = "Dividend Amount Per Share")]
    pub dividend_amount_per_share: String,
    /// Dividend before withholding tax, in instrument currency
    #[serde(rename = "Dividend Gross Distribution Amount")]
    pub dividend_gross_distribution_amount: String,
    /// Dividend after withholding tax
    #[serde(rename = "Dividend Net Distribution Amount")]
    pub dividend_net_distribution_amount: String,
    /// Withholding tax rate
    #[serde(rename = "Dividend Withheld Tax Percentage")]
    pub dividend_withheld_tax_percentage: String,
    /// Withholding tax deducted
    #[serde(rename = "Dividend Withheld Tax Amount")]
    pub dividend_withheld_tax_amount: String,
}

impl FreetradeRecord {
    /// Normalise the row into a GBP transaction.
    pub fn into_transaction(self, file: &str) -> Result<BrokerTransaction, ParsingError> {
        let fail = |kind: ParsingErrorKind| ParsingError::new(file, kind);

        let action = action_from_str(&self.tx_type, &self.buy_sell, file)?;

        let symbol = Some(self.ticker.clone()).filter(|ticker| !ticker.is_empty());
        if symbol.is_none() && action.requires_symbol() {
            return Err(fail(ParsingErrorKind::MissingSymbol(action)));
        }

        // Freetrade GIA accounts are only offered in GBP
        if self.account_currency != TARGET_CURRENCY {
            return Err(fail(ParsingErrorKind::UnsupportedCurrency(
                self.account_currency.clone(),
            )));
        }

        let (quantity, price, amount) = self.amounts(action).map_err(fail)?;

        let (price, amount) = if self.tx_type == FREESHARE_ORDER {
            (Some(Decimal::ZERO), Decimal::ZERO)
        } else {
            (price, amount)
        };

        let outflow = action == ActionType::Buy || self.tx_type == WITHDRAWAL;
        let amount = if outflow && !amount.is_zero() {
            -amount
        } else {
            amount
        };

        let date = parse_date(&self.timestamp).map_err(fail)?;

        Ok(BrokerTransaction {
            date,
            action,
            symbol,
            description: format!("{} {}", self.title, action),
            quantity,
            price,
            fees: Decimal::ZERO,
            amount,
            currency: TARGET_CURRENCY.to_string(),
            broker: BROKER.to_string(),
        })
    }

    /// Quantity, price and amount in GBP, before sign and free share corrections.
    fn amounts(
        &self,
        action: ActionType,
    ) -> Result<(Option<Decimal>, Option<Decimal>, Decimal), ParsingErrorKind> {
        let foreign = self.instrument_currency != TARGET_CURRENCY;
        match action {
            ActionType::Buy | ActionType::Sell => {
                let quantity = decimal("Quantity", &self.quantity)?;
                let mut price = decimal("Price per Share", &self.price_per_share)?;
                let mut amount = decimal("Total Shares Amount", &self.total_shares_amount)?;
                if foreign {
                    let fx_rate = decimal("FX Rate", &self.fx_rate)?;
                    price = to_gbp(price, fx_rate, "FX Rate")?;
                    amount = to_gbp(amount, fx_rate, "FX Rate")?;
                }
                Ok((Some(quantity), Some(price), amount))
            }
            ActionType::Dividend => {
                let mut amount = decimal(
                    "Dividend Gross Distribution Amount",
                    &self.dividend_gross_distribution_amount,
                )?;
                if foreign {
                    // dividends carry no FX fee, so the base rate applies
                    let base_fx_rate = decimal("Base FX Rate", &self.base_fx_rate)?;
                    amount = to_gbp(amount, base_fx_rate, "Base FX Rate")?;
                }
                Ok((None, None, amount))
            }
            ActionType::Transfer | ActionType::Interest => {
                let amount = decimal("Total Amount", &self.total_amount)?;
                Ok((None, None, amount))
            }
        }
    }
}

/// Classify a row from its `Type` and `Buy / Sell` cells.
pub fn action_from_str(
    tx_type: &str,
    buy_sell: &str,
    file: &str,
) -> Result<ActionType, ParsingError> {
    match tx_type {
        "INTEREST_FROM_CASH" => Ok(ActionType::Interest),
        "DIVIDEND" => Ok(ActionType::Dividend),
        "TOP_UP" | WITHDRAWAL => Ok(ActionType::Transfer),
        "ORDER" | FREESHARE_ORDER => match buy_sell {
            "BUY" => Ok(ActionType::Buy),
            "SELL" => Ok(ActionType::Sell),
            other => Err(ParsingError::new(
                file,
                ParsingErrorKind::UnknownBuySell(other.to_string()),
            )),
        },
        other => Err(ParsingError::new(
            file,
            ParsingErrorKind::UnknownType(other.to_string()),
        )),
    }
}

/// Parse a `2022-08-26T14:30:00.123Z` timestamp, keeping only the date.
pub fn parse_date(timestamp: &str) -> Result<NaiveDate, ParsingErrorKind> {
    let normalised = timestamp.replace('Z', "+00:00");
    if !has_fractional_seconds(&normalised) {
        return Err(ParsingErrorKind::InvalidDate(timestamp.to_string()));
    }
    DateTime::parse_from_str(&normalised, "%Y-%m-%dT%H:%M:%S%.f%:z")
        .map(|datetime| datetime.date_naive())
        .map_err(|_| ParsingErrorKind::InvalidDate(timestamp.to_string()))
}

/// Seconds must carry a `.` and 1 to 6 digits before the offset.
fn has_fractional_seconds(timestamp: &str) -> bool {
    let Some((_, time)) = timestamp.split_once('T') else {
        return false;
    };
    let time = time.split(['+', '-']).next().unwrap_or_default();
    match time.split_once('.') {
        Some((_, fraction)) => {
            (1..=6).contains(&fraction.len()) && fraction.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn decimal(column: &'static str, value: &str) -> Result<Decimal, ParsingErrorKind> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| ParsingErrorKind::InvalidNumber {
            column,
            value: value.to_string(),
        })
}

fn to_gbp(value: Decimal, rate: Decimal, column: &'static str) -> Result<Decimal, ParsingErrorKind> {
    if rate.is_zero() {
        return Err(ParsingErrorKind::ZeroRate { column });
    }
    value
        .checked_div(rate)
        .ok_or(ParsingErrorKind::RateOverflow { column })
}
