use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;

/// Currency every transaction is normalised into.
pub const TARGET_CURRENCY: &str = "GBP";

/// Kind of financial event a broker row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Buy,
    Sell,
    Dividend,
    /// Cash moved into or out of the account
    Transfer,
    Interest,
}

impl ActionType {
    /// Cash-only actions are the only ones allowed without a ticker
    pub fn requires_symbol(&self) -> bool {
        !matches!(self, ActionType::Transfer | ActionType::Interest)
    }

    pub fn display(&self) -> &'static str {
        match self {
            ActionType::Buy => "BUY",
            ActionType::Sell => "SELL",
            ActionType::Dividend => "DIVIDEND",
            ActionType::Transfer => "TRANSFER",
            ActionType::Interest => "INTEREST",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A broker transaction normalised into GBP.
///
/// `amount` is signed by cash flow: money leaving the account (buys,
/// withdrawals) is negative. Decimals serialize as strings to keep their
/// precision.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BrokerTransaction {
    pub date: NaiveDate,
    pub action: ActionType,
    /// Ticker, absent for transfers and interest
    pub symbol: Option<String>,
    pub description: String,
    #[schemars(with = "Option<String>")]
    pub quantity: Option<Decimal>,
    /// Price per share in GBP
    #[schemars(with = "Option<String>")]
    pub price: Option<Decimal>,
    #[schemars(with = "String")]
    pub fees: Decimal,
    #[schemars(with = "String")]
    pub amount: Decimal,
    pub currency: String,
    pub broker: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cash_actions_skip_symbol() {
        assert!(ActionType::Buy.requires_symbol());
        assert!(ActionType::Sell.requires_symbol());
        assert!(ActionType::Dividend.requires_symbol());
        assert!(!ActionType::Transfer.requires_symbol());
        assert!(!ActionType::Interest.requires_symbol());
    }

    #[test]
    fn json_output_matches_schema_types() {
        use rust_decimal_macros::dec;

        let tx = BrokerTransaction {
            date: NaiveDate::from_ymd_opt(2022, 5, 10).unwrap(),
            action: ActionType::Buy,
            symbol: Some("TSLA".to_string()),
            description: "Tesla BUY".to_string(),
            quantity: Some(dec!(3)),
            price: Some(dec!(640)),
            fees: Decimal::ZERO,
            amount: dec!(-1920),
            currency: "GBP".to_string(),
            broker: "Freetrade".to_string(),
        };
        let value = serde_json::to_value(&tx).unwrap();
        let schema = serde_json::to_value(schemars::schema_for!(BrokerTransaction)).unwrap();
        let properties = &schema["properties"];

        for field in ["amount", "fees"] {
            assert!(value[field].is_string(), "{} is not a string", field);
            assert_eq!(properties[field]["type"], "string", "{}", field);
        }
        for field in ["quantity", "price"] {
            assert!(value[field].is_string(), "{} is not a string", field);
            let types = properties[field]["type"].as_array().unwrap();
            assert!(types.contains(&serde_json::json!("string")), "{}", field);
            assert!(types.contains(&serde_json::json!("null")), "{}", field);
        }
    }

    #[test]
    fn action_display() {
        assert_eq!(ActionType::Buy.to_string(), "BUY");
        assert_eq!(ActionType::Transfer.to_string(), "TRANSFER");
    }
}
