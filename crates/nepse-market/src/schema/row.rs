use super::common_de::{de_date, de_opt_num, de_trimmed};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single row of the daily NEPSE price export, i.e.,
///
/// ```text
/// BUSINESS_DATE,SECURITY_ID,SYMBOL,SECURITY_NAME,OPEN_PRICE,HIGH_PRICE,LOW_PRICE,CLOSE_PRICE,...
/// 2024-09-15,131,NABIL,Nabil Bank Limited,510,515.9,505,512.5,...
/// ```
///
/// Only `BUSINESS_DATE` & `SYMBOL` are required; unknown columns are ignored.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StockRow {
    #[serde(rename = "BUSINESS_DATE", alias = "business_date", deserialize_with = "de_date")]
    pub business_date: NaiveDate,

    #[serde(rename = "SECURITY_ID", alias = "security_id", default)]
    pub security_id: Option<String>,

    #[serde(rename = "SYMBOL", alias = "symbol", deserialize_with = "de_trimmed")]
    pub symbol: String,

    #[serde(rename = "SECURITY_NAME", alias = "security_name", default)]
    pub security_name: Option<String>,

    #[serde(rename = "OPEN_PRICE", alias = "open_price", default, deserialize_with = "de_opt_num")]
    pub open_price: Option<f64>,

    #[serde(rename = "HIGH_PRICE", alias = "high_price", default, deserialize_with = "de_opt_num")]
    pub high_price: Option<f64>,

    #[serde(rename = "LOW_PRICE", alias = "low_price", default, deserialize_with = "de_opt_num")]
    pub low_price: Option<f64>,

    #[serde(rename = "CLOSE_PRICE", alias = "close_price", default, deserialize_with = "de_opt_num")]
    pub close_price: Option<f64>,

    #[serde(
        rename = "TOTAL_TRADED_QUANTITY",
        alias = "total_traded_quantity",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub total_traded_quantity: Option<f64>,

    #[serde(
        rename = "TOTAL_TRADED_VALUE",
        alias = "total_traded_value",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub total_traded_value: Option<f64>,

    #[serde(
        rename = "PREVIOUS_DAY_CLOSE_PRICE",
        alias = "previous_day_close_price",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub previous_day_close_price: Option<f64>,

    #[serde(
        rename = "FIFTY_TWO_WEEKS_HIGH",
        alias = "fifty_two_weeks_high",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub fifty_two_weeks_high: Option<f64>,

    #[serde(
        rename = "FIFTY_TWO_WEEKS_LOW",
        alias = "fifty_two_weeks_low",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub fifty_two_weeks_low: Option<f64>,

    #[serde(rename = "TOTAL_TRADES", alias = "total_trades", default, deserialize_with = "de_opt_num")]
    pub total_trades: Option<f64>,

    #[serde(
        rename = "AVERAGE_TRADED_PRICE",
        alias = "average_traded_price",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub average_traded_price: Option<f64>,

    #[serde(
        rename = "MARKET_CAPITALIZATION",
        alias = "market_capitalization",
        default,
        deserialize_with = "de_opt_num"
    )]
    pub market_capitalization: Option<f64>,
}

impl StockRow {
    /// Case-insensitive symbol comparison; tickers are upper case in the
    /// exports, but users type whatever they like.
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(symbol.trim())
    }
}
