use crate::schema::StockRow;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

/// Every row read from one (or several merged) `.csv` exports.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<StockRow>,
    skipped: usize,
}

impl Dataset {
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Read a headed `.csv`. Blank lines are ignored, & rows the schema can't
    /// read are logged and skipped, rather than failing the whole file.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        // without these two columns every row would be skipped; say so up front
        let headers = reader.headers()?.clone();
        for required in ["BUSINESS_DATE", "SYMBOL"] {
            if !headers.iter().any(|h| h.eq_ignore_ascii_case(required)) {
                bail!("missing required column {required}; found {headers:?}");
            }
        }

        let mut rows = Vec::new();
        let mut skipped = 0;
        for (i, result) in reader.deserialize::<StockRow>().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    // +2: one for the header, one for 1-based line numbers
                    warn!("skipping row {}: {e}", i + 2);
                    skipped += 1;
                }
            }
        }

        debug!("parsed {} rows ({skipped} skipped)", rows.len());
        Ok(Self { rows, skipped })
    }

    /// Concatenate several datasets, e.g., one per daily export.
    pub fn merge(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        datasets
            .into_iter()
            .fold(Self::default(), |mut acc, mut next| {
                acc.rows.append(&mut next.rows);
                acc.skipped += next.skipped;
                acc
            })
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped while parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Unique symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.symbol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Unique business dates, sorted.
    pub fn business_dates(&self) -> Vec<NaiveDate> {
        self.rows
            .iter()
            .map(|row| row.business_date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows for `symbol` (case-insensitive), oldest first.
    pub fn filter(&self, symbol: &str) -> Vec<&StockRow> {
        let mut rows: Vec<&StockRow> = self.rows.iter().filter(|row| row.is_symbol(symbol)).collect();
        rows.sort_by_key(|row| row.business_date);
        rows
    }

    /// Chartable series for `symbol`: one point per business date, where a
    /// later row for the same date replaces an earlier one.
    pub fn series(&self, symbol: &str) -> Option<SymbolSeries> {
        let rows = self.filter(symbol);
        let first = rows.first()?;

        let mut name = None;
        let mut points = BTreeMap::new();
        for row in &rows {
            if row.security_name.is_some() {
                name = row.security_name.clone();
            }
            points.insert(row.business_date, PricePoint::from(*row));
        }

        Some(SymbolSeries {
            symbol: first.symbol.clone(),
            name,
            points: points.into_values().collect(),
        })
    }
}

/// One business day of a single symbol.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub previous_close: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

impl From<&StockRow> for PricePoint {
    fn from(row: &StockRow) -> Self {
        Self {
            date: row.business_date,
            open: row.open_price,
            high: row.high_price,
            low: row.low_price,
            close: row.close_price,
            previous_close: row.previous_day_close_price,
            volume: row.total_traded_quantity,
            market_cap: row.market_capitalization,
        }
    }
}

/// Price history of a single symbol, oldest first, no duplicate dates.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    pub symbol: String,
    pub name: Option<String>,
    pub points: Vec<PricePoint>,
}

impl SymbolSeries {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// `(date, value)` pairs for every point where `field` has a value.
    pub fn values<F>(&self, field: F) -> Vec<(NaiveDate, f64)>
    where
        F: Fn(&PricePoint) -> Option<f64>,
    {
        self.points
            .iter()
            .filter_map(|p| field(p).map(|v| (p.date, v)))
            .collect()
    }

    pub fn summary(&self) -> SymbolSummary {
        let closes = self.values(|p| p.close);
        let first_close = closes.first().map(|(_, v)| *v);
        let last_close = closes.last().map(|(_, v)| *v);

        // over a history compare the ends; a single snapshot only knows yesterday
        let base = if closes.len() > 1 {
            first_close
        } else {
            self.points.last().and_then(|p| p.previous_close)
        };
        let change_pct = match (base, last_close) {
            (Some(base), Some(last)) if base != 0.0 => Some((last - base) / base * 100.0),
            _ => None,
        };

        let high = self
            .points
            .iter()
            .filter_map(|p| p.high.or(p.close))
            .reduce(f64::max);
        let low = self
            .points
            .iter()
            .filter_map(|p| p.low.or(p.close))
            .reduce(f64::min);
        let volumes = self.values(|p| p.volume);
        let total_volume = (!volumes.is_empty()).then(|| volumes.iter().map(|(_, v)| v).sum());

        SymbolSummary {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            first_date: self.first_date(),
            last_date: self.last_date(),
            points: self.points.len(),
            last_close,
            change_pct,
            high,
            low,
            total_volume,
            market_cap: self.values(|p| p.market_cap).last().map(|(_, v)| *v),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SymbolSummary {
    pub symbol: String,
    pub name: Option<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub points: usize,
    pub last_close: Option<f64>,
    pub change_pct: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub total_volume: Option<f64>,
    pub market_cap: Option<f64>,
}
