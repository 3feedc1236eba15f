use chrono::{Datelike, NaiveDate};
use std::ops::Range;

/// Dates are plotted as days since the common era.
pub(crate) fn day(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub(crate) fn label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Span of `first..=last`, widened by `pad` days each side; a single day
/// is always widened, or there'd be nothing to draw between.
pub(crate) fn days(first: NaiveDate, last: NaiveDate, pad: f64) -> Range<f64> {
    let pad = if first == last { pad.max(1.0) } else { pad };
    day(first) - pad..day(last) + pad
}

/// Value span with 5% headroom either side.
pub(crate) fn values(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((min, max)) => Some((min.min(v), max.max(v))),
            None => Some((v, v)),
        })?;
    let pad = if max > min { (max - min) * 0.05 } else { (max.abs() * 0.05).max(1.0) };
    Some(min - pad..max + pad)
}

/// `0..max` with 10% headroom, for bars.
pub(crate) fn from_zero(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .reduce(f64::max)?;
    Some(0.0..if max > 0.0 { max * 1.1 } else { 1.0 })
}

/// `1234567.0 -> 1.2M`
pub(crate) fn compact(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e12 {
        format!("{:.1}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
