//! Market data for the NEPSE exports: where the daily `.csv` files live
//! ([`bucket`], [`source`]), how a row reads ([`schema`]), and how rows
//! become chartable series ([`dataset`]).
pub mod bucket;
pub mod config;
pub mod dataset;
pub mod filename;
pub mod schema;
pub mod source;

pub use bucket::{Bucket, ObjectEntry};
pub use config::Config;
pub use dataset::{Dataset, PricePoint, SymbolSeries, SymbolSummary};
pub use schema::StockRow;
pub use source::Source;
