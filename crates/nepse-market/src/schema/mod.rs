pub mod common_de;
pub mod row;

pub use row::StockRow;
