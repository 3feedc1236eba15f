//! SVG charts of a [`SymbolSeries`], drawn with [`plotters`].
//!
//! [`plotters`]: https://docs.rs/plotters/latest/plotters/
mod axis;
mod compare;
mod market_cap;
mod price;
mod volume;

use anyhow::Result;
use log::debug;
use nepse_market::SymbolSeries;
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub use compare::render_comparison;

pub(crate) type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub const SIZE: (u32, u32) = (1024, 576);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Price,
    Volume,
    MarketCap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Price, ChartKind::Volume, ChartKind::MarketCap];

    /// File name suffix.
    pub fn stem(&self) -> &'static str {
        match self {
            ChartKind::Price => "price",
            ChartKind::Volume => "volume",
            ChartKind::MarketCap => "market_cap",
        }
    }
}

/// Draw one chart of `series` as an SVG document.
pub fn render(kind: ChartKind, series: &SymbolSeries) -> Result<String> {
    svg(|root| match kind {
        ChartKind::Price => price::draw(root, series),
        ChartKind::Volume => volume::draw(root, series),
        ChartKind::MarketCap => market_cap::draw(root, series),
    })
}

/// Render each of `kinds` (in parallel) to `<dir>/<SYMBOL>_<stem>.svg`,
/// returning the paths written.
pub fn render_to_dir(series: &SymbolSeries, kinds: &[ChartKind], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    kinds
        .par_iter()
        .map(|kind| -> Result<PathBuf> {
            let path = dir.join(format!("{}_{}.svg", file_safe(&series.symbol), kind.stem()));
            std::fs::write(&path, render(*kind, series)?)?;
            debug!("{} {:?} chart written to {}", series.symbol, kind, path.display());
            Ok(path)
        })
        .collect()
}

/// Symbols go into file names; keep them to `[A-Za-z0-9_-]`.
pub fn file_safe(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

pub(crate) fn svg<F>(draw: F) -> Result<String>
where
    F: FnOnce(&Area) -> Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}
