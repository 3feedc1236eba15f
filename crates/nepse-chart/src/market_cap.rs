use crate::{axis, Area};
use anyhow::{bail, Result};
use nepse_market::SymbolSeries;
use plotters::prelude::*;

pub(crate) fn draw(root: &Area, series: &SymbolSeries) -> Result<()> {
    let caps = series.values(|p| p.market_cap);
    let (Some(first), Some(last)) = (caps.first(), caps.last()) else {
        bail!("{} has no market capitalization to chart", series.symbol);
    };
    let Some(y) = axis::values(caps.iter().map(|(_, v)| *v)) else {
        bail!("{} has no finite market capitalization to chart", series.symbol);
    };

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("{} market capitalization", series.symbol),
            ("sans-serif", 24).into_font(),
        )
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(axis::days(first.0, last.0, 0.5), y)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|x| axis::label(*x))
        .y_label_formatter(&|y| axis::compact(*y))
        .y_desc("Market cap")
        .draw()?;

    let caps: Vec<(f64, f64)> = caps.iter().map(|(d, v)| (axis::day(*d), *v)).collect();
    chart.draw_series(LineSeries::new(caps.clone(), MAGENTA))?;
    chart.draw_series(caps.into_iter().map(|c| Circle::new(c, 3, MAGENTA.filled())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::tests::{point, series};
    use crate::{render, ChartKind};

    #[test]
    fn skips_days_without_a_value() {
        let mut gap = point(16, Some(518.0));
        gap.market_cap = None;
        let nabil = series("NABIL", vec![point(15, Some(512.5)), gap, point(17, Some(520.0))]);

        let svg = render(ChartKind::MarketCap, &nabil).unwrap();
        assert!(svg.contains("NABIL market capitalization"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }
}
