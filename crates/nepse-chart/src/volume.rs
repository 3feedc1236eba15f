use crate::{axis, Area};
use anyhow::{bail, Result};
use nepse_market::SymbolSeries;
use plotters::prelude::*;

/// Traded quantity, one bar per business day.
pub(crate) fn draw(root: &Area, series: &SymbolSeries) -> Result<()> {
    let volumes = series.values(|p| p.volume);
    let (Some(first), Some(last)) = (volumes.first(), volumes.last()) else {
        bail!("{} has no traded volume to chart", series.symbol);
    };
    let Some(y) = axis::from_zero(volumes.iter().map(|(_, v)| *v)) else {
        bail!("{} has no finite volume to chart", series.symbol);
    };

    let mut chart = ChartBuilder::on(root)
        .caption(format!("{} volume", series.symbol), ("sans-serif", 24).into_font())
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(axis::days(first.0, last.0, 1.0), y)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(8)
        .x_label_formatter(&|x| axis::label(*x))
        .y_label_formatter(&|y| axis::compact(*y))
        .y_desc("Shares traded")
        .draw()?;

    chart.draw_series(volumes.iter().map(|(date, volume)| {
        let x = axis::day(*date);
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *volume)], GREEN.mix(0.6).filled())
    }))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::tests::{point, series};
    use crate::{render, ChartKind};

    #[test]
    fn one_bar_per_day() {
        let nabil = series(
            "NABIL",
            vec![point(15, Some(512.5)), point(16, Some(518.0)), point(17, None)],
        );
        let svg = render(ChartKind::Volume, &nabil).unwrap();

        assert!(svg.contains("NABIL volume"));
        assert!(svg.matches("<rect").count() >= 3);
    }

    #[test]
    fn no_volume_is_an_error() {
        let mut empty = point(15, Some(512.5));
        empty.volume = None;
        let nabil = series("NABIL", vec![empty]);

        assert!(render(ChartKind::Volume, &nabil).is_err());
    }
}
