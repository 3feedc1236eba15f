use crate::{axis, Area};
use anyhow::{bail, Result};
use nepse_market::SymbolSeries;
use plotters::prelude::*;

/// Close line (with markers), open line, & the shaded high/low band.
pub(crate) fn draw(root: &Area, series: &SymbolSeries) -> Result<()> {
    let closes = series.values(|p| p.close);
    let (Some(first), Some(last)) = (closes.first(), closes.last()) else {
        bail!("{} has no close prices to chart", series.symbol);
    };
    let opens = series.values(|p| p.open);
    let ranges: Vec<_> = series
        .points
        .iter()
        .filter_map(|p| Some((axis::day(p.date), p.high?, p.low?)))
        .collect();

    let x = axis::days(first.0, last.0, 0.5);
    let Some(y) = axis::values(
        closes
            .iter()
            .chain(opens.iter())
            .map(|(_, v)| *v)
            .chain(ranges.iter().flat_map(|(_, high, low)| [*high, *low])),
    ) else {
        bail!("{} has no finite prices to chart", series.symbol);
    };

    let mut chart = ChartBuilder::on(root)
        .caption(format!("{} price", series.symbol), ("sans-serif", 24).into_font())
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(x, y)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|x| axis::label(*x))
        .y_desc("Price")
        .draw()?;

    let band = BLUE.mix(0.15);
    if ranges.len() > 1 {
        // highs left to right, then lows back again
        let outline: Vec<(f64, f64)> = ranges
            .iter()
            .map(|&(x, high, _)| (x, high))
            .chain(ranges.iter().rev().map(|&(x, _, low)| (x, low)))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(outline, band.filled())))?
            .label("High/Low")
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], band.filled()));
    } else if let Some(&(x, high, low)) = ranges.first() {
        // one day has no area; a bar stands in
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x, low), (x, high)],
                BLUE.mix(0.3).stroke_width(3),
            )))?
            .label("High/Low")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], BLUE.mix(0.3).stroke_width(3))
            });
    }

    if !opens.is_empty() {
        let opens: Vec<(f64, f64)> = opens.iter().map(|(d, v)| (axis::day(*d), *v)).collect();
        chart
            .draw_series(LineSeries::new(opens, RED.mix(0.7)))?
            .label("Open")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.mix(0.7)));
    }

    let closes: Vec<(f64, f64)> = closes.iter().map(|(d, v)| (axis::day(*d), *v)).collect();
    chart
        .draw_series(LineSeries::new(closes.clone(), BLUE))?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart.draw_series(closes.into_iter().map(|c| Circle::new(c, 3, BLUE.filled())))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::tests::{point, series};
    use crate::{render, ChartKind};

    #[test]
    fn draws_every_layer() {
        let nabil = series("NABIL", vec![point(15, Some(512.5)), point(16, Some(518.0))]);
        let svg = render(ChartKind::Price, &nabil).unwrap();

        assert!(svg.contains("NABIL price"));
        assert!(svg.contains("Close"));
        assert!(svg.contains("Open"));
        assert!(svg.contains("High/Low"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn band_needs_high_and_low() {
        let mut days = vec![point(15, Some(512.5)), point(16, Some(518.0))];
        for day in &mut days {
            day.high = None;
        }
        let svg = render(ChartKind::Price, &series("NABIL", days)).unwrap();

        assert!(!svg.contains("<polygon"));
        assert!(!svg.contains("High/Low"));
    }

    #[test]
    fn single_snapshot_still_renders() {
        let nabil = series("NABIL", vec![point(15, Some(512.5))]);
        let svg = render(ChartKind::Price, &nabil).unwrap();

        assert!(svg.contains("High/Low"));
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn no_closes_is_an_error() {
        let nabil = series("NABIL", vec![point(15, None), point(16, None)]);
        let err = render(ChartKind::Price, &nabil).unwrap_err();
        assert!(err.to_string().contains("no close prices"));
    }
}
