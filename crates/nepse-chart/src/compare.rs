use crate::{axis, svg};
use anyhow::{bail, Result};
use log::warn;
use nepse_market::SymbolSeries;
use plotters::prelude::*;

/// Close prices of several symbols on one chart. With `rebase`, each line is
/// a percentage of its own first close (first = 100), so differently priced
/// stocks can be read against one another.
pub fn render_comparison(series: &[SymbolSeries], rebase: bool) -> Result<String> {
    let lines: Vec<(&str, Vec<(f64, f64)>)> = series
        .iter()
        .filter_map(|s| {
            let closes = s.values(|p| p.close);
            let base = closes.first().map(|(_, v)| *v)?;
            if rebase && base == 0.0 {
                warn!("{} first closed at 0; left out of the rebased comparison", s.symbol);
                return None;
            }
            let points = closes
                .iter()
                .map(|(date, close)| {
                    let y = if rebase { close / base * 100.0 } else { *close };
                    (axis::day(*date), y)
                })
                .collect();
            Some((s.symbol.as_str(), points))
        })
        .collect();

    for s in series {
        if !lines.iter().any(|(symbol, _)| *symbol == s.symbol) {
            warn!("{} has no close prices to compare", s.symbol);
        }
    }
    if lines.is_empty() {
        bail!("nothing to compare: no symbol has close prices");
    }

    let xs = lines.iter().flat_map(|(_, points)| points.iter().map(|(x, _)| *x));
    let (x_min, x_max) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
    let x = if x_min == x_max {
        x_min - 1.0..x_max + 1.0
    } else {
        x_min - 0.5..x_max + 0.5
    };
    let Some(y) = axis::values(lines.iter().flat_map(|(_, points)| points.iter().map(|(_, y)| *y)))
    else {
        bail!("nothing to compare: no finite close prices");
    };

    let symbols: Vec<&str> = lines.iter().map(|(symbol, _)| *symbol).collect();
    let caption = if rebase {
        format!("{} (rebased to 100)", symbols.join(" vs "))
    } else {
        symbols.join(" vs ")
    };

    svg(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", 24).into_font())
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(64)
            .build_cartesian_2d(x, y)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| axis::label(*x))
            .y_desc(if rebase { "Close (first = 100)" } else { "Close" })
            .draw()?;

        for (i, (symbol, points)) in lines.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color))?
                .label(*symbol)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart.draw_series(points.iter().map(|&c| Circle::new(c, 3, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    })
}
