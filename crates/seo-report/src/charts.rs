//! SVG chart images drawn with `plotters`.
//!
//! Each [`ChartData`] renders to a standalone SVG file written next to its
//! JSON data. The dashboard embeds the files by reference.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::{ReportError, Result};
use crate::stats::{Bar, BoxStats, ChartData, HistogramBin};

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 400;

const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(76, 120, 168);
const MISSING_CELL: RGBColor = RGBColor(220, 220, 220);
/// Half the width of a box in the box plot, in pixels.
const BOX_HALF_WIDTH: i32 = 18;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult<T> = std::result::Result<T, DrawingAreaErrorKind<io::Error>>;

/// Renders `chart` and writes the SVG to `path`.
pub fn write_chart_image(chart: &ChartData, path: &Path) -> Result<()> {
    let svg = render_svg(chart).map_err(|err| ReportError::Chart {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    fs::write(path, svg).map_err(|source| ReportError::io(path, source))
}

/// Renders `chart` as an SVG document.
pub fn render_svg(chart: &ChartData) -> DrawResult<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;
        match chart {
            ChartData::Bar {
                title,
                x_label,
                bars,
            } => draw_bars(&root, title, x_label, bars)?,
            ChartData::Histogram {
                title,
                x_label,
                bins,
            } => draw_histogram(&root, title, x_label, bins)?,
            ChartData::Scatter {
                title,
                x_label,
                y_label,
                points,
            } => draw_scatter(&root, title, (x_label.as_str(), y_label.as_str()), points)?,
            ChartData::Correlation {
                title,
                columns,
                matrix,
            } => draw_heatmap(&root, title, columns, matrix)?,
            ChartData::BoxPlot {
                title,
                y_label,
                groups,
            } => draw_box_plot(&root, title, y_label, groups)?,
        }
        root.present()?;
    }
    Ok(svg)
}

fn draw_empty(root: &Area<'_>, title: &str) -> DrawResult<()> {
    let area = root.titled(title, (FONT, 20))?;
    let (width, height) = area.dim_in_pixel();
    let origin = (
        i32::try_from(width / 2).unwrap_or(0) - 30,
        i32::try_from(height / 2).unwrap_or(0) - 10,
    );
    area.draw(&Text::new("No data", origin, (FONT, 16).into_font()))?;
    Ok(())
}

fn draw_bars(root: &Area<'_>, title: &str, x_label: &str, bars: &[Bar]) -> DrawResult<()> {
    if bars.is_empty() {
        return draw_empty(root, title);
    }
    let top = count_u32(bars.iter().map(|bar| bar.count).max().unwrap_or(0));
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            (0u32..last_key(bars.len())).into_segmented(),
            0u32..headroom(top),
        )?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(idx) => bars
                .get(*idx as usize)
                .map(|bar| bar.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(x_label)
        .y_desc("URLs")
        .draw()?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.mix(0.8).filled())
            .margin(8)
            .data(
                bars.iter()
                    .enumerate()
                    .map(|(idx, bar)| (count_u32(idx), count_u32(bar.count))),
            ),
    )?;
    Ok(())
}

fn draw_histogram(
    root: &Area<'_>,
    title: &str,
    x_label: &str,
    bins: &[HistogramBin],
) -> DrawResult<()> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return draw_empty(root, title);
    };
    let top = count_u32(bins.iter().map(|bin| bin.count).max().unwrap_or(0));
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(first.start..last.end, 0u32..headroom(top))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_label)
        .y_desc("Pages")
        .draw()?;
    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0), (bin.end, count_u32(bin.count))],
            BAR_COLOR.mix(0.8).filled(),
        )
    }))?;
    Ok(())
}

fn draw_scatter(
    root: &Area<'_>,
    title: &str,
    (x_label, y_label): (&str, &str),
    points: &[[f64; 2]],
) -> DrawResult<()> {
    if points.is_empty() {
        return draw_empty(root, title);
    }
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p[0])),
            padded_range(points.iter().map(|p| p[1])),
        )?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|[x, y]| Circle::new((*x, *y), 3, BAR_COLOR.mix(0.5).filled())),
    )?;
    Ok(())
}

fn draw_heatmap(
    root: &Area<'_>,
    title: &str,
    columns: &[String],
    matrix: &[Vec<Option<f64>>],
) -> DrawResult<()> {
    if columns.is_empty() {
        return draw_empty(root, title);
    }
    let keys = 0u32..last_key(columns.len());
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(keys.clone().into_segmented(), keys.into_segmented())?;
    let label = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(idx) => columns.get(*idx as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns.len())
        .y_labels(columns.len())
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .draw()?;

    let cells: Vec<(u32, u32, Option<f64>)> = matrix
        .iter()
        .enumerate()
        .flat_map(|(row, values)| {
            values
                .iter()
                .enumerate()
                .map(move |(col, value)| (count_u32(col), count_u32(row), *value))
        })
        .collect();
    chart.draw_series(cells.iter().map(|(x, y, value)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(*x), SegmentValue::Exact(*y)),
                (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
            ],
            correlation_color(*value).filled(),
        )
    }))?;
    chart.draw_series(cells.iter().map(|(x, y, value)| {
        let text = value.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
        Text::new(
            text,
            (SegmentValue::CenterOf(*x), SegmentValue::CenterOf(*y)),
            (FONT, 14).into_font(),
        )
    }))?;
    Ok(())
}

fn draw_box_plot(
    root: &Area<'_>,
    title: &str,
    y_label: &str,
    groups: &[BoxStats],
) -> DrawResult<()> {
    if groups.is_empty() {
        return draw_empty(root, title);
    }
    let y_range = padded_range(groups.iter().flat_map(|g| [g.min, g.max]));
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..last_key(groups.len())).into_segmented(), y_range)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&|value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(idx) => groups
                .get(*idx as usize)
                .map(|group| group.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc(y_label)
        .draw()?;

    // Boxes are drawn in backend pixels so they can be narrower than a slot.
    for (idx, group) in groups.iter().enumerate() {
        let at = |value: f64| chart.backend_coord(&(SegmentValue::CenterOf(count_u32(idx)), value));
        let (x, q1) = at(group.q1);
        let (_, q3) = at(group.q3);
        let (_, median) = at(group.median);
        let (_, min) = at(group.min);
        let (_, max) = at(group.max);
        let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
        root.draw(&Rectangle::new([(left, q3), (right, q1)], BAR_COLOR.mix(0.4).filled()))?;
        root.draw(&Rectangle::new([(left, q3), (right, q1)], BLACK.stroke_width(1)))?;
        root.draw(&PathElement::new(
            vec![(left, median), (right, median)],
            BLACK.stroke_width(2),
        ))?;
        for (end, edge) in [(max, q3), (min, q1)] {
            root.draw(&PathElement::new(vec![(x, edge), (x, end)], &BLACK))?;
            root.draw(&PathElement::new(
                vec![(x - BOX_HALF_WIDTH / 2, end), (x + BOX_HALF_WIDTH / 2, end)],
                &BLACK,
            ))?;
        }
    }
    Ok(())
}

/// Blue for negative, white for zero, red for positive coefficients.
fn correlation_color(value: Option<f64>) -> RGBColor {
    let Some(r) = value else {
        return MISSING_CELL;
    };
    let fade = (255.0 * (1.0 - r.abs().min(1.0))).round() as u8;
    if r >= 0.0 {
        RGBColor(255, fade, fade)
    } else {
        RGBColor(fade, fade, 255)
    }
}

/// Upper bound of a segmented key range over `len` slots. Integer ranges are
/// inclusive, so `len` slots end at `len - 1`; a single slot still needs a
/// non-empty range.
fn last_key(len: usize) -> u32 {
    count_u32(len.saturating_sub(1)).max(1)
}

fn headroom(top: u32) -> u32 {
    top.saturating_add(top / 10).saturating_add(1)
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad)..(hi + pad)
}
