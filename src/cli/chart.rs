//! Plain-text rendering of a [`Chart`] for the terminal.

use crate::core::chart::{Chart, ChartKind};
use crate::core::metric::format_number;
use console::style;

const MIN_HEIGHT: usize = 3;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Empty,
    Reference,
    Point,
    Stem,
    Wick,
    BodyUp,
    BodyDown,
}

impl Mark {
    fn render(self) -> String {
        match self {
            Mark::Empty => " ".to_string(),
            Mark::Reference => style("·").dim().to_string(),
            Mark::Point => style("●").cyan().to_string(),
            Mark::Stem => style("│").cyan().to_string(),
            Mark::Wick => "│".to_string(),
            Mark::BodyUp => style("█").green().to_string(),
            Mark::BodyDown => style("█").red().to_string(),
        }
    }
}

/// Maps `value` onto a row index, 0 being the top of the plot.
fn row_of(value: f64, (lo, hi): (f64, f64), height: usize) -> usize {
    let span = hi - lo;
    if span <= 0.0 || !value.is_finite() {
        return height / 2;
    }
    let scaled = (hi - value) / span * (height - 1) as f64;
    (scaled.round().max(0.0) as usize).min(height - 1)
}

/// Renders `chart` into `height` plot rows with a Y-axis gutter, an X axis
/// and the first and last dates underneath.
pub fn render_chart(chart: &Chart, height: usize) -> String {
    let height = height.max(MIN_HEIGHT);
    let columns = chart.bars.len();
    let mut grid = vec![vec![Mark::Empty; columns]; height];

    let mut previous_row: Option<usize> = None;
    for (col, bar) in chart.bars.iter().enumerate() {
        match chart.kind {
            ChartKind::Line => {
                let row = row_of(bar.close, chart.y_range, height);
                if let Some(prev) = previous_row {
                    let (top, bottom) = (prev.min(row), prev.max(row));
                    for line in grid.iter_mut().take(bottom).skip(top + 1) {
                        line[col] = Mark::Stem;
                    }
                }
                grid[row][col] = Mark::Point;
                previous_row = Some(row);
            }
            ChartKind::Candlestick => {
                let high = row_of(bar.high, chart.y_range, height);
                let low = row_of(bar.low, chart.y_range, height);
                for line in grid.iter_mut().take(low + 1).skip(high) {
                    line[col] = Mark::Wick;
                }
                let open = row_of(bar.open, chart.y_range, height);
                let close = row_of(bar.close, chart.y_range, height);
                let body = if bar.close >= bar.open {
                    Mark::BodyUp
                } else {
                    Mark::BodyDown
                };
                for line in grid
                    .iter_mut()
                    .take(open.max(close) + 1)
                    .skip(open.min(close))
                {
                    line[col] = body;
                }
            }
        }
    }

    let reference_row = row_of(chart.reference, chart.y_range, height);
    for mark in grid[reference_row].iter_mut() {
        if *mark == Mark::Empty {
            *mark = Mark::Reference;
        }
    }

    let (lo, hi) = chart.y_range;
    let top_label = format_number(hi, 2);
    let reference_label = format_number(chart.reference, 2);
    let bottom_label = format_number(lo, 2);
    let gutter = top_label
        .len()
        .max(reference_label.len())
        .max(bottom_label.len());

    let mut out = String::new();
    for (row, line) in grid.iter().enumerate() {
        // The reference label wins over the top/bottom labels on the same row
        let label = if row == reference_row {
            reference_label.as_str()
        } else if row == 0 {
            top_label.as_str()
        } else if row == height - 1 {
            bottom_label.as_str()
        } else {
            ""
        };
        out.push_str(&format!("{label:>gutter$} ┤"));
        for mark in line {
            out.push_str(&mark.render());
        }
        out.push('\n');
    }

    out.push_str(&format!("{:>gutter$} └{}\n", "", "─".repeat(columns)));
    let first = chart.first_label().unwrap_or_default();
    let last = chart.last_label().unwrap_or_default();
    let pad = (columns + 1).saturating_sub(first.len() + last.len()).max(1);
    out.push_str(&format!("{:>gutter$}  {first}{:pad$}{last}\n", "", ""));
    out
}
