//! Line chart layout for a daily price series, rendered as SVG.
//!
//! Coordinates follow the screen convention: `y` grows downwards. The series
//! plotted is each day's `high`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::lookup::LookupResult;
use crate::{sort_by_date, DailyValue, Symbol, TradingDate};

pub const SIDE_PADDING: f64 = 0.2;
pub const TOP_BOTTOM_PADDING: f64 = 0.15;
pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 500;

const TITLE_MAX_FONT: f64 = 25.0;
const AXIS_FONT: u32 = 13;
const LINE_COLOR: &str = "rgb(0,0,200)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("nothing to draw")]
    Empty,
    #[error("chart size {width}x{height} leaves no room to plot")]
    TooSmall { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub y: i64,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub date: TradingDate,
    pub value: f64,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub x: i64,
    pub y: i64,
    pub font_size: i64,
    pub text: String,
}

/// Every coordinate needed to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: i64,
    pub height: i64,
    /// Left edge of the plot area.
    pub side: i64,
    /// Top edge of the plot area.
    pub top: i64,
    pub plot_width: i64,
    pub plot_height: i64,
    pub max_value: f64,
    pub min_value: f64,
    pub y_start: f64,
    pub value_per_px: f64,
    pub step: f64,
    pub step_px: f64,
    pub ticks: Vec<AxisTick>,
    pub points: Vec<PlotPoint>,
    pub title: TextLabel,
    pub first_date: TextLabel,
    pub last_date: TextLabel,
}

impl ChartLayout {
    pub fn for_lookup(result: &LookupResult, size: ChartSize) -> Result<Self, ChartError> {
        Self::compute(&result.values, &result.symbol, result.company_name.as_deref(), size)
    }

    pub fn compute(
        values: &[DailyValue],
        symbol: &Symbol,
        company_name: Option<&str>,
        size: ChartSize,
    ) -> Result<Self, ChartError> {
        if values.is_empty() {
            return Err(ChartError::Empty);
        }

        let width = f64::from(size.width);
        let height = f64::from(size.height);
        let plot_width = (width * (1.0 - SIDE_PADDING * 2.0)) as i64;
        let plot_height = (height * (1.0 - TOP_BOTTOM_PADDING * 2.0)) as i64;
        let side = (width * SIDE_PADDING) as i64;
        let top = (height * TOP_BOTTOM_PADDING) as i64;
        if plot_width <= 0 || plot_height <= 0 {
            return Err(ChartError::TooSmall {
                width: size.width,
                height: size.height,
            });
        }

        let mut series = values.to_vec();
        sort_by_date(&mut series);

        let mut max_value = 0.0_f64;
        let mut min_value = f64::MAX;
        let mut min_day = i64::MAX;
        let mut max_day = i64::MIN;
        for value in &series {
            max_value = max_value.max(value.high);
            min_value = min_value.min(value.high);
            min_day = min_day.min(value.date.epoch_day());
            max_day = max_day.max(value.date.epoch_day());
        }

        let floor = 0.0_f64.max(max_value - 1.5 * (max_value - min_value));
        let y_start = ((floor as i64) / 10 * 10) as f64;
        let h = plot_height as f64;
        let value_per_px = (max_value - y_start) / h;
        let mut step = (value_per_px * h / 5.0) as i64 as f64;
        if step > 5.0 {
            step = ((step as i64) / 5 * 5) as f64;
        }
        if step < 1.0 {
            step = 1.0;
        }
        let step_px = 1.0 / (value_per_px / step);

        let ticks = axis_ticks(top, plot_height, y_start, step, step_px);

        let value_span = max_value - y_start;
        let day_span = max_day - min_day;
        let points = series
            .iter()
            .map(|value| {
                let x = if day_span > 0 {
                    side + plot_width * (value.date.epoch_day() - min_day) / day_span
                } else {
                    side
                };
                let y = if value_span > 0.0 {
                    top + plot_height - (h * (value.high - y_start) / value_span) as i64
                } else {
                    top + plot_height
                };
                PlotPoint {
                    date: value.date,
                    value: value.high,
                    x,
                    y,
                }
            })
            .collect();

        let title = TextLabel {
            x: side,
            y: (top as f64 * 0.65) as i64,
            font_size: (top as f64 * 0.6).min(TITLE_MAX_FONT) as i64,
            text: format!("{} - {}", symbol, company_name.unwrap_or("unknown")),
        };

        let label_y = top + plot_height + 15;
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(ChartError::Empty),
        };
        let first_date = TextLabel {
            x: side,
            y: label_y,
            font_size: i64::from(AXIS_FONT),
            text: first.format_chart(),
        };
        let last_date = TextLabel {
            x: side + plot_width - 5,
            y: label_y,
            font_size: i64::from(AXIS_FONT),
            text: last.format_chart(),
        };

        Ok(Self {
            width: i64::from(size.width),
            height: i64::from(size.height),
            side,
            top,
            plot_width,
            plot_height,
            max_value,
            min_value,
            y_start,
            value_per_px,
            step,
            step_px,
            ticks,
            points,
            title,
            first_date,
            last_date,
        })
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_svg(&mut svg);
        svg
    }

    pub fn write_svg<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        let baseline = self.top + self.plot_height;

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(
            out,
            r#"  <rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        )?;
        write_text(out, &self.title, "black")?;

        writeln!(
            out,
            r#"  <g stroke="black" stroke-width="3" font-family="Calibri, sans-serif" font-size="{AXIS_FONT}">"#
        )?;
        writeln!(
            out,
            r#"    <line x1="{x}" y1="{baseline}" x2="{x}" y2="{top}"/>"#,
            x = self.side,
            top = self.top
        )?;
        for tick in &self.ticks {
            writeln!(
                out,
                r#"    <line x1="{}" y1="{y}" x2="{}" y2="{y}"/>"#,
                self.side - 5,
                self.side + 5,
                y = tick.y
            )?;
            writeln!(
                out,
                r#"    <text x="{}" y="{}" stroke="none" fill="black">{}</text>"#,
                self.side - 40,
                tick.y,
                tick.label
            )?;
        }
        writeln!(
            out,
            r#"    <line x1="{}" y1="{baseline}" x2="{}" y2="{baseline}"/>"#,
            self.side,
            self.side + self.plot_width
        )?;
        writeln!(out, "  </g>")?;
        write_text(out, &self.first_date, "black")?;
        write_text(out, &self.last_date, "black")?;

        if self.points.len() > 1 {
            write!(
                out,
                r#"  <polyline fill="none" stroke="{LINE_COLOR}" stroke-width="1" points=""#
            )?;
            for (index, point) in self.points.iter().enumerate() {
                if index > 0 {
                    out.write_char(' ')?;
                }
                write!(out, "{},{}", point.x, point.y)?;
            }
            writeln!(out, r#""/>"#)?;
        } else if let Some(point) = self.points.first() {
            writeln!(
                out,
                r#"  <circle cx="{}" cy="{}" r="2" fill="{LINE_COLOR}"/>"#,
                point.x, point.y
            )?;
        }

        writeln!(out, "</svg>")
    }
}

fn axis_ticks(top: i64, plot_height: i64, y_start: f64, step: f64, step_px: f64) -> Vec<AxisTick> {
    let mut ticks = Vec::new();
    let mut value = y_start;
    let mut y = (top + plot_height) as f64;
    let limit = top as f64;

    while y >= limit {
        ticks.push(AxisTick {
            y: y as i64,
            value,
            label: format!("{value:.2}"),
        });
        if !(step_px.is_finite() && step_px > 0.0) {
            break;
        }
        y -= step_px;
        value += step;
    }
    ticks
}

fn write_text<W: fmt::Write>(out: &mut W, label: &TextLabel, fill: &str) -> fmt::Result {
    writeln!(
        out,
        r#"  <text x="{}" y="{}" font-family="Calibri, sans-serif" font-size="{}" fill="{fill}">{}</text>"#,
        label.x,
        label.y,
        label.font_size,
        escape_xml(&label.text)
    )
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(date: &str, high: f64) -> DailyValue {
        DailyValue::new(TradingDate::parse(date).expect("date"), high, high, high, high)
            .expect("value")
    }

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("symbol")
    }

    #[test]
    fn padding_matches_default_panel() {
        let values = [value("2015-01-02", 10.0)];
        let layout =
            ChartLayout::compute(&values, &symbol(), None, ChartSize::default()).expect("layout");
        assert_eq!(
            (layout.side, layout.top, layout.plot_width, layout.plot_height),
            (100, 75, 300, 350)
        );
        assert_eq!(layout.title.font_size, 25);
        assert_eq!((layout.title.x, layout.title.y), (100, 48));
        assert_eq!(layout.title.text, "AAPL - unknown");
    }

    #[test]
    fn empty_series_is_rejected() {
        assert_eq!(
            ChartLayout::compute(&[], &symbol(), None, ChartSize::default()),
            Err(ChartError::Empty)
        );
    }

    #[test]
    fn tiny_canvas_is_rejected() {
        let size = ChartSize { width: 1, height: 1 };
        assert!(matches!(
            ChartLayout::compute(&[value("2015-01-02", 10.0)], &symbol(), None, size),
            Err(ChartError::TooSmall { .. })
        ));
    }

    #[test]
    fn escapes_company_names() {
        let layout = ChartLayout::compute(
            &[value("2015-01-02", 10.0), value("2015-01-03", 12.0)],
            &symbol(),
            Some("Procter & Gamble"),
            ChartSize::default(),
        )
        .expect("layout");
        let svg = layout.to_svg();
        assert!(svg.contains("AAPL - Procter &amp; Gamble"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
