//! Text-mode charts
//!
//! A [`Figure`] collects x/y series with style hints and renders them through
//! plotters onto [`TextBackend`], a drawing backend that rasterizes into a grid
//! of terminal character cells.

use colored::Colorize;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DietError, Result};

/// Columns reserved left of the plot for y tick labels
const Y_LABEL_CELLS: u32 = 9;
/// Rows reserved below the plot for x tick labels
const X_LABEL_CELLS: u32 = 2;
const MARGIN_CELLS: u32 = 1;
/// Largest plot area accepted, in columns
pub const MAX_WIDTH: u32 = 400;
/// Largest plot area accepted, in rows
pub const MAX_HEIGHT: u32 = 200;
const FONT: &str = "monospace";
/// Ink for series without a color token; black is reserved for axes and frames
const DEFAULT_INK: RGBColor = RGBColor(128, 128, 128);
/// Fill that clears cells back to blank
const PAPER: RGBColor = WHITE;

/// Formats a tick value into its label
pub type TickFormatter = Box<dyn Fn(f64) -> String>;

/// Series colors understood by the text renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl SeriesColor {
    const ALL: [SeriesColor; 7] = [
        SeriesColor::Red,
        SeriesColor::Green,
        SeriesColor::Blue,
        SeriesColor::Yellow,
        SeriesColor::Cyan,
        SeriesColor::Magenta,
        SeriesColor::White,
    ];

    /// Drawing color handed to plotters; each token maps to a distinct RGB value
    fn rgb(&self) -> RGBColor {
        match self {
            SeriesColor::Red => RGBColor(255, 0, 0),
            SeriesColor::Green => RGBColor(0, 255, 0),
            SeriesColor::Blue => RGBColor(0, 0, 255),
            SeriesColor::Yellow => RGBColor(255, 255, 0),
            SeriesColor::Cyan => RGBColor(0, 255, 255),
            SeriesColor::Magenta => RGBColor(255, 0, 255),
            SeriesColor::White => RGBColor(254, 254, 254),
        }
    }

    fn from_backend(color: BackendColor) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| {
            let RGBColor(r, g, b) = c.rgb();
            color.rgb == (r, g, b)
        })
    }

    fn terminal(&self) -> colored::Color {
        match self {
            SeriesColor::Red => colored::Color::Red,
            SeriesColor::Green => colored::Color::Green,
            SeriesColor::Blue => colored::Color::Blue,
            SeriesColor::Yellow => colored::Color::Yellow,
            SeriesColor::Cyan => colored::Color::Cyan,
            SeriesColor::Magenta => colored::Color::Magenta,
            SeriesColor::White => colored::Color::White,
        }
    }
}

impl fmt::Display for SeriesColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeriesColor::Red => "red",
            SeriesColor::Green => "green",
            SeriesColor::Blue => "blue",
            SeriesColor::Yellow => "yellow",
            SeriesColor::Cyan => "cyan",
            SeriesColor::Magenta => "magenta",
            SeriesColor::White => "white",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SeriesColor {
    type Err = DietError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| DietError::InvalidArgument(format!("unknown color '{}'", s)))
    }
}

/// Per-series style hints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesStyle {
    pub color: Option<SeriesColor>,
    /// Legend entry; unlabeled series are left out of the legend
    pub label: Option<String>,
    /// Glyph drawn at each point instead of connecting them with a line
    pub marker: Option<char>,
}

impl SeriesStyle {
    pub fn line(color: SeriesColor) -> Self {
        SeriesStyle {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn labeled(color: SeriesColor, label: impl Into<String>) -> Self {
        SeriesStyle {
            color: Some(color),
            label: Some(label.into()),
            marker: None,
        }
    }

    pub fn markers(color: SeriesColor, marker: char) -> Self {
        SeriesStyle {
            color: Some(color),
            label: None,
            marker: Some(marker),
        }
    }
}

#[derive(Debug, Clone)]
struct Series {
    points: Vec<(f64, f64)>,
    style: SeriesStyle,
}

/// A text figure sized in character cells
pub struct Figure {
    /// Plot area width in columns
    pub width: u32,
    /// Plot area height in rows
    pub height: u32,
    /// Emit ANSI colors for colored series
    pub color: bool,
    x_limits: Option<(f64, f64)>,
    y_limits: Option<(f64, f64)>,
    x_ticks: Option<TickFormatter>,
    y_ticks: Option<TickFormatter>,
    series: Vec<Series>,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Figure {
            width: width.clamp(10, MAX_WIDTH),
            height: height.clamp(4, MAX_HEIGHT),
            color: false,
            x_limits: None,
            y_limits: None,
            x_ticks: None,
            y_ticks: None,
            series: Vec::new(),
        }
    }

    pub fn set_x_limits(&mut self, min: f64, max: f64) {
        self.x_limits = Some((min, max));
    }

    pub fn set_y_limits(&mut self, min: f64, max: f64) {
        self.y_limits = Some((min, max));
    }

    pub fn set_x_ticks_fn(&mut self, formatter: impl Fn(f64) -> String + 'static) {
        self.x_ticks = Some(Box::new(formatter));
    }

    pub fn set_y_ticks_fn(&mut self, formatter: impl Fn(f64) -> String + 'static) {
        self.y_ticks = Some(Box::new(formatter));
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Add a series; `x` and `y` must have equal length
    pub fn plot(&mut self, x: &[f64], y: &[f64], style: SeriesStyle) -> Result<()> {
        if x.len() != y.len() {
            return Err(DietError::InvalidArgument(format!(
                "series x/y lengths differ: {} vs {}",
                x.len(),
                y.len()
            )));
        }
        self.series.push(Series {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            style,
        });
        Ok(())
    }

    fn axis_range(&self, limits: Option<(f64, f64)>, pick: fn(&(f64, f64)) -> f64) -> Result<(f64, f64)> {
        let (min, max) = match limits {
            Some(limits) => limits,
            None => self
                .series
                .iter()
                .flat_map(|s| s.points.iter().map(pick))
                .filter(|v| v.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                }),
        };

        if !min.is_finite() || !max.is_finite() {
            return Err(DietError::Chart("figure has no finite data".to_string()));
        }
        if min > max {
            return Err(DietError::InvalidArgument(format!(
                "axis limits reversed: {} > {}",
                min, max
            )));
        }
        if min == max {
            return Ok((min - 1.0, max + 1.0));
        }
        Ok((min, max))
    }

    /// Render the figure to a string, optionally with a legend box
    pub fn show(&self, legend: bool) -> Result<String> {
        if self.series.is_empty() {
            return Err(DietError::Chart("figure has no series".to_string()));
        }
        let (x_min, x_max) = self.axis_range(self.x_limits, |p| p.0)?;
        let (y_min, y_max) = self.axis_range(self.y_limits, |p| p.1)?;

        let columns = self.width.min(MAX_WIDTH) + Y_LABEL_CELLS + 2 * MARGIN_CELLS;
        let rows = self.height.min(MAX_HEIGHT) + X_LABEL_CELLS + 2 * MARGIN_CELLS;

        let mut out = String::new();
        {
            let backend = TextBackend::new(columns, rows, self.color, &mut out);
            let root = backend.into_drawing_area();
            self.draw(&root, (x_min, x_max), (y_min, y_max), legend)?;
            root.present().map_err(chart_error)?;
        }
        Ok(out)
    }

    fn draw(
        &self,
        root: &DrawingArea<TextBackend<'_>, Shift>,
        (x_min, x_max): (f64, f64),
        (y_min, y_max): (f64, f64),
        legend: bool,
    ) -> Result<()> {
        let mut chart = ChartBuilder::on(root)
            .margin(MARGIN_CELLS)
            .x_label_area_size(X_LABEL_CELLS)
            .y_label_area_size(Y_LABEL_CELLS)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(chart_error)?;

        let x_fmt = |v: &f64| match &self.x_ticks {
            Some(f) => f(*v),
            None => format!("{:.0}", v),
        };
        let y_fmt = |v: &f64| match &self.y_ticks {
            Some(f) => f(*v),
            None => format!("{:.1}", v),
        };
        chart
            .configure_mesh()
            .disable_mesh()
            .set_all_tick_mark_size(0)
            .x_labels(5)
            .y_labels(5)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style((FONT, 1))
            .axis_style(&BLACK)
            .draw()
            .map_err(chart_error)?;

        for series in &self.series {
            let rgb = series.style.color.map(|c| c.rgb()).unwrap_or(DEFAULT_INK);

            if let Some(marker) = series.style.marker {
                let glyph_style = (FONT, 1.0).into_font().color(&rgb);
                let in_range = series.points.iter().copied().filter(|&(x, y)| {
                    x >= x_min && x <= x_max && y >= y_min && y <= y_max
                });
                chart
                    .draw_series(
                        in_range.map(|point| Text::new(marker.to_string(), point, glyph_style.clone())),
                    )
                    .map_err(chart_error)?;
                continue;
            }

            for run in clip_runs(&series.points, (x_min, x_max), (y_min, y_max)) {
                chart
                    .draw_series(LineSeries::new(run, &rgb))
                    .map_err(chart_error)?;
            }
        }

        if legend {
            let entries: Vec<(&str, RGBColor)> = self
                .series
                .iter()
                .filter(|s| s.style.marker.is_none())
                .filter_map(|s| {
                    let rgb = s.style.color.map(|c| c.rgb()).unwrap_or(DEFAULT_INK);
                    s.style.label.as_deref().map(|label| (label, rgb))
                })
                .collect();
            let (x_range, y_range) = chart.plotting_area().get_pixel_range();
            draw_legend(root, &entries, (x_range.end - 2, y_range.start + 1))?;
        }

        Ok(())
    }
}

/// Draw a framed legend whose top-right corner sits at `top_right`
///
/// Each row is ` *** label ` with one cell per character.
fn draw_legend(
    root: &DrawingArea<TextBackend<'_>, Shift>,
    entries: &[(&str, RGBColor)],
    top_right: (i32, i32),
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let label_cells = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0) as i32;
    let (right, top) = top_right;
    let left = (right - label_cells - 7).max(0);
    let bottom = top + entries.len() as i32 + 1;

    root.draw(&Rectangle::new([(left, top), (right, bottom)], PAPER.filled()))
        .map_err(chart_error)?;
    root.draw(&Rectangle::new([(left, top), (right, bottom)], plotters::style::Color::stroke_width(&BLACK, 1)))
        .map_err(chart_error)?;

    let text_style = (FONT, 1.0).into_font().color(&BLACK);
    for (row, (label, rgb)) in entries.iter().enumerate() {
        let y = top + 1 + row as i32;
        root.draw(&PathElement::new(vec![(left + 2, y), (left + 4, y)], rgb))
            .map_err(chart_error)?;
        root.draw(&Text::new(label.to_string(), (left + 6, y), text_style.clone()))
            .map_err(chart_error)?;
    }
    Ok(())
}

/// Clip a polyline to the axis limits, returning the visible runs
fn clip_runs(
    points: &[(f64, f64)],
    x_limits: (f64, f64),
    y_limits: (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    let inside = |&(x, y): &(f64, f64)| {
        x >= x_limits.0 && x <= x_limits.1 && y >= y_limits.0 && y <= y_limits.1
    };
    if points.len() == 1 {
        return points.iter().copied().filter(inside).map(|p| vec![p]).collect();
    }

    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], x_limits, y_limits) {
            Some((start, end)) => {
                if current.last() != Some(&start) && !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                if current.is_empty() {
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Liang-Barsky clip of one segment; unclipped endpoints are returned as given
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    if ![p0.0, p0.1, p1.0, p1.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, p0.0 - x_min),
        (dx, x_max - p0.0),
        (-dy, p0.1 - y_min),
        (dy, y_max - p0.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let start = if t0 == 0.0 { p0 } else { (p0.0 + t0 * dx, p0.1 + t0 * dy) };
    let end = if t1 == 1.0 { p1 } else { (p0.0 + t1 * dx, p0.1 + t1 * dy) };
    Some((start, end))
}

fn chart_error<E: fmt::Display>(err: E) -> DietError {
    DietError::Chart(err.to_string())
}

/// Single-series figure, the quick way to eyeball a trajectory
pub fn plot_xy(x: &[f64], y: &[f64], width: u32, height: u32, color: bool) -> Result<String> {
    let mut figure = Figure::new(width, height);
    figure.color = color;
    figure.plot(x, y, SeriesStyle::default())?;
    figure.show(false)
}

/// Tick formatter that truncates toward zero and prefixes `>`
pub fn approx_floor(value: f64) -> String {
    format!(">{}", value.trunc() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Blank,
    Pixel(Option<SeriesColor>),
    HLine,
    VLine,
    Corner,
    Glyph(char, Option<SeriesColor>),
}

impl Cell {
    fn glyph(&self) -> (char, Option<SeriesColor>) {
        match *self {
            Cell::Blank => (' ', None),
            Cell::Pixel(color) => ('*', color),
            Cell::HLine => ('-', None),
            Cell::VLine => ('|', None),
            Cell::Corner => ('+', None),
            Cell::Glyph(c, color) => (c, color),
        }
    }

    fn merge_line(self, line: Cell) -> Cell {
        match (self, line) {
            (Cell::HLine, Cell::VLine) | (Cell::VLine, Cell::HLine) | (Cell::Corner, _) => Cell::Corner,
            (Cell::Blank, line) | (Cell::HLine, line) | (Cell::VLine, line) => line,
            (existing, _) => existing,
        }
    }
}

/// Drawing backend that rasterizes into character cells
///
/// One backend pixel is one terminal cell. The grid is written to `out` when
/// the drawing area is presented.
pub struct TextBackend<'a> {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
    color: bool,
    out: &'a mut String,
}

impl<'a> TextBackend<'a> {
    pub fn new(columns: u32, rows: u32, color: bool, out: &'a mut String) -> Self {
        TextBackend {
            columns,
            rows,
            cells: vec![Cell::Blank; columns as usize * rows as usize],
            color,
            out,
        }
    }

    fn index(&self, (x, y): BackendCoord) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.columns as i32 || y >= self.rows as i32 {
            return None;
        }
        Some(y as usize * self.columns as usize + x as usize)
    }

    fn put_line(&mut self, point: BackendCoord, line: Cell) {
        if let Some(idx) = self.index(point) {
            self.cells[idx] = self.cells[idx].merge_line(line);
        }
    }

    fn render(&self) -> String {
        let mut text = String::new();
        for row in self.cells.chunks(self.columns as usize) {
            let mut line = String::new();
            for cell in row {
                let (ch, color) = cell.glyph();
                match color {
                    Some(color) if self.color => {
                        line.push_str(&ch.to_string().color(color.terminal()).to_string())
                    }
                    _ => line.push(ch),
                }
            }
            text.push_str(line.trim_end());
            text.push('\n');
        }
        text
    }
}

impl<'a> DrawingBackend for TextBackend<'a> {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn ensure_prepared(&mut self) -> std::result::Result<(), DrawingErrorKind<std::io::Error>> {
        Ok(())
    }

    fn present(&mut self) -> std::result::Result<(), DrawingErrorKind<std::io::Error>> {
        let rendered = self.render();
        self.out.clear();
        self.out.push_str(&rendered);
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> std::result::Result<(), DrawingErrorKind<std::io::Error>> {
        if color.alpha > 0.3 {
            if let Some(idx) = self.index(point) {
                let RGBColor(r, g, b) = PAPER;
                self.cells[idx] = if color.rgb == (r, g, b) {
                    Cell::Blank
                } else {
                    Cell::Pixel(SeriesColor::from_backend(color))
                };
            }
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        let color = style.color();
        if color.alpha <= 0.3 {
            return Ok(());
        }
        // Black straight lines are axes and frames
        if color.rgb == (0, 0, 0) {
            if from.0 == to.0 {
                for y in from.1.min(to.1)..=from.1.max(to.1) {
                    self.put_line((from.0, y), Cell::VLine);
                }
                return Ok(());
            }
            if from.1 == to.1 {
                for x in from.0.min(to.0)..=from.0.max(to.0) {
                    self.put_line((x, from.1), Cell::HLine);
                }
                return Ok(());
            }
        }
        plotters_backend::rasterizer::draw_line(self, from, to, style)
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        _style: &TStyle,
    ) -> std::result::Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        Ok((text.chars().count() as u32, 1))
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        let (width, height) = self.estimate_text_size(text, style)?;
        let (width, height) = (width as i32, height as i32);
        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            HPos::Left => 0,
            HPos::Right => -width,
            HPos::Center => -width / 2,
        };
        let dy = match anchor.v_pos {
            VPos::Top => 0,
            VPos::Center => -height / 2,
            VPos::Bottom => -height,
        };
        let color = SeriesColor::from_backend(style.color());
        for (offset, ch) in text.chars().enumerate() {
            let point = (pos.0 + dx + offset as i32, pos.1 + dy);
            if let Some(idx) = self.index(point) {
                self.cells[idx] = Cell::Glyph(ch, color);
            }
        }
        Ok(())
    }
}
