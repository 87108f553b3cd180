//! Raster chart rendering with plotters.
//!
//! Charts are drawn from shapes only (no text), so rendering does not depend
//! on fonts being installed. Titles and legends live in the surrounding PDF
//! or UI, keyed by [`category_color`], [`INCOME_RGB`] and [`EXPENSE_RGB`].

use std::f64::consts::PI;
use std::io::Cursor;

use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::Palette;

use crate::domain::models::report::{CategoryBreakdown, CategoryTotal, DailyTotal};

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

pub const INCOME_RGB: (u8, u8, u8) = (46, 160, 67);
pub const EXPENSE_RGB: (u8, u8, u8) = (220, 53, 69);

const INCOME_COLOR: RGBColor = RGBColor(INCOME_RGB.0, INCOME_RGB.1, INCOME_RGB.2);
const EXPENSE_COLOR: RGBColor = RGBColor(EXPENSE_RGB.0, EXPENSE_RGB.1, EXPENSE_RGB.2);
const AXIS_COLOR: RGBColor = RGBColor(120, 120, 120);

#[derive(Clone, Default)]
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Pie chart of category sums, sliced by absolute magnitude
    pub fn category_chart(&self, categories: &[CategoryTotal]) -> Result<RgbImage> {
        let magnitudes: Vec<f64> = categories.iter().map(|c| c.amount.abs()).collect();
        let total: f64 = magnitudes.iter().sum();

        render(|root| {
            if total <= 0.0 {
                return Ok(());
            }

            let center = (CHART_WIDTH as f64 / 2.0, CHART_HEIGHT as f64 / 2.0);
            let radius = (CHART_HEIGHT as f64 / 2.0) - 20.0;
            let mut start = -PI / 2.0;

            for (index, magnitude) in magnitudes.iter().enumerate() {
                if *magnitude <= 0.0 {
                    continue;
                }
                let sweep = magnitude / total * 2.0 * PI;
                let points = slice_points(center, radius, start, start + sweep);
                let (r, g, b) = category_color(index);
                root.draw(&Polygon::new(points, RGBColor(r, g, b).filled()))
                    .map_err(|e| anyhow!("failed to draw pie slice: {}", e))?;
                start += sweep;
            }
            Ok(())
        })
    }

    /// One bar per day; negative totals are drawn below the axis
    pub fn daily_chart(&self, daily: &[DailyTotal]) -> Result<RgbImage> {
        let values: Vec<f64> = daily.iter().map(|d| d.amount).collect();
        let (y_min, y_max) = value_range(values.iter().copied());
        let slots = values.len().max(1) as f64;

        render(|root| {
            let mut chart = ChartBuilder::on(root)
                .margin(20)
                .build_cartesian_2d(0.0..slots, y_min..y_max)
                .map_err(|e| anyhow!("failed to build daily chart: {}", e))?;

            chart
                .draw_series(values.iter().enumerate().map(|(i, value)| {
                    let color = if *value >= 0.0 { INCOME_COLOR } else { EXPENSE_COLOR };
                    let x = i as f64;
                    Rectangle::new([(x + 0.15, 0.0), (x + 0.85, *value)], color.filled())
                }))
                .map_err(|e| anyhow!("failed to draw daily bars: {}", e))?;

            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, 0.0), (slots, 0.0)],
                    AXIS_COLOR.stroke_width(1),
                )))
                .map_err(|e| anyhow!("failed to draw axis: {}", e))?;
            Ok(())
        })
    }

    /// Grouped income and expense bars per category over a whole ledger
    pub fn ledger_chart(&self, categories: &[CategoryBreakdown]) -> Result<RgbImage> {
        let (_, y_max) = value_range(categories.iter().flat_map(|c| [c.income, c.expense]));
        let slots = categories.len().max(1) as f64;

        render(|root| {
            let mut chart = ChartBuilder::on(root)
                .margin(20)
                .build_cartesian_2d(0.0..slots, 0.0..y_max)
                .map_err(|e| anyhow!("failed to build ledger chart: {}", e))?;

            let bars = categories.iter().enumerate().flat_map(|(i, breakdown)| {
                let x = i as f64;
                [
                    Rectangle::new(
                        [(x + 0.1, 0.0), (x + 0.45, breakdown.income)],
                        INCOME_COLOR.filled(),
                    ),
                    Rectangle::new(
                        [(x + 0.55, 0.0), (x + 0.9, breakdown.expense)],
                        EXPENSE_COLOR.filled(),
                    ),
                ]
            });
            chart
                .draw_series(bars)
                .map_err(|e| anyhow!("failed to draw category bars: {}", e))?;
            Ok(())
        })
    }

    pub fn encode_png(image: RgbImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

/// Colour of the `index`-th category slice in [`ChartService::category_chart`]
pub fn category_color(index: usize) -> (u8, u8, u8) {
    let colors = <Palette99 as Palette>::COLORS;
    colors[index % colors.len()]
}

/// Share of each category in the pie, in percent of the summed magnitudes
pub fn category_shares(categories: &[CategoryTotal]) -> Vec<f64> {
    let total: f64 = categories.iter().map(|c| c.amount.abs()).sum();
    categories
        .iter()
        .map(|c| if total > 0.0 { c.amount.abs() / total * 100.0 } else { 0.0 })
        .collect()
}

/// Draw onto a white canvas of the standard chart size
fn render<F>(draw: F) -> Result<RgbImage>
where
    F: FnOnce(&DrawingArea<BitMapBackend, plotters::coord::Shift>) -> Result<()>,
{
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("failed to clear chart: {}", e))?;
        draw(&root)?;
        root.present()
            .map_err(|e| anyhow!("failed to finish chart: {}", e))?;
    }

    RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer)
        .ok_or_else(|| anyhow!("chart buffer has the wrong size"))
}

/// Y range that always includes zero, with 10% headroom
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (max - min).max(1.0);
    let pad = span * 0.1;
    (
        if min < 0.0 { min - pad } else { 0.0 },
        if max > 0.0 { max + pad } else { pad },
    )
}

/// Polygon approximating a pie slice between two angles (radians)
fn slice_points(center: (f64, f64), radius: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
    let steps = (((to - from) / (PI / 180.0)).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for step in 0..=steps {
        let angle = from + (to - from) * step as f64 / steps as f64;
        points.push((
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        ));
    }
    points
}
