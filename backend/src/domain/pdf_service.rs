//! Monthly report rendering to a paginated A4 PDF with printpdf.
use anyhow::{anyhow, Result};
use image::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rect, Rgb,
};

use crate::domain::balance_service::BalanceService;
use crate::domain::chart_service::{category_color, category_shares, EXPENSE_RGB, INCOME_RGB};
use crate::domain::models::report::MonthlyReport;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const CHART_WIDTH_MM: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const SWATCH_SIZE: f32 = 3.5;
const BLACK: (u8, u8, u8) = (0, 0, 0);

/// Localized text used on the report
#[derive(Debug, Clone)]
pub struct ReportLabels {
    pub title: String,
    pub user: String,
    pub period: String,
    pub monthly_total: String,
    pub weekly_total: String,
    pub categories_chart: String,
    pub daily_chart: String,
    pub breakdown: String,
    pub signature: String,
    pub generated: String,
    pub income: String,
    pub expense: String,
    /// Prefix for every amount on the report
    pub currency: String,
}

/// The two chart images embedded in the report
pub struct ReportCharts {
    pub categories: RgbImage,
    pub daily: RgbImage,
}

#[derive(Clone, Default)]
pub struct PdfService;

impl PdfService {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        report: &MonthlyReport,
        labels: &ReportLabels,
        charts: ReportCharts,
    ) -> Result<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(&labels.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("failed to load font: {:?}", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("failed to load font: {:?}", e))?;

        let layer = doc.get_page(page).get_layer(layer);
        let mut cursor = PageCursor {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };

        let money = |amount: f64| BalanceService::format_money_in(amount, &labels.currency);

        cursor.text(&labels.title, 18.0, &bold);
        cursor.gap(LINE_HEIGHT / 2.0);
        cursor.text(&format!("{}: {}", labels.user, report.username), 12.0, &regular);
        cursor.text(&format!("{}: {}", labels.period, report.period_label()), 12.0, &regular);
        cursor.text(
            &format!("{}: {}", labels.monthly_total, money(report.monthly_total)),
            12.0,
            &regular,
        );
        cursor.text(
            &format!("{}: {}", labels.weekly_total, money(report.weekly_total)),
            12.0,
            &regular,
        );
        cursor.gap(LINE_HEIGHT);

        cursor.text(&labels.categories_chart, 13.0, &bold);
        cursor.image(charts.categories);
        cursor.gap(LINE_HEIGHT);

        // The breakdown doubles as the pie's legend
        cursor.text(&labels.breakdown, 13.0, &bold);
        let shares = category_shares(&report.categories);
        for (index, (category, share)) in report.categories.iter().zip(shares).enumerate() {
            cursor.keyed_text(
                category_color(index),
                &format!("{}: {} ({:.1}%)", category.category, money(category.amount), share),
                11.0,
                &regular,
            );
        }
        cursor.gap(LINE_HEIGHT);

        cursor.text(&labels.daily_chart, 13.0, &bold);
        cursor.image(charts.daily);
        cursor.keyed_text(INCOME_RGB, &labels.income, 10.0, &regular);
        cursor.keyed_text(EXPENSE_RGB, &labels.expense, 10.0, &regular);
        for day in &report.daily {
            cursor.text(
                &format!("{}: {}", day.date.format("%Y-%m-%d"), money(day.amount)),
                10.0,
                &regular,
            );
        }

        cursor.gap(LINE_HEIGHT * 2.0);
        cursor.text_right(&labels.signature, 10.0, &regular);
        cursor.text_right(
            &format!(
                "{} {}",
                labels.generated,
                report.generated_at.format("%Y-%m-%d %H:%M:%S")
            ),
            10.0,
            &regular,
        );

        cursor
            .doc
            .save_to_bytes()
            .map_err(|e| anyhow!("failed to serialize PDF: {:?}", e))
    }
}

/// Writes top to bottom, starting a new page when the current one is full
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageCursor {
    fn ensure_space(&mut self, height: f32) {
        if self.y - height >= MARGIN {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn text(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.ensure_space(LINE_HEIGHT);
        self.y -= LINE_HEIGHT;
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    /// A filled colour square followed by text, as one legend row
    fn keyed_text(&mut self, color: (u8, u8, u8), text: &str, size: f32, font: &IndirectFontRef) {
        self.ensure_space(LINE_HEIGHT);
        self.y -= LINE_HEIGHT;
        self.set_fill(color);
        self.layer.add_rect(Rect::new(
            Mm(MARGIN),
            Mm(self.y),
            Mm(MARGIN + SWATCH_SIZE),
            Mm(self.y + SWATCH_SIZE),
        ));
        self.set_fill(BLACK);
        self.layer
            .use_text(text, size, Mm(MARGIN + SWATCH_SIZE + 2.0), Mm(self.y), font);
    }

    fn set_fill(&self, (r, g, b): (u8, u8, u8)) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            None,
        )));
    }

    fn text_right(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.ensure_space(LINE_HEIGHT);
        self.y -= LINE_HEIGHT;
        let x = (PAGE_WIDTH - MARGIN - estimate_text_width(text, size)).max(MARGIN);
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    /// Place an image scaled to the content width
    fn image(&mut self, image: RgbImage) {
        let (width_px, height_px) = image.dimensions();
        let dpi = width_px as f32 * 25.4 / CHART_WIDTH_MM;
        let height_mm = height_px as f32 * 25.4 / dpi;

        self.ensure_space(height_mm);
        self.y -= height_mm;
        Image::from_dynamic_image(&DynamicImage::ImageRgb8(image)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }
}

/// Approximate Helvetica width in mm (average glyph is about half the font size)
fn estimate_text_width(text: &str, size: f32) -> f32 {
    const PT_TO_MM: f32 = 0.3528;
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}
