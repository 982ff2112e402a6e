//! # PDF Generation Module
//!
//! Renders a commercial offer (A4, one estimate per document) with Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via placeholder replacement before compilation
//! - Fonts come from `typst-assets` and are loaded once per process
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! Every row is reproduced verbatim from the [`Estimate`]; only prices,
//! the total and the building dimensions are reformatted with ru-RU
//! conventions.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Local;
//! use estimate_core::{Estimator, RawEstimateRequest};
//! use estimate_core::pdf::render_estimate_pdf;
//! use estimate_core::validation::validate_request;
//!
//! let estimator = Estimator::default();
//! let raw: RawEstimateRequest = serde_json::from_str(r#"{
//!     "length": 10, "width": 8, "height": 6, "floors": 1,
//!     "walls": { "type": "sandwich", "thickness": 100 },
//!     "roof": { "type": "membrane" }
//! }"#).unwrap();
//! let request = validate_request(&raw, estimator.prices()).unwrap();
//! let estimate = estimator.estimate_validated(&request).unwrap();
//! let payments = estimator.payment_options(&estimate);
//!
//! let pdf = render_estimate_pdf(&request, &estimate, &payments, Local::now().date_naive()).unwrap();
//! std::fs::write("estimate.pdf", pdf).unwrap();
//! ```

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{EstimateError, EstimateResult};
use crate::format::{format_date_ru, format_decimal_ru, format_money, ru_plural};
use crate::payment::{PaymentMethod, PaymentOption};
use crate::reconcile::Estimate;
use crate::request::EstimateRequest;

/// How long the offer stays valid, in days
pub const OFFER_VALIDITY_DAYS: u32 = 14;

/// Bundled fonts, parsed on first use
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    let mut fonts = Vec::new();
    for font_bytes in typst_assets::fonts() {
        let buffer = Bytes::new(font_bytes.to_vec());
        for font in Font::iter(buffer) {
            fonts.push(font);
        }
    }
    tracing::debug!(count = fonts.len(), "loaded bundled fonts");
    fonts
});

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling one in-memory document.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Library (standard functions)
    library: LazyHash<Library>,
    /// Date the offer is issued on
    today: NaiveDate,
}

impl PdfWorld {
    fn new(source: String, today: NaiveDate) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
            today,
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        Datetime::from_ymd(
            self.today.year(),
            self.today.month() as u8,
            self.today.day() as u8,
        )
    }
}

// ============================================================================
// PDF Template
// ============================================================================

/// Typst template for the commercial offer
const ESTIMATE_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 18mm, bottom: 32mm, left: 20mm, right: 20mm),
  footer-descent: 0pt,
  footer: block(width: 100%, fill: rgb("#111111"), inset: (x: 14pt, y: 12pt))[
    #grid(
      columns: (1fr, auto),
      align(left + horizon)[
        #text(size: 20pt, weight: "bold", fill: white)[BIG #text(weight: "regular", style: "italic")[SPACES]]
      ],
      align(right + horizon)[
        #text(size: 10pt, fill: white)[+7 911 002 90 07 \ WhatsApp · Telegram]
      ],
    )
  ]
)

#set text(size: 11pt, lang: "ru")

#grid(
  columns: (1fr, auto),
  [#text(size: 9pt)[Предварительное предложение от {{DATE}} \ действует {{VALIDITY}}]],
  align(right)[#text(size: 10pt, fill: rgb("#8c8c8c"))[БОЛЬШЕ, ЧЕМ ПРОСТО СТРОЙКА]],
)

#v(36pt)

#text(size: 22pt, weight: "bold")[СТРОИТЕЛЬСТВО \ ЗДАНИЯ ПОД КЛЮЧ]
#v(2pt)
#text(size: 18pt, style: "italic")[{{DIMENSIONS}}]

#v(30pt)

#table(
  columns: (28pt, 1fr, auto, auto),
  stroke: (x: none, y: 0.5pt + rgb("#eaeaea")),
  inset: (x: 4pt, y: 12pt),
  align: (left, left, right, right),
  table.header(
    [],
    [#text(size: 9pt)[*Наименование работ*]],
    [#text(size: 9pt, fill: rgb("#9a9a9a"))[Объем]],
    [#text(size: 9pt, fill: rgb("#9a9a9a"))[Стоимость]],
  ),
{{ROWS}}
)

#v(30pt)

#align(right)[#text(size: 26pt, weight: "bold")[{{TOTAL}}]]

#v(24pt)

#grid(
  columns: (1fr, 1fr),
  [
    *Оплата* \
    По этапам работ \
    {{PAYMENT}}
  ],
  [
    *Сроки* \
    Реализация: 3–6 мес \
    Гарантия: 2 года
  ],
)
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Build the Typst source for an estimate without compiling it.
pub fn build_estimate_source(
    request: &EstimateRequest,
    estimate: &Estimate,
    payments: &[PaymentOption],
    issued_on: NaiveDate,
) -> String {
    ESTIMATE_TEMPLATE
        .replace("{{DATE}}", &format_date_ru(issued_on))
        .replace(
            "{{VALIDITY}}",
            &format!(
                "{} {}",
                OFFER_VALIDITY_DAYS,
                ru_plural(OFFER_VALIDITY_DAYS as u64, "день", "дня", "дней")
            ),
        )
        .replace("{{DIMENSIONS}}", &escape_typst(&dimensions_label(request)))
        .replace("{{ROWS}}", &build_rows(estimate))
        .replace("{{TOTAL}}", &escape_typst(&format_money(estimate.total_cash)))
        .replace("{{PAYMENT}}", &escape_typst(&payment_label(payments)))
}

/// Render an estimate to PDF.
///
/// # Arguments
///
/// * `request` - The validated request (dimensions and floors go in the title)
/// * `estimate` - The computed estimate, reproduced row by row
/// * `payments` - Payment options listed under the total
/// * `issued_on` - Offer date printed in the header
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(EstimateError::RenderFailed)` - If compilation or export fails
pub fn render_estimate_pdf(
    request: &EstimateRequest,
    estimate: &Estimate,
    payments: &[PaymentOption],
    issued_on: NaiveDate,
) -> EstimateResult<Vec<u8>> {
    let source = build_estimate_source(request, estimate, payments, issued_on);

    // Compile the Typst document
    let world = PdfWorld::new(source, issued_on);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::render_failed("compile", error_msgs.join("; "))
    })?;

    // Render to PDF
    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::render_failed("pdf", error_msgs.join("; "))
    })?;

    tracing::info!(bytes = pdf_bytes.len(), rows = estimate.rows.len(), "rendered estimate pdf");
    Ok(pdf_bytes)
}

/// Title line, e.g. `10 × 8 × 6 м, 1 этаж`
fn dimensions_label(request: &EstimateRequest) -> String {
    let d = request.dimensions;
    let floors = request.floors.count() as u64;
    format!(
        "{} × {} × {} м, {} {}",
        format_decimal_ru(d.length.0, 2),
        format_decimal_ru(d.width.0, 2),
        format_decimal_ru(d.height.0, 2),
        floors,
        ru_plural(floors, "этаж", "этажа", "этажей")
    )
}

/// `Наличный расчет / ИП +7% / ООО +20%`
fn payment_label(payments: &[PaymentOption]) -> String {
    payments
        .iter()
        .map(|p| match p.method {
            PaymentMethod::Cash => p.method.label().to_string(),
            _ => format!("{} +{}%", p.method.label(), format_decimal_ru(p.surcharge * 100.0, 1)),
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Escape special Typst characters in injected text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '/' => "\\/".to_string(),
            '~' => "\\~".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Build table rows: code, title with subtitle, volume, price
fn build_rows(estimate: &Estimate) -> String {
    estimate
        .rows
        .iter()
        .map(|row| {
            format!(
                "  [#text(fill: rgb(\"#9a9a9a\"))[{}]], [{} #linebreak() #text(size: 9pt, fill: rgb(\"#9a9a9a\"))[{}]], [{}], [*{}*],",
                escape_typst(&row.code),
                escape_typst(&row.title),
                escape_typst(&row.subtitle),
                escape_typst(&row.volume),
                escape_typst(&format_money(row.price)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
