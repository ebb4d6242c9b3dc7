//! PDF export orchestration.
//!
//! Rasterizing pages and writing the PDF are done by collaborators behind
//! [`PageRenderer`] and [`PdfAssembler`]. This module walks the pages,
//! reports progress and names the output file.

use crate::document::{Document, Page, PageId};
use crate::geometry::page_pixel_size;
use crate::theme::Theme;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Document has no pages to export")]
    NoPages,
    #[error("Page not found: {0}")]
    PageNotFound(PageId),
    #[error("Failed to render page: {0}")]
    Render(String),
    #[error("Failed to assemble PDF: {0}")]
    Assemble(String),
}

/// Raster format of rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

/// Export settings handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub dpi: u32,
    pub image_format: ImageFormat,
    /// Encoder quality in (0, 1]; only used for JPEG.
    pub quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dpi: 300, image_format: ImageFormat::Png, quality: 0.95 }
    }
}

impl ExportConfig {
    /// Pixel size a renderer should produce for `page`.
    pub fn pixel_size(&self, page: &Page) -> (u32, u32) {
        page_pixel_size(page.format, page.orientation, self.dpi)
    }
}

/// One rasterized page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page_id: PageId,
    pub page_number: u32,
    pub width: u32,
    pub height: u32,
    pub image_data: Vec<u8>,
}

/// The finished PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub blob: Vec<u8>,
    pub filename: String,
}

impl ExportArtifact {
    pub fn size(&self) -> usize {
        self.blob.len()
    }
}

/// Rasterizes a page with its document theme.
pub trait PageRenderer {
    fn render_page(&self, page: &Page, theme: &Theme, config: &ExportConfig) -> Result<RenderedPage, ExportError>;
}

/// Packs rendered pages into a PDF.
pub trait PdfAssembler {
    fn assemble(&self, pages: &[RenderedPage], filename: &str) -> Result<ExportArtifact, ExportError>;
}

/// Progress callback: percent in `0..=100` and a short message.
pub type ProgressFn<'a> = dyn FnMut(u8, &str) + 'a;

/// Lowercase `title`, replacing runs of anything but letters and digits
/// with a single `_`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() { "document".to_string() } else { slug.to_string() }
}

/// Output file name (without extension): `<slug>_<YYYY-MM-DD>`.
pub fn export_filename(title: &str, date: NaiveDate) -> String {
    format!("{}_{}", slugify(title), date.format("%Y-%m-%d"))
}

/// Render every page of `document` and assemble the PDF.
///
/// Reports 0 before the first page and 100 ("Done") after assembly.
/// The document is only read.
pub fn export_document(
    document: &Document,
    config: &ExportConfig,
    renderer: &dyn PageRenderer,
    assembler: &dyn PdfAssembler,
    date: NaiveDate,
    progress: &mut ProgressFn<'_>,
) -> Result<ExportArtifact, ExportError> {
    if document.pages.is_empty() {
        return Err(ExportError::NoPages);
    }
    progress(0, "Preparing export");

    let total = document.pages.len();
    let mut rendered = Vec::with_capacity(total);
    for (i, page) in document.pages.iter().enumerate() {
        rendered.push(renderer.render_page(page, &document.theme, config)?);
        let percent = 5 + (85 * (i + 1) / total) as u8;
        progress(percent, &format!("Rendered page {} of {}", i + 1, total));
    }

    progress(95, "Assembling PDF");
    let filename = export_filename(&document.title, date);
    let artifact = assembler.assemble(&rendered, &filename)?;
    log::info!("Exported {} ({} pages, {} bytes)", artifact.filename, total, artifact.size());
    progress(100, "Done");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Orientation, PageFormat};
    use std::cell::Cell;

    struct CountingRenderer {
        calls: Cell<usize>,
        fail_on: Option<usize>,
    }

    impl PageRenderer for CountingRenderer {
        fn render_page(&self, page: &Page, _: &Theme, config: &ExportConfig) -> Result<RenderedPage, ExportError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail_on == Some(n) {
                return Err(ExportError::Render("out of memory".to_string()));
            }
            let (width, height) = config.pixel_size(page);
            Ok(RenderedPage { page_id: page.id.clone(), page_number: page.page_number, width, height, image_data: vec![1] })
        }
    }

    struct ConcatAssembler;

    impl PdfAssembler for ConcatAssembler {
        fn assemble(&self, pages: &[RenderedPage], filename: &str) -> Result<ExportArtifact, ExportError> {
            let blob = pages.iter().flat_map(|p| p.image_data.clone()).collect();
            Ok(ExportArtifact { blob, filename: filename.to_string() })
        }
    }

    fn document(pages: usize) -> Document {
        let mut doc = Document::new("Test Doc", PageFormat::A4, Orientation::Portrait, Theme::default());
        for i in 0..pages {
            doc.pages.push(Page::new(i as u32 + 1, PageFormat::A4, Orientation::Portrait));
        }
        doc
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Test Doc"), "test_doc");
        assert_eq!(slugify("  Lisbon -- 3 days! "), "lisbon_3_days");
        assert_eq!(slugify("Путешествие"), "путешествие");
        assert_eq!(slugify("!!!"), "document");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Test Doc", date()), "test_doc_2024-03-09");
    }

    #[test]
    fn test_export_renders_every_page() {
        let renderer = CountingRenderer { calls: Cell::new(0), fail_on: None };
        let mut events = Vec::new();
        let artifact = export_document(
            &document(2),
            &ExportConfig::default(),
            &renderer,
            &ConcatAssembler,
            date(),
            &mut |p, m| events.push((p, m.to_string())),
        )
        .unwrap();
        assert_eq!(renderer.calls.get(), 2);
        assert_eq!(artifact.size(), 2);
        assert!(artifact.filename.starts_with("test_doc_"));
        assert_eq!(events.first().map(|e| e.0), Some(0));
        assert_eq!(events.last(), Some(&(100, "Done".to_string())));
        assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_export_without_pages() {
        let renderer = CountingRenderer { calls: Cell::new(0), fail_on: None };
        let result = export_document(&document(0), &ExportConfig::default(), &renderer, &ConcatAssembler, date(), &mut |_, _| {});
        assert!(matches!(result, Err(ExportError::NoPages)));
    }

    #[test]
    fn test_render_failure_propagates() {
        let renderer = CountingRenderer { calls: Cell::new(0), fail_on: Some(1) };
        let mut last = 0;
        let result = export_document(
            &document(3),
            &ExportConfig::default(),
            &renderer,
            &ConcatAssembler,
            date(),
            &mut |p, _| last = p,
        );
        assert!(matches!(result, Err(ExportError::Render(_))));
        assert!(last < 100);
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let page = Page::new(1, PageFormat::A4, Orientation::Portrait);
        let config = ExportConfig { dpi: 150, ..ExportConfig::default() };
        assert_eq!(config.pixel_size(&page), (1240, 1754));
    }
}
