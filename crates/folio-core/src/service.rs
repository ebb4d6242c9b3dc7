//! Constructor service: owns the builder and connects it to importers,
//! exporters and document storage.

use crate::builder::DocumentBuilder;
use crate::document::Document;
use crate::export::{ExportArtifact, ExportConfig, ExportError, PageRenderer, PdfAssembler, ProgressFn, RenderedPage};
use crate::geometry::PageFormat;
use crate::storage::{Storage, StorageError, StorageResult};
use crate::theme::{Theme, ThemeManager};
use chrono::Utc;
use std::sync::Arc;

/// Builds an initial document from external content.
pub trait ContentImporter {
    type Source;

    fn import(&self, source: &Self::Source, theme: &Theme) -> Document;
}

/// Entry point for document-level operations.
pub struct ConstructorService {
    builder: DocumentBuilder,
    themes: ThemeManager,
    storage: Option<Arc<dyn Storage>>,
}

impl Default for ConstructorService {
    fn default() -> Self {
        Self::new(DocumentBuilder::default())
    }
}

impl ConstructorService {
    pub fn new(builder: DocumentBuilder) -> Self {
        Self { builder, themes: ThemeManager::new(), storage: None }
    }

    /// Enable [`save_document`](Self::save_document) and
    /// [`load_document`](Self::load_document).
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_themes(mut self, themes: ThemeManager) -> Self {
        self.themes = themes;
        self
    }

    pub fn builder(&self) -> &DocumentBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut DocumentBuilder {
        &mut self.builder
    }

    pub fn themes(&self) -> &ThemeManager {
        &self.themes
    }

    pub fn document(&self) -> &Document {
        self.builder.document()
    }

    /// Start over with a new empty document.
    pub fn create_document(&mut self, title: impl Into<String>, format: PageFormat) -> &Document {
        self.builder.create_document(title, format)
    }

    /// Replace the working document with one built by `importer`. Unknown
    /// theme ids fall back to the default theme.
    pub fn import_content<I: ContentImporter>(&mut self, importer: &I, source: &I::Source, theme_id: &str) -> &Document {
        let theme = self.themes.theme_or_default(theme_id);
        let document = importer.import(source, &theme);
        log::info!("Imported content into document {} with theme {}", document.id, theme.id);
        self.builder.load_document(document);
        self.builder.document()
    }

    /// Export the current document. Works on a snapshot, so a failed export
    /// leaves the working document as it was.
    pub fn export_to_pdf(
        &self,
        config: &ExportConfig,
        renderer: &dyn PageRenderer,
        assembler: &dyn PdfAssembler,
        progress: &mut ProgressFn<'_>,
    ) -> Result<ExportArtifact, ExportError> {
        let snapshot = self.builder.document().clone();
        crate::export::export_document(&snapshot, config, renderer, assembler, Utc::now().date_naive(), progress)
    }

    /// Render a single page for preview.
    pub fn preview_page(
        &self,
        page_id: &str,
        config: &ExportConfig,
        renderer: &dyn PageRenderer,
    ) -> Result<RenderedPage, ExportError> {
        let document = self.builder.document();
        let page = document.page(page_id).ok_or_else(|| ExportError::PageNotFound(page_id.to_string()))?;
        renderer.render_page(page, &document.theme, config)
    }

    fn storage(&self) -> StorageResult<&Arc<dyn Storage>> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Other("No storage configured".to_string()))
    }

    /// Write the current document under `key`.
    pub fn save_document(&self, key: &str) -> StorageResult<()> {
        let storage = self.storage()?;
        let json = self
            .builder
            .export_to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        storage.save(key, &json)?;
        log::info!("Saved document {} as {key}", self.document().id);
        Ok(())
    }

    /// Load the document stored under `key` into the builder.
    ///
    /// Returns `Ok(None)` when nothing usable is stored there.
    pub fn load_document(&mut self, key: &str) -> StorageResult<Option<&Document>> {
        let json = match self.storage()?.load(key) {
            Ok(json) => json,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if !self.builder.import_from_json(&json) {
            return Ok(None);
        }
        Ok(Some(self.builder.document()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockType, NewBlock};
    use crate::document::Page;
    use crate::geometry::{Orientation, Position};
    use crate::storage::MemoryStorage;

    struct TripImporter;

    impl ContentImporter for TripImporter {
        type Source = Vec<&'static str>;

        fn import(&self, source: &Self::Source, theme: &Theme) -> Document {
            let mut builder = DocumentBuilder::new("Imported trip", PageFormat::A4, Orientation::Portrait);
            builder.set_theme(theme.clone());
            for line in source {
                let page_id = builder.add_page().id.clone();
                let block = NewBlock::new(BlockType::Paragraph, Position::mm(20.0, 20.0, 170.0, 30.0))
                    .with_content(crate::block::BlockContent::Text(line.to_string()));
                builder.add_block(&page_id, block);
            }
            builder.into_document()
        }
    }

    struct BlankRenderer;

    impl PageRenderer for BlankRenderer {
        fn render_page(&self, page: &Page, _: &Theme, config: &ExportConfig) -> Result<RenderedPage, ExportError> {
            let (width, height) = config.pixel_size(page);
            Ok(RenderedPage { page_id: page.id.clone(), page_number: page.page_number, width, height, image_data: vec![] })
        }
    }

    struct FailingAssembler;

    impl PdfAssembler for FailingAssembler {
        fn assemble(&self, _: &[RenderedPage], _: &str) -> Result<ExportArtifact, ExportError> {
            Err(ExportError::Assemble("disk full".to_string()))
        }
    }

    #[test]
    fn test_import_content_uses_theme() {
        let mut service = ConstructorService::default();
        let doc = service.import_content(&TripImporter, &vec!["Day 1", "Day 2"], "romantic");
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.theme.id, "romantic");
    }

    #[test]
    fn test_import_content_unknown_theme_falls_back() {
        let mut service = ConstructorService::default();
        let doc = service.import_content(&TripImporter, &vec!["Day 1"], "vaporwave");
        assert_eq!(doc.theme.id, "light");
    }

    #[test]
    fn test_preview_missing_page() {
        let service = ConstructorService::default();
        let result = service.preview_page("missing", &ExportConfig::default(), &BlankRenderer);
        assert!(matches!(result, Err(ExportError::PageNotFound(_))));
    }

    #[test]
    fn test_preview_page() {
        let mut service = ConstructorService::default();
        let page_id = service.builder_mut().add_page().id.clone();
        let rendered = service.preview_page(&page_id, &ExportConfig::default(), &BlankRenderer).unwrap();
        assert_eq!(rendered.page_id, page_id);
        assert_eq!((rendered.width, rendered.height), (2480, 3508));
    }

    #[test]
    fn test_failed_export_leaves_document_untouched() {
        let mut service = ConstructorService::default();
        service.builder_mut().add_page();
        let before = service.document().clone();
        let result = service.export_to_pdf(&ExportConfig::default(), &BlankRenderer, &FailingAssembler, &mut |_, _| {});
        assert!(matches!(result, Err(ExportError::Assemble(_))));
        assert_eq!(service.document(), &before);
    }

    #[test]
    fn test_save_and_load_document() {
        let storage = Arc::new(MemoryStorage::new());
        let mut service = ConstructorService::default().with_storage(storage.clone());
        service.create_document("Kyoto", PageFormat::A5);
        service.builder_mut().add_page();
        service.save_document("layout").unwrap();
        let saved = service.document().clone();

        let mut other = ConstructorService::default().with_storage(storage);
        let loaded = other.load_document("layout").unwrap().unwrap();
        assert_eq!(loaded, &saved);
        assert!(other.load_document("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_without_storage_fails() {
        let service = ConstructorService::default();
        assert!(matches!(service.save_document("x"), Err(StorageError::Other(_))));
    }
}
