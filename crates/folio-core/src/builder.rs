//! The document builder: the only code that mutates a [`Document`].
//!
//! Lookups that miss (stale page or block ids after an undo, for example)
//! are routine in a live editor, so every mutator reports them as `false`
//! or `None` and leaves the document untouched.

use crate::block::{Block, BlockContent, NewBlock, Styles, new_block_id};
use crate::document::{Document, Page, PageBackground, ValidationError, new_id};
use crate::geometry::{Orientation, PageFormat, Position, Unit, page_display_size};
use crate::theme::Theme;
use kurbo::Point;

/// Default offset (in the block's own unit) applied to duplicated blocks.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Why a layout import was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed layout JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid layout: {0}")]
    Invalid(#[from] ValidationError),
}

/// Partial update for a block. Present fields replace the block's field
/// wholesale; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockUpdate {
    pub position: Option<Position>,
    pub styles: Option<Styles>,
    pub content: Option<BlockContent>,
}

impl BlockUpdate {
    pub fn position(position: Position) -> Self {
        Self { position: Some(position), ..Self::default() }
    }

    pub fn styles(styles: Styles) -> Self {
        Self { styles: Some(styles), ..Self::default() }
    }

    pub fn content(content: BlockContent) -> Self {
        Self { content: Some(content), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.styles.is_none() && self.content.is_none()
    }
}

/// Owns the working document and applies every edit to it.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    document: Document,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new("Untitled", PageFormat::A4, Orientation::Portrait)
    }
}

impl DocumentBuilder {
    /// Builder over a new empty document with the default theme.
    pub fn new(title: impl Into<String>, format: PageFormat, orientation: Orientation) -> Self {
        Self { document: Document::new(title, format, orientation, Theme::default()) }
    }

    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    /// Replace the working document with a new portrait document with no pages.
    pub fn create_document(&mut self, title: impl Into<String>, format: PageFormat) -> &Document {
        self.document = Document::new(title, format, Orientation::Portrait, Theme::default());
        log::info!("Created document {} ({})", self.document.id, format.name());
        &self.document
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Replace the working document wholesale.
    pub fn load_document(&mut self, document: Document) {
        self.document = document;
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.document.page(page_id)
    }

    pub fn block(&self, page_id: &str, block_id: &str) -> Option<&Block> {
        self.document.block(page_id, block_id)
    }

    /// Topmost block under `point` (page display pixels).
    pub fn block_at(&self, page_id: &str, point: Point) -> Option<&Block> {
        self.document.page(page_id)?.block_at(point)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
        self.document.touch();
    }

    /// Append a page with the document's format and orientation.
    pub fn add_page(&mut self) -> &Page {
        let number = self.document.pages.len() as u32 + 1;
        let page = Page::new(number, self.document.format, self.document.orientation);
        log::debug!("Added page {} ({})", page.id, number);
        let index = self.document.pages.len();
        self.document.pages.push(page);
        self.document.touch();
        &self.document.pages[index]
    }

    /// Remove a page and renumber the rest. Removing the last page leaves
    /// the document with zero pages.
    pub fn remove_page(&mut self, page_id: &str) -> bool {
        let Some(index) = self.document.page_index(page_id) else {
            return false;
        };
        self.document.pages.remove(index);
        self.document.renumber_pages();
        self.document.touch();
        log::debug!("Removed page {page_id}");
        true
    }

    /// Deep-copy a page (fresh page and block ids) right after the original.
    pub fn duplicate_page(&mut self, page_id: &str) -> Option<&Page> {
        let index = self.document.page_index(page_id)?;
        let mut copy = self.document.pages[index].clone();
        copy.id = new_id();
        for block in &mut copy.blocks {
            block.id = new_block_id();
        }
        self.document.pages.insert(index + 1, copy);
        self.document.renumber_pages();
        self.document.touch();
        log::debug!("Duplicated page {page_id}");
        Some(&self.document.pages[index + 1])
    }

    /// Move the page at `from` to index `to`.
    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let len = self.document.pages.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let page = self.document.pages.remove(from);
            self.document.pages.insert(to, page);
            self.document.renumber_pages();
            self.document.touch();
        }
        true
    }

    pub fn set_page_background(&mut self, page_id: &str, background: Option<PageBackground>) -> bool {
        let Some(page) = self.document.page_mut(page_id) else {
            return false;
        };
        page.background = background;
        self.document.touch();
        true
    }

    /// Place a block on top of the page's stack.
    pub fn add_block(&mut self, page_id: &str, block: NewBlock) -> Option<&Block> {
        let page_index = self.document.page_index(page_id)?;
        let block = block.into_block();
        log::debug!("Added {} block {} to page {page_id}", block.block_type, block.id);
        let page = &mut self.document.pages[page_index];
        page.blocks.push(block);
        let block_index = page.blocks.len() - 1;
        self.document.touch();
        Some(&self.document.pages[page_index].blocks[block_index])
    }

    pub fn update_block(&mut self, page_id: &str, block_id: &str, update: BlockUpdate) -> bool {
        let Some(block) = self.document.page_mut(page_id).and_then(|p| p.block_mut(block_id)) else {
            return false;
        };
        if let Some(position) = update.position {
            block.position = position;
        }
        if let Some(styles) = update.styles {
            block.styles = styles;
        }
        if let Some(content) = update.content {
            block.content = content;
        }
        self.document.touch();
        log::debug!("Updated block {block_id}");
        true
    }

    pub fn remove_block(&mut self, page_id: &str, block_id: &str) -> bool {
        let Some(page) = self.document.page_mut(page_id) else {
            return false;
        };
        let Some(index) = page.block_index(block_id) else {
            return false;
        };
        page.blocks.remove(index);
        self.document.touch();
        log::debug!("Removed block {block_id}");
        true
    }

    /// Copy a block onto the same page, shifted by `offset` on both axes.
    pub fn duplicate_block(&mut self, page_id: &str, block_id: &str, offset: f64) -> Option<&Block> {
        let source = self.document.block(page_id, block_id)?;
        let mut copy = source.to_new_block();
        copy.position = copy.position.offset(offset, offset);
        self.add_block(page_id, copy)
    }

    pub fn bring_to_front(&mut self, page_id: &str, block_id: &str) -> bool {
        self.restack(page_id, block_id, true)
    }

    pub fn send_to_back(&mut self, page_id: &str, block_id: &str) -> bool {
        self.restack(page_id, block_id, false)
    }

    fn restack(&mut self, page_id: &str, block_id: &str, to_front: bool) -> bool {
        let Some(page) = self.document.page_mut(page_id) else {
            return false;
        };
        let Some(index) = page.block_index(block_id) else {
            return false;
        };
        let block = page.blocks.remove(index);
        if to_front {
            page.blocks.push(block);
        } else {
            page.blocks.insert(0, block);
        }
        self.document.touch();
        true
    }

    /// Change the format and orientation of the document and every page.
    ///
    /// With `scale_blocks`, millimetre positions are rescaled per axis by
    /// the ratio of the new to the old page size, so blocks keep their
    /// relative placement. Percent positions are already relative and are
    /// left alone.
    pub fn update_document_format(&mut self, format: PageFormat, orientation: Orientation, scale_blocks: bool) {
        let new_size = page_display_size(format, orientation);
        for page in &mut self.document.pages {
            if scale_blocks {
                let old_size = page_display_size(page.format, page.orientation);
                let sx = new_size.width / old_size.width;
                let sy = new_size.height / old_size.height;
                for block in page.blocks.iter_mut().filter(|b| b.position.unit == Unit::Mm) {
                    let p = &mut block.position;
                    p.x *= sx;
                    p.width *= sx;
                    p.y *= sy;
                    p.height *= sy;
                }
            }
            page.format = format;
            page.orientation = orientation;
        }
        self.document.format = format;
        self.document.orientation = orientation;
        self.document.touch();
        log::debug!("Changed format to {} {:?} (scaled: {scale_blocks})", format.name(), orientation);
    }

    /// Replace the theme. Block styles are not touched.
    pub fn set_theme(&mut self, theme: Theme) {
        log::debug!("Theme set to {}", theme.id);
        self.document.theme = theme;
        self.document.touch();
    }

    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        self.document.to_json()
    }

    /// Replace the working document with one parsed from `json`.
    ///
    /// Returns `false` and keeps the current document if the input is
    /// malformed or has duplicate ids.
    pub fn import_from_json(&mut self, json: &str) -> bool {
        match parse_layout(json) {
            Ok(document) => {
                log::info!("Imported document {} ({} pages)", document.id, document.pages.len());
                self.document = document;
                true
            }
            Err(e) => {
                log::warn!("Rejected layout import: {e}");
                false
            }
        }
    }
}

/// Parse and validate a layout. Page numbers are normalised to list order.
pub fn parse_layout(json: &str) -> Result<Document, ImportError> {
    let mut document = Document::from_json(json)?;
    document.validate()?;
    document.renumber_pages();
    Ok(document)
}
