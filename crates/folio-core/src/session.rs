//! Editing session: the glue between user actions, the builder, history,
//! clipboard and gestures.
//!
//! Every action that changes the document follows the same order: apply
//! the mutation through the builder, push the new state to history, then
//! persist history (best-effort). Undo and redo go the other way: take the
//! snapshot from history and load it into the builder.

use crate::block::{Block, BlockId, BlockType, NewBlock, Styles};
use crate::builder::{BlockUpdate, DUPLICATE_OFFSET};
use crate::clipboard::SharedClipboard;
use crate::document::{Document, Page, PageId};
use crate::geometry::{Orientation, PageFormat, Position, ResizeHandle, to_display};
use crate::history::HistoryManager;
use crate::interaction::{
    DragState, ResizeState, TextEditResult, TextEditSession, TextKey, TextModifiers, hit_test_handles, starts_edit,
};
use crate::service::ConstructorService;
use kurbo::{Point, Rect};

/// Left/top inset of newly added blocks, in millimetres.
const NEW_BLOCK_INSET_MM: f64 = 20.0;
/// Top offset of newly added blocks, in millimetres.
const NEW_BLOCK_TOP_MM: f64 = 50.0;
/// Height of newly added blocks, in millimetres.
const NEW_BLOCK_HEIGHT_MM: f64 = 30.0;

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// A handle of the selected block; a resize started.
    Handle(ResizeHandle),
    /// A block body; it is now selected and a drag started.
    Block(BlockId),
    /// Empty page area; the selection was cleared.
    Page,
}

pub struct EditorSession {
    service: ConstructorService,
    history: HistoryManager,
    clipboard: SharedClipboard,
    current_page: Option<PageId>,
    selected_block: Option<BlockId>,
    drag: Option<DragState>,
    resize: Option<ResizeState>,
    text_edit: Option<TextEditSession>,
}

impl EditorSession {
    /// Open a session over the service's current document.
    ///
    /// Saved history for the document is restored if there is any, and the
    /// builder is brought to the saved present. Otherwise a document without
    /// pages gets its first page and history starts from there.
    pub fn open(service: ConstructorService, history: HistoryManager, clipboard: SharedClipboard) -> Self {
        let mut session = Self {
            service,
            history,
            clipboard,
            current_page: None,
            selected_block: None,
            drag: None,
            resize: None,
            text_edit: None,
        };
        let document_id = session.document().id.clone();
        let restored = session.history.load_from_storage(&document_id);
        match session.history.current().cloned() {
            Some(snapshot) if restored => session.service.builder_mut().load_document(snapshot),
            _ => {
                if session.document().pages.is_empty() {
                    session.service.builder_mut().add_page();
                }
                session.history.initialize(session.service.document());
            }
        }
        session.current_page = session.document().pages.first().map(|p| p.id.clone());
        session
    }

    pub fn document(&self) -> &Document {
        self.service.document()
    }

    pub fn service(&self) -> &ConstructorService {
        &self.service
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn clipboard(&self) -> &SharedClipboard {
        &self.clipboard
    }

    /// Push the builder's document and persist history.
    fn commit(&mut self) {
        let document = self.service.document();
        self.history.push(document);
        self.history.save_to_storage(&document.id);
    }

    // Pages

    pub fn current_page_id(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.document().page(self.current_page.as_deref()?)
    }

    pub fn current_page_index(&self) -> Option<usize> {
        self.document().page_index(self.current_page.as_deref()?)
    }

    pub fn add_page(&mut self) -> PageId {
        let page_id = self.service.builder_mut().add_page().id.clone();
        self.commit();
        self.set_current_page(Some(page_id.clone()));
        page_id
    }

    pub fn remove_page(&mut self, page_id: &str) -> bool {
        let index = self.document().page_index(page_id);
        if !self.service.builder_mut().remove_page(page_id) {
            return false;
        }
        self.commit();
        if self.current_page.as_deref() == Some(page_id) {
            let pages = &self.document().pages;
            let next = index
                .and_then(|i| pages.get(i).or_else(|| pages.last()))
                .map(|p| p.id.clone());
            self.set_current_page(next);
        }
        true
    }

    pub fn duplicate_page(&mut self, page_id: &str) -> Option<PageId> {
        let copy_id = self.service.builder_mut().duplicate_page(page_id)?.id.clone();
        self.commit();
        self.set_current_page(Some(copy_id.clone()));
        Some(copy_id)
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        if from == to || !self.service.builder_mut().move_page(from, to) {
            return false;
        }
        self.commit();
        true
    }

    fn set_current_page(&mut self, page_id: Option<PageId>) {
        if self.current_page != page_id {
            self.finish_text_edit();
            self.selected_block = None;
            self.drag = None;
            self.resize = None;
        }
        self.current_page = page_id;
    }

    /// Go to the page at `index`.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        let Some(page_id) = self.document().pages.get(index).map(|p| p.id.clone()) else {
            return false;
        };
        self.set_current_page(Some(page_id));
        true
    }

    pub fn next_page(&mut self) -> bool {
        match self.current_page_index() {
            Some(i) => self.go_to_page(i + 1),
            None => self.go_to_page(0),
        }
    }

    pub fn previous_page(&mut self) -> bool {
        match self.current_page_index() {
            Some(i) if i > 0 => self.go_to_page(i - 1),
            _ => false,
        }
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(0)
    }

    pub fn last_page(&mut self) -> bool {
        match self.document().pages.len() {
            0 => false,
            n => self.go_to_page(n - 1),
        }
    }

    // Blocks

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected_block.as_deref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.current_page()?.block(self.selected_block.as_deref()?)
    }

    /// Select a block on the current page (or clear the selection). Any
    /// inline edit in progress is committed first.
    pub fn select_block(&mut self, block_id: Option<&str>) -> bool {
        self.finish_text_edit();
        match block_id {
            None => {
                self.selected_block = None;
                true
            }
            Some(id) => {
                let exists = self.current_page().is_some_and(|p| p.block(id).is_some());
                if exists {
                    self.selected_block = Some(id.to_string());
                }
                exists
            }
        }
    }

    /// Add a block of `block_type` with default placement and content to the
    /// current page, and select it.
    pub fn add_block(&mut self, block_type: BlockType) -> Option<BlockId> {
        let page = self.current_page()?;
        let (page_width_mm, _) = page.format.dimensions_with_orientation(page.orientation);
        let position = Position::mm(
            NEW_BLOCK_INSET_MM,
            NEW_BLOCK_TOP_MM,
            page_width_mm - 2.0 * NEW_BLOCK_INSET_MM,
            NEW_BLOCK_HEIGHT_MM,
        );
        self.insert_block(NewBlock::new(block_type, position))
    }

    /// Add `block` to the current page and select it.
    pub fn insert_block(&mut self, block: NewBlock) -> Option<BlockId> {
        let page_id = self.current_page.clone()?;
        let block_id = self.service.builder_mut().add_block(&page_id, block)?.id.clone();
        self.commit();
        self.finish_text_edit();
        self.selected_block = Some(block_id.clone());
        Some(block_id)
    }

    pub fn update_block(&mut self, block_id: &str, update: BlockUpdate) -> bool {
        let Some(page_id) = self.current_page.clone() else {
            return false;
        };
        if update.is_empty() || !self.service.builder_mut().update_block(&page_id, block_id, update) {
            return false;
        }
        self.commit();
        true
    }

    /// Merge `overrides` into a block's styles (style panel edits).
    pub fn apply_styles(&mut self, block_id: &str, overrides: &Styles) -> bool {
        let Some(block) = self.current_page().and_then(|p| p.block(block_id)) else {
            return false;
        };
        let styles = block.styles.merged(overrides);
        self.update_block(block_id, BlockUpdate::styles(styles))
    }

    pub fn delete_selected(&mut self) -> bool {
        let (Some(page_id), Some(block_id)) = (self.current_page.clone(), self.selected_block.clone()) else {
            return false;
        };
        self.text_edit = None;
        if !self.service.builder_mut().remove_block(&page_id, &block_id) {
            return false;
        }
        self.commit();
        self.selected_block = None;
        true
    }

    /// Copy the selected block to the shared clipboard.
    pub fn copy_selected(&self) -> bool {
        let Some(block) = self.selected_block() else {
            return false;
        };
        self.clipboard.borrow_mut().copy(block);
        true
    }

    /// Paste the clipboard onto the current page. The clipboard keeps its
    /// content.
    pub fn paste(&mut self) -> Option<BlockId> {
        let block = self.clipboard.borrow().paste()?;
        self.insert_block(block)
    }

    pub fn duplicate_selected(&mut self) -> Option<BlockId> {
        let page_id = self.current_page.clone()?;
        let block_id = self.selected_block.clone()?;
        self.finish_text_edit();
        let copy_id = self
            .service
            .builder_mut()
            .duplicate_block(&page_id, &block_id, DUPLICATE_OFFSET)?
            .id
            .clone();
        self.commit();
        self.selected_block = Some(copy_id.clone());
        Some(copy_id)
    }

    pub fn bring_selected_to_front(&mut self) -> bool {
        self.restack_selected(true)
    }

    pub fn send_selected_to_back(&mut self) -> bool {
        self.restack_selected(false)
    }

    fn restack_selected(&mut self, to_front: bool) -> bool {
        let (Some(page_id), Some(block_id)) = (self.current_page.clone(), self.selected_block.clone()) else {
            return false;
        };
        let builder = self.service.builder_mut();
        let changed = if to_front {
            builder.bring_to_front(&page_id, &block_id)
        } else {
            builder.send_to_back(&page_id, &block_id)
        };
        if changed {
            self.commit();
        }
        changed
    }

    // Document

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.service.builder_mut().set_title(title);
        self.commit();
    }

    pub fn change_format(&mut self, format: PageFormat, orientation: Orientation, scale_blocks: bool) {
        self.finish_text_edit();
        self.service.builder_mut().update_document_format(format, orientation, scale_blocks);
        self.commit();
    }

    /// Switch to a catalog theme. Unknown ids are ignored.
    pub fn set_theme(&mut self, theme_id: &str) -> bool {
        let Some(theme) = self.service.themes().get_theme(theme_id).cloned() else {
            return false;
        };
        self.service.builder_mut().set_theme(theme);
        self.commit();
        true
    }

    /// Replace the document with a saved layout. History restarts from the
    /// imported document.
    pub fn import_layout(&mut self, json: &str) -> bool {
        self.finish_text_edit();
        if !self.service.builder_mut().import_from_json(json) {
            return false;
        }
        let document = self.service.document();
        self.history.initialize(document);
        self.history.save_to_storage(&document.id);
        self.current_page = None;
        let first = self.document().pages.first().map(|p| p.id.clone());
        self.set_current_page(first);
        true
    }

    pub fn export_layout(&self) -> Result<String, serde_json::Error> {
        self.service.builder().export_to_json()
    }

    // History

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.finish_text_edit();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.finish_text_edit();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Document) {
        self.history.save_to_storage(&snapshot.id);
        self.service.builder_mut().load_document(snapshot);
        self.drag = None;
        self.resize = None;

        // Ids may be stale after time travel.
        if self.current_page().is_none() {
            self.current_page = self.document().pages.first().map(|p| p.id.clone());
            self.selected_block = None;
        }
        if self.selected_block().is_none() {
            self.selected_block = None;
        }
    }

    // Gestures. Points are in page display pixels.

    fn block_rect(&self, block_id: &str) -> Option<Rect> {
        let page = self.current_page()?;
        let block = page.block(block_id)?;
        Some(to_display(&block.position, page.display_size()))
    }

    /// Route a pointer-down: handles of the selected block first, then the
    /// topmost block under the pointer, else clear the selection.
    pub fn pointer_down(&mut self, point: Point, handle_tolerance: f64) -> PointerTarget {
        if let Some(rect) = self.selected_block.as_deref().and_then(|id| self.block_rect(id)) {
            if let Some(handle) = hit_test_handles(rect, point, handle_tolerance) {
                if self.begin_resize(handle, point) {
                    return PointerTarget::Handle(handle);
                }
            }
        }
        let hit = self.current_page().and_then(|p| p.block_at(point)).map(|b| b.id.clone());
        match hit {
            Some(block_id) => {
                self.select_block(Some(&block_id));
                self.begin_drag(&block_id, point);
                PointerTarget::Block(block_id)
            }
            None => {
                self.select_block(None);
                PointerTarget::Page
            }
        }
    }

    pub fn begin_drag(&mut self, block_id: &str, pointer: Point) -> bool {
        let (Some(page_id), Some(rect)) = (self.current_page.clone(), self.block_rect(block_id)) else {
            return false;
        };
        self.drag = Some(DragState::begin(page_id, block_id.to_string(), rect, pointer));
        true
    }

    /// Preview rectangle of the dragged block.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Rect> {
        let page_size = self.current_page()?.display_size();
        Some(self.drag.as_mut()?.update(pointer, page_size))
    }

    /// Finish the drag. Returns whether a move was committed.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let Some(page) = self.document().page(&drag.page_id) else {
            return false;
        };
        let Some(block) = page.block(&drag.block_id) else {
            return false;
        };
        let Some(position) = drag.finish(&block.position, page.display_size()) else {
            return false;
        };
        self.commit_position(&drag.page_id, &drag.block_id, position)
    }

    /// Start resizing the selected block by `handle`.
    pub fn begin_resize(&mut self, handle: ResizeHandle, pointer: Point) -> bool {
        let (Some(page_id), Some(block_id)) = (self.current_page.clone(), self.selected_block.clone()) else {
            return false;
        };
        let Some(rect) = self.block_rect(&block_id) else {
            return false;
        };
        self.resize = Some(ResizeState::begin(page_id, block_id, handle, rect, pointer));
        true
    }

    /// Preview rectangle of the resized block. `aspect_locked` is the Shift
    /// key state.
    pub fn resize_to(&mut self, pointer: Point, aspect_locked: bool) -> Option<Rect> {
        Some(self.resize.as_mut()?.update(pointer, aspect_locked))
    }

    /// Finish the resize. Returns whether a new size was committed.
    pub fn end_resize(&mut self) -> bool {
        let Some(resize) = self.resize.take() else {
            return false;
        };
        let Some(page) = self.document().page(&resize.page_id) else {
            return false;
        };
        let Some(block) = page.block(&resize.block_id) else {
            return false;
        };
        let Some(position) = resize.finish(&block.position, page.display_size()) else {
            return false;
        };
        self.commit_position(&resize.page_id, &resize.block_id, position)
    }

    fn commit_position(&mut self, page_id: &str, block_id: &str, position: Position) -> bool {
        if !self.service.builder_mut().update_block(page_id, block_id, BlockUpdate::position(position)) {
            return false;
        }
        self.commit();
        true
    }

    /// Click on a block: select it, and enter inline editing on a
    /// double-click (or a single click on an empty text block).
    pub fn click_block(&mut self, block_id: &str, click_count: u32) -> bool {
        if self.text_edit.as_ref().is_some_and(|e| e.block_id == block_id) {
            return true;
        }
        if !self.select_block(Some(block_id)) {
            return false;
        }
        let enter = self.selected_block().is_some_and(|b| starts_edit(b, click_count));
        if enter {
            self.begin_text_edit(block_id);
        }
        true
    }

    pub fn begin_text_edit(&mut self, block_id: &str) -> bool {
        self.finish_text_edit();
        let Some(page_id) = self.current_page.clone() else {
            return false;
        };
        let Some(block) = self.document().block(&page_id, block_id) else {
            return false;
        };
        let Some(edit) = TextEditSession::begin(page_id, block) else {
            return false;
        };
        self.selected_block = Some(block_id.to_string());
        self.text_edit = Some(edit);
        true
    }

    pub fn is_editing_text(&self) -> bool {
        self.text_edit.is_some()
    }

    /// Current text of the inline editor.
    pub fn editing_text(&self) -> Option<&str> {
        self.text_edit.as_ref().map(TextEditSession::text)
    }

    /// Feed a key to the inline editor. Escape and Ctrl/Cmd+Enter commit.
    pub fn text_key(&mut self, key: TextKey, modifiers: TextModifiers) -> TextEditResult {
        let Some(edit) = self.text_edit.as_mut() else {
            return TextEditResult::NotHandled;
        };
        let result = edit.handle_key(key, modifiers);
        if result == TextEditResult::ExitEdit {
            self.finish_text_edit();
        }
        result
    }

    /// Commit the inline edit (blur). Returns whether the document changed.
    pub fn finish_text_edit(&mut self) -> bool {
        let Some(edit) = self.text_edit.take() else {
            return false;
        };
        // Only plain text content is replaced; structured content stays as loaded.
        let changed = self
            .document()
            .block(&edit.page_id, &edit.block_id)
            .and_then(|b| b.content.as_text())
            .is_some_and(|text| text != edit.text());
        if !changed {
            return false;
        }
        let (page_id, block_id) = (edit.page_id.clone(), edit.block_id.clone());
        let update = BlockUpdate::content(edit.into_content());
        if !self.service.builder_mut().update_block(&page_id, &block_id, update) {
            return false;
        }
        self.commit();
        true
    }
}
