use folio_core::geometry::{MIN_BLOCK_SIZE_PX, PX_PER_MM, to_display};
use folio_core::interaction::{TextKey, TextModifiers};
use folio_core::*;
use kurbo::Point;
use std::sync::Arc;
use tempfile::tempdir;

fn open(builder: DocumentBuilder, storage: Arc<dyn Storage>) -> EditorSession {
    EditorSession::open(
        ConstructorService::new(builder),
        HistoryManager::new().with_storage(storage),
        Clipboard::shared(),
    )
}

fn fresh_session() -> EditorSession {
    EditorSession::open(ConstructorService::default(), HistoryManager::new(), Clipboard::shared())
}

#[test]
fn test_undo_then_redo_is_identity() {
    let mut session = fresh_session();
    session.add_block(BlockType::HeadingH1);
    session.add_block(BlockType::Paragraph);
    session.set_theme("modern");

    let latest = session.document().clone();
    while session.undo() {}
    assert!(!session.can_undo());
    while session.redo() {}
    assert_eq!(session.document(), &latest);
}

#[test]
fn test_new_edit_after_undo_discards_redo() {
    let mut session = fresh_session();
    session.add_block(BlockType::Paragraph);
    session.add_block(BlockType::Quote);
    assert!(session.undo());
    assert!(session.can_redo());

    session.add_block(BlockType::Divider);
    assert!(!session.can_redo());
    let types: Vec<&BlockType> = session.current_page().unwrap().blocks.iter().map(|b| &b.block_type).collect();
    assert_eq!(types, vec![&BlockType::Paragraph, &BlockType::Divider]);
}

#[test]
fn test_history_is_bounded() {
    let mut history = HistoryManager::with_depth(5);
    let mut builder = DocumentBuilder::default();
    history.initialize(builder.document());
    for i in 0..20 {
        builder.set_title(format!("Title {i}"));
        history.push(builder.document());
    }
    assert_eq!(history.len(), 5);
    assert_eq!(history.current().unwrap().title, "Title 19");
    let mut undone = 0;
    while history.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(history.current().unwrap().title, "Title 15");
}

#[test]
fn test_paste_twice_gives_distinct_blocks() {
    let mut session = fresh_session();
    let original = session.add_block(BlockType::WarningBlock).unwrap();
    assert!(session.copy_selected());
    session.add_page();

    let first = session.paste().unwrap();
    let second = session.paste().unwrap();
    assert_ne!(first, second);
    assert_ne!(first, original);

    let page = session.current_page().unwrap();
    assert_eq!(page.blocks.len(), 2);
    assert_eq!(page.blocks[0].content, page.blocks[1].content);
    assert_eq!(page.blocks[0].block_type, BlockType::WarningBlock);
}

#[test]
fn test_shift_resize_keeps_aspect_ratio() {
    let mut session = fresh_session();
    session.add_block(BlockType::Image);
    let page = session.current_page().unwrap();
    let block = session.selected_block().unwrap();
    let start = to_display(&block.position, page.display_size());
    let ratio = start.width() / start.height();

    let corner = Point::new(start.x1, start.y1);
    assert_eq!(session.pointer_down(corner, 5.0), PointerTarget::Handle(ResizeHandle::SE));
    let preview = session.resize_to(Point::new(corner.x - 200.0, corner.y + 3.0), true).unwrap();
    assert!((preview.width() / preview.height() - ratio).abs() < 1e-9);
    assert!(session.end_resize());

    let p = session.selected_block().unwrap().position;
    assert!((p.width / p.height - ratio).abs() < 1e-9);
    assert!((p.x - 20.0).abs() < 1e-9);
}

#[test]
fn test_resize_never_goes_below_minimum() {
    let mut session = fresh_session();
    let id = session.add_block(BlockType::Paragraph).unwrap();
    let page_size = session.current_page().unwrap().display_size();
    let start = to_display(&session.selected_block().unwrap().position, page_size);

    assert!(session.begin_resize(ResizeHandle::NW, Point::new(start.x0, start.y0)));
    let preview = session.resize_to(Point::new(start.x1 + 500.0, start.y1 + 500.0), false).unwrap();
    assert!((preview.width() - MIN_BLOCK_SIZE_PX).abs() < 1e-9);
    assert!((preview.height() - MIN_BLOCK_SIZE_PX).abs() < 1e-9);
    assert!((preview.x1 - start.x1).abs() < 1e-9);
    assert!((preview.y1 - start.y1).abs() < 1e-9);
    assert!(session.end_resize());

    let page_id = session.current_page_id().unwrap().to_string();
    let p = session.document().block(&page_id, &id).unwrap().position;
    assert!((p.width - MIN_BLOCK_SIZE_PX / PX_PER_MM).abs() < 1e-9);
}

#[test]
fn test_drag_is_clamped_to_page() {
    let mut session = fresh_session();
    let id = session.add_block(BlockType::Paragraph).unwrap();
    let page_size = session.current_page().unwrap().display_size();
    let start = Point::new(100.0, 200.0);
    assert!(session.begin_drag(&id, start));
    let preview = session.drag_to(Point::new(-5000.0, 1.0e6)).unwrap();
    assert!(preview.x0.abs() < 1e-9);
    assert!((preview.y1 - page_size.height).abs() < 1e-9);
    assert!(session.end_drag());
}

#[test]
fn test_text_edit_commits_on_action_enter() {
    let mut session = fresh_session();
    let id = session.add_block(BlockType::Paragraph).unwrap();
    session.update_block(&id, BlockUpdate::content(BlockContent::Text(String::new())));

    // A single click on an empty text block starts editing.
    assert!(session.click_block(&id, 1));
    assert!(session.is_editing_text());
    let plain = TextModifiers::default();
    session.text_key(TextKey::Character("Line one".to_string()), plain);
    session.text_key(TextKey::Enter, plain);
    session.text_key(TextKey::Character("Line two".to_string()), plain);
    assert_eq!(session.editing_text(), Some("Line one\nLine two"));

    let action = TextModifiers { ctrl: true, meta: true, ..TextModifiers::default() };
    session.text_key(TextKey::Enter, action);
    assert!(!session.is_editing_text());
    assert_eq!(session.selected_block().unwrap().content.as_text(), Some("Line one\nLine two"));
}

#[test]
fn test_history_survives_restart_with_file_storage() {
    let dir = tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
    let builder = DocumentBuilder::new("Alps", PageFormat::A5, Orientation::Landscape);
    let document_id = builder.document().id.clone();

    {
        let mut session = open(builder.clone(), storage.clone());
        session.add_block(BlockType::HeadingH1);
        session.add_block(BlockType::Map);
    }
    assert!(storage.exists(&history::history_key(&document_id)).unwrap());

    let mut session = open(builder, storage.clone());
    assert_eq!(session.current_page().unwrap().blocks.len(), 2);
    assert!(session.undo());
    assert_eq!(session.current_page().unwrap().blocks.len(), 1);

    let reopened = open(DocumentBuilder::default(), storage);
    assert_ne!(reopened.document().id, document_id);
    assert_eq!(reopened.history().len(), 1);
}

#[test]
fn test_corrupt_history_is_ignored() {
    let dir = tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
    let builder = DocumentBuilder::new("Broken", PageFormat::A4, Orientation::Portrait);
    storage.save(&history::history_key(&builder.document().id), "{not json").unwrap();

    let session = open(builder, storage);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.document().pages.len(), 1);
}

#[test]
fn test_export_uses_snapshot_and_reports_progress() {
    struct SizeRenderer;
    impl PageRenderer for SizeRenderer {
        fn render_page(&self, page: &Page, _: &Theme, config: &ExportConfig) -> Result<RenderedPage, ExportError> {
            let (width, height) = config.pixel_size(page);
            Ok(RenderedPage {
                page_id: page.id.clone(),
                page_number: page.page_number,
                width,
                height,
                image_data: vec![0; 4],
            })
        }
    }
    struct JoinAssembler;
    impl PdfAssembler for JoinAssembler {
        fn assemble(&self, pages: &[RenderedPage], filename: &str) -> Result<ExportArtifact, ExportError> {
            Ok(ExportArtifact {
                blob: pages.iter().flat_map(|p| p.image_data.iter().copied()).collect(),
                filename: format!("{filename}.pdf"),
            })
        }
    }

    let mut session = fresh_session();
    session.set_title("Road Trip: Day 1");
    session.add_page();
    let mut percents = Vec::new();
    let artifact = session
        .service()
        .export_to_pdf(&ExportConfig::default(), &SizeRenderer, &JoinAssembler, &mut |p, _| percents.push(p))
        .unwrap();

    assert_eq!(artifact.size(), 8);
    assert!(artifact.filename.starts_with("road_trip_day_1_"));
    assert!(artifact.filename.ends_with(".pdf"));
    assert_eq!(percents.first(), Some(&0));
    assert_eq!(percents.last(), Some(&100));
}
