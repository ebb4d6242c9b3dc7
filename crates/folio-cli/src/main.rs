use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use folio_core::history::history_key;
use folio_core::{
    BlockContent, BlockType, BlockUpdate, Clipboard, ConstructorService, Document, DocumentBuilder, EditorConfig, EditorSession,
    FileStorage, HistoryManager, Orientation, PageFormat, Storage, ThemeManager, parse_layout,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "folio", about = "Page-layout constructor CLI", version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new layout with one empty page
    New {
        /// Output layout file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, default_value = "Untitled")]
        title: String,

        /// Page format (config default when omitted)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        /// Theme id (config default when omitted)
        #[arg(long)]
        theme: Option<String>,
    },

    /// Show a summary of a layout
    Info {
        input: PathBuf,
    },

    /// Append an empty page
    AddPage {
        input: PathBuf,
    },

    /// Add a block with default placement to a page
    AddBlock {
        input: PathBuf,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Block type, e.g. paragraph, heading-h1, tip-block
        #[arg(short = 'k', long = "type")]
        block_type: String,

        /// Text content for text blocks
        #[arg(long)]
        text: Option<String>,
    },

    /// Change the page format of every page
    Reformat {
        input: PathBuf,

        #[arg(long, value_enum)]
        format: FormatArg,

        #[arg(long, value_enum, default_value = "portrait")]
        orientation: OrientationArg,

        /// Keep block positions instead of scaling them to the new page
        #[arg(long)]
        no_scale: bool,
    },

    /// Switch the layout to a built-in theme
    ApplyTheme {
        input: PathBuf,

        theme: String,
    },

    /// Undo the last change recorded for a layout
    Undo {
        input: PathBuf,
    },

    /// Redo the last undone change of a layout
    Redo {
        input: PathBuf,
    },

    /// Show or drop the saved editing history of a layout
    History {
        input: PathBuf,

        /// Delete the saved history
        #[arg(long)]
        clear: bool,
    },

    /// List the built-in themes
    Themes,

    /// Print the effective configuration
    Config {
        /// Write the defaults to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    A4,
    A5,
    A6,
    Letter,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<FormatArg> for PageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::A4 => Self::A4,
            FormatArg::A5 => Self::A5,
            FormatArg::A6 => Self::A6,
            FormatArg::Letter => Self::Letter,
        }
    }
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

fn config_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    cli_path
        .or_else(EditorConfig::default_path)
        .context("Could not determine config directory; pass --config")
}

fn open_storage(config: &EditorConfig) -> Result<Arc<FileStorage>> {
    let storage = match &config.storage_dir {
        Some(dir) => FileStorage::new(dir.clone()),
        None => FileStorage::default_location(),
    }?;
    log::debug!("Using storage at {}", storage.base_path().display());
    Ok(Arc::new(storage))
}

fn read_layout(path: &Path) -> Result<Document> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_layout(&json).with_context(|| format!("Invalid layout {}", path.display()))
}

fn write_layout(path: &Path, document: &Document) -> Result<()> {
    std::fs::write(path, document.to_json()?).with_context(|| format!("Failed to write {}", path.display()))
}

/// Open an editing session on a layout file, with history kept in storage.
///
/// A saved history wins over the file; the file is only used to start a
/// fresh history.
fn open_session(path: &Path, config: &EditorConfig) -> Result<EditorSession> {
    let document = read_layout(path)?;
    let storage = open_storage(config)?;
    let history = HistoryManager::with_depth(config.history_depth).with_storage(storage);
    let service = ConstructorService::new(DocumentBuilder::from_document(document.clone()));
    let session = EditorSession::open(service, history, Clipboard::shared());
    if history_overrides_file(&document, session.document()) {
        log::warn!("Saved history for {} differs from {}; using history", document.id, path.display());
    }
    Ok(session)
}

/// Whether the restored history snapshot replaced what was read from disk.
/// Opening a file with no saved history may add a first page, which does not count.
fn history_overrides_file(file: &Document, restored: &Document) -> bool {
    if file.pages.is_empty() && restored.pages.len() == 1 && restored.pages[0].blocks.is_empty() {
        return false;
    }
    file != restored
}

fn print_info(document: &Document) {
    println!("{} ({})", document.title, document.id);
    println!("  Format: {} {:?}", document.format.name(), document.orientation);
    println!("  Theme: {}", document.theme.name);
    println!("  Pages: {}", document.pages.len());
    for page in &document.pages {
        let types: Vec<&str> = page.blocks.iter().map(|b| b.block_type.as_str()).collect();
        println!("    {:>3}: {} blocks [{}]", page.page_number, page.blocks.len(), types.join(", "));
    }
    println!("  Updated: {}", document.updated_at);
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config_file = config_path(cli.config)?;
    let config = EditorConfig::load_or_default(&config_file)?;

    match cli.command {
        Commands::New { output, title, format, orientation, theme } => {
            let format = format.map_or(config.default_format, Into::into);
            let orientation = orientation.map_or(config.default_orientation, Into::into);
            let theme_id = theme.unwrap_or_else(|| config.default_theme.clone());

            let themes = ThemeManager::new();
            let Some(theme) = themes.get_theme(&theme_id) else {
                bail!("Unknown theme '{theme_id}'");
            };
            let mut builder = DocumentBuilder::new(title, format, orientation);
            builder.set_theme(theme.clone());
            builder.add_page();
            write_layout(&output, builder.document())?;
            println!("Created {} → {}", builder.document().title, output.display());
        }

        Commands::Info { input } => {
            print_info(&read_layout(&input)?);
        }

        Commands::AddPage { input } => {
            let mut session = open_session(&input, &config)?;
            session.add_page();
            write_layout(&input, session.document())?;
            println!("Added page {}", session.document().pages.len());
        }

        Commands::AddBlock { input, page, block_type, text } => {
            let block_type = BlockType::from(block_type.as_str());
            if let BlockType::Unknown(name) = &block_type {
                bail!("Unknown block type '{name}'");
            }
            let mut session = open_session(&input, &config)?;
            if page == 0 || !session.go_to_page(page - 1) {
                bail!("Page {page} does not exist");
            }
            let Some(block_id) = session.add_block(block_type) else {
                bail!("Could not add block to page {page}");
            };
            if let Some(text) = text {
                let Some(block) = session.selected_block() else {
                    bail!("Block {block_id} vanished");
                };
                if !block.block_type.is_text() {
                    bail!("Block type {} does not take text", block.block_type);
                }
                let update = BlockUpdate::content(BlockContent::Text(text));
                session.update_block(&block_id, update);
            }
            write_layout(&input, session.document())?;
            println!("Added block {block_id} to page {page}");
        }

        Commands::Reformat { input, format, orientation, no_scale } => {
            let mut session = open_session(&input, &config)?;
            session.change_format(format.into(), orientation.into(), !no_scale);
            write_layout(&input, session.document())?;
            print_info(session.document());
        }

        Commands::ApplyTheme { input, theme } => {
            let mut session = open_session(&input, &config)?;
            if !session.set_theme(&theme) {
                bail!("Unknown theme '{theme}'");
            }
            write_layout(&input, session.document())?;
            println!("Applied theme {theme}");
        }

        Commands::Undo { input } => {
            let mut session = open_session(&input, &config)?;
            if !session.undo() {
                bail!("Nothing to undo");
            }
            write_layout(&input, session.document())?;
            println!("Undone ({} more)", session.history().cursor());
        }

        Commands::Redo { input } => {
            let mut session = open_session(&input, &config)?;
            if !session.redo() {
                bail!("Nothing to redo");
            }
            write_layout(&input, session.document())?;
            println!("Redone");
        }

        Commands::History { input, clear } => {
            let document = read_layout(&input)?;
            let storage = open_storage(&config)?;
            if clear {
                HistoryManager::new().with_storage(storage).clear_storage(&document.id);
                println!("Cleared history for {}", document.id);
                return Ok(());
            }
            if !storage.exists(&history_key(&document.id))? {
                println!("No saved history for {}", document.id);
                return Ok(());
            }
            let mut history = HistoryManager::with_depth(config.history_depth).with_storage(storage);
            if !history.load_from_storage(&document.id) {
                bail!("Saved history for {} is unreadable", document.id);
            }
            println!("History for {}: {} entries, at {}", document.id, history.len(), history.cursor() + 1);
            println!("  Can undo: {}", history.can_undo());
            println!("  Can redo: {}", history.can_redo());
        }

        Commands::Themes => {
            for theme in ThemeManager::new().all_themes() {
                println!("{:<18} {} ({}, {})", theme.id, theme.name, theme.typography.heading_font, theme.colors.primary);
            }
        }

        Commands::Config { init } => {
            if init {
                config.save_to_file(&config_file)?;
                println!("Wrote {}", config_file.display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
