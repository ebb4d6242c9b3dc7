//! Visual themes and the built-in theme catalog.

use serde::{Deserialize, Serialize};

/// Id of the theme new documents start with.
pub const DEFAULT_THEME_ID: &str = "light";

/// Colours for one callout block kind (tip, important, warning).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutColors {
    pub background: String,
    pub border: String,
    pub text: String,
}

impl CalloutColors {
    fn new(background: &str, border: &str, text: &str) -> Self {
        Self { background: background.to_string(), border: border.to_string(), text: text.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub text_secondary: String,
    pub background: String,
    pub surface: String,
    pub accent: String,
    pub border: String,
    pub tip_block: CalloutColors,
    pub important_block: CalloutColors,
    pub warning_block: CalloutColors,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingSizes {
    pub h1: f64,
    pub h2: f64,
    pub h3: f64,
}

impl Default for HeadingSizes {
    fn default() -> Self {
        Self { h1: 32.0, h2: 24.0, h3: 20.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub heading_sizes: HeadingSizes,
    pub body_size: f64,
    pub line_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    pub page_padding: f64,
    pub block_spacing: f64,
    pub element_spacing: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self { page_padding: 20.0, block_spacing: 16.0, element_spacing: 8.0 }
    }
}

/// Default block chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAppearance {
    pub border_radius: f64,
    pub border_width: f64,
    pub shadow: String,
}

impl Default for BlockAppearance {
    fn default() -> Self {
        Self { border_radius: 8.0, border_width: 1.0, shadow: "0 1px 3px rgba(0, 0, 0, 0.1)".to_string() }
    }
}

/// A document theme.
///
/// Blocks resolve their missing style values against the theme, so swapping
/// the theme restyles every block that has no explicit override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub colors: ThemeColors,
    pub typography: Typography,
    pub spacing: Spacing,
    pub blocks: BlockAppearance,
}

impl Default for Theme {
    fn default() -> Self {
        ThemeManager::builtin(DEFAULT_THEME_ID).unwrap_or_else(|| BUILTIN_THEMES[0].build())
    }
}

/// Compact description of a built-in theme.
struct ThemePreset {
    id: &'static str,
    name: &'static str,
    primary: &'static str,
    secondary: &'static str,
    accent: &'static str,
    background: &'static str,
    surface: &'static str,
    border: &'static str,
    heading_font: &'static str,
    body_font: &'static str,
    dark: bool,
}

impl ThemePreset {
    fn build(&self) -> Theme {
        let (tip, important, warning) = if self.dark {
            (
                CalloutColors::new("#064e3b", "#10b981", "#d1fae5"),
                CalloutColors::new("#1e3a8a", "#3b82f6", "#dbeafe"),
                CalloutColors::new("#78350f", "#f59e0b", "#fef3c7"),
            )
        } else {
            (
                CalloutColors::new("#ecfdf5", "#10b981", "#065f46"),
                CalloutColors::new("#eff6ff", "#3b82f6", "#1e40af"),
                CalloutColors::new("#fffbeb", "#f59e0b", "#92400e"),
            )
        };
        Theme {
            id: self.id.to_string(),
            name: self.name.to_string(),
            colors: ThemeColors {
                primary: self.primary.to_string(),
                secondary: self.secondary.to_string(),
                text: self.primary.to_string(),
                text_secondary: self.secondary.to_string(),
                background: self.background.to_string(),
                surface: self.surface.to_string(),
                accent: self.accent.to_string(),
                border: self.border.to_string(),
                tip_block: tip,
                important_block: important,
                warning_block: warning,
            },
            typography: Typography {
                heading_font: self.heading_font.to_string(),
                body_font: self.body_font.to_string(),
                heading_sizes: HeadingSizes::default(),
                body_size: 14.0,
                line_height: 1.6,
            },
            spacing: Spacing::default(),
            blocks: BlockAppearance::default(),
        }
    }
}

const BUILTIN_THEMES: [ThemePreset; 8] = [
    ThemePreset {
        id: "minimal",
        name: "Minimal",
        primary: "#1a1a1a",
        secondary: "#666666",
        accent: "#2563eb",
        background: "#ffffff",
        surface: "#f9fafb",
        border: "#e5e7eb",
        heading_font: "Inter",
        body_font: "Inter",
        dark: false,
    },
    ThemePreset {
        id: "light",
        name: "Light",
        primary: "#1e293b",
        secondary: "#64748b",
        accent: "#3b82f6",
        background: "#f8fafc",
        surface: "#ffffff",
        border: "#e2e8f0",
        heading_font: "Inter",
        body_font: "Inter",
        dark: false,
    },
    ThemePreset {
        id: "dark",
        name: "Dark",
        primary: "#f1f5f9",
        secondary: "#cbd5e1",
        accent: "#f59e0b",
        background: "#0f172a",
        surface: "#1e293b",
        border: "#334155",
        heading_font: "Montserrat",
        body_font: "Open Sans",
        dark: true,
    },
    ThemePreset {
        id: "travel-magazine",
        name: "Travel Magazine",
        primary: "#1a1a1a",
        secondary: "#4a4a4a",
        accent: "#ea580c",
        background: "#ffffff",
        surface: "#fff7ed",
        border: "#fed7aa",
        heading_font: "Playfair Display",
        body_font: "Lato",
        dark: false,
    },
    ThemePreset {
        id: "classic",
        name: "Classic",
        primary: "#2c1810",
        secondary: "#5a4a42",
        accent: "#8b4513",
        background: "#faf8f5",
        surface: "#f5f0e8",
        border: "#d6c7b0",
        heading_font: "Crimson Text",
        body_font: "Crimson Text",
        dark: false,
    },
    ThemePreset {
        id: "modern",
        name: "Modern",
        primary: "#18181b",
        secondary: "#52525b",
        accent: "#8b5cf6",
        background: "#ffffff",
        surface: "#fafafa",
        border: "#e4e4e7",
        heading_font: "Poppins",
        body_font: "Inter",
        dark: false,
    },
    ThemePreset {
        id: "romantic",
        name: "Romantic",
        primary: "#4a1942",
        secondary: "#8b5a83",
        accent: "#e91e63",
        background: "#fdf2f8",
        surface: "#fce7f3",
        border: "#f9a8d4",
        heading_font: "Cormorant Garamond",
        body_font: "Lora",
        dark: false,
    },
    ThemePreset {
        id: "adventure",
        name: "Adventure",
        primary: "#1a1a1a",
        secondary: "#4a4a4a",
        accent: "#ff6b35",
        background: "#ffffff",
        surface: "#f5f5f4",
        border: "#d6d3d1",
        heading_font: "Oswald",
        body_font: "Roboto",
        dark: false,
    },
];

/// Catalog of available themes.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    themes: Vec<Theme>,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeManager {
    /// Catalog with the built-in themes.
    pub fn new() -> Self {
        Self { themes: BUILTIN_THEMES.iter().map(ThemePreset::build).collect() }
    }

    fn builtin(id: &str) -> Option<Theme> {
        BUILTIN_THEMES.iter().find(|p| p.id == id).map(ThemePreset::build)
    }

    pub fn get_theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    /// Theme by id, or the default theme for unknown ids.
    pub fn theme_or_default(&self, id: &str) -> Theme {
        self.get_theme(id).cloned().unwrap_or_default()
    }

    pub fn default_theme(&self) -> Theme {
        Theme::default()
    }

    pub fn all_themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Add or replace a theme with the same id.
    pub fn register(&mut self, theme: Theme) {
        match self.themes.iter_mut().find(|t| t.id == theme.id) {
            Some(existing) => *existing = theme,
            None => self.themes.push(theme),
        }
    }
}
