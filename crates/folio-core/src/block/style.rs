//! Per-block style overrides and their resolution against a theme.

use super::{BlockType, same_json};
use crate::theme::Theme;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// Inner spacing of a block: one number for every side, or per side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    Uniform(f64),
    Sides(PaddingSides),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaddingSides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

/// Resolved padding in points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub fn uniform(value: f64) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }
}

impl Padding {
    /// Missing sides count as zero.
    pub fn insets(&self) -> Insets {
        match *self {
            Padding::Uniform(value) => Insets::uniform(value),
            Padding::Sides(sides) => Insets {
                top: sides.top.unwrap_or(0.0),
                right: sides.right.unwrap_or(0.0),
                bottom: sides.bottom.unwrap_or(0.0),
                left: sides.left.unwrap_or(0.0),
            },
        }
    }
}

/// Block shadow: a CSS `box-shadow` string or a structured drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shadow {
    Css(String),
    Drop(DropShadow),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DropShadow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
}

/// Presentational overrides stored on a block.
///
/// Every field is optional; absent fields fall back to the document theme
/// at render time. Keys this build does not know, and known keys whose value
/// has a shape it cannot represent exactly, are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Styles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Take `key` out of `map` if its value decodes to `T` and encodes back unchanged.
fn take<T: DeserializeOwned + Serialize>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    let typed: T = serde_json::from_value(value.clone()).ok()?;
    if !serde_json::to_value(&typed).is_ok_and(|encoded| same_json(&encoded, value)) {
        return None;
    }
    map.remove(key);
    Some(typed)
}

impl From<Map<String, Value>> for Styles {
    fn from(mut map: Map<String, Value>) -> Self {
        Styles {
            font_size: take(&mut map, "fontSize"),
            font_family: take(&mut map, "fontFamily"),
            font_weight: take(&mut map, "fontWeight"),
            color: take(&mut map, "color"),
            text_align: take(&mut map, "textAlign"),
            line_height: take(&mut map, "lineHeight"),
            background_color: take(&mut map, "backgroundColor"),
            padding: take(&mut map, "padding"),
            border: take(&mut map, "border"),
            opacity: take(&mut map, "opacity"),
            shadow: take(&mut map, "shadow"),
            extra: map,
        }
    }
}

/// Fully resolved style of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    pub text_align: TextAlign,
    pub line_height: f64,
    pub background_color: Option<String>,
    pub padding: Insets,
    pub border_color: String,
    pub border_width: f64,
    pub border_radius: f64,
    pub opacity: f64,
    pub shadow: Option<Shadow>,
}

impl Styles {
    pub fn is_empty(&self) -> bool {
        *self == Styles::default()
    }

    /// Copy of `self` with every field set in `overrides` replaced.
    pub fn merged(&self, overrides: &Styles) -> Styles {
        let mut extra = self.extra.clone();
        extra.extend(overrides.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Styles {
            font_size: overrides.font_size.or(self.font_size),
            font_family: overrides.font_family.clone().or_else(|| self.font_family.clone()),
            font_weight: overrides.font_weight.clone().or_else(|| self.font_weight.clone()),
            color: overrides.color.clone().or_else(|| self.color.clone()),
            text_align: overrides.text_align.or(self.text_align),
            line_height: overrides.line_height.or(self.line_height),
            background_color: overrides.background_color.clone().or_else(|| self.background_color.clone()),
            padding: overrides.padding.or(self.padding),
            border: overrides.border.clone().or_else(|| self.border.clone()),
            opacity: overrides.opacity.or(self.opacity),
            shadow: overrides.shadow.clone().or_else(|| self.shadow.clone()),
            extra,
        }
    }

    /// Fill absent values from `theme` for a block of `block_type`.
    pub fn resolve(&self, theme: &Theme, block_type: &BlockType) -> ResolvedStyle {
        let typography = &theme.typography;
        let callout = match block_type {
            BlockType::TipBlock => Some(&theme.colors.tip_block),
            BlockType::ImportantBlock => Some(&theme.colors.important_block),
            BlockType::WarningBlock => Some(&theme.colors.warning_block),
            _ => None,
        };
        let theme_font_size = match block_type {
            BlockType::HeadingH1 => typography.heading_sizes.h1,
            BlockType::HeadingH2 => typography.heading_sizes.h2,
            BlockType::HeadingH3 => typography.heading_sizes.h3,
            _ => typography.body_size,
        };
        let (theme_font, theme_weight) = if block_type.is_heading() {
            (&typography.heading_font, "bold")
        } else {
            (&typography.body_font, "normal")
        };
        let border = self.border.clone().unwrap_or_default();

        ResolvedStyle {
            font_size: self.font_size.unwrap_or(theme_font_size),
            font_family: self.font_family.clone().unwrap_or_else(|| theme_font.clone()),
            font_weight: self.font_weight.clone().unwrap_or_else(|| theme_weight.to_string()),
            color: self
                .color
                .clone()
                .or_else(|| callout.map(|c| c.text.clone()))
                .unwrap_or_else(|| theme.colors.text.clone()),
            text_align: self.text_align.unwrap_or_default(),
            line_height: self.line_height.unwrap_or(typography.line_height),
            background_color: self.background_color.clone().or_else(|| callout.map(|c| c.background.clone())),
            padding: self.padding.map_or_else(
                || Insets::uniform(if callout.is_some() { theme.spacing.element_spacing } else { 0.0 }),
                |p| p.insets(),
            ),
            border_color: border
                .color
                .or_else(|| callout.map(|c| c.border.clone()))
                .unwrap_or_else(|| theme.colors.border.clone()),
            border_width: border.width.unwrap_or(theme.blocks.border_width),
            border_radius: border.radius.unwrap_or(theme.blocks.border_radius),
            opacity: self.opacity.unwrap_or(1.0),
            shadow: self.shadow.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeManager;
    use serde_json::json;

    #[test]
    fn test_empty_styles_serialize_to_empty_object() {
        assert_eq!(serde_json::to_value(Styles::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_unknown_keys_kept() {
        let value = json!({"fontSize": 18.0, "letterSpacing": "0.1em"});
        let styles: Styles = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(styles.font_size, Some(18.0));
        assert_eq!(styles.extra.get("letterSpacing"), Some(&json!("0.1em")));
        assert_eq!(serde_json::to_value(&styles).unwrap(), value);
    }

    #[test]
    fn test_object_padding_and_shadow_import() {
        let value = json!({
            "padding": {"top": 8, "right": 12, "bottom": 8, "left": 12},
            "shadow": {"color": "rgba(0,0,0,0.3)", "blur": 6, "offsetX": 2, "offsetY": 3}
        });
        let styles: Styles = serde_json::from_value(value.clone()).unwrap();
        assert!(styles.extra.is_empty());
        let Some(Padding::Sides(sides)) = styles.padding else {
            panic!("Expected per-side padding, got {:?}", styles.padding);
        };
        assert_eq!(sides.right, Some(12.0));
        let Some(Shadow::Drop(shadow)) = &styles.shadow else {
            panic!("Expected drop shadow, got {:?}", styles.shadow);
        };
        assert_eq!(shadow.offset_y, Some(3.0));

        let resolved = styles.resolve(&Theme::default(), &BlockType::Paragraph);
        assert_eq!(resolved.padding, Insets { top: 8.0, right: 12.0, bottom: 8.0, left: 12.0 });

        let encoded = serde_json::to_value(&styles).unwrap();
        assert_eq!(encoded["padding"]["left"], json!(12.0));
        assert_eq!(encoded["shadow"]["color"], "rgba(0,0,0,0.3)");
    }

    #[test]
    fn test_scalar_padding_and_css_shadow() {
        let value = json!({"padding": 10.0, "shadow": "0 1px 3px rgba(0, 0, 0, 0.1)"});
        let styles: Styles = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(styles.padding, Some(Padding::Uniform(10.0)));
        assert!(matches!(styles.shadow, Some(Shadow::Css(_))));
        assert_eq!(serde_json::to_value(&styles).unwrap(), value);
    }

    #[test]
    fn test_unrepresentable_known_keys_fall_into_extra() {
        let value = json!({"fontSize": "large", "textAlign": "start", "color": null, "padding": {"inline": 4}});
        let styles: Styles = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(styles.font_size, None);
        assert_eq!(styles.text_align, None);
        assert_eq!(styles.padding, None);
        assert_eq!(styles.extra.len(), 4);
        assert_eq!(serde_json::to_value(&styles).unwrap(), value);
    }

    #[test]
    fn test_resolve_heading_falls_back_to_theme() {
        let theme = Theme::default();
        let resolved = Styles::default().resolve(&theme, &BlockType::HeadingH2);
        assert!((resolved.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(resolved.font_family, theme.typography.heading_font);
        assert_eq!(resolved.font_weight, "bold");
        assert_eq!(resolved.color, theme.colors.text);
    }

    #[test]
    fn test_resolve_override_wins() {
        let theme = Theme::default();
        let styles = Styles { font_size: Some(11.0), color: Some("#ff0000".to_string()), ..Styles::default() };
        let resolved = styles.resolve(&theme, &BlockType::Paragraph);
        assert!((resolved.font_size - 11.0).abs() < f64::EPSILON);
        assert_eq!(resolved.color, "#ff0000");
    }

    #[test]
    fn test_resolve_callout_colors_follow_theme() {
        let manager = ThemeManager::new();
        let light = manager.get_theme("light").unwrap();
        let dark = manager.get_theme("dark").unwrap();
        let styles = Styles::default();
        let on_light = styles.resolve(light, &BlockType::WarningBlock);
        let on_dark = styles.resolve(dark, &BlockType::WarningBlock);
        assert_eq!(on_light.background_color.as_deref(), Some(light.colors.warning_block.background.as_str()));
        assert_ne!(on_light.background_color, on_dark.background_color);
    }

    #[test]
    fn test_merged() {
        let base = Styles { font_size: Some(12.0), color: Some("#111111".to_string()), ..Styles::default() };
        let overrides = Styles { color: Some("#222222".to_string()), ..Styles::default() };
        let merged = base.merged(&overrides);
        assert_eq!(merged.font_size, Some(12.0));
        assert_eq!(merged.color.as_deref(), Some("#222222"));
    }
}
