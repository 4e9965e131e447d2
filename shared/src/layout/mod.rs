//! Cell geometry.
//!
//! Layout is a pure function of row content, available width and a
//! [`TextMeasurer`]. [`LayoutCache`] memoizes results per measurer
//! fingerprint; skipping it never changes the output.

mod cache;
mod cell;
mod text;

pub use cache::{LayoutCache, LayoutKey};
pub use cell::{
    layout_review_cell, layout_summary_cell, summary_label, ReviewCellContent, ReviewCellLayout,
    SummaryCellLayout,
};
pub use text::MonospaceMeasurer;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        size: Size::ZERO,
    };

    #[must_use]
    pub const fn new(x: f64, y: f64, size: Size) -> Self {
        Self { x, y, size }
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.size.width
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.size.height
    }

    /// Zero-sized frames mean "not shown".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub line_height: f64,
}

impl TextStyle {
    #[must_use]
    pub const fn new(font_size: f64, line_height: f64) -> Self {
        Self {
            font_size,
            line_height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyledText<'a> {
    pub text: &'a str,
    pub style: TextStyle,
}

impl<'a> StyledText<'a> {
    #[must_use]
    pub const fn new(text: &'a str, style: TextStyle) -> Self {
        Self { text, style }
    }
}

/// Text measurement supplied by the rendering platform.
pub trait TextMeasurer {
    /// Bounding size of `text` wrapped to `max_width`.
    fn measure(&self, text: &StyledText<'_>, max_width: f64) -> Size;

    /// Bounding size of `text` wrapped to `max_width`, clipped to whole lines
    /// fitting in `max_height`.
    fn measure_clipped(&self, text: &StyledText<'_>, max_width: f64, max_height: f64) -> Size;

    /// Changes whenever the same text would measure differently, for example
    /// after a font scale change. Cached layouts are keyed on it.
    fn fingerprint(&self) -> u64;
}

/// Spacing and size constants for the review cell. Values are configuration;
/// the element order is fixed by [`layout_review_cell`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub insets: EdgeInsets,
    pub avatar_size: Size,
    pub avatar_to_name_spacing: f64,
    pub name_to_rating_spacing: f64,
    pub rating_size: Size,
    pub rating_to_text_spacing: f64,
    pub rating_to_photos_spacing: f64,
    pub photo_size: Size,
    pub photo_spacing: f64,
    pub photos_to_text_spacing: f64,
    pub text_to_created_spacing: f64,
    pub show_more_size: Size,
    pub show_more_to_created_spacing: f64,
    pub name_style: TextStyle,
    pub body_style: TextStyle,
    pub created_style: TextStyle,
    pub summary_style: TextStyle,
    pub summary_insets: EdgeInsets,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            insets: EdgeInsets {
                top: 9.0,
                left: 12.0,
                bottom: 9.0,
                right: 12.0,
            },
            avatar_size: Size::new(36.0, 36.0),
            avatar_to_name_spacing: 10.0,
            name_to_rating_spacing: 6.0,
            rating_size: Size::new(84.0, 16.0),
            rating_to_text_spacing: 6.0,
            rating_to_photos_spacing: 10.0,
            photo_size: Size::new(55.0, 66.0),
            photo_spacing: 8.0,
            photos_to_text_spacing: 10.0,
            text_to_created_spacing: 6.0,
            show_more_size: Size::new(170.0, 20.0),
            show_more_to_created_spacing: 6.0,
            name_style: TextStyle::new(15.0, 18.0),
            body_style: TextStyle::new(16.0, 20.0),
            created_style: TextStyle::new(13.0, 16.0),
            summary_style: TextStyle::new(15.0, 18.0),
            summary_insets: EdgeInsets {
                top: 12.0,
                left: 12.0,
                bottom: 12.0,
                right: 12.0,
            },
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values: [(&'static str, f64); 18] = [
            ("insets.top", self.insets.top),
            ("insets.left", self.insets.left),
            ("insets.bottom", self.insets.bottom),
            ("insets.right", self.insets.right),
            ("avatar_size.width", self.avatar_size.width),
            ("avatar_size.height", self.avatar_size.height),
            ("avatar_to_name_spacing", self.avatar_to_name_spacing),
            ("name_to_rating_spacing", self.name_to_rating_spacing),
            ("rating_to_text_spacing", self.rating_to_text_spacing),
            ("rating_to_photos_spacing", self.rating_to_photos_spacing),
            ("photo_size.width", self.photo_size.width),
            ("photo_size.height", self.photo_size.height),
            ("photo_spacing", self.photo_spacing),
            ("photos_to_text_spacing", self.photos_to_text_spacing),
            ("text_to_created_spacing", self.text_to_created_spacing),
            ("show_more_to_created_spacing", self.show_more_to_created_spacing),
            ("body_style.line_height", self.body_style.line_height),
            ("body_style.font_size", self.body_style.font_size),
        ];
        for (field, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidLayoutValue { field, value });
            }
        }
        if self.body_style.line_height <= 0.0 {
            return Err(ConfigError::InvalidLayoutValue {
                field: "body_style.line_height",
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RowLayout {
    Review(ReviewCellLayout),
    Summary(SummaryCellLayout),
}

impl RowLayout {
    #[must_use]
    pub fn height(&self) -> f64 {
        match self {
            Self::Review(layout) => layout.height,
            Self::Summary(layout) => layout.height,
        }
    }
}
