use super::{LayoutConfig, Rect, Size, StyledText, TextMeasurer};
use crate::model::{MaxLines, ReviewRow, SummaryRow};

/// Everything the review cell geometry depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReviewCellContent<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub created: &'a str,
    pub photo_count: usize,
    pub max_lines: MaxLines,
}

impl<'a> ReviewCellContent<'a> {
    /// Photos past `photo_cap` are never laid out.
    #[must_use]
    pub fn from_row(row: &'a ReviewRow, photo_cap: usize) -> Self {
        Self {
            name: &row.name,
            text: &row.text,
            created: &row.created,
            photo_count: row.photos().len().min(photo_cap),
            max_lines: row.max_lines,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewCellLayout {
    pub avatar: Rect,
    pub name: Rect,
    pub rating: Rect,
    pub photos: Vec<Rect>,
    pub text: Rect,
    /// Zero frame when the body fits within its line limit.
    pub show_more: Rect,
    pub created: Rect,
    pub needs_expand: bool,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryCellLayout {
    pub label: Rect,
    pub height: f64,
}

pub fn layout_review_cell(
    content: &ReviewCellContent<'_>,
    width: f64,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
) -> ReviewCellLayout {
    let insets = config.insets;
    let avatar = Rect::new(insets.left, insets.top, config.avatar_size);

    let x = avatar.max_x() + config.avatar_to_name_spacing;
    let content_width = (width - x - insets.right).max(0.0);

    let name_size = measurer.measure(
        &StyledText::new(content.name, config.name_style),
        content_width,
    );
    let name = Rect::new(x, insets.top, name_size);
    let mut y = name.max_y() + config.name_to_rating_spacing;

    let rating = Rect::new(x, y, config.rating_size);
    y = rating.max_y();

    let mut photos = Vec::with_capacity(content.photo_count);
    if content.photo_count == 0 {
        y += config.rating_to_text_spacing;
    } else {
        y += config.rating_to_photos_spacing;
        let step = config.photo_size.width + config.photo_spacing;
        for i in 0..content.photo_count {
            photos.push(Rect::new(x + i as f64 * step, y, config.photo_size));
        }
        y += config.photo_size.height + config.photos_to_text_spacing;
    }

    let mut text = Rect::ZERO;
    let mut needs_expand = false;
    if !content.text.is_empty() {
        let body = StyledText::new(content.text, config.body_style);
        let full = measurer.measure(&body, content_width);
        let shown = match content.max_lines.limit() {
            Some(lines) => {
                let limit = f64::from(lines) * config.body_style.line_height;
                let clipped = measurer.measure_clipped(&body, content_width, limit);
                needs_expand = full.height > clipped.height;
                clipped
            }
            None => full,
        };
        text = Rect::new(x, y, shown);
        y = text.max_y() + config.text_to_created_spacing;
    }

    let mut show_more = Rect::ZERO;
    if needs_expand {
        show_more = Rect::new(x, y, config.show_more_size);
        y = show_more.max_y() + config.show_more_to_created_spacing;
    }

    let created_size =
        measurer.measure(&StyledText::new(content.created, config.created_style), content_width);
    let created = Rect::new(x, y, created_size);
    let height = created.max_y() + insets.bottom;

    ReviewCellLayout {
        avatar,
        name,
        rating,
        photos,
        text,
        show_more,
        created,
        needs_expand,
        height,
    }
}

#[must_use]
pub fn summary_label(summary: &SummaryRow) -> String {
    format!("Reviews: {}", summary.total_reviews)
}

/// Single label centered horizontally between the summary insets.
pub fn layout_summary_cell(
    label: &str,
    width: f64,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
) -> SummaryCellLayout {
    let insets = config.summary_insets;
    let available = (width - insets.left - insets.right).max(0.0);
    let size = measurer.measure(&StyledText::new(label, config.summary_style), available);
    let x = insets.left + ((available - size.width) / 2.0).max(0.0);
    let label = Rect::new(x, insets.top, Size::new(size.width.min(available), size.height));
    SummaryCellLayout {
        height: label.max_y() + insets.bottom,
        label,
    }
}
