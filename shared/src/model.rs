use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{ConfigError, FeedConfig};
use crate::event::{RowId, SlotTarget};
use crate::image_processing::Photo;
use crate::layout::{
    layout_review_cell, layout_summary_cell, summary_label, LayoutCache, LayoutKey,
    ReviewCellContent, RowLayout, TextMeasurer,
};
use crate::photo_cache::PhotoCache;
use crate::scope::{Generation, ScopeRegistry};

/// Server-sourced review. Immutable once decoded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Review {
    pub first_name: String,
    pub last_name: String,
    pub rating: u8,
    pub text: String,
    pub created: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
}

impl Review {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[must_use]
    pub fn photo_urls(&self) -> &[String] {
        self.photo_urls.as_deref().unwrap_or(&[])
    }
}

/// One decoded page. Consumed by the feed and then dropped.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<Review>,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum ImageSlot {
    /// No URL to load from.
    #[default]
    Absent,
    /// Fetch pending.
    Placeholder,
    Error,
    Loaded(Arc<Photo>),
}

impl ImageSlot {
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaxLines {
    Limited(u32),
    Unlimited,
}

impl MaxLines {
    #[must_use]
    pub const fn limit(self) -> Option<u32> {
        match self {
            Self::Limited(n) => Some(n),
            Self::Unlimited => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    id: RowId,
    pub avatar: ImageSlot,
    photos: Vec<ImageSlot>,
    pub name: String,
    pub rating: u8,
    pub text: String,
    pub created: String,
    pub max_lines: MaxLines,
}

impl ReviewRow {
    /// Slots start as placeholders for URLs that will be fetched. Photo URLs
    /// past `photo_cap` are never fetched and stay absent.
    #[must_use]
    pub fn from_review(review: &Review, max_lines: u32, photo_cap: usize) -> Self {
        let avatar = if review.avatar_url.is_some() {
            ImageSlot::Placeholder
        } else {
            ImageSlot::Absent
        };
        let photos = review
            .photo_urls()
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if i < photo_cap {
                    ImageSlot::Placeholder
                } else {
                    ImageSlot::Absent
                }
            })
            .collect();

        Self {
            id: RowId::generate(),
            avatar,
            photos,
            name: review.display_name(),
            rating: review.rating,
            text: review.text.clone(),
            created: review.created.clone(),
            max_lines: MaxLines::Limited(max_lines),
        }
    }

    #[must_use]
    pub const fn id(&self) -> RowId {
        self.id
    }

    #[must_use]
    pub fn photos(&self) -> &[ImageSlot] {
        &self.photos
    }

    /// Replace a slot's content. The photo sequence never changes length; an
    /// out-of-range target is ignored and reported as `false`.
    pub fn set_slot(&mut self, target: SlotTarget, slot: ImageSlot) -> bool {
        match target {
            SlotTarget::Avatar => {
                self.avatar = slot;
                true
            }
            SlotTarget::Photo(i) => match self.photos.get_mut(i) {
                Some(existing) => {
                    *existing = slot;
                    true
                }
                None => false,
            },
        }
    }

    pub fn expand(&mut self) {
        self.max_lines = MaxLines::Unlimited;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub total_reviews: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RowItem {
    Review(ReviewRow),
    Summary(SummaryRow),
}

impl RowItem {
    #[must_use]
    pub const fn as_review(&self) -> Option<&ReviewRow> {
        match self {
            Self::Review(row) => Some(row),
            Self::Summary(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub offset: usize,
    pub page_size: usize,
    pub more_available: bool,
    pub in_flight: bool,
}

impl Cursor {
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size,
            more_available: true,
            in_flight: false,
        }
    }

    #[must_use]
    pub const fn can_request(&self) -> bool {
        self.more_available && !self.in_flight
    }

    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.offset == 0
    }

    pub fn advance(&mut self, loaded: usize, total: usize) {
        self.offset += self.page_size;
        self.more_available = loaded < total;
    }
}

/// Ordered rows of the current generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListState {
    rows: Vec<RowItem>,
}

impl ListState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rows(&self) -> &[RowItem] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn review_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, RowItem::Review(_)))
            .count()
    }

    /// Append review rows and return the indexes they landed at.
    pub fn append_reviews(&mut self, rows: Vec<ReviewRow>) -> Vec<usize> {
        self.drop_summary();
        let start = self.rows.len();
        self.rows.extend(rows.into_iter().map(RowItem::Review));
        (start..self.rows.len()).collect()
    }

    /// Rebuild the trailing summary row and return its index.
    pub fn set_summary(&mut self, summary: SummaryRow) -> usize {
        self.drop_summary();
        self.rows.push(RowItem::Summary(summary));
        self.rows.len() - 1
    }

    /// Look up a review row by id for patching.
    pub fn review_mut(&mut self, id: RowId) -> Option<(usize, &mut ReviewRow)> {
        self.rows
            .iter_mut()
            .enumerate()
            .find_map(|(i, r)| match r {
                RowItem::Review(row) if row.id() == id => Some((i, row)),
                _ => None,
            })
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    fn drop_summary(&mut self) {
        if matches!(self.rows.last(), Some(RowItem::Summary(_))) {
            self.rows.pop();
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPhase {
    #[default]
    Idle,
    FetchingPage,
    Error,
}

/// Core-side feed state. Only [`crate::App::update`] mutates it; the shell
/// reads it through the view model and [`Model::layout_row`].
pub struct Model {
    pub(crate) config: FeedConfig,
    pub(crate) list: ListState,
    pub(crate) cursor: Cursor,
    pub(crate) phase: LoadPhase,
    pub(crate) generation: Generation,
    pub(crate) scopes: ScopeRegistry,
    pub(crate) photos: PhotoCache,
    pub(crate) layouts: LayoutCache,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_valid_config(FeedConfig::default())
    }
}

impl Model {
    pub fn new(config: FeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    pub(crate) fn with_valid_config(config: FeedConfig) -> Self {
        Self {
            cursor: Cursor::new(config.page_size),
            photos: PhotoCache::new(&config),
            layouts: LayoutCache::new(config.layout_cache_capacity),
            config,
            list: ListState::new(),
            phase: LoadPhase::Idle,
            generation: Generation::default(),
            scopes: ScopeRegistry::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[RowItem] {
        self.list.rows()
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    #[must_use]
    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }

    #[must_use]
    pub const fn photos(&self) -> &PhotoCache {
        &self.photos
    }

    /// Geometry for the row at `index`, memoized per content, width and
    /// measurer fingerprint.
    pub fn layout_row(
        &mut self,
        index: usize,
        width: f64,
        measurer: &dyn TextMeasurer,
    ) -> Option<RowLayout> {
        let item = self.list.rows().get(index)?;
        let config = &self.config.layout;
        let cap = self.config.max_photos_per_row;
        let fingerprint = measurer.fingerprint();
        let key = match item {
            RowItem::Review(row) => LayoutKey::review(row.id(), row.max_lines, width, fingerprint),
            RowItem::Summary(summary) => {
                LayoutKey::summary(summary.total_reviews, width, fingerprint)
            }
        };
        Some(self.layouts.get_or_insert_with(key, || match item {
            RowItem::Review(row) => RowLayout::Review(layout_review_cell(
                &ReviewCellContent::from_row(row, cap),
                width,
                config,
                measurer,
            )),
            RowItem::Summary(summary) => RowLayout::Summary(layout_summary_cell(
                &summary_label(summary),
                width,
                config,
                measurer,
            )),
        }))
    }

    /// Forget every memoized layout. Call at the start of a layout pass when
    /// the measurer changed without changing its fingerprint.
    pub fn invalidate_layouts(&mut self) {
        self.layouts.clear();
    }
}
