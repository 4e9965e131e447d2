use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::capabilities::{ImageResponse, PageResponse, ValidatedUrl};
use crate::config::FeedConfig;
use crate::model::ImageSlot;
use crate::scope::Generation;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh random identity; never reused.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

typed_id!(RowId);

// --- Scroll geometry reported by the view ---

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub viewport_extent: f64,
    pub content_extent: f64,
    /// Where the scroll will come to rest.
    pub target_offset: f64,
}

impl ScrollMetrics {
    #[must_use]
    pub fn remaining_distance(&self) -> f64 {
        self.content_extent - self.viewport_extent - self.target_offset
    }

    #[must_use]
    pub fn trigger_distance(&self, screens: f64) -> f64 {
        self.viewport_extent * screens
    }
}

// --- Which image slot of a row a fetch belongs to ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotTarget {
    Avatar,
    Photo(usize),
}

#[derive(Debug)]
pub struct PageFetched {
    pub generation: Generation,
    pub offset: usize,
    pub response: PageResponse,
}

#[derive(Debug)]
pub struct PhotoFetched {
    pub url: ValidatedUrl,
    pub response: ImageResponse,
}

/// Everything the feed reacts to: view commands plus capability responses.
#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    Configure(Box<FeedConfig>),
    RequestNextPage,
    Refresh,
    NearBottom(ScrollMetrics),
    ShowMoreTapped {
        row: RowId,
    },
    PhotoTapped {
        index: usize,
        photos: Vec<ImageSlot>,
    },

    // Capability responses (boxed to keep the enum small)
    #[serde(skip)]
    PageFetched(Box<PageFetched>),
    #[serde(skip)]
    PhotoFetched(Box<PhotoFetched>),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::RequestNextPage => "request_next_page",
            Self::Refresh => "refresh",
            Self::NearBottom(_) => "near_bottom",
            Self::ShowMoreTapped { .. } => "show_more_tapped",
            Self::PhotoTapped { .. } => "photo_tapped",
            Self::PageFetched(_) => "page_fetched",
            Self::PhotoFetched(_) => "photo_fetched",
        }
    }
}

/// Update instructions for the rendering collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateSignal {
    FullReload,
    InsertRows(Vec<usize>),
    ReloadRows(Vec<usize>),
    LoadingStarted,
    LoadingFinished,
    ShowError(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Navigation {
    PhotoGallery {
        start_index: usize,
        photos: Vec<ImageSlot>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_ids_are_unique() {
        let a = RowId::generate();
        let b = RowId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn remaining_distance_accounts_for_viewport() {
        let metrics = ScrollMetrics {
            viewport_extent: 800.0,
            content_extent: 5000.0,
            target_offset: 1200.0,
        };
        assert!((metrics.remaining_distance() - 3000.0).abs() < f64::EPSILON);
        assert!((metrics.trigger_distance(2.5) - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn view_events_decode_from_shell_json() {
        let event: Event = serde_json::from_str(r#""Refresh""#).unwrap();
        assert_eq!(event.name(), "refresh");

        let raw = serde_json::json!({
            "NearBottom": {
                "viewport_extent": 800.0,
                "content_extent": 4000.0,
                "target_offset": 2000.0
            }
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.name(), "near_bottom");
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 64,
            "Event enum is {} bytes, too large, box more variants",
            size
        );
    }
}
