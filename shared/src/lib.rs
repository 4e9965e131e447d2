// lib.rs - headless core for the paginated review feed

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_precision_loss)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod image_processing;
pub mod layout;
pub mod model;
pub mod photo_cache;
pub mod scope;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::{App, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, FeedConfig};
pub use event::{Event, Navigation, RowId, ScrollMetrics, UpdateSignal};
pub use layout::{LayoutConfig, RowLayout, TextMeasurer};
pub use model::{
    ImageSlot, LoadPhase, MaxLines, Model, PageResult, Review, ReviewRow, RowItem, SummaryRow,
};
pub use photo_cache::{ImageLoadError, PhotoCache};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_MAX_LINES: u32 = 3;
/// Upper bound on photos fetched and rendered per review row.
pub const MAX_PHOTOS_PER_ROW: usize = 5;
pub const SCREENS_TO_LOAD_NEXT_PAGE: f64 = 2.5;
pub const DEFAULT_PHOTO_CACHE_CAPACITY: usize = 256;
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 4096;
pub const MAX_IMAGE_ALLOC: u64 = 100 * 1024 * 1024;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Deserialization,
    ImageProcessing,
    Validation,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::ImageProcessing => "IMAGE_PROCESSING_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Crate-level error as surfaced to the rendering collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to load reviews. Please check your internet connection and try again."
                    .into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Deserialization => {
                "Reviews could not be read. Please try again later.".into()
            }
            ErrorKind::ImageProcessing => "Unable to display the image.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Internal => {
                "An unexpected error occurred. Please try again or contact support.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_ask_to_check_connection() {
        let err = AppError::new(ErrorKind::Network, "down");
        assert!(err.user_facing_message().contains("internet connection"));
        assert_eq!(err.code(), "NETWORK_ERROR");
    }

    #[test]
    fn display_includes_code() {
        let err = AppError::new(ErrorKind::Internal, "boom");
        assert_eq!(err.to_string(), "[INTERNAL_ERROR] boom");
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = AppError::new(ErrorKind::Validation, "page size must be positive");
        assert_eq!(err.user_facing_message(), "page size must be positive");
    }

    #[test]
    fn context_is_recorded() {
        let err = AppError::new(ErrorKind::Network, "x").with_context("offset", "20");
        assert_eq!(err.context.get("offset").map(String::as_str), Some("20"));
    }
}
