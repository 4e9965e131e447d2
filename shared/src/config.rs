use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LayoutConfig;
use crate::{
    DEFAULT_MAX_LINES, DEFAULT_PAGE_SIZE, DEFAULT_PHOTO_CACHE_CAPACITY, MAX_IMAGE_ALLOC,
    MAX_IMAGE_BYTES, MAX_IMAGE_DIMENSION, MAX_PHOTOS_PER_ROW, SCREENS_TO_LOAD_NEXT_PAGE,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("page size must be positive")]
    ZeroPageSize,
    #[error("initial max lines must be positive")]
    ZeroMaxLines,
    #[error("photo cap must be positive")]
    ZeroPhotoCap,
    #[error("screens to load next page must be finite and positive, got {0}")]
    InvalidLoadThreshold(f64),
    #[error("photo cache capacity must be positive")]
    ZeroCacheCapacity,
    #[error("invalid layout value for {field}: {value}")]
    InvalidLayoutValue { field: &'static str, value: f64 },
}

/// Tunables for pagination and photo loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: usize,
    pub initial_max_lines: u32,
    /// Shared by the loader (how many URLs are requested) and the layout
    /// (how many photo frames are produced).
    pub max_photos_per_row: usize,
    pub screens_to_load_next_page: f64,
    pub photo_cache_capacity: usize,
    pub max_image_bytes: usize,
    pub max_image_dimension: u32,
    pub max_image_alloc: u64,
    pub layout_cache_capacity: usize,
    pub layout: LayoutConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            initial_max_lines: DEFAULT_MAX_LINES,
            max_photos_per_row: MAX_PHOTOS_PER_ROW,
            screens_to_load_next_page: SCREENS_TO_LOAD_NEXT_PAGE,
            photo_cache_capacity: DEFAULT_PHOTO_CACHE_CAPACITY,
            max_image_bytes: MAX_IMAGE_BYTES,
            max_image_dimension: MAX_IMAGE_DIMENSION,
            max_image_alloc: MAX_IMAGE_ALLOC,
            layout_cache_capacity: 512,
            layout: LayoutConfig::default(),
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.initial_max_lines == 0 {
            return Err(ConfigError::ZeroMaxLines);
        }
        if self.max_photos_per_row == 0 {
            return Err(ConfigError::ZeroPhotoCap);
        }
        if !self.screens_to_load_next_page.is_finite() || self.screens_to_load_next_page <= 0.0 {
            return Err(ConfigError::InvalidLoadThreshold(
                self.screens_to_load_next_page,
            ));
        }
        if self.photo_cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        self.layout.validate()
    }

    /// Parse from JSON, filling absent fields with defaults.
    pub fn from_json(raw: &str) -> crate::AppResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| {
            crate::AppError::new(crate::ErrorKind::Validation, format!("invalid config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl From<ConfigError> for crate::AppError {
    fn from(e: ConfigError) -> Self {
        crate::AppError::new(crate::ErrorKind::Validation, e.to_string())
    }
}
