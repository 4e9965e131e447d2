use std::fmt;
use std::io::Cursor;

use image::{GenericImageView, ImageReader, Limits, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::config::FeedConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoDecodeError {
    #[error("input bytes empty")]
    EmptyInput,

    #[error("input too large: {size} bytes, max {max_size}")]
    InputTooLarge { size: usize, max_size: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("pixel buffer does not match {width}x{height}")]
    PixelBufferMismatch { width: u32, height: u32 },
}

impl From<image::ImageError> for PhotoDecodeError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(_) => Self::UnsupportedFormat,
            other => Self::Decode(other.to_string()),
        }
    }
}

/// Decoded RGBA image ready for display. Crosses to the shell as raw
/// RGBA8 rows.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawPhoto", try_from = "RawPhoto")]
pub struct Photo {
    pixels: RgbaImage,
}

#[derive(Serialize, Deserialize)]
struct RawPhoto {
    width: u32,
    height: u32,
    #[serde(with = "serde_bytes")]
    rgba: Vec<u8>,
}

impl From<Photo> for RawPhoto {
    fn from(photo: Photo) -> Self {
        Self {
            width: photo.width(),
            height: photo.height(),
            rgba: photo.pixels.into_raw(),
        }
    }
}

impl TryFrom<RawPhoto> for Photo {
    type Error = PhotoDecodeError;

    fn try_from(raw: RawPhoto) -> Result<Self, Self::Error> {
        let (width, height) = (raw.width, raw.height);
        RgbaImage::from_raw(width, height, raw.rgba)
            .map(|pixels| Self { pixels })
            .ok_or(PhotoDecodeError::PixelBufferMismatch { width, height })
    }
}

impl Photo {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

// Pixel buffers are too large to be useful in debug output.
impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct DecodeLimits {
    pub max_input_bytes: usize,
    pub max_dimension: u32,
    pub max_alloc_bytes: u64,
}

impl From<&FeedConfig> for DecodeLimits {
    fn from(config: &FeedConfig) -> Self {
        Self {
            max_input_bytes: config.max_image_bytes,
            max_dimension: config.max_image_dimension,
            max_alloc_bytes: config.max_image_alloc,
        }
    }
}

/// Decode untrusted image bytes within `limits`.
#[instrument(skip_all, fields(input_size = raw.len()))]
pub fn decode_photo(limits: &DecodeLimits, raw: &[u8]) -> Result<Photo, PhotoDecodeError> {
    if raw.is_empty() {
        return Err(PhotoDecodeError::EmptyInput);
    }
    if raw.len() > limits.max_input_bytes {
        return Err(PhotoDecodeError::InputTooLarge {
            size: raw.len(),
            max_size: limits.max_input_bytes,
        });
    }

    let mut reader = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| PhotoDecodeError::Decode(e.to_string()))?;
    if reader.format().is_none() {
        return Err(PhotoDecodeError::UnsupportedFormat);
    }

    let mut decode_limits = Limits::default();
    decode_limits.max_image_width = Some(limits.max_dimension);
    decode_limits.max_image_height = Some(limits.max_dimension);
    decode_limits.max_alloc = Some(limits.max_alloc_bytes);
    reader.limits(decode_limits);

    let image = reader.decode().map_err(|e| {
        warn!(error = %e, "photo decode failed");
        PhotoDecodeError::from(e)
    })?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PhotoDecodeError::Decode("zero-sized image".into()));
    }

    Ok(Photo {
        pixels: image.to_rgba8(),
    })
}
