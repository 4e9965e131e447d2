//! Photo cache with in-flight request sharing.
//!
//! At most one shell fetch is outstanding per normalized URL. Slots asking
//! for a URL while it is outstanding wait on that fetch. Decoded successes
//! are kept in an LRU; failures are not cached, so a later request fetches
//! again.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use thiserror::Error;
use tracing::{debug, warn};

use crate::capabilities::{HttpError, ImageResponse, ValidatedUrl};
use crate::config::FeedConfig;
use crate::event::{RowId, SlotTarget};
use crate::image_processing::{decode_photo, DecodeLimits, Photo, PhotoDecodeError};
use crate::scope::ScopeToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageLoadError {
    #[error("malformed image URL: {0}")]
    MalformedUrl(HttpError),
    #[error("image decode failed: {0}")]
    Decode(#[from] PhotoDecodeError),
    #[error("image transport failed: {0}")]
    Transport(HttpError),
}

impl From<ImageLoadError> for crate::AppError {
    fn from(e: ImageLoadError) -> Self {
        let kind = match &e {
            ImageLoadError::MalformedUrl(_) => crate::ErrorKind::Validation,
            ImageLoadError::Decode(_) => crate::ErrorKind::ImageProcessing,
            ImageLoadError::Transport(_) => crate::ErrorKind::Network,
        };
        crate::AppError::new(kind, e.to_string())
    }
}

/// The row slot a fetched image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhotoWaiter {
    pub row: RowId,
    pub token: ScopeToken,
    pub target: SlotTarget,
}

#[derive(Debug)]
pub enum PhotoLookup {
    Cached(Arc<Photo>),
    /// First request for the URL; the caller issues the fetch.
    Fetch(ValidatedUrl),
    /// Waiting on a fetch already in flight.
    Joined,
    Rejected(ImageLoadError),
}

pub struct PhotoCache {
    images: LruCache<String, Arc<Photo>>,
    in_flight: HashMap<String, Vec<PhotoWaiter>>,
    limits: DecodeLimits,
    network_requests: u64,
}

impl PhotoCache {
    #[must_use]
    pub fn new(config: &FeedConfig) -> Self {
        let capacity = NonZeroUsize::new(config.photo_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            images: LruCache::new(capacity),
            in_flight: HashMap::new(),
            limits: DecodeLimits::from(config),
            network_requests: 0,
        }
    }

    pub fn request(&mut self, url: &str, waiter: PhotoWaiter) -> PhotoLookup {
        let url = match ValidatedUrl::new(url) {
            Ok(url) => url,
            Err(e) => return PhotoLookup::Rejected(ImageLoadError::MalformedUrl(e)),
        };

        if let Some(hit) = self.images.get(url.as_str()) {
            debug!(url = url.as_str(), "photo cache hit");
            return PhotoLookup::Cached(Arc::clone(hit));
        }
        if let Some(waiters) = self.in_flight.get_mut(url.as_str()) {
            debug!(url = url.as_str(), "joining in-flight photo request");
            waiters.push(waiter);
            return PhotoLookup::Joined;
        }

        self.in_flight.insert(url.as_str().to_string(), vec![waiter]);
        self.network_requests += 1;
        PhotoLookup::Fetch(url)
    }

    /// Settle the fetch for `url`: decode once, cache on success, and hand
    /// back every slot that was waiting on it.
    pub fn complete(
        &mut self,
        url: &ValidatedUrl,
        response: ImageResponse,
    ) -> (Result<Arc<Photo>, ImageLoadError>, Vec<PhotoWaiter>) {
        let waiters = self.in_flight.remove(url.as_str()).unwrap_or_default();
        let result = response
            .map_err(ImageLoadError::Transport)
            .and_then(|raw| {
                decode_photo(&self.limits, &raw)
                    .map(Arc::new)
                    .map_err(ImageLoadError::from)
            });

        match &result {
            Ok(photo) => {
                self.images.put(url.as_str().to_string(), Arc::clone(photo));
            }
            Err(e) => warn!(host = url.host(), error = %e, "photo load failed"),
        }
        (result, waiters)
    }

    /// Fetches issued so far; cache hits and joins excluded.
    #[must_use]
    pub const fn network_requests(&self) -> u64 {
        self.network_requests
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Default for PhotoCache {
    fn default() -> Self {
        Self::new(&FeedConfig::default())
    }
}
