use bytes::Bytes;
use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::http::{HttpError, PageRequest};
use crate::model::{PageResult, Review};
use crate::{MAX_RATING, MIN_RATING};

/// Page fetches performed by the shell. The body comes back undecoded.
pub struct Reviews<E> {
    context: CapabilityContext<ReviewsOperation, E>,
}

impl<Ev> Capability<Ev> for Reviews<Ev> {
    type Operation = ReviewsOperation;
    type MappedSelf<MappedEv> = Reviews<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Reviews::new(self.context.map_event(f))
    }
}

impl<E> Reviews<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<ReviewsOperation, E>) -> Self {
        Self { context }
    }

    pub fn fetch_page<F>(&self, request: PageRequest, make_event: F)
    where
        F: FnOnce(PageResponse) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context
                .request_from_shell(ReviewsOperation::FetchPage(request))
                .await;
            context.update_app(make_event(response));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewsOperation {
    FetchPage(PageRequest),
}

impl Operation for ReviewsOperation {
    type Output = PageResponse;
}

/// Raw `{"items": [...], "count": N}` body, or the transport failure.
pub type PageResponse = Result<Bytes, HttpError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageDecodeError {
    #[error("malformed page payload: {0}")]
    Malformed(String),
    #[error("review {index} has rating {rating}, expected 1..=5")]
    RatingOutOfRange { index: usize, rating: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageFetchError {
    #[error("page transport failed: {0}")]
    Transport(#[from] HttpError),
    #[error("page decode failed: {0}")]
    Decode(#[from] PageDecodeError),
}

impl From<PageFetchError> for crate::AppError {
    fn from(e: PageFetchError) -> Self {
        match e {
            PageFetchError::Transport(http) => crate::AppError::from(http),
            PageFetchError::Decode(decode) => {
                crate::AppError::new(crate::ErrorKind::Deserialization, decode.to_string())
            }
        }
    }
}

/// Decode a raw page payload (`{"items": [...], "count": N}`).
pub fn decode_page(raw: &[u8]) -> Result<PageResult, PageDecodeError> {
    let page: PageResult =
        serde_json::from_slice(raw).map_err(|e| PageDecodeError::Malformed(e.to_string()))?;

    if let Some((index, review)) = page
        .items
        .iter()
        .enumerate()
        .find(|(_, r)| !(MIN_RATING..=MAX_RATING).contains(&r.rating))
    {
        return Err(PageDecodeError::RatingOutOfRange {
            index,
            rating: review.rating,
        });
    }

    Ok(page)
}

/// Shell-side page source that slices an in-memory review list, the way a
/// bundled JSON resource would be served.
#[derive(Debug, Clone)]
pub struct FixtureReviewsApi {
    reviews: Vec<Review>,
}

impl FixtureReviewsApi {
    #[must_use]
    pub fn new(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }

    /// Load from a full `{"items": [...], "count": N}` document.
    pub fn from_json(raw: &[u8]) -> Result<Self, PageDecodeError> {
        let page = decode_page(raw)?;
        Ok(Self::new(page.items))
    }

    /// Answer a [`ReviewsOperation::FetchPage`] request.
    pub fn serve(&self, request: PageRequest) -> PageResponse {
        let page = self.slice(request);
        debug!(
            offset = request.offset,
            returned = page.items.len(),
            "serving fixture page"
        );
        serde_json::to_vec(&page)
            .map(Bytes::from)
            .map_err(|e| HttpError::InvalidResponse {
                reason: e.to_string(),
            })
    }

    fn slice(&self, request: PageRequest) -> PageResult {
        let start = request.offset.min(self.reviews.len());
        let end = request
            .offset
            .saturating_add(request.limit)
            .min(self.reviews.len());
        PageResult {
            items: self.reviews[start..end].to_vec(),
            count: self.reviews.len(),
        }
    }
}
