use bytes::Bytes;
use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use super::http::{HttpError, ValidatedUrl};

/// Image downloads performed by the shell. Decoding and caching stay in the
/// core, so the shell only moves bytes.
pub struct Images<E> {
    context: CapabilityContext<ImageOperation, E>,
}

impl<Ev> Capability<Ev> for Images<Ev> {
    type Operation = ImageOperation;
    type MappedSelf<MappedEv> = Images<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Images::new(self.context.map_event(f))
    }
}

impl<E> Images<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<ImageOperation, E>) -> Self {
        Self { context }
    }

    pub fn fetch<F>(&self, url: ValidatedUrl, make_event: F)
    where
        F: FnOnce(ImageResponse) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context
                .request_from_shell(ImageOperation::Fetch(url))
                .await;
            context.update_app(make_event(response));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageOperation {
    Fetch(ValidatedUrl),
}

impl Operation for ImageOperation {
    type Output = ImageResponse;
}

/// Encoded image bytes (PNG, JPEG or WebP), or the transport failure.
pub type ImageResponse = Result<Bytes, HttpError>;
