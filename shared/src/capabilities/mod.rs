mod http;
mod images;
mod reviews;
mod signals;

pub use self::http::{HttpError, PageRequest, ValidatedUrl, MAX_URL_LENGTH};
pub use self::images::{ImageOperation, ImageResponse, Images};
pub use self::reviews::{
    decode_page, FixtureReviewsApi, PageDecodeError, PageFetchError, PageResponse, Reviews,
    ReviewsOperation,
};
pub use self::signals::{SignalOperation, Signals};

// Crux's built-in Render covers view refreshes.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub reviews: Reviews<Event>,
    pub images: Images<Event>,
    pub signals: Signals<Event>,
    pub render: Render<Event>,
}
