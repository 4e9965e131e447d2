#![allow(dead_code)]

use std::collections::VecDeque;

use bytes::Bytes;
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use image::{ExtendedColorType, ImageEncoder};
use review_feed::capabilities::{
    FixtureReviewsApi, HttpError, ImageOperation, PageResponse, ReviewsOperation, SignalOperation,
};
use review_feed::{App, Effect, Event, Model, Navigation, Review, UpdateSignal};

pub const FIXTURE: &[u8] = include_bytes!("../fixtures/reviews.json");

pub fn png(width: u32, height: u32) -> Bytes {
    let raw = vec![200u8; (width * height * 4) as usize];
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(&raw, width, height, ExtendedColorType::Rgba8)
        .unwrap();
    Bytes::from(buffer)
}

/// Small PNG for every URL except paths under `/broken/`.
pub fn image_response(url: &str) -> Result<Bytes, HttpError> {
    if url.contains("/broken/") {
        return Err(HttpError::HttpStatus {
            status: 404,
            message: "not found".into(),
        });
    }
    Ok(png(8, 8))
}

pub fn fixture_api() -> FixtureReviewsApi {
    FixtureReviewsApi::from_json(FIXTURE).unwrap()
}

/// Stands in for the platform shell: answers every request from fixtures and
/// records what the core asked it to show.
pub struct Shell {
    pub app: AppTester<App, Effect>,
    pub model: Model,
    pub api: FixtureReviewsApi,
    pub signals: Vec<UpdateSignal>,
    pub navigations: Vec<Navigation>,
    pub image_fetches: Vec<String>,
    pages: VecDeque<Request<ReviewsOperation>>,
    images: VecDeque<Request<ImageOperation>>,
}

impl Shell {
    pub fn new(api: FixtureReviewsApi) -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
            api,
            signals: Vec::new(),
            navigations: Vec::new(),
            image_fetches: Vec::new(),
            pages: VecDeque::new(),
            images: VecDeque::new(),
        }
    }

    pub fn fixture() -> Self {
        Self::new(fixture_api())
    }

    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        Self::new(FixtureReviewsApi::new(reviews))
    }

    /// Send an event and leave capability requests queued.
    pub fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        self.absorb(update);
    }

    /// Send an event and answer every request it leads to.
    pub fn dispatch(&mut self, event: Event) {
        self.send(event);
        self.settle();
    }

    pub fn settle(&mut self) {
        loop {
            if let Some(request) = self.pages.pop_front() {
                let ReviewsOperation::FetchPage(page) = request.operation;
                let response = self.api.serve(page);
                self.resolve_page(request, response);
            } else if let Some(mut request) = self.images.pop_front() {
                let ImageOperation::Fetch(url) = &request.operation;
                let response = image_response(url.as_str());
                let update = self.app.resolve(&mut request, response).unwrap();
                self.absorb(update);
            } else {
                break;
            }
        }
    }

    pub fn resolve_page(&mut self, mut request: Request<ReviewsOperation>, response: PageResponse) {
        let update = self.app.resolve(&mut request, response).unwrap();
        self.absorb(update);
    }

    pub fn next_page_request(&mut self) -> Option<Request<ReviewsOperation>> {
        self.pages.pop_front()
    }

    pub fn pending_requests(&self) -> usize {
        self.pages.len() + self.images.len()
    }

    pub fn take_signals(&mut self) -> Vec<UpdateSignal> {
        std::mem::take(&mut self.signals)
    }

    fn absorb(&mut self, update: Update<Effect, Event>) {
        for effect in update.effects {
            match effect {
                Effect::Signals(request) => match &request.operation {
                    SignalOperation::Update(signal) => self.signals.push(signal.clone()),
                    SignalOperation::Navigate(nav) => self.navigations.push(nav.clone()),
                },
                Effect::Reviews(request) => self.pages.push_back(request),
                Effect::Images(request) => {
                    let ImageOperation::Fetch(url) = &request.operation;
                    self.image_fetches.push(url.as_str().to_string());
                    self.images.push_back(request);
                }
                Effect::Render(_) => {}
            }
        }
        for event in update.events {
            self.send(event);
        }
    }
}
