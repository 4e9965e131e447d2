//! Feed core.
//!
//! [`App::update`] is the only place the list changes. Page and photo fetches
//! leave as capability requests and come back as [`Event::PageFetched`] and
//! [`Event::PhotoFetched`]; a page from an older generation or a photo for a
//! closed row scope is dropped here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::capabilities::{
    decode_page, Capabilities, PageFetchError, PageRequest, ValidatedUrl,
};
use crate::config::FeedConfig;
use crate::event::{Event, Navigation, PageFetched, PhotoFetched, RowId, SlotTarget, UpdateSignal};
use crate::model::{
    Cursor, ImageSlot, LoadPhase, Model, PageResult, Review, ReviewRow, RowItem, SummaryRow,
};
use crate::photo_cache::{PhotoLookup, PhotoWaiter};
use crate::AppError;

#[derive(Default)]
pub struct App;

/// Everything the shell needs to draw the list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub rows: Vec<RowItem>,
    pub phase: LoadPhase,
    pub more_available: bool,
}

/// True when the remaining scrollable distance is within the trigger
/// distance.
#[must_use]
pub fn notify_near_bottom(distance_remaining: f64, trigger_distance: f64) -> bool {
    distance_remaining <= trigger_distance
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let _span = info_span!(
            "update",
            event = event.name(),
            generation = model.generation.0
        )
        .entered();

        let changed = match event {
            Event::Configure(config) => Self::configure(*config, model, caps),

            Event::RequestNextPage => Self::request_next_page(model, caps),

            Event::Refresh => {
                Self::refresh(model, caps);
                true
            }

            Event::NearBottom(metrics) => {
                let trigger = metrics.trigger_distance(model.config.screens_to_load_next_page);
                notify_near_bottom(metrics.remaining_distance(), trigger)
                    && Self::request_next_page(model, caps)
            }

            Event::ShowMoreTapped { row } => Self::expand(model, row, caps),

            Event::PhotoTapped { index, photos } => {
                caps.signals.navigate(Navigation::PhotoGallery {
                    start_index: index,
                    photos,
                });
                false
            }

            Event::PageFetched(fetched) => Self::on_page_fetched(model, *fetched, caps),

            Event::PhotoFetched(fetched) => Self::on_photo_fetched(model, *fetched, caps),
        };

        if changed {
            caps.render.render();
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            rows: model.rows().to_vec(),
            phase: model.phase(),
            more_available: model.cursor().more_available,
        }
    }
}

impl App {
    /// Swap in a new configuration. The list starts over; responses still in
    /// flight belong to the old generation and are dropped.
    fn configure(config: FeedConfig, model: &mut Model, caps: &Capabilities) -> bool {
        if let Err(e) = config.validate() {
            let err = AppError::from(e);
            warn!(error = %err, "rejected feed configuration");
            caps.signals
                .update(UpdateSignal::ShowError(err.user_facing_message()));
            return false;
        }

        let generation = model.generation.next();
        *model = Model::with_valid_config(config);
        model.generation = generation;
        info!(generation = generation.0, "feed reconfigured");
        caps.signals.update(UpdateSignal::FullReload);
        true
    }

    // --- Pagination ---

    fn request_next_page(model: &mut Model, caps: &Capabilities) -> bool {
        if !model.cursor.can_request() {
            debug!(
                in_flight = model.cursor.in_flight,
                more_available = model.cursor.more_available,
                "page request ignored"
            );
            return false;
        }

        model.cursor.in_flight = true;
        model.phase = LoadPhase::FetchingPage;
        if model.cursor.is_first_page() {
            caps.signals.update(UpdateSignal::LoadingStarted);
        }

        let request = PageRequest::new(model.cursor.offset, model.cursor.page_size);
        info!(offset = request.offset, limit = request.limit, "requesting review page");

        let generation = model.generation;
        caps.reviews.fetch_page(request, move |response| {
            Event::PageFetched(Box::new(PageFetched {
                generation,
                offset: request.offset,
                response,
            }))
        });
        true
    }

    fn on_page_fetched(model: &mut Model, fetched: PageFetched, caps: &Capabilities) -> bool {
        if fetched.generation != model.generation {
            debug!(
                stale = fetched.generation.0,
                current = model.generation.0,
                "dropping page result from previous generation"
            );
            return false;
        }

        model.cursor.in_flight = false;
        let page = fetched
            .response
            .map_err(PageFetchError::from)
            .and_then(|body| decode_page(&body).map_err(PageFetchError::from));

        match page {
            Ok(page) => Self::apply_page(model, page, caps),
            Err(e) => {
                let err = AppError::from(e).with_context("offset", fetched.offset.to_string());
                warn!(error = %err, "review page fetch failed");
                model.phase = LoadPhase::Error;
                caps.signals
                    .update(UpdateSignal::ShowError(err.user_facing_message()));
                caps.signals.update(UpdateSignal::LoadingFinished);
            }
        }
        true
    }

    fn apply_page(model: &mut Model, page: PageResult, caps: &Capabilities) {
        let first_page = model.cursor.is_first_page();
        let received = page.items.len();

        let mut rows = Vec::with_capacity(received);
        let mut fetches = Vec::new();
        for review in &page.items {
            let (row, urls) = Self::build_row(model, review);
            fetches.extend(urls);
            rows.push(row);
        }

        let mut indexes = model.list.append_reviews(rows);
        model.cursor.advance(model.list.review_count(), page.count);
        if received == 0 && model.cursor.more_available {
            warn!(
                offset = model.cursor.offset,
                total = page.count,
                "empty page while more were reported; ending pagination"
            );
            model.cursor.more_available = false;
        }
        if !model.cursor.more_available {
            indexes.push(model.list.set_summary(SummaryRow {
                total_reviews: page.count,
            }));
        }

        info!(
            received,
            rows = model.list.len(),
            more_available = model.cursor.more_available,
            photo_fetches = fetches.len(),
            "review page applied"
        );

        model.phase = LoadPhase::Idle;
        if first_page {
            caps.signals.update(UpdateSignal::FullReload);
        } else {
            caps.signals.update(UpdateSignal::InsertRows(indexes));
        }
        caps.signals.update(UpdateSignal::LoadingFinished);

        for url in fetches {
            caps.images.fetch(url.clone(), move |response| {
                Event::PhotoFetched(Box::new(PhotoFetched { url, response }))
            });
        }
    }

    /// Build a row and register its image slots with the photo cache. Cached
    /// images and malformed URLs settle immediately; the returned URLs still
    /// need a fetch.
    fn build_row(model: &mut Model, review: &Review) -> (ReviewRow, Vec<ValidatedUrl>) {
        let cap = model.config.max_photos_per_row;
        let mut row = ReviewRow::from_review(review, model.config.initial_max_lines, cap);

        let targets = review
            .avatar_url
            .iter()
            .map(|url| (SlotTarget::Avatar, url))
            .chain(
                review
                    .photo_urls()
                    .iter()
                    .take(cap)
                    .enumerate()
                    .map(|(i, url)| (SlotTarget::Photo(i), url)),
            );

        let mut scope = None;
        let mut fetches = Vec::new();
        for (target, url) in targets {
            let token = *scope.get_or_insert_with(|| model.scopes.open(row.id()));
            let waiter = PhotoWaiter {
                row: row.id(),
                token,
                target,
            };
            match model.photos.request(url, waiter) {
                PhotoLookup::Cached(photo) => {
                    row.set_slot(target, ImageSlot::Loaded(photo));
                }
                PhotoLookup::Rejected(e) => {
                    debug!(row = %row.id(), error = %e, "image slot has no usable URL");
                    row.set_slot(target, ImageSlot::Error);
                }
                PhotoLookup::Joined => {}
                PhotoLookup::Fetch(url) => fetches.push(url),
            }
        }
        (row, fetches)
    }

    fn refresh(model: &mut Model, caps: &Capabilities) {
        model.generation = model.generation.next();
        info!(generation = model.generation.0, "refreshing feed");

        model.list.clear();
        model.cursor = Cursor::new(model.config.page_size);
        model.phase = LoadPhase::Idle;
        model.scopes.cancel_all();
        model.invalidate_layouts();

        caps.signals.update(UpdateSignal::FullReload);
        Self::request_next_page(model, caps);
    }

    // --- Photos ---

    fn on_photo_fetched(model: &mut Model, fetched: PhotoFetched, caps: &Capabilities) -> bool {
        let (result, waiters) = model.photos.complete(&fetched.url, fetched.response);

        let mut changed = false;
        for waiter in waiters {
            if !model.scopes.is_current(waiter.row, waiter.token) {
                debug!(row = %waiter.row, "dropping photo result for closed scope");
                continue;
            }
            let slot = match &result {
                Ok(photo) => ImageSlot::Loaded(Arc::clone(photo)),
                Err(_) => ImageSlot::Error,
            };
            let Some((index, row)) = model.list.review_mut(waiter.row) else {
                continue;
            };
            if row.set_slot(waiter.target, slot) {
                caps.signals.update(UpdateSignal::ReloadRows(vec![index]));
                changed = true;
            }
        }
        changed
    }

    // --- Interaction ---

    fn expand(model: &mut Model, row: RowId, caps: &Capabilities) -> bool {
        let Some((index, review)) = model.list.review_mut(row) else {
            debug!(%row, "expand for row no longer in list");
            return false;
        };
        review.expand();
        model.layouts.invalidate_row(row);
        caps.signals.update(UpdateSignal::ReloadRows(vec![index]));
        true
    }
}
