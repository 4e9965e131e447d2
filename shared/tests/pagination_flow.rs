mod common;

use std::collections::HashSet;

use assert_matches::assert_matches;
use bytes::Bytes;
use crux_core::testing::AppTester;
use review_feed::capabilities::{PageRequest, ReviewsOperation};
use review_feed::layout::MonospaceMeasurer;
use review_feed::{
    App, Effect, Event, LoadPhase, Model, RowItem, RowLayout, ScrollMetrics, SummaryRow,
    UpdateSignal,
};

use common::Shell;

fn scrolled_near_bottom() -> Event {
    Event::NearBottom(ScrollMetrics {
        viewport_extent: 800.0,
        content_extent: 4_000.0,
        target_offset: 2_000.0,
    })
}

#[test]
fn first_page_is_requested_from_the_shell() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    let update = app.update(Event::RequestNextPage, &mut model);
    assert_eq!(model.phase(), LoadPhase::FetchingPage);

    let effects: Vec<Effect> = update.effects;
    let request = effects
        .iter()
        .find_map(|e| {
            if let Effect::Reviews(req) = e {
                Some(req)
            } else {
                None
            }
        })
        .expect("Should ask the shell for the first page");
    assert_eq!(
        request.operation,
        ReviewsOperation::FetchPage(PageRequest::new(0, 20))
    );

    // A second tap while the page is out does nothing.
    let update = app.update(Event::RequestNextPage, &mut model);
    assert!(update.effects.is_empty());
}

#[test]
fn scrolling_loads_every_page_then_summary() {
    let mut shell = Shell::fixture();

    // 1. Initial load
    shell.dispatch(Event::RequestNextPage);
    let first = shell.take_signals();
    assert_eq!(
        first[..3],
        [
            UpdateSignal::LoadingStarted,
            UpdateSignal::FullReload,
            UpdateSignal::LoadingFinished,
        ]
    );
    assert!(first[3..]
        .iter()
        .all(|s| matches!(s, UpdateSignal::ReloadRows(rows) if rows.len() == 1 && rows[0] < 20)));

    // 2. Scroll-driven pages
    shell.dispatch(scrolled_near_bottom());
    let second = shell.take_signals();
    assert_eq!(second[0], UpdateSignal::InsertRows((20..40).collect()));
    assert_eq!(second[1], UpdateSignal::LoadingFinished);

    shell.dispatch(scrolled_near_bottom());
    let third = shell.take_signals();
    assert_eq!(third[0], UpdateSignal::InsertRows((40..46).collect()));

    // 3. Terminal state
    let view = shell.app.view(&shell.model);
    assert_eq!(view.rows.len(), 46);
    assert_eq!(
        view.rows.last(),
        Some(&RowItem::Summary(SummaryRow { total_reviews: 45 }))
    );
    assert_eq!(view.phase, LoadPhase::Idle);
    assert!(!view.more_available);

    shell.send(scrolled_near_bottom());
    assert_eq!(shell.pending_requests(), 0);

    let ids: HashSet<_> = view
        .rows
        .iter()
        .filter_map(RowItem::as_review)
        .map(|row| row.id())
        .collect();
    assert_eq!(ids.len(), 45);
}

#[test]
fn refresh_replaces_rows_with_fresh_identities() {
    let mut shell = Shell::fixture();
    shell.dispatch(Event::RequestNextPage);
    let before: Vec<_> = shell
        .model
        .rows()
        .iter()
        .filter_map(RowItem::as_review)
        .map(|row| row.id())
        .collect();
    shell.take_signals();

    shell.send(Event::Refresh);
    assert!(shell.model.rows().is_empty());
    shell.settle();

    let after = shell.take_signals();
    assert_eq!(after[0], UpdateSignal::FullReload);
    assert_eq!(after[1], UpdateSignal::LoadingStarted);
    assert_eq!(after[2], UpdateSignal::FullReload);
    assert_eq!(after[3], UpdateSignal::LoadingFinished);

    assert_eq!(shell.model.rows().len(), 20);
    assert!(shell
        .model
        .rows()
        .iter()
        .filter_map(RowItem::as_review)
        .all(|row| !before.contains(&row.id())));
}

#[test]
fn undecodable_page_surfaces_one_error() {
    let mut shell = Shell::fixture();

    shell.send(Event::RequestNextPage);
    let request = shell.next_page_request().expect("page request");
    shell.resolve_page(request, Ok(Bytes::from_static(b"<html>maintenance</html>")));

    assert_eq!(
        shell.take_signals(),
        vec![
            UpdateSignal::LoadingStarted,
            UpdateSignal::ShowError("Reviews could not be read. Please try again later.".into()),
            UpdateSignal::LoadingFinished,
        ]
    );
    assert_eq!(shell.model.phase(), LoadPhase::Error);
    assert!(shell.model.rows().is_empty());
}

#[test]
fn view_model_crosses_the_boundary_as_json() {
    let mut shell = Shell::fixture();
    shell.dispatch(Event::RequestNextPage);

    let view = shell.app.view(&shell.model);
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(20));
    assert_eq!(json["more_available"], true);
    assert_matches!(json["phase"].as_str(), Some("Idle"));
}

#[test]
fn every_row_lays_out_within_width() {
    let mut shell = Shell::fixture();
    shell.dispatch(Event::RequestNextPage);

    let measurer = MonospaceMeasurer::default();
    let width = 375.0;
    for index in 0..shell.model.rows().len() {
        let Some(RowLayout::Review(layout)) = shell.model.layout_row(index, width, &measurer)
        else {
            panic!("row {index} should be a review");
        };
        assert!(layout.height > 0.0);
        assert!(layout.name.max_x() <= width + 1e-9);
        assert!(layout.text.max_x() <= width + 1e-9);
        assert!(layout.photos.len() <= 5);
        // Photo frames do not wrap, so they may run past the right edge.
        for frame in &layout.photos {
            assert!((frame.y - layout.photos[0].y).abs() < f64::EPSILON);
        }
    }
}
