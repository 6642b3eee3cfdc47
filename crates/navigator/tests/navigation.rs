mod common;

use catalog::{DataLoadError, MemorySource, PointIndex};
use common::{GEOJSON, RecordingWidget, WidgetCall};
use foundation::geo::LatLng;
use foundation::time::Time;
use navigator::{Navigator, NavigatorConfig, SearchOutcome, SearchState};
use pretty_assertions::assert_eq;
use viewstate::{MapPosition, MemoryLocation, ViewStateStore};

type TestNavigator = Navigator<MemoryLocation, RecordingWidget>;

async fn loaded(href: &str) -> TestNavigator {
    let mut nav = Navigator::new(
        NavigatorConfig::default(),
        PointIndex::new(),
        MemoryLocation::new(href),
    );
    nav.attach(RecordingWidget::new());
    nav.load_dataset(&MemorySource::new("cells.geojson", GEOJSON))
        .await
        .expect("load");
    nav
}

fn widget(nav: &TestNavigator) -> &RecordingWidget {
    nav.widget().expect("attached")
}

#[tokio::test]
async fn unknown_cell_leaves_url_alone() {
    let mut nav = loaded("https://survey.example/map?id=A1").await;
    let before = nav.store().location().as_str().to_string();

    assert!(!nav.search("Z99").found());
    assert_eq!(nav.store_mut().parse().cell_id.as_deref(), Some("A1"));
    assert_eq!(nav.store().location().as_str(), before);
    assert!(matches!(nav.state(), SearchState::NotFound { query, .. } if query == "Z99"));
}

#[tokio::test]
async fn found_cell_is_written_to_url_and_flown_to() {
    let mut nav = loaded("https://survey.example/map").await;

    assert!(nav.search("A23").found());
    assert_eq!(nav.store_mut().parse().cell_id.as_deref(), Some("A23"));
    assert_eq!(
        nav.store().location().as_str(),
        "https://survey.example/map?id=A23#map_16_4071280_-7400600"
    );
    assert_eq!(
        widget(&nav).moves().last(),
        Some(&&WidgetCall::MoveTo {
            center: LatLng::new(40.7128, -74.006),
            zoom: 16,
            animated: true,
        })
    );
}

#[tokio::test]
async fn highlight_appears_after_fly_and_expires() {
    let mut nav = loaded("https://survey.example/").await;
    nav.tick(Time(100.0));
    nav.search("A1");

    nav.tick(Time(101.0));
    assert!(widget(&nav).visible_highlights().is_empty());

    nav.tick(Time(101.5));
    assert_eq!(widget(&nav).visible_highlights().len(), 1);

    nav.tick(Time(104.4));
    assert_eq!(widget(&nav).visible_highlights().len(), 1);

    nav.tick(Time(104.5));
    assert!(widget(&nav).visible_highlights().is_empty());
    assert_eq!(nav.active_highlights(), 0);
}

#[tokio::test]
async fn highlights_of_overlapping_searches_expire_independently() {
    let mut nav = loaded("https://survey.example/").await;
    nav.search("A1");
    nav.tick(Time(1.0));
    nav.search("B2");

    nav.tick(Time(2.0));
    assert_eq!(widget(&nav).visible_highlights().len(), 1);
    nav.tick(Time(2.5));
    assert_eq!(widget(&nav).visible_highlights().len(), 2);
    nav.tick(Time(4.5));
    assert_eq!(widget(&nav).visible_highlights().len(), 1);
    nav.tick(Time(5.5));
    assert!(widget(&nav).visible_highlights().is_empty());
}

#[tokio::test]
async fn cancelled_highlight_is_removed_or_never_shown() {
    let mut nav = loaded("https://survey.example/").await;

    let SearchOutcome::Found { highlight, .. } = nav.search("A1") else {
        panic!("A1 should exist");
    };
    assert!(nav.cancel_highlight(highlight));
    nav.tick(Time(10.0));
    assert!(widget(&nav).visible_highlights().is_empty());
    assert!(!nav.cancel_highlight(highlight));

    let SearchOutcome::Found { highlight, .. } = nav.search("B2") else {
        panic!("B2 should exist");
    };
    nav.tick(Time(11.5));
    assert_eq!(widget(&nav).visible_highlights().len(), 1);
    assert!(nav.cancel_highlight(highlight));
    assert!(widget(&nav).visible_highlights().is_empty());
}

#[tokio::test]
async fn url_cell_id_resolves_once_data_arrives() {
    let mut nav: TestNavigator = Navigator::new(
        NavigatorConfig::default(),
        PointIndex::new(),
        MemoryLocation::new("https://survey.example/?id=a23#map_5_1000000_2000000"),
    );
    nav.attach(RecordingWidget::new());
    assert_eq!(nav.pending_cell_id(), Some("a23"));
    assert_eq!(
        widget(&nav).moves(),
        vec![&WidgetCall::MoveTo {
            center: LatLng::new(10.0, 20.0),
            zoom: 5,
            animated: false,
        }]
    );

    let outcome = nav
        .load_dataset(&MemorySource::new("cells.geojson", GEOJSON))
        .await
        .expect("load");
    assert_eq!(outcome.summary.points, 3);
    assert!(outcome.pending.is_some_and(|o| o.found()));
    assert_eq!(nav.pending_cell_id(), None);
    assert_eq!(nav.store().current().cell_id.as_deref(), Some("A23"));
}

#[tokio::test]
async fn failed_load_surfaces_error_and_keeps_pending_id() {
    let mut nav: TestNavigator = Navigator::new(
        NavigatorConfig::default(),
        PointIndex::new(),
        MemoryLocation::new("https://survey.example/?id=A23"),
    );
    let err = nav
        .load_dataset(&MemorySource::new("cells.geojson", "{ not json"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataLoadError::Malformed { .. }));
    assert_eq!(nav.pending_cell_id(), Some("A23"));
    assert_eq!(nav.store().current().cell_id.as_deref(), Some("A23"));
}

#[tokio::test]
async fn user_viewport_changes_are_written_on_tick() {
    let mut nav = loaded("https://survey.example/?id=A1").await;
    let writes = nav.store().location().replacements();

    let w = nav.widget_mut().expect("attached");
    w.user_moves(1.0, 2.0, 7.4);
    w.user_moves(3.0, 4.0, 8.6);
    assert_eq!(nav.store().location().replacements(), writes);

    nav.tick(Time(0.1));
    assert_eq!(
        nav.store().location().as_str(),
        "https://survey.example/?id=A1#map_9_300000_400000"
    );
    assert_eq!(nav.store().location().replacements(), writes + 1);
}

#[tokio::test]
async fn viewport_across_antimeridian_round_trips_through_url() {
    let mut nav = loaded("https://survey.example/").await;
    nav.widget_mut()
        .expect("attached")
        .user_moves(10.0, 190.0, 5.0);
    nav.tick(Time(0.1));

    assert_eq!(
        nav.store().location().as_str(),
        "https://survey.example/#map_5_1000000_-17000000"
    );
    let mut reloaded = ViewStateStore::new(MemoryLocation::new(nav.store().location().as_str()));
    assert_eq!(
        reloaded.parse().position,
        Some(MapPosition::new(5, 10.0, -170.0))
    );
}

#[tokio::test]
async fn detach_takes_shown_highlights_off_the_map() {
    let mut nav = loaded("https://survey.example/").await;
    nav.search("A1");
    nav.search("B2");
    nav.tick(Time(1.5));
    assert_eq!(widget(&nav).visible_highlights().len(), 2);

    let w = nav.detach().expect("widget");
    assert!(w.visible_highlights().is_empty());
    assert_eq!(nav.active_highlights(), 0);

    nav.tick(Time(100.0));
    nav.attach(w);
    nav.tick(Time(200.0));
    assert!(widget(&nav).visible_highlights().is_empty());
}

#[tokio::test]
async fn detach_cancels_highlights_not_yet_shown() {
    let mut nav = loaded("https://survey.example/").await;
    nav.search("A1");
    let w = nav.detach().expect("widget");
    assert_eq!(nav.active_highlights(), 0);

    nav.attach(w);
    nav.tick(Time(2.0));
    assert!(widget(&nav).visible_highlights().is_empty());
}

#[tokio::test]
async fn detach_unsubscribes() {
    let mut nav = loaded("https://survey.example/").await;
    assert_eq!(widget(&nav).listeners(), 1);

    let mut w = nav.detach().expect("widget");
    assert_eq!(w.listeners(), 0);
    w.user_moves(1.0, 1.0, 3.0);
    nav.tick(Time(1.0));
    assert_eq!(nav.store().current().position, None);
}

#[tokio::test]
async fn suggestions_follow_loaded_data() {
    let nav = loaded("https://survey.example/").await;
    assert_eq!(nav.get_suggestions("a"), vec!["A1", "A23"]);
    assert_eq!(nav.get_suggestions("harb"), vec!["A23"]);
    assert!(nav.get_suggestions("").is_empty());
}
