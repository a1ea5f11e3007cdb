//! Behaviour coverage for the dashboard session and the fetch pipeline.

use std::collections::HashMap;

use rstest::{fixture, rstest};

use crate::domain::catalog::test_support::element;
use crate::domain::ports::MockPointQuerySource;

use super::*;

#[derive(Default)]
struct MapStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

fn stop(title: &str, mode: TransportMode, latitude: f64, distance_meters: f64) -> TransportStop {
    let coordinate = Coordinate::new(latitude, -73.0);
    TransportStop {
        identity: ItemIdentity::derive(mode.key(), coordinate),
        mode,
        title: title.to_owned(),
        coordinate,
        distance_meters,
        detail: format_distance(distance_meters),
        provider: "Public".to_owned(),
    }
}

fn place(name: &str, category: PlaceCategory, latitude: f64, distance_meters: f64) -> PlaceItem {
    let coordinate = Coordinate::new(latitude, -73.0);
    PlaceItem {
        identity: ItemIdentity::derive(category.key(), coordinate),
        category,
        name: name.to_owned(),
        coordinate,
        distance_meters,
    }
}

fn groups_with(category: PlaceCategory, items: Vec<PlaceItem>) -> Vec<PlaceGroup> {
    PlaceCategory::ALL
        .into_iter()
        .map(|c| PlaceGroup {
            category: c,
            items: if c == category {
                items.clone()
            } else {
                Vec::new()
            },
        })
        .collect()
}

fn refresh_with(
    generation: Generation,
    transport: Vec<TransportStop>,
    places: Vec<PlaceGroup>,
) -> CatalogRefresh {
    CatalogRefresh {
        generation,
        transport: Ok(transport),
        places: Ok(places),
    }
}

#[fixture]
fn session() -> DashboardSession<MapStore> {
    DashboardSession::new(FavoritesStore::load(MapStore::default()))
}

fn seeded_session(stop_count: usize) -> DashboardSession<MapStore> {
    let mut session = session();
    let fix = session.begin_refresh(Coordinate::new(40.0, -73.0));
    let stops = (0..stop_count)
        .map(|i| {
            let offset = f64::from(u32::try_from(i).expect("small count")) * 0.001;
            stop("Stop", TransportMode::Bus, 40.001 + offset, 100.0 + offset * 100_000.0)
        })
        .collect();
    session.apply_refresh(refresh_with(fix.generation, stops, Vec::new()));
    session
}

#[rstest]
fn superseded_refresh_is_discarded(mut session: DashboardSession<MapStore>) {
    let stale = session.begin_refresh(Coordinate::new(40.0, -73.0));
    let fresh = session.begin_refresh(Coordinate::new(41.0, -73.0));

    let outcome = session.apply_refresh(refresh_with(
        stale.generation,
        vec![stop("Stale", TransportMode::Bus, 40.001, 111.0)],
        Vec::new(),
    ));
    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert!(session.transport_page().items.is_empty());
    assert_eq!(session.transport_status(), PanelStatus::Pending);

    let outcome = session.apply_refresh(refresh_with(
        fresh.generation,
        vec![stop("Fresh", TransportMode::Bus, 41.001, 111.0)],
        Vec::new(),
    ));
    assert_eq!(outcome, RefreshOutcome::Applied);
    assert_eq!(session.transport_page().items[0].title, "Fresh");
    assert!(session.last_updated().is_some());
}

#[rstest]
fn partial_failure_still_renders_the_other_panel(mut session: DashboardSession<MapStore>) {
    let fix = session.begin_refresh(Coordinate::new(40.0, -73.0));

    let outcome = session.apply_refresh(CatalogRefresh {
        generation: fix.generation,
        transport: Err(PointQueryError::transport("socket closed")),
        places: Ok(groups_with(
            PlaceCategory::Food,
            vec![place("Brew", PlaceCategory::Food, 40.001, 111.0)],
        )),
    });

    assert_eq!(outcome, RefreshOutcome::Applied);
    assert_eq!(session.transport_status(), PanelStatus::Unavailable);
    assert!(session.transport_page().items.is_empty());
    assert_eq!(session.places_status(), PanelStatus::Ready);
    assert_eq!(session.place_pages()[0].items.len(), 1);
}

#[rstest]
fn new_origin_resets_windows_but_not_items(mut session: DashboardSession<MapStore>) {
    let fix = session.begin_refresh(Coordinate::new(40.0, -73.0));
    let stops = (0..13)
        .map(|i| stop("Stop", TransportMode::Bus, 40.001 + f64::from(i) * 0.001, 100.0))
        .collect();
    session.apply_refresh(refresh_with(fix.generation, stops, Vec::new()));

    session
        .dispatch(Action::Paginate {
            target: PageTarget::Transport,
            step: 1,
        })
        .expect("paginate");
    assert_eq!(session.transport_page().window.index, 1);

    session.begin_refresh(Coordinate::new(41.0, -73.0));
    assert_eq!(session.transport_page().window.index, 0);
    assert!(!session.transport_page().items.is_empty(), "items stay until the refresh lands");
}

#[rstest]
fn pagination_advances_and_clamps() {
    let mut session = seeded_session(13);

    for expected in [1, 2, 2] {
        session
            .dispatch(Action::Paginate {
                target: PageTarget::Transport,
                step: 1,
            })
            .expect("paginate");
        assert_eq!(session.transport_page().window.index, expected);
    }
    assert_eq!(session.transport_page().window.total_windows, 3);
}

#[rstest]
fn mode_filter_narrows_and_resets_the_window(mut session: DashboardSession<MapStore>) {
    let fix = session.begin_refresh(Coordinate::new(40.0, -73.0));
    let mut stops: Vec<TransportStop> = (0..8)
        .map(|i| stop("Bus stop", TransportMode::Bus, 40.001 + f64::from(i) * 0.001, 100.0))
        .collect();
    stops.push(stop("Tram stop", TransportMode::Tram, 40.02, 900.0));
    session.apply_refresh(refresh_with(fix.generation, stops, Vec::new()));

    session
        .dispatch(Action::Paginate {
            target: PageTarget::Transport,
            step: 1,
        })
        .expect("paginate");
    assert_eq!(session.transport_page().window.index, 1);

    session
        .dispatch(Action::SetModeFilter("tram".parse().expect("valid filter")))
        .expect("filter");

    let page = session.transport_page();
    assert_eq!(page.window.index, 0, "filter change resets the window");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Tram stop");
}

#[rstest]
fn mode_filter_parses_case_insensitively() {
    let filter: ModeFilter = "Bus".parse().expect("valid filter");
    assert_eq!(filter, ModeFilter::Only(TransportMode::Bus));
    assert_eq!("ALL".parse::<ModeFilter>().expect("valid filter"), ModeFilter::All);
    assert!("boat".parse::<ModeFilter>().is_err());
}

#[rstest]
fn select_narrows_the_overlay_and_paginate_widens_it_again() {
    let mut session = seeded_session(13);

    let first = session.transport_page().items[0].clone();
    session
        .dispatch(Action::Select(Selection::from_transport_stop(&first)))
        .expect("select");

    let focused = session.overlay_targets();
    assert_eq!(focused.targets.len(), 1);
    assert_eq!(focused.targets[0].coordinate, first.coordinate);
    assert_eq!(session.selection().expect("selection recorded").title, "Stop");

    session
        .dispatch(Action::Paginate {
            target: PageTarget::Transport,
            step: 1,
        })
        .expect("paginate");

    let browsing = session.overlay_targets();
    assert_eq!(browsing.targets.len(), 6, "overlay is rebuilt from the visible window");
    assert!(session.selection().is_some(), "the trip summary outlives the focus");
}

#[rstest]
fn overlay_targets_follow_the_active_tab(mut session: DashboardSession<MapStore>) {
    let fix = session.begin_refresh(Coordinate::new(40.0, -73.0));
    session.apply_refresh(refresh_with(
        fix.generation,
        vec![stop("Stop", TransportMode::Bus, 40.001, 111.0)],
        groups_with(
            PlaceCategory::Food,
            vec![
                place("Brew", PlaceCategory::Food, 40.002, 222.0),
                place("Roast", PlaceCategory::Food, 40.003, 333.0),
            ],
        ),
    ));

    assert_eq!(session.overlay_targets().targets.len(), 1);

    session
        .dispatch(Action::SwitchTab(Tab::Places))
        .expect("switch tab");
    let places = session.overlay_targets();
    assert_eq!(places.targets.len(), 2, "union of visible place windows");
    assert_eq!(places.origin, Some(Coordinate::new(40.0, -73.0)));
}

#[rstest]
fn favourite_toggle_round_trips_through_dispatch() {
    let mut session = seeded_session(1);
    let first = session.transport_page().items[0].clone();
    let record = FavoriteRecord::from_transport_stop(&first);

    session
        .dispatch(Action::ToggleFavorite(record.clone()))
        .expect("toggle");
    assert!(session.favorites().contains(&record.identity));

    session
        .dispatch(Action::ToggleFavorite(record.clone()))
        .expect("toggle");
    assert!(!session.favorites().contains(&record.identity));
}

#[rstest]
fn jump_to_favourite_selects_with_frozen_labels() {
    let mut session = seeded_session(1);
    let first = session.transport_page().items[0].clone();
    let record = FavoriteRecord::from_transport_stop(&first);
    session
        .dispatch(Action::ToggleFavorite(record.clone()))
        .expect("toggle");

    session
        .dispatch(Action::JumpToFavorite(record.identity.clone()))
        .expect("jump");

    let selection = session.selection().expect("selection recorded");
    assert_eq!(selection.distance_label, record.distance_label);
    assert_eq!(session.overlay_targets().targets.len(), 1);
}

#[rstest]
fn clear_favorites_empties_the_set() {
    let mut session = seeded_session(1);
    let first = session.transport_page().items[0].clone();
    session
        .dispatch(Action::ToggleFavorite(FavoriteRecord::from_transport_stop(&first)))
        .expect("toggle");

    session.dispatch(Action::ClearFavorites).expect("clear");
    assert!(session.favorites().records().is_empty());
}

#[rstest]
#[tokio::test]
async fn fetch_catalog_builds_both_panels_from_one_source() {
    let mut source = MockPointQuerySource::new();
    source
        .expect_fetch_elements()
        .returning(|request| match request.kind {
            QueryKind::Transport => Ok(vec![element(
                Some((40.001, -73.0)),
                &[("highway", "bus_stop"), ("name", "Main St")],
            )]),
            QueryKind::Places => Ok(vec![element(
                Some((40.002, -73.0)),
                &[("amenity", "cafe"), ("name", "Brew")],
            )]),
        });

    let fix = OriginFix {
        coordinate: Coordinate::new(40.0, -73.0),
        generation: Generation(1),
    };
    let refresh = fetch_catalog(
        &source,
        fix,
        DEFAULT_QUERY_RADIUS_METERS,
        &CatalogConfig::default(),
    )
    .await;

    let transport = refresh.transport.expect("transport query succeeds");
    assert_eq!(transport.len(), 1);
    assert_eq!(transport[0].title, "Main St");
    let places = refresh.places.expect("places query succeeds");
    assert_eq!(places[0].items.len(), 1);
}

#[rstest]
#[tokio::test]
async fn fetch_catalog_reports_partial_failure() {
    let mut source = MockPointQuerySource::new();
    source
        .expect_fetch_elements()
        .returning(|request| match request.kind {
            QueryKind::Transport => Err(PointQueryError::timeout("deadline")),
            QueryKind::Places => Ok(Vec::new()),
        });

    let fix = OriginFix {
        coordinate: Coordinate::new(40.0, -73.0),
        generation: Generation(7),
    };
    let refresh = fetch_catalog(&source, fix, 500, &CatalogConfig::default()).await;

    assert_eq!(refresh.generation, Generation(7));
    assert!(refresh.transport.is_err(), "one failed side is reported");
    assert!(refresh.places.is_ok(), "the other side still succeeds");
}

#[rstest]
fn end_to_end_bus_stop_distance_and_labels() {
    let origin = Coordinate::new(40.0, -73.0);
    let elements = vec![element(
        Some((40.001, -73.0)),
        &[("highway", "bus_stop"), ("name", "Main St")],
    )];

    let stops = build_transport_stops(&elements, origin, &CatalogConfig::default());
    assert_eq!(stops.len(), 1);
    let stop = &stops[0];

    assert_eq!(stop.mode, TransportMode::Bus);
    assert!((stop.distance_meters - 111.2).abs() < 1.0);
    assert_eq!(format_distance(stop.distance_meters), "111 m");
    assert_eq!(format_walk_eta(stop.distance_meters), "~1 min walk");
}
