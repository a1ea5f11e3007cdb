//! Dashboard session: the single owner of mutable dashboard state.
//!
//! The original system kept the current origin, panel state, and selection in
//! module globals wired together by string-keyed DOM attributes. Here a
//! session object owns all of it and a finite set of typed [`Action`]s is the
//! only way interaction mutates it, decoupling what triggers an action from
//! what the action does.
//!
//! Refreshes are generation-stamped: a new origin fix supersedes any
//! in-flight fetch, and results arriving for a superseded generation are
//! recorded and dropped, never rendered.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pagination::{advance, slice_page, PageSize, PageWindow};
use tracing::{debug, warn};

use super::catalog::{
    build_place_groups, build_transport_stops, CatalogConfig, ItemIdentity, PlaceCategory,
    PlaceGroup, PlaceItem, TransportMode, TransportStop,
};
use super::favorites::{FavoriteRecord, FavoritesStore};
use super::geo::{format_distance, format_walk_eta, Coordinate};
use super::ports::{
    KeyValueStore, KeyValueStoreError, PointQueryError, PointQueryRequest, PointQuerySource,
    QueryKind,
};

/// Search radius used for catalog queries, metres.
pub const DEFAULT_QUERY_RADIUS_METERS: u32 = 25_000;

/// Monotonically increasing stamp tying fetch results to the origin fix that
/// requested them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An accepted device fix plus the generation it minted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginFix {
    /// The device-reported position.
    pub coordinate: Coordinate,
    /// Generation minted for this fix.
    pub generation: Generation,
}

/// Which panel drives the display and the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Transit stops.
    #[default]
    Transport,
    /// Points of interest.
    Places,
}

/// Transport list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeFilter {
    /// Every mode.
    #[default]
    All,
    /// One specific mode.
    Only(TransportMode),
}

impl ModeFilter {
    /// Whether a stop with `mode` passes the filter.
    #[must_use]
    pub fn matches(self, mode: TransportMode) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == mode,
        }
    }
}

impl std::str::FromStr for ModeFilter {
    type Err = super::catalog::ParseTransportModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        if lowered == "all" {
            return Ok(Self::All);
        }
        lowered.parse().map(Self::Only)
    }
}

/// Render readiness of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelStatus {
    /// No fetch has completed yet.
    #[default]
    Pending,
    /// The last fetch for the current generation succeeded.
    Ready,
    /// The last fetch failed; the panel renders an empty placeholder state.
    Unavailable,
}

/// The outcome of one generation-stamped catalog fetch.
///
/// Each side carries its own result so that partial success is a displayable
/// state: one failed query never suppresses the other's items.
#[derive(Debug)]
pub struct CatalogRefresh {
    /// Generation the fetch was issued under.
    pub generation: Generation,
    /// Ranked transport stops, or why they are unavailable.
    pub transport: Result<Vec<TransportStop>, PointQueryError>,
    /// Place groups, or why they are unavailable.
    pub places: Result<Vec<PlaceGroup>, PointQueryError>,
}

/// Whether a refresh was applied or discarded as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The refresh matched the current generation and was rendered.
    Applied,
    /// The refresh belonged to a superseded origin fix and was dropped.
    Superseded,
}

/// The item the user selected for a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Category or mode label.
    pub category_label: String,
    /// Item title.
    pub title: String,
    /// Destination position.
    pub coordinate: Coordinate,
    /// Distance label at selection time.
    pub distance_label: String,
    /// Walking-ETA label at selection time.
    pub eta_label: String,
}

impl Selection {
    /// Build a selection from a live transport stop.
    #[must_use]
    pub fn from_transport_stop(stop: &TransportStop) -> Self {
        Self {
            category_label: stop.mode.label().to_owned(),
            title: stop.title.clone(),
            coordinate: stop.coordinate,
            distance_label: format_distance(stop.distance_meters),
            eta_label: format_walk_eta(stop.distance_meters),
        }
    }

    /// Build a selection from a live place item.
    #[must_use]
    pub fn from_place_item(item: &PlaceItem) -> Self {
        Self {
            category_label: item.category.label().to_owned(),
            title: item.name.clone(),
            coordinate: item.coordinate,
            distance_label: format_distance(item.distance_meters),
            eta_label: format_walk_eta(item.distance_meters),
        }
    }

    /// Build a selection from a favourite's frozen labels.
    #[must_use]
    pub fn from_favorite(record: &FavoriteRecord) -> Self {
        Self {
            category_label: record.category_label.clone(),
            title: record.title.clone(),
            coordinate: record.coordinate,
            distance_label: record.distance_label.clone(),
            eta_label: record.eta_label.clone(),
        }
    }
}

/// Pagination target of a [`Action::Paginate`] dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// The filtered transport list.
    Transport,
    /// One place group.
    Places(PlaceCategory),
}

/// The finite set of interactions the dashboard supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Select an item as the trip destination.
    Select(Selection),
    /// Add or remove a favourite.
    ToggleFavorite(FavoriteRecord),
    /// Select a favourite using its frozen labels.
    JumpToFavorite(ItemIdentity),
    /// Step a panel window.
    Paginate {
        /// Which list to page.
        target: PageTarget,
        /// Signed step, clamped into range.
        step: isize,
    },
    /// Switch the active tab.
    SwitchTab(Tab),
    /// Narrow the transport list to one mode.
    SetModeFilter(ModeFilter),
    /// Remove every favourite.
    ClearFavorites,
}

/// One visible window of the transport panel.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportPage {
    /// Clamped window position over the filtered list.
    pub window: PageWindow,
    /// Stops visible in this window.
    pub items: Vec<TransportStop>,
}

/// One visible window of a place group.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacePage {
    /// The bucket.
    pub category: PlaceCategory,
    /// Clamped window position over the group.
    pub window: PageWindow,
    /// Items visible in this window.
    pub items: Vec<PlaceItem>,
}

/// A geo-anchored point the overlay should mark.
///
/// Rebuilt on every render pass from whatever is currently visible; never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTarget {
    /// Target position.
    pub coordinate: Coordinate,
}

/// Everything the overlay needs for one render pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayTargets {
    /// Origin marker position, when a fix exists.
    pub origin: Option<Coordinate>,
    /// Destination markers.
    pub targets: Vec<OverlayTarget>,
}

/// The single owner of mutable dashboard state.
pub struct DashboardSession<S> {
    page_size: PageSize,
    origin: Option<OriginFix>,
    next_generation: u64,
    transport_items: Vec<TransportStop>,
    transport_window: usize,
    transport_status: PanelStatus,
    mode_filter: ModeFilter,
    place_groups: Vec<PlaceGroup>,
    place_windows: HashMap<PlaceCategory, usize>,
    places_status: PanelStatus,
    tab: Tab,
    selection: Option<Selection>,
    focus: Option<Coordinate>,
    favorites: FavoritesStore<S>,
    last_updated: Option<DateTime<Utc>>,
}

impl<S: KeyValueStore> DashboardSession<S> {
    /// Create a session over loaded favourites with the default page size.
    #[must_use]
    pub fn new(favorites: FavoritesStore<S>) -> Self {
        Self::with_page_size(favorites, PageSize::default())
    }

    /// Create a session with an explicit page size.
    #[must_use]
    pub fn with_page_size(favorites: FavoritesStore<S>, page_size: PageSize) -> Self {
        Self {
            page_size,
            origin: None,
            next_generation: 0,
            transport_items: Vec::new(),
            transport_window: 0,
            transport_status: PanelStatus::default(),
            mode_filter: ModeFilter::default(),
            place_groups: Vec::new(),
            place_windows: HashMap::new(),
            places_status: PanelStatus::default(),
            tab: Tab::default(),
            selection: None,
            focus: None,
            favorites,
            last_updated: None,
        }
    }

    /// Accept a new device fix, superseding any in-flight refresh.
    ///
    /// Windows reset to the first page: stale indices from the previous
    /// origin would otherwise point into an unrelated ranking.
    pub fn begin_refresh(&mut self, coordinate: Coordinate) -> OriginFix {
        self.next_generation += 1;
        let fix = OriginFix {
            coordinate,
            generation: Generation(self.next_generation),
        };
        self.origin = Some(fix);
        self.transport_window = 0;
        self.place_windows.clear();
        self.focus = None;
        fix
    }

    /// The current origin fix, when one has been accepted.
    #[must_use]
    pub fn origin(&self) -> Option<OriginFix> {
        self.origin
    }

    /// Apply a completed fetch, unless its generation has been superseded.
    ///
    /// Each side applies independently: a failed transport query leaves the
    /// places panel renderable and vice versa.
    pub fn apply_refresh(&mut self, refresh: CatalogRefresh) -> RefreshOutcome {
        let current = self.origin.map(|fix| fix.generation);
        if current != Some(refresh.generation) {
            debug!(
                refresh_generation = %refresh.generation,
                "discarding catalog refresh for superseded origin"
            );
            return RefreshOutcome::Superseded;
        }

        match refresh.transport {
            Ok(items) => {
                self.transport_items = items;
                self.transport_status = PanelStatus::Ready;
            }
            Err(error) => {
                warn!(%error, "transport catalog unavailable");
                self.transport_items.clear();
                self.transport_status = PanelStatus::Unavailable;
            }
        }
        match refresh.places {
            Ok(groups) => {
                self.place_groups = groups;
                self.places_status = PanelStatus::Ready;
            }
            Err(error) => {
                warn!(%error, "places catalog unavailable");
                self.place_groups.clear();
                self.places_status = PanelStatus::Unavailable;
            }
        }
        self.last_updated = Some(Utc::now());
        RefreshOutcome::Applied
    }

    /// Handle one typed interaction.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError`] when a favourites mutation cannot be
    /// persisted; every other action is infallible.
    pub fn dispatch(&mut self, action: Action) -> Result<(), KeyValueStoreError> {
        match action {
            Action::Select(selection) => {
                self.focus = Some(selection.coordinate);
                self.selection = Some(selection);
            }
            Action::ToggleFavorite(record) => {
                self.favorites.toggle(record)?;
            }
            Action::JumpToFavorite(identity) => {
                if let Some(record) = self.favorites.find(&identity) {
                    let selection = Selection::from_favorite(record);
                    self.focus = Some(selection.coordinate);
                    self.selection = Some(selection);
                }
            }
            Action::Paginate { target, step } => {
                self.focus = None;
                match target {
                    PageTarget::Transport => {
                        let len = self.filtered_transport().len();
                        self.transport_window =
                            advance(len, self.transport_window, step, self.page_size);
                    }
                    PageTarget::Places(category) => {
                        let len = self
                            .place_groups
                            .iter()
                            .find(|group| group.category == category)
                            .map_or(0, |group| group.items.len());
                        let current = self.place_windows.get(&category).copied().unwrap_or(0);
                        self.place_windows
                            .insert(category, advance(len, current, step, self.page_size));
                    }
                }
            }
            Action::SwitchTab(tab) => {
                self.tab = tab;
                self.focus = None;
            }
            Action::SetModeFilter(filter) => {
                self.mode_filter = filter;
                self.transport_window = 0;
                self.focus = None;
            }
            Action::ClearFavorites => {
                self.favorites.clear()?;
            }
        }
        Ok(())
    }

    /// The visible window of the filtered transport list.
    #[must_use]
    pub fn transport_page(&self) -> TransportPage {
        let filtered = self.filtered_transport();
        let page = slice_page(&filtered, self.transport_window, self.page_size);
        TransportPage {
            window: page.window,
            items: page.items.iter().map(|stop| (*stop).clone()).collect(),
        }
    }

    /// The visible window of every place group, in display order.
    #[must_use]
    pub fn place_pages(&self) -> Vec<PlacePage> {
        self.place_groups
            .iter()
            .map(|group| {
                let requested = self
                    .place_windows
                    .get(&group.category)
                    .copied()
                    .unwrap_or(0);
                let page = slice_page(&group.items, requested, self.page_size);
                PlacePage {
                    category: group.category,
                    window: page.window,
                    items: page.items.to_vec(),
                }
            })
            .collect()
    }

    /// Overlay input for the current render pass.
    ///
    /// A selected destination narrows the overlay to a single focus target;
    /// otherwise the active tab's visible windows supply the targets
    /// (transport: the filtered page; places: the union of every group's
    /// visible window).
    #[must_use]
    pub fn overlay_targets(&self) -> OverlayTargets {
        let origin = self.origin.map(|fix| fix.coordinate);
        let targets = if let Some(coordinate) = self.focus {
            vec![OverlayTarget { coordinate }]
        } else {
            match self.tab {
                Tab::Transport => self
                    .transport_page()
                    .items
                    .iter()
                    .map(|stop| OverlayTarget {
                        coordinate: stop.coordinate,
                    })
                    .collect(),
                Tab::Places => self
                    .place_pages()
                    .iter()
                    .flat_map(|page| page.items.iter())
                    .map(|item| OverlayTarget {
                        coordinate: item.coordinate,
                    })
                    .collect(),
            }
        };
        OverlayTargets { origin, targets }
    }

    /// The current trip selection.
    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The favourites store.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    /// The active tab.
    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// The active transport mode filter.
    #[must_use]
    pub fn mode_filter(&self) -> ModeFilter {
        self.mode_filter
    }

    /// Render status of the transport panel.
    #[must_use]
    pub fn transport_status(&self) -> PanelStatus {
        self.transport_status
    }

    /// Render status of the places panel.
    #[must_use]
    pub fn places_status(&self) -> PanelStatus {
        self.places_status
    }

    /// When the last refresh was applied.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    fn filtered_transport(&self) -> Vec<&TransportStop> {
        self.transport_items
            .iter()
            .filter(|stop| self.mode_filter.matches(stop.mode))
            .collect()
    }
}

/// Issue both catalog queries concurrently and build the refresh.
///
/// The two fetches are awaited jointly; each side keeps its own result so a
/// failure in one never suppresses the other.
pub async fn fetch_catalog<S: PointQuerySource + ?Sized>(
    source: &S,
    origin: OriginFix,
    radius_meters: u32,
    config: &CatalogConfig,
) -> CatalogRefresh {
    let transport_request = PointQueryRequest {
        origin: origin.coordinate,
        radius_meters,
        kind: QueryKind::Transport,
    };
    let places_request = PointQueryRequest {
        origin: origin.coordinate,
        radius_meters,
        kind: QueryKind::Places,
    };
    let (transport, places) = futures_util::join!(
        source.fetch_elements(&transport_request),
        source.fetch_elements(&places_request),
    );
    CatalogRefresh {
        generation: origin.generation,
        transport: transport
            .map(|elements| build_transport_stops(&elements, origin.coordinate, config)),
        places: places.map(|elements| build_place_groups(&elements, origin.coordinate, config)),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
