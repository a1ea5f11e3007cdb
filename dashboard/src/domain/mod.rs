//! Domain primitives, aggregates, and services.
//!
//! Purpose: turn a device coordinate into ranked, windowed catalog panels and
//! keep favourites, selection, and overlay inputs consistent under refreshes.
//! Types are immutable where the data model demands it; invariants and
//! serialisation contracts (serde) live in each type's Rustdoc.
//!
//! Public surface, leaf-first:
//! - [`geo`] — coordinates, haversine distance, display labels.
//! - [`catalog`] — raw elements into ranked transport stops and place groups.
//! - [`favorites`] — persisted favourites keyed by item identity.
//! - [`ports`] — traits and typed errors at the hexagon's edges.
//! - [`session`] — the single owner of mutable dashboard state.

pub mod catalog;
pub mod favorites;
pub mod geo;
pub mod ports;
pub mod session;

pub use self::catalog::ItemIdentity;
pub use self::favorites::{FavoriteRecord, FavoritesStore, FAVORITES_STORAGE_KEY};
pub use self::geo::{
    distance, estimate_walk_minutes, format_distance, format_walk_eta, Coordinate, UNKNOWN_LABEL,
};
pub use self::ports::{RouteGeometry, RoutingUnavailable};
pub use self::session::{
    fetch_catalog, Action, DashboardSession, Generation, OriginFix, OverlayTarget, OverlayTargets,
    RefreshOutcome, Selection, Tab, DEFAULT_QUERY_RADIUS_METERS,
};
