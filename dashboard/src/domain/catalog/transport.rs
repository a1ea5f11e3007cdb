//! Transport stop building: classify, rank, deduplicate, cap.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::geo::{distance, format_distance, Coordinate};

use super::{CatalogConfig, ItemIdentity, RawElement, TransportMode};

/// A ranked transit stop.
///
/// `distance_meters` is relative to the origin active at fetch time; it is
/// never recomputed in place. A later origin change means a re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStop {
    /// Stable dedup and lookup key.
    pub identity: ItemIdentity,
    /// Transit mode from the tag-priority table.
    pub mode: TransportMode,
    /// Stop name, or the line reference when unnamed.
    pub title: String,
    /// Stop position.
    pub coordinate: Coordinate,
    /// Distance from the origin at fetch time, metres.
    pub distance_meters: f64,
    /// Secondary display line: served routes or the formatted distance.
    pub detail: String,
    /// Operating company, `"Public"` when untagged.
    pub provider: String,
}

/// Build the ranked, deduplicated transport list from raw elements.
///
/// Elements without a resolvable point, or with neither a `name` nor a `ref`
/// tag, are dropped: a stop that cannot be named or referenced is not
/// actionable. The output is sorted ascending by distance, deduplicated by
/// identity keeping the closest occurrence, and capped by the configuration.
///
/// # Examples
/// ```
/// use dashboard::domain::catalog::{build_transport_stops, CatalogConfig, RawElement};
/// use dashboard::domain::Coordinate;
///
/// let origin = Coordinate::new(40.0, -73.0);
/// let element = RawElement {
///     point: Some(Coordinate::new(40.001, -73.0)),
///     tags: [("highway".to_owned(), "bus_stop".to_owned()),
///            ("name".to_owned(), "Main St".to_owned())].into(),
///     ..RawElement::default()
/// };
///
/// let stops = build_transport_stops(&[element], origin, &CatalogConfig::default());
/// assert_eq!(stops.len(), 1);
/// assert_eq!(stops[0].title, "Main St");
/// ```
#[must_use]
pub fn build_transport_stops(
    elements: &[RawElement],
    origin: Coordinate,
    config: &CatalogConfig,
) -> Vec<TransportStop> {
    let mut stops: Vec<TransportStop> = elements
        .iter()
        .filter_map(|element| build_stop(element, origin))
        .collect();

    stops.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    dedup_by_identity(&mut stops);
    if let Some(cap) = config.transport_cap {
        stops.truncate(cap);
    }
    stops
}

fn build_stop(element: &RawElement, origin: Coordinate) -> Option<TransportStop> {
    let coordinate = element.resolved_point()?;
    let name = element.tag("name");
    let reference = element.tag("ref");
    if name.is_none() && reference.is_none() {
        return None;
    }

    let mode = TransportMode::classify(element);
    let distance_meters = distance(origin, coordinate);
    let title = name.map_or_else(
        || format!("Line {}", reference.unwrap_or_default()),
        str::to_owned,
    );
    let detail = element.tag("route_ref").map_or_else(
        || format_distance(distance_meters),
        |routes| format!("Routes: {routes}"),
    );
    let provider = element
        .tag("operator")
        .unwrap_or("Public")
        .to_owned();

    Some(TransportStop {
        identity: ItemIdentity::derive(mode.key(), coordinate),
        mode,
        title,
        coordinate,
        distance_meters,
        detail,
        provider,
    })
}

fn dedup_by_identity(stops: &mut Vec<TransportStop>) {
    let mut seen = HashSet::new();
    stops.retain(|stop| seen.insert(stop.identity.clone()));
}
