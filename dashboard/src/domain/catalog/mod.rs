//! Catalog building: raw point-query elements into ranked domain items.
//!
//! A raw element is a point (or a centre point) plus a free-form tag map. The
//! builders here classify elements into transport stops and place groups,
//! compute distances against the origin active at fetch time, derive stable
//! identities, deduplicate, and rank by distance. Elements lacking a
//! resolvable point or the identity-bearing tags their category requires are
//! dropped, never rendered as "Unknown".

mod places;
mod transport;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::geo::Coordinate;

pub use places::{build_place_groups, PlaceGroup, PlaceItem};
pub use transport::{build_transport_stops, TransportStop};

/// Decimal places kept when folding a coordinate into an identity.
///
/// Five places is roughly metre precision: two differently worded elements at
/// the same physical point collapse to one identity.
pub const IDENTITY_PRECISION: usize = 5;

/// Maximum transport stops kept after ranking.
pub const TRANSPORT_RESULT_CAP: usize = 60;

/// One element of an external point-query result.
///
/// The shape is query-language agnostic: a point or a centre point, plus
/// string tags. Missing fields are represented, not rejected; the builders
/// decide what is actionable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawElement {
    /// Element's own point, when the source supplies one.
    pub point: Option<Coordinate>,
    /// Centre point for extended geometries.
    pub center: Option<Coordinate>,
    /// Raw tag map.
    pub tags: BTreeMap<String, String>,
}

impl RawElement {
    /// The element's usable position: its own point, else its centre.
    ///
    /// Non-finite positions resolve to `None`.
    #[must_use]
    pub fn resolved_point(&self) -> Option<Coordinate> {
        self.point
            .or(self.center)
            .filter(Coordinate::is_finite)
    }

    /// Borrow a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Deterministic dedup and lookup key for a catalog item.
///
/// Derived from the category key and the coordinate rounded to
/// [`IDENTITY_PRECISION`] decimal places, never from tag text, so
/// re-fetching produces stable identities even when textual fields change.
///
/// # Examples
/// ```
/// use dashboard::domain::{Coordinate, ItemIdentity};
///
/// let a = ItemIdentity::derive("bus", Coordinate::new(40.000001, -73.0));
/// let b = ItemIdentity::derive("bus", Coordinate::new(40.000004, -73.0));
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemIdentity(String);

impl ItemIdentity {
    /// Derive an identity from a category key and a coordinate.
    #[must_use]
    pub fn derive(category_key: &str, coordinate: Coordinate) -> Self {
        Self(format!(
            "{category_key}:{lat:.prec$}:{lon:.prec$}",
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            prec = IDENTITY_PRECISION,
        ))
    }

    /// Borrow the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transit mode derived from a fixed tag-priority table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// `highway=bus_stop`.
    Bus,
    /// `railway=tram_stop`.
    Tram,
    /// `railway=subway_entrance`.
    Metro,
    /// `railway=station`.
    Train,
    /// Anything else the transport query matched.
    Transit,
}

impl TransportMode {
    /// Lowercase key used by filters and identities.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Tram => "tram",
            Self::Metro => "metro",
            Self::Train => "train",
            Self::Transit => "transit",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bus => "Bus",
            Self::Tram => "Tram",
            Self::Metro => "Metro",
            Self::Train => "Train",
            Self::Transit => "Transit",
        }
    }

    /// Classify an element's tags; first matching rule wins.
    #[must_use]
    pub fn classify(element: &RawElement) -> Self {
        if element.tag("highway") == Some("bus_stop") {
            return Self::Bus;
        }
        match element.tag("railway") {
            Some("tram_stop") => Self::Tram,
            Some("subway_entrance") => Self::Metro,
            Some("station") => Self::Train,
            _ => Self::Transit,
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown transport mode key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransportModeError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseTransportModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown transport mode: {}", self.input)
    }
}

impl std::error::Error for ParseTransportModeError {}

impl std::str::FromStr for TransportMode {
    type Err = ParseTransportModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bus" => Ok(Self::Bus),
            "tram" => Ok(Self::Tram),
            "metro" => Ok(Self::Metro),
            "train" => Ok(Self::Train),
            "transit" => Ok(Self::Transit),
            _ => Err(ParseTransportModeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Place bucket with fixed key, label, and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    /// Cafes, restaurants, bars.
    Food,
    /// Parks, gardens, museums.
    Fun,
    /// Everything else the places query matched.
    Service,
}

impl PlaceCategory {
    /// Buckets in their fixed display order.
    pub const ALL: [Self; 3] = [Self::Food, Self::Fun, Self::Service];

    /// Lowercase key used by pagers and identities.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Fun => "fun",
            Self::Service => "service",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "Food & Drink",
            Self::Fun => "Parks & Recreation",
            Self::Service => "Mobility & Services",
        }
    }

    /// One-line description shown under the label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Food => "Quick bites nearby.",
            Self::Fun => "Spots to unwind.",
            Self::Service => "Helpful services close by.",
        }
    }
}

impl std::fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What happens to a place element matching no membership rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    /// Assign to the [`PlaceCategory::Service`] bucket.
    #[default]
    AssignService,
    /// Drop the element.
    Drop,
}

/// Tunable limits and policies for catalog building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Cap on ranked transport stops, `None` for unbounded.
    pub transport_cap: Option<usize>,
    /// Cap on items per place group, `None` for unbounded.
    pub place_group_cap: Option<usize>,
    /// Bucket policy for unmatched place elements.
    pub unmatched_policy: UnmatchedPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            transport_cap: Some(TRANSPORT_RESULT_CAP),
            place_group_cap: None,
            unmatched_policy: UnmatchedPolicy::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Element fixtures shared by the catalog builder tests.

    use super::*;

    pub(crate) fn element(
        point: Option<(f64, f64)>,
        tags: &[(&str, &str)],
    ) -> RawElement {
        RawElement {
            point: point.map(|(lat, lon)| Coordinate::new(lat, lon)),
            center: None,
            tags: tags
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }
}
