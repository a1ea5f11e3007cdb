//! DTOs for decoding Overpass JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into the
//! domain's raw elements in one pass. Elements without usable coordinates
//! pass through with an empty point; the catalog builder is the one place
//! that decides what is actionable.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::catalog::RawElement;
use crate::domain::Coordinate;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    pub(super) lon: Option<f64>,
    pub(super) lat: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    pub(super) fn into_raw_elements(self) -> Vec<RawElement> {
        self.elements
            .into_iter()
            .map(OverpassElementDto::into_raw_element)
            .collect()
    }
}

impl OverpassElementDto {
    fn into_raw_element(self) -> RawElement {
        let point = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };
        RawElement {
            point,
            center: self
                .center
                .map(|center| Coordinate::new(center.lat, center.lon)),
            tags: self.tags,
        }
    }
}
