//! Overpass outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `PointQuerySource`
//! port.

mod dto;
mod http_source;

pub use http_source::{OverpassHttpSource, DEFAULT_OVERPASS_ENDPOINT};
