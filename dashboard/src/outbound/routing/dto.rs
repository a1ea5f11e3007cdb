//! DTOs for decoding OSRM-style routing responses.

use serde::Deserialize;

use crate::domain::ports::RouteGeometry;
use crate::domain::Coordinate;

#[derive(Debug, Deserialize)]
pub(super) struct RouteResponseDto {
    #[serde(default)]
    routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
struct RouteDto {
    geometry: Option<RouteGeometryDto>,
}

#[derive(Debug, Deserialize)]
struct RouteGeometryDto {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

/// Decode a response body into latitude-first route geometry.
///
/// Routing services return GeoJSON-style pairs in longitude-first order; the
/// domain consumes latitude-first, so every pair is reordered here.
pub(super) fn decode_route_body(body: &[u8]) -> Result<RouteGeometry, String> {
    let decoded: RouteResponseDto =
        serde_json::from_slice(body).map_err(|error| format!("invalid routing JSON: {error}"))?;
    let route = decoded
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| "response contains no routes".to_owned())?;
    let geometry = route
        .geometry
        .ok_or_else(|| "route lacks geometry".to_owned())?;
    if geometry.coordinates.is_empty() {
        return Err("route geometry is empty".to_owned());
    }
    Ok(RouteGeometry(
        geometry
            .coordinates
            .into_iter()
            .map(|[longitude, latitude]| Coordinate::new(latitude, longitude))
            .collect(),
    ))
}
