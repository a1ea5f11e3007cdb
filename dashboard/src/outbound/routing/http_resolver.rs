//! Ordered-fallback walking route resolver.
//!
//! The original system retried routing services in a silent nested loop. Here
//! the endpoints are an explicit ordered list of strategies: each is tried in
//! sequence, every failure is recorded with its cause, and the first usable
//! geometry wins. No further endpoints are tried after a success.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, warn};

use super::dto::decode_route_body;
use crate::domain::ports::{RouteAttempt, RouteGeometry, RouteSource, RoutingUnavailable};
use crate::domain::Coordinate;

/// Primary public walking-profile endpoint.
pub const DEFAULT_PRIMARY_ENDPOINT: &str =
    "https://routing.openstreetmap.de/routed-foot/route/v1/foot";
/// Fallback public OSRM demo endpoint.
pub const DEFAULT_FALLBACK_ENDPOINT: &str = "https://router.project-osrm.org/route/v1/foot";

/// One routing service in the fallback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEndpoint {
    /// Label used in logs and attempt records.
    pub name: String,
    /// Service base URL up to and including the profile segment.
    pub base: Url,
}

impl RouteEndpoint {
    /// Construct an endpoint from a label and a base URL.
    #[must_use]
    pub fn new(name: impl Into<String>, base: Url) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }

    fn request_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{base}/{o_lon},{o_lat};{d_lon},{d_lat}?overview=full&geometries=geojson",
            base = self.base.as_str().trim_end_matches('/'),
            o_lon = origin.longitude,
            o_lat = origin.latitude,
            d_lon = destination.longitude,
            d_lat = destination.latitude,
        )
    }
}

/// Errors raised while constructing the resolver.
#[derive(Debug, Error)]
pub enum RouteResolverBuildError {
    /// A configured endpoint URL did not parse.
    #[error("routing endpoint URL invalid: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    /// The HTTP client could not be constructed.
    #[error("routing HTTP client construction failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Walking route resolver over an ordered list of OSRM-style endpoints.
pub struct HttpRouteResolver {
    client: Client,
    endpoints: Vec<RouteEndpoint>,
}

impl HttpRouteResolver {
    /// Build a resolver over explicit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RouteResolverBuildError`] when the reqwest client cannot be
    /// constructed.
    pub fn new(
        endpoints: Vec<RouteEndpoint>,
        timeout: Duration,
    ) -> Result<Self, RouteResolverBuildError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    /// Build a resolver over the default public endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RouteResolverBuildError`] when a default endpoint URL does
    /// not parse or the client cannot be constructed.
    pub fn with_default_endpoints(timeout: Duration) -> Result<Self, RouteResolverBuildError> {
        let endpoints = vec![
            RouteEndpoint::new("osm-foot", Url::parse(DEFAULT_PRIMARY_ENDPOINT)?),
            RouteEndpoint::new("osrm-demo", Url::parse(DEFAULT_FALLBACK_ENDPOINT)?),
        ];
        Self::new(endpoints, timeout)
    }

    /// The configured fallback order.
    #[must_use]
    pub fn endpoints(&self) -> &[RouteEndpoint] {
        &self.endpoints
    }
}

#[async_trait]
impl RouteSource for HttpRouteResolver {
    async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteGeometry, RoutingUnavailable> {
        resolve_route(&self.endpoints, |endpoint| {
            let client = self.client.clone();
            async move { attempt_route(&client, &endpoint, origin, destination).await }
        })
        .await
    }
}

/// Try each endpoint in order; the first usable geometry wins.
///
/// Failures accumulate into the [`RoutingUnavailable`] attempt log so the
/// last underlying cause survives for display.
pub(super) async fn resolve_route<F, Fut>(
    endpoints: &[RouteEndpoint],
    mut attempt: F,
) -> Result<RouteGeometry, RoutingUnavailable>
where
    F: FnMut(RouteEndpoint) -> Fut,
    Fut: Future<Output = Result<RouteGeometry, String>>,
{
    let mut attempts = Vec::new();
    for endpoint in endpoints {
        match attempt(endpoint.clone()).await {
            Ok(geometry) => {
                debug!(endpoint = %endpoint.name, points = geometry.points().len(), "route resolved");
                return Ok(geometry);
            }
            Err(cause) => {
                warn!(endpoint = %endpoint.name, %cause, "routing endpoint failed");
                attempts.push(RouteAttempt {
                    endpoint: endpoint.name.clone(),
                    cause,
                });
            }
        }
    }
    Err(RoutingUnavailable { attempts })
}

async fn attempt_route(
    client: &Client,
    endpoint: &RouteEndpoint,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<RouteGeometry, String> {
    let url = endpoint.request_url(origin, destination);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|error| format!("transport: {error}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("status {}", status.as_u16()));
    }
    let body = response
        .bytes()
        .await
        .map_err(|error| format!("transport: {error}"))?;
    decode_route_body(body.as_ref())
}

#[cfg(test)]
mod tests {
    //! Behaviour coverage for the fallback order.

    use std::cell::RefCell;

    use rstest::rstest;

    use super::*;

    fn endpoint(name: &str) -> RouteEndpoint {
        RouteEndpoint::new(
            name,
            Url::parse(&format!("https://{name}.invalid/route/v1/foot")).expect("static URL"),
        )
    }

    #[rstest]
    fn request_url_is_longitude_first_with_geojson_geometry() {
        let url = endpoint("primary")
            .request_url(Coordinate::new(40.0, 1.5), Coordinate::new(41.0, 2.5));
        assert_eq!(
            url,
            "https://primary.invalid/route/v1/foot/1.5,40;2.5,41?overview=full&geometries=geojson"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn first_success_wins_and_later_endpoints_are_never_tried() {
        let endpoints = vec![endpoint("primary"), endpoint("fallback"), endpoint("spare")];
        let tried = RefCell::new(Vec::new());

        let result = resolve_route(&endpoints, |endpoint| {
            tried.borrow_mut().push(endpoint.name.clone());
            let name = endpoint.name;
            async move {
                match name.as_str() {
                    "primary" => Err("status 500".to_owned()),
                    "fallback" => decode_route_body(
                        br#"{"routes":[{"geometry":{"coordinates":[[1.0,2.0],[3.0,4.0]]}}]}"#,
                    ),
                    other => panic!("endpoint {other} must never be tried"),
                }
            }
        })
        .await;

        let geometry = result.expect("fallback succeeds");
        assert_eq!(
            geometry.points(),
            &[Coordinate::new(2.0, 1.0), Coordinate::new(4.0, 3.0)],
            "pairs are exposed latitude-first"
        );
        assert_eq!(*tried.borrow(), vec!["primary".to_owned(), "fallback".to_owned()]);
    }

    #[rstest]
    #[tokio::test]
    async fn exhaustion_reports_every_attempt_with_the_last_cause() {
        let endpoints = vec![endpoint("primary"), endpoint("fallback")];

        let result = resolve_route(&endpoints, |endpoint| async move {
            match endpoint.name.as_str() {
                "primary" => Err("status 500".to_owned()),
                _ => Err("route geometry is empty".to_owned()),
            }
        })
        .await;

        let error = result.expect_err("every endpoint failed");
        assert_eq!(error.attempts.len(), 2);
        assert_eq!(error.attempts[0].endpoint, "primary");
        assert_eq!(error.last_cause(), "route geometry is empty");
    }

    #[rstest]
    #[tokio::test]
    async fn no_endpoints_fails_without_attempts() {
        let result = resolve_route(&[], |_| async move {
            Err("unreachable".to_owned())
        })
        .await;
        let error = result.expect_err("nothing to try");
        assert!(error.attempts.is_empty());
    }
}
