//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven collaborators
//! (the point-query service, routing services, the key-value store). Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.
//!
//! Failure taxonomy: a [`PointQueryError`] is recovered by the session into an
//! empty panel (data unavailable, never fatal); [`RoutingUnavailable`] is a
//! soft failure the caller renders around; a corrupt persisted blob is
//! recovered to an empty set by the favourites store.

use async_trait::async_trait;
use thiserror::Error;

use super::catalog::RawElement;
use super::geo::Coordinate;

/// Errors surfaced by a point-query source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointQueryError {
    /// Network-level failure reaching the service.
    #[error("point query transport failed: {message}")]
    Transport {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The request or the service timed out.
    #[error("point query timed out: {message}")]
    Timeout {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The service throttled the caller.
    #[error("point query rate limited: {message}")]
    RateLimited {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The response body could not be decoded into elements.
    #[error("point query response unusable: {message}")]
    Decode {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The request was rejected before execution.
    #[error("point query rejected: {message}")]
    InvalidRequest {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl PointQueryError {
    /// Helper for network-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for timeouts.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Helper for throttling responses.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Helper for undecodable payloads.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Helper for rejected requests.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Which catalog slice a point query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Transit stops: bus stops, tram stops, subway entrances, stations.
    Transport,
    /// Points of interest: food and drink, parks, museums.
    Places,
}

/// A point query against an external element source.
#[derive(Debug, Clone, PartialEq)]
pub struct PointQueryRequest {
    /// Centre of the query.
    pub origin: Coordinate,
    /// Search radius in metres.
    pub radius_meters: u32,
    /// Catalog slice to query for.
    pub kind: QueryKind,
}

/// Source of raw point-query elements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointQuerySource: Send + Sync {
    /// Fetch the raw elements for one query.
    ///
    /// # Errors
    ///
    /// Returns a [`PointQueryError`] when the upstream fetch fails or the
    /// response cannot be decoded. Individual elements with missing fields are
    /// not errors; they pass through and the catalog builder drops them.
    async fn fetch_elements(
        &self,
        request: &PointQueryRequest,
    ) -> Result<Vec<RawElement>, PointQueryError>;
}

/// One failed attempt against a routing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAttempt {
    /// Endpoint label, stable across configuration changes.
    pub endpoint: String,
    /// Why this endpoint did not produce usable geometry.
    pub cause: String,
}

/// Every configured routing endpoint failed.
///
/// Carries the ordered attempt log; [`RoutingUnavailable::last_cause`] exposes
/// the final underlying cause for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RoutingUnavailable {
    /// Failures in the order the endpoints were tried.
    pub attempts: Vec<RouteAttempt>,
}

impl std::fmt::Display for RoutingUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "all {} routing endpoints failed; last: {}",
            self.attempts.len(),
            self.last_cause()
        )
    }
}

impl RoutingUnavailable {
    /// The cause recorded for the final attempt.
    #[must_use]
    pub fn last_cause(&self) -> &str {
        self.attempts
            .last()
            .map_or("no endpoints configured", |attempt| attempt.cause.as_str())
    }
}

/// An ordered walking path, latitude-first.
///
/// Replaced wholesale on each new selection, never appended to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteGeometry(pub Vec<Coordinate>);

impl RouteGeometry {
    /// Path points in latitude-first order.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }
}

/// Source of walking routes between two coordinates.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Resolve a walking path from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingUnavailable`] once every configured endpoint has been
    /// tried without producing usable geometry.
    async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteGeometry, RoutingUnavailable>;
}

/// Errors surfaced by the key-value persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyValueStoreError {
    /// The value could not be written through.
    #[error("key-value write failed: {message}")]
    Write {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl KeyValueStoreError {
    /// Helper for write failures.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Synchronous string key-value persistence.
///
/// Reads are infallible by contract: an unreadable or missing value is
/// `None`, and the owning store decides how to recover.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, flushing before returning.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError`] when the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for port error helpers and in-memory fakes.

    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::transport(PointQueryError::transport("socket closed"), "point query transport failed: socket closed")]
    #[case::timeout(PointQueryError::timeout("deadline"), "point query timed out: deadline")]
    #[case::decode(PointQueryError::decode("bad json"), "point query response unusable: bad json")]
    fn point_query_errors_render_their_cause(
        #[case] error: PointQueryError,
        #[case] expected: &str,
    ) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn routing_unavailable_reports_last_cause() {
        let error = RoutingUnavailable {
            attempts: vec![
                RouteAttempt {
                    endpoint: "primary".to_owned(),
                    cause: "status 500".to_owned(),
                },
                RouteAttempt {
                    endpoint: "fallback".to_owned(),
                    cause: "empty geometry".to_owned(),
                },
            ],
        };

        assert_eq!(error.last_cause(), "empty geometry");
        assert_eq!(
            error.to_string(),
            "all 2 routing endpoints failed; last: empty geometry"
        );
    }

    #[rstest]
    fn routing_unavailable_with_no_attempts_still_renders() {
        let error = RoutingUnavailable { attempts: vec![] };
        assert_eq!(error.last_cause(), "no endpoints configured");
    }

    #[derive(Default)]
    struct InMemoryStore {
        entries: HashMap<String, String>,
    }

    impl KeyValueStore for InMemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
            self.entries.insert(key.to_owned(), value.to_owned());
            Ok(())
        }
    }

    #[rstest]
    fn key_value_round_trip() {
        let mut store = InMemoryStore::default();
        assert_eq!(store.get("missing"), None);

        store.set("k", "v").expect("write succeeds");
        assert_eq!(store.get("k"), Some("v".to_owned()));
    }
}
