//! Routing outbound adapter.
//!
//! This module provides the ordered-fallback HTTP implementation of the
//! `RouteSource` port.

mod dto;
mod http_resolver;

pub use http_resolver::{
    HttpRouteResolver, RouteEndpoint, RouteResolverBuildError, DEFAULT_FALLBACK_ENDPOINT,
    DEFAULT_PRIMARY_ENDPOINT,
};
