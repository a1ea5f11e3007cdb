//! Outbound adapters implementing the domain's driven ports.

pub mod overpass;
pub mod persistence;
pub mod routing;
