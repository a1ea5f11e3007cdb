//! Location-aware dashboard core.
//!
//! Turns a raw device coordinate into a ranked, paginated catalog of nearby
//! transit stops and points of interest, keeps a screen-space overlay in sync
//! with that catalog under viewport transformation, resolves walking routes
//! with ordered fallback, and persists favourites across sessions.

pub mod domain;
pub mod outbound;
pub mod overlay;
