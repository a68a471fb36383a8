//! Linode REST API client for cloudmcp.
//!
//! A [`LinodeClient`] is bound to exactly one bearer token and base URL.
//! Every request is reported to an optional [`RequestObserver`] so callers
//! can attach metrics without this crate depending on a metrics library.

pub mod client;
pub mod error;
pub mod resources;

pub use client::{
    DEFAULT_BASE_URL, LinodeClient, LinodeClientBuilder, Page, RequestObserver, RequestSpan,
    check_path_identifier,
};
pub use error::LinodeError;
pub use resources::*;
