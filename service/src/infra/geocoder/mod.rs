//! [`Geocoder`]-related implementations.

pub mod google;

use derive_more::{Display, Error as StdError, From};

pub use self::google::GoogleMaps;

/// Geocoding operation.
pub use common::Handler as Geocoder;

/// [`Geocoder`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// API key of the [`Geocoder`] is not configured.
    #[display("Geocoding service not configured")]
    NotConfigured,

    /// HTTP request to the [`Geocoder`] failed.
    #[display("HTTP request failed: {_0}")]
    #[from]
    Http(reqwest::Error),

    /// [`Geocoder`] rejected the request.
    #[display("Geocoder rejected the request: {_0}")]
    Rejected(#[error(not(source))] String),
}
