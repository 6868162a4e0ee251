//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
#[cfg(test)]
mod test_utils;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::{Database, Geocoder, MediaStorage};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Duration`] a created [`domain::user::Session`] is valid for.
    pub session_ttl: Duration,

    /// Indicator whether remote media of a deleted [`domain::Property`]
    /// should be destroyed.
    pub purge_media_on_delete: bool,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Ms, Gc> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`MediaStorage`] of this [`Service`].
    media: Ms,

    /// [`Geocoder`] of this [`Service`].
    geocoder: Gc,
}

impl<Db, Ms, Gc> Service<Db, Ms, Gc> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, media: Ms, geocoder: Gc) -> Self {
        Self {
            config,
            database,
            media,
            geocoder,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`MediaStorage`] of this [`Service`].
    #[must_use]
    pub fn media(&self) -> &Ms {
        &self.media
    }

    /// Returns [`Geocoder`] of this [`Service`].
    #[must_use]
    pub fn geocoder(&self) -> &Gc {
        &self.geocoder
    }
}
