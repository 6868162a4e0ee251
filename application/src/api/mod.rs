//! HTTP API definitions.

pub mod geocode;
pub mod health;
pub mod inquiry;
pub mod legal_document;
pub mod property;
pub mod session;
pub mod upload;

use std::{fmt, str::FromStr};

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use common::pagination::PageInfo;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::{Error, Service};

/// Result of an API handler.
pub type Result<T> = std::result::Result<Success<T>, Error>;

/// Successful API response, rendered as
/// `{"success": true, "data": .., "message": ..}`.
#[derive(Clone, Debug)]
pub struct Success<T> {
    /// Payload of this [`Success`].
    data: Option<T>,

    /// Human-readable message of this [`Success`].
    message: Option<String>,
}

impl<T> Success<T> {
    /// Creates a new [`Success`] carrying the provided `data`.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
        }
    }

    /// Attaches the provided `message` to this [`Success`].
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Success<()> {
    /// Creates a new [`Success`] carrying the provided `message` only.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        /// Body of a successful response.
        #[derive(Serialize)]
        struct Body<T> {
            /// Always `true`.
            success: bool,

            /// Payload.
            #[serde(skip_serializing_if = "Option::is_none")]
            data: Option<T>,

            /// Human-readable message.
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<String>,
        }

        Json(Body {
            success: true,
            data: self.data,
            message: self.message,
        })
        .into_response()
    }
}

/// Pagination metadata of a listing.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of matching items.
    pub total: u64,

    /// Current page number, starting from `1`.
    pub page: u32,

    /// Page size.
    pub limit: u32,

    /// Total number of pages.
    pub total_pages: u64,

    /// Indicator whether a next page exists.
    pub has_next: bool,

    /// Indicator whether a previous page exists.
    pub has_prev: bool,
}

impl From<PageInfo> for Pagination {
    fn from(info: PageInfo) -> Self {
        let PageInfo {
            total,
            page,
            limit,
            total_pages,
            has_next,
            has_prev,
        } = info;
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next,
            has_prev,
        }
    }
}

/// Creates a new [`Router`] serving the whole API with the provided
/// [`Service`].
pub fn router(service: Service) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/sessions", post(session::create))
        .route("/properties", get(property::list).post(property::create))
        .route(
            "/properties/:id",
            get(property::get)
                .put(property::update)
                .delete(property::delete),
        )
        .route("/inquiries", get(inquiry::list).post(inquiry::create))
        .route("/inquiries/:id", patch(inquiry::update_status))
        .route(
            "/legal-documents",
            get(legal_document::list).post(legal_document::create),
        )
        .route(
            "/legal-documents/:id",
            get(legal_document::get)
                .put(legal_document::update)
                .delete(legal_document::delete),
        )
        .route(
            "/upload",
            post(upload::images)
                .delete(upload::destroy)
                .layer(DefaultBodyLimit::max(upload::BODY_LIMIT)),
        )
        .route(
            "/upload-document",
            post(upload::document)
                .layer(DefaultBodyLimit::max(upload::BODY_LIMIT)),
        )
        .route("/geocode", get(geocode::reverse).post(geocode::forward))
        .layer(Extension(service))
}

/// Deserializes an optional value via its [`FromStr`] implementation.
pub(crate) fn from_str<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: fmt::Display,
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse().map_err(D::Error::custom))
        .transpose()
}

/// Deserializes an optional text value via its [`FromStr`] implementation,
/// treating a blank string as an absent value.
///
/// Must be used along with `#[serde(default)]`.
pub(crate) fn non_empty<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: fmt::Display,
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse().map_err(D::Error::custom))
        .transpose()
}

/// Raw JSON number, which may also be sent as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric<N> {
    /// Plain JSON number.
    Number(N),

    /// Number encoded as a string.
    Text(String),
}

impl<N: FromStr> Numeric<N> {
    /// Extracts the number out of this [`Numeric`], returning [`None`] for a
    /// blank string.
    fn into_number(self) -> std::result::Result<Option<N>, N::Err> {
        match self {
            Self::Number(n) => Ok(Some(n)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s.trim().parse().map(Some),
        }
    }
}

/// Deserializes an optional integer value, accepting both a JSON number and
/// a string with an integer. A blank string is an absent value.
///
/// Must be used along with `#[serde(default)]`.
pub(crate) fn integer<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    T: TryFrom<i64>,
    T::Error: fmt::Display,
    D: Deserializer<'de>,
{
    numeric::<i64, T, D>(deserializer)
}

/// Deserializes an optional floating point value, accepting both a JSON
/// number and a string with a number. A blank string is an absent value.
///
/// Must be used along with `#[serde(default)]`.
pub(crate) fn float<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    T: TryFrom<f64>,
    T::Error: fmt::Display,
    D: Deserializer<'de>,
{
    numeric::<f64, T, D>(deserializer)
}

/// Deserializes an optional [`Numeric`] and converts it into `T`.
fn numeric<'de, N, T, D>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    N: Deserialize<'de> + FromStr,
    N::Err: fmt::Display,
    T: TryFrom<N>,
    T::Error: fmt::Display,
    D: Deserializer<'de>,
{
    Option::<Numeric<N>>::deserialize(deserializer)?
        .map(Numeric::into_number)
        .transpose()
        .map_err(D::Error::custom)?
        .flatten()
        .map(|n| T::try_from(n).map_err(D::Error::custom))
        .transpose()
}

/// Deserializes a field which is able to distinguish an explicit `null` from
/// an absent value.
///
/// Must be used along with `#[serde(default)]`, so an absent field becomes
/// [`None`], while `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod spec {
    use axum::{body, response::IntoResponse as _};

    use serde::Deserialize;
    use service::domain::property;

    use super::Success;

    #[derive(Debug, Deserialize)]
    struct Lenient {
        #[serde(default, deserialize_with = "super::non_empty")]
        address: Option<property::Address>,

        #[serde(default, deserialize_with = "super::integer")]
        price: Option<property::Price>,

        #[serde(default, deserialize_with = "super::float")]
        latitude: Option<property::Latitude>,
    }

    fn lenient(
        value: serde_json::Value,
    ) -> Result<Lenient, serde_json::Error> {
        serde_json::from_value(value)
    }

    async fn json(s: Success<impl serde::Serialize>) -> serde_json::Value {
        let resp = s.into_response();
        assert_eq!(resp.status(), http::StatusCode::OK);
        let bytes = body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn renders_success_envelope() {
        assert_eq!(
            json(Success::new([1, 2]).with_message("done")).await,
            serde_json::json!({
                "success": true,
                "data": [1, 2],
                "message": "done",
            }),
        );
        assert_eq!(
            json(Success::message("deleted")).await,
            serde_json::json!({"success": true, "message": "deleted"}),
        );
    }

    #[test]
    fn treats_blank_strings_as_absent() {
        let input = lenient(serde_json::json!({
            "address": "",
            "price": "",
            "latitude": "  ",
        }))
        .unwrap();

        assert!(input.address.is_none());
        assert!(input.price.is_none());
        assert!(input.latitude.is_none());

        let input = lenient(serde_json::json!({
            "address": null,
            "price": null,
        }))
        .unwrap();
        assert!(input.address.is_none());
        assert!(input.price.is_none());
    }

    #[test]
    fn accepts_numbers_as_strings() {
        let input = lenient(serde_json::json!({
            "address": " 12 Admiralty Way ",
            "price": "10000000",
            "latitude": "6.4474",
        }))
        .unwrap();

        assert_eq!(
            input.address.as_ref().map(AsRef::as_ref),
            Some("12 Admiralty Way"),
        );
        assert_eq!(input.price, property::Price::new(10_000_000));
        assert_eq!(input.latitude, property::Latitude::new(6.4474));

        let input = lenient(serde_json::json!({
            "price": 5,
            "latitude": -1,
        }))
        .unwrap();
        assert_eq!(input.price, property::Price::new(5));
        assert_eq!(input.latitude, property::Latitude::new(-1.0));
    }

    #[test]
    fn rejects_malformed_numbers() {
        for body in [
            serde_json::json!({"price": "cheap"}),
            serde_json::json!({"price": "-5"}),
            serde_json::json!({"price": -5}),
            serde_json::json!({"price": true}),
            serde_json::json!({"latitude": "91"}),
        ] {
            assert!(lenient(body.clone()).is_err(), "`{body}` is accepted");
        }
    }
}
