//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// HTTP API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] with the provided `code`, `status_code` and
    /// `message`.
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status_code,
            message: message.into(),
            backtrace: None,
        }
    }

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg.to_string(),
        )
    }

    /// Creates a new [`Error`] representing a malformed request.
    #[must_use]
    pub fn bad_request(code: Code, msg: &impl ToString) -> Self {
        Self::new(code, http::StatusCode::BAD_REQUEST, msg.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        /// Body of a failed response.
        #[derive(Serialize)]
        struct Body<'e> {
            /// Always `false`.
            success: bool,

            /// Human-readable description of the [`Error`].
            error: &'e str,

            /// Machine-readable [`Error`] code.
            code: Code,
        }

        if self.status_code.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("[{}]: {}", self.code, self.message);
        }

        (
            self.status_code,
            Json(Body {
                success: false,
                error: &self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError + fmt::Display> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }

    fn as_error(&self) -> Error {
        let mut error = self.as_ref().as_error();
        error.backtrace = Some(self.trace().clone());
        error
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request("BAD_REQUEST", self))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        let message = self.body_text();
        Some(
            if matches!(self, Self::JsonDataError(_))
                && message.contains("missing field")
            {
                Error::bad_request("MISSING_FIELDS", &message)
            } else if matches!(
                self,
                Self::JsonDataError(_) | Self::JsonSyntaxError(_),
            ) {
                Error::bad_request("INVALID_BODY", &message)
            } else {
                Error::new("INVALID_BODY", self.status(), message)
            },
        )
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request("INVALID_QUERY", &self.body_text()))
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new("INVALID_PATH", self.status(), self.body_text()))
    }
}

impl AsError for MultipartRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new("INVALID_BODY", self.status(), self.body_text()))
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new("INVALID_BODY", self.status(), self.body_text()))
    }
}

/// Implements [`From`] an extractor rejection for [`Error`], so the rejection
/// is rendered as an [`Error`] response.
macro_rules! impl_from_rejection {
    ($($rejection:ty),* $(,)?) => {$(
        impl From<$rejection> for Error {
            fn from(rejection: $rejection) -> Self {
                rejection.into_error()
            }
        }
    )*};
}

impl_from_rejection!(
    JsonRejection,
    MultipartError,
    MultipartRejection,
    PathRejection,
    QueryRejection,
    TypedHeaderRejection,
);

#[cfg(test)]
mod spec {
    use axum::{
        body::{self, Body},
        extract::FromRequest as _,
        response::IntoResponse as _,
        Json,
    };

    use super::Error;
    use crate::api::property;

    async fn reject(body: &'static str) -> Error {
        let req = http::Request::post("/properties")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<property::Input>::from_request(req, &())
            .await
            .unwrap_err()
            .into()
    }

    #[tokio::test]
    async fn renders_failure_envelope() {
        let resp = Error::new(
            "PROPERTY_NOT_EXISTS",
            http::StatusCode::NOT_FOUND,
            "Property not found",
        )
        .into_response();

        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        let bytes = body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": "Property not found",
                "code": "PROPERTY_NOT_EXISTS",
            }),
        );
    }

    #[test]
    fn displays_code_and_message() {
        let err = Error::internal(&"boom");

        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "[INTERNAL_SERVER_ERROR]: boom");
    }

    #[tokio::test]
    async fn maps_missing_fields_to_bad_request() {
        let err = reject(r#"{"title":"Sea View Duplex","price":1}"#).await;

        assert_eq!(err.code, "MISSING_FIELDS");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("missing field"), "{}", err.message);
    }

    #[tokio::test]
    async fn maps_malformed_body_to_bad_request() {
        for body in [
            "{",
            r#"{"title":"Sea View Duplex","description":"Home",
                "price":"cheap","location":"Lekki","type":"DUPLEX"}"#,
        ] {
            let err = reject(body).await;

            assert_eq!(err.code, "INVALID_BODY", "`{body}`");
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        }
    }
}
