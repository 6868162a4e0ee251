//! Request context extractors.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_client_ip::InsecureClientIp;
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use service::{
    command::{self, Command as _},
    domain::{property::view, user, user::session},
};

use crate::{define_error, AsError, Error, Service};

/// Authenticated administrator session.
///
/// Extracting it rejects the request unless a valid
/// `Authorization: Bearer <token>` header is provided.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the [`user::User`] owning this [`Session`].
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::AuthorizationRequired.into()
                } else {
                    e.into_error()
                }
            })?;

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token =
            unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };

        service
            .execute(command::AuthorizeUserSession { token })
            .await
            .map(|s| Self {
                user_id: s.user_id,
                expires_at: s.expires_at.coerce(),
            })
            .map_err(AsError::into_error)
    }
}

/// Visitor performing the request, as reported by the proxy headers.
#[derive(Clone, Debug)]
pub struct Visitor {
    /// IP address of this [`Visitor`].
    pub ip_address: view::IpAddress,

    /// `User-Agent` of this [`Visitor`].
    pub user_agent: view::UserAgent,
}

#[async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let ip_address = InsecureClientIp::from(&parts.headers, &parts.extensions)
            .map(|ip| view::IpAddress::from(ip.0.to_string()))
            .unwrap_or_default();
        let user_agent = parts
            .headers
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(|ua| view::UserAgent::from(ua.to_owned()))
            .unwrap_or_default();

        Ok(Self {
            ip_address,
            user_agent,
        })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}

#[cfg(test)]
mod spec {
    use axum::extract::FromRequestParts as _;
    use service::domain::property::view;

    use super::Visitor;

    async fn visitor(req: http::Request<()>) -> Visitor {
        let (mut parts, ()) = req.into_parts();
        Visitor::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_forwarded_address_and_agent() {
        let v = visitor(
            http::Request::builder()
                .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
                .header(http::header::USER_AGENT, "curl/8.0")
                .body(())
                .unwrap(),
        )
        .await;

        assert_eq!(v.ip_address.as_ref(), "203.0.113.7");
        assert_eq!(v.user_agent.as_ref(), "curl/8.0");
    }

    #[tokio::test]
    async fn falls_back_without_headers() {
        let v = visitor(http::Request::builder().body(()).unwrap()).await;

        assert_eq!(v.ip_address.as_ref(), view::IpAddress::FALLBACK);
        assert_eq!(v.user_agent.as_ref(), "");
    }
}
