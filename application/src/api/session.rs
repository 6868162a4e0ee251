//! Session endpoints.

use axum::{Extension, Json};
use axum_extra::extract::WithRejection;
use common::DateTime;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user,
    read,
};

use crate::{api, define_error, AsError, Error, Service};

/// Request of `POST /sessions`.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    /// [`user::Email`] to sign in with.
    pub email: user::Email,

    /// Password to sign in with.
    pub password: String,
}

/// Created session.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    /// Bearer token to authorize the subsequent requests with.
    pub token: String,

    /// [`DateTime`] when the [`Created::token`] expires.
    pub expires_at: DateTime,

    /// Signed-in user.
    pub user: User,
}

/// Signed-in user.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// Summary of this [`User`].
    #[serde(flatten)]
    pub summary: read::user::Summary,

    /// [`user::Role`] of this [`User`].
    pub role: user::Role,
}

/// `POST /sessions`
///
/// # Errors
///
/// Possible error codes:
/// - `WRONG_CREDENTIALS` - provided credentials do not match any user.
#[tracing::instrument(
    skip_all,
    fields(email = %creds.email, otel.name = "POST /sessions"),
)]
pub async fn create(
    Extension(service): Extension<Service>,
    WithRejection(Json(creds), _): WithRejection<Json<Credentials>, Error>,
) -> api::Result<Created> {
    let Credentials { email, password } = creds;
    let password = user::Password::new(password)
        .ok_or_else(|| Error::from(SessionError::WrongCredentials))?;

    let output = service
        .execute(command::CreateUserSession {
            email,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(Created {
        token: output.token.as_ref().to_owned(),
        expires_at: output.expires_at.coerce(),
        user: User {
            summary: read::user::Summary::from(&output.user),
            role: output.user.role,
        },
    }))
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => {
                Some(SessionError::WrongCredentials.into())
            }
        }
    }
}

define_error! {
    enum SessionError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid email or password"]
        WrongCredentials,
    }
}
