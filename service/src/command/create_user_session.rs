//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// [`Email`] of a [`User`].
    pub email: user::Email,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, Ms, Gc> Command<CreateUserSession> for Service<Db, Ms, Gc>
where
    Db: for<'e> Database<
        Select<By<Option<User>, &'e user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { email, password } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WrongCredentials)
            .map_err(tracerr::wrap!())?;
        if !user.password_hash.verify(password.expose_secret()) {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        let expires_at =
            (DateTime::now() + self.config().session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    #[from]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// Provided credentials don't match any [`User`].
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{operations::Insert, DateTime};
    use secrecy::SecretBox;

    use crate::{
        command::AuthorizeUserSession,
        domain::user,
        infra::Database as _,
        test_utils::{service, user, PASSWORD},
        Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    fn credentials(email: &str, password: &str) -> CreateUserSession {
        CreateUserSession {
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new(password).unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn issues_token_verified_by_authorization() {
        let (svc, db) = service();
        let admin = user("admin@sog.ng");
        db.execute(Insert(admin.clone())).await.unwrap();

        let out = svc
            .execute(credentials("admin@sog.ng", PASSWORD))
            .await
            .unwrap();

        assert_eq!(out.user.id, admin.id);
        let ttl = out.expires_at.coerce::<()>() - DateTime::now();
        assert!(ttl > Duration::from_secs(11 * 60 * 60), "{ttl:?}");

        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(session.user_id, admin.id);
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let (svc, db) = service();
        db.execute(Insert(user("admin@sog.ng"))).await.unwrap();

        for (email, password) in [
            ("admin@sog.ng", "wrong horse"),
            ("nobody@sog.ng", PASSWORD),
        ] {
            let err = svc
                .execute(credentials(email, password))
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), ExecutionError::WrongCredentials),
                "{err}",
            );
        }
    }
}
