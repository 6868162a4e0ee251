//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod fuzz_pattern;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database::{self, Constraint};
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
    fuzz_pattern::FuzzPattern,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client, either [`NonTx`] or [`Tx`].
#[derive(Clone, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client with a connection pool configured by
    /// the provided [`Config`].
    ///
    /// No connection is established until the first statement is executed.
    ///
    /// # Errors
    ///
    /// If the [`Config`] describes no valid connection pool.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed to be prepared or executed.
    #[display("Statement failed: {_0}")]
    Connection(connection::Error),

    /// Connection pool is misconfigured.
    #[display("Failed to create connection pool: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// Connection pool failed to provide a connection.
    #[display("Failed to acquire connection: {_0}")]
    PoolError(connection::PoolError),
}

impl Error {
    /// Returns the unique [`Constraint`] violated by the failed statement, if
    /// it's one of the known ones.
    #[must_use]
    pub fn unique_violation(&self) -> Option<Constraint> {
        let Self::Connection(e) = self else {
            return None;
        };
        e.as_db_error()
            .filter(|e| *e.code() == SqlState::UNIQUE_VIOLATION)
            .and_then(|e| e.constraint())
            .and_then(|name| name.parse().ok())
    }
}
