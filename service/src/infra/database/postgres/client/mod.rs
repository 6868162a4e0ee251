//! Postgres database client definitions.

pub mod non_tx;
pub mod tx;

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection},
};

pub use self::{non_tx::NonTx, tx::Tx};

/// Acquires a new [`connection::NonTx`] from the provided
/// [`connection::Pool`].
///
/// # Errors
///
/// If the [`connection::Pool`] failed to provide a connection.
pub(crate) async fn acquire(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Lazily initialized connection, shared between clones of a client.
#[derive(Debug)]
struct Slot<C>(Arc<RwLock<Option<C>>>);

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> Slot<C> {
    /// Creates a new empty [`Slot`].
    fn empty() -> Self {
        Self(Arc::new(RwLock::new(None)))
    }

    /// Returns the connection held in this [`Slot`], initializing it with the
    /// provided `init` if there is none yet.
    async fn get_or_try_init<F, Fut>(
        &self,
        init: F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let guard = self.0.read().await;
        let guard = if guard.is_some() {
            guard
        } else {
            drop(guard);

            let mut guard = self.0.write().await;
            if guard.is_none() {
                *guard = Some(init().await.map_err(tracerr::wrap!())?);
            }
            guard.downgrade()
        };

        Ok(RwLockReadGuard::map(guard, |conn| {
            conn.as_ref()
                .expect("connection cannot be dropped while guard is alive")
        }))
    }

    /// Takes the connection out of this [`Slot`], leaving it empty.
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}

/// Implements [`Connection`] for a client by forwarding every statement to
/// the connection returned by its `connection()` method.
///
/// [`Connection`]: postgres::Connection
macro_rules! forward_connection {
    ($client:ty) => {
        impl $crate::infra::database::postgres::Connection for $client {
            async fn query(
                &self,
                sql: &str,
                params: &$crate::infra::database::postgres::connection::Params<'_>,
            ) -> Result<
                Vec<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            > {
                self.connection()
                    .await
                    .map_err(::tracerr::wrap!())?
                    .query(sql, params)
                    .await
                    .map_err(::tracerr::wrap!())
            }

            async fn query_opt(
                &self,
                sql: &str,
                params: &$crate::infra::database::postgres::connection::Params<'_>,
            ) -> Result<
                Option<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            > {
                self.connection()
                    .await
                    .map_err(::tracerr::wrap!())?
                    .query_opt(sql, params)
                    .await
                    .map_err(::tracerr::wrap!())
            }

            async fn exec(
                &self,
                sql: &str,
                params: &$crate::infra::database::postgres::connection::Params<'_>,
            ) -> Result<u64, ::tracerr::Traced<$crate::infra::database::Error>>
            {
                self.connection()
                    .await
                    .map_err(::tracerr::wrap!())?
                    .exec(sql, params)
                    .await
                    .map_err(::tracerr::wrap!())
            }
        }
    };
}
use forward_connection;
