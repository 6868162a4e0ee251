//! [`Connection`] definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Parameters bound to a SQL statement.
pub type Params<'p> = [&'p (dyn ToSql + Sync)];

/// Postgres database connection.
///
/// Every distinct SQL text is prepared once per physical connection and kept
/// in its statement cache, so it must come from a bounded set of statements.
pub trait Connection {
    /// Queries the provided `sql` with the given `params` and returns the
    /// resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to prepare or run the statement.
    fn query(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>;

    /// Queries the provided `sql` with the given `params` and returns at most
    /// one resulting row.
    ///
    /// # Errors
    ///
    /// If failed to prepare or run the statement, or it returned more than
    /// one row.
    fn query_opt(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>;

    /// Executes the provided `sql` with the given `params` and returns the
    /// number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to prepare or run the statement.
    fn exec(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>;
}

/// Transactional Postgres database [`Connection`].
#[self_referencing]
pub struct Tx {
    /// [`NonTx`] [`Connection`] the transaction was started from.
    non_tx: NonTx,

    /// Transaction started in the [`Connection`], until committed.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx").finish_non_exhaustive()
    }
}

impl Tx {
    /// Returns the open [`Transaction`] of this [`Tx`].
    ///
    /// [`Transaction`]: deadpool_postgres::Transaction
    fn tx(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("already committed"))
    }

    /// Begins a new [`Tx`] on the provided [`NonTx`] [`Connection`].
    ///
    /// # Errors
    ///
    /// If failed to issue `BEGIN`.
    pub async fn begin(client: NonTx) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(client, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If failed to issue `COMMIT`.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        self.with_tx_mut(|tx| tx.take())
            .expect("already committed")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        cached::query(self, sql, params).await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        cached::query_opt(self, sql, params).await
    }

    async fn exec(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        cached::exec(self, sql, params).await
    }
}

impl Connection for Tx {
    async fn query(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        cached::query(self.tx(), sql, params).await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        cached::query_opt(self.tx(), sql, params).await
    }

    async fn exec(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        cached::exec(self.tx(), sql, params).await
    }
}

/// Statement execution through the statement cache of a [`GenericClient`].
mod cached {
    use deadpool_postgres::GenericClient;
    use tokio_postgres::Row;
    use tracerr::Traced;

    use crate::infra::database::{self, postgres};

    use super::Params;

    /// Prepares (or reuses) the `sql` statement and queries its rows.
    pub(super) async fn query<C: GenericClient>(
        client: &C,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let stmt = client
            .prepare_cached(sql)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        client
            .query(&stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Prepares (or reuses) the `sql` statement and queries its single row,
    /// if any.
    pub(super) async fn query_opt<C: GenericClient>(
        client: &C,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let stmt = client
            .prepare_cached(sql)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        client
            .query_opt(&stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Prepares (or reuses) the `sql` statement and executes it.
    pub(super) async fn exec<C: GenericClient>(
        client: &C,
        sql: &str,
        params: &Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        let stmt = client
            .prepare_cached(sql)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        client
            .execute(&stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
