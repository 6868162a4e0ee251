//! [`Tx`] client definitions.

use tokio::sync::RwLockReadGuard;
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{connection, Connection as _},
};

use super::{acquire, forward_connection, Slot};

/// Transactional Postgres database client.
///
/// `BEGIN` is issued on a dedicated pooled connection right before the first
/// statement, so a [`Tx`] which executes nothing never touches the database.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to acquire the connection from.
    pool: connection::Pool,

    /// Open transaction, until committed.
    tx: Slot<connection::Tx>,
}

impl Tx {
    /// Creates a new [`Tx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn new(pool: connection::Pool) -> Self {
        Self {
            pool,
            tx: Slot::empty(),
        }
    }

    /// Returns the open transaction of this [`Tx`] client, beginning it if
    /// necessary.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.tx
            .get_or_try_init(|| async {
                let conn = acquire(&self.pool).await.map_err(tracerr::wrap!())?;
                connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
            })
            .await
    }

    /// Commits this [`Tx`] client.
    ///
    /// Statements executed afterwards run in a new transaction.
    ///
    /// # Errors
    ///
    /// If failed to issue `COMMIT`.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.tx.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            // Nothing was executed, so there is nothing to commit.
            None => Ok(()),
        }
    }
}

forward_connection!(Tx);
