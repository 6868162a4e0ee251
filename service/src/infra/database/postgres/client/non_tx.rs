//! [`NonTx`] client definitions.

use tokio::sync::RwLockReadGuard;
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{connection, Connection as _},
};

use super::{acquire, forward_connection, Slot};

/// Non-transactional Postgres database client.
///
/// Clones share the same pooled connection, acquired on the first statement.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire connections from.
    pub(crate) pool: connection::Pool,

    /// Connection used for auto-committed statements.
    conn: Slot<connection::NonTx>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Slot::empty(),
        }
    }

    /// Returns the pooled connection of this [`NonTx`] client, acquiring it if
    /// necessary.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.conn.get_or_try_init(|| acquire(&self.pool)).await
    }
}

forward_connection!(NonTx);
