//! [`Command`] for deleting a [`Property`].

use common::operations::{
    By, Commit, Delete, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use futures::future;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{media, property, Property},
    infra::{database, media as media_storage, Database, MediaStorage},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Property`].
///
/// Its [`property::Image`]s, [`property::Feature`]s and [`property::View`]s
/// are deleted too, while the [`Inquiry`]s about it are kept detached.
///
/// Once deleted, remote media of its [`property::Image`]s is destroyed on a
/// best-effort basis, if [`Config::purge_media_on_delete`] is enabled.
///
/// [`Config::purge_media_on_delete`]: crate::Config::purge_media_on_delete
/// [`Inquiry`]: crate::domain::Inquiry
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to delete.
    pub id: property::Id,
}

impl<Db, Ms, Gc> Command<DeleteProperty> for Service<Db, Ms, Gc>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<property::Image>, property::Id>>,
            Ok = Vec<property::Image>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
    Ms: MediaStorage<
        Delete<media::PublicId>,
        Ok = bool,
        Err = Traced<media_storage::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        drop(
            tx.execute(Select(By::<Option<Property>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::PropertyNotExists(id))
                .map_err(tracerr::wrap!())?,
        );
        let images = tx
            .execute(Select(By::<Vec<property::Image>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::<Property, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if self.config().purge_media_on_delete {
            drop(
                future::join_all(images.into_iter().map(|image| async move {
                    let public_id = image.public_id;
                    match self.media().execute(Delete(public_id.clone())).await
                    {
                        Ok(true) => {}
                        Ok(false) => log::warn!(
                            "remote media `{public_id}` of deleted \
                             `Property(id: {id})` is not destroyed",
                        ),
                        Err(e) => log::warn!(
                            "failed to destroy remote media `{public_id}` of \
                             deleted `Property(id: {id})`: {e}",
                        ),
                    }
                }))
                .await,
            );
        }

        Ok(())
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] with the provided ID doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
