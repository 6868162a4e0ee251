//! [`Command`] for changing [`inquiry::Status`] of an [`Inquiry`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inquiry, Inquiry},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for changing [`inquiry::Status`] of an [`Inquiry`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateInquiryStatus {
    /// ID of the [`Inquiry`] to update.
    pub id: inquiry::Id,

    /// New [`inquiry::Status`] of the [`Inquiry`].
    pub status: inquiry::Status,
}

impl<Db, Ms, Gc> Command<UpdateInquiryStatus> for Service<Db, Ms, Gc>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Inquiry>, inquiry::Id>>,
            Ok = Option<Inquiry>,
            Err = Traced<database::Error>,
        > + Database<Update<Inquiry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Inquiry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateInquiryStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateInquiryStatus { id, status } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut inquiry = tx
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::InquiryNotExists(id))
            .map_err(tracerr::wrap!())?;

        inquiry.status = status;
        inquiry.updated_at = DateTime::now().coerce();

        tx.execute(Update(inquiry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(inquiry)
    }
}

/// Error of [`UpdateInquiryStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Inquiry`] with the provided ID doesn't exist.
    #[display("`Inquiry(id: {_0})` does not exist")]
    InquiryNotExists(#[error(not(source))] inquiry::Id),
}
