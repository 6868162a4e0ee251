//! [`Command`] for deleting a [`LegalDocument`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{legal_document, LegalDocument},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`LegalDocument`].
///
/// The remote file isn't touched.
#[derive(Clone, Copy, Debug)]
pub struct DeleteLegalDocument {
    /// ID of the [`LegalDocument`] to delete.
    pub id: legal_document::Id,
}

impl<Db, Ms, Gc> Command<DeleteLegalDocument> for Service<Db, Ms, Gc>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<LegalDocument>, legal_document::Id>>,
            Ok = Option<LegalDocument>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<LegalDocument, legal_document::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = LegalDocument;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteLegalDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteLegalDocument { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let document = tx
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::LegalDocumentNotExists(id))
            .map_err(tracerr::wrap!())?;
        tx.execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(document)
    }
}

/// Error of [`DeleteLegalDocument`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`LegalDocument`] with the provided ID doesn't exist.
    #[display("`LegalDocument(id: {_0})` does not exist")]
    LegalDocumentNotExists(#[error(not(source))] legal_document::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::legal_document,
        infra::Database as _,
        test_utils::{legal_document_draft, service, user},
        Command as _,
    };

    use super::{DeleteLegalDocument, ExecutionError};

    #[tokio::test]
    async fn deletes_existing_only() {
        let (svc, db) = service();
        let owner = user("admin@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        let id = svc
            .execute(legal_document_draft("Terms", owner.id))
            .await
            .unwrap()
            .document
            .id;

        let deleted = svc.execute(DeleteLegalDocument { id }).await.unwrap();
        assert_eq!(deleted.id, id);
        assert!(db.snapshot().legal_documents.is_empty());

        let err = svc.execute(DeleteLegalDocument { id }).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::LegalDocumentNotExists(_)),
            "{err}",
        );

        let err = svc
            .execute(DeleteLegalDocument {
                id: legal_document::Id::new(),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::LegalDocumentNotExists(_)),
            "{err}",
        );
    }
}
