//! [`Command`] for creating a new [`LegalDocument`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{legal_document, media, user, LegalDocument, User},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`LegalDocument`].
#[derive(Clone, Debug)]
pub struct CreateLegalDocument {
    /// [`legal_document::Title`] of a new [`LegalDocument`].
    pub title: legal_document::Title,

    /// [`legal_document::Description`] of a new [`LegalDocument`], if any.
    pub description: Option<legal_document::Description>,

    /// [`legal_document::Category`] of a new [`LegalDocument`].
    pub category: legal_document::Category,

    /// [`legal_document::FilePath`] of a new [`LegalDocument`].
    pub file_path: legal_document::FilePath,

    /// [`media::FileName`] of a new [`LegalDocument`].
    pub file_name: media::FileName,

    /// [`legal_document::FileSize`] of a new [`LegalDocument`].
    ///
    /// Zero if [`None`].
    pub file_size: Option<legal_document::FileSize>,

    /// [`media::MimeType`] of a new [`LegalDocument`], if known.
    pub mime_type: Option<media::MimeType>,

    /// Indicator whether a new [`LegalDocument`] is published.
    ///
    /// `true` if [`None`].
    pub is_active: Option<bool>,

    /// [`legal_document::Order`] of a new [`LegalDocument`].
    ///
    /// Zero if [`None`].
    pub order: Option<legal_document::Order>,

    /// ID of the [`User`] uploading a new [`LegalDocument`].
    pub created_by: user::Id,
}

impl<Db, Ms, Gc> Command<CreateLegalDocument> for Service<Db, Ms, Gc>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<Option<read::legal_document::Entry>, legal_document::Id>,
            >,
            Ok = Option<read::legal_document::Entry>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<LegalDocument>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::legal_document::Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateLegalDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLegalDocument {
            title,
            description,
            category,
            file_path,
            file_name,
            file_size,
            mime_type,
            is_active,
            order,
            created_by,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(created_by)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::CreatorNotExists(created_by))
                .map_err(tracerr::wrap!())?,
        );

        let now = DateTime::now();
        let document = LegalDocument {
            id: legal_document::Id::new(),
            title,
            description,
            category,
            file_path,
            file_name,
            file_size: file_size.unwrap_or_default(),
            mime_type,
            is_active: is_active.unwrap_or(true),
            order: order.unwrap_or_default(),
            created_by,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        let id = document.id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(document))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.database()
            .execute(Select(By::<Option<read::legal_document::Entry>, _>::new(
                id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::LegalDocumentNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`CreateLegalDocument`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] uploading the [`LegalDocument`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    CreatorNotExists(#[error(not(source))] user::Id),

    /// Created [`LegalDocument`] disappeared before being returned.
    #[display("`LegalDocument(id: {_0})` does not exist")]
    LegalDocumentNotExists(#[error(not(source))] legal_document::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{legal_document, user},
        infra::Database as _,
        test_utils::{legal_document_draft, service, user},
        Command as _,
    };

    use super::{CreateLegalDocument, ExecutionError};

    #[tokio::test]
    async fn applies_defaults_and_joins_creator() {
        let (svc, db) = service();
        let owner = user("admin@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();

        let entry = svc
            .execute(legal_document_draft("Terms", owner.id))
            .await
            .unwrap();

        assert_eq!(entry.document.file_size, legal_document::FileSize::default());
        assert!(entry.document.is_active);
        assert_eq!(entry.document.order, legal_document::Order::default());
        assert_eq!(entry.creator.unwrap().id, owner.id);
        assert_eq!(db.snapshot().legal_documents.len(), 1);
    }

    #[tokio::test]
    async fn keeps_provided_values() {
        let (svc, db) = service();
        let owner = user("admin@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();

        let entry = svc
            .execute(CreateLegalDocument {
                file_size: legal_document::FileSize::new(2048),
                is_active: Some(false),
                order: Some(3.into()),
                ..legal_document_draft("Certificate", owner.id)
            })
            .await
            .unwrap();

        assert_eq!(
            entry.document.file_size,
            legal_document::FileSize::new(2048).unwrap(),
        );
        assert!(!entry.document.is_active);
        assert_eq!(entry.document.order, legal_document::Order::from(3));
    }

    #[tokio::test]
    async fn requires_existing_creator() {
        let (svc, db) = service();

        let err = svc
            .execute(legal_document_draft("Terms", user::Id::new()))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::CreatorNotExists(_)),
            "{err}",
        );
        assert!(db.snapshot().legal_documents.is_empty());
    }
}
