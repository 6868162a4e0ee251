//! [`Command`] for editing an existing [`LegalDocument`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{legal_document, media, LegalDocument},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for editing an existing [`LegalDocument`].
///
/// Fields being [`None`] keep their current values.
#[derive(Clone, Debug, Default)]
pub struct UpdateLegalDocument {
    /// ID of the [`LegalDocument`] to edit.
    pub id: legal_document::Id,

    /// New [`legal_document::Title`].
    pub title: Option<legal_document::Title>,

    /// New [`legal_document::Description`], or [`Some`]`(`[`None`]`)` to
    /// clear it.
    pub description: Option<Option<legal_document::Description>>,

    /// New [`legal_document::Category`].
    pub category: Option<legal_document::Category>,

    /// New [`legal_document::FilePath`].
    pub file_path: Option<legal_document::FilePath>,

    /// New [`media::FileName`].
    pub file_name: Option<media::FileName>,

    /// New [`legal_document::FileSize`].
    pub file_size: Option<legal_document::FileSize>,

    /// New [`media::MimeType`], or [`Some`]`(`[`None`]`)` to clear it.
    pub mime_type: Option<Option<media::MimeType>>,

    /// New publication indicator.
    pub is_active: Option<bool>,

    /// New [`legal_document::Order`].
    pub order: Option<legal_document::Order>,
}

impl<Db, Ms, Gc> Command<UpdateLegalDocument> for Service<Db, Ms, Gc>
where
    Db: Database<
            Select<
                By<Option<read::legal_document::Entry>, legal_document::Id>,
            >,
            Ok = Option<read::legal_document::Entry>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<LegalDocument>, legal_document::Id>>,
            Ok = Option<LegalDocument>,
            Err = Traced<database::Error>,
        > + Database<Update<LegalDocument>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::legal_document::Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateLegalDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let id = cmd.id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut document = tx
            .execute(Select(By::<Option<LegalDocument>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::LegalDocumentNotExists(id))
            .map_err(tracerr::wrap!())?;

        cmd.apply(&mut document);
        document.updated_at = DateTime::now().coerce();

        tx.execute(Update(document))
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

impl UpdateLegalDocument {
    /// Overwrites the provided [`LegalDocument`] with the present values.
    fn apply(self, doc: &mut LegalDocument) {
        let Self {
            id: _,
            title,
            description,
            category,
            file_path,
            file_name,
            file_size,
            mime_type,
            is_active,
            order,
        } = self;

        if let Some(title) = title {
            doc.title = title;
        }
        if let Some(description) = description {
            doc.description = description;
        }
        if let Some(category) = category {
            doc.category = category;
        }
        if let Some(path) = file_path {
            doc.file_path = path;
        }
        if let Some(name) = file_name {
            doc.file_name = name;
        }
        if let Some(size) = file_size {
            doc.file_size = size;
        }
        if let Some(mime) = mime_type {
            doc.mime_type = mime;
        }
        if let Some(active) = is_active {
            doc.is_active = active;
        }
        if let Some(order) = order {
            doc.order = order;
        }
    }
}

/// Error of [`UpdateLegalDocument`] [`Command`] execution.
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

    use super::{ExecutionError, UpdateLegalDocument};

    #[tokio::test]
    async fn keeps_absent_fields() {
        let (svc, db) = service();
        let owner = user("admin@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        let created = svc
            .execute(legal_document_draft("Terms", owner.id))
            .await
            .unwrap()
            .document;

        let updated = svc
            .execute(UpdateLegalDocument {
                id: created.id,
                title: legal_document::Title::new("Terms of Service"),
                is_active: Some(false),
                description: Some(None),
                ..UpdateLegalDocument::default()
            })
            .await
            .unwrap()
            .document;

        assert_eq!(updated.title.as_ref(), "Terms of Service");
        assert!(!updated.is_active);
        assert_eq!(updated.description, None);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.file_path, created.file_path);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn fails_on_missing_document() {
        let (svc, _) = service();

        let err = svc
            .execute(UpdateLegalDocument {
                id: legal_document::Id::new(),
                is_active: Some(true),
                ..UpdateLegalDocument::default()
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::LegalDocumentNotExists(_)),
            "{err}",
        );
    }
}
