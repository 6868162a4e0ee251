//! Legal document endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{legal_document, media, user, LegalDocument as Entity},
    query::{self, Query as _},
    read,
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Legal document as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalDocument {
    /// ID of this [`LegalDocument`].
    pub id: legal_document::Id,

    /// Title of this [`LegalDocument`].
    pub title: legal_document::Title,

    /// Description of this [`LegalDocument`].
    pub description: Option<legal_document::Description>,

    /// Category of this [`LegalDocument`].
    pub category: legal_document::Category,

    /// Path or URL this [`LegalDocument`] is downloadable from.
    pub file_path: legal_document::FilePath,

    /// Original file name.
    pub file_name: media::FileName,

    /// File size in bytes.
    pub file_size: legal_document::FileSize,

    /// MIME type of the file.
    pub mime_type: Option<media::MimeType>,

    /// Indicator whether this [`LegalDocument`] is published.
    pub is_active: bool,

    /// Display order of this [`LegalDocument`].
    pub order: legal_document::Order,

    /// ID of the user who uploaded this [`LegalDocument`].
    pub created_by_id: user::Id,

    /// When this [`LegalDocument`] was created.
    pub created_at: legal_document::CreationDateTime,

    /// When this [`LegalDocument`] was modified last time.
    pub updated_at: legal_document::ModificationDateTime,

    /// Uploader of this [`LegalDocument`], if they still exist.
    pub created_by: Option<read::user::Summary>,
}

impl From<read::legal_document::Entry> for LegalDocument {
    fn from(entry: read::legal_document::Entry) -> Self {
        let read::legal_document::Entry { document, creator } = entry;
        Self {
            created_by: creator,
            ..Self::from(document)
        }
    }
}

impl From<Entity> for LegalDocument {
    fn from(d: Entity) -> Self {
        let Entity {
            id,
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
            created_at,
            updated_at,
        } = d;

        Self {
            id,
            title,
            description,
            category,
            file_path,
            file_name,
            file_size,
            mime_type,
            is_active,
            order,
            created_by_id: created_by,
            created_at,
            updated_at,
            created_by: None,
        }
    }
}

/// Query parameters of `GET /legal-documents`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    /// Category to match. Empty matches any.
    pub category: Option<String>,

    /// Indicator whether only published documents should be listed.
    pub active_only: Option<bool>,
}

impl ListParams {
    /// Converts these [`ListParams`] into a
    /// [`read::legal_document::list::Filter`].
    ///
    /// # Errors
    ///
    /// If `category` is malformed.
    pub fn into_filter(
        self,
    ) -> Result<read::legal_document::list::Filter, Error> {
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .map(|c| {
                c.parse::<legal_document::Category>().map_err(|e| {
                    Error::bad_request("INVALID_QUERY", &e)
                })
            })
            .transpose()?;

        Ok(read::legal_document::list::Filter {
            category,
            active_only: self.active_only.unwrap_or_default(),
        })
    }
}

/// List of [`LegalDocument`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`LegalDocument`]s ordered by their display order, newest first
    /// within the same order.
    pub documents: Vec<LegalDocument>,
}

/// Request body of `POST /legal-documents`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInput {
    /// Title of the document.
    pub title: legal_document::Title,

    /// Description of the document.
    #[serde(default)]
    pub description: Option<legal_document::Description>,

    /// Category of the document.
    pub category: legal_document::Category,

    /// Path or URL the document is downloadable from.
    pub file_path: legal_document::FilePath,

    /// Original file name.
    pub file_name: media::FileName,

    /// File size in bytes.
    #[serde(default)]
    pub file_size: Option<legal_document::FileSize>,

    /// MIME type of the file.
    #[serde(default)]
    pub mime_type: Option<media::MimeType>,

    /// Indicator whether the document is published.
    #[serde(default)]
    pub is_active: Option<bool>,

    /// Display order of the document.
    #[serde(default)]
    pub order: Option<legal_document::Order>,

    /// ID of the uploading user. Defaults to the authorized one.
    #[serde(default)]
    pub created_by_id: Option<user::Id>,
}

/// Request body of `PUT /legal-documents/:id`.
///
/// Absent fields keep their current values, while `null` clears the
/// optional ones.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateInput {
    /// New title.
    pub title: Option<legal_document::Title>,

    /// New description.
    #[serde(deserialize_with = "api::double_option")]
    pub description: Option<Option<legal_document::Description>>,

    /// New category.
    pub category: Option<legal_document::Category>,

    /// New path or URL.
    pub file_path: Option<legal_document::FilePath>,

    /// New file name.
    pub file_name: Option<media::FileName>,

    /// New file size.
    pub file_size: Option<legal_document::FileSize>,

    /// New MIME type.
    #[serde(deserialize_with = "api::double_option")]
    pub mime_type: Option<Option<media::MimeType>>,

    /// New publication indicator.
    pub is_active: Option<bool>,

    /// New display order.
    pub order: Option<legal_document::Order>,
}

/// `GET /legal-documents`
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_QUERY` - malformed filter parameters.
#[tracing::instrument(skip_all, fields(otel.name = "GET /legal-documents"))]
pub async fn list(
    Extension(service): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> api::Result<List> {
    let filter = params.into_filter()?;

    let documents = service
        .execute(query::legal_documents::List::by(filter))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(List {
        documents: documents.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /legal-documents/:id`
///
/// # Errors
///
/// Possible error codes:
/// - `LEGAL_DOCUMENT_NOT_EXISTS` - no document with the provided ID.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "GET /legal-documents/:id"),
)]
pub async fn get(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<
        Path<legal_document::Id>,
        Error,
    >,
) -> api::Result<LegalDocument> {
    let entry = service
        .execute(query::legal_document::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(LegalDocumentError::NotExists))?;

    Ok(api::Success::new(entry.into()))
}

/// `POST /legal-documents`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `CREATOR_NOT_EXISTS` - the uploading user doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(title = %input.title, otel.name = "POST /legal-documents"),
)]
pub async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Json(input), _): WithRejection<Json<CreateInput>, Error>,
) -> api::Result<LegalDocument> {
    let CreateInput {
        title,
        description,
        category,
        file_path,
        file_name,
        file_size,
        mime_type,
        is_active,
        order,
        created_by_id,
    } = input;

    let entry = service
        .execute(command::CreateLegalDocument {
            title,
            description,
            category,
            file_path,
            file_name,
            file_size,
            mime_type,
            is_active,
            order,
            created_by: created_by_id.unwrap_or(session.user_id),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(entry.into())
        .with_message("Legal document created successfully"))
}

/// `PUT /legal-documents/:id`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `LEGAL_DOCUMENT_NOT_EXISTS` - no document with the provided ID.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "PUT /legal-documents/:id"),
)]
pub async fn update(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Path(id), _): WithRejection<
        Path<legal_document::Id>,
        Error,
    >,
    WithRejection(Json(input), _): WithRejection<Json<UpdateInput>, Error>,
) -> api::Result<LegalDocument> {
    let UpdateInput {
        title,
        description,
        category,
        file_path,
        file_name,
        file_size,
        mime_type,
        is_active,
        order,
    } = input;

    let entry = service
        .execute(command::UpdateLegalDocument {
            id,
            title,
            description,
            category,
            file_path,
            file_name,
            file_size,
            mime_type,
            is_active,
            order,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(entry.into())
        .with_message("Legal document updated successfully"))
}

/// `DELETE /legal-documents/:id`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `LEGAL_DOCUMENT_NOT_EXISTS` - no document with the provided ID.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "DELETE /legal-documents/:id"),
)]
pub async fn delete(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Path(id), _): WithRejection<
        Path<legal_document::Id>,
        Error,
    >,
) -> api::Result<()> {
    _ = service
        .execute(command::DeleteLegalDocument { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::message("Legal document deleted successfully"))
}

define_error! {
    enum LegalDocumentError {
        #[code = "LEGAL_DOCUMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Legal document not found"]
        NotExists,

        #[code = "CREATOR_NOT_EXISTS"]
        #[status = BAD_REQUEST]
        #[message = "Uploading user not found"]
        CreatorNotExists,
    }
}

impl AsError for command::create_legal_document::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::CreatorNotExists(_) => {
                Some(LegalDocumentError::CreatorNotExists.into())
            }
            Self::LegalDocumentNotExists(_) => None,
        }
    }
}

impl AsError for command::update_legal_document::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LegalDocumentNotExists(_) => {
                Some(LegalDocumentError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_legal_document::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LegalDocumentNotExists(_) => {
                Some(LegalDocumentError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::extract::Query;

    use super::{ListParams, UpdateInput};

    fn parse(query: &str) -> ListParams {
        let uri: http::Uri =
            format!("/legal-documents?{query}").parse().unwrap();
        Query::<ListParams>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn parses_filter() {
        let filter = parse("category=CERTIFICATE&activeOnly=true")
            .into_filter()
            .unwrap();
        assert_eq!(filter.category.unwrap().as_ref(), "CERTIFICATE");
        assert!(filter.active_only);

        let filter = parse("category=").into_filter().unwrap();
        assert!(filter.category.is_none());
        assert!(!filter.active_only);
    }

    #[test]
    fn distinguishes_null_from_absent() {
        let input: UpdateInput = serde_json::from_value(serde_json::json!({
            "title": "Terms of Service",
            "description": null,
        }))
        .unwrap();

        assert!(input.title.is_some());
        assert_eq!(input.description, Some(None));
        assert_eq!(input.mime_type, None);
        assert!(input.is_active.is_none());
    }

    #[test]
    fn sets_optional_fields() {
        let input: UpdateInput = serde_json::from_value(serde_json::json!({
            "mimeType": "application/pdf",
            "isActive": false,
            "order": 3,
        }))
        .unwrap();

        assert_eq!(
            input.mime_type.flatten().map(|m| m.to_string()).as_deref(),
            Some("application/pdf"),
        );
        assert_eq!(input.is_active, Some(false));
        assert!(input.order.is_some());
    }
}
