//! Media upload endpoints.

use axum::{
    extract::{multipart::Field, Multipart, Query},
    Extension,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::media,
    infra::media as media_storage,
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Maximum size of a request body accepted by the upload endpoints.
pub const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Fallback [`media::MimeType`] of parts declaring no `Content-Type`.
const OCTET_STREAM: &str = "application/octet-stream";

/// Uploaded images.
#[derive(Clone, Debug, Serialize)]
pub struct Images {
    /// Uploaded [`media::Asset`]s, in the order of the request parts.
    pub images: Vec<media::Asset>,

    /// Number of the uploaded [`media::Asset`]s.
    pub count: usize,
}

/// Uploaded document.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// URL the document is served at.
    pub url: media::Url,

    /// [`media::PublicId`] of the document.
    pub public_id: media::PublicId,

    /// Original file name.
    pub file_name: media::FileName,

    /// Size in bytes.
    pub file_size: u64,

    /// Declared MIME type.
    pub mime_type: media::MimeType,

    /// Format detected by the media storage.
    pub format: Option<String>,

    /// Resource type assigned by the media storage.
    pub resource_type: String,
}

/// Query parameters of `DELETE /upload`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyParams {
    /// [`media::PublicId`] of the asset to destroy.
    pub public_id: media::PublicId,
}

/// Parts of a multipart upload form.
#[derive(Debug, Default)]
struct Form {
    /// Requested [`media::Folder`].
    folder: Option<media::Folder>,

    /// Uploaded [`media::File`]s, in the order of their parts.
    files: Vec<media::File>,
}

impl Form {
    /// Reads a [`Form`] out of the provided [`Multipart`], collecting the
    /// parts named as one of `file_fields` into [`Form::files`].
    async fn read(
        mut multipart: Multipart,
        file_fields: &[&str],
    ) -> Result<Self, Error> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(ToOwned::to_owned);
            match name.as_deref() {
                Some("folder") => {
                    let folder = field.text().await?;
                    if !folder.trim().is_empty() {
                        form.folder =
                            Some(folder.parse().map_err(|e: &str| {
                                UploadError::InvalidFolder.with_message(e)
                            })?);
                    }
                }
                Some(name) if file_fields.contains(&name) => {
                    form.files.push(read_file(field).await?);
                }
                Some(_) | None => {}
            }
        }
        Ok(form)
    }
}

/// Reads a [`media::File`] out of the provided multipart [`Field`].
async fn read_file(field: Field<'_>) -> Result<media::File, Error> {
    let name = field
        .file_name()
        .and_then(|n| media::FileName::new(n.trim()))
        .ok_or_else(|| Error::from(UploadError::MissingFileName))?;
    let mime_type = media::MimeType::new(
        field.content_type().unwrap_or(OCTET_STREAM).trim(),
    )
    .ok_or_else(|| Error::from(UploadError::InvalidFileType))?;
    let content = field.bytes().await?.to_vec();

    Ok(media::File {
        name,
        mime_type,
        content,
    })
}

/// `POST /upload`
///
/// Accepts multipart `files` (or `files[]`) parts along with an optional
/// `folder` one.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `NO_FILES` - no files provided;
/// - `INVALID_FILE_TYPE` - some of the files is not an image;
/// - `MEDIA_NOT_CONFIGURED` - media storage credentials are missing;
/// - `MEDIA_FAILED` - some of the files failed to upload.
#[tracing::instrument(skip_all, fields(otel.name = "POST /upload"))]
pub async fn images(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(multipart, _): WithRejection<Multipart, Error>,
) -> api::Result<Images> {
    let Form { folder, files } =
        Form::read(multipart, &["files", "files[]"]).await?;

    let images = service
        .execute(command::UploadImages { folder, files })
        .await
        .map_err(AsError::into_error)?;

    let count = images.len();
    Ok(api::Success::new(Images { images, count })
        .with_message(format!("Successfully uploaded {count} image(s)")))
}

/// `DELETE /upload?publicId=`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `INVALID_QUERY` - no `publicId` provided;
/// - `MEDIA_NOT_DESTROYED` - media storage refused to destroy the asset.
#[tracing::instrument(
    skip_all,
    fields(public_id = %params.public_id, otel.name = "DELETE /upload"),
)]
pub async fn destroy(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Query(params), _): WithRejection<
        Query<DestroyParams>,
        Error,
    >,
) -> api::Result<()> {
    service
        .execute(command::DestroyMedia {
            public_id: params.public_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::message("Image deleted successfully"))
}

/// `POST /upload-document`
///
/// Accepts a multipart `file` part along with an optional `folder` one.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `MISSING_FIELDS` - no file provided;
/// - `INVALID_FILE_TYPE` - the file is not a PDF, DOC, DOCX or TXT one;
/// - `FILE_TOO_LARGE` - the file exceeds 10MB;
/// - `MEDIA_NOT_CONFIGURED` - media storage credentials are missing;
/// - `MEDIA_FAILED` - the file failed to upload.
#[tracing::instrument(skip_all, fields(otel.name = "POST /upload-document"))]
pub async fn document(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(multipart, _): WithRejection<Multipart, Error>,
) -> api::Result<Document> {
    let Form { folder, files } = Form::read(multipart, &["file"]).await?;
    let file = files
        .into_iter()
        .next()
        .ok_or_else(|| Error::from(UploadError::NoFile))?;

    let command::upload_document::Output {
        asset,
        file_name,
        file_size,
        mime_type,
    } = service
        .execute(command::UploadDocument { folder, file })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(Document {
        url: asset.url,
        public_id: asset.public_id,
        file_name,
        file_size,
        mime_type,
        format: asset.format,
        resource_type: asset.resource_type,
    })
    .with_message("Document uploaded successfully"))
}

define_error! {
    enum UploadError {
        #[code = "NO_FILES"]
        #[status = BAD_REQUEST]
        #[message = "No files provided"]
        NoFiles,

        #[code = "MISSING_FIELDS"]
        #[status = BAD_REQUEST]
        #[message = "No file provided"]
        NoFile,

        #[code = "MISSING_FIELDS"]
        #[status = BAD_REQUEST]
        #[message = "Uploaded file has no name"]
        MissingFileName,

        #[code = "INVALID_FOLDER"]
        #[status = BAD_REQUEST]
        #[message = "Invalid folder"]
        InvalidFolder,

        #[code = "INVALID_FILE_TYPE"]
        #[status = BAD_REQUEST]
        #[message = "Invalid file type"]
        InvalidFileType,

        #[code = "FILE_TOO_LARGE"]
        #[status = BAD_REQUEST]
        #[message = "File size too large. Maximum allowed size is 10MB."]
        FileTooLarge,

        #[code = "MEDIA_NOT_CONFIGURED"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Media storage is not configured"]
        NotConfigured,

        #[code = "MEDIA_FAILED"]
        #[status = BAD_GATEWAY]
        #[message = "Media storage operation failed"]
        Failed,

        #[code = "MEDIA_NOT_DESTROYED"]
        #[status = BAD_REQUEST]
        #[message = "Failed to delete image"]
        NotDestroyed,
    }
}

impl UploadError {
    /// Converts this [`UploadError`] into an [`Error`] with the provided
    /// `message` instead of the default one.
    fn with_message(self, message: impl ToString) -> Error {
        Error {
            message: message.to_string(),
            ..Error::from(self)
        }
    }
}

impl AsError for media_storage::Error {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::NotConfigured => UploadError::NotConfigured.into(),
            Self::Http(_) | Self::Rejected(_) => {
                UploadError::Failed.with_message(self)
            }
        })
    }
}

impl AsError for command::upload_images::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::InvalidFileType(name) => UploadError::InvalidFileType
                .with_message(format!("`{name}` is not an image")),
            Self::NoFiles => UploadError::NoFiles.into(),
            Self::NotConfigured => UploadError::NotConfigured.into(),
            Self::UploadFailed(failures) => UploadError::Failed.with_message(
                format!(
                    "Failed to upload images: {}",
                    failures
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
            ),
        })
    }
}

impl AsError for command::upload_document::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::FileTooLarge(_) => Some(UploadError::FileTooLarge.into()),
            Self::InvalidFileType(_) => {
                Some(UploadError::InvalidFileType.with_message(
                    "Invalid file type. Only PDF, DOC, DOCX and TXT files \
                     are allowed.",
                ))
            }
            Self::Media(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::destroy_media::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Media(e) => e.try_as_error(),
            Self::NotDestroyed(_) => Some(UploadError::NotDestroyed.into()),
        }
    }
}
