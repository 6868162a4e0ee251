//! [`Command`] for uploading a document into the [`MediaStorage`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::media,
    infra::{
        media::{self as media_storage, Resource, Upload},
        MediaStorage,
    },
    Service,
};

use super::Command;

/// [`Command`] for uploading a document into the [`MediaStorage`].
#[derive(Clone, Debug)]
pub struct UploadDocument {
    /// [`media::Folder`] to upload the document into.
    ///
    /// [`media::Folder::documents()`] if [`None`].
    pub folder: Option<media::Folder>,

    /// Document [`media::File`] to upload.
    pub file: media::File,
}

impl UploadDocument {
    /// [`media::MimeType`]s of the allowed documents.
    pub const ALLOWED_MIME_TYPES: [&'static str; 4] = [
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "text/plain",
    ];

    /// Maximum allowed size of a document in bytes.
    pub const MAX_SIZE: u64 = 10 * 1024 * 1024;
}

/// Output of [`UploadDocument`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Uploaded [`media::Asset`].
    pub asset: media::Asset,

    /// Original [`media::FileName`] of the document.
    pub file_name: media::FileName,

    /// Size of the document in bytes.
    pub file_size: u64,

    /// [`media::MimeType`] of the document.
    pub mime_type: media::MimeType,
}

impl<Db, Ms, Gc> Command<UploadDocument> for Service<Db, Ms, Gc>
where
    Ms: MediaStorage<
        Insert<Upload>,
        Ok = media::Asset,
        Err = Traced<media_storage::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UploadDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UploadDocument { folder, file } = cmd;

        if !UploadDocument::ALLOWED_MIME_TYPES
            .contains(&file.mime_type.as_ref())
        {
            return Err(tracerr::new!(E::InvalidFileType(file.mime_type)));
        }
        let file_size = file.size();
        if file_size > UploadDocument::MAX_SIZE {
            return Err(tracerr::new!(E::FileTooLarge(file_size)));
        }

        let file_name = file.name.clone();
        let mime_type = file.mime_type.clone();
        let asset = self
            .media()
            .execute(Insert(Upload {
                public_id: Some(public_id(&file.name, DateTime::now())),
                file,
                folder: folder.unwrap_or_else(media::Folder::documents),
                resource: Resource::Auto,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            asset,
            file_name,
            file_size,
            mime_type,
        })
    }
}

/// Builds a [`media::PublicId`] of a document with the provided
/// [`media::FileName`] uploaded at the provided [`DateTime`].
fn public_id(name: &media::FileName, at: DateTime) -> media::PublicId {
    let sanitized = name
        .as_ref()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();

    // SAFETY: Non-empty, contains no whitespace and fits the length limit.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    unsafe {
        media::PublicId::new_unchecked(format!(
            "{}-{sanitized}",
            at.unix_timestamp_millis(),
        ))
    }
}

/// Error of [`UploadDocument`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Document exceeds [`UploadDocument::MAX_SIZE`].
    #[display("File of {_0} bytes exceeds 10MB limit")]
    FileTooLarge(#[error(not(source))] u64),

    /// Document is not of [`UploadDocument::ALLOWED_MIME_TYPES`].
    #[display("`{_0}` documents are not allowed")]
    InvalidFileType(#[error(not(source))] media::MimeType),

    /// [`MediaStorage`] error.
    #[display("`MediaStorage` operation failed: {_0}")]
    #[from]
    Media(media_storage::Error),
}
