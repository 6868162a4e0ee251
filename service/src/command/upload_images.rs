//! [`Command`] for uploading property images into the [`MediaStorage`].

use common::operations::{Delete, Insert};
use derive_more::{Display, Error};
use futures::future;
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

/// [`Command`] for uploading images into the [`MediaStorage`].
///
/// Either all the [`media::File`]s are uploaded, or none of them is kept.
#[derive(Clone, Debug)]
pub struct UploadImages {
    /// [`media::Folder`] to upload the images into.
    ///
    /// [`media::Folder::properties()`] if [`None`].
    pub folder: Option<media::Folder>,

    /// Image [`media::File`]s to upload.
    pub files: Vec<media::File>,
}

/// Failed upload of a single [`media::File`].
#[derive(Clone, Debug, Display)]
#[display("{file_name}: {reason}")]
pub struct Failure {
    /// [`media::FileName`] of the failed [`media::File`].
    pub file_name: media::FileName,

    /// Reason of the failure.
    pub reason: String,
}

impl<Db, Ms, Gc> Command<UploadImages> for Service<Db, Ms, Gc>
where
    Ms: MediaStorage<
            Insert<Upload>,
            Ok = media::Asset,
            Err = Traced<media_storage::Error>,
        > + MediaStorage<
            Delete<media::PublicId>,
            Ok = bool,
            Err = Traced<media_storage::Error>,
        >,
{
    type Ok = Vec<media::Asset>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UploadImages) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UploadImages { folder, files } = cmd;

        if files.is_empty() {
            return Err(tracerr::new!(E::NoFiles));
        }
        if let Some(f) = files
            .iter()
            .find(|f| !f.mime_type.as_ref().starts_with("image/"))
        {
            return Err(tracerr::new!(E::InvalidFileType(f.name.clone())));
        }

        let folder = folder.unwrap_or_else(media::Folder::properties);
        let names = files.iter().map(|f| f.name.clone()).collect::<Vec<_>>();
        let results = future::join_all(files.into_iter().map(|file| {
            self.media().execute(Insert(Upload {
                file,
                folder: folder.clone(),
                public_id: None,
                resource: Resource::Image,
            }))
        }))
        .await;

        let mut assets = Vec::with_capacity(results.len());
        let mut failures = vec![];
        let mut not_configured = false;
        for (file_name, res) in names.into_iter().zip(results) {
            match res {
                Ok(asset) => assets.push(asset),
                Err(e) => {
                    tracing::error!("failed to upload `{file_name}`: {e}");
                    not_configured |= matches!(
                        e.as_ref(),
                        media_storage::Error::NotConfigured,
                    );
                    failures.push(Failure {
                        file_name,
                        reason: e.into_inner().to_string(),
                    });
                }
            }
        }
        if failures.is_empty() {
            return Ok(assets);
        }

        let destroyed = future::join_all(assets.into_iter().map(|a| {
            let id = a.public_id;
            async move {
                let res = self.media().execute(Delete(id.clone())).await;
                (id, res)
            }
        }))
        .await;
        for (id, res) in destroyed {
            match res {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!("uploaded asset `{id}` was not cleaned up");
                }
                Err(e) => {
                    tracing::warn!(
                        "failed to clean up uploaded asset `{id}`: {e}",
                    );
                }
            }
        }

        Err(tracerr::new!(if not_configured {
            E::NotConfigured
        } else {
            E::UploadFailed(failures)
        }))
    }
}

/// Error of [`UploadImages`] [`Command`] execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// Provided [`media::File`] is not an image.
    #[display("`{_0}` is not an image")]
    InvalidFileType(#[error(not(source))] media::FileName),

    /// No [`media::File`]s provided.
    #[display("No files provided")]
    NoFiles,

    /// [`MediaStorage`] is not configured.
    #[display("Media storage is not configured")]
    NotConfigured,

    /// Some of the [`media::File`]s failed to upload.
    #[display("Failed to upload {} file(s)", _0.len())]
    UploadFailed(#[error(not(source))] Vec<Failure>),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::media,
        test_utils::{file, service_with},
        Command as _,
    };

    use super::{ExecutionError, UploadImages};

    #[tokio::test]
    async fn uploads_into_properties_folder() {
        let (svc, _, media) = service_with(true);

        let assets = svc
            .execute(UploadImages {
                folder: None,
                files: vec![
                    file("a.jpg", "image/jpeg"),
                    file("b.png", "image/png"),
                ],
            })
            .await
            .unwrap();

        assert_eq!(assets.len(), 2);
        let mut uploaded = media.uploaded();
        uploaded.sort();
        assert_eq!(
            uploaded,
            [
                format!("{}/a.jpg", media::Folder::PROPERTIES),
                format!("{}/b.png", media::Folder::PROPERTIES),
            ],
        );
    }

    #[tokio::test]
    async fn validates_files() {
        let (svc, _, media) = service_with(true);

        let err = svc
            .execute(UploadImages {
                folder: None,
                files: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NoFiles), "{err}");

        let err = svc
            .execute(UploadImages {
                folder: None,
                files: vec![
                    file("a.jpg", "image/jpeg"),
                    file("b.pdf", "application/pdf"),
                ],
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::InvalidFileType(n) if n.as_ref() == "b.pdf"),
            "{err}",
        );

        assert!(media.uploaded().is_empty());
    }

    #[tokio::test]
    async fn cleans_up_on_partial_failure() {
        let (svc, _, media) = service_with(true);
        media.fail_upload_of("broken.jpg");

        let err = svc
            .execute(UploadImages {
                folder: media::Folder::new("custom"),
                files: vec![
                    file("ok.jpg", "image/jpeg"),
                    file("broken.jpg", "image/jpeg"),
                ],
            })
            .await
            .unwrap_err();

        let ExecutionError::UploadFailed(failures) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file_name.as_ref(), "broken.jpg");
        assert_eq!(media.destroyed(), ["custom/ok.jpg"]);
    }
}
