//! [`Command`] for destroying an asset in the [`MediaStorage`].

use common::operations::Delete;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::media,
    infra::{media as media_storage, MediaStorage},
    Service,
};

use super::Command;

/// [`Command`] for destroying an asset in the [`MediaStorage`].
#[derive(Clone, Debug)]
pub struct DestroyMedia {
    /// [`media::PublicId`] of the asset to destroy.
    pub public_id: media::PublicId,
}

impl<Db, Ms, Gc> Command<DestroyMedia> for Service<Db, Ms, Gc>
where
    Ms: MediaStorage<
        Delete<media::PublicId>,
        Ok = bool,
        Err = Traced<media_storage::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DestroyMedia) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DestroyMedia { public_id } = cmd;

        let destroyed = self
            .media()
            .execute(Delete(public_id.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !destroyed {
            return Err(tracerr::new!(E::NotDestroyed(public_id)));
        }

        Ok(())
    }
}

/// Error of [`DestroyMedia`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`MediaStorage`] error.
    #[display("`MediaStorage` operation failed: {_0}")]
    #[from]
    Media(media_storage::Error),

    /// [`MediaStorage`] refused to destroy the asset.
    #[display("Failed to delete image")]
    NotDestroyed(#[error(not(source))] media::PublicId),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::media,
        test_utils::{service_with, MEDIA_MISSING},
        Command as _,
    };

    use super::{DestroyMedia, ExecutionError};

    #[tokio::test]
    async fn destroys_existing_asset() {
        let (svc, _, media) = service_with(true);

        svc.execute(DestroyMedia {
            public_id: media::PublicId::new("sog-properties/a").unwrap(),
        })
        .await
        .unwrap();

        assert_eq!(media.destroyed(), ["sog-properties/a"]);
    }

    #[tokio::test]
    async fn reports_refusal() {
        let (svc, _, _) = service_with(true);

        let err = svc
            .execute(DestroyMedia {
                public_id: media::PublicId::new(MEDIA_MISSING).unwrap(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NotDestroyed(_)),
            "{err}",
        );
        assert_eq!(err.as_ref().to_string(), "Failed to delete image");
    }
}
