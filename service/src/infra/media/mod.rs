//! [`MediaStorage`]-related implementations.

pub mod cloudinary;

use derive_more::{Display, Error as StdError, From};

use crate::domain::media;

pub use self::cloudinary::Cloudinary;

/// Remote media storage operation.
pub use common::Handler as MediaStorage;

/// Upload of a [`media::File`] into a [`media::Folder`].
#[derive(Clone, Debug)]
pub struct Upload {
    /// [`media::File`] to upload.
    pub file: media::File,

    /// [`media::Folder`] to upload the [`media::File`] into.
    pub folder: media::Folder,

    /// [`media::PublicId`] to assign to the uploaded asset.
    ///
    /// Generated by the [`MediaStorage`] if [`None`].
    pub public_id: Option<media::PublicId>,

    /// [`Resource`] kind of the uploaded asset.
    pub resource: Resource,
}

/// Kind of an uploaded resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resource {
    /// Image, normalized to the listing dimensions.
    Image,

    /// Any file, its kind is detected by the [`MediaStorage`].
    Auto,
}

impl Resource {
    /// Returns the name of this [`Resource`] kind in the remote API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Auto => "auto",
        }
    }
}

/// [`MediaStorage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Credentials of the [`MediaStorage`] are not configured.
    #[display("Media storage is not configured")]
    NotConfigured,

    /// HTTP request to the [`MediaStorage`] failed.
    #[display("HTTP request failed: {_0}")]
    #[from]
    Http(reqwest::Error),

    /// [`MediaStorage`] rejected the request.
    #[display("Media storage rejected the request: {_0}")]
    Rejected(#[error(not(source))] String),
}
