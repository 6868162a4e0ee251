//! Remotely hosted media definitions.

use std::sync::LazyLock;

use derive_more::{AsRef, Debug, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::define_text;

define_text! {
    #[doc = "Identifier of an asset in the remote media storage."]
    PublicId(max = 512)
}

define_text! {
    #[doc = "Original name of an uploaded file."]
    FileName(max = 255)
}

define_text! {
    #[doc = "MIME type of an uploaded file."]
    MimeType(max = 255)
}

/// Absolute HTTP(S) URL of a remotely hosted asset.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`Url`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`Url`].
    fn check(url: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Url`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("valid regex")
        });

        let url = url.as_ref();
        url.len() <= 2048 && REGEX.is_match(url)
    }
}

impl std::str::FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim()).ok_or("invalid `Url`")
    }
}

impl<'de> Deserialize<'de> for Url {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}

/// Folder in the remote media storage, relative to the configured root.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct Folder(String);

impl Folder {
    /// Default [`Folder`] for property images.
    pub const PROPERTIES: &'static str = "sog-properties";

    /// Default [`Folder`] for documents.
    pub const DOCUMENTS: &'static str = "sog-documents";

    /// Creates a new [`Folder`] if the given `folder` is valid.
    ///
    /// Only ASCII alphanumerics, `-`, `_` and `/` separated segments are
    /// allowed.
    #[must_use]
    pub fn new(folder: impl Into<String>) -> Option<Self> {
        let folder = folder.into();
        Self::check(&folder).then_some(Self(folder))
    }

    /// Returns the default [`Folder`] for property images.
    #[must_use]
    pub fn properties() -> Self {
        Self(Self::PROPERTIES.to_owned())
    }

    /// Returns the default [`Folder`] for documents.
    #[must_use]
    pub fn documents() -> Self {
        Self(Self::DOCUMENTS.to_owned())
    }

    /// Checks whether the given `folder` is a valid [`Folder`].
    fn check(folder: impl AsRef<str>) -> bool {
        let folder = folder.as_ref();
        folder.len() <= 255
            && folder.split('/').all(|segment| {
                !segment.is_empty()
                    && segment.chars().all(|c| {
                        c.is_ascii_alphanumeric() || c == '-' || c == '_'
                    })
            })
    }
}

impl std::str::FromStr for Folder {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim()).ok_or("invalid `Folder`")
    }
}

/// File to be uploaded into the remote media storage.
#[derive(Clone, Debug)]
pub struct File {
    /// [`FileName`] of this [`File`].
    pub name: FileName,

    /// [`MimeType`] of this [`File`] declared by the uploader.
    pub mime_type: MimeType,

    /// Contents of this [`File`].
    #[debug("{} bytes", content.len())]
    pub content: Vec<u8>,
}

impl File {
    /// Returns size of this [`File`] in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Asset stored in the remote media storage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// [`Url`] this [`Asset`] is served at.
    pub url: Url,

    /// [`PublicId`] of this [`Asset`].
    pub public_id: PublicId,

    /// Width of this [`Asset`] in pixels, if it's an image.
    pub width: Option<u32>,

    /// Height of this [`Asset`] in pixels, if it's an image.
    pub height: Option<u32>,

    /// Format (file extension) of this [`Asset`], if known.
    pub format: Option<String>,

    /// Size of this [`Asset`] in bytes.
    pub size: u64,

    /// Type of this [`Asset`] resource (`image`, `raw`, `video`).
    pub resource_type: String,
}

#[cfg(test)]
mod spec {
    use super::{Folder, Url};

    #[test]
    fn validates_url() {
        assert!(Url::new("https://res.cloudinary.com/demo/a.jpg").is_some());
        assert!(Url::new("http://localhost:3000/a.png").is_some());
        assert!(Url::new("ftp://example.com/a.png").is_none());
        assert!(Url::new("https://exa mple.com").is_none());
        assert!(Url::new("/relative/path.png").is_none());
    }

    #[test]
    fn validates_folder() {
        assert!(Folder::new("sog-properties").is_some());
        assert!(Folder::new("legal/2024_docs").is_some());
        assert!(Folder::new("../escape").is_none());
        assert!(Folder::new("a//b").is_none());
        assert!(Folder::new("").is_none());
    }
}
