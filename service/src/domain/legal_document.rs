//! [`LegalDocument`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{define_text, media, user};

/// Legal document published by the agency (terms, certificates, etc).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegalDocument {
    /// ID of this [`LegalDocument`].
    pub id: Id,

    /// [`Title`] of this [`LegalDocument`].
    pub title: Title,

    /// [`Description`] of this [`LegalDocument`], if any.
    pub description: Option<Description>,

    /// [`Category`] of this [`LegalDocument`].
    pub category: Category,

    /// [`FilePath`] this [`LegalDocument`] is downloadable from.
    pub file_path: FilePath,

    /// Original [`media::FileName`] of this [`LegalDocument`].
    pub file_name: media::FileName,

    /// [`FileSize`] of this [`LegalDocument`].
    pub file_size: FileSize,

    /// [`media::MimeType`] of this [`LegalDocument`], if known.
    pub mime_type: Option<media::MimeType>,

    /// Indicator whether this [`LegalDocument`] is published.
    pub is_active: bool,

    /// Display [`Order`] of this [`LegalDocument`].
    pub order: Order,

    /// ID of the [`User`] who uploaded this [`LegalDocument`].
    ///
    /// [`User`]: crate::domain::User
    pub created_by: user::Id,

    /// [`DateTime`] when this [`LegalDocument`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`LegalDocument`] was modified last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`LegalDocument`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Title of a [`LegalDocument`]."]
    Title(max = 512)
}

define_text! {
    #[doc = "Description of a [`LegalDocument`]."]
    Description(max = 5000)
}

define_text! {
    #[doc = "Category of a [`LegalDocument`] (e.g. `CERTIFICATE`)."]
    Category(max = 255)
}

define_text! {
    #[doc = "Path or URL a [`LegalDocument`] is downloadable from."]
    FilePath(max = 2048)
}

/// Size of a [`LegalDocument`] file in bytes.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(try_from = "i64")]
pub struct FileSize(i64);

impl FileSize {
    /// Creates a new [`FileSize`] if the given `bytes` are non-negative.
    #[must_use]
    pub fn new(bytes: i64) -> Option<Self> {
        (bytes >= 0).then_some(Self(bytes))
    }
}

impl TryFrom<i64> for FileSize {
    type Error = &'static str;

    fn try_from(bytes: i64) -> Result<Self, Self::Error> {
        Self::new(bytes).ok_or("`FileSize` must be non-negative")
    }
}

/// Display order of a [`LegalDocument`], ascending.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Order(i32);

/// [`DateTime`] when a [`LegalDocument`] was created.
pub type CreationDateTime = DateTimeOf<(LegalDocument, unit::Creation)>;

/// [`DateTime`] when a [`LegalDocument`] was modified last time.
pub type ModificationDateTime =
    DateTimeOf<(LegalDocument, unit::Modification)>;
