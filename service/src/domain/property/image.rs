//! [`Image`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Property;
use crate::domain::{define_text, media, property};

/// Image of a [`Property`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// ID of this [`Image`].
    pub id: Id,

    /// ID of the [`Property`] this [`Image`] belongs to.
    pub property_id: property::Id,

    /// [`media::Url`] this [`Image`] is served at.
    pub url: media::Url,

    /// [`media::PublicId`] of this [`Image`] in the remote media storage.
    pub public_id: media::PublicId,

    /// [`Caption`] of this [`Image`], if any.
    pub caption: Option<Caption>,

    /// Indicator whether this [`Image`] represents its [`Property`].
    pub is_primary: bool,

    /// Display [`Order`] of this [`Image`].
    pub order: Order,
}

impl Image {
    /// Arranges the provided [`Draft`]s into [`Image`]s of the [`Property`]:
    /// the first one becomes primary, and each gets its position as
    /// [`Order`].
    #[must_use]
    pub fn arrange(
        property_id: property::Id,
        drafts: impl IntoIterator<Item = Draft>,
    ) -> Vec<Self> {
        drafts
            .into_iter()
            .zip(0..)
            .map(|(draft, position)| Self {
                id: Id::new(),
                property_id,
                url: draft.url,
                public_id: draft.public_id,
                caption: draft.caption,
                is_primary: position == 0,
                order: Order(position),
            })
            .collect()
    }
}

/// Uploaded, but not yet attached to a [`Property`] image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    /// [`media::Url`] of the uploaded image.
    pub url: media::Url,

    /// [`media::PublicId`] of the uploaded image.
    pub public_id: media::PublicId,

    /// [`Caption`] of the image, if any.
    pub caption: Option<Caption>,
}

/// ID of an [`Image`].
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
    PartialEq,
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
    #[doc = "Caption of an [`Image`]."]
    Caption(max = 1024)
}

/// Display order of an [`Image`] among others of the same [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
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

#[cfg(test)]
mod spec {
    use super::{Draft, Image, Order};
    use crate::domain::{media, property};

    fn draft(name: &str) -> Draft {
        Draft {
            url: media::Url::new(format!("https://cdn.example.com/{name}.jpg"))
                .unwrap(),
            public_id: media::PublicId::new(name).unwrap(),
            caption: None,
        }
    }

    #[test]
    fn first_image_is_primary_and_position_is_order() {
        let id = property::Id::new();
        let images = Image::arrange(id, [draft("a"), draft("b"), draft("c")]);

        assert_eq!(
            images
                .iter()
                .map(|i| (i.public_id.to_string(), i.is_primary, i.order))
                .collect::<Vec<_>>(),
            [
                ("a".to_owned(), true, Order(0)),
                ("b".to_owned(), false, Order(1)),
                ("c".to_owned(), false, Order(2)),
            ],
        );
        assert!(images.iter().all(|i| i.property_id == id));
    }

    #[test]
    fn no_drafts_no_images() {
        assert!(Image::arrange(property::Id::new(), []).is_empty());
    }
}
