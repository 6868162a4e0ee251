//! [`Feature`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Property;
use crate::domain::{define_text, property};

/// Notable feature of a [`Property`] (e.g. "Swimming pool").
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// ID of this [`Feature`].
    pub id: Id,

    /// ID of the [`Property`] this [`Feature`] belongs to.
    pub property_id: property::Id,

    /// [`Name`] of this [`Feature`].
    pub name: Name,

    /// [`Icon`] of this [`Feature`], if any.
    pub icon: Option<Icon>,
}

impl Feature {
    /// Creates new [`Feature`]s of the [`Property`] out of the provided
    /// [`Name`]s, without [`Icon`]s.
    #[must_use]
    pub fn list(
        property_id: property::Id,
        names: impl IntoIterator<Item = Name>,
    ) -> Vec<Self> {
        names
            .into_iter()
            .map(|name| Self {
                id: Id::new(),
                property_id,
                name,
                icon: None,
            })
            .collect()
    }
}

/// ID of a [`Feature`].
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
    #[doc = "Name of a [`Feature`]."]
    Name(max = 255)
}

define_text! {
    #[doc = "Icon identifier of a [`Feature`]."]
    Icon(max = 255)
}
