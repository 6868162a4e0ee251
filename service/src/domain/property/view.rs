//! [`View`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Property;
use crate::domain::property;

/// Single visit of a [`Property`] page.
///
/// At most one [`View`] is recorded per [`Property`] and [`IpAddress`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct View {
    /// ID of this [`View`].
    pub id: Id,

    /// ID of the viewed [`Property`].
    pub property_id: property::Id,

    /// [`IpAddress`] of the visitor.
    pub ip_address: IpAddress,

    /// [`UserAgent`] of the visitor.
    pub user_agent: UserAgent,

    /// [`DateTime`] when this [`View`] happened.
    pub created_at: CreationDateTime,
}

/// ID of a [`View`].
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

/// Textual IP address of a visitor, as reported by the proxy headers.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct IpAddress(String);

impl IpAddress {
    /// Address used when the real one cannot be determined.
    pub const FALLBACK: &'static str = "127.0.0.1";
}

impl Default for IpAddress {
    fn default() -> Self {
        Self(Self::FALLBACK.to_owned())
    }
}

/// `User-Agent` of a visitor, possibly empty.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct UserAgent(String);

/// [`DateTime`] when a [`View`] happened.
pub type CreationDateTime = DateTimeOf<(View, unit::Creation)>;
