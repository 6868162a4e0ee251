//! [`Inquiry`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Property;
use crate::domain::{define_text, property, user};

/// Lead left by a site visitor.
#[derive(Clone, Debug, PartialEq)]
pub struct Inquiry {
    /// ID of this [`Inquiry`].
    pub id: Id,

    /// [`Name`] of the author.
    pub name: Name,

    /// [`user::Email`] of the author.
    pub email: user::Email,

    /// [`Phone`] of the author, if provided.
    pub phone: Option<Phone>,

    /// [`Message`] of this [`Inquiry`].
    pub message: Message,

    /// [`Kind`] of this [`Inquiry`].
    pub kind: Kind,

    /// [`Status`] of this [`Inquiry`] processing.
    pub status: Status,

    /// ID of the [`Property`] this [`Inquiry`] is about, if any.
    ///
    /// Becomes [`None`] once the [`Property`] is deleted.
    pub property_id: Option<property::Id>,

    /// Lower bound of the author's budget, if provided.
    pub budget_min: Option<property::Price>,

    /// Upper bound of the author's budget, if provided.
    pub budget_max: Option<property::Price>,

    /// [`DateTime`] when this [`Inquiry`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Inquiry`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Inquiry {
    /// Checks whether the budget bounds of this [`Inquiry`] are consistent.
    #[must_use]
    pub fn is_budget_valid(&self) -> bool {
        self.budget_min
            .zip(self.budget_max)
            .map_or(true, |(min, max)| min <= max)
    }
}

/// ID of an [`Inquiry`].
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
    #[doc = "Name of an [`Inquiry`] author."]
    Name(max = 512)
}

define_text! {
    #[doc = "Message of an [`Inquiry`]."]
    Message(max = 10000)
}

/// Phone number of an [`Inquiry`] author.
///
/// Only loosely validated, as visitors type it in any local format.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `phone` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    /// Creates a new [`Phone`] if the given `phone` is valid.
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Option<Self> {
        let phone = phone.into();
        Self::check(&phone).then_some(Self(phone))
    }

    /// Checks whether the given `phone` is a valid [`Phone`].
    fn check(phone: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?[0-9(][0-9 ()\-.]{3,30}[0-9]$")
                .expect("valid regex")
        });

        REGEX.is_match(phone.as_ref())
    }
}

impl std::str::FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim()).ok_or("invalid `Phone`")
    }
}

impl<'de> Deserialize<'de> for Phone {
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

define_kind! {
    #[doc = "Kind of an [`Inquiry`]."]
    enum Kind {
        #[doc = "General question."]
        General,

        #[doc = "Question about a specific property."]
        Property,

        #[doc = "Consultation request."]
        Consultation,
    }
}

impl Default for Kind {
    fn default() -> Self {
        Self::General
    }
}

define_kind! {
    #[doc = "Processing status of an [`Inquiry`]."]
    enum Status {
        #[doc = "Not looked at yet."]
        New,

        #[doc = "Being handled by an agent."]
        InProgress,

        #[doc = "Handled successfully."]
        Resolved,

        #[doc = "Closed without resolution."]
        Closed,
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::New
    }
}

/// [`DateTime`] when an [`Inquiry`] was created.
pub type CreationDateTime = DateTimeOf<(Inquiry, unit::Creation)>;

/// [`DateTime`] when an [`Inquiry`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Inquiry, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::{Kind, Phone, Status};

    #[test]
    fn validates_phone() {
        assert!(Phone::new("+234 801 234 5678").is_some());
        assert!(Phone::new("(0801) 234-5678").is_some());
        assert!(" 08012345678 ".parse::<Phone>().is_ok());
        assert!(Phone::new("call me").is_none());
        assert!(Phone::new("12").is_none());
    }

    #[test]
    fn parses_kinds() {
        assert_eq!("IN_PROGRESS".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("CONSULTATION".parse::<Kind>().unwrap(), Kind::Consultation);
        assert_eq!(Kind::default(), Kind::General);
        assert_eq!(Status::default(), Status::New);
    }
}
