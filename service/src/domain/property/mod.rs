//! [`Property`] definitions.

pub mod feature;
pub mod image;
pub mod slug;
pub mod view;

use common::{define_kind, unit, DateTime, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{define_text, user};

pub use self::{feature::Feature, image::Image, slug::Slug, view::View};

/// Real estate listed in the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Title`] of this [`Property`].
    pub title: Title,

    /// [`Description`] of this [`Property`].
    pub description: Description,

    /// [`Price`] of this [`Property`].
    pub price: Price,

    /// [`Location`] (area name) of this [`Property`].
    pub location: Location,

    /// Street [`Address`] of this [`Property`], if known.
    pub address: Option<Address>,

    /// [`Latitude`] of this [`Property`], if known.
    pub latitude: Option<Latitude>,

    /// [`Longitude`] of this [`Property`], if known.
    pub longitude: Option<Longitude>,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// [`Status`] of this [`Property`].
    pub status: Status,

    /// Number of bedrooms in this [`Property`].
    pub bedrooms: Quantity,

    /// Number of bathrooms in this [`Property`].
    pub bathrooms: Quantity,

    /// [`Area`] of this [`Property`].
    pub area: Area,

    /// Number of parking lots of this [`Property`].
    pub parking: Quantity,

    /// Indicator whether this [`Property`] is promoted in the catalog.
    pub featured: bool,

    /// [`YearBuilt`] of this [`Property`], if known.
    pub year_built: Option<YearBuilt>,

    /// [`Amenities`] of this [`Property`].
    pub amenities: Amenities,

    /// Unique [`Slug`] of this [`Property`].
    pub slug: Slug,

    /// [`DateTime`] when this [`Property`] was sold, if it was.
    pub sold_at: Option<SaleDateTime>,

    /// ID of the [`User`] owning this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub created_by: user::Id,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Property {
    /// Changes [`Status`] of this [`Property`], tracking the [`SaleDateTime`].
    ///
    /// Becoming [`Status::Sold`] stamps the sale time (unless already sold),
    /// leaving it clears the sale time.
    pub fn set_status(&mut self, status: Status, now: SaleDateTime) {
        match status {
            Status::Sold => {
                if self.status != Status::Sold || self.sold_at.is_none() {
                    self.sold_at = Some(now);
                }
            }
            Status::Available
            | Status::Pending
            | Status::Rented
            | Status::OffMarket => self.sold_at = None,
        }
        self.status = status;
    }

    /// Creates a new [`Property`] out of the provided [`Draft`].
    ///
    /// Returns the [`Property`] along with its [`Feature`]s and [`Image`]s
    /// arranged by [`Image::arrange()`].
    #[must_use]
    pub fn create(
        draft: Draft,
        slug: Slug,
        created_by: user::Id,
        now: DateTime,
    ) -> (Self, Vec<Feature>, Vec<Image>) {
        let id = Id::new();
        let Draft {
            title,
            description,
            price,
            location,
            address,
            latitude,
            longitude,
            kind,
            status,
            bedrooms,
            bathrooms,
            area,
            parking,
            featured,
            year_built,
            amenities,
            features,
            images,
        } = draft;

        let mut property = Self {
            id,
            title,
            description,
            price,
            location,
            address,
            latitude,
            longitude,
            kind,
            status: Status::default(),
            bedrooms,
            bathrooms,
            area,
            parking,
            featured,
            year_built,
            amenities,
            slug,
            sold_at: None,
            created_by,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        if let Some(status) = status {
            property.set_status(status, now.coerce());
        }

        (
            property,
            Feature::list(id, features),
            Image::arrange(id, images),
        )
    }

    /// Replaces the contents of this [`Property`] with the provided
    /// [`Draft`], keeping the current [`Status`] if the [`Draft`] omits it.
    ///
    /// Returns the replacement [`Feature`]s and [`Image`]s arranged by
    /// [`Image::arrange()`].
    pub fn edit(
        &mut self,
        draft: Draft,
        now: DateTime,
    ) -> (Vec<Feature>, Vec<Image>) {
        let Draft {
            title,
            description,
            price,
            location,
            address,
            latitude,
            longitude,
            kind,
            status,
            bedrooms,
            bathrooms,
            area,
            parking,
            featured,
            year_built,
            amenities,
            features,
            images,
        } = draft;

        self.title = title;
        self.description = description;
        self.price = price;
        self.location = location;
        self.address = address;
        self.latitude = latitude;
        self.longitude = longitude;
        self.kind = kind;
        self.bedrooms = bedrooms;
        self.bathrooms = bathrooms;
        self.area = area;
        self.parking = parking;
        self.featured = featured;
        self.year_built = year_built;
        self.amenities = amenities;
        if let Some(status) = status {
            self.set_status(status, now.coerce());
        }
        self.updated_at = now.coerce();

        (
            Feature::list(self.id, features),
            Image::arrange(self.id, images),
        )
    }
}

/// Editable contents of a [`Property`].
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    /// [`Title`] of the [`Property`].
    pub title: Title,

    /// [`Description`] of the [`Property`].
    pub description: Description,

    /// [`Price`] of the [`Property`].
    pub price: Price,

    /// [`Location`] of the [`Property`].
    pub location: Location,

    /// [`Address`] of the [`Property`], if known.
    pub address: Option<Address>,

    /// [`Latitude`] of the [`Property`], if known.
    pub latitude: Option<Latitude>,

    /// [`Longitude`] of the [`Property`], if known.
    pub longitude: Option<Longitude>,

    /// [`Kind`] of the [`Property`].
    pub kind: Kind,

    /// [`Status`] of the [`Property`].
    ///
    /// [`None`] keeps the current one, or means [`Status::Available`] for a
    /// new [`Property`].
    pub status: Option<Status>,

    /// Number of bedrooms.
    pub bedrooms: Quantity,

    /// Number of bathrooms.
    pub bathrooms: Quantity,

    /// [`Area`] of the [`Property`].
    pub area: Area,

    /// Number of parking lots.
    pub parking: Quantity,

    /// Indicator whether the [`Property`] is promoted in the catalog.
    pub featured: bool,

    /// [`YearBuilt`] of the [`Property`], if known.
    pub year_built: Option<YearBuilt>,

    /// [`Amenities`] of the [`Property`].
    pub amenities: Amenities,

    /// [`feature::Name`]s of the [`Property`] [`Feature`]s, replacing the
    /// existing ones.
    pub features: Vec<feature::Name>,

    /// [`image::Draft`]s of the [`Property`] [`Image`]s, replacing the
    /// existing ones.
    pub images: Vec<image::Draft>,
}

/// ID of a [`Property`].
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
    #[doc = "Title of a [`Property`]."]
    Title(max = 512)
}

define_text! {
    #[doc = "Description of a [`Property`]."]
    Description(max = 20000)
}

define_text! {
    #[doc = "Location (area or district name) of a [`Property`]."]
    Location(max = 512)
}

define_text! {
    #[doc = "Street address of a [`Property`]."]
    Address(max = 1024)
}

/// Price of a [`Property`] in the smallest currency unit.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub struct Price(i64);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: i64) -> Option<Self> {
        (amount >= 0).then_some(Self(amount))
    }
}

impl TryFrom<i64> for Price {
    type Error = &'static str;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::new(amount).ok_or("`Price` must be non-negative")
    }
}

/// Non-negative number of rooms or parking lots of a [`Property`].
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
pub struct Quantity(i32);

impl Quantity {
    /// Creates a new [`Quantity`] if the given `count` is non-negative.
    #[must_use]
    pub fn new(count: i32) -> Option<Self> {
        (count >= 0).then_some(Self(count))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = &'static str;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        i32::try_from(count)
            .ok()
            .and_then(Self::new)
            .ok_or("`Quantity` must be a non-negative 32-bit integer")
    }
}

/// Area of a [`Property`] in square meters.
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
pub struct Area(i32);

impl Area {
    /// Creates a new [`Area`] if the given `sqm` is non-negative.
    #[must_use]
    pub fn new(sqm: i32) -> Option<Self> {
        (sqm >= 0).then_some(Self(sqm))
    }
}

impl TryFrom<i64> for Area {
    type Error = &'static str;

    fn try_from(sqm: i64) -> Result<Self, Self::Error> {
        i32::try_from(sqm)
            .ok()
            .and_then(Self::new)
            .ok_or("`Area` must be a non-negative 32-bit integer")
    }
}

/// Year when a [`Property`] was built.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub struct YearBuilt(i32);

impl YearBuilt {
    /// Creates a new [`YearBuilt`] if the given `year` is within `1..=9999`.
    #[must_use]
    pub fn new(year: i32) -> Option<Self> {
        (1..=9999).contains(&year).then_some(Self(year))
    }
}

impl TryFrom<i64> for YearBuilt {
    type Error = &'static str;

    fn try_from(year: i64) -> Result<Self, Self::Error> {
        i32::try_from(year)
            .ok()
            .and_then(Self::new)
            .ok_or("`YearBuilt` must be within `1..=9999`")
    }
}

/// Latitude of a [`Property`] in degrees.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Into, PartialEq, PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(try_from = "f64")]
pub struct Latitude(f64);

impl Latitude {
    /// Creates a new [`Latitude`] if the given `degrees` are within
    /// `-90..=90`.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        (-90.0..=90.0).contains(&degrees).then_some(Self(degrees))
    }
}

impl TryFrom<f64> for Latitude {
    type Error = &'static str;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees).ok_or("`Latitude` must be within `-90..=90`")
    }
}

/// Longitude of a [`Property`] in degrees.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Into, PartialEq, PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(try_from = "f64")]
pub struct Longitude(f64);

impl Longitude {
    /// Creates a new [`Longitude`] if the given `degrees` are within
    /// `-180..=180`.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        (-180.0..=180.0).contains(&degrees).then_some(Self(degrees))
    }
}

impl TryFrom<f64> for Longitude {
    type Error = &'static str;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees).ok_or("`Longitude` must be within `-180..=180`")
    }
}

/// Boolean amenities of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Amenities {
    /// Indicator whether a [`Property`] is furnished.
    pub furnished: bool,

    /// Indicator whether pets are allowed in a [`Property`].
    pub pet_friendly: bool,

    /// Indicator whether a [`Property`] has a garden.
    pub garden: bool,

    /// Indicator whether a [`Property`] has a balcony.
    pub balcony: bool,
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Kind {
        #[doc = "Flat in a residential building."]
        Apartment,

        #[doc = "Two-storey house."]
        Duplex,

        #[doc = "Large detached house."]
        Mansion,

        #[doc = "House in a row of joined houses."]
        Terrace,

        #[doc = "Office, shop or other business premises."]
        Commercial,

        #[doc = "Plot of land."]
        Land,

        #[doc = "Top-floor apartment."]
        Penthouse,

        #[doc = "Single-room apartment."]
        Studio,
    }
}

define_kind! {
    #[doc = "Market status of a [`Property`]."]
    enum Status {
        #[doc = "Open for sale or rent."]
        Available,

        #[doc = "Sold to a new owner."]
        Sold,

        #[doc = "Deal is in progress."]
        Pending,

        #[doc = "Rented out."]
        Rented,

        #[doc = "Withdrawn from the market."]
        OffMarket,
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Available
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;

/// [`DateTime`] when a [`Property`] was sold.
pub type SaleDateTime = DateTimeOf<(Property, unit::Sale)>;
