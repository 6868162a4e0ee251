//! [`Property`]-related read definitions.

use crate::{
    domain::{media, property, Property},
    read,
};

/// [`Property`] as shown in the catalog: along with its [`property::Image`]s,
/// [`property::Feature`]s and [`Counts`].
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    /// Listed [`Property`].
    pub property: Property,

    /// [`property::Image`]s of the [`Property`], ordered by their
    /// [`property::image::Order`].
    pub images: Vec<property::Image>,

    /// [`property::Feature`]s of the [`Property`].
    pub features: Vec<property::Feature>,

    /// [`Counts`] of the [`Property`].
    pub counts: Counts,
}

/// Engagement counters of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    /// Number of recorded [`property::View`]s.
    pub views: u64,

    /// Number of [`Inquiry`]s referencing the [`Property`].
    ///
    /// [`Inquiry`]: crate::domain::Inquiry
    pub inquiries: u64,
}

/// Full [`Property`] details: its [`Listing`] along with its creator.
#[derive(Clone, Debug, PartialEq)]
pub struct Details {
    /// [`Listing`] of the [`Property`].
    pub listing: Listing,

    /// [`read::user::Summary`] of the [`Property`] creator.
    pub creator: read::user::Summary,
}

/// Short [`Property`] summary attached to other entities.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// ID of the [`Property`].
    pub id: property::Id,

    /// [`property::Title`] of the [`Property`].
    pub title: property::Title,

    /// [`property::Slug`] of the [`Property`].
    pub slug: property::Slug,

    /// [`property::Price`] of the [`Property`].
    pub price: property::Price,

    /// [`media::Url`] of the primary [`property::Image`], if any.
    pub primary_image: Option<media::Url>,
}

pub mod list {
    //! [`Property`] list definitions.

    use std::cmp::Ordering;

    use common::{define_pagination, pagination::Order};
    use derive_more::{From, Into};
    use strum::{EnumString, IntoStaticStr};

    use crate::domain::{property, Property};

    use super::Listing;

    define_pagination!(Listing, Filter, Sort);

    /// Default [`Arguments::limit()`] of a [`Property`] list.
    pub const DEFAULT_LIMIT: u32 = 12;

    /// Filter for [`Selector`].
    ///
    /// All the specified criteria must match.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Filter {
        /// Text to case-insensitively search for in [`property::Title`],
        /// [`property::Description`], [`property::Location`] or
        /// [`property::Address`].
        pub search: Option<String>,

        /// [`property::Kind`] to match.
        pub kind: Option<property::Kind>,

        /// [`property::Status`] to match.
        pub status: Option<property::Status>,

        /// Text to case-insensitively search for in [`property::Location`].
        pub location: Option<String>,

        /// Inclusive lower bound of [`property::Price`].
        pub min_price: Option<property::Price>,

        /// Inclusive upper bound of [`property::Price`].
        pub max_price: Option<property::Price>,

        /// Inclusive lower bound of bedrooms.
        pub min_bedrooms: Option<property::Quantity>,

        /// Inclusive upper bound of bedrooms.
        pub max_bedrooms: Option<property::Quantity>,

        /// Indicator whether only featured [`Property`]s should match.
        ///
        /// `false` doesn't filter anything out.
        pub featured_only: bool,
    }

    impl Filter {
        /// Checks whether the provided [`Property`] matches this [`Filter`].
        #[must_use]
        pub fn matches(&self, p: &Property) -> bool {
            let contains = |haystack: &str, needle: &str| {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            };

            self.search.as_deref().map_or(true, |s| {
                contains(p.title.as_ref(), s)
                    || contains(p.description.as_ref(), s)
                    || contains(p.location.as_ref(), s)
                    || p.address
                        .as_ref()
                        .is_some_and(|a| contains(a.as_ref(), s))
            }) && self.kind.map_or(true, |k| p.kind == k)
                && self.status.map_or(true, |s| p.status == s)
                && self
                    .location
                    .as_deref()
                    .map_or(true, |l| contains(p.location.as_ref(), l))
                && self.min_price.map_or(true, |min| p.price >= min)
                && self.max_price.map_or(true, |max| p.price <= max)
                && self.min_bedrooms.map_or(true, |min| p.bedrooms >= min)
                && self.max_bedrooms.map_or(true, |max| p.bedrooms <= max)
                && (!self.featured_only || p.featured)
        }
    }

    /// Sorting of a [`Property`] list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Sort {
        /// [`SortBy`] column.
        pub by: SortBy,

        /// Sorting [`Order`].
        pub order: Order,
    }

    impl Sort {
        /// Compares the provided [`Property`]s according to this [`Sort`],
        /// breaking ties by [`property::Id`] in the same [`Order`].
        #[must_use]
        pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
            // Unknown years go last regardless of the order.
            if self.by == SortBy::YearBuilt {
                match (a.year_built, b.year_built) {
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    (Some(_), Some(_)) | (None, None) => {}
                }
            }

            let ordering = match self.by {
                SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
                SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortBy::Price => a.price.cmp(&b.price),
                SortBy::Title => a.title.as_ref().cmp(b.title.as_ref()),
                SortBy::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
                SortBy::Bathrooms => a.bathrooms.cmp(&b.bathrooms),
                SortBy::Area => a.area.cmp(&b.area),
                SortBy::YearBuilt => a.year_built.cmp(&b.year_built),
                SortBy::Location => {
                    a.location.as_ref().cmp(b.location.as_ref())
                }
            };
            self.order.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        }
    }

    /// Column a [`Property`] list can be sorted by.
    #[derive(
        Clone, Copy, Debug, Default, EnumString, Eq, IntoStaticStr, PartialEq,
    )]
    #[strum(serialize_all = "camelCase")]
    pub enum SortBy {
        /// [`Property::created_at`].
        #[default]
        CreatedAt,

        /// [`Property::updated_at`].
        UpdatedAt,

        /// [`Property::price`].
        Price,

        /// [`Property::title`].
        Title,

        /// [`Property::bedrooms`].
        Bedrooms,

        /// [`Property::bathrooms`].
        Bathrooms,

        /// [`Property::area`].
        Area,

        /// [`Property::year_built`].
        YearBuilt,

        /// [`Property::location`].
        Location,
    }

    impl SortBy {
        /// Returns SQL column of the `properties` table this [`SortBy`]
        /// refers to.
        #[must_use]
        pub const fn column(self) -> &'static str {
            match self {
                Self::CreatedAt => "created_at",
                Self::UpdatedAt => "updated_at",
                Self::Price => "price",
                Self::Title => "title",
                Self::Bedrooms => "bedrooms",
                Self::Bathrooms => "bathrooms",
                Self::Area => "area",
                Self::YearBuilt => "year_built",
                Self::Location => "location",
            }
        }
    }

    /// Total count of [`Property`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(u64);

}
