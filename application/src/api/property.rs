//! Property endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use common::pagination::Order;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        media,
        property::{self, feature, image},
        user,
    },
    query::{self, Query as _},
    read::{self, property::list},
};

use crate::{api, context::Visitor, define_error, AsError, Error, Service, Session};

/// Property as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// ID of this [`Property`].
    pub id: property::Id,

    /// Title of this [`Property`].
    pub title: property::Title,

    /// Description of this [`Property`].
    pub description: property::Description,

    /// Price of this [`Property`].
    pub price: property::Price,

    /// Location of this [`Property`].
    pub location: property::Location,

    /// Street address of this [`Property`].
    pub address: Option<property::Address>,

    /// Latitude of this [`Property`].
    pub latitude: Option<property::Latitude>,

    /// Longitude of this [`Property`].
    pub longitude: Option<property::Longitude>,

    /// Kind of this [`Property`].
    #[serde(rename = "type")]
    pub kind: property::Kind,

    /// Market status of this [`Property`].
    pub status: property::Status,

    /// Number of bedrooms.
    pub bedrooms: property::Quantity,

    /// Number of bathrooms.
    pub bathrooms: property::Quantity,

    /// Area in square meters.
    pub area: property::Area,

    /// Number of parking lots.
    pub parking: property::Quantity,

    /// Indicator whether this [`Property`] is featured.
    pub featured: bool,

    /// Year this [`Property`] was built in.
    pub year_built: Option<property::YearBuilt>,

    /// Boolean amenities of this [`Property`].
    #[serde(flatten)]
    pub amenities: property::Amenities,

    /// URL slug of this [`Property`].
    pub slug: property::Slug,

    /// When this [`Property`] was sold.
    pub sold_date: Option<property::SaleDateTime>,

    /// ID of the user who created this [`Property`].
    pub created_by_id: user::Id,

    /// When this [`Property`] was created.
    pub created_at: property::CreationDateTime,

    /// When this [`Property`] was modified last time.
    pub updated_at: property::ModificationDateTime,

    /// Images, ordered for display.
    pub images: Vec<property::Image>,

    /// Features.
    pub features: Vec<property::Feature>,

    /// Related records counts.
    #[serde(rename = "_count")]
    pub count: Count,

    /// Creator summary, present on single [`Property`] responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<read::user::Summary>,
}

/// Numbers of records related to a [`Property`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Count {
    /// Number of recorded views.
    pub views: u64,

    /// Number of inquiries.
    pub inquiries: u64,
}

impl From<read::property::Listing> for Property {
    fn from(listing: read::property::Listing) -> Self {
        let read::property::Listing {
            property,
            images,
            features,
            counts,
        } = listing;
        let property::Property {
            id,
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
            slug,
            sold_at,
            created_by,
            created_at,
            updated_at,
        } = property;

        Self {
            id,
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
            slug,
            sold_date: sold_at,
            created_by_id: created_by,
            created_at,
            updated_at,
            images,
            features,
            count: Count {
                views: counts.views,
                inquiries: counts.inquiries,
            },
            created_by: None,
        }
    }
}

impl From<read::property::Details> for Property {
    fn from(details: read::property::Details) -> Self {
        let read::property::Details { listing, creator } = details;
        Self {
            created_by: Some(creator),
            ..Self::from(listing)
        }
    }
}

/// Query parameters of `GET /properties`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    /// Text to search for in titles, descriptions, locations and addresses.
    pub search: Option<String>,

    /// [`property::Kind`] to match.
    #[serde(rename = "type")]
    pub kind: Option<property::Kind>,

    /// [`property::Status`] to match.
    pub status: Option<property::Status>,

    /// Text to search for in locations.
    pub location: Option<String>,

    /// Inclusive lower bound of the price.
    pub min_price: Option<property::Price>,

    /// Inclusive upper bound of the price.
    pub max_price: Option<property::Price>,

    /// Inclusive lower bound of bedrooms.
    pub min_bedrooms: Option<property::Quantity>,

    /// Inclusive upper bound of bedrooms.
    pub max_bedrooms: Option<property::Quantity>,

    /// Indicator whether only featured properties should be listed.
    pub featured: Option<bool>,

    /// Requested page number.
    pub page: Option<u32>,

    /// Requested page size.
    pub limit: Option<u32>,

    /// Column to sort by.
    #[serde(deserialize_with = "api::from_str")]
    pub sort_by: Option<list::SortBy>,

    /// Sorting order.
    #[serde(deserialize_with = "api::from_str")]
    pub sort_order: Option<Order>,
}

impl ListParams {
    /// Converts these [`ListParams`] into a [`list::Selector`].
    ///
    /// # Errors
    ///
    /// If `page` or `limit` are out of range.
    pub fn into_selector(self) -> Result<list::Selector, Error> {
        let Self {
            search,
            kind,
            status,
            location,
            min_price,
            max_price,
            min_bedrooms,
            max_bedrooms,
            featured,
            page,
            limit,
            sort_by,
            sort_order,
        } = self;

        let arguments = list::Arguments::new(page, limit, list::DEFAULT_LIMIT)
            .ok_or_else(|| {
                Error::bad_request(
                    "INVALID_QUERY",
                    &format!(
                        "`page` must be positive and `limit` must be within \
                         `1..={}`",
                        list::Arguments::MAX_LIMIT,
                    ),
                )
            })?;

        Ok(list::Selector {
            arguments,
            filter: list::Filter {
                search: search.filter(|s| !s.trim().is_empty()),
                kind,
                status,
                location: location.filter(|s| !s.trim().is_empty()),
                min_price,
                max_price,
                min_bedrooms,
                max_bedrooms,
                featured_only: featured.unwrap_or_default(),
            },
            sort: list::Sort {
                by: sort_by.unwrap_or_default(),
                order: sort_order.unwrap_or_default(),
            },
        })
    }
}

/// Page of [`Property`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Property`]s on the page.
    pub properties: Vec<Property>,

    /// Pagination metadata.
    pub pagination: api::Pagination,
}

/// Request body of `POST /properties` and `PUT /properties/:id`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// Title of the property.
    pub title: property::Title,

    /// Description of the property.
    pub description: property::Description,

    /// Price of the property.
    pub price: property::Price,

    /// Location of the property.
    pub location: property::Location,

    /// Street address of the property.
    #[serde(default, deserialize_with = "api::non_empty")]
    pub address: Option<property::Address>,

    /// Latitude of the property.
    #[serde(default, deserialize_with = "api::float")]
    pub latitude: Option<property::Latitude>,

    /// Longitude of the property.
    #[serde(default, deserialize_with = "api::float")]
    pub longitude: Option<property::Longitude>,

    /// Kind of the property.
    #[serde(rename = "type")]
    pub kind: property::Kind,

    /// Market status of the property.
    #[serde(default)]
    pub status: Option<property::Status>,

    /// Number of bedrooms.
    #[serde(default)]
    pub bedrooms: property::Quantity,

    /// Number of bathrooms.
    #[serde(default)]
    pub bathrooms: property::Quantity,

    /// Area in square meters.
    #[serde(default)]
    pub area: property::Area,

    /// Number of parking lots.
    #[serde(default)]
    pub parking: property::Quantity,

    /// Indicator whether the property is featured.
    #[serde(default)]
    pub featured: bool,

    /// Year the property was built in.
    #[serde(default, deserialize_with = "api::integer")]
    pub year_built: Option<property::YearBuilt>,

    /// Boolean amenities.
    #[serde(flatten)]
    pub amenities: property::Amenities,

    /// Names of the features, replacing the existing ones.
    #[serde(default)]
    pub features: Vec<feature::Name>,

    /// Images in display order, replacing the existing ones.
    #[serde(default)]
    pub images: Vec<ImageInput>,

    /// ID of the user owning a created property.
    ///
    /// Defaults to the authorized one. Ignored on updates.
    #[serde(default)]
    pub created_by_id: Option<user::Id>,
}

/// Image of an [`Input`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    /// URL of the uploaded image.
    pub url: media::Url,

    /// [`media::PublicId`] of the uploaded image.
    pub public_id: media::PublicId,

    /// Caption of the image.
    #[serde(default, deserialize_with = "api::non_empty")]
    pub caption: Option<image::Caption>,
}

impl Input {
    /// Splits this [`Input`] into a [`property::Draft`] and the requested
    /// owner.
    fn into_draft(self) -> (property::Draft, Option<user::Id>) {
        let Self {
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
            created_by_id,
        } = self;

        let draft = property::Draft {
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
            images: images
                .into_iter()
                .map(|i| image::Draft {
                    url: i.url,
                    public_id: i.public_id,
                    caption: i.caption,
                })
                .collect(),
        };
        (draft, created_by_id)
    }
}

/// `GET /properties`
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_QUERY` - malformed filter, pagination or sorting parameters.
#[tracing::instrument(skip_all, fields(otel.name = "GET /properties"))]
pub async fn list(
    Extension(service): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> api::Result<List> {
    let selector = params.into_selector()?;

    let connection = service
        .execute(query::properties::Search(selector))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(List {
        properties: connection
            .page
            .items
            .into_iter()
            .map(Property::from)
            .collect(),
        pagination: connection.info.into(),
    }))
}

/// `GET /properties/:id`
///
/// Records a view of the [`Property`] by the requesting [`Visitor`].
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - no property with the provided ID.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "GET /properties/:id"),
)]
pub async fn get(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<property::Id>, Error>,
    visitor: Visitor,
) -> api::Result<Property> {
    let details = service
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(PropertyError::NotExists))?;

    let Visitor {
        ip_address,
        user_agent,
    } = visitor;
    let recorded = service
        .execute(command::RecordPropertyView {
            property_id: id,
            ip_address,
            user_agent,
        })
        .await
        .unwrap_or_else(|e| match e {});
    if recorded {
        tracing::debug!("view recorded");
    }

    Ok(api::Success::new(details.into()))
}

/// `POST /properties`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `EMPTY_SLUG` - title contains no letters or digits;
/// - `OWNER_NOT_EXISTS` - the owning user doesn't exist;
/// - `PROPERTY_TITLE_OCCUPIED` - slug collision couldn't be resolved.
#[tracing::instrument(
    skip_all,
    fields(title = %input.title, otel.name = "POST /properties"),
)]
pub async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Json(input), _): WithRejection<Json<Input>, Error>,
) -> api::Result<Property> {
    let (draft, created_by) = input.into_draft();

    let details = service
        .execute(command::CreateProperty {
            draft,
            created_by: created_by.unwrap_or(session.user_id),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(details.into())
        .with_message("Property created successfully"))
}

/// `PUT /properties/:id`
///
/// Replaces all the images and features of the [`Property`].
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `EMPTY_SLUG` - title contains no letters or digits;
/// - `PROPERTY_NOT_EXISTS` - no property with the provided ID;
/// - `PROPERTY_TITLE_OCCUPIED` - slug collision couldn't be resolved.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "PUT /properties/:id"),
)]
pub async fn update(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Path(id), _): WithRejection<Path<property::Id>, Error>,
    WithRejection(Json(input), _): WithRejection<Json<Input>, Error>,
) -> api::Result<Property> {
    let (draft, _) = input.into_draft();

    let details = service
        .execute(command::UpdateProperty { id, draft })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(details.into())
        .with_message("Property updated successfully"))
}

/// `DELETE /properties/:id`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `PROPERTY_NOT_EXISTS` - no property with the provided ID.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "DELETE /properties/:id"),
)]
pub async fn delete(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Path(id), _): WithRejection<Path<property::Id>, Error>,
) -> api::Result<()> {
    service
        .execute(command::DeleteProperty { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::message("Property deleted successfully"))
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Property not found"]
        NotExists,

        #[code = "EMPTY_SLUG"]
        #[status = BAD_REQUEST]
        #[message = "Title must contain at least one letter or digit"]
        EmptySlug,

        #[code = "OWNER_NOT_EXISTS"]
        #[status = BAD_REQUEST]
        #[message = "Owner user not found"]
        OwnerNotExists,

        #[code = "PROPERTY_TITLE_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "A property with this title already exists"]
        TitleOccupied,
    }
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmptySlug(_) => Some(PropertyError::EmptySlug.into()),
            Self::OwnerNotExists(_) => {
                Some(PropertyError::OwnerNotExists.into())
            }
            Self::PropertyNotExists(_) => None,
            Self::TitleOccupied => Some(PropertyError::TitleOccupied.into()),
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmptySlug(_) => Some(PropertyError::EmptySlug.into()),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::TitleOccupied => Some(PropertyError::TitleOccupied.into()),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}
