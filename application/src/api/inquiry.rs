//! Inquiry endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{inquiry, media, property, user, Inquiry as Entity},
    query::{self, Query as _},
    read::{self, inquiry::list},
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Inquiry as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    /// ID of this [`Inquiry`].
    pub id: inquiry::Id,

    /// Name of the author.
    pub name: inquiry::Name,

    /// Email of the author.
    pub email: user::Email,

    /// Phone of the author.
    pub phone: Option<inquiry::Phone>,

    /// Message of this [`Inquiry`].
    pub message: inquiry::Message,

    /// Kind of this [`Inquiry`].
    #[serde(rename = "type")]
    pub kind: inquiry::Kind,

    /// Processing status of this [`Inquiry`].
    pub status: inquiry::Status,

    /// ID of the property this [`Inquiry`] is about.
    pub property_id: Option<property::Id>,

    /// Lower bound of the author's budget.
    pub budget_min: Option<property::Price>,

    /// Upper bound of the author's budget.
    pub budget_max: Option<property::Price>,

    /// When this [`Inquiry`] was created.
    pub created_at: inquiry::CreationDateTime,

    /// When this [`Inquiry`] was modified last time.
    pub updated_at: inquiry::ModificationDateTime,

    /// Summary of the property this [`Inquiry`] is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertySummary>,
}

/// Short summary of a property referenced by an [`Inquiry`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    /// ID of the property.
    pub id: property::Id,

    /// Title of the property.
    pub title: property::Title,

    /// Slug of the property.
    pub slug: property::Slug,

    /// Price of the property.
    pub price: property::Price,

    /// URL of the primary image of the property.
    pub primary_image: Option<media::Url>,
}

impl From<read::property::Summary> for PropertySummary {
    fn from(s: read::property::Summary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            slug: s.slug,
            price: s.price,
            primary_image: s.primary_image,
        }
    }
}

impl From<Entity> for Inquiry {
    fn from(i: Entity) -> Self {
        let Entity {
            id,
            name,
            email,
            phone,
            message,
            kind,
            status,
            property_id,
            budget_min,
            budget_max,
            created_at,
            updated_at,
        } = i;

        Self {
            id,
            name,
            email,
            phone,
            message,
            kind,
            status,
            property_id,
            budget_min,
            budget_max,
            created_at,
            updated_at,
            property: None,
        }
    }
}

impl From<read::inquiry::Entry> for Inquiry {
    fn from(entry: read::inquiry::Entry) -> Self {
        let read::inquiry::Entry { inquiry, property } = entry;
        Self {
            property: property.map(Into::into),
            ..Self::from(inquiry)
        }
    }
}

/// Query parameters of `GET /inquiries`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// [`inquiry::Status`] to match.
    pub status: Option<inquiry::Status>,

    /// [`inquiry::Kind`] to match.
    #[serde(rename = "type")]
    pub kind: Option<inquiry::Kind>,

    /// Requested page number.
    pub page: Option<u32>,

    /// Requested page size.
    pub limit: Option<u32>,
}

impl ListParams {
    /// Converts these [`ListParams`] into a [`list::Selector`].
    ///
    /// # Errors
    ///
    /// If `page` or `limit` are out of range.
    pub fn into_selector(self) -> Result<list::Selector, Error> {
        let Self {
            status,
            kind,
            page,
            limit,
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
            filter: list::Filter { status, kind },
            sort: (),
        })
    }
}

/// Page of [`Inquiry`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Inquiry`]s on the page, newest first.
    pub inquiries: Vec<Inquiry>,

    /// Pagination metadata.
    pub pagination: api::Pagination,
}

/// Request body of `POST /inquiries`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// Name of the author.
    pub name: inquiry::Name,

    /// Email of the author.
    pub email: user::Email,

    /// Phone of the author.
    #[serde(default, deserialize_with = "api::non_empty")]
    pub phone: Option<inquiry::Phone>,

    /// Message of the inquiry.
    pub message: inquiry::Message,

    /// Kind of the inquiry.
    #[serde(default, rename = "type")]
    pub kind: Option<inquiry::Kind>,

    /// ID of the property the inquiry is about.
    #[serde(default, deserialize_with = "api::non_empty")]
    pub property_id: Option<property::Id>,

    /// Lower bound of the author's budget.
    #[serde(default, deserialize_with = "api::integer")]
    pub budget_min: Option<property::Price>,

    /// Upper bound of the author's budget.
    #[serde(default, deserialize_with = "api::integer")]
    pub budget_max: Option<property::Price>,
}

/// Request body of `PATCH /inquiries/:id`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StatusInput {
    /// New [`inquiry::Status`].
    pub status: inquiry::Status,
}

/// `GET /inquiries`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `INVALID_QUERY` - malformed filter or pagination parameters.
#[tracing::instrument(skip_all, fields(otel.name = "GET /inquiries"))]
pub async fn list(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> api::Result<List> {
    let selector = params.into_selector()?;

    let connection = service
        .execute(query::inquiries::Search(selector))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(List {
        inquiries: connection
            .page
            .items
            .into_iter()
            .map(Inquiry::from)
            .collect(),
        pagination: connection.info.into(),
    }))
}

/// `POST /inquiries`
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_BUDGET` - minimum budget exceeds the maximum one;
/// - `PROPERTY_NOT_EXISTS` - referenced property doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(email = %input.email, otel.name = "POST /inquiries"),
)]
pub async fn create(
    Extension(service): Extension<Service>,
    WithRejection(Json(input), _): WithRejection<Json<Input>, Error>,
) -> api::Result<Inquiry> {
    let Input {
        name,
        email,
        phone,
        message,
        kind,
        property_id,
        budget_min,
        budget_max,
    } = input;

    let entry = service
        .execute(command::CreateInquiry {
            name,
            email,
            phone,
            message,
            kind,
            property_id,
            budget_min,
            budget_max,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(entry.into()).with_message(
        "Inquiry submitted successfully. We will get back to you soon!",
    ))
}

/// `PATCH /inquiries/:id`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `INQUIRY_NOT_EXISTS` - no inquiry with the provided ID.
#[tracing::instrument(
    skip_all,
    fields(id = %id, otel.name = "PATCH /inquiries/:id"),
)]
pub async fn update_status(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Path(id), _): WithRejection<Path<inquiry::Id>, Error>,
    WithRejection(Json(input), _): WithRejection<Json<StatusInput>, Error>,
) -> api::Result<Inquiry> {
    let inquiry = service
        .execute(command::UpdateInquiryStatus {
            id,
            status: input.status,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(inquiry.into())
        .with_message("Inquiry status updated successfully"))
}

define_error! {
    enum InquiryError {
        #[code = "INQUIRY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Inquiry not found"]
        NotExists,

        #[code = "INVALID_BUDGET"]
        #[status = BAD_REQUEST]
        #[message = "Minimum budget cannot exceed the maximum one"]
        InvalidBudget,

        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Property not found"]
        PropertyNotExists,
    }
}

impl AsError for command::create_inquiry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidBudget => Some(InquiryError::InvalidBudget.into()),
            Self::PropertyNotExists(_) => {
                Some(InquiryError::PropertyNotExists.into())
            }
        }
    }
}

impl AsError for command::update_inquiry_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InquiryNotExists(_) => Some(InquiryError::NotExists.into()),
        }
    }
}
