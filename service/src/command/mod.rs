//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_inquiry;
pub mod create_legal_document;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod delete_legal_document;
pub mod delete_property;
pub mod destroy_media;
pub mod record_property_view;
pub mod update_inquiry_status;
pub mod update_legal_document;
pub mod update_property;
pub mod upload_document;
pub mod upload_images;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{database, Database},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_inquiry::CreateInquiry,
    create_legal_document::CreateLegalDocument,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_legal_document::DeleteLegalDocument,
    delete_property::DeleteProperty, destroy_media::DestroyMedia,
    record_property_view::RecordPropertyView,
    update_inquiry_status::UpdateInquiryStatus,
    update_legal_document::UpdateLegalDocument,
    update_property::UpdateProperty, upload_document::UploadDocument,
    upload_images::UploadImages,
};

/// Resolves a [`property::Slug`] of the provided [`property::Title`], which
/// is not occupied by any [`Property`] except the `owner` one.
///
/// Collisions are resolved by appending `-1`, `-2`, etc. to the base
/// [`property::Slug`], checking each candidate sequentially.
///
/// [`None`] is returned if nothing is left of the `title` to build a
/// [`property::Slug`] from.
async fn unique_slug<Db>(
    db: &Db,
    title: &property::Title,
    owner: Option<property::Id>,
) -> Result<Option<property::Slug>, Traced<database::Error>>
where
    Db: for<'l> Database<
        Select<By<Option<Property>, &'l property::Slug>>,
        Ok = Option<Property>,
        Err = Traced<database::Error>,
    >,
{
    let Some(base) = property::Slug::from_title(title.as_ref()) else {
        return Ok(None);
    };

    let mut n = 0;
    loop {
        let candidate = base.candidate(n);
        let occupant = db
            .execute(Select(By::new(&candidate)))
            .await
            .map_err(tracerr::wrap!())?;
        match occupant {
            Some(p) if Some(p.id) != owner => n += 1,
            Some(_) | None => return Ok(Some(candidate)),
        }
    }
}
