//! [`Command`] for recording a [`property::View`].

use std::convert::Infallible;

use common::{operations::Insert, DateTime};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::property,
    infra::{
        database::{self, Constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for recording a [`property::View`].
///
/// Never fails: repeated views from the same [`property::view::IpAddress`]
/// and any other failures are logged and swallowed, so the viewing itself is
/// never affected.
#[derive(Clone, Debug)]
pub struct RecordPropertyView {
    /// ID of the viewed [`Property`].
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`property::view::IpAddress`] of the visitor.
    pub ip_address: property::view::IpAddress,

    /// [`property::view::UserAgent`] of the visitor.
    pub user_agent: property::view::UserAgent,
}

impl<Db, Ms, Gc> Command<RecordPropertyView> for Service<Db, Ms, Gc>
where
    Db: Database<Insert<property::View>, Err = Traced<database::Error>>,
{
    /// Indicator whether a new [`property::View`] has been recorded.
    type Ok = bool;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: RecordPropertyView,
    ) -> Result<Self::Ok, Self::Err> {
        let RecordPropertyView {
            property_id,
            ip_address,
            user_agent,
        } = cmd;

        let view = property::View {
            id: property::view::Id::new(),
            property_id,
            ip_address,
            user_agent,
            created_at: DateTime::now().coerce(),
        };

        Ok(match self.database().execute(Insert(view)).await {
            Ok(_) => true,
            Err(e) if e.as_ref().violates(Constraint::PropertyView) => {
                log::debug!(
                    "`Property(id: {property_id})` already viewed from this \
                     address",
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "failed to record view of `Property(id: {property_id})`: \
                     {e}",
                );
                false
            }
        })
    }
}
