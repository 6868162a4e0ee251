//! [`Command`] for creating a new [`Inquiry`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inquiry, property, user, Inquiry},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Inquiry`].
///
/// Produces no notification side effects.
#[derive(Clone, Debug)]
pub struct CreateInquiry {
    /// [`inquiry::Name`] of the author.
    pub name: inquiry::Name,

    /// [`user::Email`] of the author.
    pub email: user::Email,

    /// [`inquiry::Phone`] of the author, if provided.
    pub phone: Option<inquiry::Phone>,

    /// [`inquiry::Message`] of a new [`Inquiry`].
    pub message: inquiry::Message,

    /// [`inquiry::Kind`] of a new [`Inquiry`].
    ///
    /// [`inquiry::Kind::General`] if [`None`].
    pub kind: Option<inquiry::Kind>,

    /// ID of the [`Property`] a new [`Inquiry`] is about, if any.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: Option<property::Id>,

    /// Lower bound of the author's budget, if provided.
    pub budget_min: Option<property::Price>,

    /// Upper bound of the author's budget, if provided.
    pub budget_max: Option<property::Price>,
}

impl<Db, Ms, Gc> Command<CreateInquiry> for Service<Db, Ms, Gc>
where
    Db: Database<
            Select<By<Option<read::property::Summary>, property::Id>>,
            Ok = Option<read::property::Summary>,
            Err = Traced<database::Error>,
        > + Database<Insert<Inquiry>, Err = Traced<database::Error>>,
{
    type Ok = read::inquiry::Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateInquiry) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateInquiry {
            name,
            email,
            phone,
            message,
            kind,
            property_id,
            budget_min,
            budget_max,
        } = cmd;

        let now = DateTime::now();
        let inquiry = Inquiry {
            id: inquiry::Id::new(),
            name,
            email,
            phone,
            message,
            kind: kind.unwrap_or_default(),
            status: inquiry::Status::default(),
            property_id,
            budget_min,
            budget_max,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        if !inquiry.is_budget_valid() {
            return Err(tracerr::new!(E::InvalidBudget));
        }

        let property = if let Some(id) = property_id {
            Some(
                self.database()
                    .execute(Select(By::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::PropertyNotExists(id))
                    .map_err(tracerr::wrap!())?,
            )
        } else {
            None
        };

        self.database()
            .execute(Insert(inquiry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(read::inquiry::Entry { inquiry, property })
    }
}

/// Error of [`CreateInquiry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Lower bound of the budget exceeds its upper bound.
    #[display("Minimum budget exceeds the maximum one")]
    InvalidBudget,

    /// Referenced [`Property`] doesn't exist.
    ///
    /// [`Property`]: crate::domain::Property
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::CreateProperty,
        domain::{inquiry, property},
        infra::Database as _,
        test_utils::{inquiry_draft, property_draft, service, user},
        Command as _,
    };

    use super::{CreateInquiry, ExecutionError};

    #[tokio::test]
    async fn creates_general_inquiry_by_default() {
        let (svc, db) = service();

        let entry = svc.execute(inquiry_draft()).await.unwrap();

        assert_eq!(entry.inquiry.kind, inquiry::Kind::General);
        assert_eq!(entry.inquiry.status, inquiry::Status::New);
        assert_eq!(entry.inquiry.budget_min, None);
        assert!(entry.property.is_none());
        assert_eq!(db.snapshot().inquiries.len(), 1);
    }

    #[tokio::test]
    async fn joins_property_summary() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        let listing = svc
            .execute(CreateProperty {
                draft: property_draft("Ocean View"),
                created_by: owner.id,
            })
            .await
            .unwrap()
            .listing;

        let entry = svc
            .execute(CreateInquiry {
                property_id: Some(listing.property.id),
                budget_min: property::Price::new(100),
                budget_max: property::Price::new(200),
                ..inquiry_draft()
            })
            .await
            .unwrap();

        let summary = entry.property.unwrap();
        assert_eq!(summary.id, listing.property.id);
        assert_eq!(summary.slug, listing.property.slug);
        assert_eq!(summary.price, listing.property.price);
    }

    #[tokio::test]
    async fn validates_budget_and_property() {
        let (svc, db) = service();

        let err = svc
            .execute(CreateInquiry {
                budget_min: property::Price::new(300),
                budget_max: property::Price::new(200),
                ..inquiry_draft()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidBudget), "{err}");

        let err = svc
            .execute(CreateInquiry {
                property_id: Some(property::Id::new()),
                ..inquiry_draft()
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::PropertyNotExists(_)),
            "{err}",
        );

        assert!(db.snapshot().inquiries.is_empty());
    }
}
