//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property, User},
    infra::{
        database::{self, Constraint},
        Database,
    },
    read, Service,
};

use super::{unique_slug, Command};

/// [`Command`] for creating a new [`Property`] along with its
/// [`property::Feature`]s and [`property::Image`]s.
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`property::Draft`] of a new [`Property`].
    pub draft: property::Draft,

    /// ID of the [`User`] owning a new [`Property`].
    pub created_by: user::Id,
}

impl<Db, Ms, Gc> Command<CreateProperty> for Service<Db, Ms, Gc>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Property>, &'l property::Slug>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<read::property::Details>, property::Id>>,
            Ok = Option<read::property::Details>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Insert<property::Feature>, Err = Traced<database::Error>>
        + Database<Insert<property::Image>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::property::Details;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty { draft, created_by } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(created_by)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::OwnerNotExists(created_by))
                .map_err(tracerr::wrap!())?,
        );

        let slug = unique_slug(self.database(), &draft.title, None)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::EmptySlug(draft.title.clone()))
            .map_err(tracerr::wrap!())?;

        let (property, features, images) =
            Property::create(draft, slug, created_by, DateTime::now());
        let id = property.id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(property))
            .await
            .map_err(|e| {
                if e.as_ref().violates(Constraint::PropertySlug) {
                    tracerr::new!(E::TitleOccupied)
                } else {
                    tracerr::map_from(e)
                }
            })
            .map(drop)?;
        for feature in features {
            tx.execute(Insert(feature))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        for image in images {
            tx.execute(Insert(image))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`property::Title`] doesn't produce any [`property::Slug`].
    #[display("`{_0}` title cannot be turned into a slug")]
    EmptySlug(#[error(not(source))] property::Title),

    /// [`User`] owning the [`Property`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    OwnerNotExists(#[error(not(source))] user::Id),

    /// Created [`Property`] disappeared before being returned.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`property::Slug`] of the [`property::Title`] is occupied
    /// concurrently.
    #[display("A property with this title already exists")]
    TitleOccupied,
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{property, user},
        infra::Database as _,
        test_utils::{
            feature_name, image_draft, property_draft, service, user,
        },
        Command as _,
    };

    use super::{CreateProperty, ExecutionError};

    #[tokio::test]
    async fn creates_with_children_and_creator() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();

        let details = svc
            .execute(CreateProperty {
                draft: property::Draft {
                    features: vec![feature_name("Pool"), feature_name("Gym")],
                    images: vec![
                        image_draft("a"),
                        image_draft("b"),
                        image_draft("c"),
                    ],
                    ..property_draft("Luxury 4 Bedroom Duplex in Lekki!")
                },
                created_by: owner.id,
            })
            .await
            .unwrap();

        let listing = &details.listing;
        assert_eq!(
            listing.property.slug.as_ref(),
            "luxury-4-bedroom-duplex-in-lekki",
        );
        assert_eq!(details.creator.id, owner.id);
        assert_eq!(details.creator.email, owner.email);
        assert_eq!(listing.features.len(), 2);
        assert!(listing.features.iter().all(|f| f.icon.is_none()));
        assert_eq!(
            listing
                .images
                .iter()
                .map(|i| (i.is_primary, i32::from(i.order)))
                .collect::<Vec<_>>(),
            [(true, 0), (false, 1), (false, 2)],
        );
        assert_eq!(listing.counts, Default::default());
    }

    #[tokio::test]
    async fn appends_suffix_on_slug_collision() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();

        let mut slugs = vec![];
        for _ in 0..3 {
            let details = svc
                .execute(CreateProperty {
                    draft: property_draft("Ocean View"),
                    created_by: owner.id,
                })
                .await
                .unwrap();
            slugs.push(details.listing.property.slug.to_string());
        }

        assert_eq!(slugs, ["ocean-view", "ocean-view-1", "ocean-view-2"]);
    }

    #[tokio::test]
    async fn rejects_empty_slug() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();

        let err = svc
            .execute(CreateProperty {
                draft: property_draft("!!!"),
                created_by: owner.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmptySlug(_)), "{err}");
        assert!(db.snapshot().properties.is_empty());
    }

    #[tokio::test]
    async fn requires_existing_owner() {
        let (svc, db) = service();

        let err = svc
            .execute(CreateProperty {
                draft: property_draft("Ocean View"),
                created_by: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::OwnerNotExists(_)),
            "{err}",
        );
        assert!(db.snapshot().properties.is_empty());
    }

    #[tokio::test]
    async fn rolls_back_on_child_failure() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        db.fail_image_inserts();

        let err = svc
            .execute(CreateProperty {
                draft: property::Draft {
                    images: vec![image_draft("a")],
                    ..property_draft("Ocean View")
                },
                created_by: owner.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)), "{err}");
        let state = db.snapshot();
        assert!(state.properties.is_empty());
        assert!(state.features.is_empty());
        assert!(state.images.is_empty());

        let slug = property::Slug::new("ocean-view").unwrap();
        assert!(db
            .execute(Select(By::<Option<property::Property>, _>::new(&slug)))
            .await
            .unwrap()
            .is_none());
    }
}
