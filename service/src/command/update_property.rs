//! [`Command`] for updating an existing [`Property`].

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{self, Constraint},
        Database,
    },
    read, Service,
};

use super::{unique_slug, Command};

/// [`Command`] for updating an existing [`Property`].
///
/// Scalar fields are overwritten, while [`property::Feature`]s and
/// [`property::Image`]s are replaced entirely.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to update.
    pub id: property::Id,

    /// New [`property::Draft`] of the [`Property`].
    pub draft: property::Draft,
}

impl<Db, Ms, Gc> Command<UpdateProperty> for Service<Db, Ms, Gc>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
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
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<property::Feature>, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<property::Image>, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Insert<property::Feature>, Err = Traced<database::Error>>
        + Database<Insert<property::Image>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::property::Details;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty { id, draft } = cmd;

        let existing = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;

        let slug = if draft.title == existing.title {
            existing.slug
        } else {
            unique_slug(self.database(), &draft.title, Some(id))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::EmptySlug(draft.title.clone()))
                .map_err(tracerr::wrap!())?
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Vec<property::Feature>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Delete(By::<Vec<property::Image>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let (features, images) = property.edit(draft, DateTime::now());
        property.slug = slug;
        tx.execute(Update(property))
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
            .execute(Select(By::<Option<read::property::Details>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// New [`property::Title`] doesn't produce any [`property::Slug`].
    #[display("`{_0}` title cannot be turned into a slug")]
    EmptySlug(#[error(not(source))] property::Title),

    /// [`Property`] with the provided ID doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`property::Slug`] of the new [`property::Title`] is occupied
    /// concurrently.
    #[display("A property with this title already exists")]
    TitleOccupied,
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::CreateProperty,
        domain::property,
        infra::Database as _,
        test_utils::{
            feature_name, image_draft, property_draft, service, user,
        },
        Command as _,
    };

    use super::{ExecutionError, UpdateProperty};

    #[tokio::test]
    async fn replaces_children_and_keeps_slug_of_same_title() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        let created = svc
            .execute(CreateProperty {
                draft: property::Draft {
                    features: vec![feature_name("Pool")],
                    images: vec![image_draft("a"), image_draft("b")],
                    ..property_draft("Ocean View")
                },
                created_by: owner.id,
            })
            .await
            .unwrap();
        let id = created.listing.property.id;

        let updated = svc
            .execute(UpdateProperty {
                id,
                draft: property::Draft {
                    features: vec![feature_name("Gym"), feature_name("Spa")],
                    images: vec![image_draft("c")],
                    ..property_draft("Ocean View")
                },
            })
            .await
            .unwrap();

        let listing = &updated.listing;
        assert_eq!(listing.property.slug.as_ref(), "ocean-view");
        assert_eq!(
            listing
                .features
                .iter()
                .map(|f| f.name.to_string())
                .collect::<Vec<_>>(),
            ["Gym", "Spa"],
        );
        assert_eq!(listing.images.len(), 1);
        assert!(listing.images[0].is_primary);
        assert_eq!(listing.images[0].public_id.as_ref(), "c");

        let state = db.snapshot();
        assert_eq!(state.features.len(), 2);
        assert_eq!(state.images.len(), 1);
    }

    #[tokio::test]
    async fn regenerates_slug_excluding_itself() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        let create = |title: &'static str| CreateProperty {
            draft: property_draft(title),
            created_by: owner.id,
        };
        let first = svc.execute(create("Ocean View")).await.unwrap();
        let second = svc.execute(create("Palm Court")).await.unwrap();

        let renamed = svc
            .execute(UpdateProperty {
                id: second.listing.property.id,
                draft: property_draft("Ocean View"),
            })
            .await
            .unwrap();
        assert_eq!(renamed.listing.property.slug.as_ref(), "ocean-view-1");

        let renamed = svc
            .execute(UpdateProperty {
                id: first.listing.property.id,
                draft: property_draft("Ocean   View!"),
            })
            .await
            .unwrap();
        assert_eq!(
            renamed.listing.property.slug.as_ref(),
            "ocean-view",
            "own slug is not a collision",
        );
    }

    #[tokio::test]
    async fn fails_on_missing_property() {
        let (svc, _) = service();

        let err = svc
            .execute(UpdateProperty {
                id: property::Id::new(),
                draft: property_draft("Ocean View"),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::PropertyNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rolls_back_on_child_failure() {
        let (svc, db) = service();
        let owner = user("agent@sog.ng");
        db.execute(Insert(owner.clone())).await.unwrap();
        let created = svc
            .execute(CreateProperty {
                draft: property::Draft {
                    features: vec![feature_name("Pool")],
                    images: vec![image_draft("a")],
                    ..property_draft("Ocean View")
                },
                created_by: owner.id,
            })
            .await
            .unwrap();
        let before = db.snapshot();
        db.fail_image_inserts();

        let err = svc
            .execute(UpdateProperty {
                id: created.listing.property.id,
                draft: property::Draft {
                    images: vec![image_draft("b")],
                    ..property_draft("Palm Court")
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Db(_)), "{err}");

        let after = db.snapshot();
        assert_eq!(after.properties, before.properties);
        assert_eq!(after.features, before.features);
        assert_eq!(after.images, before.images);
    }
}
