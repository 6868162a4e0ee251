//! In-memory [`Database`] implementation.
//!
//! Mirrors the constraints of the SQL schema the domain relies on (unique
//! slugs, unique views per IP address, cascading deletions), so the
//! [`Service`] can be exercised without a running Postgres.
//!
//! [`Service`]: crate::Service

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        inquiry, legal_document, property, user, Inquiry, LegalDocument,
        Property, User,
    },
    infra::{
        database::{self, Constraint},
        Database,
    },
    read,
};

/// In-memory [`Database`].
///
/// [`Transact`] takes a snapshot of the committed [`State`], which replaces
/// the committed one on [`Commit`]. Dropping an uncommitted transaction
/// discards all its changes.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Committed [`State`].
    committed: Arc<Mutex<State>>,

    /// [`State`] of the current transaction, if any.
    tx: Option<Arc<Mutex<State>>>,

    /// [`Faults`] to inject into operations.
    faults: Arc<Mutex<Faults>>,
}

/// Contents of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`User`]s.
    pub users: HashMap<user::Id, User>,

    /// Stored [`Property`]s.
    pub properties: HashMap<property::Id, Property>,

    /// Stored [`property::Image`]s in insertion order.
    pub images: Vec<property::Image>,

    /// Stored [`property::Feature`]s in insertion order.
    pub features: Vec<property::Feature>,

    /// Stored [`property::View`]s in insertion order.
    pub views: Vec<property::View>,

    /// Stored [`Inquiry`]s.
    pub inquiries: HashMap<inquiry::Id, Inquiry>,

    /// Stored [`LegalDocument`]s.
    pub legal_documents: HashMap<legal_document::Id, LegalDocument>,
}

/// Failures to be injected into [`Memory`] operations.
#[derive(Clone, Copy, Debug, Default)]
struct Faults {
    /// Fail every [`property::Image`] insertion.
    image_inserts: bool,

    /// Fail every [`property::View`] insertion.
    view_inserts: bool,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the committed [`State`].
    #[must_use]
    pub fn snapshot(&self) -> State {
        self.committed.lock().expect("not poisoned").clone()
    }

    /// Makes every following [`property::Image`] insertion fail.
    pub fn fail_image_inserts(&self) {
        self.faults.lock().expect("not poisoned").image_inserts = true;
    }

    /// Makes every following [`property::View`] insertion fail.
    pub fn fail_view_inserts(&self) {
        self.faults.lock().expect("not poisoned").view_inserts = true;
    }

    /// Returns the [`Faults`] to inject.
    fn faults(&self) -> Faults {
        *self.faults.lock().expect("not poisoned")
    }

    /// Returns the [`State`] operations should be applied to.
    fn state(&self) -> MutexGuard<'_, State> {
        self.tx
            .as_ref()
            .unwrap_or(&self.committed)
            .lock()
            .expect("not poisoned")
    }
}

impl State {
    /// Builds a [`read::property::Listing`] of the provided [`Property`].
    fn listing(&self, property: &Property) -> read::property::Listing {
        let mut images = self
            .images
            .iter()
            .filter(|i| i.property_id == property.id)
            .cloned()
            .collect::<Vec<_>>();
        images.sort_by_key(|i| i.order);

        read::property::Listing {
            images,
            features: self
                .features
                .iter()
                .filter(|f| f.property_id == property.id)
                .cloned()
                .collect(),
            counts: read::property::Counts {
                views: self
                    .views
                    .iter()
                    .filter(|v| v.property_id == property.id)
                    .count() as u64,
                inquiries: self
                    .inquiries
                    .values()
                    .filter(|i| i.property_id == Some(property.id))
                    .count() as u64,
            },
            property: property.clone(),
        }
    }

    /// Builds a [`read::property::Summary`] of the provided [`Property`].
    fn summary(&self, property: &Property) -> read::property::Summary {
        read::property::Summary {
            id: property.id,
            title: property.title.clone(),
            slug: property.slug.clone(),
            price: property.price,
            primary_image: self
                .images
                .iter()
                .find(|i| i.property_id == property.id && i.is_primary)
                .map(|i| i.url.clone()),
        }
    }

    /// Builds a [`read::user::Summary`] of the [`User`] with the provided ID.
    fn user_summary(&self, id: user::Id) -> Option<read::user::Summary> {
        self.users.get(&id).map(read::user::Summary::from)
    }

    /// Builds a [`read::legal_document::Entry`] of the provided
    /// [`LegalDocument`].
    fn legal_document_entry(
        &self,
        document: &LegalDocument,
    ) -> read::legal_document::Entry {
        read::legal_document::Entry {
            creator: self.user_summary(document.created_by),
            document: document.clone(),
        }
    }
}

/// Fails with the provided [`Error`].
fn fail<T>(err: Error) -> Result<T, Traced<database::Error>> {
    Err(tracerr::new!(database::Error::Memory(err)))
}

/// Converts the provided [`Arguments`] into an offset and a limit.
///
/// [`Arguments`]: common::pagination::Arguments
fn window(arguments: &common::pagination::Arguments) -> (usize, usize) {
    (
        usize::try_from(arguments.offset()).unwrap_or(usize::MAX),
        usize::try_from(arguments.limit()).unwrap_or(usize::MAX),
    )
}

/// [`Memory`] database error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] Constraint),

    /// Injected failure.
    #[display("Injected failure")]
    Injected,
}

impl Error {
    /// Returns the violated unique [`Constraint`], if any.
    #[must_use]
    pub fn unique_violation(&self) -> Option<Constraint> {
        match *self {
            Self::UniqueViolation(c) => Some(c),
            Self::Injected => None,
        }
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        if self.tx.is_some() {
            return Ok(self.clone());
        }
        Ok(Self {
            tx: Some(Arc::new(Mutex::new(self.snapshot()))),
            ..self.clone()
        })
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        if let Some(tx) = &self.tx {
            let state = tx.lock().expect("not poisoned").clone();
            *self.committed.lock().expect("not poisoned") = state;
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Property>, property::Id>>> for Memory {
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().properties.get(&by.into_inner()).cloned())
    }
}

impl<'s> Database<Select<By<Option<Property>, &'s property::Slug>>>
    for Memory
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, &'s property::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();
        Ok(self
            .state()
            .properties
            .values()
            .find(|p| p.slug == *slug)
            .cloned())
    }
}

impl Database<Insert<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state
            .properties
            .values()
            .any(|p| p.slug == property.slug && p.id != property.id)
        {
            return fail(Error::UniqueViolation(Constraint::PropertySlug));
        }
        _ = state.properties.insert(property.id, property);
        Ok(())
    }
}

impl Database<Delete<By<Property, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mut state = self.state();
        _ = state.properties.remove(&id);
        state.images.retain(|i| i.property_id != id);
        state.features.retain(|f| f.property_id != id);
        state.views.retain(|v| v.property_id != id);
        for inquiry in state.inquiries.values_mut() {
            if inquiry.property_id == Some(id) {
                inquiry.property_id = None;
            }
        }
        Ok(())
    }
}

impl Database<Lock<By<Property, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Insert<property::Image>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<property::Image>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.faults().image_inserts {
            return fail(Error::Injected);
        }
        self.state().images.push(image);
        Ok(())
    }
}

impl Database<Select<By<Vec<property::Image>, property::Id>>> for Memory {
    type Ok = Vec<property::Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<property::Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mut images = self
            .state()
            .images
            .iter()
            .filter(|i| i.property_id == id)
            .cloned()
            .collect::<Vec<_>>();
        images.sort_by_key(|i| i.order);
        Ok(images)
    }
}

impl Database<Delete<By<Vec<property::Image>, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<property::Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.state().images.retain(|i| i.property_id != id);
        Ok(())
    }
}

impl Database<Insert<property::Feature>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(feature): Insert<property::Feature>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().features.push(feature);
        Ok(())
    }
}

impl Database<Delete<By<Vec<property::Feature>, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<property::Feature>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.state().features.retain(|f| f.property_id != id);
        Ok(())
    }
}

impl Database<Insert<property::View>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(view): Insert<property::View>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.faults().view_inserts {
            return fail(Error::Injected);
        }

        let mut state = self.state();
        if state.views.iter().any(|v| {
            v.property_id == view.property_id && v.ip_address == view.ip_address
        }) {
            return fail(Error::UniqueViolation(Constraint::PropertyView));
        }
        state.views.push(view);
        Ok(())
    }
}

impl Database<Select<By<Option<read::property::Details>, property::Id>>>
    for Memory
{
    type Ok = Option<read::property::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::property::Details>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(state.properties.get(&by.into_inner()).and_then(|p| {
            Some(read::property::Details {
                creator: state.user_summary(p.created_by)?,
                listing: state.listing(p),
            })
        }))
    }
}

impl Database<Select<By<Option<read::property::Summary>, property::Id>>>
    for Memory
{
    type Ok = Option<read::property::Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::property::Summary>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(state
            .properties
            .get(&by.into_inner())
            .map(|p| state.summary(p)))
    }
}

impl
    Database<
        Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    > for Memory
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Selector {
            arguments,
            filter,
            sort,
        } = by.into_inner();
        let (offset, limit) = window(&arguments);

        let state = self.state();
        let mut matched = state
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| sort.compare(a, b));

        Ok(read::property::list::Page {
            items: matched
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|p| state.listing(p))
                .collect(),
            arguments,
        })
    }
}

impl
    Database<
        Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    > for Memory
{
    type Ok = read::property::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .state()
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .count();
        Ok((count as u64).into())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().users.get(&by.into_inner()).cloned())
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| {
                let (a, b): (&str, &str) = (u.email.as_ref(), email.as_ref());
                a.eq_ignore_ascii_case(b)
            })
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return fail(Error::UniqueViolation(Constraint::UserEmail));
        }
        _ = state.users.insert(user.id, user);
        Ok(())
    }
}

impl Database<Insert<Inquiry>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(inquiry): Insert<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(inquiry)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Inquiry>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(inquiry): Update<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().inquiries.insert(inquiry.id, inquiry);
        Ok(())
    }
}

impl Database<Select<By<Option<Inquiry>, inquiry::Id>>> for Memory {
    type Ok = Option<Inquiry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Inquiry>, inquiry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().inquiries.get(&by.into_inner()).cloned())
    }
}

impl
    Database<
        Select<By<read::inquiry::list::Page, read::inquiry::list::Selector>>,
    > for Memory
{
    type Ok = read::inquiry::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::inquiry::list::Page, read::inquiry::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::inquiry::list::Selector {
            arguments, filter, ..
        } = by.into_inner();
        let (offset, limit) = window(&arguments);

        let state = self.state();
        let mut matched = state
            .inquiries
            .values()
            .filter(|i| filter.matches(i))
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| {
            (b.created_at, b.id).cmp(&(a.created_at, a.id))
        });

        Ok(read::inquiry::list::Page {
            items: matched
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|i| read::inquiry::Entry {
                    property: i
                        .property_id
                        .and_then(|id| state.properties.get(&id))
                        .map(|p| state.summary(p)),
                    inquiry: i.clone(),
                })
                .collect(),
            arguments,
        })
    }
}

impl
    Database<
        Select<
            By<read::inquiry::list::TotalCount, read::inquiry::list::Filter>,
        >,
    > for Memory
{
    type Ok = read::inquiry::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::inquiry::list::TotalCount, read::inquiry::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .state()
            .inquiries
            .values()
            .filter(|i| filter.matches(i))
            .count();
        Ok((count as u64).into())
    }
}

impl Database<Insert<LegalDocument>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(document): Insert<LegalDocument>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(document)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<LegalDocument>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(document): Update<LegalDocument>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().legal_documents.insert(document.id, document);
        Ok(())
    }
}

impl Database<Delete<By<LegalDocument, legal_document::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<LegalDocument, legal_document::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().legal_documents.remove(&by.into_inner());
        Ok(())
    }
}

impl Database<Select<By<Option<LegalDocument>, legal_document::Id>>>
    for Memory
{
    type Ok = Option<LegalDocument>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<LegalDocument>, legal_document::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().legal_documents.get(&by.into_inner()).cloned())
    }
}

impl
    Database<
        Select<
            By<
                Option<read::legal_document::Entry>,
                legal_document::Id,
            >,
        >,
    > for Memory
{
    type Ok = Option<read::legal_document::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::legal_document::Entry>, legal_document::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(state
            .legal_documents
            .get(&by.into_inner())
            .map(|d| state.legal_document_entry(d)))
    }
}

impl
    Database<
        Select<
            By<
                Vec<read::legal_document::Entry>,
                read::legal_document::list::Filter,
            >,
        >,
    > for Memory
{
    type Ok = Vec<read::legal_document::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                Vec<read::legal_document::Entry>,
                read::legal_document::list::Filter,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();

        let state = self.state();
        let mut matched = state
            .legal_documents
            .values()
            .filter(|d| filter.matches(d))
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(matched
            .into_iter()
            .map(|d| state.legal_document_entry(d))
            .collect())
    }
}
