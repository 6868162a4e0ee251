//! [`Query`] collection related to a single [`Property`].

use common::operations::By;

use crate::{domain::property, read};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries [`read::property::Details`] of a [`Property`] by its
/// [`property::Id`].
pub type ById =
    DatabaseQuery<By<Option<read::property::Details>, property::Id>>;
