//! [`Query`] collection related to the multiple [`LegalDocument`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::LegalDocument, Query};

use super::DatabaseQuery;

/// Queries a list of [`LegalDocument`]s matching the provided
/// [`read::legal_document::list::Filter`].
pub type List = DatabaseQuery<
    By<Vec<read::legal_document::Entry>, read::legal_document::list::Filter>,
>;
