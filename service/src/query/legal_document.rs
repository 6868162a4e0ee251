//! [`Query`] collection related to a single [`LegalDocument`].

use common::operations::By;

use crate::{domain::legal_document, read};
#[cfg(doc)]
use crate::{domain::LegalDocument, Query};

use super::DatabaseQuery;

/// Queries a [`LegalDocument`] along with its creator by its
/// [`legal_document::Id`].
pub type ById = DatabaseQuery<
    By<Option<read::legal_document::Entry>, legal_document::Id>,
>;
