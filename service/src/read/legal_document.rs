//! [`LegalDocument`]-related read definitions.

use crate::{domain::LegalDocument, read};

/// [`LegalDocument`] along with its creator.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The [`LegalDocument`] itself.
    pub document: LegalDocument,

    /// [`read::user::Summary`] of the [`LegalDocument`] creator, if they
    /// still exist.
    pub creator: Option<read::user::Summary>,
}

pub mod list {
    //! [`LegalDocument`] list definitions.

    use crate::domain::{legal_document, LegalDocument};

    /// Filter of [`LegalDocument`]s list.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// [`legal_document::Category`] to match.
        pub category: Option<legal_document::Category>,

        /// Indicator whether only active [`LegalDocument`]s should match.
        pub active_only: bool,
    }

    impl Filter {
        /// Checks whether the provided [`LegalDocument`] matches this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, d: &LegalDocument) -> bool {
            self.category.as_ref().map_or(true, |c| d.category == *c)
                && (!self.active_only || d.is_active)
        }
    }
}
