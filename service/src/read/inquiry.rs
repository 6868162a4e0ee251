//! [`Inquiry`]-related read definitions.

use crate::{domain::Inquiry, read};

/// [`Inquiry`] along with a summary of the property it's about.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The [`Inquiry`] itself.
    pub inquiry: Inquiry,

    /// [`read::property::Summary`] of the referenced property, if any.
    pub property: Option<read::property::Summary>,
}

pub mod list {
    //! [`Inquiry`] list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{inquiry, Inquiry};

    use super::Entry;

    define_pagination!(Entry, Filter);

    /// Default [`Arguments::limit()`] of an [`Inquiry`] list.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// [`inquiry::Status`] to match.
        pub status: Option<inquiry::Status>,

        /// [`inquiry::Kind`] to match.
        pub kind: Option<inquiry::Kind>,
    }

    impl Filter {
        /// Checks whether the provided [`Inquiry`] matches this [`Filter`].
        #[must_use]
        pub fn matches(&self, i: &Inquiry) -> bool {
            self.status.map_or(true, |s| i.status == s)
                && self.kind.map_or(true, |k| i.kind == k)
        }
    }

    /// Total count of [`Inquiry`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(u64);
}
