//! Abstractions for offset pagination.

use std::str::FromStr;

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// Number of the requested page, starting from `1`.
    page: u32,

    /// Maximum number of items on a page.
    limit: u32,
}

impl Arguments {
    /// Maximum allowed [`Arguments::limit()`].
    pub const MAX_LIMIT: u32 = 100;

    /// Creates new [`Arguments`].
    ///
    /// Missing `page` defaults to the first one, missing `limit` defaults to
    /// the provided `default_limit`.
    ///
    /// [`None`] is returned if `page` is zero, or `limit` is zero or exceeds
    /// [`Arguments::MAX_LIMIT`].
    #[must_use]
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Option<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);
        (page > 0 && limit > 0 && limit <= Self::MAX_LIMIT)
            .then_some(Self { page, limit })
    }

    /// Returns the requested page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the requested page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F, S = ()> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Filter being applied to the result.
    pub filter: F,

    /// Sorting being applied to the result.
    pub sort: S,
}

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<N> {
    /// Items on this [`Page`].
    pub items: Vec<N>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

/// Information about a [`Page`] relative to the whole result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageInfo {
    /// Total number of items matching the filter.
    pub total: u64,

    /// Current page number.
    pub page: u32,

    /// Page size.
    pub limit: u32,

    /// Total number of pages.
    pub total_pages: u64,

    /// Indicator whether there is a page after the current one.
    pub has_next: bool,

    /// Indicator whether there is a page before the current one.
    pub has_prev: bool,
}

impl PageInfo {
    /// Computes the [`PageInfo`] for the provided [`Arguments`] and `total`
    /// number of matching items.
    #[must_use]
    pub fn new(arguments: &Arguments, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(arguments.limit));
        Self {
            total,
            page: arguments.page,
            limit: arguments.limit,
            total_pages,
            has_next: u64::from(arguments.page) < total_pages,
            has_prev: arguments.page > 1,
        }
    }
}

/// A [`Page`] along with its [`PageInfo`].
#[derive(Clone, Debug)]
pub struct Connection<N> {
    /// Selected [`Page`].
    pub page: Page<N>,

    /// [`PageInfo`] of the selected [`Page`].
    pub info: PageInfo,
}

impl<N> Connection<N> {
    /// Creates a new [`Connection`] out of the [`Page`] and the `total`
    /// number of matching items.
    #[must_use]
    pub fn new(page: Page<N>, total: u64) -> Self {
        let info = PageInfo::new(&page.arguments, total);
        Self { page, info }
    }
}

/// Sorting order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    #[default]
    Descending,
}

impl Order {
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// Applies this [`Order`] to the provided ascending [`Ordering`].
    ///
    /// [`Ordering`]: std::cmp::Ordering
    #[must_use]
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for Order {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err("invalid `Order`, expected `asc` or `desc`"),
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        $crate::define_pagination!($node, $filter, ());
    };
    ($node:ty, $filter:ty, $sort:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "A [`Page`] along with its [`PageInfo`]."]
        pub type Connection = $crate::pagination::Connection<$node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $sort>;
    };
}
