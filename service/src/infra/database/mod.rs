//! [`Database`]-related implementations.

#[cfg(test)]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};
use strum::{EnumString, IntoStaticStr};

#[cfg(test)]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Unique constraint enforced by the [`Database`].
///
/// Serialized as the name of the constraint in the SQL schema.
#[derive(
    Clone, Copy, Debug, Display, EnumString, Eq, IntoStaticStr, PartialEq,
)]
pub enum Constraint {
    /// Slug of a property is unique.
    #[display("properties_slug_key")]
    #[strum(serialize = "properties_slug_key")]
    PropertySlug,

    /// Property is viewed at most once from the same IP address.
    #[display("property_views_property_id_ip_address_key")]
    #[strum(serialize = "property_views_property_id_ip_address_key")]
    PropertyView,

    /// Email of a user is unique.
    #[display("users_email_key")]
    #[strum(serialize = "users_email_key")]
    UserEmail,
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Memory`] error.
    #[cfg(test)]
    Memory(memory::Error),

    /// [`Postgres`] error.
    #[cfg(feature = "postgres")]
    Postgres(postgres::Error),
}

impl Error {
    /// Returns the unique [`Constraint`] violated by the operation which
    /// failed with this [`Error`], if any.
    #[must_use]
    pub fn unique_violation(&self) -> Option<Constraint> {
        match *self {
            #[cfg(test)]
            Self::Memory(ref e) => e.unique_violation(),
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.unique_violation(),
        }
    }

    /// Checks whether this [`Error`] is a violation of the provided unique
    /// [`Constraint`].
    #[must_use]
    pub fn violates(&self, constraint: Constraint) -> bool {
        self.unique_violation() == Some(constraint)
    }
}

#[cfg(test)]
mod spec {
    use super::Constraint;

    #[test]
    fn names_constraints_as_in_schema() {
        let schema = include_str!("../../../../migrations/V1__init.sql");
        for c in [
            Constraint::PropertySlug,
            Constraint::PropertyView,
            Constraint::UserEmail,
        ] {
            let name: &'static str = c.into();
            assert_eq!(name, c.to_string());
            assert_eq!(name.parse::<Constraint>(), Ok(c));
            assert!(schema.contains(name), "`{name}` is not in schema");
        }
        assert!("users_pkey".parse::<Constraint>().is_err());
    }
}
