//! [`User`] read model definition.

use serde::Serialize;

use crate::domain::{user, User};

/// Publicly exposable summary of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Summary {
    /// ID of the [`User`].
    pub id: user::Id,

    /// [`user::Name`] of the [`User`].
    pub name: user::Name,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,
}

impl From<&User> for Summary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
