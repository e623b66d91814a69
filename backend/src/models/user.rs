//! User data model and request payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Identifier assigned by storage.
    #[schema(example = "65f1c0ffee0ddba11ad0b0e5")]
    pub id: String,
    /// Contact address.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Public handle.
    #[schema(example = "ada")]
    pub username: String,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    /// Contact address.
    pub email: String,
    /// Public handle.
    pub username: String,
}

/// Body of `PUT /users/{uuid}`; replaces every mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    /// Contact address.
    pub email: String,
    /// Public handle.
    pub username: String,
}

/// Body of `PATCH /users/{uuid}`; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatchUser {
    /// New contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New public handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    /// Build a user from a creation payload and a storage-assigned id.
    pub fn from_create(id: impl Into<String>, payload: CreateUser) -> Self {
        let CreateUser { email, username } = payload;
        Self {
            id: id.into(),
            email,
            username,
        }
    }

    /// Merge the present fields of `patch` onto this user.
    #[must_use]
    pub fn patched(self, patch: PatchUser) -> Self {
        Self {
            id: self.id,
            email: patch.email.unwrap_or(self.email),
            username: patch.username.unwrap_or(self.username),
        }
    }
}
