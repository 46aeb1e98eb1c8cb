// ── Current user and permissions ──
//
// The authenticated principal is an Entry-shaped record; an empty id
// means "not logged in" (an anonymous `user/me` fetch returns a record
// with every field empty). Permissions use the backend's expansion
// table: holding one permission can grant several effective ones.

use strum::{Display, EnumString};
use tracing::trace;

use tracker_api::Entry;

/// Permission types recognized by the backend.
///
/// The wire form is SCREAMING_SNAKE_CASE (`"USER_MANAGEMENT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Orders,
    OwnersRead,
    UserAdd,
    UserSearch,
    UserManagement,
    DataEdit,
    DataManagement,
}

impl Permission {
    /// The effective permissions granted by holding this one.
    ///
    /// Mirrors the backend's expansion table: e.g. `ORDERS` also grants
    /// `USER_ADD` and `USER_SEARCH` (order editors may create and look
    /// up users), and `DATA_MANAGEMENT` subsumes the data-editing set.
    pub fn grants(self) -> &'static [Self] {
        match self {
            Self::Orders => &[Self::Orders, Self::UserAdd, Self::UserSearch],
            Self::OwnersRead => &[Self::OwnersRead],
            Self::UserAdd => &[Self::UserAdd],
            Self::UserSearch => &[Self::UserSearch],
            Self::UserManagement => &[Self::UserManagement, Self::UserAdd, Self::UserSearch],
            Self::DataEdit => &[Self::DataEdit],
            Self::DataManagement => &[
                Self::DataManagement,
                Self::DataEdit,
                Self::Orders,
                Self::OwnersRead,
            ],
        }
    }
}

/// The authenticated principal, decoded from `GET /api/v1/user/me/`.
///
/// Loaded once per session and cached; invalidated only by an explicit
/// logout or a failed reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub affiliation: String,
    pub orcid: String,
    pub permissions: Vec<Permission>,
}

impl UserInfo {
    /// `true` when a session exists (the backend returns an all-empty
    /// record for anonymous requests).
    pub fn is_logged_in(&self) -> bool {
        !self.id.is_empty()
    }

    /// Whether the user's permission set, after expansion, covers
    /// `required`.
    pub fn has_permission(&self, required: Permission) -> bool {
        self.permissions
            .iter()
            .any(|held| held.grants().contains(&required))
    }
}

impl From<Entry> for UserInfo {
    fn from(entry: Entry) -> Self {
        let text = |key: &str| {
            entry
                .extra
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned()
        };

        let permissions = entry
            .extra
            .get("permissions")
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|name| {
                        name.parse::<Permission>()
                            .inspect_err(|_| trace!(name, "unknown permission ignored"))
                            .ok()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: entry.id,
            name: text("name"),
            email: text("email"),
            affiliation: text("affiliation"),
            orcid: text("orcid"),
            permissions,
        }
    }
}
