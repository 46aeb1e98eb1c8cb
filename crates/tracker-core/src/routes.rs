// ── Client route table and navigation guard ──
//
// Mirrors the browser client's route tree: path patterns with login and
// permission metadata. The guard is a pure function over the table and
// the cached current-user record; it performs no I/O, so callers decide
// when to (re)load the principal before asking.

use crate::model::{Permission, UserInfo};

/// Access metadata for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Reachable without a session.
    Public,
    /// Requires a logged-in user.
    LoginRequired,
    /// Requires a logged-in user holding the permission (after
    /// expansion). Implies `LoginRequired`.
    Permission(Permission),
}

/// One route: a name, a path pattern, and access metadata.
///
/// Patterns are `/`-separated segments; the `:uuid` segment matches any
/// single identifier segment. Static segments win over `:uuid` by table
/// order (e.g. `/datasets/add` is listed before `/datasets/:uuid`).
#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub pattern: &'static str,
    pub access: RouteAccess,
}

/// A successful path match: the route plus the captured identifier.
#[derive(Debug, Clone)]
pub struct RouteMatch<'table> {
    pub route: &'table Route,
    pub uuid: Option<String>,
}

/// The guard's verdict for a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDecision {
    Allow,
    /// No (or anonymous) session; the UI redirects to the login page.
    RequireLogin,
    /// Logged in but lacking the required permission.
    Forbidden,
    /// No route matches the path.
    NotFound,
}

/// The client route table.
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// The standard Data Tracker route tree.
    pub fn new() -> Self {
        const fn route(name: &'static str, pattern: &'static str, access: RouteAccess) -> Route {
            Route {
                name,
                pattern,
                access,
            }
        }
        use RouteAccess::{LoginRequired, Permission as Perm, Public};

        Self {
            routes: vec![
                route("home", "/", Public),
                route("about", "/about", Public),
                route("login", "/login", Public),
                // Datasets: public browsing, permission-gated editing.
                route("dataset-browser", "/datasets", Public),
                route("dataset-add", "/datasets/add", Perm(Permission::DataEdit)),
                route("dataset-about", "/datasets/:uuid", Public),
                route(
                    "dataset-edit",
                    "/datasets/:uuid/edit",
                    Perm(Permission::DataEdit),
                ),
                route("dataset-log", "/datasets/:uuid/log", LoginRequired),
                // Collections mirror datasets.
                route("collection-browser", "/collections", Public),
                route(
                    "collection-add",
                    "/collections/add",
                    Perm(Permission::DataEdit),
                ),
                route("collection-about", "/collections/:uuid", Public),
                route(
                    "collection-edit",
                    "/collections/:uuid/edit",
                    Perm(Permission::DataEdit),
                ),
                route("collection-log", "/collections/:uuid/log", LoginRequired),
                // Orders are not public at all.
                route("order-browser", "/orders", Perm(Permission::DataEdit)),
                route("order-add", "/orders/add", Perm(Permission::DataEdit)),
                route("order-about", "/orders/:uuid", Perm(Permission::DataEdit)),
                route("order-edit", "/orders/:uuid/edit", Perm(Permission::DataEdit)),
                route("order-log", "/orders/:uuid/log", Perm(Permission::DataEdit)),
                // The current user's own pages.
                route("account", "/account", LoginRequired),
                route("account-log", "/account/log", LoginRequired),
                route("account-actions", "/account/actions", LoginRequired),
                // Admin user management.
                route(
                    "admin-user-manager",
                    "/admin/user",
                    Perm(Permission::UserManagement),
                ),
                route(
                    "admin-user-add",
                    "/admin/user/add",
                    Perm(Permission::UserManagement),
                ),
                route(
                    "admin-user-edit",
                    "/admin/user/:uuid/edit",
                    Perm(Permission::UserManagement),
                ),
                route(
                    "admin-user-log",
                    "/admin/user/:uuid/log",
                    Perm(Permission::UserManagement),
                ),
                route(
                    "admin-user-actions",
                    "/admin/user/:uuid/actions",
                    Perm(Permission::UserManagement),
                ),
                route("forbidden", "/forbidden", Public),
                route("error", "/error", Public),
            ],
        }
    }

    /// Resolve a path to its route. First pattern in table order wins.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments: Vec<&str> = split_path(path);
        self.routes.iter().find_map(|route| {
            let pattern: Vec<&str> = split_path(route.pattern);
            match_segments(&pattern, &segments).map(|uuid| RouteMatch { route, uuid })
        })
    }

    /// Decide a navigation attempt.
    ///
    /// `user` is the cached principal; pass `None` when no `user/me`
    /// fetch has completed yet. An anonymous record (empty id) counts as
    /// not logged in.
    pub fn decide(&self, path: &str, user: Option<&UserInfo>) -> NavDecision {
        let Some(matched) = self.resolve(path) else {
            return NavDecision::NotFound;
        };
        let logged_in = user.is_some_and(UserInfo::is_logged_in);

        match matched.route.access {
            RouteAccess::Public => NavDecision::Allow,
            RouteAccess::LoginRequired => {
                if logged_in {
                    NavDecision::Allow
                } else {
                    NavDecision::RequireLogin
                }
            }
            RouteAccess::Permission(required) => {
                if !logged_in {
                    NavDecision::RequireLogin
                } else if user.is_some_and(|u| u.has_permission(required)) {
                    NavDecision::Allow
                } else {
                    NavDecision::Forbidden
                }
            }
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match pattern segments against path segments, capturing the `:uuid`
/// value if present.
fn match_segments(pattern: &[&str], path: &[&str]) -> Option<Option<String>> {
    if pattern.len() != path.len() {
        return None;
    }
    let mut uuid = None;
    for (expected, actual) in pattern.iter().zip(path) {
        if *expected == ":uuid" {
            uuid = Some((*actual).to_owned());
        } else if expected != actual {
            return None;
        }
    }
    Some(uuid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user_with(permissions: Vec<Permission>) -> UserInfo {
        UserInfo {
            id: "u-1".into(),
            permissions,
            ..UserInfo::default()
        }
    }

    #[test]
    fn static_segment_wins_over_uuid() {
        let table = RouteTable::new();
        let matched = table.resolve("/datasets/add").unwrap();
        assert_eq!(matched.route.name, "dataset-add");
        assert!(matched.uuid.is_none());
    }

    #[test]
    fn uuid_segment_is_captured() {
        let table = RouteTable::new();
        let matched = table.resolve("/datasets/d-0007/edit").unwrap();
        assert_eq!(matched.route.name, "dataset-edit");
        assert_eq!(matched.uuid.as_deref(), Some("d-0007"));
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let table = RouteTable::new();
        assert_eq!(table.resolve("/orders/").unwrap().route.name, "order-browser");
    }

    #[test]
    fn public_routes_allow_anonymous() {
        let table = RouteTable::new();
        assert_eq!(table.decide("/datasets", None), NavDecision::Allow);
        assert_eq!(table.decide("/datasets/d-1", None), NavDecision::Allow);
    }

    #[test]
    fn login_gated_route_redirects_anonymous() {
        let table = RouteTable::new();
        assert_eq!(table.decide("/account", None), NavDecision::RequireLogin);

        let anonymous = UserInfo::default();
        assert_eq!(
            table.decide("/account", Some(&anonymous)),
            NavDecision::RequireLogin
        );
    }

    #[test]
    fn permission_gated_route_forbids_unprivileged() {
        let table = RouteTable::new();
        let plain = user_with(vec![]);
        assert_eq!(
            table.decide("/admin/user", Some(&plain)),
            NavDecision::Forbidden
        );

        let admin = user_with(vec![Permission::UserManagement]);
        assert_eq!(table.decide("/admin/user", Some(&admin)), NavDecision::Allow);
    }

    #[test]
    fn expanded_permissions_satisfy_the_guard() {
        let table = RouteTable::new();
        // DATA_MANAGEMENT grants DATA_EDIT through the expansion table.
        let manager = user_with(vec![Permission::DataManagement]);
        assert_eq!(
            table.decide("/orders/o-3/edit", Some(&manager)),
            NavDecision::Allow
        );
    }

    #[test]
    fn unknown_path_is_not_found() {
        let table = RouteTable::new();
        assert_eq!(table.decide("/teleporter", None), NavDecision::NotFound);
    }
}
