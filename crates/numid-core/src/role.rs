//! Application role → upstream role name.

use numid_types::Role;

/// Role name the upstream provider uses for the user.
pub const UPSTREAM_USER: &str = "user";

/// Map an application role onto the provider's vocabulary.
///
/// Only `assistant` is renamed (to `model`); every other role keeps its name.
pub fn to_upstream(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        other => other.as_str(),
    }
}

/// Whether `role` counts as the user once normalized.
pub fn is_user(role: Role) -> bool {
    to_upstream(role) == UPSTREAM_USER
}
