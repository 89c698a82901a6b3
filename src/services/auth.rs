//! Authorization predicates over the current session. Pure and synchronous:
//! each call re-derives the claims from the stored token so the answer always
//! reflects the latest session. None of these ever panic; an absent or
//! undecodable session uniformly answers "no access".

use super::session::SessionStore;

pub fn has_permission(session: &SessionStore, permission: &str) -> bool {
    session
        .current_user()
        .is_some_and(|u| u.permissions.iter().any(|p| p == permission))
}

pub fn has_any_permission(session: &SessionStore, permissions: &[&str]) -> bool {
    session.current_user().is_some_and(|u| {
        permissions
            .iter()
            .any(|p| u.permissions.iter().any(|held| held == p))
    })
}

pub fn has_all_permissions(session: &SessionStore, permissions: &[&str]) -> bool {
    session.current_user().is_some_and(|u| {
        permissions
            .iter()
            .all(|p| u.permissions.iter().any(|held| held == p))
    })
}

pub fn has_role(session: &SessionStore, role: &str) -> bool {
    session.current_user().is_some_and(|u| u.role == role)
}

pub fn has_any_role(session: &SessionStore, roles: &[&str]) -> bool {
    session
        .current_user()
        .is_some_and(|u| roles.contains(&u.role.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::tests::session_with_claims;
    use serde_json::json;

    fn vendor_session() -> SessionStore {
        session_with_claims(json!({
            "userId": "u-2",
            "email": "vendedor@example.com",
            "role": "VENDEDOR",
            "permissions": ["view_products", "view_sales"],
        }))
    }

    #[test]
    fn permission_membership() {
        let session = vendor_session();
        assert!(has_permission(&session, "view_products"));
        assert!(!has_permission(&session, "delete_products"));
    }

    #[test]
    fn any_and_all_permissions() {
        let session = vendor_session();
        assert!(has_any_permission(&session, &["delete_products", "view_sales"]));
        assert!(!has_any_permission(&session, &["delete_products", "manage_roles"]));
        assert!(has_all_permissions(&session, &["view_products", "view_sales"]));
        assert!(!has_all_permissions(&session, &["view_products", "manage_roles"]));
    }

    #[test]
    fn role_checks() {
        let session = vendor_session();
        assert!(has_role(&session, "VENDEDOR"));
        assert!(!has_role(&session, "ADMIN"));
        assert!(has_any_role(&session, &["ADMIN", "VENDEDOR"]));
        assert!(!has_any_role(&session, &["ADMIN"]));
    }

    #[test]
    fn no_session_means_no_access() {
        let session = SessionStore::in_memory();
        assert!(!has_permission(&session, "view_products"));
        assert!(!has_any_permission(&session, &["view_products"]));
        assert!(!has_all_permissions(&session, &["view_products"]));
        assert!(!has_role(&session, "ADMIN"));
        assert!(!has_any_role(&session, &["ADMIN"]));
    }
}
