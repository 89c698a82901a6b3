use std::sync::Arc;

use crate::models::auth::User;
use crate::services::account::AccountService;
use crate::services::api::{ApiClient, ApiError};
use crate::services::auth;
use crate::services::session::SessionStore;

/// Render-time gate decision for protected content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Admit,
    Deny { message: &'static str },
}

impl Gate {
    pub fn admitted(self) -> bool {
        matches!(self, Gate::Admit)
    }
}

pub fn protected(session: &SessionStore) -> Gate {
    if session.is_authenticated() {
        Gate::Admit
    } else {
        Gate::Deny {
            message: "Por favor inicia sesión para acceder a esta página",
        }
    }
}

pub fn protected_by_permission(session: &SessionStore, permission: &str) -> Gate {
    if auth::has_permission(session, permission) {
        Gate::Admit
    } else {
        Gate::Deny {
            message: "No tienes permisos para acceder a esta página",
        }
    }
}

pub fn protected_by_any_permission(session: &SessionStore, permissions: &[&str]) -> Gate {
    if auth::has_any_permission(session, permissions) {
        Gate::Admit
    } else {
        Gate::Deny {
            message: "No tienes permisos para acceder a esta página",
        }
    }
}

pub fn protected_by_role(session: &SessionStore, role: &str) -> Gate {
    if auth::has_role(session, role) {
        Gate::Admit
    } else {
        Gate::Deny {
            message: "No tienes el rol necesario para acceder a esta página",
        }
    }
}

/// One sidebar entry: a coarse section gated by a permission, optionally
/// restricted to the administrative role.
#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub permission: &'static str,
    pub admin_only: bool,
}

pub const MENU: [MenuItem; 8] = [
    MenuItem {
        id: "dashboard",
        label: "Inicio",
        path: "/dashboard",
        permission: "view_dashboard",
        admin_only: false,
    },
    MenuItem {
        id: "products",
        label: "Productos",
        path: "/productos",
        permission: "view_products",
        admin_only: false,
    },
    MenuItem {
        id: "sales",
        label: "Ventas",
        path: "/ventas",
        permission: "view_sales",
        admin_only: false,
    },
    MenuItem {
        id: "clients",
        label: "Clientes",
        path: "/clientes",
        permission: "view_clients",
        admin_only: false,
    },
    MenuItem {
        id: "inventory",
        label: "Inventario",
        path: "/inventario",
        permission: "view_inventory",
        admin_only: false,
    },
    MenuItem {
        id: "reports",
        label: "Reportes",
        path: "/reportes",
        permission: "view_reports",
        admin_only: false,
    },
    MenuItem {
        id: "users",
        label: "Usuarios",
        path: "/usuarios",
        permission: "view_users",
        admin_only: true,
    },
    MenuItem {
        id: "settings",
        label: "Configuración",
        path: "/configuracion",
        permission: "manage_roles",
        admin_only: true,
    },
];

/// Sidebar entries visible to the current session: admin-only entries need
/// the ADMIN role, everything needs its permission.
pub fn visible_menu(session: &SessionStore) -> Vec<&'static MenuItem> {
    let is_admin = session.user_role().as_deref() == Some("ADMIN");
    MENU.iter()
        .filter(|item| {
            if item.admin_only && !is_admin {
                return false;
            }
            auth::has_permission(session, item.permission)
        })
        .collect()
}

/// Top-level authenticated/unauthenticated switch.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    Unauthenticated,
    Authenticated { user: Option<User> },
}

pub struct AppShell {
    session: Arc<SessionStore>,
}

impl AppShell {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> ShellState {
        if self.session.is_authenticated() {
            ShellState::Authenticated {
                user: self.session.cached_user(),
            }
        } else {
            ShellState::Unauthenticated
        }
    }

    pub fn logout(&self) {
        self.session.clear();
    }
}

/// Login entry point: presence checks locally, then the login call, then the
/// session is written as one unit.
pub struct LoginController {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

impl Default for LoginController {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginController {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            error: None,
        }
    }

    pub async fn submit(&mut self, api: &ApiClient) -> anyhow::Result<User> {
        if self.email.trim().is_empty() {
            let err = ApiError::Validation("Por favor ingresa tu email".into());
            self.error = Some(err.to_string());
            return Err(err.into());
        }
        if self.password.trim().is_empty() {
            let err = ApiError::Validation("Por favor ingresa tu contraseña".into());
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        match AccountService::login(api, &self.email, &self.password).await {
            Ok(response) => {
                api.session().set_session(&response.token, &response.user)?;
                self.error = None;
                Ok(response.user)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }
}

/// Tabs of the products page. Edit carries its product id, so an edit tab
/// without a product is unrepresentable; leaving it drops the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductsTab {
    List,
    Add,
    Edit(String),
    Upload,
}

pub struct ProductsPage {
    pub tab: ProductsTab,
    pub refresh_trigger: u32,
}

impl Default for ProductsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductsPage {
    pub fn new() -> Self {
        Self {
            tab: ProductsTab::List,
            refresh_trigger: 0,
        }
    }

    pub fn select(&mut self, tab: ProductsTab) {
        self.tab = tab;
    }

    pub fn open_edit(&mut self, product_id: impl Into<String>) {
        self.tab = ProductsTab::Edit(product_id.into());
    }

    /// The upload tab is only reachable for the administrative role.
    pub fn open_upload(&mut self, session: &SessionStore) -> bool {
        if !auth::has_role(session, "ADMIN") {
            return false;
        }
        self.tab = ProductsTab::Upload;
        true
    }

    /// A finished bulk import forces the list to reload and returns to it.
    pub fn bulk_upload_succeeded(&mut self) {
        self.refresh_trigger += 1;
        self.tab = ProductsTab::List;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::tests::session_with_claims;
    use serde_json::json;

    fn admin_session() -> SessionStore {
        session_with_claims(json!({
            "userId": "u-1",
            "email": "admin@example.com",
            "role": "ADMIN",
            "permissions": [
                "view_dashboard",
                "view_products",
                "view_users",
                "manage_roles"
            ],
        }))
    }

    fn vendor_session() -> SessionStore {
        session_with_claims(json!({
            "userId": "u-2",
            "email": "v@example.com",
            "role": "VENDEDOR",
            "permissions": ["view_dashboard", "view_products", "view_users"],
        }))
    }

    #[test]
    fn menu_filters_by_permission_and_role() {
        let admin = admin_session();
        let ids: Vec<_> = visible_menu(&admin).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["dashboard", "products", "users", "settings"]);

        // Having view_users is not enough without the ADMIN role.
        let vendor = vendor_session();
        let ids: Vec<_> = visible_menu(&vendor).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["dashboard", "products"]);

        let anonymous = SessionStore::in_memory();
        assert!(visible_menu(&anonymous).is_empty());
    }

    #[test]
    fn gates_answer_uniformly_without_a_session() {
        let anonymous = SessionStore::in_memory();
        assert!(!protected(&anonymous).admitted());
        assert!(!protected_by_permission(&anonymous, "view_products").admitted());
        assert!(!protected_by_any_permission(&anonymous, &["view_products"]).admitted());
        assert!(!protected_by_role(&anonymous, "ADMIN").admitted());
    }

    #[test]
    fn gates_admit_with_matching_session() {
        let admin = admin_session();
        assert!(protected(&admin).admitted());
        assert!(protected_by_permission(&admin, "view_products").admitted());
        assert!(protected_by_role(&admin, "ADMIN").admitted());
        assert!(!protected_by_role(&admin, "VENDEDOR").admitted());
    }

    #[test]
    fn upload_tab_is_admin_gated() {
        let mut page = ProductsPage::new();
        let vendor = vendor_session();
        assert!(!page.open_upload(&vendor));
        assert_eq!(page.tab, ProductsTab::List);

        let admin = admin_session();
        assert!(page.open_upload(&admin));
        assert_eq!(page.tab, ProductsTab::Upload);
    }

    #[test]
    fn bulk_upload_success_returns_to_list_and_bumps_refresh() {
        let mut page = ProductsPage::new();
        page.open_edit("p-1");
        assert_eq!(page.tab, ProductsTab::Edit("p-1".into()));
        page.bulk_upload_succeeded();
        assert_eq!(page.tab, ProductsTab::List);
        assert_eq!(page.refresh_trigger, 1);
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let api = ApiClient::new(
            "http://127.0.0.1:1",
            Arc::new(SessionStore::in_memory()),
        );
        let mut login = LoginController::new();
        let err = login.submit(&api).await.unwrap_err();
        assert_eq!(err.to_string(), "Por favor ingresa tu email");

        login.email = "ana@example.com".into();
        let err = login.submit(&api).await.unwrap_err();
        assert_eq!(err.to_string(), "Por favor ingresa tu contraseña");
    }
}
