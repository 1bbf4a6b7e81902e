//! Which screen is shown

use crate::wallet::WalletSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Disconnected,
    RoleSelection,
    Dashboard(Role),
}

/// `Disconnected → RoleSelection → Teacher | Student`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    route: Route,
    session: Option<WalletSession>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            route: Route::Disconnected,
            session: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    /// A wallet connected; the role has to be picked again
    pub fn connected(&mut self, session: WalletSession) {
        self.session = Some(session);
        self.route = Route::RoleSelection;
    }

    pub fn disconnect(&mut self) {
        self.session = None;
        self.route = Route::Disconnected;
    }

    /// Open a dashboard; only possible from role selection
    pub fn select_role(&mut self, role: Role) -> bool {
        if self.route != Route::RoleSelection {
            return false;
        }
        self.route = Route::Dashboard(role);
        true
    }

    pub fn switch_role(&mut self) {
        if matches!(self.route, Route::Dashboard(_)) {
            self.route = Route::RoleSelection;
        }
    }
}
