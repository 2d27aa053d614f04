use serde::Serialize;
use tracing::debug;

use super::navigation::{NavEntry, NavigationMap};
use super::pages::{Page, PageContent};
use crate::auth::{Identity, Role, SessionState};

/// The part of the identity shown in the sidebar header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellUser {
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

impl From<&Identity> for ShellUser {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            role: identity.role,
            profile_photo: identity.profile_photo.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ShellView {
    Loading,
    Login,
    Redirect {
        to: String,
    },
    NotFound {
        user: ShellUser,
        navigation: Vec<NavEntry>,
        path: String,
    },
    Page {
        user: ShellUser,
        navigation: Vec<NavEntry>,
        active: String,
        content: PageContent,
    },
}

/// Decides what the client sees for a path given the session state.
pub struct ViewShell {
    navigation: NavigationMap,
}

impl ViewShell {
    pub fn new(navigation: NavigationMap) -> Self {
        Self { navigation }
    }

    pub fn render(&self, state: &SessionState, path: &str) -> ShellView {
        let identity = match state {
            SessionState::Initializing => return ShellView::Loading,
            SessionState::Unauthenticated => return ShellView::Login,
            SessionState::Authenticated(identity) => identity,
        };
        let role = identity.role;

        if path.trim_end_matches('/').is_empty() {
            return redirect(role.dashboard());
        }

        let Some(page) = Page::from_path(path) else {
            return ShellView::NotFound {
                user: identity.into(),
                navigation: self.navigation.for_role(role).to_vec(),
                path: path.to_string(),
            };
        };

        // Sidebar scope: only the role's own entries are reachable.
        if !self.navigation.permits(role, page.path()) {
            debug!(%role, path = page.path(), "path outside navigation; redirecting");
            return redirect(role.dashboard());
        }

        // The page's own check, independent of the sidebar.
        if let Err(to) = page.guard(role) {
            debug!(%role, path = page.path(), "page role mismatch; redirecting");
            return redirect(to);
        }

        ShellView::Page {
            user: identity.into(),
            navigation: self.navigation.for_role(role).to_vec(),
            active: page.path().to_string(),
            content: page.content(identity),
        }
    }
}

fn redirect(to: &str) -> ShellView {
    ShellView::Redirect { to: to.to_string() }
}
