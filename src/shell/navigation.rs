use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

use crate::auth::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("role {0} has no navigation entries")]
    Empty(Role),
    #[error("role {0} does not list its own dashboard")]
    MissingDashboard(Role),
    #[error("{href} is listed for both {first} and {second}")]
    Overlap { href: String, first: Role, second: Role },
}

/// Role → ordered sidebar entries. Every role has a non-empty list that
/// includes its own dashboard, and no href appears under two roles.
#[derive(Debug, Clone)]
pub struct NavigationMap {
    entries: BTreeMap<Role, Vec<NavEntry>>,
}

impl NavigationMap {
    pub fn new(entries: BTreeMap<Role, Vec<NavEntry>>) -> Result<Self, NavigationError> {
        {
            let mut owner: HashMap<&str, Role> = HashMap::new();
            for role in Role::ALL {
                let list = entries
                    .get(&role)
                    .filter(|l| !l.is_empty())
                    .ok_or(NavigationError::Empty(role))?;
                // Redirects land on the dashboard, so it must be reachable.
                if !list.iter().any(|e| e.href == role.dashboard()) {
                    return Err(NavigationError::MissingDashboard(role));
                }
                for entry in list {
                    if let Some(first) = owner.insert(&entry.href, role) {
                        return Err(NavigationError::Overlap {
                            href: entry.href.clone(),
                            first,
                            second: role,
                        });
                    }
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn builtin() -> Result<Self, NavigationError> {
        let list = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(href, label)| NavEntry {
                    href: href.to_string(),
                    label: label.to_string(),
                })
                .collect::<Vec<_>>()
        };

        let mut entries = BTreeMap::new();
        entries.insert(
            Role::Admin,
            list(&[
                ("/admin/dashboard", "Dashboard"),
                ("/admin/students", "Students"),
                ("/admin/exams", "Exams"),
                ("/admin/papers", "Papers"),
                ("/admin/results", "Results"),
                ("/admin/profile", "Profile"),
            ]),
        );
        entries.insert(
            Role::Student,
            list(&[
                ("/student/dashboard", "Dashboard"),
                ("/student/exams", "Exams"),
                ("/student/history", "History"),
                ("/student/profile", "Profile"),
            ]),
        );
        Self::new(entries)
    }

    pub fn for_role(&self, role: Role) -> &[NavEntry] {
        self.entries.get(&role).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn permits(&self, role: Role, href: &str) -> bool {
        self.for_role(role).iter().any(|e| e.href == href)
    }
}
