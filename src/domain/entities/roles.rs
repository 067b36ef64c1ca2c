use std::collections::{HashMap, HashSet};

/// Role name → members. A member is a nick, a host, or a full `nick!host`.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, HashSet<String>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(roles: &HashMap<String, Vec<String>>) -> Self {
        Self {
            roles: roles
                .iter()
                .map(|(role, members)| (role.clone(), members.iter().cloned().collect()))
                .collect(),
        }
    }

    pub fn with_role<I, S>(mut self, role: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(role.into(), members.into_iter().map(Into::into).collect());
        self
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// May `nick` at `host` use something restricted to `role`?
    ///
    /// Unrestricted handlers are always permitted. A role missing from the
    /// table denies everyone.
    pub fn permitted(&self, role: Option<&str>, nick: &str, host: &str) -> bool {
        let Some(role) = role else {
            return true;
        };

        let Some(members) = self.roles.get(role) else {
            tracing::debug!("Unknown role '{}', denying {}!{}", role, nick, host);
            return false;
        };

        members.contains(nick) || members.contains(host) || members.contains(&format!("{}!{}", nick, host))
    }
}
