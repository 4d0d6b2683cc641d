use parley_types::models::User;

/// User roster loaded at startup. Read-only for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: Vec<User>,
}

impl CredentialStore {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// True iff a user with exactly this username and password hash exists.
    pub fn validate(&self, username: &str, password_hash: &str) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && u.password == password_hash)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
