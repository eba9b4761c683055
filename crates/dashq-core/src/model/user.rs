use serde::{Deserialize, Serialize};

/// The already-authenticated caller every operation acts on behalf of
///
/// All query history reads and writes are scoped to `(org_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUser {
    pub org_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub login: String,
}

impl SignedInUser {
    pub fn new(org_id: i64, user_id: i64) -> Self {
        Self {
            org_id,
            user_id,
            login: String::new(),
        }
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = login.into();
        self
    }
}
