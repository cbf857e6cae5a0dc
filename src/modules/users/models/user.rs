use serde::{Deserialize, Serialize};

/// Directory entry used to validate buyer and admin references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub role: String,
}

impl User {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            role: role.into(),
        }
    }
}
