use serde::{Deserialize, Serialize};

/// A registered account, keyed by phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    /// 10 digits; doubles as the record id
    pub phone: String,
    pub hashed_password: String,
    pub tos_agreement: bool,
    /// Ids of the checks this user owns
    #[serde(default)]
    pub checks: Vec<String>,
}

impl User {
    /// JSON form safe to return to clients (no password hash)
    pub fn public(&self) -> serde_json::Value {
        serde_json::json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "phone": self.phone,
            "tosAgreement": self.tos_agreement,
            "checks": self.checks,
        })
    }
}
