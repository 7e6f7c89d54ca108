use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::helpers;
use crate::monitoring::validation::ID_LENGTH;

/// How long a token authenticates after creation or extension
const TOKEN_LIFETIME_HOURS: i64 = 1;

/// A session token tying a 20-char id to a phone number until expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub phone: String,
    pub expires: DateTime<Utc>,
}

impl Token {
    pub fn new(phone: String) -> Self {
        Self {
            id: helpers::random_id(ID_LENGTH),
            phone,
            expires: Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires <= Utc::now()
    }

    /// Push expiry one lifetime out from now
    pub fn extend(&mut self) {
        self.expires = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
    }
}
