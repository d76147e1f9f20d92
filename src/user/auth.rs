//! Bearer token credentials.

use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AuthToken {
    pub user_id: usize,
    /// Unix seconds
    pub created: i64,
    pub last_used: Option<i64>,
    pub value: AuthTokenValue,
}

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

impl AuthToken {
    pub fn new_for_user(user_id: usize) -> Self {
        AuthToken {
            user_id,
            created: chrono::Utc::now().timestamp(),
            last_used: None,
            value: AuthTokenValue::generate(),
        }
    }
}
