use super::auth::{AuthToken, AuthTokenValue};
use super::permissions::UserRole;
use anyhow::Result;

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns the token with the given value, if any.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    fn add_user_auth_token(&self, token: &AuthToken) -> Result<()>;

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Deletes the token. Returns whether it existed.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<bool>;
}

pub trait UserStore: UserAuthTokenStore + Send + Sync {
    /// Creates a new user and returns its id.
    fn create_user(&self, user_handle: &str) -> Result<usize>;

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>>;

    fn get_all_user_handles(&self) -> Result<Vec<String>>;

    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>>;

    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()>;

    fn remove_user_role(&self, user_id: usize, role: UserRole) -> Result<()>;
}
