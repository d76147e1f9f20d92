pub mod auth;
pub mod permissions;
mod sqlite_user_store;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue};
pub use permissions::{resolve_permissions, Permission, UserRole};
pub use sqlite_user_store::{SqliteUserStore, USER_VERSIONED_SCHEMAS};
pub use user_store::{UserAuthTokenStore, UserStore};
