use super::auth::{AuthToken, AuthTokenValue};
use super::permissions::UserRole;
use super::user_store::{UserAuthTokenStore, UserStore};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned, Column, ForeignKey, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const USER_TABLE_V_1: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["handle"]],
};

const USER_ROLE_TABLE_V_1: Table = Table {
    name: "user_role",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                cascade_delete: true,
            })
        ),
        sqlite_column!("role", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_user_role_user_id", "user_id")],
    unique_constraints: &[&["user_id", "role"]],
};

const AUTH_TOKEN_TABLE_V_1: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                cascade_delete: true,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[("idx_auth_token_value", "value")],
    unique_constraints: &[&["value"]],
};

pub const USER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[USER_TABLE_V_1, USER_ROLE_TABLE_V_1, AUTH_TOKEN_TABLE_V_1],
    migration: None,
}];

pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path.as_ref(), USER_VERSIONED_SCHEMAS, "user")?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                |row| {
                    Ok(AuthToken {
                        user_id: row.get::<_, i64>(0)? as usize,
                        value: AuthTokenValue(row.get(1)?),
                        created: row.get(2)?,
                        last_used: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    fn add_user_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value, created) VALUES (?1, ?2, ?3)",
            params![token.user_id as i64, token.value.0, token.created],
        )?;
        Ok(())
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![chrono::Utc::now().timestamp(), token.0],
        )?;
        Ok(())
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM auth_token WHERE value = ?1", params![token.0])?;
        Ok(deleted > 0)
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (handle) VALUES (?1)",
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![user_handle],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|v| v as usize))
    }

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let handle = conn
            .query_row(
                "SELECT handle FROM user WHERE id = ?1",
                params![user_id as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(handle)
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT handle FROM user ORDER BY handle")?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(handles)
    }

    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT role FROM user_role WHERE user_id = ?1")?;
        let roles = stmt
            .query_map(params![user_id as i64], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok().and_then(|s| UserRole::from_str(&s)))
            .collect();
        Ok(roles)
    }

    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO user_role (user_id, role) VALUES (?1, ?2)",
            params![user_id as i64, role.as_str()],
        )?;
        Ok(())
    }

    fn remove_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM user_role WHERE user_id = ?1 AND role = ?2",
            params![user_id as i64, role.as_str()],
        )?;
        Ok(())
    }
}
