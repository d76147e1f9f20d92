//! Test fixture creation for catalog and user databases

use super::constants::*;
use anyhow::Result;
use artist_enrichment_server::catalog_store::{Artist, CatalogStore, SqliteCatalogStore};
use artist_enrichment_server::user::{
    AuthToken, SqliteUserStore, UserAuthTokenStore, UserRole, UserStore,
};
use std::path::Path;

/// Creates the test catalog inside `db_dir`:
/// - Artist A without any metadata
/// - Artist B with a registry id, a long biography and tracks
/// - Artist C with a registry id but nothing the release registry knows
/// - an artist the registry search never finds
pub fn create_test_catalog(db_dir: &Path) -> Result<()> {
    let store = SqliteCatalogStore::new(db_dir.join("catalog.db"))?;

    store.insert_artist(&Artist::new(ARTIST_A_ID, ARTIST_A_NAME))?;

    let mut artist_b = Artist::new(ARTIST_B_ID, ARTIST_B_NAME);
    artist_b.external_id = Some(ARTIST_B_MBID.to_string());
    artist_b.biography = Some("b".repeat(2500));
    artist_b.has_tracks = true;
    store.insert_artist(&artist_b)?;

    let mut artist_c = Artist::new(ARTIST_C_ID, ARTIST_C_NAME);
    artist_c.external_id = Some(ARTIST_C_MBID.to_string());
    store.insert_artist(&artist_c)?;

    store.insert_artist(&Artist::new(UNKNOWN_ARTIST_ID, UNKNOWN_ARTIST_NAME))?;

    Ok(())
}

/// Tokens issued to the fixture users.
pub struct TestTokens {
    pub admin: String,
    pub regular: String,
}

/// Creates the user database inside `db_dir` with one admin and one regular
/// user, each holding a fresh API token.
pub fn create_test_users(db_dir: &Path) -> Result<TestTokens> {
    let store = SqliteUserStore::new(db_dir.join("user.db"))?;

    let issue = |handle: &str, role: UserRole| -> Result<String> {
        let user_id = store.create_user(handle)?;
        store.add_user_role(user_id, role)?;
        let token = AuthToken::new_for_user(user_id);
        store.add_user_auth_token(&token)?;
        Ok(token.value.0)
    };

    Ok(TestTokens {
        admin: issue(ADMIN_USER, UserRole::Admin)?,
        regular: issue(TEST_USER, UserRole::Regular)?,
    })
}
