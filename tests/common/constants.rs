//! Shared constants for end-to-end tests
//!
//! When test data changes (user handles, catalog IDs, provider payloads),
//! update only this file.

// ============================================================================
// Test Users
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Admin test user handle
pub const ADMIN_USER: &str = "admin";

// ============================================================================
// Test Catalog
// ============================================================================

/// "Artist A": no external id yet, resolvable by the fake registry
pub const ARTIST_A_ID: &str = "artist-a";
pub const ARTIST_A_NAME: &str = "Artist A";
pub const ARTIST_A_MBID: &str = "abc-123";

/// "Artist B": already has a long biography and a registry id
pub const ARTIST_B_ID: &str = "artist-b";
pub const ARTIST_B_NAME: &str = "Artist B";
pub const ARTIST_B_MBID: &str = "def-456";

/// "Artist C": has a registry id, but the registry has no releases for it
pub const ARTIST_C_ID: &str = "artist-c";
pub const ARTIST_C_NAME: &str = "Artist C";
pub const ARTIST_C_MBID: &str = "ghi-789";

/// "Artist D": resolvable like Artist A, but not part of the default catalog
pub const ARTIST_D_ID: &str = "artist-d";
pub const ARTIST_D_NAME: &str = "Artist D";
pub const ARTIST_D_MBID: &str = "jkl-012";

/// "Nobody Knows": the registry search finds nothing
pub const UNKNOWN_ARTIST_ID: &str = "artist-unknown";
pub const UNKNOWN_ARTIST_NAME: &str = "Nobody Knows";

/// Number of artists in the test catalog
pub const CATALOG_ARTIST_COUNT: usize = 4;

// ============================================================================
// Fake Provider Data
// ============================================================================

pub const ARTIST_A_WIKI_TITLE: &str = "Artist_A";
pub const ARTIST_A_SUMMARY: &str =
    "Artist A is a fictional band formed to exercise the enrichment pipeline.";
pub const ARTIST_A_INSTAGRAM: &str = "artist.a";
pub const ARTIST_A_TWITTER: &str = "artist_a";
pub const ARTIST_A_HOMEPAGE: &str = "https://artist-a.example";
pub const ARTIST_A_RELEASE_TITLE: &str = "First Light";

// ============================================================================
// Timeouts
// ============================================================================

/// Max time to wait for a test server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Per-request timeout of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
