//! Catalog entity models.

use serde::{Deserialize, Serialize};

/// An artist record as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// Registry identifier. Once set it is the stable key for every later lookup.
    pub external_id: Option<String>,
    pub biography: Option<String>,
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub homepage_url: Option<String>,
    pub has_tracks: bool,
    /// Unix seconds of the last enrichment write.
    pub enriched_at: Option<i64>,
    /// Provider that wrote the biography. `None` when it was curated by hand.
    pub biography_source: Option<String>,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            external_id: None,
            biography: None,
            instagram_handle: None,
            twitter_handle: None,
            homepage_url: None,
            has_tracks: false,
            enriched_at: None,
            biography_source: None,
        }
    }

    pub fn biography_len(&self) -> usize {
        self.biography
            .as_deref()
            .map(|b| b.chars().count())
            .unwrap_or(0)
    }

    pub fn social_links(&self) -> SocialLinks {
        SocialLinks {
            instagram_handle: self.instagram_handle.clone(),
            twitter_handle: self.twitter_handle.clone(),
            homepage_url: self.homepage_url.clone(),
        }
    }
}

/// The social-link fields of an artist, used both as a snapshot and as a
/// set of candidate values coming from a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub homepage_url: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::is_empty).unwrap_or(true)
}

impl SocialLinks {
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.instagram_handle)
            && !is_blank(&self.twitter_handle)
            && !is_blank(&self.homepage_url)
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.instagram_handle)
            && is_blank(&self.twitter_handle)
            && is_blank(&self.homepage_url)
    }

    /// Candidate values that would land in a slot currently empty in `current`.
    pub fn gaps_filled_by(&self, current: &SocialLinks) -> SocialLinks {
        let pick = |cur: &Option<String>, cand: &Option<String>| {
            if is_blank(cur) && !is_blank(cand) {
                cand.clone()
            } else {
                None
            }
        };
        SocialLinks {
            instagram_handle: pick(&current.instagram_handle, &self.instagram_handle),
            twitter_handle: pick(&current.twitter_handle, &self.twitter_handle),
            homepage_url: pick(&current.homepage_url, &self.homepage_url),
        }
    }
}

/// A release to be written under an artist, with its tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelease {
    pub external_id: String,
    pub title: String,
    pub release_date: Option<String>,
    pub tracks: Vec<NewTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrack {
    pub title: String,
    pub position: u32,
    pub duration_ms: Option<u64>,
}

/// A stored release. Its natural key is `(artist_id, external_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub artist_id: String,
    pub external_id: String,
    pub title: String,
    pub release_date: Option<String>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub release_id: i64,
    pub title: String,
    pub position: u32,
    pub duration_ms: Option<u64>,
}

/// Which artists a job still has to visit.
///
/// Every variant except `MissingExternalId` requires the external id to be
/// present, since the later jobs look artists up by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistPredicate {
    MissingExternalId,
    HasExternalId,
    /// Hand-curated biographies under `min_length` chars. Provider-written
    /// ones count as done whatever their length.
    ShortBiography { min_length: usize },
    MissingSocialLinks,
    MissingTracks,
}

impl ArtistPredicate {
    pub(crate) fn where_clause(&self) -> String {
        match self {
            ArtistPredicate::MissingExternalId => "external_id IS NULL".to_string(),
            ArtistPredicate::HasExternalId => "external_id IS NOT NULL".to_string(),
            ArtistPredicate::ShortBiography { min_length } => format!(
                "external_id IS NOT NULL AND biography_source IS NULL \
                 AND (biography IS NULL OR length(biography) < {})",
                min_length
            ),
            ArtistPredicate::MissingSocialLinks => "external_id IS NOT NULL AND (\
                instagram_handle IS NULL OR instagram_handle = '' OR \
                twitter_handle IS NULL OR twitter_handle = '' OR \
                homepage_url IS NULL OR homepage_url = '')"
                .to_string(),
            ArtistPredicate::MissingTracks => {
                "external_id IS NOT NULL AND has_tracks = 0".to_string()
            }
        }
    }
}
