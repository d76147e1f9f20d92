//! Derives catalog fields from registry URL relations.

use super::ArtistRelation;
use crate::catalog_store::SocialLinks;
use reqwest::Url;

const SOCIAL_NETWORK: &str = "social network";
const OFFICIAL_HOMEPAGE: &str = "official homepage";
const WIKIPEDIA: &str = "wikipedia";

const INSTAGRAM_HOSTS: &[&str] = &["instagram.com"];
const TWITTER_HOSTS: &[&str] = &["twitter.com", "x.com", "mobile.twitter.com"];

fn bare_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.to_lowercase())
        .map(|h| h.strip_prefix("www.").map(String::from).unwrap_or(h))
}

fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// First path segment of a profile URL, without "@" and percent-decoded.
fn handle_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.find(|s| !s.is_empty())?;
    let decoded = percent_decode(segment);
    let handle = decoded.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

/// The URL without query, fragment or trailing slashes.
fn clean_homepage(raw: &str) -> Option<String> {
    let without_fragment = raw.split('#').next().unwrap_or(raw);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let trimmed = without_query.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(percent_decode(trimmed))
    }
}

/// At most one value per field, the first match in provider order.
pub fn extract_social_links(relations: &[ArtistRelation]) -> SocialLinks {
    let mut links = SocialLinks::default();

    for relation in relations {
        let relation_type = relation.relation_type.to_lowercase();
        if relation_type == OFFICIAL_HOMEPAGE {
            if links.homepage_url.is_none() {
                links.homepage_url = clean_homepage(&relation.url);
            }
            continue;
        }
        if relation_type != SOCIAL_NETWORK {
            continue;
        }

        let Ok(url) = Url::parse(relation.url.trim()) else {
            continue;
        };
        let Some(host) = bare_host(&url) else {
            continue;
        };

        if INSTAGRAM_HOSTS.contains(&host.as_str()) {
            if links.instagram_handle.is_none() {
                links.instagram_handle = handle_from_url(&url);
            }
        } else if TWITTER_HOSTS.contains(&host.as_str()) && links.twitter_handle.is_none() {
            links.twitter_handle = handle_from_url(&url);
        }
    }

    links
}

/// Page title from the first wikipedia relation (last path segment).
pub fn wikipedia_title(relations: &[ArtistRelation]) -> Option<String> {
    relations
        .iter()
        .filter(|r| r.relation_type.eq_ignore_ascii_case(WIKIPEDIA))
        .filter_map(|r| Url::parse(r.url.trim()).ok())
        .filter_map(|url| {
            url.path_segments()?
                .filter(|s| !s.is_empty())
                .last()
                .map(percent_decode)
        })
        .find(|title| !title.is_empty())
}
