//! Prompt composition, style lookup tables, and content-hash identifiers.
//!
//! Everything here is pure: the same client inputs always produce the same
//! final prompt, cache key, and derived job id.

use sha2::{Digest, Sha256};
use std::fmt;

/// Visual style requested by the client.
///
/// Unrecognized style keys fall back to [`Style::Cinematic`] for lookups, but
/// the raw key is still what goes into the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    #[default]
    Cinematic,
    Anime,
    Realism,
}

/// Fixed bundle of provider-side generation parameters for a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderStyle {
    pub theme: &'static str,
    pub style: &'static str,
    pub voice: &'static str,
    pub aspect_ratio: &'static str,
}

impl Style {
    pub const DEFAULT_KEY: &'static str = "cinematic";

    /// Resolve a client-supplied style key, falling back to the default.
    pub fn from_key(key: &str) -> Self {
        match key {
            "cinematic" => Style::Cinematic,
            "anime" => Style::Anime,
            "realism" => Style::Realism,
            _ => Style::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Cinematic => "cinematic",
            Style::Anime => "anime",
            Style::Realism => "realism",
        }
    }

    /// Descriptive suffix appended to the user prompt.
    pub fn template(self) -> &'static str {
        match self {
            Style::Cinematic => {
                "Style: cinematic, high quality, dramatic lighting, shallow depth of field, smooth camera motion."
            }
            Style::Anime => {
                "Style: anime, vibrant colors, dynamic motion lines, stylized character design."
            }
            Style::Realism => {
                "Style: photorealistic, high detail, natural lighting, subtle camera shake."
            }
        }
    }

    pub fn provider_params(self) -> ProviderStyle {
        let style = match self {
            Style::Cinematic => "cinematic",
            Style::Anime => "anime",
            Style::Realism => "photographic",
        };
        ProviderStyle {
            theme: "Hormozi_1",
            style,
            voice: "Charlie",
            aspect_ratio: "9:16",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compose the final prompt sent to the provider.
pub fn build_prompt(user_prompt: &str, style: Style) -> String {
    format!("{}. {}", user_prompt.trim(), style.template())
}

/// Content hash over the effective generation inputs.
pub fn cache_key_for(final_prompt: &str, style_key: &str, duration_secs: i64) -> String {
    sha256_hex(format!("{final_prompt}||{style_key}||{duration_secs}").as_bytes())
}

/// Where a locally synthesized job id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOrigin {
    Cache,
    Mock,
    Rate,
}

impl JobOrigin {
    pub fn tag(self) -> &'static str {
        match self {
            JobOrigin::Cache => "cache",
            JobOrigin::Mock => "mock",
            JobOrigin::Rate => "rate",
        }
    }
}

/// Deterministic short job id, e.g. `cache-1a2b3c4d5e`.
///
/// The origin tag keeps ids from different paths disjoint for the same key.
pub fn derived_job_id(origin: JobOrigin, cache_key: &str) -> String {
    let digest = sha256_hex(cache_key.as_bytes());
    format!("{}-{}", origin.tag(), &digest[..10])
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_prompt_trims_and_appends_suffix() {
        let prompt = build_prompt("  a calm ocean  ", Style::Anime);
        assert_eq!(
            prompt,
            "a calm ocean. Style: anime, vibrant colors, dynamic motion lines, stylized character design."
        );
    }

    #[test]
    fn unknown_style_falls_back_to_cinematic() {
        assert_eq!(Style::from_key("watercolor"), Style::Cinematic);
        assert_eq!(Style::from_key(""), Style::Cinematic);
        assert_eq!(Style::from_key("realism"), Style::Realism);
    }

    #[test]
    fn realism_maps_to_photographic_provider_style() {
        let params = Style::Realism.provider_params();
        assert_eq!(params.style, "photographic");
        assert_eq!(params.theme, "Hormozi_1");
        assert_eq!(params.voice, "Charlie");
        assert_eq!(params.aspect_ratio, "9:16");
    }

    #[test]
    fn cache_key_is_stable() {
        let a = cache_key_for("sunset. Style: x", "cinematic", 8);
        let b = cache_key_for("sunset. Style: x", "cinematic", 8);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cache_key_changes_with_each_input() {
        let base = cache_key_for("sunset", "cinematic", 8);
        assert_ne!(base, cache_key_for("sunrise", "cinematic", 8));
        assert_ne!(base, cache_key_for("sunset", "anime", 8));
        assert_ne!(base, cache_key_for("sunset", "cinematic", 9));
    }

    #[test]
    fn unknown_style_key_still_distinguishes_cache_key() {
        // Same final prompt (both fall back to cinematic), different raw style key.
        let prompt = build_prompt("forest", Style::from_key("bogus"));
        assert_ne!(
            cache_key_for(&prompt, "bogus", 8),
            cache_key_for(&prompt, "cinematic", 8)
        );
    }

    #[test]
    fn derived_ids_are_tagged_and_disjoint() {
        let key = cache_key_for("forest", "cinematic", 8);
        let cache = derived_job_id(JobOrigin::Cache, &key);
        let mock = derived_job_id(JobOrigin::Mock, &key);
        assert!(cache.starts_with("cache-"));
        assert_eq!(cache.len(), "cache-".len() + 10);
        assert_ne!(cache, mock);
        assert_eq!(cache["cache-".len()..], mock["mock-".len()..]);
        assert_eq!(cache, derived_job_id(JobOrigin::Cache, &key));
    }
}
