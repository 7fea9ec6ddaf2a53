//! Site profile registry.
//!
//! Maps a normalized domain (lowercase, no leading `www.`) to hand-tuned
//! extraction rules. Lookup is an exact match on the domain key; anything
//! unknown is a miss and falls through to the generic strategies.

use std::collections::BTreeMap;

use scraper::Selector;
use tracing::debug;
use url::Url;

use novelfetch_shared::{NovelFetchError, Result, SiteProfile, normalize_domain};

use crate::dom::parse_selector;

/// A profile with its selectors parsed.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    profile: SiteProfile,
    pub(crate) content: Vec<Selector>,
    pub(crate) title: Vec<Selector>,
    pub(crate) removal: Vec<Selector>,
}

impl CompiledProfile {
    fn compile(profile: SiteProfile) -> Result<Self> {
        if profile.content_selectors.is_empty() {
            return Err(NovelFetchError::config(format!(
                "profile '{}' has no content selectors",
                profile.domain
            )));
        }

        let parse_all = |rules: &[String]| -> Result<Vec<Selector>> {
            rules
                .iter()
                .map(|r| {
                    parse_selector(r).map_err(|e| {
                        NovelFetchError::config(format!("profile '{}': {e}", profile.domain))
                    })
                })
                .collect()
        };

        Ok(Self {
            content: parse_all(&profile.content_selectors)?,
            title: parse_all(&profile.title_selectors)?,
            removal: parse_all(&profile.removal_selectors)?,
            profile,
        })
    }

    /// The source rules.
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn domain(&self) -> &str {
        &self.profile.domain
    }
}

/// Immutable domain → profile table, built once per process.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, CompiledProfile>,
}

impl ProfileRegistry {
    /// Built-in profiles only.
    pub fn builtin() -> Result<Self> {
        Self::new(Vec::new())
    }

    /// Built-in profiles with `extra` merged over them; an extra profile
    /// replaces a built-in one with the same domain.
    pub fn new(extra: Vec<SiteProfile>) -> Result<Self> {
        let mut profiles = BTreeMap::new();

        for mut profile in builtin_profiles().into_iter().chain(extra) {
            profile.domain = normalize_domain(&profile.domain);
            let compiled = CompiledProfile::compile(profile)?;
            let domain = compiled.domain().to_string();
            if profiles.insert(domain.clone(), compiled).is_some() {
                debug!(%domain, "configured profile overrides a built-in one");
            }
        }

        Ok(Self { profiles })
    }

    /// Find the profile for the URL's host, if any.
    pub fn lookup(&self, url: &Url) -> Option<&CompiledProfile> {
        let host = url.host_str()?;
        self.profiles.get(&normalize_domain(host))
    }

    /// All profiles, ordered by domain.
    pub fn iter(&self) -> impl Iterator<Item = &SiteProfile> {
        self.profiles.values().map(CompiledProfile::profile)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn profile(domain: &str, content: &[&str], title: &[&str], removal: &[&str]) -> SiteProfile {
    let owned = |rules: &[&str]| rules.iter().map(|r| (*r).to_string()).collect();
    SiteProfile {
        domain: domain.to_string(),
        content_selectors: owned(content),
        title_selectors: owned(title),
        removal_selectors: owned(removal),
    }
}

/// Profiles shipped with the binary.
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![
        profile(
            "novelfull.net",
            &["#chapter-content"],
            &[".chapter-title", "h1"],
            &[".ads", ".ad", ".advertisement", "#next_chap", "#prev_chap", ".chapter-nav"],
        ),
        profile(
            "lightnovelworld.com",
            &[".chapter-c", ".chapter-content"],
            &[".chapter-title"],
            &[".ads", ".chapter-nav", ".donation-box", ".announcement"],
        ),
        profile(
            "webnovel.com",
            &[".chapter-content", ".cha-content"],
            &[".cha-tit", ".chapter-title"],
            &[".cha-top", ".cha-bot", ".advertisement"],
        ),
        profile(
            "royalroad.com",
            &[".chapter-inner", ".chapter-content"],
            &[".fic-header h1"],
            &[".portlet-body", ".fiction-info", ".author-note"],
        ),
        profile(
            "wuxiaworld.com",
            &[".chapter-content", ".fr-view"],
            &[".chapter-title"],
            &[".chapter-nav", ".MuiBox-root"],
        ),
        profile(
            "scribblehub.com",
            &["#chp_raw", ".chp_raw"],
            &[".chapter-title", ".wi_fic_title"],
            &[".wi_authornotes", ".chapter-afterword"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn builtin_registry_compiles() {
        let registry = ProfileRegistry::builtin().unwrap();
        assert_eq!(registry.len(), builtin_profiles().len());
    }

    #[test]
    fn lookup_strips_www_and_case() {
        let registry = ProfileRegistry::builtin().unwrap();
        let hit = registry.lookup(&url("https://WWW.NovelFull.net/book/chapter-3.html"));
        assert_eq!(hit.map(CompiledProfile::domain), Some("novelfull.net"));
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let registry = ProfileRegistry::builtin().unwrap();
        assert!(registry.lookup(&url("https://m.royalroad.com/fiction/1")).is_none());
        assert!(registry.lookup(&url("https://royalroad.com.evil.example/x")).is_none());
        assert!(registry.lookup(&url("https://example.com/x")).is_none());
    }

    #[test]
    fn extra_profile_overrides_builtin() {
        let custom = profile("www.novelfull.net", &["#custom"], &[], &[]);
        let registry = ProfileRegistry::new(vec![custom]).unwrap();
        assert_eq!(registry.len(), builtin_profiles().len());
        let hit = registry.lookup(&url("https://novelfull.net/c1")).unwrap();
        assert_eq!(hit.profile().content_selectors, vec!["#custom".to_string()]);
    }

    #[test]
    fn extra_profile_adds_domain() {
        let custom = profile("reader.example.org", &["#text"], &["h2"], &[".promo"]);
        let registry = ProfileRegistry::new(vec![custom]).unwrap();
        assert!(registry.lookup(&url("http://reader.example.org/1")).is_some());
    }

    #[test]
    fn invalid_selector_is_config_error() {
        let broken = profile("broken.example", &["div["], &[], &[]);
        let err = ProfileRegistry::new(vec![broken]).unwrap_err();
        assert!(matches!(err, NovelFetchError::Config { .. }));
    }

    #[test]
    fn profile_without_content_is_rejected() {
        let empty = profile("empty.example", &[], &[], &[]);
        assert!(ProfileRegistry::new(vec![empty]).is_err());
    }
}
