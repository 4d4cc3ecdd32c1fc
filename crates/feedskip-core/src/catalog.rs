//! The platform descriptor table.
//!
//! Every component that needs to know "how do I search platform X" reads
//! from here; nothing else re-derives per-platform branches. Scheme lists
//! and web templates track what the platforms' apps actually register.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A searchable platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Reddit,
    X,
    TikTok,
    Instagram,
    Facebook,
}

impl Platform {
    pub fn all() -> [Platform; 6] {
        [
            Platform::YouTube,
            Platform::Reddit,
            Platform::X,
            Platform::TikTok,
            Platform::Instagram,
            Platform::Facebook,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Reddit => "Reddit",
            Platform::X => "X",
            Platform::TikTok => "TikTok",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
        }
    }

    /// Lowercase identifier used in result ids and config keys.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Reddit => "reddit",
            Platform::X => "x",
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
        }
    }

    /// Whether a native app registers a search-capable deep link.
    ///
    /// TikTok's scheme exists but lands on the For You page, not search;
    /// Facebook's search URIs stopped resolving years ago. Both go
    /// straight to the web tier.
    pub fn supports_native_search(&self) -> bool {
        matches!(
            self,
            Platform::YouTube | Platform::Reddit | Platform::X | Platform::Instagram
        )
    }

    /// TikTok has no addressable search entry at all, so the user finishes
    /// typing inside an embedded surface; an empty query is fine there.
    pub fn requires_embedded_entry(&self) -> bool {
        matches!(self, Platform::TikTok)
    }

    /// Native deep-link URIs to try, in order. Empty when the platform has
    /// no search-capable scheme. The query arrives raw; shaping and
    /// percent-encoding happen here.
    pub fn native_search_uris(&self, query: &str) -> Vec<String> {
        let encoded = urlencoding::encode(query);
        match self {
            Platform::YouTube => vec![format!(
                "youtube://www.youtube.com/results?search_query={encoded}"
            )],
            Platform::Reddit => vec![format!("reddit://www.reddit.com/search/?q={encoded}")],
            Platform::X => vec![
                format!("x://search?q={encoded}"),
                // Older installs still register the twitter scheme
                format!("twitter://search?query={encoded}"),
            ],
            Platform::Instagram => match shape_instagram(query) {
                InstagramTarget::Profile(user) => {
                    vec![format!(
                        "instagram://user?username={}",
                        urlencoding::encode(&user)
                    )]
                }
                InstagramTarget::Hashtag(tag) => {
                    vec![format!("instagram://tag?name={}", urlencoding::encode(&tag))]
                }
            },
            Platform::TikTok | Platform::Facebook => Vec::new(),
        }
    }

    /// Canonical https search URL. The OS may still hand this to an
    /// installed app; we don't care which way it goes.
    pub fn web_search_url(&self, query: &str, locale: Option<&str>) -> String {
        let encoded = urlencoding::encode(query);
        match self {
            Platform::YouTube => {
                let mut url = format!("https://www.youtube.com/results?search_query={encoded}");
                if let Some(lang) = locale {
                    url.push_str(&format!("&hl={}", urlencoding::encode(lang)));
                }
                url
            }
            Platform::Reddit => format!("https://www.reddit.com/search/?q={encoded}"),
            Platform::X => {
                let mut url = format!("https://x.com/search?q={encoded}");
                if let Some(lang) = locale {
                    url.push_str(&format!("&lang={}", urlencoding::encode(lang)));
                }
                url
            }
            Platform::TikTok => format!("https://www.tiktok.com/search?q={encoded}"),
            Platform::Instagram => match shape_instagram(query) {
                InstagramTarget::Profile(user) => {
                    format!("https://www.instagram.com/{}/", urlencoding::encode(&user))
                }
                InstagramTarget::Hashtag(tag) => format!(
                    "https://www.instagram.com/explore/tags/{}/",
                    urlencoding::encode(&tag)
                ),
            },
            Platform::Facebook => format!("https://www.facebook.com/search/top/?q={encoded}"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "youtube" => Ok(Platform::YouTube),
            "reddit" => Ok(Platform::Reddit),
            "x" | "twitter" => Ok(Platform::X),
            "tiktok" => Ok(Platform::TikTok),
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Instagram is the one platform where the query's shape changes the
/// destination: `@name` means a profile, anything else means a hashtag.
enum InstagramTarget {
    Profile(String),
    Hashtag(String),
}

fn shape_instagram(query: &str) -> InstagramTarget {
    if let Some(user) = query.strip_prefix('@') {
        InstagramTarget::Profile(user.to_string())
    } else {
        InstagramTarget::Hashtag(query.trim_start_matches('#').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pull the value of a query parameter back out of a URL.
    fn query_param(url: &str, name: &str) -> Option<String> {
        let (_, qs) = url.split_once('?')?;
        qs.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == name).then(|| urlencoding::decode(v).unwrap().into_owned())
        })
    }

    #[test]
    fn web_urls_round_trip_the_query() {
        let query = "rust & async / await?";
        let cases = [
            (Platform::YouTube, "search_query"),
            (Platform::Reddit, "q"),
            (Platform::X, "q"),
            (Platform::TikTok, "q"),
            (Platform::Facebook, "q"),
        ];
        for (platform, param) in cases {
            let url = platform.web_search_url(query, None);
            assert_eq!(
                query_param(&url, param).as_deref(),
                Some(query),
                "round trip failed for {platform}"
            );
        }
    }

    #[test]
    fn locale_is_appended_where_supported() {
        let url = Platform::YouTube.web_search_url("cats", Some("de"));
        assert_eq!(query_param(&url, "hl").as_deref(), Some("de"));

        let url = Platform::X.web_search_url("cats", Some("fr"));
        assert_eq!(query_param(&url, "lang").as_deref(), Some("fr"));

        // Reddit has no locale parameter
        let url = Platform::Reddit.web_search_url("cats", Some("de"));
        assert!(!url.contains("de"));
    }

    #[test]
    fn instagram_at_query_targets_a_profile() {
        let url = Platform::Instagram.web_search_url("@nasa", None);
        assert_eq!(url, "https://www.instagram.com/nasa/");
        assert!(!url.contains('@'));

        let uris = Platform::Instagram.native_search_uris("@nasa");
        assert_eq!(uris, vec!["instagram://user?username=nasa"]);
    }

    #[test]
    fn instagram_plain_query_targets_a_hashtag() {
        let url = Platform::Instagram.web_search_url("cats", None);
        assert_eq!(url, "https://www.instagram.com/explore/tags/cats/");

        // Leading # is stripped rather than double-encoded
        let url = Platform::Instagram.web_search_url("#cats", None);
        assert_eq!(url, "https://www.instagram.com/explore/tags/cats/");

        let uris = Platform::Instagram.native_search_uris("#cats");
        assert_eq!(uris, vec!["instagram://tag?name=cats"]);
    }

    #[test]
    fn native_capability_matches_the_table() {
        assert!(Platform::YouTube.supports_native_search());
        assert!(Platform::Reddit.supports_native_search());
        assert!(Platform::X.supports_native_search());
        assert!(Platform::Instagram.supports_native_search());
        assert!(!Platform::TikTok.supports_native_search());
        assert!(!Platform::Facebook.supports_native_search());

        assert!(Platform::TikTok.native_search_uris("x").is_empty());
        assert!(Platform::Facebook.native_search_uris("x").is_empty());
    }

    #[test]
    fn only_tiktok_accepts_an_empty_query() {
        for platform in Platform::all() {
            assert_eq!(
                platform.requires_embedded_entry(),
                platform == Platform::TikTok
            );
        }
    }

    #[test]
    fn x_tries_both_schemes_in_order() {
        let uris = Platform::X.native_search_uris("rust");
        assert_eq!(uris.len(), 2);
        assert!(uris[0].starts_with("x://"));
        assert!(uris[1].starts_with("twitter://"));
    }

    #[test]
    fn platform_parses_from_str() {
        assert_eq!("reddit".parse::<Platform>().unwrap(), Platform::Reddit);
        assert_eq!("Twitter".parse::<Platform>().unwrap(), Platform::X);
        assert!("myspace".parse::<Platform>().is_err());
    }
}
