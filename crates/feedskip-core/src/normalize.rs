//! Pure conversion from raw provider records to [`SearchResult`], plus the
//! synthesized fallbacks that keep a valid request from ever coming back
//! empty-handed.

use std::collections::HashMap;

use feedskip_api::reddit::RedditPost;
use feedskip_api::tiktok::ExtractedLink;

use crate::catalog::Platform;
use crate::models::{ResultType, SearchResult};

/// Public base for permalinks. Content URLs always point at reddit.com,
/// whatever base the client fetched from.
const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Legacy `thumbnail` field values that are placeholders, not URLs.
const THUMBNAIL_SENTINELS: &[&str] = &["self", "default", "nsfw", "spoiler"];

/// Turn a listing child into a result, or None when the required fields
/// are missing and the child is unusable.
pub fn reddit_post(post: &RedditPost) -> Option<SearchResult> {
    let title = post.title.as_deref()?;
    let subreddit = post.subreddit.as_deref()?;
    let permalink = post.permalink.as_deref()?;
    let author = post.author.as_deref()?;

    let content_url = format!("{REDDIT_WEB_BASE}{permalink}");

    let result_type = if post.is_video {
        ResultType::Video
    } else if post.url.as_deref().is_some_and(is_image_url) {
        ResultType::Image
    } else {
        ResultType::Post
    };

    let mut description = format!("r/{subreddit} \u{2022} by u/{author}");
    if post.score > 0 {
        description.push_str(&format!(" \u{2022} {} upvotes", post.score));
    }
    if post.num_comments > 0 {
        description.push_str(&format!(" \u{2022} {} comments", post.num_comments));
    }

    let mut metadata = HashMap::new();
    metadata.insert("subreddit".to_string(), subreddit.to_string());
    metadata.insert("author".to_string(), author.to_string());

    Some(SearchResult {
        id: SearchResult::derive_id(Platform::Reddit, &content_url),
        title: title.to_string(),
        description,
        content_url,
        thumbnail_url: reddit_thumbnail(post),
        result_type,
        metadata,
        is_synthesized_fallback: false,
    })
}

/// Thumbnail resolution, first match wins:
/// direct image URL, then preview source, then the legacy field.
/// The order is load-bearing; it changes which image is shown.
fn reddit_thumbnail(post: &RedditPost) -> Option<String> {
    if let Some(url) = post.url.as_deref() {
        if url.starts_with("https://") && is_image_url(url) {
            return Some(url.to_string());
        }
    }

    if let Some(preview) = &post.preview {
        if let Some(image) = preview.images.first() {
            // Reddit serves the preview URL HTML-escaped even with raw_json
            // on some listings
            return Some(image.source.url.replace("&amp;", "&"));
        }
    }

    post.thumbnail
        .as_deref()
        .filter(|t| t.starts_with("https://") && !THUMBNAIL_SENTINELS.contains(t))
        .map(|t| t.to_string())
}

fn is_image_url(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// A candidate link scraped off the TikTok search page.
pub fn tiktok_link(link: &ExtractedLink) -> SearchResult {
    SearchResult {
        id: SearchResult::derive_id(Platform::TikTok, &link.href),
        title: link.text.clone(),
        description: format!("Search result from {}", link.domain()),
        content_url: link.href.clone(),
        thumbnail_url: None,
        result_type: ResultType::Website,
        metadata: HashMap::new(),
        is_synthesized_fallback: false,
    }
}

/// Exactly two always-navigable Reddit links for when a well-formed
/// listing parsed down to nothing.
pub fn reddit_fallback(query: &str) -> Vec<SearchResult> {
    let encoded = urlencoding::encode(query);
    let subreddit: String = query.chars().filter(|c| !c.is_whitespace()).collect();

    vec![
        synthesized(
            Platform::Reddit,
            format!("Search \"{query}\" on Reddit"),
            "Browse all matching posts on Reddit".to_string(),
            format!("{REDDIT_WEB_BASE}/search/?q={encoded}"),
            "general",
        ),
        synthesized(
            Platform::Reddit,
            format!("Visit r/{subreddit}"),
            format!("Open the r/{subreddit} community"),
            format!("{REDDIT_WEB_BASE}/r/{subreddit}/"),
            "subreddit",
        ),
    ]
}

/// Exactly three always-navigable TikTok links for when extraction came
/// up empty.
pub fn tiktok_fallback(query: &str) -> Vec<SearchResult> {
    let encoded = urlencoding::encode(query);
    let tag: String = query
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '#')
        .collect();
    let trending = urlencoding::encode(&format!("{query} trending")).into_owned();

    vec![
        synthesized(
            Platform::TikTok,
            format!("Search \"{query}\" on TikTok"),
            "Browse matching videos on TikTok".to_string(),
            format!("https://www.tiktok.com/search?q={encoded}"),
            "general",
        ),
        synthesized(
            Platform::TikTok,
            format!("#{tag} on TikTok"),
            format!("Videos tagged #{tag}"),
            format!("https://www.tiktok.com/tag/{}", urlencoding::encode(&tag)),
            "hashtag",
        ),
        synthesized(
            Platform::TikTok,
            format!("Trending: {query}"),
            "What's trending for this search right now".to_string(),
            format!("https://www.tiktok.com/search?q={trending}"),
            "trending",
        ),
    ]
}

fn synthesized(
    platform: Platform,
    title: String,
    description: String,
    content_url: String,
    kind: &str,
) -> SearchResult {
    let mut metadata = HashMap::new();
    metadata.insert("fallback".to_string(), kind.to_string());
    SearchResult {
        id: SearchResult::derive_id(platform, &content_url),
        title,
        description,
        content_url,
        thumbnail_url: None,
        result_type: ResultType::Website,
        metadata,
        is_synthesized_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str) -> RedditPost {
        RedditPost {
            id: "t3_x".into(),
            title: Some(title.into()),
            author: Some("ferris".into()),
            subreddit: Some("rust".into()),
            permalink: Some("/r/rust/comments/x/post/".into()),
            ..Default::default()
        }
    }

    #[test]
    fn post_with_required_fields_normalizes() {
        let result = reddit_post(&post("Borrowck question")).unwrap();
        assert_eq!(result.title, "Borrowck question");
        assert_eq!(
            result.content_url,
            "https://www.reddit.com/r/rust/comments/x/post/"
        );
        assert_eq!(result.result_type, ResultType::Post);
        assert_eq!(result.description, "r/rust \u{2022} by u/ferris");
        assert!(!result.is_synthesized_fallback);
    }

    #[test]
    fn post_missing_author_is_skipped() {
        let mut p = post("x");
        p.author = None;
        assert!(reddit_post(&p).is_none());
    }

    #[test]
    fn counts_appear_only_when_positive() {
        let mut p = post("Popular post");
        p.score = 42;
        p.num_comments = 7;
        let result = reddit_post(&p).unwrap();
        assert_eq!(
            result.description,
            "r/rust \u{2022} by u/ferris \u{2022} 42 upvotes \u{2022} 7 comments"
        );

        let mut p = post("Zero score");
        p.score = 0;
        p.num_comments = -1;
        let result = reddit_post(&p).unwrap();
        assert!(!result.description.contains("upvotes"));
        assert!(!result.description.contains("comments"));
    }

    #[test]
    fn https_jpg_url_is_image_with_itself_as_thumbnail() {
        let mut p = post("A picture");
        p.url = Some("https://i.redd.it/pic.jpg".into());
        let result = reddit_post(&p).unwrap();
        assert_eq!(result.result_type, ResultType::Image);
        assert_eq!(
            result.thumbnail_url.as_deref(),
            Some("https://i.redd.it/pic.jpg")
        );
    }

    #[test]
    fn video_flag_beats_image_extension() {
        let mut p = post("A clip");
        p.is_video = true;
        p.url = Some("https://i.redd.it/pic.jpg".into());
        let result = reddit_post(&p).unwrap();
        assert_eq!(result.result_type, ResultType::Video);
    }

    #[test]
    fn preview_source_beats_legacy_thumbnail() {
        use feedskip_api::reddit::{RedditImageSource, RedditPreview, RedditPreviewImage};

        let mut p = post("With preview");
        p.thumbnail = Some("https://b.thumbs.redditmedia.com/t.jpg".into());
        p.preview = Some(RedditPreview {
            images: vec![RedditPreviewImage {
                source: RedditImageSource {
                    url: "https://preview.redd.it/full.jpg?width=640&amp;crop=smart".into(),
                    width: 640,
                    height: 480,
                },
            }],
        });

        let result = reddit_post(&p).unwrap();
        assert_eq!(
            result.thumbnail_url.as_deref(),
            Some("https://preview.redd.it/full.jpg?width=640&crop=smart")
        );
    }

    #[test]
    fn sentinel_thumbnails_are_ignored() {
        for sentinel in ["self", "default", "nsfw", "spoiler"] {
            let mut p = post("No pic");
            p.thumbnail = Some(sentinel.into());
            assert!(reddit_post(&p).unwrap().thumbnail_url.is_none());
        }

        // http (not https) legacy thumbnails are also dropped
        let mut p = post("Insecure pic");
        p.thumbnail = Some("http://b.thumbs.redditmedia.com/t.jpg".into());
        assert!(reddit_post(&p).unwrap().thumbnail_url.is_none());
    }

    #[test]
    fn accepted_legacy_thumbnail_survives() {
        let mut p = post("Pic");
        p.thumbnail = Some("https://b.thumbs.redditmedia.com/t.jpg".into());
        let result = reddit_post(&p).unwrap();
        assert_eq!(
            result.thumbnail_url.as_deref(),
            Some("https://b.thumbs.redditmedia.com/t.jpg")
        );
    }

    #[test]
    fn reddit_fallback_is_exactly_two_flagged_links() {
        let results = reddit_fallback("rust lang");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_synthesized_fallback));
        assert!(results[0].content_url.contains("search/?q=rust%20lang"));
        assert_eq!(results[1].content_url, "https://www.reddit.com/r/rustlang/");
    }

    #[test]
    fn tiktok_fallback_is_exactly_three_flagged_links() {
        let results = tiktok_fallback("#cat videos");
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_synthesized_fallback));
        // Hashtag link strips # and spaces
        assert_eq!(results[1].content_url, "https://www.tiktok.com/tag/catvideos");
        assert_ne!(results[0].content_url, results[2].content_url);
    }

    #[test]
    fn trending_fallback_encodes_the_expanded_query() {
        let results = tiktok_fallback("cat videos");
        assert_eq!(
            results[2].content_url,
            "https://www.tiktok.com/search?q=cat%20videos%20trending"
        );
    }

    #[test]
    fn tiktok_link_describes_its_domain() {
        let link = ExtractedLink {
            href: "https://example.com/watch/9".into(),
            text: "A cooking tutorial".into(),
        };
        let result = tiktok_link(&link);
        assert_eq!(result.description, "Search result from example.com");
        assert_eq!(result.result_type, ResultType::Website);
        assert!(!result.is_synthesized_fallback);
    }

    #[test]
    fn ids_are_unique_within_a_fallback_set() {
        let results = tiktok_fallback("cats");
        let mut ids: Vec<_> = results.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
