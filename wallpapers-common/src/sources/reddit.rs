use crate::record::ImageRecord;
use serde::Deserialize;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub struct Child {
    pub data: Post,
}

#[derive(Debug, Deserialize)]
pub struct Post {
    pub url: Option<String>,
    pub title: Option<String>,
    pub permalink: Option<String>,
    pub author: Option<String>,
    pub subreddit: Option<String>,
    pub post_hint: Option<String>,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub is_video: bool,
}

impl Post {
    fn is_image(&self) -> bool {
        if self.is_video {
            return false;
        }
        if self.post_hint.as_deref() == Some("image") {
            return true;
        }
        self.url.as_deref().is_some_and(has_image_extension)
    }
}

fn has_image_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('.')
        .next()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Turn a listing into image records, dropping non-image and (unless
/// allowed) NSFW posts.
pub fn into_records(listing: Listing, site: &str, allow_nsfw: bool) -> Vec<ImageRecord> {
    let site = site.trim_end_matches('/');
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| post.is_image() && (allow_nsfw || !post.over_18))
        .filter_map(|post| {
            let url = post.url?;
            let mut record = ImageRecord::new(url);
            if let Some(title) = post.title {
                record = record.with_title(title);
            }
            if let Some(permalink) = post.permalink {
                record = record.with_source_page(format!("{}{}", site, permalink));
            }
            if let Some(author) = post.author {
                record = record.with_field("author", author);
            }
            if let Some(subreddit) = post.subreddit {
                record = record.with_field("channel", subreddit);
            }
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {
                    "url": "https://i.redd.it/abc.jpg",
                    "title": "Sunrise over the fjord [OC] [4032x3024]",
                    "permalink": "/r/EarthPorn/comments/1/sunrise/",
                    "author": "hiker",
                    "subreddit": "EarthPorn",
                    "post_hint": "image",
                    "over_18": false
                }},
                {"kind": "t3", "data": {
                    "url": "https://www.reddit.com/r/EarthPorn/comments/2/meta/",
                    "title": "Monthly meta thread",
                    "permalink": "/r/EarthPorn/comments/2/meta/",
                    "post_hint": "self"
                }},
                {"kind": "t3", "data": {
                    "url": "https://i.imgur.com/xyz.PNG?width=640",
                    "title": "Glacier",
                    "permalink": "/r/EarthPorn/comments/3/glacier/"
                }},
                {"kind": "t3", "data": {
                    "url": "https://i.redd.it/nsfw.jpg",
                    "title": "Hidden",
                    "over_18": true
                }},
                {"kind": "t3", "data": {
                    "url": "https://v.redd.it/clip",
                    "title": "Video",
                    "post_hint": "image",
                    "is_video": true
                }}
            ]
        }
    }"#;

    #[test]
    fn test_listing_keeps_only_safe_images() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let records = into_records(listing, "https://www.reddit.com/", false);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_url, "https://i.redd.it/abc.jpg");
        assert_eq!(records[0].title.as_deref(), Some("Sunrise over the fjord [OC] [4032x3024]"));
        assert_eq!(
            records[0].source_page.as_deref(),
            Some("https://www.reddit.com/r/EarthPorn/comments/1/sunrise/")
        );
        assert_eq!(records[0].extra.get("author").map(String::as_str), Some("hiker"));
        assert_eq!(records[1].image_url, "https://i.imgur.com/xyz.PNG?width=640");
    }

    #[test]
    fn test_nsfw_allowed_when_configured() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let records = into_records(listing, "https://www.reddit.com", true);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_empty_listing() {
        let listing: Listing = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(into_records(listing, "https://www.reddit.com", false).is_empty());
    }
}
