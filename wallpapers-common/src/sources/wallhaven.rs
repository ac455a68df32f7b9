use crate::record::ImageRecord;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Wallpaper>,
}

#[derive(Debug, Deserialize)]
pub struct Wallpaper {
    pub id: Option<String>,
    pub path: String,
    pub url: Option<String>,
    pub resolution: Option<String>,
    pub category: Option<String>,
}

/// Keep the first `limit` entries.
pub fn into_records(response: SearchResponse, limit: usize) -> Vec<ImageRecord> {
    response
        .data
        .into_iter()
        .take(limit)
        .map(|wallpaper| {
            let mut record = ImageRecord::new(wallpaper.path);
            if let Some(page) = wallpaper.url {
                record = record.with_source_page(page);
            }
            if let Some(id) = wallpaper.id {
                record = record.with_field("id", id);
            }
            if let Some(resolution) = wallpaper.resolution {
                record = record.with_field("resolution", resolution);
            }
            if let Some(category) = wallpaper.category {
                record = record.with_field("category", category);
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_first_entries_only() {
        let body = r#"{
            "data": [
                {"id": "a1", "path": "https://w.wallhaven.cc/full/a1/wallhaven-a1.jpg",
                 "url": "https://wallhaven.cc/w/a1", "resolution": "1920x1080", "category": "general"},
                {"id": "b2", "path": "https://w.wallhaven.cc/full/b2/wallhaven-b2.png"},
                {"id": "c3", "path": "https://w.wallhaven.cc/full/c3/wallhaven-c3.jpg"},
                {"id": "d4", "path": "https://w.wallhaven.cc/full/d4/wallhaven-d4.jpg"}
            ],
            "meta": {"current_page": 1}
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let records = into_records(response, 3);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].image_url, "https://w.wallhaven.cc/full/a1/wallhaven-a1.jpg");
        assert_eq!(records[0].source_page.as_deref(), Some("https://wallhaven.cc/w/a1"));
        assert_eq!(records[0].extra.get("resolution").map(String::as_str), Some("1920x1080"));
        assert_eq!(records[0].title, None);
        assert_eq!(records[2].extra.get("id").map(String::as_str), Some("c3"));
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"error": "rate limited"}"#).unwrap();
        assert!(into_records(response, 3).is_empty());
    }
}
