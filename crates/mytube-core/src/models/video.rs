use serde::{Deserialize, Serialize};

use crate::utils::format::format_duration;

/// Channel summary embedded in video listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoChannel {
    pub id: String,
    pub channel_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscriber_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub dislike_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    // Listings sometimes send a preformatted "12:34" instead of seconds
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub channel: Option<VideoChannel>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Video {
    pub fn duration_display(&self) -> String {
        match (self.duration_seconds, &self.duration) {
            (Some(seconds), _) => format_duration(seconds),
            (None, Some(duration)) => duration.clone(),
            (None, None) => "--:--".to_string(),
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel
            .as_ref()
            .map(|c| c.channel_name.as_str())
            .unwrap_or("Unknown channel")
    }
}

/// Editable video metadata for `PUT /api/videos/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

/// A Spring Data page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trending_video() {
        let json = r#"{
            "id": "v1",
            "title": "Borscht in 10 minutes",
            "description": "Fast and red",
            "thumbnailUrl": "/thumbs/v1.jpg",
            "viewCount": 15300,
            "likeCount": 420,
            "durationSeconds": 754,
            "uploadDate": "2024-05-02T10:00:00",
            "channel": {"id": "c1", "channelName": "Anna Cooks", "subscriberCount": 1200},
            "tags": ["food", "soup"]
        }"#;
        let video: Video = serde_json::from_str(json).expect("video should parse");
        assert_eq!(video.duration_display(), "12:34");
        assert_eq!(video.channel_name(), "Anna Cooks");
        assert_eq!(video.tags.len(), 2);
    }

    #[test]
    fn test_video_duration_fallbacks() {
        let json = r#"{"id": "v2", "title": "t", "duration": "3:07"}"#;
        let video: Video = serde_json::from_str(json).unwrap();
        assert_eq!(video.duration_display(), "3:07");
        assert_eq!(video.channel_name(), "Unknown channel");

        let bare: Video = serde_json::from_str(r#"{"id": "v3", "title": "t"}"#).unwrap();
        assert_eq!(bare.duration_display(), "--:--");
    }

    #[test]
    fn test_page_is_last() {
        let json = r#"{"content": [], "totalElements": 41, "totalPages": 3, "number": 2, "size": 20}"#;
        let page: Page<Video> = serde_json::from_str(json).unwrap();
        assert!(page.is_last());
    }
}
