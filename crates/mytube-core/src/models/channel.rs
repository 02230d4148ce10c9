use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Channel summary embedded in a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(rename = "channelName")]
    pub channel_name: String,
    pub description: Option<String>,
    #[serde(rename = "subscriberCount", default)]
    pub subscriber_count: u64,
    #[serde(rename = "videoCount", default)]
    pub video_count: u64,
    #[serde(rename = "viewCount", default)]
    pub view_count: Option<u64>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Channel as returned by `/api/channels/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub channel_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscriber_count: u64,
    #[serde(default)]
    pub video_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub is_subscribed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRequest {
    pub channel_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
