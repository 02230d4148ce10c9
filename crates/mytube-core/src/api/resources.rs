//! Typed endpoints for the feature surfaces: feed, videos, profile, channels, comments.
//!
//! All of these go through [`ApiClient::execute`] and so inherit the
//! bearer credential and the refresh-and-replay behavior.

use serde_json::json;

use crate::models::{
    Channel, ChannelRequest, ChangePasswordRequest, Comment, Page, ProfileStats,
    UpdateProfileRequest, UploadFile, UserProfile, Video, VideoUpdate, VideoUpload,
};

use super::client::{ApiClient, ApiRequest, MultipartField};
use super::ApiError;

/// Page size used by the web client for listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the server accepts
pub const MAX_PAGE_SIZE: u32 = 100;

fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// Percent-encode an id for use as one path segment
fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl ApiClient {
    // ===== Videos =====

    /// The trending feed shown on the home page
    pub async fn trending(&self) -> Result<Vec<Video>, ApiError> {
        self.get("/api/videos/trending").await
    }

    pub async fn video(&self, id: &str) -> Result<Video, ApiError> {
        self.get(&format!("/api/videos/{}", segment(id))).await
    }

    pub async fn search(&self, query: &str, page: u32, size: u32) -> Result<Page<Video>, ApiError> {
        let request = ApiRequest::get("/api/videos/search")
            .query("query", query)
            .query("page", page)
            .query("size", clamp_page_size(size));
        self.fetch(&request).await
    }

    /// Upload a video with optional thumbnail. Limits are checked before anything is sent.
    pub async fn upload_video(&self, upload: &VideoUpload) -> Result<Video, ApiError> {
        upload.validate()?;

        let mut fields = vec![MultipartField::File {
            name: "video".to_string(),
            file: upload.video.clone(),
        }];
        if let Some(ref thumbnail) = upload.thumbnail {
            fields.push(MultipartField::File {
                name: "thumbnail".to_string(),
                file: thumbnail.clone(),
            });
        }
        fields.push(MultipartField::Text {
            name: "title".to_string(),
            value: upload.title.trim().to_string(),
        });
        fields.push(MultipartField::Text {
            name: "description".to_string(),
            value: upload.description.trim().to_string(),
        });
        fields.push(MultipartField::Text {
            name: "tags".to_string(),
            value: upload.tags_json(),
        });

        self.fetch(&ApiRequest::post("/api/videos/upload").multipart(fields))
            .await
    }

    pub async fn update_video(&self, id: &str, update: &VideoUpdate) -> Result<Video, ApiError> {
        self.put(&format!("/api/videos/{}", segment(id)), update).await
    }

    pub async fn delete_video(&self, id: &str) -> Result<(), ApiError> {
        self.send(&ApiRequest::delete(format!("/api/videos/{}", segment(id))))
            .await
    }

    pub async fn like_video(&self, id: &str) -> Result<(), ApiError> {
        self.send(&ApiRequest::post(format!("/api/videos/{}/like", segment(id))))
            .await
    }

    pub async fn dislike_video(&self, id: &str) -> Result<(), ApiError> {
        self.send(&ApiRequest::post(format!("/api/videos/{}/dislike", segment(id))))
            .await
    }

    // ===== Users =====

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/api/users/profile").await
    }

    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<UserProfile, ApiError> {
        self.put("/api/users/profile", update).await
    }

    pub async fn profile_stats(&self) -> Result<ProfileStats, ApiError> {
        self.get("/api/users/profile/stats").await
    }

    pub async fn user_videos(&self, page: u32, size: u32) -> Result<Page<Video>, ApiError> {
        let request = ApiRequest::get("/api/users/videos")
            .query("page", page)
            .query("size", clamp_page_size(size));
        self.fetch(&request).await
    }

    pub async fn upload_avatar(&self, avatar: &UploadFile) -> Result<UserProfile, ApiError> {
        avatar.validate_avatar()?;
        let request = ApiRequest::post("/api/users/avatar").multipart(vec![MultipartField::File {
            name: "avatar".to_string(),
            file: avatar.clone(),
        }]);
        self.fetch(&request).await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.send(&ApiRequest::post("/api/users/change-password").json(request)?)
            .await
    }

    // ===== Channels =====

    pub async fn channel(&self, id: &str) -> Result<Channel, ApiError> {
        self.get(&format!("/api/channels/{}", segment(id))).await
    }

    pub async fn create_channel(&self, request: &ChannelRequest) -> Result<Channel, ApiError> {
        self.post("/api/channels", request).await
    }

    pub async fn subscribe(&self, channel_id: &str) -> Result<(), ApiError> {
        self.send(&ApiRequest::post(format!("/api/channels/{}/subscribe", segment(channel_id))))
            .await
    }

    pub async fn unsubscribe(&self, channel_id: &str) -> Result<(), ApiError> {
        self.send(&ApiRequest::delete(format!("/api/channels/{}/subscribe", segment(channel_id))))
            .await
    }

    pub async fn subscriptions(&self) -> Result<Vec<Channel>, ApiError> {
        self.get("/api/channels/subscriptions").await
    }

    // ===== Comments =====

    pub async fn comments(&self, video_id: &str, page: u32, size: u32) -> Result<Page<Comment>, ApiError> {
        let request = ApiRequest::get(format!("/api/videos/{}/comments", segment(video_id)))
            .query("page", page)
            .query("size", clamp_page_size(size));
        self.fetch(&request).await
    }

    pub async fn add_comment(&self, video_id: &str, content: &str) -> Result<Comment, ApiError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::InvalidRequest("Comment is empty".to_string()));
        }
        self.post(
            &format!("/api/videos/{}/comments", segment(video_id)),
            &json!({ "content": content }),
        )
        .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError> {
        self.send(&ApiRequest::delete(format!("/api/comments/{}", segment(comment_id))))
            .await
    }
}
