//! Files sent as multipart uploads and the limits checked before sending them.

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::utils::format::format_file_size;

pub const VIDEO_MAX_SIZE: u64 = 100 * 1024 * 1024;
pub const THUMBNAIL_MAX_SIZE: u64 = 5 * 1024 * 1024;
pub const AVATAR_MAX_SIZE: u64 = 2 * 1024 * 1024;

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
pub const MAX_TAGS_COUNT: usize = 10;
pub const MAX_TAG_LENGTH: usize = 30;

pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm"];
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Reasons an upload is refused before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("{label} '{file_name}' has an unsupported format (expected one of {})", .allowed.join(", "))]
    UnsupportedFormat {
        label: &'static str,
        file_name: String,
        allowed: &'static [&'static str],
    },

    #[error("{label} is {}, the limit is {}", size_label(.size), size_label(.max_size))]
    TooLarge {
        label: &'static str,
        size: u64,
        max_size: u64,
    },

    #[error("Title is required")]
    MissingTitle,

    #[error("Title is longer than {} characters", MAX_TITLE_LENGTH)]
    TitleTooLong,

    #[error("Description is longer than {} characters", MAX_DESCRIPTION_LENGTH)]
    DescriptionTooLong,

    #[error("At most {} tags are allowed", MAX_TAGS_COUNT)]
    TooManyTags,

    #[error("Tag '{0}' is longer than {max} characters", max = MAX_TAG_LENGTH)]
    TagTooLong(String),
}

fn size_label(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// A file held in memory so the request can be rebuilt for a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("{} has no file name", path.display()))?;
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension including the dot, e.g. `.mp4`
    pub fn extension(&self) -> Option<String> {
        let lower = self.file_name.to_lowercase();
        lower.rfind('.').map(|idx| lower[idx..].to_string())
    }

    fn check(
        &self,
        label: &'static str,
        allowed: &'static [&'static str],
        max_size: u64,
    ) -> Result<(), UploadError> {
        match self.extension() {
            Some(ext) if allowed.contains(&ext.as_str()) => {}
            _ => {
                return Err(UploadError::UnsupportedFormat {
                    label,
                    file_name: self.file_name.clone(),
                    allowed,
                })
            }
        }
        if self.size() > max_size {
            return Err(UploadError::TooLarge {
                label,
                size: self.size(),
                max_size,
            });
        }
        Ok(())
    }

    /// Validate as a profile avatar
    pub fn validate_avatar(&self) -> Result<(), UploadError> {
        self.check("Avatar", IMAGE_EXTENSIONS, AVATAR_MAX_SIZE)
    }
}

/// Everything the upload dialog collects for `POST /api/videos/upload`.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub video: UploadFile,
    pub thumbnail: Option<UploadFile>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl VideoUpload {
    pub fn new(video: UploadFile, title: impl Into<String>) -> Self {
        Self {
            video,
            thumbnail: None,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// Add a tag, ignoring blanks and duplicates
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        self.video.check("Video", VIDEO_EXTENSIONS, VIDEO_MAX_SIZE)?;
        if let Some(ref thumbnail) = self.thumbnail {
            thumbnail.check("Thumbnail", IMAGE_EXTENSIONS, THUMBNAIL_MAX_SIZE)?;
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err(UploadError::MissingTitle);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(UploadError::TitleTooLong);
        }
        if self.description.trim().chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(UploadError::DescriptionTooLong);
        }
        if self.tags.len() > MAX_TAGS_COUNT {
            return Err(UploadError::TooManyTags);
        }
        if let Some(tag) = self.tags.iter().find(|t| t.chars().count() > MAX_TAG_LENGTH) {
            return Err(UploadError::TagTooLong(tag.clone()));
        }
        Ok(())
    }

    /// Tags as the JSON array string the server expects in the `tags` field
    pub fn tags_json(&self) -> String {
        serde_json::to_string(&self.tags).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_file(name: &str, size: usize) -> UploadFile {
        UploadFile::new(name, vec![0u8; size])
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(video_file("Clip.MP4", 1).extension().as_deref(), Some(".mp4"));
        assert_eq!(video_file("noext", 1).extension(), None);
    }

    #[test]
    fn test_valid_upload_passes() {
        let mut upload = VideoUpload::new(video_file("clip.mp4", 1024), "  My first video ");
        upload.thumbnail = Some(video_file("thumb.png", 512));
        upload.add_tag("travel");
        upload.add_tag("travel");
        upload.add_tag("  ");
        assert_eq!(upload.tags, vec!["travel".to_string()]);
        assert!(upload.validate().is_ok());
        assert_eq!(upload.tags_json(), r#"["travel"]"#);
    }

    #[test]
    fn test_rejects_unsupported_video_format() {
        let upload = VideoUpload::new(video_file("clip.txt", 10), "title");
        let err = upload.validate().unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat { label: "Video", .. }));
        assert!(err.to_string().contains("expected one of .mp4"));
    }

    #[test]
    fn test_rejects_oversized_thumbnail() {
        let mut upload = VideoUpload::new(video_file("clip.webm", 10), "title");
        upload.thumbnail = Some(video_file("thumb.jpg", THUMBNAIL_MAX_SIZE as usize + 1));
        let err = upload.validate().unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { label: "Thumbnail", .. }));
        assert!(err.to_string().ends_with("the limit is 5.0 MB"));
    }

    #[test]
    fn test_rejects_blank_title_and_too_many_tags() {
        let upload = VideoUpload::new(video_file("clip.mov", 10), "   ");
        assert_eq!(upload.validate(), Err(UploadError::MissingTitle));

        let mut upload = VideoUpload::new(video_file("clip.mov", 10), "ok");
        for i in 0..=MAX_TAGS_COUNT {
            upload.add_tag(&format!("tag{}", i));
        }
        assert_eq!(upload.validate(), Err(UploadError::TooManyTags));

        let mut upload = VideoUpload::new(video_file("clip.mov", 10), "ok");
        upload.add_tag(&"x".repeat(MAX_TAG_LENGTH + 1));
        assert!(matches!(upload.validate(), Err(UploadError::TagTooLong(_))));
    }

    #[test]
    fn test_avatar_limits() {
        assert!(video_file("me.jpeg", 1000).validate_avatar().is_ok());
        assert!(video_file("me.jpeg", AVATAR_MAX_SIZE as usize + 1)
            .validate_avatar()
            .is_err());
        assert!(video_file("me.mp4", 10).validate_avatar().is_err());
    }
}
