//! Data models for mytube entities.
//!
//! - `UserProfile`, `RegisterRequest`, `UpdateProfileRequest`: accounts
//! - `Video`, `Page`: feeds and search results
//! - `Channel`, `ChannelInfo`: channels and the summary embedded in profiles
//! - `Comment`: video comments
//! - `VideoUpload`, `UploadFile`: multipart uploads and their limits

pub mod channel;
pub mod comment;
pub mod upload;
pub mod user;
pub mod video;

pub use channel::{Channel, ChannelInfo, ChannelRequest};
pub use comment::{Comment, CommentAuthor};
pub use upload::{UploadError, UploadFile, VideoUpload};
pub use user::{
    ChangePasswordRequest, ProfileStats, RegisterRequest, UpdateProfileRequest, UserProfile,
    UserRole, UserSex,
};
pub use video::{Page, Video, VideoChannel, VideoUpdate};
