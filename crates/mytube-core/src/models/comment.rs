use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    #[serde(rename = "likeCount", default)]
    pub like_count: u64,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("anonymous")
    }
}
