use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{forms, posts::AuthorResponse};

pub mod handler;

/// Database model for a comment
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub post_id: i64,
    pub created: chrono::DateTime<chrono::Utc>,
}

/// Form submitted from the post detail page
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    pub fn cleaned(self) -> Self {
        Self {
            text: forms::clean_text(&self.text),
        }
    }
}

/// Comment form values echoed to the detail page.
#[derive(Debug, Default, Serialize)]
pub struct CommentFormData {
    pub text: String,
}

/// Response structure for a comment with author info
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub author: AuthorResponse,
    pub text: String,
    pub created: chrono::DateTime<chrono::Utc>,
}
