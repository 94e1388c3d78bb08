use serde::Deserialize;
use validator::Validate;

use crate::services::AnnouncementChanges;
use crate::utils::validation::validate_not_blank;

// Request para crear un aviso
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    #[validate(custom = "validate_not_blank")]
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default = "default_publish")]
    pub publish: bool,
}

fn default_publish() -> bool {
    true
}

// Request para actualizar un aviso
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    pub published: Option<bool>,
}

impl From<UpdateAnnouncementRequest> for AnnouncementChanges {
    fn from(request: UpdateAnnouncementRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            is_pinned: request.is_pinned,
            published: request.published,
        }
    }
}
