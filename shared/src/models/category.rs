//! Category Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories form a tree through `parent_id`; a root has no parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub slug: String,
    /// Default display title
    pub title: Option<String>,
    pub title_tr: Option<String>,
    pub title_en: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Title used in reports: Turkish title first, then the default one
    pub fn display_title(&self) -> Option<&str> {
        self.title_tr
            .as_deref()
            .or(self.title.as_deref())
            .or(self.title_en.as_deref())
    }
}
